//! Unit test target for async_runtime

mod promise_test;
