//! Database layer unit tests

mod connection_tests;
