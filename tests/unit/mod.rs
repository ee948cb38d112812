//! Integration tests for sequential journal files.

mod common;
mod critical_error_tests;
mod round_trip_tests;
