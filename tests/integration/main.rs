//! Integration tests for tape-flow

mod capture_test;
mod e2e_test;
mod record_test;
mod replay_test;
