//! Integration tests for the Powerpipe command-dispatch bootstrap

mod binary;
mod cancellation;
mod completion;
mod exit_codes;
mod global_config;
mod test_utils;
