//! Test helpers module
//!
//! Database setup, generated test data and a recording push sink shared by
//! the integration tests.

#![allow(dead_code)]

pub mod database_helper;
pub mod push_recorder;
pub mod test_data;

pub use database_helper::*;
pub use push_recorder::*;
pub use test_data::*;
