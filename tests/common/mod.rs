//! Common test utilities and helpers
//!
//! This module provides shared test infrastructure including:
//! - Request fixtures and record factories
//! - A mock completion API
//! - Test database setup
//! - API test client

pub mod mocks;

pub use factories::*;
pub use fixtures::*;
pub use mocks::*;
pub use test_app::*;
