//! Integration tests for SuiteHub
//!
//! These tests drive the full router, middleware included, against a real
//! SQLite database.

mod auth_tests;
mod contract_tests;
mod dashboard_tests;
mod event_tests;
mod host_routing_tests;
mod reservation_tests;
mod upload_tests;
