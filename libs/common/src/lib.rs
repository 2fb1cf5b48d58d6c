//! Common library for the BIN Alert application
//!
//! This crate provides shared infrastructure used across the services:
//! database connectivity and migrations, error handling, and the outbound
//! email client.

pub mod database;
pub mod error;
pub mod mailer;
