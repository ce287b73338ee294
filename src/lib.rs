//! # Accounts API Library
//!
//! This library provides the core functionality for the Accounts API service:
//! tenant registration, API key issuance, and bearer key verification.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod keys;
pub mod models;
pub mod registrar;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub mod verifier;
pub use migration;
