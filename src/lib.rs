//! ReadyKids CMA portal backend.
//!
//! Case-management API for childminder registration applications: CRUD over
//! the application aggregate, an append-only timeline log, request
//! validation, and the dashboard projection.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `dashboard`: Read-side projection into the dashboard shape.
//! - `db`: Database connection, pool, and schema bootstrap.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `intake`: Derivation rules applied to a raw application form.
//! - `models`: Core data models.
//! - `store`: Persistence for applications and timeline events.
//! - `validation`: Request validation.

pub mod config;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod intake;
pub mod models;
pub mod store;
pub mod validation;
