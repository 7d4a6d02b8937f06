//! Pet registration service: owner info, pet info and an optional photo per
//! record, served over HTTP and backed by SQLite or an in-memory store.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
