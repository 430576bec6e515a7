//! Core taskpad library (auth client, document store client, config).

pub mod auth;
pub mod config;
pub mod logging;
pub mod store;
pub mod validate;
