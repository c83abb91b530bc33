// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod auth;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod runtime;
pub mod session;
pub mod store;
pub mod ui;
pub mod util;

pub use error::{GatewayError, GymError, Result, ValidationError};
