//! Haven adoption service
//!
//! HTTP backend for the stray-animal adoption community: community posts,
//! notices and card-news with view counting, proxies to the shelter open data
//! API and other third-party services, and image similarity search.

pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;
pub mod state;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
