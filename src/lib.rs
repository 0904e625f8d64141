//! Recommendation service: a REST API over stored product recommendations.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
