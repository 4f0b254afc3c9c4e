pub mod analytics;
pub mod comparison;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod service;
