pub mod config;
pub mod costing;
pub mod database;
pub mod errors;
pub mod services;
