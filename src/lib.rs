pub mod config;
pub mod errors;
pub mod job_scheduling;
pub mod models;
pub mod services;
pub mod utils;
pub mod web;
