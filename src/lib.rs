// Library for the binary and for tests to access modules

pub mod alert;
pub mod cli;
pub mod collector;
pub mod commands;
pub mod config;
pub mod docker_repo;
pub mod error;
pub mod metrics;
pub mod models;
pub mod render;
pub mod routes;
pub mod sysinfo_repo;
pub mod thresholds;
pub mod version;
pub mod worker;
