// Core modules
pub mod cli;
pub mod config;
pub mod git;
pub mod github;
pub mod models;

// Analysis and reporting
pub mod analysis;
pub mod commands;
pub mod infrastructure;
pub mod report;
