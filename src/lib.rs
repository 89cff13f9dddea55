pub mod assets;
pub mod config;
pub mod database;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod report;
pub mod repositories;
pub mod services;
pub mod web;
