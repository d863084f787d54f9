pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guardrail;
pub mod models;
pub mod orchestrator;
pub mod recovery;
pub mod session;
pub mod tools;
pub mod ui;
