pub mod agent;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod llm;
pub mod manifest;
pub mod matrix;
pub mod output;
pub mod prompt;
pub mod runner;
