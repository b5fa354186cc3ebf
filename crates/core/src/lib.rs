//! Core library: scanning, metadata extraction, batching, inference
//! orchestration, response parsing, and change application.

pub mod applier;
pub mod cleaner;
pub mod config;
pub mod extractor;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod planner;
pub mod scanner;
pub mod template;
pub mod transcoder;
