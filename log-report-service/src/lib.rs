//! log-report-service: turns raw server logs into plain-language explanations
//! and structured incident reports through a single text-generation pipeline.

pub mod config;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod services;
pub mod startup;
