// Library interface for llmpulse modules
// This allows tests and other binaries to import modules

pub mod analyzer;
pub mod ingestion;
pub mod llm;
pub mod model;
pub mod pacing;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod scraping;
pub mod summarize;
