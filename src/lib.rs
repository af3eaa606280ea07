pub mod api;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod pipeline;
pub mod summarizer;

use pipeline::Pipeline;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}
