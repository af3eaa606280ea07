//! Request orchestration: validate, extract, check, summarize.
//!
//! Every request runs the stages in order and stops at the first failure.
//! Nothing is shared between requests apart from the two injected
//! collaborators, which hold no per-request state.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extractor::{Extractor, HttpFetcher, PageFetcher};
use crate::llm::{ChatCompletionsModel, ModelCapability};
use crate::summarizer::{Summarizer, Summary};

/// Extracted text shorter than this (after trimming) is not worth summarizing.
pub const MIN_CONTENT_CHARS: usize = 100;

pub const MARKDOWN_MIME: &str = "text/markdown";

const FILE_SLUG_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidatingUrl,
    Fetching,
    Extracted,
    Summarizing,
    Done,
}

impl Stage {
    pub fn status_message(&self) -> &'static str {
        match self {
            Stage::ValidatingUrl => "Validating URL...",
            Stage::Fetching => "Fetching web content...",
            Stage::Extracted => "Content extracted",
            Stage::Summarizing => "Analyzing content and generating detailed summary...",
            Stage::Done => "Detailed summary generated successfully!",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_message())
    }
}

/// Rejects anything that is not an `http://` or `https://` URL.
///
/// The scheme check runs on `url` as given, so leading whitespace fails it.
pub fn validate_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(AppError::ValidationError("Please enter a valid URL to summarize".to_string()));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::ValidationError(
            "Please enter a valid URL starting with http:// or https://".to_string(),
        ));
    }
    Ok(())
}

/// File name offered for downloading the summary of `url`.
pub fn download_file_name(url: &str) -> String {
    let segment = url.rsplit('/').next().unwrap_or_default();
    let slug: String = segment
        .chars()
        .take(FILE_SLUG_CHARS)
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    format!("summary_{}.md", slug)
}

#[derive(Clone)]
pub struct Pipeline {
    extractor: Extractor,
    summarizer: Summarizer,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, model: Arc<dyn ModelCapability>) -> Self {
        Pipeline {
            extractor: Extractor::new(fetcher),
            summarizer: Summarizer::new(model),
        }
    }

    /// Wires the HTTP fetcher and the chat completions model from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        let model = ChatCompletionsModel::new(config.model.clone())?;
        Ok(Pipeline::new(Arc::new(fetcher), Arc::new(model)))
    }

    pub async fn run(&self, url: &str) -> Result<Summary> {
        let result = self.run_stages(url).await;
        if let Err(err) = &result {
            warn!(url, kind = err.kind(), error = %err, "summarization request failed");
        }
        result
    }

    async fn run_stages(&self, url: &str) -> Result<Summary> {
        enter(Stage::ValidatingUrl, url);
        validate_url(url)?;

        enter(Stage::Fetching, url);
        let text = self.extractor.extract(url).await?;

        enter(Stage::Extracted, url);
        if text.as_str().trim().chars().count() < MIN_CONTENT_CHARS {
            return Err(AppError::ContentError("Insufficient content found".to_string()));
        }

        enter(Stage::Summarizing, url);
        let summary = self.summarizer.summarize(text.as_str()).await?;

        enter(Stage::Done, url);
        Ok(summary)
    }
}

fn enter(stage: Stage, url: &str) {
    info!(url, stage = ?stage, "{}", stage);
}
