use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::llm::ModelCapability;

const PROMPT_HEADER: &str = "Analyze and create a comprehensive, detailed summary of the following web content. Structure it professionally:\n\nContent:\n";

const PROMPT_REQUIREMENTS: &str = "\n\nRequirements:
- Create a detailed **Executive Summary** at the top (2-3 paragraphs)
- Use clear **section headings** with substantial content under each
- Include **detailed bullet points** (3-5 points per section, each 1-2 sentences)
- Cover ALL key concepts, benefits, use cases, technical details, and implications
- Include specific examples, data, or statistics mentioned
- Add a **Key Takeaways** section at the end
- Format everything in **Markdown** with proper headings (##, ###)
- Make it comprehensive - aim for a thorough analysis, not just a brief overview
- Include any relevant background context or industry implications
- Don't skip important details - be thorough and informative

The summary should be substantial and detailed enough to give someone a complete understanding of the topic without reading the original content.";

/// Markdown report returned by the model, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary(String);

impl Summary {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

pub fn build_prompt(content: &str) -> String {
    let mut result = String::with_capacity(PROMPT_HEADER.len() + content.len() + PROMPT_REQUIREMENTS.len());
    result.push_str(PROMPT_HEADER);
    result.push_str(content);
    result.push_str(PROMPT_REQUIREMENTS);
    result
}

#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn ModelCapability>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn ModelCapability>) -> Self {
        Summarizer { model }
    }

    /// Makes exactly one model call; there is no retry.
    pub async fn summarize(&self, text: &str) -> Result<Summary> {
        let prompt = build_prompt(text);
        debug!(prompt_chars = prompt.len(), "built summary prompt");

        let started = Instant::now();
        let output = self.model.generate(&prompt).await?;
        info!(elapsed = ?started.elapsed(), "summary generated");

        Ok(Summary(output.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::llm::ModelOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingModel {
        prompts: Mutex<Vec<String>>,
        reply: std::result::Result<String, String>,
    }

    #[async_trait]
    impl ModelCapability for RecordingModel {
        async fn generate(&self, prompt: &str) -> Result<ModelOutput> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(ModelOutput { text: text.clone() }),
                Err(cause) => Err(AppError::ModelError(cause.clone())),
            }
        }
    }

    #[test]
    fn test_prompt_embeds_content_verbatim() {
        let prompt = build_prompt("Rust   is  a language.\nNew line");
        assert!(prompt.contains("Content:\nRust   is  a language.\nNew line\n\nRequirements:"));
        assert!(prompt.contains("**Executive Summary**"));
        assert!(prompt.contains("3-5 points per section"));
        assert!(prompt.contains("**Key Takeaways**"));
        assert!(prompt.contains("**Markdown**"));
    }

    #[tokio::test]
    async fn test_summarize_returns_output_unmodified() {
        let model = Arc::new(RecordingModel {
            prompts: Mutex::new(Vec::new()),
            reply: Ok("  ## Executive Summary\n\nText  ".to_string()),
        });
        let summarizer = Summarizer::new(model.clone());

        let summary = summarizer.summarize("page text").await.unwrap();

        assert_eq!(summary.as_str(), "  ## Executive Summary\n\nText  ");
        assert_eq!(summary.word_count(), 4);
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("page text"));
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let model = Arc::new(RecordingModel {
            prompts: Mutex::new(Vec::new()),
            reply: Err("quota exceeded".to_string()),
        });
        let summarizer = Summarizer::new(model.clone());

        let err = summarizer.summarize("page text").await.unwrap_err();

        assert!(matches!(err, AppError::ModelError(msg) if msg == "quota exceeded"));
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }
}
