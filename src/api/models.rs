use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub url: String,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    pub url: String,
    #[serde(rename = "summary_markdown")]
    pub summary: String,
    pub file_name: String,
    pub mime_type: String,
    pub word_count: usize,
    pub generated_at: DateTime<Utc>,
}
