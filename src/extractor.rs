use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::error::{AppError, Result};

/// Upper bound on extracted text, in characters.
pub const MAX_CHARS: usize = 15_000;

// How far into the body a <meta charset> declaration is looked for
const CHARSET_SNIFF_BYTES: usize = 1024;

// Subtrees removed before any text is read
static NOISE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script, style").expect("Failed to parse noise selector")
});

/// Body and status of a fetched page.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: String,
    pub status: u16,
    /// `Content-Type` response header, if the server sent one.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Normalized plain text pulled from a page, at most [`MAX_CHARS`] characters.
///
/// An empty value stands for "no content found"; callers decide whether
/// the text is usable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

/// Something that can GET a page. The HTTP implementation is [`HttpFetcher`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawPage>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawPage> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchError(format!("HTTP {} for url ({})", status, url)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await?.to_vec();
        debug!(url, status = status.as_u16(), bytes = body.len(), "page fetched");

        Ok(RawPage {
            url: url.to_string(),
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Fetches a page and reduces it to [`ExtractedText`].
#[derive(Clone)]
pub struct Extractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl Extractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Extractor { fetcher }
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractedText> {
        let page = self.fetcher.fetch(url).await?;
        let text = extract_text(&page.body, page.content_type.as_deref());
        info!(url = %page.url, chars = text.char_count(), "extracted page text");
        Ok(text)
    }
}

/// Parses `body` as HTML and returns its visible text, normalized and truncated.
pub fn extract_text(body: &[u8], content_type: Option<&str>) -> ExtractedText {
    let html = decode_body(body, content_type);
    let mut document = Html::parse_document(&html);

    // Must happen before the text walk, otherwise script bodies leak through
    let noise: Vec<_> = document.select(&NOISE_SELECTOR).map(|el| el.id()).collect();
    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let raw: String = document.root_element().text().collect();
    let normalized = normalize_text(&raw);

    ExtractedText(truncate_chars(&normalized, MAX_CHARS).to_string())
}

/// Decodes a page body to text.
///
/// A byte order mark wins, then the `charset` of the `Content-Type` header,
/// then a `<meta>` charset declaration near the top of the document. Anything
/// else is read as UTF-8.
pub fn decode_body<'a>(body: &'a [u8], content_type: Option<&str>) -> Cow<'a, str> {
    let encoding = content_type
        .and_then(charset_label)
        .or_else(|| {
            let head = &body[..body.len().min(CHARSET_SNIFF_BYTES)];
            charset_label(&String::from_utf8_lossy(head))
        })
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        debug!(encoding = used.name(), "page body contained malformed sequences");
    }
    text
}

/// Finds the value following `charset=` in a header or markup fragment.
fn charset_label(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let label: String = lower[start..]
        .trim_start_matches(['"', '\'', ' '])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();

    if label.is_empty() { None } else { Some(label) }
}

/// Collapses text into a single line.
///
/// Every line is trimmed and split on runs of two or more spaces; the
/// non-empty pieces are joined with single spaces. Single spaces inside a
/// piece are kept as they are.
pub fn normalize_text(text: &str) -> String {
    text.split(is_line_break)
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the first `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}
