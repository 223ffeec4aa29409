use std::time::Duration;

use async_trait::async_trait;
use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::errors::{AppError, AppResult};

static PDF_NAME_ARTIFACTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/[A-Za-z0-9]+").expect("pdf artifact regex is invalid"));
static PDF_OPERATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:BT|ET|Tf|Td|Tj|EMC)\b").expect("pdf operator regex is invalid"));
static NON_PRINTABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\x20-\x7E]+").expect("non-printable regex is invalid"));
static HAS_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]").expect("letter regex is invalid"));
static MULTI_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is invalid"));

/// Fetches a user-uploaded document and extracts plain text from it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract<'a>(&self, url: &str, declared_type: Option<&'a str>) -> AppResult<String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DocKind {
    Pdf,
    Docx,
    Plain,
    Unknown,
}

/// Downloads the attachment over HTTP and runs the extractor matching its
/// kind. The kind is inferred from the URL suffix first, then from the
/// declared or response content-type.
pub struct HttpDocumentExtractor {
    client: reqwest::Client,
}

impl HttpDocumentExtractor {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::InternalError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentExtractor for HttpDocumentExtractor {
    async fn extract<'a>(&self, url: &str, declared_type: Option<&'a str>) -> AppResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Extraction("file download timed out".to_string())
            } else {
                AppError::Extraction(format!("file download failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Extraction(format!(
                "file download returned {}",
                status
            )));
        }

        let header_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let content_type = declared_type.map(str::to_string).or(header_type);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Extraction(format!("file download failed: {}", e)))?;

        let mut kind = kind_from_url(url);
        if kind == DocKind::Unknown {
            if let Some(content_type) = &content_type {
                kind = kind_from_content_type(content_type);
            }
        }
        log::info!("extracting {:?} document from {}", kind, url);

        extract_by_kind(kind, &bytes)
    }
}

fn extract_by_kind(kind: DocKind, bytes: &[u8]) -> AppResult<String> {
    match kind {
        DocKind::Pdf => extract_pdf(bytes),
        DocKind::Docx => extract_docx(bytes),
        DocKind::Plain => Ok(String::from_utf8_lossy(bytes).into_owned()),
        // Unknown kinds try each extractor in sequence and take the first
        // non-empty result.
        DocKind::Unknown => {
            for attempt in [extract_pdf(bytes), extract_docx(bytes)] {
                if let Ok(text) = attempt {
                    if !text.trim().is_empty() {
                        return Ok(text);
                    }
                }
            }
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn extract_pdf(bytes: &[u8]) -> AppResult<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::Extraction(format!("unreadable PDF: {}", e)))
}

fn extract_docx(bytes: &[u8]) -> AppResult<String> {
    let docx =
        read_docx(bytes).map_err(|e| AppError::Extraction(format!("unreadable DOCX: {}", e)))?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for paragraph_child in &paragraph.children {
                if let ParagraphChild::Run(run) = paragraph_child {
                    for run_child in &run.children {
                        if let RunChild::Text(text) = run_child {
                            line.push_str(&text.text);
                        }
                    }
                }
            }
            if !line.is_empty() {
                paragraphs.push(line);
            }
        }
    }
    Ok(paragraphs.join("\n"))
}

fn kind_from_url(url: &str) -> DocKind {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();
    if path.ends_with(".pdf") {
        DocKind::Pdf
    } else if path.ends_with(".docx") || path.ends_with(".doc") {
        DocKind::Docx
    } else if path.ends_with(".txt") {
        DocKind::Plain
    } else {
        DocKind::Unknown
    }
}

fn kind_from_content_type(content_type: &str) -> DocKind {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("pdf") {
        DocKind::Pdf
    } else if content_type.contains("wordprocessingml") || content_type.contains("msword") {
        DocKind::Docx
    } else if content_type.starts_with("text/") {
        DocKind::Plain
    } else {
        DocKind::Unknown
    }
}

/// Scrubs extractor noise: PDF name artifacts and operators, non-printable
/// runs, and lines with no letters at all. Whitespace is collapsed last.
pub fn clean_text(text: &str) -> String {
    let kept: Vec<String> = text
        .lines()
        .map(|line| {
            let line = NON_PRINTABLE.replace_all(line, " ");
            let line = PDF_NAME_ARTIFACTS.replace_all(&line, "");
            PDF_OPERATORS.replace_all(&line, "").into_owned()
        })
        .filter(|line| HAS_LETTER.is_match(line))
        .collect();

    MULTI_WHITESPACE
        .replace_all(kept.join(" ").trim(), " ")
        .into_owned()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
