//! Accessibility audit over rendered pages.
//!
//! Each page is fetched (HTTP) or read (local path), scanned, and its finding
//! count reported. The run fails when the total exceeds a threshold.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AuditError;

mod rules;

pub use rules::StaticScanner;

/// Default maximum number of total findings tolerated.
pub const DEFAULT_THRESHOLD: usize = 20;

/// One accessibility problem on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Stable rule key, e.g. `image-alt`.
    pub rule: &'static str,
    pub message: String,
}

/// A scanning engine. The built-in one is [`StaticScanner`].
pub trait A11yScanner {
    fn scan(&self, html: &str) -> Vec<Finding>;
}

/// A page to audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Url(String),
    Path(PathBuf),
}

impl PageRef {
    /// `http(s)://` locations are URLs; everything else is a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Path(path) => path.display().to_string(),
        }
    }
}

/// Retrieves page HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, page: &PageRef) -> Result<String, AuditError>;
}

/// Fetches URLs with `reqwest` and reads paths from disk.
pub struct HttpPageFetcher {
    http: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("themesync-audit/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http }
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, page: &PageRef) -> Result<String, AuditError> {
        match page {
            PageRef::Url(url) => {
                let response = self.http.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(AuditError::Status(url.clone(), status.as_u16()));
                }
                Ok(response.text().await?)
            }
            PageRef::Path(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| AuditError::Io(path.clone(), e)),
        }
    }
}

/// Findings for one page.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub page: PageRef,
    pub findings: Vec<Finding>,
}

/// Outcome of a full audit run.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub pages: Vec<PageResult>,
    pub threshold: usize,
}

impl AuditReport {
    pub fn total(&self) -> usize {
        self.pages.iter().map(|page| page.findings.len()).sum()
    }

    pub fn exceeds_threshold(&self) -> bool {
        self.total() > self.threshold
    }

    /// Finding counts per rule across all pages.
    pub fn by_rule(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for finding in self.pages.iter().flat_map(|page| &page.findings) {
            *counts.entry(finding.rule).or_insert(0) += 1;
        }
        counts
    }
}

/// Audit `pages` in order. Any fetch failure aborts the run.
pub async fn run_audit(
    pages: &[PageRef],
    fetcher: &dyn PageFetcher,
    scanner: &dyn A11yScanner,
    threshold: usize,
) -> Result<AuditReport, AuditError> {
    let mut results = Vec::with_capacity(pages.len());
    for page in pages {
        let html = fetcher.fetch(page).await?;
        let findings = scanner.scan(&html);
        tracing::debug!(page = %page.display(), findings = findings.len(), "scanned page");
        results.push(PageResult {
            page: page.clone(),
            findings,
        });
    }
    Ok(AuditReport {
        pages: results,
        threshold,
    })
}
