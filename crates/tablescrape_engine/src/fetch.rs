use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tablescrape_core::FetchResult;
use tablescrape_logging::{scrape_debug, scrape_info, scrape_warn};
use url::Url;

use crate::decode::decode_html;
use crate::tables::{HtmlTableExtractor, TableExtractor};
use crate::{FailureKind, FetchError, FetchedPage};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 20 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            user_agent: concat!("tablescrape/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Retrieves the raw bytes behind a URL. One attempt, no retries.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, redirect_counter: Arc<AtomicUsize>) -> Result<reqwest::Client, FetchError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .user_agent(self.settings.user_agent.clone())
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }

    async fn fetch_http(&self, url: Url) -> Result<FetchedPage, FetchError> {
        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(redirect_counter.clone())?;

        let response = client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        scrape_debug!(
            "Downloaded {} bytes from {} ({} redirects)",
            bytes.len(),
            final_url,
            redirect_counter.load(Ordering::Relaxed)
        );
        Ok(FetchedPage {
            bytes,
            final_url,
            content_type,
        })
    }

    fn fetch_file(&self, url: Url) -> Result<FetchedPage, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::new(FailureKind::InvalidUrl, format!("not a local path: {url}")))?;
        let len = std::fs::metadata(&path)
            .map_err(|err| FetchError::new(FailureKind::LocalFile, err.to_string()))?
            .len();
        if len > self.settings.max_bytes {
            return Err(self.too_large(len));
        }
        let bytes = std::fs::read(&path)
            .map_err(|err| FetchError::new(FailureKind::LocalFile, err.to_string()))?;
        Ok(FetchedPage {
            bytes,
            final_url: url.to_string(),
            content_type: None,
        })
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed =
            Url::parse(url).map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => self.fetch_http(parsed).await,
            "file" => self.fetch_file(parsed),
            other => Err(FetchError::new(
                FailureKind::UnsupportedScheme(other.to_string()),
                format!("cannot fetch {url}"),
            )),
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

/// Retrieves a page and extracts its tables.
pub struct TableFetcher<F = ReqwestFetcher, X = HtmlTableExtractor> {
    pages: F,
    extractor: X,
}

impl TableFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self::with_parts(ReqwestFetcher::new(settings), HtmlTableExtractor)
    }
}

impl<F: PageFetcher, X: TableExtractor> TableFetcher<F, X> {
    pub fn with_parts(pages: F, extractor: X) -> Self {
        Self { pages, extractor }
    }

    pub async fn fetch_async(&self, url: &str) -> Result<FetchResult, FetchError> {
        scrape_info!("Fetching tables from {}", url);
        let page = self.pages.fetch_page(url).await.inspect_err(|err| {
            scrape_warn!("Fetch of {} failed: {}", url, err);
        })?;
        let decoded = decode_html(&page.bytes, page.content_type.as_deref())
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        let tables = self.extractor.extract(&decoded.html);
        scrape_info!(
            "Found {} table(s) at {} (encoding {})",
            tables.len(),
            page.final_url,
            decoded.encoding_label
        );
        Ok(tables)
    }

    /// Blocking fetch on a private single-threaded runtime.
    ///
    /// Must not be called from inside an async runtime; run it on a plain
    /// thread such as the one `run_background` provides.
    pub fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| FetchError::new(FailureKind::Runtime, err.to_string()))?;
        runtime.block_on(self.fetch_async(url))
    }
}

/// `fetch(url)` with default settings.
pub fn fetch_tables(url: &str) -> Result<FetchResult, FetchError> {
    TableFetcher::new(FetchSettings::default()).fetch(url)
}
