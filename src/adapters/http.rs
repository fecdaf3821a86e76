use crate::core::{DocumentDirectory, DocumentRef, DocumentTextProvider};
use crate::utils::error::{InclusionError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SOURCE_URL: &str =
    "https://www.bipt.be/consumenten/radiofrequenties/professioneel-gebruik/micro-s";
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; BIPT-WWB-Server/1.0; +https://www.bipt.be/)";

const LISTING_TIMEOUT: Duration = Duration::from_secs(30);
const DOCUMENT_TIMEOUT: Duration = Duration::from_secs(60);

static TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<table[^>]*class\s*=\s*["'][^"']*\btable\b[^"']*["'][^>]*>(.*?)</table>"#)
        .expect("valid table regex")
});
static TBODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tbody\b[^>]*>(.*?)</tbody>").expect("valid tbody regex"));
static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("valid row regex"));
static TH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<th\b[^>]*>(.*?)</th>").expect("valid th regex"));
static TD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").expect("valid td regex"));
static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*\bhref\s*=\s*["']([^"']+)["']"#).expect("valid href regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static DOC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/micro/files/(?P<code>[A-Z]+)-(?P<lang>[A-Z]{2})-(?P<yy>\d{2})-(?P<q>[1-4])\.pdf$")
        .expect("valid document regex")
});

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn cell_text(html: &str) -> String {
    let text = decode_entities(&TAG_RE.replace_all(html, " "));
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 解析文件連結 `<CODE>-<LANG>-<YY>-<Q>.pdf`
pub fn parse_document_link(zone_name: &str, href: &Url) -> Option<DocumentRef> {
    if !matches!(href.scheme(), "http" | "https") {
        return None;
    }
    let caps = DOC_RE.captures(href.path())?;
    Some(DocumentRef {
        zone_name: zone_name.to_string(),
        code: caps["code"].to_uppercase(),
        lang: caps["lang"].to_uppercase(),
        year_suffix: caps["yy"].parse().ok()?,
        quarter: caps["q"].parse().ok()?,
        locator: href.to_string(),
    })
}

/// 從區域文件表格取出指定語言的所有文件
pub fn parse_zone_documents(html: &str, page_url: &Url, lang: &str) -> Result<Vec<DocumentRef>> {
    let table = TABLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or_else(|| InclusionError::SourceUnavailable {
            message: "zone document table not found".to_string(),
        })?;

    // 只看 tbody 裡的資料列，表頭不算
    let body = TBODY_RE
        .captures(table.as_str())
        .and_then(|c| c.get(1))
        .map_or("", |m| m.as_str());

    let mut documents = Vec::new();
    for row in ROW_RE.captures_iter(body) {
        let row = &row[1];
        let (Some(th), Some(td)) = (TH_RE.captures(row), TD_RE.captures(row)) else {
            continue;
        };
        let zone_name = cell_text(&th[1]);
        if zone_name.is_empty() {
            continue;
        }

        for href in HREF_RE.captures_iter(&td[1]) {
            let raw = decode_entities(href[1].trim());
            let Ok(url) = page_url.join(&raw) else {
                continue;
            };
            match parse_document_link(&zone_name, &url) {
                Some(doc) if doc.lang.eq_ignore_ascii_case(lang) => documents.push(doc),
                _ => {}
            }
        }
    }
    Ok(documents)
}

/// 法規機關的 micro-s 頁面
pub struct BiptDirectory {
    client: Client,
    page_url: Url,
    lang: String,
}

impl BiptDirectory {
    pub fn new(client: Client, page_url: &str, lang: &str) -> Result<Self> {
        let page_url = Url::parse(page_url).map_err(|e| InclusionError::InvalidConfigValueError {
            field: "source_url".to_string(),
            value: page_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            page_url,
            lang: lang.to_uppercase(),
        })
    }

    async fn fetch_listing(&self) -> std::result::Result<String, reqwest::Error> {
        self.client
            .get(self.page_url.clone())
            .timeout(LISTING_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl DocumentDirectory for BiptDirectory {
    async fn list_documents(&self) -> Result<Vec<DocumentRef>> {
        tracing::debug!("Fetching zone listing from {}", self.page_url);
        let html = self
            .fetch_listing()
            .await
            .map_err(|e| InclusionError::SourceUnavailable {
                message: e.to_string(),
            })?;

        let documents = parse_zone_documents(&html, &self.page_url, &self.lang)?;
        tracing::info!(
            "📡 Found {} {} document link(s) on {}",
            documents.len(),
            self.lang,
            self.page_url
        );
        Ok(documents)
    }
}

/// 把下載的文件內容轉成文字
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

const PDF_MAGIC: &[u8] = b"%PDF";

fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// 內容已經是純文字時使用；遇到 PDF 直接回報錯誤
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        if is_pdf(bytes) {
            return Err(InclusionError::TextExtractionFailed {
                message: "document is a PDF but no PDF text extractor is enabled".to_string(),
            });
        }
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// PDF 交給 pdf-extract，其他內容視為純文字
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        if !is_pdf(bytes) {
            return PlainTextExtractor.extract_text(bytes);
        }
        // pdf-extract 遇到損壞的檔案可能 panic
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(InclusionError::TextExtractionFailed {
                message: e.to_string(),
            }),
            Err(_) => Err(InclusionError::TextExtractionFailed {
                message: "PDF parser panicked on malformed document".to_string(),
            }),
        }
    }
}

/// 有 `pdf` feature 時用 [`PdfTextExtractor`]
#[cfg(feature = "pdf")]
pub fn default_extractor() -> Box<dyn TextExtractor> {
    Box::new(PdfTextExtractor)
}

#[cfg(not(feature = "pdf"))]
pub fn default_extractor() -> Box<dyn TextExtractor> {
    Box::new(PlainTextExtractor)
}

pub struct HttpTextProvider {
    client: Client,
    extractor: Box<dyn TextExtractor>,
}

impl HttpTextProvider {
    pub fn new(client: Client) -> Self {
        Self::with_extractor(client, default_extractor())
    }

    pub fn with_extractor(client: Client, extractor: Box<dyn TextExtractor>) -> Self {
        Self { client, extractor }
    }
}

#[async_trait]
impl DocumentTextProvider for HttpTextProvider {
    async fn fetch_text(&self, document: &DocumentRef) -> Result<String> {
        let failed = |e: reqwest::Error| InclusionError::DocumentFetchFailed {
            zone: document.zone_name.clone(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(&document.locator)
            .timeout(DOCUMENT_TIMEOUT)
            .send()
            .await
            .map_err(failed)?
            .error_for_status()
            .map_err(failed)?;
        let bytes = response.bytes().await.map_err(failed)?;

        tracing::debug!("Downloaded {} ({} bytes)", document.file_stem(), bytes.len());
        self.extractor
            .extract_text(&bytes)
            .map_err(|e| InclusionError::DocumentFetchFailed {
                zone: document.zone_name.clone(),
                message: e.to_string(),
            })
    }
}

pub fn build_client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}
