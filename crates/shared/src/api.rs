use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::models::{Draft, NewsItem, PriorityFilter, SortKey, SortingInfo, Stats, SystemStatus};

/// Decoded result of a backend call that reports its own status.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success(T),
    Empty { message: Option<String> },
    Failure { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsQuery {
    pub hours: u32,
    pub limit: u32,
    pub sort: SortKey,
    pub priority: PriorityFilter,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsPage {
    pub news: Vec<NewsItem>,
    pub sorting: Option<SortingInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub news_count: u64,
}

/// The backend surface the dashboard consumes.
#[async_trait]
pub trait NewsApi: Send + Sync {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<ApiOutcome<NewsPage>>;

    /// Absent fields in the stored draft come back as empty values.
    async fn fetch_draft(&self, news_id: &str) -> Result<Draft>;

    async fn save_draft(&self, news_id: &str, draft: &Draft) -> Result<ApiOutcome<Ack>>;

    async fn collect_now(&self) -> Result<ApiOutcome<Ack>>;

    async fn refresh(&self) -> Result<ApiOutcome<RefreshSummary>>;

    async fn system_status(&self) -> Result<SystemStatus>;

    async fn stats(&self) -> Result<ApiOutcome<Stats>>;
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewsEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    news: Vec<NewsItem>,
    #[serde(default)]
    sorting: Option<SortingInfo>,
}

impl NewsEnvelope {
    pub(crate) fn into_outcome(self) -> ApiOutcome<NewsPage> {
        match self.status.as_deref() {
            Some("error") => ApiOutcome::Failure {
                message: self
                    .message
                    .unwrap_or_else(|| "Failed to load news".to_string()),
            },
            Some("no_data") => ApiOutcome::Empty {
                message: self.message,
            },
            _ if self.news.is_empty() => ApiOutcome::Empty {
                message: self.message,
            },
            _ => ApiOutcome::Success(NewsPage {
                news: self.news,
                sorting: self.sorting,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    news_count: Option<u64>,
}

impl ActionEnvelope {
    pub(crate) fn into_ack(self, failure: &str) -> ApiOutcome<Ack> {
        match self.status.as_deref() {
            Some("success") => ApiOutcome::Success(Ack {
                message: self.message,
            }),
            _ => ApiOutcome::Failure {
                message: self.message.unwrap_or_else(|| failure.to_string()),
            },
        }
    }

    pub(crate) fn into_refresh(self) -> ApiOutcome<RefreshSummary> {
        match self.status.as_deref() {
            Some("success") => ApiOutcome::Success(RefreshSummary {
                news_count: self.news_count.unwrap_or(0),
            }),
            Some("info") => ApiOutcome::Empty {
                message: self.message,
            },
            _ => ApiOutcome::Failure {
                message: self.message.unwrap_or_else(|| "Refresh failed".to_string()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    status: String,
}

pub(crate) fn stats_outcome(stats: Stats) -> ApiOutcome<Stats> {
    match &stats.error {
        Some(message) => ApiOutcome::Failure {
            message: message.clone(),
        },
        None => ApiOutcome::Success(stats),
    }
}

/// `NewsApi` over HTTP with reqwest.
pub struct HttpNewsApi {
    client: Client,
    base_url: Url,
}

impl HttpNewsApi {
    pub fn new(mut base_url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; RadarDashboard/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        // Keep any path prefix when joining endpoint paths
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path: {}", path))
    }

    fn news_url(&self, query: &NewsQuery) -> Result<Url> {
        self.endpoint(&format!(
            "api/news?hours={}&limit={}&sort={}&priority={}",
            query.hours,
            query.limit,
            urlencoding::encode(query.sort.as_str()),
            urlencoding::encode(query.priority.as_str())
        ))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", what))?;

        read_json(response, what).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: Option<&Draft>,
        what: &str,
    ) -> Result<T> {
        debug!(%url, "POST");
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", what))?;

        read_json(response, what).await
    }
}

/// Decodes the body even on error statuses; the backend reports some
/// failures as JSON alongside a 5xx.
async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    match serde_json::from_str::<T>(&body) {
        Ok(value) => Ok(value),
        Err(e) if status.is_success() => {
            Err(e).with_context(|| format!("Failed to parse {} response", what))
        }
        Err(_) => anyhow::bail!("{} returned error: {} - {}", what, status, body),
    }
}

#[async_trait]
impl NewsApi for HttpNewsApi {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<ApiOutcome<NewsPage>> {
        let envelope: NewsEnvelope = self.get_json(self.news_url(query)?, "news").await?;
        Ok(envelope.into_outcome())
    }

    async fn fetch_draft(&self, news_id: &str) -> Result<Draft> {
        let url = self.endpoint(&format!("api/get-draft/{}", urlencoding::encode(news_id)))?;
        self.get_json(url, "draft").await
    }

    async fn save_draft(&self, news_id: &str, draft: &Draft) -> Result<ApiOutcome<Ack>> {
        let url = self.endpoint(&format!("api/save-draft/{}", urlencoding::encode(news_id)))?;
        let envelope: ActionEnvelope = self.post_json(url, Some(draft), "save-draft").await?;
        Ok(envelope.into_ack("Failed to save draft"))
    }

    async fn collect_now(&self) -> Result<ApiOutcome<Ack>> {
        let url = self.endpoint("api/collect-now")?;
        let envelope: ActionEnvelope = self.post_json(url, None, "collect-now").await?;
        Ok(envelope.into_ack("Failed to start collection"))
    }

    async fn refresh(&self) -> Result<ApiOutcome<RefreshSummary>> {
        let url = self.endpoint("api/refresh")?;
        let envelope: ActionEnvelope = self.post_json(url, None, "refresh").await?;
        Ok(envelope.into_refresh())
    }

    async fn system_status(&self) -> Result<SystemStatus> {
        let url = self.endpoint("api/system-status")?;
        let envelope: StatusEnvelope = self.get_json(url, "system status").await?;
        Ok(SystemStatus::from_wire(&envelope.status))
    }

    async fn stats(&self) -> Result<ApiOutcome<Stats>> {
        let url = self.endpoint("api/stats")?;
        let stats: Stats = self.get_json(url, "stats").await?;
        Ok(stats_outcome(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_news(json: &str) -> ApiOutcome<NewsPage> {
        serde_json::from_str::<NewsEnvelope>(json)
            .unwrap()
            .into_outcome()
    }

    #[test]
    fn test_news_success_keeps_sorting() {
        let outcome = decode_news(
            r#"{
                "status": "success",
                "news": [{"id": "a1", "headline": "Rates hold", "hotness": 0.8}],
                "sorting": {
                    "current_sort": "hotness",
                    "current_priority": "all",
                    "priority_stats": {"high": 1, "medium": 0, "low": 0}
                }
            }"#,
        );

        match outcome {
            ApiOutcome::Success(page) => {
                assert_eq!(page.news.len(), 1);
                assert_eq!(page.sorting.unwrap().priority_stats.high, 1);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_news_without_status_is_success() {
        let outcome = decode_news(r#"{"news": [{"id": "a1", "headline": "No status"}]}"#);
        assert!(matches!(outcome, ApiOutcome::Success(_)));
    }

    #[test]
    fn test_news_no_data_is_empty() {
        let outcome = decode_news(r#"{"status": "no_data", "news": [], "message": "Collecting..."}"#);
        assert_eq!(
            outcome,
            ApiOutcome::Empty {
                message: Some("Collecting...".to_string())
            }
        );
    }

    #[test]
    fn test_news_error_uses_default_message() {
        let outcome = decode_news(r#"{"status": "error", "news": []}"#);
        assert_eq!(
            outcome,
            ApiOutcome::Failure {
                message: "Failed to load news".to_string()
            }
        );
    }

    #[test]
    fn test_save_requires_explicit_success() {
        let envelope: ActionEnvelope = serde_json::from_str(r#"{"message": "odd"}"#).unwrap();
        assert_eq!(
            envelope.into_ack("Failed to save draft"),
            ApiOutcome::Failure {
                message: "odd".to_string()
            }
        );
    }

    #[test]
    fn test_refresh_info_is_empty() {
        let envelope: ActionEnvelope =
            serde_json::from_str(r#"{"status": "info", "message": "Nothing new"}"#).unwrap();
        assert_eq!(
            envelope.into_refresh(),
            ApiOutcome::Empty {
                message: Some("Nothing new".to_string())
            }
        );
    }

    #[test]
    fn test_refresh_success_defaults_count() {
        let envelope: ActionEnvelope = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert_eq!(
            envelope.into_refresh(),
            ApiOutcome::Success(RefreshSummary { news_count: 0 })
        );
    }

    #[test]
    fn test_stats_error_is_failure() {
        let stats: Stats = serde_json::from_str(r#"{"error": "db locked"}"#).unwrap();
        assert_eq!(
            stats_outcome(stats),
            ApiOutcome::Failure {
                message: "db locked".to_string()
            }
        );
    }

    #[test]
    fn test_news_url_encodes_query() {
        let api = HttpNewsApi::new(Url::parse("http://localhost:5000").unwrap()).unwrap();
        let url = api
            .news_url(&NewsQuery {
                hours: 24,
                limit: 20,
                sort: SortKey::DateNew,
                priority: PriorityFilter::High,
            })
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/news?hours=24&limit=20&sort=date_new&priority=high"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = HttpNewsApi::new(Url::parse("http://localhost/radar").unwrap()).unwrap();
        let url = api.endpoint("api/stats").unwrap();
        assert_eq!(url.as_str(), "http://localhost/radar/api/stats");
    }
}
