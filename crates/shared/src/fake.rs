//! In-memory `NewsApi` for unit tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::api::{Ack, ApiOutcome, NewsApi, NewsPage, NewsQuery, RefreshSummary};
use crate::models::{Draft, NewsItem, Stats, SystemStatus};

enum Reply<T> {
    Ready(Result<T>),
    Gated(oneshot::Receiver<T>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T> {
        match self {
            Reply::Ready(outcome) => outcome,
            Reply::Gated(rx) => Ok(rx.await?),
        }
    }
}

fn gate<T>(queue: &Mutex<VecDeque<Reply<T>>>) -> oneshot::Sender<T> {
    let (tx, rx) = oneshot::channel();
    queue.lock().unwrap().push_back(Reply::Gated(rx));
    tx
}

#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<&'static str>>,
    queries: Mutex<Vec<NewsQuery>>,
    news: Mutex<VecDeque<Reply<ApiOutcome<NewsPage>>>>,
    drafts: Mutex<HashMap<String, Draft>>,
    draft_failures: Mutex<VecDeque<String>>,
    saved: Mutex<Vec<(String, Draft)>>,
    save_replies: Mutex<VecDeque<ApiOutcome<Ack>>>,
    collect_replies: Mutex<VecDeque<Reply<ApiOutcome<Ack>>>>,
    refresh_replies: Mutex<VecDeque<Reply<ApiOutcome<RefreshSummary>>>>,
    status_replies: Mutex<VecDeque<Result<SystemStatus>>>,
    stats_replies: Mutex<VecDeque<ApiOutcome<Stats>>>,
}

pub(crate) fn item(id: &str, hotness: f64) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        headline: format!("Headline {}", id),
        source: "RBC".to_string(),
        category: "finance".to_string(),
        hotness,
        impact_level: "высокий".to_string(),
        why_now: "🔥 High priority".to_string(),
        entities: vec!["Sberbank".to_string()],
    }
}

pub(crate) fn page(items: Vec<NewsItem>) -> ApiOutcome<NewsPage> {
    ApiOutcome::Success(NewsPage {
        news: items,
        sorting: None,
    })
}

impl FakeApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    pub(crate) fn calls_to(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub(crate) fn news_queries(&self) -> Vec<NewsQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub(crate) fn reply_news(&self, outcome: ApiOutcome<NewsPage>) {
        self.news.lock().unwrap().push_back(Reply::Ready(Ok(outcome)));
    }

    pub(crate) fn fail_news(&self, message: &str) {
        self.news
            .lock()
            .unwrap()
            .push_back(Reply::Ready(Err(anyhow::anyhow!(message.to_string()))));
    }

    /// The next news request waits until the returned sender fires.
    pub(crate) fn gate_news(&self) -> oneshot::Sender<ApiOutcome<NewsPage>> {
        gate(&self.news)
    }

    pub(crate) fn put_draft(&self, news_id: &str, draft: Draft) {
        self.drafts
            .lock()
            .unwrap()
            .insert(news_id.to_string(), draft);
    }

    pub(crate) fn fail_next_draft(&self, message: &str) {
        self.draft_failures
            .lock()
            .unwrap()
            .push_back(message.to_string());
    }

    pub(crate) fn saved_drafts(&self) -> Vec<(String, Draft)> {
        self.saved.lock().unwrap().clone()
    }

    pub(crate) fn reply_save(&self, outcome: ApiOutcome<Ack>) {
        self.save_replies.lock().unwrap().push_back(outcome);
    }

    pub(crate) fn reply_collect(&self, outcome: Result<ApiOutcome<Ack>>) {
        self.collect_replies
            .lock()
            .unwrap()
            .push_back(Reply::Ready(outcome));
    }

    pub(crate) fn gate_collect(&self) -> oneshot::Sender<ApiOutcome<Ack>> {
        gate(&self.collect_replies)
    }

    pub(crate) fn reply_refresh(&self, outcome: ApiOutcome<RefreshSummary>) {
        self.refresh_replies
            .lock()
            .unwrap()
            .push_back(Reply::Ready(Ok(outcome)));
    }

    pub(crate) fn gate_refresh(&self) -> oneshot::Sender<ApiOutcome<RefreshSummary>> {
        gate(&self.refresh_replies)
    }

    pub(crate) fn reply_status(&self, outcome: Result<SystemStatus>) {
        self.status_replies.lock().unwrap().push_back(outcome);
    }

    pub(crate) fn reply_stats(&self, outcome: ApiOutcome<Stats>) {
        self.stats_replies.lock().unwrap().push_back(outcome);
    }
}

#[async_trait]
impl NewsApi for FakeApi {
    async fn fetch_news(&self, query: &NewsQuery) -> Result<ApiOutcome<NewsPage>> {
        self.record("fetch_news");
        self.queries.lock().unwrap().push(*query);
        let reply = self.news.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Ok(ApiOutcome::Empty { message: None }),
        }
    }

    async fn fetch_draft(&self, news_id: &str) -> Result<Draft> {
        self.record("fetch_draft");
        if let Some(message) = self.draft_failures.lock().unwrap().pop_front() {
            anyhow::bail!(message);
        }
        Ok(self
            .drafts
            .lock()
            .unwrap()
            .get(news_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_draft(&self, news_id: &str, draft: &Draft) -> Result<ApiOutcome<Ack>> {
        self.record("save_draft");
        let reply = self.save_replies.lock().unwrap().pop_front();
        let outcome = reply.unwrap_or(ApiOutcome::Success(Ack::default()));
        if matches!(outcome, ApiOutcome::Success(_)) {
            self.saved
                .lock()
                .unwrap()
                .push((news_id.to_string(), draft.clone()));
        }
        Ok(outcome)
    }

    async fn collect_now(&self) -> Result<ApiOutcome<Ack>> {
        self.record("collect_now");
        let reply = self.collect_replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Ok(ApiOutcome::Success(Ack::default())),
        }
    }

    async fn refresh(&self) -> Result<ApiOutcome<RefreshSummary>> {
        self.record("refresh");
        let reply = self.refresh_replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Ok(ApiOutcome::Success(RefreshSummary::default())),
        }
    }

    async fn system_status(&self) -> Result<SystemStatus> {
        self.record("system_status");
        let reply = self.status_replies.lock().unwrap().pop_front();
        reply.unwrap_or(Ok(SystemStatus::Operational))
    }

    async fn stats(&self) -> Result<ApiOutcome<Stats>> {
        self.record("stats");
        let reply = self.stats_replies.lock().unwrap().pop_front();
        Ok(reply.unwrap_or(ApiOutcome::Success(Stats::default())))
    }
}
