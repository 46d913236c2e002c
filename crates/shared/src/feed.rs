use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::api::{ApiOutcome, NewsApi, NewsPage, NewsQuery};
use crate::config::Config;
use crate::models::{
    ImpactLevel, NewsItem, PriorityFilter, SortKey, SortingInfo, Stats, SystemStatus,
};
use crate::notify::NotificationCenter;

const NOTIFICATION_TTL: Duration = Duration::from_secs(5);
const CONNECTION_ERROR: &str = "Could not connect to the server";

/// A trigger control that is disabled while its request is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub label: String,
    pub disabled: bool,
}

impl ButtonState {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }

    /// Disables the control and shows `busy_label`, returning the idle label.
    /// `None` while a request is already in flight.
    fn begin(&mut self, busy_label: &str) -> Option<String> {
        if self.disabled {
            return None;
        }
        self.disabled = true;
        Some(std::mem::replace(&mut self.label, busy_label.to_string()))
    }

    fn finish(&mut self, label: String) {
        self.disabled = false;
        self.label = label;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedCounters {
    pub total: usize,
    pub high_priority: usize,
    pub finance: usize,
}

impl FeedCounters {
    pub fn from_items(items: &[NewsItem]) -> Self {
        Self {
            total: items.len(),
            high_priority: items
                .iter()
                .filter(|n| n.impact() == ImpactLevel::High)
                .count(),
            finance: items.iter().filter(|n| n.category == "finance").count(),
        }
    }
}

/// Everything the news page displays, owned by one controller.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub news: Vec<NewsItem>,
    pub sort: SortKey,
    pub priority: PriorityFilter,
    pub sorting: Option<SortingInfo>,
    pub counters: FeedCounters,
    pub status: SystemStatus,
    pub stats: Option<Stats>,
    pub loading: bool,
    pub last_updated: Option<DateTime<Local>>,
    pub update_count: u32,
    pub collect_button: ButtonState,
    pub refresh_button: ButtonState,
    pub notifications: NotificationCenter,
}

impl Default for FeedView {
    fn default() -> Self {
        Self {
            news: Vec::new(),
            sort: SortKey::default(),
            priority: PriorityFilter::default(),
            sorting: None,
            counters: FeedCounters::default(),
            status: SystemStatus::default(),
            stats: None,
            loading: false,
            last_updated: None,
            update_count: 0,
            collect_button: ButtonState::new("🚀 Collect now"),
            refresh_button: ButtonState::new("🔄 Refresh"),
            notifications: NotificationCenter::new(NOTIFICATION_TTL, true),
        }
    }
}

impl FeedView {
    fn show_page(&mut self, page: NewsPage) {
        self.counters = FeedCounters::from_items(&page.news);
        self.news = page.news;
        // The server omits sorting info on empty results; keep the last one
        if page.sorting.is_some() {
            self.sorting = page.sorting;
        }
        self.last_updated = Some(Local::now());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Empty,
    Failed,
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
}

/// Stops the polling timers when stopped or dropped.
pub struct PollingHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl PollingHandle {
    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_finished())
    }

    pub fn stop(self) {}
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[derive(Clone)]
pub struct FeedController {
    api: Arc<dyn NewsApi>,
    config: Config,
    view: Arc<Mutex<FeedView>>,
    latest_load: Arc<AtomicU64>,
    scheduled: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl FeedController {
    pub fn new(api: Arc<dyn NewsApi>, config: Config) -> Self {
        Self {
            api,
            config,
            view: Arc::new(Mutex::new(FeedView::default())),
            latest_load: Arc::new(AtomicU64::new(0)),
            scheduled: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn snapshot(&self) -> FeedView {
        self.view.lock().await.clone()
    }

    /// Page bootstrap: status, list, stats.
    pub async fn initialize(&self) -> LoadOutcome {
        self.check_system_status().await;
        let outcome = self.load_news().await;
        self.load_stats().await;
        outcome
    }

    /// Sets the sort and filter used by the next load.
    pub async fn select(&self, sort: SortKey, priority: PriorityFilter) {
        let mut view = self.view.lock().await;
        view.sort = sort;
        view.priority = priority;
    }

    pub async fn set_sort(&self, sort: SortKey) -> LoadOutcome {
        self.view.lock().await.sort = sort;
        self.load_news().await
    }

    pub async fn set_priority(&self, priority: PriorityFilter) -> LoadOutcome {
        self.view.lock().await.priority = priority;
        self.load_news().await
    }

    pub async fn load_news(&self) -> LoadOutcome {
        let (query, ticket) = {
            let mut view = self.view.lock().await;
            view.loading = true;
            let ticket = self.latest_load.fetch_add(1, Ordering::SeqCst) + 1;
            let query = NewsQuery {
                hours: self.config.news_hours,
                limit: self.config.news_limit,
                sort: view.sort,
                priority: view.priority,
            };
            (query, ticket)
        };
        debug!(ticket, sort = %query.sort, priority = %query.priority, "Loading news");

        let result = self.api.fetch_news(&query).await;

        let mut view = self.view.lock().await;
        if self.latest_load.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Discarding superseded news response");
            return LoadOutcome::Superseded;
        }
        view.loading = false;

        match result {
            Ok(ApiOutcome::Success(page)) => {
                let count = page.news.len();
                view.show_page(page);
                LoadOutcome::Loaded(count)
            }
            Ok(ApiOutcome::Empty { message }) => {
                view.show_page(NewsPage::default());
                if let Some(message) = message {
                    view.notifications.info(message);
                }
                LoadOutcome::Empty
            }
            Ok(ApiOutcome::Failure { message }) => {
                warn!("News request failed: {}", message);
                view.notifications.error(message);
                LoadOutcome::Failed
            }
            Err(e) => {
                error!("Error loading news: {:#}", e);
                view.notifications.error(CONNECTION_ERROR);
                LoadOutcome::Failed
            }
        }
    }

    pub async fn load_stats(&self) {
        match self.api.stats().await {
            Ok(ApiOutcome::Success(stats)) => {
                self.view.lock().await.stats = Some(stats);
            }
            Ok(ApiOutcome::Failure { message }) => {
                warn!("Stats unavailable: {}", message);
            }
            Ok(ApiOutcome::Empty { .. }) => {}
            Err(e) => {
                error!("Error loading system stats: {:#}", e);
            }
        }
    }

    pub async fn check_system_status(&self) {
        let status = match self.api.system_status().await {
            Ok(status) => status,
            Err(e) => {
                error!("Error checking system status: {:#}", e);
                SystemStatus::Error
            }
        };
        self.view.lock().await.status = status;
    }

    /// Starts a backend collection job. Returns whether it was accepted.
    pub async fn collect_now(&self) -> bool {
        let Some(label) = self.view.lock().await.collect_button.begin("🔄 Collecting...") else {
            debug!("Collection request already in flight");
            return false;
        };

        let result = self.api.collect_now().await;

        let started = {
            let mut view = self.view.lock().await;
            let started = match result {
                Ok(ApiOutcome::Success(ack)) => {
                    view.notifications.success(
                        ack.message
                            .unwrap_or_else(|| "News collection started".to_string()),
                    );
                    true
                }
                Ok(ApiOutcome::Empty { message }) => {
                    view.notifications
                        .info(message.unwrap_or_else(|| "Nothing to collect".to_string()));
                    false
                }
                Ok(ApiOutcome::Failure { message }) => {
                    view.notifications.error(message);
                    false
                }
                Err(e) => {
                    error!("Error starting collection: {:#}", e);
                    view.notifications.error(CONNECTION_ERROR);
                    false
                }
            };
            view.collect_button.finish(label);
            started
        };

        if started {
            self.schedule_followup_reload().await;
        }
        started
    }

    async fn schedule_followup_reload(&self) {
        let controller = self.clone();
        let delay = self.config.collect_followup;
        info!("Reloading news in {:?} once collection completes", delay);

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.load_news().await;
            controller.load_stats().await;
        });

        let mut scheduled = self.scheduled.lock().await;
        scheduled.retain(|t| !t.is_finished());
        scheduled.push(task);
    }

    /// Asks the backend to refresh now and waits for it before reloading.
    /// Returns whether the refresh succeeded.
    pub async fn refresh_news(&self) -> bool {
        let Some(label) = self.view.lock().await.refresh_button.begin("🔍 Scanning...") else {
            debug!("Refresh request already in flight");
            return false;
        };

        let refreshed = match self.api.refresh().await {
            Ok(ApiOutcome::Success(summary)) => {
                self.view.lock().await.update_count += 1;
                self.load_news().await;
                self.load_stats().await;
                self.view
                    .lock()
                    .await
                    .notifications
                    .success(format!("Updated {} news items", summary.news_count));
                true
            }
            Ok(ApiOutcome::Empty { message }) => {
                self.view
                    .lock()
                    .await
                    .notifications
                    .info(message.unwrap_or_else(|| "No new items".to_string()));
                false
            }
            Ok(ApiOutcome::Failure { message }) => {
                self.view.lock().await.notifications.error(message);
                false
            }
            Err(e) => {
                error!("Error refreshing news: {:#}", e);
                self.view.lock().await.notifications.error(CONNECTION_ERROR);
                false
            }
        };

        self.view.lock().await.refresh_button.finish(label);
        refreshed
    }

    async fn poll_status(&self) {
        futures::join!(self.check_system_status(), self.load_stats());
    }

    /// Reloads when the list is empty, covering a first load that ran
    /// before the initial collection finished.
    pub async fn check_empty_feed(&self) -> Option<LoadOutcome> {
        let empty = self.view.lock().await.news.is_empty();
        if empty {
            Some(self.load_news().await)
        } else {
            None
        }
    }

    pub fn start_polling(&self) -> PollingHandle {
        let status_task = {
            let controller = self.clone();
            let period = self.config.status_interval;
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    controller.poll_status().await;
                }
            })
        };

        let empty_check_task = {
            let controller = self.clone();
            let period = self.config.empty_check_interval;
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    controller.check_empty_feed().await;
                }
            })
        };

        PollingHandle {
            tasks: vec![status_task, empty_check_task],
        }
    }

    /// Cancels follow-up reloads that have not fired yet.
    pub async fn teardown(&self) {
        for task in self.scheduled.lock().await.drain(..) {
            task.abort();
        }
    }
}
