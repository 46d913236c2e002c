// Public modules
pub mod api;
pub mod bindings;
pub mod config;
pub mod editor;
pub mod feed;
pub mod models;
pub mod notify;
pub mod render;

#[cfg(test)]
mod fake;

// Re-export commonly used types
pub use api::{ApiOutcome, HttpNewsApi, NewsApi};
pub use bindings::{Key, Role, UiEvent};
pub use config::Config;
pub use editor::{Confirm, DraftEditor, DraftField, Effect};
pub use feed::{FeedController, FeedView, LoadOutcome, PollingHandle};
pub use models::{Draft, NewsItem, PriorityFilter, SortKey, SystemStatus};
pub use notify::{Notification, NotificationKind};
