use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A news item as served by `/api/news`. Read-only on the client side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub headline: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub hotness: f64,
    #[serde(default)]
    pub impact_level: String,
    #[serde(default)]
    pub why_now: String,
    #[serde(default)]
    pub entities: Vec<String>,
}

impl NewsItem {
    pub fn priority(&self) -> Priority {
        Priority::from_hotness(self.hotness)
    }

    pub fn impact(&self) -> ImpactLevel {
        ImpactLevel::from_label(&self.impact_level)
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "news id must be a string or number, got {}",
            other
        ))),
    }
}

/// Editable narrative fields for a news item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    pub title: String,
    pub lead: String,
    pub bullets: Vec<String>,
    pub quote: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityStats {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

/// Server-side view of the active sort and filter. Rendered as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingInfo {
    pub current_sort: String,
    pub current_priority: String,
    pub priority_stats: PriorityStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_articles: u64,
    #[serde(default)]
    pub last_24h: u64,
    #[serde(default, alias = "sources_count")]
    pub total_sources: u64,
    #[serde(default)]
    pub initial_collection: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Priority bucket derived from hotness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn from_hotness(hotness: f64) -> Self {
        if hotness > 0.7 {
            Priority::High
        } else if hotness > 0.4 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Priority::High => "🔥",
            Priority::Medium => "📈",
            Priority::Low => "📊",
        }
    }
}

/// Impact label assigned by the server. The backend emits Russian labels;
/// English ones are accepted too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
    Other(String),
}

impl ImpactLevel {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high" | "высокий" => ImpactLevel::High,
            "medium" | "средний" => ImpactLevel::Medium,
            "low" | "низкий" | "базовый" => ImpactLevel::Low,
            _ => ImpactLevel::Other(label.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Hotness,
    DateNew,
    DateOld,
    Source,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Hotness => "hotness",
            SortKey::DateNew => "date_new",
            SortKey::DateOld => "date_old",
            SortKey::Source => "source",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Hotness => "By importance",
            SortKey::DateNew => "By date (newest)",
            SortKey::DateOld => "By date (oldest)",
            SortKey::Source => "By source",
        }
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hotness" => Ok(SortKey::Hotness),
            "date_new" => Ok(SortKey::DateNew),
            "date_old" => Ok(SortKey::DateOld),
            "source" => Ok(SortKey::Source),
            _ => anyhow::bail!(
                "Invalid sort: {}. Use 'hotness', 'date_new', 'date_old' or 'source'",
                s
            ),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl PriorityFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityFilter::All => "all",
            PriorityFilter::High => "high",
            PriorityFilter::Medium => "medium",
            PriorityFilter::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityFilter::All => "All",
            PriorityFilter::High => "High",
            PriorityFilter::Medium => "Medium",
            PriorityFilter::Low => "Low",
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(PriorityFilter::All),
            "high" => Ok(PriorityFilter::High),
            "medium" => Ok(PriorityFilter::Medium),
            "low" => Ok(PriorityFilter::Low),
            _ => anyhow::bail!(
                "Invalid priority: {}. Use 'all', 'high', 'medium' or 'low'",
                s
            ),
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label for a sort value reported by the server; unknown values pass through.
pub fn sort_label(raw: &str) -> String {
    raw.parse::<SortKey>()
        .map(|key| key.label().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Label for a priority value reported by the server; unknown values pass through.
pub fn priority_label(raw: &str) -> String {
    raw.parse::<PriorityFilter>()
        .map(|filter| filter.label().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Backend status as shown by the status indicator.
///
/// `Initializing -> Operational <-> Collecting`, with `Error` reachable from
/// anywhere. It is a display label only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SystemStatus {
    #[default]
    Unknown,
    Initializing,
    Operational,
    Collecting,
    Error,
}

impl SystemStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "operational" => SystemStatus::Operational,
            "collecting" => SystemStatus::Collecting,
            "initializing" => SystemStatus::Initializing,
            "error" => SystemStatus::Error,
            _ => SystemStatus::Unknown,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            SystemStatus::Operational => "status-indicator active",
            SystemStatus::Collecting => "status-indicator collecting",
            SystemStatus::Initializing => "status-indicator initializing",
            SystemStatus::Error => "status-indicator error",
            SystemStatus::Unknown => "status-indicator",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SystemStatus::Operational => "✓ System active",
            SystemStatus::Collecting => "🔄 Collecting news...",
            SystemStatus::Initializing => "⚙️ Initializing...",
            SystemStatus::Error => "❌ System error",
            SystemStatus::Unknown => "⚡ Loading...",
        }
    }
}
