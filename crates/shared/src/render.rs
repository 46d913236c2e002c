use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bindings::Role;
use crate::editor::{DraftField, EditorSession};
use crate::feed::{FeedCounters, FeedView};
use crate::models::{
    priority_label, sort_label, Draft, NewsItem, SortingInfo, Stats, SystemStatus,
};
use crate::notify::NotificationCenter;

const MAX_ENTITY_TAGS: usize = 4;

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Width of the hotness bar, in whole percent.
pub fn hotness_percent(hotness: f64) -> u32 {
    (hotness * 100.0).round().clamp(0.0, 100.0) as u32
}

pub fn news_card(item: &NewsItem) -> String {
    let priority = item.priority();
    let mut html = String::new();

    html.push_str(&format!(
        "<div class=\"news-card priority-{}\">\n",
        priority.as_str()
    ));
    html.push_str("  <div class=\"news-header\">\n");
    html.push_str(&format!(
        "    <span class=\"category-tag\">{}</span>\n",
        escape_html(&item.category)
    ));
    html.push_str(&format!(
        "    <span class=\"impact-badge impact-{}\">{} {} priority</span>\n",
        escape_html(&item.impact_level),
        priority.icon(),
        escape_html(&item.impact_level)
    ));
    html.push_str("  </div>\n");
    html.push_str(&format!(
        "  <div class=\"news-source\">📰 {}</div>\n",
        escape_html(&item.source)
    ));
    html.push_str("  <div class=\"hotness-indicator\">\n");
    html.push_str(&format!(
        "    <div class=\"hotness-bar\"><div class=\"hotness-fill\" style=\"width: {}%\"></div></div>\n",
        hotness_percent(item.hotness)
    ));
    html.push_str(&format!(
        "    <div class=\"hotness-score\">{:.2}</div>\n",
        item.hotness
    ));
    html.push_str("  </div>\n");
    html.push_str(&format!("  <h2>{}</h2>\n", escape_html(&item.headline)));
    html.push_str(&format!(
        "  <p class=\"why-now\">{}</p>\n",
        escape_html(&item.why_now)
    ));

    html.push_str("  <div class=\"entities-preview\">\n");
    for entity in item.entities.iter().take(MAX_ENTITY_TAGS) {
        html.push_str(&format!(
            "    <span class=\"entity-tag\">{}</span>\n",
            escape_html(entity)
        ));
    }
    if item.entities.len() > MAX_ENTITY_TAGS {
        html.push_str(&format!(
            "    <span class=\"entity-more\">+{}</span>\n",
            item.entities.len() - MAX_ENTITY_TAGS
        ));
    }
    html.push_str("  </div>\n");

    html.push_str("  <div class=\"news-actions\">\n");
    html.push_str(&format!(
        "    <a href=\"/news/{}\" class=\"btn btn-secondary\">Analysis &amp; draft →</a>\n",
        urlencoding::encode(&item.id)
    ));
    html.push_str("  </div>\n");
    html.push_str("</div>\n");
    html
}

pub fn empty_state() -> String {
    let mut html = String::new();
    html.push_str("<div class=\"no-news\">\n");
    html.push_str("  <h3>📭 No news yet</h3>\n");
    html.push_str("  <p>Try changing the filters or start a news collection.</p>\n");
    html.push_str("  <div class=\"no-news-actions\">\n");
    html.push_str(
        "    <button class=\"btn btn-primary\" data-action=\"collect-now\">🚀 Start collection</button>\n",
    );
    html.push_str(
        "    <button class=\"btn btn-secondary\" data-action=\"load-news\">🔄 Reload</button>\n",
    );
    html.push_str("  </div>\n");
    html.push_str("</div>\n");
    html
}

/// Contents of the news container: one card per item, or the empty state.
pub fn news_container(items: &[NewsItem]) -> String {
    if items.is_empty() {
        return empty_state();
    }
    items.iter().map(news_card).collect()
}

pub fn sorting_info(sorting: Option<&SortingInfo>) -> String {
    let Some(sorting) = sorting else {
        return String::new();
    };
    let stats = &sorting.priority_stats;

    let mut html = String::new();
    html.push_str("<div class=\"sorting-stats\">\n");
    html.push_str(&format!(
        "  <span>📊 Sort: {}</span>\n",
        escape_html(&sort_label(&sorting.current_sort))
    ));
    html.push_str(&format!(
        "  <span>🎯 Priority: {}</span>\n",
        escape_html(&priority_label(&sorting.current_priority))
    ));
    html.push_str("  <span class=\"priority-badges\">\n");
    html.push_str(&format!(
        "    <span class=\"priority-badge high\">🔥 {}</span>\n",
        stats.high
    ));
    html.push_str(&format!(
        "    <span class=\"priority-badge medium\">📈 {}</span>\n",
        stats.medium
    ));
    html.push_str(&format!(
        "    <span class=\"priority-badge low\">📊 {}</span>\n",
        stats.low
    ));
    html.push_str("  </span>\n");
    html.push_str("</div>\n");
    html
}

pub fn status_indicator(status: SystemStatus) -> String {
    format!(
        "<div id=\"system-status\" class=\"{}\"><span id=\"status-text\">{}</span></div>\n",
        status.css_class(),
        status.label()
    )
}

pub fn stats_panel(stats: Option<&Stats>, counters: &FeedCounters) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"stats-panel\">\n");

    if let Some(stats) = stats {
        html.push_str(&format!(
            "  <div class=\"stat\"><span id=\"total-articles\">{}</span> articles</div>\n",
            stats.total_articles
        ));
        html.push_str(&format!(
            "  <div class=\"stat\"><span id=\"last-24h\">{}</span> in the last 24h</div>\n",
            stats.last_24h
        ));
        html.push_str(&format!(
            "  <div class=\"stat\"><span id=\"sources-count\">{}</span> sources</div>\n",
            stats.total_sources
        ));
        if let Some(done) = stats.initial_collection {
            html.push_str(&format!(
                "  <div id=\"collection-status\">{}</div>\n",
                if done {
                    "✅ Auto-collection finished"
                } else {
                    "🔄 Auto-collection running..."
                }
            ));
        }
    }

    html.push_str(&format!(
        "  <div class=\"stat\"><span id=\"total-news\">{}</span> shown</div>\n",
        counters.total
    ));
    html.push_str(&format!(
        "  <div class=\"stat\"><span id=\"high-priority\">{}</span> high impact</div>\n",
        counters.high_priority
    ));
    html.push_str(&format!(
        "  <div class=\"stat\"><span id=\"finance-news\">{}</span> finance</div>\n",
        counters.finance
    ));
    html.push_str("</div>\n");
    html
}

pub fn notifications(center: &NotificationCenter, now: DateTime<Utc>) -> String {
    center
        .active(now)
        .map(|n| {
            format!(
                "<div class=\"notification notification-{}\"><span class=\"notification-text\">{}</span></div>\n",
                n.kind.as_str(),
                escape_html(&n.message)
            )
        })
        .collect()
}

pub fn draft_preview(draft: &Draft) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"preview-draft\">\n");
    html.push_str(&format!("  <h4>{}</h4>\n", or_placeholder(&draft.title, "Headline")));
    html.push_str(&format!(
        "  <p class=\"preview-lead\">{}</p>\n",
        or_placeholder(&draft.lead, "Lead paragraph...")
    ));
    html.push_str("  <ul class=\"preview-bullets\">\n");
    for bullet in &draft.bullets {
        html.push_str(&format!("    <li>{}</li>\n", escape_html(bullet)));
    }
    html.push_str("  </ul>\n");
    html.push_str(&format!(
        "  <blockquote class=\"preview-quote\">{}</blockquote>\n",
        or_placeholder(&draft.quote, "Quote...")
    ));
    html.push_str("</div>\n");
    html
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        escape_html(value)
    }
}

pub fn editor_modal(session: &EditorSession) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<div class=\"{}\" data-news-id=\"{}\">\n",
        Role::ModalBackdrop.css_class(),
        escape_html(&session.news_id)
    ));
    html.push_str("  <div class=\"editor-container\">\n");
    html.push_str("    <div class=\"editor-header\">\n");
    html.push_str("      <h2>✍️ Draft editor</h2>\n");
    html.push_str("      <div class=\"editor-actions\">\n");
    html.push_str(&format!(
        "        <button class=\"btn btn-secondary {}\">📝 Template</button>\n",
        Role::UseTemplateButton.css_class()
    ));
    html.push_str(&format!(
        "        <button class=\"btn btn-secondary {}\">❌ Cancel</button>\n",
        Role::CancelEditButton.css_class()
    ));
    html.push_str(&format!(
        "        <button class=\"btn btn-primary {}\">💾 Save</button>\n",
        Role::SaveDraftButton.css_class()
    ));
    html.push_str("      </div>\n");
    html.push_str("    </div>\n");

    html.push_str("    <div class=\"editor-content\">\n");
    for field in DraftField::ALL {
        html.push_str(&form_group(field, session.form.get(field)));
    }
    html.push_str("    </div>\n");

    html.push_str("    <div class=\"editor-preview\">\n");
    html.push_str("      <h3>📊 Preview:</h3>\n");
    html.push_str(&format!(
        "      <div class=\"preview-content\" id=\"draft-preview\">\n{}      </div>\n",
        session.preview_html
    ));
    html.push_str("    </div>\n");
    html.push_str("  </div>\n");
    html.push_str("</div>\n");
    html
}

fn form_group(field: DraftField, value: &str) -> String {
    let class = Role::DraftField.css_class();
    let (label, control) = match field {
        DraftField::Title => (
            "Headline:",
            format!(
                "<input type=\"text\" class=\"{}\" data-field=\"title\" placeholder=\"Enter a headline...\" value=\"{}\">",
                class,
                escape_html(value)
            ),
        ),
        DraftField::Lead => ("Lead paragraph:", textarea(class, field, 3, "Enter the opening paragraph...", value)),
        DraftField::Bullets => (
            "Key points (one per line):",
            textarea(class, field, 6, "Enter each point on a new line...", value),
        ),
        DraftField::Quote => ("Quote:", textarea(class, field, 2, "Enter a notable quote...", value)),
    };

    format!(
        "      <div class=\"form-group\">\n        <label>{}</label>\n        {}\n      </div>\n",
        label, control
    )
}

fn textarea(class: &str, field: DraftField, rows: u32, placeholder: &str, value: &str) -> String {
    format!(
        "<textarea class=\"{}\" data-field=\"{}\" rows=\"{}\" placeholder=\"{}\">{}</textarea>",
        class,
        field.as_str(),
        rows,
        placeholder,
        escape_html(value)
    )
}

/// Standalone HTML document with every dashboard region.
pub fn page(view: &FeedView, now: DateTime<Utc>) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str("  <title>RADAR News Dashboard</title>\n");
    html.push_str("  <style>\n");
    html.push_str("    body { font-family: Arial, sans-serif; max-width: 1100px; margin: 40px auto; padding: 0 20px; line-height: 1.5; }\n");
    html.push_str("    .news-card { padding: 16px; margin: 16px 0; border-radius: 6px; background-color: #f8f9fa; border-left: 4px solid #95a5a6; }\n");
    html.push_str("    .news-card.priority-high { border-left-color: #e74c3c; }\n");
    html.push_str("    .news-card.priority-medium { border-left-color: #f39c12; }\n");
    html.push_str("    .hotness-bar { background-color: #ecf0f1; height: 6px; border-radius: 3px; }\n");
    html.push_str("    .hotness-fill { background-color: #e67e22; height: 6px; border-radius: 3px; }\n");
    html.push_str("    .entity-tag, .entity-more, .category-tag { display: inline-block; padding: 2px 8px; margin-right: 4px; background-color: #ecf0f1; border-radius: 10px; font-size: 0.85em; }\n");
    html.push_str("    .notification-error { color: #e74c3c; }\n");
    html.push_str("    .notification-success { color: #27ae60; }\n");
    html.push_str("    .hidden { display: none; }\n");
    html.push_str("  </style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<h1>📡 RADAR</h1>\n");
    html.push_str(&status_indicator(view.status));
    html.push_str(&stats_panel(view.stats.as_ref(), &view.counters));

    if let Some(updated) = view.last_updated {
        html.push_str(&format!(
            "<div class=\"last-update\">Last updated: <span id=\"last-update-time\">{}</span></div>\n",
            format_time(updated)
        ));
    }

    html.push_str(&format!(
        "<div id=\"sorting-info\">\n{}</div>\n",
        sorting_info(view.sorting.as_ref())
    ));

    if view.loading {
        html.push_str("<div id=\"loading\">Loading...</div>\n");
    }
    html.push_str(&format!(
        "<div id=\"news-container\">\n{}</div>\n",
        news_container(&view.news)
    ));

    html.push_str(&notifications(&view.notifications, now));
    html.push_str("</body>\n</html>");
    html
}

pub fn format_time(time: DateTime<Local>) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Renders HTML as plain text for the terminal.
pub fn to_text(html: &str, width: usize) -> String {
    html2text::from_read(html.as_bytes(), width)
}

pub fn save_page(content: &str, path: Option<&Path>, date: DateTime<Utc>) -> Result<PathBuf> {
    let filepath = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let filename = format!("radar-{}.html", date.format("%Y-%m-%d-%H%M"));
            let documents_dir = dirs::document_dir().unwrap_or_else(|| PathBuf::from("."));
            documents_dir.join(filename)
        }
    };

    fs::write(&filepath, content)
        .with_context(|| format!("Failed to write dashboard page: {}", filepath.display()))?;

    Ok(filepath)
}
