use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::api::{ApiOutcome, NewsApi};
use crate::bindings::{Action, BindingTable, Role, UiEvent};
use crate::models::Draft;
use crate::notify::NotificationCenter;
use crate::render;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);
const RELOAD_DELAY: Duration = Duration::from_secs(1);
const CANCEL_PROMPT: &str = "Discard changes? Unsaved data will be lost.";

/// Asks the operator a yes/no question.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Title,
    Lead,
    Bullets,
    Quote,
}

impl DraftField {
    pub const ALL: [DraftField; 4] = [
        DraftField::Title,
        DraftField::Lead,
        DraftField::Bullets,
        DraftField::Quote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::Lead => "lead",
            DraftField::Bullets => "bullets",
            DraftField::Quote => "quote",
        }
    }
}

impl FromStr for DraftField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "title" => Ok(DraftField::Title),
            "lead" => Ok(DraftField::Lead),
            "bullets" => Ok(DraftField::Bullets),
            "quote" => Ok(DraftField::Quote),
            _ => anyhow::bail!(
                "Unknown field: {}. Use 'title', 'lead', 'bullets' or 'quote'",
                s
            ),
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits bullet text into entries: one per line, blank lines dropped,
/// kept lines left untrimmed.
pub fn parse_bullets(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub fn template_draft() -> Draft {
    Draft {
        title: "Key event in the financial markets".to_string(),
        lead: "A significant development calls for the attention of investors and analysts. \
               The event may have a substantial impact on market quotes and industry trends."
            .to_string(),
        bullets: vec![
            "The event has affected key assets and sectors".to_string(),
            "The market reaction exceeded analyst expectations".to_string(),
            "Further consequences require monitoring and analysis".to_string(),
        ],
        quote: "This is an important precedent for the market that may set new trends \
                - leading industry expert"
            .to_string(),
    }
}

/// Raw values of the four form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorForm {
    pub title: String,
    pub lead: String,
    pub bullets: String,
    pub quote: String,
}

impl EditorForm {
    pub fn from_draft(draft: &Draft) -> Self {
        Self {
            title: draft.title.clone(),
            lead: draft.lead.clone(),
            bullets: draft.bullets.join("\n"),
            quote: draft.quote.clone(),
        }
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::Lead => &self.lead,
            DraftField::Bullets => &self.bullets,
            DraftField::Quote => &self.quote,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Title => self.title = value,
            DraftField::Lead => self.lead = value,
            DraftField::Bullets => self.bullets = value,
            DraftField::Quote => self.quote = value,
        }
    }

    pub fn to_draft(&self) -> Draft {
        Draft {
            title: self.title.clone(),
            lead: self.lead.clone(),
            bullets: parse_bullets(&self.bullets),
            quote: self.quote.clone(),
        }
    }
}

/// The open modal: target item, working draft, form values and preview.
#[derive(Debug, Clone)]
pub struct EditorSession {
    pub news_id: String,
    pub draft: Draft,
    pub form: EditorForm,
    pub preview_html: String,
}

impl EditorSession {
    pub fn modal_html(&self) -> String {
        render::editor_modal(self)
    }
}

/// Side effect the host should carry out after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    ReloadAfter(Duration),
}

pub struct DraftEditor {
    api: Arc<dyn NewsApi>,
    is_editing: bool,
    session: Option<EditorSession>,
    bindings: BindingTable,
    notifications: NotificationCenter,
}

impl DraftEditor {
    pub fn new(api: Arc<dyn NewsApi>) -> Self {
        let mut bindings = BindingTable::new();
        bindings.bind(Role::EditDraftButton, Action::StartEditing);

        Self {
            api,
            is_editing: false,
            session: None,
            bindings,
            notifications: NotificationCenter::new(NOTIFICATION_TTL, false),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    pub fn session(&self) -> Option<&EditorSession> {
        self.session.as_ref()
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Routes an event through the binding table.
    pub async fn handle(&mut self, event: UiEvent, confirm: &dyn Confirm) -> Effect {
        let Some(action) = self.bindings.resolve(&event) else {
            debug!(?event, "No binding for event");
            return Effect::None;
        };

        match (action, event) {
            (Action::StartEditing, UiEvent::Click { news_id: Some(id), .. }) => {
                self.start_editing(&id).await;
                Effect::None
            }
            (Action::SaveDraft, _) => self.save_draft().await,
            (Action::CancelEditing, _) => {
                self.cancel_editing(confirm);
                Effect::None
            }
            (Action::ApplyTemplate, _) => {
                self.apply_template();
                Effect::None
            }
            (Action::SyncPreview, UiEvent::Input { field, value }) => {
                self.input(field, value);
                Effect::None
            }
            (action, event) => {
                warn!(?action, ?event, "Event does not carry what the action needs");
                Effect::None
            }
        }
    }

    /// Opens the editor for `news_id`. Returns false when a session is
    /// already active or the draft could not be loaded.
    pub async fn start_editing(&mut self, news_id: &str) -> bool {
        if self.is_editing {
            debug!(news_id, "Editor already open, ignoring");
            return false;
        }
        self.is_editing = true;

        match self.api.fetch_draft(news_id).await {
            Ok(draft) => {
                self.show_editor(news_id, draft);
                true
            }
            Err(e) => {
                error!("Error loading draft {}: {:#}", news_id, e);
                self.notifications.error("Failed to load draft");
                self.is_editing = false;
                false
            }
        }
    }

    fn show_editor(&mut self, news_id: &str, draft: Draft) {
        self.session = Some(EditorSession {
            news_id: news_id.to_string(),
            draft,
            form: EditorForm::default(),
            preview_html: String::new(),
        });
        self.bindings.attach_modal();
        self.populate_form();
    }

    fn populate_form(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.form = EditorForm::from_draft(&session.draft);
        }
        self.update_preview();
    }

    fn update_preview(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.preview_html = render::draft_preview(&session.form.to_draft());
        }
    }

    pub fn form_data(&self) -> Option<Draft> {
        self.session.as_ref().map(|s| s.form.to_draft())
    }

    /// A keystroke in a tracked field: sync the draft and preview locally.
    pub fn input(&mut self, field: DraftField, value: impl Into<String>) {
        if !self.is_editing {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.form.set(field, value);
            session.draft = session.form.to_draft();
        }
        self.update_preview();
    }

    pub async fn save_draft(&mut self) -> Effect {
        let Some(session) = self.session.as_mut() else {
            return Effect::None;
        };
        session.draft = session.form.to_draft();
        let news_id = session.news_id.clone();
        let draft = session.draft.clone();

        match self.api.save_draft(&news_id, &draft).await {
            Ok(ApiOutcome::Success(_)) => {
                self.notifications.success("Draft saved!");
                self.close_editor();
                Effect::ReloadAfter(RELOAD_DELAY)
            }
            Ok(ApiOutcome::Failure { message }) => {
                warn!("Saving draft {} rejected: {}", news_id, message);
                self.notifications.error("Failed to save draft");
                Effect::None
            }
            Ok(ApiOutcome::Empty { message }) => {
                warn!("Saving draft {} not confirmed: {:?}", news_id, message);
                self.notifications.error("Failed to save draft");
                Effect::None
            }
            Err(e) => {
                error!("Error saving draft {}: {:#}", news_id, e);
                self.notifications.error("Failed to save draft");
                Effect::None
            }
        }
    }

    pub fn apply_template(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.draft = template_draft();
        self.populate_form();
        self.notifications.info("Template applied!");
    }

    /// Closes the editor if the operator confirms. Returns whether it closed.
    pub fn cancel_editing(&mut self, confirm: &dyn Confirm) -> bool {
        if !self.is_editing {
            return false;
        }
        if confirm.confirm(CANCEL_PROMPT) {
            self.close_editor();
            true
        } else {
            false
        }
    }

    fn close_editor(&mut self) {
        self.session = None;
        self.is_editing = false;
        self.bindings.detach_modal();
    }
}
