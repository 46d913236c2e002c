use std::collections::HashMap;

use crate::editor::DraftField;

/// Element roles the draft editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    EditDraftButton,
    SaveDraftButton,
    CancelEditButton,
    UseTemplateButton,
    ModalBackdrop,
    DraftField,
}

impl Role {
    /// Class carried by the rendered element with this role.
    pub fn css_class(&self) -> &'static str {
        match self {
            Role::EditDraftButton => "edit-draft-btn",
            Role::SaveDraftButton => "save-draft-btn",
            Role::CancelEditButton => "cancel-edit-btn",
            Role::UseTemplateButton => "use-template-btn",
            Role::ModalBackdrop => "editor-modal",
            Role::DraftField => "draft-field",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartEditing,
    SaveDraft,
    CancelEditing,
    ApplyTemplate,
    SyncPreview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click {
        role: Role,
        news_id: Option<String>,
    },
    Input {
        field: DraftField,
        value: String,
    },
    KeyDown(Key),
}

impl UiEvent {
    pub fn click(role: Role) -> Self {
        UiEvent::Click {
            role,
            news_id: None,
        }
    }

    pub fn edit(news_id: impl Into<String>) -> Self {
        UiEvent::Click {
            role: Role::EditDraftButton,
            news_id: Some(news_id.into()),
        }
    }

    pub fn input(field: DraftField, value: impl Into<String>) -> Self {
        UiEvent::Input {
            field,
            value: value.into(),
        }
    }
}

/// Role-to-action table owned by a single component.
///
/// Modal roles and the Escape key are bound only while the modal is attached.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    roles: HashMap<Role, Action>,
    escape: Option<Action>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, role: Role, action: Action) {
        self.roles.insert(role, action);
    }

    pub fn unbind(&mut self, role: Role) {
        self.roles.remove(&role);
    }

    pub fn is_bound(&self, role: Role) -> bool {
        self.roles.contains_key(&role)
    }

    pub fn attach_modal(&mut self) {
        self.bind(Role::SaveDraftButton, Action::SaveDraft);
        self.bind(Role::CancelEditButton, Action::CancelEditing);
        self.bind(Role::UseTemplateButton, Action::ApplyTemplate);
        self.bind(Role::ModalBackdrop, Action::CancelEditing);
        self.bind(Role::DraftField, Action::SyncPreview);
        self.escape = Some(Action::CancelEditing);
    }

    pub fn detach_modal(&mut self) {
        for role in [
            Role::SaveDraftButton,
            Role::CancelEditButton,
            Role::UseTemplateButton,
            Role::ModalBackdrop,
            Role::DraftField,
        ] {
            self.unbind(role);
        }
        self.escape = None;
    }

    pub fn resolve(&self, event: &UiEvent) -> Option<Action> {
        match event {
            UiEvent::Click { role, .. } => self.roles.get(role).copied(),
            UiEvent::Input { .. } => self.roles.get(&Role::DraftField).copied(),
            UiEvent::KeyDown(Key::Escape) => self.escape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_roles_unbound_until_attached() {
        let mut table = BindingTable::new();
        table.bind(Role::EditDraftButton, Action::StartEditing);

        assert_eq!(table.resolve(&UiEvent::click(Role::SaveDraftButton)), None);
        assert_eq!(table.resolve(&UiEvent::KeyDown(Key::Escape)), None);
        assert_eq!(
            table.resolve(&UiEvent::edit("a1")),
            Some(Action::StartEditing)
        );
    }

    #[test]
    fn test_attach_and_detach_modal() {
        let mut table = BindingTable::new();
        table.bind(Role::EditDraftButton, Action::StartEditing);
        table.attach_modal();

        assert_eq!(
            table.resolve(&UiEvent::click(Role::ModalBackdrop)),
            Some(Action::CancelEditing)
        );
        assert_eq!(
            table.resolve(&UiEvent::input(DraftField::Lead, "text")),
            Some(Action::SyncPreview)
        );
        assert_eq!(
            table.resolve(&UiEvent::KeyDown(Key::Escape)),
            Some(Action::CancelEditing)
        );

        table.detach_modal();
        assert!(!table.is_bound(Role::DraftField));
        assert_eq!(table.resolve(&UiEvent::KeyDown(Key::Escape)), None);
        assert!(table.is_bound(Role::EditDraftButton));
    }
}
