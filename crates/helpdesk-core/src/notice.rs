//! Typed user-visible notices and the button actions attached to them.

use serde::{Deserialize, Serialize};

pub const DELETE_MESSAGE_CUSTOM_ID: &str = "delete-message";
pub const RETRY_CONTENT_CHECK_PREFIX: &str = "try-again-thread-requirements";
const CUSTOM_ID_SEPARATOR: &str = "::";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `NoticeKind` values.
pub enum NoticeKind {
    Error,
    Warning,
    Success,
    Info,
    Special,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Info => "info",
            Self::Special => "special",
        }
    }

    /// Embed accent color.
    pub fn color(self) -> u32 {
        match self {
            Self::Error => 0xEF4444,
            Self::Warning => 0xF59E0B,
            Self::Success => 0x22C55E,
            Self::Info => 0x3B82F6,
            Self::Special => 0xA855F7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonTone {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeButton {
    pub custom_id: String,
    pub label: String,
    pub tone: ButtonTone,
}

impl NoticeButton {
    pub fn delete() -> Self {
        Self {
            custom_id: DELETE_MESSAGE_CUSTOM_ID.to_string(),
            label: "Delete".to_string(),
            tone: ButtonTone::Danger,
        }
    }

    pub fn retry_content_check(thread_id: &str, message_id: &str) -> Self {
        Self {
            custom_id: ButtonAction::RetryContentCheck {
                thread_id: thread_id.to_string(),
                message_id: message_id.to_string(),
            }
            .custom_id(),
            label: "Try Again".to_string(),
            tone: ButtonTone::Success,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A short, typed, colored message shown to users.
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<NoticeField>,
    /// Plain-text content sent alongside the embed, used for pings.
    pub content: Option<String>,
    pub buttons: Vec<NoticeButton>,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            fields: Vec::new(),
            content: None,
            buttons: Vec::new(),
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, title)
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, title)
    }

    pub fn special(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Special, title)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(NoticeField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_button(mut self, button: NoticeButton) -> Self {
        self.buttons.push(button);
        self
    }

    /// Adds a button that lets anyone remove the notice.
    pub fn deletable(self) -> Self {
        self.with_button(NoticeButton::delete())
    }

    pub fn is_deletable(&self) -> bool {
        self.buttons
            .iter()
            .any(|button| button.custom_id == DELETE_MESSAGE_CUSTOM_ID)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Decoded button custom id.
pub enum ButtonAction {
    DeleteMessage,
    RetryContentCheck {
        thread_id: String,
        message_id: String,
    },
    Unknown(String),
}

impl ButtonAction {
    pub fn parse(custom_id: &str) -> Self {
        let mut parts = custom_id.split(CUSTOM_ID_SEPARATOR);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(DELETE_MESSAGE_CUSTOM_ID), None, None, None) => Self::DeleteMessage,
            (Some(RETRY_CONTENT_CHECK_PREFIX), Some(thread_id), Some(message_id), None)
                if !thread_id.is_empty() && !message_id.is_empty() =>
            {
                Self::RetryContentCheck {
                    thread_id: thread_id.to_string(),
                    message_id: message_id.to_string(),
                }
            }
            _ => Self::Unknown(custom_id.to_string()),
        }
    }

    pub fn custom_id(&self) -> String {
        match self {
            Self::DeleteMessage => DELETE_MESSAGE_CUSTOM_ID.to_string(),
            Self::RetryContentCheck {
                thread_id,
                message_id,
            } => [
                RETRY_CONTENT_CHECK_PREFIX,
                thread_id.as_str(),
                message_id.as_str(),
            ]
            .join(CUSTOM_ID_SEPARATOR),
            Self::Unknown(raw) => raw.clone(),
        }
    }
}
