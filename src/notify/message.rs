//! Outbound message payloads in LINE's wire format.

use serde::Serialize;

/// A message pushed to the group chat.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Text {
        text: String,
    },
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: Bubble,
    },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text { text: text.into() }
    }
}

/// A single flex card with a header, a body and an optional footer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename = "bubble")]
pub struct Bubble {
    pub header: FlexBox,
    pub body: FlexBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<FlexBox>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename = "box")]
pub struct FlexBox {
    pub layout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<String>,
    pub contents: Vec<FlexComponent>,
}

impl FlexBox {
    pub fn vertical(contents: Vec<FlexComponent>) -> Self {
        Self {
            layout: "vertical".to_string(),
            spacing: None,
            contents,
        }
    }

    pub fn with_spacing(mut self, spacing: impl Into<String>) -> Self {
        self.spacing = Some(spacing.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlexComponent {
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        weight: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        wrap: bool,
    },
    Button {
        action: UriAction,
        style: String,
    },
    Separator,
}

impl FlexComponent {
    pub fn text(text: impl Into<String>) -> Self {
        FlexComponent::Text {
            text: text.into(),
            weight: None,
            size: None,
            color: None,
            wrap: true,
        }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        FlexComponent::Text {
            text: text.into(),
            weight: Some("bold".to_string()),
            size: Some("lg".to_string()),
            color: None,
            wrap: true,
        }
    }

    pub fn muted(text: impl Into<String>) -> Self {
        FlexComponent::Text {
            text: text.into(),
            weight: None,
            size: Some("sm".to_string()),
            color: Some("#888888".to_string()),
            wrap: true,
        }
    }

    pub fn link_button(label: impl Into<String>, uri: impl Into<String>) -> Self {
        FlexComponent::Button {
            action: UriAction {
                label: label.into(),
                uri: uri.into(),
            },
            style: "primary".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename = "uri")]
pub struct UriAction {
    pub label: String,
    pub uri: String,
}
