use serde::{Deserialize, Serialize};

/// One choice in a chat-shaped LLM response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChatChoice {
    /// The message content of this choice.
    pub content: String,
    /// Why generation stopped, when reported.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The body of a downstream LLM response, as a tagged variant with one
/// explicit extractor per shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseBody {
    /// A plain text completion.
    Text {
        /// The completion text.
        text: String,
    },
    /// A chat completion with one or more choices.
    Chat {
        /// The returned choices, first is primary.
        choices: Vec<ChatChoice>,
    },
    /// A structured (JSON) payload.
    Structured {
        /// The structured data.
        data: serde_json::Value,
    },
}

impl ResponseBody {
    /// Extract the primary textual content of the response.
    ///
    /// Text returns the completion; Chat returns the first choice's
    /// content; Structured returns its compact JSON encoding.
    #[must_use]
    pub fn content(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Chat { choices } => choices
                .first()
                .map(|c| c.content.clone())
                .unwrap_or_default(),
            Self::Structured { data } => data.to_string(),
        }
    }

    /// Return `true` if the body carries no extractable content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text { text } => text.is_empty(),
            Self::Chat { choices } => choices.is_empty(),
            Self::Structured { data } => data.is_null(),
        }
    }
}
