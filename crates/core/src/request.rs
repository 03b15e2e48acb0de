use serde::{Deserialize, Serialize};

/// The closed set of request types the policy engine evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// A query-style SQL input.
    Sql,
    /// A natural-language chat prompt.
    LlmChat,
    /// A multi-step planning request.
    Planning,
    /// A code generation or review request.
    Code,
}

impl RequestType {
    /// Parse a wire string. Returns `None` for anything outside the closed
    /// set; the engine blocks unknown types.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sql" => Some(Self::Sql),
            "llm_chat" => Some(Self::LlmChat),
            "planning" => Some(Self::Planning),
            "code" => Some(Self::Code),
            _ => None,
        }
    }

    /// The wire name of this request type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::LlmChat => "llm_chat",
            Self::Planning => "planning",
            Self::Code => "code",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
