//! Shared error type used across all voicegate crates.

/// Error taxonomy for the gateway (propagation policy for each kind is
/// documented alongside the component that raises it).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid region, missing credentials, empty system prompt, bad env var.
    #[error("configuration: {0}")]
    Configuration(String),

    /// Out-of-order client call, unknown event kind.
    #[error("protocol: {0}")]
    Protocol(String),

    /// Operation on a closed/nonexistent session, duplicate session id.
    #[error("session lifecycle: {0}")]
    SessionLifecycle(String),

    /// Model-service stream error, timeout, backend 5xx.
    #[error("transport: {0}")]
    Transport(String),

    /// Unknown tool, invalid parameters, tool execution failure.
    #[error("tool: {0}")]
    Tool(String),

    /// Queue overflow, cleanup timeout escalation.
    #[error("resource: {0}")]
    Resource(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn session_lifecycle(msg: impl Into<String>) -> Self {
        Self::SessionLifecycle(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn tool(msg: impl Into<String>) -> Self {
        Self::Tool(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Whether this is specifically a [`crate::tool::UnknownTool`] failure,
    /// as opposed to a tool's own execution error — callers that need to
    /// distinguish "no such tool" from a tool's business failure (§4.6
    /// step 1) match on this rather than the generic `Tool` kind.
    pub fn is_unknown_tool(&self) -> bool {
        matches!(self, Error::Tool(msg) if msg.starts_with("unknown tool: "))
    }

    /// The taxonomy kind as a lowercase tag, for structured logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Protocol(_) => "protocol",
            Error::SessionLifecycle(_) => "session_lifecycle",
            Error::Transport(_) => "transport",
            Error::Tool(_) => "tool",
            Error::Resource(_) => "resource",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Other(_) => "other",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Error::configuration("x").kind(), "configuration");
        assert_eq!(Error::protocol("x").kind(), "protocol");
        assert_eq!(Error::session_lifecycle("x").kind(), "session_lifecycle");
        assert_eq!(Error::transport("x").kind(), "transport");
        assert_eq!(Error::tool("x").kind(), "tool");
        assert_eq!(Error::resource("x").kind(), "resource");
    }

    #[test]
    fn display_includes_message() {
        let e = Error::tool("unknown tool: frobnicate");
        assert!(e.to_string().contains("frobnicate"));
    }
}
