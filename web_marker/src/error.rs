use thiserror::Error;

/// The only error a check body may return.
///
/// Every variant is rendered the same way in the feedback: one `Error:` line carrying
/// its `Display` form. The distinction only exists so that callers building checks can
/// say what went wrong without stringly-typed errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    /// An expectation did not hold.
    #[error("{0}")]
    Assertion(String),

    /// A route name could not be reversed into a path.
    #[error("Reverse for '{name}' not found. '{name}' is not a valid view function or pattern name.")]
    NoReverseMatch { name: String },

    /// The application under test failed while serving a call.
    #[error("{0}")]
    Collaborator(String),
}

impl CheckError {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator(message.into())
    }

    pub fn no_reverse_match(name: &str) -> Self {
        Self::NoReverseMatch {
            name: name.to_string(),
        }
    }
}

/// Errors raised while loading a marking configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed but describes an unusable marking.
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
