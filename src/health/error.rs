// src/health/error.rs
use std::any::Any;
use std::time::Duration;

/// Rejected component list at construction time.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("Component at position {index} has an empty name")]
    EmptyComponentName { index: usize },

    #[error("Component name `{0}` is registered more than once")]
    DuplicateComponent(String),
}

/// Failure of a whole `aggregate()` call.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("Health check for component `{component}` failed: {source}")]
    ComponentFailed {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Health check for component `{component}` panicked: {message}")]
    ComponentPanicked { component: String, message: String },

    #[error("Health check for component `{component}` did not finish within {timeout:?}")]
    Timeout { component: String, timeout: Duration },

    #[error("Health check task was dropped by the runtime: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl AggregateError {
    /// Name of the component that caused the failure, when known.
    pub fn component(&self) -> Option<&str> {
        match self {
            AggregateError::ComponentFailed { component, .. }
            | AggregateError::ComponentPanicked { component, .. }
            | AggregateError::Timeout { component, .. } => Some(component),
            AggregateError::Join(_) => None,
        }
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
