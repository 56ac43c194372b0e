use std::{borrow::Cow, fmt, sync::Arc};

use thiserror::Error;

/// Error type returned by [`DisplayTarget`] writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// The target was removed from its document and no longer accepts text.
    #[error("display target is no longer attached to its document")]
    Detached,
    /// The backend failed to present the text.
    #[error("failed to write display text: {reason}")]
    Write {
        /// Human readable error description.
        reason: Cow<'static, str>,
    },
}

impl DisplayError {
    /// Helper for constructing [`DisplayError::Write`].
    pub fn write(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Write {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for DisplayError {
    fn from(value: std::io::Error) -> Self {
        DisplayError::write(value.to_string())
    }
}

/// A single element whose text content can be overwritten.
///
/// Writes go through a shared reference, the same way a document node is
/// mutated in place by whoever holds it.
pub trait DisplayTarget: Send + Sync + fmt::Debug {
    /// Replace the text content of the element.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Detached`] once the element has left its
    /// document, or [`DisplayError::Write`] when the backend rejects the text.
    fn set_text(&self, text: &str) -> Result<(), DisplayError>;

    /// Mark the element as removed from its document.
    fn detach(&self) {}
}

/// Host document able to resolve elements by identifier.
///
/// Identifiers are unique: a lookup yields at most one element.
pub trait DisplayHost {
    /// Look up the element registered under `id`.
    fn get_element_by_id(&self, id: &str) -> Option<Arc<dyn DisplayTarget>>;
}

impl<H: DisplayHost + ?Sized> DisplayHost for Arc<H> {
    fn get_element_by_id(&self, id: &str) -> Option<Arc<dyn DisplayTarget>> {
        (**self).get_element_by_id(id)
    }
}
