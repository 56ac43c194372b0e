//! In-memory host document.
//!
//! [`Document`] resolves element identifiers the way a page does: one element
//! per identifier, looked up on demand. [`TextElement`] is a plain text node
//! that keeps what was last written to it.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};

use timebox_proto::ports::display::{DisplayError, DisplayHost, DisplayTarget};

#[derive(Debug, Default)]
pub struct Document {
    elements: RwLock<HashMap<String, Arc<dyn DisplayTarget>>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, id: impl Into<String>, element: Arc<dyn DisplayTarget>) -> Self {
        self.insert_element(id, element);
        self
    }

    /// Register `element` under `id`, returning the element it replaced.
    pub fn insert_element(
        &self,
        id: impl Into<String>,
        element: Arc<dyn DisplayTarget>,
    ) -> Option<Arc<dyn DisplayTarget>> {
        self.elements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), element)
    }

    /// Take the element out of the document and detach it.
    ///
    /// Anyone still holding the element gets [`DisplayError::Detached`] on
    /// their next write.
    pub fn remove_element(&self, id: &str) -> Option<Arc<dyn DisplayTarget>> {
        let removed = self
            .elements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);

        if let Some(element) = &removed {
            element.detach();
        }

        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}

impl DisplayHost for Document {
    fn get_element_by_id(&self, id: &str) -> Option<Arc<dyn DisplayTarget>> {
        self.elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

#[derive(Debug)]
struct TextState {
    text: String,
    writes: usize,
    history: Option<Vec<String>>,
    attached: bool,
}

/// Text node held in memory.
#[derive(Debug)]
pub struct TextElement {
    state: Mutex<TextState>,
}

impl TextElement {
    pub fn new() -> Self {
        Self::with_history(None)
    }

    /// Element that also keeps every text written to it.
    pub fn recording() -> Self {
        Self::with_history(Some(Vec::new()))
    }

    fn with_history(history: Option<Vec<String>>) -> Self {
        Self {
            state: Mutex::new(TextState {
                text: String::new(),
                writes: 0,
                history,
                attached: true,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, TextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn text(&self) -> String {
        self.state().text.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Written texts in order, empty unless built with [`TextElement::recording`].
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone().unwrap_or_default()
    }

    pub fn is_attached(&self) -> bool {
        self.state().attached
    }
}

impl Default for TextElement {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayTarget for TextElement {
    fn set_text(&self, text: &str) -> Result<(), DisplayError> {
        let mut state = self.state();

        if !state.attached {
            return Err(DisplayError::Detached);
        }

        state.text.clear();
        state.text.push_str(text);
        state.writes += 1;

        if let Some(history) = state.history.as_mut() {
            history.push(text.to_owned());
        }

        Ok(())
    }

    fn detach(&self) {
        self.state().attached = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_registered_element() {
        let element = Arc::new(TextElement::new());
        let document = Document::new().with_element("time-box", element.clone());

        let found = document.get_element_by_id("time-box").expect("element present");
        found.set_text("hello").expect("write succeeds");

        assert_eq!(element.text(), "hello");
        assert!(document.get_element_by_id("missing").is_none());
    }

    #[test]
    fn inserting_same_id_replaces_element() {
        let first = Arc::new(TextElement::new());
        let second = Arc::new(TextElement::new());
        let document = Document::new().with_element("time-box", first.clone());

        let replaced = document.insert_element("time-box", second.clone());
        assert!(replaced.is_some());

        document
            .get_element_by_id("time-box")
            .expect("element present")
            .set_text("now")
            .expect("write succeeds");

        assert_eq!(first.write_count(), 0);
        assert_eq!(second.text(), "now");
    }

    #[test]
    fn removed_element_rejects_writes() {
        let element = Arc::new(TextElement::new());
        let document = Document::new().with_element("time-box", element.clone());

        let removed = document.remove_element("time-box").expect("element present");
        assert!(!document.contains("time-box"));
        assert!(!element.is_attached());
        assert_eq!(removed.set_text("late"), Err(DisplayError::Detached));
        assert_eq!(element.write_count(), 0);
    }

    #[test]
    fn history_only_kept_when_recording() {
        let plain = TextElement::new();
        let recording = TextElement::recording();

        for text in ["a", "b"] {
            plain.set_text(text).expect("write succeeds");
            recording.set_text(text).expect("write succeeds");
        }

        assert!(plain.history().is_empty());
        assert_eq!(plain.write_count(), 2);
        assert_eq!(recording.history(), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(recording.text(), "b");
    }
}
