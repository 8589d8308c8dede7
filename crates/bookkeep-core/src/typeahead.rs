//! Type-ahead completion over a sorted set of names.
//!
//! [`TypeAhead`] answers "what should this text complete to". [`TypeAheadField`]
//! models an editable text field that queues completions while an input
//! event is being handled and applies them only once the event loop calls
//! [`TypeAheadField::dispatch_pending`].

use std::{
    collections::{BTreeSet, VecDeque},
    ops::{Bound, Range},
};

use tracing::trace;

/// Suggested completion: the full text and the character range that was
/// appended (and should be shown selected).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub selection: Range<usize>,
}

impl Completion {
    /// The appended part of the completion.
    pub fn suffix(&self) -> &str {
        let start = self
            .text
            .char_indices()
            .nth(self.selection.start)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len());
        &self.text[start..]
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeAhead {
    names: BTreeSet<String>,
}

impl TypeAhead {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Walks the names in order from `text`: an exact match or the first
    /// greater non-prefix name ends the search without a suggestion; the
    /// first prefix match is returned with its suffix selected.
    pub fn suggest(&self, text: &str) -> Option<Completion> {
        if text.is_empty() {
            return None;
        }
        let candidate = self
            .names
            .range::<str, _>((Bound::Included(text), Bound::Unbounded))
            .next()?;
        if candidate == text || !candidate.starts_with(text) {
            return None;
        }
        let typed = text.chars().count();
        Some(Completion {
            text: candidate.clone(),
            selection: typed..candidate.chars().count(),
        })
    }
}

#[derive(Debug, Clone)]
struct PendingCompletion {
    expected_text: String,
    completion: Completion,
}

/// Editable text backed by a [`TypeAhead`]. Typing always happens at the end
/// of the text, replacing the current selection when one is shown.
#[derive(Debug, Clone)]
pub struct TypeAheadField {
    completer: TypeAhead,
    text: String,
    selection: Option<Range<usize>>,
    pending: VecDeque<PendingCompletion>,
}

impl TypeAheadField {
    pub fn new(completer: TypeAhead) -> Self {
        Self {
            completer,
            text: String::new(),
            selection: None,
            pending: VecDeque::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Replaces the text without triggering completion.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.selection = None;
        self.pending.clear();
    }

    /// User input. The completion is queued, not applied.
    pub fn type_text(&mut self, input: &str) {
        if input.is_empty() {
            return;
        }
        self.clear_selected_text();
        self.text.push_str(input);
        if let Some(completion) = self.completer.suggest(&self.text) {
            trace!(text = %self.text, suggestion = %completion.text, "queued completion");
            self.pending.push_back(PendingCompletion {
                expected_text: self.text.clone(),
                completion,
            });
        }
    }

    /// Removes the selection, or the last character when nothing is
    /// selected. Removals never complete.
    pub fn delete_backward(&mut self) {
        if self.selection.is_some() {
            self.clear_selected_text();
        } else {
            self.text.pop();
        }
    }

    /// Keeps the completed text and drops the selection.
    pub fn accept(&mut self) {
        self.selection = None;
    }

    /// Applies queued completions whose triggering text is still current.
    /// Returns `true` when the text changed.
    pub fn dispatch_pending(&mut self) -> bool {
        let mut applied = false;
        while let Some(pending) = self.pending.pop_front() {
            if pending.expected_text != self.text {
                trace!(expected = %pending.expected_text, "dropped stale completion");
                continue;
            }
            self.text = pending.completion.text;
            self.selection = Some(pending.completion.selection);
            applied = true;
        }
        applied
    }

    fn clear_selected_text(&mut self) {
        if let Some(selection) = self.selection.take() {
            let keep: String = self.text.chars().take(selection.start).collect();
            self.text = keep;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> TypeAhead {
        TypeAhead::new(["Savings", "Checking", "Credit Card", "Cash"])
    }

    #[test]
    fn suggests_first_prefix_match_in_order() {
        let completion = accounts().suggest("C").unwrap();
        assert_eq!(completion.text, "Cash");
        assert_eq!(completion.selection, 1..4);
        assert_eq!(completion.suffix(), "ash");

        let completion = accounts().suggest("Cr").unwrap();
        assert_eq!(completion.text, "Credit Card");
        assert_eq!(completion.suffix(), "edit Card");
    }

    #[test]
    fn exact_match_stops_without_suggestion() {
        assert_eq!(accounts().suggest("Cash"), None);
    }

    #[test]
    fn greater_name_stops_without_suggestion() {
        assert_eq!(accounts().suggest("D"), None);
        assert_eq!(accounts().suggest("Zzz"), None);
        assert_eq!(accounts().suggest(""), None);
        assert_eq!(accounts().suggest("c"), None);
    }

    #[test]
    fn field_defers_completion_until_dispatch() {
        let mut field = TypeAheadField::new(accounts());
        field.type_text("Ch");
        assert_eq!(field.text(), "Ch");
        assert!(field.has_pending());

        assert!(field.dispatch_pending());
        assert_eq!(field.text(), "Checking");
        assert_eq!(field.selection(), Some(2..8));
    }

    #[test]
    fn typing_over_selection_replaces_it() {
        let mut field = TypeAheadField::new(accounts());
        field.type_text("C");
        field.dispatch_pending();
        assert_eq!(field.text(), "Cash");

        field.type_text("r");
        field.dispatch_pending();
        assert_eq!(field.text(), "Credit Card");
        assert_eq!(field.selection(), Some(2..11));
    }

    #[test]
    fn stale_completions_are_dropped() {
        let mut field = TypeAheadField::new(accounts());
        field.type_text("S");
        field.type_text("x");
        assert!(!field.dispatch_pending());
        assert_eq!(field.text(), "Sx");
    }

    #[test]
    fn deleting_does_not_complete() {
        let mut field = TypeAheadField::new(accounts());
        field.type_text("Che");
        field.dispatch_pending();
        field.delete_backward();
        assert_eq!(field.text(), "Che");
        field.delete_backward();
        assert_eq!(field.text(), "Ch");
        assert!(!field.has_pending());
    }
}
