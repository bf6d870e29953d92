//! Single global text-edit slot shared by grid cells and the quote.
//!
//! # Invariants
//! - At most one target is being edited at any instant.
//! - Finishing an edit yields the buffer exactly once; the slot is then empty.
//! - A commit is marked `changed` only when the buffer differs from the value
//!   seeded at entry.

use crate::model::grid::CellId;

/// What is being text-edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditTarget {
    Cell(CellId),
    Quote,
}

impl EditTarget {
    /// Cells are multi-line; the quote is a single-line field.
    pub fn is_multiline(self) -> bool {
        matches!(self, Self::Cell(_))
    }
}

/// Result of leaving edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommit {
    pub target: EditTarget,
    pub value: String,
    pub changed: bool,
}

/// Result of a confirm keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Nothing is being edited.
    Ignored,
    /// Modified confirm on a multi-line target: a newline was inserted.
    NewlineInserted,
    Finished(EditCommit),
}

#[derive(Debug, Clone)]
struct EditSession {
    target: EditTarget,
    original: String,
    buffer: String,
}

impl EditSession {
    fn into_commit(self) -> EditCommit {
        EditCommit {
            target: self.target,
            changed: self.buffer != self.original,
            value: self.buffer,
        }
    }
}

/// Owner of the edit slot.
#[derive(Debug, Default)]
pub struct EditController {
    session: Option<EditSession>,
}

impl EditController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters edit mode on `target`, seeding the buffer with `current`.
    ///
    /// Returns the finished commit of a different target that was open.
    /// Re-entering the active target keeps its buffer untouched.
    pub fn begin(&mut self, target: EditTarget, current: &str) -> Option<EditCommit> {
        if self.active_target() == Some(target) {
            return None;
        }
        let previous = self.finish();
        self.session = Some(EditSession {
            target,
            original: current.to_string(),
            buffer: current.to_string(),
        });
        previous
    }

    pub fn active_target(&self) -> Option<EditTarget> {
        self.session.as_ref().map(|session| session.target)
    }

    pub fn is_editing(&self, target: EditTarget) -> bool {
        self.active_target() == Some(target)
    }

    pub fn buffer(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.buffer.as_str())
    }

    /// Replaces the whole buffer (controlled-input semantics).
    pub fn replace_buffer(&mut self, text: impl Into<String>) -> bool {
        match self.session.as_mut() {
            Some(session) => {
                session.buffer = text.into();
                true
            }
            None => false,
        }
    }

    pub fn append(&mut self, text: &str) -> bool {
        match self.session.as_mut() {
            Some(session) => {
                session.buffer.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Handles the confirm key, with `shift` as the multi-line modifier.
    pub fn confirm(&mut self, shift: bool) -> ConfirmOutcome {
        let Some(session) = self.session.as_mut() else {
            return ConfirmOutcome::Ignored;
        };
        if shift && session.target.is_multiline() {
            session.buffer.push('\n');
            return ConfirmOutcome::NewlineInserted;
        }
        match self.finish() {
            Some(commit) => ConfirmOutcome::Finished(commit),
            None => ConfirmOutcome::Ignored,
        }
    }

    /// Leaves edit mode (focus loss) and yields the buffer.
    pub fn finish(&mut self) -> Option<EditCommit> {
        self.session.take().map(EditSession::into_commit)
    }

    /// Leaves edit mode discarding the buffer.
    pub fn abandon(&mut self) -> Option<EditTarget> {
        self.session.take().map(|session| session.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn begin_seeds_buffer_and_finish_reports_change() {
        let cell = Uuid::new_v4();
        let mut edit = EditController::new();
        assert!(edit.begin(EditTarget::Cell(cell), "old").is_none());
        assert_eq!(edit.buffer(), Some("old"));

        edit.replace_buffer("new");
        let commit = edit.finish().unwrap();
        assert_eq!(commit.target, EditTarget::Cell(cell));
        assert_eq!(commit.value, "new");
        assert!(commit.changed);
        assert!(edit.active_target().is_none());
    }

    #[test]
    fn unchanged_buffer_is_not_marked_changed() {
        let mut edit = EditController::new();
        edit.begin(EditTarget::Quote, "same");
        assert!(!edit.finish().unwrap().changed);
    }

    #[test]
    fn entering_another_target_finishes_the_open_one() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut edit = EditController::new();
        edit.begin(EditTarget::Cell(a), "");
        edit.append("draft");

        let previous = edit.begin(EditTarget::Cell(b), "b text").unwrap();
        assert_eq!(previous.target, EditTarget::Cell(a));
        assert_eq!(previous.value, "draft");
        assert!(edit.is_editing(EditTarget::Cell(b)));
        assert!(!edit.is_editing(EditTarget::Cell(a)));
    }

    #[test]
    fn reentering_active_target_keeps_buffer() {
        let a = Uuid::new_v4();
        let mut edit = EditController::new();
        edit.begin(EditTarget::Cell(a), "seed");
        edit.replace_buffer("typed");
        assert!(edit.begin(EditTarget::Cell(a), "seed").is_none());
        assert_eq!(edit.buffer(), Some("typed"));
    }

    #[test]
    fn shift_confirm_inserts_newline_only_for_cells() {
        let mut edit = EditController::new();
        edit.begin(EditTarget::Cell(Uuid::new_v4()), "line");
        assert_eq!(edit.confirm(true), ConfirmOutcome::NewlineInserted);
        assert_eq!(edit.buffer(), Some("line\n"));
        assert!(matches!(edit.confirm(false), ConfirmOutcome::Finished(_)));

        edit.begin(EditTarget::Quote, "q");
        assert!(matches!(edit.confirm(true), ConfirmOutcome::Finished(_)));
        assert_eq!(edit.confirm(false), ConfirmOutcome::Ignored);
    }
}
