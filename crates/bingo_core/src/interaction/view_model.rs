//! Grid view model: the interaction state machine for one rendered card.
//!
//! # Responsibility
//! - Hold the cells (sorted by position) and quote presented to the user.
//! - Route pointer input to the gesture recognizer and text input to the
//!   edit controller.
//! - Apply confirmed changes optimistically and queue them as [`Mutation`]s
//!   for the persistence gateway.
//! - Collect user-visible [`Notice`]s when a queued write fails.
//!
//! # Invariants
//! - Read-only views never start gestures, never enter edit mode, and never
//!   queue mutations.
//! - The free space and completed cells are never edited or completed;
//!   attempts are silently ignored.
//! - Entering edit mode cancels every in-flight gesture first.
//! - One completion mutation per cell, ever; local state is never rolled back.

use crate::interaction::config::{GestureKind, InteractionConfig};
use crate::interaction::edit::{ConfirmOutcome, EditCommit, EditController, EditTarget};
use crate::interaction::frame::FrameToken;
use crate::interaction::gesture::{CancelReason, GestureRecognizer, GestureSignal, PointerSample};
use crate::model::account::AccountId;
use crate::model::grid::{Cell, CellId, CellTone, Grid, GridId, GridLayout};
use log::{info, warn};
use std::time::Instant;

/// Placeholder shown in an empty goal cell.
pub const EMPTY_GOAL_PLACEHOLDER: &str = "Double-click to edit";
/// Placeholder shown when no intention has been written yet.
pub const EMPTY_QUOTE_PLACEHOLDER: &str = "Click to add your intention...";

/// A confirmed local change awaiting the persistence gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CellText { cell_id: CellId, text: String },
    CellCompletion { cell_id: CellId, completed: bool },
    Quote { grid_id: GridId, text: String },
}

impl Mutation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CellText { .. } => "cell_text",
            Self::CellCompletion { .. } => "cell_completion",
            Self::Quote { .. } => "quote",
        }
    }

    /// User-facing alert text when this write fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::CellText { .. } => "Failed to update goal",
            Self::CellCompletion { .. } => "Failed to update goal status",
            Self::Quote { .. } => "Failed to update intention",
        }
    }
}

/// Non-blocking failure report for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub mutation: Mutation,
}

/// What a cell shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Fixed decorative marker.
    FreeSpace,
    /// Goal text as committed.
    Goal(String),
    /// Empty goal; hosts render [`EMPTY_GOAL_PLACEHOLDER`].
    Placeholder,
    /// Live edit buffer.
    Editing(String),
}

/// Render state for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub cell_id: CellId,
    pub position: u32,
    pub tone: CellTone,
    pub is_free_space: bool,
    pub completed: bool,
    pub editing: bool,
    /// Gesture progress in `0.0..=1.0` while one is accumulating.
    pub progress: Option<f32>,
    /// Whether the cell accepts gestures or edit entry right now.
    pub interactive: bool,
    pub content: CellContent,
}

/// Interaction state machine for one card.
pub struct GridViewModel {
    grid_id: GridId,
    owner: AccountId,
    layout: GridLayout,
    cells: Vec<Cell>,
    quote: String,
    read_only: bool,
    edit: EditController,
    gestures: GestureRecognizer,
    outbox: Vec<Mutation>,
    notices: Vec<Notice>,
}

impl GridViewModel {
    /// Builds a view model using the strategy selected by `config`.
    pub fn new(grid: Grid, read_only: bool, config: &InteractionConfig) -> Self {
        Self::with_recognizer(grid, read_only, GestureRecognizer::from_config(config))
    }

    pub fn with_recognizer(mut grid: Grid, read_only: bool, gestures: GestureRecognizer) -> Self {
        grid.sort_cells();
        Self {
            grid_id: grid.id,
            owner: grid.owner,
            layout: grid.layout,
            cells: grid.cells,
            quote: grid.quote,
            read_only,
            edit: EditController::new(),
            gestures,
            outbox: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn grid_id(&self) -> GridId {
        self.grid_id
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    /// Cells ordered by position.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, cell_id: CellId) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id == cell_id)
    }

    pub fn cell_at(&self, position: u32) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.position == position)
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn gesture_kind(&self) -> GestureKind {
        self.gestures.kind()
    }

    /// Current committed state as a grid record (share/export input).
    pub fn snapshot(&self) -> Grid {
        Grid {
            id: self.grid_id,
            owner: self.owner,
            layout: self.layout,
            cells: self.cells.clone(),
            quote: self.quote.clone(),
        }
    }

    // --- edit ---

    pub fn editing(&self) -> Option<EditTarget> {
        self.edit.active_target()
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.edit.buffer()
    }

    /// Double-activation on a cell: enters edit mode.
    pub fn double_activate(&mut self, cell_id: CellId) -> bool {
        if self.read_only {
            return false;
        }
        let Some(cell) = self.cell(cell_id) else {
            return false;
        };
        if self.layout.is_free_space(cell.position) || cell.completed {
            return false;
        }
        let current = cell.text.clone();
        self.enter_edit(EditTarget::Cell(cell_id), &current);
        true
    }

    /// Single activation on the quote: enters edit mode.
    pub fn activate_quote(&mut self) -> bool {
        if self.read_only {
            return false;
        }
        let current = self.quote.clone();
        self.enter_edit(EditTarget::Quote, &current);
        true
    }

    /// Replaces the edit buffer.
    pub fn edit_input(&mut self, text: impl Into<String>) -> bool {
        self.edit.replace_buffer(text)
    }

    pub fn edit_append(&mut self, text: &str) -> bool {
        self.edit.append(text)
    }

    /// Confirm key; returns whether editing ended.
    pub fn edit_confirm(&mut self, shift: bool) -> bool {
        match self.edit.confirm(shift) {
            ConfirmOutcome::Finished(commit) => {
                self.apply_commit(commit);
                true
            }
            ConfirmOutcome::NewlineInserted | ConfirmOutcome::Ignored => false,
        }
    }

    /// Focus loss; commits the open edit, if any.
    pub fn blur(&mut self) -> bool {
        match self.edit.finish() {
            Some(commit) => {
                self.apply_commit(commit);
                true
            }
            None => false,
        }
    }

    fn enter_edit(&mut self, target: EditTarget, current: &str) {
        if self.edit.is_editing(target) {
            return;
        }
        self.gestures.cancel_all(CancelReason::Superseded);
        if let Some(previous) = self.edit.begin(target, current) {
            self.apply_commit(previous);
        }
    }

    fn apply_commit(&mut self, commit: EditCommit) {
        if !commit.changed {
            return;
        }
        match commit.target {
            EditTarget::Cell(cell_id) => {
                let Some(cell) = self.cells.iter_mut().find(|cell| cell.id == cell_id) else {
                    return;
                };
                cell.text = commit.value.clone();
                info!(
                    "event=edit_commit module=interaction status=ok target=cell cell_id={} position={} len={}",
                    cell_id,
                    cell.position,
                    commit.value.chars().count()
                );
                self.outbox.push(Mutation::CellText {
                    cell_id,
                    text: commit.value,
                });
            }
            EditTarget::Quote => {
                self.quote = commit.value.clone();
                info!(
                    "event=edit_commit module=interaction status=ok target=quote grid_id={} len={}",
                    self.grid_id,
                    commit.value.chars().count()
                );
                self.outbox.push(Mutation::Quote {
                    grid_id: self.grid_id,
                    text: commit.value,
                });
            }
        }
    }

    // --- gestures ---

    /// Whether a gesture may start on `cell_id` right now.
    pub fn can_start_gesture(&self, cell_id: CellId) -> bool {
        if self.read_only || self.edit.is_editing(EditTarget::Cell(cell_id)) {
            return false;
        }
        let Some(cell) = self.cell(cell_id) else {
            return false;
        };
        if self.layout.is_free_space(cell.position) || cell.completed {
            return false;
        }
        !self.gestures.requires_goal_text() || cell.has_goal()
    }

    pub fn pointer_down(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        if !self.can_start_gesture(cell_id) {
            return GestureSignal::Ignored;
        }
        let signal = self.gestures.press(cell_id, sample);
        self.apply_signal(cell_id, signal)
    }

    pub fn pointer_move(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        if self.read_only {
            return GestureSignal::Ignored;
        }
        let signal = self.gestures.pointer_move(cell_id, sample);
        self.apply_signal(cell_id, signal)
    }

    pub fn pointer_up(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        if self.read_only {
            return GestureSignal::Ignored;
        }
        let signal = self.gestures.release(cell_id, sample);
        self.apply_signal(cell_id, signal)
    }

    /// Touch cancel / pointer capture loss.
    pub fn pointer_cancel(&mut self, cell_id: CellId) -> bool {
        self.gestures.cancel(cell_id, CancelReason::Released)
    }

    /// Frame tokens the host should tick.
    pub fn scheduled_frames(&self) -> Vec<FrameToken> {
        self.gestures.scheduled_frames()
    }

    pub fn on_frame(&mut self, token: FrameToken, now: Instant) -> GestureSignal {
        let signal = self.gestures.on_frame(token, now);
        self.apply_signal(token.cell_id(), signal)
    }

    /// Ticks every scheduled frame; returns the signals that did something.
    pub fn tick(&mut self, now: Instant) -> Vec<(CellId, GestureSignal)> {
        self.scheduled_frames()
            .into_iter()
            .map(|token| (token.cell_id(), self.on_frame(token, now)))
            .filter(|(_, signal)| *signal != GestureSignal::Ignored)
            .collect()
    }

    pub fn is_gesture_in_flight(&self, cell_id: CellId) -> bool {
        self.gestures.is_in_flight(cell_id)
    }

    pub fn gesture_progress(&self, cell_id: CellId, now: Instant) -> Option<f32> {
        self.gestures.progress(cell_id, now)
    }

    fn apply_signal(&mut self, cell_id: CellId, signal: GestureSignal) -> GestureSignal {
        if signal.is_completed() {
            self.complete_cell(cell_id);
        }
        signal
    }

    fn complete_cell(&mut self, cell_id: CellId) {
        let Some(cell) = self.cells.iter_mut().find(|cell| cell.id == cell_id) else {
            return;
        };
        if cell.completed || self.layout.is_free_space(cell.position) {
            return;
        }
        cell.completed = true;
        info!(
            "event=cell_complete module=interaction status=ok cell_id={} position={}",
            cell_id, cell.position
        );
        self.outbox.push(Mutation::CellCompletion {
            cell_id,
            completed: true,
        });
    }

    // --- outbox / notices ---

    pub fn pending_mutations(&self) -> &[Mutation] {
        &self.outbox
    }

    /// Drains queued mutations in the order they were confirmed.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.outbox)
    }

    /// Records a failed write. Local state stays as it is.
    pub fn report_failure(&mut self, mutation: Mutation, detail: &str) {
        warn!(
            "event=mutation_failed module=interaction status=error kind={} grid_id={} error={}",
            mutation.kind(),
            self.grid_id,
            detail
        );
        self.notices.push(Notice {
            message: mutation.failure_message().to_string(),
            mutation,
        });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // --- rendering ---

    pub fn cell_views(&self, now: Instant) -> Vec<CellView> {
        self.cells
            .iter()
            .map(|cell| {
                let is_free_space = self.layout.is_free_space(cell.position);
                let editing = self.edit.is_editing(EditTarget::Cell(cell.id));
                let content = if is_free_space {
                    CellContent::FreeSpace
                } else if editing {
                    CellContent::Editing(self.edit.buffer().unwrap_or_default().to_string())
                } else if cell.text.is_empty() {
                    CellContent::Placeholder
                } else {
                    CellContent::Goal(cell.text.clone())
                };
                CellView {
                    cell_id: cell.id,
                    position: cell.position,
                    tone: self.layout.tone(cell.position),
                    is_free_space,
                    completed: cell.completed,
                    editing,
                    progress: if cell.completed || is_free_space {
                        None
                    } else {
                        self.gestures.progress(cell.id, now)
                    },
                    interactive: !self.read_only && !is_free_space && !cell.completed,
                    content,
                }
            })
            .collect()
    }

    /// Quote as displayed outside edit mode.
    pub fn quote_label(&self) -> String {
        if self.quote.is_empty() {
            EMPTY_QUOTE_PLACEHOLDER.to_string()
        } else {
            format!("\"{}\"", self.quote)
        }
    }

    /// Cancels every gesture and drops any open edit without committing.
    pub fn teardown(&mut self) {
        let cancelled = self.gestures.cancel_all(CancelReason::Teardown);
        let abandoned = self.edit.abandon();
        info!(
            "event=view_teardown module=interaction status=ok grid_id={} cancelled_gestures={} abandoned_edit={}",
            self.grid_id,
            cancelled.len(),
            abandoned.is_some()
        );
    }
}
