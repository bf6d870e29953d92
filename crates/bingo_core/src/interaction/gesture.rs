//! Gesture recognition: pointer activity on one cell -> completion signal.
//!
//! # Responsibility
//! - Define the interchangeable [`GestureStrategy`] contract and its three
//!   variants: [`TimedHold`], [`CornerCoverage`], [`SwipeCount`].
//! - Own frame leases for animated sessions through [`GestureRecognizer`].
//!
//! # Invariants
//! - At most one in-flight session per cell; a second press is ignored.
//! - `Completed` is emitted once per session and the session is discarded
//!   in the same step.
//! - Hold progress is derived from elapsed time only, never from frame count.
//! - Eligibility (free space, completed, editing, read-only) is checked by the
//!   caller before `press`; the recognizer only tracks pointer state.

use crate::interaction::config::{GestureKind, InteractionConfig};
use crate::interaction::frame::{FrameLease, FrameRegistry, FrameToken};
use crate::model::grid::CellId;
use log::debug;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Pointer position in cell-local pixels (origin at the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Rendered cell size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// One pointer or touch observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Point,
    pub cell_size: Size,
    /// Monotonic timestamp of the observation.
    pub at: Instant,
}

impl PointerSample {
    pub fn new(position: Point, cell_size: Size, at: Instant) -> Self {
        Self {
            position,
            cell_size,
            at,
        }
    }
}

/// Haptic/visual feedback strength requested by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackPulse {
    Light,
    Strong,
}

/// Why an in-flight session ended without completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Pointer left the movement tolerance.
    Moved,
    /// Pointer released or touch cancelled early.
    Released,
    /// Pointer released, but the motion did not qualify.
    NotRecognized,
    /// An edit session started.
    Superseded,
    /// The owning view was torn down.
    Teardown,
}

impl CancelReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Moved => "moved",
            Self::Released => "released",
            Self::NotRecognized => "not_recognized",
            Self::Superseded => "superseded",
            Self::Teardown => "teardown",
        }
    }
}

/// Outcome of feeding one input to a strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureSignal {
    /// Nothing changed.
    Ignored,
    Started { pulse: FeedbackPulse },
    /// Progress toward completion in `0.0..1.0`.
    Advanced { progress: f32 },
    Cancelled(CancelReason),
    /// Fires once; the cell should now be marked complete.
    Completed { pulse: FeedbackPulse },
}

impl GestureSignal {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    fn ends_session(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Cancelled(_))
    }
}

/// Interchangeable completion gesture.
///
/// Strategies keep their own per-cell accumulators. "In flight" means the
/// cell holds progress that an interruption would discard; tallies that
/// survive interruptions are not in flight.
pub trait GestureStrategy {
    fn kind(&self) -> GestureKind;
    /// Whether a press on an empty goal must be refused.
    fn requires_goal_text(&self) -> bool;
    /// Whether in-flight sessions need per-frame progress updates.
    fn needs_frames(&self) -> bool;

    fn press(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal;
    fn pointer_move(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal;
    fn release(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal;
    fn frame(&mut self, cell_id: CellId, now: Instant) -> GestureSignal;

    /// Drops the in-flight session for `cell_id`; returns whether one existed.
    fn interrupt(&mut self, cell_id: CellId) -> bool;
    fn is_in_flight(&self, cell_id: CellId) -> bool;
    fn in_flight_cells(&self) -> Vec<CellId>;
    /// Visible progress in `0.0..=1.0`, or `None` when nothing accumulated.
    fn progress(&self, cell_id: CellId, now: Instant) -> Option<f32>;
}

#[derive(Debug, Clone, Copy)]
struct HoldSession {
    origin: Point,
    started_at: Instant,
}

/// Press and hold still for a fixed duration.
#[derive(Debug)]
pub struct TimedHold {
    hold: Duration,
    tolerance_px: f32,
    sessions: HashMap<CellId, HoldSession>,
}

impl TimedHold {
    pub fn new(hold: Duration, tolerance_px: f32) -> Self {
        Self {
            hold,
            tolerance_px,
            sessions: HashMap::new(),
        }
    }

    fn held_long_enough(&self, session: &HoldSession, now: Instant) -> bool {
        now.saturating_duration_since(session.started_at) >= self.hold
    }

    fn fraction(&self, session: &HoldSession, now: Instant) -> f32 {
        if self.hold.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(session.started_at);
        (elapsed.as_secs_f32() / self.hold.as_secs_f32()).min(1.0)
    }

    /// Completes the session if the hold elapsed, otherwise reports progress.
    fn advance(&mut self, cell_id: CellId, now: Instant) -> GestureSignal {
        let Some(session) = self.sessions.get(&cell_id).copied() else {
            return GestureSignal::Ignored;
        };
        if self.held_long_enough(&session, now) {
            self.sessions.remove(&cell_id);
            return GestureSignal::Completed {
                pulse: FeedbackPulse::Strong,
            };
        }
        GestureSignal::Advanced {
            progress: self.fraction(&session, now),
        }
    }
}

impl GestureStrategy for TimedHold {
    fn kind(&self) -> GestureKind {
        GestureKind::TimedHold
    }

    fn requires_goal_text(&self) -> bool {
        true
    }

    fn needs_frames(&self) -> bool {
        true
    }

    fn press(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        if self.sessions.contains_key(&cell_id) {
            return GestureSignal::Ignored;
        }
        self.sessions.insert(
            cell_id,
            HoldSession {
                origin: sample.position,
                started_at: sample.at,
            },
        );
        GestureSignal::Started {
            pulse: FeedbackPulse::Light,
        }
    }

    fn pointer_move(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        let Some(session) = self.sessions.get(&cell_id).copied() else {
            return GestureSignal::Ignored;
        };
        if self.held_long_enough(&session, sample.at) {
            return self.advance(cell_id, sample.at);
        }
        let dx = (sample.position.x - session.origin.x).abs();
        let dy = (sample.position.y - session.origin.y).abs();
        if dx > self.tolerance_px || dy > self.tolerance_px {
            self.sessions.remove(&cell_id);
            return GestureSignal::Cancelled(CancelReason::Moved);
        }
        GestureSignal::Advanced {
            progress: self.fraction(&session, sample.at),
        }
    }

    fn release(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        match self.advance(cell_id, sample.at) {
            GestureSignal::Advanced { .. } => {
                self.sessions.remove(&cell_id);
                GestureSignal::Cancelled(CancelReason::Released)
            }
            other => other,
        }
    }

    fn frame(&mut self, cell_id: CellId, now: Instant) -> GestureSignal {
        self.advance(cell_id, now)
    }

    fn interrupt(&mut self, cell_id: CellId) -> bool {
        self.sessions.remove(&cell_id).is_some()
    }

    fn is_in_flight(&self, cell_id: CellId) -> bool {
        self.sessions.contains_key(&cell_id)
    }

    fn in_flight_cells(&self) -> Vec<CellId> {
        self.sessions.keys().copied().collect()
    }

    fn progress(&self, cell_id: CellId, now: Instant) -> Option<f32> {
        self.sessions
            .get(&cell_id)
            .map(|session| self.fraction(session, now))
    }
}

/// Geometric quadrant of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// Locates `position` within a cell of `size`.
    pub fn locate(position: Point, size: Size) -> Self {
        let left = position.x < size.width / 2.0;
        let top = position.y < size.height / 2.0;
        match (top, left) {
            (true, true) => Self::TopLeft,
            (true, false) => Self::TopRight,
            (false, true) => Self::BottomLeft,
            (false, false) => Self::BottomRight,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomLeft => 2,
            Self::BottomRight => 3,
        }
    }
}

/// Tap all four quadrants of a cell, in any order.
///
/// The covered set clears on completion and is dropped on interruption.
#[derive(Debug, Default)]
pub struct CornerCoverage {
    covered: HashMap<CellId, [bool; 4]>,
}

impl CornerCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    fn covered_count(corners: &[bool; 4]) -> usize {
        corners.iter().filter(|hit| **hit).count()
    }
}

impl GestureStrategy for CornerCoverage {
    fn kind(&self) -> GestureKind {
        GestureKind::CornerCoverage
    }

    fn requires_goal_text(&self) -> bool {
        false
    }

    fn needs_frames(&self) -> bool {
        false
    }

    fn press(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        let quadrant = Quadrant::locate(sample.position, sample.cell_size);
        let corners = self.covered.entry(cell_id).or_default();
        if corners[quadrant.index()] {
            return GestureSignal::Ignored;
        }
        let first = Self::covered_count(corners) == 0;
        corners[quadrant.index()] = true;

        let count = Self::covered_count(corners);
        if count == corners.len() {
            self.covered.remove(&cell_id);
            return GestureSignal::Completed {
                pulse: FeedbackPulse::Strong,
            };
        }
        if first {
            GestureSignal::Started {
                pulse: FeedbackPulse::Light,
            }
        } else {
            GestureSignal::Advanced {
                progress: count as f32 / 4.0,
            }
        }
    }

    fn pointer_move(&mut self, _cell_id: CellId, _sample: &PointerSample) -> GestureSignal {
        GestureSignal::Ignored
    }

    fn release(&mut self, _cell_id: CellId, _sample: &PointerSample) -> GestureSignal {
        GestureSignal::Ignored
    }

    fn frame(&mut self, _cell_id: CellId, _now: Instant) -> GestureSignal {
        GestureSignal::Ignored
    }

    fn interrupt(&mut self, cell_id: CellId) -> bool {
        self.covered.remove(&cell_id).is_some()
    }

    fn is_in_flight(&self, cell_id: CellId) -> bool {
        self.covered.contains_key(&cell_id)
    }

    fn in_flight_cells(&self) -> Vec<CellId> {
        self.covered.keys().copied().collect()
    }

    fn progress(&self, cell_id: CellId, _now: Instant) -> Option<f32> {
        self.covered
            .get(&cell_id)
            .map(|corners| Self::covered_count(corners) as f32 / 4.0)
    }
}

#[derive(Debug, Default)]
struct SwipeTally {
    origin: Option<Point>,
    count: u32,
}

/// Several dominant-horizontal swipes across a cell.
///
/// The tally survives failed attempts and resets only after completion.
#[derive(Debug)]
pub struct SwipeCount {
    min_distance_px: f32,
    required: u32,
    tallies: HashMap<CellId, SwipeTally>,
}

impl SwipeCount {
    pub fn new(min_distance_px: f32, required: u32) -> Self {
        Self {
            min_distance_px,
            required,
            tallies: HashMap::new(),
        }
    }

    fn qualifies(&self, origin: Point, end: Point) -> bool {
        let dx = (end.x - origin.x).abs();
        let dy = (end.y - origin.y).abs();
        dx > dy && dx > self.min_distance_px
    }
}

impl GestureStrategy for SwipeCount {
    fn kind(&self) -> GestureKind {
        GestureKind::SwipeCount
    }

    fn requires_goal_text(&self) -> bool {
        false
    }

    fn needs_frames(&self) -> bool {
        false
    }

    fn press(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        let tally = self.tallies.entry(cell_id).or_default();
        if tally.origin.is_some() {
            return GestureSignal::Ignored;
        }
        tally.origin = Some(sample.position);
        GestureSignal::Started {
            pulse: FeedbackPulse::Light,
        }
    }

    fn pointer_move(&mut self, _cell_id: CellId, _sample: &PointerSample) -> GestureSignal {
        GestureSignal::Ignored
    }

    fn release(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        let Some(origin) = self
            .tallies
            .get_mut(&cell_id)
            .and_then(|tally| tally.origin.take())
        else {
            return GestureSignal::Ignored;
        };
        if !self.qualifies(origin, sample.position) {
            return GestureSignal::Cancelled(CancelReason::NotRecognized);
        }

        let required = self.required;
        let Some(tally) = self.tallies.get_mut(&cell_id) else {
            return GestureSignal::Ignored;
        };
        tally.count += 1;
        if tally.count >= required {
            self.tallies.remove(&cell_id);
            return GestureSignal::Completed {
                pulse: FeedbackPulse::Strong,
            };
        }
        GestureSignal::Advanced {
            progress: tally.count as f32 / required as f32,
        }
    }

    fn frame(&mut self, _cell_id: CellId, _now: Instant) -> GestureSignal {
        GestureSignal::Ignored
    }

    fn interrupt(&mut self, cell_id: CellId) -> bool {
        self.tallies
            .get_mut(&cell_id)
            .and_then(|tally| tally.origin.take())
            .is_some()
    }

    fn is_in_flight(&self, cell_id: CellId) -> bool {
        self.tallies
            .get(&cell_id)
            .is_some_and(|tally| tally.origin.is_some())
    }

    fn in_flight_cells(&self) -> Vec<CellId> {
        self.tallies
            .iter()
            .filter(|(_, tally)| tally.origin.is_some())
            .map(|(cell_id, _)| *cell_id)
            .collect()
    }

    fn progress(&self, cell_id: CellId, _now: Instant) -> Option<f32> {
        self.tallies
            .get(&cell_id)
            .filter(|tally| tally.count > 0 || tally.origin.is_some())
            .map(|tally| tally.count as f32 / self.required as f32)
    }
}

/// Drives one strategy and keeps frame leases in step with its sessions.
pub struct GestureRecognizer {
    strategy: Box<dyn GestureStrategy>,
    frames: FrameRegistry,
    leases: HashMap<CellId, FrameLease>,
}

impl GestureRecognizer {
    pub fn new(strategy: Box<dyn GestureStrategy>) -> Self {
        Self {
            strategy,
            frames: FrameRegistry::new(),
            leases: HashMap::new(),
        }
    }

    pub fn from_config(config: &InteractionConfig) -> Self {
        Self::new(config.build_strategy())
    }

    pub fn kind(&self) -> GestureKind {
        self.strategy.kind()
    }

    pub fn requires_goal_text(&self) -> bool {
        self.strategy.requires_goal_text()
    }

    pub fn press(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        let signal = self.strategy.press(cell_id, sample);
        self.settle(cell_id, signal)
    }

    pub fn pointer_move(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        let signal = self.strategy.pointer_move(cell_id, sample);
        self.settle(cell_id, signal)
    }

    pub fn release(&mut self, cell_id: CellId, sample: &PointerSample) -> GestureSignal {
        let signal = self.strategy.release(cell_id, sample);
        self.settle(cell_id, signal)
    }

    /// Handles one scheduled frame; stale tokens are ignored.
    pub fn on_frame(&mut self, token: FrameToken, now: Instant) -> GestureSignal {
        let cell_id = token.cell_id();
        let current = self.leases.get(&cell_id).map(FrameLease::token);
        if current != Some(token) || !self.frames.is_live(token) {
            return GestureSignal::Ignored;
        }
        let signal = self.strategy.frame(cell_id, now);
        self.settle(cell_id, signal)
    }

    /// Tokens that want a frame right now.
    pub fn scheduled_frames(&self) -> Vec<FrameToken> {
        self.frames.live_tokens()
    }

    /// Cancels the in-flight session on `cell_id`, if any.
    pub fn cancel(&mut self, cell_id: CellId, reason: CancelReason) -> bool {
        let had_session = self.strategy.interrupt(cell_id);
        self.leases.remove(&cell_id);
        if had_session {
            debug!(
                "event=gesture_cancel module=interaction status=ok cell_id={} reason={}",
                cell_id,
                reason.as_str()
            );
        }
        had_session
    }

    /// Cancels every in-flight session and returns the affected cells.
    pub fn cancel_all(&mut self, reason: CancelReason) -> Vec<CellId> {
        let cells = self.strategy.in_flight_cells();
        for cell_id in &cells {
            self.cancel(*cell_id, reason);
        }
        self.leases.clear();
        cells
    }

    pub fn is_in_flight(&self, cell_id: CellId) -> bool {
        self.strategy.is_in_flight(cell_id)
    }

    pub fn progress(&self, cell_id: CellId, now: Instant) -> Option<f32> {
        self.strategy.progress(cell_id, now)
    }

    fn settle(&mut self, cell_id: CellId, signal: GestureSignal) -> GestureSignal {
        match signal {
            GestureSignal::Started { .. } => {
                if self.strategy.needs_frames() {
                    self.leases.insert(cell_id, self.frames.acquire(cell_id));
                }
                debug!(
                    "event=gesture_start module=interaction status=ok cell_id={} strategy={}",
                    cell_id,
                    self.strategy.kind().as_str()
                );
            }
            GestureSignal::Cancelled(reason) => {
                debug!(
                    "event=gesture_cancel module=interaction status=ok cell_id={} reason={}",
                    cell_id,
                    reason.as_str()
                );
            }
            GestureSignal::Completed { .. } => {
                debug!(
                    "event=gesture_complete module=interaction status=ok cell_id={} strategy={}",
                    cell_id,
                    self.strategy.kind().as_str()
                );
            }
            GestureSignal::Ignored | GestureSignal::Advanced { .. } => {}
        }
        if signal.ends_session() {
            self.leases.remove(&cell_id);
        }
        signal
    }
}
