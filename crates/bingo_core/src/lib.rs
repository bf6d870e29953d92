//! Core domain logic for goal bingo cards.
//! This crate is the single source of truth for card invariants and the grid
//! interaction state machine.

pub mod db;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use interaction::config::{GestureKind, InteractionConfig};
pub use interaction::edit::{EditController, EditTarget};
pub use interaction::frame::{FrameLease, FrameRegistry, FrameToken};
pub use interaction::gesture::{
    CancelReason, CornerCoverage, FeedbackPulse, GestureRecognizer, GestureSignal,
    GestureStrategy, Point, PointerSample, Quadrant, Size, SwipeCount, TimedHold,
};
pub use interaction::view_model::{CellContent, CellView, GridViewModel, Mutation, Notice};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, AccountId};
pub use model::grid::{
    checkerboard_tone, Cell, CellId, CellTone, Grid, GridId, GridLayout, GridValidationError,
};
pub use repo::account_repo::{AccountRepository, SqliteAccountRepository};
pub use repo::grid_repo::{GridRepository, OwnerRef, SqliteGridRepository};
pub use repo::{RepoError, RepoResult};
pub use service::card_service::{CardService, CardServiceError, Registration};
pub use service::dispatch::{dispatch_mutations, DispatchReport};
pub use service::share::{share_url, InvalidBaseUrl};
