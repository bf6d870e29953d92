//! Grid interaction state machine.
//!
//! # Responsibility
//! - Turn pointer input into completion decisions (`gesture`).
//! - Own the single edit slot (`edit`).
//! - Present cell/quote state and queue confirmed mutations (`view_model`).
//!
//! # Invariants
//! - Single-threaded: everything here runs on the input-handling thread.
//! - Animated gesture sessions hold a frame lease for exactly their lifetime.

pub mod config;
pub mod edit;
pub mod frame;
pub mod gesture;
pub mod view_model;
