//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into card-level use-cases.
//! - Bridge view-model outboxes to the persistence gateway.

pub mod card_service;
pub mod dispatch;
pub mod share;
