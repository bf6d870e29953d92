//! Cooperative frame scheduling for in-flight gestures.
//!
//! # Responsibility
//! - Hand out one [`FrameLease`] per animated gesture session.
//! - Tell the host which sessions still want a frame.
//!
//! # Invariants
//! - A token is live exactly as long as its lease exists; dropping the lease
//!   unregisters it on every exit path.
//! - Tokens are never reused, so a late frame for a dead session is stale.

use crate::model::grid::CellId;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Identity of one scheduled gesture animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameToken {
    cell_id: CellId,
    generation: u64,
}

impl FrameToken {
    pub fn cell_id(&self) -> CellId {
        self.cell_id
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    live: BTreeSet<FrameToken>,
    next_generation: u64,
}

/// Single-threaded registry of live frame tokens.
#[derive(Debug, Clone, Default)]
pub struct FrameRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh token for `cell_id`.
    pub fn acquire(&self, cell_id: CellId) -> FrameLease {
        let mut state = self.state.borrow_mut();
        state.next_generation += 1;
        let token = FrameToken {
            cell_id,
            generation: state.next_generation,
        };
        state.live.insert(token);
        FrameLease {
            token,
            state: Rc::clone(&self.state),
        }
    }

    pub fn is_live(&self, token: FrameToken) -> bool {
        self.state.borrow().live.contains(&token)
    }

    /// Tokens that still want a frame, in stable order.
    pub fn live_tokens(&self) -> Vec<FrameToken> {
        self.state.borrow().live.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().live.is_empty()
    }
}

/// Scoped registration; releasing it cancels the scheduled frame.
#[derive(Debug)]
pub struct FrameLease {
    token: FrameToken,
    state: Rc<RefCell<RegistryState>>,
}

impl FrameLease {
    pub fn token(&self) -> FrameToken {
        self.token
    }
}

impl Drop for FrameLease {
    fn drop(&mut self) {
        self.state.borrow_mut().live.remove(&self.token);
    }
}
