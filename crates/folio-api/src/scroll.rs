//! Observable state of an infinite-scroll list

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollPhase {
    Idle,
    LoadingInitial,
    LoadingMore,
    Error,
    Complete,
}

impl ScrollPhase {
    pub fn is_loading(self) -> bool {
        matches!(self, ScrollPhase::LoadingInitial | ScrollPhase::LoadingMore)
    }
}

/// Snapshot of a pagination engine's state.
///
/// Readers always receive a copy; mutating it has no effect on the engine.
/// `items` is in arrival order and unique by id.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollState<T> {
    pub phase: ScrollPhase,
    pub current_page: u32,
    pub next_token: Option<String>,
    pub items: Vec<T>,
    pub total_known: Option<u64>,
    pub error_message: Option<String>,
}

impl<T> ScrollState<T> {
    pub fn new() -> Self {
        Self {
            phase: ScrollPhase::Idle,
            current_page: 0,
            next_token: None,
            items: Vec::new(),
            total_known: None,
            error_message: None,
        }
    }
}

impl<T> Default for ScrollState<T> {
    fn default() -> Self {
        Self::new()
    }
}
