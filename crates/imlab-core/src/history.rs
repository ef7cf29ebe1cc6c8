//! Undo/redo history of image snapshots.
//!
//! The caller owns the "current" image. Before every mutating operation it
//! calls [`HistoryManager::snapshot`]; undo and redo hand back the image that
//! should become current and keep the one being replaced on the opposite stack.
//!
//! Snapshots are deep copies. Nothing the caller later does to its working
//! buffer can reach a stored state.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::raster::RasterImage;

/// Two-stack snapshot history.
///
/// Stacks are unbounded unless a limit is set with [`HistoryManager::with_limit`],
/// in which case the oldest undo state is dropped once the limit is reached.
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    past: VecDeque<RasterImage>,
    future: Vec<RasterImage>,
    limit: Option<usize>,
}

impl HistoryManager {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `limit` undo states (minimum 1).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::default()
        }
    }

    /// Maximum undo depth, if bounded.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Record `current` as an undo state and discard the redo branch.
    pub fn snapshot(&mut self, current: &RasterImage) {
        self.push_past(current.clone());
        self.future.clear();
        debug!("history: snapshot (past={})", self.past.len());
    }

    /// Step back one state.
    ///
    /// Returns the image that should become current, or `None` (leaving both
    /// stacks untouched) when there is nothing to undo.
    pub fn undo(&mut self, current: &RasterImage) -> Option<RasterImage> {
        let previous = self.past.pop_back()?;
        self.future.push(current.clone());
        debug!(
            "history: undo (past={}, future={})",
            self.past.len(),
            self.future.len()
        );
        Some(previous)
    }

    /// Step forward one state; the mirror of [`HistoryManager::undo`].
    pub fn redo(&mut self, current: &RasterImage) -> Option<RasterImage> {
        let next = self.future.pop()?;
        self.push_past(current.clone());
        debug!(
            "history: redo (past={}, future={})",
            self.past.len(),
            self.future.len()
        );
        Some(next)
    }

    /// Drop every stored state, e.g. when a new image is opened.
    pub fn reset(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo states.
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redo states.
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    fn push_past(&mut self, image: RasterImage) {
        if let Some(limit) = self.limit {
            while self.past.len() >= limit {
                self.past.pop_front();
                warn!("history: limit of {} reached, oldest state dropped", limit);
            }
        }
        self.past.push_back(image);
    }
}
