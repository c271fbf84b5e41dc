//! Viewport-driven fetch triggering
//!
//! Any event source (UI scroll callback, timer, test) feeds [`ScrollSample`]s to
//! `PaginationEngine::on_scroll_sample`. Samples are rate-limited by a [`Debouncer`]
//! before the engine looks at them.

use std::time::Duration;
use tokio::time::Instant;

use crate::pagination::FetchOutcome;

/// One observation of the scroll position, in any consistent unit (pixels, rows)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    pub offset: f64,
    pub viewport_extent: f64,
    pub total_extent: f64,
}

impl ScrollSample {
    pub fn new(offset: f64, viewport_extent: f64, total_extent: f64) -> Self {
        Self {
            offset,
            viewport_extent,
            total_extent,
        }
    }

    /// Remaining content below the viewport
    pub fn distance_from_end(&self) -> f64 {
        self.total_extent - self.offset - self.viewport_extent
    }

    /// Within `threshold` of the end. Samples with a non-finite component never are.
    pub fn is_near_end(&self, threshold: f64) -> bool {
        let distance = self.distance_from_end();
        distance.is_finite() && distance <= threshold
    }
}

/// Drops samples that arrive within `interval` of the last accepted one.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    last_accepted: Option<Instant>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(previous) if now.saturating_duration_since(previous) < self.interval => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOptions {
    /// Fetch when the remaining distance is at or below this value
    pub threshold: f64,
    pub debounce: Duration,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            threshold: 300.0,
            debounce: Duration::from_millis(150),
        }
    }
}

/// What the engine did with a scroll sample
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollDecision {
    /// Arrived too soon after the previous accepted sample
    Debounced,
    /// Still farther than the threshold from the end
    NotNearEnd,
    /// Near the end, but the list is empty, loading, failed or complete
    NotReady,
    Fetched(FetchOutcome),
}
