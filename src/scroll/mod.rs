//! Auto-scroll policy for the transcript viewport
//!
//! Appending a message never scrolls directly. It records a pending request;
//! the front-end reports layout with [`ScrollManager::update_layout`] and,
//! once the new entry is laid out, calls [`ScrollManager::apply_pending_scroll`]
//! to learn whether to smooth-scroll the end marker into view.

use crate::transcript::MessageKind;

/// Distance (in layout units) from the bottom within which the viewport
/// still counts as following the tail.
pub const FOLLOW_THRESHOLD: f32 = 200.0;

/// Layout snapshot of the transcript viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    /// Top edge of the end-of-transcript marker
    pub end_marker_top: f32,
    /// Top edge of the visible scroll region
    pub viewport_top: f32,
    /// Height of the visible scroll region
    pub viewport_height: f32,
}

impl ViewportMetrics {
    pub fn new(end_marker_top: f32, viewport_top: f32, viewport_height: f32) -> Self {
        Self {
            end_marker_top,
            viewport_top,
            viewport_height,
        }
    }

    /// How far the end marker sits below the bottom edge of the viewport
    ///
    /// Negative when the marker is already visible.
    pub fn distance_to_bottom(&self) -> f32 {
        (self.end_marker_top - self.viewport_top) - self.viewport_height
    }

    /// Whether the viewport is close enough to the tail to keep following it
    pub fn is_near_bottom(&self) -> bool {
        self.distance_to_bottom() <= FOLLOW_THRESHOLD
    }
}

/// Decides when appended messages pull the viewport to the bottom
#[derive(Debug, Default)]
pub struct ScrollManager {
    metrics: ViewportMetrics,
    pending_scroll_to_bottom: bool,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest layout reported by the front-end
    pub fn update_layout(&mut self, metrics: ViewportMetrics) {
        self.metrics = metrics;
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll_to_bottom
    }

    /// Apply the policy for a message of `kind` that is about to be appended
    ///
    /// The user's own messages always scroll. Agent and status messages only
    /// scroll when the viewport was near the bottom before the append, so a
    /// user reading history is not pulled away from it. Returns whether a
    /// scroll is now pending.
    pub fn on_append(&mut self, kind: MessageKind) -> bool {
        let follow = match kind {
            MessageKind::User => true,
            MessageKind::Agent | MessageKind::Status => self.metrics.is_near_bottom(),
        };

        if follow {
            self.pending_scroll_to_bottom = true;
        } else {
            tracing::trace!(
                distance = self.metrics.distance_to_bottom(),
                "Viewport away from bottom; not following"
            );
        }
        self.pending_scroll_to_bottom
    }

    /// Consume the pending request
    ///
    /// Returns `true` if the front-end should smooth-scroll the end marker
    /// into view now that layout has settled.
    pub fn apply_pending_scroll(&mut self) -> bool {
        std::mem::take(&mut self.pending_scroll_to_bottom)
    }
}
