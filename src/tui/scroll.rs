// Scroll state for the detail panel
//
// The offset counts rendered rows, not logical lines: wrapped text takes
// more rows than it has lines. Render code reports the real content height
// and viewport every frame; the stored offset is clamped to match.

/// Scroll position plus the sizes it is clamped against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    /// Row at the top of the viewport
    offset: usize,

    /// Rendered rows of content
    total: usize,

    /// Rows visible at once
    viewport: usize,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the sizes of the last render and clamp the offset
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Move by `delta` rows (negative scrolls up)
    pub fn scroll_by(&mut self, delta: isize) {
        let moved = self.offset.saturating_add_signed(delta);
        // Sizes are unknown until the first render; that render clamps
        self.offset = if self.total == 0 {
            moved
        } else {
            moved.min(self.max_offset())
        };
    }

    /// Back to the top, e.g. when different content is shown
    pub fn reset(&mut self) {
        self.offset = 0;
        self.total = 0;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Largest offset that still fills the viewport
    pub fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}
