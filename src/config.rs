//! Viewport and behaviour settings supplied alongside a root node.

use thiserror::Error;

/// Extra slots rendered beyond what the viewport strictly needs, masking
/// jitter while scrolling.
pub const DEFAULT_OVERSCAN: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("item height must be greater than zero")]
    ZeroItemHeight,
    #[error("a zero-height viewport with no overscan can never render a node")]
    EmptyWindow,
}

/// Configuration consumed by [`crate::engine::VirtualTree::set_root`].
///
/// All sizes are in pixels from the core's point of view. The terminal
/// front-end simply uses one pixel per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Include the root itself in the display list.
    pub show_root: bool,
    pub viewport_height_px: u32,
    pub item_height_px: u32,
    pub indent_unit_px: u32,
    /// Whether nodes with children may be selected.
    pub select_parent_allowed: bool,
    /// Defer splicing of lazy nodes until the caller supplies children.
    pub lazy_loading_enabled: bool,
    pub overscan: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            show_root: true,
            viewport_height_px: 100,
            item_height_px: 20,
            indent_unit_px: 20,
            select_parent_allowed: false,
            lazy_loading_enabled: false,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

impl TreeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_height_px == 0 {
            return Err(ConfigError::ZeroItemHeight);
        }
        if self.viewport_height_px == 0 && self.overscan == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(())
    }

    /// Number of render slots: `ceil(viewport / item) + overscan`.
    pub fn slot_count(&self) -> usize {
        let item = self.item_height_px.max(1);
        self.viewport_height_px.div_ceil(item) as usize + self.overscan
    }

    pub fn with_viewport_height(mut self, px: u32) -> Self {
        self.viewport_height_px = px;
        self
    }

    pub fn with_item_height(mut self, px: u32) -> Self {
        self.item_height_px = px;
        self
    }

    pub fn with_show_root(mut self, show_root: bool) -> Self {
        self.show_root = show_root;
        self
    }

    pub fn with_select_parent(mut self, allowed: bool) -> Self {
        self.select_parent_allowed = allowed;
        self
    }

    pub fn with_lazy_loading(mut self, enabled: bool) -> Self {
        self.lazy_loading_enabled = enabled;
        self
    }
}
