mod window_manager;

pub use window_manager::WindowManager;

use crate::tree::NodeId;

/// A filled render slot: one display-list entry plus where to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSlot {
    pub id: NodeId,
    pub display_index: usize,
    /// Absolute offset from the top of the scrollable content.
    pub top_px: u64,
}
