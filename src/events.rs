use crate::tree::NodeId;

/// Notifications for the presentation layer. Raised at most once per user
/// action and never by passive scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    SelectionChanged(NodeId),
    NodeOpened(NodeId),
    NodeClosed(NodeId),
}
