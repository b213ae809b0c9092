//! Virtualized tree view engine.
//!
//! The library core ([`engine`], [`tree`], [`window`]) keeps a flattened,
//! filterable display list of an arbitrarily large tree and a render window
//! sized to the viewport, so presentation cost stays proportional to what is
//! on screen. The remaining modules make up the terminal front-end shipped
//! as the `term-vtree` binary.

pub mod app;
pub mod components;
pub mod config;
pub mod drivers;
pub mod engine;
pub mod event_loop;
pub mod events;
pub mod keybindings;
pub mod loader;
pub mod theme;
pub mod tracing_sub;
pub mod tree;
pub mod window;

pub use config::{ConfigError, TreeConfig};
pub use engine::{NodeStatus, RenderedNode, VirtualTree};
pub use events::TreeEvent;
pub use tree::{LabelMatcher, NodeId, SubstringMatcher, TreeNode};
