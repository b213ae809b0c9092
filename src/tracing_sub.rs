//! Subscriber setup for the binary. Only this crate's own events reach the
//! log pane; dependencies are cut down to warnings so terminal plumbing does
//! not flood the few rows it has.

use std::io;

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::EitherWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry};

use crate::components::debug_log::{DebugLogWriter, global_debug_log};

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Writes into the registered log pane, or stderr when none is registered.
/// Picked per event, so lines logged before registration still go somewhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct PaneOrStderr;

impl<'a> MakeWriter<'a> for PaneOrStderr {
    type Writer = EitherWriter<DebugLogWriter, io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        match global_debug_log() {
            Some(handle) => EitherWriter::A(handle.writer()),
            None => EitherWriter::B(io::stderr()),
        }
    }
}

/// `level` for this crate, warnings and above for everything else.
pub fn targets(level: Level) -> Targets {
    Targets::new()
        .with_target(OWN_TARGET, level)
        .with_default(Level::WARN.min(level))
}

/// Plain single-line formatter writing to `writer`, filtered by [`targets`].
pub fn pane_layer<W>(level: Level, writer: W) -> impl Layer<Registry> + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .with_filter(targets(level))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(level: Level) {
    let _ = tracing_subscriber::registry()
        .with(pane_layer(level, PaneOrStderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::DebugLogComponent;

    #[test]
    fn own_target_follows_level_others_stay_at_warn() {
        let filter = targets(Level::DEBUG);
        assert!(filter.would_enable("term_vtree::engine::mutation", &Level::DEBUG));
        assert!(!filter.would_enable("term_vtree::engine::mutation", &Level::TRACE));
        assert!(!filter.would_enable("ratatui::buffer", &Level::DEBUG));
        assert!(filter.would_enable("crossterm::terminal", &Level::WARN));
    }

    #[test]
    fn quieter_level_also_quiets_dependencies() {
        let filter = targets(Level::ERROR);
        assert!(!filter.would_enable("term_vtree::app", &Level::WARN));
        assert!(!filter.would_enable("crossterm", &Level::WARN));
        assert!(filter.would_enable("crossterm", &Level::ERROR));
    }

    #[test]
    fn pane_receives_only_kept_events() {
        let (_log, handle) = DebugLogComponent::new(10);
        let subscriber = tracing_subscriber::registry().with(pane_layer(Level::DEBUG, handle.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(rows = 3, "listed");
            tracing::trace!("too fine");
            tracing::debug!(target: "ratatui::buffer", "diffed");
            tracing::warn!(target: "crossterm", "slow terminal");
        });
        let lines = handle.snapshot();
        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines[0].contains("DEBUG") && lines[0].contains("listed rows=3"));
        assert!(lines[1].contains("WARN") && lines[1].contains("slow terminal"));
    }
}
