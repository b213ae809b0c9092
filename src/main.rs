use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

use term_vtree::app::{App, TreeSource};
use term_vtree::components::DebugLogComponent;
use term_vtree::components::debug_log::set_global_debug_log;
use term_vtree::config::TreeConfig;
use term_vtree::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_vtree::event_loop::{ControlFlow, EventLoop};
use term_vtree::tracing_sub;

#[derive(Parser, Debug)]
#[command(
    name = "term-vtree",
    version = env!("CARGO_PKG_VERSION"),
    about = "Browse a directory (or a generated tree) in a virtualized terminal tree view",
    after_help = indoc::indoc! {"
        Keys:
          Up/Down, j/k      move the cursor
          Right/Left, l/h   open a node or step into it / close it or step out
          Enter             open or close
          Space             select
          /                 filter by substring, Esc clears
          r                 reload the node under the cursor
          F2                show the log pane
          q                 quit
    "}
)]
struct Cli {
    /// Directory to browse.
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Browse a generated tree of this many nodes instead of a directory.
    #[arg(long, value_name = "N", conflicts_with = "path")]
    synthetic: Option<usize>,

    /// Children per node in the generated tree.
    #[arg(long, value_name = "K", default_value_t = 8)]
    fanout: usize,

    /// List the root's children at the top level.
    #[arg(long)]
    hide_root: bool,

    /// Allow selecting nodes that have children.
    #[arg(long)]
    select_parent: bool,

    /// Read the whole directory up front instead of on expand.
    #[arg(long)]
    eager: bool,

    /// Text shown under a directory while it is being listed.
    #[arg(long, value_name = "TEXT", default_value = "Loading...")]
    loading_text: String,

    #[arg(long, value_name = "LEVEL", default_value_t = Level::DEBUG)]
    log_level: Level,
}

impl Cli {
    fn source(&self) -> TreeSource {
        match self.synthetic {
            Some(nodes) => TreeSource::Synthetic {
                nodes,
                fanout: self.fanout,
            },
            None => TreeSource::Path(self.path.clone()),
        }
    }

    /// One terminal row per item, two columns per level.
    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            item_height_px: 1,
            indent_unit_px: 2,
            viewport_height_px: 24,
            ..TreeConfig::default()
        }
        .with_show_root(!self.hide_root)
        .with_select_parent(self.select_parent)
        .with_lazy_loading(!self.eager)
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let (log, handle) = DebugLogComponent::new_default();
    set_global_debug_log(handle);
    tracing_sub::init(cli.log_level);

    let mut app =
        App::new(cli.source(), cli.tree_config(), log)?.with_loading_text(&cli.loading_text);
    tracing::info!(source = ?cli.source(), "tree loaded");

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), Duration::from_millis(16));
    let result = event_loop.run(|event| match event {
        None => {
            app.tick();
            output.draw(|frame| app.draw(frame))?;
            Ok(ControlFlow::Continue)
        }
        Some(event) => Ok(app.handle_event(&event)),
    });
    output.exit()?;
    result
}
