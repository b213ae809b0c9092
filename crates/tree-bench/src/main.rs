use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use term_vtree::loader::synthetic_tree;
use term_vtree::{NodeId, TreeConfig, VirtualTree};

#[derive(Parser, Debug)]
#[command(
    name = "tree-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Times the tree engine on a generated tree"
)]
struct BenchCli {
    /// Nodes in the generated tree, root included.
    #[arg(short = 'n', long = "nodes", value_name = "N", default_value_t = 1_000_000)]
    nodes: usize,

    /// Children per inner node.
    #[arg(short = 'k', long = "fanout", value_name = "K", default_value_t = 10)]
    fanout: usize,

    /// Viewport height in pixels.
    #[arg(long = "viewport", value_name = "PX", default_value_t = 600)]
    viewport_px: u32,

    /// Row height in pixels.
    #[arg(long = "item", value_name = "PX", default_value_t = 20)]
    item_px: u32,

    /// Substring used for the filter pass.
    #[arg(long = "filter", value_name = "TEXT", default_value = "node-9")]
    filter: String,
}

struct BenchStats {
    build: Duration,
    set_root: Duration,
    open_subtree: Duration,
    opened_rows: usize,
    collapse: Duration,
    reexpand: Duration,
    scroll_steps: usize,
    scroll_total: Duration,
    scroll_worst: Duration,
    filter: Duration,
    filtered_rows: usize,
    clear: Duration,
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

/// Every node below `top` (inclusive) in pre-order.
fn subtree(tree: &VirtualTree, top: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![top];
    while let Some(id) = stack.pop() {
        out.push(id);
        stack.extend(tree.children(id).iter().rev().copied());
    }
    out
}

fn run(cli: &BenchCli) -> io::Result<BenchStats> {
    let config = TreeConfig::default()
        .with_viewport_height(cli.viewport_px)
        .with_item_height(cli.item_px);

    let (root, build) = timed(|| synthetic_tree(cli.nodes, cli.fanout));
    let mut tree = VirtualTree::new();
    let (attached, set_root) = timed(|| tree.set_root(root, config));
    attached.map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    let top = tree
        .root()
        .and_then(|root| tree.children(root).first().copied())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "tree needs at least 2 nodes"))?;

    let ids = subtree(&tree, top);
    let ((), open_subtree) = timed(|| {
        for &id in &ids {
            tree.expand(id);
        }
    });
    let opened_rows = tree.display_len();
    let ((), collapse) = timed(|| tree.collapse(top));
    let ((), reexpand) = timed(|| tree.expand(top));

    let step = u64::from(cli.item_px);
    let max = tree.max_scroll_offset_px();
    let mut scroll_steps = 0;
    let mut scroll_total = Duration::ZERO;
    let mut scroll_worst = Duration::ZERO;
    let mut offset = 0;
    while offset <= max {
        let (_, took) = timed(|| tree.on_scroll(offset));
        scroll_total += took;
        scroll_worst = scroll_worst.max(took);
        scroll_steps += 1;
        offset += step;
    }

    let ((), filter) = timed(|| tree.filter(&cli.filter));
    let filtered_rows = tree.display_len();
    let ((), clear) = timed(|| tree.clear_filter());
    let _ = tree.drain_events().count();

    Ok(BenchStats {
        build,
        set_root,
        open_subtree,
        opened_rows,
        collapse,
        reexpand,
        scroll_steps,
        scroll_total,
        scroll_worst,
        filter,
        filtered_rows,
        clear,
    })
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

impl BenchStats {
    fn report(&self, cli: &BenchCli) -> String {
        let per_step_us = if self.scroll_steps == 0 {
            0.0
        } else {
            self.scroll_total.as_secs_f64() * 1_000_000.0 / self.scroll_steps as f64
        };
        indoc::formatdoc!(
            r#"
            Tree bench: {nodes} nodes, fanout {fanout}, {viewport}px viewport, {item}px rows.
            Build: {build:.2} ms | set_root: {set_root:.2} ms
            Open subtree: {open:.2} ms ({rows} rows listed)
            Collapse: {collapse:.3} ms | Re-expand: {reexpand:.3} ms
            Scroll sweep: {steps} steps, avg {per_step:.2} us, worst {worst:.3} ms
            Filter "{text}": {filter:.2} ms ({filtered} rows) | Clear: {clear:.2} ms
            "#,
            nodes = cli.nodes,
            fanout = cli.fanout,
            viewport = cli.viewport_px,
            item = cli.item_px,
            build = ms(self.build),
            set_root = ms(self.set_root),
            open = ms(self.open_subtree),
            rows = self.opened_rows,
            collapse = ms(self.collapse),
            reexpand = ms(self.reexpand),
            steps = self.scroll_steps,
            per_step = per_step_us,
            worst = ms(self.scroll_worst),
            text = cli.filter,
            filter = ms(self.filter),
            filtered = self.filtered_rows,
            clear = ms(self.clear),
        )
    }
}

fn main() -> io::Result<()> {
    let cli = BenchCli::parse();
    let stats = run(&cli)?;
    print!("{}", stats.report(&cli));
    Ok(())
}
