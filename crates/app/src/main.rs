mod session;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use edgeviz_graph::{
    LayoutCoordinator, LayoutParams, LayoutRequest, Mode, DEFAULT_MAX_TREE_DEPTH,
    DEFAULT_MAX_TREE_NODES,
};
use session::{render, Session};
use tracing::debug;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Edge list with one `source,target` pair per line, read from stdin when omitted
    input: Option<PathBuf>,

    /// Visualization mode: force, tree, topo or arc
    #[arg(short, long, default_value = "force")]
    mode: Mode,

    /// Root node of the tree and arc layouts
    #[arg(short, long)]
    root: Option<String>,

    /// Target link length handed to the force layout
    #[arg(long, default_value_t = 50.0)]
    edge_length: f32,

    /// Node radius handed to the renderer
    #[arg(long, default_value_t = 10.0)]
    node_size: f32,

    /// Maximum number of nodes a tree expansion may create
    #[arg(long, default_value_t = DEFAULT_MAX_TREE_NODES)]
    max_tree_nodes: usize,

    /// Maximum number of nodes on any root-to-leaf path of a tree
    #[arg(long, default_value_t = DEFAULT_MAX_TREE_DEPTH)]
    max_tree_depth: usize,

    /// Read commands from stdin instead of printing a single scene
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let coordinator = LayoutCoordinator::new(LayoutParams {
        edge_length: args.edge_length,
        node_size: args.node_size,
    })
    .with_max_tree_nodes(args.max_tree_nodes)
    .with_max_tree_depth(args.max_tree_depth);

    if args.interactive {
        let mut session = Session::new(coordinator);
        if let Some(path) = &args.input {
            session.load(path)?;
            debug!("Session starts with {} bytes of edge list", session.text().len());
        }
        return session.run(std::io::stdin().lock(), std::io::stdout().lock());
    }

    let request = LayoutRequest {
        mode: args.mode,
        text: read_input(args.input.as_deref())?,
        root: args.root,
    };
    debug!("Single {} build", request.mode);

    let scene = coordinator
        .build(&request)
        .with_context(|| format!("Failed to build the {} layout", request.mode))?;
    println!("{}", render(&scene)?);

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read edge list from {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read edge list from stdin")?;
            Ok(text)
        }
    }
}
