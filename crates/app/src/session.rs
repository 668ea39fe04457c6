use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use edgeviz_graph::{parse, Layout, LayoutCoordinator, LayoutRequest, Mode, Scene};
use ron::ser::PrettyConfig;
use tracing::{debug, info};

/// Serialize a scene the way it is handed over to the renderer
///
/// Tree depth is already capped by the builder, so ron's own recursion limit
/// is lifted to let every accepted tree through.
pub fn render(scene: &Scene) -> Result<String> {
    ron::Options::default()
        .without_recursion_limit()
        .to_string_pretty(scene, PrettyConfig::default())
        .context("Failed to serialize scene")
}

/// One line of the interactive session
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    Edge(String),
    Clear,
    Build { mode: Mode, root: Option<String> },
    EdgeLength(f32),
    NodeSize(f32),
    Show,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let argument = || {
            if rest.is_empty() {
                Err(anyhow!("`{word}` needs an argument"))
            } else {
                Ok(rest)
            }
        };

        let command = match word {
            "load" => Command::Load(PathBuf::from(argument()?)),
            "edge" => Command::Edge(argument()?.to_string()),
            "clear" => Command::Clear,
            "edge-length" => Command::EdgeLength(
                argument()?
                    .parse()
                    .with_context(|| format!("Invalid edge length {rest:?}"))?,
            ),
            "node-size" => Command::NodeSize(
                argument()?
                    .parse()
                    .with_context(|| format!("Invalid node size {rest:?}"))?,
            ),
            "show" => Command::Show,
            "quit" | "exit" => Command::Quit,
            word => Command::Build {
                mode: word.parse()?,
                root: (!rest.is_empty()).then(|| rest.to_string()),
            },
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// An edge list being edited, and the coordinator rendering it
pub struct Session {
    coordinator: LayoutCoordinator,
    text: String,
}

impl Session {
    pub fn new(coordinator: LayoutCoordinator) -> Self {
        Self {
            coordinator,
            text: String::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn coordinator(&self) -> &LayoutCoordinator {
        &self.coordinator
    }

    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read edge list from {}", path.display()))?;
        info!("Loaded {} lines from {}", self.text.lines().count(), path.display());
        Ok(())
    }

    /// Run every command read from `input` until it ends or `quit` is read
    ///
    /// Command failures are reported on `output` and do not stop the session.
    pub fn run(mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line.context("Failed to read command")?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let flow = line
                .parse::<Command>()
                .and_then(|command| self.run_on(command, &mut output));
            match flow {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => writeln!(output, "error: {e:#}")?,
            }
        }
        Ok(())
    }

    pub fn run_on(&mut self, command: Command, output: &mut impl Write) -> Result<Flow> {
        debug!("Running command: {command:?}");
        match command {
            Command::Load(path) => {
                self.load(&path)?;
                writeln!(output, "loaded {}", path.display())?;
            }
            Command::Edge(record) => {
                parse(&record)?;
                if !self.text.is_empty() && !self.text.ends_with('\n') {
                    self.text.push('\n');
                }
                self.text.push_str(&record);
                self.text.push('\n');
            }
            Command::Clear => self.text.clear(),
            Command::Build { mode, root } => {
                let request = LayoutRequest {
                    mode,
                    text: self.text.clone(),
                    root,
                };
                let scene = self.coordinator.trigger(&request)?;
                writeln!(output, "{}", describe(&scene))?;
            }
            Command::EdgeLength(edge_length) => {
                check_positive(edge_length)?;
                self.coordinator.set_edge_length(edge_length);
            }
            Command::NodeSize(node_size) => {
                check_positive(node_size)?;
                self.coordinator.set_node_size(node_size);
            }
            Command::Show => match self.coordinator().current() {
                Some(scene) => writeln!(output, "{}", render(&scene)?)?,
                None => writeln!(output, "nothing to show yet")?,
            },
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

fn check_positive(value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        bail!("expected a positive number, got {value}");
    }
    Ok(())
}

/// One line status summary of a freshly built scene
fn describe(scene: &Scene) -> String {
    match &scene.layout {
        Layout::Force(model) => format!(
            "force layout: {} nodes, {} edges",
            model.node_count(),
            model.edge_count()
        ),
        Layout::Tree(tree) | Layout::Arc(tree) => format!(
            "{} layout from {}: {} nodes, height {}",
            scene.mode,
            tree.id,
            tree.len(),
            tree.height()
        ),
        Layout::Sequence(sorted) => format!("topo layout: {}", sorted.ids().join(", ")),
    }
}
