use crate::{
    parse, GraphModel, LayoutEngine, LayoutError, SortedSequence, TopologicalSorter, TreeBuilder,
    TreeNode, DEFAULT_MAX_TREE_DEPTH, DEFAULT_MAX_TREE_NODES,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// The visualization modes, exactly one of which is shown at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Physics based free layout of the whole graph
    #[display("force")]
    Force,
    /// Rooted tree hanging from a chosen node
    #[display("tree")]
    Tree,
    /// Nodes laid out in topological order
    #[display("topo")]
    Topological,
    /// Horizontal tree with curved links
    #[display("arc")]
    Arc,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layout mode {0:?}, expected one of force, tree, topo, arc")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "force" | "random" => Ok(Mode::Force),
            "tree" => Ok(Mode::Tree),
            "topo" | "topological" | "sequence" => Ok(Mode::Topological),
            "arc" => Ok(Mode::Arc),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Renderer tunables, passed through untouched
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Target length of the links in the force layout
    pub edge_length: f32,
    /// Radius of the drawn nodes
    pub node_size: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            edge_length: 50.0,
            node_size: 10.0,
        }
    }
}

/// One visualization trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRequest {
    pub mode: Mode,
    /// Raw `source,target` edge list
    pub text: String,
    /// Root of the tree. Required by [`Mode::Tree`]; [`Mode::Arc`] falls
    /// back to the first node of the edge list.
    pub root: Option<String>,
}

impl LayoutRequest {
    pub fn new(mode: Mode, text: impl Into<String>) -> Self {
        Self {
            mode,
            text: text.into(),
            root: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }
}

/// The structure handed to the renderer for each mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Layout {
    Force(GraphModel),
    Tree(TreeNode),
    Arc(TreeNode),
    Sequence(SortedSequence),
}

/// A complete, immutable build result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub mode: Mode,
    pub params: LayoutParams,
    pub layout: Layout,
}

/// Routes requests to the matching builder and keeps the scene on display
///
/// A failed build never replaces the current scene.
#[derive(Debug, Clone)]
pub struct LayoutCoordinator {
    params: LayoutParams,
    max_tree_nodes: usize,
    max_tree_depth: usize,
    current: Option<Arc<Scene>>,
}

impl Default for LayoutCoordinator {
    fn default() -> Self {
        Self::new(LayoutParams::default())
    }
}

impl LayoutCoordinator {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            params,
            max_tree_nodes: DEFAULT_MAX_TREE_NODES,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            current: None,
        }
    }

    pub fn with_max_tree_nodes(mut self, max_tree_nodes: usize) -> Self {
        self.max_tree_nodes = max_tree_nodes;
        self
    }

    pub fn with_max_tree_depth(mut self, max_tree_depth: usize) -> Self {
        self.max_tree_depth = max_tree_depth;
        self
    }

    pub fn params(&self) -> LayoutParams {
        self.params
    }

    pub fn set_edge_length(&mut self, edge_length: f32) {
        self.params.edge_length = edge_length;
    }

    pub fn set_node_size(&mut self, node_size: f32) {
        self.params.node_size = node_size;
    }

    /// The scene currently on display, if any build succeeded yet
    pub fn current(&self) -> Option<Arc<Scene>> {
        self.current.clone()
    }

    /// Build the scene for a request without touching the current one
    ///
    /// # Errors
    /// Returns the first error hit by parsing, validation or the builder.
    pub fn build(&self, request: &LayoutRequest) -> Result<Scene, LayoutError> {
        let model = parse(&request.text)?;
        debug!(
            "Building {} layout over {} nodes and {} edges",
            request.mode,
            model.node_count(),
            model.edge_count()
        );

        let layout = match request.mode {
            Mode::Force => Layout::Force(model),
            Mode::Topological => Layout::Sequence(TopologicalSorter.build(&model)?),
            Mode::Tree => {
                require_nodes(&model, request.mode)?;
                let root = request.root.as_deref().unwrap_or_default();
                Layout::Tree(self.tree_builder(root).build(&model)?)
            }
            Mode::Arc => {
                require_nodes(&model, request.mode)?;
                let root = match (&request.root, model.first()) {
                    (Some(root), _) => root.as_str(),
                    (None, Some(first)) => first.id.as_str(),
                    (None, None) => return Err(LayoutError::EmptyGraph(request.mode)),
                };
                Layout::Arc(self.tree_builder(root).build(&model)?)
            }
        };

        Ok(Scene {
            mode: request.mode,
            params: self.params,
            layout,
        })
    }

    /// Build a scene and make it the current one
    ///
    /// # Errors
    /// Returns the build error; the current scene is left as it was.
    pub fn trigger(&mut self, request: &LayoutRequest) -> Result<Arc<Scene>, LayoutError> {
        match self.build(request) {
            Ok(scene) => {
                let scene = Arc::new(scene);
                self.current = Some(Arc::clone(&scene));
                Ok(scene)
            }
            Err(e) => {
                warn!("{} layout failed: {e}", request.mode);
                Err(e)
            }
        }
    }

    fn tree_builder(&self, root: &str) -> TreeBuilder {
        TreeBuilder::new(root)
            .with_max_nodes(self.max_tree_nodes)
            .with_max_depth(self.max_tree_depth)
    }
}

fn require_nodes(model: &GraphModel, mode: Mode) -> Result<(), LayoutError> {
    if model.is_empty() {
        Err(LayoutError::EmptyGraph(mode))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cycle;
    use test_log::test;

    const SAMPLE: &str = "A,B\nA,C\nB,D";

    #[test]
    fn test_mode_names() {
        for mode in [Mode::Force, Mode::Tree, Mode::Topological, Mode::Arc] {
            assert_eq!(mode.to_string().parse::<Mode>(), Ok(mode));
        }
        assert_eq!("Random".parse::<Mode>(), Ok(Mode::Force));
        assert_eq!("sequence".parse::<Mode>(), Ok(Mode::Topological));
        assert!("radial".parse::<Mode>().is_err());
    }

    #[test]
    fn test_topological_scene() {
        let scene = LayoutCoordinator::default()
            .build(&LayoutRequest::new(Mode::Topological, SAMPLE))
            .unwrap();

        let Layout::Sequence(sorted) = &scene.layout else {
            panic!("unexpected layout: {:?}", scene.layout);
        };
        assert_eq!(sorted.first().map(|n| n.id.as_str()), Some("A"));
        assert_eq!(sorted.last().map(|n| n.id.as_str()), Some("D"));
        assert_eq!(sorted.len(), 4);
    }

    #[test]
    fn test_tree_scene() {
        let scene = LayoutCoordinator::default()
            .build(&LayoutRequest::new(Mode::Tree, SAMPLE).with_root("A"))
            .unwrap();

        let expected = TreeNode::new(
            "A",
            vec![
                TreeNode::new("B", vec![TreeNode::leaf("D")]),
                TreeNode::leaf("C"),
            ],
        );
        assert_eq!(scene.layout, Layout::Tree(expected));
    }

    #[test]
    fn test_tree_scene_with_cycle_terminates() {
        let err = LayoutCoordinator::default()
            .build(&LayoutRequest::new(Mode::Tree, "A,B\nB,C\nC,B").with_root("A"))
            .unwrap_err();

        assert!(matches!(err, LayoutError::CycleDetected(Cycle::Path(_))));
    }

    #[test]
    fn test_tree_requires_a_known_root() {
        let coordinator = LayoutCoordinator::default();

        let err = coordinator
            .build(&LayoutRequest::new(Mode::Tree, "A,B\nB,C").with_root("Z"))
            .unwrap_err();
        assert_eq!(err, LayoutError::RootNotFound("Z".to_string()));

        let err = coordinator
            .build(&LayoutRequest::new(Mode::Tree, "A,B"))
            .unwrap_err();
        assert_eq!(err, LayoutError::RootNotFound(String::new()));
    }

    #[test]
    fn test_hierarchical_modes_need_nodes() {
        let coordinator = LayoutCoordinator::default();

        for mode in [Mode::Tree, Mode::Arc] {
            let err = coordinator
                .build(&LayoutRequest::new(mode, "\n").with_root("A"))
                .unwrap_err();
            assert_eq!(err, LayoutError::EmptyGraph(mode));
        }

        let scene = coordinator
            .build(&LayoutRequest::new(Mode::Force, ""))
            .unwrap();
        assert_eq!(scene.layout, Layout::Force(GraphModel::new()));
    }

    #[test]
    fn test_arc_defaults_to_first_node() {
        let coordinator = LayoutCoordinator::default();

        let scene = coordinator
            .build(&LayoutRequest::new(Mode::Arc, "X,A\nA,B"))
            .unwrap();
        let Layout::Arc(tree) = &scene.layout else {
            panic!("unexpected layout: {:?}", scene.layout);
        };
        assert_eq!(tree.id, "X");
        assert_eq!(tree.len(), 3);

        let scene = coordinator
            .build(&LayoutRequest::new(Mode::Arc, "X,A\nA,B").with_root("A"))
            .unwrap();
        assert_eq!(
            scene.layout,
            Layout::Arc(TreeNode::new("A", vec![TreeNode::leaf("B")]))
        );
    }

    #[test]
    fn test_params_pass_through() {
        let mut coordinator = LayoutCoordinator::default();
        coordinator.set_edge_length(120.0);
        coordinator.set_node_size(4.0);

        let scene = coordinator
            .build(&LayoutRequest::new(Mode::Force, SAMPLE))
            .unwrap();
        assert_eq!(
            scene.params,
            LayoutParams {
                edge_length: 120.0,
                node_size: 4.0
            }
        );
        let Layout::Force(model) = &scene.layout else {
            panic!("unexpected layout: {:?}", scene.layout);
        };
        assert_eq!(model.node_count(), 4);
    }

    #[test]
    fn test_failed_trigger_keeps_current_scene() {
        let mut coordinator = LayoutCoordinator::default();
        assert!(coordinator.current().is_none());

        let shown = coordinator
            .trigger(&LayoutRequest::new(Mode::Topological, SAMPLE))
            .unwrap();

        for request in [
            LayoutRequest::new(Mode::Topological, "A,B\nB,C\nC,A"),
            LayoutRequest::new(Mode::Force, "A,B\nbroken"),
            LayoutRequest::new(Mode::Tree, SAMPLE).with_root("Z"),
        ] {
            assert!(coordinator.trigger(&request).is_err());
            let current = coordinator.current().unwrap();
            assert!(Arc::ptr_eq(&current, &shown));
        }

        let replaced = coordinator
            .trigger(&LayoutRequest::new(Mode::Force, SAMPLE))
            .unwrap();
        assert!(Arc::ptr_eq(&coordinator.current().unwrap(), &replaced));
        assert_eq!(replaced.mode, Mode::Force);
    }

    #[test]
    fn test_tree_limit_is_configurable() {
        let coordinator = LayoutCoordinator::default().with_max_tree_nodes(3);

        let err = coordinator
            .build(&LayoutRequest::new(Mode::Tree, SAMPLE).with_root("A"))
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::TreeTooLarge {
                root: "A".to_string(),
                limit: 3
            }
        );
    }

    #[test]
    fn test_tree_depth_is_configurable() {
        let coordinator = LayoutCoordinator::default().with_max_tree_depth(2);

        let err = coordinator
            .build(&LayoutRequest::new(Mode::Arc, SAMPLE))
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::TreeTooDeep {
                root: "A".to_string(),
                limit: 2
            }
        );
    }

    #[test]
    fn test_scene_serializes_to_ron() {
        let scene = LayoutCoordinator::default()
            .build(&LayoutRequest::new(Mode::Tree, SAMPLE).with_root("A"))
            .unwrap();

        let text = ron::to_string(&scene).unwrap();
        assert!(text.contains("mode:tree"), "{text}");
        assert!(text.contains("edge_length:50.0"), "{text}");
        assert!(text.contains("Tree((id:\"A\""), "{text}");
    }
}
