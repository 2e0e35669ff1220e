use crate::buffer::TransformBuffer;
use crate::error::{TfError, TfResult};
use crate::types::TransformType;
use log::debug;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// One hop of a path between two frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub edge: EdgeIndex,
    /// The edge is walked child -> parent and has to be inverted.
    pub inverse: bool,
}

/// Frames are nodes, each parent -> child edge owns the buffer of that relation.
///
/// The graph is kept a forest: a frame has at most one parent and no edge may
/// close a cycle. Frames only appear once an edge naming them has been accepted.
#[derive(Debug, Default)]
pub struct FrameGraph {
    graph: DiGraph<String, TransformBuffer>,
    frame_indices: HashMap<String, NodeIndex>,
    max_history: Option<usize>,
}

impl FrameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// New dynamic buffers will keep at most `max_history` samples.
    pub fn with_max_history(max_history: Option<usize>) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    fn ensure_frame(&mut self, frame_id: &str) -> NodeIndex {
        if let Some(idx) = self.frame_indices.get(frame_id) {
            return *idx;
        }
        let idx = self.graph.add_node(frame_id.to_string());
        self.frame_indices.insert(frame_id.to_string(), idx);
        idx
    }

    fn parent_edge(&self, node: NodeIndex) -> Option<(EdgeIndex, NodeIndex)> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .next()
            .map(|e| (e.id(), e.source()))
    }

    fn is_ancestor_or_self(&self, candidate: NodeIndex, node: NodeIndex) -> bool {
        let mut current = node;
        loop {
            if current == candidate {
                return true;
            }
            match self.parent_edge(current) {
                Some((_, parent)) => current = parent,
                None => return false,
            }
        }
    }

    /// Validates a new edge against the tree invariants without touching the graph.
    fn check_new_edge(&self, parent: &str, child: &str) -> TfResult<()> {
        if parent == child {
            return Err(TfError::InvalidGraph(format!(
                "frame '{parent}' cannot be its own parent"
            )));
        }
        let Some(&child_idx) = self.frame_indices.get(child) else {
            // A brand new child can neither have a parent nor close a cycle.
            return Ok(());
        };
        if let Some((_, existing)) = self.parent_edge(child_idx) {
            return Err(TfError::InvalidGraph(format!(
                "frame '{child}' already has parent '{}', cannot add parent '{parent}'",
                self.graph[existing]
            )));
        }
        if let Some(&parent_idx) = self.frame_indices.get(parent) {
            if self.is_ancestor_or_self(child_idx, parent_idx) {
                return Err(TfError::InvalidGraph(format!(
                    "edge '{parent}' -> '{child}' would create a cycle"
                )));
            }
        }
        Ok(())
    }

    /// Get the buffer of `parent -> child`, creating the edge (and frames) on first use.
    ///
    /// Fails with `InvalidGraph`, leaving the graph untouched, if the edge would give
    /// `child` a second parent, close a cycle, or if the edge exists with another kind.
    pub fn add_or_update_edge(
        &mut self,
        parent: &str,
        child: &str,
        kind: TransformType,
    ) -> TfResult<&mut TransformBuffer> {
        let existing = match (self.frame_indices.get(parent), self.frame_indices.get(child)) {
            (Some(&p), Some(&c)) => self.graph.find_edge(p, c),
            _ => None,
        };

        let edge = match existing {
            Some(edge) => {
                let current = self.graph[edge].kind();
                if current != kind {
                    return Err(TfError::InvalidGraph(format!(
                        "edge '{parent}' -> '{child}' is {current}, got an update as {kind}"
                    )));
                }
                edge
            }
            None => {
                self.check_new_edge(parent, child)?;
                let parent_idx = self.ensure_frame(parent);
                let child_idx = self.ensure_frame(child);
                debug!("New {kind} edge '{parent}' -> '{child}'");
                self.graph.add_edge(
                    parent_idx,
                    child_idx,
                    TransformBuffer::with_max_history(kind, self.max_history),
                )
            }
        };
        Ok(&mut self.graph[edge])
    }

    /// Path from `from` to `to` through their lowest common ancestor.
    ///
    /// The steps climbing from `from` to the ancestor are flagged `inverse`,
    /// the ones descending to `to` are not. Same frame gives an empty path.
    pub fn find_path(&self, from: &str, to: &str) -> TfResult<Vec<PathStep>> {
        let from_idx = self.frame_index(from)?;
        let to_idx = self.frame_index(to)?;

        // Ancestor chain of `from`, with the edge used to reach each next node.
        let mut up_nodes = vec![from_idx];
        let mut up_edges = Vec::new();
        let mut current = from_idx;
        while let Some((edge, parent)) = self.parent_edge(current) {
            up_edges.push(edge);
            up_nodes.push(parent);
            current = parent;
        }
        let depth: HashMap<NodeIndex, usize> = up_nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (*node, i))
            .collect();

        let mut down_edges = Vec::new();
        let mut current = to_idx;
        let lca_depth = loop {
            if let Some(&d) = depth.get(&current) {
                break d;
            }
            match self.parent_edge(current) {
                Some((edge, parent)) => {
                    down_edges.push(edge);
                    current = parent;
                }
                None => {
                    return Err(TfError::CouldNotFindTransform(format!(
                        "frames '{from}' and '{to}' are not connected"
                    )))
                }
            }
        };

        let up = up_edges[..lca_depth].iter().map(|&edge| PathStep {
            edge,
            inverse: true,
        });
        let down = down_edges.iter().rev().map(|&edge| PathStep {
            edge,
            inverse: false,
        });
        Ok(up.chain(down).collect())
    }

    fn frame_index(&self, frame: &str) -> TfResult<NodeIndex> {
        self.frame_indices
            .get(frame)
            .copied()
            .ok_or_else(|| TfError::CouldNotFindTransform(format!("frame '{frame}' does not exist")))
    }

    pub fn contains_frame(&self, frame: &str) -> bool {
        self.frame_indices.contains_key(frame)
    }

    /// Parent name, child name and buffer of an edge.
    pub fn edge(&self, edge: EdgeIndex) -> Option<(&str, &str, &TransformBuffer)> {
        let (parent, child) = self.graph.edge_endpoints(edge)?;
        Some((
            self.graph[parent].as_str(),
            self.graph[child].as_str(),
            &self.graph[edge],
        ))
    }

    /// All edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &TransformBuffer)> {
        self.graph.raw_edges().iter().map(|e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
                &e.weight,
            )
        })
    }

    /// All frames in creation order, with their graph index.
    pub fn frames(&self) -> impl Iterator<Item = (usize, &str)> {
        self.graph
            .node_indices()
            .map(|idx| (idx.index(), self.graph[idx].as_str()))
    }

    /// Index of the parent and child node of every edge, in creation order.
    pub fn edge_endpoints(&self) -> impl Iterator<Item = (usize, usize, &TransformBuffer)> {
        self.graph
            .raw_edges()
            .iter()
            .map(|e| (e.source().index(), e.target().index(), &e.weight))
    }

    pub fn frame_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
