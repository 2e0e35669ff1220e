use crate::config::BufferConfig;
use crate::dot;
use crate::error::TfResult;
use crate::graph::FrameGraph;
use crate::observer::{BufferObserver, ObserverHub};
use crate::resolver::{PathResolver, TimeQuery};
use crate::types::{Stamp, StampedIsometry, TransformType};
use log::{info, warn};
use parking_lot::RwLock;
use std::any::Any;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::Command;

struct TreeState {
    graph: FrameGraph,
    observers: ObserverHub,
}

impl TreeState {
    /// Every committed sample of every edge, edges in creation order, samples in commit order.
    fn history(graph: &FrameGraph) -> impl Iterator<Item = (&str, &str, &StampedIsometry, TransformType)> {
        graph.edges().flat_map(|(parent, child, buffer)| {
            buffer
                .committed()
                .map(move |sample| (parent, child, sample, buffer.kind()))
        })
    }
}

/// The transform tree shared by publishers and consumers.
///
/// All frames, edges, samples and observers live behind a single readers-writer lock.
/// `update` and observer registration are exclusive and notify observers before
/// releasing the lock, so observers see updates in commit order. Lookups share the
/// lock and always see fully committed updates.
///
/// Observers run while the lock is held and must not call back into the same tree.
pub struct BufferTree {
    config: BufferConfig,
    state: RwLock<TreeState>,
}

impl BufferTree {
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    pub fn with_config(config: BufferConfig) -> Self {
        let graph = FrameGraph::with_max_history(config.max_transform_history);
        BufferTree {
            config,
            state: RwLock::new(TreeState {
                graph,
                observers: ObserverHub::new(),
            }),
        }
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Either update or push a transform to the graph.
    ///
    /// The edge `from -> to` is created on first use. An update that would give
    /// `to` a second parent, close a cycle or change the kind of an existing edge
    /// fails with `InvalidGraph` and changes nothing.
    pub fn update(
        &self,
        from: &str,
        to: &str,
        transform: StampedIsometry,
        kind: TransformType,
    ) -> TfResult<()> {
        let mut state = self.state.write();
        let TreeState { graph, observers } = &mut *state;
        let buffer = graph.add_or_update_edge(from, to, kind).map_err(|e| {
            warn!("Rejected update '{from}' -> '{to}': {e}");
            e
        })?;
        buffer.push(transform.clone());
        observers.notify(from, to, &transform, kind);
        Ok(())
    }

    /// Lookup the transform at time.
    ///
    /// Dynamic edges are interpolated between the samples around `time`, static
    /// edges are valid at any time. Fails with `AttemptedLookupInPast` or
    /// `AttemptedLookUpInFuture` if any dynamic edge on the path does not cover `time`.
    pub fn lookup_transform(&self, from: &str, to: &str, time: Stamp) -> TfResult<StampedIsometry> {
        let state = self.state.read();
        let resolver = PathResolver::new(&state.graph);
        resolver.resolve(from, to, TimeQuery::At(time))
    }

    /// Lookup the latest transform without any time checks.
    ///
    /// Each edge contributes its own most recent sample, so the result can mix
    /// samples from different instants. It carries the oldest stamp involved.
    pub fn lookup_latest_transform(&self, from: &str, to: &str) -> TfResult<StampedIsometry> {
        let state = self.state.read();
        let resolver = PathResolver::new(&state.graph);
        resolver.resolve(from, to, TimeQuery::Latest)
    }

    /// Register an observer. It receives every committed sample before this returns,
    /// then every committed update.
    pub fn register_observer<O: BufferObserver + 'static>(&self, observer: O) {
        let mut state = self.state.write();
        let TreeState { graph, observers } = &mut *state;
        observers.register(Box::new(observer), TreeState::history(graph));
    }

    /// Register an observer handed over as an opaque value, e.g. from a binding layer.
    /// Anything but a `BoxedObserver` fails with `ObserverNotCallable`.
    pub fn register_observer_any(&self, candidate: Box<dyn Any + Send + Sync>) -> TfResult<()> {
        let mut state = self.state.write();
        let TreeState { graph, observers } = &mut *state;
        observers.register_any(candidate, TreeState::history(graph))
    }

    pub fn observer_count(&self) -> usize {
        self.state.read().observers.len()
    }

    /// Names of all known frames.
    pub fn frames(&self) -> Vec<String> {
        self.state
            .read()
            .graph
            .frames()
            .map(|(_, name)| name.to_string())
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.state.read().graph.edge_count()
    }

    /// Visualize the buffer tree as a DOT graph.
    pub fn visualize(&self) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        dot::render(&self.state.read().graph, &mut out).ok();
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Save the buffer tree as graph.dot in `save_path`, and as graph.pdf if
    /// Graphviz is available. Returns the path of the dot file.
    pub fn save_visualization(&self) -> TfResult<PathBuf> {
        let dir = &self.config.save_path;
        fs::create_dir_all(dir)?;
        let dot_path = dir.join("graph.dot");
        let pdf_path = dir.join("graph.pdf");
        info!("Saving visualization to {}", dot_path.display());

        let mut file = BufWriter::new(File::create(&dot_path)?);
        dot::render(&self.state.read().graph, &mut file)?;
        file.flush()?;

        match Command::new("dot")
            .arg("-Tpdf")
            .arg(&dot_path)
            .arg("-o")
            .arg(&pdf_path)
            .output()
        {
            Ok(output) if output.status.success() => {}
            Ok(output) => warn!(
                "Failed to generate PDF: {}",
                String::from_utf8_lossy(&output.stderr)
            ),
            Err(e) => warn!("Failed to run dot, is Graphviz installed? {e}"),
        }
        Ok(dot_path)
    }
}

impl Default for BufferTree {
    fn default() -> Self {
        Self::new()
    }
}
