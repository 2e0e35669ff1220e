use crate::error::{TfError, TfResult};
use crate::graph::FrameGraph;
use crate::types::{Stamp, StampedIsometry};

/// Which value each edge contributes to a lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeQuery {
    /// Every edge resolved at this time, interpolating dynamic edges.
    At(Stamp),
    /// Every edge contributes its own most recent sample.
    Latest,
}

/// Composes the edges between two frames into a single isometry.
pub struct PathResolver<'a> {
    graph: &'a FrameGraph,
}

impl<'a> PathResolver<'a> {
    pub fn new(graph: &'a FrameGraph) -> Self {
        Self { graph }
    }

    /// Pose of `to` expressed in `from`.
    ///
    /// With `TimeQuery::At(t)` the result is stamped `t`. With `TimeQuery::Latest`
    /// it carries the oldest stamp among the samples used, edges updating at
    /// different rates do not yield one coherent instant.
    pub fn resolve(&self, from: &str, to: &str, query: TimeQuery) -> TfResult<StampedIsometry> {
        let path = self.graph.find_path(from, to)?;

        let mut composed: Option<StampedIsometry> = None;
        for step in &path {
            let (parent, child, buffer) = self.graph.edge(step.edge).ok_or_else(|| {
                TfError::CouldNotFindTransform(format!("stale edge on path '{from}' -> '{to}'"))
            })?;
            let sample = match query {
                TimeQuery::At(time) => buffer.at(time),
                TimeQuery::Latest => buffer.latest().cloned(),
            }
            .map_err(|e| e.with_context(&format!("edge '{parent}' -> '{child}'")))?;

            let sample = if step.inverse {
                sample.inverse()
            } else {
                sample
            };
            composed = Some(match composed {
                Some(acc) => &acc * &sample,
                None => sample,
            });
        }

        Ok(match query {
            TimeQuery::At(time) => composed
                .unwrap_or_else(|| StampedIsometry::identity(time))
                .with_stamp(time),
            TimeQuery::Latest => composed.unwrap_or_else(|| StampedIsometry::identity(0)),
        })
    }
}
