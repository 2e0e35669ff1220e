//! Batch loading of static edges (robot descriptions and the like).
//!
//! A loader owns no state: it parses its input and feeds every edge through
//! `BufferTree::update` as a static transform.

use crate::error::{TfError, TfResult};
use crate::tree::BufferTree;
use crate::types::{StampedIsometry, TransformType};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;

/// A file format that describes static frame relations.
pub trait FormatLoader {
    fn load_into_buffer(&self, path: &Path, buffer: &BufferTree) -> TfResult<()>;
}

/// One static relation of a description file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticEdge {
    pub parent: String,
    pub child: String,
    pub transform: StampedIsometry,
}

/// Loads a RON list of static edges:
///
/// ```ron
/// [
///     (parent: "map", child: "odom",
///      transform: (translation: (1.0, 0.0, 0.0), rotation: (0.0, 0.0, 0.0, 1.0), stamp: 0)),
/// ]
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct RonStaticLoader;

impl RonStaticLoader {
    pub fn new() -> Self {
        RonStaticLoader
    }

    pub fn parse(&self, text: &str) -> TfResult<Vec<StaticEdge>> {
        ron::from_str(text).map_err(|e| TfError::LoaderError(e.to_string()))
    }

    /// Feed `text` into `buffer`. Stops at the first edge the tree rejects,
    /// edges before it stay loaded.
    pub fn load_str(&self, text: &str, buffer: &BufferTree) -> TfResult<usize> {
        let edges = self.parse(text)?;
        for edge in &edges {
            buffer.update(
                &edge.parent,
                &edge.child,
                edge.transform.clone(),
                TransformType::Static,
            )?;
        }
        debug!("Loaded {} static edges", edges.len());
        Ok(edges.len())
    }
}

impl FormatLoader for RonStaticLoader {
    fn load_into_buffer(&self, path: &Path, buffer: &BufferTree) -> TfResult<()> {
        let text = read_to_string(path)
            .map_err(|e| TfError::LoaderError(format!("{}: {e}", path.display())))?;
        self.load_str(&text, buffer)
            .map(|_| ())
            .map_err(|e| e.with_context(&path.display().to_string()))
    }
}
