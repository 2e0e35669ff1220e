pub mod buffer;
pub mod config;
pub mod dot;
pub mod error;
pub mod graph;
pub mod interpolation;
pub mod loader;
pub mod observer;
pub mod resolver;
pub mod tree;
pub mod types;

pub use buffer::TransformBuffer;
pub use config::{read_configuration, BufferConfig};
pub use error::{TfError, TfResult};
pub use graph::{FrameGraph, PathStep};
pub use interpolation::{interpolate, slerp_shortest};
pub use loader::{FormatLoader, RonStaticLoader, StaticEdge};
pub use observer::{BoxedObserver, BufferObserver, ObserverHub};
pub use resolver::{PathResolver, TimeQuery};
pub use tree::BufferTree;
pub use types::{Stamp, StampedIsometry, TransformType};
