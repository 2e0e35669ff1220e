use crate::graph::FrameGraph;
use crate::types::TransformType;
use std::io::{self, Write};

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render the frame graph in the dot format.
/// Edges are labelled with their latest translation, euler angles and stamp.
pub fn render(graph: &FrameGraph, output: &mut dyn Write) -> io::Result<()> {
    writeln!(output, "digraph {{")?;
    for (index, name) in graph.frames() {
        writeln!(output, "    {index} [label=\"{}\"]", escape(name))?;
    }
    for (parent, child, buffer) in graph.edge_endpoints() {
        let style = match buffer.kind() {
            TransformType::Static => "solid",
            TransformType::Dynamic => "dashed",
        };
        match buffer.latest() {
            Ok(latest) => {
                // + 0.0 turns -0.0 into 0.0 so labels never read "-0.000"
                let t = latest.translation().map(|v| v + 0.0);
                let r = latest.euler_angles().map(|v| v + 0.0);
                writeln!(
                    output,
                    "    {parent} -> {child} [style={style}, label=\"t=[{:.3}, {:.3}, {:.3}]\\nr=[{:.3}, {:.3}, {:.3}]\\ntime={:.3}\"]",
                    t[0],
                    t[1],
                    t[2],
                    r[0],
                    r[1],
                    r[2],
                    latest.stamp_secs()
                )?;
            }
            Err(_) => {
                writeln!(
                    output,
                    "    {parent} -> {child} [style={style}, label=\"No transforms\"]"
                )?;
            }
        }
    }
    writeln!(output, "}}")
}
