use std::{fmt::Write, path::Path};

use nnviz_nn::LayerGraph;

use crate::error::PlotError;

fn format_shape(shape: &[usize]) -> String {
    let dims = shape
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("({dims})")
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Describe the connectivity of a network as a graphviz DOT digraph.
///
/// Every layer becomes a node labeled with its name and every connection an
/// edge labeled with the output shape of its source layer. Layers without
/// successors are connected to an `Output #k` node, numbered in layer order.
///
/// # Example
///
/// ```
/// use nnviz_nn::{activation::Relu, linear::Linear, network::Sequential};
/// use nnviz_plots::structure::network_structure;
///
/// let network = Sequential::new([4])
///     .push(Linear::new(vec![0.0; 8], vec![0.0; 2], 4, 2)?)?
///     .push(Relu::new())?;
///
/// let dot = network_structure(&network);
/// assert!(dot.contains("label=\"Output #1\""));
/// # Ok::<(), nnviz_nn::NnError>(())
/// ```
pub fn network_structure(graph: &dyn LayerGraph) -> String {
    let nodes = graph.nodes();
    let edges = graph.edges();

    let mut dot = String::from("digraph {\n");
    // writing into a String never fails
    for (i, node) in nodes.iter().enumerate() {
        let _ = writeln!(dot, "    \"layer-{i}\" [label=\"{}\"];", escape(&node.name));
    }

    let mut output_id = 1;
    for (i, node) in nodes.iter().enumerate() {
        let label = format_shape(&node.output_shape);
        let mut successors = edges.iter().filter(|(from, _)| *from == i).peekable();
        if successors.peek().is_none() {
            let _ = writeln!(
                dot,
                "    \"output-{output_id}\" [label=\"Output #{output_id}\"];"
            );
            let _ = writeln!(
                dot,
                "    \"layer-{i}\" -> \"output-{output_id}\" [label=\" {label}\"];"
            );
            output_id += 1;
            continue;
        }
        for (_, to) in successors {
            let _ = writeln!(dot, "    \"layer-{i}\" -> \"layer-{to}\" [label=\" {label}\"];");
        }
    }
    dot.push_str("}\n");

    log::debug!(
        "network structure with {} layers and {} outputs",
        nodes.len(),
        output_id - 1
    );
    dot
}

/// Write the DOT description of `graph` to `path`.
pub fn save_network_structure(
    graph: &dyn LayerGraph,
    path: impl AsRef<Path>,
) -> Result<(), PlotError> {
    std::fs::write(path, network_structure(graph))?;
    Ok(())
}
