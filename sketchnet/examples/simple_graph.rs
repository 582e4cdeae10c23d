//! Simple graph example: sketch a voltage divider interactively and print
//! the resulting netlist graph.

use sketchnet::prelude::*;

fn main() -> Result<(), SketchNetError> {
    let mut session = Session::new();

    // Source on the left; the divider chain stacked vertically on the right,
    // with the two resistors touching terminal-to-terminal.
    let source = session.place_component(ComponentType::VoltageDc, 0.0, 100.0, Rotation::R0)?;
    let top = session.place_component(ComponentType::Resistor, 200.0, 130.0, Rotation::R90)?;
    let bottom = session.place_component(ComponentType::Resistor, 200.0, 230.0, Rotation::R90)?;
    session.update_component(&source, None, Some("9V".to_string()))?;
    session.update_component(&top, None, Some("10k".to_string()))?;
    session.update_component(&bottom, None, Some("4.7k".to_string()))?;

    // Positive rail straight across, then the return leg drawn as an L:
    // down from the source, across to the bottom resistor.
    let draft = session.begin_wire(0.0, 80.0)?;
    session.commit_wire(draft, 200.0, 80.0)?;
    let draft = session.begin_wire(0.0, 120.0)?;
    session.commit_wire(draft, 0.0, 280.0)?;
    let draft = session.begin_wire(0.0, 280.0)?;
    session.commit_wire(draft, 200.0, 280.0)?;

    let graph = session.connectivity();
    let stats = graph.stats();
    println!(
        "Graph: {} components, {} junctions, {} connections\n",
        stats.components, stats.junctions, stats.connections
    );

    for (id, entry) in graph.to_named_adjacency() {
        println!("{} ({})", entry.name, id);
        for peer in &entry.connections {
            println!("  - {}", peer);
        }
    }

    Ok(())
}
