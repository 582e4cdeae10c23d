//! Connectivity graph builder.
//!
//! Consumes the normalized wire set and component terminals, infers junction
//! nodes where three or more conductors meet, and emits a symmetric
//! adjacency over components and nodes. Built on petgraph with id-to-index
//! maps so callers can query by the same opaque ids they supplied.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;

use crate::schema::{ComponentId, ComponentMap, Orientation, Point, Wire};
use crate::topology::normalize::normalize;

/// An entity participating in the connectivity graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEntity {
    /// A placed component, carrying its display name.
    Component { id: ComponentId, name: String },
    /// A synthesized junction where three or more conductors meet.
    Junction { id: String, position: Point },
}

impl GraphEntity {
    pub fn id(&self) -> &str {
        match self {
            GraphEntity::Component { id, .. } => id,
            GraphEntity::Junction { id, .. } => id,
        }
    }

    /// Display name: the component label, or the junction id itself.
    pub fn name(&self) -> &str {
        match self {
            GraphEntity::Component { name, .. } => name,
            GraphEntity::Junction { id, .. } => id,
        }
    }

    pub fn is_junction(&self) -> bool {
        matches!(self, GraphEntity::Junction { .. })
    }
}

/// One row of the plain adjacency export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEntry {
    pub name: String,
    pub connections: BTreeSet<String>,
}

/// Aggregate counts for a built graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub components: usize,
    pub junctions: usize,
    pub connections: usize,
}

/// Symmetric connectivity over components and junction nodes.
///
/// Rebuilt from scratch on every invocation; never incrementally updated.
#[derive(Debug, Clone)]
pub struct ConnectivityGraph {
    graph: UnGraph<GraphEntity, ()>,
    indices: BTreeMap<String, NodeIndex>,
}

impl Default for ConnectivityGraph {
    fn default() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            indices: BTreeMap::new(),
        }
    }
}

impl ConnectivityGraph {
    fn add_entity(&mut self, entity: GraphEntity) {
        let id = entity.id().to_string();
        let index = self.graph.add_node(entity);
        self.indices.insert(id, index);
    }

    /// Connect two entities symmetrically. Self-loops and duplicate edges
    /// are absorbed, so repeated connection is idempotent.
    fn connect(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        let (Some(&ia), Some(&ib)) = (self.indices.get(a), self.indices.get(b)) else {
            return;
        };
        self.graph.update_edge(ia, ib, ());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.indices.contains_key(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &GraphEntity> {
        self.indices.values().map(|&index| &self.graph[index])
    }

    pub fn junctions(&self) -> impl Iterator<Item = &GraphEntity> {
        self.entities().filter(|e| e.is_junction())
    }

    pub fn is_connected(&self, a: &str, b: &str) -> bool {
        match (self.indices.get(a), self.indices.get(b)) {
            (Some(&ia), Some(&ib)) => self.graph.find_edge(ia, ib).is_some(),
            _ => false,
        }
    }

    /// Ids connected to an entity, in sorted order.
    pub fn connections_of(&self, id: &str) -> Vec<&str> {
        let Some(&index) = self.indices.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<&str> = self
            .graph
            .neighbors(index)
            .map(|n| self.graph[n].id())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn stats(&self) -> GraphStats {
        let junctions = self.junctions().count();
        GraphStats {
            components: self.indices.len() - junctions,
            junctions,
            connections: self.graph.edge_count(),
        }
    }

    /// The plain mapping form: entity id to name plus connected entity ids.
    pub fn to_adjacency(&self) -> BTreeMap<String, GraphEntry> {
        self.indices
            .iter()
            .map(|(id, &index)| {
                let entity = &self.graph[index];
                let connections = self
                    .graph
                    .neighbors(index)
                    .map(|n| self.graph[n].id().to_string())
                    .collect();
                (
                    id.clone(),
                    GraphEntry {
                        name: entity.name().to_string(),
                        connections,
                    },
                )
            })
            .collect()
    }

    /// Presentation form: connection ids replaced by display names.
    pub fn to_named_adjacency(&self) -> BTreeMap<String, GraphEntry> {
        self.indices
            .iter()
            .map(|(id, &index)| {
                let entity = &self.graph[index];
                let connections = self
                    .graph
                    .neighbors(index)
                    .map(|n| self.graph[n].name().to_string())
                    .collect();
                (
                    id.clone(),
                    GraphEntry {
                        name: entity.name().to_string(),
                        connections,
                    },
                )
            })
            .collect()
    }
}

/// Everything touching one exact coordinate.
#[derive(Debug, Default)]
struct Touch {
    position: Point,
    wires: BTreeSet<usize>,
    components: BTreeSet<ComponentId>,
}

/// Build the connectivity graph for a scene snapshot.
///
/// The wire set is normalized first, then corner runs are fused so an
/// L-shaped pair of segments reads as one conductor. A coordinate becomes a
/// junction node when at least three distinct wires and/or component
/// terminals meet there; exactly two is a direct pass-through and needs no
/// vertex.
pub fn build_graph(wires: &[Wire], components: &ComponentMap) -> ConnectivityGraph {
    let canonical = normalize(wires, components);
    let runs = merge_corner_runs(&canonical, components);

    let touches = tally_touches(&runs, components);

    // Junction nodes, numbered in coordinate order for determinism.
    let mut node_at: HashMap<(i64, i64), String> = HashMap::new();
    let mut nodes: Vec<(String, Point)> = Vec::new();
    for (key, touch) in &touches {
        if touch.wires.len() + touch.components.len() >= 3 {
            let id = format!("node{}", nodes.len());
            node_at.insert(*key, id.clone());
            nodes.push((id, touch.position));
        }
    }
    tracing::debug!(
        wires = runs.len(),
        junctions = nodes.len(),
        "inferred junction nodes"
    );

    let mut graph = ConnectivityGraph::default();
    for (id, component) in components {
        graph.add_entity(GraphEntity::Component {
            id: id.clone(),
            name: component.name.clone(),
        });
    }
    for (id, position) in &nodes {
        graph.add_entity(GraphEntity::Junction {
            id: id.clone(),
            position: *position,
        });
    }

    // Wires connect whatever entity owns each endpoint: the junction node at
    // that coordinate, else the sole component terminal there. An endpoint
    // claimed by several components but no node stays unresolved rather than
    // guessing.
    for wire in &runs {
        let a = resolve_endpoint(&wire.start, &node_at, &touches);
        let b = resolve_endpoint(&wire.end, &node_at, &touches);
        if let (Some(a), Some(b)) = (a, b) {
            graph.connect(a, b);
        }
    }

    // Terminals sharing a coordinate are joined outright; no wire required.
    for touch in touches.values() {
        if touch.components.len() >= 2 {
            let ids: Vec<&ComponentId> = touch.components.iter().collect();
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    graph.connect(ids[i], ids[j]);
                }
            }
        }
    }

    // And every node joins the components whose terminals coincide with it.
    for (key, node_id) in &node_at {
        if let Some(touch) = touches.get(key) {
            for component_id in &touch.components {
                graph.connect(node_id, component_id);
            }
        }
    }

    graph
}

fn tally_touches(wires: &[Wire], components: &ComponentMap) -> BTreeMap<(i64, i64), Touch> {
    fn touch_at(touches: &mut BTreeMap<(i64, i64), Touch>, point: Point) -> &mut Touch {
        touches.entry(point.key()).or_insert_with(|| Touch {
            position: point,
            ..Touch::default()
        })
    }

    let mut touches = BTreeMap::new();
    for (index, wire) in wires.iter().enumerate() {
        touch_at(&mut touches, wire.start).wires.insert(index);
        touch_at(&mut touches, wire.end).wires.insert(index);
    }
    for (id, component) in components {
        for terminal in &component.snap_points {
            touch_at(&mut touches, *terminal).components.insert(id.clone());
        }
    }
    touches
}

fn resolve_endpoint<'a>(
    point: &Point,
    node_at: &'a HashMap<(i64, i64), String>,
    touches: &'a BTreeMap<(i64, i64), Touch>,
) -> Option<&'a str> {
    let key = point.key();
    if let Some(node_id) = node_at.get(&key) {
        return Some(node_id);
    }
    let touch = touches.get(&key)?;
    if touch.components.len() == 1 {
        return touch.components.iter().next().map(String::as_str);
    }
    None
}

/// Fuse plain corners: two wires of different orientation (or two diagonal
/// stubs) sharing an endpoint where exactly two wire ends and no component
/// terminal meet become one run from far end to far end. Without this an
/// L-shaped connection would dissolve into two endpoints that resolve to
/// nothing.
pub fn merge_corner_runs(wires: &[Wire], components: &ComponentMap) -> Vec<Wire> {
    let terminal_keys: HashSet<(i64, i64)> = components
        .values()
        .flat_map(|c| c.snap_points.iter().map(Point::key))
        .collect();

    let mut current = wires.to_vec();
    // Each fusion removes one segment; the fixpoint arrives within len rounds.
    for _ in 0..wires.len() {
        let before = current.len();
        current = merge_corner_pass(&current, &terminal_keys);
        if current.len() == before {
            break;
        }
    }
    current
}

fn merge_corner_pass(wires: &[Wire], terminal_keys: &HashSet<(i64, i64)>) -> Vec<Wire> {
    let mut ends_at: HashMap<(i64, i64), BTreeSet<usize>> = HashMap::new();
    for (index, wire) in wires.iter().enumerate() {
        ends_at.entry(wire.start.key()).or_default().insert(index);
        ends_at.entry(wire.end.key()).or_default().insert(index);
    }

    let mut used = vec![false; wires.len()];
    let mut result = Vec::with_capacity(wires.len());

    for i in 0..wires.len() {
        if used[i] {
            continue;
        }
        for j in (i + 1)..wires.len() {
            if used[j] {
                continue;
            }
            let (a, b) = (&wires[i], &wires[j]);
            if a.is_degenerate() || b.is_degenerate() {
                continue;
            }
            // Collinear pairs belong to the merge pass, not corner fusion.
            if a.orientation() == b.orientation() && a.orientation() != Orientation::Diagonal {
                continue;
            }
            let Some(corner) = corner_of(a, b) else {
                continue;
            };
            if ends_at
                .get(&corner.shared.key())
                .map_or(true, |ends| ends.len() != 2)
            {
                continue;
            }
            if terminal_keys.contains(&corner.shared.key()) {
                continue;
            }

            result.push(
                Wire::new(corner.far_a, corner.far_b)
                    .with_attachments(corner.far_a_attached, corner.far_b_attached),
            );
            used[i] = true;
            used[j] = true;
            break;
        }
        if !used[i] {
            result.push(wires[i].clone());
        }
    }
    result
}

struct Corner {
    shared: Point,
    far_a: Point,
    far_b: Point,
    far_a_attached: Option<ComponentId>,
    far_b_attached: Option<ComponentId>,
}

fn corner_of(a: &Wire, b: &Wire) -> Option<Corner> {
    let ends_a = [
        (a.start, a.end, a.end_attached.clone()),
        (a.end, a.start, a.start_attached.clone()),
    ];
    let ends_b = [
        (b.start, b.end, b.end_attached.clone()),
        (b.end, b.start, b.start_attached.clone()),
    ];
    for (shared_a, far_a, far_a_attached) in &ends_a {
        for (shared_b, far_b, far_b_attached) in &ends_b {
            if shared_a.key() == shared_b.key() {
                return Some(Corner {
                    shared: *shared_a,
                    far_a: *far_a,
                    far_b: *far_b,
                    far_a_attached: far_a_attached.clone(),
                    far_b_attached: far_b_attached.clone(),
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Component, ComponentType, Rotation};
    use std::collections::BTreeMap;

    fn wire(x1: f64, y1: f64, x2: f64, y2: f64) -> Wire {
        Wire::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    fn resistor(id: &str, name: &str, x: f64, y: f64) -> Component {
        Component::new(id, ComponentType::Resistor, Point::new(x, y), Rotation::R0)
            .unwrap()
            .with_name(name)
    }

    #[test]
    fn test_two_endpoints_make_no_node() {
        let wires = vec![wire(0.0, 0.0, 50.0, 0.0), wire(50.0, 0.0, 50.0, 80.0)];
        let graph = build_graph(&wires, &BTreeMap::new());
        assert_eq!(graph.stats().junctions, 0);
    }

    #[test]
    fn test_three_endpoints_make_one_node() {
        let wires = vec![
            wire(0.0, 0.0, 50.0, 0.0),
            wire(50.0, 0.0, 100.0, 0.0),
            wire(50.0, 0.0, 50.0, 80.0),
        ];
        // The collinear pair merges into one run, but the stem's endpoint
        // re-cuts it, leaving three distinct wires at (50, 0).
        let graph = build_graph(&wires, &BTreeMap::new());
        assert_eq!(graph.stats().junctions, 1);
        let junction = graph.junctions().next().unwrap();
        match junction {
            GraphEntity::Junction { position, .. } => {
                assert_eq!(*position, Point::new(50.0, 0.0));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_end_to_end_series_pair() {
        // A at (50, 0)-(150, 0), B at (200, 0)-(300, 0), one wire joining
        // the facing terminals: two entries, each connected only to the
        // other, no synthesized node.
        let mut components = BTreeMap::new();
        components.insert("a".to_string(), resistor("a", "R1", 100.0, 0.0));
        components.insert("b".to_string(), resistor("b", "R2", 250.0, 0.0));
        let wires = vec![wire(150.0, 0.0, 200.0, 0.0)];

        let graph = build_graph(&wires, &components);
        let stats = graph.stats();
        assert_eq!(stats.components, 2);
        assert_eq!(stats.junctions, 0);
        assert_eq!(stats.connections, 1);
        assert_eq!(graph.connections_of("a"), vec!["b"]);
        assert_eq!(graph.connections_of("b"), vec!["a"]);
    }

    #[test]
    fn test_symmetry() {
        let mut components = BTreeMap::new();
        components.insert("a".to_string(), resistor("a", "R1", 100.0, 0.0));
        components.insert("b".to_string(), resistor("b", "R2", 250.0, 0.0));
        components.insert("c".to_string(), resistor("c", "R3", 250.0, 200.0));
        let wires = vec![
            wire(150.0, 0.0, 200.0, 0.0),
            wire(150.0, 0.0, 150.0, 200.0),
            wire(150.0, 200.0, 200.0, 200.0),
        ];
        let graph = build_graph(&wires, &components);
        let adjacency = graph.to_adjacency();
        for (id, entry) in &adjacency {
            for peer in &entry.connections {
                assert!(
                    adjacency[peer].connections.contains(id),
                    "{peer} missing back-edge to {id}"
                );
            }
        }
    }

    #[test]
    fn test_corner_run_connects_components() {
        // A's right terminal wired to B's left terminal through an L bend.
        let mut components = BTreeMap::new();
        components.insert("a".to_string(), resistor("a", "R1", 100.0, 0.0));
        components.insert("b".to_string(), resistor("b", "R2", 300.0, 200.0));
        let wires = vec![
            wire(150.0, 0.0, 250.0, 0.0),
            wire(250.0, 0.0, 250.0, 200.0),
        ];
        let graph = build_graph(&wires, &components);
        assert!(graph.is_connected("a", "b"));
        assert_eq!(graph.stats().junctions, 0);
    }

    #[test]
    fn test_corner_with_terminal_is_not_fused() {
        // A component terminal sits exactly on the corner: fusing would hide
        // its connection, so the two wires stay separate.
        let mut components = BTreeMap::new();
        components.insert(
            "g".to_string(),
            Component::new(
                "g",
                ComponentType::Ground,
                Point::new(250.0, 20.0),
                Rotation::R0,
            )
            .unwrap()
            .with_name("GND1"),
        );
        let wires = vec![
            wire(150.0, 0.0, 250.0, 0.0),
            wire(250.0, 0.0, 250.0, 200.0),
        ];
        let terminal_keys: HashSet<(i64, i64)> = components
            .values()
            .flat_map(|c| c.snap_points.iter().map(Point::key))
            .collect();
        let fused = merge_corner_pass(&wires, &terminal_keys);
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn test_direct_terminal_contact_without_wire() {
        // Two resistors placed so their terminals coincide: connected with
        // no wire at all.
        let mut components = BTreeMap::new();
        components.insert("a".to_string(), resistor("a", "R1", 100.0, 0.0));
        components.insert("b".to_string(), resistor("b", "R2", 200.0, 0.0));
        let graph = build_graph(&[], &components);
        assert!(graph.is_connected("a", "b"));
    }

    #[test]
    fn test_three_terminals_synthesize_node() {
        // Three components sharing one terminal coordinate form a junction
        // even with no wire touching it, and each connects to the node.
        let mut components = BTreeMap::new();
        components.insert("a".to_string(), resistor("a", "R1", 100.0, 0.0));
        components.insert("b".to_string(), resistor("b", "R2", 200.0, 0.0));
        let upright = Component::new(
            "c",
            ComponentType::Capacitor,
            Point::new(150.0, 20.0),
            Rotation::R0,
        )
        .unwrap()
        .with_name("C1");
        // terminals at (150, 40) and (150, 0): the lower one joins the pair
        assert!(upright.snap_points.contains(&Point::new(150.0, 0.0)));
        components.insert("c".to_string(), upright);

        let graph = build_graph(&[], &components);
        assert_eq!(graph.stats().junctions, 1);
        let node_id = graph.junctions().next().unwrap().id().to_string();
        for id in ["a", "b", "c"] {
            assert!(graph.is_connected(&node_id, id));
        }
    }

    #[test]
    fn test_floating_endpoint_is_silently_ignored() {
        // One end on a terminal, the other in empty space: the wire
        // contributes no edge and the build still succeeds.
        let mut components = BTreeMap::new();
        components.insert("a".to_string(), resistor("a", "R1", 100.0, 0.0));
        let wires = vec![wire(150.0, 0.0, 150.0, -100.0)];
        let graph = build_graph(&wires, &components);
        assert_eq!(graph.stats().connections, 0);
        assert!(graph.contains("a"));
    }
}
