//! Core topology API shared by the session layer and the CLI.
//! No UI or app-state dependencies.

use std::collections::BTreeMap;
use std::path::Path;

use crate::geometry::resolver::{self, SnapResult};
use crate::geometry::snap;
use crate::schema::{ComponentMap, ComponentType, Point, Rotation, Scene, Wire};
use crate::topology::graph::{self, ConnectivityGraph, GraphEntry};
use crate::topology::normalize;

#[derive(Debug, thiserror::Error)]
pub enum SketchNetError {
    #[error("Unknown component type: {0}")]
    UnknownType(String),
    #[error("Invalid rotation {0}: expected 0, 90, 180 or 270 degrees")]
    InvalidRotation(u16),
    #[error("Wire snap points require an anchored start point")]
    MissingWireAnchor,
    #[error("No component with id {0}")]
    UnknownComponent(String),
    #[error("No wire at index {0}")]
    WireIndex(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scene decode error: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

/// Stateless façade over the four core operations.
///
/// Every method is a pure function of its arguments: the engine retains
/// nothing between calls, so callers are free to re-invoke with any
/// consistent scene snapshot.
pub struct SketchNetCore;

impl SketchNetCore {
    /// World-space terminal points for a component or wire draft (§ snap engine).
    pub fn snap_points(
        component_type: ComponentType,
        position: Point,
        rotation: Rotation,
        wire_anchor: Option<Point>,
    ) -> Result<Vec<Point>, SketchNetError> {
        snap::compute_snap_points(component_type, position, rotation, wire_anchor)
    }

    /// Nearest valid snap target for a floating object (§ snap resolver).
    pub fn resolve_snap(
        position: Point,
        rotation: Rotation,
        component_type: ComponentType,
        components: &ComponentMap,
        wire_anchor: Option<Point>,
        wires: Option<&[Wire]>,
    ) -> Result<SnapResult, SketchNetError> {
        resolver::resolve_snap(
            position,
            rotation,
            component_type,
            components,
            wire_anchor,
            wires,
        )
    }

    /// Canonical disjoint wire set (§ wire topology normalizer).
    pub fn normalize(wires: &[Wire], components: &ComponentMap) -> Vec<Wire> {
        normalize::normalize(wires, components)
    }

    /// Junction-inferred component/node adjacency (§ connectivity graph builder).
    pub fn connectivity(wires: &[Wire], components: &ComponentMap) -> ConnectivityGraph {
        graph::build_graph(wires, components)
    }

    /// Adjacency with internal ids replaced by human-readable names, the
    /// presentation form handed to displays.
    pub fn connectivity_named(
        wires: &[Wire],
        components: &ComponentMap,
    ) -> BTreeMap<String, GraphEntry> {
        graph::build_graph(wires, components).to_named_adjacency()
    }

    /// Load a scene snapshot from a JSON file (derived data re-derived).
    pub fn load_scene(path: &Path) -> Result<Scene, SketchNetError> {
        let json = std::fs::read_to_string(path)?;
        Scene::from_json_str(&json)
    }
}
