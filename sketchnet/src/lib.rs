//! SketchNet - geometric topology engine for sketched circuit diagrams
//!
//! This library turns freeform circuit sketches — discrete parts joined by
//! orthogonal wires — into an abstract connectivity graph ("netlist")
//! derived purely from geometry: where terminals land under rotation, where
//! floating objects snap, how overlapping wire strokes collapse into
//! canonical runs, and where junction nodes form.
//!
//! # Quick Start
//!
//! ```
//! use sketchnet::prelude::*;
//!
//! let mut session = Session::new();
//! let left = session
//!     .place_component(ComponentType::Resistor, 100.0, 0.0, Rotation::R0)
//!     .unwrap();
//! let right = session
//!     .place_component(ComponentType::Resistor, 300.0, 0.0, Rotation::R0)
//!     .unwrap();
//!
//! let draft = session.begin_wire(150.0, 0.0).unwrap();
//! session.commit_wire(draft, 250.0, 0.0).unwrap();
//!
//! let graph = session.connectivity();
//! assert!(graph.is_connected(&left, &right));
//! ```
//!
//! # Features
//!
//! - **Snap engine**: per-type terminal points under cardinal rotation
//! - **Snap resolver**: nearest-target alignment within a fixed threshold
//! - **Wire normalizer**: merge/split pipeline to a canonical disjoint set
//! - **Graph builder**: junction inference and symmetric adjacency
//! - **Session layer**: undo/redo snapshots, label counters, recognizer merge

pub mod core;
pub mod geometry;
pub mod recognize;
pub mod schema;
pub mod session;
pub mod topology;

// Re-export main types
pub use core::{SketchNetCore, SketchNetError};
pub use geometry::resolver::{resolve_snap, SnapResult, SnapTarget};
pub use geometry::snap::compute_snap_points;
pub use geometry::{GRID_SIZE, SNAP_THRESHOLD};
pub use schema::{
    Component, ComponentId, ComponentMap, ComponentType, Orientation, Point, Rotation, Scene, Wire,
};
pub use session::{Session, WireDraft};
pub use topology::graph::{build_graph, ConnectivityGraph, GraphEntity, GraphEntry, GraphStats};
pub use topology::normalize::normalize;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        build_graph, compute_snap_points, normalize, resolve_snap, Component, ComponentType,
        ConnectivityGraph, Point, Rotation, Scene, Session, SketchNetCore, SketchNetError,
        SnapResult, Wire,
    };
}
