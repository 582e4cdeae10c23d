//! Session layer: the caller-owned scene snapshot plus the sequence state
//! around it — undo/redo history and per-type label counters.
//!
//! The topology engine itself is stateless; this module is the single owner
//! of mutation. Every mutating call pushes the previous snapshot onto the
//! undo stack, so undo and redo are whole-snapshot swaps with no partial
//! states to reconcile.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::core::SketchNetError;
use crate::geometry::resolver::resolve_snap;
use crate::recognize::RecognizedScene;
use crate::schema::{Component, ComponentId, ComponentType, Point, Rotation, Scene, Wire};
use crate::topology::graph::{build_graph, ConnectivityGraph};
use crate::topology::normalize::normalize;

/// An in-progress wire: the anchored start point and what it snapped onto.
#[derive(Debug, Clone, PartialEq)]
pub struct WireDraft {
    pub start: Point,
    pub start_attached: Option<ComponentId>,
}

/// Interactive editing session over a scene.
#[derive(Debug, Default)]
pub struct Session {
    scene: Scene,
    undo_stack: Vec<Scene>,
    redo_stack: Vec<Scene>,
    label_counters: BTreeMap<&'static str, u32>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume editing an existing scene. Label counters pick up after the
    /// highest numbered name already present, so new parts never collide.
    pub fn with_scene(scene: Scene) -> Self {
        let mut label_counters: BTreeMap<&'static str, u32> = BTreeMap::new();
        for component in scene.components.values() {
            let prefix = component.component_type.label_prefix();
            if let Some(number) = component
                .name
                .strip_prefix(prefix)
                .and_then(|rest| rest.parse::<u32>().ok())
            {
                let counter = label_counters.entry(prefix).or_insert(0);
                *counter = (*counter).max(number);
            }
        }
        Self {
            scene,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            label_counters,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn push_undo(&mut self) {
        self.undo_stack.push(self.scene.clone());
        self.redo_stack.clear();
    }

    fn next_label(&mut self, component_type: ComponentType) -> String {
        let prefix = component_type.label_prefix();
        let counter = self.label_counters.entry(prefix).or_insert(0);
        *counter += 1;
        format!("{prefix}{counter}")
    }

    /// Place a component at a raw cursor position: snap-resolve against the
    /// scene, translate by the returned offset, quantize to the grid, then
    /// mint an id and label. Returns the new component's id.
    pub fn place_component(
        &mut self,
        component_type: ComponentType,
        x: f64,
        y: f64,
        rotation: Rotation,
    ) -> Result<ComponentId, SketchNetError> {
        if component_type.is_wire() {
            return Err(SketchNetError::Other(
                "wires are drawn with begin_wire/commit_wire, not placed".to_string(),
            ));
        }

        let raw = Point::new(x, y);
        let snap = resolve_snap(
            raw,
            rotation,
            component_type,
            &self.scene.components,
            None,
            Some(&self.scene.wires),
        )?;
        let position = snap.apply_to(raw).snapped_to_grid();

        let id = Uuid::new_v4().to_string();
        let name = self.next_label(component_type);
        let component =
            Component::new(id.clone(), component_type, position, rotation)?.with_name(name);

        self.push_undo();
        self.scene.components.insert(id.clone(), component);
        Ok(id)
    }

    /// Anchor the start of a new wire at a raw cursor position, snapping it
    /// onto whatever terminal or wire point is within reach. Pure with
    /// respect to the session; nothing is committed until `commit_wire`.
    pub fn begin_wire(&self, x: f64, y: f64) -> Result<WireDraft, SketchNetError> {
        let raw = Point::new(x, y);
        let snap = resolve_snap(
            raw,
            Rotation::default(),
            ComponentType::Wire,
            &self.scene.components,
            Some(raw),
            Some(&self.scene.wires),
        )?;
        Ok(WireDraft {
            start: snap.apply_to(raw).snapped_to_grid(),
            start_attached: snap.component_id().cloned(),
        })
    }

    /// Finish a wire at a raw cursor position and fold it into the scene.
    ///
    /// The endpoint is locked to the dominant axis from the anchor, so drawn
    /// wires are always orthogonal, then nudged along that axis onto any
    /// terminal or wire point within reach. The whole wire set is
    /// re-normalized on every successful draw.
    pub fn commit_wire(&mut self, draft: WireDraft, x: f64, y: f64) -> Result<(), SketchNetError> {
        let locked = axis_locked_end(draft.start, Point::new(x, y));
        let snap = resolve_snap(
            draft.start,
            Rotation::default(),
            ComponentType::Wire,
            &self.scene.components,
            Some(locked),
            Some(&self.scene.wires),
        )?;
        let (end, end_attached) = adjust_along_axis(draft.start, locked, &snap);

        self.push_undo();
        let mut wires = self.scene.wires.clone();
        wires.push(Wire::new(draft.start, end).with_attachments(draft.start_attached, end_attached));
        self.scene.wires = normalize(&wires, &self.scene.components);
        Ok(())
    }

    /// Move a component to a raw position, re-snapping and re-deriving its
    /// terminals.
    pub fn move_component(&mut self, id: &str, x: f64, y: f64) -> Result<(), SketchNetError> {
        let component = self
            .scene
            .components
            .get(id)
            .ok_or_else(|| SketchNetError::UnknownComponent(id.to_string()))?;
        let (component_type, rotation) = (component.component_type, component.rotation);

        let raw = Point::new(x, y);
        let snap = resolve_snap(
            raw,
            rotation,
            component_type,
            &self.scene.components,
            None,
            Some(&self.scene.wires),
        )?;
        let position = snap.apply_to(raw).snapped_to_grid();

        self.push_undo();
        let Some(component) = self.scene.components.get_mut(id) else {
            return Err(SketchNetError::UnknownComponent(id.to_string()));
        };
        component.position = position;
        component.refresh_snap_points()
    }

    /// Rotate a component a quarter turn, re-deriving its terminals.
    pub fn rotate_component(&mut self, id: &str) -> Result<(), SketchNetError> {
        if !self.scene.components.contains_key(id) {
            return Err(SketchNetError::UnknownComponent(id.to_string()));
        }
        self.push_undo();
        let Some(component) = self.scene.components.get_mut(id) else {
            return Err(SketchNetError::UnknownComponent(id.to_string()));
        };
        component.rotation = component.rotation.quarter_turn();
        component.refresh_snap_points()
    }

    /// Update the editable properties of a component.
    pub fn update_component(
        &mut self,
        id: &str,
        name: Option<String>,
        value: Option<String>,
    ) -> Result<(), SketchNetError> {
        if !self.scene.components.contains_key(id) {
            return Err(SketchNetError::UnknownComponent(id.to_string()));
        }
        self.push_undo();
        let Some(component) = self.scene.components.get_mut(id) else {
            return Err(SketchNetError::UnknownComponent(id.to_string()));
        };
        if let Some(name) = name {
            component.name = name;
        }
        if let Some(value) = value {
            component.value = value;
        }
        Ok(())
    }

    pub fn remove_component(&mut self, id: &str) -> Result<(), SketchNetError> {
        if !self.scene.components.contains_key(id) {
            return Err(SketchNetError::UnknownComponent(id.to_string()));
        }
        self.push_undo();
        self.scene.components.remove(id);
        Ok(())
    }

    pub fn remove_wire(&mut self, index: usize) -> Result<(), SketchNetError> {
        if index >= self.scene.wires.len() {
            return Err(SketchNetError::WireIndex(index));
        }
        self.push_undo();
        self.scene.wires.remove(index);
        Ok(())
    }

    /// Fold a recognizer result into the scene: recognized components join
    /// the map (terminals re-derived), recognized wires join the set and the
    /// whole set is re-normalized.
    pub fn merge_recognized(&mut self, recognized: RecognizedScene) {
        self.push_undo();
        for (id, mut component) in recognized.components {
            match component.refresh_snap_points() {
                Ok(()) => {
                    self.scene.components.insert(id, component);
                }
                Err(error) => {
                    tracing::warn!(%id, %error, "dropping unusable recognized component");
                }
            }
        }
        let mut wires = self.scene.wires.clone();
        wires.extend(
            recognized
                .lines
                .into_iter()
                .map(|w| Wire::new(w.start, w.end)),
        );
        self.scene.wires = normalize(&wires, &self.scene.components);
        tracing::info!(
            components = self.scene.components.len(),
            wires = self.scene.wires.len(),
            "merged recognizer result into scene"
        );
    }

    /// Restore the previous snapshot. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                self.redo_stack.push(std::mem::replace(&mut self.scene, previous));
                true
            }
            None => false,
        }
    }

    /// Re-apply an undone snapshot. Returns false when there is none.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                self.undo_stack.push(std::mem::replace(&mut self.scene, next));
                true
            }
            None => false,
        }
    }

    /// Build the connectivity graph for the current snapshot.
    pub fn connectivity(&self) -> ConnectivityGraph {
        build_graph(&self.scene.wires, &self.scene.components)
    }
}

/// Quantize the cursor onto the dominant axis from the anchor: wires are
/// drawn orthogonally, never diagonally.
fn axis_locked_end(start: Point, cursor: Point) -> Point {
    if (cursor.x - start.x).abs() > (cursor.y - start.y).abs() {
        Point::new(crate::geometry::snap_to_grid(cursor.x), start.y)
    } else {
        Point::new(start.x, crate::geometry::snap_to_grid(cursor.y))
    }
}

/// Apply a snap offset to the locked endpoint only when it moves the point
/// along the wire's own axis; any other pull would bend the wire off-axis.
/// The attachment mark is recorded only for an applied adjustment.
fn adjust_along_axis(
    start: Point,
    locked: Point,
    snap: &crate::geometry::resolver::SnapResult,
) -> (Point, Option<ComponentId>) {
    if !snap.snapped() {
        return (locked, None);
    }
    let offset = snap.offset;
    if offset.x == 0.0 && offset.y != 0.0 && locked.x == start.x {
        (
            Point::new(locked.x, locked.y + offset.y),
            snap.component_id().cloned(),
        )
    } else if offset.x != 0.0 && offset.y == 0.0 && locked.y == start.y {
        (
            Point::new(locked.x + offset.x, locked.y),
            snap.component_id().cloned(),
        )
    } else {
        (locked, None)
    }
}
