//! Snap resolver: given a floating object and the current scene, find the
//! nearest valid snap target within the threshold and the offset that aligns
//! the object exactly onto it.

use crate::core::SketchNetError;
use crate::geometry::snap::compute_snap_points;
use crate::geometry::SNAP_THRESHOLD;
use crate::schema::{ComponentId, ComponentMap, ComponentType, Point, Rotation, Wire};

/// What a floating object snapped onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapTarget {
    /// A terminal of a placed component.
    Component(ComponentId),
    /// An endpoint or midpoint of an existing wire.
    WirePoint,
}

/// Result of a snap resolution. `offset` is the vector from the floating
/// point to the static target (`static − floating`), so translating the
/// floating object by it produces exact coincidence.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub offset: Point,
    pub target: Option<SnapTarget>,
}

impl SnapResult {
    /// A resolution that found nothing within the threshold.
    pub fn miss() -> Self {
        Self {
            offset: Point::default(),
            target: None,
        }
    }

    pub fn snapped(&self) -> bool {
        self.target.is_some()
    }

    /// Id of the component snapped onto, if the target was a terminal.
    pub fn component_id(&self) -> Option<&ComponentId> {
        match &self.target {
            Some(SnapTarget::Component(id)) => Some(id),
            _ => None,
        }
    }

    /// Translate a point by the snap offset.
    pub fn apply_to(&self, point: Point) -> Point {
        Point::new(point.x + self.offset.x, point.y + self.offset.y)
    }
}

/// Resolve the snap target for a floating component or wire endpoint.
///
/// Scans in two ordered phases: every placed component's terminals
/// (ascending component id), then every wire's start, end and midpoint
/// (insertion order). The minimum distance strictly below
/// [`SNAP_THRESHOLD`] wins; on exact ties the first pair to reach that
/// distance keeps it. The tie-break is deterministic but scan-order
/// dependent, not geometric — callers must not read meaning into it.
pub fn resolve_snap(
    position: Point,
    rotation: Rotation,
    component_type: ComponentType,
    components: &ComponentMap,
    wire_anchor: Option<Point>,
    wires: Option<&[Wire]>,
) -> Result<SnapResult, SketchNetError> {
    let floating = compute_snap_points(component_type, position, rotation, wire_anchor)?;
    if floating.is_empty() {
        return Ok(SnapResult::miss());
    }

    let mut closest = f64::INFINITY;
    let mut best: Option<(Point, SnapTarget)> = None;

    for (id, component) in components {
        for static_point in &component.snap_points {
            for floating_point in &floating {
                let dist = floating_point.distance_to(static_point);
                if dist < closest && dist < SNAP_THRESHOLD {
                    closest = dist;
                    best = Some((
                        offset_between(floating_point, static_point),
                        SnapTarget::Component(id.clone()),
                    ));
                }
            }
        }
    }

    if let Some(wires) = wires {
        for wire in wires {
            for floating_point in &floating {
                for static_point in [&wire.start, &wire.end, &wire.midpoint] {
                    let dist = floating_point.distance_to(static_point);
                    if dist < closest && dist < SNAP_THRESHOLD {
                        closest = dist;
                        best = Some((
                            offset_between(floating_point, static_point),
                            SnapTarget::WirePoint,
                        ));
                    }
                }
            }
        }
    }

    Ok(match best {
        Some((offset, target)) => SnapResult {
            offset,
            target: Some(target),
        },
        None => SnapResult::miss(),
    })
}

fn offset_between(floating: &Point, target: &Point) -> Point {
    Point::new(target.x - floating.x, target.y - floating.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Component;
    use std::collections::BTreeMap;

    fn one_resistor(id: &str, x: f64, y: f64) -> ComponentMap {
        let mut components = BTreeMap::new();
        components.insert(
            id.to_string(),
            Component::new(id, ComponentType::Resistor, Point::new(x, y), Rotation::R0)
                .unwrap()
                .with_name("R1"),
        );
        components
    }

    #[test]
    fn test_snaps_to_component_terminal() {
        // R1 terminals sit at (150, 100) and (50, 100). A resistor floated at
        // (215, 100) has its left terminal at (165, 100), 15 from (150, 100).
        let components = one_resistor("r1", 100.0, 100.0);
        let result = resolve_snap(
            Point::new(215.0, 100.0),
            Rotation::R0,
            ComponentType::Resistor,
            &components,
            None,
            None,
        )
        .unwrap();
        assert!(result.snapped());
        assert_eq!(result.component_id().map(String::as_str), Some("r1"));
        // left floating terminal (165, 100) pulls onto (150, 100)
        assert_eq!(result.offset, Point::new(-15.0, 0.0));
        assert_eq!(
            result.apply_to(Point::new(215.0, 100.0)),
            Point::new(200.0, 100.0)
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let components = one_resistor("r1", 100.0, 100.0);
        // Floating wire endpoint exactly 25 away from the (150, 100) terminal.
        let at_threshold = resolve_snap(
            Point::new(175.0, 100.0),
            Rotation::R0,
            ComponentType::Wire,
            &components,
            Some(Point::new(175.0, 100.0)),
            None,
        )
        .unwrap();
        assert!(!at_threshold.snapped());

        let just_inside = resolve_snap(
            Point::new(174.99, 100.0),
            Rotation::R0,
            ComponentType::Wire,
            &components,
            Some(Point::new(174.99, 100.0)),
            None,
        )
        .unwrap();
        assert!(just_inside.snapped());
    }

    #[test]
    fn test_component_phase_wins_exact_tie() {
        // A component terminal and a wire endpoint at the same distance:
        // the component phase scans first and keeps the minimum.
        let components = one_resistor("r1", 100.0, 100.0);
        let wires = vec![Wire::new(Point::new(150.0, 100.0), Point::new(150.0, 200.0))];
        let result = resolve_snap(
            Point::new(160.0, 100.0),
            Rotation::R0,
            ComponentType::Wire,
            &components,
            Some(Point::new(160.0, 100.0)),
            Some(&wires),
        )
        .unwrap();
        assert_eq!(result.component_id().map(String::as_str), Some("r1"));
    }

    #[test]
    fn test_snaps_to_wire_midpoint() {
        let components = BTreeMap::new();
        let wires = vec![Wire::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0))];
        let result = resolve_snap(
            Point::new(55.0, 10.0),
            Rotation::R0,
            ComponentType::Wire,
            &components,
            Some(Point::new(55.0, 10.0)),
            Some(&wires),
        )
        .unwrap();
        assert!(result.snapped());
        assert_eq!(result.target, Some(SnapTarget::WirePoint));
        assert_eq!(result.apply_to(Point::new(55.0, 10.0)), Point::new(50.0, 0.0));
    }

    #[test]
    fn test_miss_outside_threshold() {
        let components = one_resistor("r1", 100.0, 100.0);
        let result = resolve_snap(
            Point::new(500.0, 500.0),
            Rotation::R0,
            ComponentType::Resistor,
            &components,
            None,
            None,
        )
        .unwrap();
        assert!(!result.snapped());
        assert_eq!(result.offset, Point::new(0.0, 0.0));
    }
}
