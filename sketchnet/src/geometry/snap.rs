//! Snap point engine: world-space terminal points for a component instance
//! or an in-progress wire, given position and rotation.

use crate::core::SketchNetError;
use crate::geometry::tables::{Dimensions, Footprint};
use crate::geometry::{snap_to_grid, MIDPOINT_MIN_RUN};
use crate::schema::{ComponentType, Point, Rotation};

/// Compute the ordered snap candidate set for an object.
///
/// For [`ComponentType::Wire`] the anchored start must be supplied via
/// `wire_anchor`; `position` is the floating end under the cursor. For every
/// other type the candidates are the terminal points of the part centered at
/// `position` under `rotation`.
pub fn compute_snap_points(
    component_type: ComponentType,
    position: Point,
    rotation: Rotation,
    wire_anchor: Option<Point>,
) -> Result<Vec<Point>, SketchNetError> {
    match component_type.footprint() {
        Footprint::WireDraft => {
            let anchor = wire_anchor.ok_or(SketchNetError::MissingWireAnchor)?;
            Ok(wire_candidates(anchor, position))
        }
        Footprint::Fixed(offsets) => Ok(offsets
            .iter()
            .map(|o| {
                let (dx, dy) = rotation.rotate(o.dx, o.dy);
                Point::new(position.x + dx, position.y + dy)
            })
            .collect()),
        Footprint::TwoTerminal(dims) => Ok(two_terminal_pair(dims, position, rotation)),
    }
}

/// Candidates for a wire being drawn: its anchored start, its floating end,
/// and — once the run is axis-aligned and long enough for a midpoint to be
/// meaningfully distinct from the endpoints — the grid-snapped midpoint.
fn wire_candidates(anchor: Point, end: Point) -> Vec<Point> {
    let mut points = vec![anchor, end];

    let dx = end.x - anchor.x;
    let dy = end.y - anchor.y;
    if dx == 0.0 && dy.abs() >= MIDPOINT_MIN_RUN {
        points.push(Point::new(anchor.x, snap_to_grid(anchor.y + dy / 2.0)));
    } else if dy == 0.0 && dx.abs() >= MIDPOINT_MIN_RUN {
        points.push(Point::new(snap_to_grid(anchor.x + dx / 2.0), anchor.y));
    }

    points
}

/// Symmetric terminal pair of a generic two-terminal part.
///
/// The offset magnitude is the projection of the rotated bounding box onto
/// its own rotated axis, which puts the endpoints at the two ends of the
/// drawn symbol for any cardinal rotation. `invert` parts get a quarter turn
/// first so the pair tracks their vertical artwork.
fn two_terminal_pair(dims: Dimensions, position: Point, rotation: Rotation) -> Vec<Point> {
    let effective = if dims.invert {
        rotation.quarter_turn()
    } else {
        rotation
    };
    let (cos, sin) = (effective.cos(), effective.sin());

    let dx = ((dims.width * cos + dims.height * sin) / 2.0) * cos;
    let dy = ((dims.height * cos + dims.width * sin) / 2.0) * sin;

    vec![
        Point::new(position.x + dx, position.y + dy),
        Point::new(position.x - dx, position.y - dy),
    ]
}
