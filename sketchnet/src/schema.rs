//! Plain data records exchanged with the interactive surface.
//!
//! Everything here is a value type: the engine reads these records and returns
//! freshly derived ones, never mutating caller state in place. A component's
//! `snap_points` are always derived from `(component_type, position, rotation)`
//! and must be refreshed after any of those change; they are never
//! authoritative on their own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::SketchNetError;
use crate::geometry::snap_to_grid;

/// Opaque component identifier (v4 UUID when minted by the session layer).
pub type ComponentId = String;

/// Components keyed by id. A BTreeMap keeps scan order deterministic, which
/// the snap resolver's tie-break relies on.
pub type ComponentMap = BTreeMap<ComponentId, Component>;

/// A point in world coordinates (grid units).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Round each coordinate to the nearest grid multiple.
    pub fn snapped_to_grid(self) -> Point {
        Point::new(snap_to_grid(self.x), snap_to_grid(self.y))
    }

    /// Exact-coordinate map key. Topology inputs are grid-snapped, so every
    /// coordinate is an integer and the rounding here is lossless.
    pub(crate) fn key(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal rotation of a placed component.
///
/// A closed enum with exact integer cosine/sine: `f64::cos(90°)` leaves a
/// ~6e-17 residue that would break the exact coordinate matching the
/// topology passes depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    pub fn cos(self) -> f64 {
        match self {
            Rotation::R0 => 1.0,
            Rotation::R90 => 0.0,
            Rotation::R180 => -1.0,
            Rotation::R270 => 0.0,
        }
    }

    pub fn sin(self) -> f64 {
        match self {
            Rotation::R0 => 0.0,
            Rotation::R90 => 1.0,
            Rotation::R180 => 0.0,
            Rotation::R270 => -1.0,
        }
    }

    /// Rotate a quarter turn counter-clockwise.
    pub fn quarter_turn(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    /// Apply the standard 2D rotation matrix to a center-relative offset.
    pub fn rotate(self, dx: f64, dy: f64) -> (f64, f64) {
        let (cos, sin) = (self.cos(), self.sin());
        (dx * cos - dy * sin, dx * sin + dy * cos)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = SketchNetError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::R0),
            90 => Ok(Rotation::R90),
            180 => Ok(Rotation::R180),
            270 => Ok(Rotation::R270),
            other => Err(SketchNetError::InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> u16 {
        rotation.degrees()
    }
}

/// The closed catalogue of part types a sketch can contain.
///
/// Terminal geometry is dispatched exhaustively over this enum (see
/// `geometry::tables`), so a newly added variant cannot silently fall through
/// to "no snap points" — the compiler flags every match that must learn
/// about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    Resistor,
    Capacitor,
    Inductor,
    VoltageDc,
    VoltageAc,
    Diode,
    Switch,
    Varistor,
    Fuse,
    Motor,
    ZenerDiode,
    PolarizedCapacitor,
    CurrentSource,
    Crossover,
    TerminalPos,
    TerminalNeg,
    Thyristor,
    NotGate,
    OrGate,
    NorGate,
    XorGate,
    NandGate,
    AndGate,
    OpAmp,
    Photoresistor,
    TransistorNpn,
    TransistorPnp,
    Phototransistor,
    Microphone,
    Speaker,
    Led,
    Transformer,
    Triac,
    Diac,
    Ground,
    Wire,
}

impl ComponentType {
    /// Every type, in catalogue order. Used by the CLI listing.
    pub const ALL: &'static [ComponentType] = &[
        ComponentType::Resistor,
        ComponentType::Capacitor,
        ComponentType::Inductor,
        ComponentType::VoltageDc,
        ComponentType::VoltageAc,
        ComponentType::Diode,
        ComponentType::Switch,
        ComponentType::Varistor,
        ComponentType::Fuse,
        ComponentType::Motor,
        ComponentType::ZenerDiode,
        ComponentType::PolarizedCapacitor,
        ComponentType::CurrentSource,
        ComponentType::Crossover,
        ComponentType::TerminalPos,
        ComponentType::TerminalNeg,
        ComponentType::Thyristor,
        ComponentType::NotGate,
        ComponentType::OrGate,
        ComponentType::NorGate,
        ComponentType::XorGate,
        ComponentType::NandGate,
        ComponentType::AndGate,
        ComponentType::OpAmp,
        ComponentType::Photoresistor,
        ComponentType::TransistorNpn,
        ComponentType::TransistorPnp,
        ComponentType::Phototransistor,
        ComponentType::Microphone,
        ComponentType::Speaker,
        ComponentType::Led,
        ComponentType::Transformer,
        ComponentType::Triac,
        ComponentType::Diac,
        ComponentType::Ground,
        ComponentType::Wire,
    ];

    /// Canonical lowercase name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Resistor => "resistor",
            ComponentType::Capacitor => "capacitor",
            ComponentType::Inductor => "inductor",
            ComponentType::VoltageDc => "voltage-dc",
            ComponentType::VoltageAc => "voltage-ac",
            ComponentType::Diode => "diode",
            ComponentType::Switch => "switch",
            ComponentType::Varistor => "varistor",
            ComponentType::Fuse => "fuse",
            ComponentType::Motor => "motor",
            ComponentType::ZenerDiode => "zener-diode",
            ComponentType::PolarizedCapacitor => "polarized-capacitor",
            ComponentType::CurrentSource => "current-source",
            ComponentType::Crossover => "crossover",
            ComponentType::TerminalPos => "terminal-pos",
            ComponentType::TerminalNeg => "terminal-neg",
            ComponentType::Thyristor => "thyristor",
            ComponentType::NotGate => "not-gate",
            ComponentType::OrGate => "or-gate",
            ComponentType::NorGate => "nor-gate",
            ComponentType::XorGate => "xor-gate",
            ComponentType::NandGate => "nand-gate",
            ComponentType::AndGate => "and-gate",
            ComponentType::OpAmp => "op-amp",
            ComponentType::Photoresistor => "photoresistor",
            ComponentType::TransistorNpn => "transistor-npn",
            ComponentType::TransistorPnp => "transistor-pnp",
            ComponentType::Phototransistor => "phototransistor",
            ComponentType::Microphone => "microphone",
            ComponentType::Speaker => "speaker",
            ComponentType::Led => "led",
            ComponentType::Transformer => "transformer",
            ComponentType::Triac => "triac",
            ComponentType::Diac => "diac",
            ComponentType::Ground => "ground",
            ComponentType::Wire => "wire",
        }
    }

    /// Reference-designator prefix used for label numbering (`R1`, `C2`, ...).
    pub fn label_prefix(self) -> &'static str {
        match self {
            ComponentType::Resistor => "R",
            ComponentType::Capacitor => "C",
            ComponentType::Inductor => "L",
            ComponentType::VoltageDc => "V",
            ComponentType::VoltageAc => "VAC",
            ComponentType::Diode => "D",
            ComponentType::Switch => "SW",
            ComponentType::Varistor => "VR",
            ComponentType::Fuse => "F",
            ComponentType::Motor => "M",
            ComponentType::ZenerDiode => "ZD",
            ComponentType::PolarizedCapacitor => "CP",
            ComponentType::CurrentSource => "I",
            ComponentType::Crossover => "X",
            ComponentType::TerminalPos => "TP",
            ComponentType::TerminalNeg => "TN",
            ComponentType::Thyristor => "SCR",
            ComponentType::NotGate => "NOT",
            ComponentType::OrGate => "OR",
            ComponentType::NorGate => "NOR",
            ComponentType::XorGate => "XOR",
            ComponentType::NandGate => "NAND",
            ComponentType::AndGate => "AND",
            ComponentType::OpAmp => "U",
            ComponentType::Photoresistor => "LDR",
            ComponentType::TransistorNpn => "Q",
            ComponentType::TransistorPnp => "Q",
            ComponentType::Phototransistor => "Q",
            ComponentType::Microphone => "MIC",
            ComponentType::Speaker => "SPK",
            ComponentType::Led => "LED",
            ComponentType::Transformer => "T",
            ComponentType::Triac => "TRIAC",
            ComponentType::Diac => "DIAC",
            ComponentType::Ground => "GND",
            ComponentType::Wire => "W",
        }
    }

    pub fn is_wire(self) -> bool {
        self == ComponentType::Wire
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = SketchNetError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| SketchNetError::UnknownType(name.to_string()))
    }
}

/// A placed component instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,

    #[serde(rename = "type")]
    pub component_type: ComponentType,

    /// Center of the component, grid-snapped by the session layer.
    pub position: Point,

    pub rotation: Rotation,

    /// Human-readable label (`R1`, `Q3`, ...).
    #[serde(default)]
    pub name: String,

    /// Free-form value string ("10k", "100nF", ...).
    #[serde(default)]
    pub value: String,

    /// World-space terminal points. Derived; refreshed whenever
    /// `component_type`, `position` or `rotation` change.
    #[serde(default)]
    pub snap_points: Vec<Point>,
}

impl Component {
    /// Create a component with freshly derived snap points.
    ///
    /// Fails for [`ComponentType::Wire`]: wires are drawn, not placed.
    pub fn new(
        id: impl Into<ComponentId>,
        component_type: ComponentType,
        position: Point,
        rotation: Rotation,
    ) -> Result<Self, SketchNetError> {
        let mut component = Self {
            id: id.into(),
            component_type,
            position,
            rotation,
            name: String::new(),
            value: String::new(),
            snap_points: Vec::new(),
        };
        component.refresh_snap_points()?;
        Ok(component)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Re-derive `snap_points` from the current type, position and rotation.
    pub fn refresh_snap_points(&mut self) -> Result<(), SketchNetError> {
        self.snap_points = crate::geometry::snap::compute_snap_points(
            self.component_type,
            self.position,
            self.rotation,
            None,
        )?;
        Ok(())
    }
}

/// Axis class of a wire segment.
///
/// Only horizontal and vertical wires participate in merging and splitting;
/// diagonal segments are carried through the topology passes untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
    Diagonal,
}

/// A drawn wire segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub start: Point,
    pub end: Point,

    /// Grid-snapped midpoint; recomputed whenever the endpoints change.
    #[serde(default)]
    pub midpoint: Point,

    /// Component the start endpoint snapped to when drawn, if any.
    #[serde(default)]
    pub start_attached: Option<ComponentId>,

    /// Component the end endpoint snapped to when drawn, if any.
    #[serde(default)]
    pub end_attached: Option<ComponentId>,
}

impl Wire {
    /// Build a wire with its midpoint derived from the endpoints.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            midpoint: Self::grid_midpoint(start, end),
            start_attached: None,
            end_attached: None,
        }
    }

    pub fn with_attachments(
        mut self,
        start_attached: Option<ComponentId>,
        end_attached: Option<ComponentId>,
    ) -> Self {
        self.start_attached = start_attached;
        self.end_attached = end_attached;
        self
    }

    /// The grid-snapped midpoint of a span.
    pub fn grid_midpoint(a: Point, b: Point) -> Point {
        Point::new(
            snap_to_grid((a.x + b.x) / 2.0),
            snap_to_grid((a.y + b.y) / 2.0),
        )
    }

    pub fn orientation(&self) -> Orientation {
        if self.start.y == self.end.y {
            Orientation::Horizontal
        } else if self.start.x == self.end.x {
            Orientation::Vertical
        } else {
            Orientation::Diagonal
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// A zero-length wire; excluded from merging and splitting.
    pub fn is_degenerate(&self) -> bool {
        self.start.key() == self.end.key()
    }

    /// Endpoints ordered low-to-high along the wire's axis, attachment marks
    /// following their endpoints. Diagonal wires come back unchanged.
    pub fn normalized(&self) -> Wire {
        let swap = match self.orientation() {
            Orientation::Horizontal => self.start.x > self.end.x,
            Orientation::Vertical => self.start.y > self.end.y,
            Orientation::Diagonal => false,
        };
        if swap {
            Wire::new(self.end, self.start)
                .with_attachments(self.end_attached.clone(), self.start_attached.clone())
        } else {
            self.clone()
        }
    }
}

/// The caller-owned scene snapshot: every operation in this crate is a pure
/// function over one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub components: ComponentMap,
    #[serde(default)]
    pub wires: Vec<Wire>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a scene from its JSON interchange form, re-deriving snap points
    /// and wire midpoints so serialized copies can never smuggle in stale
    /// derived data.
    pub fn from_json_str(json: &str) -> Result<Self, SketchNetError> {
        let mut scene: Scene =
            serde_json::from_str(json).map_err(|e| SketchNetError::Decode(e.to_string()))?;
        for component in scene.components.values_mut() {
            component.refresh_snap_points()?;
        }
        for wire in &mut scene.wires {
            wire.midpoint = Wire::grid_midpoint(wire.start, wire.end);
        }
        Ok(scene)
    }

    pub fn to_json_string(&self) -> Result<String, SketchNetError> {
        serde_json::to_string_pretty(self).map_err(|e| SketchNetError::Decode(e.to_string()))
    }
}
