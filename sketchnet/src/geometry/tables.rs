//! Static per-type terminal geometry.
//!
//! Two families: generic two-terminal parts described by a bounding box whose
//! long axis carries a symmetric terminal pair, and multi-terminal parts with
//! explicit center-relative offsets. All offsets are expressed in the
//! component's unrotated orientation; the snap engine applies the rotation.

use crate::schema::ComponentType;

/// Bounding box of a generic two-terminal part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    /// Set for parts whose default artwork runs vertically; the snap engine
    /// adds a quarter turn before projecting so the terminal pair still lands
    /// on the visual long axis.
    pub invert: bool,
}

/// A single terminal offset from the component center, unrotated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalOffset {
    pub dx: f64,
    pub dy: f64,
}

const fn off(dx: f64, dy: f64) -> TerminalOffset {
    TerminalOffset { dx, dy }
}

const fn dims(width: f64, height: f64, invert: bool) -> Dimensions {
    Dimensions {
        width,
        height,
        invert,
    }
}

/// Terminal geometry family for a component type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Footprint {
    /// Symmetric terminal pair along the long axis of a bounding box.
    TwoTerminal(Dimensions),
    /// Explicit per-terminal offsets.
    Fixed(&'static [TerminalOffset]),
    /// Wires have no static footprint; their candidates come from the
    /// anchored start and the floating end.
    WireDraft,
}

const BOX_100X40: Dimensions = dims(100.0, 40.0, false);
const BOX_40X40_UPRIGHT: Dimensions = dims(40.0, 40.0, true);

/// Two-input gates share one body: two inputs on the left edge, one output.
const GATE_TWO_INPUT: &[TerminalOffset] = &[off(-40.0, -10.0), off(-40.0, 10.0), off(40.0, 0.0)];

const INVERTER: &[TerminalOffset] = &[off(-40.0, 0.0), off(40.0, 0.0)];
const CROSSOVER: &[TerminalOffset] = &[off(-20.0, 0.0), off(0.0, 20.0), off(0.0, -20.0), off(20.0, 0.0)];
const TERMINAL_POS: &[TerminalOffset] = &[off(0.0, 20.0)];
const TERMINAL_NEG: &[TerminalOffset] = &[off(0.0, -20.0)];
const THYRISTOR: &[TerminalOffset] = &[off(-50.0, 0.0), off(50.0, 0.0), off(30.0, 20.0)];
const OP_AMP: &[TerminalOffset] = &[
    off(-50.0, -30.0),
    off(-50.0, 30.0),
    off(0.0, -50.0),
    off(0.0, 50.0),
    off(50.0, 0.0),
];
const WIDE_PAIR: &[TerminalOffset] = &[off(-50.0, 0.0), off(50.0, 0.0)];
const TRANSISTOR: &[TerminalOffset] = &[off(-40.0, 0.0), off(20.0, -50.0), off(20.0, 50.0)];
const PHOTOTRANSISTOR: &[TerminalOffset] = &[off(20.0, -50.0), off(20.0, 50.0)];
const MICROPHONE: &[TerminalOffset] = &[off(0.0, -50.0), off(0.0, 50.0)];
const SPEAKER: &[TerminalOffset] = &[off(-10.0, -50.0), off(-10.0, 50.0)];
const TRANSFORMER: &[TerminalOffset] = &[
    off(-40.0, -40.0),
    off(-40.0, 40.0),
    off(40.0, -40.0),
    off(40.0, 40.0),
];
const TRIAC: &[TerminalOffset] = &[off(0.0, -50.0), off(0.0, 50.0), off(50.0, 40.0)];
const DIAC: &[TerminalOffset] = &[off(0.0, -50.0), off(0.0, 50.0)];
const GROUND: &[TerminalOffset] = &[off(0.0, -20.0)];

impl ComponentType {
    /// Terminal geometry for this type. The match is exhaustive on purpose:
    /// adding a catalogue entry without terminal geometry is a compile error,
    /// not a silent "no snap points".
    pub fn footprint(self) -> Footprint {
        match self {
            ComponentType::Resistor
            | ComponentType::Inductor
            | ComponentType::VoltageAc
            | ComponentType::Diode
            | ComponentType::Switch
            | ComponentType::Varistor
            | ComponentType::Fuse
            | ComponentType::Motor
            | ComponentType::ZenerDiode
            | ComponentType::CurrentSource => Footprint::TwoTerminal(BOX_100X40),

            ComponentType::Capacitor
            | ComponentType::VoltageDc
            | ComponentType::PolarizedCapacitor => Footprint::TwoTerminal(BOX_40X40_UPRIGHT),

            ComponentType::Crossover => Footprint::Fixed(CROSSOVER),
            ComponentType::TerminalPos => Footprint::Fixed(TERMINAL_POS),
            ComponentType::TerminalNeg => Footprint::Fixed(TERMINAL_NEG),
            ComponentType::Thyristor => Footprint::Fixed(THYRISTOR),
            ComponentType::NotGate => Footprint::Fixed(INVERTER),
            ComponentType::OrGate
            | ComponentType::NorGate
            | ComponentType::XorGate
            | ComponentType::NandGate
            | ComponentType::AndGate => Footprint::Fixed(GATE_TWO_INPUT),
            ComponentType::OpAmp => Footprint::Fixed(OP_AMP),
            ComponentType::Photoresistor | ComponentType::Led => Footprint::Fixed(WIDE_PAIR),
            ComponentType::TransistorNpn | ComponentType::TransistorPnp => {
                Footprint::Fixed(TRANSISTOR)
            }
            ComponentType::Phototransistor => Footprint::Fixed(PHOTOTRANSISTOR),
            ComponentType::Microphone => Footprint::Fixed(MICROPHONE),
            ComponentType::Speaker => Footprint::Fixed(SPEAKER),
            ComponentType::Transformer => Footprint::Fixed(TRANSFORMER),
            ComponentType::Triac => Footprint::Fixed(TRIAC),
            ComponentType::Diac => Footprint::Fixed(DIAC),
            ComponentType::Ground => Footprint::Fixed(GROUND),

            ComponentType::Wire => Footprint::WireDraft,
        }
    }

    /// Number of terminals a placed instance of this type exposes.
    pub fn terminal_count(self) -> usize {
        match self.footprint() {
            Footprint::TwoTerminal(_) => 2,
            Footprint::Fixed(offsets) => offsets.len(),
            Footprint::WireDraft => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_placeable_type_has_terminals() {
        for &t in ComponentType::ALL {
            if t.is_wire() {
                assert_eq!(t.terminal_count(), 0);
            } else {
                assert!(t.terminal_count() >= 1, "{t} exposes no terminals");
            }
        }
    }

    #[test]
    fn test_two_terminal_dimensions() {
        assert_eq!(
            ComponentType::Resistor.footprint(),
            Footprint::TwoTerminal(Dimensions {
                width: 100.0,
                height: 40.0,
                invert: false
            })
        );
        // Capacitors draw vertically, so their pair is projected a quarter
        // turn from the nominal rotation.
        assert_eq!(
            ComponentType::Capacitor.footprint(),
            Footprint::TwoTerminal(Dimensions {
                width: 40.0,
                height: 40.0,
                invert: true
            })
        );
    }

    #[test]
    fn test_gate_terminal_counts() {
        assert_eq!(ComponentType::NotGate.terminal_count(), 2);
        assert_eq!(ComponentType::NandGate.terminal_count(), 3);
        assert_eq!(ComponentType::OpAmp.terminal_count(), 5);
        assert_eq!(ComponentType::Transformer.terminal_count(), 4);
        assert_eq!(ComponentType::Ground.terminal_count(), 1);
    }
}
