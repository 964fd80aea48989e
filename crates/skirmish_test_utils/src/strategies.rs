//! Proptest strategies for simulation inputs.

use proptest::prelude::*;
use skirmish_core::components::UnitClass;
use skirmish_core::economy::RawResources;

/// A single frame time, including zero-length steps.
pub fn dt() -> impl Strategy<Value = f32> {
    prop_oneof![Just(0.0_f32), 0.001_f32..0.5]
}

/// A sequence of frame times.
pub fn dt_sequence(max_len: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(dt(), 1..=max_len)
}

/// Any ship class.
pub fn unit_class() -> impl Strategy<Value = UnitClass> {
    prop_oneof![
        Just(UnitClass::Light),
        Just(UnitClass::Heavy),
        Just(UnitClass::Drone),
    ]
}

/// Non-negative resource levels up to `max`.
pub fn raw_resources(max: f32) -> impl Strategy<Value = RawResources> {
    (0.0..=max, 0.0..=max, 0.0..=max, 0.0..=max)
        .prop_map(|(iron, energy, copper, silicon)| RawResources::new(iron, energy, copper, silicon))
}
