//! Per-faction resource economy.
//!
//! Each faction accrues four raw resources at fixed rates and converts
//! them into three manufactured components through all-or-nothing
//! recipes. Components pay for ships; see [`crate::production`].
//!
//! Invariant: no raw resource or component stock ever goes negative.

use serde::{Deserialize, Serialize};

use crate::components::UnitClass;
use crate::error::{GameError, Result};
use crate::production::BuildCost;

/// Amounts of the four raw resources.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawResources {
    /// Iron.
    pub iron: f32,
    /// Energy.
    pub energy: f32,
    /// Copper.
    pub copper: f32,
    /// Silicon.
    pub silicon: f32,
}

impl RawResources {
    /// No resources.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a new resource bundle.
    #[must_use]
    pub const fn new(iron: f32, energy: f32, copper: f32, silicon: f32) -> Self {
        Self {
            iron,
            energy,
            copper,
            silicon,
        }
    }

    /// Check every field of `self` covers the matching field of `required`.
    #[must_use]
    pub fn covers(&self, required: &Self) -> bool {
        self.iron >= required.iron
            && self.energy >= required.energy
            && self.copper >= required.copper
            && self.silicon >= required.silicon
    }

    /// Subtract `amount`, clamping each field at zero.
    pub fn consume(&mut self, amount: &Self) {
        self.iron = (self.iron - amount.iron).max(0.0);
        self.energy = (self.energy - amount.energy).max(0.0);
        self.copper = (self.copper - amount.copper).max(0.0);
        self.silicon = (self.silicon - amount.silicon).max(0.0);
    }

    /// Add `rate * dt` to every field.
    pub fn accrue(&mut self, rate: &Self, dt: f32) {
        self.iron += rate.iron.max(0.0) * dt;
        self.energy += rate.energy.max(0.0) * dt;
        self.copper += rate.copper.max(0.0) * dt;
        self.silicon += rate.silicon.max(0.0) * dt;
    }

    /// Check no field is negative.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        self.iron >= 0.0 && self.energy >= 0.0 && self.copper >= 0.0 && self.silicon >= 0.0
    }
}

/// Manufactured component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Metal tubes (iron + energy).
    MetalTubes,
    /// Wiring (copper + silicon).
    Wiring,
    /// Circuits (iron + copper + silicon).
    Circuits,
}

impl ComponentKind {
    /// Get the short name for this component.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::MetalTubes => "metal tubes",
            Self::Wiring => "wiring",
            Self::Circuits => "circuits",
        }
    }
}

/// Stock of manufactured components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentStock {
    /// Metal tubes.
    pub metal_tubes: u32,
    /// Wiring.
    pub wiring: u32,
    /// Circuits.
    pub circuits: u32,
}

impl ComponentStock {
    /// Create a new stock.
    #[must_use]
    pub const fn new(metal_tubes: u32, wiring: u32, circuits: u32) -> Self {
        Self {
            metal_tubes,
            wiring,
            circuits,
        }
    }

    /// Stock of one component kind.
    #[must_use]
    pub const fn get(&self, kind: ComponentKind) -> u32 {
        match kind {
            ComponentKind::MetalTubes => self.metal_tubes,
            ComponentKind::Wiring => self.wiring,
            ComponentKind::Circuits => self.circuits,
        }
    }

    fn get_mut(&mut self, kind: ComponentKind) -> &mut u32 {
        match kind {
            ComponentKind::MetalTubes => &mut self.metal_tubes,
            ComponentKind::Wiring => &mut self.wiring,
            ComponentKind::Circuits => &mut self.circuits,
        }
    }

    /// Add `amount` of a component.
    pub fn add(&mut self, kind: ComponentKind, amount: u32) {
        let slot = self.get_mut(kind);
        *slot = slot.saturating_add(amount);
    }
}

/// A crafting recipe: consume `inputs`, produce `amount` of `output`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Raw resources consumed per batch.
    pub inputs: RawResources,
    /// Component produced.
    pub output: ComponentKind,
    /// Units produced per batch.
    pub amount: u32,
}

impl Recipe {
    /// 100 iron + 50 energy → 10 metal tubes.
    pub const METAL_TUBES: Self = Self {
        inputs: RawResources::new(100.0, 50.0, 0.0, 0.0),
        output: ComponentKind::MetalTubes,
        amount: 10,
    };

    /// 50 copper + 20 silicon → 10 wiring.
    pub const WIRING: Self = Self {
        inputs: RawResources::new(0.0, 0.0, 50.0, 20.0),
        output: ComponentKind::Wiring,
        amount: 10,
    };

    /// 30 iron + 30 copper + 40 silicon → 5 circuits.
    pub const CIRCUITS: Self = Self {
        inputs: RawResources::new(30.0, 0.0, 30.0, 40.0),
        output: ComponentKind::Circuits,
        amount: 5,
    };

    /// The standard recipe book, in crafting order.
    #[must_use]
    pub fn standard() -> Vec<Self> {
        vec![Self::METAL_TUBES, Self::WIRING, Self::CIRCUITS]
    }
}

/// What a single economy tick crafted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CraftReport {
    /// Components crafted this tick.
    pub crafted: ComponentStock,
}

impl CraftReport {
    /// Check whether any recipe fired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crafted == ComponentStock::default()
    }
}

/// Shipyard counts per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassCounts {
    /// Light count.
    pub light: u32,
    /// Heavy count.
    pub heavy: u32,
    /// Drone count.
    pub drone: u32,
}

impl ClassCounts {
    /// Count for one class.
    #[must_use]
    pub const fn get(&self, class: UnitClass) -> u32 {
        match class {
            UnitClass::Light => self.light,
            UnitClass::Heavy => self.heavy,
            UnitClass::Drone => self.drone,
        }
    }

    /// Increment the count for one class.
    pub fn increment(&mut self, class: UnitClass) {
        match class {
            UnitClass::Light => self.light += 1,
            UnitClass::Heavy => self.heavy += 1,
            UnitClass::Drone => self.drone += 1,
        }
    }

    /// Decrement the count for one class, saturating at zero.
    pub fn decrement(&mut self, class: UnitClass) {
        let slot = match class {
            UnitClass::Light => &mut self.light,
            UnitClass::Heavy => &mut self.heavy,
            UnitClass::Drone => &mut self.drone,
        };
        *slot = slot.saturating_sub(1);
    }

    /// Sum across all classes.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.light + self.heavy + self.drone
    }
}

/// Per-second component rates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentRates {
    /// Metal tubes per second.
    pub metal_tubes: f32,
    /// Wiring per second.
    pub wiring: f32,
    /// Circuits per second.
    pub circuits: f32,
}

/// How well production keeps up with demand for one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateStatus {
    /// Produced ≥ required.
    Satisfied,
    /// Produced ≥ 80% of required.
    Marginal,
    /// Produced < 80% of required.
    Deficit,
}

impl RateStatus {
    /// Grade a produced/required pair.
    #[must_use]
    pub fn grade(produced: f32, required: f32) -> Self {
        let ratio = if required > 0.0 {
            produced / required
        } else {
            1.0
        };

        if ratio >= 1.0 {
            Self::Satisfied
        } else if ratio >= 0.8 {
            Self::Marginal
        } else {
            Self::Deficit
        }
    }
}

/// Read-only resource state for one faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEconomy {
    /// Current raw resource levels.
    pub resources: RawResources,
    /// Generation rates (units per second).
    pub rates: RawResources,
    /// Manufactured component stock.
    pub components: ComponentStock,
    /// Crafting recipes, attempted in order every tick.
    pub recipes: Vec<Recipe>,
    /// Ships currently alive for this faction.
    live_units: u32,
}

impl ResourceEconomy {
    /// Default rates: iron 10/s, energy 5/s, copper 3/s, silicon 2/s.
    pub const DEFAULT_RATES: RawResources = RawResources::new(10.0, 5.0, 3.0, 2.0);

    /// Create an economy with starting resources and rates.
    #[must_use]
    pub fn new(resources: RawResources, rates: RawResources) -> Self {
        Self {
            resources,
            rates,
            components: ComponentStock::default(),
            recipes: Recipe::standard(),
            live_units: 0,
        }
    }

    /// Replace the recipe book.
    #[must_use]
    pub fn with_recipes(mut self, recipes: Vec<Recipe>) -> Self {
        self.recipes = recipes;
        self
    }

    /// Start with a component stock.
    #[must_use]
    pub fn with_components(mut self, components: ComponentStock) -> Self {
        self.components = components;
        self
    }

    /// Advance generation and crafting by `dt` seconds.
    ///
    /// Each recipe is checked once, in order, against the resources left
    /// by the recipes before it. A recipe fires completely or not at all.
    pub fn tick(&mut self, dt: f32) -> CraftReport {
        self.resources.accrue(&self.rates, dt.max(0.0));

        let mut report = CraftReport::default();
        for recipe in &self.recipes {
            if self.resources.covers(&recipe.inputs) {
                self.resources.consume(&recipe.inputs);
                self.components.add(recipe.output, recipe.amount);
                report.crafted.add(recipe.output, recipe.amount);
                tracing::trace!(
                    component = recipe.output.short_name(),
                    amount = recipe.amount,
                    "Crafted components"
                );
            }
        }

        report
    }

    /// Check whether the component stock covers a cost.
    #[must_use]
    pub fn can_afford(&self, cost: &BuildCost) -> bool {
        self.components.metal_tubes >= cost.metal_tubes
            && self.components.wiring >= cost.wiring
            && self.components.circuits >= cost.circuits
    }

    /// Deduct a cost from the component stock.
    ///
    /// Nothing is deducted unless the whole cost is covered.
    pub fn pay(&mut self, cost: &BuildCost) -> Result<()> {
        for (kind, required) in [
            (ComponentKind::MetalTubes, cost.metal_tubes),
            (ComponentKind::Wiring, cost.wiring),
            (ComponentKind::Circuits, cost.circuits),
        ] {
            let available = self.components.get(kind);
            if available < required {
                return Err(GameError::InsufficientResources {
                    component: kind.short_name(),
                    required,
                    available,
                });
            }
        }

        self.components.metal_tubes -= cost.metal_tubes;
        self.components.wiring -= cost.wiring;
        self.components.circuits -= cost.circuits;
        Ok(())
    }

    /// Ships currently alive for this faction.
    #[must_use]
    pub const fn live_units(&self) -> u32 {
        self.live_units
    }

    /// Record a spawned ship.
    pub fn increment_units(&mut self) {
        self.live_units += 1;
    }

    /// Record a destroyed ship.
    pub fn decrement_units(&mut self) {
        self.live_units = self.live_units.saturating_sub(1);
    }

    /// Instantaneous crafting output per second if the recipes fired now.
    #[must_use]
    pub fn craft_rates(&self, dt: f32) -> ComponentRates {
        let mut rates = ComponentRates::default();
        if dt <= 0.0 {
            return rates;
        }

        for recipe in &self.recipes {
            if self.resources.covers(&recipe.inputs) {
                let per_second = recipe.amount as f32 / dt;
                match recipe.output {
                    ComponentKind::MetalTubes => rates.metal_tubes += per_second,
                    ComponentKind::Wiring => rates.wiring += per_second,
                    ComponentKind::Circuits => rates.circuits += per_second,
                }
            }
        }

        rates
    }

    /// Component demand per second of a shipyard roster.
    #[must_use]
    pub fn required_rates(roster: &ClassCounts, build_cooldown: f32) -> ComponentRates {
        let mut per_cycle = ComponentRates::default();
        for class in UnitClass::ALL {
            let count = roster.get(class) as f32;
            let cost = BuildCost::for_class(class);
            per_cycle.metal_tubes += count * cost.metal_tubes as f32;
            per_cycle.wiring += count * cost.wiring as f32;
            per_cycle.circuits += count * cost.circuits as f32;
        }

        if build_cooldown <= 0.0 {
            return per_cycle;
        }

        ComponentRates {
            metal_tubes: per_cycle.metal_tubes / build_cooldown,
            wiring: per_cycle.wiring / build_cooldown,
            circuits: per_cycle.circuits / build_cooldown,
        }
    }
}

/// Production-rate panel for one faction: demand, output and grades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateReport {
    /// Component demand per second of the shipyard roster.
    pub required: ComponentRates,
    /// Instantaneous crafting output per second.
    pub produced: ComponentRates,
    /// Grade for metal tubes.
    pub metal_tubes: RateStatus,
    /// Grade for wiring.
    pub wiring: RateStatus,
    /// Grade for circuits.
    pub circuits: RateStatus,
}

impl ResourceEconomy {
    /// Compare crafting output against the roster's demand.
    #[must_use]
    pub fn rate_report(&self, roster: &ClassCounts, build_cooldown: f32, dt: f32) -> RateReport {
        let required = Self::required_rates(roster, build_cooldown);
        let produced = self.craft_rates(dt);

        RateReport {
            required,
            produced,
            metal_tubes: RateStatus::grade(produced.metal_tubes, required.metal_tubes),
            wiring: RateStatus::grade(produced.wiring, required.wiring),
            circuits: RateStatus::grade(produced.circuits, required.circuits),
        }
    }
}

impl Default for ResourceEconomy {
    fn default() -> Self {
        Self::new(RawResources::ZERO, Self::DEFAULT_RATES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn economy_with(resources: RawResources) -> ResourceEconomy {
        ResourceEconomy::new(resources, RawResources::ZERO)
    }

    #[test]
    fn test_generation_adds_rate_times_dt() {
        let mut economy = ResourceEconomy::default();
        economy.tick(0.5);

        assert_eq!(economy.resources, RawResources::new(5.0, 2.5, 1.5, 1.0));
        assert_eq!(economy.components, ComponentStock::default());
    }

    #[test]
    fn test_tubes_need_both_inputs() {
        let mut economy = economy_with(RawResources::new(100.0, 49.0, 0.0, 0.0));
        let report = economy.tick(0.0);

        assert!(report.is_empty());
        assert_eq!(economy.components.metal_tubes, 0);
        assert_eq!(economy.resources.iron, 100.0);
    }

    #[test]
    fn test_tubes_wait_for_exact_threshold() {
        let mut economy = economy_with(RawResources::new(99.9995, 50.0, 0.0, 0.0));
        economy.tick(0.0);
        assert_eq!(economy.components.metal_tubes, 0);
        assert_eq!(economy.resources.iron, 99.9995);

        economy.resources.iron = 100.0;
        economy.tick(0.0);
        assert_eq!(economy.components.metal_tubes, 10);
        assert_eq!(economy.resources.iron, 0.0);
    }

    #[test]
    fn test_each_recipe_fires_at_most_once_per_tick() {
        let mut economy = economy_with(RawResources::new(1000.0, 1000.0, 0.0, 0.0));
        economy.tick(0.0);

        assert_eq!(economy.components.metal_tubes, 10);
        assert_eq!(economy.resources.iron, 900.0);
        assert_eq!(economy.resources.energy, 950.0);
    }

    #[test]
    fn test_earlier_recipe_starves_later_recipe() {
        // Enough iron for tubes or circuits, not both. Tubes go first.
        let mut economy = economy_with(RawResources::new(120.0, 50.0, 30.0, 40.0));
        let report = economy.tick(0.0);

        assert_eq!(report.crafted, ComponentStock::new(10, 0, 0));
        assert_eq!(economy.resources.iron, 20.0);
        assert_eq!(economy.resources.copper, 30.0);
    }

    #[test]
    fn test_all_recipes_fire_in_one_tick() {
        let mut economy = economy_with(RawResources::new(130.0, 50.0, 80.0, 60.0));
        let report = economy.tick(0.0);

        assert_eq!(report.crafted, ComponentStock::new(10, 10, 5));
        assert_eq!(economy.resources, RawResources::ZERO);
    }

    #[test]
    fn test_pay_is_all_or_nothing() {
        let mut economy = ResourceEconomy::default().with_components(ComponentStock::new(5, 1, 0));
        let cost = BuildCost::for_class(UnitClass::Light);

        let err = economy.pay(&cost).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientResources {
                component: "wiring",
                required: 2,
                available: 1
            }
        ));
        assert_eq!(economy.components, ComponentStock::new(5, 1, 0));

        economy.components.wiring = 2;
        assert!(economy.can_afford(&cost));
        economy.pay(&cost).unwrap();
        assert_eq!(economy.components, ComponentStock::default());
    }

    #[test]
    fn test_live_unit_counter_saturates() {
        let mut economy = ResourceEconomy::default();
        economy.decrement_units();
        assert_eq!(economy.live_units(), 0);

        economy.increment_units();
        economy.increment_units();
        economy.decrement_units();
        assert_eq!(economy.live_units(), 1);
    }

    #[test]
    fn test_required_rates_per_second() {
        let roster = ClassCounts {
            light: 2,
            heavy: 1,
            drone: 1,
        };
        let rates = ResourceEconomy::required_rates(&roster, 5.0);

        // Per cycle: tubes 2*5 + 10 = 20, wiring 2*2 + 4 = 8, circuits 5 + 4 = 9
        assert!((rates.metal_tubes - 4.0).abs() < 1e-6);
        assert!((rates.wiring - 1.6).abs() < 1e-6);
        assert!((rates.circuits - 1.8).abs() < 1e-6);
    }

    #[test]
    fn test_craft_rates_reflect_ready_recipes() {
        let economy = economy_with(RawResources::new(100.0, 50.0, 0.0, 0.0));
        let rates = economy.craft_rates(0.5);

        assert_eq!(rates.metal_tubes, 20.0);
        assert_eq!(rates.wiring, 0.0);
        assert_eq!(economy.craft_rates(0.0), ComponentRates::default());
    }

    #[test]
    fn test_rate_report_grades_each_component() {
        let economy = economy_with(RawResources::new(100.0, 50.0, 0.0, 0.0));
        let roster = ClassCounts {
            light: 1,
            heavy: 0,
            drone: 0,
        };
        let report = economy.rate_report(&roster, 5.0, 1.0);

        // Tubes: 10/s against 1/s; wiring: 0 against 0.4/s; circuits: no demand
        assert_eq!(report.metal_tubes, RateStatus::Satisfied);
        assert_eq!(report.wiring, RateStatus::Deficit);
        assert_eq!(report.circuits, RateStatus::Satisfied);
    }

    #[test]
    fn test_rate_status_grading() {
        assert_eq!(RateStatus::grade(1.0, 1.0), RateStatus::Satisfied);
        assert_eq!(RateStatus::grade(0.85, 1.0), RateStatus::Marginal);
        assert_eq!(RateStatus::grade(0.5, 1.0), RateStatus::Deficit);
        assert_eq!(RateStatus::grade(0.0, 0.0), RateStatus::Satisfied);
    }
}
