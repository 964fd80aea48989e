//! Build request arbitration.
//!
//! Shipyards never spawn ships directly. When a shipyard's build timer
//! expires it files a [`BuildRequest`] with its faction's
//! [`ProductionQueue`]. Each tick the queue drains a bounded number of
//! requests against the faction's [`ResourceEconomy`]:
//!
//! - affordable requests are paid for and approved,
//! - unaffordable requests go back to the tail of the queue,
//! - requests whose shipyard no longer exists are discarded.
//!
//! At most `builds_per_tick` requests are approved per tick. A full queue
//! drops new requests instead of blocking the caller.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, UnitClass};
use crate::config::ProductionConfig;
use crate::economy::{ClassCounts, ResourceEconomy};

/// Component cost of building one ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildCost {
    /// Metal tubes required.
    pub metal_tubes: u32,
    /// Wiring required.
    pub wiring: u32,
    /// Circuits required.
    pub circuits: u32,
}

impl BuildCost {
    /// Cost table by class.
    #[must_use]
    pub const fn for_class(class: UnitClass) -> Self {
        match class {
            UnitClass::Light => Self {
                metal_tubes: 5,
                wiring: 2,
                circuits: 0,
            },
            UnitClass::Heavy => Self {
                metal_tubes: 10,
                wiring: 0,
                circuits: 5,
            },
            UnitClass::Drone => Self {
                metal_tubes: 0,
                wiring: 4,
                circuits: 4,
            },
        }
    }
}

/// A pending request to build one ship at a shipyard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    /// The requesting shipyard.
    pub shipyard: EntityId,
}

/// Result of filing a build request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnqueueOutcome {
    /// The request was appended.
    Queued,
    /// The queue was full and the request was discarded.
    Dropped,
}

/// A paid-for build, ready to be spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedBuild {
    /// The shipyard that will spawn the ship.
    pub shipyard: EntityId,
    /// Class of the ship to spawn.
    pub class: UnitClass,
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionReport {
    /// Builds paid for this tick, in approval order.
    pub approved: Vec<ApprovedBuild>,
    /// Requests returned to the tail because they were unaffordable.
    pub deferred: usize,
    /// Requests discarded because their shipyard is gone.
    pub discarded: Vec<EntityId>,
}

/// Per-faction queue of build requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionQueue {
    requests: VecDeque<BuildRequest>,
    roster: BTreeMap<UnitClass, Vec<EntityId>>,
    config: ProductionConfig,
}

impl ProductionQueue {
    /// Create an empty queue with the given limits.
    #[must_use]
    pub fn new(config: ProductionConfig) -> Self {
        Self {
            requests: VecDeque::with_capacity(config.capacity),
            roster: BTreeMap::new(),
            config,
        }
    }

    /// Add a shipyard to the class-indexed roster.
    ///
    /// The roster is informational. Queue processing never reads it.
    pub fn register_shipyard(&mut self, class: UnitClass, shipyard: EntityId) {
        let yards = self.roster.entry(class).or_default();
        if !yards.contains(&shipyard) {
            yards.push(shipyard);
        }
    }

    /// Remove a shipyard from the roster.
    ///
    /// Requests it already filed stay queued and are discarded when drawn.
    pub fn unregister_shipyard(&mut self, shipyard: EntityId) {
        for yards in self.roster.values_mut() {
            yards.retain(|&id| id != shipyard);
        }
    }

    /// Registered shipyards of a class, in registration order.
    #[must_use]
    pub fn shipyards(&self, class: UnitClass) -> &[EntityId] {
        self.roster.get(&class).map_or(&[], Vec::as_slice)
    }

    /// Number of registered shipyards per class.
    #[must_use]
    pub fn roster_counts(&self) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for (&class, yards) in &self.roster {
            for _ in yards {
                counts.increment(class);
            }
        }
        counts
    }

    /// File a build request.
    ///
    /// A full queue drops the request and leaves the queue unchanged.
    pub fn enqueue_build(&mut self, shipyard: EntityId) -> EnqueueOutcome {
        if self.requests.len() >= self.config.capacity {
            tracing::debug!(
                shipyard,
                capacity = self.config.capacity,
                "Build queue full, dropping request"
            );
            return EnqueueOutcome::Dropped;
        }

        self.requests.push_back(BuildRequest { shipyard });
        EnqueueOutcome::Queued
    }

    /// Drain requests against `economy`.
    ///
    /// Draws at most as many requests as were queued when the pass began,
    /// stopping early once `builds_per_tick` builds are approved.
    /// `shipyard_class` resolves a request's shipyard; `None` means the
    /// shipyard no longer exists.
    pub fn tick(
        &mut self,
        economy: &mut ResourceEconomy,
        mut shipyard_class: impl FnMut(EntityId) -> Option<UnitClass>,
    ) -> ProductionReport {
        let mut report = ProductionReport::default();
        let pending = self.requests.len();

        for _ in 0..pending {
            if report.approved.len() >= self.config.builds_per_tick {
                break;
            }
            let Some(request) = self.requests.pop_front() else {
                break;
            };

            let Some(class) = shipyard_class(request.shipyard) else {
                report.discarded.push(request.shipyard);
                continue;
            };

            let cost = BuildCost::for_class(class);
            if economy.can_afford(&cost) && economy.pay(&cost).is_ok() {
                report.approved.push(ApprovedBuild {
                    shipyard: request.shipyard,
                    class,
                });
            } else {
                self.requests.push_back(request);
                report.deferred += 1;
            }
        }

        report
    }

    /// Number of pending requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Check whether no requests are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Pending requests, head first.
    pub fn iter(&self) -> impl Iterator<Item = &BuildRequest> {
        self.requests.iter()
    }

    /// Configured limits.
    #[must_use]
    pub const fn config(&self) -> &ProductionConfig {
        &self.config
    }
}

impl Default for ProductionQueue {
    fn default() -> Self {
        Self::new(ProductionConfig::default())
    }
}
