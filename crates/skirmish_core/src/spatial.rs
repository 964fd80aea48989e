//! Nearby-entity queries.
//!
//! Combat code consumes [`SpatialQuery`] as a capability and never
//! assumes a particular index. [`SpatialGrid`] is the uniform-grid index
//! the simulation keeps up to date as entities move, spawn and die.
//!
//! Results are a snapshot. Callers re-validate liveness through the
//! world before acting on any returned id.

use std::collections::HashMap;

use crate::components::{EntityId, EntityKind};
use crate::factions::Faction;
use crate::math::Vec2;

/// One indexed entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    /// Entity id.
    pub id: EntityId,
    /// Owning faction.
    pub faction: Faction,
    /// Entity category.
    pub kind: EntityKind,
    /// Position when indexed.
    pub position: Vec2,
}

/// Radius query over indexed entities.
pub trait SpatialQuery {
    /// All entries within `radius` of `position`, closest first.
    ///
    /// Equal distances are ordered by ascending id.
    fn query_nearby(&self, position: Vec2, radius: f32) -> Vec<SpatialEntry>;
}

/// Uniform grid spatial index.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    entity_cells: HashMap<EntityId, (i32, i32)>,
}

impl SpatialGrid {
    /// Default cell edge, twice the standard detection range.
    pub const DEFAULT_CELL_SIZE: f32 = 8.0;

    /// Create an empty grid.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: HashMap::new(),
            entity_cells: HashMap::new(),
        }
    }

    #[inline]
    fn cell_of(&self, position: Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entity_cells.clear();
    }

    /// Insert or relocate an entry.
    pub fn insert(&mut self, entry: SpatialEntry) {
        self.remove(entry.id);
        let cell = self.cell_of(entry.position);
        self.cells.entry(cell).or_default().push(entry);
        self.entity_cells.insert(entry.id, cell);
    }

    /// Move an indexed entity. Unknown ids are ignored.
    pub fn update_position(&mut self, id: EntityId, position: Vec2) {
        let Some(&cell) = self.entity_cells.get(&id) else {
            return;
        };
        let entry = self
            .cells
            .get(&cell)
            .and_then(|entries| entries.iter().find(|e| e.id == id))
            .copied();

        if let Some(entry) = entry {
            self.insert(SpatialEntry { position, ..entry });
        }
    }

    /// Remove an entity from the grid.
    pub fn remove(&mut self, id: EntityId) {
        if let Some(cell) = self.entity_cells.remove(&id) {
            if let Some(entries) = self.cells.get_mut(&cell) {
                entries.retain(|e| e.id != id);
                if entries.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    /// Number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entity_cells.len()
    }

    /// Check whether the grid is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_cells.is_empty()
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CELL_SIZE)
    }
}

impl SpatialQuery for SpatialGrid {
    fn query_nearby(&self, position: Vec2, radius: f32) -> Vec<SpatialEntry> {
        let radius_sq = radius * radius;
        let reach = (radius / self.cell_size).ceil() as i32;
        let (cx, cy) = self.cell_of(position);

        let mut results: Vec<SpatialEntry> = Vec::new();
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                if let Some(entries) = self.cells.get(&(cx + dx, cy + dy)) {
                    results.extend(
                        entries
                            .iter()
                            .filter(|e| e.position.distance_squared(position) <= radius_sq)
                            .copied(),
                    );
                }
            }
        }

        results.sort_by(|a, b| {
            let da = a.position.distance_squared(position);
            let db = b.position.distance_squared(position);
            da.total_cmp(&db).then(a.id.cmp(&b.id))
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: EntityId, x: f32, y: f32) -> SpatialEntry {
        SpatialEntry {
            id,
            faction: Faction::Enemy,
            kind: EntityKind::Unit,
            position: Vec2::new(x, y),
        }
    }

    #[test]
    fn test_query_sorted_by_distance() {
        let mut grid = SpatialGrid::new(2.0);
        grid.insert(entry(1, 3.0, 0.0));
        grid.insert(entry(2, 1.0, 0.0));
        grid.insert(entry(3, 10.0, 0.0));

        let ids: Vec<_> = grid
            .query_nearby(Vec2::ZERO, 4.0)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_query_spans_negative_cells() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(entry(1, -2.5, -2.5));

        assert_eq!(grid.query_nearby(Vec2::new(-1.0, -1.0), 3.0).len(), 1);
    }

    #[test]
    fn test_equal_distance_orders_by_id() {
        let mut grid = SpatialGrid::default();
        grid.insert(entry(9, 1.0, 0.0));
        grid.insert(entry(4, -1.0, 0.0));

        let ids: Vec<_> = grid
            .query_nearby(Vec2::ZERO, 2.0)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn test_update_and_remove() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(entry(1, 0.0, 0.0));
        grid.update_position(1, Vec2::new(20.0, 0.0));

        assert!(grid.query_nearby(Vec2::ZERO, 1.0).is_empty());
        assert_eq!(grid.query_nearby(Vec2::new(20.0, 0.0), 0.5).len(), 1);

        grid.remove(1);
        assert!(grid.is_empty());
    }
}
