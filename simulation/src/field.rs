//! Field - bounded grid and its occupancy index
//!
//! Each cell holds at most one actor, referenced by its ECS entity handle.
//! Actors never hold a reference back to the field; they only carry their
//! `Location` as a component.

use hecs::Entity;
use serde::{Deserialize, Serialize};

/// Neighbour offsets in the fixed scan order used by every adjacency query.
/// Disease spread, mate search and predation all depend on this order.
const NEIGHBOUR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Rectangular `depth x width` grid of optional occupants.
#[derive(Debug, Clone)]
pub struct Field {
    depth: usize,
    width: usize,
    cells: Vec<Option<Entity>>,
}

impl Field {
    pub fn new(depth: usize, width: usize) -> Self {
        Self {
            depth,
            width,
            cells: vec![None; depth * width],
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn index(&self, location: Location) -> usize {
        debug_assert!(
            location.row < self.depth && location.col < self.width,
            "location {:?} outside {}x{} field",
            location,
            self.depth,
            self.width
        );
        location.row * self.width + location.col
    }

    /// Empty every cell.
    pub fn clear_all(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    /// Empty a single cell.
    pub fn clear(&mut self, location: Location) {
        let idx = self.index(location);
        self.cells[idx] = None;
    }

    /// Record `actor` as the occupant of `location`.
    ///
    /// Relocation must `clear` the old cell first. Placing onto a cell held
    /// by a different actor breaks the occupancy invariant and is a bug in
    /// the caller.
    pub fn place(&mut self, actor: Entity, location: Location) {
        let idx = self.index(location);
        debug_assert!(
            self.cells[idx].map_or(true, |current| current == actor),
            "cell {:?} already occupied by {:?}",
            location,
            self.cells[idx]
        );
        self.cells[idx] = Some(actor);
    }

    pub fn occupant_at(&self, location: Location) -> Option<Entity> {
        self.cells[self.index(location)]
    }

    pub fn is_free(&self, location: Location) -> bool {
        self.occupant_at(location).is_none()
    }

    /// Up to eight neighbours of `location`, clipped at the grid edges.
    /// Never includes `location` itself.
    pub fn adjacent_locations(&self, location: Location) -> Vec<Location> {
        let mut out = Vec::with_capacity(NEIGHBOUR_OFFSETS.len());
        for (dr, dc) in NEIGHBOUR_OFFSETS {
            let row = location.row as i64 + dr;
            let col = location.col as i64 + dc;
            if row >= 0 && col >= 0 && (row as usize) < self.depth && (col as usize) < self.width {
                out.push(Location::new(row as usize, col as usize));
            }
        }
        out
    }

    /// Empty neighbours, in adjacency order.
    pub fn free_adjacent_locations(&self, location: Location) -> Vec<Location> {
        self.adjacent_locations(location)
            .into_iter()
            .filter(|loc| self.is_free(*loc))
            .collect()
    }

    /// First empty neighbour, if any.
    pub fn free_adjacent_location(&self, location: Location) -> Option<Location> {
        self.adjacent_locations(location)
            .into_iter()
            .find(|loc| self.is_free(*loc))
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Location, Entity)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.map(|entity| (Location::new(idx / width, idx % width), entity))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}
