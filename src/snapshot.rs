use enum_map::EnumMap;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cell::Owner;
use crate::grid::{Direction, Grid, Position};

/// What a renderer needs to know about a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub wall: bool,
    pub owner: Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    DeadEnd,
    Straight,
    Corner,
    Junction,
    Intersection,
}

/// Copy of the grid taken under the shared lock. It never changes after
/// being taken, so it can be drawn without holding anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    cells: Grid<CellView>,
}

impl Snapshot {
    pub(crate) fn new(cells: Grid<CellView>) -> Self {
        Self { cells }
    }

    pub fn size(&self) -> usize {
        self.cells.width()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<CellView> {
        self.cells.get(x, y).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellView)> + '_ {
        self.cells.iter().map(|(x, y, cell)| (x, y, *cell))
    }

    pub fn is_passage(&self, x: usize, y: usize) -> bool {
        self.get(x, y).map_or(false, |cell| !cell.wall)
    }

    /// Cells claimed by each owner, the center block included.
    pub fn owner_counts(&self) -> EnumMap<Owner, usize> {
        let mut counts = EnumMap::default();

        for (_, _, cell) in self.iter() {
            counts[cell.owner] += 1;
        }

        counts
    }

    pub fn passage_count(&self) -> usize {
        self.iter().filter(|(_, _, cell)| !cell.wall).count()
    }

    /// Shape of the corridor at a passage cell, `None` for walls.
    pub fn tile_kind(&self, x: usize, y: usize) -> Option<TileKind> {
        if !self.is_passage(x, y) {
            return None;
        }

        let open: Vec<Direction> = self
            .cells
            .get_neighbor_positions(x, y)
            .filter(|&(_, (nx, ny))| self.is_passage(nx, ny))
            .map(|(direction, _)| direction)
            .collect();

        let kind = match open.as_slice() {
            [] | [_] => TileKind::DeadEnd,
            [a, b] if a.offset().0 + b.offset().0 == 0 && a.offset().1 + b.offset().1 == 0 => {
                TileKind::Straight
            }
            [_, _] => TileKind::Corner,
            [_, _, _] => TileKind::Junction,
            _ => TileKind::Intersection,
        };

        Some(kind)
    }

    /// Returns a copy with a solid outer ring, then punches up to `exits`
    /// openings into it where a corridor runs right behind the ring.
    pub fn enclosed<R: Rng + ?Sized>(&self, exits: usize, rng: &mut R) -> Snapshot {
        let mut output = self.clone();
        let size = self.size();
        let last = size.saturating_sub(1);

        let on_ring = |x: usize, y: usize| x == 0 || y == 0 || x == last || y == last;

        for y in 0..size {
            for x in 0..size {
                if on_ring(x, y) {
                    if let Some(cell) = output.cells.get_mut(x, y) {
                        *cell = CellView {
                            wall: true,
                            owner: Owner::Unclaimed,
                        };
                    }
                }
            }
        }

        let mut candidates: Vec<Position> = Vec::new();

        for i in 1..last {
            for (position, inner) in [
                ((i, 0), (i, 1)),
                ((i, last), (i, last - 1)),
                ((0, i), (1, i)),
                ((last, i), (last - 1, i)),
            ] {
                if output.is_passage(inner.0, inner.1) {
                    candidates.push(position);
                }
            }
        }

        candidates.shuffle(rng);

        for &(x, y) in candidates.iter().take(exits) {
            if let Some(cell) = output.cells.get_mut(x, y) {
                cell.wall = false;
            }
        }

        output
    }
}
