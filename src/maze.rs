//! Shared carving state: walls, visited flags and owner tags for every cell.
//!
//! A [`MazeGrid`] is created once per run, wrapped in a mutex and shared by
//! the four carvers and whoever takes snapshots. Nothing here locks on its
//! own; callers hold the shared lock for the duration of every method.

use enum_map::EnumMap;

use crate::cell::{Cell, Owner};
use crate::config::MazeConfig;
use crate::error::{MazeError, Result};
use crate::grid::{Direction, Grid, Position};
use crate::snapshot::{CellView, Snapshot};

/// A cell that may be carved next, together with the wall between it and
/// the cell it is reached from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub target: Position,
    pub wall: Position,
}

/// One successful carve, kept so a finished run can be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarveRecord {
    pub step: u64,
    pub owner: Owner,
    pub target: Position,
    pub wall: Position,
}

pub struct MazeGrid {
    cells: Grid<Cell>,
    center: usize,
    seeds: EnumMap<Owner, Option<Position>>,
    journal: Vec<CarveRecord>,
}

impl MazeGrid {
    /// Allocates an all-wall grid, carves the center block and plants one
    /// seed just outside the middle of each of its sides.
    pub fn new(size: usize, center: usize) -> Result<Self> {
        MazeConfig::new(size, center).validate()?;

        let start = (size - center) / 2;
        let end = start + center;

        let cells = Grid::new(size, size, &mut |x, y| {
            if (start..end).contains(&x) && (start..end).contains(&y) {
                Cell::claimed(Owner::CenterSeed)
            } else {
                Cell::default()
            }
        });

        let mut grid = Self {
            cells,
            center,
            seeds: EnumMap::default(),
            journal: Vec::new(),
        };

        let middle = start + center / 2;

        for (owner, (x, y)) in [
            (Owner::North, (middle, start - 1)),
            (Owner::South, (middle, end)),
            (Owner::East, (end, middle)),
            (Owner::West, (start - 1, middle)),
        ] {
            *grid.cell_mut(x, y)? = Cell::claimed(owner);
            grid.seeds[owner] = Some((x, y));
        }

        Ok(grid)
    }

    pub fn from_config(config: &MazeConfig) -> Result<Self> {
        Self::new(config.size, config.center)
    }

    pub fn size(&self) -> usize {
        self.cells.width()
    }

    pub fn center(&self) -> usize {
        self.center
    }

    pub fn seed(&self, owner: Owner) -> Option<Position> {
        self.seeds[owner]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells.get(x, y)
    }

    pub fn cells(&self) -> &Grid<Cell> {
        &self.cells
    }

    pub fn journal(&self) -> &[CarveRecord] {
        &self.journal
    }

    /// Cells two steps away that are still unvisited and whose orthogonal
    /// neighbors are all unvisited too.
    ///
    /// The isolation check is what keeps separately carved regions from
    /// touching, so every owner ends up with a tree rather than a braid.
    pub fn neighbors_of(&self, x: usize, y: usize) -> Vec<Candidate> {
        let mut output = Vec::with_capacity(4);

        for direction in Direction::ALL {
            let Some((nx, ny)) = self.cells.offset(x, y, direction, 2) else {
                continue;
            };

            if !self.is_isolated(nx, ny) {
                continue;
            }

            output.push(Candidate {
                target: (nx, ny),
                wall: ((x + nx) / 2, (y + ny) / 2),
            });
        }

        output
    }

    fn is_isolated(&self, x: usize, y: usize) -> bool {
        let unvisited = |cell: &Cell| !cell.visited;

        self.cells.get(x, y).map_or(false, unvisited)
            && self
                .cells
                .get_neighbors(x, y)
                .into_iter()
                .all(|(_, cell)| unvisited(cell))
    }

    /// Opens `candidate` and its connecting wall and claims the target for `owner`.
    pub fn carve(&mut self, candidate: Candidate, owner: Owner, step: u64) -> Result<()> {
        let (tx, ty) = candidate.target;
        let (wx, wy) = candidate.wall;

        debug_assert!(
            self.is_isolated(tx, ty),
            "carve target {:?} is not isolated",
            candidate.target
        );

        let target = self.cell_mut(tx, ty)?;

        if target.visited {
            return Err(MazeError::Invariant {
                position: candidate.target,
                reason: "carve target already visited",
            });
        }

        *target = Cell::claimed(owner);
        self.cell_mut(wx, wy)?.wall = false;

        self.journal.push(CarveRecord {
            step,
            owner,
            target: candidate.target,
            wall: candidate.wall,
        });

        Ok(())
    }

    /// Copies wall and owner state out; take it while holding the shared lock.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.cells.map(|cell| CellView {
            wall: cell.wall,
            owner: cell.owner,
        }))
    }

    /// Number of cells that can still be carved in the best case, one out of
    /// every two on the lattice outside the center block.
    pub fn carvable_estimate(&self) -> usize {
        let size = self.size();
        let open = size * size - self.center * self.center;

        open / 4
    }

    fn cell_mut(&mut self, x: usize, y: usize) -> Result<&mut Cell> {
        self.cells.get_mut(x, y).ok_or(MazeError::Invariant {
            position: (x, y),
            reason: "position out of bounds",
        })
    }
}
