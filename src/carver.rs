use log::trace;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

use crate::cell::Owner;
use crate::error::{MazeError, Result};
use crate::grid::Position;
use crate::maze::MazeGrid;

/// What a carver did with one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Carved(Position),
    Backtracked(Position),
    Idle,
}

/// Depth-first cursor growing one owner's region outward from its seed.
pub struct Carver {
    owner: Owner,
    stack: Vec<Position>,
    rng: XorShiftRng,
    carved: usize,
}

impl Carver {
    pub fn new(owner: Owner, start: Position, seed: u64) -> Self {
        Self {
            owner,
            stack: vec![start],
            rng: XorShiftRng::seed_from_u64(seed),
            carved: 0,
        }
    }

    /// Carver starting from `owner`'s seed cell, with a stream derived from
    /// the run seed so each direction draws different numbers.
    pub fn for_grid(grid: &MazeGrid, owner: Owner, run_seed: u64) -> Result<Self> {
        let index = Owner::CARVERS.iter().position(|&o| o == owner).unwrap_or_default();

        Self::for_grid_with_seed(grid, owner, run_seed.wrapping_add(index as u64))
    }

    /// Carver starting from `owner`'s seed cell, drawing from `seed` as is.
    pub fn for_grid_with_seed(grid: &MazeGrid, owner: Owner, seed: u64) -> Result<Self> {
        let start = grid
            .seed(owner)
            .ok_or_else(|| MazeError::InvalidConfig(format!("no seed cell for {:?}", owner)))?;

        Ok(Self::new(owner, start, seed))
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn is_done(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn carved(&self) -> usize {
        self.carved
    }

    /// Takes the shared lock and performs one step.
    pub fn step(&mut self, grid: &Mutex<MazeGrid>, step: u64) -> Result<Action> {
        let mut grid = grid.lock();

        self.step_on(&mut grid, step)
    }

    /// One carve-or-backtrack action. Querying and carving happen against the
    /// same borrow, so no other carver can claim the chosen cell in between.
    pub fn step_on(&mut self, grid: &mut MazeGrid, step: u64) -> Result<Action> {
        let Some(&(x, y)) = self.stack.last() else {
            return Ok(Action::Idle);
        };

        let candidates = grid.neighbors_of(x, y);

        let action = match candidates.choose(&mut self.rng) {
            Some(&candidate) => {
                grid.carve(candidate, self.owner, step)?;
                self.stack.push(candidate.target);
                self.carved += 1;

                Action::Carved(candidate.target)
            }
            None => {
                self.stack.pop();

                Action::Backtracked((x, y))
            }
        };

        trace!("{:?} step {}: {:?}", self.owner, step, action);

        Ok(action)
    }
}
