//! Drives the four carvers, either on their own threads in lockstep
//! ([`Generator`]) or round by round on the calling thread ([`Maze`]).

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use enum_map::EnumMap;
use log::{debug, info, trace, warn};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::Rng;

use crate::barrier::{Participant, Release, StepBarrier};
use crate::carver::Carver;
use crate::cell::Owner;
use crate::config::MazeConfig;
use crate::error::{MazeError, Result};
use crate::maze::{CarveRecord, MazeGrid};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every carver ran out of cells.
    Completed,
    /// A stop was requested before that happened.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub seed: u64,
    pub steps: u64,
    pub carved: EnumMap<Owner, usize>,
    pub outcome: Outcome,
}

impl GenerationReport {
    pub fn total_carved(&self) -> usize {
        self.carved.values().sum()
    }
}

/// Final state of a run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub report: GenerationReport,
    pub snapshot: Snapshot,
    pub journal: Vec<CarveRecord>,
}

fn resolve_seed(config: &MazeConfig) -> u64 {
    let seed = config.seed.unwrap_or_else(|| OsRng.gen());

    info!("Using seed: {}", seed);

    seed
}

fn build_carvers(grid: &MazeGrid, config: &MazeConfig, seed: u64) -> Result<Vec<Carver>> {
    Owner::CARVERS
        .iter()
        .map(|&owner| match config.carver_seeds.get(owner) {
            Some(own_seed) => {
                debug!("{:?} carver uses its own seed {}", owner, own_seed);
                Carver::for_grid_with_seed(grid, owner, own_seed)
            }
            None => Carver::for_grid(grid, owner, seed),
        })
        .collect()
}

/// Sets up a threaded run. Nothing is spawned until [`Generator::start`].
pub struct Generator {
    grid: MazeGrid,
    carvers: Vec<Carver>,
    seed: u64,
    step_delay: Option<Duration>,
}

impl Generator {
    /// Validates `config` and prepares the grid, failing before any thread exists.
    pub fn new(config: &MazeConfig) -> Result<Self> {
        config.validate()?;

        let grid = MazeGrid::from_config(config)?;
        let seed = resolve_seed(config);
        let carvers = build_carvers(&grid, config, seed)?;

        Ok(Self {
            grid,
            carvers,
            seed,
            step_delay: config.step_delay,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Spawns one thread per carver plus the coordinator.
    pub fn start(self) -> Result<GenerationHandle> {
        let grid = Arc::new(Mutex::new(self.grid));
        let barrier = StepBarrier::new(self.carvers.len());

        let mut carvers = Vec::with_capacity(self.carvers.len());

        for (id, carver) in self.carvers.into_iter().enumerate() {
            let owner = carver.owner();
            let participant = barrier.participant(id);
            let grid = Arc::clone(&grid);

            let spawned = thread::Builder::new()
                .name(format!("carver-{:?}", owner).to_lowercase())
                .spawn(move || carve_loop(carver, &grid, participant));

            match spawned {
                Ok(handle) => carvers.push((owner, handle)),
                Err(err) => {
                    barrier.stop();
                    return Err(MazeError::Spawn(err.to_string()));
                }
            }
        }

        let seed = self.seed;
        let step_delay = self.step_delay;
        let coordinator_barrier = Arc::clone(&barrier);

        let coordinator = thread::Builder::new()
            .name("step-coordinator".to_string())
            .spawn(move || coordinate(&coordinator_barrier, carvers, seed, step_delay))
            .map_err(|err| {
                barrier.stop();
                MazeError::Spawn(err.to_string())
            })?;

        Ok(GenerationHandle {
            grid,
            barrier,
            coordinator: Some(coordinator),
            seed,
        })
    }
}

fn carve_loop(mut carver: Carver, grid: &Mutex<MazeGrid>, participant: Participant) -> Result<usize> {
    debug!("{:?} carver started", carver.owner());

    let mut seen = 0;

    while let Some(step) = participant.wait_for_release(seen) {
        seen = step;

        carver.step(grid, step)?;

        if carver.is_done() {
            debug!(
                "{:?} carver finished after {} steps, {} cells",
                carver.owner(),
                step,
                carver.carved()
            );
            break;
        }

        participant.complete();
    }

    Ok(carver.carved())
}

fn coordinate(
    barrier: &StepBarrier,
    carvers: Vec<(Owner, JoinHandle<Result<usize>>)>,
    seed: u64,
    step_delay: Option<Duration>,
) -> Result<GenerationReport> {
    let mut steps = 0;

    let outcome = loop {
        match barrier.release() {
            Release::Step(step) => {
                barrier.wait_step();
                steps = step;
            }
            Release::Stopped => break Outcome::Cancelled,
            Release::Done => break Outcome::Completed,
        }

        if !barrier.any_active() {
            break Outcome::Completed;
        }

        if let Some(delay) = step_delay {
            thread::sleep(delay);
        }
    };

    // wakes carvers still waiting after a cancel
    barrier.stop();

    let mut carved = EnumMap::default();
    let mut failure = None;

    for (owner, handle) in carvers {
        match handle.join() {
            Ok(Ok(count)) => carved[owner] = count,
            Ok(Err(err)) => {
                warn!("{:?} carver failed: {}", owner, err);
                failure.get_or_insert(err);
            }
            Err(_) => {
                warn!("{:?} carver panicked", owner);
                failure.get_or_insert(MazeError::CarverPanicked(owner));
            }
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }

    debug!("coordinator done after {} steps: {:?}", steps, outcome);

    Ok(GenerationReport {
        seed,
        steps,
        carved,
        outcome,
    })
}

/// A running generation. Renderers poll it for snapshots; the UI can stop it.
pub struct GenerationHandle {
    grid: Arc<Mutex<MazeGrid>>,
    barrier: Arc<StepBarrier>,
    coordinator: Option<JoinHandle<Result<GenerationReport>>>,
    seed: u64,
}

impl GenerationHandle {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Consistent copy of the grid; never contains half of a carve.
    pub fn snapshot(&self) -> Snapshot {
        self.grid.lock().snapshot()
    }

    pub fn carved(&self) -> usize {
        self.grid.lock().journal().len()
    }

    pub fn steps(&self) -> u64 {
        self.barrier.generation()
    }

    pub fn carvable_estimate(&self) -> usize {
        self.grid.lock().carvable_estimate()
    }

    /// Asks the coordinator to stop after the step in flight.
    pub fn stop(&self) {
        info!("Stop requested");
        self.barrier.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.coordinator
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Waits for the coordinator and every carver to exit.
    pub fn join(mut self) -> Result<Generation> {
        let handle = self.coordinator.take().ok_or(MazeError::CoordinatorPanicked)?;
        let report = handle.join().map_err(|_| MazeError::CoordinatorPanicked)??;

        let grid = self.grid.lock();

        Ok(Generation {
            report,
            snapshot: grid.snapshot(),
            journal: grid.journal().to_vec(),
        })
    }
}

impl Drop for GenerationHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.coordinator.take() {
            self.barrier.stop();
            let _ = handle.join();
        }
    }
}

/// Same lockstep rounds as [`Generator`], run on the calling thread in a
/// fixed owner order. Fully reproducible for a given seed.
pub struct Maze {
    grid: MazeGrid,
    carvers: Vec<Carver>,
    seed: u64,
    steps: u64,
}

impl Maze {
    pub fn new(config: &MazeConfig) -> Result<Self> {
        config.validate()?;

        let grid = MazeGrid::from_config(config)?;
        let seed = resolve_seed(config);
        let carvers = build_carvers(&grid, config, seed)?;

        Ok(Self {
            grid,
            carvers,
            seed,
            steps: 0,
        })
    }

    pub fn grid(&self) -> &MazeGrid {
        &self.grid
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn snapshot(&self) -> Snapshot {
        self.grid.snapshot()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn done(&self) -> bool {
        self.carvers.iter().all(Carver::is_done)
    }

    /// Runs one round: every carver that still has work acts exactly once.
    pub fn step(&mut self) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }

        self.steps += 1;

        for carver in self.carvers.iter_mut().filter(|c| !c.is_done()) {
            carver.step_on(&mut self.grid, self.steps)?;
        }

        trace!("round {} done", self.steps);

        Ok(true)
    }

    pub fn run(&mut self) -> Result<GenerationReport> {
        while self.step()? {}

        Ok(self.report(Outcome::Completed))
    }

    pub fn report(&self, outcome: Outcome) -> GenerationReport {
        let mut carved = EnumMap::default();

        for carver in &self.carvers {
            carved[carver.owner()] = carver.carved();
        }

        GenerationReport {
            seed: self.seed,
            steps: self.steps,
            carved,
            outcome,
        }
    }
}
