use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use quad_carve::{
    cell::Owner,
    config::MazeConfig,
    coordinator::{Generation, Generator, Maze, Outcome},
    grid::Position,
    maze::{CarveRecord, MazeGrid},
    snapshot::Snapshot,
    MazeError,
};

// Fixed seed for deterministic tests
const TEST_SEED: u64 = 42;

fn scenario_config() -> MazeConfig {
    MazeConfig::new(20, 4).with_seed(TEST_SEED)
}

fn run_threaded(config: &MazeConfig) -> Generation {
    Generator::new(config).unwrap().start().unwrap().join().unwrap()
}

/// Cell the carve started from, on the far side of the opened wall.
fn source_of(record: &CarveRecord) -> Position {
    let (tx, ty) = record.target;
    let (wx, wy) = record.wall;

    (2 * wx - tx, 2 * wy - ty)
}

/// Re-applies the journal on a fresh grid, checking every carve was legal
/// when it happened.
fn replay(config: &MazeConfig, journal: &[CarveRecord]) -> MazeGrid {
    let mut grid = MazeGrid::from_config(config).unwrap();

    for record in journal {
        let (sx, sy) = source_of(record);

        assert_eq!(
            grid.get(sx, sy).unwrap().owner,
            record.owner,
            "{:?} carved from a cell it does not own",
            record
        );

        let candidate = grid
            .neighbors_of(sx, sy)
            .into_iter()
            .find(|c| c.target == record.target)
            .unwrap_or_else(|| panic!("{:?} broke the isolation rule", record));

        grid.carve(candidate, record.owner, record.step).unwrap();
    }

    grid
}

fn reachable_from(snapshot: &Snapshot, start: Position, allowed: impl Fn(Position) -> bool) -> HashSet<Position> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some((x, y)) = queue.pop_front() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];

        for (nx, ny) in neighbors {
            if snapshot.is_passage(nx, ny) && allowed((nx, ny)) && seen.insert((nx, ny)) {
                queue.push_back((nx, ny));
            }
        }
    }

    seen
}

fn assert_claims_are_visited(grid: &MazeGrid) {
    for (x, y, cell) in grid.cells() {
        assert_eq!(
            cell.owner != Owner::Unclaimed,
            cell.visited,
            "cell ({}, {}) is {:?}",
            x,
            y,
            cell
        );

        if cell.visited {
            assert!(!cell.wall, "visited cell ({}, {}) is still a wall", x, y);
        }
    }
}

#[test]
fn scenario_terminates_and_every_carve_replays() {
    let config = scenario_config();
    let generation = run_threaded(&config);

    let report = &generation.report;

    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(report.total_carved(), generation.journal.len());

    // a carver with c carves needs c pushes, c pops and one pop for its
    // seed, one action per step; the run ends with the slowest carver
    let slowest = Owner::CARVERS
        .iter()
        .map(|&owner| 2 * report.carved[owner] as u64 + 1)
        .max()
        .unwrap();
    assert_eq!(report.steps, slowest);

    let grid = replay(&config, &generation.journal);

    assert_eq!(grid.snapshot(), generation.snapshot);
    assert_claims_are_visited(&grid);
}

#[test]
fn every_owner_forms_one_region_rooted_at_its_seed() {
    let config = scenario_config();
    let generation = run_threaded(&config);
    let grid = MazeGrid::from_config(&config).unwrap();
    let snapshot = &generation.snapshot;

    for owner in Owner::CARVERS {
        let seed = grid.seed(owner).unwrap();
        let region = reachable_from(snapshot, seed, |(x, y)| {
            let cell = snapshot.get(x, y).unwrap();
            cell.owner == owner || cell.owner == Owner::Unclaimed
        });

        let claimed: HashSet<Position> = snapshot
            .iter()
            .filter(|(_, _, cell)| cell.owner == owner)
            .map(|(x, y, _)| (x, y))
            .collect();

        assert!(claimed.contains(&seed));
        assert!(
            claimed.is_subset(&region),
            "{:?} has cells cut off from its seed",
            owner
        );
    }

    // and everything hangs off the center block
    let center = (10, 10);
    let all = reachable_from(snapshot, center, |_| true);
    assert_eq!(all.len(), snapshot.passage_count());
}

#[test]
fn carvers_never_act_twice_in_one_step() {
    let generation = run_threaded(&MazeConfig::new(60, 10).with_seed(TEST_SEED));
    let mut per_step: HashMap<(u64, Owner), usize> = HashMap::new();

    for record in &generation.journal {
        *per_step.entry((record.step, record.owner)).or_default() += 1;
    }

    assert!(per_step.values().all(|&count| count == 1));

    let steps: Vec<u64> = generation.journal.iter().map(|r| r.step).collect();
    assert!(steps.windows(2).all(|w| w[0] <= w[1]), "steps went backwards");
}

#[test]
fn finished_run_leaves_no_candidates() {
    let config = scenario_config();
    let generation = run_threaded(&config);
    let grid = replay(&config, &generation.journal);

    for (x, y, cell) in grid.cells() {
        if cell.owner.is_carver() {
            assert!(grid.neighbors_of(x, y).is_empty(), "({}, {}) could still grow", x, y);
        }
    }
}

#[test]
fn center_block_is_untouched() {
    let generation = run_threaded(&scenario_config());

    let center: Vec<_> = generation
        .snapshot
        .iter()
        .filter(|(_, _, cell)| cell.owner == Owner::CenterSeed)
        .collect();

    assert_eq!(center.len(), 16);

    let counts = generation.snapshot.owner_counts();
    assert_eq!(counts[Owner::CenterSeed], 16);
    for owner in Owner::CARVERS {
        // the seed cell plus every carve
        assert_eq!(counts[owner], generation.report.carved[owner] + 1);
    }
    assert!(center.iter().all(|(x, y, cell)| {
        !cell.wall && (8..12).contains(x) && (8..12).contains(y)
    }));
    assert!(generation.journal.iter().all(|r| {
        let (x, y) = r.target;
        !((8..12).contains(&x) && (8..12).contains(&y))
    }));
}

#[test]
fn too_small_grid_fails_before_starting() {
    let config = MazeConfig::new(5, 10).with_seed(TEST_SEED);

    assert!(matches!(Generator::new(&config), Err(MazeError::InvalidConfig(_))));
    assert!(matches!(Maze::new(&config), Err(MazeError::InvalidConfig(_))));
}

#[test]
fn sequential_runs_are_reproducible() {
    let config = MazeConfig::new(40, 6).with_seed(TEST_SEED);

    let mut first = Maze::new(&config).unwrap();
    let mut second = Maze::new(&config).unwrap();

    let first_report = first.run().unwrap();
    let second_report = second.run().unwrap();

    assert_eq!(first_report, second_report);
    assert_eq!(first.snapshot(), second.snapshot());
    assert_eq!(first.grid().journal(), second.grid().journal());
    assert_claims_are_visited(first.grid());
}

#[test]
fn sequential_round_moves_each_active_carver_once() {
    let mut maze = Maze::new(&scenario_config()).unwrap();

    while maze.step().unwrap() {
        let step = maze.steps();
        let carves_this_step = maze
            .grid()
            .journal()
            .iter()
            .filter(|r| r.step == step)
            .count();

        assert!(carves_this_step <= 4);
    }

    assert!(maze.done());
    assert!(!maze.step().unwrap());
}

#[test]
fn snapshot_is_stable_between_steps() {
    let mut maze = Maze::new(&scenario_config()).unwrap();

    for _ in 0..5 {
        maze.step().unwrap();
    }

    assert_eq!(maze.snapshot(), maze.snapshot());

    let handle = Generator::new(&scenario_config()).unwrap().start().unwrap();
    while !handle.is_finished() {
        std::thread::sleep(Duration::from_millis(1));
    }

    assert_eq!(handle.snapshot(), handle.snapshot());
    let final_snapshot = handle.snapshot();
    assert_eq!(handle.join().unwrap().snapshot, final_snapshot);
}

#[test]
fn stop_cancels_at_a_step_boundary() {
    let mut config = MazeConfig::new(200, 10).with_seed(TEST_SEED);
    config.step_delay = Some(Duration::from_millis(2));

    let handle = Generator::new(&config).unwrap().start().unwrap();

    while handle.steps() < 3 {
        std::thread::sleep(Duration::from_millis(1));
    }

    handle.stop();
    let generation = handle.join().unwrap();

    assert_eq!(generation.report.outcome, Outcome::Cancelled);
    assert!(generation.report.steps >= 3);

    // whatever was carved is still a legal, consistent maze
    let grid = replay(&config, &generation.journal);
    assert_eq!(grid.snapshot(), generation.snapshot);
    assert_claims_are_visited(&grid);
}

#[test]
fn late_stop_keeps_a_finished_run_completed() {
    // every carver on a 3x3 grid backtracks out of its seed on step 1
    let mut config = MazeConfig::new(3, 1).with_seed(TEST_SEED);
    config.step_delay = Some(Duration::from_millis(500));

    let handle = Generator::new(&config).unwrap().start().unwrap();

    while handle.steps() < 1 {
        std::thread::sleep(Duration::from_millis(1));
    }
    std::thread::sleep(Duration::from_millis(100));

    handle.stop();
    let generation = handle.join().unwrap();

    assert_eq!(generation.report.outcome, Outcome::Completed);
    assert_eq!(generation.report.steps, 1);
    assert_eq!(generation.report.total_carved(), 0);
}

#[test]
fn dropping_a_handle_stops_the_run() {
    let mut config = MazeConfig::new(200, 10).with_seed(TEST_SEED);
    config.step_delay = Some(Duration::from_millis(5));

    let handle = Generator::new(&config).unwrap().start().unwrap();
    drop(handle);
}
