//! Maze generation by four depth-first carvers growing outward from a shared
//! center block.
//!
//! Each carver runs on its own thread and a [`barrier::StepBarrier`] moves
//! them forward one carve-or-backtrack action at a time, so all four regions
//! grow at the same pace. Renderers poll [`snapshot::Snapshot`]s from a
//! [`coordinator::GenerationHandle`] and never touch the live grid.
//!
//! ```no_run
//! use quad_carve::config::MazeConfig;
//! use quad_carve::coordinator::Generator;
//!
//! let config = MazeConfig::new(40, 6).with_seed(3);
//! let handle = Generator::new(&config)?.start()?;
//! let generation = handle.join()?;
//!
//! println!("{} steps", generation.report.steps);
//! # Ok::<(), quad_carve::MazeError>(())
//! ```

pub mod barrier;
pub mod carver;
pub mod cell;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod grid;
pub mod maze;
pub mod palette;
pub mod render;
pub mod snapshot;

pub use cell::{Cell, Owner};
pub use error::MazeError;
