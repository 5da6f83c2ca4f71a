use std::time::Duration;

use serde::Deserialize;

use crate::cell::Owner;
use crate::error::{MazeError, Result};

/// Optional per-direction seeds. A carver without one draws from the run seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarverSeeds {
    pub north: Option<u64>,
    pub south: Option<u64>,
    pub east: Option<u64>,
    pub west: Option<u64>,
}

impl CarverSeeds {
    pub fn get(&self, owner: Owner) -> Option<u64> {
        match owner {
            Owner::North => self.north,
            Owner::South => self.south,
            Owner::East => self.east,
            Owner::West => self.west,
            Owner::Unclaimed | Owner::CenterSeed => None,
        }
    }

    /// Sets the seed for a carving owner; other owners are ignored.
    pub fn set(&mut self, owner: Owner, seed: u64) {
        let slot = match owner {
            Owner::North => &mut self.north,
            Owner::South => &mut self.south,
            Owner::East => &mut self.east,
            Owner::West => &mut self.west,
            Owner::Unclaimed | Owner::CenterSeed => return,
        };

        *slot = Some(seed);
    }
}

/// Parameters consumed by the carving engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MazeConfig {
    /// Width and height of the grid in cells.
    pub size: usize,
    /// Side of the pre-carved block in the middle of the grid.
    pub center: usize,
    /// Run seed; every carver derives its own stream from it.
    pub seed: Option<u64>,
    /// Overrides the derived stream of individual carvers.
    pub carver_seeds: CarverSeeds,
    /// Pause between coordinated steps, for watching the carvers work.
    #[serde(with = "millis")]
    pub step_delay: Option<Duration>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            size: 100,
            center: 10,
            seed: None,
            carver_seeds: CarverSeeds::default(),
            step_delay: None,
        }
    }
}

impl MazeConfig {
    pub fn new(size: usize, center: usize) -> Self {
        Self {
            size,
            center,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_carver_seed(mut self, owner: Owner, seed: u64) -> Self {
        self.carver_seeds.set(owner, seed);
        self
    }

    /// Checks that the center block and one seed on each of its sides fit.
    pub fn validate(&self) -> Result<()> {
        if self.center == 0 {
            return Err(MazeError::InvalidConfig(
                "center block must be at least 1 cell wide".to_string(),
            ));
        }

        if self.size < self.center + 2 {
            return Err(MazeError::InvalidConfig(format!(
                "grid of size {} cannot hold a center block of {} plus a seed on each side (needs at least {})",
                self.size,
                self.center,
                self.center + 2,
            )));
        }

        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(MazeConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_grid_smaller_than_center() {
        let err = MazeConfig::new(5, 10).validate().unwrap_err();

        assert!(matches!(err, MazeError::InvalidConfig(_)));
    }

    #[test]
    fn needs_room_for_seeds() {
        assert!(MazeConfig::new(11, 10).validate().is_err());
        assert!(MazeConfig::new(12, 10).validate().is_ok());
    }

    #[test]
    fn carver_seeds_only_apply_to_carvers() {
        let config = MazeConfig::default()
            .with_carver_seed(Owner::East, 7)
            .with_carver_seed(Owner::CenterSeed, 9);

        assert_eq!(config.carver_seeds.get(Owner::East), Some(7));
        assert_eq!(config.carver_seeds.get(Owner::North), None);
        assert_eq!(config.carver_seeds.get(Owner::CenterSeed), None);
    }

    #[test]
    fn rejects_empty_center() {
        assert!(MazeConfig::new(20, 0).validate().is_err());
    }
}
