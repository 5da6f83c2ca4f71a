use enum_map::{enum_map, EnumMap};

use crate::cell::Owner;
use crate::snapshot::CellView;

pub type Rgb = [u8; 3];

/// Cell colors, a pure function of wall state and owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub wall: Rgb,
    pub owners: EnumMap<Owner, Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wall: [255, 255, 255],
            owners: enum_map! {
                // connectors between two carved cells
                Owner::Unclaimed => [0, 0, 0],
                Owner::North => [255, 0, 0],
                Owner::South => [0, 255, 0],
                Owner::East => [0, 0, 255],
                Owner::West => [255, 255, 0],
                Owner::CenterSeed => [200, 200, 200],
            },
        }
    }
}

impl Palette {
    pub fn color(&self, cell: CellView) -> Rgb {
        match cell.owner {
            Owner::Unclaimed if cell.wall => self.wall,
            owner => self.owners[owner],
        }
    }
}
