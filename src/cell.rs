use enum_map::Enum;

/// Which carver (or the initial seed region) claimed a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Owner {
    Unclaimed,
    North,
    South,
    East,
    West,
    CenterSeed,
}

impl Owner {
    /// The four carver tags, in the order carvers are spawned and stepped.
    pub const CARVERS: [Owner; 4] = [Owner::North, Owner::South, Owner::East, Owner::West];

    pub fn is_carver(self) -> bool {
        matches!(self, Owner::North | Owner::South | Owner::East | Owner::West)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub wall: bool,
    pub visited: bool,
    pub owner: Owner,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            wall: true,
            visited: false,
            owner: Owner::Unclaimed,
        }
    }
}

impl Cell {
    /// Carved and claimed in one go, used for the center block and seeds.
    pub fn claimed(owner: Owner) -> Self {
        Self {
            wall: false,
            visited: true,
            owner,
        }
    }
}
