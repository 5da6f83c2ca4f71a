pub type Position = (usize, usize);

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Row-major storage shared by the maze and its snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

pub struct GridIter<'a, T> {
    grid: &'a Grid<T>,
    pos: usize,
}

impl<T> Grid<T> {
    pub fn new<F: FnMut(usize, usize) -> T>(width: usize, height: usize, initializer: &mut F) -> Self {
        let mut data = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                data.push(initializer(x, y));
            }
        }

        Self {
            data,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width * self.height
    }

    pub fn iter(&self) -> GridIter<T> {
        GridIter { grid: self, pos: 0 }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if !self.contains(x, y) {
            return None;
        }

        self.data.get(x + y * self.width)
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if !self.contains(x, y) {
            return None;
        }

        self.data.get_mut(x + y * self.width)
    }

    /// Position `distance` cells away in `direction`, if it is still on the grid.
    pub fn offset(&self, x: usize, y: usize, direction: Direction, distance: usize) -> Option<Position> {
        let (dx, dy) = direction.offset();
        let nx = x.checked_add_signed(dx * distance as isize)?;
        let ny = y.checked_add_signed(dy * distance as isize)?;

        if self.contains(nx, ny) {
            Some((nx, ny))
        } else {
            None
        }
    }

    pub fn get_neighbor_positions(&self, x: usize, y: usize) -> impl Iterator<Item = (Direction, Position)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.offset(x, y, direction, 1).map(|pos| (direction, pos)))
    }

    pub fn get_neighbors(&self, x: usize, y: usize) -> Vec<(Direction, &T)> {
        self.get_neighbor_positions(x, y)
            .filter_map(|(direction, (nx, ny))| self.get(nx, ny).map(|value| (direction, value)))
            .collect()
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Grid<U> {
        Grid {
            data: self.data.iter().map(&mut f).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl<'a, T> IntoIterator for &'a Grid<T> {
    type Item = (usize, usize, &'a T);
    type IntoIter = GridIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> Iterator for GridIter<'a, T> {
    type Item = (usize, usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.grid.data.len() {
            None
        } else {
            let x = self.pos % self.grid.width;
            let y = self.pos / self.grid.width;
            let value = &self.grid.data[self.pos];

            self.pos += 1;

            Some((x, y, value))
        }
    }
}
