//! Pre-level tile grid used while rooms are stamped and the maze is carved.

use std::fmt;
use std::ops::{Index, IndexMut, Range};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreTile {
    Floor,
    /// Carve-eligible wall.
    Wall,
    HardFloor,
    HardWall,
    MazeFloor,
}

impl PreTile {
    pub fn is_passable(self) -> bool {
        matches!(self, PreTile::Floor | PreTile::HardFloor | PreTile::MazeFloor)
    }

    fn glyph(self) -> char {
        match self {
            PreTile::Floor => '.',
            PreTile::Wall => '#',
            PreTile::HardFloor => ',',
            PreTile::HardWall => '@',
            PreTile::MazeFloor => ' ',
        }
    }
}

/// Row-major `rows x cols` buffer of [`PreTile`]s addressed by `(row, col)`.
#[derive(Clone, PartialEq, Eq)]
pub struct PreLevel {
    rows: usize,
    cols: usize,
    tiles: Vec<PreTile>,
}

impl PreLevel {
    /// A `HardWall` border around a carve-eligible `Wall` interior.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut level = Self { rows, cols, tiles: vec![PreTile::Wall; rows * cols] };
        for row in 0..rows {
            for col in 0..cols {
                if row == 0 || col == 0 || row == rows - 1 || col == cols - 1 {
                    level.tiles[row * cols + col] = PreTile::HardWall;
                }
            }
        }
        level
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<PreTile> {
        if row < self.rows && col < self.cols {
            Some(self.tiles[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn is(&self, row: usize, col: usize, tile: PreTile) -> bool {
        self.get(row, col) == Some(tile)
    }

    pub fn set(&mut self, row: usize, col: usize, tile: PreTile) {
        self[(row, col)] = tile;
    }

    pub fn fill(&mut self, rows: Range<usize>, cols: Range<usize>, tile: PreTile) {
        for row in rows {
            for col in cols.clone() {
                self.set(row, col, tile);
            }
        }
    }

    pub fn count(&self, tile: PreTile) -> usize {
        self.tiles.iter().filter(|&&candidate| candidate == tile).count()
    }

    pub fn tiles(&self) -> &[PreTile] {
        &self.tiles
    }
}

impl Index<(usize, usize)> for PreLevel {
    type Output = PreTile;

    fn index(&self, (row, col): (usize, usize)) -> &PreTile {
        assert!(row < self.rows && col < self.cols, "({row}, {col}) outside pre-level");
        &self.tiles[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for PreLevel {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut PreTile {
        assert!(row < self.rows && col < self.cols, "({row}, {col}) outside pre-level");
        &mut self.tiles[row * self.cols + col]
    }
}

impl fmt::Debug for PreLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let line: String =
                (0..self.cols).map(|col| self.tiles[row * self.cols + col].glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
