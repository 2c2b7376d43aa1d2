//! Toroidal grid population
//!
//! Lays a population out row-major on a `rows x cols` grid whose edges wrap
//! around, so every cell has exactly four neighbors. All coordinates are
//! signed; any integer row or column maps onto the grid.

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::genome::traits::Genome;
use crate::population::individual::Individual;
use crate::population::population::Population;

/// The four cells adjacent to a grid cell, as `(row, col)` coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbors {
    pub up: (usize, usize),
    pub down: (usize, usize),
    pub left: (usize, usize),
    pub right: (usize, usize),
}

impl Neighbors {
    /// Neighbors in the order ties are resolved: left, right, up, down
    pub fn in_tie_order(&self) -> [(usize, usize); 4] {
        [self.left, self.right, self.up, self.down]
    }
}

/// Population arranged on a torus
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct GridPopulation<G: Genome> {
    population: Population<G>,
    rows: usize,
    cols: usize,
}

impl<G: Genome> GridPopulation<G> {
    /// Arrange a population on a `rows x cols` grid
    pub fn new(population: Population<G>, rows: usize, cols: usize) -> EvoResult<Self> {
        if rows == 0 || cols == 0 || rows * cols != population.len() {
            return Err(EvolutionError::GridShape {
                size: population.len(),
                rows,
                cols,
            });
        }
        Ok(Self {
            population,
            rows,
            cols,
        })
    }

    /// Arrange a population on the most nearly square grid
    ///
    /// Uses `floor(sqrt(n))` rows and `ceil(sqrt(n))` columns, which only fits
    /// populations of size `k*k` or `k*(k+1)`.
    pub fn square(population: Population<G>) -> EvoResult<Self> {
        let (rows, cols) = square_shape(population.len());
        Self::new(population, rows, cols)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Map any integer coordinate onto the grid
    pub fn wrap(&self, row: isize, col: isize) -> (usize, usize) {
        (
            row.rem_euclid(self.rows as isize) as usize,
            col.rem_euclid(self.cols as isize) as usize,
        )
    }

    /// Linear population index of a (wrapped) coordinate
    pub fn index_of(&self, row: isize, col: isize) -> usize {
        let (row, col) = self.wrap(row, col);
        row * self.cols + col
    }

    /// The individual at a (wrapped) coordinate
    pub fn get(&self, row: isize, col: isize) -> &Individual<G> {
        &self.population[self.index_of(row, col)]
    }

    /// The four toroidally adjacent cells
    pub fn neighbors(&self, row: isize, col: isize) -> Neighbors {
        Neighbors {
            up: self.wrap(row - 1, col),
            down: self.wrap(row + 1, col),
            left: self.wrap(row, col - 1),
            right: self.wrap(row, col + 1),
        }
    }

    /// The fittest of the four neighbors
    ///
    /// A later neighbor only wins if it is strictly fitter, so ties go to
    /// left, then right, then up, then down.
    pub fn fittest_neighbor(&self, row: isize, col: isize) -> (usize, usize) {
        let order = self.neighbors(row, col).in_tie_order();
        let mut fittest = order[0];
        for &cell in &order[1..] {
            if self.cell(cell).rank() > self.cell(fittest).rank() {
                fittest = cell;
            }
        }
        fittest
    }

    /// Overwrite the cell at a (wrapped) coordinate
    pub fn replace_at(&mut self, row: isize, col: isize, candidate: Individual<G>) -> EvoResult<()> {
        let index = self.index_of(row, col);
        self.population.replace(index, candidate)
    }

    /// The underlying population, in row-major order
    pub fn population(&self) -> &Population<G> {
        &self.population
    }

    /// Take the underlying population
    pub fn into_population(self) -> Population<G> {
        self.population
    }

    fn cell(&self, (row, col): (usize, usize)) -> &Individual<G> {
        &self.population[row * self.cols + col]
    }
}

/// Grid shape used by [`GridPopulation::square`]
pub fn square_shape(size: usize) -> (usize, usize) {
    let root = (size as f64).sqrt();
    (root.floor() as usize, root.ceil() as usize)
}
