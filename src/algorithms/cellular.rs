//! Cellular genetic algorithm
//!
//! The population lives on a torus and mating is restricted to a cell's four
//! neighbors. A generation sweeps the grid in row-major order; each cell
//! mates with its fittest neighbor and the single child takes the cell over
//! if it is fitter. Cells are overwritten as the sweep goes, so later cells
//! in the same sweep already see the earlier replacements.
//!
//! The strategy's selection and replacement operators are not consulted,
//! and crossover is attempted for every cell regardless of the configured
//! crossover probability.

use log::info;

use crate::algorithms::config::EvolutionConfig;
use crate::algorithms::engine::{check_population_size, EngineCore, SearchEngine};
use crate::checkpoint::state::Snapshot;
use crate::error::{EvoResult, EvolutionError};
use crate::evaluation::harness::ProgramEvaluator;
use crate::population::grid::{square_shape, GridPopulation};
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::strategies::traits::Strategy;

/// When a child takes over its cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellularReplacement {
    /// The child must beat the cell's occupant
    #[default]
    BetterThanOccupant,
    /// The child must beat both the occupant and the neighbor it was bred with
    BetterThanOccupantAndNeighbor,
}

impl CellularReplacement {
    fn accepts(self, child: f64, occupant: f64, neighbor: f64) -> bool {
        match self {
            CellularReplacement::BetterThanOccupant => child > occupant,
            CellularReplacement::BetterThanOccupantAndNeighbor => {
                child > occupant && child > neighbor
            }
        }
    }
}

/// Neighborhood-restricted engine over a toroidal grid
pub struct CellularGA<S: Strategy, V> {
    core: EngineCore<S, V>,
    grid: GridPopulation<S::Genome>,
    replacement: CellularReplacement,
}

impl<S, V> CellularGA<S, V>
where
    S: Strategy,
    V: ProgramEvaluator,
{
    /// Build an engine over a random, fully evaluated population
    ///
    /// The population must fit a `floor(sqrt(n)) x ceil(sqrt(n))` grid.
    pub fn new(strategy: S, evaluator: V, config: EvolutionConfig) -> EvoResult<Self> {
        Self::with_population(strategy, evaluator, config, Vec::new())
    }

    /// Build an engine whose population starts with `seeds`
    pub fn with_population(
        strategy: S,
        evaluator: V,
        config: EvolutionConfig,
        seeds: Vec<Individual<S::Genome>>,
    ) -> EvoResult<Self> {
        check_grid_shape(config.population_size)?;
        let mut core = EngineCore::new(strategy, evaluator, config)?;
        let population = core.initial_population(seeds)?;
        let grid = GridPopulation::square(population)?;
        info!(
            "{}: {}x{} grid ready after {} evaluations",
            core.strategy.name(),
            grid.rows(),
            grid.cols(),
            core.total_evaluations
        );
        Ok(Self {
            core,
            grid,
            replacement: CellularReplacement::default(),
        })
    }

    /// Resume an engine from a snapshot
    pub fn resume(strategy: S, evaluator: V, snapshot: Snapshot<S::Genome>) -> EvoResult<Self> {
        check_population_size(&snapshot.config, snapshot.population.len())?;
        let (rows, cols) = snapshot
            .grid
            .unwrap_or_else(|| square_shape(snapshot.population.len()));
        let core = EngineCore::resume(strategy, evaluator, &snapshot)?;
        let grid = GridPopulation::new(Population::new(snapshot.population)?, rows, cols)?;
        Ok(Self {
            core,
            grid,
            replacement: CellularReplacement::default(),
        })
    }

    /// Set the replacement rule
    pub fn with_replacement(mut self, replacement: CellularReplacement) -> Self {
        self.replacement = replacement;
        self
    }

    /// The grid
    pub fn grid(&self) -> &GridPopulation<S::Genome> {
        &self.grid
    }

    /// The strategy driving this engine
    pub fn strategy(&self) -> &S {
        &self.core.strategy
    }

    /// Give back the evaluator
    pub fn into_evaluator(self) -> V {
        self.core.evaluator
    }

    /// Breed one child for a cell and let it compete for the cell
    fn update_cell(&mut self, row: isize, col: isize) -> EvoResult<()> {
        let (n_row, n_col) = self.grid.fittest_neighbor(row, col);
        let occupant = self.grid.get(row, col);
        let neighbor = self.grid.get(n_row as isize, n_col as isize);
        let (occupant_fitness, neighbor_fitness) =
            (occupant.fitness_value(), neighbor.fitness_value());

        let (child, _) =
            self.core
                .strategy
                .crossover(occupant.genome(), neighbor.genome(), &mut self.core.rng)?;
        let child = self.core.vary(child)?;
        let child = self
            .core
            .evaluate(vec![child])?
            .pop()
            .ok_or_else(|| EvolutionError::Evaluation("no result for cell child".to_string()))?;

        if self
            .replacement
            .accepts(child.fitness_value(), occupant_fitness, neighbor_fitness)
        {
            self.grid.replace_at(row, col, child)?;
        }
        Ok(())
    }
}

impl<S, V> SearchEngine for CellularGA<S, V>
where
    S: Strategy,
    V: ProgramEvaluator,
{
    type Genome = S::Genome;

    fn advance(&mut self) -> EvoResult<()> {
        for row in 0..self.grid.rows() as isize {
            for col in 0..self.grid.cols() as isize {
                self.update_cell(row, col)?;
            }
        }
        self.core.generation += 1;
        Ok(())
    }

    fn best_individual(&self) -> &Individual<S::Genome> {
        self.core.best_or(self.grid.population())
    }

    fn configuration(&self) -> &EvolutionConfig {
        &self.core.config
    }

    fn total_evaluations(&self) -> usize {
        self.core.total_evaluations
    }

    fn generation(&self) -> usize {
        self.core.generation
    }

    fn population(&self) -> &Population<S::Genome> {
        self.grid.population()
    }

    fn snapshot(&self) -> Snapshot<S::Genome> {
        Snapshot::new(
            self.core.strategy.name(),
            self.core.config.clone(),
            self.grid.population().individuals().to_vec(),
            self.best_individual().clone(),
        )
        .with_counters(self.core.total_evaluations, self.core.generation)
        .with_grid(self.grid.rows(), self.grid.cols())
    }
}

fn check_grid_shape(size: usize) -> EvoResult<()> {
    let (rows, cols) = square_shape(size);
    if rows * cols != size {
        return Err(EvolutionError::GridShape { size, rows, cols });
    }
    Ok(())
}
