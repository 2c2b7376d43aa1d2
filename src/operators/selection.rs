//! Selection operators
//!
//! This module provides parent selection operators.

use rand::seq::index::sample;
use rand::Rng;

use crate::genome::traits::Genome;
use crate::operators::traits::SelectionOperator;
use crate::population::population::Population;

/// Tournament selection
///
/// Draws `tournament_size` distinct individuals and returns the fittest. When
/// the population is smaller than the tournament, everyone competes.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Number of individuals in each tournament
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        assert!(tournament_size > 0, "Tournament size must be positive");
        Self { tournament_size }
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::new(5)
    }
}

impl<G: Genome> SelectionOperator<G> for TournamentSelection {
    fn select<R: Rng>(&self, population: &Population<G>, rng: &mut R) -> usize {
        let size = self.tournament_size.min(population.len());
        let mut competitors = sample(rng, population.len(), size).into_iter();

        // population is never empty, so there is always a first competitor
        let mut winner = competitors.next().unwrap_or(0);
        for idx in competitors {
            if population[idx].rank() > population[winner].rank() {
                winner = idx;
            }
        }
        winner
    }
}

/// Uniform random selection
#[derive(Clone, Debug, Default)]
pub struct RandomSelection;

impl RandomSelection {
    /// Create a new random selection
    pub fn new() -> Self {
        Self
    }
}

impl<G: Genome> SelectionOperator<G> for RandomSelection {
    fn select<R: Rng>(&self, population: &Population<G>, rng: &mut R) -> usize {
        rng.gen_range(0..population.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::program::Key;
    use crate::genome::sequence::Sequence;
    use crate::population::individual::Individual;

    fn population(n: usize) -> Population<Sequence<Key>> {
        let individuals = (0..n)
            .map(|i| Individual::with_fitness(Sequence::new(vec![Key::W]), i as f64))
            .collect();
        Population::new(individuals).unwrap()
    }

    #[test]
    fn test_tournament_whole_population_returns_best() {
        let mut rng = rand::thread_rng();
        let pop = population(4);
        let selection = TournamentSelection::new(10);

        for _ in 0..20 {
            assert_eq!(selection.select(&pop, &mut rng), 3);
        }
    }

    #[test]
    fn test_tournament_pressure() {
        let mut rng = rand::thread_rng();
        let pop = population(30);
        let selection = TournamentSelection::default();

        let picks = selection.select_many(&pop, 500, &mut rng);
        let mean = picks.iter().sum::<usize>() as f64 / picks.len() as f64;
        // uniform picks would average 14.5
        assert!(mean > 18.0, "mean pick {}", mean);
    }

    #[test]
    fn test_random_selection_in_range() {
        let mut rng = rand::thread_rng();
        let pop = population(7);
        for idx in RandomSelection::new().select_many(&pop, 100, &mut rng) {
            assert!(idx < 7);
        }
    }
}
