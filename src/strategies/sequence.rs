//! Operator-composed sequence strategies
//!
//! `SequenceStrategy` assembles a strategy for any sequence representation
//! out of one operator per role. Every bundled representation except the
//! idle one is built this way.

use std::marker::PhantomData;
use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;

use crate::error::{EvoResult, EvolutionError, OperatorResult};
use crate::fitness::traits::FitnessFunction;
use crate::genome::sequence::Sequence;
use crate::genome::traits::Allele;
use crate::operators::repair::NoRepair;
use crate::operators::traits::{
    CrossoverOperator, MutationOperator, RepairOperator, ReplacementOperator, SelectionOperator,
};
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::strategies::traits::Strategy;

/// Builder for SequenceStrategy
pub struct SequenceStrategyBuilder<A, S, C, M, Rp, Re, Fit>
where
    A: Allele,
{
    name: String,
    length: RangeInclusive<usize>,
    selection: Option<S>,
    crossover: Option<C>,
    mutation: Option<M>,
    repair: Rp,
    replacement: Option<Re>,
    fitness: Option<Fit>,
    _phantom: PhantomData<A>,
}

impl<A: Allele> SequenceStrategyBuilder<A, (), (), (), NoRepair, (), ()> {
    /// Create a new builder; repair defaults to [`NoRepair`]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: 15..=30,
            selection: None,
            crossover: None,
            mutation: None,
            repair: NoRepair,
            replacement: None,
            fitness: None,
            _phantom: PhantomData,
        }
    }
}

impl<A, S, C, M, Rp, Re, Fit> SequenceStrategyBuilder<A, S, C, M, Rp, Re, Fit>
where
    A: Allele,
{
    /// Set the length range of random genomes
    pub fn length(mut self, length: RangeInclusive<usize>) -> Self {
        self.length = length;
        self
    }

    /// Set the selection operator
    pub fn selection<NewS>(self, selection: NewS) -> SequenceStrategyBuilder<A, NewS, C, M, Rp, Re, Fit>
    where
        NewS: SelectionOperator<Sequence<A>>,
    {
        SequenceStrategyBuilder {
            name: self.name,
            length: self.length,
            selection: Some(selection),
            crossover: self.crossover,
            mutation: self.mutation,
            repair: self.repair,
            replacement: self.replacement,
            fitness: self.fitness,
            _phantom: PhantomData,
        }
    }

    /// Set the crossover operator
    pub fn crossover<NewC>(self, crossover: NewC) -> SequenceStrategyBuilder<A, S, NewC, M, Rp, Re, Fit>
    where
        NewC: CrossoverOperator<Sequence<A>>,
    {
        SequenceStrategyBuilder {
            name: self.name,
            length: self.length,
            selection: self.selection,
            crossover: Some(crossover),
            mutation: self.mutation,
            repair: self.repair,
            replacement: self.replacement,
            fitness: self.fitness,
            _phantom: PhantomData,
        }
    }

    /// Set the mutation operator
    pub fn mutation<NewM>(self, mutation: NewM) -> SequenceStrategyBuilder<A, S, C, NewM, Rp, Re, Fit>
    where
        NewM: MutationOperator<Sequence<A>>,
    {
        SequenceStrategyBuilder {
            name: self.name,
            length: self.length,
            selection: self.selection,
            crossover: self.crossover,
            mutation: Some(mutation),
            repair: self.repair,
            replacement: self.replacement,
            fitness: self.fitness,
            _phantom: PhantomData,
        }
    }

    /// Set the repair operator
    pub fn repair<NewRp>(self, repair: NewRp) -> SequenceStrategyBuilder<A, S, C, M, NewRp, Re, Fit>
    where
        NewRp: RepairOperator<Sequence<A>>,
    {
        SequenceStrategyBuilder {
            name: self.name,
            length: self.length,
            selection: self.selection,
            crossover: self.crossover,
            mutation: self.mutation,
            repair,
            replacement: self.replacement,
            fitness: self.fitness,
            _phantom: PhantomData,
        }
    }

    /// Set the replacement operator
    pub fn replacement<NewRe>(
        self,
        replacement: NewRe,
    ) -> SequenceStrategyBuilder<A, S, C, M, Rp, NewRe, Fit>
    where
        NewRe: ReplacementOperator<Sequence<A>>,
    {
        SequenceStrategyBuilder {
            name: self.name,
            length: self.length,
            selection: self.selection,
            crossover: self.crossover,
            mutation: self.mutation,
            repair: self.repair,
            replacement: Some(replacement),
            fitness: self.fitness,
            _phantom: PhantomData,
        }
    }

    /// Set the fitness function
    pub fn fitness<NewFit>(self, fitness: NewFit) -> SequenceStrategyBuilder<A, S, C, M, Rp, Re, NewFit>
    where
        NewFit: FitnessFunction,
    {
        SequenceStrategyBuilder {
            name: self.name,
            length: self.length,
            selection: self.selection,
            crossover: self.crossover,
            mutation: self.mutation,
            repair: self.repair,
            replacement: self.replacement,
            fitness: Some(fitness),
            _phantom: PhantomData,
        }
    }
}

impl<A, S, C, M, Rp, Re, Fit> SequenceStrategyBuilder<A, S, C, M, Rp, Re, Fit>
where
    A: Allele,
    S: SelectionOperator<Sequence<A>>,
    C: CrossoverOperator<Sequence<A>>,
    M: MutationOperator<Sequence<A>>,
    Rp: RepairOperator<Sequence<A>>,
    Re: ReplacementOperator<Sequence<A>>,
    Fit: FitnessFunction,
{
    /// Build the strategy
    #[allow(clippy::type_complexity)]
    pub fn build(self) -> EvoResult<SequenceStrategy<A, S, C, M, Rp, Re, Fit>> {
        if self.length.is_empty() || *self.length.start() == 0 {
            return Err(EvolutionError::Configuration(format!(
                "Genome length range {:?} must be non-empty and start above zero",
                self.length
            )));
        }

        let selection = self.selection.ok_or_else(|| {
            EvolutionError::Configuration("Selection operator must be specified".to_string())
        })?;

        let crossover = self.crossover.ok_or_else(|| {
            EvolutionError::Configuration("Crossover operator must be specified".to_string())
        })?;

        let mutation = self.mutation.ok_or_else(|| {
            EvolutionError::Configuration("Mutation operator must be specified".to_string())
        })?;

        let replacement = self.replacement.ok_or_else(|| {
            EvolutionError::Configuration("Replacement operator must be specified".to_string())
        })?;

        let fitness = self.fitness.ok_or_else(|| {
            EvolutionError::Configuration("Fitness function must be specified".to_string())
        })?;

        Ok(SequenceStrategy {
            name: self.name,
            length: self.length,
            selection,
            crossover,
            mutation,
            repair: self.repair,
            replacement,
            fitness,
            _phantom: PhantomData,
        })
    }
}

/// Strategy over `Sequence<A>` composed from operators
#[derive(Clone, Debug)]
pub struct SequenceStrategy<A, S, C, M, Rp, Re, Fit>
where
    A: Allele,
{
    name: String,
    length: RangeInclusive<usize>,
    selection: S,
    crossover: C,
    mutation: M,
    repair: Rp,
    replacement: Re,
    fitness: Fit,
    _phantom: PhantomData<A>,
}

impl<A: Allele> SequenceStrategy<A, (), (), (), NoRepair, (), ()> {
    /// Start building a strategy
    pub fn builder(name: impl Into<String>) -> SequenceStrategyBuilder<A, (), (), (), NoRepair, (), ()> {
        SequenceStrategyBuilder::new(name)
    }
}

impl<A, S, C, M, Rp, Re, Fit> SequenceStrategy<A, S, C, M, Rp, Re, Fit>
where
    A: Allele,
{
    /// Length range of random genomes
    pub fn length(&self) -> &RangeInclusive<usize> {
        &self.length
    }

    /// The fitness function
    pub fn fitness_function(&self) -> &Fit {
        &self.fitness
    }
}

impl<A, S, C, M, Rp, Re, Fit> Strategy for SequenceStrategy<A, S, C, M, Rp, Re, Fit>
where
    A: Allele,
    S: SelectionOperator<Sequence<A>>,
    C: CrossoverOperator<Sequence<A>>,
    M: MutationOperator<Sequence<A>>,
    Rp: RepairOperator<Sequence<A>>,
    Re: ReplacementOperator<Sequence<A>>,
    Fit: FitnessFunction,
{
    type Genome = Sequence<A>;

    fn name(&self) -> &str {
        &self.name
    }

    fn random_genome<R: Rng>(&self, rng: &mut R) -> Sequence<A> {
        Sequence::random(rng, self.length.clone())
    }

    fn fitness(&self, progress: f64, elapsed: Duration) -> f64 {
        self.fitness.fitness(progress, elapsed)
    }

    fn select_parents<R: Rng>(
        &self,
        population: &Population<Sequence<A>>,
        n: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        self.selection.select_many(population, n, rng)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &Sequence<A>,
        parent2: &Sequence<A>,
        rng: &mut R,
    ) -> OperatorResult<(Sequence<A>, Sequence<A>)> {
        self.crossover.crossover(parent1, parent2, rng)
    }

    fn mutate<R: Rng>(&self, genome: &Sequence<A>, rng: &mut R) -> OperatorResult<Sequence<A>> {
        let mut mutant = genome.clone();
        self.mutation.mutate(&mut mutant, rng)?;
        Ok(mutant)
    }

    fn repair(&self, genome: Sequence<A>) -> Sequence<A> {
        self.repair.repair(genome)
    }

    fn choose_replacement_target<R: Rng>(
        &self,
        population: &Population<Sequence<A>>,
        candidate: &Individual<Sequence<A>>,
        evaluations: usize,
        rng: &mut R,
    ) -> Option<usize> {
        self.replacement
            .choose_target(population, candidate, evaluations, rng)
    }
}
