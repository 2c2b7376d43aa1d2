//! Named strategy presets
//!
//! The representations and operator mixes that ship with the command line
//! tool. Each preset pairs a strategy with the engine it is meant to run on.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::algorithms::config::MutationSchedule;
use crate::error::{EvoResult, EvolutionError};
use crate::evaluation::program::Key;
use crate::fitness::shapes::{DistanceMinusOvertime, DistancePlusSpeed, SpeedIfFinished};
use crate::genome::bitmask::{Bitmask, TimedBitmask};
use crate::genome::keystroke::KeyToggle;
use crate::operators::crossover::{CutAndSpliceCrossover, MixedCrossover};
use crate::operators::mutation::{EditMutation, RandomResetMutation, TimedBitmaskMutation};
use crate::operators::repair::{ClampDurations, NoRepair, ReplicateShort};
use crate::operators::replacement::{InverseFitnessWeighted, InverseTournament, ReplaceAmongWorst};
use crate::operators::selection::TournamentSelection;
use crate::strategies::sequence::SequenceStrategy;

/// Single keys tapped for 150 ms each
pub type KeystrokeStrategy = SequenceStrategy<
    Key,
    TournamentSelection,
    MixedCrossover,
    EditMutation,
    ReplicateShort,
    ReplaceAmongWorst,
    DistancePlusSpeed,
>;

/// Individual presses and releases, 150 ms apart
pub type KeyToggleStrategy = SequenceStrategy<
    KeyToggle,
    TournamentSelection,
    MixedCrossover,
    EditMutation,
    ReplicateShort,
    ReplaceAmongWorst,
    DistancePlusSpeed,
>;

/// Full control states held for 150 ms each
pub type BitmaskStrategy = SequenceStrategy<
    Bitmask,
    TournamentSelection,
    MixedCrossover,
    EditMutation,
    NoRepair,
    ReplaceAmongWorst,
    DistancePlusSpeed,
>;

/// Bitmasks with replacement pressure that grows over the run
///
/// Shared by `dynamic-bitmask` and `dynamic-replacement-bitmask`; the two
/// differ in the engine settings from [`AlgorithmKind`], not in operators.
pub type DynamicBitmaskStrategy = SequenceStrategy<
    Bitmask,
    TournamentSelection,
    MixedCrossover,
    EditMutation,
    NoRepair,
    InverseFitnessWeighted,
    DistancePlusSpeed,
>;

/// Full control states with evolved hold times
pub type TimedBitmaskStrategy = SequenceStrategy<
    TimedBitmask,
    TournamentSelection,
    MixedCrossover,
    TimedBitmaskMutation,
    ClampDurations,
    ReplaceAmongWorst,
    DistanceMinusOvertime,
>;

/// Bitmasks scored on speed, only for runners that stay up
pub type GoogleStrategy = SequenceStrategy<
    Bitmask,
    TournamentSelection,
    CutAndSpliceCrossover,
    RandomResetMutation,
    NoRepair,
    InverseTournament,
    SpeedIfFinished,
>;

/// Engine a preset is meant to run on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    Linear,
    Cellular,
}

/// The bundled algorithms
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    Keystroke,
    KeyToggle,
    Bitmask,
    TimedBitmask,
    /// Annealed mutation and inverse-fitness replacement
    DynamicBitmask,
    /// Annealed mutation only
    DynamicMutationBitmask,
    /// Inverse-fitness replacement only
    DynamicReplacementBitmask,
    CellularKeystroke,
    Google,
    Idle,
    IdleCellular,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 11] = [
        AlgorithmKind::Keystroke,
        AlgorithmKind::KeyToggle,
        AlgorithmKind::Bitmask,
        AlgorithmKind::TimedBitmask,
        AlgorithmKind::DynamicBitmask,
        AlgorithmKind::DynamicMutationBitmask,
        AlgorithmKind::DynamicReplacementBitmask,
        AlgorithmKind::CellularKeystroke,
        AlgorithmKind::Google,
        AlgorithmKind::Idle,
        AlgorithmKind::IdleCellular,
    ];

    /// Name used on the command line and for result directories
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::Keystroke => "keystroke",
            AlgorithmKind::KeyToggle => "key-toggle",
            AlgorithmKind::Bitmask => "bitmask",
            AlgorithmKind::TimedBitmask => "timed-bitmask",
            AlgorithmKind::DynamicBitmask => "dynamic-bitmask",
            AlgorithmKind::DynamicMutationBitmask => "dynamic-mutation-bitmask",
            AlgorithmKind::DynamicReplacementBitmask => "dynamic-replacement-bitmask",
            AlgorithmKind::CellularKeystroke => "cellular-keystroke",
            AlgorithmKind::Google => "google",
            AlgorithmKind::Idle => "idle",
            AlgorithmKind::IdleCellular => "idle-cellular",
        }
    }

    /// Engine this algorithm runs on
    pub fn engine(self) -> EngineKind {
        match self {
            AlgorithmKind::CellularKeystroke
            | AlgorithmKind::Google
            | AlgorithmKind::IdleCellular => EngineKind::Cellular,
            _ => EngineKind::Linear,
        }
    }

    /// Whether mutation is annealed over the run
    fn anneals_mutation(self) -> bool {
        matches!(
            self,
            AlgorithmKind::DynamicBitmask | AlgorithmKind::DynamicMutationBitmask
        )
    }

    /// Mutation schedule this algorithm uses over a run of `horizon` evaluations
    pub fn mutation_schedule(self, horizon: usize) -> MutationSchedule {
        if self.anneals_mutation() {
            MutationSchedule::Annealed { horizon }
        } else {
            MutationSchedule::Constant
        }
    }

    /// Whether uncrossed parents go on to mutation and evaluation
    ///
    /// Set for the annealed-mutation algorithms, whose early mutation rate is
    /// close to 1 and would otherwise be wasted on pairs crossover skipped.
    pub fn pass_through_parents(self) -> bool {
        self.anneals_mutation()
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = EvolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = AlgorithmKind::ALL.iter().map(|k| k.name()).collect();
                EvolutionError::Configuration(format!(
                    "unknown algorithm {:?}, expected one of {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Keystroke genomes of 15 to 30 taps
pub fn keystroke() -> EvoResult<KeystrokeStrategy> {
    SequenceStrategy::builder(AlgorithmKind::Keystroke.name())
        .length(15..=30)
        .selection(TournamentSelection::new(5))
        .crossover(MixedCrossover::new(0))
        .mutation(EditMutation)
        .repair(ReplicateShort::default())
        .replacement(ReplaceAmongWorst::new(5))
        .fitness(DistancePlusSpeed::beyond(10.0))
        .build()
}

/// Keystroke genomes of 15 to 29 taps, for the cellular engine
pub fn cellular_keystroke() -> EvoResult<KeystrokeStrategy> {
    SequenceStrategy::builder(AlgorithmKind::CellularKeystroke.name())
        .length(15..=29)
        .selection(TournamentSelection::new(5))
        .crossover(MixedCrossover::new(0))
        .mutation(EditMutation)
        .repair(ReplicateShort::default())
        .replacement(ReplaceAmongWorst::new(5))
        .fitness(DistancePlusSpeed::beyond(10.0))
        .build()
}

/// Press/release genomes of 15 to 30 symbols
pub fn key_toggle() -> EvoResult<KeyToggleStrategy> {
    SequenceStrategy::builder(AlgorithmKind::KeyToggle.name())
        .length(15..=30)
        .selection(TournamentSelection::new(5))
        .crossover(MixedCrossover::new(0))
        .mutation(EditMutation)
        .repair(ReplicateShort::default())
        .replacement(ReplaceAmongWorst::new(5))
        .fitness(DistancePlusSpeed::beyond(10.0))
        .build()
}

/// Bitmask genomes of 20 to 40 states
pub fn bitmask() -> EvoResult<BitmaskStrategy> {
    plain_bitmask(AlgorithmKind::Bitmask)
}

/// Bitmask genomes run with annealed mutation
///
/// Pair with [`AlgorithmKind::mutation_schedule`] and
/// [`AlgorithmKind::pass_through_parents`] in the engine settings.
pub fn dynamic_mutation_bitmask() -> EvoResult<BitmaskStrategy> {
    plain_bitmask(AlgorithmKind::DynamicMutationBitmask)
}

fn plain_bitmask(kind: AlgorithmKind) -> EvoResult<BitmaskStrategy> {
    SequenceStrategy::builder(kind.name())
        .length(20..=40)
        .selection(TournamentSelection::new(5))
        .crossover(MixedCrossover::new(1))
        .mutation(EditMutation)
        .repair(NoRepair)
        .replacement(ReplaceAmongWorst::new(5))
        .fitness(DistancePlusSpeed::new())
        .build()
}

/// Bitmask genomes with inverse-fitness replacement over `horizon` evaluations
///
/// Also anneals mutation when run with the engine settings of its kind.
pub fn dynamic_bitmask(horizon: usize) -> EvoResult<DynamicBitmaskStrategy> {
    inverse_fitness_bitmask(AlgorithmKind::DynamicBitmask, horizon)
}

/// Bitmask genomes with inverse-fitness replacement and constant mutation
pub fn dynamic_replacement_bitmask(horizon: usize) -> EvoResult<DynamicBitmaskStrategy> {
    inverse_fitness_bitmask(AlgorithmKind::DynamicReplacementBitmask, horizon)
}

fn inverse_fitness_bitmask(kind: AlgorithmKind, horizon: usize) -> EvoResult<DynamicBitmaskStrategy> {
    if horizon == 0 {
        return Err(EvolutionError::Configuration(
            "Replacement horizon must be positive".to_string(),
        ));
    }
    SequenceStrategy::builder(kind.name())
        .length(20..=40)
        .selection(TournamentSelection::new(5))
        .crossover(MixedCrossover::new(1))
        .mutation(EditMutation)
        .repair(NoRepair)
        .replacement(InverseFitnessWeighted::new(horizon))
        .fitness(DistancePlusSpeed::new())
        .build()
}

/// Timed bitmask genomes of 10 to 29 states
pub fn timed_bitmask() -> EvoResult<TimedBitmaskStrategy> {
    SequenceStrategy::builder(AlgorithmKind::TimedBitmask.name())
        .length(10..=29)
        .selection(TournamentSelection::new(5))
        .crossover(MixedCrossover::new(1))
        .mutation(TimedBitmaskMutation::default())
        .repair(ClampDurations::default())
        .replacement(ReplaceAmongWorst::new(5))
        .fitness(DistanceMinusOvertime::default())
        .build()
}

/// Bitmask genomes scored on speed, for the cellular engine
///
/// Runs that neither finish nor outlast `time_limit` score zero.
pub fn google(time_limit: Duration) -> EvoResult<GoogleStrategy> {
    SequenceStrategy::builder(AlgorithmKind::Google.name())
        .length(20..=40)
        .selection(TournamentSelection::new(5))
        .crossover(CutAndSpliceCrossover::new(1))
        .mutation(RandomResetMutation)
        .repair(NoRepair)
        .replacement(InverseTournament::new(3))
        .fitness(SpeedIfFinished::new(time_limit))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::traits::Genome;
    use crate::strategies::traits::Strategy;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in AlgorithmKind::ALL {
            assert_eq!(kind.name().parse::<AlgorithmKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
        assert!("walking".parse::<AlgorithmKind>().is_err());
    }

    #[test]
    fn test_engines() {
        assert_eq!(AlgorithmKind::Google.engine(), EngineKind::Cellular);
        assert_eq!(AlgorithmKind::IdleCellular.engine(), EngineKind::Cellular);
        assert_eq!(AlgorithmKind::Idle.engine(), EngineKind::Linear);
        assert_eq!(AlgorithmKind::Keystroke.engine(), EngineKind::Linear);
        assert_eq!(AlgorithmKind::DynamicMutationBitmask.engine(), EngineKind::Linear);
    }

    #[test]
    fn test_dynamic_variants_split_their_controls() {
        let annealed = MutationSchedule::Annealed { horizon: 1000 };

        assert_eq!(AlgorithmKind::DynamicBitmask.mutation_schedule(1000), annealed);
        assert!(AlgorithmKind::DynamicBitmask.pass_through_parents());

        assert_eq!(AlgorithmKind::DynamicMutationBitmask.mutation_schedule(1000), annealed);
        assert!(AlgorithmKind::DynamicMutationBitmask.pass_through_parents());

        assert_eq!(
            AlgorithmKind::DynamicReplacementBitmask.mutation_schedule(1000),
            MutationSchedule::Constant
        );
        assert!(!AlgorithmKind::DynamicReplacementBitmask.pass_through_parents());

        assert!(!AlgorithmKind::Bitmask.pass_through_parents());
        assert_eq!(AlgorithmKind::Bitmask.mutation_schedule(1000), MutationSchedule::Constant);
    }

    #[test]
    fn test_dynamic_replacement_weights_worst_members() {
        use crate::genome::bitmask::Bitmask;
        use crate::genome::sequence::Sequence;
        use crate::population::individual::Individual;
        use crate::population::population::Population;
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let genome = || Sequence::new(vec![Bitmask::from_mask([true, false, false, true])]);
        let members = [1.0, 50.0, 100.0]
            .iter()
            .map(|&f| Individual::with_fitness(genome(), f))
            .collect();
        let population = Population::new(members).unwrap();
        let candidate = Individual::with_fitness(genome(), 10.0);

        let strategy = dynamic_replacement_bitmask(1000).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut hits = [0usize; 3];
        for _ in 0..300 {
            let index = strategy
                .choose_replacement_target(&population, &candidate, 0, &mut rng)
                .unwrap();
            hits[index] += 1;
        }
        assert!(hits[0] > hits[1] + hits[2], "{:?}", hits);
    }

    #[test]
    fn test_presets_generate_decodable_genomes() {
        let mut rng = rand::thread_rng();

        let keys = keystroke().unwrap();
        let genome = keys.random_genome(&mut rng);
        assert!((15..=30).contains(&genome.len()));
        assert!(keys.decode(&genome).is_ok());

        let timed = timed_bitmask().unwrap();
        let genome = timed.random_genome(&mut rng);
        assert!(timed.decode(&genome).is_ok());

        let google = google(Duration::from_secs(60)).unwrap();
        assert_eq!(google.name(), "google");
        assert!((20..=40).contains(&google.random_genome(&mut rng).len()));

        assert!(dynamic_bitmask(0).is_err());
        assert!(dynamic_replacement_bitmask(0).is_err());
        assert_eq!(dynamic_mutation_bitmask().unwrap().name(), "dynamic-mutation-bitmask");
        assert_eq!(
            dynamic_replacement_bitmask(500).unwrap().name(),
            "dynamic-replacement-bitmask"
        );
        assert!(key_toggle().is_ok());
        assert!(bitmask().is_ok());
        assert!(cellular_keystroke().is_ok());
    }
}
