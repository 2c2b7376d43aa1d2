//! # totter
//!
//! Evolutionary search for control programs that drive a black-box,
//! stateful environment through discrete key actions and observe it
//! through a noisy sensor.
//!
//! ## Core Concepts
//!
//! - **Strategies**: a representation plus its generation, decoding,
//!   fitness, selection, crossover, mutation, repair and replacement
//!   operators, written once against the [`Strategy`](strategies::traits::Strategy) trait
//! - **Engines**: a tournament-based linear GA (steady-state or generational)
//!   and an asynchronous cellular GA on a torus
//! - **Evaluation harness**: plays one program against the environment on an
//!   actuator thread while a watchdog thread decides when the run is over
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use totter::prelude::*;
//!
//! let harness = EvaluationHarness::new(SimulatedTrack::new(), TrackReader);
//! let config = EvolutionConfig::builder()
//!     .population_size(30)
//!     .evaluation_budget(1000)
//!     .build()?;
//!
//! let mut engine = LinearGA::new(presets::keystroke()?, harness, config)?;
//! engine.run_to_budget()?;
//! println!("best fitness: {}", engine.best_individual().fitness_value());
//! ```

pub mod algorithms;
pub mod checkpoint;
pub mod diagnostics;
pub mod error;
pub mod evaluation;
pub mod experiment;
pub mod fitness;
pub mod genome;
pub mod operators;
pub mod population;
pub mod strategies;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::checkpoint::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::evaluation::prelude::*;
    pub use crate::experiment::prelude::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::strategies::prelude::*;
    pub use crate::strategies::presets;
}
