pub mod species;
pub mod catalog;
pub mod params;
pub mod composer;
pub mod input;
pub mod recombination;
pub mod error;

pub use species::{Species, SpeciesIndex};
pub use catalog::{ModuleKind, ReactionModule, Selection, LhSharing, CATALOG};
pub use params::ParameterStream;
pub use composer::{ComposedNetwork, EventComposer, RunContext, SharedParameters, DiffusionRates, RecombinationRates};
pub use input::RunInput;
pub use recombination::RecombinationCoefficients;
pub use error::ConfigError;
