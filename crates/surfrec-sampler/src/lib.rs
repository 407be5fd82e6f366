pub mod ssa;
pub mod ode;
pub mod error;

pub use ssa::{Sampler, SsaOutcome, TerminationReason, ClampPolicy, select_channel, ZERO_RATE_TOLERANCE};
pub use ode::{MeanFieldIntegrator, OdeSpec};
pub use error::SimulationError;
