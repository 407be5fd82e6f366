use surfrec_core::{Channel, Time};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("event {event} ({}) would drive species {species} negative at t = {time:e}", .channel.equation())]
    NegativePopulation {
        event: usize,
        channel: Channel,
        species: usize,
        time: Time,
    },

    #[error("stop time must be finite and non-negative, got {0}")]
    InvalidStopTime(f64),

    #[error("time step must be finite and positive, got {0}")]
    InvalidStep(f64),

    #[error("dimension mismatch: {what} has length {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}
