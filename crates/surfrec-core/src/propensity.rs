use crate::State;
use serde::{Serialize, Deserialize};

/// Mass-action rate law of a single reaction channel.
///
/// Indices refer to positions in the population vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Propensity {
    /// `k * x[i]`
    FirstOrder(usize),
    /// `k * x[i] * x[j]`
    Bimolecular(usize, usize),
    /// `k * x[i]^2`, for two units of the same species
    Homodimer(usize),
}

impl Propensity {
    #[inline]
    pub fn evaluate(&self, state: &State, k: f64) -> f64 {
        match *self {
            Propensity::FirstOrder(i) => k * state[i],
            Propensity::Bimolecular(i, j) => k * state[i] * state[j],
            Propensity::Homodimer(i) => k * state[i] * state[i],
        }
    }
}
