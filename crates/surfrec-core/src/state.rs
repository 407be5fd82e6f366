use nalgebra::DVector;
use serde::{Serialize, Deserialize};

pub type Time = f64;

/// Population vector indexed by species position.
///
/// Counts are stored as reals; for a correctly scaled network they stay at
/// integer values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State(pub DVector<f64>);

impl State {
    pub fn new(values: Vec<f64>) -> Self {
        State(DVector::from_vec(values))
    }

    pub fn zeros(n: usize) -> Self {
        State(DVector::zeros(n))
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    /// Adds `delta` component-wise. Returns the indices that went below zero
    /// before clamping, so callers can decide whether that is fatal.
    pub fn apply_delta_clamped(&mut self, delta: &[f64]) -> Vec<usize> {
        debug_assert_eq!(delta.len(), self.dim());
        let mut clamped = Vec::new();
        for (i, d) in delta.iter().enumerate() {
            let updated = self.0[i] + d;
            if updated < 0.0 {
                clamped.push(i);
                self.0[i] = 0.0;
            } else {
                self.0[i] = updated;
            }
        }
        clamped
    }

    pub fn is_non_negative(&self) -> bool {
        self.0.iter().all(|&x| x >= 0.0)
    }
}

impl std::ops::Deref for State {
    type Target = DVector<f64>;
    
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for State {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<DVector<f64>> for State {
    fn from(v: DVector<f64>) -> Self {
        State(v)
    }
}

impl From<Vec<f64>> for State {
    fn from(v: Vec<f64>) -> Self {
        State::new(v)
    }
}
