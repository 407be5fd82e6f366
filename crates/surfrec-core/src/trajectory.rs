use crate::{State, Time};
use serde::{Serialize, Deserialize};

/// One recorded point of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: Time,
    pub state: State,
    /// Per-event propensities that selected the step leading here.
    /// All zero for the initial snapshot.
    pub propensities: Vec<f64>,
}

/// Append-only run history: the initial snapshot followed by one entry per
/// accepted step.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Trajectory {
    pub snapshots: Vec<Snapshot>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self {
            snapshots: Vec::new(),
        }
    }
    
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(capacity),
        }
    }

    /// Starts a trajectory at `t` with zero propensities for `n_events` channels.
    pub fn starting_at(t: Time, state: State, n_events: usize) -> Self {
        let mut trajectory = Self::new();
        trajectory.push(t, state, vec![0.0; n_events]);
        trajectory
    }
    
    pub fn push(&mut self, t: Time, state: State, propensities: Vec<f64>) {
        self.snapshots.push(Snapshot {
            time: t,
            state,
            propensities,
        });
    }
    
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of accepted steps (snapshots after the initial one).
    pub fn n_steps(&self) -> usize {
        self.snapshots.len().saturating_sub(1)
    }

    pub fn times(&self) -> impl Iterator<Item = Time> + '_ {
        self.snapshots.iter().map(|s| s.time)
    }
    
    pub fn final_state(&self) -> Option<&State> {
        self.snapshots.last().map(|s| &s.state)
    }

    pub fn final_time(&self) -> Option<Time> {
        self.snapshots.last().map(|s| s.time)
    }
    
    pub fn initial_state(&self) -> Option<&State> {
        self.snapshots.first().map(|s| &s.state)
    }
}
