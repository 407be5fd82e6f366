use crate::error::SimulationError;
use log::{debug, trace, warn};
use serde::{Serialize, Deserialize};
use surfrec_core::{EventRng, ReactionEvent, State, Time, Trajectory};

/// Total propensity at or below which no event can fire.
pub const ZERO_RATE_TOLERANCE: f64 = 1e-15;

/// Why a run stopped. Both are normal completions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The next candidate event fell after the stop time and was discarded.
    StopTimeReached,
    /// Every propensity vanished.
    NoReactionPossible,
}

/// What to do when applying an event would make a population negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClampPolicy {
    /// Floor the population at zero and keep going.
    #[default]
    Clamp,
    /// Abort with [`SimulationError::NegativePopulation`].
    Strict,
}

/// Result of one stochastic run.
#[derive(Clone, Debug)]
pub struct SsaOutcome {
    pub trajectory: Trajectory,
    pub termination: TerminationReason,
    /// Seed of the generator that drove the run.
    pub seed: u64,
    /// Steps in which at least one population was floored at zero.
    pub clamped_steps: usize,
}

/// Exact stochastic simulation (Gillespie direct method) over a fixed set of
/// reaction events.
pub struct Sampler<'a> {
    events: &'a [ReactionEvent],
    n_species: usize,
    clamp: ClampPolicy,
}

impl<'a> Sampler<'a> {
    pub fn new(events: &'a [ReactionEvent], n_species: usize) -> Result<Self, SimulationError> {
        if let Some(bad) = events.iter().find(|e| e.delta.len() != n_species) {
            return Err(SimulationError::DimensionMismatch {
                what: "event delta",
                expected: n_species,
                found: bad.delta.len(),
            });
        }
        Ok(Self {
            events,
            n_species,
            clamp: ClampPolicy::default(),
        })
    }

    pub fn with_clamp_policy(mut self, clamp: ClampPolicy) -> Self {
        self.clamp = clamp;
        self
    }

    /// Runs from `initial` at t = 0 until termination.
    pub fn run(
        &self,
        initial: State,
        t_stop: Time,
        rng: &mut EventRng,
    ) -> Result<SsaOutcome, SimulationError> {
        self.run_with_observer(initial, t_stop, rng, |_| {})
    }

    /// Like [`Sampler::run`], calling `observer` with the time of every
    /// accepted step.
    pub fn run_with_observer<O>(
        &self,
        initial: State,
        t_stop: Time,
        rng: &mut EventRng,
        mut observer: O,
    ) -> Result<SsaOutcome, SimulationError>
    where
        O: FnMut(Time),
    {
        if !t_stop.is_finite() || t_stop < 0.0 {
            return Err(SimulationError::InvalidStopTime(t_stop));
        }
        if initial.dim() != self.n_species {
            return Err(SimulationError::DimensionMismatch {
                what: "initial state",
                expected: self.n_species,
                found: initial.dim(),
            });
        }

        let n_events = self.events.len();
        let mut trajectory = Trajectory::starting_at(0.0, initial.clone(), n_events);
        let mut state = initial;
        let mut t: Time = 0.0;
        let mut clamped_steps = 0usize;

        let termination = loop {
            let propensities: Vec<f64> = self.events.iter().map(|e| e.rate(&state)).collect();
            let total_rate: f64 = propensities.iter().sum();

            if total_rate <= ZERO_RATE_TOLERANCE {
                break TerminationReason::NoReactionPossible;
            }

            let u1 = rng.uniform_open();
            let dt = -u1.ln() / total_rate;
            if t + dt > t_stop {
                // candidate step is discarded, not truncated
                break TerminationReason::StopTimeReached;
            }
            t += dt;

            let u2 = rng.uniform_open();
            let chosen = select_channel(&propensities, u2 * total_rate);
            let event = &self.events[chosen];

            let clamped = state.apply_delta_clamped(&event.delta);
            if let Some(&species) = clamped.first() {
                if self.clamp == ClampPolicy::Strict {
                    return Err(SimulationError::NegativePopulation {
                        event: chosen,
                        channel: event.channel,
                        species,
                        time: t,
                    });
                }
                clamped_steps += 1;
            }

            trace!("t={:e} fired {} ({})", t, chosen, event.channel.equation());
            trajectory.push(t, state.clone(), propensities);
            observer(t);
        };

        if clamped_steps > 0 {
            warn!("{} step(s) floored a population at zero", clamped_steps);
        }
        debug!(
            "SSA finished after {} steps at t={:e}: {:?}",
            trajectory.n_steps(),
            t,
            termination
        );

        Ok(SsaOutcome {
            trajectory,
            termination,
            seed: rng.seed(),
            clamped_steps,
        })
    }
}

/// Roulette-wheel selection: first index whose cumulative propensity reaches
/// `target`. Ties go to the earlier event.
///
/// If rounding leaves `target` above the final cumulative sum, the last
/// event with positive propensity is returned.
pub fn select_channel(propensities: &[f64], target: f64) -> usize {
    let mut cumulative = 0.0;
    for (i, &p) in propensities.iter().enumerate() {
        cumulative += p;
        if cumulative >= target {
            return i;
        }
    }
    propensities
        .iter()
        .rposition(|&p| p > 0.0)
        .unwrap_or(propensities.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use surfrec_core::{Channel, Propensity};

    fn decay(k: f64) -> Vec<ReactionEvent> {
        vec![ReactionEvent::new(Channel::BasicForward, Propensity::FirstOrder(0), k, 2)
            .with_change(0, -1.0)
            .with_change(1, 1.0)]
    }

    #[test]
    fn select_first_match() {
        let p = [1.0, 2.0, 3.0];
        assert_eq!(select_channel(&p, 0.5), 0);
        assert_eq!(select_channel(&p, 1.0), 0);
        assert_eq!(select_channel(&p, 1.5), 1);
        assert_eq!(select_channel(&p, 3.0), 1);
        assert_eq!(select_channel(&p, 5.999), 2);
    }

    #[test]
    fn select_skips_zero_channels() {
        let p = [0.0, 2.0, 0.0];
        assert_eq!(select_channel(&p, 1e-12), 1);
        // overshoot from rounding falls back to the last live channel
        assert_eq!(select_channel(&p, 2.0 + 1e-9), 1);
    }

    #[test]
    fn decay_runs_to_exhaustion() {
        let events = decay(1.0);
        let sampler = Sampler::new(&events, 2).unwrap();
        let mut rng = EventRng::new(3);
        let outcome = sampler
            .run(State::new(vec![20.0, 0.0]), 1e6, &mut rng)
            .unwrap();
        assert_eq!(outcome.termination, TerminationReason::NoReactionPossible);
        assert_eq!(outcome.trajectory.n_steps(), 20);
        assert_eq!(outcome.trajectory.final_state().unwrap().as_slice(), &[0.0, 20.0]);
        assert_eq!(outcome.seed, 3);
        assert_eq!(outcome.clamped_steps, 0);
    }

    #[test]
    fn zero_stop_time_keeps_only_initial_snapshot() {
        let events = decay(1.0);
        let sampler = Sampler::new(&events, 2).unwrap();
        let outcome = sampler
            .run(State::new(vec![5.0, 0.0]), 0.0, &mut EventRng::new(1))
            .unwrap();
        assert_eq!(outcome.termination, TerminationReason::StopTimeReached);
        assert_eq!(outcome.trajectory.len(), 1);
    }

    #[test]
    fn strict_policy_reports_negative_population() {
        // consumes two units of species 0 while only one exists
        let events = vec![
            ReactionEvent::new(Channel::LangmuirHinshelwoodHomodimer, Propensity::FirstOrder(0), 1.0, 2)
                .with_change(0, -2.0)
                .with_change(1, 1.0),
        ];
        let state = State::new(vec![1.0, 0.0]);

        let strict = Sampler::new(&events, 2).unwrap().with_clamp_policy(ClampPolicy::Strict);
        let err = strict.run(state.clone(), 1e6, &mut EventRng::new(9)).unwrap_err();
        assert!(matches!(err, SimulationError::NegativePopulation { event: 0, species: 0, .. }));

        let lenient = Sampler::new(&events, 2).unwrap();
        let outcome = lenient.run(state, 1e6, &mut EventRng::new(9)).unwrap();
        assert_eq!(outcome.clamped_steps, 1);
        assert_eq!(outcome.trajectory.final_state().unwrap().as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn rejects_bad_inputs() {
        let events = decay(1.0);
        assert!(matches!(
            Sampler::new(&events, 3),
            Err(SimulationError::DimensionMismatch { .. })
        ));
        let sampler = Sampler::new(&events, 2).unwrap();
        let mut rng = EventRng::new(0);
        assert_eq!(
            sampler.run(State::zeros(2), -1.0, &mut rng).unwrap_err(),
            SimulationError::InvalidStopTime(-1.0)
        );
        assert!(sampler.run(State::zeros(3), 1.0, &mut rng).is_err());
    }

    #[test]
    fn observer_sees_every_step() {
        let events = decay(1.0);
        let sampler = Sampler::new(&events, 2).unwrap();
        let mut seen = Vec::new();
        let outcome = sampler
            .run_with_observer(State::new(vec![10.0, 0.0]), 1e6, &mut EventRng::new(5), |t| {
                seen.push(t)
            })
            .unwrap();
        let recorded: Vec<f64> = outcome.trajectory.times().skip(1).collect();
        assert_eq!(seen, recorded);
    }
}
