use crate::error::SimulationError;
use log::debug;
use nalgebra::DVector;
use serde::{Serialize, Deserialize};
use surfrec_core::{ReactionEvent, State, Time, Trajectory, F};

/// Fixed-step integration window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OdeSpec {
    pub dt: F,
    pub t_stop: Time,
    pub save_stride: usize,  // Save every nth step
}

impl OdeSpec {
    pub fn new(dt: F, t_stop: Time) -> Self {
        Self { dt, t_stop, save_stride: 1 }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.save_stride = stride.max(1);
        self
    }

    /// Steps needed to reach `t_stop`; the last one may be shorter than `dt`.
    pub fn n_steps(&self) -> usize {
        if self.t_stop <= 0.0 {
            return 0;
        }
        let ratio = self.t_stop / self.dt;
        let nearest = ratio.round();
        // t_stop = n * dt up to rounding: no trailing zero-length step
        if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
            nearest as usize
        } else {
            ratio.ceil() as usize
        }
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimulationError::InvalidStep(self.dt));
        }
        if !self.t_stop.is_finite() || self.t_stop < 0.0 {
            return Err(SimulationError::InvalidStopTime(self.t_stop));
        }
        Ok(())
    }
}

/// Deterministic rate equations of an event set:
/// dx/dt = Σ_e delta_e * propensity_e(x), integrated with classical RK4.
pub struct MeanFieldIntegrator<'a> {
    events: &'a [ReactionEvent],
    n_species: usize,
}

impl<'a> MeanFieldIntegrator<'a> {
    pub fn new(events: &'a [ReactionEvent], n_species: usize) -> Result<Self, SimulationError> {
        if let Some(bad) = events.iter().find(|e| e.delta.len() != n_species) {
            return Err(SimulationError::DimensionMismatch {
                what: "event delta",
                expected: n_species,
                found: bad.delta.len(),
            });
        }
        Ok(Self { events, n_species })
    }

    pub fn propensities(&self, x: &State) -> Vec<f64> {
        self.events.iter().map(|e| e.rate(x)).collect()
    }

    pub fn derivative(&self, x: &State) -> State {
        let mut dx = DVector::zeros(self.n_species);
        for event in self.events {
            let rate = event.rate(x);
            for (d, &change) in dx.iter_mut().zip(event.delta.iter()) {
                *d += change * rate;
            }
        }
        State(dx)
    }

    pub fn rk4_step(&self, x: &State, dt: F) -> State {
        let k1 = self.derivative(x);
        let k2 = self.derivative(&State(&x.0 + &k1.0 * (0.5 * dt)));
        let k3 = self.derivative(&State(&x.0 + &k2.0 * (0.5 * dt)));
        let k4 = self.derivative(&State(&x.0 + &k3.0 * dt));

        // x_{n+1} = x_n + dt/6 (k1 + 2 k2 + 2 k3 + k4)
        State(&x.0 + (&k1.0 + &k2.0 * 2.0 + &k3.0 * 2.0 + &k4.0) * (dt / 6.0))
    }

    pub fn integrate(&self, initial: State, spec: &OdeSpec) -> Result<Trajectory, SimulationError> {
        self.integrate_with_observer(initial, spec, |_| {})
    }

    /// Integrates from t = 0 to `spec.t_stop`, recording every
    /// `save_stride`-th step and always the final one. Recorded propensities
    /// are evaluated at the recorded state.
    pub fn integrate_with_observer<O>(
        &self,
        initial: State,
        spec: &OdeSpec,
        mut observer: O,
    ) -> Result<Trajectory, SimulationError>
    where
        O: FnMut(Time),
    {
        spec.validate()?;
        if initial.dim() != self.n_species {
            return Err(SimulationError::DimensionMismatch {
                what: "initial state",
                expected: self.n_species,
                found: initial.dim(),
            });
        }

        let n_steps = spec.n_steps();
        let stride = spec.save_stride.max(1);
        let mut trajectory = Trajectory::with_capacity(n_steps / stride + 2);
        trajectory.push(0.0, initial.clone(), vec![0.0; self.events.len()]);

        let mut x = initial;
        let mut t: Time = 0.0;
        for step in 1..=n_steps {
            // step boundaries from the index, so rounding does not accumulate
            let t_next = (step as F * spec.dt).min(spec.t_stop);
            x = self.rk4_step(&x, t_next - t);
            t = t_next;

            if step % stride == 0 || step == n_steps {
                trajectory.push(t, x.clone(), self.propensities(&x));
            }
            observer(t);
        }

        debug!("RK4 finished: {} steps, {} snapshots", n_steps, trajectory.len());
        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use surfrec_core::{Channel, Propensity};

    fn reversible(k_forward: f64, k_reverse: f64) -> Vec<ReactionEvent> {
        vec![
            ReactionEvent::new(Channel::BasicForward, Propensity::FirstOrder(0), k_forward, 2)
                .with_change(0, -1.0)
                .with_change(1, 1.0),
            ReactionEvent::new(Channel::BasicReverse, Propensity::FirstOrder(1), k_reverse, 2)
                .with_change(1, -1.0)
                .with_change(0, 1.0),
        ]
    }

    #[test]
    fn spec_step_count() {
        assert_eq!(OdeSpec::new(0.1, 1.0).n_steps(), 10);
        assert_eq!(OdeSpec::new(0.3, 1.0).n_steps(), 4);
        assert_eq!(OdeSpec::new(0.1, 0.0).n_steps(), 0);
        assert_eq!(OdeSpec::new(0.1, 1.0).with_stride(0).save_stride, 1);
    }

    #[test]
    fn derivative_sums_channels() {
        let events = reversible(2.0, 1.0);
        let ode = MeanFieldIntegrator::new(&events, 2).unwrap();
        let dx = ode.derivative(&State::new(vec![3.0, 4.0]));
        // -2*3 + 1*4, +2*3 - 1*4
        assert_relative_eq!(dx[0], -2.0);
        assert_relative_eq!(dx[1], 2.0);
    }

    #[test]
    fn relaxes_to_equilibrium() {
        let (kf, kr) = (2.0, 1.0);
        let events = reversible(kf, kr);
        let ode = MeanFieldIntegrator::new(&events, 2).unwrap();
        let spec = OdeSpec::new(1e-3, 1.0).with_stride(100);
        let traj = ode.integrate(State::new(vec![90.0, 0.0]), &spec).unwrap();

        // A(t) = A_eq + (A0 - A_eq) exp(-(kf + kr) t)
        let a_eq = 90.0 * kr / (kf + kr);
        let exact = a_eq + (90.0 - a_eq) * (-(kf + kr) * 1.0f64).exp();
        let last = traj.final_state().unwrap();
        assert_relative_eq!(last[0], exact, max_relative = 1e-8);
        assert_relative_eq!(last[0] + last[1], 90.0, max_relative = 1e-12);
        assert_relative_eq!(traj.final_time().unwrap(), 1.0);
        // initial + 10 strided snapshots
        assert_eq!(traj.len(), 11);
        assert_eq!(traj.snapshots[0].propensities, vec![0.0, 0.0]);
    }

    #[test]
    fn final_partial_step_lands_on_stop_time() {
        let events = reversible(1.0, 1.0);
        let ode = MeanFieldIntegrator::new(&events, 2).unwrap();
        let traj = ode
            .integrate(State::new(vec![1.0, 0.0]), &OdeSpec::new(0.3, 1.0))
            .unwrap();
        let times: Vec<f64> = traj.times().collect();
        assert_eq!(times.len(), 5);
        assert_relative_eq!(times[4], 1.0);
        assert!(times.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn invalid_step_rejected() {
        let events = reversible(1.0, 1.0);
        let ode = MeanFieldIntegrator::new(&events, 2).unwrap();
        assert_eq!(
            ode.integrate(State::zeros(2), &OdeSpec::new(0.0, 1.0)).unwrap_err(),
            SimulationError::InvalidStep(0.0)
        );
    }
}
