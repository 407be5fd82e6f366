use approx::assert_relative_eq;
use surfrec_core::{EventRng, State};
use surfrec_models::{RunInput, Species};
use surfrec_sampler::{MeanFieldIntegrator, OdeSpec, Sampler, TerminationReason};

#[test]
fn empty_basic_network_stops_immediately() {
    let mut input = RunInput::from_tokens(&["Basic", "1", "1", "0", "0", "10"]).unwrap();
    let network = input.compose().unwrap();
    let sampler = Sampler::new(&network.events, network.n_species()).unwrap();
    let outcome = sampler
        .run(input.initial.clone(), input.t_stop, &mut EventRng::new(7))
        .unwrap();

    assert_eq!(outcome.termination, TerminationReason::NoReactionPossible);
    assert_eq!(outcome.trajectory.len(), 1);
    assert_eq!(outcome.trajectory.snapshots[0].time, 0.0);
    assert_eq!(outcome.trajectory.snapshots[0].propensities, vec![0.0, 0.0]);
}

#[test]
fn physisorption_conserves_atoms_and_sites() {
    // species order: A, Af, Fv
    let tokens = [
        "Physisorption", "300", "500", "0.016", "1", "1e13", "20000", "60", "0", "40", "1e-5",
    ];
    let mut input = RunInput::from_tokens(&tokens).unwrap();
    let network = input.compose().unwrap();
    let a = network.species.position(Species::A).unwrap();
    let af = network.species.position(Species::Af).unwrap();
    let fv = network.species.position(Species::Fv).unwrap();

    let sampler = Sampler::new(&network.events, network.n_species()).unwrap();
    let outcome = sampler
        .run(input.initial.clone(), input.t_stop, &mut EventRng::new(11))
        .unwrap();
    let snapshots = &outcome.trajectory.snapshots;

    assert!(outcome.trajectory.n_steps() > 10);
    assert_eq!(outcome.clamped_steps, 0);
    for snap in snapshots {
        assert_eq!(snap.state[a] + snap.state[af], 60.0);
        assert_eq!(snap.state[fv] + snap.state[af], 40.0);
        assert!(snap.time <= input.t_stop);
    }

    for pair in snapshots.windows(2) {
        assert!(pair[1].time > pair[0].time);
        let step: Vec<f64> = pair[1]
            .state
            .iter()
            .zip(pair[0].state.iter())
            .map(|(after, before)| after - before)
            .collect();
        assert!(
            network.events.iter().any(|e| e.delta == step),
            "step {:?} is not a single event",
            step
        );
        assert_eq!(pair[1].propensities.len(), network.n_events());
    }
}

#[test]
fn full_network_stays_non_negative() {
    let names = [
        "Langmuir-Hinshelwood recombination",
        "Surface Diffusion",
        "Chemisorption",
        "Physisorption",
    ];
    let numbers = [
        // stream follows the listed order
        200.0, 500.0, 0.016, // Tw, Tg, M
        17.5e3, // ELHF
        1e13, 15e3, // Surface Diffusion
        1.0, 1.0, 17.5e3, // Chemisorption
        1.0, 1e15, 30e3, // Physisorption
        25.0, 0.0, 0.0, 20.0, 8.0, 0.0, // A, Af, As, Fv, Sv, A2
        5e-4,
    ];
    let mut input = RunInput::from_numbers(&names, &numbers).unwrap();
    let network = input.compose().unwrap();
    assert_eq!(network.n_events(), 7);

    let sampler = Sampler::new(&network.events, network.n_species()).unwrap();
    let outcome = sampler
        .run(input.initial.clone(), input.t_stop, &mut EventRng::new(99))
        .unwrap();

    for snap in &outcome.trajectory.snapshots {
        assert!(snap.state.is_non_negative(), "negative population at t={}", snap.time);
    }
    let last = outcome.trajectory.final_time().unwrap();
    assert!(last <= input.t_stop);
}

#[test]
fn ssa_mean_follows_rate_equations() {
    let (kf, kr, a0, t_stop) = (1.0, 1.0, 1000.0, 0.5);
    let tokens = ["Basic", "1", "1", "1000", "0", "0.5"];
    let mut input = RunInput::from_tokens(&tokens).unwrap();
    let network = input.compose().unwrap();

    let ode = MeanFieldIntegrator::new(&network.events, network.n_species()).unwrap();
    let mean_field = ode
        .integrate(input.initial.clone(), &OdeSpec::new(1e-3, t_stop))
        .unwrap();
    let ode_a = mean_field.final_state().unwrap()[0];
    let exact = a0 * (kr + kf * (-(kf + kr) * t_stop).exp()) / (kf + kr);
    assert_relative_eq!(ode_a, exact, max_relative = 1e-9);

    let sampler = Sampler::new(&network.events, network.n_species()).unwrap();
    let n_runs = 50;
    let mut rng = EventRng::new(42);
    let mut total = 0.0;
    for _ in 0..n_runs {
        let outcome = sampler.run(input.initial.clone(), t_stop, &mut rng).unwrap();
        let state: &State = outcome.trajectory.final_state().unwrap();
        assert_eq!(state[0] + state[1], a0);
        total += state[0];
    }
    let ssa_a = total / n_runs as f64;
    println!("SSA mean A = {:.2}, rate equations A = {:.2}", ssa_a, ode_a);
    assert_relative_eq!(ssa_a, ode_a, max_relative = 0.05);
}
