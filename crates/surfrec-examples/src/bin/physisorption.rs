use surfrec_core::EventRng;
use surfrec_models::{RunInput, Species};
use surfrec_sampler::Sampler;

fn main() {
    // Tw, Tg, M | k1, vd, Ed | A, Af, Fv | t_stop
    let tokens = [
        "Physisorption", "300", "500", "0.016", "1", "1e13", "20000", "1000", "0", "1000", "1e-9",
    ];
    let mut input = RunInput::from_tokens(&tokens).unwrap();
    let network = input.compose().unwrap();

    println!("Physisorption on {} free sites", input.initial[2]);
    for event in &network.events {
        println!("  {:<14} k = {:e}", event.channel.equation(), event.k);
    }
    println!();

    let af = network.species.position(Species::Af).unwrap();
    let sampler = Sampler::new(&network.events, network.n_species()).unwrap();

    for seed in 0..5u64 {
        let mut rng = EventRng::new(seed);
        let outcome = sampler.run(input.initial.clone(), input.t_stop, &mut rng).unwrap();
        let last = outcome.trajectory.final_state().unwrap();
        println!(
            "Seed {}: {} events, Af = {}, coverage = {:.3}",
            seed,
            outcome.trajectory.n_steps(),
            last[af],
            last[af] / input.initial[2]
        );
    }
}
