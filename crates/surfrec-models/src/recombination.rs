use crate::composer::ComposedNetwork;
use crate::species::Species;
use serde::{Serialize, Deserialize};
use surfrec_core::{Channel, State};

/// Recombination probabilities per incident atom, by pathway.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecombinationCoefficients {
    /// Eley-Rideal: gas atom on a chemisorbed atom
    pub eley_rideal: f64,
    /// Langmuir-Hinshelwood between a physisorbed and a chemisorbed atom
    pub lh_heterogeneous: f64,
    /// Langmuir-Hinshelwood between two physisorbed atoms
    pub lh_homodimer: f64,
    pub total: f64,
}

impl RecombinationCoefficients {
    /// Evaluates the coefficients on `final_state`, normalised by the incident
    /// flux and the initial site densities S (Sv) and F (Fv):
    ///
    /// - gamma_ER  = 2 r_ER  As    S / (phi_O (S + F))
    /// - gamma_LHS = 2 r_LHS As Af S / (phi_O (S + F))
    /// - gamma_LHF = 2 r_LHF Af^2  F / (phi_O (S + F))
    ///
    /// Channels that were not composed contribute zero. Returns `None` when
    /// the flux or the site total is not positive.
    pub fn estimate(network: &ComposedNetwork, initial: &State, final_state: &State) -> Option<Self> {
        let phi_o = network.context.incident_flux();
        let value = |state: &State, species: Species| {
            network
                .species
                .position(species)
                .map(|i| state[i])
                .unwrap_or(0.0)
        };
        let s = value(initial, Species::Sv);
        let f = value(initial, Species::Fv);
        let norm = phi_o * (s + f);
        if !(phi_o > 0.0) || !(s + f > 0.0) {
            return None;
        }

        let a_s = value(final_state, Species::As);
        let a_f = value(final_state, Species::Af);
        let rate = |channel| network.rate_constant(channel).unwrap_or(0.0);

        let eley_rideal = 2.0 * rate(Channel::EleyRideal) * a_s * s / norm;
        let lh_heterogeneous = 2.0 * rate(Channel::LangmuirHinshelwood) * a_s * a_f * s / norm;
        let lh_homodimer = 2.0 * rate(Channel::LangmuirHinshelwoodHomodimer) * a_f * a_f * f / norm;

        Some(Self {
            eley_rideal,
            lh_heterogeneous,
            lh_homodimer,
            total: eley_rideal + lh_heterogeneous + lh_homodimer,
        })
    }
}
