use crate::{Propensity, State};
use serde::{Serialize, Deserialize};

/// Physical reaction a composed event stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    BasicForward,
    BasicReverse,
    Adsorption,
    ThermalDesorption,
    Chemisorption,
    EleyRideal,
    SurfaceDiffusion,
    LangmuirHinshelwood,
    LangmuirHinshelwoodHomodimer,
}

impl Channel {
    pub fn equation(&self) -> &'static str {
        match self {
            Channel::BasicForward => "A -> B",
            Channel::BasicReverse => "B -> A",
            Channel::Adsorption => "A + Fv -> Af",
            Channel::ThermalDesorption => "Af -> A + Fv",
            Channel::Chemisorption => "A + Sv -> As",
            Channel::EleyRideal => "A + As -> A2 + Sv",
            Channel::SurfaceDiffusion => "Af + Sv -> Fv + As",
            Channel::LangmuirHinshelwood => "Af + As -> A2 + Sv + Fv",
            Channel::LangmuirHinshelwoodHomodimer => "2Af -> A2 + 2Fv",
        }
    }
}

/// One stochastic reaction channel: rate law, rate constant and
/// stoichiometric change. Immutable once composed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub channel: Channel,
    pub propensity: Propensity,
    pub k: f64,
    pub delta: Vec<f64>,
}

impl ReactionEvent {
    pub fn new(channel: Channel, propensity: Propensity, k: f64, n_species: usize) -> Self {
        Self {
            channel,
            propensity,
            k,
            delta: vec![0.0; n_species],
        }
    }

    /// Sets the population change of one species.
    pub fn with_change(mut self, species: usize, change: f64) -> Self {
        self.delta[species] = change;
        self
    }

    #[inline]
    pub fn rate(&self, state: &State) -> f64 {
        self.propensity.evaluate(state, self.k)
    }
}
