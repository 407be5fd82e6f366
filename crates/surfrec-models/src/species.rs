use serde::{Serialize, Deserialize};
use std::fmt;

/// Gas-phase and surface species of the recombination network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Gas-phase atom
    A,
    /// Product of the Basic test reaction
    B,
    /// Physisorbed atom
    Af,
    /// Chemisorbed atom
    As,
    /// Vacant physisorption site
    Fv,
    /// Vacant chemisorption site
    Sv,
    /// Recombined molecule
    A2,
}

impl Species {
    /// Canonical column order of populations in inputs and outputs.
    pub const CANONICAL: [Species; 7] = [
        Species::A,
        Species::B,
        Species::Af,
        Species::As,
        Species::Fv,
        Species::Sv,
        Species::A2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Species::A => "A",
            Species::B => "B",
            Species::Af => "Af",
            Species::As => "As",
            Species::Fv => "Fv",
            Species::Sv => "Sv",
            Species::A2 => "A2",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable mapping from species to positions in the population vector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesIndex {
    order: Vec<Species>,
}

impl SpeciesIndex {
    /// Builds the index from any set of species, keeping canonical order.
    pub fn from_used<I>(used: I) -> Self
    where
        I: IntoIterator<Item = Species>,
    {
        let used: Vec<Species> = used.into_iter().collect();
        let order = Species::CANONICAL
            .iter()
            .copied()
            .filter(|sp| used.contains(sp))
            .collect();
        Self { order }
    }

    pub fn position(&self, species: Species) -> Option<usize> {
        self.order.iter().position(|&sp| sp == species)
    }

    pub fn contains(&self, species: Species) -> bool {
        self.order.contains(&species)
    }

    pub fn species(&self) -> &[Species] {
        &self.order
    }

    pub fn names(&self) -> Vec<String> {
        self.order.iter().map(|sp| sp.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
