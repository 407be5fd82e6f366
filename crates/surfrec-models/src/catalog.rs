use crate::error::ConfigError;
use crate::species::{Species, SpeciesIndex};

/// Identity of a catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Basic,
    Physisorption,
    Chemisorption,
    SurfaceDiffusion,
    LangmuirHinshelwood,
}

/// Static description of one selectable reaction.
#[derive(Debug)]
pub struct ReactionModule {
    pub kind: ModuleKind,
    pub name: &'static str,
    pub required_species: &'static [Species],
    /// Parameters the module reads when nothing is shared with it.
    pub nominal_parameters: usize,
    pub parameter_names: &'static [&'static str],
}

pub static CATALOG: [ReactionModule; 5] = [
    ReactionModule {
        kind: ModuleKind::Basic,
        name: "Basic",
        required_species: &[Species::A, Species::B],
        nominal_parameters: 2,
        parameter_names: &["kA", "kB"],
    },
    ReactionModule {
        kind: ModuleKind::Physisorption,
        name: "Physisorption",
        required_species: &[Species::A, Species::Fv, Species::Af],
        nominal_parameters: 3,
        parameter_names: &["k1", "vd", "Ed"],
    },
    ReactionModule {
        kind: ModuleKind::Chemisorption,
        name: "Chemisorption",
        required_species: &[Species::A, Species::Sv, Species::As, Species::A2],
        nominal_parameters: 3,
        parameter_names: &["k3", "k4", "Er"],
    },
    ReactionModule {
        kind: ModuleKind::SurfaceDiffusion,
        name: "Surface Diffusion",
        required_species: &[Species::Af, Species::Sv, Species::Fv, Species::As],
        nominal_parameters: 2,
        parameter_names: &["vD", "ED"],
    },
    ReactionModule {
        kind: ModuleKind::LangmuirHinshelwood,
        name: "Langmuir-Hinshelwood recombination",
        required_species: &[Species::Af, Species::As, Species::Fv, Species::Sv, Species::A2],
        nominal_parameters: 5,
        parameter_names: &["vD", "ED", "k4", "Er", "ELHF"],
    },
];

/// Shared wall temperature, gas temperature and molar mass.
pub const SHARED_PARAMETER_COUNT: usize = 3;

pub fn lookup(name: &str) -> Option<&'static ReactionModule> {
    CATALOG.iter().find(|m| m.name == name)
}

pub fn module(kind: ModuleKind) -> &'static ReactionModule {
    match kind {
        ModuleKind::Basic => &CATALOG[0],
        ModuleKind::Physisorption => &CATALOG[1],
        ModuleKind::Chemisorption => &CATALOG[2],
        ModuleKind::SurfaceDiffusion => &CATALOG[3],
        ModuleKind::LangmuirHinshelwood => &CATALOG[4],
    }
}

/// Which Langmuir-Hinshelwood parameters come from co-selected modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LhSharing {
    /// Reads vD, ED, k4, Er, ELHF.
    Standalone,
    /// Reads vD, ED, ELHF; k4 and Er come from Chemisorption.
    WithChemisorption,
    /// Reads k4, Er, ELHF; vD and ED come from Surface Diffusion.
    WithSurfaceDiffusion,
    /// Reads ELHF only.
    WithBoth,
}

impl LhSharing {
    pub fn new(chemisorption: bool, surface_diffusion: bool) -> Self {
        match (chemisorption, surface_diffusion) {
            (false, false) => LhSharing::Standalone,
            (true, false) => LhSharing::WithChemisorption,
            (false, true) => LhSharing::WithSurfaceDiffusion,
            (true, true) => LhSharing::WithBoth,
        }
    }

    pub fn reads_diffusion(&self) -> bool {
        matches!(self, LhSharing::Standalone | LhSharing::WithChemisorption)
    }

    pub fn reads_recombination(&self) -> bool {
        matches!(self, LhSharing::Standalone | LhSharing::WithSurfaceDiffusion)
    }

    /// Names of the values LH reads itself, in stream order.
    pub fn parameter_names(&self) -> Vec<&'static str> {
        let names = module(ModuleKind::LangmuirHinshelwood).parameter_names;
        let mut own = Vec::with_capacity(5);
        if self.reads_diffusion() {
            own.extend_from_slice(&names[0..2]);
        }
        if self.reads_recombination() {
            own.extend_from_slice(&names[2..4]);
        }
        own.push(names[4]);
        own
    }

    pub fn parameter_count(&self) -> usize {
        1 + 2 * self.reads_diffusion() as usize + 2 * self.reads_recombination() as usize
    }
}

/// Ordered, validated list of reactions requested for a run.
#[derive(Clone, Debug)]
pub struct Selection {
    modules: Vec<&'static ReactionModule>,
}

impl Selection {
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, ConfigError> {
        if names.is_empty() {
            return Err(ConfigError::EmptySelection);
        }
        let mut modules: Vec<&'static ReactionModule> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let module = lookup(name).ok_or_else(|| ConfigError::UnknownReaction(name.to_string()))?;
            if modules.iter().any(|m| m.kind == module.kind) {
                return Err(ConfigError::DuplicateReaction(name.to_string()));
            }
            modules.push(module);
        }
        Ok(Self { modules })
    }

    pub fn modules(&self) -> &[&'static ReactionModule] {
        &self.modules
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name).collect()
    }

    pub fn contains(&self, kind: ModuleKind) -> bool {
        self.modules.iter().any(|m| m.kind == kind)
    }

    pub fn is_basic_only(&self) -> bool {
        self.modules.iter().all(|m| m.kind == ModuleKind::Basic)
    }

    /// True when Tw, Tg and M head the parameter stream.
    pub fn needs_shared_parameters(&self) -> bool {
        !self.is_basic_only()
    }

    pub fn lh_sharing(&self) -> LhSharing {
        LhSharing::new(
            self.contains(ModuleKind::Chemisorption),
            self.contains(ModuleKind::SurfaceDiffusion),
        )
    }

    /// Parameters `kind` actually consumes, given the rest of the selection.
    pub fn effective_parameter_count(&self, kind: ModuleKind) -> usize {
        match kind {
            ModuleKind::LangmuirHinshelwood => self.lh_sharing().parameter_count(),
            other => module(other).nominal_parameters,
        }
    }

    pub fn effective_parameter_names(&self, kind: ModuleKind) -> Vec<&'static str> {
        match kind {
            ModuleKind::LangmuirHinshelwood => self.lh_sharing().parameter_names(),
            other => module(other).parameter_names.to_vec(),
        }
    }

    /// Length of the parameter stream: shared parameters plus per-module constants.
    pub fn stream_length(&self) -> usize {
        let shared = if self.needs_shared_parameters() { SHARED_PARAMETER_COUNT } else { 0 };
        shared
            + self
                .modules
                .iter()
                .map(|m| self.effective_parameter_count(m.kind))
                .sum::<usize>()
    }

    /// Union of required species in canonical order.
    pub fn species(&self) -> SpeciesIndex {
        SpeciesIndex::from_used(
            self.modules
                .iter()
                .flat_map(|m| m.required_species.iter().copied()),
        )
    }

    /// Numeric tokens an invocation must supply: stream, one population per
    /// species and the stop time.
    pub fn required_numeric_count(&self) -> usize {
        self.stream_length() + self.species().len() + 1
    }
}
