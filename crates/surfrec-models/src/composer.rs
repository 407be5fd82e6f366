use crate::catalog::{ModuleKind, ReactionModule, Selection};
use crate::error::ConfigError;
use crate::params::ParameterStream;
use crate::species::{Species, SpeciesIndex};
use log::{debug, warn};
use serde::{Serialize, Deserialize};
use surfrec_core::physics;
use surfrec_core::{Channel, Propensity, ReactionEvent, State};

/// Wall temperature (K), gas temperature (K) and molar mass (kg/mol).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SharedParameters {
    pub wall_temperature: f64,
    pub gas_temperature: f64,
    pub molar_mass: f64,
}

impl SharedParameters {
    pub fn new(wall_temperature: f64, gas_temperature: f64, molar_mass: f64) -> Result<Self, ConfigError> {
        for (name, value) in [("Tw", wall_temperature), ("Tg", gas_temperature), ("M", molar_mass)] {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    value,
                    reason: "must be positive",
                });
            }
        }
        Ok(Self { wall_temperature, gas_temperature, molar_mass })
    }
}

/// Surface hopping frequency vD and barrier ED.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffusionRates {
    pub v_d: f64,
    pub e_d: f64,
}

/// Recombination prefactor k4 and barrier Er.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecombinationRates {
    pub k4: f64,
    pub e_r: f64,
}

/// Values shared between modules of one run.
///
/// Filled while the parameter stream is read; the Langmuir-Hinshelwood module
/// takes whatever it does not read itself from here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    pub shared: Option<SharedParameters>,
    /// Initial population of A, 0 when A is not in use.
    pub initial_a: f64,
    /// Donated by Surface Diffusion.
    pub diffusion: Option<DiffusionRates>,
    /// Donated by Chemisorption.
    pub recombination: Option<RecombinationRates>,
}

impl RunContext {
    /// phi_O = 0.25 * v_mean(Tg, M) * A0; zero without shared parameters.
    pub fn incident_flux(&self) -> f64 {
        self.shared
            .map(|s| physics::incident_flux(s.gas_temperature, s.molar_mass, self.initial_a))
            .unwrap_or(0.0)
    }

    fn arrhenius(&self, prefactor: f64, energy: f64) -> Result<f64, ConfigError> {
        let shared = self
            .shared
            .ok_or(ConfigError::MissingSharedParameter("Tw"))?;
        Ok(physics::arrhenius(prefactor, energy, shared.wall_temperature))
    }
}

/// Parameters of one module as read from the stream.
#[derive(Clone, Copy, Debug, PartialEq)]
enum ModuleParameters {
    Basic { k_forward: f64, k_reverse: f64 },
    Physisorption { k1: f64, v_d: f64, e_d: f64 },
    Chemisorption { k3: f64, recombination: RecombinationRates },
    SurfaceDiffusion { diffusion: DiffusionRates },
    LangmuirHinshelwood {
        diffusion: Option<DiffusionRates>,
        recombination: Option<RecombinationRates>,
        e_lhf: f64,
    },
}

/// Events composed for one run together with the context that produced them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComposedNetwork {
    pub species: SpeciesIndex,
    pub events: Vec<ReactionEvent>,
    pub context: RunContext,
}

impl ComposedNetwork {
    pub fn n_events(&self) -> usize {
        self.events.len()
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Rate constant of the first event on `channel`, if composed.
    pub fn rate_constant(&self, channel: Channel) -> Option<f64> {
        self.events.iter().find(|e| e.channel == channel).map(|e| e.k)
    }
}

/// Turns a reaction selection and its parameter stream into concrete events.
pub struct EventComposer<'a> {
    selection: &'a Selection,
    species: &'a SpeciesIndex,
}

impl<'a> EventComposer<'a> {
    pub fn new(selection: &'a Selection, species: &'a SpeciesIndex) -> Self {
        Self { selection, species }
    }

    /// Reads every module's parameters, then builds the events.
    ///
    /// All validation happens before the first event is built.
    pub fn compose(
        &self,
        stream: &mut ParameterStream,
        initial: &State,
    ) -> Result<ComposedNetwork, ConfigError> {
        stream.ensure_remaining(self.selection.stream_length())?;

        if initial.dim() != self.species.len() {
            return Err(ConfigError::InitialStateLength {
                expected: self.species.len(),
                received: initial.dim(),
            });
        }
        for module in self.selection.modules() {
            if let Some(missing) = module
                .required_species
                .iter()
                .find(|sp| !self.species.contains(**sp))
            {
                return Err(ConfigError::MissingSpecies {
                    reaction: module.name.to_string(),
                    species: missing.to_string(),
                });
            }
        }

        let mut context = RunContext {
            initial_a: self
                .species
                .position(Species::A)
                .map(|i| initial[i])
                .unwrap_or(0.0),
            ..RunContext::default()
        };

        if self.selection.needs_shared_parameters() && !self.species.contains(Species::A) {
            warn!("species A not in use; incident flux is zero");
        }

        // Pass 1: consume the stream in selection order. Tw, Tg and M come
        // right before the first non-Basic module's own constants.
        let mut parameters = Vec::with_capacity(self.selection.modules().len());
        for module in self.selection.modules() {
            if module.kind != ModuleKind::Basic && context.shared.is_none() {
                let [tw, tg, m] = stream.take::<3>()?;
                context.shared = Some(SharedParameters::new(tw, tg, m)?);
                debug!("shared parameters Tw={} Tg={} M={}", tw, tg, m);
            }
            let before = stream.consumed();
            parameters.push((*module, self.read_parameters(module, stream, &mut context)?));
            let names = self.selection.effective_parameter_names(module.kind);
            let values = stream.window(before);
            debug!(
                "{}: {}",
                module.name,
                names
                    .iter()
                    .zip(values)
                    .map(|(n, v)| format!("{}={}", n, v))
                    .collect::<Vec<_>>()
                    .join(" ")
            );
        }

        // Pass 2: every donor value is known now, whatever the order.
        let mut events = Vec::new();
        for (module, params) in parameters {
            self.build_events(module, params, &context, &mut events)?;
        }

        debug!(
            "composed {} events over {} species, phi_O = {:e}",
            events.len(),
            self.species.len(),
            context.incident_flux()
        );

        Ok(ComposedNetwork {
            species: self.species.clone(),
            events,
            context,
        })
    }

    fn read_parameters(
        &self,
        module: &ReactionModule,
        stream: &mut ParameterStream,
        context: &mut RunContext,
    ) -> Result<ModuleParameters, ConfigError> {
        let params = match module.kind {
            ModuleKind::Basic => {
                let [k_forward, k_reverse] = stream.take::<2>()?;
                ModuleParameters::Basic { k_forward, k_reverse }
            }
            ModuleKind::Physisorption => {
                let [k1, v_d, e_d] = stream.take::<3>()?;
                ModuleParameters::Physisorption { k1, v_d, e_d }
            }
            ModuleKind::Chemisorption => {
                let [k3, k4, e_r] = stream.take::<3>()?;
                let recombination = RecombinationRates { k4, e_r };
                context.recombination = Some(recombination);
                ModuleParameters::Chemisorption { k3, recombination }
            }
            ModuleKind::SurfaceDiffusion => {
                let [v_d, e_d] = stream.take::<2>()?;
                let diffusion = DiffusionRates { v_d, e_d };
                context.diffusion = Some(diffusion);
                ModuleParameters::SurfaceDiffusion { diffusion }
            }
            ModuleKind::LangmuirHinshelwood => {
                let sharing = self.selection.lh_sharing();
                debug!("Langmuir-Hinshelwood sharing mode {:?}", sharing);
                let diffusion = if sharing.reads_diffusion() {
                    let [v_d, e_d] = stream.take::<2>()?;
                    Some(DiffusionRates { v_d, e_d })
                } else {
                    None
                };
                let recombination = if sharing.reads_recombination() {
                    let [k4, e_r] = stream.take::<2>()?;
                    Some(RecombinationRates { k4, e_r })
                } else {
                    None
                };
                let e_lhf = stream.next_value()?;
                ModuleParameters::LangmuirHinshelwood {
                    diffusion,
                    recombination,
                    e_lhf,
                }
            }
        };
        Ok(params)
    }

    fn build_events(
        &self,
        module: &ReactionModule,
        params: ModuleParameters,
        context: &RunContext,
        events: &mut Vec<ReactionEvent>,
    ) -> Result<(), ConfigError> {
        let mut emit = Emitter {
            species: self.species,
            reaction: module.name,
            events,
        };
        let phi_o = context.incident_flux();

        match params {
            ModuleParameters::Basic { k_forward, k_reverse } => {
                let (a, b) = (emit.at(Species::A)?, emit.at(Species::B)?);
                emit.push(
                    Channel::BasicForward,
                    Propensity::FirstOrder(a),
                    k_forward,
                    &[(Species::A, -1.0), (Species::B, 1.0)],
                )?;
                emit.push(
                    Channel::BasicReverse,
                    Propensity::FirstOrder(b),
                    k_reverse,
                    &[(Species::B, -1.0), (Species::A, 1.0)],
                )?;
            }
            ModuleParameters::Physisorption { k1, v_d, e_d } => {
                let (a, fv, af) = (emit.at(Species::A)?, emit.at(Species::Fv)?, emit.at(Species::Af)?);
                emit.push(
                    Channel::Adsorption,
                    Propensity::Bimolecular(a, fv),
                    k1 * phi_o,
                    &[(Species::A, -1.0), (Species::Fv, -1.0), (Species::Af, 1.0)],
                )?;
                emit.push(
                    Channel::ThermalDesorption,
                    Propensity::FirstOrder(af),
                    context.arrhenius(v_d, e_d)?,
                    &[(Species::Af, -1.0), (Species::A, 1.0), (Species::Fv, 1.0)],
                )?;
            }
            ModuleParameters::Chemisorption { k3, recombination } => {
                let (a, sv, as_) = (emit.at(Species::A)?, emit.at(Species::Sv)?, emit.at(Species::As)?);
                let p_r = context.arrhenius(recombination.k4, recombination.e_r)?;
                emit.push(
                    Channel::Chemisorption,
                    Propensity::Bimolecular(a, sv),
                    k3 * phi_o,
                    &[(Species::A, -1.0), (Species::Sv, -1.0), (Species::As, 1.0)],
                )?;
                emit.push(
                    Channel::EleyRideal,
                    Propensity::Bimolecular(a, as_),
                    p_r * k3 * phi_o,
                    &[
                        (Species::A, -1.0),
                        (Species::As, -1.0),
                        (Species::A2, 1.0),
                        (Species::Sv, 1.0),
                    ],
                )?;
            }
            ModuleParameters::SurfaceDiffusion { diffusion } => {
                let (af, sv) = (emit.at(Species::Af)?, emit.at(Species::Sv)?);
                emit.push(
                    Channel::SurfaceDiffusion,
                    Propensity::Bimolecular(af, sv),
                    0.75 * context.arrhenius(diffusion.v_d, diffusion.e_d)?,
                    &[
                        (Species::Af, -1.0),
                        (Species::Sv, -1.0),
                        (Species::Fv, 1.0),
                        (Species::As, 1.0),
                    ],
                )?;
            }
            ModuleParameters::LangmuirHinshelwood {
                diffusion,
                recombination,
                e_lhf,
            } => {
                let diffusion = diffusion
                    .or(context.diffusion)
                    .ok_or(ConfigError::MissingSharedParameter("vD, ED"))?;
                let recombination = recombination
                    .or(context.recombination)
                    .ok_or(ConfigError::MissingSharedParameter("k4, Er"))?;

                let tau_d = context.arrhenius(diffusion.v_d, diffusion.e_d)?;
                let p_r = context.arrhenius(recombination.k4, recombination.e_r)?;
                let p_rlh = context.arrhenius(recombination.k4, e_lhf)?;

                let (af, as_) = (emit.at(Species::Af)?, emit.at(Species::As)?);
                emit.push(
                    Channel::LangmuirHinshelwood,
                    Propensity::Bimolecular(af, as_),
                    tau_d * p_r,
                    &[
                        (Species::Af, -1.0),
                        (Species::As, -1.0),
                        (Species::A2, 1.0),
                        (Species::Sv, 1.0),
                        (Species::Fv, 1.0),
                    ],
                )?;
                emit.push(
                    Channel::LangmuirHinshelwoodHomodimer,
                    Propensity::Homodimer(af),
                    tau_d * p_rlh,
                    &[(Species::Af, -2.0), (Species::A2, 1.0), (Species::Fv, 2.0)],
                )?;
            }
        }
        Ok(())
    }
}

struct Emitter<'e> {
    species: &'e SpeciesIndex,
    reaction: &'static str,
    events: &'e mut Vec<ReactionEvent>,
}

impl Emitter<'_> {
    fn at(&self, species: Species) -> Result<usize, ConfigError> {
        self.species
            .position(species)
            .ok_or_else(|| ConfigError::MissingSpecies {
                reaction: self.reaction.to_string(),
                species: species.name().to_string(),
            })
    }

    fn push(
        &mut self,
        channel: Channel,
        propensity: Propensity,
        k: f64,
        changes: &[(Species, f64)],
    ) -> Result<(), ConfigError> {
        let mut event = ReactionEvent::new(channel, propensity, k, self.species.len());
        for &(species, change) in changes {
            event = event.with_change(self.at(species)?, change);
        }
        self.events.push(event);
        Ok(())
    }
}
