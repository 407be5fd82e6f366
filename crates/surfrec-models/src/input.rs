use crate::catalog::Selection;
use crate::composer::{ComposedNetwork, EventComposer};
use crate::error::ConfigError;
use crate::params::ParameterStream;
use crate::species::SpeciesIndex;
use surfrec_core::{State, Time};

/// A fully validated invocation: reactions, parameter stream, initial
/// populations and stop time.
#[derive(Clone, Debug)]
pub struct RunInput {
    pub selection: Selection,
    pub species: SpeciesIndex,
    pub parameters: ParameterStream,
    pub initial: State,
    pub t_stop: Time,
}

impl RunInput {
    /// Splits positional tokens: leading non-numeric tokens name reactions,
    /// everything after the first number must be numeric.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ConfigError> {
        let split = tokens
            .iter()
            .position(|t| t.as_ref().trim().parse::<f64>().is_ok())
            .unwrap_or(tokens.len());
        let (names, numeric) = tokens.split_at(split);
        let numbers = numeric
            .iter()
            .map(|t| {
                t.as_ref()
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidNumber(t.as_ref().to_string()))
            })
            .collect::<Result<Vec<f64>, _>>()?;
        Self::from_numbers(names, &numbers)
    }

    /// Lays `numbers` out as: shared parameters and rate constants, one
    /// population per used species (canonical order), stop time.
    pub fn from_numbers<S: AsRef<str>>(names: &[S], numbers: &[f64]) -> Result<Self, ConfigError> {
        let selection = Selection::parse(names)?;
        let species = selection.species();

        let expected = selection.required_numeric_count();
        if numbers.len() < expected {
            return Err(ConfigError::NotEnoughArguments {
                expected,
                received: numbers.len(),
            });
        }
        if numbers.len() > expected {
            return Err(ConfigError::TooManyArguments {
                expected,
                received: numbers.len(),
            });
        }
        if let Some(bad) = numbers.iter().find(|x| !x.is_finite()) {
            return Err(ConfigError::InvalidNumber(bad.to_string()));
        }

        let n_stream = selection.stream_length();
        let (stream, rest) = numbers.split_at(n_stream);
        let (populations, stop) = rest.split_at(species.len());

        if let Some(&value) = populations.iter().find(|&&x| x < 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "initial population",
                value,
                reason: "must be non-negative",
            });
        }
        let t_stop = stop[0];
        if t_stop < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "t_stop",
                value: t_stop,
                reason: "must be non-negative",
            });
        }

        Ok(Self {
            selection,
            species,
            parameters: ParameterStream::new(stream.to_vec()),
            initial: State::new(populations.to_vec()),
            t_stop,
        })
    }

    pub fn compose(&mut self) -> Result<ComposedNetwork, ConfigError> {
        EventComposer::new(&self.selection, &self.species).compose(&mut self.parameters, &self.initial)
    }
}
