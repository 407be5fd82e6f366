use thiserror::Error;

/// Invalid run configuration. Always raised before any event fires.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no reactions specified")]
    EmptySelection,

    #[error("unknown reaction: {0}")]
    UnknownReaction(String),

    #[error("reaction listed more than once: {0}")]
    DuplicateReaction(String),

    #[error("reaction '{reaction}' requires species {species}, which is not in the initial state")]
    MissingSpecies { reaction: String, species: String },

    #[error("not enough numeric parameters provided: expected {expected}, got {received}")]
    NotEnoughArguments { expected: usize, received: usize },

    #[error("too many numeric parameters provided: expected {expected}, got {received}")]
    TooManyArguments { expected: usize, received: usize },

    #[error("parameter stream exhausted: expected {expected} values, received {received}")]
    StreamUnderrun { expected: usize, received: usize },

    #[error("initial state has {received} populations but {expected} species are in use")]
    InitialStateLength { expected: usize, received: usize },

    #[error("shared parameter(s) {0} not available to this reaction")]
    MissingSharedParameter(&'static str),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}
