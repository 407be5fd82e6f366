pub mod state;
pub mod propensity;
pub mod event;
pub mod trajectory;
pub mod rng;
pub mod physics;

// Core types
pub type F = f64;
pub use state::{State, Time};
pub use rng::EventRng;

// Reaction channels
pub use propensity::Propensity;
pub use event::{Channel, ReactionEvent};

// Recorded output
pub use trajectory::{Snapshot, Trajectory};
