//! Envelope smoothing of band values

pub mod smoother;

pub use smoother::{EnvelopeSmoother, EnvelopeState, SmootherConfig};
