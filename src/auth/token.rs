//! Token material: redacting secrets and the immutable token state.

pub mod secret;
pub mod state;
