//! Client identity, token claims, and the token state held by a client.

pub mod claims;
pub mod identity;
pub mod token;

pub use claims::*;
pub use identity::*;
pub use token::{secret::*, state::*};
