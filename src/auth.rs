//! Token values and the authorization pair shared between the pipeline and token providers.

pub mod authorization;
pub mod secret;

pub use authorization::*;
pub use secret::*;
