//! Wire types for the agent service.

pub mod agent;
mod lenient;
pub mod message;
pub mod run;
pub mod step;

pub use agent::*;
pub use message::*;
pub use run::*;
pub use step::*;
