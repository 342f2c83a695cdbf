//! Public types for the SpecDrafter API.

mod chunk;
mod message;
mod project;

pub use chunk::Chunk;
pub use message::{Auxiliary, Message, Role};
pub use project::{Project, ProjectUpdate};
