//! Domain layer: the question tree and its document format
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;

pub use arena::{NodeId, QuestionNode, QuestionTree};
pub use builder::TreeBuilder;
pub use entities::*;
pub use error::DomainError;
