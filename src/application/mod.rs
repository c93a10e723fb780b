//! Application layer: game rounds and document persistence
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod game;
pub mod services;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use game::{play_round, Outcome, Round};
pub use session::{run_session, SessionSummary};
