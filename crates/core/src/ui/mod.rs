//! Form state machine shared by the web page and the CLI.

pub mod session;
pub mod state;
pub mod ticker;

pub use session::{Session, Submission};
pub use state::{FormState, Phase, SubmitError};
