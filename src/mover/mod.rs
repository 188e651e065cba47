//! Artifact filtering, destination lookup and the file move itself

pub mod executor;
pub mod filter;
pub mod locator;
pub mod outcome;

pub use executor::{MoveExecutor, RelativeName, RelocateError};
pub use filter::is_artifact;
pub use locator::{DestinationLocator, LocateError};
pub use outcome::{MoveOutcome, MoveStatus, RunSummary};
