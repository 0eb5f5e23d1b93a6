//! Fetching and outcome selection.
//!
//! A [`Fetcher`] performs one attempt and yields `Ok(())` or a [`FetchError`].
//! The simulated fetcher delegates the choice of outcome to an
//! [`OutcomeSelector`] so the choice can be seeded or scripted.

pub mod outcome;
pub mod selector;
pub mod simulated;

use async_trait::async_trait;

use crate::error::FetchError;

pub use outcome::OutcomeKind;
pub use selector::{OutcomeSelector, ScriptedSelector, SeededSelector};
pub use simulated::SimulatedFetcher;

/// The result of one fetch attempt.
pub type FetchOutcome = Result<(), FetchError>;

/// Something that can attempt to fetch remote data.
#[async_trait]
pub trait Fetcher: Send {
    /// Performs a single attempt.
    async fn fetch(&mut self) -> FetchOutcome;
}
