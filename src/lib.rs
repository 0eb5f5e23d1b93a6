//! fetch-dispatch - simulated remote fetch with rate-limit aware dispatch
//!
//! This library exposes the fetch, classification and dispatch modules for
//! integration testing and reuse.

pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod settings;
pub mod timeout;

pub use dispatch::{DispatchError, DispatchReport, DispatchStatus, Dispatcher};
pub use error::FetchError;
pub use fetch::{
    Fetcher, OutcomeKind, OutcomeSelector, ScriptedSelector, SeededSelector, SimulatedFetcher,
};
pub use settings::FetchConfig;
pub use timeout::TimeoutFetcher;
