//! Fetch request state machine
//!
//! States: idle -> fetching -> loaded | error. `Clear` returns to idle from
//! anywhere. Every `Fetch` and `Clear` bumps the generation; a response is
//! only applied if its generation is still current.

use serde::{Deserialize, Serialize};

use crate::data::MacroRecords;
use crate::error::FetchError;

/// Events accepted by the fetch service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FetchEvent {
    /// Start a request
    Fetch,
    /// Drop cached data and cancel any request
    Clear,
}

impl std::fmt::Display for FetchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchEvent::Fetch => write!(f, "FETCH"),
            FetchEvent::Clear => write!(f, "CLEAR"),
        }
    }
}

/// Machine state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// No request made since creation or the last clear
    #[default]
    Idle,
    /// A request is in flight
    Fetching,
    /// The last request succeeded
    Loaded,
    /// The last request failed
    Error,
}

/// Data observed by subscribers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchContext {
    /// A request is in flight
    pub is_fetching: bool,
    /// The last request failed
    pub is_error: bool,
    /// Last successful response; survives later failures
    pub data: Option<MacroRecords>,
    /// Message of the last failure
    pub error: Option<String>,
}

/// Snapshot of the machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchState {
    /// Machine state
    pub status: FetchStatus,
    /// Observed data
    pub context: FetchContext,
    /// Generation of the most recent `Fetch` or `Clear`
    pub generation: u64,
}

impl FetchState {
    /// Apply a user event
    pub fn transition(&self, event: FetchEvent) -> FetchState {
        let generation = self.generation + 1;
        match event {
            FetchEvent::Fetch => FetchState {
                status: FetchStatus::Fetching,
                context: FetchContext {
                    is_fetching: true,
                    is_error: false,
                    data: self.context.data.clone(),
                    error: None,
                },
                generation,
            },
            FetchEvent::Clear => FetchState {
                status: FetchStatus::Idle,
                context: FetchContext::default(),
                generation,
            },
        }
    }

    /// Apply the response of request `generation`
    ///
    /// Returns `None` when the response is stale or no request is in flight.
    pub(crate) fn resolve(
        &self,
        generation: u64,
        outcome: Result<MacroRecords, FetchError>,
    ) -> Option<FetchState> {
        if generation != self.generation || self.status != FetchStatus::Fetching {
            return None;
        }

        Some(match outcome {
            Ok(records) => FetchState {
                status: FetchStatus::Loaded,
                context: FetchContext {
                    is_fetching: false,
                    is_error: false,
                    data: Some(records),
                    error: None,
                },
                generation,
            },
            Err(err) => FetchState {
                status: FetchStatus::Error,
                context: FetchContext {
                    is_fetching: false,
                    is_error: true,
                    data: self.context.data.clone(),
                    error: Some(err.to_string()),
                },
                generation,
            },
        })
    }
}
