// ABOUTME: Client side of Flowcraft: application state and the remote store client
// ABOUTME: Owns the cached collections, the optimistic status mutator, and the local event log

pub mod error;
pub mod http;
pub mod remote;
pub mod store;
pub mod telemetry;

pub use error::{ClientError, ClientResult};
pub use http::HttpRemote;
pub use remote::Remote;
pub use store::{AppStore, MutationOutcome, MutationPhase};
pub use telemetry::{EventLog, TelemetryEvent, MAX_EVENTS};
