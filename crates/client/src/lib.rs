//! Client side of the generation service: an HTTP binding for the
//! `start`/`status` actions and a poller that turns a submission into
//! finished course materials.

pub mod api;
pub mod poller;

pub use api::{ApiError, GenerationApi, HttpGenerationApi, RemoteStatus, StartResponse, StatusResponse};
pub use poller::{PollError, Poller, PollerConfig, ProgressUpdate};
