//! Connection handshake and session housekeeping.

pub mod cancel;
pub mod importer;
pub mod log_capture;
pub mod negotiator;
pub mod orchestrator;
pub mod poller;
pub mod sessions;
