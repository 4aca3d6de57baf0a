//! Application layer for AgroVision.
//!
//! Coordinates the domain ports: the history service, the scan state
//! machine, the UI-facing app surface and the composition root.

pub mod app;
pub mod bootstrap;
pub mod history_store;
pub mod scan_session;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use app::AgroVisionApp;
pub use bootstrap::AppBootstrap;
pub use history_store::HistoryStore;
pub use scan_session::{ScanSession, ScanState};
pub use telemetry::{init_tracing, init_tracing_for};
