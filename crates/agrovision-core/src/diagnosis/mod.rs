//! Diagnosis domain module.
//!
//! - `model`: the structured diagnosis returned by the inference service
//! - `service`: the port through which a diagnosis is requested

mod model;
mod service;

pub use model::{Diagnosis, DiagnosisStatus, Recommendations};
pub use service::DiagnosisService;
