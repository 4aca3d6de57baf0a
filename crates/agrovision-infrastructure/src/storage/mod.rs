//! Low-level file storage primitives.

pub mod atomic_json;

pub use atomic_json::{AtomicJsonError, AtomicJsonFile};
