//! Navigable screens of the application.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppView {
    #[default]
    Dashboard,
    Scan,
    Result,
    History,
}
