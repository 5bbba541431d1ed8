use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::error;

/// A district of Bangladesh as used by the donor profile and search forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub id: String,
    pub name: String,
}

static DISTRICTS: LazyLock<Vec<District>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("districts.json")).unwrap_or_else(|e| {
        error!("Embedded district table is corrupt: {}", e);
        Vec::new()
    })
});

pub fn all() -> &'static [District] {
    &DISTRICTS
}

/// Resolve a district id (as stored on profiles) to its display name.
pub fn district_name(id: &str) -> Option<&'static str> {
    let id = id.trim();
    DISTRICTS
        .iter()
        .find(|d| d.id == id)
        .map(|d| d.name.as_str())
}
