use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EntityId;

/// An organism. Used as a search restriction, never searched for itself.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct Taxon {
    pub id: EntityId,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub common_name: Option<String>,
}

impl Taxon {
    /// Scientific and common names that are set and non-blank.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        [self.scientific_name.as_deref(), self.common_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|n| !n.trim().is_empty())
    }
}
