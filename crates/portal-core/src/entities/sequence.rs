use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entity_kind;
use super::platform::Platform;
use crate::enums::EntityId;

/// A biological sequence.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Sequence {
    pub id: EntityId,
    pub name: String,
}

entity_kind!(Sequence, Sequence);

/// A probe (composite sequence) on a platform.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Probe {
    pub id: EntityId,
    pub name: String,
    /// The platform carrying this probe. Index hits may arrive without it.
    #[serde(default)]
    pub platform: Option<Platform>,
}

entity_kind!(Probe, Probe);
