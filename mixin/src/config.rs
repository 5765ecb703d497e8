//! Mixin engine configuration.

use serde::{Deserialize, Serialize};

/// Behavior of [`crate::MixinEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixinConfig {
    /// Create auto-created items of an added mixin that the node lacks.
    pub materialize_auto_created: bool,
}

impl Default for MixinConfig {
    fn default() -> Self {
        Self {
            materialize_auto_created: true,
        }
    }
}
