//! Serializable engine configuration
//!
//! Copyright (c) 2025 Morph Team
//! Licensed under the Apache-2.0 license

use crate::chain::DEFAULT_TAG;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings accepted by [`Morpher::from_config`](crate::Morpher::from_config)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    /// Annotation key read from record fields
    pub tag: String,
    /// Extra directive names, each mapped to an existing transformer
    pub aliases: BTreeMap<String, String>,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            aliases: BTreeMap::new(),
        }
    }
}
