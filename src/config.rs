//! Runtime configuration.
//!
//! One [`ShadowConfig`] is handed to the [`UIManager`](crate::UIManager) at
//! construction. Every field has a default, so a JSON override only names
//! what it changes:
//!
//! ```
//! use spark_shadow::ShadowConfig;
//!
//! let config = ShadowConfig::from_json_str(r#"{ "point_scale_factor": 2.0 }"#).unwrap();
//! assert_eq!(config.point_scale_factor, 2.0);
//! assert_eq!(config.state_update_max_attempts, 1024);
//! ```

use serde::Deserialize;

use crate::error::Result;
use crate::mounting::CommitOptions;
use crate::types::{LayoutContext, Point};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub point_scale_factor: f32,
    pub swap_left_and_right_in_rtl: bool,
    pub font_size_multiplier: f32,
    /// Upper bound for [`UIManager::update_state_with_retry`](crate::UIManager::update_state_with_retry)
    /// when the caller does not pass one.
    pub state_update_max_attempts: usize,
    /// Entries kept by the paragraph measurement cache.
    pub text_measure_cache_size: usize,
    /// Reconcile stale state when a surface is completed.
    pub enable_state_reconciliation: bool,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            point_scale_factor: 1.0,
            swap_left_and_right_in_rtl: false,
            font_size_multiplier: 1.0,
            state_update_max_attempts: 1024,
            text_measure_cache_size: 256,
            enable_state_reconciliation: true,
        }
    }
}

impl ShadowConfig {
    /// Parses a JSON object of overrides.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Layout context for surfaces started without an explicit one.
    pub fn layout_context(&self) -> LayoutContext {
        LayoutContext {
            point_scale_factor: self.point_scale_factor,
            swap_left_and_right_in_rtl: self.swap_left_and_right_in_rtl,
            font_size_multiplier: self.font_size_multiplier,
            viewport_offset: Point::ZERO,
        }
    }

    /// Options used by `complete_surface`.
    pub fn surface_commit_options(&self) -> CommitOptions {
        CommitOptions {
            enable_state_reconciliation: self.enable_state_reconciliation,
            mount_synchronously: true,
        }
    }
}
