//! Auto-pool option types and the source read model
//!
//! `AutoPoolOptions` is the persisted/transmitted configuration of the queue
//! replenishment policy. Its serialized shape is fixed:
//! `{ "enabled": bool, "targetQueueSize": int, "pullOrder": "Random" | "OneEach" }`.

use crate::alerts::Alert;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content source identifier
pub type SourceId = Uuid;

/// Policy choosing which source serves each slot of a refill batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PullOrder {
    /// Each slot picks an enabled source uniformly at random (with replacement)
    #[default]
    Random,
    /// Slot `i` uses enabled source `i mod pool_size`
    OneEach,
}

impl std::fmt::Display for PullOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullOrder::Random => write!(f, "Random"),
            PullOrder::OneEach => write!(f, "OneEach"),
        }
    }
}

impl std::str::FromStr for PullOrder {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "Random" => Ok(PullOrder::Random),
            "OneEach" => Ok(PullOrder::OneEach),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown pull order: {}",
                other
            ))),
        }
    }
}

/// Auto-pool configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPoolOptions {
    pub enabled: bool,
    pub target_queue_size: u32,
    pub pull_order: PullOrder,
}

impl Default for AutoPoolOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            target_queue_size: 3,
            pull_order: PullOrder::Random,
        }
    }
}

/// Snapshot of a registered content source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub id: SourceId,
    pub name: String,
    /// Kind tag of the concrete source implementation
    pub kind: String,
    /// Whether the source currently participates in the auto-pool
    pub in_pool: bool,
    pub alerts: Vec<Alert>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_wire_shape() {
        let options = AutoPoolOptions {
            enabled: true,
            target_queue_size: 5,
            pull_order: PullOrder::OneEach,
        };
        let json = serde_json::to_value(options).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"enabled": true, "targetQueueSize": 5, "pullOrder": "OneEach"})
        );
    }

    #[test]
    fn test_options_parse_from_wire() {
        let options: AutoPoolOptions = serde_json::from_str(
            r#"{"enabled":false,"targetQueueSize":0,"pullOrder":"Random"}"#,
        )
        .unwrap();
        assert_eq!(options.target_queue_size, 0);
        assert_eq!(options.pull_order, PullOrder::Random);
        assert!(!options.enabled);
    }

    #[test]
    fn test_negative_target_rejected() {
        let parsed: Result<AutoPoolOptions, _> = serde_json::from_str(
            r#"{"enabled":true,"targetQueueSize":-1,"pullOrder":"Random"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_pull_order_from_str() {
        assert_eq!("OneEach".parse::<PullOrder>().unwrap(), PullOrder::OneEach);
        assert_eq!("Random".parse::<PullOrder>().unwrap(), PullOrder::Random);
        assert!("RoundRobin".parse::<PullOrder>().is_err());
    }
}
