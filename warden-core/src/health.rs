//! Dependency health summaries.

use serde::{Deserialize, Serialize};

/// Reachability of the two external stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyHealth {
    pub store_up: bool,
    pub counter_up: bool,
}

impl DependencyHealth {
    /// Overall gateway status: up only when both stores answered.
    pub fn status(&self) -> GatewayStatus {
        if self.store_up && self.counter_up {
            GatewayStatus::Up
        } else {
            GatewayStatus::Degraded
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    Up,
    Degraded,
}

/// Per-dependency status as reported on the health surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

impl From<bool> for ComponentStatus {
    fn from(up: bool) -> Self {
        if up {
            ComponentStatus::Up
        } else {
            ComponentStatus::Down
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_requires_both_stores() {
        let both = DependencyHealth { store_up: true, counter_up: true };
        assert_eq!(both.status(), GatewayStatus::Up);

        for (store_up, counter_up) in [(true, false), (false, true), (false, false)] {
            let health = DependencyHealth { store_up, counter_up };
            assert_eq!(health.status(), GatewayStatus::Degraded);
        }
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&GatewayStatus::Degraded).unwrap(), "\"degraded\"");
        assert_eq!(serde_json::to_string(&ComponentStatus::from(false)).unwrap(), "\"down\"");
    }
}
