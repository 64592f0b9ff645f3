//! Role-belief reports collected for metrics.
//!
//! Every player periodically reports which role they privately believe each
//! other player holds. The reports are persisted for post-hoc analysis and
//! are never consulted by gameplay logic.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// What a player may suspect another player of being. Special roles are
/// intentionally collapsed into `Villager` so reports stay two-sided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuspectedRole {
    Villager,
    Werewolf,
}

/// One assessor's belief about a single other player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBelief {
    pub player: String,
    pub suspected_role: SuspectedRole,
    /// Confidence on a 1-100 scale.
    pub confidence: u8,
}

/// A full belief report from one assessor over all other alive players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BeliefReport {
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub assessments: Vec<RoleBelief>,
}

impl BeliefReport {
    /// Checks the report against its structural bounds. Run at the
    /// generation boundary before a report is admitted into a round.
    pub fn validate(&self) -> Result<(), DomainError> {
        for belief in &self.assessments {
            if belief.confidence == 0 || belief.confidence > 100 {
                return Err(DomainError::validation(format!(
                    "confidence for {} out of range: {}",
                    belief.player, belief.confidence
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_must_stay_within_1_to_100() {
        let report = BeliefReport {
            reasoning: "hunch".into(),
            assessments: vec![RoleBelief {
                player: "Derek".into(),
                suspected_role: SuspectedRole::Werewolf,
                confidence: 0,
            }],
        };
        assert!(report.validate().is_err());

        let report = BeliefReport {
            reasoning: "hunch".into(),
            assessments: vec![RoleBelief {
                player: "Derek".into(),
                suspected_role: SuspectedRole::Werewolf,
                confidence: 100,
            }],
        };
        assert!(report.validate().is_ok());
    }
}
