//! Tunable battle rules loaded by adapters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_PLAYER_MAX_HEALTH: u32 = 20;
const DEFAULT_PLAYER_ATTACK: u32 = 2;
const DEFAULT_MOVE_RANGE: u32 = 1;
const DEFAULT_HEAL_RESOURCE_COST: u32 = 20;
const DEFAULT_HEAL_PERCENT: u32 = 25;

/// Numeric rules governing the player unit and enemy healing.
///
/// Missing fields fall back to their defaults when deserialised, so a rules
/// file only needs to name the values it overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BattleRules {
    /// Health the player starts with and is restored to between stages.
    pub player_max_health: u32,
    /// Damage the player deals per attack.
    pub player_attack: u32,
    /// Maximum number of steps a player move may cover.
    pub move_range: u32,
    /// Resource deducted from the enemy for each heal.
    pub heal_resource_cost: u32,
    /// Share of maximum health restored per heal, rounded up.
    pub heal_percent: u32,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            player_max_health: DEFAULT_PLAYER_MAX_HEALTH,
            player_attack: DEFAULT_PLAYER_ATTACK,
            move_range: DEFAULT_MOVE_RANGE,
            heal_resource_cost: DEFAULT_HEAL_RESOURCE_COST,
            heal_percent: DEFAULT_HEAL_PERCENT,
        }
    }
}

impl BattleRules {
    /// Checks that the rules describe a playable battle.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.player_max_health == 0 {
            return Err(RulesError::ZeroPlayerHealth);
        }
        if self.move_range == 0 {
            return Err(RulesError::ZeroMoveRange);
        }
        if !(1..=100).contains(&self.heal_percent) {
            return Err(RulesError::HealPercentOutOfRange(self.heal_percent));
        }
        Ok(())
    }

    /// Health restored by a single heal for a unit with the provided maximum.
    #[must_use]
    pub fn heal_amount(&self, max_health: u32) -> u32 {
        let scaled = u64::from(max_health) * u64::from(self.heal_percent);
        let amount = scaled.div_ceil(100);
        u32::try_from(amount).unwrap_or(u32::MAX)
    }
}

/// Reasons a [`BattleRules`] value is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RulesError {
    /// The player would start the battle already defeated.
    #[error("player_max_health must be greater than zero")]
    ZeroPlayerHealth,
    /// The player could never leave their tile.
    #[error("move_range must be greater than zero")]
    ZeroMoveRange,
    /// The heal share is not a usable percentage.
    #[error("heal_percent must lie within 1..=100, got {0}")]
    HealPercentOutOfRange(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heal_amount_rounds_up_a_quarter() {
        let rules = BattleRules::default();
        assert_eq!(rules.heal_amount(20), 5);
        assert_eq!(rules.heal_amount(18), 5);
        assert_eq!(rules.heal_amount(22), 6);
        assert_eq!(rules.heal_amount(35), 9);
        assert_eq!(rules.heal_amount(1), 1);
    }

    #[test]
    fn default_rules_are_valid() {
        assert_eq!(BattleRules::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let zero_health = BattleRules {
            player_max_health: 0,
            ..BattleRules::default()
        };
        assert_eq!(zero_health.validate(), Err(RulesError::ZeroPlayerHealth));

        let greedy_heal = BattleRules {
            heal_percent: 150,
            ..BattleRules::default()
        };
        assert_eq!(
            greedy_heal.validate(),
            Err(RulesError::HealPercentOutOfRange(150))
        );
    }
}
