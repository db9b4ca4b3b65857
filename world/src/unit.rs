//! Mutable combatant state owned by the world.

use skirmish_core::{Archetype, BattleRules, Team, Tile, UnitSnapshot};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Unit {
    pub(crate) team: Team,
    pub(crate) tile: Tile,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) attack: u32,
    pub(crate) alive: bool,
    pub(crate) resource: Option<u32>,
    pub(crate) range: Option<u32>,
}

impl Unit {
    /// Player unit at full health on the provided tile.
    pub(crate) fn player(rules: &BattleRules, tile: Tile) -> Self {
        Self {
            team: Team::Player,
            tile,
            health: rules.player_max_health,
            max_health: rules.player_max_health,
            attack: rules.player_attack,
            alive: rules.player_max_health > 0,
            resource: None,
            range: None,
        }
    }

    /// Enemy unit carrying the archetype's base statistics.
    pub(crate) fn enemy(archetype: Archetype, tile: Tile) -> Self {
        let stats = archetype.stats();
        Self {
            team: Team::Enemy,
            tile,
            health: stats.health,
            max_health: stats.health,
            attack: stats.attack,
            alive: stats.health > 0,
            resource: stats.resource,
            range: Some(stats.range),
        }
    }

    /// Subtracts damage, clamping at zero, and returns the remaining health.
    pub(crate) fn apply_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.alive = self.health > 0;
        self.health
    }

    /// Restores health up to the maximum and returns the amount actually gained.
    pub(crate) fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.alive = self.health > 0;
        self.health - before
    }

    /// Deducts from the resource pool, flooring at zero. Units without a pool are untouched.
    pub(crate) fn spend_resource(&mut self, cost: u32) {
        if let Some(resource) = self.resource.as_mut() {
            *resource = resource.saturating_sub(cost);
        }
    }

    /// Returns the unit to full health.
    pub(crate) fn restore(&mut self) {
        self.health = self.max_health;
        self.alive = self.health > 0;
    }

    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            team: self.team,
            tile: self.tile,
            health: self.health,
            max_health: self.max_health,
            attack: self.attack,
            alive: self.alive,
            resource: self.resource,
            range: self.range,
        }
    }
}
