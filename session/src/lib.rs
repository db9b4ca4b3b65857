#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session controller that drives the combat world on behalf of a presentation layer.
//!
//! A [`Session`] owns the authoritative [`World`], the pure systems, and the
//! injected [`ScoringOracle`]. Every intent is admitted synchronously: the
//! resulting command is applied, the systems react to the emitted events, and
//! their commands are applied in turn until nothing is left. By the time an
//! intent returns the enemy turn, stage progression and any battle conclusion
//! have already resolved.

mod phase;

pub use phase::{PhaseEvent, SessionPhase};

use skirmish_core::{
    validate_oracle, Archetype, BattleRules, BattleView, Command, Event, InferenceMethod,
    OracleContractError, ResultSummary, RulesError, ScoringOracle, Tile,
};
use skirmish_system_decision::EnemyDecision;
use skirmish_system_progression::StageProgression;
use skirmish_world::{self as world, query, World};
use thiserror::Error;

/// Errors raised when a presentation layer misuses the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The intent is not accepted in the current phase.
    #[error("`{intent}` is not available during the {phase}")]
    OutOfPhase {
        /// Intent that was refused.
        intent: &'static str,
        /// Phase the session was in.
        phase: &'static str,
    },
    /// No stage exists at the requested index.
    #[error("no enemy exists at index {0}")]
    UnknownStage(usize),
    /// The battle rules are unusable.
    #[error("invalid battle rules")]
    Rules(#[from] RulesError),
    /// The oracle broke its contract during validation.
    #[error("scoring oracle failed validation")]
    Oracle(#[from] OracleContractError),
}

/// Single-player battle session bound to a scoring oracle.
#[derive(Debug)]
pub struct Session<O> {
    oracle: O,
    rules: BattleRules,
    phase: SessionPhase,
    world: World,
    decision: EnemyDecision,
    progression: StageProgression,
}

impl<O: ScoringOracle> Session<O> {
    /// Creates a session after validating the rules and probing the oracle.
    pub fn new(oracle: O, rules: BattleRules) -> Result<Self, SessionError> {
        rules.validate()?;
        validate_oracle(&oracle, &rules)?;

        Ok(Self {
            oracle,
            rules,
            phase: SessionPhase::MainMenu,
            world: World::with_rules(rules),
            decision: EnemyDecision::new(),
            progression: StageProgression::new(),
        })
    }

    /// Current presentation phase.
    #[must_use]
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Snapshot of the battle for rendering.
    #[must_use]
    pub fn battle_view(&self) -> BattleView {
        query::battle_view(&self.world)
    }

    /// Summary of the concluded battle, available in the result phase.
    #[must_use]
    pub fn summary(&self) -> Option<&ResultSummary> {
        match &self.phase {
            SessionPhase::Result { summary } => Some(summary),
            _ => None,
        }
    }

    /// Chooses the starting stage from the main menu.
    pub fn select_enemy(&mut self, stage_index: usize) -> Result<Archetype, SessionError> {
        self.require("select_enemy", matches!(self.phase, SessionPhase::MainMenu))?;
        let archetype =
            Archetype::at_stage(stage_index).ok_or(SessionError::UnknownStage(stage_index))?;
        self.transition(PhaseEvent::StageChosen { stage_index });
        Ok(archetype)
    }

    /// Chooses the inference method and begins the battle.
    ///
    /// Unknown method names fall back to [`InferenceMethod::DEFAULT`]. The
    /// method actually used is returned.
    pub fn select_inference_method(&mut self, name: &str) -> Result<InferenceMethod, SessionError> {
        let SessionPhase::SelectMethod { stage_index } = self.phase else {
            return Err(self.out_of_phase("select_inference_method"));
        };

        let method = name.parse::<InferenceMethod>().unwrap_or_else(|error| {
            tracing::warn!(
                %error,
                fallback = %InferenceMethod::DEFAULT,
                "unknown inference method"
            );
            InferenceMethod::DEFAULT
        });

        self.world = World::with_rules(self.rules);
        self.transition(PhaseEvent::MethodChosen { method });
        let _ = self.dispatch(Command::BeginBattle {
            stage_index,
            method,
        });
        Ok(method)
    }

    /// Switches the player into move mode.
    pub fn enter_move_mode(&mut self) -> Result<Vec<Event>, SessionError> {
        self.battle_intent("enter_move_mode", Command::EnterMoveMode)
    }

    /// Switches the player into attack mode.
    pub fn enter_attack_mode(&mut self) -> Result<Vec<Event>, SessionError> {
        self.battle_intent("enter_attack_mode", Command::EnterAttackMode)
    }

    /// Confirms the pending move or attack against the tile.
    pub fn confirm_action(&mut self, tile: Tile) -> Result<Vec<Event>, SessionError> {
        self.battle_intent("confirm_action", Command::ConfirmAction { tile })
    }

    /// Passes the turn to the enemy without acting.
    pub fn end_turn(&mut self) -> Result<Vec<Event>, SessionError> {
        self.battle_intent("end_turn", Command::EndTurn)
    }

    /// Abandons the current phase and returns to the main menu with a fresh world.
    pub fn restart_to_menu(&mut self) {
        self.world = World::with_rules(self.rules);
        self.transition(PhaseEvent::ReturnedToMenu);
    }

    fn battle_intent(
        &mut self,
        intent: &'static str,
        command: Command,
    ) -> Result<Vec<Event>, SessionError> {
        self.require(intent, self.phase == SessionPhase::InBattle)?;
        Ok(self.dispatch(command))
    }

    fn require(&self, intent: &'static str, allowed: bool) -> Result<(), SessionError> {
        if allowed {
            Ok(())
        } else {
            Err(self.out_of_phase(intent))
        }
    }

    fn out_of_phase(&self, intent: &'static str) -> SessionError {
        SessionError::OutOfPhase {
            intent,
            phase: self.phase.name(),
        }
    }

    fn transition(&mut self, event: PhaseEvent) {
        match self.phase.next(&event) {
            Some(next) => {
                tracing::debug!(from = %self.phase, to = %next, "session phase changed");
                self.phase = next;
            }
            None => tracing::warn!(phase = %self.phase, ?event, "phase event ignored"),
        }
    }

    /// Applies the command and pumps the systems until they fall silent.
    fn dispatch(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            let view = query::battle_view(&self.world);
            self.decision
                .handle(&events, &view, &self.oracle, &mut pending);
            self.progression
                .handle(&events, &view, &self.oracle, &mut pending);
            log.extend(events);
        }

        let concluded = log.iter().find_map(|event| match event {
            Event::BattleConcluded { summary } => Some(summary.clone()),
            _ => None,
        });
        if let Some(summary) = concluded {
            self.transition(PhaseEvent::BattleConcluded { summary });
        }

        log
    }
}
