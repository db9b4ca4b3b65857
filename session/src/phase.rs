//! Presentation-side phase machine kept apart from the combat world.

use std::fmt;

use skirmish_core::{InferenceMethod, ResultSummary};

/// Screen-level phase of a session.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionPhase {
    /// Waiting for an enemy to be chosen.
    MainMenu,
    /// Waiting for an inference method for the chosen starting stage.
    SelectMethod {
        /// Stage the battle will start from.
        stage_index: usize,
    },
    /// A battle is running.
    InBattle,
    /// The battle finished with the provided summary.
    Result {
        /// Final outcome of the battle.
        summary: ResultSummary,
    },
}

/// Transitions exchanged between the session and the combat core.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseEvent {
    /// The player picked the starting stage.
    StageChosen {
        /// Index into the stage sequence.
        stage_index: usize,
    },
    /// The player picked the inference method and the battle began.
    MethodChosen {
        /// Method forced for the whole battle.
        method: InferenceMethod,
    },
    /// The combat core concluded the battle.
    BattleConcluded {
        /// Final outcome of the battle.
        summary: ResultSummary,
    },
    /// The player abandoned the current phase.
    ReturnedToMenu,
}

impl SessionPhase {
    /// Phase reached by applying the event, or `None` when the event does not apply.
    #[must_use]
    pub fn next(&self, event: &PhaseEvent) -> Option<SessionPhase> {
        match (self, event) {
            (_, PhaseEvent::ReturnedToMenu) => Some(Self::MainMenu),
            (Self::MainMenu, PhaseEvent::StageChosen { stage_index }) => Some(Self::SelectMethod {
                stage_index: *stage_index,
            }),
            (Self::SelectMethod { .. }, PhaseEvent::MethodChosen { .. }) => Some(Self::InBattle),
            (Self::InBattle, PhaseEvent::BattleConcluded { summary }) => Some(Self::Result {
                summary: summary.clone(),
            }),
            _ => None,
        }
    }

    /// Short human-readable name of the phase.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MainMenu => "main menu",
            Self::SelectMethod { .. } => "method selection",
            Self::InBattle => "battle",
            Self::Result { .. } => "result",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Archetype, Winner};

    fn summary() -> ResultSummary {
        ResultSummary {
            enemy: Archetype::Skeleton,
            method: InferenceMethod::Sugeno,
            score: 33.0,
            player_health: 0,
            enemy_health: 6,
            winner: Winner::Enemy,
        }
    }

    #[test]
    fn phases_follow_the_menu_flow() {
        let select = SessionPhase::MainMenu
            .next(&PhaseEvent::StageChosen { stage_index: 2 })
            .expect("menu accepts a stage");
        assert_eq!(select, SessionPhase::SelectMethod { stage_index: 2 });

        let battle = select
            .next(&PhaseEvent::MethodChosen {
                method: InferenceMethod::Tsukamoto,
            })
            .expect("selection accepts a method");
        assert_eq!(battle, SessionPhase::InBattle);

        let result = battle
            .next(&PhaseEvent::BattleConcluded { summary: summary() })
            .expect("battle accepts a conclusion");
        assert_eq!(result, SessionPhase::Result { summary: summary() });
    }

    #[test]
    fn out_of_order_events_are_refused() {
        assert_eq!(
            SessionPhase::MainMenu.next(&PhaseEvent::MethodChosen {
                method: InferenceMethod::Mamdani
            }),
            None
        );
        assert_eq!(
            SessionPhase::InBattle.next(&PhaseEvent::StageChosen { stage_index: 0 }),
            None
        );
    }

    #[test]
    fn every_phase_returns_to_menu() {
        for phase in [
            SessionPhase::MainMenu,
            SessionPhase::SelectMethod { stage_index: 1 },
            SessionPhase::InBattle,
            SessionPhase::Result { summary: summary() },
        ] {
            assert_eq!(
                phase.next(&PhaseEvent::ReturnedToMenu),
                Some(SessionPhase::MainMenu)
            );
        }
    }
}
