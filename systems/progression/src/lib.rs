#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that advances stages or concludes the battle once a fighter falls.

use skirmish_core::{
    BattleView, Command, Event, InferenceMethod, ResultSummary, ScoreQuery, ScoringOracle, Winner,
};

/// Stage progression system reacting to `Event::BattleOver`.
#[derive(Debug, Default)]
pub struct StageProgression;

impl StageProgression {
    /// Creates a new progression system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::AdvanceStage` or `Command::ConcludeBattle` after a fighter falls.
    pub fn handle<O>(
        &mut self,
        events: &[Event],
        view: &BattleView,
        oracle: &O,
        out: &mut Vec<Command>,
    ) where
        O: ScoringOracle + ?Sized,
    {
        let battle_over = events
            .iter()
            .any(|event| matches!(event, Event::BattleOver { .. }));
        if !battle_over {
            return;
        }

        let Some(winner) = Winner::decide(view.player.alive, view.enemy.alive) else {
            return;
        };

        if winner == Winner::Player && view.has_next_stage() {
            tracing::info!(
                defeated = %view.archetype,
                next_stage = view.stage_index + 1,
                "advancing to next stage"
            );
            out.push(Command::AdvanceStage);
            return;
        }

        let summary = summarize(view, oracle, winner);
        tracing::info!(
            winner = %summary.winner,
            method = %summary.method,
            score = summary.score,
            "battle concluded"
        );
        out.push(Command::ConcludeBattle { summary });
    }
}

/// Builds the result summary for the final state of a battle.
///
/// The score is the requested method's, falling back to the default method,
/// and `0.0` when the oracle reports neither.
#[must_use]
pub fn summarize<O>(view: &BattleView, oracle: &O, winner: Winner) -> ResultSummary
where
    O: ScoringOracle + ?Sized,
{
    let query = ScoreQuery::new(
        view.archetype,
        view.player.health,
        view.enemy.health,
        view.enemy.resource.unwrap_or(0),
    );
    let (method, score) = oracle
        .all_scores(&query)
        .resolve(view.requested_method())
        .unwrap_or((InferenceMethod::DEFAULT, 0.0));

    ResultSummary {
        enemy: view.archetype,
        method,
        score,
        player_health: view.player.health,
        enemy_health: view.enemy.health,
        winner,
    }
}
