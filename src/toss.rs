use std::time::{Duration, Instant};

use rand::Rng;

use crate::engine::TeamSlot;

const FLIP_SPIN: Duration = Duration::from_millis(2500);
const RESULT_HOLD: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinFace {
    Heads,
    Tails,
}

impl CoinFace {
    pub fn label(self) -> &'static str {
        match self {
            CoinFace::Heads => "heads",
            CoinFace::Tails => "tails",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TossDecision {
    Bat,
    Bowl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TossStage {
    Call,
    Flipping { until: Instant },
    Result { until: Instant },
    Decision,
}

/// The coin-toss flow: team 1 calls, the coin spins on a timer, the winner
/// picks bat or bowl. The main loop drives it with `tick`.
#[derive(Debug, Clone)]
pub struct TossFlow {
    pub stage: TossStage,
    pub team1_call: Option<CoinFace>,
    pub result: Option<CoinFace>,
    pub winner: Option<TeamSlot>,
    pub decision: Option<TossDecision>,
}

impl Default for TossFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl TossFlow {
    pub fn new() -> Self {
        Self {
            stage: TossStage::Call,
            team1_call: None,
            result: None,
            winner: None,
            decision: None,
        }
    }

    pub fn call(&mut self, face: CoinFace) {
        if matches!(self.stage, TossStage::Call) {
            self.team1_call = Some(face);
        }
    }

    pub fn flip(&mut self, now: Instant) {
        if matches!(self.stage, TossStage::Call) && self.team1_call.is_some() {
            self.stage = TossStage::Flipping { until: now + FLIP_SPIN };
        }
    }

    /// Advances timer-driven stages. Call once per UI tick.
    pub fn tick(&mut self, now: Instant) {
        match self.stage {
            TossStage::Flipping { until } if now >= until => {
                let face = if rand::thread_rng().gen_bool(0.5) {
                    CoinFace::Heads
                } else {
                    CoinFace::Tails
                };
                self.result = Some(face);
                self.winner = Some(if self.team1_call == Some(face) {
                    TeamSlot::Team1
                } else {
                    TeamSlot::Team2
                });
                self.stage = TossStage::Result { until: now + RESULT_HOLD };
            }
            TossStage::Result { until } if now >= until => {
                self.stage = TossStage::Decision;
            }
            _ => {}
        }
    }

    pub fn choose(&mut self, decision: TossDecision) {
        if matches!(self.stage, TossStage::Decision) {
            self.decision = Some(decision);
        }
    }

    /// Which side bats first, once both the winner and the decision are known.
    pub fn batting_slot(&self) -> Option<TeamSlot> {
        let winner = self.winner?;
        Some(match self.decision? {
            TossDecision::Bat => winner,
            TossDecision::Bowl => winner.other(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_requires_a_call_first() {
        let mut toss = TossFlow::new();
        let now = Instant::now();
        toss.flip(now);
        assert!(matches!(toss.stage, TossStage::Call));

        toss.call(CoinFace::Heads);
        toss.flip(now);
        assert!(matches!(toss.stage, TossStage::Flipping { .. }));
    }

    #[test]
    fn tick_resolves_flip_and_names_a_winner() {
        let mut toss = TossFlow::new();
        let now = Instant::now();
        toss.call(CoinFace::Tails);
        toss.flip(now);
        toss.tick(now + FLIP_SPIN);
        assert!(toss.result.is_some());
        assert!(toss.winner.is_some());
        assert!(matches!(toss.stage, TossStage::Result { .. }));

        toss.tick(now + FLIP_SPIN + RESULT_HOLD);
        assert!(matches!(toss.stage, TossStage::Decision));
    }

    #[test]
    fn bowl_decision_hands_the_bat_to_the_other_side() {
        let mut toss = TossFlow::new();
        toss.winner = Some(TeamSlot::Team2);
        toss.stage = TossStage::Decision;
        toss.choose(TossDecision::Bowl);
        assert_eq!(toss.batting_slot(), Some(TeamSlot::Team1));
    }
}
