//! Round hand-off
//!
//! When a round finishes the host needs to know how it ended, which level
//! was played and who took part, so it can show results and build the next
//! round's roster.

use serde::{Deserialize, Serialize};

use crate::settings::SimConfig;
use crate::sim::level::next_level_index;
use crate::sim::player::Player;
use crate::sim::sprites::SpriteCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResult {
    /// Every enemy destroyed
    Victory,
    /// Objective lost or every player eliminated
    Defeat,
    /// Left before finishing
    Abandoned,
}

/// Screen the host should show next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextScreen {
    Results,
    Menu,
}

/// Final state of a round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub result: RoundResult,
    pub level_index: u32,
    /// Players still in play followed by eliminated ones
    pub roster: Vec<Player>,
}

impl RoundOutcome {
    pub fn next_screen(&self) -> NextScreen {
        match self.result {
            RoundResult::Victory | RoundResult::Defeat => NextScreen::Results,
            RoundResult::Abandoned => NextScreen::Menu,
        }
    }

    /// Level the next round plays
    pub fn next_level(&self, config: &SimConfig) -> u32 {
        next_level_index(self.level_index, config.level_count)
    }

    /// Roster for the next round, only after a victory
    ///
    /// Players come back in player order with scores and power tiers kept.
    pub fn carry_over(self, config: &SimConfig, catalog: &SpriteCatalog) -> Option<Vec<Player>> {
        if self.result != RoundResult::Victory {
            return None;
        }
        let mut roster = self.roster;
        roster.sort_by_key(|p| p.index);
        for player in &mut roster {
            player.prepare_next_round(true, config, catalog);
        }
        Some(roster)
    }

    /// Score line per player in player order
    pub fn scores(&self) -> Vec<(usize, u32)> {
        let mut scores: Vec<_> = self.roster.iter().map(|p| (p.index, p.score)).collect();
        scores.sort_unstable();
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PlayerInput;
    use crate::sim::tank::UnitFlag;

    fn outcome(result: RoundResult) -> (RoundOutcome, SimConfig, SpriteCatalog) {
        let config = SimConfig::default();
        let catalog = SpriteCatalog::default();
        let mut survivor = Player::new(1, &config, &catalog);
        survivor.score = 1200;
        survivor.unit.lives = 2;
        let mut fallen = Player::new(0, &config, &catalog);
        fallen.unit.lives = 0;
        fallen.score = 300;
        let outcome = RoundOutcome {
            result,
            level_index: 35,
            roster: vec![survivor, fallen],
        };
        (outcome, config, catalog)
    }

    #[test]
    fn test_next_screen() {
        assert_eq!(outcome(RoundResult::Victory).0.next_screen(), NextScreen::Results);
        assert_eq!(outcome(RoundResult::Defeat).0.next_screen(), NextScreen::Results);
        assert_eq!(outcome(RoundResult::Abandoned).0.next_screen(), NextScreen::Menu);
    }

    #[test]
    fn test_victory_carries_everyone_over() {
        let (outcome, config, catalog) = outcome(RoundResult::Victory);
        assert_eq!(outcome.next_level(&config), 1);
        assert_eq!(outcome.scores(), vec![(0, 300), (1, 1200)]);
        let roster = outcome.carry_over(&config, &catalog).unwrap();
        assert_eq!(roster[0].index, 0);
        assert_eq!(roster[0].unit.lives, 1);
        assert_eq!(roster[1].unit.lives, 2);
        assert_eq!(roster[1].score, 1200);
    }

    #[test]
    fn test_results_roster_ignores_input_until_next_round() {
        let (mut outcome, config, catalog) = outcome(RoundResult::Victory);
        for player in &mut outcome.roster {
            player.unit.flags.insert(UnitFlag::Menu);
        }
        let fire = PlayerInput { up: true, fire: true, ..Default::default() };
        let shown = &mut outcome.roster[0];
        assert!(!shown.apply_input(&fire, 500, &config, &catalog));
        assert_eq!(shown.unit.speed, 0.0);
        assert!(shown.unit.projectiles.is_empty());

        let roster = outcome.carry_over(&config, &catalog).unwrap();
        assert!(roster.iter().all(|p| !p.unit.has(UnitFlag::Menu)));
    }

    #[test]
    fn test_defeat_has_no_next_roster() {
        let (outcome, config, catalog) = outcome(RoundResult::Defeat);
        assert!(outcome.carry_over(&config, &catalog).is_none());
    }
}
