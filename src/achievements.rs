//! Achievements
//!
//! A fixed table of predicates over [`SessionStats`]. The system is seeded
//! with the ids already unlocked in the save record and only ever reports
//! new unlocks.

use std::collections::BTreeSet;

use crate::error::CollaboratorError;
use crate::sim::SessionStats;

/// Static achievement definition
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    condition: fn(&SessionStats) -> bool,
}

impl PartialEq for Achievement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Achievement {
    pub fn is_met(&self, stats: &SessionStats) -> bool {
        (self.condition)(stats)
    }
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_run",
        name: "Into the River",
        description: "Finish your first run",
        condition: |s| s.games_played >= 1,
    },
    Achievement {
        id: "score_1000",
        name: "Paddler",
        description: "Score 1,000 points in one run",
        condition: |s| s.score >= 1_000,
    },
    Achievement {
        id: "score_10000",
        name: "River Legend",
        description: "Score 10,000 points in one run",
        condition: |s| s.score >= 10_000,
    },
    Achievement {
        id: "distance_5000",
        name: "Long Haul",
        description: "Cover 5,000 px of river in one run",
        condition: |s| s.distance >= 5_000.0,
    },
    Achievement {
        id: "coins_50",
        name: "Shiny Pebbles",
        description: "Collect 50 coins in one run",
        condition: |s| s.coins >= 50,
    },
    Achievement {
        id: "gems_5",
        name: "Gem Diver",
        description: "Collect 5 gems in one run",
        condition: |s| s.gems >= 5,
    },
    Achievement {
        id: "combo_10",
        name: "In the Flow",
        description: "Reach a combo of 10",
        condition: |s| s.max_combo >= 10,
    },
    Achievement {
        id: "power_ups_5",
        name: "Charged Up",
        description: "Collect 5 power-ups in one run",
        condition: |s| s.power_ups_collected >= 5,
    },
    Achievement {
        id: "dodge_50",
        name: "Slippery",
        description: "Dodge 50 obstacles in one run",
        condition: |s| s.obstacles_avoided >= 50,
    },
    Achievement {
        id: "games_10",
        name: "Regular",
        description: "Play 10 games",
        condition: |s| s.games_played >= 10,
    },
];

/// Looks up a definition by id
pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Achievement collaborator used by the game at game over
pub trait AchievementTracker {
    /// Evaluate against the terminal stats; returns only new unlocks
    fn check(&mut self, stats: &SessionStats) -> Result<Vec<Achievement>, CollaboratorError>;

    /// Every unlocked id (persisted in the save record)
    fn unlocked_ids(&self) -> BTreeSet<String>;
}

#[derive(Debug, Clone, Default)]
pub struct AchievementSystem {
    unlocked: BTreeSet<String>,
}

impl AchievementSystem {
    pub fn new(unlocked: impl IntoIterator<Item = String>) -> Self {
        Self {
            unlocked: unlocked.into_iter().collect(),
        }
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }
}

impl AchievementTracker for AchievementSystem {
    fn check(&mut self, stats: &SessionStats) -> Result<Vec<Achievement>, CollaboratorError> {
        let mut newly = Vec::new();
        for achievement in ACHIEVEMENTS {
            if !self.unlocked.contains(achievement.id) && achievement.is_met(stats) {
                self.unlocked.insert(achievement.id.to_string());
                log::info!("Achievement unlocked: {}", achievement.name);
                newly.push(*achievement);
            }
        }
        Ok(newly)
    }

    fn unlocked_ids(&self) -> BTreeSet<String> {
        self.unlocked.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_unique() {
        let ids: BTreeSet<&str> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
    }

    #[test]
    fn test_reports_only_new_unlocks() {
        let mut system = AchievementSystem::new(["first_run".to_string()]);
        let stats = SessionStats {
            score: 1_500,
            games_played: 1,
            ..SessionStats::default()
        };
        let newly = system.check(&stats).unwrap();
        let ids: Vec<&str> = newly.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["score_1000"]);

        assert!(system.check(&stats).unwrap().is_empty());
        assert!(system.is_unlocked("score_1000"));
        assert_eq!(system.unlocked_ids().len(), 2);
    }

    #[test]
    fn test_combo_achievement_uses_best_streak() {
        let mut system = AchievementSystem::new(["first_run".to_string()]);
        let stats = SessionStats {
            combo: 0,
            max_combo: 12,
            games_played: 1,
            ..SessionStats::default()
        };
        let ids: Vec<&str> = system.check(&stats).unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["combo_10"]);
    }

    #[test]
    fn test_find() {
        assert_eq!(find("gems_5").map(|a| a.name), Some("Gem Diver"));
        assert!(find("nope").is_none());
    }
}
