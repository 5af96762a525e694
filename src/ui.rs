//! Screen/HUD interface
//!
//! The game never touches the DOM directly; it reports to a [`Ui`].

use crate::achievements::Achievement;
use crate::sim::{PowerUpStatus, SessionStats};

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Live HUD values for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub stats: SessionStats,
    pub high_score: u64,
    pub power_ups: Vec<PowerUpStatus>,
    /// Seconds left in a time trial
    pub time_left: Option<f32>,
}

/// Game-over summary
#[derive(Debug, Clone, PartialEq)]
pub struct GameOverSummary {
    pub stats: SessionStats,
    pub high_score: u64,
    pub new_high_score: bool,
}

pub trait Ui {
    fn show_screen(&mut self, screen: Screen);
    fn update_hud(&mut self, hud: &Hud);
    fn show_game_over(&mut self, summary: &GameOverSummary);
    fn show_achievement(&mut self, achievement: &Achievement);
}

/// UI that ignores everything (headless runs, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUi;

impl Ui for NullUi {
    fn show_screen(&mut self, _screen: Screen) {}
    fn update_hud(&mut self, _hud: &Hud) {}
    fn show_game_over(&mut self, _summary: &GameOverSummary) {}
    fn show_achievement(&mut self, _achievement: &Achievement) {}
}

#[cfg(target_arch = "wasm32")]
pub use dom::DomUi;

#[cfg(target_arch = "wasm32")]
mod dom {
    use web_sys::Document;

    use super::{GameOverSummary, Hud, Screen, Ui};
    use crate::achievements::Achievement;

    const SCREENS: [(Screen, &str); 4] = [
        (Screen::Menu, "menuScreen"),
        (Screen::Playing, "hud"),
        (Screen::Paused, "pauseScreen"),
        (Screen::GameOver, "gameOverScreen"),
    ];

    /// Element-id based DOM overlay
    pub struct DomUi {
        document: Document,
    }

    impl DomUi {
        pub fn new(document: Document) -> Self {
            Self { document }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let classes = el.class_list();
                let _ = if hidden {
                    classes.add_1("hidden")
                } else {
                    classes.remove_1("hidden")
                };
            }
        }
    }

    impl Ui for DomUi {
        fn show_screen(&mut self, screen: Screen) {
            for (s, id) in SCREENS {
                // The HUD stays visible under the pause overlay
                let visible = s == screen || (s == Screen::Playing && screen == Screen::Paused);
                self.set_hidden(id, !visible);
            }
        }

        fn update_hud(&mut self, hud: &Hud) {
            self.set_text("score", &hud.stats.score.to_string());
            self.set_text("distance", &format!("{}m", hud.stats.distance as u64));
            self.set_text("coins", &hud.stats.coins.to_string());
            self.set_text("highScore", &hud.high_score.to_string());
            self.set_text(
                "combo",
                &if hud.stats.combo > 1 {
                    format!("x{}", hud.stats.combo)
                } else {
                    String::new()
                },
            );
            let powers: Vec<String> = hud
                .power_ups
                .iter()
                .map(|p| {
                    if p.duration > 0.0 {
                        format!("{} {:.1}s", p.kind.as_str(), p.time_left)
                    } else {
                        p.kind.as_str().to_string()
                    }
                })
                .collect();
            self.set_text("powerUps", &powers.join(" | "));
            match hud.time_left {
                Some(t) => self.set_text("timer", &format!("{:.0}", t.ceil())),
                None => self.set_text("timer", ""),
            }
        }

        fn show_game_over(&mut self, summary: &GameOverSummary) {
            let stats = &summary.stats;
            self.set_text("finalScore", &format!("Score: {}", stats.score));
            self.set_text("finalDistance", &format!("Distance: {}m", stats.distance as u64));
            self.set_text("finalCoins", &format!("Coins: {}", stats.coins));
            self.set_text("finalGems", &format!("Gems: {}", stats.gems));
            self.set_text("finalHighScore", &format!("High Score: {}", summary.high_score));
            self.set_hidden("newHighScore", !summary.new_high_score);
        }

        fn show_achievement(&mut self, achievement: &Achievement) {
            self.set_text("achievementName", achievement.name);
            self.set_hidden("achievementPopup", false);
        }
    }
}
