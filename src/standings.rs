use std::collections::HashMap;

use crate::competition::{Competition, PlayerResult};

/// One player's season across every loaded competition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStanding {
    pub name: String,
    pub rank: usize,
    pub total_points: i64,
    pub competitions_played: usize,
    /// Keyed by competition id.
    pub by_competition: HashMap<String, PlayerResult>,
}

#[derive(Debug, Clone, Default)]
pub struct Standings {
    /// Best first.
    pub players: Vec<PlayerStanding>,
}

impl Standings {
    /// Transposes per-competition results into per-player totals and ranks
    /// them by total points. Ranks are positional; equal totals are ordered
    /// by name.
    pub fn from_competitions(competitions: &[Competition]) -> Self {
        let mut by_player: HashMap<String, PlayerStanding> = HashMap::new();

        for comp in competitions {
            for (name, result) in &comp.results {
                let entry = by_player
                    .entry(name.clone())
                    .or_insert_with(|| PlayerStanding {
                        name: name.clone(),
                        rank: 0,
                        total_points: 0,
                        competitions_played: 0,
                        by_competition: HashMap::new(),
                    });
                entry.total_points += result.points;
                entry.competitions_played += 1;
                entry
                    .by_competition
                    .insert(comp.id().to_string(), result.clone());
            }
        }

        let mut players: Vec<PlayerStanding> = by_player.into_values().collect();
        players.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.name.cmp(&b.name))
        });
        for (idx, player) in players.iter_mut().enumerate() {
            player.rank = idx + 1;
        }

        Self { players }
    }

    pub fn get(&self, name: &str) -> Option<&PlayerStanding> {
        self.players.iter().find(|p| p.name == name)
    }
}
