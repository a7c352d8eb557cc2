use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartingResources {
    pub food: f64,
    pub wood: f64,
    pub stone: f64,
    pub gold: f64,
    pub knowledge: f64,
}

/// Immutable preset selected at game start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub consumption_rate: f64,
    pub production_multiplier: f64,
    pub starting_resources: StartingResources,
    pub starting_population: u32,
}

const EASY: DifficultyProfile = DifficultyProfile {
    name: "Easy",
    description: "Generous stores and bountiful harvests",
    consumption_rate: 0.8,
    production_multiplier: 1.2,
    starting_resources: StartingResources {
        food: 500.0,
        wood: 150.0,
        stone: 50.0,
        gold: 50.0,
        knowledge: 20.0,
    },
    starting_population: 25,
};

const NORMAL: DifficultyProfile = DifficultyProfile {
    name: "Normal",
    description: "A balanced test of stewardship",
    consumption_rate: 1.0,
    production_multiplier: 1.0,
    starting_resources: StartingResources {
        food: 300.0,
        wood: 100.0,
        stone: 30.0,
        gold: 30.0,
        knowledge: 0.0,
    },
    starting_population: 20,
};

const HARD: DifficultyProfile = DifficultyProfile {
    name: "Hard",
    description: "Lean stores, hungry mouths and harsher misfortune",
    consumption_rate: 1.2,
    production_multiplier: 0.9,
    starting_resources: StartingResources {
        food: 300.0,
        wood: 50.0,
        stone: 0.0,
        gold: 0.0,
        knowledge: 0.0,
    },
    starting_population: 15,
};

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn profile(self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Normal => &NORMAL,
            Difficulty::Hard => &HARD,
        }
    }

    /// Negative event food and gold deltas are amplified on hard.
    pub fn event_loss_factor(self) -> f64 {
        match self {
            Difficulty::Hard => 1.5,
            Difficulty::Easy | Difficulty::Normal => 1.0,
        }
    }

    /// Final score weighting: harder villages are worth more.
    pub fn score_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }

    pub fn parse(name: &str) -> Option<Difficulty> {
        match name.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}
