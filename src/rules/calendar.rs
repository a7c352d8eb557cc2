use serde::{Deserialize, Serialize};

pub const WEEKS_PER_YEAR: u32 = 52;
pub const GAME_YEARS: u32 = 10;
/// The first tick at which a running game is finalized as a victory.
pub const GAME_END_TICK: u32 = WEEKS_PER_YEAR * GAME_YEARS;
pub const MAX_FOOD: f64 = 999_999.0;
pub const LOG_CAPACITY: usize = 1000;

/// Weekly cadence of the military check.
pub const MILITARY_INTERVAL: u32 = 15;
/// Maintenance shortfall warnings are only logged on these ticks.
pub const MAINTENANCE_WARNING_INTERVAL: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Season of the week simulated by `tick`. Tick 1 is the first week of spring.
    pub fn from_tick(tick: u32) -> Season {
        match week_of_year(tick) {
            0..=12 => Season::Spring,
            13..=25 => Season::Summer,
            26..=38 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn next(self) -> Season {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    /// Base harvest multiplier before technology and building bonuses.
    pub fn food_base(self) -> f64 {
        match self {
            Season::Spring => 0.9,
            Season::Summer => 1.0,
            Season::Autumn => 2.0,
            Season::Winter => 0.4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

/// Zero-based week within the current year.
pub fn week_of_year(tick: u32) -> u32 {
    tick.saturating_sub(1) % WEEKS_PER_YEAR
}

/// One-based game year containing `tick`.
pub fn year_of(tick: u32) -> u32 {
    tick.saturating_sub(1) / WEEKS_PER_YEAR + 1
}

/// Villagers age on the last week of every year.
pub fn is_year_end(tick: u32) -> bool {
    tick > 0 && tick % WEEKS_PER_YEAR == 0
}
