//! Static rule tables consulted by every other component.

pub mod buildings;
pub mod calendar;
pub mod difficulty;
pub mod economy;
pub mod jobs;
pub mod tech;

pub use buildings::{BuildingKind, Cost};
pub use calendar::Season;
pub use difficulty::{Difficulty, DifficultyProfile};
pub use economy::{TradeResource, TradeSide};
pub use jobs::Job;
pub use tech::TechId;
