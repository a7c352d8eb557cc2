use serde::{Deserialize, Serialize};

pub const GUARD_COVERAGE_BASE: f64 = 10.0;
pub const GUARD_COVERAGE_UPGRADED: f64 = 15.0;
pub const WALL_GUARD_BONUS: f64 = 5.0;
pub const WATCHTOWER_GUARD_BONUS: f64 = 3.0;
pub const BARRACKS_GUARD_BONUS: f64 = 2.0;
pub const TRAINING_GROUNDS_GUARD_BONUS: f64 = 2.0;
pub const STABLES_GUARD_BONUS: f64 = 3.0;

/// Theft only threatens villages larger than this.
pub const THEFT_POPULATION_THRESHOLD: usize = 10;
pub const THEFT_CHANCE: f64 = 0.1;
pub const THEFT_RATE: f64 = 0.05;

pub const TRADE_AMOUNT: f64 = 10.0;
pub const PRICE_BASE_MODIFIER: f64 = 2.0;
pub const PRICE_MODIFIER_MIN: f64 = 0.5;
pub const PRICE_MODIFIER_MAX: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeResource {
    Food,
    Wood,
    Stone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeResource {
    pub const ALL: [TradeResource; 3] = [TradeResource::Food, TradeResource::Wood, TradeResource::Stone];

    /// Gold per trade batch before the price modifier.
    pub fn base_buy_price(self) -> f64 {
        match self {
            TradeResource::Food => 5.0,
            TradeResource::Wood => 10.0,
            TradeResource::Stone => 25.0,
        }
    }

    pub fn base_sell_price(self) -> f64 {
        match self {
            TradeResource::Food => 2.0,
            TradeResource::Wood => 4.0,
            TradeResource::Stone => 10.0,
        }
    }

    /// Weekly base production at which the price modifier sits at 1.0.
    pub fn price_threshold(self) -> f64 {
        match self {
            TradeResource::Food => 200.0,
            TradeResource::Wood => 100.0,
            TradeResource::Stone => 35.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TradeResource::Food => "food",
            TradeResource::Wood => "wood",
            TradeResource::Stone => "stone",
        }
    }

    pub fn parse(name: &str) -> Option<TradeResource> {
        let lower = name.to_ascii_lowercase();
        TradeResource::ALL.into_iter().find(|r| r.name() == lower)
    }
}
