pub mod buildings;
pub mod generation;
pub mod villager;

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ending::Ending;
use crate::events::EventPool;
use crate::rules::buildings::{HOUSE_CAPACITY_BASE, HOUSE_CAPACITY_UPGRADED};
use crate::rules::calendar::LOG_CAPACITY;
use crate::rules::{BuildingKind, Difficulty, DifficultyProfile, Job, Season, TechId, TradeResource};
use crate::simulation::numeric::ratio_or_zero;
pub use buildings::Buildings;
pub use villager::{Activity, Villager, VillagerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Menu,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodPriority {
    Equal,
    ChildrenFirst,
    WorkersFirst,
    ElderlyLast,
}

impl FoodPriority {
    pub fn name(self) -> &'static str {
        match self {
            FoodPriority::Equal => "equal",
            FoodPriority::ChildrenFirst => "children",
            FoodPriority::WorkersFirst => "workers",
            FoodPriority::ElderlyLast => "elderly-last",
        }
    }

    pub fn parse(name: &str) -> Option<FoodPriority> {
        match name.to_ascii_lowercase().as_str() {
            "equal" => Some(FoodPriority::Equal),
            "children" | "children-first" => Some(FoodPriority::ChildrenFirst),
            "workers" | "workers-first" => Some(FoodPriority::WorkersFirst),
            "elderly-last" | "elders-last" => Some(FoodPriority::ElderlyLast),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Resources {
    pub food: f64,
    pub wood: f64,
    pub stone: f64,
    pub gold: f64,
    pub knowledge: f64,
}

impl Resources {
    pub fn get(&self, resource: TradeResource) -> f64 {
        match resource {
            TradeResource::Food => self.food,
            TradeResource::Wood => self.wood,
            TradeResource::Stone => self.stone,
        }
    }

    pub fn get_mut(&mut self, resource: TradeResource) -> &mut f64 {
        match resource {
            TradeResource::Food => &mut self.food,
            TradeResource::Wood => &mut self.wood,
            TradeResource::Stone => &mut self.stone,
        }
    }
}

/// Per-resource trade price multipliers, clamped to `[0.5, 2.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradePrices {
    pub food: f64,
    pub wood: f64,
    pub stone: f64,
}

impl Default for TradePrices {
    fn default() -> Self {
        TradePrices {
            food: 1.0,
            wood: 1.0,
            stone: 1.0,
        }
    }
}

impl TradePrices {
    pub fn get(&self, resource: TradeResource) -> f64 {
        match resource {
            TradeResource::Food => self.food,
            TradeResource::Wood => self.wood,
            TradeResource::Stone => self.stone,
        }
    }
}

/// Cumulative counters. Never decrease during a game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameStats {
    pub total_births: u32,
    pub total_deaths: u32,
    pub peak_population: u32,
    pub total_food_produced: f64,
    pub total_gold_mined: f64,
    pub festivals_held: u32,
    pub starvation_days: u32,
    pub invasions_repelled: u32,
    pub raids_survived: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogKind {
    Info,
    Warning,
    Danger,
    Success,
    Narrative,
    Tech,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the game's whole log, counting entries already dropped.
    pub seq: u64,
    pub tick: u32,
    pub kind: LogKind,
    pub message: String,
}

/// The single source of truth. Each transition returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub id: Uuid,
    pub status: GameStatus,
    pub paused: bool,
    pub difficulty: Difficulty,
    pub tick: u32,
    pub season: Season,
    pub resources: Resources,
    pub buildings: Buildings,
    pub technologies: BTreeSet<TechId>,
    pub population: Vec<Villager>,
    pub event_pool: EventPool,
    pub food_priority: FoodPriority,
    pub trade_prices: TradePrices,
    pub stats: GameStats,
    pub log: VecDeque<LogEntry>,
    pub ending: Option<Ending>,
    pub next_id: u64,
    pub next_log_seq: u64,
}

impl WorldState {
    /// The pre-game state: no village yet.
    pub fn menu() -> Self {
        WorldState {
            id: Uuid::nil(),
            status: GameStatus::Menu,
            paused: false,
            difficulty: Difficulty::Normal,
            tick: 0,
            season: Season::Spring,
            resources: Resources::default(),
            buildings: Buildings::default(),
            technologies: BTreeSet::new(),
            population: Vec::new(),
            event_pool: EventPool::default(),
            food_priority: FoodPriority::Equal,
            trade_prices: TradePrices::default(),
            stats: GameStats::default(),
            log: VecDeque::new(),
            ending: None,
            next_id: 1,
            next_log_seq: 0,
        }
    }

    pub fn profile(&self) -> &'static DifficultyProfile {
        self.difficulty.profile()
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Playing && !self.paused
    }

    pub fn has_tech(&self, tech: TechId) -> bool {
        self.technologies.contains(&tech)
    }

    pub fn building(&self, kind: BuildingKind) -> u32 {
        self.buildings.count(kind)
    }

    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_log(&mut self, kind: LogKind, message: impl Into<String>) {
        let seq = self.next_log_seq;
        self.next_log_seq += 1;
        self.log.push_back(LogEntry {
            seq,
            tick: self.tick,
            kind,
            message: message.into(),
        });
        while self.log.len() > LOG_CAPACITY {
            self.log.pop_front();
        }
    }

    pub fn average_happiness(&self) -> f64 {
        let total: f64 = self.population.iter().map(|v| v.happiness).sum();
        ratio_or_zero(total, self.population.len() as f64)
    }

    pub fn count_job(&self, job: Job) -> usize {
        self.population.iter().filter(|v| v.job == job).count()
    }

    pub fn housing_capacity(&self) -> u32 {
        let per_house = if self.has_tech(TechId::Masonry) {
            HOUSE_CAPACITY_UPGRADED
        } else {
            HOUSE_CAPACITY_BASE
        };
        self.building(BuildingKind::House) * per_house
    }

    pub fn villager(&self, id: VillagerId) -> Option<&Villager> {
        self.population.iter().find(|v| v.id == id)
    }
}
