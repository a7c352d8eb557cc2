use serde::{Deserialize, Serialize};

pub const HOUSE_CAPACITY_BASE: u32 = 5;
pub const HOUSE_CAPACITY_UPGRADED: u32 = 8;
pub const STARTING_HOUSES: u32 = 4;

pub const FESTIVAL_GOLD_COST: f64 = 60.0;
pub const FESTIVAL_FOOD_COST: f64 = 120.0;
pub const FESTIVAL_HAPPINESS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Market,
    StoneWall,
    Library,
    Tavern,
    Cathedral,
    Farm,
    LumberMill,
    Mine,
    Watchtower,
    Granary,
    Blacksmith,
    Temple,
    University,
    Workshop,
    Barracks,
    Stables,
    Aqueduct,
    TrainingGrounds,
    Alchemist,
}

/// A wood/stone/gold triple used for both construction and weekly upkeep.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cost {
    pub wood: f64,
    pub stone: f64,
    pub gold: f64,
}

impl Cost {
    pub const fn new(wood: f64, stone: f64, gold: f64) -> Self {
        Cost { wood, stone, gold }
    }

    pub fn scaled(self, factor: f64) -> Cost {
        Cost {
            wood: self.wood * factor,
            stone: self.stone * factor,
            gold: self.gold * factor,
        }
    }
}

impl BuildingKind {
    pub const COUNT: usize = 20;

    pub const ALL: [BuildingKind; BuildingKind::COUNT] = [
        BuildingKind::House,
        BuildingKind::Market,
        BuildingKind::StoneWall,
        BuildingKind::Library,
        BuildingKind::Tavern,
        BuildingKind::Cathedral,
        BuildingKind::Farm,
        BuildingKind::LumberMill,
        BuildingKind::Mine,
        BuildingKind::Watchtower,
        BuildingKind::Granary,
        BuildingKind::Blacksmith,
        BuildingKind::Temple,
        BuildingKind::University,
        BuildingKind::Workshop,
        BuildingKind::Barracks,
        BuildingKind::Stables,
        BuildingKind::Aqueduct,
        BuildingKind::TrainingGrounds,
        BuildingKind::Alchemist,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn construction_cost(self) -> Cost {
        match self {
            BuildingKind::House => Cost::new(30.0, 3.0, 0.0),
            BuildingKind::Market => Cost::new(60.0, 15.0, 30.0),
            BuildingKind::StoneWall => Cost::new(0.0, 100.0, 0.0),
            BuildingKind::Library => Cost::new(60.0, 200.0, 0.0),
            BuildingKind::Tavern => Cost::new(100.0, 60.0, 60.0),
            BuildingKind::Cathedral => Cost::new(0.0, 350.0, 200.0),
            BuildingKind::Farm => Cost::new(50.0, 5.0, 15.0),
            BuildingKind::LumberMill => Cost::new(80.0, 20.0, 20.0),
            BuildingKind::Mine => Cost::new(60.0, 30.0, 30.0),
            BuildingKind::Watchtower => Cost::new(50.0, 60.0, 25.0),
            BuildingKind::Granary => Cost::new(60.0, 30.0, 20.0),
            BuildingKind::Blacksmith => Cost::new(60.0, 50.0, 60.0),
            BuildingKind::Temple => Cost::new(100.0, 120.0, 100.0),
            BuildingKind::University => Cost::new(120.0, 250.0, 200.0),
            BuildingKind::Workshop => Cost::new(70.0, 40.0, 50.0),
            BuildingKind::Barracks => Cost::new(80.0, 70.0, 40.0),
            BuildingKind::Stables => Cost::new(90.0, 30.0, 60.0),
            BuildingKind::Aqueduct => Cost::new(50.0, 150.0, 80.0),
            BuildingKind::TrainingGrounds => Cost::new(60.0, 80.0, 50.0),
            BuildingKind::Alchemist => Cost::new(80.0, 60.0, 100.0),
        }
    }

    /// Weekly upkeep of a single building.
    pub fn maintenance(self) -> Cost {
        match self {
            BuildingKind::House => Cost::new(0.5, 0.0, 0.2),
            BuildingKind::Market => Cost::new(1.0, 0.0, 1.0),
            BuildingKind::StoneWall => Cost::new(0.0, 0.5, 0.0),
            BuildingKind::Library => Cost::new(1.0, 0.0, 0.5),
            BuildingKind::Tavern => Cost::new(1.5, 0.0, 1.5),
            BuildingKind::Cathedral => Cost::new(2.0, 1.0, 2.0),
            BuildingKind::Farm => Cost::new(0.5, 0.0, 0.3),
            BuildingKind::LumberMill => Cost::new(1.0, 0.0, 0.5),
            BuildingKind::Mine => Cost::new(1.0, 0.5, 0.5),
            BuildingKind::Watchtower => Cost::new(1.0, 0.0, 0.5),
            BuildingKind::Granary => Cost::new(0.8, 0.0, 0.3),
            BuildingKind::Blacksmith => Cost::new(1.5, 0.0, 1.0),
            BuildingKind::Temple => Cost::new(1.5, 0.0, 1.0),
            BuildingKind::University => Cost::new(2.0, 0.5, 1.5),
            BuildingKind::Workshop => Cost::new(1.0, 0.0, 0.8),
            BuildingKind::Barracks => Cost::new(1.5, 0.0, 1.0),
            BuildingKind::Stables => Cost::new(2.0, 0.0, 1.5),
            BuildingKind::Aqueduct => Cost::new(0.0, 1.0, 0.5),
            BuildingKind::TrainingGrounds => Cost::new(1.0, 0.0, 0.8),
            BuildingKind::Alchemist => Cost::new(1.0, 0.0, 1.2),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BuildingKind::House => "house",
            BuildingKind::Market => "market",
            BuildingKind::StoneWall => "wall",
            BuildingKind::Library => "library",
            BuildingKind::Tavern => "tavern",
            BuildingKind::Cathedral => "cathedral",
            BuildingKind::Farm => "farm",
            BuildingKind::LumberMill => "lumber_mill",
            BuildingKind::Mine => "mine",
            BuildingKind::Watchtower => "watchtower",
            BuildingKind::Granary => "granary",
            BuildingKind::Blacksmith => "blacksmith",
            BuildingKind::Temple => "temple",
            BuildingKind::University => "university",
            BuildingKind::Workshop => "workshop",
            BuildingKind::Barracks => "barracks",
            BuildingKind::Stables => "stables",
            BuildingKind::Aqueduct => "aqueduct",
            BuildingKind::TrainingGrounds => "training_grounds",
            BuildingKind::Alchemist => "alchemist",
        }
    }

    pub fn parse(name: &str) -> Option<BuildingKind> {
        let lower = name.to_ascii_lowercase().replace('-', "_");
        BuildingKind::ALL.into_iter().find(|b| b.name() == lower)
    }
}
