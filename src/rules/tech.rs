use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TechId {
    Tools,
    Farming,
    Archery,
    Forestry,
    Scribing,
    Medicine,
    Irrigation,
    Masonry,
    Metallurgy,
    Engineering,
    Preservation,
    Cavalry,
    Alchemy,
    Architecture,
    Philosophy,
    AdvancedFarming,
}

impl TechId {
    pub const ALL: [TechId; 16] = [
        TechId::Tools,
        TechId::Farming,
        TechId::Archery,
        TechId::Forestry,
        TechId::Scribing,
        TechId::Medicine,
        TechId::Irrigation,
        TechId::Masonry,
        TechId::Metallurgy,
        TechId::Engineering,
        TechId::Preservation,
        TechId::Cavalry,
        TechId::Alchemy,
        TechId::Architecture,
        TechId::Philosophy,
        TechId::AdvancedFarming,
    ];

    /// Knowledge required to research.
    pub fn cost(self) -> f64 {
        match self {
            TechId::Tools => 80.0,
            TechId::Farming => 100.0,
            TechId::Archery => 150.0,
            TechId::Forestry => 150.0,
            TechId::Scribing => 180.0,
            TechId::Medicine => 250.0,
            TechId::Irrigation => 300.0,
            TechId::Masonry => 400.0,
            TechId::Metallurgy => 500.0,
            TechId::Engineering => 550.0,
            TechId::Preservation => 600.0,
            TechId::Cavalry => 650.0,
            TechId::Alchemy => 800.0,
            TechId::Architecture => 850.0,
            TechId::Philosophy => 900.0,
            TechId::AdvancedFarming => 950.0,
        }
    }

    /// Stable identifier used on the command line and in logs.
    pub fn key(self) -> &'static str {
        match self {
            TechId::Tools => "tools_1",
            TechId::Farming => "farming_1",
            TechId::Archery => "archery_1",
            TechId::Forestry => "forestry_1",
            TechId::Scribing => "scribing_1",
            TechId::Medicine => "medicine_1",
            TechId::Irrigation => "irrigation_1",
            TechId::Masonry => "masonry_1",
            TechId::Metallurgy => "metallurgy_1",
            TechId::Engineering => "engineering_1",
            TechId::Preservation => "preservation_1",
            TechId::Cavalry => "cavalry_1",
            TechId::Alchemy => "alchemy_1",
            TechId::Architecture => "architecture_1",
            TechId::Philosophy => "philosophy_1",
            TechId::AdvancedFarming => "advanced_farming",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TechId::Tools => "+20% wood, stone and gold output",
            TechId::Farming => "+0.2 food multiplier",
            TechId::Archery => "guards cover 15 villagers instead of 10",
            TechId::Forestry => "+20% wood output",
            TechId::Scribing => "scholars write an extra 7 knowledge per week",
            TechId::Medicine => "faster healing, old age is half as deadly",
            TechId::Irrigation => "+0.2 food multiplier",
            TechId::Masonry => "houses shelter 8 villagers instead of 5",
            TechId::Metallurgy => "+30% stone and gold output",
            TechId::Engineering => "construction and upkeep cost 10% less",
            TechId::Preservation => "food needs drop by 10%",
            TechId::Cavalry => "stables add 3 guard coverage each",
            TechId::Alchemy => "+15 knowledge every week",
            TechId::Architecture => "building bonuses are 20% stronger",
            TechId::Philosophy => "happiness recovers 3 points faster",
            TechId::AdvancedFarming => "+0.3 food multiplier",
        }
    }

    pub fn parse(key: &str) -> Option<TechId> {
        let lower = key.to_ascii_lowercase();
        TechId::ALL
            .into_iter()
            .find(|t| t.key() == lower || t.key().trim_end_matches("_1") == lower)
    }
}
