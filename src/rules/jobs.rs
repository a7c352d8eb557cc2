use serde::{Deserialize, Serialize};

pub const ADULT_AGE: u32 = 16;
pub const ELDER_AGE: u32 = 60;
pub const ADULT_FOOD_NEED: f64 = 21.0;
pub const CHILD_FOOD_NEED: f64 = 10.0;
pub const WINTER_WOOD_PER_PERSON: f64 = 7.0;
/// Food harvested per fully efficient farmer per week, before multipliers.
pub const FARMER_WEEKLY_BASE: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Job {
    Unemployed,
    Farmer,
    Woodcutter,
    Miner,
    Guard,
    Scholar,
    Child,
}

/// Weekly output of one fully efficient worker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JobYield {
    pub wood: f64,
    pub stone: f64,
    pub gold: f64,
    pub knowledge: f64,
}

impl Job {
    pub const ALL: [Job; 7] = [
        Job::Unemployed,
        Job::Farmer,
        Job::Woodcutter,
        Job::Miner,
        Job::Guard,
        Job::Scholar,
        Job::Child,
    ];

    /// Farmers feed the harvest step instead of yielding directly.
    pub fn base_yield(self) -> JobYield {
        match self {
            Job::Woodcutter => JobYield {
                wood: 20.0,
                ..JobYield::default()
            },
            Job::Miner => JobYield {
                stone: 7.0,
                gold: 3.0,
                ..JobYield::default()
            },
            Job::Scholar => JobYield {
                knowledge: 10.0,
                ..JobYield::default()
            },
            Job::Unemployed | Job::Farmer | Job::Guard | Job::Child => JobYield::default(),
        }
    }

    /// Jobs a player may move adults into.
    pub fn is_assignable(self) -> bool {
        !matches!(self, Job::Unemployed | Job::Child)
    }

    pub fn is_employed(self) -> bool {
        self.is_assignable()
    }

    pub fn name(self) -> &'static str {
        match self {
            Job::Unemployed => "unemployed",
            Job::Farmer => "farmer",
            Job::Woodcutter => "woodcutter",
            Job::Miner => "miner",
            Job::Guard => "guard",
            Job::Scholar => "scholar",
            Job::Child => "child",
        }
    }

    pub fn parse(name: &str) -> Option<Job> {
        let lower = name.to_ascii_lowercase();
        Job::ALL.into_iter().find(|j| j.name() == lower)
    }
}
