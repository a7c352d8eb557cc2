use serde::{Deserialize, Serialize};

use crate::rules::jobs::{ADULT_AGE, ELDER_AGE};
use crate::rules::Job;

pub const NAME_SEPARATOR: char = '·';
pub const DEFAULT_HAPPINESS_BASELINE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VillagerId(pub u64);

impl std::fmt::Display for VillagerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// What the villager did this week. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    Idle,
    Working,
    Freezing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Villager {
    pub id: VillagerId,
    /// Given name and surname joined by `·`.
    pub name: String,
    pub age: u32,
    pub job: Job,
    pub happiness: f64,
    pub happiness_baseline: f64,
    pub health: f64,
    pub hunger: f64,
    pub energy: f64,
    pub activity: Activity,
    pub bio: Option<String>,
    pub last_bio_year: u32,
}

impl Villager {
    pub fn is_adult(&self) -> bool {
        self.age >= ADULT_AGE
    }

    pub fn is_child(&self) -> bool {
        self.age < ADULT_AGE
    }

    pub fn is_elder(&self) -> bool {
        self.age >= ELDER_AGE
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn given_name(&self) -> &str {
        self.name
            .split_once(NAME_SEPARATOR)
            .map_or(self.name.as_str(), |(given, _)| given)
    }

    pub fn surname(&self) -> &str {
        self.name
            .split_once(NAME_SEPARATOR)
            .map_or("", |(_, surname)| surname)
    }

    /// Activity implied by the job when nothing worse is happening.
    pub fn default_activity(&self) -> Activity {
        if self.job.is_employed() {
            Activity::Working
        } else {
            Activity::Idle
        }
    }
}
