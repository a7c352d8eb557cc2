use crate::rules::calendar::is_year_end;
use crate::rules::jobs::ADULT_AGE;
use crate::rules::{BuildingKind, Job, TechId};
use crate::simulation::food::shortage_ratio;
use crate::simulation::numeric::{clamp_attribute, round2};
use crate::simulation::random::RandomSource;
use crate::world::generation::generate_child;
use crate::world::villager::DEFAULT_HAPPINESS_BASELINE;
use crate::world::{Activity, LogKind, Villager, VillagerId, WorldState};

const FREEZING_HEALTH_LOSS: f64 = 5.0;
const FREEZING_HAPPINESS_LOSS: f64 = 5.0;
const INSECURITY_HAPPINESS_LOSS: f64 = 1.0;
const FED_HUNGER_RELIEF: f64 = 10.0;
const BIRTH_CHANCE_PER_CANDIDATE: f64 = 0.03;
const ELDER_DEATH_RATE: f64 = 0.003;

/// Age a year at every year end. Children who reach 16 join the unemployed.
pub fn age_villagers(state: &mut WorldState) {
    if !is_year_end(state.tick) {
        return;
    }
    let mut grown = Vec::new();
    for v in &mut state.population {
        v.age += 1;
        if v.age == ADULT_AGE && v.job == Job::Child {
            v.job = Job::Unemployed;
            grown.push(v.name.clone());
        }
    }
    for name in grown {
        state.push_log(LogKind::Info, format!("{} has come of age", name));
    }
}

fn cathedral_bonus(count: u32) -> f64 {
    match count {
        0 => 0.0,
        1 => 5.0,
        n => 8.0 + (n - 2).min(4) as f64,
    }
}

fn temple_bonus(count: u32) -> f64 {
    match count {
        0 => 0.0,
        n => 2.0 + (n - 1).min(5) as f64,
    }
}

/// Baseline happiness a well-fed villager drifts toward. Cathedrals add at
/// most 12 and temples at most 7.
pub fn happiness_baseline(state: &WorldState) -> f64 {
    let bonus = cathedral_bonus(state.building(BuildingKind::Cathedral))
        + temple_bonus(state.building(BuildingKind::Temple));
    DEFAULT_HAPPINESS_BASELINE + bonus
}

/// Village-wide conditions for one week of villager updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Care {
    pub freezing: bool,
    pub insecure: bool,
    pub heal_rate: f64,
    /// Weekly happiness gain toward the baseline.
    pub recovery: f64,
    pub baseline: f64,
}

impl Care {
    pub fn for_week(state: &WorldState, freezing: bool, insecure: bool) -> Care {
        let taverns = if state.building(BuildingKind::Tavern) > 0 { 2.0 } else { 0.0 };
        let temples = state.building(BuildingKind::Temple) as f64;
        let philosophy = if state.has_tech(TechId::Philosophy) { 3.0 } else { 0.0 };
        Care {
            freezing,
            insecure,
            heal_rate: if state.has_tech(TechId::Medicine) { 5.0 } else { 2.0 },
            recovery: 2.0 + taverns + temples + philosophy,
            baseline: happiness_baseline(state),
        }
    }
}

/// Apply cold, insecurity and rationing to one villager.
pub fn update_villager(v: &mut Villager, received: f64, need: f64, care: &Care) {
    if care.freezing {
        v.health -= FREEZING_HEALTH_LOSS;
        v.happiness -= FREEZING_HAPPINESS_LOSS;
        v.activity = Activity::Freezing;
    } else {
        v.activity = v.default_activity();
    }
    if care.insecure {
        v.happiness -= INSECURITY_HAPPINESS_LOSS;
    }

    let shortage = shortage_ratio(received, need);
    if shortage > 0.0 {
        v.hunger += round2(shortage * 20.0);
        v.happiness -= round2(shortage * 10.0);
        v.health -= round2(shortage * 5.0);
    } else {
        v.hunger = (v.hunger - FED_HUNGER_RELIEF).max(0.0);
        v.happiness_baseline = care.baseline;
        if !care.freezing {
            v.health += care.heal_rate;
            if v.hunger == 0.0 {
                v.happiness = clamp_attribute(v.happiness);
                if v.happiness < v.happiness_baseline {
                    v.happiness += (v.happiness_baseline - v.happiness).min(care.recovery);
                } else if v.happiness > v.happiness_baseline {
                    v.happiness = (v.happiness - 1.0).max(v.happiness_baseline);
                }
            }
        }
    }

    v.health = clamp_attribute(v.health);
    v.hunger = clamp_attribute(v.hunger);
    v.happiness = clamp_attribute(v.happiness);
    v.energy = clamp_attribute(v.energy);
}

/// Whether a villager could become a parent this week.
pub fn is_fertile(v: &Villager, freezing: bool) -> bool {
    (18..=40).contains(&v.age) && v.happiness > 70.0 && v.hunger == 0.0 && !freezing
}

/// At most one birth a week, and only while housing has room.
///
/// The baby takes the surname of a random villager. It is returned rather than
/// pushed so it joins after the week's deaths.
pub fn roll_birth(state: &mut WorldState, freezing: bool, rng: &mut impl RandomSource) -> Option<Villager> {
    if state.population.len() >= state.housing_capacity() as usize {
        return None;
    }
    let candidates = state.population.iter().filter(|v| is_fertile(v, freezing)).count();
    if candidates == 0 || !rng.chance(candidates as f64 * BIRTH_CHANCE_PER_CANDIDATE) {
        return None;
    }
    let parent = state.population[rng.index(state.population.len())].clone();
    let id = VillagerId(state.allocate_id());
    Some(generate_child(id, &parent, rng))
}

pub fn elder_death_chance(age: u32, medicine: bool) -> f64 {
    if age <= 60 {
        return 0.0;
    }
    let chance = (age - 60) as f64 * ELDER_DEATH_RATE;
    if medicine { chance * 0.5 } else { chance }
}

/// Remove the dead and return how many died.
///
/// A villager with no health left always dies; elders also roll against age.
pub fn roll_deaths(state: &mut WorldState, rng: &mut impl RandomSource) -> u32 {
    let medicine = state.has_tech(TechId::Medicine);
    let before = state.population.len();
    state.population.retain(|v| {
        if !v.is_alive() {
            return false;
        }
        let chance = elder_death_chance(v.age, medicine);
        !(chance > 0.0 && rng.chance(chance))
    });
    (before - state.population.len()) as u32
}

/// Battle casualties fall from the back of the roster, capped at survivors.
pub fn remove_casualties(state: &mut WorldState, casualties: usize) -> u32 {
    let n = casualties.min(state.population.len());
    let keep = state.population.len() - n;
    state.population.truncate(keep);
    n as u32
}
