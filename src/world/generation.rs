use uuid::Uuid;

use crate::rules::buildings::STARTING_HOUSES;
use crate::rules::jobs::ADULT_AGE;
use crate::rules::{BuildingKind, Difficulty, Job, Season};
use crate::simulation::random::RandomSource;
use crate::world::villager::{DEFAULT_HAPPINESS_BASELINE, NAME_SEPARATOR};
use crate::world::{Activity, Buildings, GameStatus, LogKind, Resources, Villager, VillagerId, WorldState};

const NAMES_MALE: &[&str] = &[
    "Aldric", "Bram", "Cedric", "Dunstan", "Edmund", "Fulk", "Godric", "Hal", "Ivo", "Jasper",
    "Leofric", "Merrick", "Osric", "Piers", "Rowan", "Tobin", "Walter", "Wystan",
];

const NAMES_FEMALE: &[&str] = &[
    "Agnes", "Beatrix", "Cecily", "Edith", "Elswyth", "Gwen", "Hilda", "Isolde", "Joan",
    "Mabel", "Maud", "Odile", "Rosalind", "Sybil", "Tamsin", "Wynne",
];

const SURNAMES: &[&str] = &[
    "Ashdown", "Barrow", "Cooper", "Fletcher", "Hale", "Marsh", "Miller", "Oakes", "Reeve",
    "Shepherd", "Thatcher", "Tanner", "Underwood", "Ward", "Weaver", "Wright",
];

/// Build one villager.
///
/// With `age` unset the villager is a random settler aged 16-55 with a rolled
/// starting job. With an explicit age (births, immigrants) the villager starts
/// unemployed, or as a child below 16.
pub fn generate_villager(id: VillagerId, age: Option<u32>, rng: &mut impl RandomSource) -> Villager {
    let given = if rng.chance(0.5) {
        NAMES_MALE[rng.index(NAMES_MALE.len())]
    } else {
        NAMES_FEMALE[rng.index(NAMES_FEMALE.len())]
    };
    let surname = SURNAMES[rng.index(SURNAMES.len())];

    let settler = age.is_none();
    let age = age.unwrap_or_else(|| rng.range_u32(ADULT_AGE, 56));

    let job = if age < ADULT_AGE {
        Job::Child
    } else if settler {
        starting_job(rng.unit())
    } else {
        Job::Unemployed
    };

    Villager {
        id,
        name: format!("{}{}{}", given, NAME_SEPARATOR, surname),
        age,
        job,
        happiness: rng.range_u32(70, 100) as f64,
        happiness_baseline: DEFAULT_HAPPINESS_BASELINE,
        health: rng.range_u32(80, 100) as f64,
        hunger: rng.range_u32(0, 30) as f64,
        energy: rng.range_u32(50, 100) as f64,
        activity: Activity::Idle,
        bio: None,
        last_bio_year: 0,
    }
}

fn starting_job(roll: f64) -> Job {
    if roll < 0.6 {
        Job::Farmer
    } else if roll < 0.75 {
        Job::Woodcutter
    } else if roll < 0.85 {
        Job::Miner
    } else {
        Job::Unemployed
    }
}

/// A newborn taking the surname of `parent`.
pub fn generate_child(id: VillagerId, parent: &Villager, rng: &mut impl RandomSource) -> Villager {
    let mut baby = generate_villager(id, Some(0), rng);
    if !parent.surname().is_empty() {
        baby.name = format!("{}{}{}", baby.given_name(), NAME_SEPARATOR, parent.surname());
    }
    baby
}

/// Append `count` freshly generated villagers, allocating ids from the state.
pub fn add_villagers(state: &mut WorldState, count: usize, age: Option<u32>, rng: &mut impl RandomSource) {
    for _ in 0..count {
        let id = VillagerId(state.allocate_id());
        let v = generate_villager(id, age, rng);
        state.population.push(v);
    }
}

/// 128 random bits from the source, shaped as a v4 UUID.
pub fn game_id(rng: &mut impl RandomSource) -> Uuid {
    let high = rng.next_u64() as u128;
    let low = rng.next_u64() as u128;
    let mut bytes = ((high << 64) | low).to_be_bytes();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Uuid::from_bytes(bytes)
}

/// A fresh game in the Playing state, built from the difficulty preset.
pub fn new_game(difficulty: Difficulty, rng: &mut impl RandomSource) -> WorldState {
    let profile = difficulty.profile();
    let start = profile.starting_resources;

    let mut state = WorldState::menu();
    state.id = game_id(rng);
    state.status = GameStatus::Playing;
    state.difficulty = difficulty;
    state.tick = 1;
    state.season = Season::from_tick(1);
    state.resources = Resources {
        food: start.food,
        wood: start.wood,
        stone: start.stone,
        gold: start.gold,
        knowledge: start.knowledge,
    };
    state.buildings = Buildings::default().with(BuildingKind::House, STARTING_HOUSES);

    add_villagers(&mut state, profile.starting_population as usize, None, rng);
    state.stats.peak_population = state.population.len() as u32;

    state.push_log(
        LogKind::Info,
        format!(
            "A village of {} settlers is founded ({} difficulty)",
            state.population.len(),
            profile.name
        ),
    );
    state
}

pub fn print_village_summary(state: &WorldState) {
    println!("=== Village Summary ===");
    println!("Game: {}", state.id);
    println!("Status: {:?}", state.status);
    println!("Difficulty: {}", state.profile().name);
    println!(
        "Tick: {} (year {}, {})",
        state.tick,
        crate::rules::calendar::year_of(state.tick),
        state.season.name()
    );

    let r = &state.resources;
    println!("\nResources:");
    println!("  {:<10} {:>10.2}", "Food", r.food);
    println!("  {:<10} {:>10.2}", "Wood", r.wood);
    println!("  {:<10} {:>10.2}", "Stone", r.stone);
    println!("  {:<10} {:>10.2}", "Gold", r.gold);
    println!("  {:<10} {:>10.2}", "Knowledge", r.knowledge);

    println!("\nPopulation: {} (avg happiness {:.1})", state.population.len(), state.average_happiness());
    for job in Job::ALL {
        let n = state.count_job(job);
        if n > 0 {
            println!("  {:<12} {:>5}", job.name(), n);
        }
    }

    println!("\nBuildings:");
    for (kind, count) in state.buildings.iter() {
        println!("  {:<16} {:>3}", kind.name(), count);
    }

    if !state.technologies.is_empty() {
        let techs: Vec<_> = state.technologies.iter().map(|t| t.key()).collect();
        println!("\nTechnologies: {}", techs.join(", "));
    }

    println!("\nPending events: {}", state.event_pool.len());
    if let Some(ending) = &state.ending {
        println!("\nEnding: {}", ending.kind.label());
        if let Some(reason) = ending.reason {
            println!("Reason: {}", reason.label());
        }
        println!("{}", ending.summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::random::{FixedSequence, SimRng};

    #[test]
    fn settlers_are_adults_with_bounded_attributes() {
        let mut rng = SimRng::new(42);
        for i in 0..200 {
            let v = generate_villager(VillagerId(i), None, &mut rng);
            assert!((16..=55).contains(&v.age), "age {}", v.age);
            assert!((70.0..=99.0).contains(&v.happiness));
            assert!((80.0..=99.0).contains(&v.health));
            assert!((0.0..=29.0).contains(&v.hunger));
            assert_eq!(v.happiness_baseline, 50.0);
            assert_ne!(v.job, Job::Child);
            assert!(v.name.contains(NAME_SEPARATOR));
        }
    }

    #[test]
    fn explicit_age_controls_job() {
        let mut rng = SimRng::new(1);
        assert_eq!(generate_villager(VillagerId(1), Some(0), &mut rng).job, Job::Child);
        assert_eq!(generate_villager(VillagerId(2), Some(30), &mut rng).job, Job::Unemployed);
    }

    #[test]
    fn starting_job_thresholds() {
        assert_eq!(starting_job(0.0), Job::Farmer);
        assert_eq!(starting_job(0.59), Job::Farmer);
        assert_eq!(starting_job(0.6), Job::Woodcutter);
        assert_eq!(starting_job(0.8), Job::Miner);
        assert_eq!(starting_job(0.9), Job::Unemployed);
    }

    #[test]
    fn child_inherits_parent_surname() {
        let mut rng = SimRng::new(3);
        let mut parent = generate_villager(VillagerId(1), None, &mut rng);
        parent.name = "Edith·Underwood".to_string();
        let baby = generate_child(VillagerId(2), &parent, &mut rng);
        assert_eq!(baby.surname(), "Underwood");
        assert_eq!(baby.age, 0);
        assert_eq!(baby.job, Job::Child);
    }

    #[test]
    fn new_game_uses_difficulty_preset() {
        let mut rng = SimRng::new(9);
        let state = new_game(Difficulty::Hard, &mut rng);
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.tick, 1);
        assert_eq!(state.population.len(), 15);
        assert_eq!(state.stats.peak_population, 15);
        assert_eq!(state.resources.food, 300.0);
        assert_eq!(state.resources.wood, 50.0);
        assert_eq!(state.building(BuildingKind::House), 4);
        assert!(!state.id.is_nil());
    }

    #[test]
    fn new_game_is_deterministic_for_a_seed() {
        let a = new_game(Difficulty::Normal, &mut SimRng::new(77));
        let b = new_game(Difficulty::Normal, &mut SimRng::new(77));
        assert_eq!(a, b);
    }

    #[test]
    fn villager_ids_are_unique() {
        let mut rng = FixedSequence::new(vec![0.3, 0.7, 0.1]);
        let state = new_game(Difficulty::Easy, &mut rng);
        let mut ids: Vec<_> = state.population.iter().map(|v| v.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), state.population.len());
    }
}
