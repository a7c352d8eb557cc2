use village_chronicle::ending::{classify, EndingType, Outcome};
use village_chronicle::rules::{BuildingKind, Difficulty, Job, Season, TechId};
use village_chronicle::simulation::economy::{assess_security, roll_theft};
use village_chronicle::simulation::production::food_multiplier;
use village_chronicle::simulation::{apply, transition, Action, SimRng};
use village_chronicle::world::generation::add_villagers;
use village_chronicle::world::{GameStatus, WorldState};

fn playing(seed: u64) -> (WorldState, SimRng) {
    let mut rng = SimRng::new(seed);
    let state = transition(&WorldState::menu(), Action::StartGame(Difficulty::Normal), &mut rng);
    (state, rng)
}

#[test]
fn empty_granary_starves_the_village() {
    let (mut state, mut rng) = playing(5);
    state.resources.food = 0.0;
    for v in state.population.iter_mut().filter(|v| v.job != Job::Child) {
        v.job = Job::Unemployed;
    }
    let before = state.clone();

    let result = apply(&state, Action::AdvanceTick, &mut rng);
    let report = result.report.expect("a week was simulated");
    assert!(report.starving);
    assert_eq!(result.state.stats.starvation_days, 1);
    assert_eq!(result.state.resources.food, 0.0);
    for v in &result.state.population {
        if let Some(prev) = before.villager(v.id) {
            assert!(v.hunger > prev.hunger || v.hunger == 100.0, "{} did not get hungrier", v.name);
        }
    }
}

#[test]
fn births_never_overfill_the_houses() {
    let (mut state, mut rng) = playing(11);
    state.resources.wood = 1000.0;
    state.resources.stone = 1000.0;
    state.resources.gold = 1000.0;
    state.resources.food = 50_000.0;
    state = transition(&state, Action::Construct(BuildingKind::House), &mut rng);
    state = transition(&state, Action::Construct(BuildingKind::House), &mut rng);
    assert_eq!(state.building(BuildingKind::House), 6);
    for v in &mut state.population {
        v.happiness = 95.0;
        v.happiness_baseline = 95.0;
        v.hunger = 0.0;
        if v.job != Job::Child {
            v.job = Job::Guard;
        }
    }

    let capacity = state.housing_capacity() as usize;
    let mut births = 0;
    for _ in 0..200 {
        let result = apply(&state, Action::AdvanceTick, &mut rng);
        let Some(report) = result.report else { break };
        births += report.births;
        state = result.state;
        assert!(state.population.len() <= capacity);
        if state.status != GameStatus::Playing {
            break;
        }
    }
    assert!(births > 0, "a happy, fed village should have children");
}

#[test]
fn unguarded_village_is_robbed_about_one_week_in_ten() {
    let (mut state, _) = playing(23);
    for v in state.population.iter_mut().filter(|v| v.job == Job::Guard) {
        v.job = Job::Unemployed;
    }
    assert_eq!(state.population.len(), 20);
    let security = assess_security(&state);
    assert!(!security.secure);

    let mut rng = SimRng::new(99);
    let trials = 20_000;
    let robbed = (0..trials)
        .filter(|_| {
            let theft = roll_theft(&state, &security, &mut rng);
            theft.food > 0.0 || theft.gold > 0.0
        })
        .count();
    let rate = robbed as f64 / trials as f64;
    assert!((0.085..0.115).contains(&rate), "theft rate {}", rate);
}

#[test]
fn guarded_village_is_never_robbed() {
    let (mut state, _) = playing(23);
    for v in state.population.iter_mut().filter(|v| v.job != Job::Child) {
        v.job = Job::Guard;
    }
    let security = assess_security(&state);
    assert!(security.secure);

    let mut rng = SimRng::new(3);
    for _ in 0..1000 {
        let theft = roll_theft(&state, &security, &mut rng);
        assert_eq!(theft.food, 0.0);
        assert_eq!(theft.gold, 0.0);
    }
}

#[test]
fn farming_techs_stack_on_the_summer_harvest() {
    let (mut state, _) = playing(1);
    assert_eq!(food_multiplier(&state, Season::Summer), 1.0);
    state.technologies.insert(TechId::Farming);
    state.technologies.insert(TechId::Irrigation);
    assert!((food_multiplier(&state, Season::Summer) - 1.4).abs() < 1e-9);
}

fn finished_village(population: usize, happiness: f64) -> WorldState {
    let (mut state, mut rng) = playing(42);
    let len = state.population.len();
    if population > len {
        add_villagers(&mut state, population - len, Some(30), &mut rng);
    } else {
        state.population.truncate(population);
    }
    for v in &mut state.population {
        v.happiness = happiness;
    }
    state.stats.starvation_days = 3;
    state.stats.total_deaths = 12;
    state
}

#[test]
fn large_village_becomes_a_metropolis() {
    let state = finished_village(60, 50.0);
    assert_eq!(classify(&state, Outcome::Victory), EndingType::Metropolis);
}

#[test]
fn tiny_village_counts_as_survivors() {
    let state = finished_village(6, 50.0);
    assert_eq!(classify(&state, Outcome::Victory), EndingType::Survivors);
}

#[test]
fn utopia_outranks_metropolis() {
    let mut state = finished_village(60, 95.0);
    state.stats.starvation_days = 0;
    state.stats.total_deaths = 0;
    assert_eq!(classify(&state, Outcome::Victory), EndingType::Utopia);
}

#[test]
fn plain_victory_when_nothing_stands_out() {
    let state = finished_village(30, 50.0);
    assert_eq!(classify(&state, Outcome::Victory), EndingType::Victory);
}

#[test]
fn the_game_ends_after_ten_years() {
    let (mut state, mut rng) = playing(8);
    state.tick = 520;
    let finished = transition(&state, Action::AdvanceTick, &mut rng);
    assert_eq!(finished.status, GameStatus::Finished);
    assert_eq!(finished.tick, 520);
    assert!(finished.ending.is_some());

    let after = transition(&finished, Action::AdvanceTick, &mut rng);
    assert_eq!(after, finished);
}
