pub mod actions;
pub mod economy;
pub mod food;
pub mod military;
pub mod numeric;
pub mod production;
pub mod random;
pub mod statistics;
pub mod villagers;

use std::time::Instant;

use tracing::debug;

use crate::ending::{finalize, DefeatReason, Outcome};
use crate::events::pool::{draw, draw_scheduled, populate, replenish};
use crate::events::trigger::{apply_event, AppliedDeltas};
use crate::events::{EventDraft, EventId, DRAW_THRESHOLD};
use crate::rules::calendar::{GAME_END_TICK, MAINTENANCE_WARNING_INTERVAL, MAX_FOOD};
use crate::rules::{BuildingKind, Cost, Difficulty, Job, Season, TechId, TradeResource, TradeSide};
use crate::simulation::actions::{require_playing, Rejected};
use crate::simulation::economy::Theft;
use crate::simulation::military::{Engagement, MilitaryDeltas};
use crate::simulation::numeric::round2;
use crate::simulation::production::WorkOutput;
use crate::simulation::random::RandomSource;
use crate::simulation::statistics::TickStatistics;
use crate::simulation::villagers::Care;
use crate::world::generation::new_game;
use crate::world::{FoodPriority, GameStatus, LogKind, VillagerId, WorldState};

pub use random::SimRng;

/// Everything that can change the village. Applied one at a time by [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    StartGame(Difficulty),
    TogglePause,
    AdvanceTick,
    AssignJob { job: Job, delta: i32 },
    Construct(BuildingKind),
    Research(TechId),
    Trade { resource: TradeResource, side: TradeSide },
    SetFoodPriority(FoodPriority),
    HoldFestival,
    Restart,
    PopulateEventPool(Vec<EventDraft>),
    ReplenishEventPool(Vec<EventDraft>),
    TriggerEvent(EventId),
    AttachBiography { villager: VillagerId, text: String, year: u32 },
    SetEndingSummary(String),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartGame(_) => "start_game",
            Action::TogglePause => "toggle_pause",
            Action::AdvanceTick => "advance_tick",
            Action::AssignJob { .. } => "assign_job",
            Action::Construct(_) => "construct",
            Action::Research(_) => "research",
            Action::Trade { .. } => "trade",
            Action::SetFoodPriority(_) => "set_food_priority",
            Action::HoldFestival => "hold_festival",
            Action::Restart => "restart",
            Action::PopulateEventPool(_) => "populate_event_pool",
            Action::ReplenishEventPool(_) => "replenish_event_pool",
            Action::TriggerEvent(_) => "trigger_event",
            Action::AttachBiography { .. } => "attach_biography",
            Action::SetEndingSummary(_) => "set_ending_summary",
        }
    }
}

/// What one simulated week did.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// The week that was simulated (the state's tick before advancing).
    pub week: u32,
    pub season: Season,
    pub produced: WorkOutput,
    pub theft: Theft,
    pub engagement: Option<Engagement>,
    pub freezing: bool,
    pub starving: bool,
    pub heating: f64,
    pub maintenance: Cost,
    pub births: u32,
    pub deaths: u32,
    pub event: Option<AppliedDeltas>,
    pub statistics: TickStatistics,
}

/// Result of applying one action.
#[derive(Debug)]
pub struct TickResult {
    pub state: WorldState,
    /// Present only when an `AdvanceTick` simulated a week.
    pub report: Option<TickReport>,
}

/// Apply `action` to a snapshot and return the successor.
///
/// Rejected actions return an unchanged copy.
pub fn transition(state: &WorldState, action: Action, rng: &mut impl RandomSource) -> WorldState {
    apply(state, action, rng).state
}

/// As [`transition`], also returning the week report for a simulated tick.
pub fn apply(state: &WorldState, action: Action, rng: &mut impl RandomSource) -> TickResult {
    if matches!(action, Action::AdvanceTick) {
        return advance_tick(state, rng);
    }
    let name = action.name();
    let mut next = state.clone();
    match apply_action(&mut next, action, rng) {
        Ok(()) => TickResult { state: next, report: None },
        Err(reason) => {
            debug!(action = name, reason = %reason, "Action rejected");
            TickResult {
                state: state.clone(),
                report: None,
            }
        }
    }
}

fn apply_action(state: &mut WorldState, action: Action, rng: &mut impl RandomSource) -> Result<(), Rejected> {
    match action {
        Action::StartGame(difficulty) => {
            if state.status == GameStatus::Playing {
                return Err(Rejected::GameInProgress);
            }
            *state = new_game(difficulty, rng);
            Ok(())
        }
        Action::Restart => {
            *state = WorldState::menu();
            Ok(())
        }
        Action::TogglePause => actions::toggle_pause(state),
        Action::AssignJob { job, delta } => actions::assign_job(state, job, delta),
        Action::Construct(kind) => actions::construct(state, kind),
        Action::Research(tech) => actions::research(state, tech),
        Action::Trade { resource, side } => actions::trade(state, resource, side),
        Action::SetFoodPriority(priority) => actions::set_food_priority(state, priority),
        Action::HoldFestival => actions::hold_festival(state),
        Action::PopulateEventPool(drafts) => {
            require_playing(state)?;
            populate(state, drafts);
            Ok(())
        }
        Action::ReplenishEventPool(drafts) => {
            require_playing(state)?;
            replenish(state, drafts);
            Ok(())
        }
        Action::TriggerEvent(id) => {
            require_playing(state)?;
            let event = state.event_pool.remove(id).ok_or(Rejected::UnknownEvent(id))?;
            apply_event(state, &event, rng);
            Ok(())
        }
        Action::AttachBiography { villager, text, year } => {
            actions::attach_biography(state, villager, &text, year)
        }
        Action::SetEndingSummary(summary) => actions::set_ending_summary(state, summary),
        Action::AdvanceTick => Ok(()),
    }
}

/// Simulate one week, or finish the game once ten years have passed.
///
/// Only runs while Playing and unpaused; otherwise returns the state unchanged.
pub fn advance_tick(state: &WorldState, rng: &mut impl RandomSource) -> TickResult {
    if !state.is_running() {
        return TickResult {
            state: state.clone(),
            report: None,
        };
    }
    let mut next = state.clone();
    if next.tick >= GAME_END_TICK {
        finalize(&mut next, Outcome::Victory);
        return TickResult {
            state: next,
            report: None,
        };
    }
    let report = simulate_week(&mut next, rng);
    TickResult {
        state: next,
        report: Some(report),
    }
}

fn simulate_week(state: &mut WorldState, rng: &mut impl RandomSource) -> TickReport {
    let started = Instant::now();
    let week = state.tick;
    let season = Season::from_tick(week);
    if season != state.season {
        state.push_log(LogKind::Info, format!("The season turns to {}", season.name()));
    }

    // Work and harvest
    let produced = production::produce(state, season);
    let food_multiplier = production::food_multiplier(state, season);

    // Security
    let security = economy::assess_security(state);
    let insecure = economy::theft_exposed(state, &security);
    let theft = economy::roll_theft(state, &security, rng);
    if theft.food > 0.0 || theft.gold > 0.0 {
        state.push_log(
            LogKind::Warning,
            format!("Thieves stole {} food and {} gold", theft.food, theft.gold),
        );
    }

    // Military
    let population = state.population.len();
    let engagement = military::is_military_week(week, population).then(|| {
        let threat = military::pick_threat(population, rng);
        military::resolve(threat, population, &security)
    });
    match engagement {
        Some(Engagement::Overrun { threat }) => {
            state.push_log(
                LogKind::Danger,
                format!("{} {} The village is overrun.", threat.message(), threat.failure_message()),
            );
            state.stats.total_deaths += population as u32;
            state.population.clear();
            state.season = season;
            state.tick += 1;
            finalize(state, Outcome::Defeat(DefeatReason::InsufficientMilitary));
            debug!(week, "Village overrun");
            return TickReport {
                week,
                season,
                produced,
                theft,
                engagement,
                freezing: false,
                starving: false,
                heating: 0.0,
                maintenance: Cost::default(),
                births: 0,
                deaths: population as u32,
                event: None,
                statistics: statistics::compute_statistics(state, elapsed_ms(started)),
            };
        }
        Some(Engagement::Repelled { threat, .. }) => {
            state.push_log(
                LogKind::Success,
                format!("{} {}", threat.message(), threat.success_message()),
            );
            state.stats.invasions_repelled += 1;
        }
        Some(Engagement::Survived { threat, .. }) => {
            state.push_log(
                LogKind::Danger,
                format!("{} {}", threat.message(), threat.failure_message()),
            );
            state.stats.raids_survived += 1;
        }
        None => {}
    }
    let military_deltas = engagement.map(|e| e.deltas()).unwrap_or_default();

    // Heating
    let heating_need = economy::heating_need(state, season);
    let available_wood = state.resources.wood + produced.wood;
    let freezing = available_wood < heating_need;
    let heating = if freezing { available_wood.max(0.0) } else { heating_need };
    if freezing {
        state.push_log(LogKind::Danger, "The woodpiles are empty and the village freezes!");
    }

    // Rationing, using ages from before this week's birthday
    let demand = food::demand(state);
    let available_food = round2(state.resources.food + produced.food - theft.food);
    let received = food::allocate(&demand, available_food);
    let starving = available_food < demand.total;
    let remaining_food = round2((available_food - demand.total).max(0.0));

    // Villagers
    villagers::age_villagers(state);
    let care = Care::for_week(state, freezing, insecure);
    for (i, v) in state.population.iter_mut().enumerate() {
        villagers::update_villager(v, received[i], demand.needs[i], &care);
    }

    let baby = villagers::roll_birth(state, freezing, rng);
    let mut deaths = villagers::roll_deaths(state, rng);
    if let Some(e) = &engagement {
        deaths += villagers::remove_casualties(state, e.casualties());
    }
    if deaths > 0 {
        state.push_log(LogKind::Danger, format!("{} villagers died this week", deaths));
    }
    let births = match baby {
        Some(baby) => {
            state.push_log(LogKind::Success, format!("{} is born", baby.given_name()));
            state.population.push(baby);
            1
        }
        None => 0,
    };

    // Settlement
    let maintenance = economy::maintenance(state);
    settle(state, &produced, remaining_food, heating, &maintenance, theft, military_deltas, week);

    // Pricing
    let woodcutters = state.count_job(Job::Woodcutter) as f64;
    let miners = state.count_job(Job::Miner) as f64;
    state.trade_prices = economy::trade_prices(
        production::base_food_production(produced.active_farmers, food_multiplier),
        woodcutters * Job::Woodcutter.base_yield().wood,
        miners * Job::Miner.base_yield().stone,
    );

    let stats = &mut state.stats;
    stats.total_births += births;
    stats.total_deaths += deaths;
    stats.peak_population = stats.peak_population.max(state.population.len() as u32);
    stats.total_food_produced = round2(stats.total_food_produced + produced.food);
    stats.total_gold_mined = round2(stats.total_gold_mined + produced.gold);
    if starving {
        stats.starvation_days += 1;
    }
    state.season = season;

    // Scheduled event
    let event = if draw_scheduled(week) && !state.event_pool.is_empty() && rng.unit() > DRAW_THRESHOLD {
        draw(&state.event_pool, rng)
            .and_then(|id| state.event_pool.remove(id))
            .map(|event| apply_event(state, &event, rng))
    } else {
        None
    };

    state.tick += 1;
    if state.population.is_empty() {
        finalize(state, Outcome::Defeat(DefeatReason::PopulationExtinct));
    }
    debug!(
        week,
        population = state.population.len(),
        food = state.resources.food,
        births,
        deaths,
        "Week simulated"
    );

    TickReport {
        week,
        season,
        produced,
        theft,
        engagement,
        freezing,
        starving,
        heating,
        maintenance,
        births,
        deaths,
        event,
        statistics: statistics::compute_statistics(state, elapsed_ms(started)),
    }
}

#[allow(clippy::too_many_arguments)]
fn settle(
    state: &mut WorldState,
    produced: &WorkOutput,
    remaining_food: f64,
    heating: f64,
    maintenance: &Cost,
    theft: Theft,
    military: MilitaryDeltas,
    week: u32,
) {
    let r = state.resources;
    let short = r.wood + produced.wood - heating < maintenance.wood
        || r.stone + produced.stone < maintenance.stone
        || r.gold + produced.gold - theft.gold < maintenance.gold;

    let resources = &mut state.resources;
    resources.food = round2((remaining_food + military.food).clamp(0.0, MAX_FOOD));
    resources.wood = round2((r.wood + produced.wood - heating - maintenance.wood + military.wood).max(0.0));
    resources.stone = round2((r.stone + produced.stone - maintenance.stone).max(0.0));
    resources.gold =
        round2((r.gold + produced.gold - theft.gold - maintenance.gold + military.gold).max(0.0));
    resources.knowledge = round2(r.knowledge + produced.knowledge);

    if short && week % MAINTENANCE_WARNING_INTERVAL == 0 {
        state.push_log(LogKind::Warning, "Not enough materials to maintain the buildings");
    }
}

fn elapsed_ms(started: Instant) -> f32 {
    started.elapsed().as_secs_f32() * 1000.0
}
