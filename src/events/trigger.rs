use crate::events::{Event, EventCategory, EventSource};
use crate::rules::calendar::MAX_FOOD;
use crate::rules::economy::WALL_GUARD_BONUS;
use crate::rules::{BuildingKind, Job};
use crate::simulation::economy::base_coverage;
use crate::simulation::numeric::{ratio_or_zero, round2};
use crate::simulation::random::RandomSource;
use crate::world::generation::add_villagers;
use crate::world::{LogKind, WorldState};

/// Deltas after happiness, difficulty and guard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AppliedDeltas {
    pub food: f64,
    pub wood: f64,
    pub gold: f64,
    pub pop: i32,
}

/// `1 + (avg - 50) / 200`: 0.75 for a miserable village, 1.25 for a joyful one.
pub fn happiness_multiplier(state: &WorldState) -> f64 {
    round2(1.0 + (state.average_happiness() - 50.0) / 200.0)
}

/// Share of the village the guards can watch over, capped at 1.
pub fn security_ratio(state: &WorldState) -> f64 {
    let guards = state.count_job(Job::Guard) as f64;
    let coverage = base_coverage(state)
        + state.building(BuildingKind::StoneWall) as f64 * WALL_GUARD_BONUS;
    let population = state.population.len().max(1) as f64;
    round2((guards * coverage / population).min(1.0))
}

/// Scale raw event deltas by the current state of the village.
pub fn modified_deltas(state: &WorldState, event: &Event) -> AppliedDeltas {
    let loss_factor = state.difficulty.event_loss_factor();
    let multiplier = happiness_multiplier(state);
    let security = security_ratio(state);

    let scale = |raw: f64, mitigation: f64| {
        if raw > 0.0 {
            round2(raw * multiplier)
        } else if raw < 0.0 {
            let mut loss = round2(raw * loss_factor);
            loss = round2(ratio_or_zero(loss, multiplier));
            if security > 0.5 {
                loss = round2(loss * (1.0 - security * mitigation));
            }
            loss
        } else {
            0.0
        }
    };

    AppliedDeltas {
        food: scale(event.delta_food, 0.5),
        wood: event.delta_wood,
        gold: scale(event.delta_gold, 0.8),
        pop: event.delta_pop,
    }
}

/// Apply one event's effects exactly once. The caller removes it from the pool.
pub fn apply_event(state: &mut WorldState, event: &Event, rng: &mut impl RandomSource) -> AppliedDeltas {
    let deltas = modified_deltas(state, event);

    let r = &mut state.resources;
    r.food = round2((r.food + deltas.food).clamp(0.0, MAX_FOOD));
    r.wood = round2((r.wood + deltas.wood).max(0.0));
    r.gold = round2((r.gold + deltas.gold).max(0.0));

    if deltas.pop < 0 {
        let leaving = (deltas.pop.unsigned_abs() as usize).min(state.population.len());
        state.population.drain(..leaving);
    } else if deltas.pop > 0 {
        add_villagers(state, deltas.pop as usize, None, rng);
        state.stats.peak_population = state.stats.peak_population.max(state.population.len() as u32);
    }

    let kind = match (event.source, event.category) {
        (EventSource::External, _) => LogKind::Narrative,
        (_, EventCategory::Info) => LogKind::Info,
        (_, EventCategory::Warning) => LogKind::Warning,
        (_, EventCategory::Danger) => LogKind::Danger,
        (_, EventCategory::Success) => LogKind::Success,
    };
    state.push_log(kind, event.message.clone());
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventDraft, EventId};
    use crate::rules::Difficulty;
    use crate::simulation::random::SimRng;
    use crate::world::generation::new_game;

    fn state_with(difficulty: Difficulty, happiness: f64) -> WorldState {
        let mut s = new_game(difficulty, &mut SimRng::new(4));
        for v in &mut s.population {
            v.happiness = happiness;
            v.job = Job::Farmer;
        }
        s
    }

    fn event(food: f64, wood: f64, gold: f64, pop: i32) -> Event {
        Event::from_draft(
            EventId(999),
            EventDraft::external("test", EventCategory::Info, food, wood, gold, pop),
        )
    }

    #[test]
    fn multiplier_spans_quarter_either_side() {
        assert_eq!(happiness_multiplier(&state_with(Difficulty::Normal, 0.0)), 0.75);
        assert_eq!(happiness_multiplier(&state_with(Difficulty::Normal, 50.0)), 1.0);
        assert_eq!(happiness_multiplier(&state_with(Difficulty::Normal, 100.0)), 1.25);
    }

    #[test]
    fn gains_amplified_by_happiness() {
        let s = state_with(Difficulty::Normal, 100.0);
        let d = modified_deltas(&s, &event(100.0, 20.0, 40.0, 0));
        assert_eq!(d.food, 125.0);
        assert_eq!(d.gold, 50.0);
        assert_eq!(d.wood, 20.0);
    }

    #[test]
    fn losses_worse_on_hard_and_when_unhappy() {
        let normal = modified_deltas(&state_with(Difficulty::Normal, 50.0), &event(-60.0, 0.0, 0.0, 0));
        let hard = modified_deltas(&state_with(Difficulty::Hard, 50.0), &event(-60.0, 0.0, 0.0, 0));
        assert_eq!(normal.food, -60.0);
        assert_eq!(hard.food, -90.0);
        let sad = modified_deltas(&state_with(Difficulty::Normal, 0.0), &event(-60.0, 0.0, 0.0, 0));
        assert_eq!(sad.food, -80.0);
    }

    #[test]
    fn guards_mitigate_losses() {
        let mut s = state_with(Difficulty::Normal, 50.0);
        for v in s.population.iter_mut().take(2) {
            v.job = Job::Guard;
        }
        // 2 guards x 10 coverage over 20 villagers = full security.
        assert_eq!(security_ratio(&s), 1.0);
        let d = modified_deltas(&s, &event(-100.0, 0.0, -100.0, 0));
        assert_eq!(d.food, -50.0);
        assert_eq!(d.gold, -20.0);
    }

    #[test]
    fn resources_never_go_negative() {
        let mut s = state_with(Difficulty::Normal, 50.0);
        s.resources.food = 10.0;
        s.resources.gold = 5.0;
        apply_event(&mut s, &event(-500.0, -500.0, -500.0, 0), &mut SimRng::new(1));
        assert_eq!(s.resources.food, 0.0);
        assert_eq!(s.resources.wood, 0.0);
        assert_eq!(s.resources.gold, 0.0);
    }

    #[test]
    fn departures_leave_from_the_front() {
        let mut s = state_with(Difficulty::Normal, 50.0);
        let third = s.population[2].id;
        apply_event(&mut s, &event(0.0, 0.0, 0.0, -2), &mut SimRng::new(1));
        assert_eq!(s.population.len(), 18);
        assert_eq!(s.population[0].id, third);
    }

    #[test]
    fn arrivals_join_the_village() {
        let mut s = state_with(Difficulty::Normal, 50.0);
        apply_event(&mut s, &event(0.0, 0.0, 0.0, 3), &mut SimRng::new(1));
        assert_eq!(s.population.len(), 23);
        assert_eq!(s.stats.peak_population, 23);
    }

    #[test]
    fn departures_capped_at_population() {
        let mut s = state_with(Difficulty::Normal, 50.0);
        apply_event(&mut s, &event(0.0, 0.0, 0.0, -100), &mut SimRng::new(1));
        assert!(s.population.is_empty());
    }
}
