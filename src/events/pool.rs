use crate::events::catalogue::fixed_events;
use crate::events::{
    Event, EventDraft, EventId, EventPool, DRAW_INTERVAL, DRAW_MIN_TICK, LOW_WATER_MARK,
    POOL_CAPACITY, REPLENISH_INTERVAL,
};
use crate::simulation::random::RandomSource;
use crate::world::WorldState;

/// Weighted pick over the pool in insertion order.
///
/// Draws `r` uniformly from `[0, total)` and subtracts weights until the
/// remainder is at most zero. Rounding that leaves `r` positive selects the
/// last event.
pub fn draw(pool: &EventPool, rng: &mut impl RandomSource) -> Option<EventId> {
    let events = pool.events();
    let last = events.last()?;
    let mut remainder = rng.unit() * pool.total_weight();
    for event in events {
        remainder -= event.weight;
        if remainder <= 0.0 {
            return Some(event.id);
        }
    }
    Some(last.id)
}

/// Give drafts ids from the state's counter and append them to the pool.
pub fn append_drafts(state: &mut WorldState, drafts: Vec<EventDraft>) {
    for draft in drafts {
        let id = EventId(state.allocate_id());
        state.event_pool.push(Event::from_draft(id, draft));
    }
}

/// Replace the pool with freshly derived events plus `drafts`.
pub fn populate(state: &mut WorldState, drafts: Vec<EventDraft>) {
    state.event_pool.clear();
    let fixed = fixed_events(state);
    append_drafts(state, fixed);
    append_drafts(state, drafts);
    state.event_pool.trim_to_capacity(POOL_CAPACITY);
}

/// Prune stale derived events, re-derive them, and append `drafts`.
pub fn replenish(state: &mut WorldState, drafts: Vec<EventDraft>) {
    state.event_pool.retain(|e| !e.is_derived());
    let fixed = fixed_events(state);
    append_drafts(state, fixed);
    append_drafts(state, drafts);
    state.event_pool.trim_to_capacity(POOL_CAPACITY);
}

/// Whether the driver should fetch a new batch before the next tick.
pub fn needs_replenishment(state: &WorldState) -> bool {
    state.is_running()
        && state.tick > 1
        && state.tick % REPLENISH_INTERVAL == 0
        && state.event_pool.len() < LOW_WATER_MARK
}

/// Weeks on which the tick rolls for a scheduled event.
pub fn draw_scheduled(tick: u32) -> bool {
    tick > DRAW_MIN_TICK && tick % DRAW_INTERVAL == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventCategory, EventSource};
    use crate::rules::Difficulty;
    use crate::simulation::random::{FixedSequence, SimRng};
    use crate::world::generation::new_game;
    use crate::world::WorldState;

    fn draft(msg: &str, weight: f64) -> EventDraft {
        EventDraft::external(msg, EventCategory::Info, 0.0, 0.0, 0.0, 0)
            .with_source(EventSource::External, weight)
    }

    fn state() -> WorldState {
        new_game(Difficulty::Normal, &mut SimRng::new(21))
    }

    fn pool_of(weights: &[f64]) -> (WorldState, Vec<EventId>) {
        let mut s = state();
        let drafts = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| draft(&format!("event {}", i), w))
            .collect();
        append_drafts(&mut s, drafts);
        let ids = s.event_pool.iter().map(|e| e.id).collect();
        (s, ids)
    }

    #[test]
    fn draw_from_empty_pool_is_none() {
        let pool = EventPool::default();
        assert!(draw(&pool, &mut SimRng::new(1)).is_none());
    }

    #[test]
    fn draw_walks_weights_in_order() {
        let (s, ids) = pool_of(&[1.0, 2.0, 1.0]);
        // total 4: r = 0.0 -> first; r = 2.0 -> second; r = 3.6 -> third
        assert_eq!(draw(&s.event_pool, &mut FixedSequence::constant(0.0)), Some(ids[0]));
        assert_eq!(draw(&s.event_pool, &mut FixedSequence::constant(0.5)), Some(ids[1]));
        assert_eq!(draw(&s.event_pool, &mut FixedSequence::constant(0.9)), Some(ids[2]));
    }

    #[test]
    fn draw_frequencies_follow_weights() {
        let (s, ids) = pool_of(&[1.0, 3.0]);
        let mut rng = SimRng::new(99);
        let trials = 8000;
        let heavy = (0..trials)
            .filter(|_| draw(&s.event_pool, &mut rng) == Some(ids[1]))
            .count();
        let share = heavy as f64 / trials as f64;
        assert!((0.72..0.78).contains(&share), "heavy share {}", share);
    }

    #[test]
    fn populate_replaces_pool_with_fixed_and_drafts() {
        let (mut s, _) = pool_of(&[1.0, 1.0, 1.0]);
        populate(&mut s, vec![draft("fresh", 1.0)]);
        let fixed = fixed_events(&s).len();
        assert_eq!(s.event_pool.len(), fixed + 1);
        assert!(s.event_pool.iter().any(|e| e.message == "fresh"));
        assert!(!s.event_pool.iter().any(|e| e.message == "event 0"));
    }

    #[test]
    fn replenish_recomputes_derived_events() {
        let mut s = state();
        populate(&mut s, vec![draft("kept", 1.0)]);
        let before = s.event_pool.len();
        replenish(&mut s, vec![draft("new", 1.0)]);
        let derived = s.event_pool.iter().filter(|e| e.is_derived()).count();
        assert_eq!(derived, fixed_events(&s).len());
        assert_eq!(s.event_pool.len(), before + 1);
        assert!(s.event_pool.iter().any(|e| e.message == "kept"));
    }

    #[test]
    fn replenish_respects_capacity() {
        let mut s = state();
        let drafts = (0..POOL_CAPACITY + 10).map(|i| draft(&format!("d{}", i), 1.0)).collect();
        replenish(&mut s, drafts);
        assert_eq!(s.event_pool.len(), POOL_CAPACITY);
        // Oldest drafts are dropped, fresh derived events stay.
        assert!(s.event_pool.iter().any(|e| e.message == format!("d{}", POOL_CAPACITY + 9)));
        assert!(!s.event_pool.iter().any(|e| e.message == "d0"));
        let derived = s.event_pool.iter().filter(|e| e.is_derived()).count();
        assert_eq!(derived, fixed_events(&s).len());
    }

    #[test]
    fn event_ids_are_unique() {
        let (s, ids) = pool_of(&[1.0, 1.0, 1.0, 1.0]);
        let mut sorted = ids.clone();
        sorted.dedup();
        assert_eq!(sorted.len(), s.event_pool.len());
    }

    #[test]
    fn replenishment_needs_low_pool_on_interval() {
        let mut s = state();
        s.tick = 10;
        assert!(needs_replenishment(&s));
        s.tick = 11;
        assert!(!needs_replenishment(&s));
        s.tick = 20;
        append_drafts(&mut s, (0..LOW_WATER_MARK).map(|i| draft(&i.to_string(), 1.0)).collect());
        assert!(!needs_replenishment(&s));
    }

    #[test]
    fn scheduled_draw_weeks() {
        assert!(!draw_scheduled(3));
        assert!(draw_scheduled(6));
        assert!(!draw_scheduled(7));
        assert!(draw_scheduled(9));
    }
}
