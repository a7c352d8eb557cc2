use crate::rules::economy::*;
use crate::rules::jobs::WINTER_WOOD_PER_PERSON;
use crate::rules::{BuildingKind, Cost, Job, Season, TechId, TradeResource};
use crate::simulation::numeric::round2;
use crate::simulation::random::RandomSource;
use crate::world::{TradePrices, WorldState};

/// Guard coverage per guard before building bonuses.
pub fn base_coverage(state: &WorldState) -> f64 {
    if state.has_tech(TechId::Archery) {
        GUARD_COVERAGE_UPGRADED
    } else {
        GUARD_COVERAGE_BASE
    }
}

/// Villagers one guard can secure, including defensive buildings.
pub fn guard_coverage(state: &WorldState) -> f64 {
    let b = |kind| state.building(kind) as f64;
    let cavalry = if state.has_tech(TechId::Cavalry) {
        b(BuildingKind::Stables) * STABLES_GUARD_BONUS
    } else {
        0.0
    };
    base_coverage(state)
        + b(BuildingKind::StoneWall) * WALL_GUARD_BONUS
        + b(BuildingKind::Watchtower) * WATCHTOWER_GUARD_BONUS
        + b(BuildingKind::Barracks) * BARRACKS_GUARD_BONUS
        + b(BuildingKind::TrainingGrounds) * TRAINING_GROUNDS_GUARD_BONUS
        + cavalry
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Security {
    pub guards: usize,
    pub base_coverage: f64,
    pub coverage: f64,
    pub required_guards: u32,
    pub secure: bool,
}

pub fn assess_security(state: &WorldState) -> Security {
    let guards = state.count_job(Job::Guard);
    let coverage = guard_coverage(state);
    let required_guards = ((state.population.len() as f64 / coverage).ceil() as u32).max(1);
    Security {
        guards,
        base_coverage: base_coverage(state),
        coverage,
        required_guards,
        secure: guards as u32 >= required_guards,
    }
}

/// Whether an insecure village is large enough to attract thieves.
pub fn theft_exposed(state: &WorldState, security: &Security) -> bool {
    !security.secure && state.population.len() > THEFT_POPULATION_THRESHOLD
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Theft {
    pub food: f64,
    pub gold: f64,
}

/// One weekly theft roll. Draws from `rng` only when the village is exposed.
pub fn roll_theft(state: &WorldState, security: &Security, rng: &mut impl RandomSource) -> Theft {
    if !theft_exposed(state, security) || !rng.chance(THEFT_CHANCE) {
        return Theft::default();
    }
    Theft {
        food: round2(state.resources.food * THEFT_RATE * state.profile().consumption_rate),
        gold: round2(state.resources.gold * THEFT_RATE),
    }
}

/// Wood burned to keep the village warm this week.
pub fn heating_need(state: &WorldState, season: Season) -> f64 {
    if season != Season::Winter {
        return 0.0;
    }
    (state.population.len() as f64 * WINTER_WOOD_PER_PERSON * state.profile().consumption_rate).ceil()
}

/// Weekly upkeep across every building, discounted by engineering.
pub fn maintenance(state: &WorldState) -> Cost {
    let mut total = Cost::default();
    for (kind, count) in state.buildings.iter() {
        let per = kind.maintenance();
        let n = count as f64;
        total.wood = round2(total.wood + per.wood * n);
        total.stone = round2(total.stone + per.stone * n);
        total.gold = round2(total.gold + per.gold * n);
    }
    if state.has_tech(TechId::Engineering) {
        total = Cost::new(
            round2(total.wood * 0.9),
            round2(total.stone * 0.9),
            round2(total.gold * 0.9),
        );
    }
    total
}

/// Construction cost after the engineering discount.
pub fn construction_cost(state: &WorldState, kind: BuildingKind) -> Cost {
    let cost = kind.construction_cost();
    if state.has_tech(TechId::Engineering) {
        let c = cost.scaled(0.9);
        Cost::new(round2(c.wood), round2(c.stone), round2(c.gold))
    } else {
        cost
    }
}

/// Scarcity pricing: surplus production pushes the modifier down.
pub fn price_modifier(resource: TradeResource, base_production: f64) -> f64 {
    round2(
        (PRICE_BASE_MODIFIER - base_production / resource.price_threshold())
            .clamp(PRICE_MODIFIER_MIN, PRICE_MODIFIER_MAX),
    )
}

pub fn trade_prices(base_food: f64, base_wood: f64, base_stone: f64) -> TradePrices {
    TradePrices {
        food: price_modifier(TradeResource::Food, base_food),
        wood: price_modifier(TradeResource::Wood, base_wood),
        stone: price_modifier(TradeResource::Stone, base_stone),
    }
}

/// Gold paid for one batch.
pub fn buy_price(state: &WorldState, resource: TradeResource) -> f64 {
    (resource.base_buy_price() * state.trade_prices.get(resource)).ceil()
}

/// Gold received for one batch.
pub fn sell_price(state: &WorldState, resource: TradeResource) -> f64 {
    (resource.base_sell_price() * state.trade_prices.get(resource)).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Difficulty;
    use crate::simulation::random::{FixedSequence, SimRng};
    use crate::world::generation::{add_villagers, new_game};
    use crate::world::Buildings;

    fn village(pop: usize) -> WorldState {
        let mut s = new_game(Difficulty::Normal, &mut SimRng::new(12));
        s.population.clear();
        add_villagers(&mut s, pop, Some(30), &mut SimRng::new(13));
        s
    }

    #[test]
    fn fifteen_villagers_need_two_guards() {
        let s = village(15);
        let sec = assess_security(&s);
        assert_eq!(sec.coverage, 10.0);
        assert_eq!(sec.required_guards, 2);
        assert!(!sec.secure);
        assert!(theft_exposed(&s, &sec));
    }

    #[test]
    fn at_least_one_guard_is_required() {
        let s = village(3);
        assert_eq!(assess_security(&s).required_guards, 1);
    }

    #[test]
    fn defensive_buildings_extend_coverage() {
        let mut s = village(15);
        s.buildings = Buildings::default()
            .with(BuildingKind::StoneWall, 1)
            .with(BuildingKind::Watchtower, 1)
            .with(BuildingKind::Stables, 2);
        assert_eq!(guard_coverage(&s), 18.0);
        s.technologies.insert(TechId::Cavalry);
        s.technologies.insert(TechId::Archery);
        assert_eq!(guard_coverage(&s), 29.0);
    }

    #[test]
    fn theft_rate_is_ten_percent() {
        let mut s = village(15);
        s.resources.food = 1000.0;
        s.resources.gold = 100.0;
        let sec = assess_security(&s);
        let mut rng = SimRng::new(2024);
        let trials = 20_000;
        let hits = (0..trials)
            .filter(|_| roll_theft(&s, &sec, &mut rng).food > 0.0)
            .count();
        let rate = hits as f64 / trials as f64;
        assert!((0.09..0.11).contains(&rate), "theft rate {}", rate);
    }

    #[test]
    fn theft_takes_five_percent() {
        let mut s = village(15);
        s.resources.food = 1000.0;
        s.resources.gold = 100.0;
        let sec = assess_security(&s);
        let theft = roll_theft(&s, &sec, &mut FixedSequence::constant(0.01));
        assert_eq!(theft.food, 50.0);
        assert_eq!(theft.gold, 5.0);
    }

    #[test]
    fn small_villages_are_not_robbed() {
        let s = village(10);
        let sec = assess_security(&s);
        let theft = roll_theft(&s, &sec, &mut FixedSequence::constant(0.0));
        assert_eq!(theft, Theft::default());
    }

    #[test]
    fn heating_only_in_winter() {
        let s = village(15);
        assert_eq!(heating_need(&s, Season::Autumn), 0.0);
        assert_eq!(heating_need(&s, Season::Winter), 105.0);
    }

    #[test]
    fn maintenance_sums_table_and_discount() {
        let mut s = village(5);
        s.buildings = Buildings::default()
            .with(BuildingKind::House, 4)
            .with(BuildingKind::Cathedral, 1);
        let m = maintenance(&s);
        assert_eq!(m, Cost::new(4.0, 1.0, 2.8));
        s.technologies.insert(TechId::Engineering);
        assert_eq!(maintenance(&s), Cost::new(3.6, 0.9, 2.52));
    }

    #[test]
    fn price_modifier_clamped() {
        assert_eq!(price_modifier(TradeResource::Food, 0.0), 2.0);
        assert_eq!(price_modifier(TradeResource::Food, 200.0), 1.0);
        assert_eq!(price_modifier(TradeResource::Food, 10_000.0), 0.5);
        assert_eq!(price_modifier(TradeResource::Stone, 35.0), 1.0);
    }

    #[test]
    fn trade_prices_round_in_village_favour() {
        let mut s = village(5);
        s.trade_prices = TradePrices { food: 1.3, wood: 0.5, stone: 1.1 };
        assert_eq!(buy_price(&s, TradeResource::Food), 7.0);
        assert_eq!(sell_price(&s, TradeResource::Wood), 2.0);
        assert_eq!(sell_price(&s, TradeResource::Stone), 11.0);
    }
}
