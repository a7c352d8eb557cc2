use crate::rules::jobs::FARMER_WEEKLY_BASE;
use crate::rules::{BuildingKind, Job, Season, TechId};
use crate::simulation::numeric::round2;
use crate::world::{Villager, WorldState};

const MIN_EFFICIENCY: f64 = 0.1;
const MIN_PRODUCTIVITY: f64 = 0.1;
const PRODUCTIVITY_RANGE: f64 = 1.9;
const ALCHEMY_KNOWLEDGE: f64 = 15.0;
const SCRIBING_KNOWLEDGE: f64 = 7.0;

/// Everything the workforce produced in one week.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorkOutput {
    pub food: f64,
    pub wood: f64,
    pub stone: f64,
    pub gold: f64,
    pub knowledge: f64,
    /// Sum of farmer efficiencies; a half-fed farmer counts as a fraction.
    pub active_farmers: f64,
}

fn architecture_bonus(state: &WorldState) -> f64 {
    if state.has_tech(TechId::Architecture) { 1.2 } else { 1.0 }
}

fn tech_bonus(state: &WorldState, tech: TechId, bonus: f64) -> f64 {
    if state.has_tech(tech) { bonus } else { 0.0 }
}

fn building_bonus(state: &WorldState, kind: BuildingKind, per_unit: f64) -> f64 {
    state.building(kind) as f64 * per_unit * architecture_bonus(state)
}

/// Harvest multiplier for the season, techs, farms and aqueducts.
pub fn food_multiplier(state: &WorldState, season: Season) -> f64 {
    let m = season.food_base()
        + tech_bonus(state, TechId::Farming, 0.2)
        + tech_bonus(state, TechId::Irrigation, 0.2)
        + tech_bonus(state, TechId::AdvancedFarming, 0.3)
        + building_bonus(state, BuildingKind::Farm, 0.15)
        + building_bonus(state, BuildingKind::Aqueduct, 0.1);
    m * state.profile().production_multiplier
}

pub fn wood_multiplier(state: &WorldState) -> f64 {
    let mut m = round2(state.profile().production_multiplier);
    m = round2(m + tech_bonus(state, TechId::Tools, 0.2));
    m = round2(m + tech_bonus(state, TechId::Forestry, 0.2));
    m = round2(m + building_bonus(state, BuildingKind::LumberMill, 0.15));
    m = round2(m + building_bonus(state, BuildingKind::Blacksmith, 0.1));
    round2(m + building_bonus(state, BuildingKind::Workshop, 0.1))
}

pub fn stone_gold_multiplier(state: &WorldState) -> f64 {
    let mut m = round2(state.profile().production_multiplier);
    m = round2(m + tech_bonus(state, TechId::Tools, 0.2));
    m = round2(m + tech_bonus(state, TechId::Metallurgy, 0.3));
    m = round2(m + building_bonus(state, BuildingKind::Mine, 0.15));
    m = round2(m + building_bonus(state, BuildingKind::Blacksmith, 0.1));
    round2(m + building_bonus(state, BuildingKind::Workshop, 0.1))
}

/// Extra knowledge per efficient scholar from libraries, universities and alchemists.
fn scholar_building_bonus(state: &WorldState) -> f64 {
    round2(building_bonus(state, BuildingKind::Library, 1.4))
        + round2(building_bonus(state, BuildingKind::University, 2.1))
        + round2(building_bonus(state, BuildingKind::Alchemist, 1.05))
}

/// Staged hunger and health penalties, scaled by mood, floored at 0.1.
pub fn efficiency(v: &Villager) -> f64 {
    let mut e = 1.0;
    if v.hunger > 20.0 {
        e -= 0.2;
    }
    if v.hunger > 50.0 {
        e -= 0.3;
    }
    if v.hunger > 80.0 {
        e -= 0.2;
    }
    if v.health < 50.0 {
        e -= 0.3;
    }
    if v.health < 20.0 {
        e -= 0.2;
    }
    let productivity = round2(MIN_PRODUCTIVITY + v.happiness / 100.0 * PRODUCTIVITY_RANGE);
    round2(round2(e * productivity).max(MIN_EFFICIENCY))
}

/// Work done by living adults this week, including the harvest.
pub fn produce(state: &WorldState, season: Season) -> WorkOutput {
    let wood_mult = wood_multiplier(state);
    let stone_gold_mult = stone_gold_multiplier(state);
    let scholar_bonus = scholar_building_bonus(state);
    let scribing = state.has_tech(TechId::Scribing);

    let mut out = WorkOutput::default();
    for v in state.population.iter().filter(|v| v.is_adult() && v.is_alive()) {
        let eff = efficiency(v);
        if v.job == Job::Farmer {
            out.active_farmers = round2(out.active_farmers + eff);
        }
        let y = v.job.base_yield();
        out.wood = round2(out.wood + y.wood * wood_mult * eff);
        out.stone = round2(out.stone + y.stone * stone_gold_mult * eff);
        out.gold = round2(out.gold + y.gold * stone_gold_mult * eff);

        let mut knowledge = y.knowledge * eff;
        if v.job == Job::Scholar {
            if scribing {
                knowledge += SCRIBING_KNOWLEDGE * eff;
            }
            knowledge += scholar_bonus * eff;
        }
        out.knowledge = round2(out.knowledge + knowledge);
    }
    if state.has_tech(TechId::Alchemy) {
        out.knowledge = round2(out.knowledge + ALCHEMY_KNOWLEDGE);
    }

    out.food = harvest(out.active_farmers, food_multiplier(state, season));
    out
}

pub fn harvest(active_farmers: f64, food_multiplier: f64) -> f64 {
    round2(round2(active_farmers * FARMER_WEEKLY_BASE) * food_multiplier)
}

/// Unscaled weekly output used by the pricing step.
pub fn base_food_production(active_farmers: f64, food_multiplier: f64) -> f64 {
    active_farmers * FARMER_WEEKLY_BASE * food_multiplier
}
