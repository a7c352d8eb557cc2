//! Player actions. Each validates fully before touching the state, so a
//! rejected action leaves no partial effects.

use std::fmt;

use crate::events::EventId;
use crate::rules::buildings::{FESTIVAL_FOOD_COST, FESTIVAL_GOLD_COST, FESTIVAL_HAPPINESS};
use crate::rules::calendar::MAX_FOOD;
use crate::rules::economy::TRADE_AMOUNT;
use crate::rules::{BuildingKind, Job, TechId, TradeResource, TradeSide};
use crate::simulation::economy::{buy_price, construction_cost, sell_price};
use crate::simulation::numeric::{clamp_attribute, round2};
use crate::world::{FoodPriority, GameStatus, LogKind, VillagerId, WorldState};

#[derive(Debug, Clone, PartialEq)]
pub enum Rejected {
    NotPlaying,
    NotFinished,
    NotAssignable(Job),
    ZeroDelta,
    NobodyToMove(Job),
    Unaffordable(&'static str),
    AlreadyResearched(TechId),
    NoMarket,
    UnknownVillager(VillagerId),
    UnknownEvent(EventId),
    GameInProgress,
    SummaryAlreadySet,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejected::NotPlaying => write!(f, "no game in progress"),
            Rejected::NotFinished => write!(f, "game has not finished"),
            Rejected::NotAssignable(job) => write!(f, "{} is not an assignable job", job.name()),
            Rejected::ZeroDelta => write!(f, "job change of zero"),
            Rejected::NobodyToMove(job) => write!(f, "no villager available for {}", job.name()),
            Rejected::Unaffordable(what) => write!(f, "cannot afford {}", what),
            Rejected::AlreadyResearched(tech) => write!(f, "{} already researched", tech.key()),
            Rejected::NoMarket => write!(f, "trading needs a market"),
            Rejected::UnknownVillager(id) => write!(f, "no villager {}", id),
            Rejected::UnknownEvent(id) => write!(f, "no pending event {}", id),
            Rejected::GameInProgress => write!(f, "a game is already in progress"),
            Rejected::SummaryAlreadySet => write!(f, "ending summary was already written"),
        }
    }
}

pub(crate) fn require_playing(state: &WorldState) -> Result<(), Rejected> {
    if state.status == GameStatus::Playing {
        Ok(())
    } else {
        Err(Rejected::NotPlaying)
    }
}

/// Positive `delta` hires unemployed adults, negative lets holders go.
pub fn assign_job(state: &mut WorldState, job: Job, delta: i32) -> Result<(), Rejected> {
    require_playing(state)?;
    if !job.is_assignable() {
        return Err(Rejected::NotAssignable(job));
    }
    if delta == 0 {
        return Err(Rejected::ZeroDelta);
    }

    let (from, to) = if delta > 0 {
        (Job::Unemployed, job)
    } else {
        (job, Job::Unemployed)
    };
    let movable: Vec<usize> = state
        .population
        .iter()
        .enumerate()
        .filter(|(_, v)| v.job == from && v.is_adult())
        .map(|(i, _)| i)
        .take(delta.unsigned_abs() as usize)
        .collect();
    if movable.is_empty() {
        return Err(Rejected::NobodyToMove(job));
    }
    for i in movable {
        let v = &mut state.population[i];
        v.job = to;
        v.activity = v.default_activity();
    }
    Ok(())
}

pub fn construct(state: &mut WorldState, kind: BuildingKind) -> Result<(), Rejected> {
    require_playing(state)?;
    let cost = construction_cost(state, kind);
    let r = &mut state.resources;
    if r.wood < cost.wood || r.stone < cost.stone || r.gold < cost.gold {
        return Err(Rejected::Unaffordable(kind.name()));
    }
    r.wood = round2(r.wood - cost.wood);
    r.stone = round2(r.stone - cost.stone);
    r.gold = round2(r.gold - cost.gold);
    state.buildings.add(kind);
    state.push_log(LogKind::Success, format!("Construction of a {} is complete", kind.name()));
    Ok(())
}

pub fn research(state: &mut WorldState, tech: TechId) -> Result<(), Rejected> {
    require_playing(state)?;
    if state.has_tech(tech) {
        return Err(Rejected::AlreadyResearched(tech));
    }
    if state.resources.knowledge < tech.cost() {
        return Err(Rejected::Unaffordable(tech.key()));
    }
    state.resources.knowledge = round2(state.resources.knowledge - tech.cost());
    state.technologies.insert(tech);
    state.push_log(LogKind::Tech, format!("Research complete: {}", tech.description()));
    Ok(())
}

/// Buy or sell one batch of ten units at the current market price.
pub fn trade(state: &mut WorldState, resource: TradeResource, side: TradeSide) -> Result<(), Rejected> {
    require_playing(state)?;
    if state.building(BuildingKind::Market) == 0 {
        return Err(Rejected::NoMarket);
    }
    match side {
        TradeSide::Buy => {
            let price = buy_price(state, resource);
            if state.resources.gold < price {
                return Err(Rejected::Unaffordable(resource.name()));
            }
            state.resources.gold = round2(state.resources.gold - price);
            let stock = state.resources.get_mut(resource);
            *stock = round2(*stock + TRADE_AMOUNT);
            if resource == TradeResource::Food {
                state.resources.food = state.resources.food.min(MAX_FOOD);
            }
        }
        TradeSide::Sell => {
            let price = sell_price(state, resource);
            let stock = state.resources.get_mut(resource);
            if *stock < TRADE_AMOUNT {
                return Err(Rejected::Unaffordable(resource.name()));
            }
            *stock = round2(*stock - TRADE_AMOUNT);
            state.resources.gold = round2(state.resources.gold + price);
        }
    }
    Ok(())
}

pub fn set_food_priority(state: &mut WorldState, priority: FoodPriority) -> Result<(), Rejected> {
    require_playing(state)?;
    state.food_priority = priority;
    Ok(())
}

pub fn hold_festival(state: &mut WorldState) -> Result<(), Rejected> {
    require_playing(state)?;
    let r = &mut state.resources;
    if r.gold < FESTIVAL_GOLD_COST || r.food < FESTIVAL_FOOD_COST {
        return Err(Rejected::Unaffordable("festival"));
    }
    r.gold = round2(r.gold - FESTIVAL_GOLD_COST);
    r.food = round2(r.food - FESTIVAL_FOOD_COST);
    for v in &mut state.population {
        v.happiness = clamp_attribute(v.happiness + FESTIVAL_HAPPINESS);
    }
    state.stats.festivals_held += 1;
    state.push_log(LogKind::Success, "The village holds a grand festival!");
    Ok(())
}

pub fn toggle_pause(state: &mut WorldState) -> Result<(), Rejected> {
    require_playing(state)?;
    state.paused = !state.paused;
    Ok(())
}

/// Append a biography chapter. Empty text only records that the year was covered.
pub fn attach_biography(state: &mut WorldState, id: VillagerId, text: &str, year: u32) -> Result<(), Rejected> {
    let v = state
        .population
        .iter_mut()
        .find(|v| v.id == id)
        .ok_or(Rejected::UnknownVillager(id))?;
    let text = text.trim();
    if !text.is_empty() {
        v.bio = Some(match v.bio.take() {
            Some(existing) if !existing.is_empty() => format!("{}\n\n{}", existing, text),
            _ => text.to_string(),
        });
    }
    v.last_bio_year = v.last_bio_year.max(year);
    Ok(())
}

pub fn set_ending_summary(state: &mut WorldState, summary: String) -> Result<(), Rejected> {
    if state.status != GameStatus::Finished {
        return Err(Rejected::NotFinished);
    }
    let Some(ending) = state.ending.as_mut() else {
        return Err(Rejected::NotFinished);
    };
    if ending.summary_replaced {
        return Err(Rejected::SummaryAlreadySet);
    }
    ending.summary = summary;
    ending.summary_replaced = true;
    Ok(())
}
