//! Weekly food needs and priority-ordered rationing.

use crate::rules::jobs::{ADULT_FOOD_NEED, CHILD_FOOD_NEED};
use crate::rules::{BuildingKind, TechId};
use crate::simulation::numeric::{ratio_or_zero, round2};
use crate::world::{FoodPriority, Villager, WorldState};

const GRANARY_REDUCTION: f64 = 0.05;
const PRESERVATION_FACTOR: f64 = 0.9;

/// Serving class: 2 eats first, 0 eats last.
pub type PriorityClass = u8;

/// Multiplier applied to every villager's base need.
pub fn need_factor(state: &WorldState) -> f64 {
    let granaries = state.building(BuildingKind::Granary) as f64;
    let granary = (1.0 - granaries * GRANARY_REDUCTION).max(0.0);
    let preservation = if state.has_tech(TechId::Preservation) {
        PRESERVATION_FACTOR
    } else {
        1.0
    };
    state.profile().consumption_rate * granary * preservation
}

pub fn villager_need(v: &Villager, factor: f64) -> f64 {
    let base = if v.is_child() { CHILD_FOOD_NEED } else { ADULT_FOOD_NEED };
    round2(base * factor)
}

pub fn priority_class(v: &Villager, priority: FoodPriority) -> PriorityClass {
    match priority {
        FoodPriority::Equal => 1,
        FoodPriority::ChildrenFirst => {
            if v.is_child() { 2 } else { 1 }
        }
        FoodPriority::WorkersFirst => {
            if v.job.is_employed() { 2 } else { 1 }
        }
        FoodPriority::ElderlyLast => {
            if v.is_elder() {
                0
            } else if v.is_child() {
                2
            } else {
                1
            }
        }
    }
}

/// Per-villager needs and the total demand for the week.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodDemand {
    pub needs: Vec<f64>,
    pub classes: Vec<PriorityClass>,
    pub total: f64,
}

pub fn demand(state: &WorldState) -> FoodDemand {
    let factor = need_factor(state);
    let mut total = 0.0;
    let mut needs = Vec::with_capacity(state.population.len());
    let mut classes = Vec::with_capacity(state.population.len());
    for v in &state.population {
        let need = villager_need(v, factor);
        total = round2(total + need);
        needs.push(need);
        classes.push(priority_class(v, state.food_priority));
    }
    FoodDemand { needs, classes, total }
}

/// Ration `available` food across villagers.
///
/// With enough food everyone receives their full need. Otherwise classes are
/// served highest first, each in population order. The first villager who
/// cannot be fully served takes the remainder and everyone after gets nothing.
/// The result is parallel to `demand.needs`.
pub fn allocate(demand: &FoodDemand, available: f64) -> Vec<f64> {
    if available >= demand.total {
        return demand.needs.clone();
    }

    let mut received = vec![0.0; demand.needs.len()];
    let mut remaining = available.max(0.0);
    'classes: for class in [2, 1, 0] {
        for (i, need) in demand.needs.iter().enumerate() {
            if demand.classes[i] != class {
                continue;
            }
            if remaining <= 0.0 {
                break 'classes;
            }
            if remaining >= *need {
                received[i] = *need;
                remaining = round2(remaining - need);
            } else {
                received[i] = remaining;
                break 'classes;
            }
        }
    }
    received
}

/// `1 - received / need`, in `[0, 1]`.
pub fn shortage_ratio(received: f64, need: f64) -> f64 {
    if need <= 0.0 {
        return 0.0;
    }
    round2((1.0 - ratio_or_zero(received, need)).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Difficulty, Job};
    use crate::simulation::random::SimRng;
    use crate::world::generation::new_game;

    fn family(ages: &[u32]) -> WorldState {
        let mut s = new_game(Difficulty::Normal, &mut SimRng::new(41));
        s.population.truncate(ages.len());
        for (v, &age) in s.population.iter_mut().zip(ages) {
            v.age = age;
            v.job = if age < 16 { Job::Child } else { Job::Unemployed };
        }
        s
    }

    #[test]
    fn children_eat_less() {
        let s = family(&[30, 8]);
        let d = demand(&s);
        assert_eq!(d.needs, vec![21.0, 10.0]);
        assert_eq!(d.total, 31.0);
    }

    #[test]
    fn granaries_and_preservation_reduce_need() {
        let mut s = family(&[30]);
        s.buildings.add(BuildingKind::Granary);
        s.buildings.add(BuildingKind::Granary);
        s.technologies.insert(TechId::Preservation);
        assert_eq!(demand(&s).needs[0], round2(21.0 * 0.9 * 0.9));
    }

    #[test]
    fn ample_food_feeds_everyone() {
        let s = family(&[30, 8, 70]);
        let d = demand(&s);
        assert_eq!(allocate(&d, 1000.0), d.needs);
    }

    #[test]
    fn children_first_feeds_children_before_adults() {
        let mut s = family(&[30, 8, 9]);
        s.food_priority = FoodPriority::ChildrenFirst;
        let d = demand(&s);
        let got = allocate(&d, 25.0);
        assert_eq!(got, vec![5.0, 10.0, 10.0]);
    }

    #[test]
    fn elderly_last_starves_elders_first() {
        let mut s = family(&[70, 30, 30]);
        s.food_priority = FoodPriority::ElderlyLast;
        let d = demand(&s);
        let got = allocate(&d, 42.0);
        assert_eq!(got, vec![0.0, 21.0, 21.0]);
    }

    #[test]
    fn first_unserved_gets_remainder_then_nothing() {
        let s = family(&[30, 30, 30]);
        let d = demand(&s);
        let got = allocate(&d, 30.0);
        assert_eq!(got, vec![21.0, 9.0, 0.0]);
    }

    #[test]
    fn allocation_never_exceeds_available() {
        let mut s = family(&[30, 8, 70, 12, 45]);
        for p in [FoodPriority::Equal, FoodPriority::ChildrenFirst, FoodPriority::WorkersFirst, FoodPriority::ElderlyLast] {
            s.food_priority = p;
            let d = demand(&s);
            for available in [0.0, 5.0, 33.3, 60.0] {
                let total: f64 = allocate(&d, available).iter().sum();
                assert!(total <= available + 1e-9, "{:?} {} > {}", p, total, available);
            }
        }
    }

    #[test]
    fn shortage_ratio_bounds() {
        assert_eq!(shortage_ratio(0.0, 21.0), 1.0);
        assert_eq!(shortage_ratio(21.0, 21.0), 0.0);
        assert_eq!(shortage_ratio(10.5, 21.0), 0.5);
        assert_eq!(shortage_ratio(0.0, 0.0), 0.0);
    }
}
