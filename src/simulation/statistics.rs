use std::collections::HashMap;

use crate::rules::Job;
use crate::world::WorldState;

/// Per-tick aggregate metrics for the driver's log line and `inspect`.
#[derive(Debug, Clone)]
pub struct TickStatistics {
    pub tick: u32,
    pub population: usize,
    pub job_distribution: HashMap<Job, u32>,
    pub avg_happiness: f64,
    pub avg_health: f64,
    pub avg_hunger: f64,
    pub food: f64,
    pub event_pool_size: usize,
    pub workforce_diversity: f32,
    pub tick_duration_ms: f32,
}

/// Compute statistics for the current village state after a tick.
pub fn compute_statistics(state: &WorldState, tick_duration_ms: f32) -> TickStatistics {
    let total = state.population.len() as f64;
    if total == 0.0 {
        return TickStatistics {
            tick: state.tick,
            population: 0,
            job_distribution: HashMap::new(),
            avg_happiness: 0.0,
            avg_health: 0.0,
            avg_hunger: 0.0,
            food: state.resources.food,
            event_pool_size: state.event_pool.len(),
            workforce_diversity: 0.0,
            tick_duration_ms,
        };
    }

    let mut job_dist: HashMap<Job, u32> = HashMap::new();
    let mut total_happiness = 0.0_f64;
    let mut total_health = 0.0_f64;
    let mut total_hunger = 0.0_f64;

    for v in &state.population {
        *job_dist.entry(v.job).or_insert(0) += 1;
        total_happiness += v.happiness;
        total_health += v.health;
        total_hunger += v.hunger;
    }

    let diversity = shannon_diversity(&job_dist, state.population.len() as u32);

    TickStatistics {
        tick: state.tick,
        population: state.population.len(),
        job_distribution: job_dist,
        avg_happiness: total_happiness / total,
        avg_health: total_health / total,
        avg_hunger: total_hunger / total,
        food: state.resources.food,
        event_pool_size: state.event_pool.len(),
        workforce_diversity: diversity,
        tick_duration_ms,
    }
}

/// Shannon diversity of the job mix normalized to [0, 1].
/// 0 = everyone does the same thing, 1 = every present job equally staffed.
fn shannon_diversity(distribution: &HashMap<Job, u32>, total: u32) -> f32 {
    if total == 0 {
        return 0.0;
    }

    let total_f = total as f64;
    let mut entropy = 0.0_f64;
    let mut non_zero_types = 0_u32;

    for &count in distribution.values() {
        if count > 0 {
            non_zero_types += 1;
            let p = count as f64 / total_f;
            entropy -= p * p.ln();
        }
    }

    if non_zero_types <= 1 {
        return 0.0;
    }

    let max_entropy = (non_zero_types as f64).ln();
    if max_entropy == 0.0 {
        0.0
    } else {
        (entropy / max_entropy) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Difficulty;
    use crate::simulation::random::SimRng;
    use crate::world::generation::new_game;

    fn make_test_village(size: usize, job: Job) -> WorldState {
        let mut s = new_game(Difficulty::Normal, &mut SimRng::new(71));
        s.population.truncate(size);
        for v in &mut s.population {
            v.job = job;
        }
        s
    }

    #[test]
    fn compute_statistics_basic_averages() {
        let mut s = make_test_village(3, Job::Farmer);
        for (v, h) in s.population.iter_mut().zip([40.0, 50.0, 60.0]) {
            v.happiness = h;
            v.health = 100.0;
            v.hunger = 0.0;
        }

        let stats = compute_statistics(&s, 10.0);

        assert!((stats.avg_happiness - 50.0).abs() < 0.01);
        assert_eq!(stats.avg_health, 100.0);
        assert_eq!(stats.tick, 1);
        assert_eq!(stats.population, 3);
        assert!((stats.tick_duration_ms - 10.0).abs() < 0.01);
    }

    #[test]
    fn compute_statistics_job_distribution() {
        let mut s = make_test_village(4, Job::Farmer);
        s.population[2].job = Job::Miner;
        s.population[3].job = Job::Guard;

        let stats = compute_statistics(&s, 5.0);

        assert_eq!(stats.job_distribution[&Job::Farmer], 2);
        assert_eq!(stats.job_distribution[&Job::Miner], 1);
        assert_eq!(stats.job_distribution[&Job::Guard], 1);
    }

    #[test]
    fn diversity_single_job_is_zero() {
        let s = make_test_village(10, Job::Farmer);
        assert_eq!(compute_statistics(&s, 1.0).workforce_diversity, 0.0);
    }

    #[test]
    fn diversity_even_split_is_one() {
        let mut s = make_test_village(4, Job::Farmer);
        s.population[1].job = Job::Woodcutter;
        s.population[2].job = Job::Miner;
        s.population[3].job = Job::Scholar;
        let stats = compute_statistics(&s, 1.0);
        assert!((stats.workforce_diversity - 1.0).abs() < 0.01);
    }

    #[test]
    fn empty_village_returns_zeroed_stats() {
        let s = make_test_village(0, Job::Farmer);
        let stats = compute_statistics(&s, 0.0);
        assert_eq!(stats.population, 0);
        assert_eq!(stats.avg_happiness, 0.0);
        assert_eq!(stats.workforce_diversity, 0.0);
    }
}
