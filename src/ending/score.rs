use std::fmt;

use crate::rules::BuildingKind;
use crate::simulation::numeric::round2;
use crate::world::WorldState;

/// Buildings that count toward the final score.
const SCORED_BUILDINGS: [BuildingKind; 6] = [
    BuildingKind::House,
    BuildingKind::Market,
    BuildingKind::StoneWall,
    BuildingKind::Library,
    BuildingKind::Tavern,
    BuildingKind::Cathedral,
];

const PER_VILLAGER: f64 = 100.0;
const PER_HAPPINESS_POINT: f64 = 50.0;
const PER_TECH: f64 = 500.0;
const PER_BUILDING: f64 = 200.0;
const PER_DEATH: f64 = 50.0;
const PER_STARVING_WEEK: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Rank {
    /// Each band starts strictly above its threshold.
    fn from_points(points: f64) -> Rank {
        const BANDS: [(f64, Rank); 5] = [
            (50_000.0, Rank::S),
            (35_000.0, Rank::A),
            (20_000.0, Rank::B),
            (10_000.0, Rank::C),
            (5_000.0, Rank::D),
        ];
        BANDS
            .iter()
            .find(|(threshold, _)| points > *threshold)
            .map_or(Rank::F, |(_, rank)| *rank)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Rank::S => "S",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
            Rank::F => "F",
        };
        write!(f, "{}", letter)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    /// Two-decimal points; negative when losses outweigh the village.
    pub points: f64,
    pub rank: Rank,
}

/// Weighted sum of the final snapshot, scaled by difficulty.
///
/// Each term is rounded as it is added so the total matches the figures
/// shown during play.
pub fn compute_score(state: &WorldState) -> Score {
    let scored_buildings: u32 = SCORED_BUILDINGS.iter().map(|&kind| state.building(kind)).sum();
    let terms = [
        state.population.len() as f64 * PER_VILLAGER,
        round2(state.average_happiness()) * PER_HAPPINESS_POINT,
        state.technologies.len() as f64 * PER_TECH,
        scored_buildings as f64 * PER_BUILDING,
        state.resources.gold,
        -(state.stats.total_deaths as f64 * PER_DEATH),
        -(state.stats.starvation_days as f64 * PER_STARVING_WEEK),
    ];
    let raw = terms.iter().fold(0.0, |total, term| round2(total + term));
    let points = round2(raw * state.difficulty.score_multiplier());

    Score {
        points,
        rank: Rank::from_points(points),
    }
}

/// Printable end-of-game report.
pub struct FinalReport<'a> {
    state: &'a WorldState,
    score: Score,
}

impl<'a> FinalReport<'a> {
    pub fn new(state: &'a WorldState) -> Self {
        FinalReport {
            state,
            score: compute_score(state),
        }
    }

    pub fn score(&self) -> &Score {
        &self.score
    }
}

impl fmt::Display for FinalReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.state;
        writeln!(f, "=== Final Report ===")?;
        match &s.ending {
            Some(ending) => {
                writeln!(f, "Ending: {}", ending.kind.label())?;
                if let Some(reason) = ending.reason {
                    writeln!(f, "Cause: {}", reason.label())?;
                }
            }
            None => writeln!(f, "Ending: (game still running)")?,
        }
        writeln!(f, "Weeks: {}", s.tick)?;
        writeln!(
            f,
            "Population: {} (peak {})",
            s.population.len(),
            s.stats.peak_population
        )?;
        writeln!(f, "Average happiness: {:.1}", s.average_happiness())?;
        writeln!(f, "Technologies: {}", s.technologies.len())?;
        writeln!(f, "Buildings: {}", s.buildings.total())?;
        writeln!(
            f,
            "Births/deaths: {}/{}",
            s.stats.total_births, s.stats.total_deaths
        )?;
        writeln!(
            f,
            "Invasions repelled: {}, raids survived: {}",
            s.stats.invasions_repelled, s.stats.raids_survived
        )?;
        writeln!(f, "Festivals: {}", s.stats.festivals_held)?;
        writeln!(f, "Weeks of starvation: {}", s.stats.starvation_days)?;
        writeln!(f, "Score: {} (rank {})", self.score.points, self.score.rank)?;
        if let Some(ending) = &s.ending {
            writeln!(f)?;
            writeln!(f, "{}", ending.summary)?;
        }
        Ok(())
    }
}
