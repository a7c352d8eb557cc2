use serde::Serialize;

use crate::events::EventCategory::{self, Danger, Info, Success, Warning};
use crate::events::{EventDraft, EventSource, EXTERNAL_WEIGHT, FIXED_WEIGHT, HAPPINESS_WEIGHT};
use crate::rules::Season;
use crate::simulation::random::RandomSource;
use crate::world::WorldState;

/// Static event shape. Converted into a draft when it enters the pool.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub message: &'static str,
    pub category: EventCategory,
    pub food: f64,
    pub wood: f64,
    pub gold: f64,
    pub pop: i32,
}

const fn t(
    message: &'static str,
    category: EventCategory,
    food: f64,
    wood: f64,
    gold: f64,
    pop: i32,
) -> Template {
    Template {
        message,
        category,
        food,
        wood,
        gold,
        pop,
    }
}

pub const POSITIVE: &[Template] = &[
    t("A merchant caravan passes through and leaves generous gifts.", Success, 50.0, 20.0, 30.0, 0),
    t("Clear skies all week; the crops are thriving.", Success, 100.0, 0.0, 0.0, 0),
    t("Villagers stumble upon a grove of wild fruit.", Success, 80.0, 0.0, 0.0, 0),
    t("A traveller decides to settle in the village.", Success, 0.0, 0.0, 0.0, 1),
    t("Miners strike a small vein of gold.", Success, 0.0, 0.0, 50.0, 0),
    t("Woodcutters find a stand of fine timber.", Success, 0.0, 60.0, 0.0, 0),
    t("The villagers hold a modest celebration.", Info, -20.0, 0.0, 0.0, 0),
    t("A wandering minstrel brings cheer to the square.", Success, 0.0, 0.0, 10.0, 0),
    t("Hunters return from the forest with a rich haul.", Success, 60.0, 0.0, 0.0, 0),
    t("Children find gemstones glinting in the river.", Success, 0.0, 0.0, 40.0, 0),
];

pub const NEUTRAL: &[Template] = &[
    t("A gentle rain soaks the fields.", Info, 20.0, 0.0, 0.0, 0),
    t("The villagers rest in their idle hours.", Info, 0.0, 0.0, 0.0, 0),
    t("Strange singing drifts in from far away.", Info, 0.0, 0.0, 0.0, 0),
    t("A quiet week passes in the village.", Info, 0.0, 0.0, 0.0, 0),
    t("Children play among the furrows.", Info, 0.0, 0.0, 0.0, 0),
];

pub const NEGATIVE: &[Template] = &[
    t("A storm spoils part of the stores.", Warning, -30.0, -20.0, 0.0, 0),
    t("Wild animals break into the granary.", Warning, -50.0, 0.0, 0.0, 0),
    t("Several tools break during the week's work.", Warning, 0.0, -30.0, -10.0, 0),
    t("Drought stunts the crops.", Warning, -40.0, 0.0, 0.0, 0),
    t("A mild fever makes the rounds.", Warning, -20.0, 0.0, -5.0, 0),
    t("Thieves make off with supplies in the night.", Danger, -40.0, 0.0, -30.0, 0),
    t("A fire burns through the woodpile.", Danger, 0.0, -50.0, 0.0, 0),
    t("A small plague strikes the village.", Danger, -30.0, 0.0, -20.0, -1),
];

pub const SEVERE: &[Template] = &[
    t("A fierce blizzard ruins the reserves.", Danger, -80.0, -60.0, -20.0, 0),
    t("Famine drives families away.", Danger, -100.0, 0.0, 0.0, -2),
    t("Bandits sack the village.", Danger, -60.0, -30.0, -50.0, -1),
];

pub const HAPPINESS: &[Template] = &[
    t("Contented villagers work with remarkable zeal!", Success, 0.0, 0.0, 0.0, 0),
    t("Happy villagers throw an impromptu festival.", Success, -10.0, 0.0, 5.0, 0),
    t("Low morale drags on the village's output.", Warning, 0.0, 0.0, 0.0, 0),
    t("Discontented villagers grumble in the square.", Warning, -20.0, 0.0, 0.0, 0),
    t("Bitter villagers begin talking of leaving.", Danger, 0.0, 0.0, 0.0, -1),
];

impl Template {
    pub fn draft(&self, source: EventSource, weight: f64) -> EventDraft {
        EventDraft::external(self.message, self.category, self.food, self.wood, self.gold, self.pop)
            .with_source(source, weight)
    }
}

pub fn seasonal(season: Season) -> Template {
    match season {
        Season::Spring => t("Spring brings fresh hope and energy.", Success, 40.0, 0.0, 0.0, 0),
        Season::Summer => t("The summer sun ripens everything it touches.", Success, 50.0, 0.0, 0.0, 0),
        Season::Autumn => t("Harvest time: the granaries fill.", Success, 80.0, 0.0, 0.0, 0),
        Season::Winter => t("The bitter cold tests the villagers' resolve.", Warning, -20.0, -40.0, 0.0, 0),
    }
}

/// The inputs narrative generation works from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VillageSummary {
    pub season: Season,
    pub population: usize,
    pub average_happiness: f64,
    pub food: f64,
}

impl VillageSummary {
    pub fn from_state(state: &WorldState) -> Self {
        VillageSummary {
            season: state.season,
            population: state.population.len(),
            average_happiness: state.average_happiness(),
            food: state.resources.food,
        }
    }

    /// Stores relative to fifty units per villager.
    pub fn food_ratio(&self) -> f64 {
        self.food / (self.population.max(1) as f64 * 50.0)
    }
}

/// Events derived from the current state. Recomputed on every replenishment.
pub fn fixed_events(state: &WorldState) -> Vec<EventDraft> {
    let mut drafts = vec![seasonal(state.season).draft(EventSource::Fixed, FIXED_WEIGHT)];
    if state.population.is_empty() {
        return drafts;
    }

    let avg = state.average_happiness();
    let band: &[usize] = if avg > 80.0 {
        &[0, 1]
    } else if (40.0..=60.0).contains(&avg) {
        &[2]
    } else if avg < 40.0 {
        &[3, 4]
    } else {
        &[]
    };
    drafts.extend(
        band.iter()
            .map(|&i| HAPPINESS[i].draft(EventSource::Happiness, HAPPINESS_WEIGHT)),
    );
    drafts
}

/// Template substitute for a failed or disabled external generator.
///
/// A gloomier village draws from gloomier templates.
pub fn fallback_event(summary: &VillageSummary, rng: &mut impl RandomSource) -> EventDraft {
    let avg = summary.average_happiness.floor();
    let food_ratio = summary.food_ratio();

    let tiers: &[&[Template]] = if avg < 40.0 || food_ratio < 0.5 {
        &[SEVERE, NEGATIVE, NEUTRAL]
    } else if avg < 60.0 || food_ratio < 1.0 {
        &[NEGATIVE, NEUTRAL, POSITIVE]
    } else {
        &[POSITIVE, POSITIVE, NEUTRAL, NEGATIVE]
    };

    let season_template = seasonal(summary.season);
    let total: usize = tiers.iter().map(|tier| tier.len()).sum::<usize>() + 1;
    let mut pick = rng.index(total);
    for tier in tiers {
        if pick < tier.len() {
            return tier[pick].draft(EventSource::External, EXTERNAL_WEIGHT);
        }
        pick -= tier.len();
    }
    season_template.draft(EventSource::External, EXTERNAL_WEIGHT)
}
