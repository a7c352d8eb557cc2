//! Narrative text: generated events, villager biographies and ending prose.
//!
//! [`Narrator`] pairs the optional HTTP generator with local templates so the
//! driver always gets something usable back.

pub mod client;
pub mod fallback;

use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{info, warn};

use crate::ending::score::Score;
use crate::events::catalogue::{fallback_event, VillageSummary};
use crate::events::EventDraft;
use crate::rules::calendar::year_of;
use crate::rules::jobs::ADULT_FOOD_NEED;
use crate::rules::Job;
use crate::simulation::random::SimRng;
use crate::world::{VillagerId, WorldState};

pub use client::{BioRequest, EndingRequest, NarrativeClient, NarrativeError, VillageStatus};

/// One villager due for a new biography chapter.
#[derive(Debug, Clone)]
pub struct BioSubject {
    pub villager: VillagerId,
    pub job: Job,
    pub request: BioRequest,
}

/// Villagers sharing the same pending chapter year.
#[derive(Debug, Clone)]
pub struct BioBatch {
    pub year: u32,
    pub subjects: Vec<BioSubject>,
}

/// A biography result. `text` is `None` when the chapter is skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Biography {
    pub villager: VillagerId,
    pub year: u32,
    pub text: Option<String>,
}

/// Pick up to `max` villagers whose next chapter is for the same year.
///
/// The oldest pending year goes first, so a villager who fell behind catches
/// up one year per batch.
pub fn select_bio_batch(state: &WorldState, max: usize) -> Option<BioBatch> {
    if !state.is_running() || max == 0 {
        return None;
    }
    let current_year = year_of(state.tick);
    let candidates: Vec<_> = state
        .population
        .iter()
        .filter(|v| v.last_bio_year < current_year)
        .take(max)
        .collect();
    let year = candidates.first()?.last_bio_year + 1;

    let village = VillageStatus {
        is_starving: state.resources.food < state.population.len() as f64 * ADULT_FOOD_NEED,
        population: state.population.len(),
    };
    let subjects = candidates
        .into_iter()
        .filter(|v| v.last_bio_year + 1 == year)
        .map(|v| BioSubject {
            villager: v.id,
            job: v.job,
            request: BioRequest {
                name: v.name.clone(),
                age: v.age,
                job: v.job.name().to_string(),
                season: state.season.name().to_string(),
                year,
                village: village.clone(),
            },
        })
        .collect();
    Some(BioBatch { year, subjects })
}

/// Request body for the closing summary, or `None` while the game runs.
pub fn ending_request(state: &WorldState, score: &Score) -> Option<EndingRequest> {
    let ending = state.ending.as_ref()?;
    Some(EndingRequest {
        ending: ending.kind.label().to_string(),
        reason: ending.reason.map(|r| r.label().to_string()),
        population: state.population.len(),
        average_happiness: state.average_happiness(),
        technologies: state.technologies.len(),
        buildings: state.buildings.total(),
        total_births: state.stats.total_births,
        total_deaths: state.stats.total_deaths,
        festivals_held: state.stats.festivals_held,
        invasions_repelled: state.stats.invasions_repelled,
        raids_survived: state.stats.raids_survived,
        score: score.points,
        rank: score.rank.to_string(),
    })
}

/// Generator with template fallback.
///
/// Fallbacks draw from a private generator so they never disturb the
/// simulation's random stream.
pub struct Narrator {
    client: Option<NarrativeClient>,
    rng: Mutex<SimRng>,
}

impl Narrator {
    pub fn new(client: Option<NarrativeClient>, seed: u64) -> Self {
        Narrator {
            client,
            rng: Mutex::new(SimRng::new(seed)),
        }
    }

    /// An empty `base_url` disables the generator.
    pub fn from_url(base_url: &str, timeout: Duration, seed: u64) -> Self {
        if base_url.is_empty() {
            info!("Narrative generator disabled, using templates");
            return Narrator::new(None, seed);
        }
        match NarrativeClient::new(base_url, timeout) {
            Ok(client) => {
                info!(url = client.base_url(), timeout_ms = timeout.as_millis() as u64, "Narrative generator configured");
                Narrator::new(Some(client), seed)
            }
            Err(e) => {
                warn!(error = %e, "Failed to build narrative client, using templates");
                Narrator::new(None, seed)
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        self.client.is_some()
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut SimRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    /// `count` event drafts, requested all at once; each failed request is
    /// replaced by a template.
    pub async fn event_batch(&self, summary: &VillageSummary, count: usize) -> Vec<EventDraft> {
        let generated: Vec<Option<EventDraft>> = match &self.client {
            Some(client) => join_all((0..count).map(|_| client.generate_event(summary)))
                .await
                .into_iter()
                .map(|result| match result {
                    Ok(draft) => Some(draft),
                    Err(e) => {
                        warn!(error = %e, "Event generation failed, using template");
                        None
                    }
                })
                .collect(),
            None => (0..count).map(|_| None).collect(),
        };
        generated
            .into_iter()
            .map(|draft| draft.unwrap_or_else(|| self.with_rng(|rng| fallback_event(summary, rng))))
            .collect()
    }

    /// One result per subject. Without a generator every subject gets a
    /// template; a failed request skips that subject's chapter.
    pub async fn biographies(&self, batch: &BioBatch) -> Vec<Biography> {
        let mut results = Vec::with_capacity(batch.subjects.len());
        for subject in &batch.subjects {
            let text = match &self.client {
                Some(client) => match client.generate_bio(&subject.request).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        warn!(villager = %subject.villager, year = batch.year, error = %e, "Biography generation failed, skipping");
                        None
                    }
                },
                None => Some(self.with_rng(|rng| fallback::fallback_bio(&subject.request.name, subject.job, rng))),
            };
            results.push(Biography {
                villager: subject.villager,
                year: batch.year,
                text,
            });
        }
        results
    }

    /// Generated closing prose, or `templated` when unavailable.
    pub async fn ending_summary(&self, request: &EndingRequest, templated: String) -> String {
        let Some(client) = &self.client else {
            return templated;
        };
        match client.generate_ending(request).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Ending summary generation failed, keeping template");
                templated
            }
        }
    }
}
