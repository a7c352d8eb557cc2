use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cli::input::{parse_command, Command, HELP};
use crate::config::simulation::SimulationConfig;
use crate::ending::score::FinalReport;
use crate::events::catalogue::VillageSummary;
use crate::events::pool::needs_replenishment;
use crate::events::EventDraft;
use crate::narrative::fallback::unknown_past;
use crate::narrative::{ending_request, select_bio_batch, Biography, Narrator};
use crate::persistence::{self, SnapshotError};
use crate::rules::calendar::{is_year_end, year_of};
use crate::rules::Difficulty;
use crate::simulation::{apply, transition, Action, SimRng};
use crate::world::generation::{new_game, print_village_summary};
use crate::world::{GameStatus, LogEntry, VillagerId, WorldState};

const CHANNEL_CAPACITY: usize = 16;
/// Keeps the narrator's template stream apart from the simulation's.
const NARRATOR_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Collaborator output, tagged with the game it was requested for.
#[derive(Debug)]
enum Narration {
    Events { game: Uuid, initial: bool, drafts: Vec<EventDraft> },
    Biographies { game: Uuid, results: Vec<Biography> },
    Ending { game: Uuid, summary: String },
}

impl Narration {
    fn game(&self) -> Uuid {
        match self {
            Narration::Events { game, .. } | Narration::Biographies { game, .. } | Narration::Ending { game, .. } => *game,
        }
    }
}

/// Owns the single current state and everything that feeds it.
struct Driver<'a> {
    config: &'a SimulationConfig,
    snapshot_dir: PathBuf,
    state: WorldState,
    rng: SimRng,
    narrator: Arc<Narrator>,
    tx: mpsc::Sender<Narration>,
    populated: Option<Uuid>,
    events_pending: Option<Uuid>,
    bios_pending: Option<Uuid>,
    ending_requested: Option<Uuid>,
    ending_received: Option<Uuid>,
    ticks_since_snapshot: u32,
}

impl<'a> Driver<'a> {
    fn new(config: &'a SimulationConfig, state: WorldState, rng: SimRng, tx: mpsc::Sender<Narration>) -> Self {
        let narrator = Narrator::from_url(
            &config.narrative_url,
            config.narrative_timeout(),
            rng.seed() ^ NARRATOR_SEED_SALT,
        );
        // A resumed game already has its opening events.
        let populated = (!state.event_pool.is_empty()).then_some(state.id);
        let ending_received = (state.status == GameStatus::Finished).then_some(state.id);
        Driver {
            config,
            snapshot_dir: PathBuf::from(&config.snapshot_directory),
            state,
            rng,
            narrator: Arc::new(narrator),
            tx,
            populated,
            events_pending: None,
            bios_pending: None,
            ending_requested: ending_received,
            ending_received,
            ticks_since_snapshot: 0,
        }
    }

    /// Apply an action and report whether anything changed.
    fn dispatch(&mut self, action: Action) -> bool {
        let next = transition(&self.state, action, &mut self.rng);
        let changed = next != self.state;
        self.replace(next);
        changed
    }

    fn replace(&mut self, next: WorldState) {
        for entry in new_log_entries(&self.state, &next) {
            println!("[week {:>3}] {}", entry.tick, entry.message);
        }
        self.state = next;
    }

    fn tick(&mut self) {
        if !self.state.is_running() {
            return;
        }
        let result = apply(&self.state, Action::AdvanceTick, &mut self.rng);
        if let Some(report) = &result.report {
            if is_year_end(report.week) {
                let stats = &report.statistics;
                info!(
                    year = year_of(report.week),
                    population = stats.population,
                    food = stats.food,
                    happiness = stats.avg_happiness,
                    diversity = stats.workforce_diversity as f64,
                    events = stats.event_pool_size,
                    "Year complete"
                );
            }
        }
        self.replace(result.state);

        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.config.snapshot_interval {
            self.save();
        }
        self.request_narration();
    }

    fn save(&mut self) {
        match persistence::save_snapshot(&self.state, &self.snapshot_dir, self.config.max_snapshot_bytes) {
            Ok(path) => {
                self.ticks_since_snapshot = 0;
                info!(path = %path.display(), tick = self.state.tick, "Snapshot saved");
                if let Err(e) = persistence::prune_snapshots(&self.snapshot_dir, self.config.max_snapshots as usize) {
                    warn!(error = %e, "Snapshot pruning failed");
                }
            }
            Err(e) => warn!(error = %e, "Snapshot save failed"),
        }
    }

    /// Start whatever collaborator work the current state calls for.
    fn request_narration(&mut self) {
        let game = self.state.id;
        match self.state.status {
            GameStatus::Playing => {
                if self.populated != Some(game) {
                    self.populated = Some(game);
                    self.spawn_events(true, self.config.initial_event_batch);
                } else if needs_replenishment(&self.state) && self.events_pending != Some(game) {
                    self.spawn_events(false, self.config.replenish_event_batch);
                }
                if self.bios_pending != Some(game) {
                    self.spawn_biographies();
                }
            }
            GameStatus::Finished if self.ending_requested != Some(game) => {
                self.ending_requested = Some(game);
                let report = FinalReport::new(&self.state);
                println!("\n{}", report);
                if let Some(request) = ending_request(&self.state, report.score()) {
                    let templated = self.state.ending.as_ref().map(|e| e.summary.clone()).unwrap_or_default();
                    let narrator = Arc::clone(&self.narrator);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let summary = narrator.ending_summary(&request, templated).await;
                        if tx.send(Narration::Ending { game, summary }).await.is_err() {
                            debug!("Driver stopped, dropping ending summary");
                        }
                    });
                }
                self.save();
            }
            _ => {}
        }
    }

    fn spawn_events(&mut self, initial: bool, count: usize) {
        let game = self.state.id;
        let summary = VillageSummary::from_state(&self.state);
        let narrator = Arc::clone(&self.narrator);
        let tx = self.tx.clone();
        self.events_pending = Some(game);
        debug!(initial, count, "Requesting event batch");
        tokio::spawn(async move {
            let drafts = narrator.event_batch(&summary, count).await;
            if tx.send(Narration::Events { game, initial, drafts }).await.is_err() {
                debug!("Driver stopped, dropping event batch");
            }
        });
    }

    fn spawn_biographies(&mut self) {
        let Some(batch) = select_bio_batch(&self.state, self.config.bio_batch_size) else {
            return;
        };
        let game = self.state.id;
        let narrator = Arc::clone(&self.narrator);
        let tx = self.tx.clone();
        self.bios_pending = Some(game);
        debug!(year = batch.year, villagers = batch.subjects.len(), "Requesting biographies");
        tokio::spawn(async move {
            let results = narrator.biographies(&batch).await;
            if tx.send(Narration::Biographies { game, results }).await.is_err() {
                debug!("Driver stopped, dropping biographies");
            }
        });
    }

    fn handle_narration(&mut self, narration: Narration) {
        let game = narration.game();
        if game != self.state.id {
            debug!(game = %game, current = %self.state.id, "Discarding result for a previous game");
            return;
        }
        match narration {
            Narration::Events { initial, drafts, .. } => {
                self.events_pending = None;
                let count = drafts.len();
                let action = if initial {
                    Action::PopulateEventPool(drafts)
                } else {
                    Action::ReplenishEventPool(drafts)
                };
                if self.dispatch(action) {
                    info!(initial, count, pool = self.state.event_pool.len(), "Event pool updated");
                }
            }
            Narration::Biographies { results, .. } => {
                self.bios_pending = None;
                for bio in results {
                    self.dispatch(Action::AttachBiography {
                        villager: bio.villager,
                        text: bio.text.unwrap_or_default(),
                        year: bio.year,
                    });
                }
            }
            Narration::Ending { summary, .. } => {
                self.ending_received = Some(game);
                if self.dispatch(Action::SetEndingSummary(summary.clone())) {
                    println!("\n{}\n", summary);
                    self.save();
                }
            }
        }
        self.request_narration();
    }

    /// Returns false when the player asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }
        match parse_command(line) {
            Ok(Command::Act(action)) => {
                let name = action.name();
                if !self.dispatch(action) {
                    println!("Cannot {} right now", name.replace('_', " "));
                }
                self.request_narration();
            }
            Ok(Command::SetPaused(paused)) => {
                if self.state.status != GameStatus::Playing {
                    println!("No game in progress");
                } else if self.state.paused == paused {
                    println!("Already {}", if paused { "paused" } else { "running" });
                } else {
                    self.dispatch(Action::TogglePause);
                    println!("{}", if paused { "Paused" } else { "Resumed" });
                }
            }
            Ok(Command::Status) => print_village_summary(&self.state),
            Ok(Command::Report) => println!("{}", FinalReport::new(&self.state)),
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Quit) => return false,
            Err(e) => println!("{}", e),
        }
        true
    }

    /// Nothing left to do without player input.
    fn is_settled(&self) -> bool {
        match self.state.status {
            GameStatus::Finished => self.ending_received == Some(self.state.id),
            GameStatus::Menu => true,
            GameStatus::Playing => false,
        }
    }
}

/// Entries in `after` that were not yet in `before`.
fn new_log_entries<'s>(before: &WorldState, after: &'s WorldState) -> impl Iterator<Item = &'s LogEntry> {
    let first_new = if before.id == after.id { before.next_log_seq } else { 0 };
    after.log.iter().skip_while(move |e| e.seq < first_new)
}

fn load_or_start(config: &SimulationConfig, snapshot: Option<&str>, rng: &mut SimRng) -> Result<WorldState, String> {
    if let Some(path) = snapshot {
        info!(path, "Loading village");
        return persistence::load_snapshot(Path::new(path)).map_err(|e| format!("Failed to load snapshot: {}", e));
    }
    let dir = Path::new(&config.snapshot_directory);
    match persistence::load_latest_valid_snapshot(dir) {
        Ok(state) => Ok(state),
        Err(SnapshotError::NoValidSnapshots) => {
            info!(difficulty = ?config.difficulty, "No snapshot found, founding a new village");
            Ok(new_game(config.difficulty, rng))
        }
        Err(e) => Err(format!("Failed to load snapshot: {}", e)),
    }
}

/// Run the game: load or found a village, then tick, read commands and
/// apply narrative results until quit, ctrl-c or a settled ending.
pub async fn run_simulation(
    config: &SimulationConfig,
    snapshot: Option<&str>,
    fresh: Option<Difficulty>,
) -> Result<(), String> {
    let mut rng = SimRng::new(config.seed);
    let state = match fresh {
        Some(difficulty) => new_game(difficulty, &mut rng),
        None => load_or_start(config, snapshot, &mut rng)?,
    };
    info!(
        game = %state.id,
        tick = state.tick,
        population = state.population.len(),
        seed = rng.seed(),
        "Village loaded"
    );

    let (tx, mut narrations) = mpsc::channel::<Narration>(CHANNEL_CAPACITY);
    let mut driver = Driver::new(config, state, rng, tx);

    let (line_tx, mut lines) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    tokio::spawn(async move {
        let mut reader = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = reader.next_line().await {
            if line_tx.send(line).await.is_err() {
                break;
            }
        }
    });
    let mut stdin_open = true;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut interval = time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    driver.save();
    driver.request_narration();
    info!(
        tick_rate_hz = config.tick_rate_hz,
        snapshot_interval = config.snapshot_interval,
        "Simulation running, type 'help' for commands"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            line = lines.recv(), if stdin_open => match line {
                Some(line) => {
                    if !driver.handle_line(&line) {
                        break;
                    }
                }
                None => {
                    debug!("Input closed");
                    stdin_open = false;
                }
            },
            Some(narration) = narrations.recv() => driver.handle_narration(narration),
            _ = interval.tick() => driver.tick(),
        }
        if !stdin_open && driver.is_settled() {
            info!("Game settled with no input attached");
            break;
        }
    }

    driver.save();
    info!(tick = driver.state.tick, status = ?driver.state.status, "Simulation stopped");
    Ok(())
}

/// Found a new village and write its first snapshot.
pub fn new_village(config: &SimulationConfig, difficulty: Difficulty, seed: Option<u64>) -> Result<(), String> {
    let mut rng = SimRng::new(seed.unwrap_or(config.seed));
    let state = new_game(difficulty, &mut rng);
    print_village_summary(&state);

    let path = persistence::save_snapshot(
        &state,
        Path::new(&config.snapshot_directory),
        config.max_snapshot_bytes,
    )
    .map_err(|e| format!("Cannot save snapshot: {}", e))?;
    println!("\nVillage saved to {} (seed {})", path.display(), rng.seed());
    Ok(())
}

/// What `inspect` should print besides the summary.
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    pub snapshot: Option<String>,
    pub villager: Option<u64>,
    pub log: Option<usize>,
    pub report: bool,
}

pub fn inspect(config: &SimulationConfig, options: &InspectOptions) -> Result<(), String> {
    let state = match &options.snapshot {
        Some(path) => persistence::load_snapshot(Path::new(path)),
        None => persistence::load_latest_valid_snapshot(Path::new(&config.snapshot_directory)),
    }
    .map_err(|e| format!("Failed to load snapshot: {}", e))?;

    if let Some(id) = options.villager {
        return inspect_villager(&state, VillagerId(id));
    }

    print_village_summary(&state);
    if let Some(n) = options.log {
        println!("\n--- Chronicle (last {}) ---", n);
        let skip = state.log.len().saturating_sub(n);
        for entry in state.log.iter().skip(skip) {
            println!("  [week {:>3}] {:?}: {}", entry.tick, entry.kind, entry.message);
        }
    }
    if options.report {
        println!("\n{}", FinalReport::new(&state));
    }
    Ok(())
}

fn inspect_villager(state: &WorldState, id: VillagerId) -> Result<(), String> {
    let v = state
        .villager(id)
        .ok_or_else(|| format!("Villager {} not found (population {})", id, state.population.len()))?;

    println!("=== {} ({}) ===", v.name, v.id);
    println!("Age: {}", v.age);
    println!("Job: {}", v.job.name());
    println!("Activity: {:?}", v.activity);
    println!();
    println!("  Health: {:.1}", v.health);
    println!("  Hunger: {:.1}", v.hunger);
    println!("  Happiness: {:.1} (baseline {:.1})", v.happiness, v.happiness_baseline);
    println!("  Energy: {:.1}", v.energy);
    println!();
    match v.bio.as_deref() {
        Some(bio) if !bio.is_empty() => println!("{}", bio),
        _ => println!("{}", unknown_past(&v.name)),
    }
    Ok(())
}
