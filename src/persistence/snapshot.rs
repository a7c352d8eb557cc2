//! Village archives on disk.
//!
//! Each archive is a short header (magic plus format version) followed by the
//! bincode-encoded [`WorldState`]. Files are named after the week they
//! capture and the wall-clock second they were written, so a directory
//! listing alone is enough to find the newest save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::rules::calendar::GAME_END_TICK;
use crate::world::WorldState;

const MAGIC: &[u8; 4] = b"VCHR";
const FORMAT_VERSION: u16 = 2;
const HEADER_LEN: usize = MAGIC.len() + 2;

#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    pub path: PathBuf,
    pub tick: u32,
    pub timestamp: u64,
    pub file_size: u64,
}

#[derive(Debug)]
pub enum SnapshotError {
    Io(io::Error),
    Encode(String),
    Decode(String),
    UnsupportedVersion(u16),
    TooLarge { size: u64, limit: u64 },
    Corrupt(PathBuf),
    NoValidSnapshots,
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "I/O error: {}", e),
            SnapshotError::Encode(e) => write!(f, "Could not encode village: {}", e),
            SnapshotError::Decode(e) => write!(f, "Could not decode village: {}", e),
            SnapshotError::UnsupportedVersion(v) => {
                write!(f, "Archive format v{} is not supported (expected v{})", v, FORMAT_VERSION)
            }
            SnapshotError::TooLarge { size, limit } => {
                write!(f, "Village archive is {} bytes, limit is {} bytes", size, limit)
            }
            SnapshotError::Corrupt(path) => write!(f, "Inconsistent village in {}", path.display()),
            SnapshotError::NoValidSnapshots => write!(
                f,
                "No readable village archives. Start a new village with: village-chronicle new"
            ),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

/// `village-tick{week}-{unix seconds}.bin`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArchiveName {
    tick: u32,
    timestamp: u64,
}

impl ArchiveName {
    fn now(tick: u32) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        ArchiveName { tick, timestamp }
    }

    fn file_name(self) -> String {
        format!("village-tick{}-{}.bin", self.tick, self.timestamp)
    }

    fn parse(name: &str) -> Option<Self> {
        let (tick, timestamp) = name
            .strip_prefix("village-tick")?
            .strip_suffix(".bin")?
            .split_once('-')?;
        Some(ArchiveName {
            tick: tick.parse().ok()?,
            timestamp: timestamp.parse().ok()?,
        })
    }
}

fn encode(state: &WorldState) -> Result<Vec<u8>, SnapshotError> {
    let body = bincode::serialize(state).map_err(|e| SnapshotError::Encode(e.to_string()))?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

fn decode(bytes: &[u8]) -> Result<WorldState, SnapshotError> {
    let Some(body) = bytes.strip_prefix(MAGIC.as_slice()) else {
        return Err(SnapshotError::Decode("missing archive header".to_string()));
    };
    let (version, body) = match body {
        [lo, hi, rest @ ..] => (u16::from_le_bytes([*lo, *hi]), rest),
        _ => return Err(SnapshotError::Decode("truncated archive header".to_string())),
    };
    if version != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }
    bincode::deserialize(body).map_err(|e| SnapshotError::Decode(e.to_string()))
}

/// Write to a hidden sibling, then rename over the target.
fn write_atomically(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let hidden = match target.file_name().and_then(|n| n.to_str()) {
        Some(name) => target.with_file_name(format!(".{}.tmp", name)),
        None => return Err(io::Error::new(io::ErrorKind::InvalidInput, "archive path has no file name")),
    };
    let written = fs::write(&hidden, bytes).and_then(|()| fs::rename(&hidden, target));
    if written.is_err() {
        let _ = fs::remove_file(&hidden);
    }
    written
}

/// Archive the village in `snapshot_dir`, refusing anything over `max_bytes`.
pub fn save_snapshot(state: &WorldState, snapshot_dir: &Path, max_bytes: u64) -> Result<PathBuf, SnapshotError> {
    let bytes = encode(state)?;
    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(SnapshotError::TooLarge { size, limit: max_bytes });
    }

    fs::create_dir_all(snapshot_dir)?;
    let target = snapshot_dir.join(ArchiveName::now(state.tick).file_name());
    write_atomically(&target, &bytes)?;
    debug!(path = %target.display(), bytes = size, "Village archived");
    Ok(target)
}

/// Decoded fine, but the clock or id counter cannot come from a real game.
fn is_inconsistent(state: &WorldState) -> bool {
    state.tick > GAME_END_TICK + 1
        || state.population.iter().any(|v| v.id.0 >= state.next_id)
        || state.event_pool.iter().any(|e| e.id.0 >= state.next_id)
        || state.log.iter().any(|e| e.seq >= state.next_log_seq)
}

pub fn load_snapshot(path: &Path) -> Result<WorldState, SnapshotError> {
    let state = decode(&fs::read(path)?)?;
    if is_inconsistent(&state) {
        return Err(SnapshotError::Corrupt(path.to_path_buf()));
    }
    Ok(state)
}

/// Archives in `snapshot_dir`, newest first. A missing directory holds none.
pub fn list_snapshots(snapshot_dir: &Path) -> Result<Vec<SnapshotMetadata>, SnapshotError> {
    if !snapshot_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    for entry in fs::read_dir(snapshot_dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).and_then(ArchiveName::parse) else {
            continue;
        };
        if !path.is_file() {
            continue;
        }
        archives.push(SnapshotMetadata {
            file_size: entry.metadata().map(|m| m.len()).unwrap_or(0),
            path,
            tick: name.tick,
            timestamp: name.timestamp,
        });
    }

    archives.sort_by(|a, b| (b.timestamp, b.tick).cmp(&(a.timestamp, a.tick)));
    Ok(archives)
}

/// Delete all but the `keep` newest archives and return what was removed.
pub fn prune_snapshots(snapshot_dir: &Path, keep: usize) -> Result<Vec<PathBuf>, SnapshotError> {
    let stale: Vec<PathBuf> = list_snapshots(snapshot_dir)?
        .into_iter()
        .skip(keep)
        .map(|m| m.path)
        .collect();
    for path in &stale {
        fs::remove_file(path)?;
    }
    Ok(stale)
}

/// The newest archive that loads cleanly. Unreadable ones are logged and skipped.
pub fn load_latest_valid_snapshot(snapshot_dir: &Path) -> Result<WorldState, SnapshotError> {
    for archive in list_snapshots(snapshot_dir)? {
        match load_snapshot(&archive.path) {
            Ok(state) => return Ok(state),
            Err(e) => warn!(path = %archive.path.display(), error = %e, "Skipping unreadable village archive"),
        }
    }
    Err(SnapshotError::NoValidSnapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::pool::populate;
    use crate::events::{EventCategory, EventDraft};
    use crate::rules::Difficulty;
    use crate::simulation::random::SimRng;
    use crate::simulation::{transition, Action};
    use crate::world::generation::new_game;
    use tempfile::TempDir;

    const LIMIT: u64 = 5 * 1024 * 1024;

    /// Two seasons into a Normal game, with a pending traveller event.
    fn autumn_village() -> WorldState {
        let mut rng = SimRng::new(42);
        let mut state = new_game(Difficulty::Normal, &mut rng);
        populate(
            &mut state,
            vec![EventDraft::external("A traveller", EventCategory::Info, 5.0, 0.0, 0.0, 0)],
        );
        for _ in 0..30 {
            state = transition(&state, Action::AdvanceTick, &mut rng);
        }
        state
    }

    fn plant(dir: &Path, tick: u32, timestamp: u64, bytes: &[u8]) -> PathBuf {
        let path = dir.join(ArchiveName { tick, timestamp }.file_name());
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn archived_village_comes_back_unchanged() {
        let dir = TempDir::new().unwrap();
        let village = autumn_village();

        let path = save_snapshot(&village, dir.path(), LIMIT).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), village);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(&format!("village-tick{}-", village.tick)));
    }

    #[test]
    fn archive_names_carry_week_and_time() {
        let name = ArchiveName { tick: 260, timestamp: 1_750_000_000 };
        assert_eq!(name.file_name(), "village-tick260-1750000000.bin");
        assert_eq!(ArchiveName::parse(&name.file_name()), Some(name));

        for junk in ["village-tick.bin", "village-tick12-later.bin", "world-tick12-5.bin", "village-tick12-5.json"] {
            assert_eq!(ArchiveName::parse(junk), None, "{}", junk);
        }
    }

    #[test]
    fn headerless_and_future_archives_are_rejected() {
        let dir = TempDir::new().unwrap();
        let body = bincode::serialize(&autumn_village()).unwrap();
        let bare = plant(dir.path(), 31, 1, &body);
        assert!(matches!(load_snapshot(&bare), Err(SnapshotError::Decode(_))));

        let mut future = encode(&autumn_village()).unwrap();
        future[MAGIC.len()] = 9;
        let path = plant(dir.path(), 31, 2, &future);
        assert!(matches!(load_snapshot(&path), Err(SnapshotError::UnsupportedVersion(9))));
    }

    #[test]
    fn half_written_archive_fails_to_decode() {
        let dir = TempDir::new().unwrap();
        let bytes = encode(&autumn_village()).unwrap();
        let path = plant(dir.path(), 31, 1, &bytes[..bytes.len() / 2]);
        assert!(matches!(load_snapshot(&path), Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn oversized_village_is_not_written() {
        let dir = TempDir::new().unwrap();
        let err = save_snapshot(&autumn_village(), dir.path(), 64).unwrap_err();
        assert!(matches!(err, SnapshotError::TooLarge { limit: 64, .. }));
        assert!(list_snapshots(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn villager_ids_beyond_the_counter_mark_corruption() {
        let dir = TempDir::new().unwrap();
        let mut village = autumn_village();
        village.next_id = 0;
        let path = plant(dir.path(), 31, 1, &encode(&village).unwrap());
        assert!(matches!(load_snapshot(&path), Err(SnapshotError::Corrupt(_))));
    }

    #[test]
    fn log_sequence_beyond_the_counter_marks_corruption() {
        let dir = TempDir::new().unwrap();
        let mut village = autumn_village();
        assert!(!village.log.is_empty());
        village.next_log_seq = 0;
        let path = plant(dir.path(), 31, 1, &encode(&village).unwrap());
        assert!(matches!(load_snapshot(&path), Err(SnapshotError::Corrupt(_))));
    }

    #[test]
    fn listing_is_newest_first_and_ignores_strangers() {
        let dir = TempDir::new().unwrap();
        let bytes = encode(&autumn_village()).unwrap();
        plant(dir.path(), 10, 1000, &bytes);
        plant(dir.path(), 52, 3000, &bytes);
        plant(dir.path(), 20, 2000, &bytes);
        fs::write(dir.path().join("chronicle.txt"), "notes").unwrap();
        fs::write(dir.path().join(".village-tick99-9999.bin.tmp"), "partial").unwrap();

        let ticks: Vec<u32> = list_snapshots(dir.path()).unwrap().iter().map(|m| m.tick).collect();
        assert_eq!(ticks, vec![52, 20, 10]);
        assert!(list_snapshots(&dir.path().join("never-created")).unwrap().is_empty());
    }

    #[test]
    fn pruning_keeps_the_newest_archives() {
        let dir = TempDir::new().unwrap();
        let bytes = encode(&autumn_village()).unwrap();
        for week in 0..6u32 {
            plant(dir.path(), week * 10, 1000 + week as u64, &bytes);
        }

        assert_eq!(prune_snapshots(dir.path(), 3).unwrap().len(), 3);
        let kept: Vec<u64> = list_snapshots(dir.path()).unwrap().iter().map(|m| m.timestamp).collect();
        assert_eq!(kept, vec![1005, 1004, 1003]);
        assert!(prune_snapshots(dir.path(), 10).unwrap().is_empty());
    }

    #[test]
    fn latest_readable_archive_wins() {
        let dir = TempDir::new().unwrap();
        let village = autumn_village();
        plant(dir.path(), 31, 1000, &encode(&village).unwrap());
        plant(dir.path(), 40, 2000, b"scribbles");

        assert_eq!(load_latest_valid_snapshot(dir.path()).unwrap(), village);
    }

    #[test]
    fn nothing_readable_means_no_valid_snapshots() {
        let empty = TempDir::new().unwrap();
        assert!(matches!(
            load_latest_valid_snapshot(empty.path()),
            Err(SnapshotError::NoValidSnapshots)
        ));

        let spoiled = TempDir::new().unwrap();
        plant(spoiled.path(), 10, 1, b"one");
        plant(spoiled.path(), 20, 2, b"two");
        assert!(matches!(
            load_latest_valid_snapshot(spoiled.path()),
            Err(SnapshotError::NoValidSnapshots)
        ));
    }

    #[test]
    fn saving_leaves_only_the_archive_behind() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("saves").join("village");
        let path = save_snapshot(&autumn_village(), &nested, LIMIT).unwrap();

        let names: Vec<String> = fs::read_dir(&nested)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(nested.join(&names[0]), path);
    }
}
