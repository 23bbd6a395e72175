// Local file storage: locking/atomic-write primitives and the holiday store.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to the Holiday struct serialization require incrementing
// HOLIDAY_STORE_VERSION below to keep old files readable.
use crate::context::AppContext;
use crate::model::Holiday;
use anyhow::Result;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Sentinel catalog entry: its presence means the default catalog has
/// already been seeded.
pub const SENTINEL_HOLIDAY: &str = "New Year's Day";

// Version history:
// - v1: Initial format (name / date / is_selected)
const HOLIDAY_STORE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct HolidayStoreData {
    #[serde(default)]
    version: u32,
    holidays: Vec<Holiday>,
}

/// File locking and atomic-write primitives shared by every on-disk store.
pub struct LocalStorage;

impl LocalStorage {
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive advisory lock on a sibling
    /// `.lock` file, so concurrent processes serialize their read-modify-
    /// write cycles.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: write to a `.tmp` sibling, then rename over the target.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

/// Single-table store of catalog holidays, keyed by holiday name.
///
/// Backed by one JSON file under the context's data directory. Every
/// operation is a full read (and, for writes, a full rewrite) under the
/// file lock; the table is a dozen rows, so there is nothing to index.
#[derive(Debug, Clone)]
pub struct HolidayStore {
    path: PathBuf,
}

impl HolidayStore {
    pub fn new(ctx: &dyn AppContext) -> Result<Self> {
        Ok(Self {
            path: ctx.get_holiday_store_path()?,
        })
    }

    fn read_unlocked(&self) -> Result<Vec<Holiday>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let json = fs::read_to_string(&self.path)?;

        if let Ok(data) = serde_json::from_str::<HolidayStoreData>(&json) {
            return Ok(data.holidays);
        }

        // Unversioned file from before the envelope existed; rewrite it.
        let holidays: Vec<Holiday> = serde_json::from_str(&json)
            .map_err(|e| anyhow::anyhow!("Unreadable holiday store '{:?}': {}", self.path, e))?;
        log::info!(
            "Migrating holiday store to v{}",
            HOLIDAY_STORE_VERSION
        );
        self.write_unlocked(&holidays)?;
        Ok(holidays)
    }

    fn write_unlocked(&self, holidays: &[Holiday]) -> Result<()> {
        let data = HolidayStoreData {
            version: HOLIDAY_STORE_VERSION,
            holidays: holidays.to_vec(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        LocalStorage::atomic_write(&self.path, json)
    }

    pub fn list_all(&self) -> Result<Vec<Holiday>> {
        LocalStorage::with_lock(&self.path, || self.read_unlocked())
    }

    /// Only the holidays the user has left selected; the evaluator never
    /// sees the rest.
    pub fn list_selected(&self) -> Result<Vec<Holiday>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|h| h.is_selected)
            .collect())
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Holiday>> {
        Ok(self.list_all()?.into_iter().find(|h| h.name == name))
    }

    /// Inserts or replaces by name, mirroring a REPLACE conflict policy on
    /// the primary key.
    pub fn upsert(&self, holiday: &Holiday) -> Result<()> {
        LocalStorage::with_lock(&self.path, || {
            let mut holidays = self.read_unlocked()?;
            match holidays.iter_mut().find(|h| h.name == holiday.name) {
                Some(existing) => *existing = holiday.clone(),
                None => holidays.push(holiday.clone()),
            }
            self.write_unlocked(&holidays)
        })
    }

    /// Seeds the fixed default catalog, once.
    ///
    /// Guarded by an existence check on the sentinel entry rather than an
    /// unconditional insert: a second call is a no-op that neither
    /// duplicates rows nor resets user toggles. Returns whether seeding
    /// actually happened.
    pub fn seed_default_catalog(&self) -> Result<bool> {
        LocalStorage::with_lock(&self.path, || {
            let mut holidays = self.read_unlocked()?;
            if holidays.iter().any(|h| h.name == SENTINEL_HOLIDAY) {
                return Ok(false);
            }
            holidays.extend(default_catalog());
            self.write_unlocked(&holidays)?;
            log::info!("Seeded default holiday catalog ({} entries)", holidays.len());
            Ok(true)
        })
    }
}

/// The fixed catalog inserted on first run. Entries whose date varies from
/// year to year (Easter, Mother's/Father's Day, Thanksgiving) carry an
/// empty date and never fire until a date is supplied.
pub fn default_catalog() -> Vec<Holiday> {
    vec![
        Holiday::new("New Year's Day", "01-01", true),
        Holiday::new("Valentine's Day", "02-14", true),
        Holiday::new("St. Patrick's Day", "03-17", false),
        Holiday::new("Easter Sunday", "", true),
        Holiday::new("Mother's Day", "", true),
        Holiday::new("Father's Day", "", true),
        Holiday::new("Independence Day (US)", "07-04", false),
        Holiday::new("Halloween", "10-31", true),
        Holiday::new("Thanksgiving (US)", "", true),
        Holiday::new("Christmas Eve", "12-24", false),
        Holiday::new("Christmas Day", "12-25", true),
        Holiday::new("New Year's Eve", "12-31", false),
    ]
}
