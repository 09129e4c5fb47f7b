//! SQLite implementation of the image data store.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use url::Url;

use super::traits::{
  BeerImageDataStore, CacheDiscipline, InsertionResult, RetrievalResult, StoreError,
};
use crate::task::{Completion, CompletionSlot};

type Job = Box<dyn FnOnce(&mut Connection) + Send>;

/// Summary of one stored image.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedImage {
  pub url: String,
  pub size: usize,
  pub cached_at: DateTime<Utc>,
}

/// SQLite-backed image store.
///
/// The connection lives on a dedicated worker thread and every operation is
/// queued to it, so operations run one at a time in submission order and
/// callers are never blocked on disk I/O.
///
/// Dropping the store waits for the jobs already queued, so a write accepted
/// before teardown is committed.
pub struct SqliteImageDataStore {
  jobs: Option<mpsc::Sender<Job>>,
  worker: Option<JoinHandle<()>>,
  discipline: CacheDiscipline,
}

impl SqliteImageDataStore {
  /// Open (or create) the store at `path`.
  pub fn open(path: &Path, discipline: CacheDiscipline) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    tracing::info!(path = %path.display(), ?discipline, "Opened image cache");
    Self::start(conn, discipline)
  }

  /// Store that lives only as long as this value.
  pub fn open_in_memory(discipline: CacheDiscipline) -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;

    Self::start(conn, discipline)
  }

  fn start(conn: Connection, discipline: CacheDiscipline) -> Result<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    let (jobs, receiver) = mpsc::channel::<Job>();
    let worker = thread::Builder::new()
      .name("beerlist-store".to_string())
      .spawn(move || {
        let mut conn = conn;
        // Ends once every sender (i.e. the store) is dropped.
        for job in receiver {
          job(&mut conn);
        }
      })
      .map_err(|e| eyre!("Failed to start cache store worker: {}", e))?;

    Ok(Self {
      jobs: Some(jobs),
      worker: Some(worker),
      discipline,
    })
  }

  pub fn discipline(&self) -> CacheDiscipline {
    self.discipline
  }

  /// All stored entries, most recent first.
  pub fn entries(&self, completion: Completion<Result<Vec<CachedImage>, StoreError>>) {
    self.perform(completion, |conn| {
      let mut stmt = conn.prepare(
        "SELECT url, length(data), cached_at FROM image_cache
         ORDER BY cached_at DESC, url",
      )?;

      let rows = stmt
        .query_map([], |row| {
          Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
          ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

      rows
        .into_iter()
        .map(|(url, size, cached_at)| {
          Ok(CachedImage {
            url,
            size: usize::try_from(size).unwrap_or(0),
            cached_at: parse_datetime(&cached_at)?,
          })
        })
        .collect()
    });
  }

  /// Remove every entry, reporting how many were removed.
  pub fn clear(&self, completion: Completion<Result<usize, StoreError>>) {
    self.perform(completion, |conn| {
      let removed = conn.execute("DELETE FROM image_cache", [])?;
      Ok(removed)
    });
  }

  /// Queue `work` on the worker and route its result to `completion`.
  fn perform<T, F>(&self, completion: Completion<Result<T, StoreError>>, work: F)
  where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
  {
    let slot = Arc::new(CompletionSlot::new(completion));
    let delivery = slot.clone();
    let job: Job = Box::new(move |conn| {
      delivery.complete(work(conn));
    });

    let sent = match &self.jobs {
      Some(jobs) => jobs.send(job).is_ok(),
      None => false,
    };
    if !sent {
      tracing::warn!("Cache store worker is gone");
      report_closed(slot);
    }
  }
}

/// Deliver `Closed` off the caller's thread, like every other outcome.
fn report_closed<T: Send + 'static>(slot: Arc<CompletionSlot<Result<T, StoreError>>>) {
  let delivery = slot.clone();
  let spawned = thread::Builder::new()
    .name("beerlist-store-closed".to_string())
    .spawn(move || {
      delivery.complete(Err(StoreError::Closed));
    });

  if let Err(e) = spawned {
    tracing::warn!("Failed to defer store error delivery: {}", e);
    slot.complete(Err(StoreError::Closed));
  }
}

impl Drop for SqliteImageDataStore {
  fn drop(&mut self) {
    // Closing the channel lets the worker drain what is queued and exit.
    drop(self.jobs.take());

    if let Some(worker) = self.worker.take() {
      // The last handle can be dropped from a completion running on the worker.
      if worker.thread().id() == thread::current().id() {
        return;
      }
      if worker.join().is_err() {
        tracing::warn!("Cache store worker panicked");
      }
    }
  }
}

/// Schema for the image cache.
const CACHE_SCHEMA: &str = r#"
-- One row per URL; url_hash keeps the primary key fixed-length
CREATE TABLE IF NOT EXISTS image_cache (
    url_hash TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl BeerImageDataStore for SqliteImageDataStore {
  fn retrieve(&self, url: &Url, completion: Completion<RetrievalResult>) {
    let key = url_key(url);

    self.perform(completion, move |conn| {
      let data = conn
        .query_row(
          "SELECT data FROM image_cache WHERE url_hash = ?",
          params![key],
          |row| row.get::<_, Vec<u8>>(0),
        )
        .optional()?;
      Ok(data)
    });
  }

  fn insert(&self, data: Vec<u8>, url: &Url, completion: Completion<InsertionResult>) {
    let key = url_key(url);
    let url = url.to_string();
    let discipline = self.discipline;

    self.perform(completion, move |conn| {
      let tx = conn.transaction()?;

      if discipline == CacheDiscipline::SingleSlot {
        tx.execute("DELETE FROM image_cache", [])?;
      }

      tx.execute(
        "INSERT OR REPLACE INTO image_cache (url_hash, url, data, cached_at)
         VALUES (?, ?, ?, datetime('now'))",
        params![key, url, data],
      )?;

      tx.commit()?;
      Ok(())
    });
  }
}

/// SHA256 hash for stable, fixed-length keys.
fn url_key(url: &Url) -> String {
  let mut hasher = Sha256::new();
  hasher.update(url.as_str().as_bytes());
  hex::encode(hasher.finalize())
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{}': {}", s, e)))
}
