//! Durable favorites collection with a live feed.
//!
//! Storage is pluggable (`SqliteStorage` on native targets, `InMemoryStorage`
//! everywhere). `FavoritesStore` wraps a storage, keeps the last published
//! snapshot, and re-publishes the whole collection to every subscriber after
//! each mutation that changed a row.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::model::{Recipe, RecipeId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("storage task failed: {0}")]
    Task(String),

    #[error("storage lock poisoned")]
    LockPoisoned,
}

#[cfg(not(target_arch = "wasm32"))]
impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

// ============================================================================
// Storage Trait and Implementations
// ============================================================================

#[async_trait::async_trait]
pub trait FavoritesStorage: Send + Sync {
    /// All rows in natural order (insertion order; an upsert moves the row
    /// to the end).
    async fn load_all(&self) -> Result<Vec<Recipe>, StoreError>;
    async fn upsert(&self, recipe: &Recipe) -> Result<(), StoreError>;
    /// Returns whether a row was removed.
    async fn remove(&self, id: &RecipeId) -> Result<bool, StoreError>;
}

#[derive(Default)]
pub struct InMemoryStorage {
    rows: Mutex<Vec<Recipe>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<MutexGuard<'_, Vec<Recipe>>, StoreError> {
        self.rows.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

#[async_trait::async_trait]
impl FavoritesStorage for InMemoryStorage {
    async fn load_all(&self) -> Result<Vec<Recipe>, StoreError> {
        Ok(self.rows()?.clone())
    }

    async fn upsert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        let mut rows = self.rows()?;
        rows.retain(|r| r.id != recipe.id);
        rows.push(recipe.clone());
        Ok(())
    }

    async fn remove(&self, id: &RecipeId) -> Result<bool, StoreError> {
        let mut rows = self.rows()?;
        let before = rows.len();
        rows.retain(|r| &r.id != id);
        Ok(rows.len() != before)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use self::sqlite::SqliteStorage;

#[cfg(not(target_arch = "wasm32"))]
mod sqlite {
    use std::path::{Path, PathBuf};

    use rusqlite::{params, Connection, Row};

    use super::*;

    const SCHEMA: &str = r#"
        CREATE TABLE IF NOT EXISTS favorite_recipes (
            id TEXT PRIMARY KEY NOT NULL,
            area TEXT NOT NULL,
            name TEXT NOT NULL,
            thumbnail_url TEXT NOT NULL,
            category TEXT NOT NULL,
            tags TEXT NOT NULL,
            video_url TEXT NOT NULL,
            instructions TEXT NOT NULL
        );
    "#;

    /// SQLite-backed favorites table. Queries run on the blocking pool.
    pub struct SqliteStorage {
        conn: Arc<Mutex<Connection>>,
    }

    impl SqliteStorage {
        /// Opens (creating if needed) the database at `path`. File access,
        /// the WAL pragma and the schema run on the blocking pool.
        #[instrument(skip(path), fields(path = %path.as_ref().display()))]
        pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
            let path: PathBuf = path.as_ref().to_path_buf();
            tokio::task::spawn_blocking(move || {
                let conn = Connection::open(&path)?;
                let mode: String =
                    conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
                debug!(path = %path.display(), journal_mode = %mode, "opened favorites database");
                Self::with_connection(conn)
            })
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
        }

        pub fn open_in_memory() -> Result<Self, StoreError> {
            Self::with_connection(Connection::open_in_memory()?)
        }

        fn with_connection(conn: Connection) -> Result<Self, StoreError> {
            conn.execute_batch(SCHEMA)?;
            Ok(Self {
                conn: Arc::new(Mutex::new(conn)),
            })
        }

        async fn run<R, F>(&self, f: F) -> Result<R, StoreError>
        where
            R: Send + 'static,
            F: FnOnce(&Connection) -> rusqlite::Result<R> + Send + 'static,
        {
            let conn = Arc::clone(&self.conn);
            tokio::task::spawn_blocking(move || {
                let conn = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
                f(&conn).map_err(StoreError::from)
            })
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
        }
    }

    fn row_to_recipe(row: &Row<'_>) -> rusqlite::Result<Recipe> {
        Ok(Recipe {
            id: RecipeId(row.get(0)?),
            area: row.get(1)?,
            name: row.get(2)?,
            thumbnail_url: row.get(3)?,
            category: row.get(4)?,
            tags: row.get(5)?,
            video_url: row.get(6)?,
            instructions: row.get(7)?,
        })
    }

    #[async_trait::async_trait]
    impl FavoritesStorage for SqliteStorage {
        async fn load_all(&self) -> Result<Vec<Recipe>, StoreError> {
            self.run(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, area, name, thumbnail_url, category, tags, video_url, instructions
                     FROM favorite_recipes ORDER BY rowid ASC",
                )?;
                let rows = stmt.query_map([], row_to_recipe)?;
                let recipes = rows.collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(recipes)
            })
            .await
        }

        async fn upsert(&self, recipe: &Recipe) -> Result<(), StoreError> {
            let recipe = recipe.clone();
            self.run(move |conn| {
                // REPLACE deletes the old row, so the recipe gets a fresh rowid.
                conn.execute(
                    "INSERT OR REPLACE INTO favorite_recipes
                        (id, area, name, thumbnail_url, category, tags, video_url, instructions)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        recipe.id.as_str(),
                        recipe.area,
                        recipe.name,
                        recipe.thumbnail_url,
                        recipe.category,
                        recipe.tags,
                        recipe.video_url,
                        recipe.instructions,
                    ],
                )?;
                Ok(())
            })
            .await
        }

        async fn remove(&self, id: &RecipeId) -> Result<bool, StoreError> {
            let id = id.clone();
            self.run(move |conn| {
                let affected =
                    conn.execute("DELETE FROM favorite_recipes WHERE id = ?1", params![id.as_str()])?;
                Ok(affected > 0)
            })
            .await
        }
    }
}

// ============================================================================
// Feed
// ============================================================================

type FeedCallback = dyn Fn(&[Recipe]) + Send + Sync;

struct FeedState {
    snapshot: Arc<[Recipe]>,
    subscribers: Vec<(u64, Arc<FeedCallback>)>,
}

struct Feed {
    next_id: AtomicU64,
    state: Mutex<FeedState>,
    // Serializes deliveries so every subscriber sees snapshots in publish order.
    delivery: Mutex<()>,
}

impl Feed {
    fn new(initial: Vec<Recipe>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            state: Mutex::new(FeedState {
                snapshot: initial.into(),
                subscribers: Vec::new(),
            }),
            delivery: Mutex::new(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(&self, callback: Arc<FeedCallback>) -> u64 {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let snapshot = {
            let mut state = self.state();
            state.subscribers.push((id, Arc::clone(&callback)));
            Arc::clone(&state.snapshot)
        };
        callback(snapshot.as_ref());
        id
    }

    fn unsubscribe(&self, id: u64) {
        self.state().subscribers.retain(|(sid, _)| *sid != id);
    }

    fn publish(&self, recipes: Vec<Recipe>) {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let (snapshot, subscribers) = {
            let mut state = self.state();
            state.snapshot = recipes.into();
            let subscribers: Vec<_> = state.subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect();
            (Arc::clone(&state.snapshot), subscribers)
        };
        for callback in subscribers {
            callback(snapshot.as_ref());
        }
    }
}

/// Handle for a feed registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    feed: Weak<Feed>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.upgrade() {
            feed.unsubscribe(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// ============================================================================
// Store
// ============================================================================

pub struct FavoritesStore {
    storage: Arc<dyn FavoritesStorage>,
    feed: Arc<Feed>,
    write_lock: tokio::sync::Mutex<()>,
}

impl FavoritesStore {
    #[instrument(skip(storage))]
    pub async fn open(storage: Arc<dyn FavoritesStorage>) -> Result<Self, StoreError> {
        let initial = storage.load_all().await?;
        info!("Favorites store opened with {} recipes", initial.len());

        Ok(Self {
            storage,
            feed: Arc::new(Feed::new(initial)),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Inserts or replaces by id, then publishes the new collection.
    #[instrument(skip(self, recipe), fields(recipe_id = %recipe.id))]
    pub async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        if let Err(e) = self.storage.upsert(recipe).await {
            error!("Failed to persist favorite: {}", e);
            return Err(e);
        }
        self.republish().await
    }

    #[instrument(skip(self, recipe), fields(recipe_id = %recipe.id))]
    pub async fn delete(&self, recipe: &Recipe) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let removed = match self.storage.remove(&recipe.id).await {
            Ok(removed) => removed,
            Err(e) => {
                error!("Failed to delete favorite: {}", e);
                return Err(e);
            }
        };

        if removed {
            self.republish().await
        } else {
            debug!("Favorite not present, nothing to publish");
            Ok(())
        }
    }

    async fn republish(&self) -> Result<(), StoreError> {
        let recipes = self.storage.load_all().await?;
        debug!(count = recipes.len(), "publishing favorites");
        self.feed.publish(recipes);
        Ok(())
    }

    /// Registers `callback` and immediately delivers the current collection
    /// to it. Callbacks run synchronously on the publishing task and must not
    /// subscribe from inside the callback.
    pub fn subscribe(&self, callback: impl Fn(&[Recipe]) + Send + Sync + 'static) -> Subscription {
        let id = self.feed.subscribe(Arc::new(callback));
        Subscription {
            id,
            feed: Arc::downgrade(&self.feed),
        }
    }

    pub fn snapshot(&self) -> Vec<Recipe> {
        self.feed.state().snapshot.to_vec()
    }

    pub fn contains(&self, id: &RecipeId) -> bool {
        self.feed.state().snapshot.iter().any(|r| &r.id == id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.state().subscribers.len()
    }
}
