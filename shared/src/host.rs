//! Native host around the Crux core.
//!
//! `RecipeCore` owns the core and the favorites store. Favorites effects are
//! performed here; every store emission comes back into the core as
//! `Event::FavoritesUpdated` through the channel returned by
//! [`RecipeCore::new`]. HTTP and render effects go to the platform shell.

use std::sync::{Arc, Mutex, PoisonError};

use crux_core::capability::Operation;
use crux_core::{Core, Request};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, instrument};

use crate::app::{App, ViewModel};
use crate::capabilities::{Capabilities, Effect, FavoritesOperation};
use crate::config::RecipeConfig;
use crate::event::Event;
use crate::favorites_store::{FavoritesStorage, FavoritesStore, InMemoryStorage, StoreError, Subscription};
use crate::model::Recipe;
use crate::AppError;

pub struct RecipeCore {
    core: Core<Effect, App>,
    store: Arc<FavoritesStore>,
    events: UnboundedSender<Event>,
    subscription: Mutex<Option<Subscription>>,
}

impl RecipeCore {
    /// Validates `config`, opens the favorites store it names and builds
    /// the core. The returned receiver carries events the core raises for
    /// itself; drain it with [`RecipeCore::pump`].
    #[instrument(skip(config), fields(base_url = %config.base_url))]
    pub async fn new(config: RecipeConfig) -> Result<(Self, UnboundedReceiver<Event>), AppError> {
        config.validate()?;
        let storage = open_storage(&config).await?;
        let store = FavoritesStore::open(storage).await?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: RecipeConfig, store: Arc<FavoritesStore>) -> (Self, UnboundedReceiver<Event>) {
        let (events, receiver) = mpsc::unbounded_channel();
        // The receiver is still in hand, so this cannot fail.
        let _ = events.send(Event::Configure(config));

        let core = Self {
            core: Core::new::<Capabilities>(),
            store,
            events,
            subscription: Mutex::new(None),
        };
        (core, receiver)
    }

    /// Starts forwarding store emissions. The first one, the current
    /// snapshot, is queued immediately. Calling it again is a no-op.
    pub fn attach_favorites(&self) {
        let mut subscription = self.subscription.lock().unwrap_or_else(PoisonError::into_inner);
        if subscription.is_some() {
            return;
        }

        let events = self.events.clone();
        *subscription = Some(self.store.subscribe(move |recipes: &[Recipe]| {
            if events.send(Event::FavoritesUpdated(recipes.to_vec())).is_err() {
                debug!("event receiver dropped; favorites update lost");
            }
        }));
        info!("Favorites feed attached");
    }

    pub fn detach_favorites(&self) {
        let detached = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if detached.is_some() {
            info!("Favorites feed detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Runs `event` through the core. Favorites writes have been applied by
    /// the time this returns; the effects handed back are for the shell.
    pub async fn process_event(&self, event: Event) -> Result<Vec<Effect>, AppError> {
        debug!(event = event.name(), "processing event");
        let effects = self.core.process_event(event);
        self.perform(effects).await
    }

    /// Hands the shell's answer to `request` back to the core.
    pub async fn resolve<Op: Operation>(
        &self,
        request: &mut Request<Op>,
        output: Op::Output,
    ) -> Result<Vec<Effect>, AppError> {
        let effects = self.core.resolve(request, output);
        self.perform(effects).await
    }

    /// Processes every queued event. Returns the shell effects they raised.
    pub async fn pump(&self, events: &mut UnboundedReceiver<Event>) -> Result<Vec<Effect>, AppError> {
        let mut effects = Vec::new();
        while let Ok(event) = events.try_recv() {
            effects.extend(self.process_event(event).await?);
        }
        Ok(effects)
    }

    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    pub fn store(&self) -> &Arc<FavoritesStore> {
        &self.store
    }

    async fn perform(&self, effects: Vec<Effect>) -> Result<Vec<Effect>, AppError> {
        let mut shell = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::Favorites(request) => self.write(&request.operation).await?,
                other => shell.push(other),
            }
        }
        Ok(shell)
    }

    async fn write(&self, operation: &FavoritesOperation) -> Result<(), StoreError> {
        match operation {
            FavoritesOperation::Insert(recipe) => self.store.insert(recipe).await,
            FavoritesOperation::Delete(recipe) => self.store.delete(recipe).await,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn open_storage(config: &RecipeConfig) -> Result<Arc<dyn FavoritesStorage>, StoreError> {
    if let Some(path) = &config.database_path {
        let storage = crate::favorites_store::SqliteStorage::open(path).await?;
        info!(path = %path.display(), "Favorites stored on disk");
        return Ok(Arc::new(storage));
    }
    Ok(in_memory())
}

#[cfg(target_arch = "wasm32")]
async fn open_storage(_config: &RecipeConfig) -> Result<Arc<dyn FavoritesStorage>, StoreError> {
    Ok(in_memory())
}

fn in_memory() -> Arc<dyn FavoritesStorage> {
    info!("Favorites kept in memory");
    Arc::new(InMemoryStorage::new())
}
