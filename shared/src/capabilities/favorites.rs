use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::model::Recipe;

/// A write to the favorites table. The host answers nothing back: the
/// store's feed republishes the collection instead.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum FavoritesOperation {
    /// Insert or replace by id.
    Insert(Recipe),
    Delete(Recipe),
}

impl Operation for FavoritesOperation {
    type Output = ();
}

pub struct Favorites<E> {
    context: CapabilityContext<FavoritesOperation, E>,
}

impl<Ev> Capability<Ev> for Favorites<Ev> {
    type Operation = FavoritesOperation;
    type MappedSelf<MappedEv> = Favorites<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Favorites::new(self.context.map_event(f))
    }
}

impl<E> Favorites<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<FavoritesOperation, E>) -> Self {
        Self { context }
    }

    pub fn insert(&self, recipe: Recipe) {
        self.notify(FavoritesOperation::Insert(recipe));
    }

    pub fn delete(&self, recipe: Recipe) {
        self.notify(FavoritesOperation::Delete(recipe));
    }

    fn notify(&self, operation: FavoritesOperation) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(operation).await;
        });
    }
}
