//! Optimistic boolean toggles with rollback
//!
//! The flag is flipped in the local collection before the server call starts, so
//! the UI reflects the change immediately. A failed call restores the previous
//! value and surfaces a notice; a successful one leaves the local value as is.

use folio_api::{ApiError, Identified};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::notify::{Notice, Notifier};

/// Keyed access to a locally held list of items
pub trait ItemCollection<T>: Send + Sync {
    fn item(&self, id: &str) -> Option<T>;

    /// Replace the item with the same id. Returns `false` when no such item exists;
    /// the item is never inserted.
    fn replace_item(&self, item: T) -> bool;
}

/// Lens onto one boolean field of `T`
pub struct BoolField<T> {
    pub name: &'static str,
    pub get: fn(&T) -> bool,
    pub set: fn(&mut T, bool),
}

impl<T> Clone for BoolField<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BoolField<T> {}

impl<T> std::fmt::Debug for BoolField<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoolField").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the new value
    Committed { value: bool },
    /// No item with that id was loaded; nothing was sent
    Missing,
}

pub struct OptimisticToggle<T> {
    items: Arc<dyn ItemCollection<T>>,
    field: BoolField<T>,
    notifier: Arc<dyn Notifier>,
}

impl<T> Clone for OptimisticToggle<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            field: self.field,
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<T> OptimisticToggle<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    pub fn new(
        items: Arc<dyn ItemCollection<T>>,
        field: BoolField<T>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            items,
            field,
            notifier,
        }
    }

    pub fn field(&self) -> BoolField<T> {
        self.field
    }

    /// Flip the flag of `id` locally, then persist it with `mutate`.
    ///
    /// `mutate` receives the item already carrying the new value. On failure the
    /// previous value is restored, but only while the item is still loaded and
    /// still holds the optimistic value.
    #[tracing::instrument(name = "optimistic.toggle", skip(self, mutate), fields(field = self.field.name))]
    pub async fn toggle<F, Fut, R>(&self, id: &str, mutate: F) -> Result<ToggleOutcome, ApiError>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<R, ApiError>>,
    {
        let Some(mut item) = self.items.item(id) else {
            debug!("[OptimisticToggle] {} not loaded, nothing to toggle", id);
            return Ok(ToggleOutcome::Missing);
        };

        let previous = (self.field.get)(&item);
        let optimistic = !previous;
        (self.field.set)(&mut item, optimistic);
        if !self.items.replace_item(item.clone()) {
            return Ok(ToggleOutcome::Missing);
        }

        match mutate(item).await {
            Ok(_) => Ok(ToggleOutcome::Committed { value: optimistic }),
            Err(error) => {
                warn!(
                    "[OptimisticToggle] Setting {}={} on {} failed: {}",
                    self.field.name, optimistic, id, error
                );
                self.rollback(id, previous, optimistic);
                self.notifier.notify(Notice::error(format!(
                    "Could not update {}: {}",
                    self.field.name,
                    error.message()
                )));
                Err(error)
            }
        }
    }

    fn rollback(&self, id: &str, previous: bool, optimistic: bool) {
        let Some(mut current) = self.items.item(id) else {
            debug!("[OptimisticToggle] {} is gone, skipping rollback", id);
            return;
        };
        if (self.field.get)(&current) != optimistic {
            debug!(
                "[OptimisticToggle] {} changed since the toggle, skipping rollback",
                id
            );
            return;
        }
        (self.field.set)(&mut current, previous);
        self.items.replace_item(current);
    }
}
