//! Application state.

use crate::commands::CommandError;
use crate::db::{DeckStore, SqliteRepository};
use crate::generate::GenerationGuard;
use flashcard_core::{Library, LibraryError};
use std::sync::{Mutex, MutexGuard};

struct Inner<S> {
    store: S,
    library: Library,
}

/// The loaded library together with the store it is persisted to.
///
/// Every mutation goes through [`AppState::update`], which saves the whole
/// library before the in-memory copy is replaced. A failed save leaves both
/// untouched.
pub struct AppState<S = SqliteRepository> {
    inner: Mutex<Inner<S>>,
    pub generation: GenerationGuard,
}

impl<S: DeckStore> AppState<S> {
    /// Load the library, seeding the sample deck on first run.
    pub fn load(store: S) -> Result<Self, CommandError> {
        let library = match store.load_decks()? {
            Some(decks) => Library::new(decks),
            None => {
                tracing::info!("no saved decks, seeding sample library");
                let library = Library::sample();
                store.save_decks(library.decks())?;
                library
            }
        };

        Ok(Self {
            inner: Mutex::new(Inner { store, library }),
            generation: GenerationGuard::new(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<S>>, CommandError> {
        self.inner
            .lock()
            .map_err(|_| CommandError::new("state lock poisoned"))
    }

    /// Run `f` against the current library.
    pub fn read<T>(&self, f: impl FnOnce(&Library) -> T) -> Result<T, CommandError> {
        let inner = self.lock()?;
        Ok(f(&inner.library))
    }

    /// Apply `f` to a copy of the library and persist it on success.
    pub fn update<T>(
        &self,
        f: impl FnOnce(&mut Library) -> Result<T, LibraryError>,
    ) -> Result<T, CommandError> {
        let mut inner = self.lock()?;
        let mut next = inner.library.clone();
        let value = f(&mut next)?;
        inner.store.save_decks(next.decks())?;
        inner.library = next;
        Ok(value)
    }
}
