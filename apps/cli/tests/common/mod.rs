//! Shared setup for CLI integration tests.
//!
//! Each [`TestContext`] owns a fresh database file in the temp directory and
//! removes it on drop.

use std::path::PathBuf;

use flashcard_core::GeneratedCard;
use flashcards_cli::db::SqliteRepository;
use flashcards_cli::generate::{CardGenerator, GenerateError};
use flashcards_cli::state::AppState;
use uuid::Uuid;

pub struct TestContext {
    pub db_path: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let db_path = std::env::temp_dir().join(format!("flashcards-test-{}.db", Uuid::new_v4()));
        Self { db_path }
    }

    /// Open the database the way the binary does, loading (or seeding) the library.
    pub fn open(&self) -> AppState {
        let repo = SqliteRepository::open(&self.db_path).expect("open test database");
        AppState::load(repo).expect("load library")
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        std::fs::remove_file(&self.db_path).ok();
    }
}

/// Generator returning a fixed batch.
pub struct StaticGenerator(pub Vec<GeneratedCard>);

impl StaticGenerator {
    pub fn cards(fronts: &[&str]) -> Self {
        Self(
            fronts
                .iter()
                .map(|f| GeneratedCard {
                    front: Some(f.to_string()),
                    back: Some(format!("`{f}`")),
                    explanation: Some(format!("### Why\n- {f}")),
                    is_coding: Some(true),
                })
                .collect(),
        )
    }
}

impl CardGenerator for StaticGenerator {
    async fn generate(&self, _topic: &str, _count: u32) -> Result<Vec<GeneratedCard>, GenerateError> {
        if self.0.is_empty() {
            return Err(GenerateError::NoCards);
        }
        Ok(self.0.clone())
    }
}
