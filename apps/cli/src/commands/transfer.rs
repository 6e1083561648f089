//! Import and export of the whole library as JSON.

use crate::db::DeckStore;
use crate::state::AppState;
use flashcard_core::{parse_import, ImportBatch, ImportReport};
use std::fs;
use std::path::Path;

use super::CommandError;

pub const DEFAULT_EXPORT_FILE: &str = "flashcards-export.json";

/// Write every deck to `path` as pretty-printed JSON. Returns the deck count.
pub fn export_library<S: DeckStore>(state: &AppState<S>, path: &Path) -> Result<usize, CommandError> {
    let (json, count) = state.read(|lib| lib.to_json().map(|json| (json, lib.len())))??;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), decks = count, "exported library");
    Ok(count)
}

/// Read and validate an import file without changing the library.
pub fn read_import(path: &Path) -> Result<ImportBatch, CommandError> {
    let content = fs::read_to_string(path)?;
    let batch = parse_import(&content)?;
    if batch.skipped > 0 {
        tracing::warn!(skipped = batch.skipped, "import file has invalid decks");
    }
    Ok(batch)
}

/// Put a validated batch in front of the existing decks.
pub fn import_batch<S: DeckStore>(
    state: &AppState<S>,
    batch: ImportBatch,
) -> Result<ImportReport, CommandError> {
    let report = state.update(|lib| Ok(lib.prepend(batch)))?;
    tracing::info!(
        imported = report.imported,
        skipped = report.skipped,
        reassigned = report.reassigned_ids,
        "imported decks"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create_deck, list_decks, test_state};
    use flashcard_core::CardDraft;
    use pretty_assertions::assert_eq;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn export_then_import_restores_decks() {
        let state = test_state();
        create_deck(&state, "Rust", CardDraft::new("Q", "A")).unwrap();
        let path = temp_path(DEFAULT_EXPORT_FILE);

        assert_eq!(export_library(&state, &path).unwrap(), 2);

        let other = test_state();
        crate::commands::delete_deck(&other, "sample-1").unwrap();
        let batch = read_import(&path).unwrap();
        let report = import_batch(&other, batch).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(report.imported, 2);
        assert_eq!(report.reassigned_ids, 0);
        assert_eq!(list_decks(&other).unwrap(), list_decks(&state).unwrap());
    }

    #[test]
    fn importing_existing_ids_reassigns_them() {
        let state = test_state();
        let path = temp_path("self.json");
        export_library(&state, &path).unwrap();

        let report = import_batch(&state, read_import(&path).unwrap()).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(report.reassigned_ids, 1);
        let decks = list_decks(&state).unwrap();
        assert_eq!(decks.len(), 2);
        assert_ne!(decks[0].id, decks[1].id);
    }

    #[test]
    fn malformed_file_changes_nothing() {
        let path = temp_path("bad.json");
        fs::write(&path, r#"{"title":"not an array"}"#).unwrap();

        let result = read_import(&path);
        fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_import(&temp_path("missing.json")).is_err());
    }
}
