use super::*;
use proptest::prelude::*;

fn record(key: &str, index: u32, total: u32, completed: bool) -> TourProgress {
    TourProgress {
        tour_key: TourKey::new(key),
        highest_index_reached: index,
        total_length: total,
        completed,
    }
}

fn stores() -> Result<Vec<Box<dyn ProgressStore>>, StorageError> {
    Ok(vec![
        Box::new(InMemoryProgressStore::new()),
        Box::new(SqliteProgressStore::new_in_memory()?),
    ])
}

#[test]
fn test_unknown_tour_is_untouched() -> Result<(), StorageError> {
    for store in stores()? {
        let progress = store.progress(&TourKey::new("never-ran"))?;
        assert_eq!(progress, TourProgress::untouched(TourKey::new("never-ran")));
    }
    Ok(())
}

#[test]
fn test_set_progress_merges_monotonically() -> Result<(), StorageError> {
    for store in stores()? {
        store.set_progress(&record("intro", 3, 5, false))?;
        let merged = store.set_progress(&record("intro", 1, 5, false))?;
        assert_eq!(merged.highest_index_reached, 3);

        store.set_progress(&record("intro", 5, 5, true))?;
        let after = store.set_progress(&record("intro", 2, 5, false))?;
        assert!(after.completed);
        assert_eq!(store.progress(&TourKey::new("intro"))?, after);
    }
    Ok(())
}

#[test]
fn test_reset_and_listing() -> Result<(), StorageError> {
    for store in stores()? {
        store.set_progress(&record("b-tour", 2, 4, false))?;
        store.set_progress(&record("a-tour", 4, 4, true))?;

        let keys: Vec<_> = store
            .all()?
            .into_iter()
            .map(|p| p.tour_key.0)
            .collect();
        assert_eq!(keys, vec!["a-tour".to_string(), "b-tour".to_string()]);

        assert!(store.reset(&TourKey::new("a-tour"))?);
        assert!(!store.reset(&TourKey::new("a-tour"))?);
        assert_eq!(store.all()?.len(), 1);
    }
    Ok(())
}

#[test]
fn test_progress_survives_reopen() -> Result<(), StorageError> {
    let dir = tempfile::tempdir().map_err(|e| StorageError::Other(e.to_string()))?;
    let path = dir.path().join("progress.db");

    {
        let store = SqliteProgressStore::open(&path)?;
        store.set_progress(&record("intro", 2, 4, false))?;
    }

    let reopened = SqliteProgressStore::open(&path)?;
    assert_eq!(reopened.schema_version()?, SCHEMA_VERSION);
    let progress = reopened.progress(&TourKey::new("intro"))?;
    assert_eq!(progress.highest_index_reached, 2);
    assert_eq!(progress.total_length, 4);
    Ok(())
}

#[test]
fn test_newer_schema_is_rejected() -> Result<(), StorageError> {
    let dir = tempfile::tempdir().map_err(|e| StorageError::Other(e.to_string()))?;
    let path = dir.path().join("progress.db");
    {
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "user_version", (SCHEMA_VERSION + 1).to_string())?;
    }
    let result = SqliteProgressStore::open(&path);
    assert!(matches!(result, Err(StorageError::Other(_))));
    Ok(())
}

proptest! {
    #[test]
    fn prop_stored_progress_never_regresses(
        writes in proptest::collection::vec((0u32..20, proptest::bool::ANY), 1..16)
    ) {
        let store = SqliteProgressStore::new_in_memory().unwrap();
        let key = TourKey::new("prop");
        let mut best = 0;
        let mut done = false;
        for (index, completed) in writes {
            let merged = store.set_progress(&record("prop", index, 20, completed)).unwrap();
            best = best.max(index);
            done |= completed;
            prop_assert_eq!(merged.highest_index_reached, best);
            prop_assert_eq!(merged.completed, done);
        }
        prop_assert_eq!(store.progress(&key).unwrap().highest_index_reached, best);
    }
}
