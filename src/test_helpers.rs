use crate::session::{DbPool, SessionStore};
use diesel::r2d2::{self, ConnectionManager};
use diesel::sqlite::SqliteConnection;
use tempfile::TempDir;

/// Credential store on a temporary SQLite file; keep the `TempDir` alive for
/// as long as the store is used.
pub fn create_test_store() -> (TempDir, SessionStore) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let manager = ConnectionManager::<SqliteConnection>::new(db_path.display().to_string());
    let pool: DbPool = r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("Failed to create pool");

    let store = SessionStore::from_pool(pool).expect("Failed to run migrations");
    (temp_dir, store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_store() {
        let (temp_dir, store) = create_test_store();
        assert!(temp_dir.path().join("test.db").exists());
        assert_eq!(store.get().unwrap(), None);
    }
}
