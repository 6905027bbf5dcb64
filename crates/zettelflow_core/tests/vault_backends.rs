use zettelflow_core::db::migrations::latest_version;
use zettelflow_core::db::open_db;
use zettelflow_core::{
    FsVaultStore, MemoryVaultStore, NoPrompt, NoteFactory, NoteType, SqliteVaultStore,
    VaultError, VaultStore, ZettelSettings,
};

fn exercise_store(store: &dyn VaultStore) {
    let factory = NoteFactory::with_zettel_blueprints(ZettelSettings::default());
    let mut note = factory.create_note(NoteType::Literature, None).unwrap();
    note.set_title("Shared");
    note.add_tag("backend");
    let handle = note.save(store, &NoPrompt).unwrap();

    assert_eq!(handle.basename, "Shared");
    assert_eq!(handle.parent, "inbox/literature");
    assert!(store.exists_as_directory("inbox/literature").unwrap());

    let listed: Vec<String> = store
        .list_files("inbox")
        .unwrap()
        .into_iter()
        .map(|file| file.path)
        .collect();
    assert_eq!(listed, vec!["inbox/literature/Shared.md"]);

    let loaded = factory.load_from_file(store, &handle.path).unwrap();
    assert_eq!(loaded.properties(), note.properties());

    store.delete(&handle.path).unwrap();
    assert!(matches!(
        store.read(&handle.path),
        Err(VaultError::NotFound(_))
    ));
}

#[test]
fn memory_store_satisfies_vault_contract() {
    exercise_store(&MemoryVaultStore::new());
}

#[test]
fn filesystem_store_satisfies_vault_contract() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = FsVaultStore::open(dir.path()).expect("open vault");
    exercise_store(&store);
}

#[test]
fn sqlite_store_satisfies_vault_contract() {
    let store = SqliteVaultStore::open_in_memory().expect("open vault");
    exercise_store(&store);
}

#[test]
fn sqlite_vault_persists_across_reopen_and_tracks_schema_version() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("vault.sqlite3");

    {
        let store = SqliteVaultStore::open(&db_path).expect("open vault");
        store.write("inbox/a.md", "kept").unwrap();
    }

    let store = SqliteVaultStore::open(&db_path).expect("reopen vault");
    assert_eq!(store.read("inbox/a.md").unwrap(), "kept");

    let conn = open_db(&db_path).expect("open db");
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn sqlite_vault_rejects_newer_schema() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("future.sqlite3");
    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
    }

    assert!(matches!(
        SqliteVaultStore::open(&db_path),
        Err(VaultError::Db(_))
    ));
}
