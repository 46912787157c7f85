mod common;

use common::{lexindex, stdout, write_fruit_docs};

#[test]
fn test_build_then_search_snapshot() {
    let docs = tempfile::tempdir().unwrap();
    write_fruit_docs(docs.path());
    let out = tempfile::tempdir().unwrap();
    let index = out.path().join("index.json");
    let index = index.to_str().unwrap();
    let sources = docs.path().to_str().unwrap();

    let built: serde_json::Value =
        serde_json::from_str(&stdout(&lexindex(&["build", "--sources", sources, "--index", index]))).unwrap();
    assert_eq!(built["indexed"], 2);
    assert_eq!(built["occurrences"], 6);

    let file1 = docs.path().join("file1").to_string_lossy().into_owned();
    let file2 = docs.path().join("file2").to_string_lossy().into_owned();

    let found = stdout(&lexindex(&["search", "--index", index, "apple"]));
    assert_eq!(found, format!("1. {} (1)\n2. {} (1)\n", file1, file2));

    let found = stdout(&lexindex(&["search", "--index", index, "banana", "raspberry"]));
    assert_eq!(found, format!("1. {} (2)\n", file1));

    let stats: serde_json::Value =
        serde_json::from_str(&stdout(&lexindex(&["stats", "--index", index]))).unwrap();
    assert_eq!(stats["engine"], "memory");
    assert_eq!(stats["documents"], 2);
    assert!(stats["created_at"].is_string());
}

#[test]
fn test_migrate_build_search_database() {
    let docs = tempfile::tempdir().unwrap();
    write_fruit_docs(docs.path());
    let out = tempfile::tempdir().unwrap();
    let db = out.path().join("index.db");
    let db = db.to_str().unwrap();

    // Unmigrated databases are refused
    let refused = lexindex(&["build", "--db", db, "--sources", docs.path().to_str().unwrap()]);
    assert!(!refused.status.success());

    let migrated: serde_json::Value =
        serde_json::from_str(&stdout(&lexindex(&["migrate", "--db", db]))).unwrap();
    assert_eq!(migrated["from"], 0);

    stdout(&lexindex(&["build", "--db", db, "--sources", docs.path().to_str().unwrap()]));

    let found: serde_json::Value =
        serde_json::from_str(&stdout(&lexindex(&["search", "--db", db, "--json", "orange"]))).unwrap();
    let results = found.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0]["document"]["name"],
        docs.path().join("file2").to_string_lossy().as_ref()
    );

    let stats: serde_json::Value =
        serde_json::from_str(&stdout(&lexindex(&["stats", "--db", db]))).unwrap();
    assert_eq!(stats["engine"], "sqlite");
    assert_eq!(stats["occurrences"], 6);
    assert_eq!(stats["pending"], 0);
}

#[test]
fn test_search_missing_snapshot_fails() {
    let out = tempfile::tempdir().unwrap();
    let index = out.path().join("absent.bin");
    let output = lexindex(&["search", "--index", index.to_str().unwrap(), "apple"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load snapshot"));
}
