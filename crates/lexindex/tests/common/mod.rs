#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

/// file1/file2 from the README example
pub fn write_fruit_docs(dir: &Path) {
    std::fs::write(dir.join("file1"), "an apple banana raspberry").unwrap();
    std::fs::write(dir.join("file2"), "apple the banana orange").unwrap();
}

/// Run the binary with a clean target environment
pub fn lexindex(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lexindex"))
        .args(args)
        .env_remove("LEXINDEX_DB")
        .env_remove("LEXINDEX_INDEX")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

pub fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "lexindex failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}
