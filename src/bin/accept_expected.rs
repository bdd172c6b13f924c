//! Binary to generate/update .expected.py files for tests/projects
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- loops   # Update only projects matching "loops"

use block_codegen::{GenerateOptions, Project, generate};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Must match the timestamp used by tests/expected_tests.rs
const TIMESTAMP: &str = "2000-01-01 00:00:00";

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let project_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("projects");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&project_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|s| s == "aide"))
    {
        let path = entry.path();
        let path_str = path.to_string_lossy();

        if let Some(ref f) = filter {
            if !path_str.contains(f) {
                skipped += 1;
                continue;
            }
        }

        if process_file(path) {
            updated += 1;
        }
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn process_file(path: &Path) -> bool {
    let project = match Project::load(path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to load {:?}: {}", path, e);
            return false;
        }
    };

    let options = GenerateOptions::new(&project.name).with_timestamp(TIMESTAMP);
    let result = generate(&project.graph, &options);

    let expected_py = path.with_extension("expected.py");
    let mut code = result.code;
    if !code.ends_with('\n') {
        code.push('\n');
    }
    if let Err(e) = fs::write(&expected_py, code) {
        eprintln!("Failed to write {:?}: {}", expected_py, e);
        return false;
    }
    println!("  {}", expected_py.display());
    true
}
