use serde::Serialize;
use std::path::{Path, PathBuf};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print `paths` relative to `root` under a heading, or nothing when empty.
pub fn print_paths(root: &Path, heading: &str, paths: &[PathBuf]) {
    if paths.is_empty() {
        return;
    }
    println!("{heading}:");
    for p in paths {
        println!("  {}", p.strip_prefix(root).unwrap_or(p).display());
    }
}
