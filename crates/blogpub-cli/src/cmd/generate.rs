use crate::output::{print_json, print_paths};
use anyhow::Context;
use blogpub_core::{config::Config, generate};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let report = super::block_on(generate::generate(root, &config))?
        .context("failed to generate index pages")?;

    if json {
        print_json(&report)?;
        return Ok(());
    }

    if report.writes() == 0 && report.failures.is_empty() {
        println!("All tag and archive pages already exist");
    }
    print_paths(root, "Created tag pages", &report.tags_written);
    print_paths(root, "Created archive pages", &report.archives_written);
    for key in &report.skipped {
        println!("Skipped tag '{key}': not a valid file name");
    }
    for failure in &report.failures {
        println!(
            "Failed to write {}: {}",
            failure.path.strip_prefix(root).unwrap_or(&failure.path).display(),
            failure.error
        );
    }

    Ok(())
}
