use crate::output::print_json;
use anyhow::Context;
use blogpub_core::{config::Config, linker};
use blogpub_github::GithubClient;
use std::path::Path;

pub fn run(root: &Path, token: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let client = GithubClient::new(&config.github, token.map(str::to_string))
        .context("failed to build GitHub client")?;
    let report = super::block_on(linker::link_comments(root, &config, &client))?
        .context("failed to link comment issues")?;

    if json {
        print_json(&report)?;
    } else if report.created.is_empty() {
        println!("All {} posts already have a comment issue", report.examined);
    } else {
        for link in &report.created {
            println!("Linked {} → issue #{}", link.permalink, link.issue);
        }
    }

    Ok(())
}
