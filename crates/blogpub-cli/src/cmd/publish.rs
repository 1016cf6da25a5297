use crate::output::{print_json, print_paths};
use anyhow::Context;
use blogpub_core::{config::Config, git::GitCli, publish};
use blogpub_github::GithubClient;
use std::path::Path;

pub fn run(root: &Path, token: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let client = GithubClient::new(&config.github, token.map(str::to_string))
        .context("failed to build GitHub client")?;
    let git = GitCli::new(root, &root.join(&config.paths.credentials))?;

    let outcome = super::block_on(publish::publish(root, &config, &client, &git, token))?
        .context("publish failed")?;

    if json {
        print_json(&outcome)?;
        return Ok(());
    }

    print_paths(root, "Created tag pages", &outcome.generate.tags_written);
    print_paths(root, "Created archive pages", &outcome.generate.archives_written);
    for link in &outcome.link.created {
        println!("Linked {} → issue #{}", link.permalink, link.issue);
    }
    if outcome.committed {
        println!("Pushed changes to {}/{}", config.git.remote, config.git.branch);
    } else {
        println!("Nothing to publish");
    }

    Ok(())
}
