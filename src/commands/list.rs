use anyhow::{Context, Result};
use clap::Args;

use crate::profile::{Model, ProfilePaths, ProfileStore};

#[derive(Debug, Clone, Args)]
pub struct ListCommand {}

impl ListCommand {
    pub fn execute(self, paths: &ProfilePaths) -> Result<()> {
        let model = ProfileStore::new(paths.clone())
            .load()
            .context("Failed to load AWS profiles")?;

        for line in render(&model) {
            println!("{line}");
        }
        Ok(())
    }
}

/// One `[idx] name` line per credential, with the region it would use.
fn render(model: &Model) -> Vec<String> {
    model
        .credentials
        .iter()
        .enumerate()
        .map(|(idx, credential)| {
            let region = model
                .config(&credential.name)
                .map(|config| config.region.as_str())
                .unwrap_or_default();
            match region.is_empty() {
                true => format!("[{idx}] {}", credential.name),
                false => format!("[{idx}] {} ({region})", credential.name),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Config, Credential};

    fn credential(name: &str) -> Credential {
        Credential {
            name: name.to_string(),
            ..Credential::default()
        }
    }

    fn config(name: &str, region: &str) -> Config {
        Config {
            name: name.to_string(),
            region: region.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_render_lists_credentials_with_region() {
        let model = Model {
            credentials: vec![credential("default"), credential("alice"), credential("bob")],
            configs: vec![config("default", ""), config("profile alice", "us-east-1")],
        };

        assert_eq!(
            render(&model),
            vec!["[0] default", "[1] alice (us-east-1)", "[2] bob"]
        );
    }
}
