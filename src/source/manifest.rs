//! Job manifest: a JSON list of groups, each with an ordered list of topic descriptors.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One group of the manifest. Only `topics` is read; other keys are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub topics: Vec<Descriptor>,
}

/// One video entry as recorded in the manifest.
#[derive(Clone, Debug, Deserialize)]
pub struct Descriptor {
    pub youtube_id: String,
    pub url: String,
    /// Human-readable duration; `null` or missing means unknown.
    #[serde(default)]
    pub duration: Option<String>,
}

/// Read and parse the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<Vec<Group>> {
    let file = File::open(path).with_context(|| format!("open manifest {}", path.display()))?;
    let groups: Vec<Group> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse manifest {}", path.display()))?;
    log::debug!(
        "Loaded manifest {}: {} groups, {} descriptors",
        path.display(),
        groups.len(),
        groups.iter().map(|g| g.topics.len()).sum::<usize>()
    );
    Ok(groups)
}
