//! Stub fetchers and log helpers shared by the integration tests.

#![allow(dead_code)]

use crossbeam_channel::Receiver;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use subgrab::{FetchStatus, Item, MediaFetcher};

/// Per-item scripted statuses: (subtitles, post-processing, audio).
pub type Script = (FetchStatus, FetchStatus, FetchStatus);

pub const ALL_OK: Script = (FetchStatus::Success, FetchStatus::Success, FetchStatus::Success);

/// Fetcher returning scripted statuses per item id, optionally blocking on a gate first.
pub struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    default: Script,
    gate: Option<Receiver<()>>,
    /// Ids in the order their first call happened.
    pub seen: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new(default: Script) -> Self {
        Self {
            scripts: HashMap::new(),
            default,
            gate: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, id: &str, script: Script) -> Self {
        self.scripts.insert(id.to_string(), script);
        self
    }

    /// Every item waits for one `()` on `gate` before its first call returns.
    pub fn gated(mut self, gate: Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn script(&self, item: &Item) -> Script {
        self.scripts.get(&item.id).copied().unwrap_or(self.default)
    }

    pub fn seen_ids(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl MediaFetcher for ScriptedFetcher {
    fn fetch_subtitles(&self, item: &Item) -> FetchStatus {
        self.enter(item);
        self.script(item).0
    }

    fn post_process_subtitles(&self, item: &Item) -> FetchStatus {
        self.script(item).1
    }

    fn fetch_audio(&self, item: &Item) -> FetchStatus {
        self.enter(item);
        self.script(item).2
    }
}

impl ScriptedFetcher {
    fn enter(&self, item: &Item) {
        let mut seen = self.seen.lock().unwrap();
        if seen.contains(&item.id) {
            return;
        }
        seen.push(item.id.clone());
        drop(seen);
        if let Some(ref gate) = self.gate {
            gate.recv().unwrap();
        }
    }
}

pub fn item(id: &str) -> Item {
    Item {
        id: id.to_string(),
        locator: format!("https://www.youtube.com/watch?v={id}"),
        duration: None,
    }
}

/// Log lines, sorted (completion order is not deterministic).
pub fn sorted_log_lines(path: &Path) -> Vec<String> {
    let mut lines: Vec<String> = std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

/// Write a manifest with one group per entry of `groups`; each descriptor is (id, duration).
pub fn write_manifest(path: &Path, groups: &[&[(&str, Option<&str>)]]) {
    let json: Vec<serde_json::Value> = groups
        .iter()
        .map(|topics| {
            serde_json::json!({
                "title": "group",
                "topics": topics
                    .iter()
                    .map(|(id, duration)| serde_json::json!({
                        "youtube_id": id,
                        "url": format!("https://www.youtube.com/watch?v={id}"),
                        "duration": duration,
                    }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    std::fs::write(path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
}
