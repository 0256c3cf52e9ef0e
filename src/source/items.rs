//! Lazy item sequence over a loaded manifest.

use anyhow::{Context, Result};
use std::collections::HashSet;

use crate::{Item, LineRange};

use super::duration::parse_duration;
use super::manifest::{Descriptor, Group};

/// Iterator over the manifest in order, yielding items that are in `range` and not completed.
///
/// Lines are counted over every descriptor (completed ones included), so `range` always
/// refers to positions in the manifest, not positions among pending items.
/// A descriptor with a malformed duration yields `Err` and iteration may continue past it.
pub struct ItemSource<'a> {
    descriptors: Box<dyn Iterator<Item = &'a Descriptor> + 'a>,
    completed: &'a HashSet<String>,
    range: LineRange,
    line: usize,
    done: bool,
}

impl<'a> ItemSource<'a> {
    pub fn new(groups: &'a [Group], completed: &'a HashSet<String>, range: LineRange) -> Self {
        Self {
            descriptors: Box::new(groups.iter().flat_map(|g| g.topics.iter())),
            completed,
            range,
            line: 0,
            done: false,
        }
    }

    /// 1-based line of the last descriptor looked at.
    pub fn line(&self) -> usize {
        self.line
    }
}

fn to_item(d: &Descriptor, line: usize) -> Result<Item> {
    let duration = d
        .duration
        .as_deref()
        .map(parse_duration)
        .transpose()
        .with_context(|| format!("manifest line {} ({})", line, d.youtube_id))?;
    Ok(Item {
        id: d.youtube_id.clone(),
        locator: d.url.clone(),
        duration,
    })
}

impl Iterator for ItemSource<'_> {
    type Item = Result<Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for d in self.descriptors.by_ref() {
            self.line += 1;
            if self.range.is_past_end(self.line) {
                self.done = true;
                return None;
            }
            if !self.range.contains(self.line) || self.completed.contains(&d.youtube_id) {
                continue;
            }
            return Some(to_item(d, self.line));
        }
        self.done = true;
        None
    }
}
