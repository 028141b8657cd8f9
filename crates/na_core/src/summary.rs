use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::types::Report;

/// Frequency counter that remembers the order labels were first seen in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: Vec<(String, usize)>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        match self.counts.iter_mut().find(|(seen, _)| seen == label) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((label.to_string(), 1)),
        }
    }

    pub fn extend<'a>(&mut self, labels: impl IntoIterator<Item = &'a str>) {
        for label in labels {
            self.add(label);
        }
    }

    pub fn get(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|(seen, _)| seen == label)
            .map_or(0, |(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Up to `n` entries by descending count. The sort is stable, so equal
    /// counts keep first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut sorted = self.counts.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (label, count) in &self.counts {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub sentiment_distribution: Tally,
    pub most_common_topics: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutput {
    pub reports: Vec<Report>,
    pub summary: BatchSummary,
}
