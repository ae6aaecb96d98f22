// src/checker/groups.rs
// =============================================================================
// Result buckets: leaves grouped under a string key.
//
// Both checks produce one of these:
// - duplicates: key = normalized URL or hostname
// - invalid links: key = status code, "Request Timeout" or an error message
//
// Keys keep the order in which they were first seen and each bucket keeps
// the order its leaves were added, so two runs over the same tree print the
// same thing. Serializes as a JSON object in that order.
// =============================================================================

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::bookmark::Leaf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Groups {
    buckets: Vec<(String, Vec<Leaf>)>,
    index: HashMap<String, usize>,
}

/// Leaves sharing a duplicate key; every bucket holds at least two leaves
pub type DuplicateGroup = Groups;

/// Leaves whose probe did not come back with a 2xx, keyed by outcome
pub type InvalidGroup = Groups;

impl Groups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `leaf` to the bucket for `key`, creating it if needed
    pub fn push(&mut self, key: impl Into<String>, leaf: Leaf) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&slot) => self.buckets[slot].1.push(leaf),
            None => {
                self.index.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![leaf]));
            }
        }
    }

    /// Drops every bucket for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &[Leaf]) -> bool) {
        self.buckets.retain(|(key, leaves)| keep(key, leaves));
        self.index = self
            .buckets
            .iter()
            .enumerate()
            .map(|(slot, (key, _))| (key.clone(), slot))
            .collect();
    }

    pub fn get(&self, key: &str) -> Option<&[Leaf]> {
        self.index.get(key).map(|&slot| self.buckets[slot].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Leaf])> {
        self.buckets.iter().map(|(key, leaves)| (key.as_str(), leaves.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(key, _)| key.as_str())
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of leaves across all buckets
    pub fn leaf_count(&self) -> usize {
        self.buckets.iter().map(|(_, leaves)| leaves.len()).sum()
    }

    /// Ids of every leaf in every bucket
    pub fn ids(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(_, leaves)| leaves.iter().map(|leaf| leaf.id.clone()))
            .collect()
    }

    /// Ids of every leaf except the first one found in each bucket: what a
    /// duplicate cleanup removes while keeping one copy of each bookmark
    pub fn redundant_ids(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(_, leaves)| leaves.iter().skip(1).map(|leaf| leaf.id.clone()))
            .collect()
    }
}

impl Serialize for Groups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (key, leaves) in &self.buckets {
            map.serialize_entry(key, leaves)?;
        }
        map.end()
    }
}
