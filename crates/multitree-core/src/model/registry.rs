use std::collections::HashMap;

use crate::model::language::LanguageId;

/// Every display name observed for each language identifier across a
/// corpus.
///
/// Identifiers and their names both keep first-seen order, so iteration
/// is deterministic for a given input ordering. The registry only grows.
#[derive(Debug, Default, Clone)]
pub struct LanguageRegistry {
    entries: Vec<(LanguageId, Vec<String>)>,
    index: HashMap<LanguageId, usize>,
}

impl LanguageRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` under `id`. Returns `true` if `id` was new.
    pub fn register(&mut self, id: &LanguageId, name: &str) -> bool {
        if let Some(&pos) = self.index.get(id) {
            let names = &mut self.entries[pos].1;
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
            false
        } else {
            self.index.insert(id.clone(), self.entries.len());
            self.entries.push((id.clone(), vec![name.to_string()]));
            true
        }
    }

    #[must_use]
    pub fn names(&self, id: &str) -> Option<&[String]> {
        self.index.get(id).map(|&pos| self.entries[pos].1.as_slice())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Identifiers with their names, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&LanguageId, &[String])> {
        self.entries.iter().map(|(id, names)| (id, names.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
