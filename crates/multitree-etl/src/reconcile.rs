//! Matching MultiTree languages against Glottolog languoids.
//!
//! Each language is matched first by the `multitree` identifier Glottolog
//! records for a languoid, then by any of the display names the language
//! was seen with, compared after transliteration against the `multitree`
//! alternate names. A transliterated name claimed by more than one
//! languoid is ambiguous and never matched.

use std::collections::HashMap;

use multitree_core::model::{
    ExternalLanguoid, GlottologMatch, LanguageRecord, LanguageRegistry, MatchKind,
    MULTITREE_NAMESPACE,
};
use multitree_core::text::transliterate;

/// Lookup tables over a languoid catalogue.
#[derive(Debug, Default)]
pub struct GlottologIndex<'a> {
    by_identifier: HashMap<&'a str, &'a ExternalLanguoid>,
    by_name: HashMap<String, Vec<&'a ExternalLanguoid>>,
}

impl<'a> GlottologIndex<'a> {
    /// Index the `multitree` identifiers and alternate names.
    ///
    /// When two languoids carry the same identifier the later one wins.
    #[must_use]
    pub fn build(languoids: &'a [ExternalLanguoid]) -> Self {
        let mut index = Self::default();
        for languoid in languoids {
            if let Some(id) = languoid.identifier_in(MULTITREE_NAMESPACE) {
                if let Some(previous) = index.by_identifier.insert(id, languoid) {
                    log::warn!(
                        "MultiTree identifier {id} claimed by both {} and {}; using {}",
                        previous.glottocode,
                        languoid.glottocode,
                        languoid.glottocode
                    );
                }
            }
            for name in languoid.names_in(MULTITREE_NAMESPACE) {
                let Some(key) = name_key(name) else {
                    continue;
                };
                let claimants = index.by_name.entry(key).or_default();
                if !claimants
                    .iter()
                    .any(|c| c.glottocode == languoid.glottocode)
                {
                    claimants.push(languoid);
                }
            }
        }
        index
    }

    #[must_use]
    pub fn by_identifier(&self, id: &str) -> Option<&'a ExternalLanguoid> {
        self.by_identifier.get(id).copied()
    }

    /// The languoid claiming `name`, compared after transliteration.
    pub fn by_name(&self, name: &str) -> NameLookup<'a> {
        let Some(key) = name_key(name) else {
            return NameLookup::Missing;
        };
        match self.by_name.get(&key).map(Vec::as_slice) {
            None | Some([]) => NameLookup::Missing,
            Some([only]) => NameLookup::Unique(*only),
            Some(_) => NameLookup::Ambiguous,
        }
    }

    /// Number of transliterated names claimed by more than one languoid.
    #[must_use]
    pub fn ambiguous_name_count(&self) -> usize {
        self.by_name.values().filter(|c| c.len() > 1).count()
    }
}

/// Name index key, or `None` when nothing of the name survives
/// transliteration.
fn name_key(name: &str) -> Option<String> {
    let key = transliterate(name);
    if key.trim().is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Result of a name lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NameLookup<'a> {
    Missing,
    Unique(&'a ExternalLanguoid),
    Ambiguous,
}

/// Counts reported after reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub by_identifier: usize,
    pub by_name: usize,
    pub unresolved: usize,
    /// Name lookups skipped because the name was ambiguous.
    pub ambiguous_names: usize,
}

impl ReconcileStats {
    #[must_use]
    pub fn matched(&self) -> usize {
        self.by_identifier + self.by_name
    }
}

/// Enriched language records in registry order.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub languages: Vec<LanguageRecord>,
    pub stats: ReconcileStats,
}

/// Resolve every registered language against the catalogue.
#[must_use]
pub fn reconcile(registry: &LanguageRegistry, languoids: &[ExternalLanguoid]) -> Reconciliation {
    let index = GlottologIndex::build(languoids);
    let mut stats = ReconcileStats::default();
    let mut languages = Vec::with_capacity(registry.len());

    for (id, names) in registry.iter() {
        if let Some(languoid) = index.by_identifier(id.as_str()) {
            stats.by_identifier += 1;
            languages.push(LanguageRecord {
                id: id.clone(),
                glottolog: Some(GlottologMatch::from_languoid(
                    languoid,
                    MatchKind::Identifier,
                )),
            });
            continue;
        }

        let mut matched = None;
        for name in names {
            match index.by_name(name) {
                NameLookup::Unique(languoid) => {
                    matched = Some(languoid);
                    break;
                }
                NameLookup::Ambiguous => {
                    stats.ambiguous_names += 1;
                    log::info!("{id}: name {name:?} is claimed by several languoids");
                }
                NameLookup::Missing => {}
            }
        }

        if let Some(languoid) = matched {
            stats.by_name += 1;
            languages.push(LanguageRecord {
                id: id.clone(),
                glottolog: Some(GlottologMatch::from_languoid(languoid, MatchKind::Name)),
            });
        } else {
            stats.unresolved += 1;
            log::debug!("{id}: no Glottolog match");
            languages.push(LanguageRecord::unresolved(id.clone()));
        }
    }

    log::info!(
        "Matched {} of {} languages ({} by identifier, {} by name)",
        stats.matched(),
        languages.len(),
        stats.by_identifier,
        stats.by_name
    );
    Reconciliation { languages, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multitree_core::model::LanguageId;

    fn id(s: &str) -> LanguageId {
        LanguageId::normalize(s).unwrap()
    }

    fn registry(entries: &[(&str, &[&str])]) -> LanguageRegistry {
        let mut registry = LanguageRegistry::new();
        for (code, names) in entries {
            for name in *names {
                registry.register(&id(code), name);
            }
        }
        registry
    }

    #[test]
    fn test_identifier_beats_name() {
        let languoids = vec![
            ExternalLanguoid::new("name1234", "By Name").with_name(MULTITREE_NAMESPACE, "Foo"),
            ExternalLanguoid::new("iden1234", "By Id").with_identifier(MULTITREE_NAMESPACE, "foo"),
        ];
        let result = reconcile(&registry(&[("foo", &["Foo"])]), &languoids);

        let record = &result.languages[0];
        assert_eq!(record.glottocode(), Some("iden1234"));
        assert_eq!(
            record.glottolog.as_ref().unwrap().matched_by,
            MatchKind::Identifier
        );
        assert_eq!(result.stats.by_identifier, 1);
    }

    #[test]
    fn test_name_match_is_transliterated() {
        let languoids = vec![ExternalLanguoid::new("kxoe1243", "Khwe")
            .with_coordinates(-18.0, 21.0)
            .with_name(MULTITREE_NAMESPACE, "Kxoé")];
        let result = reconcile(&registry(&[("xuu", &["Other", "Kxoe"])]), &languoids);

        let record = &result.languages[0];
        assert_eq!(record.name(), "Khwe");
        let m = record.glottolog.as_ref().unwrap();
        assert_eq!(m.matched_by, MatchKind::Name);
        assert_eq!(m.latitude, Some(-18.0));
        assert_eq!(result.stats.by_name, 1);
    }

    #[test]
    fn test_non_latin_names_match_only_their_own_script() {
        let languoids = vec![ExternalLanguoid::new("russ1263", "Russian")
            .with_name(MULTITREE_NAMESPACE, "Русский")];

        let result = reconcile(&registry(&[("cmn", &["中文"])]), &languoids);
        assert!(result.languages[0].glottolog.is_none());
        assert_eq!(result.stats.unresolved, 1);

        let result = reconcile(&registry(&[("rus", &["Русский"])]), &languoids);
        assert_eq!(result.languages[0].glottocode(), Some("russ1263"));
        assert_eq!(result.stats.by_name, 1);
    }

    #[test]
    fn test_blank_names_are_not_indexed() {
        let languoids = vec![ExternalLanguoid::new("aaaa1111", "A")
            .with_name(MULTITREE_NAMESPACE, "")
            .with_name(MULTITREE_NAMESPACE, "  ")];
        let index = GlottologIndex::build(&languoids);
        assert_eq!(index.by_name(""), NameLookup::Missing);
        assert_eq!(index.by_name(" "), NameLookup::Missing);
    }

    #[test]
    fn test_first_observed_name_wins() {
        let languoids = vec![
            ExternalLanguoid::new("aaaa1111", "A").with_name(MULTITREE_NAMESPACE, "Second"),
            ExternalLanguoid::new("bbbb1111", "B").with_name(MULTITREE_NAMESPACE, "First"),
        ];
        let result = reconcile(&registry(&[("x", &["First", "Second"])]), &languoids);
        assert_eq!(result.languages[0].glottocode(), Some("bbbb1111"));
    }

    #[test]
    fn test_ambiguous_name_is_not_matched() {
        let languoids = vec![
            ExternalLanguoid::new("aaaa1111", "A").with_name(MULTITREE_NAMESPACE, "Shared"),
            ExternalLanguoid::new("bbbb1111", "B").with_name(MULTITREE_NAMESPACE, "Shared"),
        ];
        let index = GlottologIndex::build(&languoids);
        assert_eq!(index.by_name("Shared"), NameLookup::Ambiguous);
        assert_eq!(index.ambiguous_name_count(), 1);

        let result = reconcile(&registry(&[("x", &["Shared"])]), &languoids);
        assert!(result.languages[0].glottolog.is_none());
        assert_eq!(result.stats.ambiguous_names, 1);
        assert_eq!(result.stats.unresolved, 1);
    }

    #[test]
    fn test_ambiguous_name_falls_through_to_next_name() {
        let languoids = vec![
            ExternalLanguoid::new("aaaa1111", "A").with_name(MULTITREE_NAMESPACE, "Shared"),
            ExternalLanguoid::new("bbbb1111", "B")
                .with_name(MULTITREE_NAMESPACE, "Shared")
                .with_name(MULTITREE_NAMESPACE, "Unique"),
        ];
        let result = reconcile(&registry(&[("x", &["Shared", "Unique"])]), &languoids);
        assert_eq!(result.languages[0].glottocode(), Some("bbbb1111"));
    }

    #[test]
    fn test_same_languoid_twice_is_not_ambiguous() {
        let languoids = vec![ExternalLanguoid::new("aaaa1111", "A")
            .with_name(MULTITREE_NAMESPACE, "Kxoé")
            .with_name(MULTITREE_NAMESPACE, "Kxoe")];
        let index = GlottologIndex::build(&languoids);
        assert!(matches!(index.by_name("Kxoe"), NameLookup::Unique(_)));
    }

    #[test]
    fn test_identifier_last_writer_wins() {
        let languoids = vec![
            ExternalLanguoid::new("aaaa1111", "A").with_identifier(MULTITREE_NAMESPACE, "dup"),
            ExternalLanguoid::new("bbbb1111", "B").with_identifier(MULTITREE_NAMESPACE, "dup"),
        ];
        let index = GlottologIndex::build(&languoids);
        assert_eq!(index.by_identifier("dup").unwrap().glottocode, "bbbb1111");
    }

    #[test]
    fn test_unresolved_keeps_registry_order() {
        let result = reconcile(&registry(&[("zzz", &["Z"]), ("aaa", &["A"])]), &[]);
        let ids: Vec<_> = result.languages.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["zzz", "aaa"]);
        assert_eq!(result.languages[0].name(), "zzz");
        assert_eq!(result.stats.unresolved, 2);
        assert_eq!(result.stats.matched(), 0);
    }

    #[test]
    fn test_other_namespaces_ignored() {
        let languoids = vec![ExternalLanguoid::new("aaaa1111", "A")
            .with_name("wals", "Foo")
            .with_identifier("wals", "foo")];
        let result = reconcile(&registry(&[("foo", &["Foo"])]), &languoids);
        assert!(result.languages[0].glottolog.is_none());
    }
}
