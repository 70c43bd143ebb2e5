//! Catalog kinds and the final dedup-and-sort step.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::collation::NameCollator;
use crate::config::Endpoints;
use crate::error::Result;
use crate::reference::ReferenceField;
use crate::types::CatalogEntry;

/// Related-entity kinds a catalog can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    DocumentType,
    Tag,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 2] = [CatalogKind::DocumentType, CatalogKind::Tag];

    /// Lookup endpoint for single-entity resolution.
    pub fn endpoint<'e>(&self, endpoints: &'e Endpoints) -> &'e Url {
        match self {
            CatalogKind::DocumentType => &endpoints.document_types,
            CatalogKind::Tag => &endpoints.tags,
        }
    }

    /// Where documents keep references to this kind.
    pub fn reference_field(&self) -> ReferenceField {
        match self {
            CatalogKind::DocumentType => ReferenceField::single("document_type")
                .or("document_type_id")
                .or("document_type_pk"),
            CatalogKind::Tag => ReferenceField::many("tags"),
        }
    }

    /// Documents filter selecting those that reference a given id.
    pub fn filter_key(&self) -> &'static str {
        match self {
            CatalogKind::DocumentType => "document_type__id",
            CatalogKind::Tag => "tags__id__all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CatalogKind::DocumentType => "document type",
            CatalogKind::Tag => "tag",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Build a catalog from resolver output.
///
/// Drops missing records and blank names, trims names, keeps the first
/// record per identifier, then orders with a [`NameCollator`]. The sort is
/// stable, so equal-collating names keep resolution order.
pub fn aggregate<I>(resolved: I) -> Result<Vec<CatalogEntry>>
where
    I: IntoIterator<Item = Option<CatalogEntry>>,
{
    let mut registry: IndexMap<String, CatalogEntry> = IndexMap::new();

    for entry in resolved.into_iter().flatten() {
        let name = entry.name.trim();
        if name.is_empty() {
            continue;
        }
        let key = entry.id.key().into_owned();
        if registry.contains_key(&key) {
            continue;
        }
        let name = name.to_string();
        registry.insert(key, CatalogEntry { id: entry.id, name });
    }

    let collator = NameCollator::new()?;
    let mut entries: Vec<CatalogEntry> = registry.into_values().collect();
    entries.sort_by(|a, b| collator.compare(&a.name, &b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Identifier;

    fn names(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn trims_sorts_and_skips_missing() {
        let catalog = aggregate(vec![
            Some(CatalogEntry::new(3, " Bravo ")),
            None,
            Some(CatalogEntry::new(1, "alpha")),
            Some(CatalogEntry::new(2, "Échange\n")),
        ])
        .unwrap();

        assert_eq!(names(&catalog), vec!["alpha", "Bravo", "Échange"]);
        assert_eq!(catalog[0].id, Identifier::from(1));
    }

    #[test]
    fn first_occurrence_wins_across_id_types() {
        let catalog = aggregate(vec![
            Some(CatalogEntry::new(7, "Invoice")),
            Some(CatalogEntry::new("7", "Receipt")),
        ])
        .unwrap();

        assert_eq!(catalog, vec![CatalogEntry::new(7, "Invoice")]);
    }

    #[test]
    fn blank_names_are_dropped_without_claiming_the_id() {
        let catalog = aggregate(vec![
            Some(CatalogEntry::new(4, "   ")),
            Some(CatalogEntry::new(4, "Contract")),
        ])
        .unwrap();

        assert_eq!(catalog, vec![CatalogEntry::new(4, "Contract")]);
    }

    #[test]
    fn numeric_names_sort_by_value() {
        let catalog = aggregate(vec![
            Some(CatalogEntry::new(1, "10")),
            Some(CatalogEntry::new(2, "2")),
        ])
        .unwrap();
        assert_eq!(names(&catalog), vec!["2", "10"]);
    }

    #[test]
    fn ligatures_sort_as_their_letters() {
        let catalog = aggregate(vec![
            Some(CatalogEntry::new(1, "Zebra")),
            Some(CatalogEntry::new(2, "Œuvres")),
            Some(CatalogEntry::new(3, "Photos")),
        ])
        .unwrap();
        assert_eq!(names(&catalog), vec!["Œuvres", "Photos", "Zebra"]);
    }

    #[test]
    fn kind_descriptors() {
        assert_eq!(CatalogKind::DocumentType.filter_key(), "document_type__id");
        assert_eq!(
            CatalogKind::DocumentType.reference_field().aliases,
            vec!["document_type", "document_type_id", "document_type_pk"]
        );
        assert_eq!(CatalogKind::Tag.to_string(), "tag");
    }
}
