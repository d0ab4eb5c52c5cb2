//! Merge engine: reconciles candidate records against the curated store.
//!
//! Content fields always follow the candidate; curated fields always follow
//! the existing record unless the candidate explicitly carries a replacement,
//! and that replacement is logged, never silent. The store-level merge is a
//! left-biased union over id: nothing in the existing store is dropped by an
//! import.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{PosterRecord, Provenance};

/// Provenance tag for records that arrive without one.
const SOURCE_UNKNOWN: &str = "unknown";

/// Merge a candidate into the existing record with the same id.
pub fn merge_record(
    existing: &PosterRecord,
    candidate: &PosterRecord,
    now: DateTime<Utc>,
) -> PosterRecord {
    let mut merged = existing.clone();

    // Content fields always follow the candidate.
    merged.title = candidate.title.clone();
    merged.abstract_text = candidate.abstract_text.clone();
    merged.authors = candidate.authors.clone();
    merged.tags = candidate.tags.clone();
    merged.poster_image = candidate.poster_image.clone();

    // Curated fields survive unless the candidate explicitly carries them.
    merged.faq = take_curated(&existing.id, "faq", &existing.faq, &candidate.faq);
    merged.booth_id = take_curated(
        &existing.id,
        "booth_id",
        &existing.booth_id,
        &candidate.booth_id,
    );
    merged.room = take_curated(&existing.id, "room", &existing.room, &candidate.room);
    merged.related_links = take_curated(
        &existing.id,
        "related_links",
        &existing.related_links,
        &candidate.related_links,
    );
    merged.keywords = take_curated(
        &existing.id,
        "keywords",
        &existing.keywords,
        &candidate.keywords,
    );
    merged.contact_email = take_curated(
        &existing.id,
        "contact_email",
        &existing.contact_email,
        &candidate.contact_email,
    );

    // Provenance: creation time is immutable, update time advances; the
    // source tags follow the candidate when it carries them.
    let previous = existing.metadata.clone().unwrap_or_default();
    let incoming = candidate.metadata.clone().unwrap_or_default();
    merged.metadata = Some(Provenance {
        source: incoming.source.or(previous.source),
        source_file: incoming.source_file.or(previous.source_file),
        created_at: previous.created_at.or(Some(now)),
        updated_at: Some(now),
    });

    tracing::info!(poster_id = %merged.id, title = %merged.title, "Merged poster");
    merged
}

fn take_curated<T: Clone>(
    id: &str,
    field: &'static str,
    existing: &Option<T>,
    candidate: &Option<T>,
) -> Option<T> {
    match candidate {
        Some(value) => {
            tracing::warn!(
                poster_id = %id,
                field,
                "Updating manually curated field from candidate"
            );
            Some(value.clone())
        }
        None => existing.clone(),
    }
}

/// Promote a candidate with no existing counterpart into a new record.
fn admit_new(candidate: &PosterRecord, now: DateTime<Utc>) -> PosterRecord {
    let mut record = candidate.clone();
    let provenance = record.metadata.take().unwrap_or_default();
    record.metadata = Some(Provenance {
        source: provenance
            .source
            .or_else(|| Some(SOURCE_UNKNOWN.to_string())),
        source_file: provenance.source_file,
        created_at: Some(now),
        updated_at: Some(now),
    });
    record
}

/// One merge pass of a candidate batch against the existing store.
///
/// Left-biased union over id: candidates land in batch order (a later
/// candidate with a duplicate id merges into the earlier one rather than
/// duplicating), then every existing record untouched by the batch is
/// carried through unchanged.
pub fn merge_store(
    existing: &[PosterRecord],
    candidates: &[PosterRecord],
    now: DateTime<Utc>,
) -> Vec<PosterRecord> {
    let existing_by_id: HashMap<&str, &PosterRecord> =
        existing.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut merged: Vec<PosterRecord> = Vec::with_capacity(existing.len() + candidates.len());
    let mut slot_by_id: HashMap<String, usize> = HashMap::new();

    for candidate in candidates {
        if let Some(&slot) = slot_by_id.get(&candidate.id) {
            merged[slot] = merge_record(&merged[slot], candidate, now);
        } else if let Some(previous) = existing_by_id.get(candidate.id.as_str()) {
            slot_by_id.insert(candidate.id.clone(), merged.len());
            merged.push(merge_record(previous, candidate, now));
        } else {
            tracing::info!(poster_id = %candidate.id, title = %candidate.title, "Added new poster");
            slot_by_id.insert(candidate.id.clone(), merged.len());
            merged.push(admit_new(candidate, now));
        }
    }

    for record in existing {
        if !slot_by_id.contains_key(&record.id) {
            merged.push(record.clone());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FaqEntry;

    fn candidate(id: &str, title: &str) -> PosterRecord {
        PosterRecord {
            id: id.into(),
            title: title.into(),
            authors: vec!["Jane Doe".into()],
            tags: vec!["robotics".into()],
            abstract_text: "Fresh abstract.".into(),
            poster_image: format!("assets/posters/{id}.png"),
            faq: None,
            booth_id: None,
            room: None,
            related_links: None,
            keywords: None,
            contact_email: None,
            metadata: Some(Provenance {
                source: Some("pdf_import".into()),
                source_file: Some(format!("{id}.pdf")),
                created_at: None,
                updated_at: None,
            }),
        }
    }

    fn curated_existing(id: &str) -> PosterRecord {
        let mut record = candidate(id, "Old Title");
        record.booth_id = Some("B3".into());
        record.faq = Some(vec![FaqEntry {
            question: "When is the talk?".into(),
            answer: "14:00 daily.".into(),
        }]);
        record.metadata = Some(Provenance {
            source: Some("pdf_import".into()),
            source_file: Some(format!("{id}.pdf")),
            created_at: Some("2026-01-01T00:00:00Z".parse().unwrap()),
            updated_at: Some("2026-01-02T00:00:00Z".parse().unwrap()),
        });
        record
    }

    #[test]
    fn content_fields_follow_candidate() {
        let existing = curated_existing("poster_001");
        let incoming = candidate("poster_001", "New Title");
        let merged = merge_record(&existing, &incoming, Utc::now());

        assert_eq!(merged.title, "New Title");
        assert_eq!(merged.abstract_text, "Fresh abstract.");
    }

    #[test]
    fn curated_fields_preserved_when_candidate_lacks_them() {
        let existing = curated_existing("poster_001");
        let incoming = candidate("poster_001", "New Title");
        let merged = merge_record(&existing, &incoming, Utc::now());

        assert_eq!(merged.booth_id.as_deref(), Some("B3"));
        assert_eq!(merged.faq.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn explicit_curated_supply_wins() {
        let existing = curated_existing("poster_001");
        let mut incoming = candidate("poster_001", "New Title");
        incoming.booth_id = Some("B9".into());
        let merged = merge_record(&existing, &incoming, Utc::now());

        assert_eq!(merged.booth_id.as_deref(), Some("B9"));
        // The other curated field is untouched.
        assert!(merged.faq.is_some());
    }

    #[test]
    fn created_at_is_immutable_and_updated_at_advances() {
        let existing = curated_existing("poster_001");
        let created = existing.created_at().unwrap();
        let now = Utc::now();
        let merged = merge_record(&existing, &candidate("poster_001", "T"), now);

        assert_eq!(merged.created_at(), Some(created));
        assert_eq!(merged.updated_at(), Some(now));
        assert!(merged.created_at().unwrap() <= merged.updated_at().unwrap());
    }

    #[test]
    fn source_retained_when_candidate_has_none() {
        let existing = curated_existing("poster_001");
        let mut incoming = candidate("poster_001", "T");
        incoming.metadata = None;
        let merged = merge_record(&existing, &incoming, Utc::now());

        let provenance = merged.metadata.unwrap();
        assert_eq!(provenance.source.as_deref(), Some("pdf_import"));
        assert_eq!(provenance.source_file.as_deref(), Some("poster_001.pdf"));
    }

    #[test]
    fn new_record_gets_both_timestamps_and_source() {
        let now = Utc::now();
        let merged = merge_store(&[], &[candidate("poster_001", "T")], now);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].created_at(), Some(now));
        assert_eq!(merged[0].updated_at(), Some(now));
        assert_eq!(
            merged[0].metadata.as_ref().unwrap().source.as_deref(),
            Some("pdf_import")
        );
    }

    #[test]
    fn new_record_without_provenance_defaults_to_unknown_source() {
        let mut incoming = candidate("poster_001", "T");
        incoming.metadata = None;
        let merged = merge_store(&[], &[incoming], Utc::now());

        assert_eq!(
            merged[0].metadata.as_ref().unwrap().source.as_deref(),
            Some("unknown")
        );
    }

    #[test]
    fn untouched_existing_records_carried_through() {
        let existing = vec![curated_existing("poster_001"), curated_existing("poster_002")];
        let merged = merge_store(&existing, &[candidate("poster_001", "New")], Utc::now());

        assert_eq!(merged.len(), 2);
        let untouched = merged.iter().find(|p| p.id == "poster_002").unwrap();
        assert_eq!(untouched, &existing[1]);
    }

    #[test]
    fn duplicate_candidate_ids_merge_instead_of_duplicating() {
        let first = candidate("poster_001", "First");
        let mut second = candidate("poster_001", "Second");
        second.booth_id = Some("B7".into());
        let merged = merge_store(&[], &[first, second], Utc::now());

        assert_eq!(merged.len(), 1);
        // The later candidate in processing order wins via merge semantics.
        assert_eq!(merged[0].title, "Second");
        assert_eq!(merged[0].booth_id.as_deref(), Some("B7"));
    }

    #[test]
    fn remerge_of_identical_extraction_is_idempotent() {
        let now1 = Utc::now();
        let first = merge_store(&[], &[candidate("poster_001", "T")], now1);

        // Operator curates between imports.
        let mut curated = first.clone();
        curated[0].booth_id = Some("B3".into());

        let now2 = Utc::now();
        let second = merge_store(&curated, &[candidate("poster_001", "T")], now2);
        let now3 = Utc::now();
        let third = merge_store(&second, &[candidate("poster_001", "T")], now3);

        assert_eq!(third.len(), 1);
        assert!(second[0].content_eq(&third[0]));
        assert_eq!(third[0].booth_id.as_deref(), Some("B3"));
        assert_eq!(third[0].created_at(), second[0].created_at());
    }
}
