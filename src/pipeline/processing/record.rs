use crate::constants::{MISSING_DESCRIPTION, MISSING_LABEL};
use crate::domain::NormalizedRecord;
use crate::identity::identity_key;
use crate::pipeline::processing::classify::Classifier;
use crate::pipeline::processing::normalize::{normalize_date, normalize_value, sanitize, sanitize_text};
use crate::types::RawNotice;
use tracing::trace;

/// Builds table rows from raw notices
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBuilder {
    classifier: Classifier,
}

impl RecordBuilder {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Turns one raw notice into exactly one record. Never fails: missing
    /// fields take their documented defaults.
    pub fn build(&self, raw: &RawNotice, modality_label: &str) -> NormalizedRecord {
        let classification = self.classifier.classify(raw.description());

        let description = non_empty_or(sanitize_text(raw.description()), MISSING_DESCRIPTION);
        let organization = non_empty_or(sanitize_text(raw.organization()), MISSING_LABEL);
        let municipality = non_empty_or(sanitize_text(raw.municipality()), MISSING_LABEL);
        let origin_link = non_empty_or(
            raw.origin_link().map(str::trim).unwrap_or_default().to_string(),
            MISSING_LABEL,
        );
        let value = normalize_value(raw.estimated_value());

        let identity_key = identity_key(&origin_link, &description, value, &organization);
        trace!(%identity_key, category = %classification.category(), "built record");

        NormalizedRecord {
            identity_key,
            published_date: normalize_date(raw.published_at()),
            modality_label: sanitize(modality_label),
            municipality,
            organization,
            nature: classification.nature,
            function: classification.function,
            description,
            value,
            origin_link,
            duplicate_status: None,
        }
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
