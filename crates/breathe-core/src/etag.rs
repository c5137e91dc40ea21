use crate::model::DashboardMeta;
use crate::time::parse_rfc3339;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Stable content hash for a dashboard's freshness metadata.
///
/// Pairs are sorted by slice key before hashing so the validator is
/// independent of field order in any serialized form.
pub fn compute_etag(meta: &DashboardMeta) -> String {
    let mut pairs: Vec<(&str, &str)> = meta.slices().to_vec();
    pairs.sort_by_key(|(key, _)| *key);

    let joined = pairs
        .iter()
        .map(|(key, updated_at)| format!("{key}:{updated_at}"))
        .collect::<Vec<_>>()
        .join("|");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Latest `updatedAt` across all slices. Unparsable entries are skipped;
/// `None` only when every slice timestamp fails to parse.
pub fn latest_updated_at(meta: &DashboardMeta) -> Option<DateTime<Utc>> {
    meta.slices()
        .iter()
        .filter_map(|(_, updated_at)| parse_rfc3339(updated_at))
        .max()
}
