//! Tamper digest, a canonical snapshot of table metadata.
//!
//! The canonical text (version 1) is
//!
//! ```text
//! knit-tamper/v1
//! fullid=<full id>
//! created=<creation time>
//! modified=<last modified time>
//! etag=<etag>
//! ```
//!
//! with both timestamps in UTC, RFC 3339, millisecond precision, `Z` suffix.
//! Timestamps are truncated to the millisecond, so two snapshots that differ
//! only below one millisecond share a digest. BigQuery reports table times in
//! whole epoch milliseconds.
//! The digest is `v1:` followed by the lowercase hex SHA-256 of that text, so
//! it does not depend on the host timezone or on any `Debug` formatting.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::types::ResourceMetadata;

/// Version tag prefixed to every digest.
pub const DIGEST_VERSION: &str = "v1";

/// The exact text that is hashed by [`digest`].
pub fn canonical_text(meta: &ResourceMetadata) -> String {
    format!(
        "knit-tamper/{DIGEST_VERSION}\nfullid={}\ncreated={}\nmodified={}\netag={}\n",
        meta.full_id,
        timestamp(&meta.creation_time),
        timestamp(&meta.last_modified_time),
        meta.etag,
    )
}

/// Deterministic digest of `meta`.
pub fn digest(meta: &ResourceMetadata) -> String {
    let text = canonical_text(meta);
    tracing::debug!(canonical = %text, "tamper snapshot");
    let mut h = Sha256::new();
    h.update(text.as_bytes());
    format!("{DIGEST_VERSION}:{}", hex::encode(h.finalize()))
}

/// Exact comparison of `expected` with the digest of `meta`.
pub fn verify(expected: &str, meta: &ResourceMetadata) -> bool {
    digest(meta) == expected
}

fn timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
