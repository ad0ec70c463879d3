// The serialized form of a snapshot, shared by all the backends.

use crate::poll::*;

/// The human-readable form, as written to the vote file.
pub fn encode_snapshot(ballots: &[Ballot]) -> StoreResult<String> {
    serde_json::to_string_pretty(ballots).context(EncodingSnapshotSnafu {})
}

/// The compact form, as sent to the key-value store.
pub fn encode_snapshot_compact(ballots: &[Ballot]) -> StoreResult<String> {
    serde_json::to_string(ballots).context(EncodingSnapshotSnafu {})
}

pub fn decode_snapshot(contents: &str) -> StoreResult<Vec<Ballot>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(contents).context(DecodingSnapshotSnafu {})
}
