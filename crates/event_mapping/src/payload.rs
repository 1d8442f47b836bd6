//! Mapping feed payload parsing.
//!
//! Grammar: `entry (";" entry)*` with `entry := id ":" LABEL`.

/// Parse a raw mapping payload into `(id, label)` pairs, in feed order.
///
/// Entries with no `:`, an empty id, or an empty label are skipped. Only the
/// first `:` separates id from label.
pub fn parse_mapping_payload(raw: &str) -> Vec<(String, String)> {
    raw.split(';').filter_map(parse_entry).collect()
}

fn parse_entry(entry: &str) -> Option<(String, String)> {
    let (id, label) = entry.trim().split_once(':')?;
    let (id, label) = (id.trim(), label.trim());
    if id.is_empty() || label.is_empty() {
        return None;
    }
    Some((id.to_string(), label.to_string()))
}
