//! Shared decoding helpers for server documents.

/// Servers send the document id as `_id`, as `id`, or (with virtuals
/// enabled) as both carrying the same value. `_id` wins when both exist.
pub(crate) fn document_id(underscore: Option<String>, plain: Option<String>) -> Result<String, String> {
    underscore
        .or(plain)
        .ok_or_else(|| "missing field `_id`".to_string())
}
