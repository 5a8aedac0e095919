//! Presigned-URL detection

/// Query parameters that together mark a SigV4 query-string signature
const PRESIGN_PARAMS: [&str; 3] = ["X-Amz-Algorithm", "X-Amz-Credential", "X-Amz-Signature"];

/// Whether the raw query carries all three presign parameters.
///
/// Names are compared case-sensitively after URL decoding; values are ignored.
pub fn is_presigned(query: Option<&str>) -> bool {
    let Some(query) = query else {
        return false;
    };

    let mut seen = [false; PRESIGN_PARAMS.len()];
    for (name, _) in form_urlencoded::parse(query.as_bytes()) {
        if let Some(idx) = PRESIGN_PARAMS.iter().position(|p| *p == name) {
            seen[idx] = true;
        }
    }
    seen.iter().all(|s| *s)
}
