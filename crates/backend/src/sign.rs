//! Request signing for the backend API.
//!
//! The backend authenticates applications by an `api_sig` parameter: the MD5
//! hex digest of the shared secret followed by every request parameter's key
//! and value, concatenated in key order.

/// Compute `api_sig` over `params` with the given shared secret.
///
/// Parameter order in the slice does not matter; keys are sorted before
/// hashing. `api_sig` itself must not be in the slice.
#[must_use]
pub fn api_sig(secret: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut buf = String::with_capacity(
        secret.len() + sorted.iter().map(|(k, v)| k.len() + v.len()).sum::<usize>(),
    );
    buf.push_str(secret);
    for (k, v) in sorted {
        buf.push_str(k);
        buf.push_str(v);
    }
    format!("{:x}", md5::compute(buf.as_bytes()))
}
