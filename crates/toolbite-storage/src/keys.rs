//! Unique handle names.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

const MAX_EXTENSION_LEN: usize = 10;

/// Build a handle name from a high-resolution timestamp, the owning request,
/// a process-wide sequence number and a random suffix.
pub fn handle_name(request_id: Uuid, extension: Option<&str>) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let random = Uuid::new_v4().simple().to_string();

    let mut name = format!(
        "{}-{}-{}-{}",
        nanos,
        request_id.simple(),
        sequence,
        &random[..8]
    );

    if let Some(ext) = extension.and_then(sanitize_extension) {
        name.push('.');
        name.push_str(&ext);
    }

    name
}

/// Whether `name` has the shape [`handle_name`] produces.
///
/// Startup purging only touches entries that pass this check, so a base path
/// shared with other programs keeps their files.
pub fn is_handle_name(name: &str) -> bool {
    let (stem, extension) = match name.split_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    };

    if let Some(ext) = extension {
        if sanitize_extension(ext).as_deref() != Some(ext) {
            return false;
        }
    }

    let parts: Vec<&str> = stem.split('-').collect();
    match parts.as_slice() {
        [nanos, request, sequence, random] => {
            is_digits(nanos)
                && is_hex(request, 32)
                && is_digits(sequence)
                && is_hex(random, 8)
        }
        _ => false,
    }
}

fn is_digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

fn is_hex(part: &str, len: usize) -> bool {
    part.len() == len && part.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Keep only short alphanumeric extensions so a client-supplied name can
/// never introduce separators into a handle path.
fn sanitize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim_start_matches('.');
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
