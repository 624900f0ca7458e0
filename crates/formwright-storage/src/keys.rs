//! Shared key generation for storage backends.
//!
//! Key format: `{prefix}/{form_id}/{field_name}/{unix_millis}-{random}.{ext}`.

use rand::Rng;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

const RANDOM_SUFFIX_LEN: usize = 9;
const MAX_EXTENSION_LEN: usize = 10;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Logical folder for the files of one field of one form
pub fn upload_folder(prefix: &str, form_id: Uuid, field_name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let field = sanitize_segment(field_name);
    if prefix.is_empty() {
        format!("{}/{}", form_id, field)
    } else {
        format!("{}/{}/{}", prefix, form_id, field)
    }
}

/// Unique object name that keeps the original file extension
pub fn unique_name(filename: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::rng();
    let random: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();

    match extension(filename) {
        Some(ext) => format!("{}-{}.{}", millis, random, ext),
        None => format!("{}-{}", millis, random),
    }
}

/// Join folder and name into a validated storage key
pub fn object_key(folder: &str, name: &str) -> StorageResult<String> {
    let key = format!("{}/{}", folder.trim_end_matches('/'), name);
    validate_key(&key)?;
    Ok(key)
}

/// Keys must not contain `..` or a leading `/`
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_lowercase())
}
