//! Content-addressed cache keys
//!
//! A key is the path under which a resized image is served:
//! `/v1/image/<base64url(sha256(source url))>.jpeg`. The same source URL
//! always maps to the same key, so the key doubles as the cache lookup
//! token and the public image path.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use sha2::{Digest, Sha256};

/// Route prefix shared by cache keys and the get-image endpoint
pub const IMAGE_PATH_PREFIX: &str = "/v1/image/";

/// Every resized image is re-encoded as JPEG
pub const IMAGE_EXTENSION: &str = ".jpeg";

/// Derive the cache key for a source URL
pub fn generate_cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let hash = hasher.finalize();

    format!(
        "{}{}{}",
        IMAGE_PATH_PREFIX,
        URL_SAFE.encode(hash),
        IMAGE_EXTENSION
    )
}

/// Absolute URL a client can fetch the resized image from
pub fn servable_url(base_url: &str, key: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), key)
}

/// Rebuild the cache key from the trailing path segment of a get-image request
pub fn cache_key_from_image_id(image_id: &str) -> String {
    format!("{IMAGE_PATH_PREFIX}{image_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_deterministic() {
        let url = "https://example.com/photos/cat.jpg";
        assert_eq!(generate_cache_key(url), generate_cache_key(url));
        assert_ne!(
            generate_cache_key(url),
            generate_cache_key("https://example.com/photos/dog.jpg")
        );
    }

    #[test]
    fn test_cache_key_shape() {
        let key = generate_cache_key("https://example.com/a.jpg");
        assert!(key.starts_with(IMAGE_PATH_PREFIX));
        assert!(key.ends_with(IMAGE_EXTENSION));

        // SHA-256 is 32 bytes, padded URL-safe base64 makes that 44 characters
        let token = &key[IMAGE_PATH_PREFIX.len()..key.len() - IMAGE_EXTENSION.len()];
        assert_eq!(token.len(), 44);
        assert!(!token.contains('/'));
        assert!(!token.contains('+'));
    }

    #[test]
    fn test_servable_url_joins_cleanly() {
        let key = "/v1/image/abc=.jpeg";
        assert_eq!(
            servable_url("http://localhost:8080/", key),
            "http://localhost:8080/v1/image/abc=.jpeg"
        );
        assert_eq!(
            servable_url("http://localhost:8080", key),
            "http://localhost:8080/v1/image/abc=.jpeg"
        );
    }

    #[test]
    fn test_image_id_round_trips_to_key() {
        let key = generate_cache_key("https://example.com/a.jpg");
        let image_id = key.trim_start_matches(IMAGE_PATH_PREFIX);
        assert_eq!(cache_key_from_image_id(image_id), key);
    }
}
