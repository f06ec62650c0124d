//! Google Drive link parsing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FILE_ID_PATTERNS: [Regex; 3] = [
        Regex::new(r"drive\.google\.com/file/d/([A-Za-z0-9_-]+)(?:[/?#]|$)").unwrap(),
        Regex::new(r"drive\.google\.com/open\?id=([A-Za-z0-9_-]+)(?:[&#]|$)").unwrap(),
        Regex::new(r"drive\.google\.com/uc\?(?:.*&)?id=([A-Za-z0-9_-]+)(?:[&#]|$)").unwrap(),
    ];
    static ref FOLDER_ID_PATTERN: Regex =
        Regex::new(r"drive\.google\.com/drive/(?:u/\d+/)?folders/([A-Za-z0-9_-]+)(?:[/?#]|$)")
            .unwrap();
    static ref BARE_ID: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Extract the file id from a shared file link.
///
/// Only ids made of Drive id characters are accepted, so the result is
/// always safe to use as a single path component.
///
/// ```rust
/// use drivefs_http::locator::extract_file_id;
///
/// assert_eq!(extract_file_id("https://drive.google.com/file/d/ABC123/view"), Some("ABC123"));
/// assert_eq!(extract_file_id("https://example.com/ABC123"), None);
/// ```
pub fn extract_file_id(url: &str) -> Option<&str> {
    FILE_ID_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    })
}

/// Extract the folder id from a folder link.
///
/// ```rust
/// use drivefs_http::locator::extract_folder_id;
///
/// assert_eq!(extract_folder_id("https://drive.google.com/drive/folders/ABC123"), Some("ABC123"));
/// ```
pub fn extract_folder_id(url: &str) -> Option<&str> {
    FOLDER_ID_PATTERN
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Whether `s` looks like a bare Drive id rather than a link.
pub fn is_bare_id(s: &str) -> bool {
    BARE_ID.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_ids() {
        let urls = [
            ("https://drive.google.com/file/d/ABC123/view", "ABC123"),
            ("https://drive.google.com/open?id=XYZ789", "XYZ789"),
            ("https://drive.google.com/uc?id=DEF456&export=download", "DEF456"),
            ("https://drive.google.com/uc?export=download&id=GHI012", "GHI012"),
            ("https://drive.google.com/file/d/1a-B_c/edit?usp=sharing", "1a-B_c"),
        ];
        for (url, expected) in urls {
            assert_eq!(extract_file_id(url), Some(expected), "failed for {}", url);
        }
    }

    #[test]
    fn folder_ids() {
        let urls = [
            ("https://drive.google.com/drive/folders/ABC123", "ABC123"),
            ("https://drive.google.com/drive/u/0/folders/XYZ789", "XYZ789"),
            ("https://drive.google.com/drive/folders/QRS?usp=sharing", "QRS"),
        ];
        for (url, expected) in urls {
            assert_eq!(extract_folder_id(url), Some(expected), "failed for {}", url);
        }
    }

    #[test]
    fn non_drive_links() {
        assert_eq!(extract_file_id("https://example.com/file/d/ABC"), None);
        assert_eq!(extract_folder_id("https://drive.google.com/file/d/ABC/view"), None);
    }

    #[test]
    fn ids_with_path_characters_are_rejected() {
        let urls = [
            "https://drive.google.com/open?id=/tmp/outside.txt",
            "https://drive.google.com/open?id=../../etc/passwd",
            "https://drive.google.com/uc?export=download&id=/abs/path",
            "https://drive.google.com/file/d/../view",
            "https://drive.google.com/open?id=abc/../x",
        ];
        for url in urls {
            assert_eq!(extract_file_id(url), None, "accepted {}", url);
        }
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/folders/..%2F..?x"),
            None
        );
    }

    #[test]
    fn bare_ids() {
        assert!(is_bare_id("1AbC-d_E"));
        assert!(!is_bare_id(""));
        assert!(!is_bare_id("https://drive.google.com/drive/folders/x"));
        assert!(!is_bare_id("has space"));
    }
}
