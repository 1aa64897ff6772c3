//! Traversal guard applied to every marker filename and every project file name
//! before it is used as a ZIP entry name or joined onto a directory.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathRejection {
    #[error("path is empty")]
    Empty,

    #[error("path contains '..'")]
    Traversal,

    #[error("path is absolute")]
    Absolute,

    #[error("path contains a backslash")]
    Backslash,

    #[error("path contains a control character")]
    ControlCharacter,
}

pub fn check_path(path: &str) -> Result<(), PathRejection> {
    if path.trim().is_empty() {
        return Err(PathRejection::Empty);
    }
    if path.contains("..") {
        return Err(PathRejection::Traversal);
    }
    if path.starts_with('/') || has_drive_prefix(path) {
        return Err(PathRejection::Absolute);
    }
    if path.contains('\\') {
        return Err(PathRejection::Backslash);
    }
    if path.chars().any(char::is_control) {
        return Err(PathRejection::ControlCharacter);
    }
    Ok(())
}

// C:foo, c:/foo
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
