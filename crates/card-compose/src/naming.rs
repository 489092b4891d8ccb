//! Deterministic artifact names

use crate::types::{CardError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const MAX_SLUG_CHARS: usize = 80;

/// Hex digits of the pair digest kept in the file name
const DIGEST_CHARS: usize = 10;

/// Replace everything but ASCII letters, digits and `-` with `_`.
pub fn sanitize(text: &str) -> String {
    text.trim()
        .chars()
        .take(MAX_SLUG_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name of the card for a (normalized handle, question) pair.
///
/// The readable slugs are lossy, so a digest of the exact trimmed pair keeps
/// distinct pairs on distinct names.
pub fn card_file_name(handle: &str, question: &str) -> String {
    format!(
        "card_{}_{}_{}.png",
        sanitize(handle),
        sanitize(question),
        pair_digest(handle, question)
    )
}

fn pair_digest(handle: &str, question: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(handle.trim().as_bytes());
    hasher.update([0u8]);
    hasher.update(question.trim().as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(DIGEST_CHARS);
    digest
}

/// Hands out output paths and refuses to hand out the same one twice.
#[derive(Debug, Default)]
pub struct ArtifactNames {
    issued: HashSet<PathBuf>,
}

impl ArtifactNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        let path = dir.join(file_name);
        if !self.issued.insert(path.clone()) {
            return Err(CardError::DuplicateArtifact(path));
        }
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_file_name() {
        let name = card_file_name("lioruby_", "What's your favourite song?");
        assert!(name.starts_with("card_lioruby__What_s_your_favourite_song__"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), "card_lioruby__What_s_your_favourite_song__.png".len() + 10);
        // Stable across calls and surrounding whitespace
        assert_eq!(name, card_file_name(" lioruby_", "What's your favourite song?  "));
    }

    #[test]
    fn test_punctuation_variants_get_distinct_names() {
        assert_ne!(card_file_name("a", "Why?"), card_file_name("a", "Why!"));
        assert_ne!(card_file_name("a_b", "Q"), card_file_name("a.b", "Q"));
    }

    #[test]
    fn test_long_questions_sharing_a_prefix() {
        let prefix = "x".repeat(100);
        let first = format!("{prefix} one?");
        let second = format!("{prefix} two?");
        assert_ne!(card_file_name("a", &first), card_file_name("a", &second));
    }

    #[test]
    fn test_sanitize_strips_path_separators() {
        assert_eq!(sanitize("../etc/passwd"), "___etc_passwd");
    }

    #[test]
    fn test_claim_detects_collisions() {
        let mut names = ArtifactNames::new();
        let dir = Path::new("out");
        names.claim(dir, &card_file_name("a", "Why?")).unwrap();
        names.claim(dir, &card_file_name("a", "Why!")).unwrap();
        let err = names.claim(dir, &card_file_name("a", "Why?")).unwrap_err();
        assert!(matches!(err, CardError::DuplicateArtifact(_)));
        assert_eq!(names.len(), 2);
    }
}
