//! Comment preprocessing ahead of prompt embedding.
//!
//! Blank comments are dropped, exact duplicates collapsed, oversized batches
//! sampled down to [`MAX_SAMPLE_SIZE`], and long comments cut to
//! [`MAX_COMMENT_CHARS`] characters plus [`TRUNCATION_MARKER`].

use std::borrow::Cow;
use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maximum number of comments embedded in a single prompt.
pub const MAX_SAMPLE_SIZE: usize = 100;

/// Maximum characters kept per comment before truncation.
pub const MAX_COMMENT_CHARS: usize = 200;

/// Appended to comments cut at [`MAX_COMMENT_CHARS`].
pub const TRUNCATION_MARKER: &str = "...";

/// Randomness source for oversized-batch sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sampling {
    /// Fresh OS entropy per request. Results are not reproducible.
    #[default]
    Random,
    /// Fixed seed; identical inputs sample identically.
    Seeded(u64),
}

impl Sampling {
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(Sampling::Random, Sampling::Seeded)
    }

    /// Builds a request-local RNG.
    #[must_use]
    pub fn rng(self) -> StdRng {
        match self {
            Sampling::Random => StdRng::from_os_rng(),
            Sampling::Seeded(seed) => StdRng::seed_from_u64(seed),
        }
    }
}

/// Turn raw comment texts into one newline-joined block.
///
/// Returns an empty string when nothing survives filtering; callers treat that
/// as "nothing to analyze".
pub fn prepare_comments<S, R>(comments: &[S], rng: &mut R) -> String
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let unique: Vec<&str> = comments
        .iter()
        .map(AsRef::as_ref)
        .filter(|text| !text.trim().is_empty())
        .filter(|text| seen.insert(*text))
        .collect();

    let sampled = if unique.len() > MAX_SAMPLE_SIZE {
        let mut picked = rand::seq::index::sample(rng, unique.len(), MAX_SAMPLE_SIZE).into_vec();
        picked.sort_unstable();
        tracing::debug!(
            unique = unique.len(),
            kept = MAX_SAMPLE_SIZE,
            "sampling oversized comment batch"
        );
        picked.into_iter().map(|i| unique[i]).collect()
    } else {
        unique
    };

    sampled
        .into_iter()
        .map(truncate_comment)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut `text` to [`MAX_COMMENT_CHARS`] characters, appending the marker when cut.
#[must_use]
pub fn truncate_comment(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_COMMENT_CHARS) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..byte_idx])),
        None => Cow::Borrowed(text),
    }
}
