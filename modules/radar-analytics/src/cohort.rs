//! Write-side capability: deriving the self-reported-user cohort.

use async_trait::async_trait;

use crate::error::Result;

/// Substrings marking a tweet author as a self-reported BPJS user.
/// Fixed policy, not user-configurable. Matched case-insensitively as
/// plain substrings, any one phrase is enough.
pub const SELF_REPORTED_USAGE_PHRASES: &[&str] =
    &["pakai bpjs", "daftar bpjs", "menggunakan bpjs"];

/// True if `text` contains any self-reported-usage phrase. No word
/// boundaries, no stemming.
pub fn mentions_bpjs_usage(text: &str) -> bool {
    let lowered = text.to_lowercase();
    SELF_REPORTED_USAGE_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Maintenance operation that persists cohort membership. Run once
/// before the cohort-restricted aggregate means anything; safe to run
/// again any time after new tweets arrive.
#[async_trait]
pub trait CohortClassifier: Send + Sync {
    /// Flag every tweet whose raw text self-reports BPJS usage.
    ///
    /// Applies atomically across all matching rows. Idempotent, and
    /// flags are sticky: a tweet flagged once stays flagged even if its
    /// text later stops matching. Returns the number of newly flagged
    /// tweets.
    async fn flag_bpjs_users(&self) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_phrase_matches() {
        for phrase in SELF_REPORTED_USAGE_PHRASES {
            assert!(mentions_bpjs_usage(phrase), "{phrase} should match itself");
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(mentions_bpjs_usage("saya DAFTAR BPJS kemarin"));
        assert!(mentions_bpjs_usage("Pakai BPJS di puskesmas"));
        assert!(mentions_bpjs_usage("MENGGUNAKAN bpjs untuk operasi"));
    }

    #[test]
    fn matches_inside_larger_words() {
        // Containment only — "dipakai bpjs" embeds "pakai bpjs".
        assert!(mentions_bpjs_usage("obat ini dipakai bpjs juga"));
    }

    #[test]
    fn unrelated_text_does_not_match() {
        assert!(!mentions_bpjs_usage("antrian rumah sakit panjang sekali"));
        assert!(!mentions_bpjs_usage(""));
    }

    #[test]
    fn phrase_words_apart_do_not_match() {
        // Both words present but not as the contiguous phrase.
        assert!(!mentions_bpjs_usage("bpjs itu bagus, saya pakai asuransi lain"));
    }
}
