// src/debug.rs
//! Dev-only classification logging. Raw headline text is never logged; a
//! short SHA-256 prefix identifies the item instead.

use tracing::info;

use crate::post::Category;

pub const ENV_DEV_LOG: &str = "ANALYZER_DEV_LOG";

/// `ANALYZER_DEV_LOG=1` AND dev env (debug build or SHUTTLE_ENV in {local, development, dev}).
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// First 6 bytes of SHA-256 as hex.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn dev_log_classification(text: &str, category: Category, score: f64) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    info!(
        target: "classifier",
        %id,
        category = category.as_str(),
        score,
        chars = text.chars().count(),
        "classified"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("Pudgy Penguins floor steady");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("Pudgy Penguins floor steady"));
        assert_ne!(a, anon_hash("something else"));
    }
}
