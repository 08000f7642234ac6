pub mod canonical;
pub mod detector;
pub mod similarity;

pub use canonical::{canonicalize_text, fingerprint, normalize_url};
pub use detector::DuplicateDetector;
pub use similarity::{char_similarity, extract_keyword_profile, profile_similarity};

pub mod prelude {
    pub use super::canonical::{canonicalize_text, fingerprint, normalize_url};
    pub use super::detector::DuplicateDetector;
    pub use super::similarity::{char_similarity, extract_keyword_profile, profile_similarity};
    pub use ni_core::{DuplicateCheckResult, DuplicateKind, Error, RawArticle, Result};
}
