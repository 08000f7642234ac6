pub mod capability;
pub mod error;
pub mod store;
pub mod types;

pub use capability::RewriteCapability;
pub use error::{Error, Result};
pub use store::{ArticleStore, SettingsStore};
pub use types::{
    ArticleRecord, DuplicateCheckResult, DuplicateKind, IngestOutcome, ProcessedArticle,
    RawArticle, RewriteKind, RewriteOutcome,
};

pub mod prelude {
    pub use super::capability::RewriteCapability;
    pub use super::error::{Error, Result};
    pub use super::store::{ArticleStore, SettingsStore};
    pub use super::types::{
        ArticleRecord, DuplicateCheckResult, DuplicateKind, IngestOutcome, ProcessedArticle,
        RawArticle, RewriteKind, RewriteOutcome,
    };
}
