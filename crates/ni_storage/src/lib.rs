pub mod backends;

pub use backends::memory::{MemorySettings, MemoryStorage};

pub mod prelude {
    pub use super::backends::memory::{MemorySettings, MemoryStorage};
    pub use ni_core::{ArticleRecord, ArticleStore, SettingsStore};
}
