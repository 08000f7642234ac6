pub mod logging;
pub mod pipeline;

pub use logging::init_logging;
pub use pipeline::IngestPipeline;

pub mod prelude {
    pub use super::logging::init_logging;
    pub use super::pipeline::IngestPipeline;
    pub use ni_core::{Error, IngestOutcome, ProcessedArticle, RawArticle, Result};
}
