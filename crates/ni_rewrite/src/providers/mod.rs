pub mod deepseek;
pub mod dummy;
pub mod gemini;
pub mod groq;
pub mod openai;

pub use deepseek::DeepSeekCapability;
pub use dummy::DummyCapability;
pub use gemini::GeminiCapability;
pub use groq::GroqCapability;
pub use openai::OpenAiCapability;
