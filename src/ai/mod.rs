//! AI extraction pipeline: reader-based page conversion plus an
//! OpenAI-compatible structured-output completion.

pub mod extractor;
pub mod reader;

pub use extractor::{AiUniversalScraper, CompletionClient, OpenAiClient, UniversalScraper};
pub use reader::{DocumentConverter, JinaReader};
