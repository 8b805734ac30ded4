//! Import parsing for Kreativa: CSV files, PDFs, and pasted lists of
//! handles become categorized candidate profiles for admin review.

mod csv;
pub mod error;
mod extract;
pub mod gemini;
mod service;
mod text;

pub use csv::parse_csv;
pub use error::IngestError;
pub use extract::{parse_document_reply, parse_profiles_reply};
pub use gemini::{GeminiClient, DEFAULT_MODEL};
pub use service::{FileUpload, IngestService, ParsedFileResult};
pub use text::parse_text_with_regex;
