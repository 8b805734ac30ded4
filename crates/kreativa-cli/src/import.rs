//! Local import preview: runs the same parsers the admin upload endpoints
//! use and prints the categorized candidates.

use std::path::PathBuf;

use clap::{ArgGroup, Subcommand};
use kreativa_core::AppConfig;
use kreativa_ingest::{FileUpload, IngestService, ParsedFileResult};

#[derive(Debug, Subcommand)]
pub enum ImportCommands {
    /// Parse a CSV, PDF, or free-text file and print the candidates
    #[command(group(ArgGroup::new("source").required(true).args(["csv", "pdf", "text"])))]
    Preview {
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Requires `GEMINI_API_KEY`
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Uses Gemini when configured; falls back to pattern matching on quota errors
        #[arg(long)]
        text: Option<PathBuf>,
    },
}

pub(crate) async fn run(config: &AppConfig, command: ImportCommands) -> anyhow::Result<()> {
    let ImportCommands::Preview { csv, pdf, text } = command;
    let service = IngestService::from_config(config)?;

    let result = if let Some(path) = csv {
        let content = tokio::fs::read_to_string(&path).await?;
        service.process_file_upload(FileUpload::Csv(content)).await
    } else if let Some(path) = pdf {
        let bytes = tokio::fs::read(&path).await?;
        service.process_file_upload(FileUpload::Pdf(bytes)).await
    } else if let Some(path) = text {
        let content = tokio::fs::read_to_string(&path).await?;
        service.process_text(&content).await
    } else {
        ParsedFileResult::default()
    };

    print_result(&result);
    Ok(())
}

fn print_result(result: &ParsedFileResult) {
    for error in &result.errors {
        eprintln!("error: {error}");
    }
    for p in &result.profiles {
        println!(
            "@{:<24} {:<10} {:<20} {:<14} {}",
            p.handle,
            p.platform.label(),
            p.category.label(),
            p.location.label(),
            p.name
        );
    }
    println!("{} candidate(s)", result.profiles.len());
}
