//! posterdeck CLI for poster-metadata import and validation.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use posterdeck::config::{StorePaths, DEFAULT_LOG_FILTER};
use posterdeck::pipeline::extraction::chain::ExtractionChain;
use posterdeck::pipeline::extraction::heuristics::TextHeuristicExtraction;
use posterdeck::pipeline::extraction::ollama::{OllamaClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use posterdeck::pipeline::extraction::pdf_text::PdfTextSource;
use posterdeck::pipeline::extraction::renderer::{NullRenderer, PdfiumRenderer};
use posterdeck::pipeline::extraction::types::PosterRenderer;
use posterdeck::pipeline::extraction::vision::VisionExtraction;
use posterdeck::pipeline::import::{require_vision_service, ImportMode, Importer};
use posterdeck::pipeline::overrides::OverrideMap;
use posterdeck::pipeline::validate;

#[derive(Parser, Debug)]
#[command(name = "posterdeck")]
#[command(about = "Batch import and curation pipeline for research-poster metadata")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import poster PDFs from a directory into the metadata store
    Import {
        /// Directory containing poster PDFs
        source_dir: PathBuf,

        /// Replace the whole store instead of merging into it
        #[arg(long)]
        replace: bool,

        /// First numeric id to assign (posters are numbered from here)
        #[arg(long, default_value = "1")]
        start_id: u32,

        /// Extract metadata with a local vision model before falling back
        /// to text parsing
        #[arg(long)]
        use_vision: bool,

        /// Vision model name
        #[arg(long, default_value = "gemma3:latest", env = "POSTERDECK_VISION_MODEL")]
        vision_model: String,

        /// Base URL of the local Ollama instance
        #[arg(long, default_value = DEFAULT_BASE_URL, env = "POSTERDECK_OLLAMA_URL")]
        ollama_url: String,

        /// Project root holding the store files and display assets
        #[arg(long, default_value = ".", env = "POSTERDECK_PROJECT_ROOT")]
        project_root: PathBuf,
    },
    /// Validate the persisted store representations and display assets
    Validate {
        /// Project root holding the store files and display assets
        #[arg(long, default_value = ".", env = "POSTERDECK_PROJECT_ROOT")]
        project_root: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    match Cli::parse().command {
        Command::Import {
            source_dir,
            replace,
            start_id,
            use_vision,
            vision_model,
            ollama_url,
            project_root,
        } => run_import(
            source_dir,
            replace,
            start_id,
            use_vision,
            vision_model,
            ollama_url,
            project_root,
        ),
        Command::Validate { project_root } => run_validate(project_root),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_import(
    source_dir: PathBuf,
    replace: bool,
    start_id: u32,
    use_vision: bool,
    vision_model: String,
    ollama_url: String,
    project_root: PathBuf,
) -> ExitCode {
    let paths = StorePaths::new(project_root);

    // Configuration failures surface before any source is touched.
    let vision = if use_vision {
        let client = Arc::new(OllamaClient::new(&ollama_url, DEFAULT_TIMEOUT_SECS));
        if let Err(err) = require_vision_service(client.as_ref(), &ollama_url) {
            tracing::error!(error = %err, "Vision pre-flight failed");
            return ExitCode::FAILURE;
        }
        tracing::info!(model = %vision_model, "Vision mode enabled");
        Some(VisionExtraction::new(client, vision_model))
    } else {
        None
    };

    let renderer: Box<dyn PosterRenderer> = match PdfiumRenderer::new() {
        Ok(renderer) => Box::new(renderer),
        Err(err) => {
            tracing::warn!(error = %err, "PDFium unavailable; display assets will not be rendered");
            Box::new(NullRenderer)
        }
    };

    let text = TextHeuristicExtraction::new(Arc::new(PdfTextSource));
    let chain = ExtractionChain::standard(vision, text);
    let overrides = OverrideMap::load(&paths.overrides_file());
    let importer = Importer::new(paths, renderer, chain, overrides);

    let mode = if replace {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };

    match importer.run(&source_dir, start_id, mode) {
        Ok(summary) if summary.report.is_clean() => {
            tracing::info!(
                imported = summary.imported,
                skipped = summary.skipped,
                total = summary.total_in_store,
                "Import completed successfully"
            );
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            tracing::warn!(
                imported = summary.imported,
                violations = summary.report.violations.len(),
                "Import committed with validation warnings"
            );
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!(error = %err, "Import failed");
            ExitCode::FAILURE
        }
    }
}

fn run_validate(project_root: PathBuf) -> ExitCode {
    let paths = StorePaths::new(project_root);
    match validate::validate_project(&paths) {
        Ok(report) if report.is_clean() => {
            tracing::info!("Store representations validated");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            for violation in &report.violations {
                tracing::error!(%violation, "Validation violation");
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!(error = %err, "Validation could not run");
            ExitCode::FAILURE
        }
    }
}
