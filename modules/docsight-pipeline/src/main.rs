use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docsight_client::FunctionsClient;
use docsight_common::{PipelineConfig, ServiceConfig, SummaryMode, UploadedFile};
use docsight_pipeline::{DocumentAnalyzer, Narrator};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docsight", about = "Explain documents through the hosted analysis functions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract and explain a PDF or image, printing the analysis record as JSON
    Analyze {
        path: PathBuf,

        /// Override the media type guessed from the file extension
        #[arg(long)]
        media_type: Option<String>,

        /// Also synthesize speech for the summary in this language (e.g. en-US)
        #[arg(long)]
        speak: Option<String>,

        /// Which summary variant to narrate
        #[arg(long, value_enum, default_value_t = Mode::Simple)]
        mode: Mode,
    },

    /// Translate text into a target language
    Translate {
        text: String,

        #[arg(long)]
        target: String,
    },

    /// Synthesize speech for text
    Speak {
        text: String,

        #[arg(long)]
        language: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Simple,
    Detailed,
}

impl From<Mode> for SummaryMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Simple => SummaryMode::Simple,
            Mode::Detailed => SummaryMode::Detailed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docsight=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let service_config = ServiceConfig::from_env()?;
    let client = FunctionsClient::new(service_config)?;

    match cli.command {
        Command::Analyze {
            path,
            media_type,
            speak,
            mode,
        } => {
            let file = load_upload(&path, media_type).await?;
            let analyzer = DocumentAnalyzer::from_client(client.clone(), PipelineConfig::from_env()?);

            let record = analyzer
                .analyze_record(&file)
                .await
                .with_context(|| format!("Failed to analyze {}", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&record)?);

            if let Some(language) = speak {
                let narrator = Narrator::new(Arc::new(client));
                let speech = narrator.narrate(&record, mode.into(), &language).await?;
                println!("{}", speech.audio_url);
            }
        }
        Command::Translate { text, target } => {
            let result = client.translate_text(&text, &target).await?;
            println!("{}", result.translated_text);
        }
        Command::Speak { text, language } => {
            let result = client.synthesize_speech(&text, &language).await?;
            println!("{}", result.audio_url);
        }
    }

    Ok(())
}

async fn load_upload(path: &Path, media_type: Option<String>) -> Result<UploadedFile> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("File not found: {}", path.display()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let media_type = media_type.unwrap_or_else(|| {
        mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });

    tracing::debug!(file = %name, %media_type, size = metadata.len(), "Loaded upload");
    Ok(UploadedFile::from_path(name, media_type, path, metadata.len()))
}
