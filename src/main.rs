//! hero-narrator: builds a narrated HTML roster of Marvel characters.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hero_narrator::catalog::CatalogClient;
use hero_narrator::config::Config;
use hero_narrator::narrator::{GoogleSpeechClient, SpeechSynthesizer, VoiceGender};
use hero_narrator::pipeline::{normalize_letter, Pipeline};
use hero_narrator::report::Templates;

#[derive(Parser, Debug)]
#[command(name = "hero-narrator", about = "Narrated roster of Marvel characters")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Voice gender for text-to-speech (defaults to the configured voice)
    #[arg(short, long, global = true, value_enum, ignore_case = true)]
    voice: Option<VoiceGender>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the report and mp3 files (overrides config)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Render the report without synthesizing audio
    #[arg(long, global = true)]
    no_voice: bool,

    /// Enable verbose (debug) logging
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create result/<letter>-Marvel_Heroes.html listing every character whose
    /// name begins with <letter>, with a voiced description.
    Load {
        /// The letter the character names begin with
        letter: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::load(args.config.as_deref());
    if let Some(dir) = args.output {
        config.output.result_dir = dir;
    }

    match args.command {
        Command::Load { letter } => {
            let letter = normalize_letter(&letter)?;
            let voice = args.voice.unwrap_or(config.speech.voice_default);

            let source = Arc::new(CatalogClient::new(config.catalog.clone())?);
            let synthesizer: Option<Arc<dyn SpeechSynthesizer>> = if args.no_voice {
                info!("Narration disabled");
                None
            } else {
                Some(Arc::new(GoogleSpeechClient::new(config.speech.clone())?))
            };
            let templates = Templates::load(config.output.template_dir.as_deref())?;

            let pipeline = Pipeline::new(source, synthesizer, templates, &config.output.result_dir);
            let summary = pipeline.run(letter, voice).await?;

            info!(
                "Done: {} characters, {} audio files written ({voice})",
                summary.characters,
                summary.narration.written_count()
            );
            let failed = summary.narration.failed_count();
            if failed > 0 {
                warn!("{failed} descriptions could not be narrated");
            }
        }
    }

    Ok(())
}
