//! pdf-audio - Convert PDF documents to a single audio file using text-to-speech

mod audio;
mod config;
mod pdf;
mod pipeline;
mod text;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{PdfAudioConfig, RunConfig};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use pdf::PdfExtractor;
use pipeline::{ChunkOutcome, RunStatus, RunSummary};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tts_client::AudioFormat;

/// Exit code when output was written but some chunks failed.
const EXIT_PARTIAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "pdf-audio")]
#[command(about = "Convert PDF documents to audio using text-to-speech", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the PDF file
    pdf_file: Option<PathBuf>,

    /// Output file path (default: <pdf-name>.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Voice preset name from tts.toml
    #[arg(long)]
    voice: Option<String>,

    /// Audio format (mp3, opus, aac, flac, wav, pcm)
    #[arg(long)]
    format: Option<String>,

    /// Maximum chunk size in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// First chunk to synthesize (1-based)
    #[arg(long, default_value_t = 1)]
    start_chunk: usize,

    /// Maximum number of chunks to synthesize
    #[arg(long)]
    max_chunks: Option<usize>,

    /// Delay between provider calls in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Extract and chunk only; list the chunks that would be synthesized
    #[arg(long)]
    dry_run: bool,

    /// Also write the run summary as JSON to this path
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice preset
    SetVoice {
        /// Preset name from tts.toml
        preset: String,
    },
    /// Set default maximum chunk size
    SetChunkSize {
        /// Characters per chunk
        value: usize,
    },
    /// Set default delay between provider calls
    SetDelay {
        /// Milliseconds
        ms: u64,
    },
    /// Set default audio format
    SetFormat {
        /// mp3, opus, aac, flac, wav or pcm
        format: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    if let Some(Commands::Config { action }) = &args.command {
        handle_config_command(action)?;
        return Ok(ExitCode::SUCCESS);
    }

    let pdf_path = args.pdf_file.clone().ok_or_else(|| {
        anyhow::anyhow!("PDF file path is required. Run 'pdf-audio --help' for usage.")
    })?;

    let defaults = PdfAudioConfig::load().context("Failed to load configuration")?;
    let tts_config = tts_client::Config::load().context("Failed to load TTS configuration")?;

    let format = match &args.format {
        Some(f) => f.parse::<AudioFormat>()?,
        None => defaults.format,
    };

    let preset_name = args
        .voice
        .clone()
        .or_else(|| defaults.voice.clone())
        .unwrap_or_else(|| tts_config.default_preset.clone());
    let preset = tts_config
        .get_preset(&preset_name)
        .with_context(|| format!("Unknown voice preset: {}", preset_name))?;

    let run_config = RunConfig {
        output: args
            .output
            .clone()
            .unwrap_or_else(|| config::default_output_path(&pdf_path, format)),
        input: pdf_path,
        max_chunk_size: args.chunk_size.unwrap_or(defaults.chunk_size),
        start_chunk: args.start_chunk,
        max_chunks: args.max_chunks,
        delay: Duration::from_millis(args.delay_ms.unwrap_or(defaults.delay_ms)),
        voice: preset.voice.clone(),
        model: preset.model.clone(),
        format,
    };
    run_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid options: {}", e))?;

    if args.debug {
        eprintln!("PDF: {}", run_config.input.display());
        eprintln!("Output: {}", run_config.output.display());
        eprintln!("Preset: {} ({} / {})", preset_name, preset.provider, preset.voice);
        eprintln!("Format: {}", run_config.format);
        eprintln!("Chunk size: {}", run_config.max_chunk_size);
        eprintln!("Delay: {:?}", run_config.delay);
    }

    let extractor = pdf::default_extractor();
    debug!("Extracting text with {}", extractor.name());

    if args.dry_run {
        return dry_run(&run_config, extractor.as_ref());
    }

    let provider = tts_client::get_provider(
        preset,
        tts_config.get_provider_config(&preset.provider),
    )
    .with_context(|| {
        format!(
            "Failed to initialize provider '{}' for preset '{}'",
            preset.provider, preset_name
        )
    })?;

    if !format.is_concatenable() {
        warn!(
            "{} segments carry their own headers; the joined file may only play the first segment",
            format
        );
    }
    if run_config.max_chunk_size > provider.max_input_chars() {
        warn!(
            "Chunk size {} exceeds the {} limit of {}; long chunks will be rejected",
            run_config.max_chunk_size,
            provider.name(),
            provider.max_input_chars()
        );
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let result = pipeline::run(&run_config, extractor.as_ref(), provider.as_ref(), |progress| {
        pb.set_length(progress.range_len as u64);
        pb.set_position(progress.position as u64);
        pb.set_message(match &progress.outcome {
            ChunkOutcome::Synthesized { bytes } => format!("chunk {} ({} bytes)", progress.index, bytes),
            ChunkOutcome::Skipped => format!("chunk {} skipped", progress.index),
            ChunkOutcome::Failed(kind) => format!("chunk {} failed [{}]", progress.index, kind),
        });
    })
    .await;

    pb.finish_and_clear();

    match result {
        Ok(summary) => {
            eprintln!("\n{}", summary);
            write_summary(args.summary_json.as_deref(), &summary)?;
            Ok(ExitCode::from(exit_status(&summary)))
        }
        Err(e) => {
            if let Some(summary) = e.summary() {
                eprintln!("\n{}", summary);
                write_summary(args.summary_json.as_deref(), summary)?;
            }
            if let Some(hint) = e.remediation() {
                eprintln!("Hint: {}", hint);
            }
            Err(e.into())
        }
    }
}

/// 0 when every attempted chunk succeeded, 2 when the output is partial.
fn exit_status(summary: &RunSummary) -> u8 {
    match summary.status() {
        RunStatus::Complete => 0,
        RunStatus::Partial => EXIT_PARTIAL,
    }
}

/// Print the chunks a run would synthesize without calling a provider.
fn dry_run(run_config: &RunConfig, extractor: &dyn PdfExtractor) -> Result<ExitCode> {
    let chunks = pipeline::load_chunks(run_config, extractor)?;
    let range = run_config.chunk_range(chunks.len());

    eprintln!(
        "Chunks: {} total, {} selected",
        chunks.len(),
        range.len()
    );
    for chunk in &chunks[range] {
        println!(
            "{:>5}  {:>5} chars  {}",
            chunk.index,
            chunk.char_len(),
            preview(&chunk.text, 60)
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// First `max` characters of `text`, with an ellipsis when cut.
fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{}...", head.trim_end())
}

fn write_summary(path: Option<&Path>, summary: &RunSummary) -> Result<()> {
    if let Some(path) = path {
        summary.write_json(path)?;
        eprintln!("Summary written to {}", path.display());
    }
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = PdfAudioConfig::load()?;
            println!("Configuration file: {:?}", PdfAudioConfig::config_path());
            println!();
            match &config.voice {
                Some(voice) => println!("voice = \"{}\"", voice),
                None => println!("voice = (tts.toml default)"),
            }
            println!("format = \"{}\"", config.format);
            println!("chunk_size = {}", config.chunk_size);
            println!("delay_ms = {}", config.delay_ms);

            let tts_config = tts_client::Config::load()?;
            println!();
            println!("TTS configuration: {:?}", tts_client::Config::config_path()?);
            println!("default_preset = \"{}\"", tts_config.default_preset);
            let mut names: Vec<&String> = tts_config.presets.keys().collect();
            names.sort();
            for name in names {
                let preset = &tts_config.presets[name];
                println!("  {}: {} / {}", name, preset.provider, preset.voice);
            }
        }
        ConfigAction::SetVoice { preset } => {
            let tts_config = tts_client::Config::load()?;
            tts_config.get_preset(preset)?;

            let mut config = PdfAudioConfig::load()?;
            config.voice = Some(preset.clone());
            config.save()?;
            println!("Default voice preset set to: {}", preset);
        }
        ConfigAction::SetChunkSize { value } => {
            if *value == 0 {
                anyhow::bail!("Chunk size must be at least 1");
            }
            let mut config = PdfAudioConfig::load()?;
            config.chunk_size = *value;
            config.save()?;
            println!("Default chunk size set to: {}", config.chunk_size);
        }
        ConfigAction::SetDelay { ms } => {
            let mut config = PdfAudioConfig::load()?;
            config.delay_ms = *ms;
            config.save()?;
            println!("Default delay set to: {} ms", config.delay_ms);
        }
        ConfigAction::SetFormat { format } => {
            let mut config = PdfAudioConfig::load()?;
            config.format = format.parse()?;
            config.save()?;
            println!("Default format set to: {}", config.format);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pipeline::summary::{ChunkFailure, FailureKind};

    fn summary_with(succeeded: usize, failures: &[FailureKind]) -> RunSummary {
        let mut summary = RunSummary::new(PathBuf::from("doc.pdf"), 3, Utc::now());
        for _ in 0..succeeded {
            summary.record_success();
        }
        for (i, kind) in failures.iter().enumerate() {
            summary.record_failure(ChunkFailure {
                index: i + 1,
                kind: *kind,
                message: "failed".to_string(),
                remediation: None,
            });
        }
        summary
    }

    #[test]
    fn test_exit_code_complete_run() {
        assert_eq!(exit_status(&summary_with(3, &[])), 0);
    }

    #[test]
    fn test_exit_code_partial_run() {
        assert_eq!(exit_status(&summary_with(2, &[FailureKind::Transient])), 2);
        assert_eq!(exit_status(&summary_with(1, &[FailureKind::Fatal])), 2);
        assert_eq!(exit_status(&summary_with(1, &[FailureKind::Rejected])), 2);
    }

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("Hello world.", 60), "Hello world.");
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("one two three", 8), "one two...");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "pdf-audio",
            "book.pdf",
            "--start-chunk",
            "2",
            "--max-chunks",
            "2",
            "--delay-ms",
            "0",
            "--format",
            "pcm",
        ])
        .unwrap();
        assert_eq!(args.pdf_file, Some(PathBuf::from("book.pdf")));
        assert_eq!(args.start_chunk, 2);
        assert_eq!(args.max_chunks, Some(2));
        assert_eq!(args.delay_ms, Some(0));
        assert_eq!(args.format.as_deref(), Some("pcm"));
        assert!(!args.dry_run);
    }

    #[test]
    fn test_config_subcommand_parse() {
        let args = Args::try_parse_from(["pdf-audio", "config", "set-chunk-size", "1500"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Config {
                action: ConfigAction::SetChunkSize { value: 1500 }
            })
        ));
    }
}
