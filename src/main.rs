//! Redub - Simulated Movie Audio Translation Pipeline
//!
//! Entry point for the `redub` command line: runs the pipeline with live
//! progress bars, manages saved projects and serves the placeholder
//! translation endpoint.

use anyhow::{bail, Result};
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use redub::cli::{Args, Commands, ProjectAction};
use redub::media::Track;
use redub::config::Config;
use redub::pipeline::Orchestrator;
use redub::project::ProjectStore;
use redub::server;
use redub::stage::{ProgressEvent, Stage};
use redub::synthesize::{Synthesizer, SynthesizerFactory};
use redub::translate::{Translator, TranslatorFactory, LANGUAGES};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;
    info!("Starting Redub - Simulated Movie Audio Translation");

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("redub.toml").exists() {
                info!("Found redub.toml in current directory, loading...");
                Config::from_file("redub.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Run {
            input,
            target_lang,
            export_dir,
            save,
            original_volume,
            translated_volume,
            play,
        } => {
            let mut orchestrator = Orchestrator::from_config(config.clone())?;
            if let Some(code) = target_lang {
                orchestrator.set_target_language(&code);
            }
            if let Some(volume) = original_volume {
                orchestrator.set_volume(Track::Original, volume);
            }
            if let Some(volume) = translated_volume {
                orchestrator.set_volume(Track::Translated, volume);
            }

            let renderer = ProgressRenderer::spawn(orchestrator.subscribe());
            if let Err(e) = orchestrator.select_video(&input) {
                renderer.finish().await;
                bail!("{} ({})", e.user_message(), e);
            }
            orchestrator.settle().await;
            if play {
                orchestrator.toggle_playback();
            }

            let exported = match export_dir {
                Some(dir) => orchestrator.export(&dir).await.ok(),
                None => None,
            };
            renderer.finish().await;

            print_summary(&orchestrator);
            if let Some(artifact) = exported {
                println!("\nExported {} ({})", artifact.path.display(), artifact.media_type);
            }

            if let Some(name) = save {
                let mut store = ProjectStore::open(&config.storage).await?;
                let key = orchestrator.save_project(&mut store, &name).await?;
                println!("Saved project as '{}'", key);
            }

            if let Some(message) = orchestrator.state().error {
                bail!("{}", message);
            }
        }
        Commands::Languages => {
            println!("{:<6} {:<22} {}", "Code", "Language", "Sample");
            println!("{}", "-".repeat(80));
            for language in LANGUAGES.iter() {
                println!("{:<6} {:<22} {}", language.code, language.name, language.sample);
            }
        }
        Commands::Translate { text, target_lang } => {
            let translator = TranslatorFactory::create_translator(
                &config.translate,
                &config.stages.translation,
            )?;
            let translated = translator.translate(&text, &target_lang).await?;
            println!("{}", translated);
        }
        Commands::Synthesize { text, target_lang, output } => {
            let synthesizer = SynthesizerFactory::create_default(&config.stages.synthesis);
            let buffer = synthesizer.synthesize(&text, &target_lang).await?;
            tokio::fs::write(&output, buffer.as_bytes()).await?;
            println!("Wrote {} bytes to {}", buffer.len(), output.display());
        }
        Commands::Project { action } => match action {
            ProjectAction::List => {
                let store = ProjectStore::open(&config.storage).await?;
                let projects = store.list();
                if projects.is_empty() {
                    println!("No saved projects.");
                } else {
                    println!("{:<30} {:<25}", "Name", "Saved");
                    println!("{}", "-".repeat(55));
                    for project in projects {
                        println!(
                            "{:<30} {:<25}",
                            project.name,
                            project.updated_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
                        );
                    }
                }
            }
            ProjectAction::Show { name } => {
                let store = ProjectStore::open(&config.storage).await?;
                let project = store.get(&name)?;
                println!("{}", serde_json::to_string_pretty(&project)?);
            }
            ProjectAction::Load { file, export_dir } => {
                let mut orchestrator = Orchestrator::from_config(config.clone())?;
                let renderer = ProgressRenderer::spawn(orchestrator.subscribe());
                if let Err(e) = orchestrator.load_project_file(&file).await {
                    renderer.finish().await;
                    bail!("{} ({})", e.user_message(), e);
                }
                orchestrator.settle().await;
                if let Some(dir) = export_dir {
                    if let Ok(artifact) = orchestrator.export(&dir).await {
                        println!("Exported {}", artifact.path.display());
                    }
                }
                renderer.finish().await;

                print_summary(&orchestrator);
                if let Some(message) = orchestrator.state().error {
                    bail!("{}", message);
                }
            }
        },
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or(config.server.bind);
            server::serve(addr).await?;
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

fn print_summary(orchestrator: &Orchestrator) {
    let state = orchestrator.state();

    println!();
    println!("Overall progress: {}%", state.progress());
    if let Some(video) = &state.video {
        println!("Video: {} ({})", video.name, video.handle);
    }
    println!("Target language: {}", state.target_language);
    println!(
        "Volumes: original {}%, translated {}%",
        state.mix_settings.original_volume, state.mix_settings.translated_volume
    );
    println!("\nOriginal Transcript\n{}", state.transcript);
    println!("\nTranslated Text\n{}", state.translated_text);
    if let Some(buffer) = &state.synthesized {
        println!("\nSynthesized audio: {} bytes", buffer.len());
    }
    if let Some(mixed) = &state.mixed {
        println!("Mixed audio: {} ({})", mixed.handle, mixed.media_type);
    }
    if let Some(playback) = orchestrator.playback() {
        println!("Playback: {:?}", playback.state());
    }
}

/// Renders one progress bar per stage from orchestrator progress events.
struct ProgressRenderer {
    handle: JoinHandle<()>,
}

impl ProgressRenderer {
    fn spawn(mut rx: broadcast::Receiver<ProgressEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let multi = MultiProgress::new();
            let style = ProgressStyle::with_template("{prefix:>14} [{bar:40}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            let mut bars: HashMap<Stage, ProgressBar> = HashMap::new();

            loop {
                let event = match rx.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                match event {
                    ProgressEvent::Started(stage) => {
                        let bar = multi.add(ProgressBar::new(100));
                        bar.set_style(style.clone());
                        bar.set_prefix(stage.to_string());
                        if let Some(old) = bars.insert(stage, bar) {
                            old.abandon_with_message("superseded");
                        }
                    }
                    ProgressEvent::Advanced { stage, percent } => {
                        if let Some(bar) = bars.get(&stage) {
                            bar.set_position(percent as u64);
                        }
                    }
                    ProgressEvent::Finished(stage) => {
                        if let Some(bar) = bars.remove(&stage) {
                            bar.finish_with_message("done");
                        }
                    }
                    ProgressEvent::Failed { stage, message } => {
                        if let Some(bar) = bars.remove(&stage) {
                            bar.abandon_with_message(message);
                        }
                    }
                    ProgressEvent::Overall(percent) => {
                        multi.println(format!("Overall progress: {}%", percent)).ok();
                    }
                }
            }
        });
        Self { handle }
    }

    async fn finish(self) {
        // Let queued events render before tearing the bars down
        tokio::task::yield_now().await;
        self.handle.abort();
        let _ = self.handle.await;
    }
}

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".redub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "redub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::WARN };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
