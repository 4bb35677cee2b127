use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use console::Style;

use sketchrender::channel::ChannelClient;
use sketchrender::cli::{Cli, Command};
use sketchrender::config::SketchrenderConfig;
use sketchrender::gallery::{GalleryStore, SheetGallery};
use sketchrender::kie::KieClient;
use sketchrender::orchestrator::{RunOrchestrator, RunTiming};
use sketchrender::providers::{GenerationRequest, Provider, Z_IMAGE_PROMPT_LIMIT};
use sketchrender::ui;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SketchrenderConfig::load()?;

    match cli.command {
        Command::Run {
            images,
            prompt,
            prompt_file,
            strength,
            resolution,
            aspect_ratio,
            engines,
        } => {
            let prompt = resolve_prompt(prompt, prompt_file)?;
            if !(0.0..=1.0).contains(&strength) {
                bail!("--strength must be between 0.0 and 1.0, got {strength}");
            }

            let mut providers: Vec<Provider> = Vec::new();
            for engine in engines {
                let provider = Provider::from(engine);
                if !providers.contains(&provider) {
                    providers.push(provider);
                }
            }

            if providers.contains(&Provider::ZImage)
                && prompt.chars().count() > Z_IMAGE_PROMPT_LIMIT
            {
                eprintln!(
                    "{} prompt exceeds {Z_IMAGE_PROMPT_LIMIT} characters and will be truncated for z-image",
                    Style::new().yellow().apply_to("warning:")
                );
            }

            let request = GenerationRequest {
                prompt,
                strength,
                resolution: resolution.into(),
                aspect_ratio: aspect_ratio.as_tag().to_string(),
                providers,
            };
            let paths: Vec<PathBuf> = images.iter().map(PathBuf::from).collect();

            let report = build_orchestrator(&config)?.run(&paths, &request).await?;
            if cli.verbose {
                eprintln!("run {} finished: {:?}", report.run_id, report.outcome);
            }
            Ok(())
        }

        Command::Gallery { limit } => {
            let Some(endpoint) = config.gallery_url.clone() else {
                bail!("no gallery_url configured in sketchrender.toml");
            };
            let store = SheetGallery::new(endpoint);
            let entries = store
                .list_recent(limit)
                .await
                .context("could not fetch gallery entries")?;
            ui::print_gallery(&entries);
            Ok(())
        }
    }
}

fn resolve_prompt(prompt: Option<String>, prompt_file: Option<String>) -> Result<String> {
    let text = match (prompt, prompt_file) {
        (Some(p), _) => p,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("could not read prompt file {path}"))?,
        (None, None) => bail!("either --prompt or --prompt-file is required"),
    };
    if text.trim().is_empty() {
        bail!("prompt must not be empty");
    }
    Ok(text)
}

fn build_orchestrator(config: &SketchrenderConfig) -> Result<RunOrchestrator> {
    if config.api_key.is_empty() {
        bail!("no API key: set KIEAI_API_KEY or api_key in sketchrender.toml");
    }

    let kie = match (&config.api_base_url, &config.upload_base_url) {
        (Some(api), Some(upload)) => {
            KieClient::with_base_urls(config.api_key.clone(), api.clone(), upload.clone())
        }
        _ => KieClient::new(config.api_key.clone()),
    };

    let channel = match &config.relay_base_url {
        Some(relay) => ChannelClient::with_base_url(relay.clone()),
        None => ChannelClient::new(),
    };

    let gallery = config.gallery_url.clone().map(SheetGallery::new);

    let timing = RunTiming {
        poll_interval: Duration::from_millis(config.poll_interval_ms),
        image_ceiling: Duration::from_secs(config.image_timeout_secs),
        video_ceiling: Duration::from_secs(config.video_timeout_secs),
    };

    Ok(RunOrchestrator::new(kie, channel, gallery, timing))
}
