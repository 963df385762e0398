// Client subcommands: talk to a running gateway and manage the local gallery
// Author: kelexine (https://github.com/kelexine)

use super::{Command, GalleryAction};
use crate::cache::{CacheEntry, FileStorage, ResultCache};
use crate::client::{encode_image_file, GatewayClient, Studio};
use crate::config::AppConfig;
use crate::connectivity::ConnectivityState;
use crate::models::{ImagePayload, ImageRequest, UpscaleRequest, VideoRequest};
use anyhow::{bail, Context, Result};
use serde_json::{Number, Value};

/// Run a client subcommand. `Serve` is handled by the binary itself.
pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    let client = GatewayClient::new(&config.client)?;
    let gallery = ResultCache::with_capacity(
        FileStorage::new(&config.gallery.path),
        config.gallery.capacity,
    );
    let studio = Studio::new(client, gallery);

    match command {
        Command::Serve => bail!("`serve` is not a client command"),
        Command::Config => print!("{}", config.to_toml()?),
        Command::Status => {
            let state = studio.monitor().probe().await;
            println!("{}: {}", studio.client().base_url(), state);
            if state != ConnectivityState::Connected {
                bail!("gateway is not reachable");
            }
        }
        Command::Models => {
            for model in studio.client().models().await? {
                println!("{:<28} {}", model.id, model.name);
            }
        }
        Command::TestConnection => print_json(&studio.client().test_connection().await?)?,
        Command::Image {
            prompt,
            model,
            width,
            height,
            steps,
            cfg_scale,
        } => {
            let req = ImageRequest {
                model,
                width,
                height,
                steps,
                cfg_scale: Number::from_f64(cfg_scale).context("cfg-scale must be finite")?,
                ..ImageRequest::new(prompt)
            };
            let entry = studio.generate_image(&req).await?;
            print_entry(&entry);
        }
        Command::Video {
            prompt,
            duration,
            quality,
            frame_rate,
            model,
            output_format,
            output_quality,
        } => {
            let mut req = VideoRequest {
                model,
                duration,
                frame_rate,
                output_format,
                output_quality,
                ..VideoRequest::new(prompt)
            };
            if let Some(quality) = quality {
                req = req.with_quality(quality);
            }
            let entry = studio.generate_video(&req).await?;
            print_entry(&entry);
        }
        Command::RemoveBackground { file } => {
            let req = ImagePayload::new(encode_image_file(&file)?);
            print_json(&studio.remove_background(&req).await?)?;
        }
        Command::Upscale { file, scale } => {
            let req = UpscaleRequest::new(encode_image_file(&file)?, scale);
            print_json(&studio.upscale_image(&req).await?)?;
        }
        Command::Caption { file } => {
            let req = ImagePayload::new(encode_image_file(&file)?);
            print_json(&studio.caption_image(&req).await?)?;
        }
        Command::ImageToText { file } => {
            let req = ImagePayload::new(encode_image_file(&file)?);
            print_json(&studio.image_to_text(&req).await?)?;
        }
        Command::Gallery { action } => run_gallery(action, studio.gallery())?,
    }

    Ok(())
}

fn run_gallery(action: GalleryAction, gallery: &ResultCache<FileStorage>) -> Result<()> {
    match action {
        GalleryAction::List => {
            let entries = gallery.load();
            println!(
                "{} item{} in your gallery",
                entries.len(),
                if entries.len() == 1 { "" } else { "s" }
            );
            for entry in &entries {
                print_entry(entry);
            }
        }
        GalleryAction::Show { uuid } => match gallery.get(&uuid) {
            Some(entry) => print_json(&serde_json::to_value(&entry)?)?,
            None => bail!("no gallery entry {}", uuid),
        },
        GalleryAction::Remove { uuid } => {
            if gallery.remove(&uuid)? {
                println!("Removed {}", uuid);
            } else {
                println!("No entry {}", uuid);
            }
        }
        GalleryAction::Clear { yes } => {
            if !yes {
                bail!("refusing to delete all entries without --yes");
            }
            gallery.clear()?;
            println!("Gallery cleared");
        }
    }
    Ok(())
}

fn print_entry(entry: &CacheEntry) {
    let result = &entry.result;
    let when = entry
        .inserted_at()
        .map(|t| t.format("%b %d %H:%M").to_string())
        .unwrap_or_default();
    println!(
        "{}  {:<5}  {:>6.1}s  {}  \"{}\"  {}",
        result.uuid,
        result.kind.envelope_key(),
        result.processing_seconds().unwrap_or(entry.round_trip_seconds),
        when,
        result.prompt.as_deref().unwrap_or(""),
        result.url.as_deref().unwrap_or("-"),
    );
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
