use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::engine::Engine;
use crate::error::{HookError, Result};
use crate::hooks::{Feature, HookContext, OperationHook};
use crate::presentation::FeatureSlot;
use crate::runner::RunOptions;

pub const THUMBNAIL_OUT: &str = "out.jpg";
pub const AUDIO_OUT: &str = "out.mp3";

/// Options that mirror every signal record into the slot as progress text
pub(crate) fn progress_into(slot: &FeatureSlot) -> RunOptions {
    let slot = slot.clone();
    RunOptions::default().on_progress(move |record| {
        if !record.message.is_empty() {
            slot.progress(&record.message);
        }
    })
}

/// File name a feature's media is exported under, e.g. `thumbnail.jpg`
pub fn export_name(feature: Feature, storage_name: &str) -> String {
    match feature.media_kind() {
        Some(kind) => format!("{}.{}", feature, kind.extension()),
        None => storage_name.to_string(),
    }
}

/// Read `storage_name` back out of the engine, export it to `output_dir`
/// and mark the slot loaded with the exported path
pub(crate) async fn publish(
    engine: &dyn Engine,
    output_dir: &Path,
    storage_name: &str,
    slot: &FeatureSlot,
) -> Result<String> {
    let bytes = engine.read_file(storage_name)?;
    if bytes.is_empty() {
        return Err(HookError::OutputMissing {
            feature: slot.feature().to_string(),
            name: storage_name.to_string(),
        }.into());
    }

    let path = output_dir.join(export_name(slot.feature(), storage_name));
    let publish_failed = |e: std::io::Error| HookError::PublishFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    };
    tokio::fs::create_dir_all(output_dir).await.map_err(publish_failed)?;
    tokio::fs::write(&path, &bytes).await.map_err(publish_failed)?;

    let display_ref = path.display().to_string();
    if slot.complete(display_ref.clone()) {
        info!("{} ready: {} ({} bytes)", slot.feature(), display_ref, bytes.len());
    }
    Ok(display_ref)
}

/// Extracts a single scaled frame as JPEG
pub struct ThumbnailHook {
    input: String,
    scale: String,
    timestamp: String,
}

impl ThumbnailHook {
    pub fn new<S: Into<String>>(input: S, scale: S, timestamp: S) -> Self {
        Self {
            input: input.into(),
            scale: scale.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.input.clone(),
            "-ss".to_string(),
            self.timestamp.clone(),
            "-vframes".to_string(),
            "1".to_string(),
            "-filter:v".to_string(),
            format!("scale={}", self.scale),
            THUMBNAIL_OUT.to_string(),
        ]
    }
}

#[async_trait]
impl OperationHook for ThumbnailHook {
    fn feature(&self) -> Feature {
        Feature::Thumbnail
    }

    async fn run(&self, ctx: &HookContext<'_>) -> Result<()> {
        ctx.invoker.invoke(self.args(), progress_into(ctx.slot)).await?;
        publish(ctx.invoker.engine().as_ref(), ctx.output_dir, THUMBNAIL_OUT, ctx.slot).await?;
        Ok(())
    }
}

/// Transcodes the input's audio track to MP3
pub struct AudioHook {
    input: String,
}

impl AudioHook {
    pub fn new<S: Into<String>>(input: S) -> Self {
        Self { input: input.into() }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "-v".to_string(),
            "warning".to_string(),
            "-i".to_string(),
            self.input.clone(),
            AUDIO_OUT.to_string(),
        ]
    }
}

#[async_trait]
impl OperationHook for AudioHook {
    fn feature(&self) -> Feature {
        Feature::Audio
    }

    async fn run(&self, ctx: &HookContext<'_>) -> Result<()> {
        ctx.invoker.invoke(self.args(), progress_into(ctx.slot)).await?;
        publish(ctx.invoker.engine().as_ref(), ctx.output_dir, AUDIO_OUT, ctx.slot).await?;
        Ok(())
    }
}
