use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::hooks::media::{progress_into, publish};
use crate::hooks::{Feature, HookContext, OperationHook};

pub const PALETTE_OUT: &str = "palette.png";
pub const GIF_OUT: &str = "out.gif";

/// Two-pass GIF conversion: generate a palette, then encode with it
///
/// The second pass reads the palette the first pass left in engine storage,
/// so the passes run strictly one after the other. The palette is removed
/// from storage once the second pass has finished.
pub struct GifHook {
    input: String,
    scale: String,
    fps: u32,
}

impl GifHook {
    pub fn new<S: Into<String>>(input: S, scale: S, fps: u32) -> Self {
        Self {
            input: input.into(),
            scale: scale.into(),
            fps,
        }
    }

    pub fn palette_args(&self) -> Vec<String> {
        [
            "-v", "warning",
            "-i", self.input.as_str(),
            "-vf", "palettegen",
            "-y", PALETTE_OUT,
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
    }

    pub fn encode_args(&self) -> Vec<String> {
        let filter = format!(
            "fps={},scale={}:flags=lanczos [x]; [x][1:v] paletteuse=dither=bayer:bayer_scale=5:diff_mode=rectangle",
            self.fps, self.scale
        );
        [
            "-v", "warning",
            "-i", self.input.as_str(),
            "-i", PALETTE_OUT,
            "-lavfi", filter.as_str(),
            "-y", GIF_OUT,
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
    }
}

#[async_trait]
impl OperationHook for GifHook {
    fn feature(&self) -> Feature {
        Feature::Gif
    }

    async fn run(&self, ctx: &HookContext<'_>) -> Result<()> {
        ctx.invoker.invoke(self.palette_args(), progress_into(ctx.slot)).await?;
        debug!("Palette generated, encoding GIF");

        let encoded = ctx.invoker.invoke(self.encode_args(), progress_into(ctx.slot)).await;
        if let Err(e) = ctx.invoker.engine().unlink(PALETTE_OUT) {
            warn!("Could not remove {} from engine storage: {}", PALETTE_OUT, e);
        }
        encoded?;

        publish(ctx.invoker.engine().as_ref(), ctx.output_dir, GIF_OUT, ctx.slot).await?;
        Ok(())
    }
}
