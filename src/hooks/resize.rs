use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::engine::END_SENTINEL;
use crate::error::Result;
use crate::hooks::media::publish;
use crate::hooks::{Feature, HookContext, OperationHook};
use crate::runner::RunOptions;

pub const RESIZE_OUT: &str = "out.mp4";

/// Rescales the input video
///
/// The invocation's own completion does not reliably settle on this call
/// path, so the end marker seen by the progress callback is treated as the
/// real completion signal. The check is a plain substring match on the log
/// text and breaks if the engine ever changes that text. If the output
/// cannot be read back at the marker, the hook waits for the invocation to
/// settle and reads it again.
pub struct ResizeHook {
    input: String,
    scale: String,
}

impl ResizeHook {
    pub fn new<S: Into<String>>(input: S, scale: S) -> Self {
        Self {
            input: input.into(),
            scale: scale.into(),
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "-v".to_string(),
            "warning".to_string(),
            "-i".to_string(),
            self.input.clone(),
            "-vf".to_string(),
            format!("scale={}", self.scale),
            RESIZE_OUT.to_string(),
        ]
    }
}

#[async_trait]
impl OperationHook for ResizeHook {
    fn feature(&self) -> Feature {
        Feature::Resize
    }

    async fn run(&self, ctx: &HookContext<'_>) -> Result<()> {
        let engine = ctx.invoker.engine().as_ref();
        let slot = ctx.slot.clone();
        let (ended_tx, mut ended_rx) = oneshot::channel::<()>();
        let mut ended_tx = Some(ended_tx);

        let options = RunOptions::default().on_progress(move |record| {
            if record.message.contains(END_SENTINEL) {
                if let Some(tx) = ended_tx.take() {
                    let _ = tx.send(());
                }
            } else if !record.message.is_empty() {
                slot.progress(&record.message);
            }
        });

        let invocation = ctx.invoker.invoke(self.args(), options);
        tokio::pin!(invocation);

        // The marker is checked first; once the callback is dropped the
        // receiver errors out and only the invocation branch remains
        let at_marker = tokio::select! {
            biased;
            Ok(()) = &mut ended_rx => Some(publish(engine, ctx.output_dir, RESIZE_OUT, ctx.slot).await),
            settled = &mut invocation => {
                settled?;
                None
            }
        };

        match at_marker {
            Some(Ok(display_ref)) => {
                info!("Resize finished on end marker before the invocation settled: {}", display_ref);
            }
            Some(Err(e)) => {
                warn!("Resized output not readable at the end marker ({}), waiting for the invocation", e);
                invocation.await?;
                publish(engine, ctx.output_dir, RESIZE_OUT, ctx.slot).await?;
            }
            None => {
                publish(engine, ctx.output_dir, RESIZE_OUT, ctx.slot).await?;
            }
        }

        debug!("Resize hook done");
        Ok(())
    }
}
