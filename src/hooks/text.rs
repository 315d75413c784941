use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::hooks::{Feature, HookContext, OperationHook};
use crate::runner::RunOptions;

/// Captures the standard output of a fixed-flag invocation as text
pub struct TextHook {
    feature: Feature,
    args: &'static [&'static str],
}

impl TextHook {
    pub fn help() -> Self {
        Self { feature: Feature::Help, args: &["--help", "long"] }
    }

    pub fn version() -> Self {
        Self { feature: Feature::Version, args: &["-version"] }
    }

    pub fn license() -> Self {
        Self { feature: Feature::License, args: &["-L"] }
    }

    pub fn args(&self) -> &'static [&'static str] {
        self.args
    }
}

#[async_trait]
impl OperationHook for TextHook {
    fn feature(&self) -> Feature {
        self.feature
    }

    async fn run(&self, ctx: &HookContext<'_>) -> Result<()> {
        let result = ctx
            .invoker
            .invoke(self.args.iter().copied(), RunOptions::default())
            .await?;

        // Error output alongside a successful run is only a warning
        if result.has_errors() {
            warn!("{} wrote to stderr:\n{}", self.feature, result.err_text());
        }

        let text = result.out_text();
        info!("{}: captured {} lines", self.feature, text.lines().count());
        ctx.slot.set_text(text);
        Ok(())
    }
}
