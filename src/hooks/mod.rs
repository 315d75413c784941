//! # Operation Hooks
//!
//! One hook per showcased feature. Each hook is an orchestration recipe over
//! [`RunInvoker`](crate::runner::RunInvoker): it issues one or more
//! invocations, projects the result into its [`FeatureSlot`] and reports
//! progress into that slot while invocations are in flight.
//!
//! ## Built-in Hooks
//!
//! - **help / version / license**: text captured from standard output
//! - **thumbnail**: a single JPEG frame
//! - **audio**: the audio track as MP3
//! - **gif**: two-pass palette generation and palette use
//! - **resize**: a scaled MP4, completed on the end sentinel

pub mod registry;
pub mod text;
pub mod media;
pub mod gif;
pub mod resize;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    presentation::FeatureSlot,
    runner::RunInvoker,
};

pub use registry::HookRegistry;
pub use text::TextHook;
pub use media::{AudioHook, ThumbnailHook};
pub use gif::GifHook;
pub use resize::ResizeHook;

/// The showcased engine operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Help,
    Version,
    License,
    Thumbnail,
    Audio,
    Gif,
    Resize,
}

impl Feature {
    /// Canonical execution order
    pub const ALL: [Feature; 7] = [
        Feature::Help,
        Feature::Version,
        Feature::License,
        Feature::Thumbnail,
        Feature::Audio,
        Feature::Gif,
        Feature::Resize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Help => "help",
            Feature::Version => "version",
            Feature::License => "license",
            Feature::Thumbnail => "thumbnail",
            Feature::Audio => "audio",
            Feature::Gif => "gif",
            Feature::Resize => "resize",
        }
    }

    /// Kind of media the feature produces, if it produces media at all
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self {
            Feature::Help | Feature::Version | Feature::License => None,
            Feature::Thumbnail => Some(MediaKind::Jpeg),
            Feature::Audio => Some(MediaKind::Mpeg),
            Feature::Gif => Some(MediaKind::Gif),
            Feature::Resize => Some(MediaKind::Mp4),
        }
    }

    pub fn is_media(&self) -> bool {
        self.media_kind().is_some()
    }

    /// Sort and deduplicate a selection into canonical order
    pub fn canonical(selection: &[Feature]) -> Vec<Feature> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|feature| selection.contains(feature))
            .collect()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
                format!("unknown feature '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Media produced by a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Jpeg,
    Mpeg,
    Gif,
    Mp4,
}

impl MediaKind {
    pub fn mime(&self) -> &'static str {
        match self {
            MediaKind::Jpeg => "image/jpeg",
            MediaKind::Mpeg => "audio/mpeg",
            MediaKind::Gif => "image/gif",
            MediaKind::Mp4 => "video/mp4",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Jpeg => "jpg",
            MediaKind::Mpeg => "mp3",
            MediaKind::Gif => "gif",
            MediaKind::Mp4 => "mp4",
        }
    }
}

/// Everything a hook needs while it runs
pub struct HookContext<'a> {
    pub invoker: &'a RunInvoker,
    pub slot: &'a FeatureSlot,
    /// Directory produced media is exported to
    pub output_dir: &'a Path,
}

/// Core trait every showcased operation implements
#[async_trait]
pub trait OperationHook: Send + Sync {
    /// The feature this hook drives
    fn feature(&self) -> Feature;

    /// Run the operation to completion, publishing into `ctx.slot`
    ///
    /// Returns once the result is published. Engine failures are returned
    /// unchanged; the slot then stays in its loading state.
    async fn run(&self, ctx: &HookContext<'_>) -> Result<()>;
}
