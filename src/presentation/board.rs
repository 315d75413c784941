use std::fmt::Write as _;

use crate::hooks::Feature;
use crate::presentation::{FeatureOutput, FeatureSlot, SourceInfo};

/// All feature slots of one showcase run, rendered as a text report
#[derive(Debug, Clone)]
pub struct FeatureBoard {
    source: SourceInfo,
    slots: Vec<FeatureSlot>,
}

impl FeatureBoard {
    /// One slot per selected feature, in canonical order
    pub fn new(features: &[Feature]) -> Self {
        Self {
            source: SourceInfo::default(),
            slots: Feature::canonical(features).into_iter().map(FeatureSlot::new).collect(),
        }
    }

    pub fn slot(&self, feature: Feature) -> Option<&FeatureSlot> {
        self.slots.iter().find(|slot| slot.feature() == feature)
    }

    /// The sample video panel shown above the features
    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_loaded()).count()
    }

    /// Render every slot; the help text is folded to a summary unless
    /// `expand_help` is set
    pub fn render(&self, expand_help: bool) -> String {
        let mut out = String::new();
        match self.source.dimensions() {
            Some((width, height)) => {
                let _ = writeln!(out, "Original: {}x{}", width, height);
            }
            None => {
                let _ = writeln!(out, "Original: unknown");
            }
        }

        for slot in &self.slots {
            let feature = slot.feature();
            let _ = writeln!(out, "{}", heading(feature));

            match slot.snapshot() {
                FeatureOutput::Text(text) if text.value.is_empty() => {
                    let _ = writeln!(out, "    Loading...");
                }
                FeatureOutput::Text(text) if feature == Feature::Help && !expand_help => {
                    let _ = writeln!(out, "    Show help ({} lines, use --full-help)", text.value.lines().count());
                }
                FeatureOutput::Text(text) => {
                    for line in text.value.lines() {
                        let _ = writeln!(out, "    {}", line);
                    }
                }
                FeatureOutput::Media(media) if media.loaded => {
                    let mime = feature.media_kind().map(|kind| kind.mime()).unwrap_or("application/octet-stream");
                    let _ = writeln!(out, "    {} [{}]", media.display_ref, mime);
                }
                FeatureOutput::Media(media) => {
                    let _ = writeln!(out, "    Loading... {}", media.display_ref);
                }
            }
        }
        out
    }
}

fn heading(feature: Feature) -> &'static str {
    match feature {
        Feature::Help => "Help: ffmpeg --help long",
        Feature::Version => "Version: ffmpeg -version",
        Feature::License => "License: ffmpeg -L",
        Feature::Thumbnail => "Thumbnail:",
        Feature::Audio => "Audio:",
        Feature::Gif => "Gif:",
        Feature::Resize => "Resized video:",
    }
}
