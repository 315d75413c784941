use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::hooks::Feature;

/// Text captured from a help/version/license invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextResult {
    pub value: String,
}

/// Media produced by an invocation
///
/// While `loaded` is false, `display_ref` holds the latest progress message;
/// once loaded it holds the path of the exported file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaResult {
    pub loaded: bool,
    pub display_ref: String,
}

/// What a feature currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureOutput {
    Text(TextResult),
    Media(MediaResult),
}

impl FeatureOutput {
    pub fn is_loaded(&self) -> bool {
        match self {
            FeatureOutput::Text(text) => !text.value.is_empty(),
            FeatureOutput::Media(media) => media.loaded,
        }
    }
}

/// Shared, observable state of one feature
///
/// Media slots move from not-loaded to loaded exactly once; progress and
/// completions arriving after that are ignored.
#[derive(Debug, Clone)]
pub struct FeatureSlot {
    feature: Feature,
    state: Arc<Mutex<FeatureOutput>>,
}

impl FeatureSlot {
    pub fn new(feature: Feature) -> Self {
        let initial = if feature.is_media() {
            FeatureOutput::Media(MediaResult::default())
        } else {
            FeatureOutput::Text(TextResult::default())
        };
        Self {
            feature,
            state: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    pub fn snapshot(&self) -> FeatureOutput {
        self.state().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.state().is_loaded()
    }

    pub fn set_text(&self, value: String) {
        if let FeatureOutput::Text(text) = &mut *self.state() {
            text.value = value;
        }
    }

    /// Show an in-flight progress message; false once the slot is loaded
    pub fn progress(&self, message: &str) -> bool {
        match &mut *self.state() {
            FeatureOutput::Media(media) if !media.loaded => {
                media.display_ref = message.to_string();
                true
            }
            _ => false,
        }
    }

    /// Mark the media loaded; false if it already was
    pub fn complete(&self, display_ref: String) -> bool {
        match &mut *self.state() {
            FeatureOutput::Media(media) if !media.loaded => {
                media.loaded = true;
                media.display_ref = display_ref;
                true
            }
            _ => {
                debug!("Ignoring repeated completion of {}", self.feature);
                false
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, FeatureOutput> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_slot_loads_once() {
        let slot = FeatureSlot::new(Feature::Resize);
        assert!(slot.progress("frame=10"));
        assert!(!slot.is_loaded());

        assert!(slot.complete("out/resized.mp4".to_string()));
        assert!(!slot.progress("frame=11"));
        assert!(!slot.complete("elsewhere.mp4".to_string()));

        assert_eq!(
            slot.snapshot(),
            FeatureOutput::Media(MediaResult {
                loaded: true,
                display_ref: "out/resized.mp4".to_string()
            })
        );
    }

    #[test]
    fn test_text_slot() {
        let slot = FeatureSlot::new(Feature::Version);
        assert!(!slot.is_loaded());
        assert!(!slot.progress("ignored"));

        slot.set_text("ffmpeg version 6.0".to_string());
        assert!(slot.is_loaded());
    }

    #[test]
    fn test_clones_share_state() {
        let slot = FeatureSlot::new(Feature::Gif);
        let observer = slot.clone();
        slot.progress("palettegen");
        assert_eq!(
            observer.snapshot(),
            FeatureOutput::Media(MediaResult { loaded: false, display_ref: "palettegen".to_string() })
        );
    }
}
