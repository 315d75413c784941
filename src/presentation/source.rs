use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::engine::{Channel, LogRecord};

/// What is known about the staged sample video
///
/// Dimensions are taken from the first video stream ffmpeg reports on its
/// error channel. The input is always described before any output, so the
/// first match wins and later ones are ignored.
#[derive(Debug, Clone, Default)]
pub struct SourceInfo {
    dimensions: Arc<Mutex<Option<(u32, u32)>>>,
}

impl SourceInfo {
    /// Inspect one log record; true if it supplied the dimensions
    pub fn observe(&self, record: &LogRecord) -> bool {
        if record.channel != Channel::Err {
            return false;
        }
        let mut dimensions = self.lock();
        if dimensions.is_some() {
            return false;
        }
        match parse_video_dimensions(&record.message) {
            Some(found) => {
                debug!("Sample video is {}x{}", found.0, found.1);
                *dimensions = Some(found);
                true
            }
            None => false,
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, Option<(u32, u32)>> {
        self.dimensions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Width and height from a stream line such as
/// `Stream #0:0(und): Video: h264 (High), yuv420p, 1280x720 [SAR 1:1 DAR 16:9], 30 fps`
pub fn parse_video_dimensions(line: &str) -> Option<(u32, u32)> {
    let line = line.trim_start();
    if !line.starts_with("Stream #") {
        return None;
    }
    let (_, video) = line.split_once(": Video: ")?;

    video.split(',').find_map(|field| {
        let (width, height) = field.split_whitespace().next()?.split_once('x')?;
        let width: u32 = width.parse().ok()?;
        let height: u32 = height.parse().ok()?;
        (width > 0 && height > 0).then_some((width, height))
    })
}
