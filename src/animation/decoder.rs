//! GIF decoding into pre-scaled frames
//!
//! Runs on a blocking task; the result is posted back to the coordinator.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::imageops::{self, FilterType};
use image::AnimationDecoder;
use tracing::debug;

use super::Frame;
use crate::error::LoadError;

/// Decode every frame of `path`, resized to `width`x`height`.
///
/// The end of the frame iterator is the natural end of the animation, not an
/// error. A file that yields no frames is a [`LoadError::NoFrames`].
pub fn decode(path: &Path, width: u32, height: u32) -> Result<Vec<Frame>, LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| decode_error(path, e))?;
    let decoder = GifDecoder::new(BufReader::new(file)).map_err(|e| decode_error(path, e))?;

    let mut frames = Vec::new();
    for frame in decoder.into_frames() {
        let buffer = frame.map_err(|e| decode_error(path, e))?.into_buffer();
        frames.push(imageops::resize(&buffer, width, height, FilterType::Lanczos3));
    }

    if frames.is_empty() {
        return Err(LoadError::NoFrames(path.to_path_buf()));
    }

    debug!("Decoded {} frames from {:?} at {}x{}", frames.len(), path, width, height);
    Ok(frames)
}

fn decode_error(path: &Path, e: impl std::fmt::Display) -> LoadError {
    LoadError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
