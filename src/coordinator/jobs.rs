//! Off-loop work the coordinator can start
//!
//! Anything that may block (decoding, the file picker, screen capture) runs
//! elsewhere and reports back through the worker queue.

use std::path::PathBuf;

pub trait Jobs {
    /// Decode `path` into frames of `width`x`height`; posts `FramesDecoded`
    /// tagged with `generation`
    fn decode_source(&mut self, generation: u64, path: PathBuf, width: u32, height: u32);

    /// Ask the user for a new source; posts `SourcePicked`
    fn pick_source(&mut self);

    /// Wake the wallpaper sampler now
    fn request_sample(&mut self);
}
