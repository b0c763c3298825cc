//! Read padded GRAY8 frames from a file and count them.
//!
//! Run with:
//!   cargo run -p rawparse --example video-frames -- input.gray
//!
//! Without an argument a small padded stream is generated in memory.

use std::fs::File;
use std::io::{Cursor, Read};

use rawparse::caps::Fraction;
use rawparse::frame::{FrameReader, ParseEvent};
use rawparse::video::{VideoFormat, VideoParse};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let parse = VideoParse::new();
    parse.set_format(VideoFormat::GRAY8)?;
    parse.set_width(16)?;
    parse.set_height(8)?;
    parse.set_framerate(Fraction::new(30, 1))?;
    // 128-byte images stored every 160 bytes.
    parse.set_frame_stride(160)?;

    let input: Box<dyn Read> = match std::env::args().nth(1) {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(Cursor::new(vec![0u8; 160 * 10])),
    };

    let mut reader = FrameReader::new(input, &*parse);
    let mut frames = 0;
    while let Some(event) = reader.read_event()? {
        if let ParseEvent::Frames(batch) = event {
            frames += batch.num_frames;
            println!("frame {} pts={:?}", frames, batch.pts);
        }
    }
    eprintln!("{frames} frames, {} bytes dropped", reader.dropped_bytes());
    Ok(())
}
