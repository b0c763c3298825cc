//! Split a synthetic 5.1 PCM stream into batches and print each one.
//!
//! Run with:
//!   cargo run -p rawparse --example split-pcm
//!
//! The stream arrives in odd-sized chunks; only whole sample frames come out.

use rawparse::audio::{AudioParse, ChannelPosition as Pos, PcmFormat};
use rawparse::frame::ParseEvent;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let parse = AudioParse::new();
    parse.set_pcm_format(PcmFormat::S16LE)?;
    parse.set_sample_rate(48_000)?;
    parse.set_num_channels(6)?;
    // Source order puts LFE last; output is reordered to canonical order.
    parse.set_channel_positions(Some(&[
        Pos::FrontLeft,
        Pos::FrontRight,
        Pos::FrontCenter,
        Pos::RearLeft,
        Pos::RearRight,
        Pos::Lfe1,
    ]))?;

    let stream: Vec<u8> = (0..12 * 100).map(|i| (i % 251) as u8).collect();
    for chunk in stream.chunks(700) {
        for event in parse.push(chunk)? {
            match event {
                ParseEvent::Caps(caps) => println!("caps: {caps}"),
                ParseEvent::Frames(batch) => println!(
                    "{} frames at {:?} (offset {}, {} bytes)",
                    batch.num_frames,
                    batch.pts,
                    batch.offset,
                    batch.payload.len()
                ),
            }
        }
    }

    let dropped = parse.finish();
    eprintln!("done, {dropped} trailing bytes dropped");
    Ok(())
}
