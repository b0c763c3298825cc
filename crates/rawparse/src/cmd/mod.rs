use clap::{Args, Subcommand};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use rawparse_audio::{AudioParseFormat, PcmFormat};
use rawparse_caps::{Caps, Fraction};
use rawparse_frame::reader::DEFAULT_CHUNK_SIZE;
use rawparse_frame::{FrameReader, ParseEvent, RawParse, RawParser, ReaderConfig};
use rawparse_video::VideoFormat;

use crate::exit::{caps_error, config_error, frame_error, io_error, CliResult, SUCCESS};
use crate::output::{EventPrinter, OutputFormat};

pub mod audio;
pub mod caps;
pub mod envinfo;
pub mod version;
pub mod video;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a raw audio file into sample-frame batches.
    Audio(AudioArgs),
    /// Split a raw video file into frames.
    Video(VideoArgs),
    /// Validate a descriptor and show the configuration it describes.
    Caps(CapsArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Audio(args) => audio::run(args, format),
        Command::Video(args) => video::run(args, format),
        Command::Caps(args) => caps::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Raw input file, or `-` for stdin.
    pub path: PathBuf,
    /// Parse with this descriptor instead of the property flags.
    #[arg(long, value_name = "CAPS")]
    pub caps: Option<String>,
    /// Bytes requested per read.
    #[arg(long, env = "RAWPARSE_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
    /// Stop after N frame batches.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct AudioArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Sample encoding (pcm, alaw, mulaw).
    #[arg(long, value_name = "FORMAT")]
    pub audio_format: Option<AudioParseFormat>,
    /// PCM sample format, e.g. S16LE or F32BE.
    #[arg(long, value_name = "FORMAT")]
    pub pcm_format: Option<PcmFormat>,
    /// Sample rate in Hz.
    #[arg(long)]
    pub rate: Option<u32>,
    /// Number of channels.
    #[arg(long)]
    pub channels: Option<u32>,
    /// Channels are stored one after another instead of interleaved.
    #[arg(long)]
    pub non_interleaved: bool,
    /// Comma-separated channel positions, e.g. FL,FR,LFE1.
    #[arg(long, value_name = "LIST")]
    pub channel_positions: Option<String>,
}

#[derive(Args, Debug)]
pub struct VideoArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Pixel format, e.g. I420 or RGBA.
    #[arg(long, value_name = "FORMAT")]
    pub pixel_format: Option<VideoFormat>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    /// Frames per second as N or N/D; 0/1 disables timestamps.
    #[arg(long, value_parser = parse_fraction)]
    pub framerate: Option<Fraction>,
    /// Pixel aspect ratio as N/D.
    #[arg(long, value_parser = parse_fraction)]
    pub pixel_aspect_ratio: Option<Fraction>,
    #[arg(long)]
    pub interlaced: bool,
    #[arg(long, requires = "interlaced")]
    pub top_field_first: bool,
    /// Distance between frame starts in bytes.
    #[arg(long)]
    pub frame_stride: Option<usize>,
}

#[derive(Args, Debug)]
pub struct CapsArgs {
    /// Descriptor text, or its JSON form.
    pub descriptor: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}

pub(crate) fn parse_fraction(s: &str) -> Result<Fraction, String> {
    let (numer, denom) = s.split_once('/').unwrap_or((s, "1"));
    let numer: i32 = numer
        .trim()
        .parse()
        .map_err(|err| format!("invalid numerator '{numer}': {err}"))?;
    let denom: i32 = denom
        .trim()
        .parse()
        .map_err(|err| format!("invalid denominator '{denom}': {err}"))?;
    Ok(Fraction::new(numer, denom))
}

/// Feed the input through `parse` and print every event.
pub(crate) fn parse_stream<P: RawParser>(
    parse: &RawParse<P>,
    input: &InputArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    if let Some(descriptor) = &input.caps {
        let caps: Caps = descriptor
            .parse()
            .map_err(|err| caps_error("invalid --caps", err))?;
        parse.set_prefer_negotiated(true);
        parse
            .set_sink_caps(&caps)
            .map_err(|err| config_error("rejected --caps", err))?;
    }

    let source = open_input(&input.path)?;
    let config = ReaderConfig {
        chunk_size: input.chunk_size,
    };
    let mut reader = FrameReader::with_config(source, parse, config);
    let mut printer = EventPrinter::new(format);

    while let Some(event) = reader
        .read_event()
        .map_err(|err| frame_error("parse failed", err))?
    {
        printer.event(&event);
        let done = matches!(event, ParseEvent::Frames(_))
            && input.count.is_some_and(|n| printer.totals().batches >= n);
        if done {
            break;
        }
    }

    let totals = printer.finish(reader.dropped_bytes());
    tracing::info!(
        path = %input.path.display(),
        batches = totals.batches,
        frames = totals.frames,
        dropped = totals.dropped_bytes,
        "parse finished"
    );
    Ok(SUCCESS)
}

fn open_input(path: &Path) -> CliResult<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path)
        .map_err(|err| io_error(&format!("cannot open {}", path.display()), err))?;
    Ok(Box::new(file))
}
