use rawparse_frame::ConfigError;
use rawparse_video::VideoParse;

use crate::cmd::{parse_stream, VideoArgs};
use crate::exit::{config_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: VideoArgs, format: OutputFormat) -> CliResult<i32> {
    let parse = VideoParse::new();
    configure(&parse, &args)?;
    parse_stream(&*parse, &args.input, format)
}

fn configure(parse: &VideoParse, args: &VideoArgs) -> CliResult<()> {
    if let Some(pixel_format) = args.pixel_format {
        property("--pixel-format", parse.set_format(pixel_format))?;
    }
    if let Some(width) = args.width {
        property("--width", parse.set_width(width))?;
    }
    if let Some(height) = args.height {
        property("--height", parse.set_height(height))?;
    }
    if let Some(framerate) = args.framerate {
        property("--framerate", parse.set_framerate(framerate))?;
    }
    if let Some(par) = args.pixel_aspect_ratio {
        property("--pixel-aspect-ratio", parse.set_pixel_aspect_ratio(par))?;
    }
    property("--interlaced", parse.set_interlaced(args.interlaced))?;
    property(
        "--top-field-first",
        parse.set_top_field_first(args.top_field_first),
    )?;
    if let Some(frame_stride) = args.frame_stride {
        property("--frame-stride", parse.set_frame_stride(frame_stride))?;
    }
    Ok(())
}

fn property(flag: &str, result: Result<bool, ConfigError>) -> CliResult<()> {
    result.map(|_| ()).map_err(|err| config_error(flag, err))
}
