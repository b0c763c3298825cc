use rawparse_audio::channel::parse_positions;
use rawparse_audio::AudioParse;
use rawparse_frame::ConfigError;

use crate::cmd::{parse_stream, AudioArgs};
use crate::exit::{config_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub fn run(args: AudioArgs, format: OutputFormat) -> CliResult<i32> {
    let parse = AudioParse::new();
    configure(&parse, &args)?;
    parse_stream(&*parse, &args.input, format)
}

fn configure(parse: &AudioParse, args: &AudioArgs) -> CliResult<()> {
    if let Some(audio_format) = args.audio_format {
        property("--audio-format", parse.set_format(audio_format))?;
    }
    if let Some(pcm_format) = args.pcm_format {
        property("--pcm-format", parse.set_pcm_format(pcm_format))?;
    }
    if let Some(rate) = args.rate {
        property("--rate", parse.set_sample_rate(rate))?;
    }
    if let Some(channels) = args.channels {
        property("--channels", parse.set_num_channels(channels))?;
    }
    if args.non_interleaved {
        property("--non-interleaved", parse.set_interleaved(false))?;
    }
    if let Some(list) = &args.channel_positions {
        let positions = parse_positions(list)
            .map_err(|err| CliError::new(USAGE, format!("--channel-positions: {err}")))?;
        property(
            "--channel-positions",
            parse.set_channel_positions(Some(&positions)),
        )?;
    }
    Ok(())
}

fn property(flag: &str, result: Result<bool, ConfigError>) -> CliResult<()> {
    result.map(|_| ()).map_err(|err| config_error(flag, err))
}
