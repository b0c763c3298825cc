use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rawparse_caps::{media, Caps};
use serde::Serialize;

use crate::cmd::CapsArgs;
use crate::exit::{caps_error, config_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Debug, Serialize)]
struct CapsOutput {
    /// The descriptor as given, normalized to text.
    input: String,
    kind: &'static str,
    /// What a parser configured from `input` announces downstream.
    output: String,
    config: serde_json::Value,
}

pub fn run(args: CapsArgs, format: OutputFormat) -> CliResult<i32> {
    let caps = parse_descriptor(&args.descriptor)?;
    let output = describe(&caps)?;

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for field in caps.fields() {
                table.add_row(vec![
                    field.name.clone(),
                    field.value.to_string(),
                ]);
            }
            println!("{} ({})", caps.media_type(), output.kind);
            println!("{table}");
            println!("output: {}", output.output);
        }
        OutputFormat::Pretty => {
            println!("input:  {}", output.input);
            println!("kind:   {}", output.kind);
            println!("output: {}", output.output);
        }
        OutputFormat::Raw => println!("{}", output.output),
    }
    Ok(SUCCESS)
}

/// Accepts the text form or, when it starts with `{`, the JSON form.
fn parse_descriptor(descriptor: &str) -> CliResult<Caps> {
    let trimmed = descriptor.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed)
            .map_err(|err| CliError::new(DATA_INVALID, format!("invalid JSON descriptor: {err}")));
    }
    trimmed
        .parse()
        .map_err(|err| caps_error("invalid descriptor", err))
}

fn describe(caps: &Caps) -> CliResult<CapsOutput> {
    let media_type = caps.media_type();
    let (kind, output, config) = if media::is_audio(media_type) {
        let config = rawparse_audio::caps_to_config(caps)
            .map_err(|err| config_error("rejected audio descriptor", err))?;
        let output = rawparse_audio::config_to_caps(&config)
            .map_err(|err| config_error("cannot describe audio config", err))?;
        ("audio", output, serde_json::to_value(&config))
    } else if media::is_video(media_type) {
        let config = rawparse_video::caps_to_config(caps)
            .map_err(|err| config_error("rejected video descriptor", err))?;
        let output = rawparse_video::config_to_caps(&config)
            .map_err(|err| config_error("cannot describe video config", err))?;
        ("video", output, serde_json::to_value(&config))
    } else {
        return Err(CliError::new(
            DATA_INVALID,
            format!("unsupported media type '{media_type}'"),
        ));
    };

    tracing::debug!(%caps, kind, "descriptor accepted");
    Ok(CapsOutput {
        input: caps.to_string(),
        kind,
        output: output.to_string(),
        config: config.unwrap_or(serde_json::Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_audio_descriptor() {
        let caps = parse_descriptor(
            "audio/x-unaligned-raw, format=S16LE, rate=8000, channels=2, layout=interleaved",
        )
        .expect("descriptor should parse");
        let out = describe(&caps).expect("descriptor should be accepted");
        assert_eq!(out.kind, "audio");
        assert!(out.output.starts_with("audio/x-raw"));
        assert_eq!(out.config["sample_rate"], 8000);
    }

    #[test]
    fn accepts_json_descriptor() {
        let caps = parse_descriptor(
            r#"{"media_type":"video/x-raw","fields":[
                {"name":"format","value":{"string":"GRAY8"}},
                {"name":"width","value":{"int":4}},
                {"name":"height","value":{"int":2}}]}"#,
        )
        .expect("json descriptor should parse");
        let out = describe(&caps).expect("descriptor should be accepted");
        assert_eq!(out.kind, "video");
        assert_eq!(out.config["layout"]["size"], 8);
    }

    #[test]
    fn rejects_invalid_descriptors_as_data_errors() {
        let err = parse_descriptor("").expect_err("empty descriptor should fail");
        assert_eq!(err.code, DATA_INVALID);

        let caps = parse_descriptor("audio/x-raw, format=S16LE").expect("syntax is valid");
        let err = describe(&caps).expect_err("missing rate should be rejected");
        assert_eq!(err.code, DATA_INVALID);

        let caps = parse_descriptor("text/plain").expect("syntax is valid");
        assert_eq!(describe(&caps).map(|_| ()).unwrap_err().code, DATA_INVALID);
    }
}
