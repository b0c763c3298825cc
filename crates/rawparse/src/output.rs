use std::io::{IsTerminal, Write};
use std::time::Duration;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rawparse_caps::Caps;
use rawparse_frame::{FrameBatch, ParseEvent};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One line of JSON output per parse event.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum EventOutput {
    Caps {
        caps: String,
    },
    Frames {
        index: usize,
        offset: u64,
        num_frames: usize,
        payload_size: usize,
        pts_ns: Option<u64>,
        duration_ns: Option<u64>,
    },
    Summary(Totals),
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct Totals {
    pub batches: usize,
    pub frames: usize,
    pub bytes: usize,
    pub dropped_bytes: usize,
}

/// Prints parse events as they arrive.
///
/// Table output is collected and printed once the stream ends; the other
/// formats stream.
pub struct EventPrinter {
    format: OutputFormat,
    table: Table,
    totals: Totals,
}

impl EventPrinter {
    pub fn new(format: OutputFormat) -> Self {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["#", "OFFSET", "FRAMES", "SIZE", "PTS", "DURATION"]);
        Self {
            format,
            table,
            totals: Totals::default(),
        }
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn event(&mut self, event: &ParseEvent) {
        match event {
            ParseEvent::Caps(caps) => self.caps(caps),
            ParseEvent::Frames(batch) => self.batch(batch),
        }
    }

    fn caps(&mut self, caps: &Caps) {
        match self.format {
            OutputFormat::Json => print_json(&EventOutput::Caps {
                caps: caps.to_string(),
            }),
            OutputFormat::Table | OutputFormat::Pretty => println!("caps: {caps}"),
            OutputFormat::Raw => {}
        }
    }

    fn batch(&mut self, batch: &FrameBatch) {
        let index = self.totals.batches;
        self.totals.batches += 1;
        self.totals.frames += batch.num_frames;
        self.totals.bytes += batch.payload.len();

        match self.format {
            OutputFormat::Json => print_json(&EventOutput::Frames {
                index,
                offset: batch.offset,
                num_frames: batch.num_frames,
                payload_size: batch.payload.len(),
                pts_ns: batch.pts.map(nanos),
                duration_ns: batch.duration.map(nanos),
            }),
            OutputFormat::Table => {
                self.table.add_row(vec![
                    index.to_string(),
                    batch.offset.to_string(),
                    batch.num_frames.to_string(),
                    batch.payload.len().to_string(),
                    format_time(batch.pts),
                    format_time(batch.duration),
                ]);
            }
            OutputFormat::Pretty => println!(
                "batch={} offset={} frames={} size={} pts={} duration={}",
                index,
                batch.offset,
                batch.num_frames,
                batch.payload.len(),
                format_time(batch.pts),
                format_time(batch.duration)
            ),
            OutputFormat::Raw => print_raw(batch.payload.as_ref()),
        }
    }

    /// Print the totals; `dropped` is the trailing partial frame, if any.
    pub fn finish(mut self, dropped: usize) -> Totals {
        self.totals.dropped_bytes = dropped;
        let totals = self.totals;
        match self.format {
            OutputFormat::Json => print_json(&EventOutput::Summary(totals)),
            OutputFormat::Table => {
                println!("{}", self.table);
                print_totals(&totals);
            }
            OutputFormat::Pretty => print_totals(&totals),
            OutputFormat::Raw => {}
        }
        totals
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout().lock();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_totals(totals: &Totals) {
    println!(
        "batches={} frames={} bytes={} dropped={}",
        totals.batches, totals.frames, totals.bytes, totals.dropped_bytes
    );
}

fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

fn format_time(time: Option<Duration>) -> String {
    match time {
        Some(time) => format!("{:.6}s", time.as_secs_f64()),
        None => "-".to_string(),
    }
}
