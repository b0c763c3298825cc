use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownName;

/// How samples are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioParseFormat {
    #[default]
    Pcm,
    Alaw,
    Mulaw,
}

impl AudioParseFormat {
    pub fn name(self) -> &'static str {
        match self {
            AudioParseFormat::Pcm => "pcm",
            AudioParseFormat::Alaw => "alaw",
            AudioParseFormat::Mulaw => "mulaw",
        }
    }

    /// A-law and mu-law store one byte per sample.
    pub fn is_companded(self) -> bool {
        !matches!(self, AudioParseFormat::Pcm)
    }
}

impl fmt::Display for AudioParseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AudioParseFormat {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pcm" => Ok(AudioParseFormat::Pcm),
            "alaw" | "a-law" => Ok(AudioParseFormat::Alaw),
            "mulaw" | "mu-law" => Ok(AudioParseFormat::Mulaw),
            _ => Err(UnknownName::new("audio format", s)),
        }
    }
}

/// Concrete PCM sample formats.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PcmFormat {
    S8,
    U8,
    #[default]
    S16LE,
    S16BE,
    U16LE,
    U16BE,
    S24_32LE,
    S24_32BE,
    U24_32LE,
    U24_32BE,
    S32LE,
    S32BE,
    U32LE,
    U32BE,
    S24LE,
    S24BE,
    U24LE,
    U24BE,
    S20LE,
    S20BE,
    U20LE,
    U20BE,
    S18LE,
    S18BE,
    U18LE,
    U18BE,
    F32LE,
    F32BE,
    F64LE,
    F64BE,
}

impl PcmFormat {
    pub const ALL: [PcmFormat; 30] = [
        PcmFormat::S8,
        PcmFormat::U8,
        PcmFormat::S16LE,
        PcmFormat::S16BE,
        PcmFormat::U16LE,
        PcmFormat::U16BE,
        PcmFormat::S24_32LE,
        PcmFormat::S24_32BE,
        PcmFormat::U24_32LE,
        PcmFormat::U24_32BE,
        PcmFormat::S32LE,
        PcmFormat::S32BE,
        PcmFormat::U32LE,
        PcmFormat::U32BE,
        PcmFormat::S24LE,
        PcmFormat::S24BE,
        PcmFormat::U24LE,
        PcmFormat::U24BE,
        PcmFormat::S20LE,
        PcmFormat::S20BE,
        PcmFormat::U20LE,
        PcmFormat::U20BE,
        PcmFormat::S18LE,
        PcmFormat::S18BE,
        PcmFormat::U18LE,
        PcmFormat::U18BE,
        PcmFormat::F32LE,
        PcmFormat::F32BE,
        PcmFormat::F64LE,
        PcmFormat::F64BE,
    ];

    /// Name used in caps `format` fields.
    pub fn name(self) -> &'static str {
        match self {
            PcmFormat::S8 => "S8",
            PcmFormat::U8 => "U8",
            PcmFormat::S16LE => "S16LE",
            PcmFormat::S16BE => "S16BE",
            PcmFormat::U16LE => "U16LE",
            PcmFormat::U16BE => "U16BE",
            PcmFormat::S24_32LE => "S24_32LE",
            PcmFormat::S24_32BE => "S24_32BE",
            PcmFormat::U24_32LE => "U24_32LE",
            PcmFormat::U24_32BE => "U24_32BE",
            PcmFormat::S32LE => "S32LE",
            PcmFormat::S32BE => "S32BE",
            PcmFormat::U32LE => "U32LE",
            PcmFormat::U32BE => "U32BE",
            PcmFormat::S24LE => "S24LE",
            PcmFormat::S24BE => "S24BE",
            PcmFormat::U24LE => "U24LE",
            PcmFormat::U24BE => "U24BE",
            PcmFormat::S20LE => "S20LE",
            PcmFormat::S20BE => "S20BE",
            PcmFormat::U20LE => "U20LE",
            PcmFormat::U20BE => "U20BE",
            PcmFormat::S18LE => "S18LE",
            PcmFormat::S18BE => "S18BE",
            PcmFormat::U18LE => "U18LE",
            PcmFormat::U18BE => "U18BE",
            PcmFormat::F32LE => "F32LE",
            PcmFormat::F32BE => "F32BE",
            PcmFormat::F64LE => "F64LE",
            PcmFormat::F64BE => "F64BE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.name() == name)
    }

    /// Storage width of one sample in bits.
    pub fn width(self) -> u32 {
        use PcmFormat::*;
        match self {
            S8 | U8 => 8,
            S16LE | S16BE | U16LE | U16BE => 16,
            S24LE | S24BE | U24LE | U24BE | S20LE | S20BE | U20LE | U20BE | S18LE | S18BE
            | U18LE | U18BE => 24,
            S24_32LE | S24_32BE | U24_32LE | U24_32BE | S32LE | S32BE | U32LE | U32BE
            | F32LE | F32BE => 32,
            F64LE | F64BE => 64,
        }
    }

    /// Significant bits per sample.
    pub fn depth(self) -> u32 {
        use PcmFormat::*;
        match self {
            S24_32LE | S24_32BE | U24_32LE | U24_32BE => 24,
            S20LE | S20BE | U20LE | U20BE => 20,
            S18LE | S18BE | U18LE | U18BE => 18,
            other => other.width(),
        }
    }

    /// Bytes occupied by one sample.
    pub fn sample_size(self) -> usize {
        (self.width() / 8) as usize
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            PcmFormat::F32LE | PcmFormat::F32BE | PcmFormat::F64LE | PcmFormat::F64BE
        )
    }
}

impl fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PcmFormat {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(&s.to_ascii_uppercase()).ok_or_else(|| UnknownName::new("PCM format", s))
    }
}
