use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CapsError, Result};
use crate::value::{FieldValue, Fraction};

/// A named, typed descriptor field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

/// A capability descriptor: one media type plus its fields.
///
/// Field order is kept for display; equality ignores it.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Caps {
    media_type: String,
    #[serde(default)]
    fields: Vec<Field>,
}

impl Caps {
    /// Create a descriptor with no fields.
    pub fn new(media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            fields: Vec::new(),
        }
    }

    /// Builder form of [`Caps::set`].
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// The media type name, e.g. `audio/x-raw`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Returns true if the descriptor has the given media type.
    pub fn has_name(&self, media_type: &str) -> bool {
        self.media_type == media_type
    }

    /// Replace the media type, keeping all fields.
    pub fn set_media_type(&mut self, media_type: impl Into<String>) {
        self.media_type = media_type.into();
    }

    /// Set a field, replacing any existing value under the same name.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(Field {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Remove a field, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(idx).value)
    }

    /// Look up a field value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Bitmask lookup. Non-negative integers are accepted as well, since the
    /// untyped text form cannot tell a small decimal mask from an int.
    pub fn get_bitmask(&self, name: &str) -> Option<u64> {
        match self.get(name)? {
            FieldValue::Bitmask(mask) => Some(*mask),
            FieldValue::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn get_fraction(&self, name: &str) -> Option<Fraction> {
        match self.get(name)? {
            FieldValue::Fraction(fraction) => Some(*fraction),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            FieldValue::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

impl PartialEq for Caps {
    fn eq(&self, other: &Self) -> bool {
        self.media_type == other.media_type
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|f| other.get(&f.name) == Some(&f.value))
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)?;
        for field in &self.fields {
            write!(f, ", {}={}", field.name, field.value)?;
        }
        Ok(())
    }
}

impl FromStr for Caps {
    type Err = CapsError;

    fn from_str(input: &str) -> Result<Self> {
        let input = input.trim().trim_end_matches(';').trim();
        if input.is_empty() {
            return Err(CapsError::Empty);
        }

        let mut parts = split_fields(input)?.into_iter();
        let media_type = parts.next().unwrap_or_default();
        if !is_valid_media_type(&media_type) {
            return Err(CapsError::InvalidMediaType(media_type));
        }

        let mut caps = Caps::new(media_type);
        for part in parts {
            let (name, value) = parse_field(&part)?;
            caps.set(&name, value);
        }
        Ok(caps)
    }
}

fn is_valid_media_type(media_type: &str) -> bool {
    match media_type.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty()
                && !subtype.is_empty()
                && !subtype.contains('/')
                && media_type
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '.' | '+' | '_'))
        }
        None => false,
    }
}

/// Split on commas outside of quoted strings.
fn split_fields(input: &str) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in input.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(CapsError::UnterminatedString(current.trim().to_string()));
    }
    parts.push(current.trim().to_string());
    Ok(parts)
}

fn parse_field(part: &str) -> Result<(String, FieldValue)> {
    let (name, raw) = part
        .split_once('=')
        .ok_or_else(|| CapsError::MalformedField(part.to_string()))?;
    let name = name.trim();
    let raw = raw.trim();
    if name.is_empty() || raw.is_empty() {
        return Err(CapsError::MalformedField(part.to_string()));
    }

    let (ty, raw) = match raw.strip_prefix('(') {
        Some(rest) => {
            let (ty, rest) = rest
                .split_once(')')
                .ok_or_else(|| CapsError::MalformedField(part.to_string()))?;
            (Some(ty.trim()), rest.trim())
        }
        None => (None, raw),
    };

    let quoted = raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"');
    let text = if quoted {
        unescape(&raw[1..raw.len() - 1])
    } else {
        raw.to_string()
    };

    let value = match ty {
        Some(ty) => FieldValue::parse_typed(name, ty, &text)?,
        None if quoted => FieldValue::String(text),
        None => FieldValue::parse_untyped(&text),
    };
    Ok((name.to_string(), value))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{AUDIO_ALAW, AUDIO_RAW};

    #[test]
    fn parses_typed_descriptor() {
        let caps: Caps = "audio/x-raw, format=(string)S16LE, rate=(int)44100, \
                          channels=(int)2, layout=(string)interleaved, \
                          channel-mask=(bitmask)0x0000000000000003"
            .parse()
            .unwrap();

        assert!(caps.has_name(AUDIO_RAW));
        assert_eq!(caps.get_str("format"), Some("S16LE"));
        assert_eq!(caps.get_int("rate"), Some(44100));
        assert_eq!(caps.get_int("channels"), Some(2));
        assert_eq!(caps.get_bitmask("channel-mask"), Some(3));
        assert_eq!(caps.fields().len(), 5);
    }

    #[test]
    fn parses_untyped_descriptor() {
        let caps: Caps = "audio/x-alaw, rate=8000, channels=1;".parse().unwrap();
        assert!(caps.has_name(AUDIO_ALAW));
        assert_eq!(caps.get_int("rate"), Some(8000));
        assert_eq!(caps.get_int("channels"), Some(1));
        assert!(!caps.has_field("channel-mask"));
    }

    #[test]
    fn display_output_parses_back() {
        let caps = Caps::new("video/x-raw")
            .with("format", "I420")
            .with("width", 320)
            .with("framerate", Fraction::new(30000, 1001))
            .with("note", "two words, one comma");

        let text = caps.to_string();
        let parsed: Caps = text.parse().unwrap();
        assert_eq!(parsed, caps);
        assert_eq!(parsed.get_str("note"), Some("two words, one comma"));
    }

    #[test]
    fn equality_ignores_field_order() {
        let a = Caps::new(AUDIO_RAW).with("rate", 8000).with("channels", 1);
        let b = Caps::new(AUDIO_RAW).with("channels", 1).with("rate", 8000);
        let c = Caps::new(AUDIO_RAW).with("channels", 2).with("rate", 8000);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn set_replaces_and_remove_drops() {
        let mut caps = Caps::new(AUDIO_RAW).with("rate", 8000);
        caps.set("rate", 16000);
        assert_eq!(caps.get_int("rate"), Some(16000));
        assert_eq!(caps.fields().len(), 1);
        assert_eq!(caps.remove("rate"), Some(FieldValue::Int(16000)));
        assert!(caps.fields().is_empty());
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!("".parse::<Caps>().unwrap_err(), CapsError::Empty);
        assert!(matches!(
            "audio".parse::<Caps>().unwrap_err(),
            CapsError::InvalidMediaType(_)
        ));
        assert!(matches!(
            "audio/x-raw, rate".parse::<Caps>().unwrap_err(),
            CapsError::MalformedField(_)
        ));
        assert!(matches!(
            "audio/x-raw, format=\"S16".parse::<Caps>().unwrap_err(),
            CapsError::UnterminatedString(_)
        ));
        assert!(matches!(
            "audio/x-raw, rate=(int)fast".parse::<Caps>().unwrap_err(),
            CapsError::InvalidValue { .. }
        ));
    }

    #[test]
    fn json_form_roundtrips() {
        let caps = Caps::new(AUDIO_ALAW)
            .with("rate", 8000)
            .with("channels", 1)
            .with("channel-mask", FieldValue::Bitmask(0));
        let json = serde_json::to_string(&caps).unwrap();
        assert!(json.contains("\"media_type\":\"audio/x-alaw\""));
        let back: Caps = serde_json::from_str(&json).unwrap();
        assert_eq!(back, caps);
    }
}
