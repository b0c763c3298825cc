//! Channel positions, channel masks and canonical ordering.
//!
//! A channel mask sets one bit per positioned role; bit order is the
//! canonical channel order. Two roles have no bit: `Mono`, valid only as the
//! sole position of a one-channel layout, and `None`, which marks an
//! unpositioned layout and must then be used for every channel.

use std::fmt;
use std::str::FromStr;

use rawparse_frame::ConfigError;
use serde::de::value::StrDeserializer;
use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};

use crate::error::UnknownName;

/// Largest channel count a layout can have.
pub const MAX_CHANNELS: u32 = 64;

/// Speaker role of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelPosition {
    Mono,
    None,
    FrontLeft,
    FrontRight,
    FrontCenter,
    Lfe1,
    RearLeft,
    RearRight,
    FrontLeftOfCenter,
    FrontRightOfCenter,
    RearCenter,
    Lfe2,
    SideLeft,
    SideRight,
    TopFrontLeft,
    TopFrontRight,
    TopFrontCenter,
    TopCenter,
    TopRearLeft,
    TopRearRight,
    TopSideLeft,
    TopSideRight,
    TopRearCenter,
    BottomFrontCenter,
    BottomFrontLeft,
    BottomFrontRight,
    WideLeft,
    WideRight,
    SurroundLeft,
    SurroundRight,
}

use ChannelPosition as Pos;

impl ChannelPosition {
    /// Positioned roles in canonical order; the index is the mask bit.
    pub const POSITIONED: [ChannelPosition; 28] = [
        Pos::FrontLeft,
        Pos::FrontRight,
        Pos::FrontCenter,
        Pos::Lfe1,
        Pos::RearLeft,
        Pos::RearRight,
        Pos::FrontLeftOfCenter,
        Pos::FrontRightOfCenter,
        Pos::RearCenter,
        Pos::Lfe2,
        Pos::SideLeft,
        Pos::SideRight,
        Pos::TopFrontLeft,
        Pos::TopFrontRight,
        Pos::TopFrontCenter,
        Pos::TopCenter,
        Pos::TopRearLeft,
        Pos::TopRearRight,
        Pos::TopSideLeft,
        Pos::TopSideRight,
        Pos::TopRearCenter,
        Pos::BottomFrontCenter,
        Pos::BottomFrontLeft,
        Pos::BottomFrontRight,
        Pos::WideLeft,
        Pos::WideRight,
        Pos::SurroundLeft,
        Pos::SurroundRight,
    ];

    /// Mask bit index, `None` for `Mono` and `None`.
    pub fn bit(self) -> Option<u32> {
        Self::POSITIONED
            .iter()
            .position(|&p| p == self)
            .map(|idx| idx as u32)
    }

    pub fn from_bit(bit: u32) -> Option<Self> {
        Self::POSITIONED.get(bit as usize).copied()
    }

    /// This position's mask bit, 0 for `Mono` and `None`.
    pub fn mask(self) -> u64 {
        self.bit().map_or(0, |bit| 1u64 << bit)
    }

    pub fn is_positioned(self) -> bool {
        self.bit().is_some()
    }

    /// Short speaker label, e.g. `FL`.
    pub fn short_name(self) -> &'static str {
        match self {
            Pos::Mono => "MONO",
            Pos::None => "NONE",
            Pos::FrontLeft => "FL",
            Pos::FrontRight => "FR",
            Pos::FrontCenter => "FC",
            Pos::Lfe1 => "LFE1",
            Pos::RearLeft => "RL",
            Pos::RearRight => "RR",
            Pos::FrontLeftOfCenter => "FLC",
            Pos::FrontRightOfCenter => "FRC",
            Pos::RearCenter => "RC",
            Pos::Lfe2 => "LFE2",
            Pos::SideLeft => "SL",
            Pos::SideRight => "SR",
            Pos::TopFrontLeft => "TFL",
            Pos::TopFrontRight => "TFR",
            Pos::TopFrontCenter => "TFC",
            Pos::TopCenter => "TC",
            Pos::TopRearLeft => "TRL",
            Pos::TopRearRight => "TRR",
            Pos::TopSideLeft => "TSL",
            Pos::TopSideRight => "TSR",
            Pos::TopRearCenter => "TRC",
            Pos::BottomFrontCenter => "BFC",
            Pos::BottomFrontLeft => "BFL",
            Pos::BottomFrontRight => "BFR",
            Pos::WideLeft => "WL",
            Pos::WideRight => "WR",
            Pos::SurroundLeft => "SURL",
            Pos::SurroundRight => "SURR",
        }
    }
}

impl fmt::Display for ChannelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for ChannelPosition {
    type Err = UnknownName;

    /// Accepts short labels (`FL`, `lfe1`) and kebab-case role names
    /// (`front-left`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let special = [Pos::Mono, Pos::None];
        let found = special
            .into_iter()
            .chain(Self::POSITIONED)
            .find(|p| p.short_name() == upper);
        if let Some(position) = found {
            return Ok(position);
        }

        let lower = s.trim().to_ascii_lowercase();
        let de: StrDeserializer<'_, serde::de::value::Error> = lower.as_str().into_deserializer();
        ChannelPosition::deserialize(de).map_err(|_| UnknownName::new("channel position", s))
    }
}

/// Parse a comma-separated position list such as `FL,FR,LFE1`.
///
/// A list of only blanks (`""`, `","`) is empty. A blank item next to
/// real ones (`FL,,FR`) is an unknown name.
pub fn parse_positions(list: &str) -> Result<Vec<ChannelPosition>, UnknownName> {
    let items: Vec<&str> = list.split(',').map(str::trim).collect();
    if items.iter().all(|item| item.is_empty()) {
        return Ok(Vec::new());
    }
    items.into_iter().map(str::parse).collect()
}

/// Default mask for a channel count; 0 for mono and for counts above 8.
pub fn fallback_mask(channels: u32) -> u64 {
    let fl_fr = Pos::FrontLeft.mask() | Pos::FrontRight.mask();
    let five = fl_fr | Pos::FrontCenter.mask() | Pos::RearLeft.mask() | Pos::RearRight.mask();
    match channels {
        2 => fl_fr,
        3 => fl_fr | Pos::Lfe1.mask(),
        4 => fl_fr | Pos::RearLeft.mask() | Pos::RearRight.mask(),
        5 => five,
        6 => five | Pos::Lfe1.mask(),
        7 => five | Pos::Lfe1.mask() | Pos::RearCenter.mask(),
        8 => five | Pos::Lfe1.mask() | Pos::SideLeft.mask() | Pos::SideRight.mask(),
        _ => 0,
    }
}

/// Derive positions from a channel mask.
///
/// A zero mask means mono for one channel, front left/right for two and
/// unpositioned otherwise. A nonzero mask must have exactly `channels` bits
/// set, all of them known roles.
pub fn positions_from_mask(channels: u32, mask: u64) -> Result<Vec<ChannelPosition>, ConfigError> {
    if channels == 0 {
        return Err(ConfigError::InvalidField {
            field: "channels",
            reason: "must be positive".to_string(),
        });
    }
    if channels > MAX_CHANNELS {
        return Err(ConfigError::TooManyChannels {
            count: channels,
            max: MAX_CHANNELS,
        });
    }

    if mask == 0 {
        return Ok(match channels {
            1 => vec![Pos::Mono],
            2 => vec![Pos::FrontLeft, Pos::FrontRight],
            n => vec![Pos::None; n as usize],
        });
    }

    if mask.count_ones() != channels {
        return Err(ConfigError::InvalidChannelMask { mask, channels });
    }
    (0..u64::BITS)
        .filter(|bit| mask & (1u64 << bit) != 0)
        .map(|bit| ChannelPosition::from_bit(bit).ok_or(ConfigError::InvalidChannelMask { mask, channels }))
        .collect()
}

/// Express positions as a mask.
///
/// Mono and unpositioned layouts map to 0. Positioned layouts must be
/// valid and in canonical order.
pub fn positions_to_mask(positions: &[ChannelPosition]) -> Result<u64, ConfigError> {
    if positions.is_empty() {
        return Err(ConfigError::EmptyChannelPositions);
    }
    if is_mono(positions) || is_unpositioned(positions) {
        return Ok(0);
    }
    if !check_valid_positions(positions, true) {
        return Err(ConfigError::InvalidChannelPositions(format_positions(positions)));
    }
    Ok(positions.iter().fold(0, |mask, p| mask | p.mask()))
}

fn is_mono(positions: &[ChannelPosition]) -> bool {
    positions == [Pos::Mono]
}

fn is_unpositioned(positions: &[ChannelPosition]) -> bool {
    positions.iter().all(|&p| p == Pos::None)
}

/// Check that positions form a usable layout.
///
/// Mono alone or all-`None` are always valid. Otherwise every position
/// must be a distinct positioned role, in ascending bit order if
/// `require_order` is set.
pub fn check_valid_positions(positions: &[ChannelPosition], require_order: bool) -> bool {
    if positions.is_empty() {
        return false;
    }
    if is_mono(positions) || is_unpositioned(positions) {
        return true;
    }

    let mut seen = 0u64;
    let mut last = None;
    for position in positions {
        let Some(bit) = position.bit() else {
            return false;
        };
        if seen & position.mask() != 0 {
            return false;
        }
        if require_order && last.is_some_and(|last| bit < last) {
            return false;
        }
        seen |= position.mask();
        last = Some(bit);
    }
    true
}

/// Sort positions into canonical order.
pub fn to_valid_order(positions: &[ChannelPosition]) -> Result<Vec<ChannelPosition>, ConfigError> {
    if !check_valid_positions(positions, false) {
        return Err(ConfigError::InvalidChannelPositions(format_positions(positions)));
    }
    let mut ordered = positions.to_vec();
    ordered.sort_by_key(|p| p.bit());
    Ok(ordered)
}

/// Permutation taking `from` to `to`: `map[i] = j` where `to[j] == from[i]`.
///
/// `None` if the two lists are not permutations of each other.
pub fn reorder_map(from: &[ChannelPosition], to: &[ChannelPosition]) -> Option<Vec<usize>> {
    if from.len() != to.len() {
        return None;
    }
    let mut taken = vec![false; to.len()];
    from.iter()
        .map(|position| {
            let j = to
                .iter()
                .enumerate()
                .position(|(j, p)| p == position && !taken[j])?;
            taken[j] = true;
            Some(j)
        })
        .collect()
}

pub(crate) fn format_positions(positions: &[ChannelPosition]) -> String {
    positions
        .iter()
        .map(|p| p.short_name())
        .collect::<Vec<_>>()
        .join(",")
}
