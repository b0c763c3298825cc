use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownFormat;

/// Supported pixel formats.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VideoFormat {
    #[default]
    I420,
    YV12,
    NV12,
    NV21,
    Y42B,
    Y444,
    YUY2,
    UYVY,
    YVYU,
    RGB,
    BGR,
    RGBx,
    BGRx,
    xRGB,
    xBGR,
    RGBA,
    BGRA,
    ARGB,
    ABGR,
    GRAY8,
    GRAY16_LE,
    GRAY16_BE,
}

/// Default plane layout of one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaneLayout {
    pub strides: Vec<usize>,
    pub offsets: Vec<usize>,
    /// Bytes of one image, all planes included.
    pub size: usize,
}

fn round_up(value: usize, to: usize) -> usize {
    value.div_ceil(to) * to
}

impl VideoFormat {
    pub const ALL: [VideoFormat; 22] = [
        VideoFormat::I420,
        VideoFormat::YV12,
        VideoFormat::NV12,
        VideoFormat::NV21,
        VideoFormat::Y42B,
        VideoFormat::Y444,
        VideoFormat::YUY2,
        VideoFormat::UYVY,
        VideoFormat::YVYU,
        VideoFormat::RGB,
        VideoFormat::BGR,
        VideoFormat::RGBx,
        VideoFormat::BGRx,
        VideoFormat::xRGB,
        VideoFormat::xBGR,
        VideoFormat::RGBA,
        VideoFormat::BGRA,
        VideoFormat::ARGB,
        VideoFormat::ABGR,
        VideoFormat::GRAY8,
        VideoFormat::GRAY16_LE,
        VideoFormat::GRAY16_BE,
    ];

    pub fn name(self) -> &'static str {
        use VideoFormat::*;
        match self {
            I420 => "I420",
            YV12 => "YV12",
            NV12 => "NV12",
            NV21 => "NV21",
            Y42B => "Y42B",
            Y444 => "Y444",
            YUY2 => "YUY2",
            UYVY => "UYVY",
            YVYU => "YVYU",
            RGB => "RGB",
            BGR => "BGR",
            RGBx => "RGBx",
            BGRx => "BGRx",
            xRGB => "xRGB",
            xBGR => "xBGR",
            RGBA => "RGBA",
            BGRA => "BGRA",
            ARGB => "ARGB",
            ABGR => "ABGR",
            GRAY8 => "GRAY8",
            GRAY16_LE => "GRAY16_LE",
            GRAY16_BE => "GRAY16_BE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.name() == name)
    }

    pub fn n_planes(self) -> usize {
        use VideoFormat::*;
        match self {
            I420 | YV12 | Y42B | Y444 => 3,
            NV12 | NV21 => 2,
            _ => 1,
        }
    }

    /// Largest per-component depth in bytes.
    pub fn component_bytes(self) -> usize {
        match self {
            VideoFormat::GRAY16_LE | VideoFormat::GRAY16_BE => 2,
            _ => 1,
        }
    }

    /// Default strides and offsets for a `width` x `height` image.
    pub fn layout(self, width: usize, height: usize) -> PlaneLayout {
        use VideoFormat::*;
        let single = |stride: usize| PlaneLayout {
            strides: vec![stride],
            offsets: vec![0],
            size: stride * height,
        };

        match self {
            I420 | YV12 => {
                let luma = round_up(width, 4);
                let chroma = round_up(round_up(width, 2) / 2, 4);
                let luma_size = luma * round_up(height, 2);
                let chroma_size = chroma * (round_up(height, 2) / 2);
                let (u, v) = if self == I420 {
                    (luma_size, luma_size + chroma_size)
                } else {
                    (luma_size + chroma_size, luma_size)
                };
                PlaneLayout {
                    strides: vec![luma, chroma, chroma],
                    offsets: vec![0, u, v],
                    size: luma_size + 2 * chroma_size,
                }
            }
            NV12 | NV21 => {
                let stride = round_up(width, 4);
                let luma_size = stride * round_up(height, 2);
                PlaneLayout {
                    strides: vec![stride, stride],
                    offsets: vec![0, luma_size],
                    size: luma_size + stride * (round_up(height, 2) / 2),
                }
            }
            Y42B => {
                let luma = round_up(width, 4);
                let chroma = round_up(width, 8) / 2;
                PlaneLayout {
                    strides: vec![luma, chroma, chroma],
                    offsets: vec![0, luma * height, (luma + chroma) * height],
                    size: (luma + 2 * chroma) * height,
                }
            }
            Y444 => {
                let stride = round_up(width, 4);
                PlaneLayout {
                    strides: vec![stride; 3],
                    offsets: vec![0, stride * height, 2 * stride * height],
                    size: 3 * stride * height,
                }
            }
            YUY2 | UYVY | YVYU => single(round_up(round_up(width, 2) * 2, 4)),
            RGB | BGR => single(round_up(width * 3, 4)),
            RGBx | BGRx | xRGB | xBGR | RGBA | BGRA | ARGB | ABGR => single(width * 4),
            GRAY8 => single(round_up(width, 4)),
            GRAY16_LE | GRAY16_BE => single(round_up(width * 2, 4)),
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VideoFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|format| format.name().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i420_layout() {
        let layout = VideoFormat::I420.layout(320, 240);
        assert_eq!(layout.strides, vec![320, 160, 160]);
        assert_eq!(layout.offsets, vec![0, 76_800, 96_000]);
        assert_eq!(layout.size, 115_200);
    }

    #[test]
    fn i420_odd_dimensions_round_up() {
        let layout = VideoFormat::I420.layout(17, 9);
        assert_eq!(layout.strides, vec![20, 12, 12]);
        assert_eq!(layout.offsets, vec![0, 200, 260]);
        assert_eq!(layout.size, 320);
    }

    #[test]
    fn yv12_swaps_chroma_planes() {
        let layout = VideoFormat::YV12.layout(320, 240);
        assert_eq!(layout.offsets, vec![0, 96_000, 76_800]);
        assert_eq!(layout.size, 115_200);
    }

    #[test]
    fn packed_layouts() {
        assert_eq!(VideoFormat::YUY2.layout(320, 240).size, 153_600);
        assert_eq!(VideoFormat::RGB.layout(5, 2).strides, vec![16]);
        assert_eq!(VideoFormat::RGBA.layout(5, 2).size, 40);
        assert_eq!(VideoFormat::GRAY16_BE.layout(3, 3).size, 24);
        assert_eq!(VideoFormat::NV12.layout(4, 4).size, 24);
        assert_eq!(VideoFormat::Y42B.layout(4, 2).size, 24);
        assert_eq!(VideoFormat::Y444.layout(4, 2).size, 24);
    }

    #[test]
    fn names_resolve() {
        for format in VideoFormat::ALL {
            assert_eq!(format.name().parse::<VideoFormat>().unwrap(), format);
        }
        assert_eq!("rgbx".parse::<VideoFormat>().unwrap(), VideoFormat::RGBx);
        assert!("AYUV64".parse::<VideoFormat>().is_err());
    }
}
