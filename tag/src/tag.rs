// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
use core::fmt;

/// The numeric class of each channel of a pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Precision {
    /// No precision, only used by the null tag.
    #[default]
    None = 0,
    /// An 8-bit unsigned integer per channel.
    U8 = 1,
    /// A 16-bit unsigned integer per channel.
    U16 = 2,
    /// A 32-bit float per channel.
    Float = 3,
    /// A 16-bit half-float per channel.
    Float16 = 4,
}

/// Which color channels are present in a pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Format {
    /// No channels, only used by the null tag.
    #[default]
    None = 0,
    /// Red, green and blue.
    Rgb = 1,
    /// A single luminance channel.
    Gray = 2,
    /// A single index into a color map.
    Indexed = 3,
}

/// Whether an alpha channel follows the color channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Alpha {
    #[default]
    No = 0,
    Yes = 1,
}

/// The classic drawable type codes of 8-bit images.
///
/// These are the numbers used by the procedural interface of an image editor to describe a layer
/// or channel. They only cover 8-bit precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DrawableType {
    RgbImage = 0,
    RgbaImage = 1,
    GrayImage = 2,
    GrayaImage = 3,
    IndexedImage = 4,
    IndexedaImage = 5,
}

/// Describes the storage of one pixel.
///
/// A tag never changes once constructed. The `with_*` methods return a modified copy instead, the
/// original stays as it was.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tag {
    precision: Precision,
    format: Format,
    alpha: Alpha,
}

impl Precision {
    /// The number of bytes of a single channel.
    pub const fn bytes(self) -> u8 {
        match self {
            Precision::None => 0,
            Precision::U8 => 1,
            Precision::U16 | Precision::Float16 => 2,
            Precision::Float => 4,
        }
    }
}

impl Format {
    /// The number of color channels, not counting alpha.
    pub const fn color_channels(self) -> u8 {
        match self {
            Format::None => 0,
            Format::Rgb => 3,
            Format::Gray | Format::Indexed => 1,
        }
    }
}

impl Tag {
    pub const fn new(precision: Precision, format: Format, alpha: Alpha) -> Self {
        Tag {
            precision,
            format,
            alpha,
        }
    }

    /// The tag describing no pixel at all.
    ///
    /// It has zero channels and zero bytes and is not [valid](Self::is_valid).
    pub const fn null() -> Self {
        Tag::new(Precision::None, Format::None, Alpha::No)
    }

    /// The 8-bit tag that has exactly `bytes` bytes per pixel.
    ///
    /// One byte is gray, two are gray with alpha, three are rgb and four are rgb with alpha. Any
    /// other count returns the null tag.
    pub const fn by_bytes(bytes: usize) -> Self {
        match bytes {
            1 => Tag::new(Precision::U8, Format::Gray, Alpha::No),
            2 => Tag::new(Precision::U8, Format::Gray, Alpha::Yes),
            3 => Tag::new(Precision::U8, Format::Rgb, Alpha::No),
            4 => Tag::new(Precision::U8, Format::Rgb, Alpha::Yes),
            _ => Tag::null(),
        }
    }

    pub const fn precision(self) -> Precision {
        self.precision
    }

    pub const fn format(self) -> Format {
        self.format
    }

    pub const fn alpha(self) -> Alpha {
        self.alpha
    }

    #[must_use = "Does not mutate self"]
    pub const fn with_precision(self, precision: Precision) -> Self {
        Tag { precision, ..self }
    }

    #[must_use = "Does not mutate self"]
    pub const fn with_format(self, format: Format) -> Self {
        Tag { format, ..self }
    }

    #[must_use = "Does not mutate self"]
    pub const fn with_alpha(self, alpha: Alpha) -> Self {
        Tag { alpha, ..self }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self.alpha, Alpha::Yes)
    }

    /// The number of channels including a potential alpha channel.
    ///
    /// The null format has no channels, even when alpha is requested.
    pub const fn num_channels(self) -> u8 {
        match self.format {
            Format::None => 0,
            format => format.color_channels() + self.alpha as u8,
        }
    }

    /// The number of bytes of one pixel.
    pub const fn bytes(self) -> usize {
        self.num_channels() as usize * self.precision.bytes() as usize
    }

    /// Check that the tag describes a storable pixel.
    ///
    /// Precision and format must not be `None`. Indices into a color map are always single bytes.
    pub const fn is_valid(self) -> bool {
        match (self.precision, self.format) {
            (Precision::None, _) | (_, Format::None) => false,
            (Precision::U8, Format::Indexed) => true,
            (_, Format::Indexed) => false,
            _ => true,
        }
    }

    pub const fn from_drawable_type(ty: DrawableType) -> Self {
        let (format, alpha) = match ty {
            DrawableType::RgbImage => (Format::Rgb, Alpha::No),
            DrawableType::RgbaImage => (Format::Rgb, Alpha::Yes),
            DrawableType::GrayImage => (Format::Gray, Alpha::No),
            DrawableType::GrayaImage => (Format::Gray, Alpha::Yes),
            DrawableType::IndexedImage => (Format::Indexed, Alpha::No),
            DrawableType::IndexedaImage => (Format::Indexed, Alpha::Yes),
        };

        Tag::new(Precision::U8, format, alpha)
    }

    /// The drawable type code of this tag, if there is one.
    ///
    /// Only 8-bit tags have a code. Lower the precision first to find the closest type of a
    /// deeper tag.
    pub const fn to_drawable_type(self) -> Option<DrawableType> {
        if !matches!(self.precision, Precision::U8) {
            return None;
        }

        Some(match (self.format, self.alpha) {
            (Format::Rgb, Alpha::No) => DrawableType::RgbImage,
            (Format::Rgb, Alpha::Yes) => DrawableType::RgbaImage,
            (Format::Gray, Alpha::No) => DrawableType::GrayImage,
            (Format::Gray, Alpha::Yes) => DrawableType::GrayaImage,
            (Format::Indexed, Alpha::No) => DrawableType::IndexedImage,
            (Format::Indexed, Alpha::Yes) => DrawableType::IndexedaImage,
            (Format::None, _) => return None,
        })
    }
}

impl DrawableType {
    /// Decode a drawable type from its numeric code.
    ///
    /// Only the low byte carries the type, higher bits are flags of the caller.
    pub const fn from_code(code: i32) -> Option<Self> {
        Some(match code & 0xff {
            0 => DrawableType::RgbImage,
            1 => DrawableType::RgbaImage,
            2 => DrawableType::GrayImage,
            3 => DrawableType::GrayaImage,
            4 => DrawableType::IndexedImage,
            5 => DrawableType::IndexedaImage,
            _ => return None,
        })
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Precision::None => "none",
            Precision::U8 => "u8",
            Precision::U16 => "u16",
            Precision::Float => "float",
            Precision::Float16 => "float16",
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Format::None => "none",
            Format::Rgb => "rgb",
            Format::Gray => "gray",
            Format::Indexed => "indexed",
        })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.format, self.precision)?;
        if self.has_alpha() {
            f.write_str("+alpha")?;
        }
        write!(f, " ({} bytes)", self.bytes())
    }
}
