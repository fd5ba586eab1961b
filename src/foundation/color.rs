use crate::foundation::error::{StitchError, StitchResult};

/// Straight-alpha RGBA color: integer channels plus a `0.0..=1.0` alpha.
///
/// Convertible to and from 3/6/8-digit hex strings and the literal
/// `transparent`. Alpha is stored as the exact `a / 255` quotient so the
/// 8-digit hex round trip is lossless.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct Rgba {
    /// Red channel, 0..=255.
    pub r: u8,
    /// Green channel, 0..=255.
    pub g: u8,
    /// Blue channel, 0..=255.
    pub b: u8,
    /// Alpha, 0.0..=1.0.
    pub alpha: f32,
}

impl Rgba {
    /// Opaque white, the default canvas color.
    pub const WHITE: Rgba = Rgba {
        r: 255,
        g: 255,
        b: 255,
        alpha: 1.0,
    };

    /// Opaque black, the default border and caption color.
    pub const BLACK: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        alpha: 1.0,
    };

    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        alpha: 0.0,
    };

    /// Parse a `#rgb`, `#rrggbb`, or `#rrggbbaa` hex string, or the
    /// literal `transparent`.
    pub fn from_hex(color: &str) -> StitchResult<Self> {
        let invalid = || {
            StitchError::validation(format!(
                "invalid color '{color}': must be 'transparent', #rgb, #rrggbb, or #rrggbbaa"
            ))
        };

        if color == "transparent" {
            return Ok(Self::TRANSPARENT);
        }

        let hex = color.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let mut doubled = String::with_capacity(6);
                for c in hex.chars() {
                    doubled.push(c);
                    doubled.push(c);
                }
                Ok(Self {
                    r: channel(&doubled[0..2])?,
                    g: channel(&doubled[2..4])?,
                    b: channel(&doubled[4..6])?,
                    alpha: 1.0,
                })
            }
            6 => Ok(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                alpha: 1.0,
            }),
            8 => Ok(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                alpha: f32::from(channel(&hex[6..8])?) / 255.0,
            }),
            _ => Err(invalid()),
        }
    }

    /// Render as an 8-digit `#rrggbbaa` hex string.
    pub fn to_hex(self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r,
            self.g,
            self.b,
            self.alpha_u8()
        )
    }

    /// Alpha quantized back to a byte.
    pub fn alpha_u8(self) -> u8 {
        (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl std::str::FromStr for Rgba {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Channels { r: u8, g: u8, b: u8, alpha: f32 },
}

impl TryFrom<ColorRepr> for Rgba {
    type Error = StitchError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(s) => Rgba::from_hex(&s),
            ColorRepr::Channels { r, g, b, alpha } => {
                if !(0.0..=1.0).contains(&alpha) {
                    return Err(StitchError::validation(format!(
                        "invalid color alpha {alpha}: must be within 0.0..=1.0"
                    )));
                }
                Ok(Rgba { r, g, b, alpha })
            }
        }
    }
}
