use rand::Rng;

use crate::foundation::error::{StitchError, StitchResult};

/// Median of a sequence; `None` when the sequence is empty.
pub fn median(values: &[u32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 1 {
        Some(f64::from(sorted[mid]))
    } else {
        Some((f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0)
    }
}

const TRIM_RATIO: f64 = 0.1;

/// Median after discarding 10% of sorted values from each tail.
///
/// Falls back to the plain median when trimming would discard everything,
/// which makes it equal to [`median`] for sequences shorter than ten.
pub fn trimmed_median(values: &[u32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let trim = (sorted.len() as f64 * TRIM_RATIO).floor() as usize;

    if trim * 2 >= sorted.len() {
        return median(&sorted);
    }

    median(&sorted[trim..sorted.len() - trim])
}

/// Uniformly random integer in `[low, high]`, drawn from the supplied RNG.
pub fn randint<R: Rng + ?Sized>(rng: &mut R, low: i32, high: i32) -> i32 {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    rng.random_range(low..=high)
}

/// An image aspect ratio (width over height), always finite and positive.
///
/// Parses the forms the option surface accepts: `16:9`, `3x2`, `4/3`, and
/// bare numbers like `1.777`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct AspectRatio(f64);

impl AspectRatio {
    /// 1:1, the default for grid and collage layouts.
    pub const SQUARE: AspectRatio = AspectRatio(1.0);

    /// Build from a raw ratio value.
    pub fn new(ratio: f64) -> StitchResult<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(StitchError::validation(format!(
                "invalid value at aspect_ratio: {ratio} is not a positive ratio"
            )));
        }
        Ok(Self(ratio))
    }

    /// The ratio as width divided by height.
    pub fn ratio(self) -> f64 {
        self.0
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::SQUARE
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            StitchError::validation(format!(
                "invalid value at aspect_ratio: '{s}' is not a valid ratio; \
                 examples include 16/9, 2:3, 1x2, 1.77"
            ))
        };

        let trimmed = s.trim();
        if let Ok(ratio) = trimmed.parse::<f64>() {
            return Self::new(ratio).map_err(|_| invalid());
        }

        let (w, h) = trimmed
            .split_once([':', 'x', 'X', '/'])
            .ok_or_else(invalid)?;
        let w: u32 = w.trim().parse().map_err(|_| invalid())?;
        let h: u32 = h.trim().parse().map_err(|_| invalid())?;
        if w == 0 || h == 0 {
            return Err(invalid());
        }

        Ok(Self(f64::from(w) / f64::from(h)))
    }
}

impl<'de> serde::Deserialize<'de> for AspectRatio {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => AspectRatio::new(n).map_err(serde::de::Error::custom),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
