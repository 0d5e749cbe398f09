//! Target aspect ratio definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Target aspect ratio for output video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AspectRatio {
    /// Width component
    pub width: u32,
    /// Height component
    pub height: u32,
}

impl AspectRatio {
    /// Landscape 16:9
    pub const LANDSCAPE: AspectRatio = AspectRatio {
        width: 16,
        height: 9,
    };

    /// Portrait 9:16
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };

    /// Square 1:1
    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1,
        height: 1,
    };

    /// Classic 4:3
    pub const CLASSIC: AspectRatio = AspectRatio {
        width: 4,
        height: 3,
    };

    /// Create a new aspect ratio.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns width/height as a decimal.
    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Height matching `width` at this ratio.
    ///
    /// Multiplies before dividing so integral results stay exact.
    #[inline]
    pub fn height_for(&self, width: f64) -> f64 {
        width * self.height as f64 / self.width as f64
    }

    /// Width matching `height` at this ratio.
    #[inline]
    pub fn width_for(&self, height: f64) -> f64 {
        height * self.width as f64 / self.height as f64
    }

    /// Whether a `width x height` box is wider than this ratio.
    #[inline]
    pub fn is_wider(&self, width: f64, height: f64) -> bool {
        width * self.height as f64 > height * self.width as f64
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 2 {
            return Err(AspectRatioParseError::InvalidFormat(s.to_string()));
        }

        let width = parts[0]
            .trim()
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(parts[0].to_string()))?;
        let height = parts[1]
            .trim()
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(parts[1].to_string()))?;

        if width == 0 || height == 0 {
            return Err(AspectRatioParseError::ZeroValue);
        }

        Ok(AspectRatio { width, height })
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::LANDSCAPE
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}, expected 'W:H'")]
    InvalidFormat(String),
    #[error("Invalid number in aspect ratio: {0}")]
    InvalidNumber(String),
    #[error("Aspect ratio cannot have zero values")]
    ZeroValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::LANDSCAPE);
        assert_eq!(" 9 : 16 ".parse::<AspectRatio>().unwrap(), AspectRatio::PORTRAIT);
        assert_eq!(
            "16x9".parse::<AspectRatio>(),
            Err(AspectRatioParseError::InvalidFormat("16x9".to_string()))
        );
        assert_eq!("0:9".parse::<AspectRatio>(), Err(AspectRatioParseError::ZeroValue));
        assert!("a:9".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_exact_dimension_helpers() {
        let ratio = AspectRatio::LANDSCAPE;
        assert_eq!(ratio.width_for(108.0), 192.0);
        assert_eq!(ratio.height_for(1920.0), 1080.0);
        assert!(ratio.is_wider(200.0, 100.0));
        assert!(!ratio.is_wider(160.0, 90.0));
        assert_eq!(ratio.to_string(), "16:9");
    }
}
