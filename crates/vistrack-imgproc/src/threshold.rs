use serde::{Deserialize, Serialize};

/// An inclusive box in 8-bit RGB space.
///
/// A pixel matches when each of its channels lies within the corresponding
/// `[min, max]` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorThreshold {
    /// Lower red bound.
    pub r_min: u8,
    /// Upper red bound.
    pub r_max: u8,
    /// Lower green bound.
    pub g_min: u8,
    /// Upper green bound.
    pub g_max: u8,
    /// Lower blue bound.
    pub b_min: u8,
    /// Upper blue bound.
    pub b_max: u8,
}

impl ColorThreshold {
    /// Strongly red pixels.
    pub const RED: Self = Self::new([100, 255], [0, 80], [0, 80]);
    /// Strongly green pixels.
    pub const GREEN: Self = Self::new([0, 80], [100, 255], [0, 80]);
    /// Strongly blue pixels.
    pub const BLUE: Self = Self::new([0, 80], [0, 80], [100, 255]);
    /// Bright yellow pixels.
    pub const YELLOW: Self = Self::new([150, 255], [150, 255], [0, 100]);
    /// Typical skin tones under indoor lighting.
    pub const SKIN: Self = Self::new([95, 255], [40, 180], [20, 120]);

    /// Build a threshold from `[min, max]` pairs for each channel.
    pub const fn new(r: [u8; 2], g: [u8; 2], b: [u8; 2]) -> Self {
        Self {
            r_min: r[0],
            r_max: r[1],
            g_min: g[0],
            g_max: g[1],
            b_min: b[0],
            b_max: b[1],
        }
    }

    /// Look up a preset by its lowercase name.
    ///
    /// # Examples
    ///
    /// ```
    /// use vistrack_imgproc::threshold::ColorThreshold;
    ///
    /// assert_eq!(ColorThreshold::from_name("skin"), Some(ColorThreshold::SKIN));
    /// assert_eq!(ColorThreshold::from_name("purple"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "yellow" => Some(Self::YELLOW),
            "skin" => Some(Self::SKIN),
            _ => None,
        }
    }

    /// Whether the pixel lies inside the box.
    #[inline]
    pub fn contains(&self, rgb: [u8; 3]) -> bool {
        let [r, g, b] = rgb;
        (self.r_min..=self.r_max).contains(&r)
            && (self.g_min..=self.g_max).contains(&g)
            && (self.b_min..=self.b_max).contains(&b)
    }

    /// Whether every lower bound is at most its upper bound.
    pub fn is_valid(&self) -> bool {
        self.r_min <= self.r_max && self.g_min <= self.g_max && self.b_min <= self.b_max
    }
}

impl Default for ColorThreshold {
    fn default() -> Self {
        Self::SKIN
    }
}
