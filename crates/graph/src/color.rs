use serde::{Deserialize, Serialize};

/// Node and edge colors of the default theme
pub mod palette {
    pub const SUBJECT: &str = "#6366f1";
    pub const SUBJECT_HIGHLIGHT: &str = "#fbbf24";
    pub const CORRESPONDENT: &str = "#3b82f6";
    pub const LETTER: &str = "#8b5cf6";
    pub const PERSON_MENTION_BORDER: &str = "#60a5fa";
    pub const PERSON_MENTION_FILL: &str = "#dbeafe";
    pub const PERSON_MENTION_EDGE: &str = "#2563eb";
    pub const PLACE_BORDER: &str = "#10b981";
    pub const PLACE_FILL: &str = "#d1fae5";
    pub const PLACE_EDGE: &str = "#059669";
    pub const ORGANIZATION_BORDER: &str = "#f59e0b";
    pub const ORGANIZATION_FILL: &str = "#fef3c7";
    pub const ORGANIZATION_EDGE: &str = "#d97706";

    /// Era buckets, earliest first
    pub const ERAS: [&str; 4] = ["#3b82f6", "#10b981", "#f59e0b", "#ef4444"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from float channels, rounding and clamping to 0..=255
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        Self::new(channel(r), channel(g), channel(b))
    }

    /// `h` in degrees, `s` and `l` in 0.0..=1.0
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let h = h.rem_euclid(360.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h {
            h if h < 60.0 => (c, x, 0.0),
            h if h < 120.0 => (x, c, 0.0),
            h if h < 180.0 => (0.0, c, x),
            h if h < 240.0 => (0.0, x, c),
            h if h < 300.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Self::from_f64((r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0)
    }

    /// Parse `#rrggbb`, `#rgb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`; alpha is dropped
    pub fn parse(color: &str) -> Option<Self> {
        let color = color.trim();
        if let Some(hex) = color.strip_prefix('#') {
            return match hex.len() {
                6 => Some(Self::new(
                    u8::from_str_radix(&hex[0..2], 16).ok()?,
                    u8::from_str_radix(&hex[2..4], 16).ok()?,
                    u8::from_str_radix(&hex[4..6], 16).ok()?,
                )),
                3 => {
                    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
                    Some(Self::new(digit(0)?, digit(1)?, digit(2)?))
                }
                _ => None,
            };
        }

        let inner = color
            .strip_prefix("rgba(")
            .or_else(|| color.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let parts: Vec<f64> = inner
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [r, g, b] | [r, g, b, _] => Some(Self::from_f64(*r, *g, *b)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Shift every channel by `percent` of full scale (negative darkens)
    pub fn adjust_brightness(&self, percent: f64) -> Self {
        let amt = (2.55 * percent).round();
        Self::from_f64(
            f64::from(self.r) + amt,
            f64::from(self.g) + amt,
            f64::from(self.b) + amt,
        )
    }
}

fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Alpha component of an `rgba(..)` color, 1.0 otherwise
pub fn alpha_of(color: &str) -> f64 {
    color
        .trim()
        .strip_prefix("rgba(")
        .and_then(|s| s.strip_suffix(')'))
        .and_then(|s| s.rsplit(',').next())
        .and_then(|a| a.trim().parse::<f64>().ok())
        .map(|a| a.clamp(0.0, 1.0))
        .unwrap_or(1.0)
}

/// Color along the time gradient for `progress` in 0.0..=1.0:
/// deep blue for the earliest letters through lighter cyan for the latest
pub fn time_gradient(progress: f64) -> Rgb {
    let p = progress.clamp(0.0, 1.0);
    Rgb::from_hsl(220.0 - p * 60.0, 0.8, 0.35 + p * 0.30)
}

/// Era bucket color for `progress` in 0.0..=1.0
pub fn era_color(progress: f64) -> &'static str {
    let bucket = match progress {
        p if p < 0.25 => 0,
        p if p < 0.5 => 1,
        p if p < 0.75 => 2,
        _ => 3,
    };
    palette::ERAS[bucket]
}

/// Red → violet ramp used for degree intensity
pub fn degree_ramp(intensity: f64) -> String {
    let i = intensity.clamp(0.0, 1.0);
    format!(
        "rgb({}, {}, {})",
        channel(255.0 * (1.0 - i)),
        channel(100.0 * i),
        channel(255.0 * i)
    )
}

/// Orange → green ramp used for betweenness intensity
pub fn betweenness_ramp(intensity: f64) -> String {
    let i = intensity.clamp(0.0, 1.0);
    format!(
        "rgb({}, {}, {})",
        channel(255.0 - 100.0 * i),
        channel(100.0 + 100.0 * i),
        channel(50.0 * i)
    )
}

/// Translucent blue whose opacity grows with edge weight intensity
pub fn weight_ramp(intensity: f64) -> String {
    let i = intensity.clamp(0.0, 1.0);
    format!("rgba(59, 130, 246, {:.2})", 0.3 + 0.7 * i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(Rgb::from_hsl(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsl(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsl(240.0, 1.0, 0.5), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsl(0.0, 0.0, 1.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(Rgb::parse("#6366f1"), Some(Rgb::new(0x63, 0x66, 0xf1)));
        assert_eq!(Rgb::parse("#fff"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::parse("rgb(255, 0, 127.6)"), Some(Rgb::new(255, 0, 128)));
        assert_eq!(Rgb::parse("rgba(59, 130, 246, 0.65)"), Some(Rgb::new(59, 130, 246)));
        assert_eq!(Rgb::parse("blue"), None);
        assert_eq!(Rgb::new(1, 2, 255).to_hex(), "#0102ff");
    }

    #[test]
    fn test_brightness_clamps() {
        let c = Rgb::new(10, 100, 250);
        assert_eq!(c.adjust_brightness(-20.0), Rgb::new(0, 49, 199));
        assert_eq!(c.adjust_brightness(10.0), Rgb::new(36, 126, 255));
    }

    #[test]
    fn test_gradient_endpoints_differ() {
        let early = time_gradient(0.0);
        let late = time_gradient(1.0);
        assert_ne!(early, late);
        assert_eq!(time_gradient(-3.0), early);
        // Earliest letters are the darkest
        let luma = |c: Rgb| u32::from(c.r) + u32::from(c.g) + u32::from(c.b);
        assert!(luma(early) < luma(late));
    }

    #[test]
    fn test_alpha_and_ramps() {
        assert_eq!(alpha_of("#ffffff"), 1.0);
        assert_eq!(alpha_of(&weight_ramp(1.0)), 1.0);
        assert_eq!(degree_ramp(0.0), "rgb(255, 0, 0)");
        assert_eq!(betweenness_ramp(1.0), "rgb(155, 200, 50)");
        assert_eq!(era_color(0.9), "#ef4444");
    }
}
