//! Hex colour helpers shared by the evaluator and the variant generator.

use std::sync::OnceLock;

use regex::Regex;

/// Distance between black and white in RGB space.
const MAX_DISTANCE: f64 = 441.672_955_930_063_7; // sqrt(255² · 3)

/// Similarity given to a pair that cannot be compared.
pub const NEUTRAL_SIMILARITY: f64 = 0.5;

fn hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$")
            .expect("static regex")
    })
}

/// Parse `#rrggbb` (leading `#` optional). Anything else yields `None`.
pub fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let caps = hex_pattern().captures(color.trim())?;
    let mut rgb = [0u8; 3];
    for (i, slot) in rgb.iter_mut().enumerate() {
        *slot = u8::from_str_radix(&caps[i + 1], 16).ok()?;
    }
    Some(rgb)
}

pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Similarity on [0, 1]: identical strings score 1, parsable pairs score by
/// normalized Euclidean distance, everything else is neutral.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let (Some(x), Some(y)) = (parse_hex(a), parse_hex(b)) else {
        return NEUTRAL_SIMILARITY;
    };
    let distance = x
        .iter()
        .zip(y.iter())
        .map(|(&p, &q)| {
            let d = p as f64 - q as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt();
    (1.0 - distance / MAX_DISTANCE).clamp(0.0, 1.0)
}

/// Multiply every channel by `factor`, clamped to the byte range.
/// Returns `None` when the input is not a hex colour.
pub fn scale(color: &str, factor: f64) -> Option<String> {
    let rgb = parse_hex(color)?;
    let scaled = rgb.map(|c| (c as f64 * factor).round().clamp(0.0, 255.0) as u8);
    Some(to_hex(scaled))
}
