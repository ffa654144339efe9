use eframe::egui::Color32;
use palette::{IntoColor, Lab, Mix, Srgb};

// ---------------------------------------------------------------------------
// Diverging colour scale (coolwarm)
// ---------------------------------------------------------------------------

const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

/// Colour used for cells without a value (NaN correlations).
pub const MISSING: Color32 = Color32::from_gray(128);

fn to_lab((r, g, b): (u8, u8, u8)) -> Lab {
    Srgb::new(r, g, b).into_format::<f32>().into_color()
}

/// Map `value` in `[-1, 1]` onto blue → light grey → red, interpolated in
/// CIELAB so the midpoint stays neutral. Out-of-range values are clamped.
pub fn diverging(value: f64) -> Color32 {
    if !value.is_finite() {
        return MISSING;
    }
    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0) as f32;
    let (from, to, factor) = if t < 0.5 {
        (COOL, NEUTRAL, t * 2.0)
    } else {
        (NEUTRAL, WARM, (t - 0.5) * 2.0)
    };

    let mixed = to_lab(from).mix(to_lab(to), factor);
    let rgb: Srgb = mixed.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Black or white, whichever reads better on top of `diverging(value)`.
pub fn annotation_color(value: f64) -> Color32 {
    if value.is_finite() && value.abs() > 0.6 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color32, (r, g, b): (u8, u8, u8)) -> bool {
        let d = |x: u8, y: u8| (x as i16 - y as i16).abs() <= 2;
        d(a.r(), r) && d(a.g(), g) && d(a.b(), b)
    }

    #[test]
    fn endpoints_and_midpoint() {
        assert!(close(diverging(-1.0), COOL));
        assert!(close(diverging(0.0), NEUTRAL));
        assert!(close(diverging(1.0), WARM));
    }

    #[test]
    fn clamps_and_handles_nan() {
        assert_eq!(diverging(5.0), diverging(1.0));
        assert_eq!(diverging(-3.0), diverging(-1.0));
        assert_eq!(diverging(f64::NAN), MISSING);
    }

    #[test]
    fn negative_is_bluer_than_positive() {
        let neg = diverging(-0.7);
        let pos = diverging(0.7);
        assert!(neg.b() > neg.r());
        assert!(pos.r() > pos.b());
    }
}
