//! Pure Business Logic Functions
//!
//! Farb-Funktionen ohne Hardware-Dependencies (testbar!)

use rgb::RGB8;

/// Skaliert eine Farbe mit einem Helligkeits-Level (0-255)
///
/// Level 255 lässt die Farbe unverändert, Level 0 ergibt Schwarz.
///
/// # Beispiele
///
/// ```
/// # use rgb::RGB8;
/// # use esp_core::scale_color;
/// let color = RGB8 { r: 200, g: 100, b: 0 };
/// assert_eq!(scale_color(color, 255), color);
/// assert_eq!(scale_color(color, 0), RGB8 { r: 0, g: 0, b: 0 });
/// ```
pub fn scale_color(color: RGB8, level: u8) -> RGB8 {
    let scale = |channel: u8| ((u16::from(channel) * (u16::from(level) + 1)) >> 8) as u8;
    RGB8 {
        r: scale(color.r),
        g: scale(color.g),
        b: scale(color.b),
    }
}

/// Farbrad: bildet 0-255 auf den Regenbogen ab (Rot → Grün → Blau → Rot)
pub fn color_wheel(position: u8) -> RGB8 {
    let position = 255 - position;
    if position < 85 {
        RGB8 {
            r: 255 - position * 3,
            g: 0,
            b: position * 3,
        }
    } else if position < 170 {
        let position = position - 85;
        RGB8 {
            r: 0,
            g: position * 3,
            b: 255 - position * 3,
        }
    } else {
        let position = position - 170;
        RGB8 {
            r: position * 3,
            g: 255 - position * 3,
            b: 0,
        }
    }
}

/// Dreieckswelle über eine Phase 0-255: 0 → 254 → 0
pub fn triangle_wave(phase: u8) -> u8 {
    if phase < 128 {
        phase * 2
    } else {
        (255 - phase) * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_wheel_red_green_blue() {
        assert_eq!(color_wheel(0), RGB8 { r: 255, g: 0, b: 0 });
        assert_eq!(color_wheel(85), RGB8 { r: 0, g: 255, b: 0 });
        assert_eq!(color_wheel(170), RGB8 { r: 0, g: 0, b: 255 });
    }

    #[test]
    fn test_scale_color_half() {
        let white = RGB8 {
            r: 255,
            g: 255,
            b: 255,
        };
        assert_eq!(scale_color(white, 127), RGB8 { r: 127, g: 127, b: 127 });
    }

    #[test]
    fn test_triangle_wave_shape() {
        assert_eq!(triangle_wave(0), 0);
        assert_eq!(triangle_wave(64), 128);
        assert_eq!(triangle_wave(127), 254);
        assert_eq!(triangle_wave(128), 254);
        assert_eq!(triangle_wave(255), 0);
    }
}
