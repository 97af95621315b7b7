use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct RGB colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<[u8; 3]> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

/// Colour for the `index`-th bar among `n`.
pub fn bar_color(index: usize, n: usize) -> [u8; 3] {
    generate_palette(n)
        .get(index)
        .copied()
        .unwrap_or([128, 128, 128])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let colours = generate_palette(4);
        assert_eq!(colours.len(), 4);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn out_of_range_bar_is_grey() {
        assert_eq!(bar_color(5, 3), [128, 128, 128]);
    }
}
