//! Nearest-palette-color search.

use crate::error::EngineError;
use crate::palette::Rgb;

/// Squared Euclidean distance between two colors in the RGB cube.
///
/// Comparing squared distances orders (and ties) colors exactly as the
/// true distance does, without the square root.
#[inline]
pub fn distance_squared(a: Rgb, b: Rgb) -> u32 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// Index of the palette entry closest to `color`.
///
/// Entries are scanned in order and only a strictly smaller distance
/// replaces the current best, so the first of several equally close
/// entries wins.
///
/// # Errors
/// * `EngineError::InvalidPalette` - If `palette` is empty
pub fn nearest_index(color: Rgb, palette: &[Rgb]) -> Result<usize, EngineError> {
    let (first, rest) = palette.split_first().ok_or(EngineError::InvalidPalette)?;

    let mut best = 0;
    let mut best_distance = distance_squared(color, *first);
    for (i, &candidate) in rest.iter().enumerate() {
        let distance = distance_squared(color, candidate);
        if distance < best_distance {
            best = i + 1;
            best_distance = distance;
        }
    }

    Ok(best)
}

/// The palette entry closest to `color`. See [`nearest_index`].
pub fn nearest(color: Rgb, palette: &[Rgb]) -> Result<Rgb, EngineError> {
    nearest_index(color, palette).map(|i| palette[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    const BW: [Rgb; 2] = [Rgb::BLACK, Rgb::WHITE];

    #[test]
    fn test_distance_squared() {
        assert_eq!(distance_squared(Rgb::BLACK, Rgb::WHITE), 3 * 255 * 255);
        assert_eq!(distance_squared(Rgb::new(1, 2, 3), Rgb::new(4, 6, 3)), 25);
    }

    #[test]
    fn test_nearest_black_and_white() {
        assert_eq!(nearest(Rgb::new(10, 10, 10), &BW).unwrap(), Rgb::BLACK);
        assert_eq!(nearest(Rgb::new(200, 200, 200), &BW).unwrap(), Rgb::WHITE);
        assert_eq!(nearest(Rgb::new(127, 127, 127), &BW).unwrap(), Rgb::BLACK);
        assert_eq!(nearest(Rgb::new(128, 128, 128), &BW).unwrap(), Rgb::WHITE);
    }

    #[test]
    fn test_first_entry_wins_exact_tie() {
        let gray = Rgb::new(100, 100, 100);
        let palette = [gray, gray];
        assert_eq!(nearest_index(gray, &palette).unwrap(), 0);

        // Equidistant from both: (0,0,0) and (2,0,0) around (1,0,0)
        let palette = [Rgb::new(2, 0, 0), Rgb::new(0, 0, 0)];
        assert_eq!(nearest_index(Rgb::new(1, 0, 0), &palette).unwrap(), 0);
    }

    #[test]
    fn test_single_entry_palette() {
        let only = [Rgb::new(9, 9, 9)];
        assert_eq!(nearest(Rgb::WHITE, &only).unwrap(), only[0]);
    }

    #[test]
    fn test_empty_palette_rejected() {
        assert_eq!(nearest(Rgb::WHITE, &[]), Err(EngineError::InvalidPalette));
    }

    #[test]
    fn test_nearest_is_unweighted() {
        // A perceptual metric would weight green; plain RGB distance does not.
        let palette = [Rgb::new(60, 0, 0), Rgb::new(0, 60, 0)];
        assert_eq!(nearest(Rgb::new(30, 30, 0), &palette).unwrap(), palette[0]);
        assert_eq!(nearest(Rgb::new(29, 31, 0), &palette).unwrap(), palette[1]);
    }
}
