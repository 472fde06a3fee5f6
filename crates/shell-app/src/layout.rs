//! Placement of the chrome strip and the content surface inside the window.

use shell_surface::Bounds;

/// Title-bar strip across the top of the window.
pub fn chrome_bounds(width: u32, height: u32, header_height: u32) -> Bounds {
    Bounds::new(0, 0, width, header_height.min(height))
}

/// Everything below the title-bar strip, recomputed from the current
/// content-area size.
pub fn content_bounds(width: u32, height: u32, header_height: u32) -> Bounds {
    Bounds::new(
        0,
        i32::try_from(header_height).unwrap_or(i32::MAX),
        width,
        height.saturating_sub(header_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_starts_below_header() {
        assert_eq!(content_bounds(1000, 700, 30), Bounds::new(0, 30, 1000, 670));
        assert_eq!(chrome_bounds(1000, 700, 30), Bounds::new(0, 0, 1000, 30));
    }

    #[test]
    fn tiny_windows_saturate() {
        assert_eq!(content_bounds(200, 20, 30), Bounds::new(0, 30, 200, 0));
        assert_eq!(chrome_bounds(200, 20, 30), Bounds::new(0, 0, 200, 20));
    }

    #[test]
    fn no_header_fills_window() {
        assert_eq!(content_bounds(640, 480, 0), Bounds::new(0, 0, 640, 480));
    }
}
