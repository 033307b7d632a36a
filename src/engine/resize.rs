use crate::models::{ResizeMode, ResizeOptions};

/// Computes target pixel dimensions for `options`.
///
/// Parameters that make no sense for the mode (zero targets, a zero
/// percentage) leave the affected axis unchanged. Both results are at least 1.
pub fn compute_dimensions(width: u32, height: u32, options: &ResizeOptions) -> (u32, u32) {
    let (new_width, new_height) = match options.mode {
        ResizeMode::None => (width, height),
        ResizeMode::ExactSize => (
            non_zero_or(options.target_width, width),
            non_zero_or(options.target_height, height),
        ),
        ResizeMode::MaxWidth => {
            let target = options.target_width;
            if target > 0 && width > target {
                let height = if options.maintain_aspect_ratio {
                    scale(height, target, width)
                } else {
                    height
                };
                (target, height)
            } else {
                (width, height)
            }
        }
        ResizeMode::MaxHeight => {
            let target = options.target_height;
            if target > 0 && height > target {
                let width = if options.maintain_aspect_ratio {
                    scale(width, target, height)
                } else {
                    width
                };
                (width, target)
            } else {
                (width, height)
            }
        }
        ResizeMode::Percentage => {
            let percent = options.target_width;
            if percent > 0 {
                (scale(width, percent, 100), scale(height, percent, 100))
            } else {
                (width, height)
            }
        }
    };

    (new_width.max(1), new_height.max(1))
}

fn non_zero_or(value: u32, fallback: u32) -> u32 {
    if value > 0 {
        value
    } else {
        fallback
    }
}

// floor(value * numerator / denominator) without float rounding drift
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(numerator) / u64::from(denominator.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        assert_eq!(compute_dimensions(1000, 500, &ResizeOptions::default()), (1000, 500));
    }

    #[test]
    fn test_exact_size_per_axis() {
        assert_eq!(compute_dimensions(300, 300, &ResizeOptions::exact(600, 600)), (600, 600));
        assert_eq!(compute_dimensions(300, 200, &ResizeOptions::exact(0, 50)), (300, 50));
        assert_eq!(compute_dimensions(300, 200, &ResizeOptions::exact(120, 0)), (120, 200));
    }

    #[test]
    fn test_max_width_shrinks_proportionally() {
        assert_eq!(
            compute_dimensions(1000, 500, &ResizeOptions::max_width(400, true)),
            (400, 200)
        );
        assert_eq!(
            compute_dimensions(1000, 333, &ResizeOptions::max_width(500, true)),
            (500, 166)
        );
    }

    #[test]
    fn test_max_width_without_aspect_keeps_height() {
        assert_eq!(
            compute_dimensions(1000, 500, &ResizeOptions::max_width(400, false)),
            (400, 500)
        );
    }

    #[test]
    fn test_max_width_is_noop_on_smaller_images() {
        for (w, h) in [(1, 1), (17, 300), (399, 5000), (400, 10)] {
            assert_eq!(compute_dimensions(w, h, &ResizeOptions::max_width(400, true)), (w, h));
        }
    }

    #[test]
    fn test_max_height_symmetric() {
        assert_eq!(
            compute_dimensions(500, 1000, &ResizeOptions::max_height(400, true)),
            (200, 400)
        );
        assert_eq!(
            compute_dimensions(500, 300, &ResizeOptions::max_height(400, true)),
            (500, 300)
        );
    }

    #[test]
    fn test_percentage_floors_and_clamps() {
        for (w, h, p) in [(1000u32, 500u32, 50u32), (3, 7, 50), (333, 999, 33), (10, 10, 250)] {
            let expected_w = ((w as u64 * p as u64) / 100).max(1) as u32;
            let expected_h = ((h as u64 * p as u64) / 100).max(1) as u32;
            assert_eq!(
                compute_dimensions(w, h, &ResizeOptions::percentage(p)),
                (expected_w, expected_h)
            );
        }
        assert_eq!(compute_dimensions(1, 1, &ResizeOptions::percentage(10)), (1, 1));
    }

    #[test]
    fn test_zero_percentage_is_noop() {
        assert_eq!(compute_dimensions(640, 480, &ResizeOptions::percentage(0)), (640, 480));
    }

    #[test]
    fn test_extreme_aspect_clamps_to_one_pixel() {
        assert_eq!(
            compute_dimensions(10_000, 3, &ResizeOptions::max_width(100, true)),
            (100, 1)
        );
    }
}
