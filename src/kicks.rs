//! Wall kick offsets for rotation
//!
//! If a rotated piece collides at its current origin, these horizontal
//! offsets are tried in order. Smaller kicks come first, left before right.

/// Horizontal kick offsets tried after the in-place test fails
pub const WALL_KICKS: [i32; 4] = [-1, 1, -2, 2];

/// Every column offset a rotation attempt tests, in order
pub fn rotation_attempts() -> impl Iterator<Item = i32> {
    std::iter::once(0).chain(WALL_KICKS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_is_in_place() {
        assert_eq!(rotation_attempts().next(), Some(0));
    }

    #[test]
    fn test_attempt_order() {
        let attempts: Vec<i32> = rotation_attempts().collect();
        assert_eq!(attempts, vec![0, -1, 1, -2, 2]);
    }
}
