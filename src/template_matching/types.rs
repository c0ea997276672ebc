/// Template matching data types
/// Outcome of matching one template against one captured region
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    /// Best score reached the threshold
    pub found: bool,
    /// Center of the best placement in region-local pixels
    pub center: (u32, u32),
    /// Top-left corner of the best placement in region-local pixels
    pub top_left: (u32, u32),
    /// Best correlation score in [-1, 1]
    pub score: f32,
}

impl MatchResult {
    /// Center translated into absolute screen coordinates for a region
    /// whose top-left corner sits at `(origin_x, origin_y)`
    pub fn screen_point(&self, origin_x: u32, origin_y: u32) -> (u32, u32) {
        (origin_x + self.center.0, origin_y + self.center.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_point_offsets_center() {
        let result = MatchResult {
            found: true,
            center: (125, 125),
            top_left: (100, 100),
            score: 1.0,
        };
        assert_eq!(result.screen_point(40, 60), (165, 185));
    }
}
