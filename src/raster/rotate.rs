//! Quarter-turn rotation and display orientation
//!
//! All rotations here are exact index remaps, no resampling. One quarter-turn
//! is a transpose followed by reversing the row order, which turns the plane
//! 90 degrees counter-clockwise as seen on screen.
//!
//! ```text
//! 1 2 3        3 6
//! 4 5 6   ->   2 5
//!              1 4
//! ```

use log::trace;
use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};

/// Rotation in 90 degree steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Map a degree value onto a rotation. Only 0, 90, 180 and 270 are accepted.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i32 {
        self.quarter_turns() as i32 * 90
    }

    /// Number of successive quarter-turns this rotation stands for
    pub fn quarter_turns(self) -> usize {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }
}

/// Rotate a plane by one quarter-turn.
pub fn quarter_turn(plane: ArrayView2<'_, f64>) -> Array2<f64> {
    plane.t().slice(s![..;-1, ..]).to_owned()
}

/// Rotate a plane by `turns` quarter-turns. Four turns bring it back.
pub fn rotate_plane(plane: ArrayView2<'_, f64>, turns: usize) -> Array2<f64> {
    let mut rotated = plane.to_owned();
    for turn in 0..turns % 4 {
        trace!("quarter-turn {} of {} on {:?} plane", turn + 1, turns, rotated.dim());
        rotated = quarter_turn(rotated.view());
    }
    rotated
}

/// Rotate every channel of a `rows x cols x channels` array by the same
/// number of quarter-turns.
///
/// Channels are rotated one at a time and reassembled, so every channel comes
/// out in exactly the orientation of the first.
pub fn rotate_channels(pixels: ArrayView3<'_, f64>, turns: usize) -> Array3<f64> {
    let planes: Vec<Array2<f64>> = pixels
        .axis_iter(Axis(2))
        .map(|plane| rotate_plane(plane, turns))
        .collect();

    let (rows, cols) = planes.first().map_or((0, 0), Array2::dim);
    Array3::from_shape_fn((rows, cols, planes.len()), |(r, c, k)| planes[k][[r, c]])
}

/// Bring an elevation matrix into display orientation.
///
/// Elevation matrices store one row per easting and one column per northing
/// step, southernmost column first. Display rasters store one row per screen
/// line, top first. The transpose puts northing on the rows; flipping along
/// the row axis then puts the southern edge on the bottom line, so `m[0][0]`
/// lands in the bottom-left cell.
pub fn orient_south_up(matrix: ArrayView2<'_, f64>) -> Array2<f64> {
    matrix.t().slice(s![..;-1, ..]).to_owned()
}

/// Copy a single intensity plane into three identical channels.
pub fn replicate_channels(plane: ArrayView2<'_, f64>) -> Array3<f64> {
    let (rows, cols) = plane.dim();
    Array3::from_shape_fn((rows, cols, 3), |(r, c, _)| plane[[r, c]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array};

    fn sample_plane() -> Array2<f64> {
        arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])
    }

    fn sample_rgb() -> Array3<f64> {
        Array::from_shape_fn((2, 3, 3), |(r, c, k)| (r * 3 + c) as f64 + 100.0 * k as f64)
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(180), Some(Rotation::Deg180));
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(360), None);
        assert_eq!(Rotation::from_degrees(-90), None);
    }

    #[test]
    fn test_rotation_degrees_round_trip() {
        for degrees in [0, 90, 180, 270] {
            let rotation = Rotation::from_degrees(degrees).unwrap();
            assert_eq!(rotation.degrees(), degrees);
            assert_eq!(rotation.quarter_turns(), (degrees / 90) as usize);
        }
    }

    #[test]
    fn test_quarter_turn_is_counter_clockwise() {
        let turned = quarter_turn(sample_plane().view());
        assert_eq!(turned, arr2(&[[3.0, 6.0], [2.0, 5.0], [1.0, 4.0]]));
    }

    #[test]
    fn test_four_quarter_turns_restore_plane() {
        let plane = sample_plane();
        let mut turned = plane.clone();
        for _ in 0..4 {
            turned = quarter_turn(turned.view());
        }
        assert_eq!(turned, plane);
        assert_eq!(rotate_plane(plane.view(), 4), plane);
    }

    #[test]
    fn test_half_turn_equals_two_quarter_turns() {
        let plane = sample_plane();
        let twice = quarter_turn(quarter_turn(plane.view()).view());
        assert_eq!(rotate_plane(plane.view(), 2), twice);
        assert_eq!(twice, arr2(&[[6.0, 5.0, 4.0], [3.0, 2.0, 1.0]]));
    }

    #[test]
    fn test_rotate_channels_keeps_channels_in_step() {
        let rgb = sample_rgb();
        for turns in 0..4 {
            let rotated = rotate_channels(rgb.view(), turns);
            let reference = rotate_plane(rgb.index_axis(Axis(2), 0), turns);
            assert_eq!(rotated.len_of(Axis(2)), 3);
            for k in 0..3 {
                let expected = reference.mapv(|v| v + 100.0 * k as f64);
                assert_eq!(rotated.index_axis(Axis(2), k), expected, "channel {} turns {}", k, turns);
            }
        }
    }

    #[test]
    fn test_rotate_channels_half_turn_matches_two_quarter_turns() {
        let rgb = sample_rgb();
        let once = rotate_channels(rgb.view(), 1);
        let twice = rotate_channels(once.view(), 1);
        assert_eq!(rotate_channels(rgb.view(), 2), twice);
    }

    #[test]
    fn test_orient_south_up() {
        // out[r][c] = m[c][cols - 1 - r]
        let oriented = orient_south_up(sample_plane().view());
        assert_eq!(oriented, arr2(&[[3.0, 6.0], [2.0, 5.0], [1.0, 4.0]]));
        // first matrix column is the bottom line
        assert_eq!(oriented.row(2), arr1(&[1.0, 4.0]));
    }

    #[test]
    fn test_replicate_channels() {
        let plane = sample_plane();
        let rgb = replicate_channels(plane.view());
        assert_eq!(rgb.dim(), (2, 3, 3));
        for k in 0..3 {
            assert_eq!(rgb.index_axis(Axis(2), k), plane);
        }
    }
}
