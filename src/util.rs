use crate::math::*;
use std::ops::Range;

pub trait RangeExt {
    fn size(&self) -> TV;

    fn center(&self) -> TV;

    fn contains_point(&self, x: &TV) -> bool;
}

impl RangeExt for Range<TV> {
    fn size(&self) -> TV {
        self.end - self.start
    }

    fn center(&self) -> TV {
        0.5 * (self.start + self.end)
    }

    /// Note that this treats the range as open on both ends.
    fn contains_point(&self, x: &TV) -> bool {
        self.start.x < x.x && self.start.y < x.y && self.end.x > x.x && self.end.y > x.y
    }
}
