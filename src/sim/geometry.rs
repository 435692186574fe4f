//! Axis-aligned integer rectangles
//!
//! All collision in the arena is rectangle overlap on the pixel grid.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Direction;

/// Integer rectangle (x, y is the top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0, 0, 0, 0);

    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Positive width and height; the only overlap signal `intersect` gives
    #[inline]
    pub fn has_area(&self) -> bool {
        self.w > 0 && self.h > 0
    }

    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        intersect(self, other).has_area()
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }

    /// Copy shifted by whole multiples of its own size (sprite sheet cells)
    pub fn cell(&self, col: i32, row: i32) -> Rect {
        Rect::new(self.x + col * self.w, self.y + row * self.h, self.w, self.h)
    }

    /// Copy pushed `dist` pixels along `dir`
    pub fn shifted(&self, dir: Direction, dist: i32) -> Rect {
        let mut r = *self;
        match dir {
            Direction::Up => r.y -= dist,
            Direction::Right => r.x += dist,
            Direction::Down => r.y += dist,
            Direction::Left => r.x -= dist,
        }
        r
    }
}

/// Intersection of two rectangles
///
/// The result has non-positive width or height when the inputs do not
/// overlap; callers test `has_area()`.
pub fn intersect(a: &Rect, b: &Rect) -> Rect {
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let w = a.right().min(b.right()) - x;
    let h = a.bottom().min(b.bottom()) - y;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlapping_rects() {
        let a = Rect::new(0, 0, 32, 32);
        let b = Rect::new(16, 8, 32, 32);
        assert_eq!(intersect(&a, &b), Rect::new(16, 8, 16, 24));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0, 0, 16, 16);
        let b = Rect::new(16, 0, 16, 16);
        let r = intersect(&a, &b);
        assert_eq!(r.w, 0);
        assert!(!r.has_area());
    }

    #[test]
    fn test_disjoint_rects_have_negative_extent() {
        let a = Rect::new(0, 0, 8, 8);
        let b = Rect::new(100, 100, 8, 8);
        let r = intersect(&a, &b);
        assert!(r.w < 0 && r.h < 0);
    }

    #[test]
    fn test_zero_rect_never_overlaps() {
        let a = Rect::new(0, 0, 32, 32);
        assert!(!a.overlaps(&Rect::ZERO));
        assert!(!Rect::new(5, 5, 0, 0).overlaps(&a));
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (-400i32..400, -400i32..400, 0i32..96, 0i32..96)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn intersect_overlap_is_symmetric(a in arb_rect(), b in arb_rect()) {
            let ab = intersect(&a, &b);
            let ba = intersect(&b, &a);
            prop_assert_eq!(ab.has_area(), ba.has_area());
            prop_assert_eq!(ab.x, ba.x);
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn intersection_lies_inside_both(a in arb_rect(), b in arb_rect()) {
            let r = intersect(&a, &b);
            if r.has_area() {
                prop_assert!(r.x >= a.x && r.right() <= a.right());
                prop_assert!(r.y >= b.y && r.bottom() <= b.bottom());
            }
        }
    }
}
