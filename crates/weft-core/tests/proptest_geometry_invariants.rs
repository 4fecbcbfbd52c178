//! Property-based invariant tests for pixel geometry (Point, Size, Rect).
//!
//! 1. Intersection is commutative and fits within both inputs.
//! 2. Union is commutative, idempotent, and contains both inputs.
//! 3. `from_corners` inverts `upper_left`/`lower_right`.
//! 4. `relative_to` and `translate` are inverses.
//! 5. Contains agrees with intersection.

use proptest::prelude::*;
use weft_core::geometry::{Point, Rect};

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-500i32..=500, -500i32..=500, 0i32..=500, 0i32..=500)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn point_strategy() -> impl Strategy<Value = Point> {
    (-1000i32..=1000, -1000i32..=1000).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn intersection_commutative(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn intersection_fits_within_both(a in rect_strategy(), b in rect_strategy()) {
        let inter = a.intersection(&b);
        if !inter.is_empty() {
            prop_assert!(inter.left() >= a.left() && inter.left() >= b.left());
            prop_assert!(inter.top() >= a.top() && inter.top() >= b.top());
            prop_assert!(inter.right() <= a.right() && inter.right() <= b.right());
            prop_assert!(inter.bottom() <= a.bottom() && inter.bottom() <= b.bottom());
        }
    }

    #[test]
    fn union_commutative_and_idempotent(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.union(&b), b.union(&a));
        prop_assert_eq!(a.union(&a), a);
    }

    #[test]
    fn union_contains_both(a in rect_strategy(), b in rect_strategy()) {
        let u = a.union(&b);
        for r in [a, b] {
            prop_assert!(u.left() <= r.left());
            prop_assert!(u.top() <= r.top());
            prop_assert!(u.right() >= r.right());
            prop_assert!(u.bottom() >= r.bottom());
        }
    }

    #[test]
    fn corners_round_trip(r in rect_strategy()) {
        prop_assert_eq!(Rect::from_corners(r.upper_left(), r.lower_right()), r);
    }

    #[test]
    fn relative_to_inverts_translate(r in rect_strategy(), origin in point_strategy()) {
        prop_assert_eq!(r.relative_to(origin).translate(origin), r);
    }

    #[test]
    fn contains_agrees_with_intersection(
        a in rect_strategy(),
        b in rect_strategy(),
        p in point_strategy(),
    ) {
        let inter = a.intersection(&b);
        prop_assert_eq!(inter.contains(p), a.contains(p) && b.contains(p));
    }
}
