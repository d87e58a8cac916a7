use super::*;
use proptest::prelude::*;

fn c(values: &[i64]) -> Coords {
    Coords::from_slice(values)
}

#[test]
fn corners_follow_mask_bits() {
    let bounds = [Bound::new(1, 10), Bound::new(1, 15)];
    let pts = corners(&bounds);
    assert_eq!(pts, vec![c(&[1, 1]), c(&[10, 1]), c(&[1, 15]), c(&[10, 15])]);
    assert_eq!(make_corner(&bounds, 0b10), c(&[1, 15]));
}

#[test]
fn corners_count_is_power_of_two() {
    let bounds = [Bound::new(1, 10), Bound::new(1, 5), Bound::new(1, 50)];
    assert_eq!(corners(&bounds).len(), 8);
}

#[test]
fn empty_or_single_valued_axes_are_degenerate() {
    assert!(Bound::new(3, 3).is_degenerate());
    assert!(Bound::new(1, 0).is_degenerate());
    assert!(!Bound::new(1, 2).is_degenerate());
}

#[test]
fn midpoint_floors() {
    assert_eq!(midpoint(&c(&[10, 1]), &c(&[1, 15])), c(&[5, 8]));
    assert_eq!(midpoint(&c(&[1, 1]), &c(&[2, 2])), c(&[1, 1]));
}

#[test]
fn vector_helpers() {
    let a = c(&[3, 4]);
    let b = c(&[0, 0]);
    assert_eq!(a.add(&b), a);
    assert_eq!(a.sub(&a), b);
    assert_eq!(c(&[7, -3]).floor_div(2), c(&[3, -2]));
    assert!((a.distance(&b) - 5.0).abs() < 1e-12);
}

#[test]
fn common_edge_cases() {
    let v1 = c(&[1, 10, 20]);
    assert!(!have_common_edge(&v1, &v1.clone()));
    assert!(have_common_edge(&v1, &c(&[1, 10, 1])));
    assert!(!have_common_edge(&v1, &c(&[1, 20, 30])));
}

#[test]
fn precedes_inspects_first_difference_only() {
    assert!(c(&[1, 9]).precedes(&c(&[2, 0])));
    assert!(!c(&[2, 0]).precedes(&c(&[1, 9])));
    assert!(!c(&[1, 1]).precedes(&c(&[1, 1])));
}

#[test]
fn registry_dedups_and_shares_elevation() {
    let mut reg = PointRegistry::new();
    let a = reg.register(c(&[5, 8]));
    let b = reg.register(c(&[5, 8]));
    assert_eq!(a, b);
    assert_eq!(reg.len(), 1);
    assert!(!reg.vertex(a).is_measured());
    reg.set_elevation(a, 225);
    assert_eq!(reg.elevation(b), 225);
    assert_eq!(reg.lookup(&c(&[5, 8])), Some(a));
    assert_eq!(reg.lookup(&c(&[8, 5])), None);
}

proptest! {
    #[test]
    fn common_edge_is_symmetric(a in prop::collection::vec(-5i64..5, 3), b in prop::collection::vec(-5i64..5, 3)) {
        let (a, b) = (Coords::new(a), Coords::new(b));
        prop_assert_eq!(have_common_edge(&a, &b), have_common_edge(&b, &a));
        prop_assert!(!have_common_edge(&a, &a));
    }

    #[test]
    fn midpoint_lies_within_segment_box(a in prop::collection::vec(0i64..1000, 4), b in prop::collection::vec(0i64..1000, 4)) {
        let (a, b) = (Coords::new(a), Coords::new(b));
        let m = midpoint(&a, &b);
        for d in 0..4 {
            prop_assert!(m.get(d) >= a.get(d).min(b.get(d)));
            prop_assert!(m.get(d) <= a.get(d).max(b.get(d)));
        }
    }
}
