use super::*;
use crate::space::{corners, Bound, Coords, PointRegistry, VertexId};
use proptest::prelude::*;

fn register_corners(bounds: &[Bound]) -> (PointRegistry, Vec<VertexId>) {
    let mut reg = PointRegistry::new();
    let ids = corners(bounds)
        .into_iter()
        .map(|c| reg.register(c))
        .collect();
    (reg, ids)
}

fn coords_of(reg: &PointRegistry, s: &Simplex) -> Vec<Coords> {
    s.vertices().iter().map(|&v| reg.coords(v).clone()).collect()
}

#[test]
fn two_dimensional_box_gives_two_triangles() {
    let (reg, ids) = register_corners(&[Bound::new(1, 10), Bound::new(1, 15)]);
    let cover = init_cover(&reg, &ids);
    assert_eq!(cover.len(), 2);
    assert_eq!(
        coords_of(&reg, &cover[0]),
        vec![
            Coords::from_slice(&[1, 1]),
            Coords::from_slice(&[10, 1]),
            Coords::from_slice(&[1, 15])
        ]
    );
    assert_eq!(
        coords_of(&reg, &cover[1]),
        vec![
            Coords::from_slice(&[10, 15]),
            Coords::from_slice(&[10, 1]),
            Coords::from_slice(&[1, 15])
        ]
    );
}

#[test]
fn unit_cube_needs_four_simplices() {
    let b = Bound::new(0, 1);
    let (reg, ids) = register_corners(&[b, b, b]);
    let s1 = build_simplex(ids[0], &ids, &reg);
    assert_eq!(s1.len(), 4);
    let cover = init_cover(&reg, &ids);
    assert_eq!(cover.len(), 4);
    assert!(next_seed(&ids, &cover, &reg).is_none());
}

#[test]
fn structural_equality_ignores_order_and_flag() {
    let mut a = Simplex::new(vec![VertexId(0), VertexId(1), VertexId(2)]);
    let b = Simplex::new(vec![VertexId(2), VertexId(0), VertexId(1)]);
    a.mark_terminal();
    assert_eq!(a, b);
    assert_ne!(a, Simplex::new(vec![VertexId(0), VertexId(1), VertexId(3)]));
}

#[test]
fn complex_rejects_duplicates_and_applies_batches() {
    let s0 = Simplex::new(vec![VertexId(0), VertexId(1), VertexId(2)]);
    let s1 = Simplex::new(vec![VertexId(3), VertexId(1), VertexId(2)]);
    let mut cx = SimplexComplex::from_cover(vec![s0.clone(), s1.clone(), s0.clone()]);
    assert_eq!(cx.len(), 2);
    assert!(!cx.insert(s1.clone()));

    let children = [s0.with_vertex(1, VertexId(4)), s0.with_vertex(2, VertexId(4))];
    cx.apply(vec![Replacement { index: 0, children }]);
    assert_eq!(cx.len(), 3);
    assert!(!cx.iter().any(|s| *s == s0));
    assert!(cx.covers(VertexId(0)));
    assert!(cx.covers(VertexId(4)));
}

#[test]
fn edges_sorted_longest_first() {
    let (reg, ids) = register_corners(&[Bound::new(1, 10), Bound::new(1, 15)]);
    let cover = init_cover(&reg, &ids);
    let edges = cover[0].sorted_edges(&reg);
    assert_eq!(edges.len(), 3);
    assert!((edges[0].length - (81.0f64 + 196.0).sqrt()).abs() < 1e-12);
    assert_eq!((edges[0].a, edges[0].b), (1, 2));
    assert!(edges.windows(2).all(|w| w[0].length >= w[1].length));
}

proptest! {
    #[test]
    fn cover_contains_every_corner(
        dims in prop::collection::vec((0i64..50, 1i64..50), 1..=6)
    ) {
        let bounds: Vec<Bound> = dims.iter().map(|&(lo, ext)| Bound::new(lo, lo + ext)).collect();
        let d = bounds.len();
        let (reg, ids) = register_corners(&bounds);
        prop_assert_eq!(ids.len(), 1 << d);
        let cover = init_cover(&reg, &ids);
        for &id in &ids {
            prop_assert!(cover.iter().any(|s| s.contains(id)));
        }
        for s in &cover {
            prop_assert_eq!(s.len(), d + 1);
            let mut v = s.vertices().to_vec();
            v.sort();
            v.dedup();
            prop_assert_eq!(v.len(), d + 1);
        }
        let cx = SimplexComplex::from_cover(cover.clone());
        prop_assert_eq!(cx.len(), cover.len());
    }
}
