use super::*;
use nalgebra::vector;
use proptest::prelude::*;

const GRID: usize = 4;

/// Unit edges of a `GRID × GRID` lattice: horizontal edges first, then vertical.
fn grid_edges() -> Vec<(Vec2, Vec2)> {
    let mut edges = Vec::new();
    for y in 0..GRID {
        for x in 0..GRID - 1 {
            edges.push((vector![x as f64, y as f64], vector![x as f64 + 1.0, y as f64]));
        }
    }
    for x in 0..GRID {
        for y in 0..GRID - 1 {
            edges.push((vector![x as f64, y as f64], vector![x as f64, y as f64 + 1.0]));
        }
    }
    edges
}

/// Bounded faces = E − V + C for a plane graph with C components (free points
/// count as components).
fn check_euler(d: &Decomposition) -> Result<(), TestCaseError> {
    let outlines = d
        .wires()
        .iter()
        .filter(|(id, w)| !w.is_root() && d.polygon(w.polygon).map(|p| p.outer_wire) != Some(*id))
        .count();
    let free = d.points().values().filter(|p| p.is_free()).count();
    let faces = d.segments().len() as i64 - d.points().len() as i64 + (outlines + free) as i64;
    prop_assert_eq!(d.polygons().len() as i64 - 1, faces);
    Ok(())
}

/// Does the unit edge `a → b` lie on the boundary of the lattice?
fn on_ring(a: Vec2, b: Vec2) -> bool {
    let last = (GRID - 1) as f64;
    let border = |c: f64| c == 0.0 || c == last;
    (a.x == b.x && border(a.x)) || (a.y == b.y && border(a.y))
}

/// Add lattice edge `k` if absent, delete it otherwise, then validate.
fn toggle(
    d: &mut Decomposition,
    present: &mut [Option<SegmentId>],
    edges: &[(Vec2, Vec2)],
    k: usize,
) -> Result<(), TestCaseError> {
    match present[k] {
        Some(s) => {
            d.delete_segment(s).unwrap();
            present[k] = None;
        }
        None => {
            let (a, b) = edges[k];
            let line = d.add_line(a, b).unwrap();
            prop_assert_eq!(line.value.len(), 1);
            present[k] = Some(line.value[0]);
        }
    }
    prop_assert!(d.check_consistency().is_ok(), "{:?}", d.check_consistency());
    check_euler(d)
}

proptest! {
    #[test]
    fn toggling_grid_edges_keeps_topology_valid(toggles in prop::collection::vec(0usize..2 * GRID * (GRID - 1), 1..40)) {
        let edges = grid_edges();
        let mut present: Vec<Option<SegmentId>> = vec![None; edges.len()];
        let mut d = Decomposition::new();
        for k in toggles {
            toggle(&mut d, &mut present, &edges, k)?;
        }

        // Removing everything again leaves only the outer polygon.
        for s in present.into_iter().flatten() {
            d.delete_segment(s).unwrap();
        }
        prop_assert!(d.check_consistency().is_ok());
        prop_assert_eq!(d.polygons().len(), 1);
        prop_assert_eq!(d.wires().len(), 1);
    }

    #[test]
    fn add_then_delete_edge_restores_counts(
        base in prop::collection::btree_set(0usize..2 * GRID * (GRID - 1), 0..16),
        k in 0usize..2 * GRID * (GRID - 1),
    ) {
        prop_assume!(!base.contains(&k));
        let edges = grid_edges();
        let mut d = Decomposition::new();
        for i in base {
            let (a, b) = edges[i];
            d.add_line(a, b).unwrap();
        }
        let counts = |d: &Decomposition| (d.polygons().len(), d.wires().len(), d.segments().len());
        let before = counts(&d);

        let (a, b) = edges[k];
        let line = d.add_line(a, b).unwrap();
        prop_assert_eq!(line.value.len(), 1);
        d.delete_segment(line.value[0]).unwrap();
        prop_assert!(d.check_consistency().is_ok(), "{:?}", d.check_consistency());
        prop_assert_eq!(counts(&d), before);
    }

    #[test]
    fn toggling_inside_closed_ring_keeps_holes_valid(toggles in prop::collection::vec(0usize..2 * GRID * (GRID - 1), 1..40)) {
        let edges = grid_edges();
        let mut present: Vec<Option<SegmentId>> = vec![None; edges.len()];
        let mut d = Decomposition::new();
        for k in 0..edges.len() {
            if on_ring(edges[k].0, edges[k].1) {
                toggle(&mut d, &mut present, &edges, k)?;
            }
        }
        prop_assert_eq!(d.polygons().len(), 2);

        // Interior edges only: islands float inside the ring and chords split the
        // polygon that owns them.
        for k in toggles {
            if !on_ring(edges[k].0, edges[k].1) {
                toggle(&mut d, &mut present, &edges, k)?;
            }
        }

        // Tearing down the ring first merges every face, holes included, into
        // the outer polygon.
        let (ring, inner): (Vec<usize>, Vec<usize>) =
            (0..edges.len()).partition(|k| on_ring(edges[*k].0, edges[*k].1));
        for k in ring.into_iter().chain(inner) {
            if present[k].is_some() {
                toggle(&mut d, &mut present, &edges, k)?;
            }
        }
        prop_assert_eq!(d.polygons().len(), 1);
        prop_assert_eq!(d.wires().len(), 1);
    }
}
