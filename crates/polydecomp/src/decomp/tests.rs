use super::*;
use nalgebra::vector;

fn v(x: f64, y: f64) -> Vec2 {
    vector![x, y]
}

/// Counterclockwise axis-aligned rectangle, one `add_line` per edge.
fn rect(d: &mut Decomposition, x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<PolygonChange> {
    let corners = [v(x0, y0), v(x1, y0), v(x1, y1), v(x0, y1)];
    let mut changes = Vec::new();
    for k in 0..4 {
        let e = d.add_line(corners[k], corners[(k + 1) % 4]).unwrap();
        changes.extend(e.changes);
    }
    d.check_consistency().unwrap();
    changes
}

fn point_at(d: &Decomposition, xy: Vec2) -> PointId {
    match d.snap_point(xy) {
        Snap::Point(p) => p,
        other => panic!("no point at {xy:?}: {other:?}"),
    }
}

#[test]
fn insert_segment_brackets_direction() {
    let mut d = Decomposition::new();
    let free = d.add_point(v(5.0, 5.0)).unwrap().value;
    assert_eq!(d.insert_segment(free, v(1.0, 0.0)).unwrap(), None);

    let s0 = d.add_line(v(0.0, 0.0), v(1.0, 0.0)).unwrap().value[0];
    let p0 = point_at(&d, v(0.0, 0.0));
    let one = d.insert_segment(p0, v(0.0, 1.0)).unwrap().unwrap();
    assert_eq!(one.prev, HalfEdge::new(s0, Side::Right));
    assert_eq!(one.next, HalfEdge::new(s0, Side::Left));
    assert_eq!(one.wire, d.wire_of(HalfEdge::new(s0, Side::Left)));

    let s1 = d.add_line(v(0.0, 0.0), v(0.0, 1.0)).unwrap().value[0];
    let down = d.insert_segment(p0, v(-1.0, -1.0)).unwrap().unwrap();
    assert_eq!(down.prev, HalfEdge::new(s0, Side::Right));
    assert_eq!(down.next, HalfEdge::new(s1, Side::Left));
    let diag = d.insert_segment(p0, v(1.0, 1.0)).unwrap().unwrap();
    assert_eq!(diag.prev, HalfEdge::new(s1, Side::Right));
    assert_eq!(diag.next, HalfEdge::new(s0, Side::Left));

    assert!(matches!(
        d.insert_segment(p0, v(2.0, 0.0)),
        Err(DecompError::DegenerateInput { .. })
    ));
}

#[test]
fn contains_point_is_half_open() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    let face = d.polygon(PolygonId(1)).unwrap().outer_wire;
    assert!(!d.contains_point(face, v(-0.0001, 1.0)).unwrap());
    assert!(!d.contains_point(face, v(2.0001, 1.0)).unwrap());
    assert!(d.contains_point(face, v(0.0001, 1.0)).unwrap());
    assert!(d.contains_point(face, v(1.999, 1.0)).unwrap());
    assert!(d.contains_point(d.root_wire(), v(1e9, -1e9)).unwrap());

    let s = d.segments().keys().next().unwrap();
    // Segment 0 runs (0,0) → (2,0): horizontal, never crossed.
    assert!(!d.is_on_x_line(s, v(1.0, 0.0)).unwrap());
}

#[test]
fn closing_a_loop_adds_a_polygon() {
    let mut d = Decomposition::new();
    let changes = rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    assert_eq!(changes[0], PolygonChange::None);
    assert_eq!(changes[1], PolygonChange::Shape(vec![PolygonId(0)]));
    assert_eq!(
        changes.last(),
        Some(&PolygonChange::Add {
            parent: PolygonId(0),
            new: PolygonId(1)
        })
    );
    assert_eq!(d.polygons().len(), 2);
    assert_eq!(d.wires().len(), 3);
    let verts = d.polygon_vertices(PolygonId(1)).unwrap();
    assert_eq!(verts.len(), 4);
    assert!((d.wire_area(d.polygon(PolygonId(1)).unwrap().outer_wire).unwrap() - 4.0).abs() < 1e-12);
}

#[test]
fn nested_squares_have_depths_0_2_4() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 3.0, 3.0);
    rect(&mut d, 1.0, 1.0, 2.0, 2.0);
    assert_eq!(d.depth(PolygonId(0)).unwrap(), 0);
    assert_eq!(d.depth(PolygonId(1)).unwrap(), 2);
    assert_eq!(d.depth(PolygonId(2)).unwrap(), 4);
    assert_eq!(d.find_polygon(v(1.5, 1.5)), PolygonId(2));
    assert_eq!(d.find_polygon(v(0.5, 1.5)), PolygonId(1));
    assert_eq!(d.find_polygon(v(5.0, 1.5)), PolygonId(0));
    assert_eq!(
        d.polygon_childs(PolygonId(0)).unwrap(),
        vec![PolygonId(0), PolygonId(1), PolygonId(2)]
    );
    assert_eq!(d.holes(PolygonId(1)).unwrap().len(), 1);
}

#[test]
fn connecting_two_components_joins_wires() {
    let mut d = Decomposition::new();
    d.add_line(v(0.0, 0.0), v(1.0, 0.0)).unwrap();
    d.add_line(v(0.0, 2.0), v(1.0, 2.0)).unwrap();
    assert_eq!(d.wires().len(), 3);
    let e = d.add_line(v(1.0, 0.0), v(1.0, 2.0)).unwrap();
    assert_eq!(e.last_change(), PolygonChange::Shape(vec![PolygonId(0)]));
    assert_eq!(d.wires().len(), 2);
    d.check_consistency().unwrap();

    let e = d.add_line(v(0.0, 0.0), v(0.0, 2.0)).unwrap();
    assert!(matches!(e.last_change(), PolygonChange::Add { .. }));
    assert_eq!(d.wires().len(), 3);
    assert_eq!(d.polygons().len(), 2);
    d.check_consistency().unwrap();
}

#[test]
fn chord_splits_polygon_and_distributes_contents() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    rect(&mut d, 1.2, 1.3, 1.6, 1.7);
    let up = d.add_point(v(0.5, 1.5)).unwrap().value;
    let low = d.add_point(v(0.5, 0.5)).unwrap().value;
    assert_eq!(d.point(up).unwrap().poly, Some(PolygonId(1)));

    let e = d.add_line(v(0.0, 1.0), v(2.0, 1.0)).unwrap();
    assert_eq!(e.value.len(), 1);
    assert_eq!(
        e.changes[0],
        PolygonChange::Shape(vec![PolygonId(0), PolygonId(1)])
    );
    assert_eq!(
        e.last_change(),
        PolygonChange::Split {
            orig: PolygonId(1),
            new: PolygonId(3)
        }
    );
    d.check_consistency().unwrap();
    assert_eq!(d.point(up).unwrap().poly, Some(PolygonId(3)));
    assert_eq!(d.point(low).unwrap().poly, Some(PolygonId(1)));
    assert_eq!(d.polygon_childs(PolygonId(3)).unwrap(), vec![PolygonId(3), PolygonId(2)]);
    assert_eq!(d.polygon_childs(PolygonId(1)).unwrap(), vec![PolygonId(1)]);
    assert_eq!(d.depth(PolygonId(2)).unwrap(), 4);

    let chord = e.value[0];
    let [m0, m1] = d.segment(chord).unwrap().vtxs;
    let e = d.delete_segment(chord).unwrap();
    assert_eq!(
        e.last_change(),
        PolygonChange::Join {
            kept: PolygonId(1),
            removed: PolygonId(3)
        }
    );
    d.check_consistency().unwrap();
    assert_eq!(d.point(up).unwrap().poly, Some(PolygonId(1)));
    assert_eq!(d.polygon_childs(PolygonId(1)).unwrap(), vec![PolygonId(1), PolygonId(2)]);
    assert_eq!(d.polygons().len(), 3);

    assert_eq!(d.segments().len(), 10);
    d.join_segments(m0).unwrap();
    d.check_consistency().unwrap();
    d.join_segments(m1).unwrap();
    d.check_consistency().unwrap();
    assert_eq!(d.segments().len(), 8);
    assert_eq!(d.points().len(), 10);
}

#[test]
fn chord_hands_enclosed_hole_to_new_polygon() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    rect(&mut d, 1.2, 1.3, 1.6, 1.7);
    let hole = d.holes(PolygonId(1)).unwrap()[0];

    let e = d.add_line(v(0.0, 1.0), v(2.0, 1.0)).unwrap();
    assert_eq!(
        e.last_change(),
        PolygonChange::Split {
            orig: PolygonId(1),
            new: PolygonId(3)
        }
    );
    d.check_consistency().unwrap();
    assert_eq!(d.wire(hole).unwrap().polygon, PolygonId(3));
    assert_eq!(d.holes(PolygonId(3)).unwrap(), vec![hole]);
    assert!(d.holes(PolygonId(1)).unwrap().is_empty());

    // Free space of the upper polygon attaches to the hole.
    let e = d.add_line(v(0.5, 1.5), v(1.2, 1.5)).unwrap();
    assert_eq!(e.last_change(), PolygonChange::Shape(vec![PolygonId(3)]));
    d.check_consistency().unwrap();
}

#[test]
fn joining_faces_hands_over_holes_and_free_points() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    let chord = d.add_line(v(0.0, 1.0), v(2.0, 1.0)).unwrap();
    assert_eq!(
        chord.last_change(),
        PolygonChange::Split {
            orig: PolygonId(1),
            new: PolygonId(2)
        }
    );
    rect(&mut d, 1.2, 1.3, 1.6, 1.7);
    let hole = d.holes(PolygonId(2)).unwrap()[0];
    let free = d.add_point(v(0.5, 1.5)).unwrap().value;
    assert_eq!(d.point(free).unwrap().poly, Some(PolygonId(2)));

    let e = d.delete_segment(chord.value[0]).unwrap();
    assert_eq!(
        e.last_change(),
        PolygonChange::Join {
            kept: PolygonId(1),
            removed: PolygonId(2)
        }
    );
    d.check_consistency().unwrap();
    assert_eq!(d.wire(hole).unwrap().polygon, PolygonId(1));
    assert_eq!(d.holes(PolygonId(1)).unwrap(), vec![hole]);
    assert_eq!(d.point(free).unwrap().poly, Some(PolygonId(1)));
    assert_eq!(d.polygon_childs(PolygonId(1)).unwrap(), vec![PolygonId(1), PolygonId(3)]);

    let e = d.add_line(v(0.5, 1.5), v(1.2, 1.5)).unwrap();
    assert_eq!(e.last_change(), PolygonChange::Shape(vec![PolygonId(1)]));
    d.check_consistency().unwrap();
}

#[test]
fn split_then_delete_restores_counts() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    let before = (d.polygons().len(), d.wires().len());
    let e = d.add_line(v(0.0, 0.0), v(2.0, 2.0)).unwrap();
    assert!(matches!(e.last_change(), PolygonChange::Split { .. }));
    let root = d.root_wire();
    let outline = *d.wire(root).unwrap().childs.iter().next().unwrap();
    assert_eq!(d.wire(root).unwrap().childs.len(), 1);
    assert_eq!(d.wire(outline).unwrap().childs.len(), 2);

    d.delete_segment(e.value[0]).unwrap();
    d.check_consistency().unwrap();
    assert_eq!((d.polygons().len(), d.wires().len()), before);
    assert_eq!(d.wire(outline).unwrap().childs.len(), 1);
}

#[test]
fn deleting_lone_segment_frees_its_points() {
    let mut d = Decomposition::new();
    let s = d.add_line(v(0.0, 0.0), v(1.0, 0.0)).unwrap().value[0];
    let e = d.delete_segment(s).unwrap();
    assert_eq!(e.last_change(), PolygonChange::None);
    assert_eq!(d.wires().len(), 1);
    assert_eq!(d.points().len(), 2);
    assert_eq!(d.polygon(PolygonId(0)).unwrap().free_points.len(), 2);
    d.check_consistency().unwrap();

    let p = point_at(&d, v(0.0, 0.0));
    d.delete_point(p).unwrap();
    assert_eq!(d.points().len(), 1);
    d.check_consistency().unwrap();
}

#[test]
fn deleting_dendrite_tip_keeps_wire() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    let spike = d.add_line(v(1.0, 0.0), v(1.0, 1.0)).unwrap();
    assert_eq!(spike.value.len(), 1);
    assert_eq!(d.polygons().len(), 2);
    let tip = point_at(&d, v(1.0, 1.0));
    let e = d.delete_segment(spike.value[0]).unwrap();
    assert_eq!(e.last_change(), PolygonChange::Shape(vec![PolygonId(1)]));
    assert_eq!(d.point(tip).unwrap().poly, Some(PolygonId(1)));
    d.check_consistency().unwrap();
}

#[test]
fn bridge_to_island_and_back() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 4.0, 4.0);
    rect(&mut d, 1.0, 1.0, 2.0, 2.0);
    assert_eq!(d.depth(PolygonId(2)).unwrap(), 4);
    let wires = d.wires().len();

    let bridge = d.add_line(v(2.0, 2.0), v(4.0, 4.0)).unwrap();
    assert_eq!(bridge.last_change(), PolygonChange::Shape(vec![PolygonId(1)]));
    assert_eq!(d.wires().len(), wires - 1);
    assert_eq!(d.depth(PolygonId(2)).unwrap(), 2);
    assert!(d.holes(PolygonId(1)).unwrap().is_empty());
    d.check_consistency().unwrap();

    let e = d.delete_segment(bridge.value[0]).unwrap();
    assert_eq!(e.last_change(), PolygonChange::Shape(vec![PolygonId(1)]));
    assert_eq!(d.wires().len(), wires);
    assert_eq!(d.depth(PolygonId(2)).unwrap(), 4);
    assert_eq!(d.holes(PolygonId(1)).unwrap().len(), 1);
    d.check_consistency().unwrap();
}

#[test]
fn bridge_between_components_separates_on_delete() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 1.0, 1.0);
    rect(&mut d, 2.0, 0.0, 3.0, 1.0);
    let root = d.root_wire();
    assert_eq!(d.wire(root).unwrap().childs.len(), 2);

    let e = d.add_line(v(1.0, 0.5), v(2.0, 0.5)).unwrap();
    assert_eq!(e.value.len(), 1);
    d.check_consistency().unwrap();
    assert_eq!(d.wire(root).unwrap().childs.len(), 1);
    let outline = *d.wire(root).unwrap().childs.iter().next().unwrap();
    assert_eq!(d.wire(outline).unwrap().childs.len(), 2);

    d.delete_segment(e.value[0]).unwrap();
    d.check_consistency().unwrap();
    let outlines: Vec<WireId> = d.wire(root).unwrap().childs.iter().copied().collect();
    assert_eq!(outlines.len(), 2);
    for w in outlines {
        assert_eq!(d.wire(w).unwrap().childs.len(), 1);
    }
}

#[test]
fn line_through_existing_geometry_is_split() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    let free = d.add_point(v(1.0, 1.0)).unwrap().value;
    // Crosses the left and right edges and passes through the free point.
    let e = d.add_line(v(-1.0, 1.0), v(3.0, 1.0)).unwrap();
    assert_eq!(e.value.len(), 4);
    // Four corners, the former free point, two line ends and two crossings.
    assert_eq!(d.points().len(), 9);
    assert!(!d.point(free).unwrap().is_free());
    assert_eq!(d.polygons().len(), 3);
    d.check_consistency().unwrap();
}

#[test]
fn failed_line_leaves_decomposition_untouched() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 1.0, 1.0);
    let counts = (d.points().len(), d.segments().len(), d.polygons().len());
    let err = d.add_line(v(5.0, 5.0), v(5.001, 5.001)).unwrap_err();
    assert!(matches!(err, DecompError::DegenerateInput { .. }));
    assert_eq!((d.points().len(), d.segments().len(), d.polygons().len()), counts);

    // The end point snaps onto an edge and is split before the failure.
    let err = d.add_line(v(0.5, 0.0), v(0.505, 0.0)).unwrap_err();
    assert!(matches!(err, DecompError::DegenerateInput { .. }));
    assert_eq!((d.points().len(), d.segments().len(), d.polygons().len()), counts);
    d.check_consistency().unwrap();
}

#[test]
fn edit_errors() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    let corner = point_at(&d, v(0.0, 0.0));
    assert_eq!(
        d.delete_point(corner).unwrap_err(),
        DecompError::PointInUse {
            point: corner,
            degree: 2
        }
    );
    let inside = d.add_point(v(1.0, 1.0)).unwrap().value;
    let outside = d.add_point(v(3.0, 1.0)).unwrap().value;
    assert_eq!(
        d.new_segment(inside, outside).unwrap_err(),
        DecompError::CrossesBoundary {
            a: inside,
            b: outside
        }
    );
    assert!(matches!(
        d.new_segment(inside, inside),
        Err(DecompError::DegenerateInput { .. })
    ));
    assert_eq!(
        d.delete_segment(SegmentId(99)).unwrap_err(),
        DecompError::UnknownEntity {
            kind: "segment",
            id: 99
        }
    );
    assert!(matches!(
        d.join_segments(corner),
        Err(DecompError::DegenerateInput { .. })
    ));
    d.check_consistency().unwrap();
}

#[test]
fn snap_prefers_points_then_lowest_id() {
    let mut d = Decomposition::new();
    d.set_tolerance(0.25);
    let a = d.add_point(v(0.0, 0.0)).unwrap().value;
    let b = d.add_point(v(0.375, 0.0)).unwrap().value;
    assert_ne!(a, b);
    assert_eq!(d.snap_point(v(0.1875, 0.0)), Snap::Point(a));
    assert_eq!(d.snap_point(v(0.25, 0.0)), Snap::Point(b));

    let s = d.add_line(v(0.0, 2.0), v(4.0, 2.0)).unwrap().value[0];
    match d.snap_point(v(1.0, 2.1)) {
        Snap::Segment(hit, t) => {
            assert_eq!(hit, s);
            assert!((t - 0.25).abs() < 1e-12);
        }
        other => panic!("expected a segment snap, got {other:?}"),
    }
    assert_eq!(d.snap_point(v(1.0, 3.0)), Snap::Polygon(PolygonId(0)));
}

#[test]
fn displacement_stops_before_contact() {
    let mut d = Decomposition::new();
    d.add_line(v(0.0, 0.0), v(0.0, 2.0)).unwrap();
    d.add_line(v(0.0, 2.0), v(2.0, 0.0)).unwrap();
    d.add_line(v(2.0, 0.0), v(0.0, 0.0)).unwrap();
    for corner in [v(0.0, 0.0), v(0.0, 2.0), v(2.0, 0.0)] {
        d.add_line(v(0.5, 0.5), corner).unwrap();
    }
    d.check_consistency().unwrap();
    assert_eq!(d.polygons().len(), 4);
    let p = point_at(&d, v(0.5, 0.5));

    let step = d.check_displacement(&[p], v(1.0, 1.0), 10.0).unwrap();
    let expected = 0.5 * 2f64.sqrt() - 0.01;
    assert!((step.value.norm() - expected).abs() < 1e-9);
    assert!((step.value.x - step.value.y).abs() < 1e-12);
    match step.last_change() {
        PolygonChange::Shape(polys) => assert_eq!(polys.len(), 3),
        other => panic!("unexpected change {other:?}"),
    }

    let short = d.check_displacement(&[p], v(1.0, 1.0), 0.1).unwrap();
    assert!((short.value.norm() - 0.1).abs() < 1e-12);

    d.move_points(&[p], step.value).unwrap();
    d.check_consistency().unwrap();
    assert!(matches!(
        d.check_displacement(&[p], v(0.0, 0.0), 1.0),
        Err(DecompError::DegenerateInput { .. })
    ));
}

#[test]
fn indices_are_dense_after_deletions() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 1.0, 1.0);
    let e = d.add_line(v(0.0, 0.0), v(1.0, 1.0)).unwrap();
    d.delete_segment(e.value[0]).unwrap();
    d.add_point(v(3.0, 3.0)).unwrap();
    let idx = d.make_indices();
    assert_eq!(idx.points.len(), 5);
    assert_eq!(idx.segments.values().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(idx.polygons.values().copied().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(idx.polygons.keys().copied().collect::<Vec<_>>(), vec![PolygonId(0), PolygonId(1)]);
}

fn overlay_inputs() -> (Decomposition, Decomposition) {
    let mut a = Decomposition::new();
    rect(&mut a, 0.0, 0.0, 2.0, 2.0);
    let mut b = Decomposition::new();
    rect(&mut b, 1.0, 1.0, 3.0, 3.0);
    b.add_line(v(1.0, 1.0), v(3.0, 3.0)).unwrap();
    b.check_consistency().unwrap();
    (a, b)
}

#[test]
fn overlay_of_overlapping_squares() {
    let (a, b) = overlay_inputs();
    let ov = a.intersection(&b).unwrap();
    let r = &ov.decomp;
    r.check_consistency().unwrap();
    assert_eq!(r.points().len(), 10);
    assert_eq!(r.segments().len(), 14);
    assert_eq!(r.polygons().len(), 6);
    // Inputs are untouched.
    assert_eq!(a.segments().len(), 4);
    assert_eq!(b.segments().len(), 5);

    // Points of `a` keep their ids.
    for p in a.points().keys() {
        assert_eq!(ov.maps_a.points[&p], Some(p));
    }
    assert_eq!(ov.maps_a.images_of_segment(SegmentId(1)), vec![SegmentId(1), SegmentId(4)]);
    assert_eq!(ov.maps_a.images_of_segment(SegmentId(2)), vec![SegmentId(2), SegmentId(9)]);
    assert_eq!(ov.maps_a.segments[&SegmentId(5)], None);
    assert_eq!(ov.maps_b.images_of_segment(SegmentId(0)), vec![SegmentId(5), SegmentId(6)]);
    assert_eq!(ov.maps_b.images_of_segment(SegmentId(4)), vec![SegmentId(12), SegmentId(13)]);
    assert_eq!(ov.maps_b.segments[&SegmentId(1)], None);

    let pa: Vec<Option<PolygonId>> = ov.maps_a.polygons.values().copied().collect();
    let (p0, p1) = (Some(PolygonId(0)), Some(PolygonId(1)));
    assert_eq!(pa, vec![p0, p1, p0, p1, p1, p0]);
    let pb: Vec<Option<PolygonId>> = ov.maps_b.polygons.values().copied().collect();
    let p2 = Some(PolygonId(2));
    assert_eq!(pb, vec![p0, p0, p1, p1, p2, p2]);
    assert_eq!(
        ov.maps_a.images_of_polygon(PolygonId(1)),
        vec![PolygonId(1), PolygonId(3), PolygonId(4)]
    );
}

#[test]
fn overlay_is_deterministic() {
    let (a, b) = overlay_inputs();
    let first = a.intersection(&b).unwrap();
    let second = a.intersection(&b).unwrap();
    assert_eq!(first.maps_a, second.maps_a);
    assert_eq!(first.maps_b, second.maps_b);
    assert_eq!(first.decomp.export(), second.decomp.export());
}

#[test]
fn overlay_matches_adding_lines_one_by_one() {
    let (a, b) = overlay_inputs();
    let ov = a.intersection(&b).unwrap();
    let mut manual = a.clone();
    for seg in b.segments().values() {
        let [p, q] = seg.vtxs.map(|pt| b.point(pt).unwrap().xy);
        manual.add_line(p, q).unwrap();
    }
    assert_eq!(ov.decomp.export(), manual.export());
}

#[test]
fn node_set_round_trip() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    d.add_point(v(1.0, 1.0)).unwrap();
    let nodes = d.export();
    assert_eq!(nodes.points.len(), 5);
    assert_eq!(nodes.segments, vec![[0, 1], [1, 2], [2, 3], [3, 0]]);
    assert!(nodes.polygons[0].outer.is_empty());
    assert_eq!(nodes.polygons[0].holes.len(), 1);
    assert_eq!(nodes.polygons[1].free_points, vec![4]);
    let mut outer = nodes.polygons[1].outer.clone();
    outer.sort();
    assert_eq!(outer, vec![0, 1, 2, 3]);
    let mut hole = nodes.polygons[0].holes[0].clone();
    hole.sort();
    assert_eq!(hole, vec![!3, !2, !1, !0]);

    let json = serde_json::to_string(&nodes).unwrap();
    let parsed: NodeSet = serde_json::from_str(&json).unwrap();
    let (d2, ids) = Decomposition::import(&parsed, DecompCfg::default()).unwrap();
    d2.check_consistency().unwrap();
    assert_eq!(ids, vec![PolygonId(0), PolygonId(1)]);
    assert_eq!(d2.export(), nodes);
}

#[test]
fn import_rejects_mismatched_polygon() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 2.0, 2.0);
    let mut nodes = d.export();
    nodes.polygons[1].outer = vec![0, 1, 2];
    assert!(matches!(
        Decomposition::import(&nodes, DecompCfg::default()),
        Err(DecompError::InconsistentTopology { .. })
    ));
    nodes.segments.push([0, 7]);
    assert!(matches!(
        Decomposition::import(&nodes, DecompCfg::default()),
        Err(DecompError::DegenerateInput { .. })
    ));
}

#[test]
fn import_checks_holes_and_free_points() {
    let mut d = Decomposition::new();
    rect(&mut d, 0.0, 0.0, 4.0, 4.0);
    rect(&mut d, 1.0, 1.0, 2.0, 2.0);
    d.add_point(v(3.0, 3.0)).unwrap();
    let nodes = d.export();
    assert_eq!(nodes.polygons[1].holes.len(), 1);
    assert_eq!(nodes.polygons[1].free_points, vec![8]);

    let (d2, ids) = Decomposition::import(&nodes, DecompCfg::default()).unwrap();
    d2.check_consistency().unwrap();
    assert_eq!(ids, vec![PolygonId(0), PolygonId(1), PolygonId(2)]);
    assert_eq!(d2.export(), nodes);

    let rejects = |nodes: &NodeSet| {
        matches!(
            Decomposition::import(nodes, DecompCfg::default()),
            Err(DecompError::InconsistentTopology { .. })
        )
    };
    let mut missing_hole = nodes.clone();
    missing_hole.polygons[1].holes.clear();
    assert!(rejects(&missing_hole));

    let mut face_as_hole = nodes.clone();
    face_as_hole.polygons[1].holes = vec![nodes.polygons[2].outer.clone()];
    assert!(rejects(&face_as_hole));

    let mut moved_point = nodes.clone();
    moved_point.polygons[1].free_points.clear();
    moved_point.polygons[0].free_points.push(8);
    assert!(rejects(&moved_point));
}
