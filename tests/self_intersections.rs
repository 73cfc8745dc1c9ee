// Copyright 2025 Lars Brubaker
// Self-intersecting and overlapping input: combine callbacks, weights, and
// inputs with many crossings.

mod helpers;

use approx::assert_relative_eq;
use glu_tess::{Real, Tessellator, WindingRule};
use helpers::{star, tessellate_contours, total_area, verify_valid_output, Recorder};

/// `k` horizontal and `k` vertical unit-width bars forming a lattice. Every
/// long edge crosses every long edge of the other direction.
fn lattice(k: usize) -> Vec<Vec<Real>> {
    let len = 2.0 * k as Real;
    let mut contours = Vec::new();
    for i in 0..k {
        let a = 2.0 * i as Real;
        contours.push(vec![-0.5, a, len - 0.5, a, len - 0.5, a + 1.0, -0.5, a + 1.0]);
        contours.push(vec![a, -0.5, a + 1.0, -0.5, a + 1.0, len - 0.5, a, len - 0.5]);
    }
    contours
}

fn run(contours: &[Vec<Real>], rule: WindingRule) -> Recorder {
    let mut recorder = Recorder {
        combine: true,
        ..Recorder::default()
    };
    let mut id = 0;
    for c in contours {
        for p in c.chunks_exact(2) {
            recorder.positions.push([p[0], p[1], 0.0]);
            id += 1;
        }
    }
    assert_eq!(recorder.positions.len(), id);

    let mut tess = Tessellator::new(recorder);
    tess.set_winding_rule(rule).unwrap();
    tess.begin_polygon().unwrap();
    let mut id = 0;
    for c in contours {
        tess.begin_contour().unwrap();
        for p in c.chunks_exact(2) {
            tess.add_vertex([p[0], p[1], 0.0], id).unwrap();
            id += 1;
        }
        tess.end_contour().unwrap();
    }
    tess.end_polygon().unwrap();
    tess.into_handler()
}

fn recorded_area(r: &Recorder) -> Real {
    r.triangles()
        .iter()
        .map(|t| {
            let [a, b, c] = t.map(|i| r.positions[i]);
            0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
        })
        .sum()
}

#[test]
fn bowtie_combine_receives_weights() {
    let bowtie = vec![vec![0.0, 0.0, 2.0, 2.0, 2.0, 0.0, 0.0, 2.0]];
    let r = run(&bowtie, WindingRule::Odd);
    assert!(r.errors.is_empty());
    assert_eq!(r.combined.len(), 1);

    let (coords, data, weights) = r.combined[0];
    assert_relative_eq!(coords[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(coords[1], 1.0, epsilon = 1e-12);
    assert_eq!(coords[2], 0.0);
    let mut sources: Vec<usize> = data.iter().map(|d| d.expect("four sources")).collect();
    sources.sort_unstable();
    assert_eq!(sources, vec![0, 1, 2, 3]);
    for w in weights {
        assert_relative_eq!(w, 0.25, epsilon = 1e-12);
    }

    // The new vertex is used by both lobes.
    let tris = r.triangles();
    assert_eq!(tris.len(), 2);
    assert!(tris.iter().all(|t| t.contains(&4)));
    assert_relative_eq!(recorded_area(&r), 2.0, epsilon = 1e-12);
}

#[test]
fn off_center_crossing_weights_follow_distance() {
    // A lopsided bowtie: (0,0)-(4,0) is crossed at (1,0) by (1,3)-(1,-1).
    let contour = vec![vec![0.0, 0.0, 4.0, 0.0, 1.0, 3.0, 1.0, -1.0]];
    let r = run(&contour, WindingRule::NonZero);
    assert!(r.errors.is_empty());
    assert_eq!(r.combined.len(), 1);
    let (coords, data, weights) = r.combined[0];
    assert_relative_eq!(coords[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(coords[1], 0.0, epsilon = 1e-12);
    assert_relative_eq!(weights.iter().sum::<Real>(), 1.0, epsilon = 1e-12);
    for (d, w) in data.iter().zip(weights) {
        // Each edge gets half the weight, split in inverse proportion to
        // the distance of its endpoints from the crossing.
        let expected = match d.expect("four sources") {
            0 | 3 => 0.5 * 3.0 / 4.0,
            1 | 2 => 0.5 * 1.0 / 4.0,
            other => panic!("unexpected source vertex {}", other),
        };
        assert_relative_eq!(w, expected, epsilon = 1e-12);
    }
}

#[test]
fn lattice_of_bars() {
    let k = 5;
    let bars = lattice(k);
    let k2 = (k * k) as Real;
    for (rule, area) in [
        (WindingRule::NonZero, 3.0 * k2),
        (WindingRule::Odd, 2.0 * k2),
        (WindingRule::AbsGeqTwo, k2),
    ] {
        let out = tessellate_contours(&bars, rule);
        verify_valid_output(&out);
        assert_relative_eq!(total_area(&out), area, epsilon = 1e-9);
        assert_eq!(out.vertex_count(), 8 * k + 4 * k * k, "{:?}", rule);
    }
}

#[test]
fn lattice_through_the_streaming_interface() {
    let r = run(&lattice(3), WindingRule::Odd);
    assert!(r.errors.is_empty());
    assert_eq!(r.combined.len(), 36);
    for (_, data, weights) in &r.combined {
        assert!(data.iter().all(|d| d.is_some()));
        assert_relative_eq!(weights.iter().sum::<Real>(), 1.0, epsilon = 1e-12);
        assert!(weights.iter().all(|&w| w >= 0.0));
    }
    assert_relative_eq!(recorded_area(&r), 18.0, epsilon = 1e-9);
}

#[test]
fn star_polygons() {
    for (n, step) in [(7, 2), (7, 3), (9, 4), (11, 5)] {
        let contour = vec![star(n, step, 10.0)];
        let odd = tessellate_contours(&contour, WindingRule::Odd);
        let nonzero = tessellate_contours(&contour, WindingRule::NonZero);
        verify_valid_output(&odd);
        verify_valid_output(&nonzero);
        assert!(total_area(&odd) > 0.0);
        assert!(
            total_area(&nonzero) > total_area(&odd),
            "{{{}/{}}}: the core winds more than once",
            n,
            step
        );
    }
}

#[test]
fn collinear_overlapping_edges() {
    // Two rectangles sharing part of an edge along y = 0.
    let contours = vec![
        vec![0.0, 0.0, 3.0, 0.0, 3.0, 1.0, 0.0, 1.0],
        vec![2.0, 0.0, 5.0, 0.0, 5.0, -1.0, 2.0, -1.0],
    ];
    let out = tessellate_contours(&contours, WindingRule::NonZero);
    verify_valid_output(&out);
    assert_relative_eq!(total_area(&out), 6.0, epsilon = 1e-9);
}

#[test]
fn vertex_on_an_edge() {
    // A triangle whose apex touches the middle of the square's top edge.
    let contours = vec![
        vec![0.0, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 2.0],
        vec![1.0, 2.0, 0.5, 3.0, 1.5, 3.0],
    ];
    for rule in [WindingRule::Odd, WindingRule::NonZero] {
        let out = tessellate_contours(&contours, rule);
        verify_valid_output(&out);
        assert_relative_eq!(total_area(&out), 4.5, epsilon = 1e-9);
    }
}
