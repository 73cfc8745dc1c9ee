// Copyright 2025 Lars Brubaker
// Winding rule correctness tests with area verification.

mod helpers;

use approx::assert_relative_eq;
use glu_tess::{Real, WindingRule};
use helpers::{covering_triangles, square, tessellate_contours, total_area, verify_valid_output};

const ALL_RULES: [WindingRule; 5] = [
    WindingRule::Odd,
    WindingRule::NonZero,
    WindingRule::Positive,
    WindingRule::Negative,
    WindingRule::AbsGeqTwo,
];

/// Outer 6x6 CCW, middle 4x4 CW, inner 2x2 CCW.
/// Winding numbers from outside in: 0, 1, 0, 1.
fn alternating_squares() -> Vec<Vec<Real>> {
    vec![
        square(-3.0, -3.0, 6.0, false),
        square(-2.0, -2.0, 4.0, true),
        square(-1.0, -1.0, 2.0, false),
    ]
}

/// Three CCW squares. Winding numbers from outside in: 0, 1, 2, 3.
fn stacked_squares() -> Vec<Vec<Real>> {
    vec![
        square(-3.0, -3.0, 6.0, false),
        square(-2.0, -2.0, 4.0, false),
        square(-1.0, -1.0, 2.0, false),
    ]
}

#[test]
fn alternating_nested_squares() {
    let expected = [24.0, 24.0, 24.0, 0.0, 0.0];
    for (rule, area) in ALL_RULES.iter().zip(expected) {
        let out = tessellate_contours(&alternating_squares(), *rule);
        verify_valid_output(&out);
        assert_relative_eq!(total_area(&out), area, epsilon = 1e-9);
    }
}

#[test]
fn stacked_nested_squares() {
    // Odd: ring 1 and core 3. AbsGeqTwo: everything inside the middle square.
    let expected = [24.0, 36.0, 36.0, 0.0, 16.0];
    for (rule, area) in ALL_RULES.iter().zip(expected) {
        let out = tessellate_contours(&stacked_squares(), *rule);
        verify_valid_output(&out);
        assert_relative_eq!(total_area(&out), area, epsilon = 1e-9);
    }
}

#[test]
fn negative_rule_selects_clockwise_regions() {
    let contours = vec![square(0.0, 0.0, 2.0, true)];
    let out = tessellate_contours(&contours, WindingRule::Negative);
    assert_relative_eq!(total_area(&out), 4.0, epsilon = 1e-12);
    verify_valid_output(&out);

    let out = tessellate_contours(&contours, WindingRule::Positive);
    assert_eq!(out.triangle_count(), 0);
}

#[test]
fn hole_is_empty_under_odd_and_filled_under_nonzero() {
    let contours = vec![square(0.0, 0.0, 4.0, false), square(1.0, 1.0, 2.0, false)];

    let odd = tessellate_contours(&contours, WindingRule::Odd);
    assert_eq!(covering_triangles(&odd, [2.0, 2.1]), 0);
    assert_eq!(covering_triangles(&odd, [0.5, 0.6]), 1);
    assert_relative_eq!(total_area(&odd), 12.0, epsilon = 1e-12);

    let nonzero = tessellate_contours(&contours, WindingRule::NonZero);
    assert_eq!(covering_triangles(&nonzero, [2.0, 2.1]), 1);
    assert_relative_eq!(total_area(&nonzero), 16.0, epsilon = 1e-12);
}

#[test]
fn overlapping_squares() {
    // Two CCW squares sharing a 1x1 corner; their edges cross twice.
    let contours = vec![square(0.0, 0.0, 2.0, false), square(1.0, 1.0, 2.0, false)];
    let expected = [
        (WindingRule::Odd, 6.0),
        (WindingRule::NonZero, 7.0),
        (WindingRule::Positive, 7.0),
        (WindingRule::Negative, 0.0),
        (WindingRule::AbsGeqTwo, 1.0),
    ];
    for (rule, area) in expected {
        let out = tessellate_contours(&contours, rule);
        verify_valid_output(&out);
        assert_relative_eq!(total_area(&out), area, epsilon = 1e-9);
        // Two crossing vertices are added to the eight corners.
        assert_eq!(out.vertex_count(), 10, "{:?}", rule);
    }
}

#[test]
fn opposite_squares_cancel_under_nonzero() {
    let contours = vec![square(0.0, 0.0, 2.0, false), square(0.0, 0.0, 2.0, true)];
    for rule in [WindingRule::NonZero, WindingRule::Odd, WindingRule::Positive] {
        let out = tessellate_contours(&contours, rule);
        assert_eq!(out.triangle_count(), 0, "{:?}", rule);
    }
}

#[test]
fn doubled_square_needs_abs_geq_two() {
    let contours = vec![square(0.0, 0.0, 2.0, false), square(0.0, 0.0, 2.0, false)];
    let odd = tessellate_contours(&contours, WindingRule::Odd);
    assert_eq!(odd.triangle_count(), 0);
    let two = tessellate_contours(&contours, WindingRule::AbsGeqTwo);
    assert_relative_eq!(total_area(&two), 4.0, epsilon = 1e-12);
}
