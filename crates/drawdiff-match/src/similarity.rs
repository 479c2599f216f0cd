//! Per-kind similarity scoring.
//!
//! Every score is deterministic and lies in `[0, 1]`. Primitives of
//! different kinds score 0, as does any pair whose computation produces a
//! non-finite value.

use drawdiff_core::ToleranceProfile;
use drawdiff_geometry::{Arc, Circle, Line, Primitive, Text};
use drawdiff_math::angle;

const LINE_LENGTH_WEIGHT: f64 = 0.4;
const LINE_POSITION_WEIGHT: f64 = 0.4;
const LINE_ANGLE_WEIGHT: f64 = 0.2;

const CIRCLE_RADIUS_WEIGHT: f64 = 0.5;
const CIRCLE_CENTER_WEIGHT: f64 = 0.5;

const ARC_CENTER_WEIGHT: f64 = 0.4;
const ARC_RADIUS_WEIGHT: f64 = 0.3;
const ARC_ANGLE_WEIGHT: f64 = 0.3;

const TEXT_POSITION_WEIGHT: f64 = 0.8;
const TEXT_HEIGHT_WEIGHT: f64 = 0.2;

/// Similarity of `a` and `b` under `tolerance`.
pub fn similarity(a: &Primitive, b: &Primitive, tolerance: &ToleranceProfile) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return 0.0;
    }
    let score = match a {
        Primitive::Line(a) => match b {
            Primitive::Line(b) => line_similarity(a, b, tolerance),
            _ => 0.0,
        },
        Primitive::Circle(a) => match b {
            Primitive::Circle(b) => circle_similarity(a, b, tolerance),
            _ => 0.0,
        },
        Primitive::Arc(a) => match b {
            Primitive::Arc(b) => arc_similarity(a, b, tolerance),
            _ => 0.0,
        },
        Primitive::Text(a) => match b {
            Primitive::Text(b) => text_similarity(a, b, tolerance),
            _ => 0.0,
        },
    };
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Weighted mean of `(weight, score)` terms whose weights sum to 1.
///
/// Written as one minus the weighted shortfall so that all-perfect terms
/// give exactly 1.0.
fn blend(terms: &[(f64, f64)]) -> f64 {
    1.0 - terms.iter().map(|&(w, s)| w * (1.0 - s)).sum::<f64>()
}

/// `1 - delta / tolerance`, floored at 0.
///
/// A zero tolerance accepts only an exact match.
pub fn closeness(delta: f64, tolerance: f64) -> f64 {
    if tolerance <= 0.0 {
        return if delta == 0.0 { 1.0 } else { 0.0 };
    }
    let s = 1.0 - delta / tolerance;
    if s.is_nan() {
        0.0
    } else {
        s.max(0.0)
    }
}

/// Weighted length, endpoint and direction agreement.
///
/// A length mismatch beyond `length_ratio` is a hard reject. Endpoint error
/// is taken over the better of the two endpoint pairings, so a reversed
/// segment is located correctly; its direction still differs by π.
pub fn line_similarity(a: &Line, b: &Line, tolerance: &ToleranceProfile) -> f64 {
    let (len_a, len_b) = (a.length(), b.length());
    if !(len_a > 0.0 && len_b > 0.0) {
        return 0.0;
    }

    let length_sim = 1.0 - (len_a - len_b).abs() / len_a.max(len_b);
    if length_sim < 1.0 - tolerance.length_ratio {
        return 0.0;
    }

    let direct = a.start.distance(b.start) + a.end.distance(b.end);
    let reversed = a.start.distance(b.end) + a.end.distance(b.start);
    let position_sim = closeness(direct.min(reversed), tolerance.position);

    let angle_diff = angle::angular_distance(a.angle(), b.angle());
    let angle_sim = closeness(angle_diff, tolerance.angle);

    blend(&[
        (LINE_LENGTH_WEIGHT, length_sim),
        (LINE_POSITION_WEIGHT, position_sim),
        (LINE_ANGLE_WEIGHT, angle_sim),
    ])
}

pub fn circle_similarity(a: &Circle, b: &Circle, tolerance: &ToleranceProfile) -> f64 {
    let radius_sim = closeness((a.radius - b.radius).abs(), tolerance.position);
    let center_sim = closeness(a.center.distance(b.center), tolerance.position);
    blend(&[
        (CIRCLE_RADIUS_WEIGHT, radius_sim),
        (CIRCLE_CENTER_WEIGHT, center_sim),
    ])
}

/// Circle terms plus agreement of the start and end angles.
///
/// Start is compared with start and end with end, so an arc traced in the
/// opposite direction only matches when both angles happen to line up.
pub fn arc_similarity(a: &Arc, b: &Arc, tolerance: &ToleranceProfile) -> f64 {
    let center_sim = closeness(a.center.distance(b.center), tolerance.position);
    let radius_sim = closeness((a.radius - b.radius).abs(), tolerance.position);
    let start_sim = closeness(
        angle::angular_distance(a.start_angle, b.start_angle),
        tolerance.angle,
    );
    let end_sim = closeness(
        angle::angular_distance(a.end_angle, b.end_angle),
        tolerance.angle,
    );
    blend(&[
        (ARC_CENTER_WEIGHT, center_sim),
        (ARC_RADIUS_WEIGHT, radius_sim),
        (ARC_ANGLE_WEIGHT, (start_sim + end_sim) / 2.0),
    ])
}

/// Anchor and glyph-height agreement, gated on identical content.
///
/// Content is compared byte for byte: case or whitespace edits are real
/// changes on a drawing.
pub fn text_similarity(a: &Text, b: &Text, tolerance: &ToleranceProfile) -> f64 {
    if a.content != b.content {
        return 0.0;
    }
    let position_sim = closeness(a.position.distance(b.position), tolerance.text_position);
    blend(&[
        (TEXT_POSITION_WEIGHT, position_sim),
        (TEXT_HEIGHT_WEIGHT, height_similarity(a.height, b.height)),
    ])
}

fn height_similarity(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max == 0.0 {
        return 1.0;
    }
    (1.0 - (a - b).abs() / max).max(0.0)
}
