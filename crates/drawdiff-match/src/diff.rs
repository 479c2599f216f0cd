//! Per-primitive difference report derived from a [`MatchResult`].

use drawdiff_core::{PrimitiveRef, ToleranceProfile};
use drawdiff_geometry::Primitive;
use drawdiff_math::angle;
use serde::{Deserialize, Serialize};

use crate::result::MatchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    /// Present only in B.
    Added,
    /// Present only in A.
    Deleted,
    /// Matched, but not identical.
    Modified,
    /// Matched with similarity 1.0 and no flagged change.
    Unchanged,
}

/// What changed between the two sides of a matched pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modification {
    Position,
    Size,
    Shape,
    Attribute,
    Orientation,
}

/// Signed B-minus-A deltas of a matched pair. Fields that do not apply to
/// the primitive kind are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometricChanges {
    pub center_dx: f64,
    pub center_dy: f64,
    pub center_distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

/// Non-geometric property that can differ between matched primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeField {
    Layer,
    Color,
    Style,
    Content,
}

/// One attribute value as it reads in A and in B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub field: AttributeField,
    pub from: String,
    pub to: String,
}

impl AttributeChange {
    fn between(field: AttributeField, from: &str, to: &str) -> Option<Self> {
        (from != to).then(|| Self {
            field,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub kind: DifferenceKind,
    pub a: Option<PrimitiveRef>,
    pub b: Option<PrimitiveRef>,
    /// Pair similarity, 0 for added and deleted primitives.
    pub similarity: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifications: Vec<Modification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<GeometricChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_changes: Vec<AttributeChange>,
}

impl Difference {
    fn added(b: PrimitiveRef) -> Self {
        Self {
            kind: DifferenceKind::Added,
            a: None,
            b: Some(b),
            similarity: 0.0,
            modifications: Vec::new(),
            changes: None,
            attribute_changes: Vec::new(),
        }
    }

    fn deleted(a: PrimitiveRef) -> Self {
        Self {
            kind: DifferenceKind::Deleted,
            a: Some(a),
            b: None,
            similarity: 0.0,
            modifications: Vec::new(),
            changes: None,
            attribute_changes: Vec::new(),
        }
    }

    pub fn is_change(&self) -> bool {
        self.kind != DifferenceKind::Unchanged
    }

    pub fn has(&self, modification: Modification) -> bool {
        self.modifications.contains(&modification)
    }
}

/// One entry per primitive of A and B: matched pairs in A order, then
/// deleted, then added.
///
/// Pairs whose references fall outside `a` or `b` are skipped.
pub fn detect_differences(
    a: &[Primitive],
    b: &[Primitive],
    result: &MatchResult,
    tolerance: &ToleranceProfile,
) -> Vec<Difference> {
    let len = result.matched.len() + result.added.len() + result.deleted.len();
    let mut out = Vec::with_capacity(len);
    for pair in &result.matched {
        let (Some(pa), Some(pb)) = (a.get(pair.a.index()), b.get(pair.b.index())) else {
            continue;
        };
        let modifications = modifications(pa, pb, tolerance);
        let kind = if pair.similarity == 1.0 && modifications.is_empty() {
            DifferenceKind::Unchanged
        } else {
            DifferenceKind::Modified
        };
        out.push(Difference {
            kind,
            a: Some(pair.a),
            b: Some(pair.b),
            similarity: pair.similarity,
            modifications,
            changes: Some(geometric_changes(pa, pb)),
            attribute_changes: attribute_changes(pa, pb),
        });
    }
    out.extend(result.deleted.iter().copied().map(Difference::deleted));
    out.extend(result.added.iter().copied().map(Difference::added));
    out
}

/// Changes between `a` and `b` that exceed `tolerance`, in flag order.
///
/// Primitives of different kinds only get a [`Modification::Shape`] flag.
pub fn modifications(
    a: &Primitive,
    b: &Primitive,
    tolerance: &ToleranceProfile,
) -> Vec<Modification> {
    let mut flags = Vec::new();
    let mut flag = |m: Modification, raised: bool| {
        if raised {
            flags.push(m);
        }
    };

    match (a, b) {
        (Primitive::Line(a), Primitive::Line(b)) => {
            flag(
                Modification::Position,
                a.midpoint().distance(b.midpoint()) > tolerance.position,
            );
            flag(
                Modification::Size,
                relative_change(a.length(), b.length()) > tolerance.length_ratio,
            );
            flag(
                Modification::Attribute,
                a.layer != b.layer || a.color != b.color || a.style != b.style,
            );
            flag(
                Modification::Orientation,
                angle::angular_distance(a.angle(), b.angle()) > tolerance.angle,
            );
        }
        (Primitive::Circle(a), Primitive::Circle(b)) => {
            flag(
                Modification::Position,
                a.center.distance(b.center) > tolerance.position,
            );
            flag(
                Modification::Size,
                (a.radius - b.radius).abs() > tolerance.position,
            );
            flag(
                Modification::Attribute,
                a.layer != b.layer || a.color != b.color,
            );
        }
        (Primitive::Arc(a), Primitive::Arc(b)) => {
            flag(
                Modification::Position,
                a.center.distance(b.center) > tolerance.position,
            );
            flag(
                Modification::Size,
                (a.radius - b.radius).abs() > tolerance.position,
            );
            flag(
                Modification::Shape,
                angle::angular_distance(a.start_angle, b.start_angle) > tolerance.angle
                    || angle::angular_distance(a.end_angle, b.end_angle) > tolerance.angle,
            );
            flag(
                Modification::Attribute,
                a.layer != b.layer || a.color != b.color,
            );
        }
        (Primitive::Text(a), Primitive::Text(b)) => {
            flag(
                Modification::Position,
                a.position.distance(b.position) > tolerance.text_position,
            );
            flag(
                Modification::Size,
                relative_change(a.height, b.height) > tolerance.length_ratio,
            );
            flag(Modification::Shape, a.content != b.content);
            flag(Modification::Attribute, a.layer != b.layer);
            flag(
                Modification::Orientation,
                angle::angular_distance(a.rotation, b.rotation) > tolerance.angle,
            );
        }
        _ => flag(Modification::Shape, true),
    }
    flags
}

/// `|a - b| / max(|a|, |b|)`, 0 when both are 0.
fn relative_change(a: f64, b: f64) -> f64 {
    let max = a.abs().max(b.abs());
    if max == 0.0 {
        0.0
    } else {
        (a - b).abs() / max
    }
}

/// Layer, color, style and content values that differ between `a` and `b`.
///
/// Only fields both kinds carry are compared; text has no color or style.
pub fn attribute_changes(a: &Primitive, b: &Primitive) -> Vec<AttributeChange> {
    use AttributeField::*;

    let mut changes = vec![AttributeChange::between(Layer, a.layer(), b.layer())];
    match (a, b) {
        (Primitive::Line(a), Primitive::Line(b)) => {
            changes.push(AttributeChange::between(Color, &a.color, &b.color));
            changes.push(AttributeChange::between(Style, &a.style, &b.style));
        }
        (Primitive::Circle(a), Primitive::Circle(b)) => {
            changes.push(AttributeChange::between(Color, &a.color, &b.color));
        }
        (Primitive::Arc(a), Primitive::Arc(b)) => {
            changes.push(AttributeChange::between(Color, &a.color, &b.color));
        }
        (Primitive::Text(a), Primitive::Text(b)) => {
            changes.push(AttributeChange::between(Content, &a.content, &b.content));
        }
        _ => {}
    }
    changes.into_iter().flatten().collect()
}

fn geometric_changes(a: &Primitive, b: &Primitive) -> GeometricChanges {
    let delta = b.center() - a.center();
    let mut changes = GeometricChanges {
        center_dx: delta.x,
        center_dy: delta.y,
        center_distance: delta.length(),
        ..GeometricChanges::default()
    };
    match (a, b) {
        (Primitive::Line(a), Primitive::Line(b)) => {
            changes.length = Some(b.length() - a.length());
            changes.angle = Some(angle::signed_difference(a.angle(), b.angle()));
        }
        (Primitive::Circle(a), Primitive::Circle(b)) => {
            changes.radius = Some(b.radius - a.radius);
        }
        (Primitive::Arc(a), Primitive::Arc(b)) => {
            changes.radius = Some(b.radius - a.radius);
            changes.start_angle = Some(angle::signed_difference(a.start_angle, b.start_angle));
            changes.end_angle = Some(angle::signed_difference(a.end_angle, b.end_angle));
            changes.arc_length = Some(b.arc_length() - a.arc_length());
        }
        (Primitive::Text(a), Primitive::Text(b)) => {
            changes.height = Some(b.height - a.height);
            changes.rotation = Some(angle::signed_difference(a.rotation, b.rotation));
        }
        _ => {}
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::MatchedPair;
    use approx::assert_abs_diff_eq;
    use drawdiff_geometry::{Arc, Circle, Line, Text};
    use drawdiff_math::dvec2;
    use std::f64::consts::FRAC_PI_2;

    fn r(i: usize) -> PrimitiveRef {
        PrimitiveRef::new(i)
    }

    #[test]
    fn test_identical_pair_is_unchanged() {
        let tol = ToleranceProfile::standard();
        let a: Vec<Primitive> = vec![Line::new(dvec2(0.0, 0.0), dvec2(10.0, 0.0)).into()];
        let result = MatchResult::from_pairs(vec![MatchedPair::new(r(0), r(0), 1.0)], 1, 1);
        let diffs = detect_differences(&a, &a, &result, &tol);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::Unchanged);
        assert!(!diffs[0].is_change());
        assert_eq!(diffs[0].changes.unwrap().center_distance, 0.0);
    }

    #[test]
    fn test_attribute_edit_is_modified() {
        let tol = ToleranceProfile::standard();
        let a: Vec<Primitive> = vec![Line::new(dvec2(0.0, 0.0), dvec2(10.0, 0.0)).into()];
        let b: Vec<Primitive> = vec![Line::new(dvec2(0.0, 0.0), dvec2(10.0, 0.0))
            .with_color("red")
            .into()];
        let result = MatchResult::from_pairs(vec![MatchedPair::new(r(0), r(0), 1.0)], 1, 1);
        let diffs = detect_differences(&a, &b, &result, &tol);
        assert_eq!(diffs[0].kind, DifferenceKind::Modified);
        assert_eq!(diffs[0].modifications, vec![Modification::Attribute]);
        assert_eq!(
            diffs[0].attribute_changes,
            vec![AttributeChange {
                field: AttributeField::Color,
                from: "black".into(),
                to: "red".into(),
            }]
        );
    }

    #[test]
    fn test_attribute_changes_per_kind() {
        let a: Primitive = Line::new(dvec2(0.0, 0.0), dvec2(1.0, 0.0)).with_layer("A").into();
        let b: Primitive = Line::new(dvec2(0.0, 0.0), dvec2(1.0, 0.0))
            .with_layer("B")
            .with_style("dashed")
            .into();
        let fields: Vec<_> = attribute_changes(&a, &b).iter().map(|c| c.field).collect();
        assert_eq!(fields, vec![AttributeField::Layer, AttributeField::Style]);

        let a: Primitive = Text::new(dvec2(0.0, 0.0), "R5", 2.5).into();
        let b: Primitive = Text::new(dvec2(0.0, 0.0), "R6", 2.5).into();
        let changes = attribute_changes(&a, &b);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, AttributeField::Content);
        assert_eq!((changes[0].from.as_str(), changes[0].to.as_str()), ("R5", "R6"));

        let c: Primitive = Circle::new(dvec2(0.0, 0.0), 1.0).into();
        assert!(attribute_changes(&c, &c).is_empty());
    }

    #[test]
    fn test_order_is_matched_then_deleted_then_added() {
        let tol = ToleranceProfile::standard();
        let a: Vec<Primitive> = vec![
            Circle::new(dvec2(0.0, 0.0), 1.0).into(),
            Circle::new(dvec2(50.0, 0.0), 1.0).into(),
        ];
        let b: Vec<Primitive> = vec![
            Circle::new(dvec2(90.0, 0.0), 1.0).into(),
            Circle::new(dvec2(0.0, 0.0), 1.0).into(),
        ];
        let result = MatchResult::from_pairs(vec![MatchedPair::new(r(0), r(1), 1.0)], 2, 2);
        let kinds: Vec<_> = detect_differences(&a, &b, &result, &tol)
            .iter()
            .map(|d| (d.kind, d.a, d.b))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (DifferenceKind::Unchanged, Some(r(0)), Some(r(1))),
                (DifferenceKind::Deleted, Some(r(1)), None),
                (DifferenceKind::Added, None, Some(r(0))),
            ]
        );
    }

    #[test]
    fn test_line_flags_and_deltas() {
        let tol = ToleranceProfile::standard();
        let a: Primitive = Line::new(dvec2(0.0, 0.0), dvec2(10.0, 0.0)).into();
        let b: Primitive = Line::new(dvec2(10.0, 0.0), dvec2(0.0, 0.5)).into();
        let flags = modifications(&a, &b, &tol);
        assert!(flags.contains(&Modification::Position));
        assert!(flags.contains(&Modification::Orientation));
        assert!(!flags.contains(&Modification::Attribute));

        let changes = geometric_changes(&a, &b);
        assert_abs_diff_eq!(changes.center_dy, 0.25, epsilon = 1e-12);
        assert!(changes.radius.is_none());
        assert!(changes.angle.unwrap().abs() > 3.0);
    }

    #[test]
    fn test_arc_shape_and_size() {
        let tol = ToleranceProfile::standard();
        let a: Primitive = Arc::new(dvec2(0.0, 0.0), 5.0, 0.0, FRAC_PI_2).into();
        let b: Primitive = Arc::new(dvec2(0.0, 0.0), 5.5, 0.0, 1.0).into();
        assert_eq!(
            modifications(&a, &b, &tol),
            vec![Modification::Size, Modification::Shape]
        );
        let changes = geometric_changes(&a, &b);
        assert_abs_diff_eq!(changes.radius.unwrap(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(changes.end_angle.unwrap(), 1.0 - FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(changes.arc_length.unwrap(), 5.5 - 5.0 * FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn test_text_rotation_and_height() {
        let tol = ToleranceProfile::standard();
        let a: Primitive = Text::new(dvec2(0.0, 0.0), "R5", 2.5).into();
        let b: Primitive = Text::new(dvec2(0.0, 0.0), "R5", 3.5).with_rotation(FRAC_PI_2).into();
        assert_eq!(
            modifications(&a, &b, &tol),
            vec![Modification::Size, Modification::Orientation]
        );
    }

    #[test]
    fn test_kind_mismatch_is_shape_change() {
        let tol = ToleranceProfile::standard();
        let a: Primitive = Circle::new(dvec2(0.0, 0.0), 1.0).into();
        let b: Primitive = Text::new(dvec2(0.0, 0.0), "O", 1.0).into();
        assert_eq!(modifications(&a, &b, &tol), vec![Modification::Shape]);
    }

    #[test]
    fn test_serialized_difference_omits_empty_fields() {
        let json = serde_json::to_value(Difference::added(r(3))).unwrap();
        assert_eq!(json["kind"], "added");
        assert_eq!(json["b"], 3);
        assert!(json.get("modifications").is_none());
        assert!(json.get("changes").is_none());
        assert!(json.get("attribute_changes").is_none());
    }
}
