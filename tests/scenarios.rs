//! End-to-end checks on small, hand-measured drawings.

#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use planscope::calculator::extension_depth;
use planscope::context::keys;
use planscope::geometry::footprint::rectangle;
use planscope::geometry::Segment;
use planscope::math::Point2;
use planscope::metadata::{ExtensionType, HouseType};
use planscope::{ComplianceEngine, DrawingObject, EvaluationContext, RuleRegistry, SessionMetadata};

fn p(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

fn plot_20m() -> DrawingObject {
    DrawingObject::rectangle("Plot Boundary", [0.0, 0.0], [20000.0, 20000.0])
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn number(ctx: &EvaluationContext, key: &str) -> f64 {
    ctx.number(key).unwrap().unwrap()
}

#[test]
fn test_quarter_coverage_is_compliant() {
    let objects = vec![plot_20m(), DrawingObject::rectangle("Walls", [5000.0, 5000.0], [15000.0, 15000.0])];
    let assessment = ComplianceEngine::default().assess(&objects, &SessionMetadata::default(), "coverage");

    assert_relative_eq!(number(&assessment.context, keys::COVERAGE_PERCENT), 25.0);
    let rule = assessment.compliance.result("A.1(b)").unwrap();
    assert_eq!(rule.compliant, Some(true));
    assert_eq!(rule.message, "Coverage is 25% of curtilage (compliant)");
}

#[test]
fn test_over_half_coverage_fails() {
    let objects = vec![plot_20m(), DrawingObject::rectangle("Walls", [2500.0, 2500.0], [17500.0, 17500.0])];
    let assessment = ComplianceEngine::default().assess(&objects, &SessionMetadata::default(), "");

    assert_relative_eq!(number(&assessment.context, keys::COVERAGE_RATIO), 0.5625);
    let rule = assessment.compliance.result("A.1(b)").unwrap();
    assert_eq!(rule.compliant, Some(false));
    assert_eq!(assessment.compliance.overall_compliant, Some(false));
    assert!(assessment.compliance.verdict.starts_with("NON_COMPLIANT"));
    assert!(assessment.compliance.verdict.contains("A.1(b)"));
}

#[test]
fn test_extension_depth_behind_rear_wall() {
    let rear = Segment::new(p(0.0, 10000.0), p(10000.0, 10000.0));
    let extension = rectangle(p(0.0, 10000.0), p(10000.0, 14000.0));
    let depth = extension_depth(&extension, &rear).unwrap();
    assert_relative_eq!(depth.depth_m, 4.0);
}

/// House drawn either way round, with a 4 m extension on its north side and
/// the road to the south.
fn rear_extension(house_points: &[[f64; 2]]) -> Vec<DrawingObject> {
    vec![
        DrawingObject::rectangle("Plot", [-5000.0, -2000.0], [15000.0, 25000.0]),
        DrawingObject::polyline("Walls", true, house_points),
        DrawingObject::rectangle("Walls Extension", [0.0, 10000.0], [10000.0, 14000.0]),
        DrawingObject::line("Highway", [-10000.0, -5000.0], [20000.0, -5000.0]),
    ]
}

#[test]
fn test_inferred_rear_wall_is_independent_of_drawing_order() {
    init_logging();
    let ccw = [[0.0, 0.0], [10000.0, 0.0], [10000.0, 10000.0], [0.0, 10000.0]];
    let cw = [[0.0, 0.0], [0.0, 10000.0], [10000.0, 10000.0], [10000.0, 0.0]];
    let engine = ComplianceEngine::default();

    for house in [ccw, cw] {
        let assessment = engine.assess(&rear_extension(&house), &SessionMetadata::default(), "");
        assert_relative_eq!(number(&assessment.context, keys::EXTENSION_DEPTH_M), 4.0);
        assert_relative_eq!(number(&assessment.context, keys::DISTANCE_TO_REAR_BOUNDARY_M), 11.0);
        assert_eq!(
            assessment.context.boolean(keys::EXTENDS_BEYOND_PRINCIPAL).unwrap(),
            Some(false)
        );
    }
}

#[test]
fn test_building_near_boundary() {
    let objects = vec![plot_20m(), DrawingObject::rectangle("Walls", [500.0, 5000.0], [10500.0, 15000.0])];
    let metadata = SessionMetadata {
        eaves_height_m: Some(2.8),
        ..SessionMetadata::default()
    };
    let assessment = ComplianceEngine::default().assess(&objects, &metadata, "how far from the boundary");

    assert_relative_eq!(number(&assessment.context, keys::DISTANCE_TO_BOUNDARY_M), 0.5);
    let eaves = assessment.compliance.result("A.1(i)").unwrap();
    assert_eq!(eaves.compliant, Some(true));
    let calc = assessment
        .calculations
        .iter()
        .find(|c| c.calculation_type == "boundary_distance")
        .unwrap();
    assert_eq!(calc.compliant, Some(false));
}

#[test]
fn test_rear_depth_limit_depends_on_house_type() {
    let registry = RuleRegistry::new();
    let ctx = EvaluationContext::new()
        .with(keys::EXTENSION_TYPE, "rear")
        .with(keys::STOREYS, 1_u32)
        .with(keys::EXTENSION_DEPTH_M, 3.5);

    let detached = ctx.clone().with(keys::HOUSE_TYPE, "detached");
    let semi = ctx.with(keys::HOUSE_TYPE, "semi-detached");
    assert_eq!(registry.evaluate_all(&detached).result("A.1(f)").unwrap().compliant, Some(true));
    assert_eq!(registry.evaluate_all(&semi).result("A.1(f)").unwrap().compliant, Some(false));
}

#[test]
fn test_rear_depth_from_drawing() {
    init_logging();
    let house = [[0.0, 0.0], [10000.0, 0.0], [10000.0, 10000.0], [0.0, 10000.0]];
    let mut objects = rear_extension(&house);
    objects[2] = DrawingObject::rectangle("Walls Extension", [0.0, 10000.0], [10000.0, 13500.0]);
    let engine = ComplianceEngine::default();

    let assess = |house_type| {
        let metadata = SessionMetadata {
            house_type: Some(house_type),
            extension_type: Some(ExtensionType::RearSingle),
            ..SessionMetadata::default()
        };
        engine.assess(&objects, &metadata, "rear extension depth")
    };

    let detached = assess(HouseType::Detached);
    assert_eq!(detached.compliance.result("A.1(f)").unwrap().compliant, Some(true));
    assert_eq!(detached.compliance.overall_compliant, Some(true));

    let semi = assess(HouseType::SemiDetached);
    assert_eq!(semi.compliance.result("A.1(f)").unwrap().compliant, Some(false));
    assert!(semi.compliance.verdict.contains("\n  A.1(f): "));
    let depth = semi
        .calculations
        .iter()
        .find(|c| c.calculation_type == "extension_depth")
        .unwrap();
    assert_relative_eq!(depth.result, 3.5);
    assert_eq!(depth.limit, Some(3.0));
}

#[test]
fn test_forward_extension_fails_principal_elevation_rule() {
    init_logging();
    let objects = vec![
        DrawingObject::rectangle("Plot", [0.0, 0.0], [20000.0, 30000.0]),
        DrawingObject::rectangle("Walls", [5000.0, 6000.0], [15000.0, 16000.0]),
        DrawingObject::rectangle("Walls New", [9000.0, 4500.0], [11000.0, 7000.0]),
        DrawingObject::line("Highway", [-5000.0, -3000.0], [25000.0, -3000.0]),
    ];
    let assessment = ComplianceEngine::default().assess(&objects, &SessionMetadata::default(), "");
    assert_eq!(
        assessment.compliance.result("A.1(e)").unwrap().compliant,
        Some(false)
    );
}

#[test]
fn test_missing_facts_stay_inconclusive() {
    let metadata = SessionMetadata {
        extension_type: Some(ExtensionType::RearSingle),
        ..SessionMetadata::default()
    };
    let objects = vec![plot_20m(), DrawingObject::rectangle("Walls", [5000.0, 5000.0], [15000.0, 15000.0])];
    let assessment = ComplianceEngine::default().assess(&objects, &metadata, "");
    let depth = assessment.compliance.result("A.1(f)").unwrap();
    assert_eq!(depth.compliant, None);
    assert!(depth.error.is_some());
}

#[test]
fn test_empty_drawing_reaches_no_verdict() {
    let assessment = ComplianceEngine::default().assess(&[], &SessionMetadata::default(), "");
    assert_eq!(assessment.compliance.overall_compliant, None);
    assert!(assessment.compliance.results.iter().all(|r| r.compliant.is_none()));
    assert!(!assessment.context.contains(keys::EXTENDS_BEYOND_PRINCIPAL));
}
