use crate::math::*;
use crate::path::{Path, Winding};
use crate::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Path {
    let mut path = Path::new();
    path.add_rect(&box2d(x0, y0, x1, y1), Winding::Positive);
    path
}

fn fill(path: &Path) -> Rle {
    Rasterizer::new()
        .fill(path, &FillOptions::default(), None)
        .unwrap()
}

fn span(x: i16, y: i16, len: i16, coverage: u8) -> Span {
    Span { x, y, len, coverage }
}

fn is_opaque(rle: &Rle) -> bool {
    rle.spans().iter().all(|span| span.coverage == 255)
}

#[test]
fn empty_path() {
    init_logger();

    let rle = fill(&Path::new());
    assert!(rle.is_empty());
    assert!(rle.bounding_rect().is_empty());

    let rle = Rasterizer::new()
        .stroke(&Path::new(), &StrokeOptions::default(), None)
        .unwrap();
    assert!(rle.is_empty());
}

#[test]
fn two_by_two_rect() {
    init_logger();

    let rle = fill(&rect(0.0, 0.0, 2.0, 2.0));
    assert_eq!(rle.spans(), &[span(0, 0, 2, 255), span(0, 1, 2, 255)]);
    assert_eq!(rle.bounding_rect(), int_box2d(0, 0, 2, 2));
    assert_eq!(rle.to_sprite(), vec![255; 4]);
}

#[test]
fn winding_does_not_matter_for_non_zero() {
    let mut path = Path::new();
    path.add_rect(&box2d(0.0, 0.0, 3.0, 3.0), Winding::Negative);

    assert_eq!(fill(&path), fill(&rect(0.0, 0.0, 3.0, 3.0)));
}

#[test]
fn stroked_line_bounds() {
    init_logger();

    let mut path = Path::new();
    path.move_to(point(10.0, 10.0));
    path.line_to(point(20.0, 20.0));

    let options = StrokeOptions::default()
        .with_line_width(1.0)
        .with_line_cap(LineCap::Square)
        .with_line_join(LineJoin::Miter)
        .with_miter_limit(4.0);

    let rle = Rasterizer::new().stroke(&path, &options, None).unwrap();
    assert!(!rle.is_empty());
    assert_eq!(rle.bounding_rect(), int_box2d(9, 9, 21, 21));
}

#[test]
fn open_subpaths_are_closed_when_filled() {
    let mut open = Path::new();
    open.move_to(point(0.0, 0.0));
    open.line_to(point(4.0, 0.0));
    open.line_to(point(4.0, 4.0));
    open.line_to(point(0.0, 4.0));

    assert_eq!(fill(&open), fill(&rect(0.0, 0.0, 4.0, 4.0)));
}

#[test]
fn fill_rules() {
    // Two nested squares with the same orientation.
    let mut path = rect(0.0, 0.0, 6.0, 6.0);
    path.add_rect(&box2d(2.0, 2.0, 4.0, 4.0), Winding::Positive);

    let mut rasterizer = Rasterizer::new();
    let non_zero = rasterizer
        .fill(&path, &FillOptions::non_zero(), None)
        .unwrap();
    let even_odd = rasterizer
        .fill(&path, &FillOptions::even_odd(), None)
        .unwrap();

    assert_eq!(non_zero.coverage_at(3, 3), 255);
    assert_eq!(even_odd.coverage_at(3, 3), 0);
    assert_eq!(even_odd.coverage_at(1, 3), 255);
    assert_eq!(even_odd.spans().len(), 6 + 2);
}

#[test]
fn clip_limits_the_mask() {
    let mut rasterizer = Rasterizer::new();
    let clip = int_box2d(2, 2, 4, 5);
    let rle = rasterizer
        .fill(&rect(0.0, 0.0, 10.0, 10.0), &FillOptions::default(), Some(&clip))
        .unwrap();

    assert_eq!(
        rle.spans(),
        &[span(2, 2, 2, 255), span(2, 3, 2, 255), span(2, 4, 2, 255)]
    );

    let outside = int_box2d(20, 20, 30, 30);
    let rle = rasterizer
        .fill(&rect(0.0, 0.0, 10.0, 10.0), &FillOptions::default(), Some(&outside))
        .unwrap();
    assert!(rle.is_empty());
}

#[test]
fn clipping_keeps_the_coverage_of_edges_outside_the_clip() {
    let mut triangle = Path::new();
    triangle.add_polygon(&[point(0.3, 0.2), point(9.7, 1.1), point(2.2, 9.4)]);

    let mut rasterizer = Rasterizer::new();
    let full = rasterizer
        .fill(&triangle, &FillOptions::default(), None)
        .unwrap();
    let clip = int_box2d(3, 2, 6, 6);
    let clipped = rasterizer
        .fill(&triangle, &FillOptions::default(), Some(&clip))
        .unwrap();

    assert!(clip.contains_box(&clipped.bounding_rect()));
    for y in clip.min.y..clip.max.y {
        for x in clip.min.x..clip.max.x {
            let a = full.coverage_at(x, y) as i32;
            let b = clipped.coverage_at(x, y) as i32;
            assert!((a - b).abs() <= 1, "({}, {}): {} != {}", x, y, a, b);
        }
    }
}

#[test]
fn circle_coverage() {
    let mut path = Path::new();
    path.add_circle(point(20.0, 20.0), 10.0, Winding::Positive);

    let rle = Rasterizer::new()
        .fill(&path, &FillOptions::tolerance(0.01), None)
        .unwrap();
    assert_eq!(rle.bounding_rect(), int_box2d(10, 10, 30, 30));
    assert_eq!(rle.coverage_at(20, 20), 255);
    // Antialiased border.
    let border = rle.coverage_at(10, 19);
    assert!(border > 0 && border < 255);

    // The total coverage is close to the area of the disc.
    let total: f32 = rle
        .spans()
        .iter()
        .map(|span| span.len as f32 * span.coverage as f32 / 255.0)
        .sum();
    let area = core::f32::consts::PI * 100.0;
    assert!((total - area).abs() < 1.0, "{} != {}", total, area);
}

#[test]
fn non_finite_input_is_rejected() {
    init_logger();

    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.line_to(point(f32::INFINITY, 1.0));
    path.line_to(point(0.0, 5.0));

    let mut rasterizer = Rasterizer::new();
    assert_eq!(
        rasterizer.fill(&path, &FillOptions::default(), None),
        Err(RasterError::UnsupportedParameter(UnsupportedParameter::PositionIsNaN))
    );

    let square = rect(0.0, 0.0, 2.0, 2.0);
    assert_eq!(
        rasterizer.fill(&square, &FillOptions::tolerance(f32::NAN), None),
        Err(RasterError::UnsupportedParameter(UnsupportedParameter::ToleranceIsNaN))
    );
    assert_eq!(
        rasterizer.stroke(&square, &StrokeOptions::default().with_line_width(f32::INFINITY), None),
        Err(RasterError::UnsupportedParameter(UnsupportedParameter::InvalidLineWidth))
    );
    assert!(rasterizer
        .stroke(&square, &StrokeOptions::default().with_line_width(0.0), None)
        .unwrap()
        .is_empty());
}

#[test]
fn draw_is_fill_and_stroke() {
    let path = rect(2.0, 2.0, 8.0, 8.0);
    let stroke = StrokeOptions::default().with_line_width(2.0);

    let mut rasterizer = Rasterizer::new();
    let drawn = rasterizer
        .draw(&path, &FillOptions::default(), &stroke, None)
        .unwrap();

    assert_eq!(drawn, fill(&rect(1.0, 1.0, 9.0, 9.0)));
}

#[test]
fn and_or_xor() {
    let a = fill(&rect(0.0, 0.0, 4.0, 2.0));
    let b = fill(&rect(2.0, 1.0, 6.0, 3.0));

    let and = Rle::binary(&a, &b, BinaryOp::And);
    assert_eq!(and.spans(), &[span(2, 1, 2, 255)]);

    let or = Rle::binary(&a, &b, BinaryOp::Or);
    assert_eq!(
        or.spans(),
        &[span(0, 0, 4, 255), span(0, 1, 6, 255), span(2, 2, 4, 255)]
    );
    assert_eq!(or.bounding_rect(), int_box2d(0, 0, 6, 3));

    let xor = Rle::binary(&a, &b, BinaryOp::Xor);
    assert_eq!(
        xor.spans(),
        &[
            span(0, 0, 4, 255),
            span(0, 1, 2, 255),
            span(4, 1, 2, 255),
            span(2, 2, 4, 255),
        ]
    );
}

#[test]
fn overlapping_squares() {
    let a = fill(&rect(0.0, 0.0, 2.0, 2.0));
    let b = fill(&rect(1.0, 1.0, 3.0, 3.0));

    let and = Rle::binary(&a, &b, BinaryOp::And);
    assert_eq!(and.spans(), &[span(1, 1, 1, 255)]);
    assert_eq!(and.bounding_rect(), int_box2d(1, 1, 2, 2));

    let or = Rle::binary(&a, &b, BinaryOp::Or);
    assert_eq!(
        or.spans(),
        &[span(0, 0, 2, 255), span(0, 1, 3, 255), span(1, 2, 2, 255)]
    );
    assert_eq!(or.bounding_rect(), int_box2d(0, 0, 3, 3));

    let xor = Rle::binary(&a, &b, BinaryOp::Xor);
    assert_eq!(
        xor.spans(),
        &[
            span(0, 0, 2, 255),
            span(0, 1, 1, 255),
            span(2, 1, 1, 255),
            span(1, 2, 2, 255),
        ]
    );
    assert_eq!(xor.bounding_rect(), int_box2d(0, 0, 3, 3));
    assert_eq!(xor.coverage_at(1, 1), 0);
}

#[test]
fn and_not_with_disjoint_rows() {
    let c = fill(&rect(0.0, 0.0, 4.0, 1.0));
    let d = fill(&rect(0.0, 2.0, 4.0, 4.0));

    assert_eq!(Rle::binary(&c, &d, BinaryOp::AndNot), c);
    assert!(Rle::binary(&c, &d, BinaryOp::And).is_empty());
}

#[test]
fn idempotence_on_opaque_masks() {
    let mut path = rect(0.0, 0.0, 5.0, 3.0);
    path.add_rect(&box2d(7.0, 1.0, 9.0, 6.0), Winding::Positive);
    let a = fill(&path);
    assert!(is_opaque(&a));

    assert_eq!(Rle::binary(&a, &a, BinaryOp::And), a);
    assert_eq!(Rle::binary(&a, &a, BinaryOp::Or), a);
    assert!(Rle::binary(&a, &a, BinaryOp::Xor).is_empty());
    assert!(Rle::binary(&a, &a, BinaryOp::AndNot).is_empty());
}

#[test]
fn and_not_row_presence() {
    // Rows only in `a` are kept, rows only in `b` are dropped.
    let a = fill(&rect(0.0, 0.0, 4.0, 2.0));
    let b = fill(&rect(0.0, 1.0, 4.0, 4.0));

    let diff = Rle::binary(&a, &b, BinaryOp::AndNot);
    assert_eq!(diff.spans(), &[span(0, 0, 4, 255)]);

    let reversed = Rle::binary(&b, &a, BinaryOp::AndNot);
    assert_eq!(reversed.spans(), &[span(0, 2, 4, 255), span(0, 3, 4, 255)]);

    // Rows only in `b` are dropped by `And` too.
    assert_eq!(Rle::binary(&a, &b, BinaryOp::And).spans(), &[span(0, 1, 4, 255)]);
}

#[test]
fn translated_masks_combine() {
    let a = fill(&rect(0.0, 0.0, 4.0, 4.0));
    let moved = a.translated(2, 0);

    assert_eq!(moved, fill(&rect(2.0, 0.0, 6.0, 4.0)));
    let and = Rle::binary(&a, &moved, BinaryOp::And);
    assert_eq!(and.bounding_rect(), int_box2d(2, 0, 4, 4));
}

#[test]
fn prepared_rect_matches_rasterized_rect() {
    for (x0, y0, x1, y1) in [(0, 0, 4, 4), (1, 2, 9, 7), (5, 5, 6, 6), (0, 3, 17, 4)] {
        let rasterized = fill(&rect(x0 as f32, y0 as f32, x1 as f32, y1 as f32));
        let from_rle = PreparedPath::from_rle(&rasterized);
        let from_rect = PreparedPath::from_rect(&int_box2d(x0, y0, x1, y1));

        assert_eq!(from_rle.patches(), from_rect.patches());
        assert_eq!(from_rle.patch_data(), from_rect.patch_data());
        assert_eq!(from_rect.to_rle(), rasterized);
    }
}

#[test]
fn prepared_boolean_ops_agree_with_rle() {
    let mut shape_a = Path::new();
    shape_a.add_circle(point(12.0, 12.0), 9.0, Winding::Positive);
    let mut shape_b = rect(8.5, 3.25, 30.0, 14.0);
    shape_b.add_circle(point(5.0, 20.0), 4.0, Winding::Negative);

    let a = fill(&shape_a);
    let b = fill(&shape_b);
    let prepared_a = PreparedPath::from_rle(&a);
    let prepared_b = PreparedPath::from_rle(&b);

    for op in [BinaryOp::And, BinaryOp::AndNot, BinaryOp::Or, BinaryOp::Xor] {
        let expected = Rle::binary(&a, &b, op);
        let prepared = PreparedPath::boolean_op(op, &prepared_a, &prepared_b);

        assert_eq!(prepared.to_rle(), expected, "{:?}", op);
        assert_eq!(
            prepared.to_rle(),
            PreparedPath::from_rle(&expected).to_rle(),
            "{:?}",
            op
        );
        assert!(prepared
            .patches()
            .windows(2)
            .all(|w| (w[0].y, w[0].x) < (w[1].y, w[1].x)));
    }
}

#[test]
fn rasterizer_is_reusable() {
    let mut rasterizer = Rasterizer::new();
    let big = rasterizer
        .fill(&rect(0.0, 0.0, 50.0, 50.0), &FillOptions::default(), None)
        .unwrap();
    let small = rasterizer
        .fill(&rect(0.0, 0.0, 2.0, 2.0), &FillOptions::default(), None)
        .unwrap();

    assert_eq!(big.spans().len(), 50);
    assert_eq!(small, fill(&rect(0.0, 0.0, 2.0, 2.0)));
}
