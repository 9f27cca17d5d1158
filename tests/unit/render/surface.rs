use super::*;
use crate::render::fonts::{FontSources, GenericFamily};
use crate::render::text::Typesetter;

fn small() -> Surface {
    Surface::new(Canvas {
        width: 64,
        height: 48,
    })
    .unwrap()
}

fn alpha_at(s: &Surface, x: u32, y: u32) -> u8 {
    s.to_frame().pixel(x, y).unwrap()[3]
}

fn lit_pixels(s: &Surface) -> usize {
    s.pixels().chunks_exact(4).filter(|px| px[3] != 0).count()
}

#[test]
fn new_rejects_degenerate_or_oversized_canvas() {
    assert!(Surface::new(Canvas {
        width: 0,
        height: 10
    })
    .is_err());
    assert!(Surface::new(Canvas {
        width: 70_000,
        height: 10
    })
    .is_err());
}

#[test]
fn fill_rect_covers_exact_pixels() {
    let mut s = small();
    s.fill_rect(Rect::new(10.0, 10.0, 20.0, 20.0), Rgba8::rgb(255, 0, 0))
        .unwrap();

    assert_eq!(s.to_frame().pixel(15, 15), Some([255, 0, 0, 255]));
    assert_eq!(alpha_at(&s, 5, 5), 0);
    assert_eq!(alpha_at(&s, 25, 15), 0);
    assert_eq!(lit_pixels(&s), 100);
}

#[test]
fn global_alpha_scales_coverage() {
    let mut s = small();
    s.set_global_alpha(0.5);
    s.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Rgba8::WHITE)
        .unwrap();
    assert_eq!(alpha_at(&s, 4, 4), 128);
}

#[test]
fn offset_shadow_lands_outside_shape() {
    let mut s = small();
    s.set_shadow(Shadow::glow(Rgba8::BLACK, 0.0).offset_by(5.0, 5.0));
    s.fill_rect(Rect::new(10.0, 10.0, 20.0, 20.0), Rgba8::WHITE)
        .unwrap();

    assert_eq!(s.to_frame().pixel(22, 22), Some([0, 0, 0, 255]));
    assert_eq!(s.to_frame().pixel(12, 12), Some([255, 255, 255, 255]));
    assert_eq!(alpha_at(&s, 26, 26), 0);
}

#[test]
fn blurred_shadow_spreads_around_shape() {
    let mut plain = small();
    plain
        .fill_rect(Rect::new(24.0, 16.0, 40.0, 32.0), Rgba8::WHITE)
        .unwrap();

    let mut glowing = small();
    glowing.set_shadow(Shadow::glow(Rgba8::rgb(0, 255, 0), 10.0));
    glowing
        .fill_rect(Rect::new(24.0, 16.0, 40.0, 32.0), Rgba8::WHITE)
        .unwrap();

    assert!(lit_pixels(&glowing) > lit_pixels(&plain));
    assert!(alpha_at(&glowing, 21, 24) > 0);
    assert_eq!(alpha_at(&plain, 21, 24), 0);
}

#[test]
fn invisible_shadow_is_skipped() {
    assert!(!Shadow::NONE.is_visible());
    assert!(!Shadow::glow(Rgba8::TRANSPARENT, 10.0).is_visible());
    assert!(!Shadow::glow(Rgba8::BLACK, 0.0).is_visible());
    assert!(Shadow::glow(Rgba8::BLACK, 0.0).offset_by(1.0, 0.0).is_visible());
}

#[test]
fn scoped_state_resets_on_drop() {
    let mut s = small();
    {
        let mut scoped = s.scoped_state();
        scoped.set_shadow(Shadow::glow(Rgba8::WHITE, 4.0));
        scoped.set_global_alpha(0.3);
        scoped.set_line_width(5.0);
        assert_ne!(scoped.state(), DrawState::default());
    }
    assert_eq!(s.state(), DrawState::default());
}

#[test]
fn scoped_state_resets_on_early_error_return() {
    fn effect(surface: &mut Surface, fail: bool) -> BannerResult<()> {
        let mut scoped = surface.scoped_state();
        scoped.set_shadow(Shadow::glow(Rgba8::WHITE, 4.0));
        if fail {
            return Err(BannerError::render("boom"));
        }
        scoped.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba8::WHITE)
    }

    let mut s = small();
    assert!(effect(&mut s, true).is_err());
    assert_eq!(s.state(), DrawState::default());
}

#[test]
fn gradient_fill_interpolates_across_rect() {
    let mut s = small();
    let g = Gradient::linear(Point::new(0.0, 0.0), Point::new(64.0, 0.0))
        .with_stop(0.0, Rgba8::rgb(255, 0, 0))
        .with_stop(1.0, Rgba8::rgb(0, 0, 255));
    s.fill_rect_gradient(s.canvas().rect(), &g).unwrap();

    let f = s.to_frame();
    let left = f.pixel(0, 10).unwrap();
    let right = f.pixel(63, 10).unwrap();
    assert!(left[0] > 240 && left[2] < 15);
    assert!(right[2] > 240 && right[0] < 15);
    assert_eq!(lit_pixels(&s), 64 * 48);
}

#[test]
fn gradient_fill_is_clipped_to_rect() {
    let mut s = small();
    let g = Gradient::radial(Point::new(32.0, 24.0), 10.0).with_stop(0.0, Rgba8::WHITE);
    s.fill_rect_gradient(Rect::new(30.0, 20.0, 34.0, 28.0), &g)
        .unwrap();
    assert_eq!(lit_pixels(&s), 4 * 8);
}

#[test]
fn stroke_path_draws_line_of_requested_width() {
    let mut s = small();
    s.set_line_width(2.0);
    let mut path = BezPath::new();
    path.move_to((0.0, 24.0));
    path.line_to((64.0, 24.0));
    s.stroke_path(&path, Rgba8::WHITE).unwrap();

    assert_eq!(alpha_at(&s, 30, 23), 255);
    assert_eq!(alpha_at(&s, 30, 24), 255);
    assert_eq!(alpha_at(&s, 30, 20), 0);
}

#[test]
fn fill_path_draws_triangle() {
    let mut s = small();
    let mut path = BezPath::new();
    path.move_to((32.0, 4.0));
    path.line_to((4.0, 44.0));
    path.line_to((60.0, 44.0));
    path.close_path();
    s.fill_path(&path, Rgba8::WHITE).unwrap();

    assert_eq!(alpha_at(&s, 32, 30), 255);
    assert_eq!(alpha_at(&s, 2, 2), 0);
}

#[test]
fn batch_draws_all_shapes_in_one_layer() {
    let mut s = small();
    s.batch(|b| {
        b.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Rgba8::WHITE);
        b.fill_rect(Rect::new(60.0, 44.0, 64.0, 48.0), Rgba8::rgb(0, 255, 0));
    })
    .unwrap();
    assert_eq!(lit_pixels(&s), 32);
    assert_eq!(s.to_frame().pixel(62, 46), Some([0, 255, 0, 255]));
}

#[test]
fn fill_text_paints_around_anchor() {
    let mut ts = Typesetter::new(&FontSources {
        system_fonts: false,
        dirs: vec![std::path::PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/data/fonts"
        ))],
    })
    .unwrap();
    let run = ts
        .layout("HELLO", "DejaVu Sans", GenericFamily::SansSerif, 32.0)
        .unwrap();

    let mut s = Surface::new(Canvas::BANNER).unwrap();
    let origin = run.origin_centered_on(Canvas::BANNER.center());
    s.fill_text(&run, origin, Rgba8::WHITE).unwrap();

    let bounds = composite::alpha_bounds(s.pixels(), 480, 168).unwrap();
    assert!(bounds.x0 > 100 && bounds.x1 < 380, "{bounds:?}");
    assert!(bounds.y0 > 40 && bounds.y1 < 128, "{bounds:?}");

    let mut outlined = Surface::new(Canvas::BANNER).unwrap();
    outlined.set_line_width(3.0);
    outlined.stroke_text(&run, origin, Rgba8::WHITE).unwrap();
    assert!(outlined.pixels().chunks_exact(4).any(|px| px[3] != 0));
}

#[test]
fn clear_removes_content_and_frame_copies_pixels() {
    let mut s = small();
    s.fill_rect(s.canvas().rect(), Rgba8::new(255, 255, 255, 128))
        .unwrap();
    let frame = s.to_frame();
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), 64 * 48 * 4);
    assert_eq!(frame.pixel(0, 0), Some([255, 255, 255, 128]));
    assert_eq!(frame.pixel(64, 0), None);

    s.clear();
    assert_eq!(lit_pixels(&s), 0);
    assert_eq!(frame.pixel(0, 0).unwrap()[3], 128);
}
