use super::*;
use crate::render::fonts::FontSources;
use crate::render::surface::DrawState;

fn typesetter() -> Typesetter {
    Typesetter::new(&FontSources {
        system_fonts: false,
        dirs: vec![std::path::PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/data/fonts"
        ))],
    })
    .unwrap()
}

fn render(effect: Effect, mode: BackgroundMode, seed: u64) -> Surface {
    let mut surface = Surface::new(Canvas::BANNER).unwrap();
    let mut ts = typesetter();
    let mut rng = Prng::seeded(seed);
    let options = FrameOptions {
        text_color: Rgba8::rgb(0, 255, 0),
        background_color: Rgba8::BLACK,
        background_mode: mode,
        effect,
    };
    render_frame(
        &mut surface,
        &mut ts,
        &mut rng,
        "HELLO",
        "DejaVu Sans",
        32.0,
        &options,
    )
    .unwrap();
    surface
}

#[test]
fn effect_ids_parse_with_alias_and_fallback() {
    assert_eq!("glow".parse::<Effect>().unwrap(), Effect::Glow);
    assert_eq!("NEON".parse::<Effect>().unwrap(), Effect::Neon);
    assert_eq!("fire".parse::<Effect>().unwrap(), Effect::Sparkle);
    assert!("plasma".parse::<Effect>().is_err());
    assert_eq!(Effect::from_id_lenient("plasma"), Effect::None);

    for effect in Effect::ALL {
        assert_eq!(effect.id().parse::<Effect>().unwrap(), effect);
    }
}

#[test]
fn effect_serde_is_lenient() {
    let e: Effect = serde_json::from_str("\"fire\"").unwrap();
    assert_eq!(e, Effect::Sparkle);
    let e: Effect = serde_json::from_str("\"wobble\"").unwrap();
    assert_eq!(e, Effect::None);
    assert_eq!(serde_json::to_string(&Effect::Retro).unwrap(), "\"retro\"");
}

#[test]
fn background_mode_parses() {
    assert_eq!(
        "gradient".parse::<BackgroundMode>().unwrap(),
        BackgroundMode::Gradient
    );
    assert_eq!(
        serde_json::from_str::<BackgroundMode>("\"transparent\"").unwrap(),
        BackgroundMode::Transparent
    );
    assert!("stripes".parse::<BackgroundMode>().is_err());
}

#[test]
fn every_effect_draws_text_over_background() {
    for effect in Effect::ALL {
        let surface = render(effect, BackgroundMode::Solid, 7);
        let frame = surface.to_frame();
        let center = frame.pixel(240, 84).unwrap();
        assert_eq!(center[3], 255, "{effect}: solid background is opaque");

        let drawn = frame
            .data
            .chunks_exact(4)
            .filter(|px| px[0] != 0 || px[1] != 0 || px[2] != 0)
            .count();
        assert!(drawn > 200, "{effect}: only {drawn} non-background pixels");
        assert_eq!(surface.state(), DrawState::default(), "{effect}: state leaked");
    }
}

#[test]
fn none_effect_keeps_transparent_background() {
    let surface = render(Effect::None, BackgroundMode::Transparent, 1);
    let frame = surface.to_frame();
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(479, 167), Some([0, 0, 0, 0]));
    assert!(frame.data.chunks_exact(4).any(|px| px[3] != 0));
}

#[test]
fn gradient_background_darkens_toward_far_corner() {
    let mut surface = Surface::new(Canvas::BANNER).unwrap();
    paint_background(
        &mut surface,
        Rgba8::rgb(200, 100, 60),
        BackgroundMode::Gradient,
    )
    .unwrap();
    let frame = surface.to_frame();
    let near = frame.pixel(0, 0).unwrap();
    let far = frame.pixel(479, 167).unwrap();
    assert!(near[0] >= 198 && near[1] >= 98);
    assert!(far[0] <= 152 && far[1] <= 52 && far[2] <= 12);
    assert_eq!(far[3], 255);
}

#[test]
fn seeded_effects_are_reproducible() {
    for effect in [Effect::Matrix, Effect::Retro, Effect::Sparkle] {
        let a = render(effect, BackgroundMode::Solid, 42);
        let b = render(effect, BackgroundMode::Solid, 42);
        assert_eq!(a.pixels(), b.pixels(), "{effect}");
    }
}

#[test]
fn different_seeds_move_particles() {
    let a = render(Effect::Sparkle, BackgroundMode::Solid, 1);
    let b = render(Effect::Sparkle, BackgroundMode::Solid, 2);
    assert_ne!(a.pixels(), b.pixels());
}

#[test]
fn render_frame_clears_previous_content() {
    let mut surface = Surface::new(Canvas::BANNER).unwrap();
    surface
        .fill_rect(Canvas::BANNER.rect(), Rgba8::WHITE)
        .unwrap();

    let mut ts = typesetter();
    let mut rng = Prng::seeded(3);
    let options = FrameOptions {
        background_mode: BackgroundMode::Transparent,
        ..FrameOptions::default()
    };
    render_frame(&mut surface, &mut ts, &mut rng, "x", "DejaVu Sans", 32.0, &options).unwrap();
    assert_eq!(surface.to_frame().pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn polygon_closes_path() {
    let path = polygon(&[
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
    ]);
    assert_eq!(path.elements().len(), 4);
    assert!(polygon(&[]).elements().is_empty());
}

#[test]
fn retro_shape_glow_carries_into_the_extrusion() {
    let mut surface = Surface::new(Canvas::BANNER).unwrap();
    let mut ts = typesetter();
    let mut rng = Prng::seeded(9);
    let color = Rgba8::rgb(255, 0, 200);
    let mut cx = EffectContext {
        surface: &mut surface,
        typesetter: &mut ts,
        rng: &mut rng,
        text: "HELLO",
        font_family: "DejaVu Sans",
        font_size: 32.0,
        color,
        anchor: Canvas::BANNER.center(),
    };
    retro::neon_shapes(&mut cx).unwrap();
    assert_eq!(
        cx.surface.state().shadow,
        crate::render::surface::Shadow::glow(color, 15.0)
    );
}
