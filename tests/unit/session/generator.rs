use super::*;
use crate::config::FontOptions;
use crate::effects::{BackgroundMode, Effect};
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Rgba8;
use crate::settings::FontSelection;

fn config() -> BannerConfig {
    BannerConfig {
        seed: Some(11),
        font_rotation: vec![
            "DejaVu Sans".to_string(),
            "DejaVu Sans Mono".to_string(),
            "Not Installed Anywhere".to_string(),
        ],
        fonts: FontOptions {
            system_fonts: false,
            dirs: vec![std::path::PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/tests/data/fonts"
            ))],
        },
        ..BannerConfig::default()
    }
}

fn generator() -> BannerGenerator {
    BannerGenerator::new(config()).unwrap()
}

#[test]
fn new_rejects_invalid_config_and_missing_fonts() {
    let err = BannerGenerator::new(BannerConfig {
        font_rotation: Vec::new(),
        ..config()
    })
    .unwrap_err();
    assert!(err.is_validation());

    let err = BannerGenerator::new(BannerConfig {
        fonts: FontOptions {
            system_fonts: false,
            dirs: Vec::new(),
        },
        ..config()
    })
    .unwrap_err();
    assert!(matches!(err, BannerError::Font(_)));
}

#[test]
fn ticket_guards_the_state() {
    let g = generator();
    assert_eq!(g.state(), GenerationState::Idle);
    {
        let _ticket = g.try_begin().unwrap();
        assert!(g.is_generating());
        assert!(matches!(
            g.try_begin(),
            Err(BannerError::GenerationInProgress)
        ));
    }
    assert_eq!(g.state(), GenerationState::Idle);
    drop(g.try_begin().unwrap());
}

#[test]
fn generate_while_running_is_rejected_without_side_effects() {
    let g = generator();
    let ticket = g.try_begin().unwrap();
    let err = g.generate(&RenderSettings::new("HELLO")).unwrap_err();
    assert!(matches!(err, BannerError::GenerationInProgress));
    assert_eq!(
        err.user_message(),
        "Please wait for current generation to complete"
    );
    assert!(g.current().is_none());

    let first = g
        .generate_with(&ticket, &RenderSettings::new("HELLO"))
        .unwrap();
    drop(ticket);
    assert_eq!(g.current().unwrap().bytes, first.bytes);
    assert!(!g.is_generating());
}

#[test]
fn rotation_renders_one_frame_per_family() {
    let g = generator();
    let settings = RenderSettings::new("HELLO").validate().unwrap();
    let mut sink = InMemorySink::new();
    let ticket = g.try_begin().unwrap();
    let stats = g.render_frames(&ticket, &settings, &mut sink).unwrap();

    assert_eq!(stats.frames, 3);
    assert_eq!(stats.fallback_frames, 1);
    assert!(sink.is_ended());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height, cfg.delay_ms), (480, 168, 100));

    let indices: Vec<u32> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, [0, 1, 2]);
    for (_, frame) in sink.frames() {
        assert_eq!((frame.width, frame.height), (480, 168));
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
        assert!(frame.data.chunks_exact(4).any(|px| px[0] > 200));
    }
}

#[test]
fn named_font_renders_a_single_frame() {
    let g = generator();
    let result = g
        .generate(&RenderSettings::new("HELLO").with_font("DejaVu Sans Mono"))
        .unwrap();
    assert_eq!(result.frame_count, 1);
    assert_eq!(result.text, "HELLO");
    assert_eq!(&result.bytes[..6], b"GIF89a");
}

#[test]
fn validation_failure_keeps_previous_result_and_releases_state() {
    let g = generator();
    let ok = g.generate(&RenderSettings::new("first")).unwrap();

    let err = g.generate(&RenderSettings::new("   ")).unwrap_err();
    assert!(err.is_validation());
    assert!(!g.is_generating());
    assert!(Arc::ptr_eq(&g.current().unwrap(), &ok));

    let err = g
        .generate(&RenderSettings::new("x").with_colors("#12", "#000000"))
        .unwrap_err();
    assert!(err.is_validation());
    assert!(!g.is_generating());
}

#[test]
fn result_keeps_sanitized_text_and_settings_snapshot() {
    let g = generator();
    let settings = RenderSettings::new("  <Hi> there ")
        .with_effect(Effect::Glow)
        .with_background_mode(BackgroundMode::Gradient)
        .with_font(FontSelection::Named("DejaVu Sans".to_string()));
    let result = g.generate(&settings).unwrap();
    assert_eq!(result.text, "Hi there");
    assert_eq!(result.settings, settings);
    assert_eq!(result.download_filename(), "banner-hi_there.gif");
    assert_eq!(result.byte_size, result.bytes.len());
}

#[test]
fn clear_current_forgets_the_result() {
    let g = generator();
    g.generate(&RenderSettings::new("x").with_font("DejaVu Sans"))
        .unwrap();
    assert!(g.clear_current().is_some());
    assert!(g.current().is_none());
}

#[test]
fn seeded_generator_is_reproducible() {
    let settings = RenderSettings::new("HELLO")
        .with_effect(Effect::Sparkle)
        .with_font("DejaVu Sans");
    let a = generator().generate(&settings).unwrap();
    let b = generator().generate(&settings).unwrap();
    assert_eq!(a.bytes, b.bytes);
}

#[test]
fn ticket_from_another_generator_is_refused() {
    let a = generator();
    let b = generator();
    let ticket = a.try_begin().unwrap();
    let settings = RenderSettings::new("x").validate().unwrap();
    let mut sink = InMemorySink::new();
    assert!(b.render_frames(&ticket, &settings, &mut sink).is_err());
}

#[test]
fn rotation_report_marks_fallbacks() {
    let g = generator();
    let report = g.resolve_rotation().unwrap();
    assert_eq!(report.len(), 3);
    assert!(report[0].1.exact);
    assert_eq!(report[1].1.family, "DejaVu Sans Mono");
    assert!(!report[2].1.exact);
    assert_eq!(report[2].0, "Not Installed Anywhere");
}

#[test]
fn background_color_reaches_every_frame() {
    let g = generator();
    let settings = RenderSettings::new("A")
        .with_colors("#ffffff", "#336699")
        .validate()
        .unwrap();
    let mut sink = InMemorySink::new();
    let ticket = g.try_begin().unwrap();
    g.render_frames(&ticket, &settings, &mut sink).unwrap();
    let corner = sink.frames()[0].1.pixel(0, 0).unwrap();
    assert_eq!(Rgba8::new(corner[0], corner[1], corner[2], corner[3]), Rgba8::rgb(0x33, 0x66, 0x99));
}
