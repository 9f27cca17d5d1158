use super::*;

use std::io::Cursor;
use std::time::Duration;

use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: rgba.repeat((width * height) as usize),
        premultiplied: true,
    }
}

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        delay_ms: 100,
        loop_count: 0,
    }
}

fn decode(bytes: &[u8]) -> Vec<image::Frame> {
    GifDecoder::new(Cursor::new(bytes))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap()
}

/// Loop count stored in the NETSCAPE2.0 application extension, if present.
fn netscape_loop_count(bytes: &[u8]) -> Option<u16> {
    let tag = b"NETSCAPE2.0";
    let at = bytes.windows(tag.len()).position(|w| w == tag)?;
    let block = &bytes[at + tag.len()..];
    // sub-block: size 3, id 1, count (little endian)
    (block[0] == 3 && block[1] == 1).then(|| u16::from_le_bytes([block[2], block[3]]))
}

#[test]
fn assembles_frames_in_order_with_uniform_delay() {
    let frames = [
        solid(8, 4, [255, 0, 0, 255]),
        solid(8, 4, [0, 255, 0, 255]),
        solid(8, 4, [0, 0, 255, 255]),
    ];
    let bytes = assemble(&frames, 100, 0).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
    assert_eq!(bytes.last(), Some(&0x3B));

    let decoded = decode(&bytes);
    assert_eq!(decoded.len(), 3);
    for frame in &decoded {
        assert_eq!(Duration::from(frame.delay()), Duration::from_millis(100));
        assert_eq!(frame.buffer().dimensions(), (8, 4));
    }
    assert_eq!(decoded[0].buffer().get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(decoded[1].buffer().get_pixel(3, 2).0, [0, 255, 0, 255]);
    assert_eq!(decoded[2].buffer().get_pixel(7, 3).0, [0, 0, 255, 255]);
}

#[test]
fn loop_count_zero_is_infinite_and_finite_counts_are_kept() {
    let frames = [solid(4, 4, [10, 20, 30, 255])];
    assert_eq!(netscape_loop_count(&assemble(&frames, 50, 0).unwrap()), Some(0));
    assert_eq!(netscape_loop_count(&assemble(&frames, 50, 3).unwrap()), Some(3));
}

#[test]
fn zero_frames_is_an_assembly_error() {
    let err = assemble(&[], 100, 0).unwrap_err();
    assert!(matches!(err, BannerError::Assembly(_)));
    assert!(err.to_string().contains("no frames"));

    let mut sink = GifSink::default();
    sink.begin(cfg(4, 4)).unwrap();
    assert!(matches!(sink.end(), Err(BannerError::Assembly(_))));
}

#[test]
fn rejects_out_of_order_and_mismatched_frames() {
    let mut sink = GifSink::default();
    sink.begin(cfg(4, 4)).unwrap();
    sink.push_frame(FrameIndex(1), &solid(4, 4, [0, 0, 0, 255]))
        .unwrap();

    let err = sink
        .push_frame(FrameIndex(1), &solid(4, 4, [0, 0, 0, 255]))
        .unwrap_err();
    assert!(err.to_string().contains("out-of-order"));

    let err = sink
        .push_frame(FrameIndex(2), &solid(5, 4, [0, 0, 0, 255]))
        .unwrap_err();
    assert!(err.to_string().contains("size mismatch"));

    let mut short = solid(4, 4, [0, 0, 0, 255]);
    short.data.truncate(8);
    assert!(sink.push_frame(FrameIndex(3), &short).is_err());
    assert_eq!(sink.frame_count(), 1);
}

#[test]
fn push_outside_a_session_fails() {
    let frame = solid(4, 4, [0, 0, 0, 255]);
    let mut sink = GifSink::default();
    let err = sink.push_frame(FrameIndex(0), &frame).unwrap_err();
    assert!(err.to_string().contains("not started"));

    sink.begin(cfg(4, 4)).unwrap();
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.end().unwrap();
    let err = sink.push_frame(FrameIndex(1), &frame).unwrap_err();
    assert!(err.to_string().contains("finalized"));
    assert!(!sink.finish().unwrap().is_empty());
}

#[test]
fn finish_before_end_fails() {
    let mut sink = GifSink::default();
    sink.begin(cfg(4, 4)).unwrap();
    assert!(sink.finish().is_err());
}

#[test]
fn degenerate_session_config_is_rejected() {
    let mut sink = GifSink::default();
    assert!(sink.begin(cfg(0, 4)).is_err());
    assert!(sink.begin(cfg(70_000, 4)).is_err());
}

#[test]
fn transparent_pixels_survive_encoding() {
    let mut frame = solid(4, 4, [0, 0, 0, 0]);
    frame.data[0..4].copy_from_slice(&[255, 255, 255, 255]);
    let decoded = decode(&assemble(&[frame], 100, 0).unwrap());
    let buffer = decoded[0].buffer();
    assert_eq!(buffer.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(buffer.get_pixel(3, 3).0[3], 0);
}

#[test]
fn premultiplied_input_is_unpremultiplied() {
    // 50% red, premultiplied.
    let decoded = decode(&assemble(&[solid(2, 2, [128, 0, 0, 128])], 100, 0).unwrap());
    let px = decoded[0].buffer().get_pixel(0, 0).0;
    // GIF has binary transparency: partially covered pixels come out opaque.
    assert!(px[0] >= 250, "{px:?}");
}

#[test]
fn speed_is_clamped() {
    let sink = GifSink::new(99);
    assert!(format!("{sink:?}").contains("speed: 30"));
    let sink = GifSink::new(-3);
    assert!(format!("{sink:?}").contains("speed: 1"));
}

#[test]
fn in_memory_sink_captures_frames() {
    let mut sink = crate::encode::sink::InMemorySink::new();
    sink.begin(cfg(4, 4)).unwrap();
    sink.push_frame(FrameIndex(0), &solid(4, 4, [1, 2, 3, 255]))
        .unwrap();
    sink.end().unwrap();
    assert_eq!(sink.config(), Some(cfg(4, 4)));
    assert_eq!(sink.frames().len(), 1);
    assert!(sink.is_ended());
}
