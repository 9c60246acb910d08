//! End-to-end tests for live controls driving the background renderer.

use std::sync::Arc;
use std::time::Duration;

use retro_cam::controls::Controls;
use retro_cam::frame::{FrameBuffer, PixelFormat};
use retro_cam::options::Options;
use retro_cam::palette::{PalettePreset, Rgb};
use retro_cam::renderer::FrameRenderer;
use retro_cam::EngineError;

const TIMEOUT: Duration = Duration::from_secs(5);

fn gray_frame(value: u8, width: u32, height: u32) -> FrameBuffer {
    FrameBuffer::new(
        vec![value; (width * height * 3) as usize],
        width,
        height,
        PixelFormat::Rgb,
    )
    .unwrap()
}

fn bw_controls() -> Arc<Controls> {
    let options = Options {
        pixel_size: 1,
        dither: false,
        palette: PalettePreset::BlackAndWhite.palette(),
        ..Options::default()
    };
    Arc::new(Controls::new(options).unwrap())
}

fn all_pixels(frame: &FrameBuffer, color: Rgb) -> bool {
    frame.data.chunks_exact(3).all(|px| Rgb::new(px[0], px[1], px[2]) == color)
}

// ==================== Controls Tests ====================

#[test]
fn test_order_change_swaps_map() {
    let controls = bw_controls();
    let before = controls.snapshot();
    assert_eq!(before.threshold_map.order(), before.options.threshold_order);

    controls.set_threshold_order(5).unwrap();
    let after = controls.snapshot();
    assert_eq!(after.options.threshold_order, 5);
    assert_eq!(after.threshold_map.order(), 5);
    assert_eq!(after.threshold_map.side(), 64);

    // The old snapshot is unaffected
    assert_eq!(before.threshold_map.side(), 16);
}

#[test]
fn test_step_order_clamps() {
    let controls = bw_controls();
    controls.set_threshold_order(0).unwrap();
    assert_eq!(controls.step_threshold_order(-3).unwrap(), 0);
    controls.set_threshold_order(9).unwrap();
    assert_eq!(controls.step_threshold_order(4).unwrap(), 10);
}

#[test]
fn test_rejected_edit_leaves_options() {
    let controls = bw_controls();
    let before = controls.options();

    assert!(controls.set_pixel_size(0).is_err());
    assert_eq!(
        controls.set_threshold_order(11),
        Err(EngineError::InvalidOrder(11))
    );
    assert!(matches!(
        controls.pop_palette_color(),
        Err(EngineError::PaletteTooSmall { .. })
    ));
    assert_eq!(*controls.options(), *before);
}

#[test]
fn test_palette_editing() {
    let controls = bw_controls();
    controls.push_palette_color(Rgb::new(255, 0, 0)).unwrap();
    let added = controls.push_random_palette_color().unwrap();
    assert_eq!(controls.options().palette.len(), 4);

    assert_eq!(controls.pop_palette_color().unwrap(), added);
    controls.set_palette_color(0, Rgb::new(0, 0, 255)).unwrap();
    assert_eq!(
        controls.options().palette.colors(),
        &[Rgb::new(0, 0, 255), Rgb::WHITE, Rgb::new(255, 0, 0)]
    );
    assert!(matches!(
        controls.set_palette_color(7, Rgb::BLACK),
        Err(EngineError::PaletteIndexOutOfRange { index: 7, len: 3 })
    ));

    controls.apply_preset(PalettePreset::Gameboy).unwrap();
    assert_eq!(controls.options().palette, PalettePreset::Gameboy.palette());
}

// ==================== Renderer Tests ====================

#[test]
fn test_renderer_uses_latest_controls() {
    let controls = bw_controls();
    let (mut renderer, rx) = FrameRenderer::start(Arc::clone(&controls));

    renderer.submit(gray_frame(100, 4, 4));
    let out = rx.recv_timeout(TIMEOUT).unwrap();
    assert!(all_pixels(&out, Rgb::BLACK));

    controls.set_brightness(100).unwrap();
    renderer.submit(gray_frame(100, 4, 4));
    let out = rx.recv_timeout(TIMEOUT).unwrap();
    assert!(all_pixels(&out, Rgb::WHITE));

    renderer.stop();
    assert_eq!(renderer.stats().rendered, 2);
}

#[test]
fn test_renderer_drops_stale_frames() {
    let (mut renderer, rx) = FrameRenderer::start(bw_controls());

    // Nobody reads while frames pile in, so most of them must be dropped
    for i in 0..50u8 {
        renderer.submit(gray_frame(i, 64, 64));
    }
    renderer.submit(gray_frame(250, 64, 64));

    // The newest frame eventually arrives; older results may come first
    let mut newest = None;
    while let Ok(frame) = rx.recv_timeout(TIMEOUT) {
        if all_pixels(&frame, Rgb::WHITE) {
            newest = Some(frame);
            break;
        }
    }
    assert!(newest.is_some(), "newest frame was never delivered");

    drop(rx);
    renderer.stop();
    let stats = renderer.stats();
    assert_eq!(stats.submitted, 51);
    assert!(stats.dropped > 0);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.rendered + stats.dropped, stats.submitted);
}

#[test]
fn test_renderer_preserves_alpha() {
    let (mut renderer, rx) = FrameRenderer::start(bw_controls());
    let frame = FrameBuffer::new(vec![200, 200, 200, 17, 20, 20, 20, 99], 2, 1, PixelFormat::Rgba)
        .unwrap();
    renderer.submit(frame);

    let out = rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(out.data, vec![255, 255, 255, 17, 0, 0, 0, 99]);
    renderer.stop();
}
