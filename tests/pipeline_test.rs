use std::path::PathBuf;

use bgr_view::display::{DisplayBackend, DisplaySurface, KeyCode};
use bgr_view::filter::convert_channel_order;
use bgr_view::loader::load;
use bgr_view::{ChannelOrder, Error, Pipeline, PixelBuffer, Result, Stage};
use image::{Rgb, RgbImage};

struct FirstKey {
    frames: Vec<Vec<u8>>,
    released: usize,
}

impl DisplayBackend for FirstKey {
    fn show(&mut self, buf: &PixelBuffer, title: &str) -> Result<DisplaySurface> {
        self.frames.push(buf.as_raw().to_vec());
        DisplaySurface::new(buf, title)
    }

    fn wait_for_key(
        &mut self,
        _surface: &mut DisplaySurface,
        _timeout_ms: u64,
    ) -> Result<KeyCode> {
        Ok(KeyCode::Pressed(egui::Key::Enter))
    }

    fn teardown(&mut self, _surface: DisplaySurface) {
        self.released += 1;
    }
}

fn write_png(name: &str, img: &RgbImage) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "bgr-view-it-{}-{}.png",
        std::process::id(),
        name
    ));
    img.save(&path).unwrap();
    path
}

/// 2x2 image whose decoded BGR pixels are
/// [[(255,0,0),(0,255,0)],[(0,0,255),(10,20,30)]].
fn two_by_two() -> RgbImage {
    let mut img = RgbImage::new(2, 2);
    img.put_pixel(0, 0, Rgb([0, 0, 255]));
    img.put_pixel(1, 0, Rgb([0, 255, 0]));
    img.put_pixel(0, 1, Rgb([255, 0, 0]));
    img.put_pixel(1, 1, Rgb([30, 20, 10]));
    img
}

#[test]
fn loaded_png_is_bgr() {
    let path = write_png("bgr", &two_by_two());
    let buf = load(&path).unwrap();

    assert_eq!(buf.order(), ChannelOrder::Bgr);
    assert_eq!(buf.shape(), (2, 2, 3));
    assert_eq!(buf.pixel(0, 0), Some(&[255, 0, 0][..]));
    assert_eq!(buf.pixel(1, 1), Some(&[10, 20, 30][..]));

    std::fs::remove_file(path).unwrap();
}

#[test]
fn end_to_end_two_by_two() {
    let path = write_png("e2e", &two_by_two());
    let rgb = convert_channel_order(load(&path).unwrap(), ChannelOrder::Bgr, ChannelOrder::Rgb)
        .unwrap();

    let expected = PixelBuffer::from_pixels(
        ChannelOrder::Rgb,
        &[
            vec![[0, 0, 255], [0, 255, 0]],
            vec![[255, 0, 0], [30, 20, 10]],
        ],
    )
    .unwrap();
    assert_eq!(rgb, expected);

    std::fs::remove_file(path).unwrap();
}

#[test]
fn pipeline_shows_rgb_frame_and_releases_it() {
    let path = write_png("pipeline", &two_by_two());
    let mut pipeline = Pipeline::new(FirstKey {
        frames: Vec::new(),
        released: 0,
    });

    let key = pipeline
        .run(&path, bgr_view::WINDOW_TITLE, bgr_view::WAIT_FOREVER)
        .unwrap();
    assert_eq!(key, KeyCode::Pressed(egui::Key::Enter));
    assert_eq!(pipeline.stage(), Stage::Closed);

    let backend = pipeline.into_backend();
    assert_eq!(backend.released, 1);
    assert_eq!(
        backend.frames,
        vec![vec![0, 0, 255, 0, 255, 0, 255, 0, 0, 30, 20, 10]]
    );

    std::fs::remove_file(path).unwrap();
}

#[test]
fn corrupt_file_is_a_decode_error() {
    let path =
        std::env::temp_dir().join(format!("bgr-view-it-{}-corrupt.png", std::process::id()));
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nnot really").unwrap();

    let mut pipeline = Pipeline::new(FirstKey {
        frames: Vec::new(),
        released: 0,
    });
    let err = pipeline.run(&path, "image", 0).unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(pipeline.stage(), Stage::Idle);
    assert!(pipeline.backend().frames.is_empty());
    assert_eq!(pipeline.backend().released, 0);

    std::fs::remove_file(path).unwrap();
}
