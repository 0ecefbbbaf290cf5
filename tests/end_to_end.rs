//! Engine-level tests: painter, exporter and hit tester on the same scene.

use std::cell::Cell;
use std::collections::HashMap;
use std::io::Cursor;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use image::RgbaImage;
use scenepaint::prelude::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

/// In-memory fetcher shared with the test through `Rc`s.
#[derive(Default, Clone)]
struct MemoryFetcher {
    files: Rc<HashMap<String, Vec<u8>>>,
    calls: Rc<Cell<usize>>,
}

impl MemoryFetcher {
    fn new(files: impl IntoIterator<Item = (&'static str, Vec<u8>)>) -> Self {
        Self {
            files: Rc::new(files.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
            calls: Rc::default(),
        }
    }
}

impl ImageFetcher for MemoryFetcher {
    fn fetch(&self, source_id: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, FetchError>> {
        self.calls.set(self.calls.get() + 1);
        let result = self
            .files
            .get(source_id)
            .cloned()
            .ok_or_else(|| FetchError::Unsupported(source_id.to_string()));
        futures::future::ready(result).boxed_local()
    }
}

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    RgbaImage::from_pixel(width, height, image::Rgba(color))
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn px(engine: &Engine, x: u32, y: u32) -> [u8; 4] {
    engine.snapshot_rgba().get_pixel(x, y).0
}

fn document(engine: &Engine) -> String {
    String::from_utf8(engine.export_document_blocking()).unwrap()
}

/// Parse the `points` attribute of the first `<polygon>` in `doc`.
fn polygon_points(doc: &str) -> Vec<(f32, f32)> {
    let start = doc.find("<polygon points=\"").unwrap() + "<polygon points=\"".len();
    let end = start + doc[start..].find('"').unwrap();
    doc[start..end]
        .split(' ')
        .map(|pair| {
            let (x, y) = pair.split_once(',').unwrap();
            (x.parse().unwrap(), y.parse().unwrap())
        })
        .collect()
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-2
}

fn red_circle() -> SceneNode {
    SceneNode::shape(Shape::circle(0.0, 0.0, 50.0).fill(Color::RED)).with_position(100.0, 100.0)
}

fn blue_rect() -> SceneNode {
    SceneNode::shape(Shape::rectangle(0.0, 0.0, 80.0, 40.0).fill(Color::BLUE))
        .with_position(200.0, 50.0)
        .with_rotation(45.0)
}

#[test]
fn test_scene_renders_circle_and_rotated_rect() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.render_blocking(SceneNode::container([red_circle(), blue_rect()]));

    assert_eq!(px(&engine, 100, 100), RED);
    assert_eq!(px(&engine, 147, 100), RED);
    assert_eq!(px(&engine, 100, 53), RED);
    assert_eq!(px(&engine, 153, 100), WHITE);
    assert_eq!(px(&engine, 140, 140), WHITE);

    assert_eq!(px(&engine, 240, 70), BLUE);
    // Outside the unrotated rectangle, inside the rotated one.
    assert_eq!(px(&engine, 240, 95), BLUE);
    // Inside the unrotated rectangle, outside the rotated one.
    assert_eq!(px(&engine, 275, 55), WHITE);
}

#[test]
fn test_scene_exports_matching_primitives() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.render_blocking(SceneNode::container([red_circle(), blue_rect()]));
    let doc = document(&engine);

    assert!(doc.contains(r##"<circle cx="100" cy="100" r="50" fill="#ff0000"/>"##));
    assert!(doc.contains(r#"data-orientation="landscape""#));

    let corners = polygon_points(&doc);
    assert_eq!(corners.len(), 4);
    let (s, c) = 45.0f32.to_radians().sin_cos();
    let unrotated = [(200.0, 50.0), (280.0, 50.0), (280.0, 90.0), (200.0, 90.0)];
    for ((x, y), (ux, uy)) in corners.iter().zip(unrotated) {
        let (dx, dy) = (ux - 240.0, uy - 70.0);
        assert!(approx_eq(*x, 240.0 + dx * c - dy * s), "x {x}");
        assert!(approx_eq(*y, 70.0 + dx * s + dy * c), "y {y}");
    }
}

#[test]
fn test_clicks_resolve_to_scene_nodes() {
    let circle_downs = Rc::new(Cell::new(0));
    let rect_ups = Rc::new(Cell::new(0));

    let circle = {
        let downs = Rc::clone(&circle_downs);
        red_circle().on(PointerEventKind::Down, move |event| {
            assert_eq!((event.x, event.y), (100.0, 100.0));
            downs.set(downs.get() + 1);
        })
    };
    let rect = {
        let ups = Rc::clone(&rect_ups);
        blue_rect().on(PointerEventKind::Up, move |_| ups.set(ups.get() + 1))
    };
    let (circle_id, rect_id) = (circle.id(), rect.id());

    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.render_blocking(SceneNode::container([circle, rect]));

    assert_eq!(engine.on_pointer_down(100.0, 100.0), Some(circle_id));
    assert_eq!(engine.on_pointer_up(240.0, 70.0), Some(rect_id));
    assert_eq!(engine.on_pointer_down(0.0, 0.0), None);
    // Handlers only fire for their own event kind.
    assert_eq!(engine.on_pointer_up(100.0, 100.0), Some(circle_id));

    assert_eq!(circle_downs.get(), 1);
    assert_eq!(rect_ups.get(), 1);
}

#[test]
fn test_rotation_round_trip_is_bit_exact() {
    let scene = |degrees: f32| {
        SceneNode::container([
            red_circle(),
            SceneNode::shape(Shape::rectangle(0.0, 0.0, 80.0, 40.0).fill(Color::BLUE))
                .with_position(200.0, 50.0)
                .with_rotation(degrees),
        ])
    };
    let engine = Engine::builder().width(320).height(200).build().unwrap();

    engine.render_blocking(scene(0.0));
    let before = engine.snapshot_rgba();

    engine.render_blocking(scene(30.0));
    assert_ne!(engine.snapshot_rgba().as_raw(), before.as_raw());

    engine.render_blocking(scene(0.0));
    assert_eq!(engine.snapshot_rgba().as_raw(), before.as_raw());
}

#[test]
fn test_rect_and_circle_sizes_match_across_backends() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.render_blocking(SceneNode::container([
        SceneNode::shape(Shape::rectangle(0.0, 0.0, 80.0, 40.0).fill(Color::BLUE))
            .with_position(300.0, 300.0)
            .with_scale(2.0, 0.5),
        SceneNode::shape(Shape::circle(0.0, 0.0, 20.0).fill(Color::RED))
            .with_position(600.0, 300.0)
            .with_scale(2.0, 5.0),
    ]));

    // 160 x 20 rectangle.
    assert_eq!(px(&engine, 459, 319), BLUE);
    assert_eq!(px(&engine, 461, 310), WHITE);
    assert_eq!(px(&engine, 310, 321), WHITE);
    // Radius 40 from the x-scale only.
    assert_eq!(px(&engine, 638, 300), RED);
    assert_eq!(px(&engine, 600, 338), RED);
    assert_eq!(px(&engine, 600, 342), WHITE);

    let doc = document(&engine);
    assert!(doc.contains(r#"<rect x="300" y="300" width="160" height="20""#));
    assert!(doc.contains(r#"<circle cx="600" cy="300" r="40""#));
}

#[test]
fn test_polylines_ignore_scale() {
    let stroke = Stroke::new(Color::BLACK, 4.0);
    let engine = Engine::new(EngineConfig::default()).unwrap();
    engine.render_blocking(SceneNode::container([
        SceneNode::shape(Shape::polyline([(0.0, 0.0), (100.0, 0.0)], stroke))
            .with_position(50.0, 500.0)
            .with_scale(3.0, 3.0),
        SceneNode::shape(Shape::polyline([(0.0, 0.0)], stroke)).with_position(400.0, 400.0),
        SceneNode::shape(Shape::polyline([], stroke)),
    ]));

    assert_eq!(px(&engine, 100, 500), BLACK);
    assert_eq!(px(&engine, 200, 500), WHITE);
    assert_eq!(px(&engine, 400, 400), WHITE);

    let doc = document(&engine);
    assert!(doc.contains(r#"<line x1="50" y1="500" x2="150" y2="500""#));
    assert_eq!(doc.matches("<line").count(), 1);
}

#[test]
fn test_shared_sprite_source_is_fetched_once() {
    let fetcher = MemoryFetcher::new([("ship.png", png(8, 8, RED))]);
    let calls = Rc::clone(&fetcher.calls);
    let engine = Engine::builder().fetcher(fetcher).build().unwrap();

    let stats = engine.render_blocking(SceneNode::container([
        SceneNode::sprite(Sprite::new("ship.png")).with_position(10.0, 10.0),
        SceneNode::sprite(Sprite::new("ship.png")).with_position(30.0, 10.0),
    ]));

    assert_eq!(stats.sprites, 2);
    assert_eq!(calls.get(), 1);
    assert_eq!(px(&engine, 34, 14), RED);
    assert!(engine.image_cache().is_cached("ship.png"));
}

#[test]
fn test_failed_sprite_is_retried_and_omitted_from_export() {
    let fetcher = MemoryFetcher::new([("ok.png", png(4, 4, BLUE))]);
    let calls = Rc::clone(&fetcher.calls);
    let engine = Engine::builder().fetcher(fetcher).build().unwrap();
    let scene = || {
        SceneNode::container([
            SceneNode::sprite(Sprite::new("missing.png")),
            SceneNode::sprite(Sprite::new("ok.png")).with_position(50.0, 50.0),
            SceneNode::shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0).fill(Color::RED))
                .with_position(100.0, 100.0),
        ])
    };

    let stats = engine.render_blocking(scene());
    assert_eq!(stats.skipped_sprites, 1);
    assert_eq!(px(&engine, 105, 105), RED);
    assert_eq!(px(&engine, 51, 51), BLUE);

    engine.render_blocking(scene());
    // `missing.png` is fetched again, `ok.png` comes from the cache.
    assert_eq!(calls.get(), 3);

    let doc = document(&engine);
    assert_eq!(doc.matches("<image").count(), 1);
    assert!(doc.contains(r#"<image x="50" y="50" width="4" height="4""#));
    assert!(doc.contains("<rect"));
}

#[test]
fn test_dispose_releases_cache() {
    let fetcher = MemoryFetcher::new([("a.png", png(2, 2, RED))]);
    let engine = Engine::builder().fetcher(fetcher).build().unwrap();
    engine.render_blocking(SceneNode::container([SceneNode::sprite(Sprite::new("a.png"))]));
    assert_eq!(engine.image_cache().len(), 1);

    let image = Rc::downgrade(&engine.image_cache().get("a.png").unwrap());
    assert!(image.upgrade().is_some());
    engine.dispose();
    assert!(image.upgrade().is_none());
}
