//! Renders a small scene, clicks around it and writes `scene.png` and
//! `scene.svg` into the current directory.
//!
//! Run with `RUST_LOG=debug` to see per-walk statistics.

use std::cell::Cell;
use std::rc::Rc;

use scenepaint::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let clicks = Rc::new(Cell::new(0));
    let on_click = {
        let clicks = Rc::clone(&clicks);
        move |event: &PointerEvent| {
            clicks.set(clicks.get() + 1);
            log::info!("clicked {:?} at ({}, {})", event.target, event.x, event.y);
        }
    };

    let scene = SceneNode::container([
        SceneNode::shape(Shape::circle(0.0, 0.0, 50.0).fill(Color::RED))
            .with_position(100.0, 100.0)
            .on(PointerEventKind::Down, on_click.clone()),
        SceneNode::shape(Shape::rectangle(0.0, 0.0, 80.0, 40.0).fill(Color::BLUE))
            .with_position(200.0, 50.0)
            .with_rotation(45.0)
            .on(PointerEventKind::Down, on_click),
        SceneNode::shape(Shape::polyline(
            [(0.0, 0.0), (120.0, 40.0), (240.0, 0.0)],
            Stroke::new(Color::BLACK, 3.0),
        ))
        .with_position(60.0, 220.0),
    ]);

    let engine = Engine::builder().width(400).height(300).build()?;
    let stats = engine.render_blocking(scene);
    println!("painted {} shapes, {} sprites", stats.shapes, stats.sprites);

    for (x, y) in [(100.0, 100.0), (240.0, 70.0), (0.0, 0.0)] {
        match engine.on_pointer_down(x, y) {
            Some(id) => println!("({x}, {y}) -> node {}", id.as_u64()),
            None => println!("({x}, {y}) -> nothing"),
        }
    }
    println!("{} click handlers ran", clicks.get());

    std::fs::write("scene.png", engine.encode_png()?)?;
    std::fs::write("scene.svg", engine.export_document_blocking())?;
    println!("wrote scene.png and scene.svg");

    engine.dispose();
    Ok(())
}
