//! Raster painter: repaints the whole scene onto a persistent pixmap.
//!
//! A paint walk builds a [`DisplayList`], waits for every sprite image the
//! walk touched, draws the list into a fresh frame and only then swaps that
//! frame in as the presented surface. A partially drawn frame is never
//! visible.

pub mod canvas;
pub mod commands;
pub mod filter;

use std::cell::{Ref, RefCell};

use image::RgbaImage;
use resvg::tiny_skia::Pixmap;

use crate::error::SurfaceInitError;
use crate::geometry::{resolve_sprite, OutputGeometry};
use crate::image_cache::{ImageCache, LoadResult};
use crate::scene::{Color, SceneNode};

use self::canvas::{to_pixmap, Canvas};
use self::commands::{DisplayList, DrawCommand};

/// Counters for a single paint walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub shapes: usize,
    pub sprites: usize,
    /// Sprites skipped because their image failed to load.
    pub skipped_sprites: usize,
}

pub struct RasterPainter {
    surface: RefCell<Pixmap>,
    background: Color,
}

impl RasterPainter {
    pub fn new(width: u32, height: u32, background: Color) -> Result<Self, SurfaceInitError> {
        let mut surface = Pixmap::new(width, height).ok_or(SurfaceInitError { width, height })?;
        surface.fill(canvas::skia_color(background));
        Ok(Self {
            surface: RefCell::new(surface),
            background,
        })
    }

    pub fn width(&self) -> u32 {
        self.surface.borrow().width()
    }

    pub fn height(&self) -> u32 {
        self.surface.borrow().height()
    }

    /// The last presented frame.
    pub fn surface(&self) -> Ref<'_, Pixmap> {
        self.surface.borrow()
    }

    /// The last presented frame as straight RGBA.
    pub fn snapshot_rgba(&self) -> RgbaImage {
        let surface = self.surface.borrow();
        let data = surface
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RgbaImage::from_raw(surface.width(), surface.height(), data)
            .unwrap_or_else(|| RgbaImage::new(surface.width(), surface.height()))
    }

    /// Repaint `root` and present the result.
    ///
    /// Overlapping calls are not cancelled; each presents when it finishes
    /// and the last one to finish wins.
    pub async fn paint(&self, root: &SceneNode, cache: &ImageCache) -> PaintStats {
        let list = DisplayList::build(root, cache);
        let images = futures::future::join_all(list.requests.iter().cloned()).await;

        let mut frame = self.surface.borrow().clone();
        let stats = self.draw(&mut frame, &list, &images);

        *self.surface.borrow_mut() = frame;
        log::debug!(
            "Painted {} shapes, {} sprites ({} skipped)",
            stats.shapes,
            stats.sprites,
            stats.skipped_sprites
        );
        stats
    }

    fn draw(&self, frame: &mut Pixmap, list: &DisplayList, images: &[LoadResult]) -> PaintStats {
        let mut stats = PaintStats::default();
        let mut canvas = Canvas::new(frame);
        canvas.clear(self.background);

        for command in &list.commands {
            match command {
                DrawCommand::Shape {
                    resolved,
                    fill,
                    stroke,
                } => {
                    stats.shapes += 1;
                    canvas.with_rotation(&resolved.rotation, |c| match &resolved.geometry {
                        OutputGeometry::Rect(rect) => {
                            if let Some(fill) = fill {
                                c.fill_rect(*rect, *fill);
                            }
                            if let Some(stroke) = stroke {
                                c.stroke_rect(*rect, stroke);
                            }
                        }
                        OutputGeometry::Circle { center, radius } => {
                            if let Some(fill) = fill {
                                c.fill_circle(*center, *radius, *fill);
                            }
                            if let Some(stroke) = stroke {
                                c.stroke_circle(*center, *radius, stroke);
                            }
                        }
                        OutputGeometry::Points(points) | OutputGeometry::Polygon(points) => {
                            if let Some(stroke) = stroke {
                                c.stroke_polyline(points, stroke);
                            }
                        }
                    });
                }
                DrawCommand::Sprite {
                    transform,
                    filter,
                    slot,
                } => {
                    let resource = match images.get(*slot) {
                        Some(Ok(resource)) => resource,
                        Some(Err(err)) => {
                            log::debug!("Skipping sprite: {err}");
                            stats.skipped_sprites += 1;
                            continue;
                        }
                        None => continue,
                    };
                    let Some(pixmap) = to_pixmap(&filter.apply(resource.pixels())) else {
                        stats.skipped_sprites += 1;
                        continue;
                    };
                    let (dest, rotation) =
                        resolve_sprite(transform, resource.width(), resource.height());
                    canvas.with_rotation(&rotation, |c| c.draw_image(&pixmap, dest));
                    stats.sprites += 1;
                }
            }
        }

        stats
    }
}
