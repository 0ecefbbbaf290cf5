//! Document exporter: walks the scene independently of the raster painter
//! and emits equivalent primitives onto a single fixed-size page.
//!
//! The page API has no transform stack, so rotation is baked into the
//! emitted coordinates. Only the visible-by-fill shapes (rectangles,
//! circles) and stroked polylines are emitted. Sprites are fetched afresh
//! through the fetcher, never through the image cache, and a sprite that
//! cannot be embedded is logged and left out.

mod svg;

use std::rc::Rc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::ExportAssemblyError;
use crate::fetch::ImageFetcher;
use crate::geometry::{resolve, resolve_sprite, OutputGeometry};
use crate::image_cache::looks_like_svg;
use crate::scene::{flatten, Color, Leaf, Point, Rect, SceneNode, Shape, Stroke};
use crate::transform::ComposedTransform;

pub use svg::SvgPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

impl PageOrientation {
    /// Landscape when wider than tall, portrait otherwise.
    pub fn for_size(width: u32, height: u32) -> Self {
        if width > height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

/// Encoded image bytes ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub mime_type: &'static str,
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

impl EmbeddedImage {
    /// Sniff the format and intrinsic size of `bytes` and base64-encode them.
    pub fn from_bytes(source_id: &str, bytes: &[u8]) -> Result<Self, ExportAssemblyError> {
        let (mime_type, width, height) = if looks_like_svg(bytes) {
            let tree = resvg::usvg::Tree::from_data(bytes, &resvg::usvg::Options::default())
                .map_err(|e| ExportAssemblyError::new(source_id, e))?;
            let size = tree.size();
            (
                "image/svg+xml",
                size.width().ceil() as u32,
                size.height().ceil() as u32,
            )
        } else {
            let format =
                image::guess_format(bytes).map_err(|e| ExportAssemblyError::new(source_id, e))?;
            let decoded = image::load_from_memory_with_format(bytes, format)
                .map_err(|e| ExportAssemblyError::new(source_id, e))?;
            (format.to_mime_type(), decoded.width(), decoded.height())
        };

        if width == 0 || height == 0 {
            return Err(ExportAssemblyError::new(source_id, "image has no pixels"));
        }

        Ok(Self {
            mime_type,
            base64: BASE64.encode(bytes),
            width,
            height,
        })
    }
}

/// Primitive emission API of a single document page.
pub trait DocumentPage {
    fn line(&mut self, from: Point, to: Point, stroke: &Stroke);
    fn filled_rect(&mut self, rect: Rect, fill: Color);
    /// A closed filled outline; used for rotated rectangles.
    fn filled_polygon(&mut self, points: &[Point], fill: Color);
    fn filled_circle(&mut self, center: Point, radius: f32, fill: Color);
    /// Place an image in `dest`, rotated about the center of `dest`.
    fn image(&mut self, image: &EmbeddedImage, dest: Rect, rotation_degrees: f32);
    /// Serialize the page.
    fn finish(self) -> Vec<u8>;
}

/// Counters for a single export walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub primitives: usize,
    pub images: usize,
    /// Sprites left out because fetching or encoding failed.
    pub omitted_images: usize,
}

pub struct DocumentExporter {
    fetcher: Rc<dyn ImageFetcher>,
}

impl DocumentExporter {
    pub fn new(fetcher: Rc<dyn ImageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Export onto an SVG page of `width x height`.
    pub async fn export_svg(&self, root: &SceneNode, width: u32, height: u32) -> Vec<u8> {
        let mut page = SvgPage::new(width, height);
        self.export_onto(root, &mut page).await;
        page.finish()
    }

    /// Emit every visible node of `root` onto `page`, in paint order.
    pub async fn export_onto<P: DocumentPage>(&self, root: &SceneNode, page: &mut P) -> ExportStats {
        let flat = flatten(root);

        // Fetch all sprites concurrently, then emit in paint order.
        let fetches = flat.iter().filter_map(|f| match f.leaf {
            Leaf::Sprite(sprite) => Some(self.embed(sprite.source.clone())),
            Leaf::Shape(_) => None,
        });
        let mut embedded = futures::future::join_all(fetches).await.into_iter();

        let mut stats = ExportStats::default();
        for f in &flat {
            match f.leaf {
                Leaf::Shape(shape) => stats.primitives += emit_shape(page, shape, &f.transform),
                Leaf::Sprite(_) => match embedded.next() {
                    Some(Ok(image)) => {
                        let (dest, _) = resolve_sprite(&f.transform, image.width, image.height);
                        page.image(&image, dest, f.transform.rotation);
                        stats.images += 1;
                    }
                    Some(Err(err)) => {
                        log::warn!("{err}");
                        stats.omitted_images += 1;
                    }
                    None => {}
                },
            }
        }

        log::debug!(
            "Exported {} primitives, {} images ({} omitted)",
            stats.primitives,
            stats.images,
            stats.omitted_images
        );
        stats
    }

    async fn embed(&self, source_id: String) -> Result<EmbeddedImage, ExportAssemblyError> {
        let bytes = self
            .fetcher
            .fetch(&source_id)
            .await
            .map_err(|e| ExportAssemblyError::new(&source_id, e))?;
        EmbeddedImage::from_bytes(&source_id, &bytes)
    }
}

/// Emit one shape, returning how many primitives were written.
fn emit_shape<P: DocumentPage>(page: &mut P, shape: &Shape, transform: &ComposedTransform) -> usize {
    let resolved = resolve(shape, transform);
    match resolved.geometry.rotate(&resolved.rotation) {
        OutputGeometry::Rect(rect) => match shape.fill {
            Some(fill) => {
                page.filled_rect(rect, fill);
                1
            }
            None => 0,
        },
        OutputGeometry::Polygon(corners) => match shape.fill {
            Some(fill) => {
                page.filled_polygon(&corners, fill);
                1
            }
            None => 0,
        },
        OutputGeometry::Circle { center, radius } => match shape.fill {
            Some(fill) => {
                page.filled_circle(center, radius, fill);
                1
            }
            None => 0,
        },
        OutputGeometry::Points(points) => match shape.stroke {
            Some(stroke) if points.len() >= 2 => {
                for pair in points.windows(2) {
                    page.line(pair[0], pair[1], &stroke);
                }
                points.len() - 1
            }
            _ => 0,
        },
    }
}
