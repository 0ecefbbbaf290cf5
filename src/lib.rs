pub mod document;
pub mod error;
pub mod fetch;
pub mod geometry;
pub mod hit_test;
pub mod image_cache;
pub mod renderer;
pub mod scene;
pub mod transform;

use std::cell::{Ref, RefCell};
use std::io::Cursor;
use std::rc::Rc;

use image::RgbaImage;
use resvg::tiny_skia::Pixmap;

use document::DocumentExporter;
use error::SurfaceInitError;
use fetch::{FsFetcher, ImageFetcher};
use image_cache::ImageCache;
use renderer::{PaintStats, RasterPainter};
use scene::{Color, NodeId, PointerEvent, PointerEventKind, SceneNode};

pub mod prelude {
    pub use crate::document::{DocumentExporter, DocumentPage, PageOrientation, SvgPage};
    pub use crate::error::{ExportAssemblyError, FetchError, ImageLoadError, SurfaceInitError};
    pub use crate::fetch::{FsFetcher, ImageFetcher};
    pub use crate::image_cache::ImageCache;
    pub use crate::renderer::PaintStats;
    pub use crate::scene::{
        Color, NodeId, NodeKind, Point, PointerEvent, PointerEventKind, Rect, SceneNode, Shape,
        Sprite, Stroke,
    };
    pub use crate::transform::LocalTransform;
    pub use crate::{Engine, EngineBuilder, EngineConfig};
}

/// Surface size (also the document page size) and clear color.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background_color: Color::WHITE,
        }
    }
}

pub struct EngineBuilder {
    config: EngineConfig,
    fetcher: Option<Rc<dyn ImageFetcher>>,
}

impl EngineBuilder {
    pub fn width(mut self, width: u32) -> Self {
        self.config.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.config.height = height;
        self
    }

    pub fn background_color(mut self, color: Color) -> Self {
        self.config.background_color = color;
        self
    }

    /// Byte source for sprite images. Defaults to [`FsFetcher`].
    pub fn fetcher(mut self, fetcher: impl ImageFetcher + 'static) -> Self {
        self.fetcher = Some(Rc::new(fetcher));
        self
    }

    pub fn build(self) -> Result<Engine, SurfaceInitError> {
        let fetcher = self.fetcher.unwrap_or_else(|| Rc::new(FsFetcher::new()));
        Engine::with_fetcher(self.config, fetcher)
    }
}

/// Owns the raster surface, the image cache and the last rendered scene.
///
/// Every output path (painting, export, pointer dispatch) reads the same
/// scene through the same fetcher.
pub struct Engine {
    config: EngineConfig,
    cache: ImageCache,
    painter: RasterPainter,
    exporter: DocumentExporter,
    root: RefCell<Option<Rc<SceneNode>>>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder {
            config: EngineConfig::default(),
            fetcher: None,
        }
    }

    pub fn new(config: EngineConfig) -> Result<Self, SurfaceInitError> {
        Self::with_fetcher(config, Rc::new(FsFetcher::new()))
    }

    pub fn with_fetcher(
        config: EngineConfig,
        fetcher: Rc<dyn ImageFetcher>,
    ) -> Result<Self, SurfaceInitError> {
        let painter = RasterPainter::new(config.width, config.height, config.background_color)?;
        log::info!("Created {}x{} engine", config.width, config.height);
        Ok(Self {
            cache: ImageCache::new(Rc::clone(&fetcher)),
            exporter: DocumentExporter::new(fetcher),
            painter,
            root: RefCell::new(None),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn image_cache(&self) -> &ImageCache {
        &self.cache
    }

    /// The scene passed to the most recent [`Engine::render`].
    pub fn root(&self) -> Option<Rc<SceneNode>> {
        self.root.borrow().clone()
    }

    /// Repaint `root` and present it once every sprite it references has
    /// loaded or failed.
    pub async fn render(&self, root: impl Into<Rc<SceneNode>>) -> PaintStats {
        let root = root.into();
        *self.root.borrow_mut() = Some(Rc::clone(&root));
        self.painter.paint(&root, &self.cache).await
    }

    pub fn render_blocking(&self, root: impl Into<Rc<SceneNode>>) -> PaintStats {
        pollster::block_on(self.render(root))
    }

    /// Serialize the last rendered scene into an SVG document of the
    /// surface's size. An empty page is produced if nothing was rendered.
    pub async fn export_document(&self) -> Vec<u8> {
        let (width, height) = (self.config.width, self.config.height);
        match self.root() {
            Some(root) => self.exporter.export_svg(&root, width, height).await,
            None => self
                .exporter
                .export_svg(&SceneNode::container([]), width, height)
                .await,
        }
    }

    pub fn export_document_blocking(&self) -> Vec<u8> {
        pollster::block_on(self.export_document())
    }

    pub fn on_pointer_down(&self, x: f32, y: f32) -> Option<NodeId> {
        self.dispatch(PointerEventKind::Down, x, y)
    }

    pub fn on_pointer_up(&self, x: f32, y: f32) -> Option<NodeId> {
        self.dispatch(PointerEventKind::Up, x, y)
    }

    /// Hit test the last rendered scene and emit to the matched node.
    fn dispatch(&self, kind: PointerEventKind, x: f32, y: f32) -> Option<NodeId> {
        let root = self.root()?;
        let target = hit_test::hit_test(x, y, root.children(), &self.cache)?;
        let event = PointerEvent {
            kind,
            target: target.id(),
            x,
            y,
        };
        let handled = target.emit(&event);
        log::trace!("{kind:?} at ({x}, {y}) hit {:?}, {handled} handlers", event.target);
        Some(event.target)
    }

    /// The last presented frame.
    pub fn surface(&self) -> Ref<'_, Pixmap> {
        self.painter.surface()
    }

    pub fn snapshot_rgba(&self) -> RgbaImage {
        self.painter.snapshot_rgba()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut out = Cursor::new(Vec::new());
        self.snapshot_rgba()
            .write_to(&mut out, image::ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Release cached images, the surface and the retained scene.
    pub fn dispose(self) {
        let images = self.cache.len();
        self.cache.clear();
        self.root.borrow_mut().take();
        log::info!("Disposed engine, released {images} cached images");
    }
}
