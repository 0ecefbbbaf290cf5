//! Image loading and caching for sprites.
//!
//! Loads are keyed by source identifier. Concurrent requests for a source
//! that is still loading share the same in-flight future, so the fetcher runs
//! once per source. Successful loads stay cached until [`ImageCache::clear`];
//! failures are dropped so the next reference retries.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;
use image::RgbaImage;

use crate::error::ImageLoadError;
use crate::fetch::ImageFetcher;

/// A decoded bitmap, shared between the cache and the painter.
pub struct ImageResource {
    source_id: String,
    /// Straight (non-premultiplied) RGBA8 pixels.
    pixels: RgbaImage,
}

impl ImageResource {
    /// Decode raster (PNG, JPEG, GIF, WebP) or SVG bytes.
    pub fn decode(source_id: &str, bytes: &[u8]) -> Result<Self, ImageLoadError> {
        let pixels = if looks_like_svg(bytes) {
            rasterize_svg(bytes).map_err(|reason| ImageLoadError::new(source_id, reason))?
        } else {
            image::load_from_memory(bytes)
                .map_err(|e| ImageLoadError::new(source_id, e))?
                .to_rgba8()
        };

        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ImageLoadError::new(source_id, "image has no pixels"));
        }

        Ok(Self {
            source_id: source_id.to_string(),
            pixels,
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl fmt::Debug for ImageResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResource")
            .field("source_id", &self.source_id)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Whether the bytes look like an SVG document rather than a raster image.
pub(crate) fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Rasterize an SVG at its intrinsic size.
fn rasterize_svg(bytes: &[u8]) -> Result<RgbaImage, String> {
    let tree = resvg::usvg::Tree::from_data(bytes, &resvg::usvg::Options::default())
        .map_err(|e| e.to_string())?;
    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| format!("invalid SVG size {width}x{height}"))?;
    resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(width, height, data).ok_or_else(|| "pixel buffer size mismatch".into())
}

pub type LoadResult = Result<Rc<ImageResource>, ImageLoadError>;

/// A pending or completed load; clones resolve to the same result.
pub type ImageRequest = Shared<LocalBoxFuture<'static, LoadResult>>;

enum Slot {
    /// In flight. `generation` identifies the load that owns the slot.
    Loading {
        request: ImageRequest,
        generation: u64,
    },
    Ready(Rc<ImageResource>),
}

type Entries = RefCell<HashMap<String, Slot>>;

/// Load-once, cache-forever store of decoded images.
pub struct ImageCache {
    entries: Rc<Entries>,
    fetcher: Rc<dyn ImageFetcher>,
    next_generation: Cell<u64>,
}

impl ImageCache {
    pub fn new(fetcher: Rc<dyn ImageFetcher>) -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
            fetcher,
            next_generation: Cell::new(0),
        }
    }

    /// Get a cached image or start loading it.
    ///
    /// The request is registered before this returns, so a second call for
    /// the same source made before the first is awaited joins the same load.
    pub fn get_or_load(&self, source_id: &str) -> ImageRequest {
        let mut entries = self.entries.borrow_mut();
        match entries.get(source_id) {
            Some(Slot::Ready(resource)) => {
                let resource: LoadResult = Ok(Rc::clone(resource));
                return futures::future::ready(resource).boxed_local().shared();
            }
            Some(Slot::Loading { request, .. }) => return request.clone(),
            None => {}
        }

        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);

        log::debug!("Loading image {source_id}");
        let request = load(
            source_id.to_string(),
            generation,
            self.fetcher.fetch(source_id),
            Rc::downgrade(&self.entries),
        )
        .boxed_local()
        .shared();
        entries.insert(
            source_id.to_string(),
            Slot::Loading {
                request: request.clone(),
                generation,
            },
        );
        request
    }

    /// The decoded image if it has finished loading.
    pub fn get(&self, source_id: &str) -> Option<Rc<ImageResource>> {
        match self.entries.borrow().get(source_id) {
            Some(Slot::Ready(resource)) => Some(Rc::clone(resource)),
            _ => None,
        }
    }

    pub fn is_cached(&self, source_id: &str) -> bool {
        self.get(source_id).is_some()
    }

    /// Number of loads still in flight.
    pub fn in_flight(&self) -> usize {
        self.entries
            .borrow()
            .values()
            .filter(|slot| matches!(slot, Slot::Loading { .. }))
            .count()
    }

    /// Number of decoded images held.
    pub fn len(&self) -> usize {
        self.entries.borrow().len() - self.in_flight()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every cached image. In-flight loads still complete for their
    /// waiters but are not re-inserted.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

async fn load(
    source_id: String,
    generation: u64,
    fetch: LocalBoxFuture<'static, Result<Vec<u8>, crate::error::FetchError>>,
    entries: Weak<Entries>,
) -> LoadResult {
    let result = match fetch.await {
        Ok(bytes) => ImageResource::decode(&source_id, &bytes).map(Rc::new),
        Err(err) => Err(ImageLoadError::new(&source_id, err)),
    };
    if let Err(err) = &result {
        log::warn!("{err}");
    }

    let Some(entries) = entries.upgrade() else {
        return result;
    };
    let mut entries = entries.borrow_mut();
    // Only settle the slot this load registered. After `clear` the key may
    // belong to a newer load.
    let owned = matches!(
        entries.get(&source_id),
        Some(Slot::Loading { generation: g, .. }) if *g == generation
    );
    if owned {
        match &result {
            Ok(resource) => {
                entries.insert(source_id, Slot::Ready(Rc::clone(resource)));
            }
            Err(_) => {
                entries.remove(&source_id);
            }
        }
    }
    result
}
