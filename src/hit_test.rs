//! Pointer hit testing over the root's direct children.
//!
//! Each candidate is resolved with its own position and scale only
//! ([`ComposedTransform::from_local`]); ancestor transforms are not applied.
//! Children are tested last to first, so the topmost-drawn node wins.

use crate::geometry::{resolve, resolve_sprite, OutputGeometry};
use crate::image_cache::ImageCache;
use crate::scene::{NodeKind, Point, SceneNode, Shape};
use crate::transform::ComposedTransform;

/// Find the topmost child of the root containing `(x, y)`.
///
/// Sprites only match once their image is cached, since their extent
/// depends on the intrinsic size. Containers never match.
pub fn hit_test<'a>(
    x: f32,
    y: f32,
    children: &'a [SceneNode],
    cache: &ImageCache,
) -> Option<&'a SceneNode> {
    children.iter().rev().find(|node| {
        let transform = ComposedTransform::from_local(&node.transform);
        match &node.kind {
            NodeKind::Shape(shape) => shape_contains(shape, &transform, x, y),
            NodeKind::Sprite(sprite) => cache.get(&sprite.source).is_some_and(|image| {
                let (dest, rotation) = resolve_sprite(&transform, image.width(), image.height());
                let (lx, ly) = rotation.inverse().apply(x, y);
                dest.contains(lx, ly)
            }),
            NodeKind::Container(_) => false,
        }
    })
}

fn shape_contains(shape: &Shape, transform: &ComposedTransform, x: f32, y: f32) -> bool {
    if !shape.is_visible() {
        return false;
    }
    let resolved = resolve(shape, transform);
    if !resolved.rotated_bounds().contains(x, y) {
        return false;
    }

    let (lx, ly) = resolved.rotation.inverse().apply(x, y);
    match &resolved.geometry {
        OutputGeometry::Rect(rect) => rect.contains(lx, ly),
        OutputGeometry::Circle { center, radius } => {
            center.distance(Point::new(lx, ly)) <= *radius
        }
        // Bounds are a good enough approximation for thin lines.
        OutputGeometry::Points(_) | OutputGeometry::Polygon(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::image_cache::tests::{png_bytes, CountingFetcher};
    use crate::scene::{Color, Sprite, Stroke};

    fn empty_cache() -> ImageCache {
        ImageCache::new(Rc::new(CountingFetcher::default()))
    }

    fn hit(children: &[SceneNode], x: f32, y: f32) -> Option<usize> {
        let cache = empty_cache();
        let found = hit_test(x, y, children, &cache)?;
        children.iter().position(|c| c.id() == found.id())
    }

    #[test]
    fn test_rect_uses_own_scale() {
        let children = [SceneNode::shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0).fill(Color::RED))
            .with_position(100.0, 100.0)
            .with_scale(2.0, 3.0)];
        assert_eq!(hit(&children, 119.0, 129.0), Some(0));
        assert_eq!(hit(&children, 121.0, 110.0), None);
        assert_eq!(hit(&children, 110.0, 131.0), None);
    }

    #[test]
    fn test_circle_distance() {
        let children = [SceneNode::shape(Shape::circle(0.0, 0.0, 10.0).fill(Color::RED))
            .with_position(50.0, 50.0)
            .with_scale(2.0, 1.0)];
        assert_eq!(hit(&children, 65.0, 60.0), Some(0));
        // Inside the bounding box but outside the disc.
        assert_eq!(hit(&children, 68.0, 68.0), None);
    }

    #[test]
    fn test_rotated_rect() {
        let children = [SceneNode::shape(Shape::rectangle(0.0, 0.0, 80.0, 40.0).fill(Color::BLUE))
            .with_position(200.0, 50.0)
            .with_rotation(90.0)];
        assert_eq!(hit(&children, 240.0, 70.0), Some(0));
        // Inside the unrotated rect, outside the rotated one.
        assert_eq!(hit(&children, 205.0, 70.0), None);
        // Outside the unrotated rect, inside the rotated one.
        assert_eq!(hit(&children, 240.0, 105.0), Some(0));
    }

    #[test]
    fn test_topmost_wins() {
        let children = [
            SceneNode::shape(Shape::rectangle(0.0, 0.0, 50.0, 50.0).fill(Color::RED)),
            SceneNode::shape(Shape::rectangle(25.0, 25.0, 50.0, 50.0).fill(Color::GREEN)),
        ];
        assert_eq!(hit(&children, 30.0, 30.0), Some(1));
        assert_eq!(hit(&children, 10.0, 10.0), Some(0));
        assert_eq!(hit(&children, 90.0, 90.0), None);
    }

    #[test]
    fn test_polyline_matches_bounds() {
        let stroke = Stroke::new(Color::BLACK, 1.0);
        let children = [SceneNode::shape(Shape::polyline([(0.0, 0.0), (20.0, 20.0)], stroke))];
        assert_eq!(hit(&children, 18.0, 2.0), Some(0));
        assert_eq!(hit(&children, 21.0, 2.0), None);
    }

    #[test]
    fn test_containers_and_ancestors_are_ignored() {
        let children = [SceneNode::container([SceneNode::shape(
            Shape::rectangle(0.0, 0.0, 10.0, 10.0).fill(Color::RED),
        )])
        .with_position(100.0, 100.0)];
        assert_eq!(hit(&children, 5.0, 5.0), None);
        assert_eq!(hit(&children, 105.0, 105.0), None);
    }

    #[test]
    fn test_sprite_hit_once_cached() {
        let fetcher = CountingFetcher::default().with("a.png", png_bytes(10, 5, [0, 0, 0, 255]));
        let cache = ImageCache::new(Rc::new(fetcher));
        let children = [SceneNode::sprite(Sprite::new("a.png"))
            .with_position(10.0, 10.0)
            .with_scale(2.0, 2.0)];

        assert!(hit_test(15.0, 15.0, &children, &cache).is_none());
        pollster::block_on(cache.get_or_load("a.png")).unwrap();
        assert!(hit_test(29.0, 19.0, &children, &cache).is_some());
        assert!(hit_test(31.0, 15.0, &children, &cache).is_none());
    }
}
