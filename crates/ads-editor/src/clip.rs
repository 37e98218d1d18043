//! Container/image clip tracking.
//!
//! An image-container frame is a placeholder rectangle; when the host's
//! image list populates it, a derived image object is placed inside it
//! and clipped to the frame's outline. The derived image and its clip
//! mask carry no owning layer tag — they follow the container and are
//! destroyed and recreated whenever the selection changes.
//!
//! The fill rule is a uniform scale chosen per aspect comparison: the
//! wider-than-the-image container fills by height, otherwise by width,
//! and the remainder is cropped by the clip mask.

use ads_canvas::{CanvasSurface, ObjectId, ObjectPatch, ObjectSpec, ObjectState};
use ads_core::model::{ImageData, Placement};

/// Uniform fill scale for an `image_w × image_h` payload inside a
/// `container_w × container_h` box.
pub fn cover_scale(container_w: f64, container_h: f64, image_w: f64, image_h: f64) -> f64 {
    let container_aspect = container_w / container_h;
    let image_aspect = image_w / image_h;
    if container_aspect > image_aspect {
        container_h / image_h
    } else {
        container_w / image_w
    }
}

/// The derived pair following a populated container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attached {
    pub image: ObjectId,
    pub clip: ObjectId,
}

/// Place `payload` inside the container: build a clip mask matching the
/// container's current transform, position the image at the container's
/// anchor with the cover-fit scale, and return the derived pair.
///
/// Returns `None` when the container object is unknown.
pub fn attach<S: CanvasSurface>(
    surface: &mut S,
    container: ObjectId,
    payload: &ImageData,
) -> Option<Attached> {
    let c = surface.state(container)?.clone();

    let effective_w = c.width * c.placement.scale_x;
    let effective_h = c.height * c.placement.scale_y;
    let scale = cover_scale(effective_w, effective_h, payload.width, payload.height);

    let clip = surface.create(ObjectState {
        placement: c.placement,
        width: c.width,
        height: c.height,
        visible: false,
        ..ObjectState::new(ObjectSpec::ClipMask)
    });

    let image = surface.create(ObjectState {
        placement: Placement {
            left: c.placement.left,
            top: c.placement.top,
            scale_x: scale,
            scale_y: scale,
            angle: c.placement.angle,
        },
        width: payload.width,
        height: payload.height,
        visible: c.visible,
        selectable: false,
        clip: Some(clip),
        ..ObjectState::new(ObjectSpec::Image {
            payload: payload.clone(),
        })
    });

    Some(Attached { image, clip })
}

/// Re-derive the pair's geometry from the container's current transform.
///
/// Covers all three container reactions — translate, scale, rotate — by
/// recomputing everything from scratch, which also makes the update
/// idempotent. Never writes back into the container.
pub fn follow<S: CanvasSurface>(surface: &mut S, container: ObjectId, attached: Attached) {
    let Some(c) = surface.state(container).cloned() else {
        log::debug!("follow of unknown container {container:?} ignored");
        return;
    };
    let Some(img) = surface.state(attached.image) else {
        log::debug!("follow with missing derived image ignored");
        return;
    };
    let (image_w, image_h) = (img.width, img.height);

    let effective_w = c.width * c.placement.scale_x;
    let effective_h = c.height * c.placement.scale_y;
    let scale = cover_scale(effective_w, effective_h, image_w, image_h);

    surface.apply(
        attached.image,
        ObjectPatch {
            left: Some(c.placement.left),
            top: Some(c.placement.top),
            scale_x: Some(scale),
            scale_y: Some(scale),
            angle: Some(c.placement.angle),
            ..ObjectPatch::default()
        },
    );
    surface.apply(
        attached.clip,
        ObjectPatch {
            left: Some(c.placement.left),
            top: Some(c.placement.top),
            scale_x: Some(c.placement.scale_x),
            scale_y: Some(c.placement.scale_y),
            angle: Some(c.placement.angle),
            width: Some(c.width),
            height: Some(c.height),
            ..ObjectPatch::default()
        },
    );
}

/// Discard the derived pair entirely.
pub fn detach<S: CanvasSurface>(surface: &mut S, attached: Attached) {
    surface.remove(attached.image);
    surface.remove(attached.clip);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ads_canvas::{MemSurface, Viewport};
    use pretty_assertions::assert_eq;

    fn frame(surface: &mut MemSurface, width: f64, height: f64) -> ObjectId {
        surface.create(ObjectState {
            width,
            height,
            selectable: true,
            ..ObjectState::new(ObjectSpec::Rect)
        })
    }

    #[test]
    fn wide_container_square_image_fills_by_height() {
        // A 16:9 container on a 1000-wide canvas: 300 × 168.75. A square
        // image is relatively taller, so the height branch wins.
        let mut surface = MemSurface::new(Viewport::default());
        let container = frame(&mut surface, 300.0, 168.75);
        let payload = ImageData::new("car.jpg", 640.0, 640.0);

        let attached = attach(&mut surface, container, &payload).unwrap();
        let img = surface.state(attached.image).unwrap();

        let expected = 168.75 / 640.0;
        assert!((img.placement.scale_x - expected).abs() < 1e-9);
        assert_eq!(img.placement.scale_x, img.placement.scale_y, "scale is uniform");
    }

    #[test]
    fn tall_container_wide_image_fills_by_width() {
        let mut surface = MemSurface::new(Viewport::default());
        let container = frame(&mut surface, 168.75, 300.0);
        let payload = ImageData::new("car.jpg", 1280.0, 720.0);

        let attached = attach(&mut surface, container, &payload).unwrap();
        let img = surface.state(attached.image).unwrap();

        let expected = 168.75 / 1280.0;
        assert!((img.placement.scale_x - expected).abs() < 1e-9);
    }

    #[test]
    fn filled_axis_matches_container_and_anchor_aligns() {
        let mut surface = MemSurface::new(Viewport::default());
        let container = frame(&mut surface, 300.0, 168.75);
        surface.apply(
            container,
            ObjectPatch {
                left: Some(120.0),
                top: Some(64.0),
                ..ObjectPatch::default()
            },
        );
        let payload = ImageData::new("car.jpg", 500.0, 500.0);

        let attached = attach(&mut surface, container, &payload).unwrap();
        let img = surface.state(attached.image).unwrap();

        // Height branch: scaled image height equals container height.
        let scaled_h = img.height * img.placement.scale_y;
        assert!((scaled_h - 168.75).abs() < 1e-9, "no gap on the filled axis");
        // Anchor alignment: left/top match the container.
        assert_eq!(img.placement.left, 120.0);
        assert_eq!(img.placement.top, 64.0);
    }

    #[test]
    fn clip_mask_tracks_container_transform() {
        let mut surface = MemSurface::new(Viewport::default());
        let container = frame(&mut surface, 300.0, 168.75);
        let payload = ImageData::new("car.jpg", 640.0, 480.0);
        let attached = attach(&mut surface, container, &payload).unwrap();

        surface.apply(
            container,
            ObjectPatch {
                left: Some(50.0),
                top: Some(75.0),
                scale_x: Some(2.0),
                scale_y: Some(2.0),
                angle: Some(30.0),
                ..ObjectPatch::default()
            },
        );
        follow(&mut surface, container, attached);

        let clip = surface.state(attached.clip).unwrap();
        assert_eq!(clip.placement.left, 50.0);
        assert_eq!(clip.placement.top, 75.0);
        assert_eq!(clip.placement.scale_x, 2.0);
        assert_eq!(clip.placement.angle, 30.0);

        // Doubling the container re-derives the fill scale from the new
        // effective 600 × 337.5 box.
        let img = surface.state(attached.image).unwrap();
        let expected = cover_scale(600.0, 337.5, 640.0, 480.0);
        assert!((img.placement.scale_x - expected).abs() < 1e-9);
        assert_eq!(img.placement.angle, 30.0);
    }

    #[test]
    fn follow_is_idempotent() {
        let mut surface = MemSurface::new(Viewport::default());
        let container = frame(&mut surface, 300.0, 168.75);
        let payload = ImageData::new("car.jpg", 640.0, 480.0);
        let attached = attach(&mut surface, container, &payload).unwrap();

        surface.apply(
            container,
            ObjectPatch {
                left: Some(10.0),
                angle: Some(15.0),
                ..ObjectPatch::default()
            },
        );
        follow(&mut surface, container, attached);
        let once = surface.state(attached.image).unwrap().clone();
        follow(&mut surface, container, attached);
        let twice = surface.state(attached.image).unwrap().clone();
        assert_eq!(once, twice);

        // The container itself is untouched by following.
        let c = surface.state(container).unwrap();
        assert_eq!(c.placement.left, 10.0);
        assert_eq!(c.placement.scale_x, 1.0);
    }

    #[test]
    fn detach_removes_both_derived_objects() {
        let mut surface = MemSurface::new(Viewport::default());
        let container = frame(&mut surface, 300.0, 168.75);
        let payload = ImageData::new("car.jpg", 640.0, 480.0);
        let attached = attach(&mut surface, container, &payload).unwrap();
        assert_eq!(surface.len(), 3);

        detach(&mut surface, attached);
        assert_eq!(surface.len(), 1);
        assert!(surface.state(container).is_some());
    }
}
