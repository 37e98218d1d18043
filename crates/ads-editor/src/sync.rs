//! Canvas synchronizer: template ↔ canvas surface.
//!
//! The synchronizer is the only code allowed to mutate the surface. It
//! translates layer-model mutations into surface operations and captures
//! user manipulation (drag, resize, rotate) back into the model:
//!
//! - **Model → Canvas**: `materialize` rebuilds the whole surface from
//!   the template; `reconcile` pushes one layer's authoritative state
//!   onto its replica after a model-side mutation; `reorder` restacks
//!   live objects after the layer order changed.
//!
//! - **Canvas → Model**: `capture` writes an object's current geometry
//!   back into its owning layer when the host reports a change. Objects
//!   without an owning layer tag (derived contained images, clip masks)
//!   are ignored.
//!
//! The invariant maintained throughout: canvas paint order (bottom→top)
//! equals `reverse(template.layers)`, and the model is the single source
//! of truth — the surface is never read back except through `capture`.

use crate::autofit::{self, FitConfig};
use crate::clip::{self, Attached};
use ads_canvas::{
    CanvasSurface, ObjectId, ObjectPatch, ObjectSpec, ObjectState, SurfaceEvent, TextSpec,
    Viewport,
};
use ads_core::id::LayerId;
use ads_core::model::{ImageData, LayerKind, LayerTag, Placement, Template};
use ads_core::vars::VariableCatalog;
use std::collections::HashMap;

/// Read-only host inputs the synchronizer resolves layers against.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Text-variable catalog.
    pub variables: &'a VariableCatalog,
    /// Host image list that frame layers index into.
    pub photos: &'a [ImageData],
}

/// The two-state interactivity gate, re-evaluated on every pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interactivity {
    Locked,
    Interactive,
}

pub struct Synchronizer<S: CanvasSurface> {
    surface: S,
    /// Live canvas object per layer.
    objects: HashMap<LayerId, ObjectId>,
    /// Derived contained-image pair per populated frame layer.
    attached: HashMap<LayerId, Attached>,
    fit: FitConfig,
}

impl<S: CanvasSurface> Synchronizer<S> {
    /// Wrap a rendering capability. The surface is owned until
    /// `into_surface` hands it back at teardown.
    pub fn new(surface: S, fit: FitConfig) -> Self {
        Self {
            surface,
            objects: HashMap::new(),
            attached: HashMap::new(),
            fit,
        }
    }

    /// Tear down, returning the surface to the host.
    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Host-side access for forwarding the canvas library's own object
    /// mutations (drag frames). Core code never writes through this; the
    /// model learns about such changes via `capture`.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    pub fn object_for(&self, id: LayerId) -> Option<ObjectId> {
        self.objects.get(&id).copied()
    }

    pub fn attached_for(&self, id: LayerId) -> Option<Attached> {
        self.attached.get(&id).copied()
    }

    // ─── Model → Canvas ──────────────────────────────────────────────────

    /// Clear the surface and rebuild every object from the template,
    /// bottom to top. Text layers are auto-fitted as they appear and
    /// populated frames get their contained image attached; both write
    /// their derived values back into the template. Layers with missing
    /// image payloads are skipped without aborting the rest.
    pub fn materialize(&mut self, template: &mut Template, ctx: &Collaborators) {
        self.surface.clear();
        self.objects.clear();
        self.attached.clear();

        let ids: Vec<LayerId> = template.layers.iter().rev().map(|l| l.id).collect();
        for id in ids {
            self.spawn(template, id, ctx);
        }
    }

    /// Create the canvas object(s) for one layer, on top of the current
    /// stack. Used by `materialize` (bottom-up) and when a layer is added
    /// at index 0 (topmost).
    pub fn spawn(&mut self, template: &mut Template, id: LayerId, ctx: &Collaborators) {
        let Some(layer) = template.get(id) else {
            log::warn!("spawn for unknown layer {id} ignored");
            return;
        };
        let visible = layer.visible;
        let kind = layer.kind.clone();

        match kind {
            LayerKind::Design(d) => {
                let Some(image) = d.image else {
                    log::debug!("design layer {id} has no image yet, skipped");
                    return;
                };
                let vp = self.surface.viewport();
                let scale = clip::cover_scale(vp.width, vp.height, image.width, image.height);
                let obj = self.surface.create(ObjectState {
                    tag: Some(id),
                    placement: Placement {
                        scale_x: scale,
                        scale_y: scale,
                        ..Placement::default()
                    },
                    width: image.width,
                    height: image.height,
                    visible,
                    selectable: false,
                    ..ObjectState::new(ObjectSpec::Image { payload: image })
                });
                self.objects.insert(id, obj);
            }
            LayerKind::Picture(p) => {
                let Some(image) = p.image else {
                    log::debug!("picture layer {id} has no image yet, skipped");
                    return;
                };
                let obj = self.surface.create(ObjectState {
                    tag: Some(id),
                    placement: p.placement,
                    width: image.width,
                    height: image.height,
                    visible,
                    selectable: true,
                    ..ObjectState::new(ObjectSpec::Image { payload: image })
                });
                self.objects.insert(id, obj);
            }
            LayerKind::Frame(f) => {
                let obj = self.surface.create(ObjectState {
                    tag: Some(id),
                    placement: f.placement,
                    width: f.width,
                    height: f.height,
                    visible,
                    selectable: true,
                    ..ObjectState::new(ObjectSpec::Rect)
                });
                self.objects.insert(id, obj);
                if f.image_index.is_some() {
                    self.attach_frame_image(template, id, ctx);
                }
            }
            LayerKind::Text(t) => {
                let content = ctx
                    .variables
                    .display(t.variable.as_deref(), t.format.as_deref());
                let obj = self.surface.create(ObjectState {
                    tag: Some(id),
                    placement: t.placement,
                    width: t.fixed_width,
                    height: t.fixed_height,
                    visible,
                    selectable: true,
                    ..ObjectState::new(ObjectSpec::Text(TextSpec {
                        content,
                        font_family: t.font_family.unwrap_or_default(),
                        font_size: t.font_size,
                        bold: t.bold,
                        italic: t.italic,
                        underline: t.underline,
                        align: t.align,
                        color: t.color,
                    }))
                });
                self.objects.insert(id, obj);
                self.refit(template, id);
            }
        }
    }

    /// Remove a layer's object(s), including any derived pair.
    pub fn despawn(&mut self, id: LayerId) {
        if let Some(obj) = self.objects.remove(&id) {
            self.surface.remove(obj);
        }
        if let Some(attached) = self.attached.remove(&id) {
            clip::detach(&mut self.surface, attached);
        }
    }

    /// Push one layer's authoritative state onto its replica object(s).
    /// The explicit step every model-side mutation path ends with.
    pub fn reconcile(&mut self, template: &Template, id: LayerId) {
        let (Some(&obj), Some(layer)) = (self.objects.get(&id), template.get(id)) else {
            return;
        };

        let mut patch = match layer.kind.placement() {
            Some(p) => ObjectPatch::placed(*p),
            None => ObjectPatch::default(),
        };
        patch.visible = Some(layer.visible);

        match &layer.kind {
            LayerKind::Design(_) | LayerKind::Picture(_) => {}
            LayerKind::Frame(f) => {
                patch.width = Some(f.width);
                patch.height = Some(f.height);
            }
            LayerKind::Text(t) => {
                patch.width = Some(t.fixed_width);
                patch.height = Some(t.fixed_height);
                patch.font_family = t.font_family.clone();
                patch.bold = Some(t.bold);
                patch.italic = Some(t.italic);
                patch.underline = Some(t.underline);
                patch.align = Some(t.align);
                patch.color = Some(t.color);
            }
        }
        self.surface.apply(obj, patch);

        if let Some(attached) = self.attached.get(&id).copied() {
            clip::follow(&mut self.surface, obj, attached);
            self.surface.apply(
                attached.image,
                ObjectPatch {
                    visible: Some(layer.visible),
                    ..ObjectPatch::default()
                },
            );
        }
    }

    /// Restack live objects so paint order is `reverse(template.layers)`.
    /// Objects are moved, never recreated, so transforms and identity
    /// survive reordering; a frame and its derived pair travel together.
    pub fn reorder(&mut self, template: &Template) {
        let mut index = 0;
        for layer in template.layers.iter().rev() {
            let Some(&obj) = self.objects.get(&layer.id) else {
                continue;
            };
            self.surface.move_to(obj, index);
            index += 1;
            if let Some(attached) = self.attached.get(&layer.id) {
                self.surface.move_to(attached.image, index);
                index += 1;
                self.surface.move_to(attached.clip, index);
                index += 1;
            }
        }
    }

    /// Re-resolve a text layer's display string against the catalog,
    /// reconcile its styling, and re-run the fit search.
    pub fn refresh_text(&mut self, template: &mut Template, id: LayerId, ctx: &Collaborators) {
        let Some(&obj) = self.objects.get(&id) else {
            return;
        };
        let Some(LayerKind::Text(t)) = template.get(id).map(|l| &l.kind) else {
            log::warn!("refresh_text on non-text layer {id} ignored");
            return;
        };
        let content = ctx
            .variables
            .display(t.variable.as_deref(), t.format.as_deref());

        self.reconcile(template, id);
        self.surface.apply(
            obj,
            ObjectPatch {
                content: Some(content),
                ..ObjectPatch::default()
            },
        );
        self.refit(template, id);
    }

    /// Replace a frame's derived image after its `image_index` changed:
    /// the old pair is discarded entirely and, when the new selection
    /// resolves, a fresh pair is attached and stacked above the frame.
    pub fn refresh_frame(&mut self, template: &Template, id: LayerId, ctx: &Collaborators) {
        if let Some(attached) = self.attached.remove(&id) {
            clip::detach(&mut self.surface, attached);
        }
        // Template is not mutated here; the shared attach path only needs
        // the frame object and the payload.
        let Some(LayerKind::Frame(f)) = template.get(id).map(|l| &l.kind) else {
            log::warn!("refresh_frame on non-frame layer {id} ignored");
            return;
        };
        let Some(index) = f.image_index else {
            return;
        };
        let Some(&obj) = self.objects.get(&id) else {
            return;
        };
        let Some(payload) = ctx.photos.get(index) else {
            log::warn!("frame {id} references image {index}, out of range — left empty");
            return;
        };
        if let Some(attached) = clip::attach(&mut self.surface, obj, payload) {
            self.attached.insert(id, attached);
        }
        self.reorder(template);
    }

    /// Recreate a layer's object from scratch (payload changed) and
    /// restore its stacking position.
    pub fn respawn(&mut self, template: &mut Template, id: LayerId, ctx: &Collaborators) {
        self.despawn(id);
        self.spawn(template, id, ctx);
        self.reorder(template);
    }

    /// Propagate a visibility flip; a frame's derived image toggles with
    /// its container.
    pub fn set_visibility(&mut self, id: LayerId, visible: bool) {
        let Some(&obj) = self.objects.get(&id) else {
            return;
        };
        self.surface.apply(
            obj,
            ObjectPatch {
                visible: Some(visible),
                ..ObjectPatch::default()
            },
        );
        if let Some(attached) = self.attached.get(&id) {
            self.surface.apply(
                attached.image,
                ObjectPatch {
                    visible: Some(visible),
                    ..ObjectPatch::default()
                },
            );
        }
    }

    // ─── Canvas → Model ──────────────────────────────────────────────────

    /// Route a host-forwarded surface event.
    pub fn handle(&mut self, template: &mut Template, event: SurfaceEvent) {
        match event {
            SurfaceEvent::ObjectChanged(obj) => self.capture(template, obj),
            SurfaceEvent::PointerDown(obj) => {
                self.pointer_down(template, obj);
            }
        }
    }

    /// Write a manipulated object's geometry back into its owning layer.
    /// Untagged objects (derived images, clip masks) are ignored; the
    /// model stays authoritative for everything else.
    pub fn capture(&mut self, template: &mut Template, obj: ObjectId) {
        let Some(state) = self.surface.state(obj) else {
            log::debug!("change for unknown object {obj:?} ignored");
            return;
        };
        let Some(tag) = state.tag else {
            log::trace!("change for untagged object {obj:?} ignored");
            return;
        };
        let placement = state.placement;
        let (width, height) = (state.width, state.height);

        let Some(layer) = template.get_mut(tag) else {
            log::warn!("change for unknown layer {tag} ignored");
            return;
        };
        match &mut layer.kind {
            // The design layer is non-interactive; nothing to capture.
            LayerKind::Design(_) => {}
            LayerKind::Picture(p) => {
                p.placement = placement;
            }
            LayerKind::Frame(f) => {
                f.placement = placement;
                f.width = width;
                f.height = height;
                if let Some(attached) = self.attached.get(&tag).copied() {
                    clip::follow(&mut self.surface, obj, attached);
                }
            }
            LayerKind::Text(t) => {
                // A drag-resize arrives as a scale; it becomes the new
                // fixed box and the scale normalizes back to 1 before the
                // text is refitted.
                let fixed_width = width * placement.scale_x;
                let fixed_height = height * placement.scale_y;
                t.placement = Placement {
                    scale_x: 1.0,
                    scale_y: 1.0,
                    ..placement
                };
                t.fixed_width = fixed_width;
                t.fixed_height = fixed_height;
                self.surface.apply(
                    obj,
                    ObjectPatch {
                        scale_x: Some(1.0),
                        scale_y: Some(1.0),
                        width: Some(fixed_width),
                        height: Some(fixed_height),
                        ..ObjectPatch::default()
                    },
                );
                self.refit(template, tag);
            }
        }
    }

    /// Evaluate the interactivity gate for an object and stamp the result
    /// onto it. Pictures are always interactive; the design layer and
    /// derived objects never are; everything else is interactive only
    /// while stacked above the background design.
    pub fn pointer_down(&mut self, template: &Template, obj: ObjectId) -> Interactivity {
        let gate = self.gate_for(template, obj);
        self.surface.apply(
            obj,
            ObjectPatch {
                selectable: Some(gate == Interactivity::Interactive),
                ..ObjectPatch::default()
            },
        );
        gate
    }

    fn gate_for(&self, template: &Template, obj: ObjectId) -> Interactivity {
        let Some(state) = self.surface.state(obj) else {
            return Interactivity::Locked;
        };
        let Some(tag) = state.tag else {
            return Interactivity::Locked;
        };
        let Some(index) = template.position(tag) else {
            return Interactivity::Locked;
        };
        match template.layers[index].tag() {
            LayerTag::Picture => Interactivity::Interactive,
            LayerTag::Design => Interactivity::Locked,
            _ => match template.design_position() {
                // Stacked beneath the background: locked until raised.
                Some(design) if index > design => Interactivity::Locked,
                _ => Interactivity::Interactive,
            },
        }
    }

    // ─── Internal ────────────────────────────────────────────────────────

    /// Run the fit engine for a text layer and commit the derived font
    /// size into the model.
    fn refit(&mut self, template: &mut Template, id: LayerId) {
        let Some(&obj) = self.objects.get(&id) else {
            return;
        };
        let Some(LayerKind::Text(t)) = template.get(id).map(|l| &l.kind) else {
            return;
        };
        let (fixed_width, fixed_height, bold, align) =
            (t.fixed_width, t.fixed_height, t.bold, t.align);

        let Some(fit) = autofit::fit_text(
            &mut self.surface,
            obj,
            fixed_width,
            fixed_height,
            bold,
            align,
            &self.fit,
        ) else {
            return;
        };
        if let Some(LayerKind::Text(t)) = template.get_mut(id).map(|l| &mut l.kind) {
            t.font_size = fit.font_size;
        }
    }

    /// Attach a frame's selected host image, recording the derived pair.
    /// Out-of-range indices and missing payloads leave the frame empty.
    fn attach_frame_image(&mut self, template: &Template, id: LayerId, ctx: &Collaborators) {
        let Some(LayerKind::Frame(f)) = template.get(id).map(|l| &l.kind) else {
            return;
        };
        let Some(index) = f.image_index else {
            return;
        };
        let Some(&obj) = self.objects.get(&id) else {
            return;
        };
        let Some(payload) = ctx.photos.get(index) else {
            log::warn!("frame {id} references image {index}, out of range — left empty");
            return;
        };
        if let Some(attached) = clip::attach(&mut self.surface, obj, payload) {
            self.attached.insert(id, attached);
        }
    }

    /// Layer ids in canvas paint order (bottom → top), ignoring derived
    /// objects. Test and debugging aid for the z-order invariant.
    pub fn painted_layers(&self) -> Vec<LayerId> {
        self.surface
            .paint_order()
            .into_iter()
            .filter_map(|obj| self.surface.state(obj).and_then(|s| s.tag))
            .collect()
    }
}

/// Convenience check used across tests: the stacking invariant.
pub fn paint_order_matches<S: CanvasSurface>(sync: &Synchronizer<S>, template: &Template) -> bool {
    let painted = sync.painted_layers();
    let expected: Vec<LayerId> = template.layers.iter().rev().map(|l| l.id).collect();
    // Layers without a payload have no object yet; drop them from the
    // expectation before comparing.
    let expected: Vec<LayerId> = expected
        .into_iter()
        .filter(|id| sync.object_for(*id).is_some())
        .collect();
    painted == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use ads_canvas::MemSurface;
    use ads_core::model::{
        DesignProps, DesignSize, FrameProps, Layer, PictureProps, TextProps,
    };
    use pretty_assertions::assert_eq;

    fn catalog() -> VariableCatalog {
        let mut cat = VariableCatalog::new();
        cat.insert(
            "price",
            ads_core::vars::TextVariable {
                label: "Price".into(),
                value: "$ 24,900".into(),
                formatting: Default::default(),
            },
        );
        cat
    }

    fn photos() -> Vec<ImageData> {
        vec![ImageData::new("car_front.jpg", 640.0, 640.0)]
    }

    fn design_layer() -> Layer {
        Layer::new(
            LayerId::design(),
            "Design 1",
            LayerKind::Design(DesignProps {
                image: Some(ImageData::new("bg.png", 1000.0, 1000.0)),
            }),
        )
    }

    fn picture_layer(id: &str) -> Layer {
        Layer::new(
            LayerId::intern(id),
            "Picture 1",
            LayerKind::Picture(PictureProps {
                image: Some(ImageData::new("logo.png", 200.0, 80.0)),
                placement: Placement::at(40.0, 40.0),
            }),
        )
    }

    fn text_layer(id: &str) -> Layer {
        Layer::new(
            LayerId::intern(id),
            "Text 1",
            LayerKind::Text(TextProps {
                variable: Some("price".into()),
                font_family: Some("Inter".into()),
                ..TextProps::default()
            }),
        )
    }

    fn frame_layer(id: &str, image_index: Option<usize>) -> Layer {
        Layer::new(
            LayerId::intern(id),
            "Image 1",
            LayerKind::Frame(FrameProps {
                placement: Placement::at(100.0, 100.0),
                width: 300.0,
                height: 168.75,
                image_index,
            }),
        )
    }

    fn materialized(template: &mut Template) -> Synchronizer<MemSurface> {
        let mut sync = Synchronizer::new(
            MemSurface::new(Viewport::default()),
            FitConfig::default(),
        );
        let cat = catalog();
        let photos = photos();
        let ctx = Collaborators {
            variables: &cat,
            photos: &photos,
        };
        sync.materialize(template, &ctx);
        sync
    }

    #[test]
    fn materialize_paints_reverse_of_layers() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(design_layer());
        template.insert_top(frame_layer("frame", Some(0)));
        template.insert_top(text_layer("headline"));

        let sync = materialized(&mut template);
        assert_eq!(
            sync.painted_layers(),
            vec![
                LayerId::design(),
                LayerId::intern("frame"),
                LayerId::intern("headline"),
            ]
        );
        assert!(paint_order_matches(&sync, &template));
    }

    #[test]
    fn materialize_fits_text_into_model() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(text_layer("headline"));

        let sync = materialized(&mut template);
        let LayerKind::Text(t) = &template.layers[0].kind else {
            panic!("expected text layer");
        };
        assert!(t.font_size >= 8.0);

        // The canvas replica agrees with the model.
        let obj = sync.object_for(LayerId::intern("headline")).unwrap();
        let state = sync.surface().state(obj).unwrap();
        assert_eq!(state.text().unwrap().font_size, t.font_size);
        assert_eq!(state.text().unwrap().content, "$ 24,900");
    }

    #[test]
    fn materialize_tolerates_missing_payloads() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(Layer::new(
            LayerId::design(),
            "Design 1",
            LayerKind::Design(DesignProps { image: None }),
        ));
        template.insert_top(text_layer("headline"));

        let sync = materialized(&mut template);
        // Design has no object, the text layer still materialized.
        assert_eq!(sync.object_for(LayerId::design()), None);
        assert!(sync.object_for(LayerId::intern("headline")).is_some());
    }

    #[test]
    fn materialize_attaches_populated_frames() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(frame_layer("frame", Some(0)));

        let sync = materialized(&mut template);
        let attached = sync.attached_for(LayerId::intern("frame")).unwrap();
        let img = sync.surface().state(attached.image).unwrap();
        assert!(img.tag.is_none(), "derived image carries no layer tag");
        assert!(!img.selectable);
    }

    #[test]
    fn out_of_range_frame_index_is_noop() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(frame_layer("frame", Some(7)));

        let sync = materialized(&mut template);
        assert!(sync.object_for(LayerId::intern("frame")).is_some());
        assert_eq!(sync.attached_for(LayerId::intern("frame")), None);
    }

    #[test]
    fn capture_writes_geometry_back() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(picture_layer("logo"));
        let mut sync = materialized(&mut template);

        let obj = sync.object_for(LayerId::intern("logo")).unwrap();
        // Simulate the host's canvas reporting a drag + rotate.
        sync.surface.apply(
            obj,
            ObjectPatch {
                left: Some(222.0),
                top: Some(111.0),
                angle: Some(45.0),
                ..ObjectPatch::default()
            },
        );
        sync.handle(&mut template, SurfaceEvent::ObjectChanged(obj));

        let LayerKind::Picture(p) = &template.layers[0].kind else {
            panic!("expected picture layer");
        };
        assert_eq!(p.placement.left, 222.0);
        assert_eq!(p.placement.top, 111.0);
        assert_eq!(p.placement.angle, 45.0);
    }

    #[test]
    fn capture_of_text_resize_normalizes_scale_and_refits() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(text_layer("headline"));
        let mut sync = materialized(&mut template);

        let obj = sync.object_for(LayerId::intern("headline")).unwrap();
        sync.surface.apply(
            obj,
            ObjectPatch {
                scale_x: Some(1.5),
                scale_y: Some(2.0),
                ..ObjectPatch::default()
            },
        );
        sync.capture(&mut template, obj);

        let LayerKind::Text(t) = &template.layers[0].kind else {
            panic!("expected text layer");
        };
        assert_eq!(t.fixed_width, 450.0);
        assert_eq!(t.fixed_height, 200.0);
        assert_eq!(t.placement.scale_x, 1.0);
        assert_eq!(t.placement.scale_y, 1.0);

        let state = sync.surface().state(obj).unwrap();
        assert_eq!(state.width, 450.0);
        assert_eq!(state.text().unwrap().font_size, t.font_size);
    }

    #[test]
    fn capture_ignores_derived_objects() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(frame_layer("frame", Some(0)));
        let mut sync = materialized(&mut template);
        let before = template.clone();

        let attached = sync.attached_for(LayerId::intern("frame")).unwrap();
        sync.capture(&mut template, attached.image);
        assert_eq!(template, before);
    }

    #[test]
    fn capture_of_frame_re_derives_contained_image() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(frame_layer("frame", Some(0)));
        let mut sync = materialized(&mut template);

        let obj = sync.object_for(LayerId::intern("frame")).unwrap();
        sync.surface.apply(
            obj,
            ObjectPatch {
                scale_x: Some(2.0),
                scale_y: Some(2.0),
                ..ObjectPatch::default()
            },
        );
        sync.capture(&mut template, obj);

        let attached = sync.attached_for(LayerId::intern("frame")).unwrap();
        let img = sync.surface().state(attached.image).unwrap();
        // New effective box 600 × 337.5 against the square 640 payload.
        let expected = clip::cover_scale(600.0, 337.5, 640.0, 640.0);
        assert!((img.placement.scale_x - expected).abs() < 1e-9);
    }

    #[test]
    fn reorder_preserves_object_identity() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(design_layer());
        template.insert_top(frame_layer("frame", Some(0)));
        template.insert_top(text_layer("headline"));
        let mut sync = materialized(&mut template);

        let frame_obj = sync.object_for(LayerId::intern("frame")).unwrap();
        template.relocate(1, 0); // frame above headline
        sync.reorder(&template);

        assert!(paint_order_matches(&sync, &template));
        assert_eq!(sync.object_for(LayerId::intern("frame")), Some(frame_obj));
    }

    #[test]
    fn gate_pictures_always_interactive() {
        let mut template = Template::new(DesignSize::Square);
        // Picture stacked beneath the design layer still stays live.
        template.insert_top(picture_layer("logo"));
        template.insert_top(design_layer());
        let mut sync = materialized(&mut template);

        let logo = sync.object_for(LayerId::intern("logo")).unwrap();
        assert_eq!(
            sync.pointer_down(&template, logo),
            Interactivity::Interactive
        );

        let design = sync.object_for(LayerId::design()).unwrap();
        assert_eq!(sync.pointer_down(&template, design), Interactivity::Locked);
    }

    #[test]
    fn gate_locks_layers_beneath_the_design() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(text_layer("headline"));
        template.insert_top(design_layer());
        let mut sync = materialized(&mut template);

        let headline = sync.object_for(LayerId::intern("headline")).unwrap();
        assert_eq!(sync.pointer_down(&template, headline), Interactivity::Locked);

        // Raising the text above the design unlocks it — the gate is
        // re-evaluated per pointer-down, never cached.
        template.relocate(1, 0);
        sync.reorder(&template);
        assert_eq!(
            sync.pointer_down(&template, headline),
            Interactivity::Interactive
        );
    }

    #[test]
    fn gate_on_derived_image_is_locked() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(frame_layer("frame", Some(0)));
        let mut sync = materialized(&mut template);

        let attached = sync.attached_for(LayerId::intern("frame")).unwrap();
        assert_eq!(
            sync.pointer_down(&template, attached.image),
            Interactivity::Locked
        );
    }

    #[test]
    fn set_visibility_toggles_pair_together() {
        let mut template = Template::new(DesignSize::Square);
        template.insert_top(frame_layer("frame", Some(0)));
        let mut sync = materialized(&mut template);

        sync.set_visibility(LayerId::intern("frame"), false);

        let obj = sync.object_for(LayerId::intern("frame")).unwrap();
        let attached = sync.attached_for(LayerId::intern("frame")).unwrap();
        assert!(!sync.surface().state(obj).unwrap().visible);
        assert!(!sync.surface().state(attached.image).unwrap().visible);
    }
}
