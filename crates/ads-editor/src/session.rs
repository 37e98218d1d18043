//! The design session: authoritative template + canvas synchronizer.
//!
//! A session owns the template (the persisted state) and, once the host
//! hands over a rendering capability, a synchronizer driving it. Every
//! public operation is a silent no-op when the canvas is not attached or
//! when an id is unknown — `validate` is the only error-reporting
//! surface and it never fails hard.
//!
//! Asynchronous host work (image decode, font discovery) resumes by
//! calling back into the session; since the surface may have been torn
//! down in the meantime, every entry point re-checks `self.sync` instead
//! of assuming a canvas exists.

use crate::autofit::FitConfig;
use crate::sync::{Collaborators, Synchronizer};
use ads_canvas::{CanvasSurface, SurfaceEvent};
use ads_core::fonts::FontInventory;
use ads_core::id::LayerId;
use ads_core::model::{
    Color, DesignProps, DesignSize, FrameProps, ImageData, Layer, LayerKind, LayerTag,
    PictureProps, Placement, Ratio, Template, TextAlign, TextProps,
};
use ads_core::store::TemplateStore;
use ads_core::validate::{
    self, DEFAULT_RATIO_TOLERANCE, ValidationMessage, validate_template,
};
use ads_core::vars::VariableCatalog;
use serde::{Deserialize, Serialize};

/// Default geometry handed to newly added layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// New frame width as a fraction of the canvas width.
    pub frame_fraction: f64,
    /// Fixed box of a new text layer.
    pub text_width: f64,
    pub text_height: f64,
    /// Offset applied to a duplicated layer.
    pub duplicate_nudge: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            frame_fraction: 0.3,
            text_width: 300.0,
            text_height: 100.0,
            duplicate_nudge: 20.0,
        }
    }
}

/// Initial properties for `add_layer`.
#[derive(Debug, Clone)]
pub enum LayerInit {
    Design { image: ImageData },
    Picture { image: ImageData },
    Frame,
    Text {
        variable: Option<String>,
        font_family: Option<String>,
    },
}

impl LayerInit {
    fn tag(&self) -> LayerTag {
        match self {
            LayerInit::Design { .. } => LayerTag::Design,
            LayerInit::Picture { .. } => LayerTag::Picture,
            LayerInit::Frame => LayerTag::Frame,
            LayerInit::Text { .. } => LayerTag::Text,
        }
    }
}

/// Partial update for `update_layer`, one variant per layer kind.
/// `Some(None)` on a double-option clears the field.
#[derive(Debug, Clone, Default)]
pub struct TextPatch {
    pub variable: Option<Option<String>>,
    pub format: Option<Option<String>>,
    pub font_family: Option<String>,
    pub color: Option<Color>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub align: Option<TextAlign>,
    pub fixed_width: Option<f64>,
    pub fixed_height: Option<f64>,
}

#[derive(Debug, Clone)]
pub enum LayerPatch {
    Design { image: ImageData },
    Picture { image: ImageData },
    Frame { image_index: Option<usize> },
    Text(TextPatch),
}

pub struct DesignSession<S: CanvasSurface> {
    template: Template,
    sync: Option<Synchronizer<S>>,
    variables: VariableCatalog,
    photos: Vec<ImageData>,
    photo_ratio: Ratio,
    fonts: FontInventory,
    placement: PlacementConfig,
    fit: FitConfig,
}

impl<S: CanvasSurface> DesignSession<S> {
    /// Open a fresh, empty template. No canvas is attached yet; layer
    /// operations no-op until `attach_surface`.
    pub fn new(design_size: DesignSize) -> Self {
        Self::with_template(Template::new(design_size))
    }

    /// Open an existing template (e.g. fetched from the store).
    pub fn with_template(template: Template) -> Self {
        Self {
            template,
            sync: None,
            variables: VariableCatalog::new(),
            photos: Vec::new(),
            photo_ratio: Ratio::new(1, 1),
            fonts: FontInventory::new(),
            placement: PlacementConfig::default(),
            fit: FitConfig::default(),
        }
    }

    // ─── Host wiring ─────────────────────────────────────────────────────

    pub fn set_variables(&mut self, variables: VariableCatalog) {
        self.variables = variables;
    }

    pub fn set_photos(&mut self, photos: Vec<ImageData>, ratio: Ratio) {
        self.photos = photos;
        self.photo_ratio = ratio;
    }

    /// Font discovery finished. Until this is called the session refuses
    /// text layers; everything else is usable immediately.
    pub fn set_fonts(&mut self, fonts: FontInventory) {
        self.fonts = fonts;
    }

    pub fn set_placement_config(&mut self, placement: PlacementConfig) {
        self.placement = placement;
    }

    pub fn set_fit_config(&mut self, fit: FitConfig) {
        self.fit = fit;
    }

    /// Hand over the rendering capability and build the canvas from the
    /// template.
    pub fn attach_surface(&mut self, surface: S) {
        let mut sync = Synchronizer::new(surface, self.fit);
        let ctx = Collaborators {
            variables: &self.variables,
            photos: &self.photos,
        };
        sync.materialize(&mut self.template, &ctx);
        self.sync = Some(sync);
    }

    /// Tear down, returning the surface to the host. Pending async work
    /// resuming after this is a no-op.
    pub fn detach_surface(&mut self) -> Option<S> {
        self.sync.take().map(Synchronizer::into_surface)
    }

    pub fn is_ready(&self) -> bool {
        self.sync.is_some()
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn sync(&self) -> Option<&Synchronizer<S>> {
        self.sync.as_ref()
    }

    /// Host-side surface access; see `Synchronizer::surface_mut`.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.sync.as_mut().map(Synchronizer::surface_mut)
    }

    // ─── Layer operations ────────────────────────────────────────────────

    /// Add a layer of the given kind at the top of the stack, with a
    /// derived default name. Returns the new layer's id, or `None` when
    /// the canvas is not attached (a logged no-op, not an error).
    pub fn add_layer(&mut self, init: LayerInit) -> Option<LayerId> {
        let Some(sync) = self.sync.as_mut() else {
            log::debug!("add_layer before canvas attach, ignored");
            return None;
        };
        let tag = init.tag();
        let name = self.template.next_name(tag);

        let layer = match init {
            LayerInit::Design { image } => {
                if self.template.design().is_some() {
                    log::warn!("template already has a design layer, add ignored");
                    return None;
                }
                Layer::new(
                    LayerId::design(),
                    name,
                    LayerKind::Design(DesignProps { image: Some(image) }),
                )
            }
            LayerInit::Picture { image } => Layer::new(
                LayerId::fresh(tag.id_prefix()),
                name,
                LayerKind::Picture(PictureProps {
                    image: Some(image),
                    placement: Placement::default(),
                }),
            ),
            LayerInit::Frame => {
                let width = sync.viewport().width * self.placement.frame_fraction;
                let height = width / self.photo_ratio.value();
                Layer::new(
                    LayerId::fresh(tag.id_prefix()),
                    name,
                    LayerKind::Frame(FrameProps {
                        placement: Placement::default(),
                        width,
                        height,
                        image_index: None,
                    }),
                )
            }
            LayerInit::Text {
                variable,
                font_family,
            } => {
                if self.fonts.is_empty() {
                    log::warn!("font inventory not loaded yet, text layer refused");
                    return None;
                }
                Layer::new(
                    LayerId::fresh(tag.id_prefix()),
                    name,
                    LayerKind::Text(TextProps {
                        variable,
                        font_family,
                        fixed_width: self.placement.text_width,
                        fixed_height: self.placement.text_height,
                        ..TextProps::default()
                    }),
                )
            }
        };

        let id = layer.id;
        // The background design always paints first, so it lives at the
        // bottom of the stack; everything else stacks on top.
        if tag == LayerTag::Design {
            self.template.insert_bottom(layer);
        } else {
            self.template.insert_top(layer);
        }
        let ctx = Collaborators {
            variables: &self.variables,
            photos: &self.photos,
        };
        sync.spawn(&mut self.template, id, &ctx);
        sync.reorder(&self.template);
        Some(id)
    }

    /// Merge a partial update into a layer. Untouched fields survive; a
    /// patch for the wrong kind is a logged no-op. Text updates re-resolve
    /// the display string, re-gate style flags against the font inventory,
    /// and re-run the fit search before control returns.
    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) {
        let Some(sync) = self.sync.as_mut() else {
            log::debug!("update_layer before canvas attach, ignored");
            return;
        };
        let Some(layer) = self.template.get_mut(id) else {
            log::debug!("update_layer for unknown layer {id}, ignored");
            return;
        };
        let ctx = Collaborators {
            variables: &self.variables,
            photos: &self.photos,
        };

        match (&mut layer.kind, patch) {
            (LayerKind::Design(d), LayerPatch::Design { image }) => {
                d.image = Some(image);
                sync.respawn(&mut self.template, id, &ctx);
            }
            (LayerKind::Picture(p), LayerPatch::Picture { image }) => {
                p.image = Some(image);
                sync.respawn(&mut self.template, id, &ctx);
            }
            (LayerKind::Frame(f), LayerPatch::Frame { image_index }) => {
                f.image_index = image_index;
                sync.refresh_frame(&self.template, id, &ctx);
            }
            (LayerKind::Text(t), LayerPatch::Text(p)) => {
                if let Some(variable) = p.variable {
                    t.variable = variable;
                }
                if let Some(format) = p.format {
                    t.format = format;
                }
                if let Some(family) = p.font_family {
                    t.font_family = Some(family);
                }
                if let Some(color) = p.color {
                    t.color = color;
                }
                if let Some(bold) = p.bold {
                    t.bold = bold;
                }
                if let Some(italic) = p.italic {
                    t.italic = italic;
                }
                if let Some(underline) = p.underline {
                    t.underline = underline;
                }
                if let Some(align) = p.align {
                    t.align = align;
                }
                if let Some(w) = p.fixed_width {
                    t.fixed_width = w;
                }
                if let Some(h) = p.fixed_height {
                    t.fixed_height = h;
                }
                // Styling never selects a variant the family lacks.
                if let Some(family) = t.font_family.clone() {
                    self.fonts
                        .clear_unsupported(&family, &mut t.bold, &mut t.italic);
                }
                sync.refresh_text(&mut self.template, id, &ctx);
            }
            (kind, patch) => {
                log::warn!(
                    "patch {patch:?} does not match layer kind {:?}, ignored",
                    kind.tag()
                );
            }
        }
    }

    /// Remove a layer and its canvas counterpart(s).
    pub fn delete_layer(&mut self, id: LayerId) {
        let Some(sync) = self.sync.as_mut() else {
            log::debug!("delete_layer before canvas attach, ignored");
            return;
        };
        if self.template.remove(id).is_none() {
            log::debug!("delete of unknown layer {id}, ignored");
            return;
        }
        sync.despawn(id);
    }

    /// Flip a layer's visibility; a frame's derived image follows.
    pub fn toggle_visibility(&mut self, id: LayerId) {
        let Some(sync) = self.sync.as_mut() else {
            log::debug!("toggle_visibility before canvas attach, ignored");
            return;
        };
        let Some(layer) = self.template.get_mut(id) else {
            log::debug!("toggle of unknown layer {id}, ignored");
            return;
        };
        layer.visible = !layer.visible;
        sync.set_visibility(id, layer.visible);
    }

    /// Relocate a layer in the stack, then resynchronize paint order.
    pub fn move_layer(&mut self, from: usize, to: usize) {
        let Some(sync) = self.sync.as_mut() else {
            log::debug!("move_layer before canvas attach, ignored");
            return;
        };
        self.template.relocate(from, to);
        sync.reorder(&self.template);
    }

    /// Clone a layer under a fresh id and the next default name, nudged
    /// so the copy is visibly offset. The design layer cannot be
    /// duplicated.
    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let Some(sync) = self.sync.as_mut() else {
            log::debug!("duplicate before canvas attach, ignored");
            return None;
        };
        let Some(original) = self.template.get(id) else {
            log::debug!("duplicate of unknown layer {id}, ignored");
            return None;
        };
        if original.tag() == LayerTag::Design {
            log::warn!("the design layer cannot be duplicated");
            return None;
        }

        let mut copy = original.clone();
        copy.id = LayerId::fresh(original.tag().id_prefix());
        copy.name = self.template.next_name(original.tag());
        if let Some(p) = copy.kind.placement_mut() {
            *p = p.nudged(self.placement.duplicate_nudge, self.placement.duplicate_nudge);
        }

        let new_id = copy.id;
        self.template.insert_top(copy);
        let ctx = Collaborators {
            variables: &self.variables,
            photos: &self.photos,
        };
        sync.spawn(&mut self.template, new_id, &ctx);
        Some(new_id)
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) {
        if let Some(layer) = self.template.get_mut(id) {
            layer.name = name.into();
        }
    }

    pub fn set_template_name(&mut self, name: impl Into<String>) {
        self.template.name = name.into();
    }

    pub fn set_design_size(&mut self, size: DesignSize) {
        self.template.design_size = size;
    }

    /// Forward a canvas event (object changed / pointer down) into the
    /// synchronizer.
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        let Some(sync) = self.sync.as_mut() else {
            log::debug!("event {event:?} after canvas teardown, ignored");
            return;
        };
        sync.handle(&mut self.template, event);
    }

    /// Install a template snapshot (undo/redo) and rebuild the canvas.
    pub fn restore(&mut self, snapshot: Template) {
        self.template = snapshot;
        if let Some(sync) = self.sync.as_mut() {
            let ctx = Collaborators {
                variables: &self.variables,
                photos: &self.photos,
            };
            sync.materialize(&mut self.template, &ctx);
        }
    }

    // ─── Validation & persistence ────────────────────────────────────────

    /// Non-fatal save gating; empty means save-eligible.
    pub fn validate(&self) -> Vec<ValidationMessage> {
        validate_template(&self.template)
    }

    /// Check an uploaded background image against the template's aspect
    /// tag.
    pub fn check_design_image(&self, image: &ImageData) -> Option<ValidationMessage> {
        validate::design_ratio_message(self.template.design_size, image, DEFAULT_RATIO_TOLERANCE)
    }

    /// Persist the template. Validation failures block the save; both
    /// they and store failures surface as a single message (first wins).
    pub fn save(
        &self,
        store: &mut dyn TemplateStore,
        id: Option<&str>,
    ) -> Result<String, String> {
        let msgs = self.validate();
        if let Some(first) = validate::first_message(&msgs) {
            return Err(first.to_string());
        }
        store.save(id, &self.template).map_err(|e| e.to_string())
    }

    /// Fetch a template and make it the session's current one.
    pub fn load(&mut self, store: &dyn TemplateStore, id: &str) -> Result<(), String> {
        let template = store.fetch(id).map_err(|e| e.to_string())?;
        self.restore(template);
        Ok(())
    }
}
