//! The canvas-surface boundary.
//!
//! The real renderer (object creation, hit testing, transform handles,
//! redraw scheduling) lives outside this workspace. The designer core
//! drives it through the `CanvasSurface` trait: a small operation set for
//! creating, mutating, stacking, and measuring objects. The surface is a
//! rendering capability handed to the synchronizer at construction —
//! never a hidden module-level singleton — and its objects are always the
//! non-authoritative replica of the template's layers.
//!
//! Events travel the other way as plain values: the host forwards what
//! its canvas reports (`SurfaceEvent`) into the synchronizer, so listener
//! lifetime is exactly the synchronizer's own scope.

use ads_core::id::LayerId;
use ads_core::model::{Color, ImageData, Placement, TextAlign};

/// The canvas dimensions the surface paints into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
        }
    }
}

/// Opaque handle to a live surface object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) u64);

/// Text styling and content carried by a text object.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub content: String,
    pub font_family: String,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub align: TextAlign,
    pub color: Color,
}

/// What a surface object draws. One variant per drawable kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectSpec {
    /// A raster image with a decoded payload.
    Image { payload: ImageData },
    /// A wrapped text block.
    Text(TextSpec),
    /// A placeholder rectangle (image-container frame).
    Rect,
    /// An invisible mask that clips another object to a rectangle.
    ClipMask,
}

/// Full state of a surface object. Created from this and readable back;
/// the synchronizer treats it as a replica of the owning layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectState {
    /// Owning layer id. `None` for derived objects (contained images,
    /// clip masks), which the capture path must ignore.
    pub tag: Option<LayerId>,
    pub spec: ObjectSpec,
    pub placement: Placement,
    /// Nominal (pre-scale) box.
    pub width: f64,
    pub height: f64,
    pub visible: bool,
    pub selectable: bool,
    /// Clip mask applied to this object, if any.
    pub clip: Option<ObjectId>,
}

impl ObjectState {
    pub fn new(spec: ObjectSpec) -> Self {
        Self {
            tag: None,
            spec,
            placement: Placement::default(),
            width: 0.0,
            height: 0.0,
            visible: true,
            selectable: false,
            clip: None,
        }
    }

    /// Text spec accessor; `None` for non-text objects.
    pub fn text(&self) -> Option<&TextSpec> {
        match &self.spec {
            ObjectSpec::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Partial update applied with `CanvasSurface::apply`. Unset fields leave
/// the object untouched; text fields are ignored by non-text objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub angle: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub visible: Option<bool>,
    pub selectable: Option<bool>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub align: Option<TextAlign>,
    pub color: Option<Color>,
}

impl ObjectPatch {
    /// Patch that moves/transforms an object to the given placement.
    pub fn placed(p: Placement) -> Self {
        Self {
            left: Some(p.left),
            top: Some(p.top),
            scale_x: Some(p.scale_x),
            scale_y: Some(p.scale_y),
            angle: Some(p.angle),
            ..Self::default()
        }
    }
}

/// An event the host forwards from its canvas into the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The user finished moving/resizing/rotating an object.
    ObjectChanged(ObjectId),
    /// Pointer went down on an object; interactivity is (re-)gated now.
    PointerDown(ObjectId),
}

/// The operation set the designer core drives a canvas with.
///
/// Paint order is bottom → top; `create` appends at the top.
pub trait CanvasSurface {
    fn viewport(&self) -> Viewport;

    fn create(&mut self, state: ObjectState) -> ObjectId;
    fn remove(&mut self, id: ObjectId);
    fn clear(&mut self);

    fn apply(&mut self, id: ObjectId, patch: ObjectPatch);
    fn state(&self, id: ObjectId) -> Option<&ObjectState>;

    /// Rendered block height of a text object at its current font size
    /// and nominal width. `None` for unknown or non-text objects.
    fn measure_text_height(&self, id: ObjectId) -> Option<f64>;

    /// All object ids, bottom → top.
    fn paint_order(&self) -> Vec<ObjectId>;
    fn bring_to_front(&mut self, id: ObjectId);
    fn send_to_back(&mut self, id: ObjectId);
    /// Move an object to the given stack index (0 = bottommost).
    fn move_to(&mut self, id: ObjectId, index: usize);
}
