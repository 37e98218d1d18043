//! Template data model for the ad designer.
//!
//! A template is an ordered stack of heterogeneous layers (background
//! design, free pictures, image-container frames, text boxes) painted
//! bottom-to-top by the canvas. The stack order in `layers` is the single
//! source of truth: index 0 is the topmost layer and the canvas paint
//! order is always `reverse(layers)`. Every type here is serializable;
//! the live canvas objects are derived replicas, never the other way
//! around.

use crate::id::LayerId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ─── Color ───────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0], persisted as a hex string
/// (`#RRGGBB`, or `#RRGGBBAA` when not fully opaque).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    Some(hex_val(hi)? << 4 | hex_val(lo)?)
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    /// Parse a hex color string: `#RGB`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 => {
                let r = hex_pair(bytes[0], bytes[1])?;
                let g = hex_pair(bytes[2], bytes[3])?;
                let b = hex_pair(bytes[4], bytes[5])?;
                Some(Self::rgba(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    1.0,
                ))
            }
            8 => {
                let r = hex_pair(bytes[0], bytes[1])?;
                let g = hex_pair(bytes[2], bytes[3])?;
                let b = hex_pair(bytes[4], bytes[5])?;
                let a = hex_pair(bytes[6], bytes[7])?;
                Some(Self::rgba(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    a as f32 / 255.0,
                ))
            }
            _ => None,
        }
    }

    /// Emit as shortest valid hex string.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;

        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

// ─── Aspect tags ─────────────────────────────────────────────────────────

/// Fixed set of design canvas aspect tags a template can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DesignSize {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Portrait,
    #[serde(rename = "9:16")]
    Story,
    #[serde(rename = "16:9")]
    Wide,
}

impl DesignSize {
    /// Width ÷ height of the tag.
    pub fn ratio(self) -> f64 {
        match self {
            DesignSize::Square => 1.0,
            DesignSize::Portrait => 4.0 / 5.0,
            DesignSize::Story => 9.0 / 16.0,
            DesignSize::Wide => 16.0 / 9.0,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            DesignSize::Square => "1:1",
            DesignSize::Portrait => "4:5",
            DesignSize::Story => "9:16",
            DesignSize::Wide => "16:9",
        }
    }
}

/// A width:height aspect ratio, e.g. the host-supplied photo ratio `16:9`
/// that every image-container frame in a template is locked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub w: u32,
    pub h: u32,
}

impl Ratio {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Width ÷ height as a scalar.
    pub fn value(self) -> f64 {
        f64::from(self.w) / f64::from(self.h)
    }

    /// Parse a `"W:H"` tag. Returns `None` on anything malformed or zero.
    pub fn parse(tag: &str) -> Option<Self> {
        let (w, h) = tag.split_once(':')?;
        let w: u32 = w.trim().parse().ok()?;
        let h: u32 = h.trim().parse().ok()?;
        if w == 0 || h == 0 {
            return None;
        }
        Some(Self { w, h })
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.w, self.h)
    }
}

// ─── Text styling ────────────────────────────────────────────────────────

/// Horizontal text alignment inside a fixed box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

// ─── Geometry & payloads ─────────────────────────────────────────────────

/// Geometry shared by every transformable canvas object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub angle: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }
    }
}

impl Placement {
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            ..Self::default()
        }
    }

    /// Same position/angle, nudged by (dx, dy). Used when duplicating.
    pub fn nudged(self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..self
        }
    }
}

/// A decoded image payload descriptor. Decoding happens outside the core;
/// by the time a payload reaches the model its pixel size is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub source: String,
    pub width: f64,
    pub height: f64,
}

impl ImageData {
    pub fn new(source: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            source: source.into(),
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

// ─── Layers ──────────────────────────────────────────────────────────────

/// Discriminant-only view of `LayerKind`, used for naming and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerTag {
    Design,
    Picture,
    Frame,
    Text,
}

impl LayerTag {
    /// Human-readable label used to derive default layer names.
    pub fn label(self) -> &'static str {
        match self {
            LayerTag::Design => "Design",
            LayerTag::Picture => "Picture",
            LayerTag::Frame => "Image",
            LayerTag::Text => "Text",
        }
    }

    /// Prefix for generated layer ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            LayerTag::Design => "design",
            LayerTag::Picture => "picture",
            LayerTag::Frame => "frame",
            LayerTag::Text => "text",
        }
    }
}

/// Properties of the single background design layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DesignProps {
    pub image: Option<ImageData>,
}

/// Properties of a freestanding picture layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PictureProps {
    pub image: Option<ImageData>,
    #[serde(flatten)]
    pub placement: Placement,
}

/// Properties of an image-container frame layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameProps {
    #[serde(flatten)]
    pub placement: Placement,
    pub width: f64,
    pub height: f64,
    pub image_index: Option<usize>,
}

/// Properties of a text layer. `font_size` is derived by the fit engine,
/// never user-set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub variable: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    pub font_family: Option<String>,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    pub align: TextAlign,
    #[serde(flatten)]
    pub placement: Placement,
    pub fixed_width: f64,
    pub fixed_height: f64,
    pub font_size: f64,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            variable: None,
            format: None,
            font_family: None,
            color: Color::BLACK,
            bold: false,
            italic: false,
            underline: false,
            align: TextAlign::Left,
            placement: Placement::default(),
            fixed_width: 300.0,
            fixed_height: 100.0,
            font_size: 8.0,
        }
    }
}

/// The per-type payload of a layer. One variant per layer type with a
/// fixed field set, dispatched by exhaustive matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "properties", rename_all = "lowercase")]
pub enum LayerKind {
    /// The single background image. Bottommost, non-interactive,
    /// auto-scaled to cover the canvas.
    Design(DesignProps),

    /// A freestanding picture. Freely transformable and always
    /// interactive regardless of stacking position.
    Picture(PictureProps),

    /// An image-container frame: a placeholder rectangle whose aspect is
    /// locked to the template-wide photo ratio. When `image_index` points
    /// into the host's image list, a non-interactive contained image is
    /// derived and kept geometrically locked to the frame.
    #[serde(rename = "image")]
    Frame(FrameProps),

    /// A text box bound to a host-supplied variable, auto-fitted into a
    /// fixed-size box.
    Text(TextProps),
}

impl LayerKind {
    pub fn tag(&self) -> LayerTag {
        match self {
            LayerKind::Design(_) => LayerTag::Design,
            LayerKind::Picture(_) => LayerTag::Picture,
            LayerKind::Frame(_) => LayerTag::Frame,
            LayerKind::Text(_) => LayerTag::Text,
        }
    }

    /// The free transform of this layer, when it has one. The design
    /// layer is pinned to the canvas and has none.
    pub fn placement(&self) -> Option<&Placement> {
        match self {
            LayerKind::Design(_) => None,
            LayerKind::Picture(p) => Some(&p.placement),
            LayerKind::Frame(f) => Some(&f.placement),
            LayerKind::Text(t) => Some(&t.placement),
        }
    }

    pub fn placement_mut(&mut self) -> Option<&mut Placement> {
        match self {
            LayerKind::Design(_) => None,
            LayerKind::Picture(p) => Some(&mut p.placement),
            LayerKind::Frame(f) => Some(&mut f.placement),
            LayerKind::Text(t) => Some(&mut t.placement),
        }
    }
}

/// One visual element of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(flatten)]
    pub kind: LayerKind,
}

fn default_visible() -> bool {
    true
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            kind,
        }
    }

    pub fn tag(&self) -> LayerTag {
        self.kind.tag()
    }
}

// ─── Template ────────────────────────────────────────────────────────────

/// The root aggregate: a named, aspect-tagged, ordered stack of layers.
/// Index 0 is the topmost layer; the canvas paints `reverse(layers)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "designSize")]
    pub design_size: DesignSize,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Template {
    pub fn new(design_size: DesignSize) -> Self {
        Self {
            name: String::new(),
            design_size,
            layers: Vec::new(),
        }
    }

    /// Insert a layer at index 0 (topmost). A duplicate id is a logged
    /// no-op: ids are unique within a template.
    pub fn insert_top(&mut self, layer: Layer) {
        if self.position(layer.id).is_some() {
            log::warn!("duplicate layer id {}, insert ignored", layer.id);
            return;
        }
        self.layers.insert(0, layer);
    }

    /// Insert a layer at the end of the stack (bottommost). Used for the
    /// background design, which always paints first.
    pub fn insert_bottom(&mut self, layer: Layer) {
        if self.position(layer.id).is_some() {
            log::warn!("duplicate layer id {}, insert ignored", layer.id);
            return;
        }
        self.layers.push(layer);
    }

    /// Remove and return the layer with the given id, if present.
    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let pos = self.position(id)?;
        Some(self.layers.remove(pos))
    }

    /// Single-element relocation: remove the layer at `from` and reinsert
    /// it at `to`. Out-of-range `from` is a no-op; `to` is clamped.
    pub fn relocate(&mut self, from: usize, to: usize) {
        if from >= self.layers.len() {
            log::debug!("relocate from={from} out of range, ignored");
            return;
        }
        let layer = self.layers.remove(from);
        let to = to.min(self.layers.len());
        self.layers.insert(to, layer);
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Index of the layer with the given id (0 = topmost).
    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// The background design layer, matched by variant — never by list
    /// position.
    pub fn design(&self) -> Option<&Layer> {
        self.layers.iter().find(|l| l.tag() == LayerTag::Design)
    }

    pub fn design_position(&self) -> Option<usize> {
        self.layers.iter().position(|l| l.tag() == LayerTag::Design)
    }

    /// Derive the next default name for a layer of the given kind:
    /// `"<Label> <N>"` where N is one greater than the largest numeric
    /// suffix among existing same-kind layers matching the label pattern.
    /// Numbers are never reused after deletion.
    pub fn next_name(&self, tag: LayerTag) -> String {
        let label = tag.label();
        let mut max = 0u32;
        for layer in self.layers.iter().filter(|l| l.tag() == tag) {
            let Some(suffix) = layer
                .name
                .strip_prefix(label)
                .and_then(|rest| rest.strip_prefix(' '))
            else {
                continue;
            };
            if let Ok(n) = suffix.parse::<u32>() {
                max = max.max(n);
            }
        }
        format!("{label} {}", max + 1)
    }

    /// A template is complete when it has exactly one design layer and at
    /// least one other layer. Completeness gates saving, not editing.
    pub fn is_complete(&self) -> bool {
        let designs = self
            .layers
            .iter()
            .filter(|l| l.tag() == LayerTag::Design)
            .count();
        designs == 1 && self.layers.len() > designs
    }
}
