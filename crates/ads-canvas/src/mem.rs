//! In-memory canvas surface.
//!
//! A headless `CanvasSurface` for tests and host pages that need object
//! bookkeeping and text measurement without a renderer. The text metric
//! is a deterministic model, not a rasterizer: characters advance at
//! `0.6 × font size`, lines are `1.16 × font size` tall, and wrapping is
//! greedy per character. What matters for the fit engine is that the
//! measured height is monotonically non-decreasing in font size.

use crate::surface::{
    CanvasSurface, ObjectId, ObjectPatch, ObjectSpec, ObjectState, Viewport,
};
use std::collections::HashMap;

const CHAR_ADVANCE: f64 = 0.6;
const LINE_HEIGHT: f64 = 1.16;

#[derive(Debug, Default)]
pub struct MemSurface {
    viewport: Viewport,
    objects: HashMap<ObjectId, ObjectState>,
    /// Paint order, bottom → top.
    order: Vec<ObjectId>,
    next_id: u64,
}

impl MemSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Measured height of a text block under the model metric.
    pub fn text_block_height(content: &str, font_size: f64, width: f64) -> f64 {
        let chars = content.chars().count().max(1);
        let per_line = ((width / (CHAR_ADVANCE * font_size)).floor() as usize).max(1);
        let lines = chars.div_ceil(per_line);
        lines as f64 * font_size * LINE_HEIGHT
    }
}

impl CanvasSurface for MemSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create(&mut self, state: ObjectState) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.insert(id, state);
        self.order.push(id);
        id
    }

    fn remove(&mut self, id: ObjectId) {
        if self.objects.remove(&id).is_none() {
            log::debug!("remove of unknown object {id:?} ignored");
            return;
        }
        self.order.retain(|o| *o != id);
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.order.clear();
    }

    fn apply(&mut self, id: ObjectId, patch: ObjectPatch) {
        let Some(state) = self.objects.get_mut(&id) else {
            log::debug!("apply to unknown object {id:?} ignored");
            return;
        };

        let p = &mut state.placement;
        if let Some(v) = patch.left {
            p.left = v;
        }
        if let Some(v) = patch.top {
            p.top = v;
        }
        if let Some(v) = patch.scale_x {
            p.scale_x = v;
        }
        if let Some(v) = patch.scale_y {
            p.scale_y = v;
        }
        if let Some(v) = patch.angle {
            p.angle = v;
        }
        if let Some(v) = patch.width {
            state.width = v;
        }
        if let Some(v) = patch.height {
            state.height = v;
        }
        if let Some(v) = patch.visible {
            state.visible = v;
        }
        if let Some(v) = patch.selectable {
            state.selectable = v;
        }

        if let ObjectSpec::Text(text) = &mut state.spec {
            if let Some(v) = patch.content {
                text.content = v;
            }
            if let Some(v) = patch.font_size {
                text.font_size = v;
            }
            if let Some(v) = patch.font_family {
                text.font_family = v;
            }
            if let Some(v) = patch.bold {
                text.bold = v;
            }
            if let Some(v) = patch.italic {
                text.italic = v;
            }
            if let Some(v) = patch.underline {
                text.underline = v;
            }
            if let Some(v) = patch.align {
                text.align = v;
            }
            if let Some(v) = patch.color {
                text.color = v;
            }
        }
    }

    fn state(&self, id: ObjectId) -> Option<&ObjectState> {
        self.objects.get(&id)
    }

    fn measure_text_height(&self, id: ObjectId) -> Option<f64> {
        let state = self.objects.get(&id)?;
        let text = state.text()?;
        Some(Self::text_block_height(
            &text.content,
            text.font_size,
            state.width,
        ))
    }

    fn paint_order(&self) -> Vec<ObjectId> {
        self.order.clone()
    }

    fn bring_to_front(&mut self, id: ObjectId) {
        let len = self.order.len();
        self.move_to(id, len.saturating_sub(1));
    }

    fn send_to_back(&mut self, id: ObjectId) {
        self.move_to(id, 0);
    }

    fn move_to(&mut self, id: ObjectId, index: usize) {
        let Some(pos) = self.order.iter().position(|o| *o == id) else {
            log::debug!("move_to of unknown object {id:?} ignored");
            return;
        };
        self.order.remove(pos);
        let index = index.min(self.order.len());
        self.order.insert(index, id);
    }
}
