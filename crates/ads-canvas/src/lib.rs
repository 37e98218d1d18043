pub mod mem;
pub mod surface;

pub use mem::MemSurface;
pub use surface::{
    CanvasSurface, ObjectId, ObjectPatch, ObjectSpec, ObjectState, SurfaceEvent, TextSpec,
    Viewport,
};
