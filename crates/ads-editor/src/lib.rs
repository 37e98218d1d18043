pub mod autofit;
pub mod clip;
pub mod history;
pub mod session;
pub mod sync;

pub use autofit::{FitConfig, FitResult, fit_text};
pub use clip::{Attached, cover_scale};
pub use history::History;
pub use session::{DesignSession, LayerInit, LayerPatch, PlacementConfig, TextPatch};
pub use sync::{Collaborators, Interactivity, Synchronizer};
