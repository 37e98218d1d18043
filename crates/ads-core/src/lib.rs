pub mod fonts;
pub mod id;
pub mod model;
pub mod persist;
pub mod store;
pub mod validate;
pub mod vars;

pub use fonts::{FontInventory, FontVariant};
pub use id::{DESIGN_LAYER_ID, LayerId};
pub use model::*;
pub use store::{MemStore, StoreError, TemplateStore};
pub use validate::{ValidationMessage, first_message, validate_template};
pub use vars::{Formatting, TextVariable, VariableCatalog};
