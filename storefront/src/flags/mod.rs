pub mod flag_models;
pub mod precompute;
pub mod registry;

pub use flag_models::{Flag, FlagOption, FlagValues, ProviderData};
pub use precompute::{CodeError, FlagCodec};
pub use registry::{PRECOMPUTE_FLAGS, TOOLBAR_FLAGS};
