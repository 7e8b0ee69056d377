pub mod errors;
pub mod flag_definitions;
pub mod overrides;
pub mod revalidate;
pub mod types;

pub use errors::StoreError;
