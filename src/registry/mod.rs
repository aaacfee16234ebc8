pub mod alias;
pub mod registry;
pub mod store;

pub use alias::{AliasEntry, AliasError, AliasTable};
pub use registry::{ModelRegistry, PredictionError};
pub use store::{ManifestModelEntry, ModelStore, ModelStoreBuilder, StoreError, StoreManifest};
