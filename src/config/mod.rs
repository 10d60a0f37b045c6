mod env_overrides;
mod loader;
#[cfg(test)]
mod test_env;
mod types;

pub use types::{
    AnalysisConfig, Config, MAX_ATTEMPT_CEILING, ProviderConfig, StorageConfig, expand_path,
};
