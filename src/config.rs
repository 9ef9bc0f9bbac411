use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::xmlrpc::charset::Charset;

pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Output settings shared by every value encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    encoding: String,
}

impl GeneratorConfig {
    pub fn new(encoding: &str) -> GeneratorConfig {
        GeneratorConfig {
            encoding: encoding.to_string(),
        }
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn charset(&self) -> Charset {
        Charset::from_label(&self.encoding)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig::new(DEFAULT_ENCODING)
    }
}

// Writers replace the whole snapshot, readers clone the Arc; nobody holds
// the lock while encoding.
static GENERATOR: LazyLock<RwLock<Arc<GeneratorConfig>>> =
    LazyLock::new(|| RwLock::new(Arc::new(GeneratorConfig::default())));

/// Snapshot of the process-wide generator settings.
///
/// Used by the encoding entry points that are not handed an explicit
/// [`GeneratorConfig`]. Safe to call from any thread.
pub fn generator() -> Arc<GeneratorConfig> {
    GENERATOR
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the process-wide generator settings. Later encodes anywhere in
/// the process observe the new settings.
pub fn set_generator(config: GeneratorConfig) {
    debug!("Process generator encoding set to {}", config.encoding());
    *GENERATOR.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
}

pub fn set_default_encoding(encoding: &str) {
    set_generator(GeneratorConfig::new(encoding));
}
