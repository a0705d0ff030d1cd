//! Reading and writing nets as PNML documents.
//!
//! The schema is fixed: one `<net>` holding one `<page>` with `<place>`, `<transition>` and
//! `<arc>` elements. Start and finish places are identified through their `type` attribute
//! (`start` / `end`).
mod document;
mod namespace;
mod parser;
mod serializer;

use std::path::{Path, PathBuf};

use derive_builder::Builder;

use crate::error::{PetriError, Result};

pub use namespace::{PNML_NAMESPACE, PTNET_TYPE};
pub use parser::{parse_file, parse_str};
pub use serializer::{save, to_string, write_file};

#[derive(Builder, Clone, Debug)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct PnmlConfig {
    /// Directory used by [`save`], which writes `<output_dir>/<net name>.pnml`.
    #[builder(setter(custom), default = "PathBuf::from(\".\")")]
    pub output_dir: PathBuf,
    /// `xmlns` of the `<pnml>` root, written on save and assumed on load.
    #[builder(setter(into), default = "PNML_NAMESPACE.to_string()")]
    pub namespace: String,
    /// `type` attribute of the `<net>` element.
    #[builder(setter(into), default = "PTNET_TYPE.to_string()")]
    pub net_type: String,
    #[builder(default = "2")]
    pub indent: usize,
}

impl PnmlConfigBuilder {
    pub fn output_dir<P: AsRef<Path>>(&mut self, value: P) -> &mut Self {
        self.output_dir = Some(value.as_ref().to_path_buf());
        self
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(namespace) = &self.namespace {
            if namespace.trim().is_empty() {
                return Err("namespace must not be empty".into());
            }
        }
        Ok(())
    }
}

impl Default for PnmlConfig {
    fn default() -> Self {
        PnmlConfig {
            output_dir: PathBuf::from("."),
            namespace: PNML_NAMESPACE.to_string(),
            net_type: PTNET_TYPE.to_string(),
            indent: 2,
        }
    }
}

impl PnmlConfig {
    /// File that [`save`] writes for a net called `net_name`.
    ///
    /// The name becomes a file name inside `output_dir`, so names that are blank or contain a
    /// path separator or `..` are rejected with [`PetriError::InvalidName`].
    pub fn path_for(&self, net_name: &str) -> Result<PathBuf> {
        let escapes = net_name.contains(['/', '\\']) || net_name.contains("..");
        if net_name.trim().is_empty() || escapes {
            return Err(PetriError::InvalidName(net_name.to_string()));
        }
        Ok(self.output_dir.join(format!("{net_name}.pnml")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_default() {
        let built = PnmlConfigBuilder::default().build().unwrap();
        let default = PnmlConfig::default();
        assert_eq!(built.output_dir, default.output_dir);
        assert_eq!(built.namespace, default.namespace);
        assert_eq!(built.net_type, default.net_type);
        assert_eq!(built.indent, default.indent);
    }

    #[test]
    fn output_path_follows_net_name() {
        let config = PnmlConfigBuilder::default().output_dir("/tmp/nets").build().unwrap();
        assert_eq!(config.path_for("order").unwrap(), PathBuf::from("/tmp/nets/order.pnml"));
    }

    #[test]
    fn output_path_stays_inside_output_dir() {
        let config = PnmlConfig::default();
        for name in ["", "  ", "../escaped", "nets/order", "..", "a\\b", "/etc/passwd"] {
            assert!(
                matches!(config.path_for(name), Err(PetriError::InvalidName(_))),
                "{name:?}"
            );
        }
        assert!(config.path_for("order.v2").is_ok());
    }

    #[test]
    fn empty_namespace_is_rejected() {
        assert!(PnmlConfigBuilder::default().namespace("").build().is_err());
    }
}
