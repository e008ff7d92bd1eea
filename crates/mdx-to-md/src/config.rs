//! Serializable conversion settings.

use crate::options::MdxToMdOptions;
use mdx_to_md_core::{BuildOptions, FrontmatterOptions, MdxOptions, ParseOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// A configuration document that failed to parse.
#[derive(Debug, Error)]
#[error("Invalid conversion config: {0}")]
pub struct ConfigError(#[from] serde_json::Error);

/// Conversion settings as they appear in a JSON config file.
///
/// Every field is optional; unset fields keep the [`MdxToMdOptions`]
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertConfig {
    /// Project root for component resolution.
    pub project_root: Option<PathBuf>,
    /// Import prefix routed to component resolution.
    pub component_prefix: Option<String>,
    /// Frontmatter fence line.
    pub frontmatter_delimiter: Option<String>,
    /// GitHub Flavored Markdown constructs.
    pub gfm: Option<bool>,
    /// Math constructs.
    pub math: Option<bool>,
    /// Extra compile-time substitutions. The pinned `process.env` keys
    /// cannot be overridden.
    pub define: Option<BTreeMap<String, String>>,
}

impl ConvertConfig {
    /// Parse a JSON config document.
    ///
    /// ```
    /// use mdx_to_md::ConvertConfig;
    ///
    /// let config = ConvertConfig::from_json(r#"{ "componentPrefix": "~/ui/" }"#).unwrap();
    /// assert_eq!(config.component_prefix.as_deref(), Some("~/ui/"));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve into conversion options.
    pub fn into_options(self) -> MdxToMdOptions {
        let defaults = ParseOptions::mdx();
        let parse = ParseOptions {
            gfm: self.gfm.unwrap_or(defaults.gfm),
            math: self.math.unwrap_or(defaults.math),
            ..defaults
        };

        let esbuild_options = self.define.filter(|d| !d.is_empty()).map(|define| {
            Arc::new(move |mut build: BuildOptions| {
                build.define.extend(define.clone());
                build
            }) as crate::options::BuildOptionsTransform
        });

        MdxToMdOptions {
            esbuild_options,
            gray_matter_options: match self.frontmatter_delimiter {
                Some(delimiter) => FrontmatterOptions { delimiter },
                None => FrontmatterOptions::default(),
            },
            mdx_options: MdxOptions {
                parse,
                ..MdxOptions::default()
            },
            project_root: self.project_root,
            component_prefix: self.component_prefix,
            ..MdxToMdOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn empty_config_keeps_defaults() {
        let config = ConvertConfig::from_json("{}").unwrap();
        assert_eq!(config, ConvertConfig::default());

        let options = config.into_options();
        assert!(options.esbuild_options.is_none());
        assert_eq!(options.gray_matter_options, FrontmatterOptions::default());
        assert_eq!(options.mdx_options.parse, ParseOptions::mdx());
        assert!(options.components.contains("Screenshot"));
    }

    #[test]
    fn camel_case_fields() {
        let config = ConvertConfig::from_json(
            r#"{
                "projectRoot": "/work/site",
                "frontmatterDelimiter": "+++",
                "math": true,
                "define": { "VERSION": "\"1.0\"" }
            }"#,
        )
        .unwrap();
        let options = config.into_options();
        assert_eq!(options.project_root, Some(PathBuf::from("/work/site")));
        assert_eq!(options.gray_matter_options.delimiter, "+++");
        assert!(options.mdx_options.parse.math);

        let build = options.build_options(Path::new("README.mdx"), Path::new("."));
        assert_eq!(build.define["VERSION"], "\"1.0\"");
    }

    #[test]
    fn rejects_unknown_types() {
        let err = ConvertConfig::from_json(r#"{ "gfm": "yes" }"#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid conversion config:"));
    }
}
