//! Library manifest parsing.
//!
//! A library location is a path to a JSON manifest describing the types the
//! library contributes to an environment:
//!
//! ```json
//! {
//!   "library": "demo-api",
//!   "version": "1.0.0",
//!   "interfaces": [
//!     {
//!       "name": "demo.Greeter",
//!       "methods": [
//!         { "name": "greet", "params": ["string"], "returns": "string" }
//!       ]
//!     }
//!   ],
//!   "classes": ["demo.GreeterImpl"]
//! }
//! ```
//!
//! Type specs use primitives `void`, `bool`, `int`, `float`, `string`, the
//! array suffix `[]` (nestable), and dotted names for interfaces and opaque
//! concrete classes.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::BridgeError;

#[derive(Debug, Deserialize)]
pub(crate) struct LibraryManifest {
    pub library: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
    #[serde(default)]
    pub classes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default = "default_returns")]
    pub returns: String,
}

fn default_returns() -> String {
    "void".to_string()
}

/// Read and parse one manifest. Unreadable and malformed locations both fail
/// the environment load that requested them.
pub(crate) fn parse_manifest(path: &Path) -> Result<LibraryManifest, BridgeError> {
    let text = fs::read_to_string(path).map_err(|source| BridgeError::UnreadableLocation {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| BridgeError::MalformedManifest {
        path: path.to_path_buf(),
        source,
    })
}

/// A parsed type spec: base name plus array depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeName {
    pub base: String,
    pub dims: usize,
}

/// Parse a type spec, returning `None` when it is not well formed.
pub(crate) fn parse_type_name(spec: &str) -> Option<TypeName> {
    let mut rest = spec.trim();
    let mut dims = 0;
    while let Some(stripped) = rest.strip_suffix("[]") {
        rest = stripped.trim_end();
        dims += 1;
    }
    if rest.is_empty() || (rest == "void" && dims > 0) {
        return None;
    }
    let well_formed = rest.split('.').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    if !well_formed {
        return None;
    }
    Some(TypeName {
        base: rest.to_string(),
        dims,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_names() {
        assert_eq!(
            parse_type_name("string"),
            Some(TypeName {
                base: "string".to_string(),
                dims: 0
            })
        );
        assert_eq!(
            parse_type_name("demo.Greeter"),
            Some(TypeName {
                base: "demo.Greeter".to_string(),
                dims: 0
            })
        );
    }

    #[test]
    fn test_parse_array_suffixes() {
        assert_eq!(
            parse_type_name("string[]"),
            Some(TypeName {
                base: "string".to_string(),
                dims: 1
            })
        );
        assert_eq!(
            parse_type_name("demo.Listener[][]"),
            Some(TypeName {
                base: "demo.Listener".to_string(),
                dims: 2
            })
        );
    }

    #[test]
    fn test_reject_malformed_names() {
        assert_eq!(parse_type_name(""), None);
        assert_eq!(parse_type_name("[]"), None);
        assert_eq!(parse_type_name("void[]"), None);
        assert_eq!(parse_type_name("demo..Greeter"), None);
        assert_eq!(parse_type_name("9lives"), None);
        assert_eq!(parse_type_name("demo.Gre eter"), None);
    }

    #[test]
    fn test_manifest_defaults() {
        let manifest: LibraryManifest = serde_json::from_str(
            r#"{
                "library": "demo",
                "interfaces": [
                    { "name": "demo.Ping", "methods": [{ "name": "ping" }] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.library, "demo");
        assert!(manifest.version.is_none());
        assert!(manifest.classes.is_empty());
        let method = &manifest.interfaces[0].methods[0];
        assert!(method.params.is_empty());
        assert_eq!(method.returns, "void");
    }
}
