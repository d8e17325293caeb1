//! Spec document decoder.
//!
//! ```text
//! file text
//!   ↓ toml::Table          (syntax: hard DecodeError)
//!   ↓ serde DocumentDto    (shape: Notices + empty Document)
//!   ↓ schema::check        (version-gated keys: Notices)
//!   ↓ convert
//! Document
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use toml::Spanned;
use tracing::debug;

use super::config_dto::{ComponentDto, DocumentDto, VendorDto};
use super::document::{Document, DocumentAllow, DocumentComponent, DocumentVendor};
use super::schema;
use super::source_map::SourceMap;
use crate::types::{Notice, Reference};

/// Errors that prevent a document from being decoded at all.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The document could not be read.
    #[error("failed to read spec document {path}: {source}")]
    Io {
        /// Document path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The document is not valid TOML.
    #[error("{reference}: invalid spec document syntax: {message}")]
    Syntax {
        /// Location of the syntax error (document start if unknown).
        reference: Reference,
        /// Parser message.
        message: String,
    },
}

/// A decoded document and the schema notices found while decoding it.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// The document (empty if the text does not fit the schema).
    pub document: Document,
    /// Schema notices.
    pub notices: Vec<Notice>,
}

/// Decodes spec documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    /// Creates a decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reads and decodes the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn decode(&self, path: &Path) -> Result<Decoded, DecodeError> {
        let content = std::fs::read_to_string(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.decode_str(path, &content)
    }

    /// Decodes document text; `path` is only used for references.
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not valid TOML.
    pub fn decode_str(&self, path: &Path, content: &str) -> Result<Decoded, DecodeError> {
        let map = SourceMap::new(path, content);

        let table = content
            .parse::<toml::Table>()
            .map_err(|err| DecodeError::Syntax {
                reference: err
                    .span()
                    .map_or_else(|| map.start(), |span| map.span_reference(&span)),
                message: err.message().trim().to_string(),
            })?;

        let dto = match toml::from_str::<DocumentDto>(content) {
            Ok(dto) => dto,
            Err(err) => {
                debug!("Spec document does not fit the schema: {}", err.message());
                let mut notices = shape_notices(content, &table, &map);
                if notices.is_empty() {
                    let reference = err
                        .span()
                        .map_or_else(|| map.start(), |span| map.span_reference(&span));
                    notices.push(shape_notice(err.message(), reference));
                }
                return Ok(Decoded {
                    document: Document::empty(path),
                    notices,
                });
            }
        };

        let notices = schema::check(&dto, &map);
        let document = convert(dto, &map);
        debug!(
            "Decoded spec document {} (version {}, {} component(s), {} vendor(s))",
            path.display(),
            document.version.value,
            document.components.len(),
            document.vendors.len()
        );

        Ok(Decoded { document, notices })
    }
}

/// Where the array-of-tables entries start.
#[derive(Deserialize)]
struct EntryLayout {
    #[serde(default)]
    components: Vec<Spanned<toml::Table>>,
    #[serde(default)]
    vendors: Vec<Spanned<toml::Table>>,
}

/// Checks every top-level key and every component and vendor entry on its
/// own, so one mistake does not hide the next.
fn shape_notices(content: &str, table: &toml::Table, map: &SourceMap<'_>) -> Vec<Notice> {
    let key_refs: BTreeMap<String, Reference> =
        toml::from_str::<BTreeMap<Spanned<String>, toml::Value>>(content)
            .map(|keys| {
                keys.into_keys()
                    .map(|key| {
                        let reference = map.span_reference(&key.span());
                        (key.into_inner(), reference)
                    })
                    .collect()
            })
            .unwrap_or_default();
    let key_ref = |key: &str| key_refs.get(key).cloned().unwrap_or_else(|| map.start());
    let layout = toml::from_str::<EntryLayout>(content).ok();

    let mut notices = Vec::new();
    if !table.contains_key("version") {
        notices.push(shape_notice("missing field `version`", map.start()));
    }

    for (key, value) in table {
        match (key.as_str(), &layout) {
            ("components", Some(layout)) => {
                entry_notices::<ComponentDto>(&layout.components, map, &mut notices);
            }
            ("vendors", Some(layout)) => {
                entry_notices::<VendorDto>(&layout.vendors, map, &mut notices);
            }
            _ => {
                let mut single = toml::Table::new();
                if key != "version" {
                    single.insert("version".to_string(), toml::Value::Integer(1));
                }
                single.insert(key.clone(), value.clone());
                if let Err(message) = fits::<DocumentDto>(&single) {
                    notices.push(shape_notice(&message, key_ref(key.as_str())));
                }
            }
        }
    }

    notices.sort_by_key(|n| (n.reference.line, n.reference.column));
    notices
}

fn entry_notices<T: DeserializeOwned>(
    entries: &[Spanned<toml::Table>],
    map: &SourceMap<'_>,
    notices: &mut Vec<Notice>,
) {
    for entry in entries {
        if let Err(message) = fits::<T>(entry.get_ref()) {
            notices.push(shape_notice(&message, map.span_reference(&entry.span())));
        }
    }
}

/// Round-trips `table` through TOML text so span-carrying DTOs can be
/// decoded from it.
fn fits<T: DeserializeOwned>(table: &toml::Table) -> Result<(), String> {
    let text = toml::to_string(table).map_err(|err| err.to_string())?;
    toml::from_str::<T>(&text)
        .map(drop)
        .map_err(|err| err.message().to_string())
}

fn shape_notice(message: &str, reference: Reference) -> Notice {
    Notice::new(format!("invalid spec document: {}", message.trim()), reference)
}

fn convert(dto: DocumentDto, map: &SourceMap<'_>) -> Document {
    let version = map.referable(dto.version);
    let allow_dto = dto.allow.unwrap_or_default();
    let allow = DocumentAllow {
        dep_on_any_vendor: map.referable_or(allow_dto.dep_on_any_vendor, false),
        deep_scan: map.referable_or(allow_dto.deep_scan, schema::deep_scan_default(version.value)),
    };

    Document {
        path: map.path().to_path_buf(),
        working_directory: map.referable_or(dto.workdir, String::new()),
        exclude: map.referables(dto.exclude),
        exclude_files: map.referables(dto.exclude_files),
        common_components: map.referables(dto.common_components),
        common_vendors: map.referables(dto.common_vendors),
        vendors: dto.vendors.into_iter().map(|v| convert_vendor(v, map)).collect(),
        components: dto
            .components
            .into_iter()
            .map(|c| convert_component(c, map))
            .collect(),
        version,
        allow,
    }
}

fn convert_vendor(dto: VendorDto, map: &SourceMap<'_>) -> DocumentVendor {
    DocumentVendor {
        name: map.referable(dto.name),
        import_paths: map.referables(dto.import_paths),
    }
}

fn convert_component(dto: ComponentDto, map: &SourceMap<'_>) -> DocumentComponent {
    DocumentComponent {
        name: map.referable(dto.name),
        paths: map.referables(dto.paths),
        may_depend_on: map.referables(dto.may_depend_on),
        can_use: map.referables(dto.can_use),
        any_project_deps: map.referable_or(dto.any_project_deps, false),
        any_vendor_deps: map.referable_or(dto.any_vendor_deps, false),
        deep_scan: dto.deep_scan.map(|flag| map.referable(flag)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DOC: &str = r#"version = 3
workdir = "internal"
exclude = ["generated"]
exclude-files = ["^.*_test\\.go$"]
common-components = ["models"]

[[vendors]]
name = "log"
in = ["example.com/log/**"]

[[components]]
name = "models"
in = ["models"]

[[components]]
name = "a"
in = ["a"]
may-depend-on = ["models"]
can-use = ["log"]
deep-scan = false
"#;

    fn decode(src: &str) -> Result<Decoded, DecodeError> {
        Decoder::new().decode_str(Path::new("archgate.toml"), src)
    }

    #[test]
    fn decodes_values_with_references() {
        let decoded = decode(DOC).unwrap();
        assert!(decoded.notices.is_empty());

        let doc = decoded.document;
        assert_eq!(doc.version().value, 3);
        assert_eq!(doc.working_directory().value, "internal");
        assert_eq!(doc.working_directory().reference.line, 2);
        assert_eq!(doc.exclude_files()[0].value, "^.*_test\\.go$");
        assert_eq!(doc.common_components()[0].reference.line, 5);

        let log = doc.vendor("log").unwrap();
        assert_eq!(log.reference().line, 8);
        assert_eq!(log.import_paths()[0].value, "example.com/log/**");

        let a = doc.component("a").unwrap();
        assert_eq!(a.reference().line, 16);
        assert_eq!(a.may_depend_on()[0].value, "models");
        assert_eq!(a.deep_scan().map(|f| f.value), Some(false));
        assert!(doc.component("models").unwrap().deep_scan().is_none());
    }

    #[test]
    fn applies_defaults_at_document_start() {
        let doc = decode("version = 3\n").unwrap().document;
        let start = Reference::new("archgate.toml", 1, 1);

        assert_eq!(doc.working_directory().value, "");
        assert_eq!(doc.working_directory().reference, start);
        assert!(!doc.allow().dep_on_any_vendor().value);
        assert!(doc.allow().deep_scan().value);
        assert_eq!(doc.allow().deep_scan().reference, start);
        assert!(doc.exclude().is_empty());
        assert!(doc.components().is_empty());
    }

    #[test]
    fn deep_scan_defaults_off_before_version_three() {
        let doc = decode("version = 2\n").unwrap().document;
        assert!(!doc.allow().deep_scan().value);
    }

    #[test]
    fn component_flags_default_to_false() {
        let doc = decode("version = 3\n[[components]]\nname = \"a\"\nin = [\"a\"]\n")
            .unwrap()
            .document;
        let a = doc.component("a").unwrap();
        assert!(!a.any_project_deps().value);
        assert!(!a.any_vendor_deps().value);
        assert!(a.can_use().is_empty());
    }

    #[test]
    fn syntax_error_is_hard_error() {
        let err = decode("version = 3\n[[components]\n").unwrap_err();
        match err {
            DecodeError::Syntax { reference, .. } => assert!(reference.is_valid()),
            DecodeError::Io { .. } => panic!("expected syntax error"),
        }
    }

    #[test]
    fn shape_error_yields_notice_and_empty_document() {
        let decoded = decode("version = 3\n[[components]]\nname = \"a\"\n").unwrap();
        assert_eq!(decoded.notices.len(), 1);
        assert!(decoded.notices[0].message.contains("in"));
        assert!(decoded.document.components().is_empty());
        assert_eq!(decoded.document.version().value, 0);
    }

    #[test]
    fn every_shape_error_gets_its_own_notice() {
        let src = r#"version = 3
workdir = 7

[[components]]
name = "a"

[[components]]
name = "b"
in = ["b"]

[[components]]
name = "c"

[[vendors]]
name = "v"
"#;
        let decoded = decode(src).unwrap();
        let found: Vec<(usize, bool)> = decoded
            .notices
            .iter()
            .map(|n| (n.reference.line, n.message.contains("missing field `in`")))
            .collect();
        assert_eq!(
            found,
            vec![(2, false), (4, true), (11, true), (14, true)]
        );
        assert!(decoded.document.components().is_empty());
    }

    #[test]
    fn missing_version_is_reported_with_other_errors() {
        let decoded = decode("workdir = \"x\"\nlayers = []\n").unwrap();
        assert_eq!(decoded.notices.len(), 2);
        assert!(decoded.notices[0].message.contains("version"));
        assert_eq!(decoded.notices[1].reference.line, 2);
    }

    #[test]
    fn unknown_key_yields_notice() {
        let decoded = decode("version = 3\nlayers = []\n").unwrap();
        assert_eq!(decoded.notices.len(), 1);
        assert_eq!(decoded.notices[0].reference.line, 2);
    }

    #[test]
    fn wrong_type_yields_notice_at_value() {
        let decoded = decode("version = 3\nworkdir = 7\n").unwrap();
        assert_eq!(decoded.notices.len(), 1);
        assert_eq!(decoded.notices[0].reference.line, 2);
    }

    #[test]
    fn version_gated_key_yields_notice() {
        let decoded = decode("version = 1\n[allow]\ndeep-scan = true\n").unwrap();
        assert_eq!(decoded.notices.len(), 1);
        assert_eq!(decoded.notices[0].reference.line, 3);
    }

    #[test]
    fn decode_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("archgate.toml");
        fs::write(&path, DOC).unwrap();

        let decoded = Decoder::new().decode(&path).unwrap();
        assert_eq!(decoded.document.path(), path);
        assert_eq!(decoded.document.components().len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = Decoder::new()
            .decode(&tmp.path().join("missing.toml"))
            .unwrap_err();
        assert!(matches!(err, DecodeError::Io { .. }));
    }
}
