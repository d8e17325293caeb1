//! Version-gated schema checks.
//!
//! The serde shape is shared by all versions; keys introduced by a later
//! version are rejected here when the document declares an older one.
//! Unsupported versions are left to the validator.

use super::config_dto::DocumentDto;
use super::source_map::SourceMap;
use crate::types::Notice;

/// Schema versions this crate understands.
pub const SUPPORTED_VERSIONS: &[i64] = &[1, 2, 3];

/// First version accepting `deep-scan`.
pub const DEEP_SCAN_SINCE: i64 = 3;

/// Returns true if `version` is one of [`SUPPORTED_VERSIONS`].
#[must_use]
pub fn is_supported(version: i64) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}

/// Whether `allow.deep-scan` defaults to on for `version`.
#[must_use]
pub fn deep_scan_default(version: i64) -> bool {
    version >= DEEP_SCAN_SINCE
}

/// Reports keys not available in the declared version.
#[must_use]
pub fn check(dto: &DocumentDto, map: &SourceMap<'_>) -> Vec<Notice> {
    let version = *dto.version.get_ref();
    if !is_supported(version) || version >= DEEP_SCAN_SINCE {
        return Vec::new();
    }

    let misuse = |span| {
        Notice::new(
            format!(
                "'deep-scan' requires schema version {DEEP_SCAN_SINCE} or later, document declares version {version}"
            ),
            map.span_reference(&span),
        )
    };

    let mut notices = Vec::new();
    if let Some(flag) = dto.allow.as_ref().and_then(|a| a.deep_scan.as_ref()) {
        notices.push(misuse(flag.span()));
    }
    for component in &dto.components {
        if let Some(flag) = &component.deep_scan {
            notices.push(misuse(flag.span()));
        }
    }
    notices
}
