//! Version string synchronizer.
//!
//! The canonical version lives in the manifest's `"version": "…"` field.
//! [`sync_version`] copies it into source files through a table of
//! [`VersionRule`]s; supporting a new kind of marker means adding a row to
//! [`DEFAULT_RULES`], not new code.

use std::fmt;
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::{source_err, SyncError};
use crate::writer::{write_if_changed, WriteResult};

/// Placeholder shown when the manifest version cannot be determined.
pub const UNKNOWN_VERSION: &str = "<unknown>";

const MANIFEST_PATTERN: &str = r#""version"\s*:\s*"([\w.\-]+)""#;

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Result of reading the manifest version. Never an error: failures become
/// [`ManifestVersion::Unknown`] with the reason attached.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestVersion {
    Found(String),
    Unknown { reason: String },
}

impl ManifestVersion {
    /// The version, or [`UNKNOWN_VERSION`].
    pub fn as_str(&self) -> &str {
        match self {
            ManifestVersion::Found(v) => v.as_str(),
            ManifestVersion::Unknown { .. } => UNKNOWN_VERSION,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ManifestVersion::Found(_))
    }
}

impl fmt::Display for ManifestVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the quoted `version` field from the manifest text.
///
/// Only the first `"version": "…"` occurrence matters; the rest of the file
/// is not parsed.
pub fn read_version(manifest: &Path) -> ManifestVersion {
    let content = match fs::read_to_string(manifest) {
        Ok(content) => content,
        Err(e) => {
            return ManifestVersion::Unknown {
                reason: format!("cannot read {}: {e}", manifest.display()),
            }
        }
    };
    match manifest_regex().and_then(|re| {
        re.captures(&content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }) {
        Some(version) => ManifestVersion::Found(version),
        None => ManifestVersion::Unknown {
            reason: format!("no version field in {}", manifest.display()),
        },
    }
}

fn manifest_regex() -> Option<Regex> {
    Regex::new(MANIFEST_PATTERN).ok()
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// One substitution: `pattern` finds an existing version occurrence and
/// `template` replaces it. In the template, `{version}` is the new version and
/// `${1}`, `${2}` … refer to capture groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRule {
    pub pattern: &'static str,
    pub template: &'static str,
}

pub const DEFAULT_RULES: &[VersionRule] = &[
    // public val version = "1.2.3"
    VersionRule {
        pattern: r#"(?m)^(public\s*val\s*version\s*=\s*)"[^"\n]*""#,
        template: r#"${1}"{version}""#,
    },
    // <span id="version">1.2.3</span>
    VersionRule {
        pattern: r#"(<span\s+id="version">)[^<\n]*(</span>)"#,
        template: "${1}{version}${2}",
    },
    // pub const VERSION: &str = "1.2.3";
    VersionRule {
        pattern: r#"(?m)^(\s*pub\s+const\s+VERSION\s*:\s*&str\s*=\s*)"[^"\n]*""#,
        template: r#"${1}"{version}""#,
    },
];

impl VersionRule {
    /// Apply to the first match in `content`. Returns `content` unchanged when
    /// the pattern does not occur.
    pub fn apply(&self, content: &str, version: &str) -> Result<String, SyncError> {
        let re = Regex::new(self.pattern).map_err(|source| SyncError::Pattern {
            pattern: self.pattern.to_string(),
            source,
        })?;
        // `$` in the version must not be read as a group reference.
        let replacement = self.template.replace("{version}", &version.replace('$', "$$"));
        Ok(re.replace(content, replacement.as_str()).into_owned())
    }
}

/// Apply every rule in turn.
pub fn apply_rules(content: &str, version: &str, rules: &[VersionRule]) -> Result<String, SyncError> {
    rules
        .iter()
        .try_fold(content.to_string(), |acc, rule| rule.apply(&acc, version))
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// Rewrite version markers in `target` using [`DEFAULT_RULES`].
pub fn sync_version(target: &Path, version: &str) -> Result<WriteResult, SyncError> {
    sync_version_with(target, version, DEFAULT_RULES)
}

/// Rewrite version markers in `target` using `rules`. The file is written only
/// if the content changes.
pub fn sync_version_with(
    target: &Path,
    version: &str,
    rules: &[VersionRule],
) -> Result<WriteResult, SyncError> {
    let original = fs::read_to_string(target).map_err(|e| source_err(target, e))?;
    let updated = apply_rules(&original, version, rules)?;

    let result = write_if_changed(target, &updated)?;
    if result.is_written() {
        tracing::info!(
            "updating version string in '{}' to '{}'",
            target.display(),
            version
        );
    } else {
        tracing::debug!("version already current in '{}'", target.display());
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[rstest]
    #[case(r#"{ "name": "madoko", "version": "1.1.2" }"#, "1.1.2")]
    #[case("{\n  \"version\" :\n \"0.9.0-beta\"\n}", "0.9.0-beta")]
    #[case(r#"{"version":"2.0","other":{"version":"9.9"}}"#, "2.0")]
    fn reads_first_version_field(#[case] manifest: &str, #[case] expected: &str) {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "package.json", manifest);
        assert_eq!(read_version(&path), ManifestVersion::Found(expected.into()));
    }

    #[rstest]
    #[case(r#"{ "name": "madoko" }"#)]
    #[case(r#"{ "version": 3 }"#)]
    #[case("")]
    fn unparseable_manifest_is_unknown(#[case] manifest: &str) {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "package.json", manifest);
        let version = read_version(&path);
        assert!(!version.is_known());
        assert_eq!(version.as_str(), UNKNOWN_VERSION);
    }

    #[test]
    fn missing_manifest_is_unknown() {
        let dir = TempDir::new().unwrap();
        let version = read_version(&dir.path().join("package.json"));
        assert_eq!(version.to_string(), "<unknown>");
        match version {
            ManifestVersion::Unknown { reason } => assert!(reason.contains("package.json")),
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    #[test]
    fn declared_constant_rule() {
        let src = "module version\n\npublic val version = \"0.1.0\"\npublic val other = \"x\"\n";
        let out = apply_rules(src, "1.2.3", DEFAULT_RULES).unwrap();
        assert!(out.contains("public val version = \"1.2.3\""));
        assert!(out.contains("public val other = \"x\""));
    }

    #[test]
    fn declared_constant_must_start_a_line() {
        let src = "// public val version = \"0.1.0\"\n";
        assert_eq!(apply_rules(src, "1.2.3", DEFAULT_RULES).unwrap(), src);
    }

    #[test]
    fn inline_marker_rule() {
        let src = r#"<p>Madoko <span id="version">0.1</span> ready</p>"#;
        let out = apply_rules(src, "1.2.3", DEFAULT_RULES).unwrap();
        assert_eq!(out, r#"<p>Madoko <span id="version">1.2.3</span> ready</p>"#);
    }

    #[test]
    fn rust_constant_rule() {
        let src = "pub const VERSION: &str = \"0.0.1\";\n";
        let out = apply_rules(src, "0.2.0", DEFAULT_RULES).unwrap();
        assert_eq!(out, "pub const VERSION: &str = \"0.2.0\";\n");
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let src = "<span id=\"version\">a</span><span id=\"version\">b</span>";
        let out = apply_rules(src, "9", DEFAULT_RULES).unwrap();
        assert_eq!(out, "<span id=\"version\">9</span><span id=\"version\">b</span>");
    }

    #[test]
    fn dollar_in_version_is_literal() {
        let src = "<span id=\"version\">a</span>";
        let out = apply_rules(src, "1$2", DEFAULT_RULES).unwrap();
        assert_eq!(out, "<span id=\"version\">1$2</span>");
    }

    #[test]
    fn invalid_rule_pattern_is_an_error() {
        let rules = [VersionRule {
            pattern: "(unclosed",
            template: "{version}",
        }];
        let err = apply_rules("text", "1", &rules).unwrap_err();
        assert!(matches!(err, SyncError::Pattern { .. }));
    }

    #[test]
    fn sync_writes_then_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "version.kk", "public val version = \"0.0.0\"\n");

        let first = sync_version(&path, "1.0.0").unwrap();
        assert!(first.is_written());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "public val version = \"1.0.0\"\n"
        );

        let second = sync_version(&path, "1.0.0").unwrap();
        assert!(matches!(second, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn file_without_markers_is_untouched() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "readme.txt", "nothing to see\n");
        assert!(!sync_version(&path, "1.0.0").unwrap().is_written());
    }

    #[test]
    fn missing_target_is_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = sync_version(&dir.path().join("version.kk"), "1.0.0").unwrap_err();
        assert!(matches!(err, SyncError::MissingSource { .. }));
    }
}
