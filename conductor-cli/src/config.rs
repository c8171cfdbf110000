//! Project configuration loaded from `conductor.yaml`.
//!
//! Every field has a default, so an absent file or a partial file is valid.
//! Paths are relative to the working directory the tool runs in.

use std::path::{Path, PathBuf};

use conductor_runner::{passthrough, CommandInvocation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed YAML — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Output name passed to the compiler.
    pub main: String,
    /// Entry module compiled by `build`.
    pub main_cli: String,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub style_dir: PathBuf,
    pub contrib_dir: PathBuf,
    /// File holding the canonical `"version"` field.
    pub manifest: PathBuf,
    /// File whose version markers `build` keeps in sync; defaults to
    /// `<source_dir>/version.kk`.
    pub version_file: Option<PathBuf>,
    pub compiler: CompilerConfig,
    pub test: TestConfig,
    /// Files under `contrib_dir` copied into the output after a build.
    pub contrib_files: Vec<PathBuf>,
    /// Extra generated paths removed by `clean`.
    pub clean_extra: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Compiler checkout; the library lives in `<dir>/lib`.
    pub dir: PathBuf,
    /// Executable, relative to `dir`.
    pub exe: PathBuf,
    /// Environment variable whose value is appended to compiler commands.
    pub flags_env: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub command: String,
    /// Environment variable whose value is appended to the test command.
    pub flags_env: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            main: "madoko".into(),
            main_cli: "main".into(),
            source_dir: "src".into(),
            output_dir: "lib".into(),
            style_dir: "styles".into(),
            contrib_dir: "contrib".into(),
            manifest: "package.json".into(),
            version_file: None,
            compiler: CompilerConfig::default(),
            test: TestConfig::default(),
            contrib_files: vec!["monarch/monarch.js".into()],
            clean_extra: vec!["doc/out".into(), "web/client/lib".into()],
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dir: "../koka-0.6".into(),
            exe: "out/release/koka-0.6.0-dev".into(),
            flags_env: "kokaFlags".into(),
        }
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            command: "node test".into(),
            flags_env: "testFlags".into(),
        }
    }
}

impl ProjectConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    pub fn version_file(&self) -> PathBuf {
        self.version_file
            .clone()
            .unwrap_or_else(|| self.source_dir.join("version.kk"))
    }

    /// `<output_dir><suffix>`, e.g. `libnet` for the .NET build.
    pub fn output_variant(&self, suffix: &str) -> PathBuf {
        let mut name = self.output_dir.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Shared compiler prefix: include paths, pass-through flags, output
    /// options. Callers append mode-specific arguments.
    pub fn compiler_invocation(&self) -> CommandInvocation {
        let exe = self.compiler.dir.join(&self.compiler.exe);
        let library = self.compiler.dir.join("lib");
        CommandInvocation::new(format!(
            "{} -i{} -i{}",
            exe.display(),
            self.source_dir.display(),
            library.display()
        ))
        .append_flags(&passthrough(&self.compiler.flags_env))
    }

    /// Compiler prefix for a build writing into `output_dir`.
    pub fn compile_invocation(&self) -> CommandInvocation {
        self.compiler_invocation().arg(format!(
            "-c -o{} --outname={}",
            self.output_dir.display(),
            self.main
        ))
    }

    pub fn test_invocation(&self) -> CommandInvocation {
        CommandInvocation::new(self.test.command.clone())
            .append_flags(&passthrough(&self.test.flags_env))
    }
}
