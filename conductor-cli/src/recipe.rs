//! The project's build tasks.
//!
//! ```text
//! default      → build
//! build[cs]    compile (interactive), then install cli.js and contrib files
//! interactive  start the compiler's interpreter on a module
//! config       npm install, unless node_modules exists
//! copystyles   copy CSL locales and styles into the styles dir
//! clean        remove generated output
//! test[--x]    → build, then run the test command (captured)
//! help, ?      usage and this listing
//! ```

use std::path::Path;
use std::sync::{Arc, OnceLock};

use conductor_core::{Action, BoxError, Completion, RegisterError, TaskOptions, TaskRegistry};
use conductor_runner::CommandInvocation;
use conductor_sync::{
    copy_into, copy_rebased, make_dirs, read_version, remove_tree, sync_version, ManifestVersion,
    SyncError, WriteResult,
};
use tracing::{info, warn};

use crate::config::ProjectConfig;

pub const USAGE: &str = "usage: conductor target[options]\n  <options>        are target specific, like test[--extra].\n";

/// Build a registry holding every project task.
pub fn build_registry(config: Arc<ProjectConfig>) -> Result<TaskRegistry, RegisterError> {
    let help_text = Arc::new(OnceLock::new());
    let mut registry = TaskRegistry::new();
    register(&mut registry, config, help_text.clone())?;
    let _ = help_text.set(format!("{USAGE}{}", registry.describe()));
    Ok(registry)
}

fn register(
    registry: &mut TaskRegistry,
    config: Arc<ProjectConfig>,
    help_text: Arc<OnceLock<String>>,
) -> Result<(), RegisterError> {
    let none: [&str; 0] = [];

    registry.register("default", ["build"], Action::noop(), TaskOptions::new())?;

    registry.register(
        "build",
        none,
        build_action(config.clone()),
        TaskOptions::new().description(format!(
            "build {}.\n  build[cs] # generate .NET binary.",
            config.main
        )),
    )?;

    let cfg = config.clone();
    registry.register(
        "interactive",
        none,
        Action::deferred(move |args, done| {
            let module = args
                .first()
                .filter(|m| !m.is_empty())
                .map(String::as_str)
                .unwrap_or(&cfg.main_cli);
            let invocation = cfg
                .compiler_invocation()
                .arg(format!("-e -p {module}"))
                .interactive();
            spawn_command(invocation, done, |_| Ok(()));
            Ok(())
        }),
        TaskOptions::new().description(format!("interactive {}.", config.main)),
    )?;

    registry.register(
        "config",
        none,
        Action::deferred(|_, done| {
            if Path::new("node_modules").exists() {
                done.complete();
            } else {
                spawn_command(
                    CommandInvocation::new("npm install 2>&1").interactive(),
                    done,
                    |_| Ok(()),
                );
            }
            Ok(())
        }),
        TaskOptions::new().description("run 'npm install' to install prerequisites."),
    )?;

    let cfg = config.clone();
    registry.register(
        "copystyles",
        none,
        Action::sync(move |_| copy_styles(&cfg)),
        TaskOptions::new().description("install local styles"),
    )?;

    let cfg = config.clone();
    registry.register(
        "clean",
        none,
        Action::sync(move |_| clean(&cfg)),
        TaskOptions::new().description("remove all generated files."),
    )?;

    let cfg = config;
    registry.register(
        "test",
        ["build"],
        Action::deferred(move |args, done| {
            let extra: Vec<&str> = args
                .iter()
                .map(String::as_str)
                .filter(|a| a.starts_with("--"))
                .collect();
            let invocation = cfg.test_invocation().arg(extra.join(" ")).captured();
            spawn_command(invocation, done, |_| Ok(()));
            Ok(())
        }),
        TaskOptions::new().description("run tests.\n  test[--extra]    # run tests for extensions."),
    )?;

    registry.register(
        "help",
        none,
        Action::sync(move |_| {
            print!("{}", help_text.get().map(String::as_str).unwrap_or(USAGE));
            Ok(())
        }),
        TaskOptions::new().description("show this information"),
    )?;
    registry.register("?", ["help"], Action::noop(), TaskOptions::new())?;

    Ok(())
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

fn build_action(config: Arc<ProjectConfig>) -> Action {
    Action::deferred(move |args, done| {
        let cs = args.first().is_some_and(|a| !a.is_empty());
        make_dirs(&config.output_dir)?;
        fix_version(&config)?;

        let target = if cs {
            format!("--target=cs -o{}", config.output_variant("net").display())
        } else {
            String::new()
        };
        let invocation = config
            .compile_invocation()
            .arg("-v")
            .arg(target)
            .arg(&config.main_cli)
            .interactive();

        let cfg = config.clone();
        spawn_command(invocation, done, move |_| install_outputs(&cfg));
        Ok(())
    })
}

/// Sync the version file from the manifest.
fn fix_version(config: &ProjectConfig) -> Result<WriteResult, SyncError> {
    let version = read_version(&config.manifest);
    if let ManifestVersion::Unknown { reason } = &version {
        warn!("version unknown: {reason}");
    }
    sync_version(&config.version_file(), version.as_str())
}

/// Copy the CLI entry script and contrib files into the output dir.
fn install_outputs(config: &ProjectConfig) -> Result<(), BoxError> {
    copy_into(&config.source_dir.join("cli.js"), &config.output_dir)?;
    for contrib in &config.contrib_files {
        copy_into(&config.contrib_dir.join(contrib), &config.output_dir)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// copystyles / clean
// ---------------------------------------------------------------------------

fn copy_styles(config: &ProjectConfig) -> Result<(), BoxError> {
    let csl_root = config.contrib_dir.join("csl");
    for (subdir, pattern) in [("locales", "*.xml"), ("csl", "*.csl")] {
        make_dirs(&config.style_dir.join(subdir))?;
        let files = glob_files(&csl_root.join(subdir).join(pattern))?;
        let copied = copy_rebased(&csl_root, &files, &config.style_dir)?;
        info!("copied {} {subdir} file(s) to {}", copied.len(), config.style_dir.display());
    }
    Ok(())
}

fn glob_files(pattern: &Path) -> Result<Vec<std::path::PathBuf>, BoxError> {
    let mut files: Vec<_> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn clean(config: &ProjectConfig) -> Result<(), BoxError> {
    info!("remove all generated files");
    let generated = [
        config.output_dir.clone(),
        config.output_variant("net"),
        config.output_variant("doc"),
    ];
    for path in generated.iter().chain(config.clean_extra.iter()) {
        remove_tree(path)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Run `invocation` off the plan's control flow and signal `done` when it
/// exits. `then` runs only after a successful exit.
fn spawn_command<F>(invocation: CommandInvocation, done: Completion, then: F)
where
    F: FnOnce(&conductor_runner::ExitResult) -> Result<(), BoxError> + Send + 'static,
{
    info!("> {}", invocation.command);
    tokio::spawn(async move {
        let result = match invocation.execute().await {
            Ok(exit) => then(&exit),
            Err(e) => Err(BoxError::from(e)),
        };
        done.finish(result);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_core::plan;

    fn registry() -> TaskRegistry {
        build_registry(Arc::new(ProjectConfig::default())).expect("registry")
    }

    #[test]
    fn registers_all_tasks() {
        let reg = registry();
        for name in [
            "default",
            "build",
            "interactive",
            "config",
            "copystyles",
            "clean",
            "test",
            "help",
            "?",
        ] {
            assert!(reg.contains(name), "missing task {name}");
        }
    }

    #[test]
    fn command_tasks_are_async() {
        let reg = registry();
        for name in ["build", "interactive", "config", "test"] {
            assert!(reg.get(name).unwrap().is_async(), "{name} should be async");
        }
        for name in ["clean", "copystyles", "help"] {
            assert!(!reg.get(name).unwrap().is_async(), "{name} should be sync");
        }
    }

    #[test]
    fn test_depends_on_build() {
        let reg = registry();
        assert_eq!(plan(&reg, "test").unwrap().tasks(), ["build", "test"]);
        assert_eq!(plan(&reg, "default").unwrap().tasks(), ["build", "default"]);
        assert_eq!(plan(&reg, "?").unwrap().tasks(), ["help", "?"]);
    }

    #[test]
    fn listing_mentions_variants() {
        let text = registry().describe();
        assert!(text.contains("build[cs] # generate .NET binary."));
        assert!(text.contains("test[--extra]"));
        assert!(!text.lines().any(|l| l.starts_with("default")));
    }
}
