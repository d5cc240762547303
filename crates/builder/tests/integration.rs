//! Integration tests for the build-strategy orchestrator
//!
//! Subprocess invocations are scripted through a recording runner, so the
//! pipelines run end to end without npm, yarn, or docker installed.

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use actpack_builder::compiler::{Compiler, DefaultBundler};
use actpack_builder::package_manager::detect;
use actpack_builder::{build_action, BuildRequest, CommandResult, CommandRunner, PackageManager};
use actpack_config::BuilderConfig;
use actpack_errors::{BuildError, Error, Result};
use actpack_manifest::Manifest;
use tempfile::tempdir;

/// Records every command line; optionally fails commands containing a
/// marker substring.
#[derive(Default)]
struct ScriptedRunner {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl ScriptedRunner {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn failing_on(marker: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(marker.to_string()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call_index(&self, marker: &str) -> Option<usize> {
        self.calls().iter().position(|call| call.contains(marker))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> Result<CommandResult> {
        let line = if args.is_empty() {
            program.to_string()
        } else {
            format!("{program} {}", args.join(" "))
        };
        self.calls.lock().unwrap().push(line.clone());

        if let Some(marker) = &self.fail_on {
            if line.contains(marker.as_str()) {
                return Ok(CommandResult {
                    success: false,
                    exit_code: Some(1),
                    stdout: String::new(),
                    stderr: "scripted failure".to_string(),
                });
            }
        }

        Ok(CommandResult {
            success: true,
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

fn request(dir: &Path, config: BuilderConfig) -> BuildRequest {
    BuildRequest {
        workdir: dir.to_path_buf(),
        config,
        publish: false,
    }
}

// --- package manager detection ---

#[test]
fn detect_selects_npm_for_package_lock() {
    let temp = tempdir().unwrap();
    write(temp.path(), "package-lock.json", "{}");

    let manager = detect(temp.path(), ScriptedRunner::new()).unwrap();
    assert_eq!(manager.name(), "npm");
    assert_eq!(manager.lockfile(), "package-lock.json");
}

#[test]
fn detect_selects_yarn_for_yarn_lock() {
    let temp = tempdir().unwrap();
    write(temp.path(), "yarn.lock", "");

    let manager = detect(temp.path(), ScriptedRunner::new()).unwrap();
    assert_eq!(manager.name(), "yarn");
}

#[test]
fn detect_fails_on_both_lockfiles() {
    let temp = tempdir().unwrap();
    write(temp.path(), "package-lock.json", "{}");
    write(temp.path(), "yarn.lock", "");

    let err = detect(temp.path(), ScriptedRunner::new()).err().unwrap();
    assert!(matches!(
        err,
        Error::Build(BuildError::DuplicateLockfiles { .. })
    ));
}

#[test]
fn detect_fails_on_no_lockfile() {
    let temp = tempdir().unwrap();
    let err = detect(temp.path(), ScriptedRunner::new()).err().unwrap();
    assert!(matches!(err, Error::Build(BuildError::NoLockfile { .. })));
}

// --- compiler conventions ---

#[tokio::test]
async fn default_bundler_output_path_is_deterministic() {
    let temp = tempdir().unwrap();
    write(temp.path(), "package-lock.json", "{}");
    write(temp.path(), "package.json", "{}");

    let runner = ScriptedRunner::new();
    let manager: Arc<dyn PackageManager> =
        Arc::from(detect(temp.path(), runner.clone()).unwrap());
    let bundler = DefaultBundler::new(manager);

    let compiled = bundler.compile("src/main.ts").await.unwrap();
    assert_eq!(compiled, "dist/src/main.ts/index.js");
    assert!(runner
        .calls()
        .contains(&"npx ncc build -o dist/src/main.ts src/main.ts".to_string()));

    // Same input, same output path.
    assert_eq!(bundler.compile("src/main.ts").await.unwrap(), compiled);
}

// --- script build strategy ---

#[tokio::test]
async fn yarn_end_to_end_build_rewrites_main() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "action.yml",
        "name: x\ndescription: d\nruns:\n  using: node-script\n  main: index.ts\n",
    );
    write(temp.path(), "yarn.lock", "");
    write(temp.path(), "package.json", "{}");

    let runner = ScriptedRunner::new();
    let manifest = build_action(request(temp.path(), BuilderConfig::default()), runner.clone())
        .await
        .unwrap();

    let calls = runner.calls();
    assert!(calls.contains(&"npm install -g @zeit/ncc".to_string()));
    assert!(calls.contains(&"yarn install --frozen-lockfile --non-interactive".to_string()));
    assert!(calls.contains(&"yarn run ncc build -o dist/index.ts index.ts".to_string()));

    let runs = manifest.script_runs().unwrap();
    assert_eq!(runs.main.as_deref(), Some("dist/index.ts/index.js"));
    assert!(runs.pre.is_none());
    assert!(runs.post.is_none());

    // The rewritten manifest was persisted.
    let (reloaded, _) = Manifest::load(temp.path()).await.unwrap();
    assert_eq!(
        reloaded.script_runs().unwrap().main.as_deref(),
        Some("dist/index.ts/index.js")
    );
}

#[tokio::test]
async fn already_built_entrypoints_are_not_recompiled() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "action.yml",
        "name: x\ndescription: d\nruns:\n  using: node-script\n  main: dist/index.ts/index.js\n",
    );
    write(temp.path(), "yarn.lock", "");
    std::fs::create_dir(temp.path().join("node_modules")).unwrap();

    let (before, _) = Manifest::load(temp.path()).await.unwrap();

    let runner = ScriptedRunner::new();
    let manifest = build_action(request(temp.path(), BuilderConfig::default()), runner.clone())
        .await
        .unwrap();

    assert_eq!(manifest, before);
    let calls = runner.calls();
    assert!(!calls.iter().any(|call| call.contains("ncc build")));
    assert!(!calls.iter().any(|call| call.contains("yarn install")));
}

#[tokio::test]
async fn failing_pre_aborts_after_all_entrypoints_ran() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "action.yml",
        "name: x\ndescription: d\nruns:\n  using: node-script\n  main: main.ts\n  pre: pre.ts\n  post: post.ts\n",
    );
    write(temp.path(), "yarn.lock", "");
    write(temp.path(), "package.json", "{}");

    let runner = ScriptedRunner::failing_on("dist/pre.ts");
    let err = build_action(request(temp.path(), BuilderConfig::default()), runner.clone())
        .await
        .unwrap_err();

    // The pre failure is the one reported.
    assert!(matches!(
        err,
        Error::Build(BuildError::SubprocessFailed { ref command, exit_code: 1 })
            if command.contains("dist/pre.ts")
    ));

    // Wait-for-all: the sibling compilations were not cancelled.
    let calls = runner.calls();
    assert!(calls.iter().any(|call| call.contains("dist/main.ts")));
    assert!(calls.iter().any(|call| call.contains("dist/post.ts")));

    // The manifest was not persisted with partial results.
    let (reloaded, _) = Manifest::load(temp.path()).await.unwrap();
    let runs = reloaded.script_runs().unwrap();
    assert_eq!(runs.main.as_deref(), Some("main.ts"));
    assert_eq!(runs.pre.as_deref(), Some("pre.ts"));
    assert_eq!(runs.post.as_deref(), Some("post.ts"));
}

#[tokio::test]
async fn missing_main_is_fatal() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "action.yml",
        "name: x\ndescription: d\nruns:\n  using: node-script\n  post: post.ts\n",
    );
    write(temp.path(), "yarn.lock", "");
    write(temp.path(), "package.json", "{}");

    let runner = ScriptedRunner::new();
    let err = build_action(request(temp.path(), BuilderConfig::default()), runner.clone())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::MissingMainEntrypoint)
    ));
    assert!(!runner.calls().iter().any(|call| call.contains("ncc build")));
}

#[tokio::test]
async fn custom_build_command_overrides_the_default_chain() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "action.yml",
        "name: x\ndescription: d\nruns:\n  using: node-script\n  main: index.ts\n",
    );
    write(temp.path(), "package-lock.json", "{}");
    write(temp.path(), "package.json", "{}");

    let config = BuilderConfig::default()
        .with_js_build_command("tsc --build {entry}")
        .with_js_built_path("out/{entry}.js");

    let runner = ScriptedRunner::new();
    let manifest = build_action(request(temp.path(), config), runner.clone())
        .await
        .unwrap();

    assert!(runner
        .calls()
        .contains(&"npx tsc --build index.ts".to_string()));
    assert!(!runner.calls().iter().any(|call| call.contains("ncc build -o dist/")));
    assert_eq!(
        manifest.script_runs().unwrap().main.as_deref(),
        Some("out/index.ts.js")
    );
}

#[tokio::test]
async fn ttypescript_dependency_inserts_the_transpile_stage() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "action.yml",
        "name: x\ndescription: d\nruns:\n  using: node-script\n  main: index.ts\n",
    );
    write(temp.path(), "yarn.lock", "");
    write(
        temp.path(),
        "package.json",
        r#"{"devDependencies": {"ttypescript": "^1.5.0"}}"#,
    );

    let runner = ScriptedRunner::new();
    let manifest = build_action(request(temp.path(), BuilderConfig::default()), runner.clone())
        .await
        .unwrap();

    let calls = runner.calls();
    assert!(calls.contains(&"yarn run ttsc --outDir ttsc-dist index.ts".to_string()));
    assert!(calls.contains(&"yarn run ncc build -o dist/ttsc-dist/index.ts ttsc-dist/index.ts".to_string()));
    assert_eq!(
        manifest.script_runs().unwrap().main.as_deref(),
        Some("dist/ttsc-dist/index.ts/index.js")
    );
}

// --- container build strategy ---

#[tokio::test]
async fn container_build_rewrites_image_and_push_skips_login() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "action.yml",
        "name: x\ndescription: d\nruns:\n  using: container\n  image: Dockerfile\n",
    );

    let config = BuilderConfig::default()
        .with_image_repo_tag("org/app:v1")
        .with_docker_build_command("docker build -t {repotag} .");

    let runner = ScriptedRunner::new();
    let mut req = request(temp.path(), config);
    req.publish = true;
    let manifest = build_action(req, runner.clone()).await.unwrap();

    let calls = runner.calls();
    assert!(calls.contains(&"docker build -t org/app:v1 .".to_string()));
    assert!(calls.contains(&"docker push org/app:v1".to_string()));
    assert!(!calls.iter().any(|call| call.contains("docker login")));
    assert_eq!(manifest.container_runs().unwrap().image, "org/app:v1");
}

#[tokio::test]
async fn container_push_logs_in_when_a_registry_is_configured() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "action.yml",
        "name: x\ndescription: d\nruns:\n  using: container\n  image: Dockerfile\n",
    );

    let config = BuilderConfig::default()
        .with_image_repo_tag("ghcr.io/org/app:v1")
        .with_docker_build_command("docker build -t {repotag} .")
        .with_docker_registry("ghcr.io")
        .with_docker_login_user("octocat")
        .with_docker_login_token("token123");

    let runner = ScriptedRunner::new();
    let mut req = request(temp.path(), config);
    req.publish = true;
    build_action(req, runner.clone()).await.unwrap();

    let login = runner.call_index("docker login ghcr.io -u octocat -p token123");
    let push = runner.call_index("docker push ghcr.io/org/app:v1");
    assert!(login.is_some());
    assert!(push.is_some());
    assert!(login < push);
}

#[tokio::test]
async fn container_build_without_tag_fails() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "action.yml",
        "name: x\ndescription: d\nruns:\n  using: container\n  image: Dockerfile\n",
    );

    let runner = ScriptedRunner::new();
    let err = build_action(request(temp.path(), BuilderConfig::default()), runner.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Build(BuildError::MissingImageTag)));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn failed_image_build_surfaces_as_image_build_failed() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "action.yml",
        "name: x\ndescription: d\nruns:\n  using: container\n  image: Dockerfile\n",
    );

    let config = BuilderConfig::default()
        .with_image_repo_tag("org/app:v1")
        .with_docker_build_command("docker build -t {repotag} .");

    let runner = ScriptedRunner::failing_on("docker build");
    let err = build_action(request(temp.path(), config), runner.clone())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::ImageBuildFailed { .. })
    ));

    // Nothing was persisted: the image reference is untouched on disk.
    let (reloaded, _) = Manifest::load(temp.path()).await.unwrap();
    assert_eq!(reloaded.container_runs().unwrap().image, "Dockerfile");
}
