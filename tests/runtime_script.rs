//! Runtime-init script generation tests

mod fixtures;

use fixtures::{change_mode, Project};
use wasmlane::mock::{MockToolchains, SECONDARY_PAYLOAD};
use wasmlane::{BuilderSet, ModeKind, Orchestrator, OrchestratorError, ToolchainFamily};

#[test]
fn test_generation_is_idempotent() {
    let project = Project::with_entry();
    let builders = project.builders();
    let mut orchestrator = project.orchestrator(&builders, &MockToolchains::new());

    for token in ["L", "M", "S"] {
        change_mode(&mut orchestrator, token);
        let first = orchestrator.generate_runtime_init_script().unwrap();
        let second = orchestrator.generate_runtime_init_script().unwrap();
        assert_eq!(first, second, "mode {}", token);
    }
}

#[test]
fn test_cache_isolation_across_modes() {
    let project = Project::with_entry();
    let builders = project.builders();
    let toolchains = MockToolchains::new();
    let mut orchestrator = project.orchestrator(&builders, &toolchains);

    change_mode(&mut orchestrator, "L");
    let original = orchestrator.generate_runtime_init_script().unwrap();

    change_mode(&mut orchestrator, "M");
    toolchains.set_payload(ToolchainFamily::Standard, "runtime.wasmExit(); // patched");
    orchestrator.generate_runtime_init_script().unwrap();

    change_mode(&mut orchestrator, "L");
    assert_eq!(orchestrator.generate_runtime_init_script().unwrap(), original);

    orchestrator.clear_cache();
    let refreshed = orchestrator.generate_runtime_init_script().unwrap();
    assert_ne!(refreshed, original);
    assert!(refreshed.contains("// patched"));
}

#[test]
fn test_header_encodes_current_mode() {
    let project = Project::with_entry();
    let builders = project.builders();
    let mut orchestrator = project.orchestrator(&builders, &MockToolchains::new());

    for kind in ModeKind::ALL {
        let token = orchestrator.registry().token(kind).to_string();
        change_mode(&mut orchestrator, &token);
        let script = orchestrator.generate_runtime_init_script().unwrap();
        assert_eq!(script.lines().next().unwrap(), format!("// wasmlane: mode={}", token));
    }
}

#[test]
fn test_payload_follows_family() {
    let project = Project::with_entry();
    let builders = project.builders();
    let mut orchestrator = project.orchestrator(&builders, &MockToolchains::new());

    let large = orchestrator.generate_runtime_init_script().unwrap();
    assert!(large.contains("runtime.wasmExit"));
    assert!(!large.contains("wasi_snapshot_preview1"));

    change_mode(&mut orchestrator, "S");
    let small = orchestrator.generate_runtime_init_script().unwrap();
    assert!(small.contains("wasi_snapshot_preview1"));
    assert!(!small.contains("runtime.wasmExit"));
}

#[test]
fn test_output_is_normalized() {
    let project = Project::with_entry();
    let builders = project.builders();
    let mut orchestrator = project.orchestrator(&builders, &MockToolchains::new());

    let script = orchestrator.generate_runtime_init_script().unwrap();
    assert!(!script.contains('\r'));
    assert!(script.ends_with('\n'));
    assert!(!script.ends_with("\n\n"));
    assert!(script.lines().all(|line| line == line.trim_end()));
}

#[test]
fn test_glue_code_names_builder_output() {
    let mut project = Project::with_entry();
    project.config.output_name = "app".to_string();
    let builders = project.builders();
    let mut orchestrator = project.orchestrator(&builders, &MockToolchains::new());

    let script = orchestrator.generate_runtime_init_script().unwrap();
    assert!(script.contains("fetch(\"app.wasm\")"));
}

#[test]
fn test_missing_builder_is_not_initialized() {
    let project = Project::with_entry();
    let builders = project.builders();
    let set = BuilderSet::new().with(ModeKind::Large, builders.large.clone());
    let mut orchestrator = Orchestrator::new(
        project.root(),
        project.config.clone(),
        set,
        Box::new(MockToolchains::new()),
    )
    .unwrap();

    let report = {
        let mut reports = Vec::new();
        orchestrator.change_mode("M", |p| reports.push(p));
        reports.remove(0)
    };
    assert!(matches!(
        report.cause,
        Some(OrchestratorError::NotInitialized { mode: ModeKind::Medium })
    ));
    assert_eq!(orchestrator.current_mode(), "L");
    assert!(builders.journal.entries().is_empty());

    let script = orchestrator.generate_runtime_init_script().unwrap();
    assert!(script.starts_with("// wasmlane: mode=L\n"));
}

#[test]
fn test_empty_builder_table_is_not_initialized() {
    let project = Project::with_entry();
    let mut orchestrator = Orchestrator::new(
        project.root(),
        project.config.clone(),
        BuilderSet::new(),
        Box::new(MockToolchains::new()),
    )
    .unwrap();

    let err = orchestrator.generate_runtime_init_script().unwrap_err();
    assert!(matches!(err, OrchestratorError::NotInitialized { .. }));
}

#[test]
fn test_write_init_script_replaces_artifact() {
    let project = Project::with_entry();
    let builders = project.builders();
    let mut orchestrator = project.orchestrator(&builders, &MockToolchains::new());

    project.write_artifact("stale\n");
    let path = orchestrator.write_init_script().unwrap().unwrap();
    assert_eq!(path, project.artifact_path());
    let content = project.read_artifact().unwrap();
    assert!(content.starts_with("// wasmlane: mode=L\n"));
}

#[test]
fn test_secondary_artifact_round_trips_through_cache() {
    let project = Project::empty();
    project.write_artifact(&format!("// wasmlane: mode=M\n{}", SECONDARY_PAYLOAD));
    let builders = project.builders();
    let mut orchestrator = project.orchestrator(&builders, &MockToolchains::new());

    let script = orchestrator.generate_runtime_init_script().unwrap();
    assert!(script.starts_with("// wasmlane: mode=M\n"));
    assert_eq!(orchestrator.cached_scripts(), 1);
}
