//! End-to-end hot reload with real Rhai scripts on disk
//!
//! These tests cover:
//! - Project discovery from a nested directory
//! - Mirroring the script tree into a separate runtime directory
//! - Freezing on a script error and recovering after a fix
//! - Keeping the previous bindings when mirroring fails
//! - Change detection through the file watcher

mod common;

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use common::RecordingRenderer;
use hotplay_engine::rhai::RhaiRuntime;
use hotplay_engine::{
    DrawOutcome, EngineState, FrameInfo, LiveEngine, ModuleId, ReloadPlan, ScriptError,
    SourceLayout, UpdateOutcome, MARKER_FILE,
};
use tempfile::TempDir;

const GAME: &str = r#"
import "util/palette" as palette;

fn Initialize() {
    this.ticks = 0;
}

fn LoadContent() {
    this.title = "hello";
}

fn Update(frame) {
    this.ticks += 1;
}

fn Draw(frame, canvas) {
    canvas.clear(palette::background());
    canvas.text(`${this.title} ${this.ticks}`, 0, 0);
}
"#;

const PALETTE: &str = r#"
fn background() {
    rgb(100, 149, 237)
}
"#;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A project with a marker file and the demo game scripts
fn create_project(marker: &str) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write(&temp_dir.path().join(MARKER_FILE), marker);
    write(&temp_dir.path().join("game/game.rhai"), GAME);
    write(&temp_dir.path().join("game/util/palette.rhai"), PALETTE);
    temp_dir
}

fn start_engine(project: &Path) -> LiveEngine {
    let (layout, config) = SourceLayout::discover(project).expect("project is discoverable");
    let runtime = RhaiRuntime::new(layout.runtime_dir(), config.scripts.extension.clone());
    LiveEngine::new(layout, &config, Box::new(runtime)).expect("engine starts")
}

#[test]
fn test_rhai_game_runs_and_draws() {
    let project = create_project("[scripts]\nwatch = false\n");
    let mut engine = start_engine(&project.path().join("game/util"));

    assert_eq!(engine.init(), EngineState::Running);
    assert_eq!(engine.load_content(), EngineState::Running);

    let frame = FrameInfo::default();
    assert_eq!(engine.update(&frame), UpdateOutcome::Forwarded);
    assert_eq!(engine.update(&frame), UpdateOutcome::Forwarded);

    let mut renderer = RecordingRenderer::default();
    assert_eq!(engine.draw(&frame, &mut renderer), DrawOutcome::Forwarded);
    assert_eq!(
        renderer.calls,
        vec!["clear 100,149,237", "begin", "text hello 2", "end"]
    );
}

#[test]
fn test_script_error_round_trip() {
    let project = create_project("[scripts]\nwatch = false\n");
    let game_path = project.path().join("game/game.rhai");
    let mut engine = start_engine(project.path());
    let sender = engine.change_sender();
    engine.init();
    engine.load_content();

    let frame = FrameInfo::default();
    write(
        &game_path,
        &GAME.replace("this.ticks += 1;", "throw \"boom\";"),
    );
    sender.module_changed(ModuleId::new("game"));

    assert_eq!(engine.update(&frame), UpdateOutcome::Reloaded);
    assert_eq!(engine.update(&frame), UpdateOutcome::Failed);
    assert_eq!(engine.update(&frame), UpdateOutcome::Frozen);

    let mut renderer = RecordingRenderer::default();
    assert_eq!(engine.draw(&frame, &mut renderer), DrawOutcome::Diagnostic);
    assert!(renderer.text().contains("boom"));

    // State written before the bug survives the fix
    write(&game_path, GAME);
    sender.module_changed(ModuleId::new("game"));
    assert_eq!(engine.update(&frame), UpdateOutcome::Reloaded);
    assert_eq!(engine.state(), EngineState::Running);
    assert_eq!(engine.update(&frame), UpdateOutcome::Forwarded);

    let mut renderer = RecordingRenderer::default();
    engine.draw(&frame, &mut renderer);
    assert_eq!(renderer.text(), "hello 1");
}

#[test]
fn test_syntax_error_in_imported_module() {
    let project = create_project("[scripts]\nwatch = false\n");
    let mut engine = start_engine(project.path());
    engine.init();

    write(
        &project.path().join("game/util/palette.rhai"),
        "fn background( {",
    );
    engine.request_reload();

    assert_eq!(engine.update(&FrameInfo::default()), UpdateOutcome::Reloaded);
    assert_eq!(engine.state(), EngineState::ErrorFrozen);
    let text = engine.diagnostic_lines().join("\n");
    assert!(text.contains("game"), "{text}");
}

#[test]
fn test_mirrored_runtime_dir_is_regenerated() {
    let project = create_project("[scripts]\nwatch = false\nruntime_dir = \"build/game\"\n");
    let runtime_dir = project.path().join("build/game");
    write(&runtime_dir.join("stale.rhai"), "// left over");

    let mut engine = start_engine(project.path());
    assert!(engine.layout().mirroring_enabled());
    assert_eq!(engine.init(), EngineState::Running);

    assert!(!runtime_dir.join("stale.rhai").exists());
    assert_eq!(
        fs::read_to_string(runtime_dir.join("util/palette.rhai")).unwrap(),
        PALETTE
    );

    // Every reload is full while mirroring
    write(&project.path().join("game/util/palette.rhai"), PALETTE);
    engine
        .change_sender()
        .module_changed(ModuleId::new("util/palette"));
    assert_eq!(engine.update(&FrameInfo::default()), UpdateOutcome::Reloaded);
    let report = engine.last_report().unwrap();
    assert_eq!(report.plan, ReloadPlan::Full);
    assert_eq!(
        report.reloaded,
        vec![ModuleId::new("util/palette"), ModuleId::new("game")]
    );
}

#[test]
fn test_incremental_import_change_reaches_root() {
    let project = create_project("[scripts]\nwatch = false\n");
    let mut engine = start_engine(project.path());
    engine.init();

    write(
        &project.path().join("game/util/palette.rhai"),
        &PALETTE.replace("rgb(100, 149, 237)", "rgb(0, 0, 0)"),
    );
    engine
        .change_sender()
        .module_changed(ModuleId::new("util/palette"));

    let frame = FrameInfo::default();
    assert_eq!(engine.update(&frame), UpdateOutcome::Reloaded);
    let report = engine.last_report().unwrap();
    assert_eq!(report.plan, ReloadPlan::Incremental);
    assert_eq!(report.reloaded, vec![ModuleId::new("util/palette")]);

    let mut renderer = RecordingRenderer::default();
    assert_eq!(engine.draw(&frame, &mut renderer), DrawOutcome::Forwarded);
    assert_eq!(renderer.calls[0], "clear 0,0,0");
}

#[test]
fn test_failed_mirror_keeps_bindings_and_carries_batch() {
    let project = create_project("[scripts]\nwatch = false\nruntime_dir = \"build/game\"\n");
    let mut engine = start_engine(project.path());
    assert_eq!(engine.init(), EngineState::Running);
    let bound_before: Vec<_> = engine
        .bindings()
        .symbols()
        .into_iter()
        .map(|(role, symbol)| (role, symbol.map(str::to_string)))
        .collect();

    // Nothing left to copy into the runtime directory
    fs::remove_dir_all(project.path().join("game")).unwrap();
    engine.change_sender().module_changed(ModuleId::new("game"));

    assert_eq!(engine.update(&FrameInfo::default()), UpdateOutcome::Reloaded);
    assert!(matches!(engine.error(), Some(ScriptError::Mirror(_))));
    assert_eq!(engine.state(), EngineState::ErrorFrozen);

    let report = engine.last_report().unwrap();
    assert_eq!(report.plan, ReloadPlan::Full);
    assert!(!report.success);
    assert!(report.reloaded.is_empty());

    let carried: Vec<_> = engine.pending().carried().cloned().collect();
    assert_eq!(carried, vec![ModuleId::new("game")]);

    let bound_after: Vec<_> = engine
        .bindings()
        .symbols()
        .into_iter()
        .map(|(role, symbol)| (role, symbol.map(str::to_string)))
        .collect();
    assert_eq!(bound_after, bound_before);
    assert!(bound_after.iter().all(|(_, symbol)| symbol.is_some()));
}

#[test]
fn test_watcher_detects_file_changes() {
    let project = create_project("");
    let mut engine = start_engine(project.path());
    assert!(engine.is_watching());
    assert_eq!(engine.init(), EngineState::Running);

    // Give the watcher a moment to settle before editing
    thread::sleep(Duration::from_millis(200));
    write(
        &project.path().join("game/game.rhai"),
        &GAME.replace("this.ticks += 1;", "this.ticks += 100;"),
    );

    let frame = FrameInfo::default();
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut reloaded = false;
    while Instant::now() < deadline {
        if engine.update(&frame) == UpdateOutcome::Reloaded {
            reloaded = true;
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }
    assert!(reloaded, "watcher should report the edit");
    assert_eq!(engine.state(), EngineState::Running);

    engine.shutdown();
    assert!(!engine.is_watching());
}
