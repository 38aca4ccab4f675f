/// Integration tests for sortwise
///
/// These tests drive whole plan/apply/revert/clean cycles on real
/// temporary folders, the way the command-line front-end does.
///
/// Test categories:
/// 1. Plan and apply
/// 2. Name collisions
/// 3. Revert and its skip rules
/// 4. Cleanup
/// 5. Saved plans and the command line
use clap::Parser;
use sortwise::cli::{Cli, run_cli};
use sortwise::journal::{JOURNAL_FILE_NAME, Journal};
use sortwise::logging::{Level, MemorySink};
use sortwise::{
    ClassificationEntry, Config, MovePlan, Organizer, PlanAction, RevertOutcome, apply_plan,
    build_plan, clean_artifacts, prune_empty_folders, revert,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary folder to organize.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn create_text_file(&self, name: &str, content: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    fn create_subdir(&self, name: &str) {
        fs::create_dir_all(self.path().join(name)).expect("Failed to create subdirectory");
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Path should not exist: {}", path.display());
    }

    /// Every file and directory under the folder, relative to it.
    fn snapshot(&self) -> BTreeSet<PathBuf> {
        fn walk(root: &Path, dir: &Path, out: &mut BTreeSet<PathBuf>) {
            for entry in fs::read_dir(dir).expect("Failed to read directory").flatten() {
                let path = entry.path();
                out.insert(path.strip_prefix(root).expect("Outside root").to_path_buf());
                if path.is_dir() {
                    walk(root, &path, out);
                }
            }
        }
        let mut out = BTreeSet::new();
        walk(self.path(), self.path(), &mut out);
        out
    }

    fn journal(&self) -> Journal {
        Journal::load(self.path())
            .expect("Failed to read journal")
            .expect("Journal should exist")
    }
}

fn classified(pairs: &[(&str, &str)]) -> Vec<ClassificationEntry> {
    pairs
        .iter()
        .map(|(name, category)| ClassificationEntry::new(*name, *category))
        .collect()
}

fn plan_and_apply(fixture: &TestFixture, pairs: &[(&str, &str)], sink: &MemorySink) {
    let plan = build_plan(fixture.path(), &classified(pairs), true, sink);
    apply_plan(fixture.path(), &plan, sink).expect("Apply failed");
}

// ============================================================================
// 1. Plan and apply
// ============================================================================

#[test]
fn test_plan_and_apply_two_categories() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    fixture.create_text_file("b.pdf", "beta");
    let sink = MemorySink::new();

    let plan = build_plan(
        fixture.path(),
        &classified(&[("a.txt", "Docs"), ("b.pdf", "Docs")]),
        true,
        &sink,
    );
    assert_eq!(plan.counts().moves, 2);
    fixture.assert_not_exists("Docs");

    let report = apply_plan(fixture.path(), &plan, &sink).expect("Apply failed");

    assert_eq!(report.moved.len(), 2);
    fixture.assert_file_exists("Docs/a.txt");
    fixture.assert_file_exists("Docs/b.pdf");
    fixture.assert_not_exists("a.txt");
    fixture.assert_not_exists("b.pdf");

    let journal = fixture.journal();
    assert_eq!(journal.len(), 2);
    assert_eq!(journal.entries[0].source, fixture.path().join("a.txt"));
    assert_eq!(journal.entries[0].destination, fixture.path().join("Docs/a.txt"));
    assert_eq!(journal.entries[1].source, fixture.path().join("b.pdf"));
    assert_eq!(journal.entries[1].destination, fixture.path().join("Docs/b.pdf"));
}

#[test]
fn test_skip_and_missing_entries_move_nothing() {
    let fixture = TestFixture::new();
    fixture.create_text_file("keep.txt", "stay");
    let sink = MemorySink::new();

    let plan = build_plan(
        fixture.path(),
        &classified(&[("keep.txt", "SKIP"), ("gone.txt", "Docs")]),
        true,
        &sink,
    );
    assert_eq!(plan.entries()[0].action, PlanAction::Skip);
    assert_eq!(plan.entries()[1].action, PlanAction::Missing);

    let report = apply_plan(fixture.path(), &plan, &sink).expect("Apply failed");

    assert!(report.moved.is_empty());
    fixture.assert_file_exists("keep.txt");
    fixture.assert_not_exists("Docs");
    assert!(fixture.journal().is_empty());
}

#[test]
fn test_file_removed_between_preview_and_apply() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    fixture.create_text_file("b.txt", "beta");
    let sink = MemorySink::new();

    let plan = build_plan(
        fixture.path(),
        &classified(&[("a.txt", "Docs"), ("b.txt", "Docs")]),
        true,
        &sink,
    );
    fs::remove_file(fixture.path().join("a.txt")).expect("Failed to remove file");

    let report = apply_plan(fixture.path(), &plan, &sink).expect("Apply failed");

    assert_eq!(report.not_found, vec!["a.txt".to_string()]);
    assert_eq!(report.moved.len(), 1);
    assert_eq!(fixture.journal().len(), 1);
    assert!(sink.contains(Level::Info, "File not found to move: 'a.txt'"));
}

#[test]
fn test_escaping_names_never_leave_the_folder() {
    let fixture = TestFixture::new();
    fixture.create_subdir("inner");
    fixture.create_text_file("inner/a.txt", "alpha");
    let inner = fixture.path().join("inner");
    let sink = MemorySink::new();

    let plan = build_plan(
        &inner,
        &classified(&[("a.txt", "../Escaped"), ("../a.txt", "Docs")]),
        true,
        &sink,
    );
    apply_plan(&inner, &plan, &sink).expect("Apply failed");

    fixture.assert_not_exists("Escaped");
    fixture.assert_file_exists("inner/a.txt");
}

// ============================================================================
// 2. Name collisions
// ============================================================================

#[test]
fn test_collision_gets_numbered_suffix() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Docs/a.txt", "existing");
    fixture.create_text_file("a.txt", "incoming");
    let sink = MemorySink::new();

    let plan = build_plan(fixture.path(), &classified(&[("a.txt", "Docs")]), true, &sink);
    assert_eq!(
        plan.entries()[0].destination,
        Some(fixture.path().join("Docs").join("a (1).txt"))
    );

    apply_plan(fixture.path(), &plan, &sink).expect("Apply failed");

    assert_eq!(fixture.read("Docs/a.txt"), "existing");
    assert_eq!(fixture.read("Docs/a (1).txt"), "incoming");
    assert_eq!(
        fixture.journal().entries[0].destination,
        fixture.path().join("Docs").join("a (1).txt")
    );
}

#[test]
fn test_collision_arising_after_preview_is_resolved_at_apply() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "incoming");
    let sink = MemorySink::new();

    let plan = build_plan(fixture.path(), &classified(&[("a.txt", "Docs")]), true, &sink);
    fixture.create_text_file("Docs/a.txt", "arrived later");

    apply_plan(fixture.path(), &plan, &sink).expect("Apply failed");

    assert_eq!(fixture.read("Docs/a.txt"), "arrived later");
    assert_eq!(fixture.read("Docs/a (1).txt"), "incoming");
}

#[test]
fn test_many_collisions_keep_counting() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Docs/a.txt", "0");
    fixture.create_text_file("Docs/a (1).txt", "1");
    fixture.create_text_file("Docs/a (2).txt", "2");
    fixture.create_text_file("a.txt", "new");
    let sink = MemorySink::new();

    plan_and_apply(&fixture, &[("a.txt", "Docs")], &sink);

    assert_eq!(fixture.read("Docs/a (3).txt"), "new");
}

// ============================================================================
// 3. Revert
// ============================================================================

#[test]
fn test_round_trip_restores_original_tree() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    fixture.create_text_file("b.jpg", "beta");
    fixture.create_text_file("c.mp4", "gamma");
    fixture.create_text_file("Existing/note.txt", "untouched");
    let before = fixture.snapshot();
    let sink = MemorySink::new();

    plan_and_apply(
        &fixture,
        &[("a.txt", "Documents"), ("b.jpg", "Pictures"), ("c.mp4", "Videos")],
        &sink,
    );
    let report = revert(fixture.path(), &sink).expect("Revert failed");

    assert_eq!(report.outcome, RevertOutcome::Reverted);
    assert_eq!(report.restored, 3);
    assert!(report.is_complete_success());

    let mut after = fixture.snapshot();
    assert!(after.remove(Path::new(JOURNAL_FILE_NAME)));
    assert_eq!(after, before);
    assert!(fixture.journal().is_empty());
    assert_eq!(fixture.read("a.txt"), "alpha");
}

#[test]
fn test_revert_skips_missing_destination() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    fixture.create_text_file("b.txt", "beta");
    let sink = MemorySink::new();

    plan_and_apply(&fixture, &[("a.txt", "Docs"), ("b.txt", "Docs")], &sink);
    fs::remove_file(fixture.path().join("Docs/a.txt")).expect("Failed to remove file");

    let report = revert(fixture.path(), &sink).expect("Revert failed");

    assert_eq!(report.restored, 1);
    assert_eq!(report.skipped_missing.len(), 1);
    fixture.assert_file_exists("b.txt");
    fixture.assert_not_exists("a.txt");
    assert!(sink.contains(Level::Warn, "Could not find file"));
    assert!(fixture.journal().is_empty());
}

#[test]
fn test_revert_never_overwrites_reoccupied_source() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "original");
    let sink = MemorySink::new();

    plan_and_apply(&fixture, &[("a.txt", "Docs")], &sink);
    fixture.create_text_file("a.txt", "newcomer");

    let report = revert(fixture.path(), &sink).expect("Revert failed");

    assert_eq!(report.skipped_conflict.len(), 1);
    assert_eq!(fixture.read("a.txt"), "newcomer");
    assert_eq!(fixture.read("Docs/a.txt"), "original");
    assert!(sink.contains(Level::Warn, "will not be overwritten"));
    assert!(fixture.journal().is_empty());
}

#[test]
fn test_revert_without_journal_is_a_no_op() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    fixture.create_subdir("Empty");
    let before = fixture.snapshot();
    let sink = MemorySink::new();

    let report = revert(fixture.path(), &sink).expect("Revert failed");

    assert_eq!(report.outcome, RevertOutcome::NoJournal);
    assert_eq!(fixture.snapshot(), before);
}

#[test]
fn test_second_revert_is_a_no_op() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    let sink = MemorySink::new();

    plan_and_apply(&fixture, &[("a.txt", "Docs")], &sink);
    revert(fixture.path(), &sink).expect("First revert failed");
    let report = revert(fixture.path(), &sink).expect("Second revert failed");

    assert_eq!(report.outcome, RevertOutcome::EmptyJournal);
    fixture.assert_file_exists("a.txt");
}

#[test]
fn test_journal_named_by_classifier_stays_put() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    let sink = MemorySink::new();

    plan_and_apply(&fixture, &[("a.txt", "Docs")], &sink);
    revert(fixture.path(), &sink).expect("First revert failed");

    plan_and_apply(
        &fixture,
        &[(JOURNAL_FILE_NAME, "Docs"), ("a.txt", "Docs")],
        &sink,
    );
    fixture.assert_file_exists(JOURNAL_FILE_NAME);
    fixture.assert_not_exists(&format!("Docs/{}", JOURNAL_FILE_NAME));

    let report = revert(fixture.path(), &sink).expect("Second revert failed");

    assert!(report.is_complete_success());
    assert_eq!(report.restored, 1);
    fixture.assert_file_exists("a.txt");
    fixture.assert_not_exists("Docs");
}

#[test]
fn test_revert_uses_only_the_latest_apply() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    fixture.create_text_file("b.txt", "beta");
    let sink = MemorySink::new();

    plan_and_apply(&fixture, &[("a.txt", "Docs")], &sink);
    plan_and_apply(&fixture, &[("b.txt", "Notes")], &sink);
    revert(fixture.path(), &sink).expect("Revert failed");

    fixture.assert_file_exists("b.txt");
    fixture.assert_file_exists("Docs/a.txt");
    fixture.assert_not_exists("Notes");
}

// ============================================================================
// 4. Cleanup
// ============================================================================

#[test]
fn test_prune_is_idempotent_and_spares_non_empty_folders() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Empty1");
    fixture.create_subdir("Empty2");
    fixture.create_text_file("Full/keep.txt", "x");
    let sink = MemorySink::new();

    let first = prune_empty_folders(fixture.path(), &sink);
    let second = prune_empty_folders(fixture.path(), &sink);

    assert_eq!(first.len(), 2);
    assert!(second.is_empty());
    fixture.assert_not_exists("Empty1");
    fixture.assert_file_exists("Full/keep.txt");
}

#[test]
fn test_clean_after_apply_keeps_moved_files() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    fixture.create_subdir("Unused");
    let sink = MemorySink::new();

    plan_and_apply(&fixture, &[("a.txt", "Docs")], &sink);
    let report = clean_artifacts(fixture.path(), true, true, &sink).expect("Clean failed");

    assert!(report.journal_deleted);
    assert_eq!(report.pruned_folders, vec![fixture.path().join("Unused")]);
    fixture.assert_not_exists(JOURNAL_FILE_NAME);
    fixture.assert_file_exists("Docs/a.txt");

    let outcome = revert(fixture.path(), &sink).expect("Revert failed").outcome;
    assert_eq!(outcome, RevertOutcome::NoJournal);
}

// ============================================================================
// 5. Saved plans, organizer and the command line
// ============================================================================

#[test]
fn test_saved_plan_applies_later() {
    let fixture = TestFixture::new();
    let plans = TempDir::new().expect("Failed to create temp directory");
    fixture.create_text_file("a.txt", "alpha");
    let sink = MemorySink::new();

    let plan = build_plan(fixture.path(), &classified(&[("a.txt", "Docs")]), true, &sink);
    let plan_path = plans.path().join("plan.json");
    plan.save(&plan_path).expect("Failed to save plan");

    let loaded = MovePlan::load(&plan_path).expect("Failed to load plan");
    apply_plan(fixture.path(), &loaded, &sink).expect("Apply failed");

    fixture.assert_file_exists("Docs/a.txt");
}

#[test]
fn test_empty_classification_changes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    let before = fixture.snapshot();
    let sink = MemorySink::new();

    let organizer = Organizer::from_config(&Config::default()).expect("Bad config");
    let classifier = |_: &sortwise::ClassificationRequest,
                      _: &dyn sortwise::LogSink|
     -> Vec<ClassificationEntry> { Vec::new() };
    let report = organizer
        .organize(fixture.path(), &classifier, &sink)
        .expect("Organize failed");

    assert!(report.moved.is_empty());
    assert_eq!(fixture.snapshot(), before);
}

/// Writes a config and a model response outside the organized folder.
fn cli_inputs(response: &str) -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = dir.path().join("config.toml");
    fs::write(&config, "[organizer]\nallow_skip = true\n").expect("Failed to write config");
    let response_path = dir.path().join("response.json");
    fs::write(&response_path, response).expect("Failed to write response");
    (dir, config, response_path)
}

fn cli(args: &[&str]) -> Result<(), String> {
    let mut argv = vec!["sortwise"];
    argv.extend_from_slice(args);
    run_cli(Cli::try_parse_from(argv).map_err(|e| e.to_string())?)
}

#[test]
fn test_cli_preview_apply_revert_cycle() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    fixture.create_text_file("photo.jpg", "beta");
    fixture.create_text_file("keep.md", "gamma");
    let (inputs, config, response) = cli_inputs(
        "```json\n{\"files\": [\
         {\"filename\": \"a.txt\", \"category\": \"Documents\"},\
         {\"filename\": \"photo.jpg\", \"category\": \"Pictures\"},\
         {\"filename\": \"keep.md\", \"category\": \"SKIP\"}]}\n```",
    );
    let folder = fixture.path().to_str().expect("Non UTF-8 temp path");
    let config = config.to_str().expect("Non UTF-8 temp path");
    let response = response.to_str().expect("Non UTF-8 temp path");
    let plan_path = inputs.path().join("plan.json");
    let plan = plan_path.to_str().expect("Non UTF-8 temp path");

    cli(&["-c", config, "preview", folder, "--from", response, "--save-plan", plan])
        .expect("Preview failed");
    fixture.assert_file_exists("a.txt");
    fixture.assert_not_exists(JOURNAL_FILE_NAME);

    cli(&["-c", config, "apply", folder, "--plan", plan]).expect("Apply failed");
    fixture.assert_file_exists("Documents/a.txt");
    fixture.assert_file_exists("Pictures/photo.jpg");
    fixture.assert_file_exists("keep.md");

    cli(&["-c", config, "revert", folder]).expect("Revert failed");
    fixture.assert_file_exists("a.txt");
    fixture.assert_file_exists("photo.jpg");
    fixture.assert_not_exists("Documents");
    fixture.assert_not_exists("Pictures");

    cli(&["-c", config, "clean", folder]).expect("Clean failed");
    fixture.assert_not_exists(JOURNAL_FILE_NAME);
}

#[test]
fn test_cli_apply_from_response() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.txt", "alpha");
    let (_inputs, config, response) =
        cli_inputs("[{\"filename\": \"a.txt\", \"category\": \"Documents\"}]");

    cli(&[
        "-c",
        config.to_str().expect("Non UTF-8 temp path"),
        "apply",
        fixture.path().to_str().expect("Non UTF-8 temp path"),
        "--from",
        response.to_str().expect("Non UTF-8 temp path"),
    ])
    .expect("Apply failed");

    fixture.assert_file_exists("Documents/a.txt");
    assert_eq!(fixture.journal().len(), 1);
}

#[test]
fn test_cli_rejects_missing_folder() {
    let (_inputs, config, response) = cli_inputs("[]");

    let result = cli(&[
        "-c",
        config.to_str().expect("Non UTF-8 temp path"),
        "preview",
        "/non/existent/folder",
        "--from",
        response.to_str().expect("Non UTF-8 temp path"),
    ]);

    assert!(result.is_err());
}
