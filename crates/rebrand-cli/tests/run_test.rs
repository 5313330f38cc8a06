//! End-to-end runs of the built-in catalog over temporary source trees

use rebrand_cli::output::write_json_report;
use rebrand_cli::process::{run, FileError, RunOptions, RunReport};
use rebrand_core::RuleSet;
use rebrand_rules::{Catalog, Category};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".css", ".scss", ".md", ".html"];

fn all_rules() -> RuleSet {
    Catalog::builtin().unwrap().rules_for(&Category::ALL)
}

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

/// A small tree resembling the editor's browser sources
fn fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "src/react/SelectionHelper.tsx",
        br#"import { VoidSwitch } from '../util/inputs.js';
import { VOID_OPEN_SETTINGS_ACTION_ID } from '../voidSettingsPane.js';

export const VoidSelectionHelper = ({ rerenderKey }: VoidSelectionHelperProps) => {
	const voidSettingsService = accessor.get('IVoidSettingsService');
	return <div className="@@void-scope bg-void-bg-2">
		<VoidSwitch value={true} />
	</div>;
};
"#,
    );
    write(
        temp.path(),
        "src/styles/theme.css",
        b".void-tooltip-top { color: var(--void-bg-1); }\n",
    );
    write(temp.path(), "README.md", b"Welcome to Void\n");
    write(temp.path(), "src/untouched.ts", b"export const answer = 42;\n");
    write(temp.path(), "assets/logo.svg", b"<svg>Void</svg>\n");
    temp
}

fn options(dry_run: bool) -> RunOptions {
    RunOptions {
        dry_run,
        jobs: 2,
        ..Default::default()
    }
}

fn run_all(root: &Path, dry_run: bool) -> RunReport {
    run(&[root], EXTENSIONS, &all_rules(), &options(dry_run)).unwrap()
}

fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<_> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| (e.path().to_path_buf(), fs::read(e.path()).unwrap()))
        .collect();
    files.sort();
    files
}

#[test]
fn test_dry_run_matches_write_run() {
    let dry_tree = fixture();
    let write_tree = fixture();
    let before = snapshot(dry_tree.path());

    let dry = run_all(dry_tree.path(), true);
    let written = run_all(write_tree.path(), false);

    // nothing on disk moved during the dry run
    assert_eq!(snapshot(dry_tree.path()), before);

    assert_eq!(dry.files_scanned, written.files_scanned);
    assert_eq!(dry.files_changed, written.files_changed);
    assert_eq!(dry.total_changes, written.total_changes);
    for (a, b) in dry.results.iter().zip(&written.results) {
        assert_eq!(
            a.path.strip_prefix(dry_tree.path()).unwrap(),
            b.path.strip_prefix(write_tree.path()).unwrap()
        );
        assert_eq!(a.changed, b.changed);
        assert_eq!(a.changes, b.changes);
        assert_eq!(a.final_content, b.final_content);
    }

    for result in written.changed() {
        let on_disk = fs::read_to_string(&result.path).unwrap();
        assert_eq!(Some(on_disk), result.final_content);
    }
}

#[test]
fn test_written_tree_content() {
    let tree = fixture();
    let report = run_all(tree.path(), false);

    assert_eq!(report.files_scanned, 4);
    assert_eq!(report.files_changed, 3);
    assert_eq!(report.errors, 0);

    let tsx = fs::read_to_string(tree.path().join("src/react/SelectionHelper.tsx")).unwrap();
    assert!(tsx.contains("import { PinnacleSwitch } from '../util/inputs.js';"));
    assert!(tsx.contains("import { PINNACLEAI_OPEN_SETTINGS_ACTION_ID } from '../../../actionIDs.js';"));
    assert!(tsx.contains("PinnacleAISelectionHelperProps"));
    assert!(tsx.contains("accessor.get('IPinnacleSettingsService')"));
    assert!(tsx.contains("<PinnacleSwitch value={true} />"));

    let css = fs::read_to_string(tree.path().join("src/styles/theme.css")).unwrap();
    assert_eq!(css, ".pinnacleai-tooltip-top { color: var(--pinnacleai-bg-1); }\n");

    let readme = fs::read_to_string(tree.path().join("README.md")).unwrap();
    assert_eq!(readme, "Welcome to PinnacleAI\n");

    // not on the extension allow-list
    let svg = fs::read_to_string(tree.path().join("assets/logo.svg")).unwrap();
    assert_eq!(svg, "<svg>Void</svg>\n");
}

#[test]
fn test_second_run_changes_nothing() {
    let tree = fixture();
    let first = run_all(tree.path(), false);
    let after_first = snapshot(tree.path());

    let second = run_all(tree.path(), false);

    assert!(first.total_changes > 0);
    assert_eq!(second.files_changed, 0);
    assert_eq!(second.total_changes, 0);
    assert_eq!(snapshot(tree.path()), after_first);
}

#[test]
fn test_one_unreadable_file_does_not_stop_the_run() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.ts", b"mountVoidSelectionHelper();\n");
    write(temp.path(), "b.ts", &[0xff, 0xfe, b'V', b'o', b'i', b'd']);
    write(temp.path(), "c.ts", b"const x = VOID_CTRL_L_ACTION_ID;\n");

    let report = run_all(temp.path(), false);

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.errors, 1);
    assert_eq!(report.files_changed, 2);
    let failed: Vec<_> = report.results.iter().filter(|r| r.has_error()).collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].path.ends_with("b.ts"));
    assert!(matches!(failed[0].error, Some(FileError::Read { .. })));

    assert_eq!(
        fs::read_to_string(temp.path().join("c.ts")).unwrap(),
        "const x = PINNACLEAI_CTRL_L_ACTION_ID;\n"
    );
}

#[test]
fn test_failed_write_leaves_original_and_siblings_are_written() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.ts", b"mountVoidSelectionHelper();\n");
    write(temp.path(), "b.ts", b"const x = VOID_CTRL_L_ACTION_ID;\n");
    write(temp.path(), "c.ts", b"mountVoidSelectionHelper();\n");
    // occupies the temp name the writer would use for a.ts
    fs::create_dir(temp.path().join(".a.ts.rebrand.tmp")).unwrap();

    let report = run_all(temp.path(), false);

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.errors, 1);
    assert_eq!(report.files_changed, 2);

    let a = report.results.iter().find(|r| r.path.ends_with("a.ts")).unwrap();
    assert!(matches!(a.error, Some(FileError::Write { .. })));
    assert!(a.changed);
    assert_eq!(
        fs::read_to_string(temp.path().join("a.ts")).unwrap(),
        "mountVoidSelectionHelper();\n"
    );

    assert_eq!(
        fs::read_to_string(temp.path().join("b.ts")).unwrap(),
        "const x = PINNACLEAI_CTRL_L_ACTION_ID;\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("c.ts")).unwrap(),
        "mountPinnacleAiSelectionHelper();\n"
    );
}

#[cfg(unix)]
#[test]
fn test_symlinked_file_root_is_left_alone() {
    let temp = TempDir::new().unwrap();
    let real = write(temp.path(), "real.ts", b"mountVoidSelectionHelper();\n");
    let link = temp.path().join("link.ts");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let report = run(&[&link], EXTENSIONS, &all_rules(), &options(false)).unwrap();

    assert_eq!(report.files_scanned, 0);
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&real).unwrap(), "mountVoidSelectionHelper();\n");
}

#[test]
fn test_discovery_is_deterministic() {
    let tree = fixture();
    let a = run_all(tree.path(), true);
    let b = run(&[tree.path()], EXTENSIONS, &all_rules(), &RunOptions {
        dry_run: true,
        jobs: 1,
        ..Default::default()
    })
    .unwrap();

    let paths = |r: &RunReport| r.results.iter().map(|f| f.path.clone()).collect::<Vec<_>>();
    assert_eq!(paths(&a), paths(&b));

    let mut sorted = paths(&a);
    sorted.sort();
    assert_eq!(paths(&a), sorted);
}

#[test]
fn test_category_selection_and_order() {
    let tree = fixture();
    let catalog = Catalog::builtin().unwrap();
    let rules = catalog.rules_for_names(&["css"]).unwrap();

    let report = run(&[tree.path()], EXTENSIONS, &rules, &options(true)).unwrap();

    assert_eq!(report.categories, vec!["css"]);
    for result in &report.results {
        assert!(result.changes.iter().all(|c| c.category == "css"));
    }
    let readme = report
        .results
        .iter()
        .find(|r| r.path.ends_with("README.md"))
        .unwrap();
    assert!(!readme.changed);
}

#[test]
fn test_excluded_paths_are_skipped() {
    let tree = fixture();
    let opts = RunOptions {
        exclude: vec!["styles/".to_string(), "*.md".to_string()],
        ..options(false)
    };

    let report = run(&[tree.path()], EXTENSIONS, &all_rules(), &opts).unwrap();

    assert_eq!(report.files_scanned, 2);
    let css = fs::read_to_string(tree.path().join("src/styles/theme.css")).unwrap();
    assert!(css.contains("void-tooltip-top"));
}

#[test]
fn test_missing_root_is_reported() {
    let tree = fixture();
    let gone = tree.path().join("nope");

    let report = run(
        &[tree.path().to_path_buf(), gone.clone()],
        EXTENSIONS,
        &all_rules(),
        &options(true),
    )
    .unwrap();

    assert_eq!(report.missing, vec![gone]);
    assert_eq!(report.files_scanned, 4);
}

#[test]
fn test_json_report_file() {
    let tree = fixture();
    let report = run_all(tree.path(), true);
    let report_path = tree.path().join("report.json");

    write_json_report(&report, &report_path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(value["files_scanned"], 4);
    assert_eq!(value["dry_run"], true);
    assert_eq!(value["categories"][0], "css");
    let results = value["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    let total: usize = results
        .iter()
        .map(|r| r["changes"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, report.total_changes);
    let first_change = results
        .iter()
        .flat_map(|r| r["changes"].as_array().unwrap())
        .next()
        .unwrap();
    assert!(first_change["rule_id"].is_string());
    assert!(first_change["offset"].is_u64());
}
