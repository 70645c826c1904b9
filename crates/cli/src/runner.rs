use crate::tap::Tap;
use std::path::{Path, PathBuf};
/// Conformance suite runner.
///
/// Convention:
///   positive/   -- *.yaml, *.yml or *.json documents that compile without errors
///   negative/   -- the same, each with a sibling *.expected file listing the
///                  diagnostic codes produced, one per line, in order
use wiregen_core::{compile_source, CompileOptions, FileSystemProvider, Model};

pub struct RunResult {
    pub failed: usize,
}

pub fn run_suite(suite_dir: &Path, quiet: bool) -> RunResult {
    let mut tap = Tap::new(quiet);

    run_positive_tests(suite_dir, &mut tap);
    run_negative_tests(suite_dir, &mut tap);

    let failed = tap.failure_count();
    tap.finish();

    RunResult { failed }
}

fn run_positive_tests(suite_dir: &Path, tap: &mut Tap) {
    let dir = suite_dir.join("positive");
    if !dir.exists() {
        return;
    }
    for path in glob_documents(&dir) {
        let test_name = format!("positive/{}", file_name(&path));
        match compile(&path) {
            Ok(model) if !model.has_errors() => tap.ok(&test_name),
            Ok(model) => tap.not_ok(
                &test_name,
                format!("unexpected errors:\n{}", render_diagnostics(&model)),
            ),
            Err(e) => tap.not_ok(&test_name, e),
        }
    }
}

fn run_negative_tests(suite_dir: &Path, tap: &mut Tap) {
    let dir = suite_dir.join("negative");
    if !dir.exists() {
        return;
    }
    for path in glob_documents(&dir) {
        let test_name = format!("negative/{}", file_name(&path));
        let expected_path = path.with_extension("expected");
        if !expected_path.exists() {
            tap.not_ok(
                &test_name,
                format!("missing expected file: {}", expected_path.display()),
            );
            continue;
        }
        run_negative_test(&path, &expected_path, &test_name, tap);
    }
}

fn run_negative_test(path: &Path, expected_path: &Path, test_name: &str, tap: &mut Tap) {
    let expected = match read_expected_codes(expected_path) {
        Ok(codes) => codes,
        Err(e) => {
            tap.not_ok(test_name, format!("failed to read expected file: {}", e));
            return;
        }
    };

    let model = match compile(path) {
        Ok(model) => model,
        Err(e) => {
            tap.not_ok(test_name, e);
            return;
        }
    };

    let got: Vec<String> = model
        .diagnostics
        .iter()
        .map(|d| d.code.as_str().to_owned())
        .collect();
    if !model.has_errors() {
        tap.not_ok(test_name, "expected errors but compilation succeeded");
    } else if got == expected {
        tap.ok(test_name);
    } else {
        tap.not_ok(
            test_name,
            format!(
                "diagnostic mismatch:\n--- expected\n{}\n+++ got\n{}",
                expected.join("\n"),
                got.join("\n")
            ),
        );
    }
}

// -- Helpers --

fn compile(path: &Path) -> Result<Model, String> {
    compile_source(&FileSystemProvider, path, &CompileOptions::default()).map_err(|e| e.to_string())
}

fn glob_documents(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml" | "yml" | "json")
            ) {
                results.push(path);
            }
        }
    }
    results.sort();
    results
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn read_expected_codes(path: &Path) -> Result<Vec<String>, String> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Ok(src
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_owned)
        .collect())
}

fn render_diagnostics(model: &Model) -> String {
    model
        .diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_files_skip_blank_and_comment_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.expected");
        std::fs::write(&path, "# header\nUnknownKey\n\n  UnresolvedClass  \n").unwrap();
        assert_eq!(
            read_expected_codes(&path).unwrap(),
            vec!["UnknownKey".to_owned(), "UnresolvedClass".to_owned()]
        );
    }

    #[test]
    fn documents_are_sorted_and_filtered_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.yaml", "a.json", "c.expected", "d.txt", "e.yml"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let names: Vec<String> = glob_documents(dir.path())
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["a.json", "b.yaml", "e.yml"]);
    }
}
