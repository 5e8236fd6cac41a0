//! Integration tests for the codesum scan → dispatch → report pipeline.

use std::path::{Path, PathBuf};
use tempfile::tempdir;

use codesum_indexer::dispatcher::Dispatcher;
use codesum_indexer::report::ReportWriter;
use codesum_indexer::scanner::{last_modified, Scanner};
use codesum_indexer::IndexerError;

/// Helper to create a small C++ project
fn create_test_project(base: &Path) -> PathBuf {
    let project = base.join("test_project");
    std::fs::create_dir_all(project.join("src")).unwrap();
    std::fs::create_dir_all(project.join("include")).unwrap();

    std::fs::write(
        project.join("include/shape.hpp"),
        r#"#include <vector>
#include "point.h"
#define SHAPE_VERSION 2

class Shape {
public:
    virtual double area() const;
};

enum Kind {
    Circle,
    Square,
};
"#,
    )
    .unwrap();

    std::fs::write(
        project.join("src/main.cpp"),
        r#"#include "shape.hpp"

int main(int argc, char **argv) {
    return 0;
}
"#,
    )
    .unwrap();

    std::fs::write(
        project.join("include/point.h"),
        "struct Point {\n    int x;\n    int y;\n};\n",
    )
    .unwrap();

    std::fs::write(project.join("README.md"), "# Shapes\n").unwrap();

    project
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap()
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}

/// Test full scan pipeline end-to-end
#[tokio::test]
async fn test_scan_dispatch_report_end_to_end() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());

    let files = Scanner::new().source_files(&project).unwrap();
    assert_eq!(files.len(), 3, "README.md must be filtered out");

    let outcomes = Dispatcher::default().run(files).await;
    let records: Vec<_> = outcomes.into_iter().map(Result::unwrap).collect();

    let report = ReportWriter::new(project.join("code documentation/parsed_data.csv"));
    report.write(&records).unwrap();

    let rows = read_rows(report.path());
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], "File Name");

    let shape = rows
        .iter()
        .find(|r| r[0] == "include/shape.hpp")
        .expect("shape.hpp row");
    assert_eq!(shape[1], "Shape");
    assert_eq!(shape[3], "Kind");
    assert_eq!(shape[5], "SHAPE_VERSION");
    assert_eq!(shape[6], "vector, point.h");
    assert_eq!(
        shape[7],
        last_modified(&project.join("include/shape.hpp")).unwrap()
    );

    let main = rows.iter().find(|r| r[0] == "src/main.cpp").unwrap();
    assert_eq!(main[2], "main");

    let point = rows.iter().find(|r| r[0] == "include/point.h").unwrap();
    assert_eq!(point[4], "Point");
}

/// One file disappearing mid-batch costs only its own row
#[tokio::test]
async fn test_unreadable_file_in_batch_of_three() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());

    let files = Scanner::new().source_files(&project).unwrap();
    assert_eq!(files.len(), 3);

    // Replace one discovered file with a directory so reading it fails
    let victim = files[1].path.clone();
    std::fs::remove_file(&victim).unwrap();
    std::fs::create_dir(&victim).unwrap();

    let outcomes = Dispatcher::new(4).run(files).await;
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        &outcomes[1],
        Err(IndexerError::FileAccess { path, .. }) if path == &victim
    ));

    let records: Vec<_> = outcomes.into_iter().filter_map(Result::ok).collect();
    assert_eq!(records.len(), 2);

    let report = ReportWriter::new(temp_dir.path().join("out.csv"));
    assert_eq!(report.write(&records).unwrap(), 2);
    assert_eq!(read_rows(report.path()).len(), 3);
}

/// Parsing the same file twice yields two independent rows
#[tokio::test]
async fn test_reparse_appends_duplicate_rows() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let report = ReportWriter::new(temp_dir.path().join("out.csv"));

    for _ in 0..2 {
        let files = Scanner::new().source_files(&project).unwrap();
        let records: Vec<_> = Dispatcher::new(2)
            .run(files)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();
        report.write(&records).unwrap();
    }

    let rows = read_rows(report.path());
    assert_eq!(rows.len(), 1 + 3 + 3);
    assert_eq!(rows.iter().filter(|r| r[0] == "src/main.cpp").count(), 2);
}

/// Results stay in input order on a larger batch
#[tokio::test]
async fn test_dispatch_many_files_keeps_order() {
    let temp_dir = tempdir().unwrap();
    let project = temp_dir.path().join("many");
    std::fs::create_dir_all(&project).unwrap();

    for i in 0..100 {
        std::fs::write(
            project.join(format!("file_{i:03}.c")),
            format!("#define MACRO_{i}\nint func_{i}(void) {{ return {i}; }}\n"),
        )
        .unwrap();
    }

    let files = Scanner::new().source_files(&project).unwrap();
    assert_eq!(files.len(), 100);

    let outcomes = Dispatcher::new(4).run(files).await;
    for (i, outcome) in outcomes.iter().enumerate() {
        let record = outcome.as_ref().unwrap();
        assert_eq!(record.path, format!("file_{i:03}.c"));
        assert_eq!(record.entities.macros, vec![format!("MACRO_{i}")]);
        assert_eq!(record.entities.functions, vec![format!("func_{i}")]);
    }
}
