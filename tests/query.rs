//! Tests for single and batch term queries and the interactive menu

use std::io::Write;

use avl_index::cli::menu::run_menu;
use avl_index::query::read_terms;
use avl_index::{BatchReport, Error, QueryOutcome, Record, TermDatabase};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn database() -> TermDatabase {
    [
        Record::new("dog", "animal", 0.9),
        Record::new("oak", "tree", 0.75),
        Record::new("salmon", "fish", 0.6),
        Record::new("dog", "pet", 0.1),
    ]
    .into_iter()
    .collect()
}

fn terms_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn run(db: &TermDatabase, input: &str) -> String {
    let mut output = Vec::new();
    run_menu(db, input.as_bytes(), &mut output).unwrap();
    String::from_utf8(output).unwrap()
}

// ============================================================
// Single queries
// ============================================================

#[test]
fn single_term_found() {
    let db = database();
    let outcome = db.find("oak");
    assert_eq!(outcome, QueryOutcome::Found(Record::new("oak", "tree", 0.75)));
    assert_eq!(outcome.to_string(), "Term: oak\nTree: tree\nConfidence: (0.75)");
}

#[test]
fn single_term_not_found() {
    let db = database();
    let outcome = db.find("cat");
    assert!(!outcome.is_found());
    assert_eq!(outcome.term(), "cat");
    assert_eq!(outcome.to_string(), "Term not found: cat");
}

#[test]
fn first_record_for_a_term_wins() {
    let db = database();
    assert_eq!(db.len(), 3);
    assert_eq!(db.find("dog").record().map(|r| r.tag.as_str()), Some("animal"));
}

#[test]
fn miss_on_single_record_costs_one_comparison() {
    let db: TermDatabase = [Record::new("dog", "animal", 0.9)].into_iter().collect();
    db.reset_counters();
    assert!(!db.find("cat").is_found());
    assert_eq!(db.comparisons().search, 1);
}

// ============================================================
// Batch queries
// ============================================================

#[test]
fn batch_tallies_found_and_missing() {
    let db = database();
    let report = db.find_all(["dog", "cat", "salmon", "owl"]);

    assert_eq!(report.found, 2);
    assert_eq!(report.not_found, 2);
    assert_eq!(report.total(), 4);
    assert_eq!(
        report.outcomes.iter().map(QueryOutcome::term).collect::<Vec<_>>(),
        ["dog", "cat", "salmon", "owl"]
    );
    assert_eq!(report.to_string(), "Found 2 out of 4 terms.");
}

#[test]
fn empty_batch() {
    let report = database().find_all(Vec::<String>::new());
    assert_eq!(report, BatchReport::default());
    assert_eq!(report.to_string(), "Found 0 out of 0 terms.");
}

#[test]
fn read_terms_trims_and_drops_blank_lines() {
    let file = terms_file("  dog \n\n\toak\r\n   \nowl");
    assert_eq!(read_terms(file.path()).unwrap(), ["dog", "oak", "owl"]);
}

#[test]
fn read_terms_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_terms(dir.path().join("queries.txt")).unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
}

// ============================================================
// Menu
// ============================================================

#[test]
fn menu_single_query_then_exit() {
    let out = run(&database(), "2\ndog\n4\n");
    assert!(out.contains("Term: dog\nTree: animal\nConfidence: (0.9)"), "{out}");
    assert!(out.ends_with("Exiting program. Goodbye!\n"), "{out}");
}

#[test]
fn menu_batch_query_from_file() {
    let file = terms_file("dog\ncat\noak\n");
    let input = format!("1\n{}\n4\n", file.path().display());
    let out = run(&database(), &input);

    assert!(out.contains("Term not found: cat"), "{out}");
    assert!(out.contains("Summary: Found 2 out of 3 terms."), "{out}");
}

#[test]
fn menu_batch_total_ignores_blank_lines() {
    let file = terms_file("dog\n\n   \ncat\n\n");
    let input = format!("1\n{}\n4\n", file.path().display());
    let out = run(&database(), &input);

    assert!(out.contains("Summary: Found 1 out of 2 terms."), "{out}");
}

#[test]
fn menu_reports_unreadable_query_file_and_continues() {
    let out = run(&database(), "1\n/no/such/queries.txt\n2\noak\n4\n");
    assert!(out.contains("Make sure the file exists and is accessible."), "{out}");
    assert!(out.contains("Term: oak"), "{out}");
}

#[test]
fn menu_rejects_bad_choices() {
    let out = run(&database(), "seven\n9\n4\n");
    assert!(out.contains("Invalid input. Please enter a valid number."), "{out}");
    assert!(out.contains("Invalid choice. Please enter a number between 1 and 4."), "{out}");
}

#[test]
fn menu_shows_statistics() {
    let db = database();
    db.reset_counters();
    // "oak" is the root after the three distinct inserts rebalance.
    let _ = db.find("oak");
    let out = run(&db, "3\n4\n");
    assert!(out.contains("insert comparisons: 0, search comparisons: 1"), "{out}");
}

#[test]
fn menu_exits_at_end_of_input() {
    let out = run(&database(), "2\n");
    assert!(out.ends_with("Exiting program. Goodbye!\n"), "{out}");
}
