use std::path::Path;

use indoc::indoc;

use super::{Program, ProgramConfig, ProgramEvent};
use crate::Error;
use crate::document::DocumentId;
use crate::subject::{Subject, Term};

fn subject(program: &Program, text: &str) -> Subject {
    Subject::Term(Term::lookup(program.interner(), text).expect("interned term"))
}

fn declare(program: &Program, document: DocumentId, text: &str) -> ProgramEvent {
    ProgramEvent::Declare {
        document,
        subject: subject(program, text),
    }
}

fn undeclare(program: &Program, document: DocumentId, text: &str) -> ProgramEvent {
    ProgramEvent::Undeclare {
        document,
        subject: subject(program, text),
    }
}

#[test]
fn loading_declares_top_level_subjects() {
    let input = indoc! {"
        Car
        \tEngine
        Boat
    "};
    let (mut program, document) = Program::from_source(input.trim_end());

    let events = program.drain_events();
    assert_eq!(
        events,
        [
            declare(&program, document, "Car"),
            declare(&program, document, "Boat"),
        ]
    );
    assert!(program.drain_events().is_empty());
}

#[test]
fn deleting_the_last_fragment_undeclares() {
    let (mut program, document) = Program::from_source("A\nB\nA");
    program.drain_events();

    program
        .edit(document, |tx| {
            tx.delete(2, 1);
        })
        .unwrap();
    assert!(program.drain_events().is_empty());

    program
        .edit(document, |tx| {
            tx.delete(1, 1);
        })
        .unwrap();
    assert_eq!(program.drain_events(), [undeclare(&program, document, "B")]);
}

#[test]
fn rewriting_a_statement_in_place_is_silent() {
    let (mut program, document) = Program::from_source("A\nB");
    program.drain_events();

    program
        .edit(document, |tx| {
            tx.update(0, "A");
        })
        .unwrap();
    assert!(program.drain_events().is_empty());

    program
        .edit(document, |tx| {
            tx.update(1, "C");
        })
        .unwrap();
    assert_eq!(
        program.drain_events(),
        [
            declare(&program, document, "C"),
            undeclare(&program, document, "B"),
        ]
    );
}

#[test]
fn multi_line_insert_adds_each_line() {
    let (mut program, document) = Program::from_source("A");
    program.drain_events();

    program
        .edit(document, |tx| {
            tx.insert(1, "B\nC");
        })
        .unwrap();

    assert_eq!(program.document(document).unwrap().text(), "A\nB\nC");
    assert_eq!(
        program.drain_events(),
        [
            declare(&program, document, "B"),
            declare(&program, document, "C"),
        ]
    );
}

#[test]
fn events_can_be_disabled() {
    let mut program = Program::with_config(ProgramConfig::new().with_events(false));
    program.add_document("A\nB");

    assert!(program.drain_events().is_empty());
}

#[test]
fn failed_edit_keeps_earlier_operations() {
    let (mut program, document) = Program::from_source("A");
    let before = program.version();

    let result = program.edit(document, |tx| {
        tx.insert(1, "B").delete(5, 1).update(0, "C");
    });

    assert!(matches!(result, Err(Error::PositionOutOfBounds { len: 2, .. })));
    assert_eq!(program.document(document).unwrap().text(), "A\nB");
    assert!(program.version().newer_than(before));
    assert!(program.query(document, &["B"]).is_some());
}

#[test]
fn empty_edit_keeps_the_version() {
    let (mut program, document) = Program::from_source("A");
    let before = program.version();

    program.edit(document, |_| {}).unwrap();

    assert_eq!(program.version(), before);
}

#[test]
fn unknown_documents_are_errors() {
    let mut program = Program::new();
    let missing = DocumentId::from_raw(42);

    assert!(matches!(
        program.edit(missing, |tx| {
            tx.insert(0, "A");
        }),
        Err(Error::UnknownDocument(id)) if id == missing
    ));
    assert!(matches!(
        program.remove_document(missing),
        Err(Error::UnknownDocument(_))
    ));
}

#[test]
fn removing_a_document_undeclares_its_subjects() {
    let (mut program, document) = Program::from_source("A");
    program.drain_events();
    let before = program.version();

    program.remove_document(document).unwrap();

    assert!(program.document(document).is_none());
    assert!(program.version().newer_than(before));
    assert_eq!(program.drain_events(), [undeclare(&program, document, "A")]);
    assert!(program.query(document, &["A"]).is_none());
}

#[test]
fn every_mutation_ticks_the_version() {
    let mut program = Program::new();
    let v0 = program.version();
    let document = program.add_document("A");
    let v1 = program.version();
    program
        .edit(document, |tx| {
            tx.insert(1, "B");
        })
        .unwrap();
    let v2 = program.version();

    assert!(v1.newer_than(v0));
    assert!(v2.newer_than(v1));
}

#[test]
fn load_file_reports_io_errors() {
    let mut program = Program::new();

    let err = program
        .load_file(Path::new("/nonexistent/shapes.truth"))
        .unwrap_err();

    assert!(matches!(err, Error::Io { ref path, .. } if path == "/nonexistent/shapes.truth"));
    assert!(program.documents().is_empty());
}

#[test]
fn verify_orders_faults_by_document_and_line() {
    let mut program = Program::new();
    program.add_document("Dog : Missing\nCat : Absent");
    program.add_document("Fish : Gone");

    insta::assert_snapshot!(program.fault_summary(), @r"
    UnresolvedAnnotation 1:`Missing` `Missing` does not resolve to a type
    UnresolvedAnnotation 2:`Absent` `Absent` does not resolve to a type
    UnresolvedAnnotation 1:`Gone` `Gone` does not resolve to a type
    ");
}

#[test]
fn missing_dependencies_are_warnings() {
    let (mut program, _) = Program::from_source("shapes.truth\nCircle");

    let faults = program.verify();
    assert_eq!(faults.warning_count(), 1);
    insta::assert_snapshot!(program.summarize(&faults), @"UnresolvedDependency 1:`shapes.truth` `shapes.truth` is not loaded");

    program.add_document_with_uri("shapes.truth", "Shape").unwrap();
    assert!(program.verify().is_empty());
}

#[test]
fn homographs_with_members_are_ambiguous() {
    let input = indoc! {"
        Planet
        Element
        Mercury : Planet
        \tOrbit
        Mercury : Element
    "};
    let (mut program, _) = Program::from_source(input.trim_end());

    insta::assert_snapshot!(program.fault_summary(), @"HomographAmbiguity 5:`Mercury` path is ambiguous between homographs: Mercury");
}

#[test]
fn leaf_homographs_are_not_ambiguous() {
    let input = indoc! {"
        Planet
        Element
        Mercury : Planet
        Mercury : Element
    "};
    let (mut program, _) = Program::from_source(input.trim_end());

    assert!(program.fault_summary().is_empty());
}

#[test]
fn recursion_limit_stops_construction() {
    let mut program = Program::with_config(ProgramConfig::new().with_recursion_limit(1));
    program.add_document("A : B\nB");

    insta::assert_snapshot!(program.fault_summary(), @r"
    UnresolvedAnnotation 1:`B` `B` does not resolve to a type
    RecursionLimit 2:`B` type is nested too deeply to resolve
    ");
}

#[test]
fn settle_is_idempotent_within_a_version() {
    let (mut program, _) = Program::from_source("A : Missing");

    let first = program.verify();
    let second = program.verify();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
}

#[test]
fn edits_clear_stale_construction_faults() {
    let (mut program, document) = Program::from_source("A : Missing");
    assert_eq!(program.verify().len(), 1);

    program
        .edit(document, |tx| {
            tx.insert(0, "Missing");
        })
        .unwrap();

    assert!(program.verify().is_empty());
    assert_eq!(program.base_names(document, &["A"]), ["Missing"]);
}
