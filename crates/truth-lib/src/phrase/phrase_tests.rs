use indoc::indoc;

use super::{ClarifierKey, PhraseId, SpanLookup};
use crate::Program;
use crate::document::DocumentId;
use crate::subject::{Subject, Term};

fn load(source: &str) -> (Program, DocumentId) {
    Program::from_source(source.trim_end())
}

fn single(program: &mut Program, document: DocumentId, path: &[&str]) -> PhraseId {
    match program.phrases_at(document, path).as_slice() {
        [phrase] => *phrase,
        other => panic!("expected one phrase at {path:?}, found {}", other.len()),
    }
}

fn display(program: &Program, phrase: PhraseId) -> String {
    program
        .phrases()
        .display(phrase, program.documents(), program.interner())
}

fn term(program: &Program, text: &str) -> Term {
    Term::lookup(program.interner(), text).expect("interned term")
}

#[test]
fn fragments_share_a_phrase() {
    let input = indoc! {"
        Car
        \tEngine
        Car
        \tWheels
    "};
    let (mut program, document) = load(input);

    let car = single(&mut program, document, &["Car"]);
    let phrases = program.phrases();

    assert_eq!(phrases.statements(car).len(), 2);
    assert_eq!(phrases.peek_all(car).len(), 2);
    assert_eq!(phrases.length(car), 1);
}

#[test]
fn annotations_separate_homographs() {
    let input = indoc! {"
        Mercury : Planet
        Mercury : Element
    "};
    let (mut program, document) = load(input);

    let found = program.phrases_at(document, &["Mercury"]);
    assert_eq!(found.len(), 2);

    let planet = ClarifierKey::from_terms(&[term(&program, "Planet")]);
    let root = program.document(document).unwrap().root();
    let mercury = Subject::Term(term(&program, "Mercury"));
    let (_, env) = program.split_types();
    let clarified = env
        .phrases
        .from_path_components_clarified(root, &[mercury], &planet);
    assert_eq!(clarified, Some(found[0]));
}

#[test]
fn clarifier_key_ignores_annotation_order() {
    let input = indoc! {"
        Mercury : Planet, Roman
        Mercury : Roman, Planet
    "};
    let (mut program, document) = load(input);

    let mercury = single(&mut program, document, &["Mercury"]);
    assert_eq!(program.phrases().statements(mercury).len(), 2);
}

#[test]
fn missing_links_become_hypothetical() {
    let (mut program, document) = load("Car");

    let engine = single(&mut program, document, &["Car", "Engine"]);
    let car = single(&mut program, document, &["Car"]);
    let phrases = program.phrases();

    assert!(phrases.is_hypothetical(engine));
    assert_eq!(phrases.parent(engine), car);
    assert_eq!(phrases.length(engine), 2);
    assert!(phrases.peek_all(car).is_empty());
}

#[test]
fn first_level_homographs_fan_out() {
    let input = indoc! {"
        Mercury : Planet
        \tOrbit
        Mercury : Element
    "};
    let (mut program, document) = load(input);

    let found = program.phrases_at(document, &["Mercury", "Orbit"]);
    assert_eq!(found.len(), 2);

    let phrases = program.phrases();
    assert!(!phrases.is_hypothetical(found[0]));
    assert!(phrases.is_hypothetical(found[1]));
    assert_ne!(phrases.parent(found[0]), phrases.parent(found[1]));
}

#[test]
fn clarifier_picks_a_first_level_homograph() {
    let input = indoc! {"
        Mercury : Planet
        \tOrbit
        Mercury : Element
    "};
    let (mut program, document) = load(input);

    let orbit = program.phrases_at(document, &["Mercury", "Orbit"])[0];
    let element = ClarifierKey::from_terms(&[term(&program, "Element")]);
    let root = program.document(document).unwrap().root();
    let path = [
        Subject::Term(term(&program, "Mercury")),
        Subject::Term(term(&program, "Orbit")),
    ];
    let (_, env) = program.split_types();

    let planet = ClarifierKey::from_terms(&[Term::lookup(env.interner, "Planet").unwrap()]);
    assert_eq!(
        env.phrases.from_path_components_clarified(root, &path, &planet),
        Some(orbit)
    );
    let elemental = env
        .phrases
        .from_path_components_clarified(root, &path, &element)
        .expect("hypothetical orbit");
    assert!(env.phrases.is_hypothetical(elemental));
}

#[test]
fn deeper_homographs_resolve_nothing() {
    let input = indoc! {"
        A
        \tB : X
        \tB : Y
    "};
    let (mut program, document) = load(input);

    assert!(program.phrases_at(document, &["A", "B"]).is_empty());
    assert_eq!(program.phrases_at(document, &["A"]).len(), 1);
    assert!(program.phrases_at(document, &[]).is_empty());
}

#[test]
fn unknown_first_level_resolves_nothing() {
    let input = indoc! {"
        Car
        \tBoat
    "};
    let (mut program, document) = load(input);

    assert!(program.phrases_at(document, &["Boat"]).is_empty());
    assert!(program.phrases_at(document, &["Plane"]).is_empty());
}

#[test]
fn repeated_lookups_reuse_hypothetical_phrases() {
    let (mut program, document) = load("Car");
    let before = program.phrases().len();

    let first = single(&mut program, document, &["Car", "Car"]);
    for _ in 0..100 {
        assert_eq!(single(&mut program, document, &["Car", "Car"]), first);
    }

    assert_eq!(program.phrases().len(), before + 1);
}

#[test]
fn span_resolution_never_duplicates_phrases() {
    let input = indoc! {"
        Car
        \tEngine
        Car
    "};
    let (mut program, document) = load(input);

    let engine = single(&mut program, document, &["Car", "Engine"]);
    let key = program
        .phrases()
        .inflating_spans(engine)
        .next()
        .expect("declared engine");
    let before = program.phrases().len();
    let (_, env) = program.split_types();
    let source = env.documents.get(document).expect("loaded document");

    for _ in 0..3 {
        assert_eq!(env.phrases.from_span(source, key, SpanLookup::Create), [engine]);
        assert_eq!(env.phrases.from_span(source, key, SpanLookup::Existing), [engine]);
    }
    assert_eq!(env.phrases.len(), before);
}

#[test]
fn display_walks_from_the_root() {
    let input = indoc! {"
        Car
        \tEngine
    "};
    let (mut program, document) = load(input);

    let engine = single(&mut program, document, &["Car", "Engine"]);
    insta::assert_snapshot!(display(&program, engine), @"memory://0//Car/Engine");
}

#[test]
fn clarified_display_names_annotations() {
    let input = indoc! {"
        Planet
        Mercury : Planet
        \tOrbit
    "};
    let (mut program, document) = load(input);

    let orbit = single(&mut program, document, &["Mercury", "Orbit"]);
    let shown = program
        .phrases()
        .display_clarified(orbit, program.documents(), program.interner());
    insta::assert_snapshot!(shown, @"memory://0//Mercury:Planet/Orbit:");
}

#[test]
fn successors_are_nearest_scope_first() {
    let input = indoc! {"
        Color
        Car
        \tColor
        \tPaint : Color
    "};
    let (mut program, document) = load(input);

    let paint = single(&mut program, document, &["Car", "Paint"]);
    let (_, env) = program.split_types();
    let forks = env
        .phrases
        .outbounds(paint, env.documents, env.interner, env.version);

    assert_eq!(forks.len(), 1);
    assert!(!forks[0].is_containment());
    let successors: Vec<String> = forks[0]
        .successors()
        .iter()
        .map(|&p| env.display(p))
        .collect();
    assert_eq!(successors, ["memory://0//Car/Color", "memory://0//Color"]);
}

#[test]
fn unannotated_nested_phrase_forks_on_its_own_name() {
    let input = indoc! {"
        Engine
        Car
        \tEngine
    "};
    let (mut program, document) = load(input);

    let inner = single(&mut program, document, &["Car", "Engine"]);
    let outer = single(&mut program, document, &["Engine"]);
    let (_, env) = program.split_types();
    let forks = env
        .phrases
        .outbounds(inner, env.documents, env.interner, env.version);

    assert_eq!(forks.len(), 1);
    assert!(forks[0].is_containment());
    assert_eq!(forks[0].successors(), [outer]);
}

#[test]
fn list_annotations_look_up_the_singular_name() {
    let input = indoc! {"
        Wheel
        Car : Wheel...
    "};
    let (mut program, document) = load(input);

    let car = single(&mut program, document, &["Car"]);
    let wheel = single(&mut program, document, &["Wheel"]);
    let (_, env) = program.split_types();
    let forks = env
        .phrases
        .outbounds(car, env.documents, env.interner, env.version);

    assert!(forks[0].is_list());
    assert!(forks[0].edge().is_list);
    assert_eq!(forks[0].successors(), [wheel]);
}

#[test]
fn dependency_roots_extend_the_scope() {
    let mut program = Program::new();
    let shapes = program
        .add_document_with_uri("lib/shapes.truth", "Shape")
        .unwrap();
    let app = program
        .add_document_with_uri("app.truth", "shapes.truth\nCircle : Shape")
        .unwrap();

    let circle = single(&mut program, app, &["Circle"]);
    let shape = single(&mut program, shapes, &["Shape"]);
    let (_, env) = program.split_types();
    let forks = env
        .phrases
        .outbounds(circle, env.documents, env.interner, env.version);

    assert_eq!(forks[0].successors(), [shape]);
}

#[test]
fn deleted_statements_dispose_their_phrases() {
    let input = indoc! {"
        Car
        \tEngine
    "};
    let (mut program, document) = load(input);
    let engine = single(&mut program, document, &["Car", "Engine"]);

    program
        .edit(document, |tx| {
            tx.delete(1, 1);
        })
        .unwrap();

    let car = single(&mut program, document, &["Car"]);
    assert!(program.phrases().is_disposed(engine));
    assert!(program.phrases().peek_all(car).is_empty());
}

#[test]
fn slice_reads_annotation_text() {
    let (mut program, document) = load("Point : X, Y, Z");
    let point = single(&mut program, document, &["Point"]);
    let doc = program.document(document).unwrap();
    let phrases = program.phrases();

    assert_eq!(phrases.slice(point, doc, 1, 2), "Y, Z");
    assert_eq!(phrases.slice(point, doc, 0, usize::MAX), "X, Y, Z");
    assert_eq!(phrases.slice(point, doc, 2, 1), "Z");
    assert_eq!(phrases.slice(point, doc, 3, 1), "");
    assert_eq!(phrases.slice(point, doc, 0, 0), "");
}

#[test]
fn slice_of_fragmented_phrase_is_empty() {
    let (mut program, document) = load("Point : X\nPoint : X");
    let point = single(&mut program, document, &["Point"]);
    let doc = program.document(document).unwrap();

    assert_eq!(program.phrases().slice(point, doc, 0, 1), "");
}

#[test]
fn list_and_plain_declarations_bridge() {
    let input = indoc! {"
        Item
        Item...
    "};
    let (mut program, document) = load(input);

    let item = single(&mut program, document, &["Item"]);
    let items = single(&mut program, document, &["Item..."]);
    let phrases = program.phrases();

    assert!(phrases.is_list_intrinsic(items));
    assert!(!phrases.is_list_intrinsic(item));
    assert_eq!(phrases.intrinsic_extrinsic_bridge(item), Some(items));
    assert_eq!(phrases.intrinsic_extrinsic_bridge(items), Some(item));
}

#[test]
fn infix_members_find_their_pattern() {
    let input = indoc! {"
        /<Key : Text>=<Value>/ : Entry
        \tKey : Text
        \tOther
    "};
    let (program, document) = load(input);
    let root = program.document(document).unwrap().root();
    let phrases = program.phrases();

    let pattern = phrases.peek_all(root)[0];
    let children = phrases.peek_all(pattern);
    assert_eq!(children.len(), 2);

    let key = phrases.parent_infix(children[0], program.interner());
    assert_eq!(key.map(|infix| infix.lhs.clone()), Some(vec!["Key".to_string()]));
    assert!(phrases.parent_infix(children[1], program.interner()).is_none());
}

#[test]
fn ancestry_and_recursive_peek() {
    let input = indoc! {"
        A
        \tB
        \t\tC
        \tD
        E
    "};
    let (mut program, document) = load(input);
    let c = single(&mut program, document, &["A", "B", "C"]);
    let root = program.document(document).unwrap().root();
    let phrases = program.phrases();

    let ancestry: Vec<String> = phrases
        .ancestry(c)
        .into_iter()
        .map(|p| phrases.terminal(p).display(program.interner()).to_string())
        .collect();
    assert_eq!(ancestry, ["A", "B", "C"]);
    assert_eq!(phrases.root_of(c), root);

    let all: Vec<String> = phrases
        .peek_recursive(root)
        .into_iter()
        .map(|p| phrases.terminal(p).display(program.interner()).to_string())
        .collect();
    assert_eq!(all, ["A", "B", "C", "D", "E"]);
}

#[test]
fn declarations_and_annotations_span_every_fragment() {
    let input = indoc! {"
        Car, Boat : Vehicle
        Car : Vehicle
    "};
    let (mut program, document) = load(input);
    let car = single(&mut program, document, &["Car"]);
    let doc = program.document(document).unwrap();
    let phrases = program.phrases();

    assert_eq!(phrases.declarations(car, doc).len(), 2);
    let annotations: Vec<String> = phrases
        .annotations(car, doc)
        .into_iter()
        .map(|span| span.subject().display(program.interner()).to_string())
        .collect();
    assert_eq!(annotations, ["Vehicle", "Vehicle"]);
}
