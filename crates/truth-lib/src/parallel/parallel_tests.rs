use super::{ParallelGraph, ParallelId, provider, sanitizer};
use crate::Program;
use crate::phrase::{EdgeId, PhraseId};
use crate::subject::{Subject, Term};

/// Top-level phrases named `A`, `B`, ... in declaration order.
fn phrases(count: usize) -> (Program, Vec<PhraseId>) {
    let names: Vec<String> = (0..count)
        .map(|i| char::from(b'A' + i as u8).to_string())
        .collect();
    let (mut program, document) = Program::from_source(&names.join("\n"));
    let ids = names
        .iter()
        .map(|name| program.phrases_at(document, &[name.as_str()])[0])
        .collect();
    (program, ids)
}

fn edge(phrase: PhraseId, index: usize, is_list: bool) -> EdgeId {
    EdgeId {
        phrase,
        index,
        is_list,
    }
}

fn explicit_chain(graph: &mut ParallelGraph, ids: &[PhraseId]) -> Vec<ParallelId> {
    ids.iter()
        .map(|&phrase| graph.create_explicit(phrase, None))
        .collect()
}

#[test]
fn bases_are_transitive_and_deduplicated() {
    let (_, ids) = phrases(4);
    let mut graph = ParallelGraph::default();
    let p = explicit_chain(&mut graph, &ids);

    graph.insert_base(p[0], edge(ids[0], 0, false), p[1]);
    graph.insert_base(p[0], edge(ids[0], 1, false), p[1]);
    graph.insert_base(p[1], edge(ids[1], 0, false), p[2]);
    graph.insert_base(p[2], edge(ids[2], 0, false), p[3]);

    assert_eq!(graph.each_base(p[0]), [p[1]]);
    assert_eq!(graph.base_count(p[0]), 2);
    assert_eq!(graph.each_base_deep(p[0]), [p[1], p[2], p[3]]);
    assert!(graph.has_base(p[0], p[3]));
    assert!(!graph.has_base(p[3], p[0]));
}

#[test]
fn cruft_edges_are_not_bases() {
    let (_, ids) = phrases(3);
    let mut graph = ParallelGraph::default();
    let p = explicit_chain(&mut graph, &ids);

    graph.insert_base(p[0], edge(ids[0], 0, false), p[1]);
    graph.insert_base(p[0], edge(ids[0], 1, false), p[2]);
    graph.cruft_mut().add_edge(edge(ids[0], 0, false));

    assert_eq!(graph.each_base(p[0]), [p[2]]);
    assert!(graph.has_edge(p[0], edge(ids[0], 0, false)));
    assert!(graph.cruft().has_edge(edge(ids[0], 0, false)));
    assert!(!graph.cruft().has_edge(edge(ids[0], 1, false)));
}

#[test]
fn list_dimensionality_follows_first_bases() {
    let (_, ids) = phrases(4);
    let mut graph = ParallelGraph::default();
    let p = explicit_chain(&mut graph, &ids);

    graph.insert_base(p[0], edge(ids[0], 0, true), p[1]);
    graph.insert_base(p[0], edge(ids[0], 1, false), p[3]);
    graph.insert_base(p[1], edge(ids[1], 0, true), p[2]);

    assert_eq!(graph.list_dimensionality(p[0]), 2);
    assert_eq!(graph.list_dimensionality(p[1]), 1);
    assert_eq!(graph.list_dimensionality(p[3]), 0);
}

#[test]
fn dimensional_conflict_needs_existing_bases() {
    let (_, ids) = phrases(3);
    let mut graph = ParallelGraph::default();
    let p = explicit_chain(&mut graph, &ids);

    assert!(!sanitizer::is_dimensional_conflict(
        &graph,
        p[0],
        p[1],
        edge(ids[0], 0, true)
    ));

    graph.insert_base(p[0], edge(ids[0], 0, false), p[1]);

    assert!(sanitizer::is_dimensional_conflict(
        &graph,
        p[0],
        p[2],
        edge(ids[0], 1, true)
    ));
    assert!(!sanitizer::is_dimensional_conflict(
        &graph,
        p[0],
        p[2],
        edge(ids[0], 1, false)
    ));
}

#[test]
fn circularity_includes_self_reference() {
    let (_, ids) = phrases(2);
    let mut graph = ParallelGraph::default();
    let p = explicit_chain(&mut graph, &ids);
    graph.insert_base(p[1], edge(ids[1], 0, false), p[0]);

    assert!(sanitizer::is_circular(&graph, p[0], p[0]));
    assert!(sanitizer::is_circular(&graph, p[0], p[1]));
    assert!(!sanitizer::is_circular(&graph, p[1], p[0]));
}

#[test]
fn implicit_parallels_relay_to_explicit_ones() {
    let (_, ids) = phrases(4);
    let mut graph = ParallelGraph::default();
    let a = graph.create_explicit(ids[0], None);
    let b = graph.create_explicit(ids[1], None);
    let relay = graph.create_implicit(ids[2], None, vec![a, b]);
    let outer = graph.create_implicit(ids[3], None, vec![relay, a]);

    assert!(!graph.is_explicit(relay));
    assert_eq!(graph.effective_explicit(&[outer]), [a, b]);
    assert!(graph.each_base(relay).is_empty());
}

#[test]
fn overriding_parallel_inherits_a_contract() {
    let (_, ids) = phrases(5);
    let mut graph = ParallelGraph::default();
    let p = explicit_chain(&mut graph, &ids[..4]);
    graph.insert_base(p[1], edge(ids[1], 0, false), p[2]);
    graph.insert_base(p[3], edge(ids[3], 0, false), p[2]);
    let target = graph.create_explicit(ids[4], None);

    graph.set_parallels(target, vec![p[1]]);

    let contract = graph.contract(target).unwrap();
    assert!(contract.has_conditions());
    assert_eq!(contract.conditions(), [p[2]]);
    assert_eq!(graph.conditions_met_by(target, p[2]), [p[2]]);
    assert_eq!(graph.conditions_met_by(target, p[3]), [p[2]]);
    assert!(graph.conditions_met_by(target, p[0]).is_empty());

    assert!(!graph.is_contract_satisfied(target));
    graph.contract_mut(target).unwrap().satisfy(&[p[2]]);
    assert!(graph.is_contract_satisfied(target));
    assert!(graph.is_contract_satisfied(p[0]));
}

#[test]
fn containment_is_outermost_first() {
    let (_, ids) = phrases(3);
    let mut graph = ParallelGraph::default();
    let outer = graph.create_explicit(ids[0], None);
    let middle = graph.create_explicit(ids[1], Some(outer));
    let inner = graph.create_implicit(ids[2], Some(middle), Vec::new());

    assert_eq!(graph.containment(inner), [outer, middle, inner]);
    assert_eq!(graph.get(ids[1]), Some(middle));
    assert_eq!(graph.get(ids[2]), Some(inner));
}

#[test]
fn bridge_links_both_sides() {
    let (_, ids) = phrases(2);
    let mut graph = ParallelGraph::default();
    let p = explicit_chain(&mut graph, &ids);

    graph.bridge(p[0], p[1], false);

    assert_eq!(graph.bridge_of(p[0]), Some(p[1]));
    assert_eq!(graph.bridge_of(p[1]), Some(p[0]));
}

#[test]
#[should_panic(expected = "bridged parallels must differ in list-ness")]
fn bridge_rejects_same_polarity() {
    let (_, ids) = phrases(2);
    let mut graph = ParallelGraph::default();
    let p = explicit_chain(&mut graph, &ids);

    graph.bridge(p[0], p[1], true);
}

#[test]
#[should_panic(expected = "edge already has a base")]
fn edges_take_one_base() {
    let (_, ids) = phrases(3);
    let mut graph = ParallelGraph::default();
    let p = explicit_chain(&mut graph, &ids);

    graph.insert_base(p[0], edge(ids[0], 0, false), p[1]);
    graph.insert_base(p[0], edge(ids[0], 0, false), p[2]);
}

#[test]
#[should_panic(expected = "has no bases")]
fn first_base_of_baseless_parallel() {
    let (_, ids) = phrases(1);
    let mut graph = ParallelGraph::default();
    let p = graph.create_explicit(ids[0], None);

    graph.first_base(p);
}

#[test]
fn provider_hands_out_one_hypothetical_per_location() {
    let (mut program, ids) = phrases(2);
    let (_, env) = program.split_types();
    let a = Subject::Term(Term::lookup(env.interner, "A").unwrap());
    let b = Subject::Term(Term::lookup(env.interner, "B").unwrap());

    let first = provider::forward(env.phrases, ids[0], &b);
    let second = provider::forward(env.phrases, ids[0], &b);
    assert_eq!(first, second);
    assert!(env.phrases.is_hypothetical(first[0]));

    let root = env.phrases.parent(ids[0]);
    let shadow = env.phrases.hypothetical(root, &a);
    assert!(env.phrases.is_hypothetical(shadow));
    assert_eq!(provider::canonical(env.phrases, shadow), ids[0]);
    assert_eq!(provider::canonical(env.phrases, ids[1]), ids[1]);
    assert_eq!(provider::forward(env.phrases, root, &b), [ids[1]]);
}
