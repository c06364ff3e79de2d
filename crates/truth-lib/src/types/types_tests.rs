use indoc::indoc;

use super::TypeError;
use crate::Program;
use crate::document::DocumentId;
use crate::graph::Order;

fn load(source: &str) -> (Program, DocumentId) {
    Program::from_source(source.trim_end())
}

#[test]
fn annotations_become_bases() {
    let input = indoc! {"
        Animal
        Pet
        Dog : Animal, Pet
    "};
    let (mut program, document) = load(input);

    assert_eq!(program.base_names(document, &["Dog"]), ["Animal", "Pet"]);

    let dog = program.expect_type(document, &["Dog"]);
    insta::assert_snapshot!(dog.display_full(&mut program).unwrap(), @"memory://0//Dog : Animal, Pet");
    assert!(dog.is_explicit(&mut program).unwrap());
    assert!(dog.is_fresh(&mut program).unwrap());
    assert!(dog.is_introduction(&mut program).unwrap());
    assert_eq!(dog.level(&program), Ok(1));
    assert_eq!(dog.statements(&mut program).unwrap().len(), 1);
}

#[test]
fn is_follows_bases_transitively() {
    let input = indoc! {"
        Animal
        Dog : Animal
        Puppy : Dog
    "};
    let (mut program, document) = load(input);
    let animal = program.expect_type(document, &["Animal"]);
    let puppy = program.expect_type(document, &["Puppy"]);

    assert_eq!(puppy.is(&mut program, animal), Ok(true));
    assert_eq!(animal.is(&mut program, puppy), Ok(false));
    assert_eq!(puppy.is(&mut program, puppy), Ok(true));

    let chain = puppy
        .visit(&mut program, Order::Pre, |program, t| t.bases(program))
        .unwrap();
    assert_eq!(program.names(&chain), ["Puppy", "Dog", "Animal"]);
}

#[test]
fn containees_are_inherited() {
    let input = indoc! {"
        Car
        \tEngine
        \tWheels
        SportsCar : Car
        \tSpoiler
    "};
    let (mut program, document) = load(input);

    assert_eq!(program.containee_names(document, &["Car"]), ["Engine", "Wheels"]);
    assert_eq!(
        program.containee_names(document, &["SportsCar"]),
        ["Engine", "Wheels", "Spoiler"]
    );

    let engine = program.expect_type(document, &["SportsCar", "Engine"]);
    assert!(!engine.is_explicit(&mut program).unwrap());
    assert!(engine.is_override(&mut program).unwrap());
    assert!(engine.statements(&mut program).unwrap().is_empty());
    assert_eq!(engine.level(&program), Ok(2));

    let sports_car = program.expect_type(document, &["SportsCar"]);
    assert_eq!(engine.container(&mut program), Ok(Some(sports_car)));
    assert_eq!(sports_car.has(&mut program, engine), Ok(true));
}

#[test]
fn undeclared_members_have_no_type() {
    let (mut program, document) = load("Car");

    assert!(program.query(document, &["Car", "Engine"]).is_none());
}

#[test]
fn overrides_keep_their_parallels() {
    let input = indoc! {"
        Turbo
        Car
        \tEngine
        SportsCar : Car
        \tEngine : Turbo
    "};
    let (mut program, document) = load(input);

    let engine = program.expect_type(document, &["SportsCar", "Engine"]);
    let parallels = engine.parallels(&mut program).unwrap();
    let roots = engine.parallel_roots(&mut program).unwrap();

    assert_eq!(program.names(&parallels), ["Engine"]);
    assert_eq!(
        parallels[0].display(&mut program).unwrap(),
        "memory://0//Car/Engine"
    );
    assert_eq!(roots, parallels);
    assert!(engine.is_override(&mut program).unwrap());
    assert_eq!(program.base_names(document, &["SportsCar", "Engine"]), ["Turbo"]);
}

#[test]
fn has_sees_through_same_named_parallels() {
    let input = indoc! {"
        Class
        \tField
        Sub : Class
        \tField
    "};
    let (mut program, document) = load(input);

    let sub = program.expect_type(document, &["Sub"]);
    let own = program.expect_type(document, &["Sub", "Field"]);
    let inherited = program.expect_type(document, &["Class", "Field"]);
    let class = program.expect_type(document, &["Class"]);

    assert_eq!(own.parallels(&mut program), Ok(vec![inherited]));
    assert_eq!(sub.has(&mut program, own), Ok(true));
    assert_eq!(sub.has(&mut program, inherited), Ok(true));
    assert_eq!(class.has(&mut program, own), Ok(false));
}

#[test]
fn parallel_roots_exclude_the_type_itself() {
    let input = indoc! {"
        A
        \tX
        B : A
        \tX
    "};
    let (mut program, document) = load(input);

    let a = program.expect_type(document, &["A"]);
    assert!(a.parallel_roots(&mut program).unwrap().is_empty());

    let root = program.expect_type(document, &["A", "X"]);
    assert!(root.parallel_roots(&mut program).unwrap().is_empty());

    let x = program.expect_type(document, &["B", "X"]);
    assert_eq!(x.parallel_roots(&mut program), Ok(vec![root]));
}

#[test]
fn query_walks_nested_containees() {
    let input = indoc! {"
        Car
        \tEngine
        \t\tCylinders
        SportsCar : Car
    "};
    let (mut program, document) = load(input);
    let sports_car = program.expect_type(document, &["SportsCar"]);

    let cylinders = sports_car
        .query(&mut program, &["Engine", "Cylinders"])
        .unwrap()
        .expect("inherited member");
    insta::assert_snapshot!(
        cylinders.display(&mut program).unwrap(),
        @"memory://0//SportsCar/Engine/Cylinders"
    );
    assert_eq!(sports_car.query(&mut program, &["Cylinders"]), Ok(None));
    assert_eq!(sports_car.query(&mut program, &[]), Ok(None));
}

#[test]
fn refinement_repeats_the_outer_name() {
    let input = indoc! {"
        Engine
        Car
        \tEngine : Engine
        \tWheels : Engine
    "};
    let (mut program, document) = load(input);

    let engine = program.expect_type(document, &["Car", "Engine"]);
    let wheels = program.expect_type(document, &["Car", "Wheels"]);

    assert!(engine.is_refinement(&mut program).unwrap());
    assert!(!wheels.is_refinement(&mut program).unwrap());
    assert_eq!(
        program.base_names(document, &["Car", "Wheels"]),
        ["Engine"]
    );
}

#[test]
fn list_flags() {
    let input = indoc! {"
        Item
        Items...
        Bag : Item...
        : Item
    "};
    let (mut program, document) = load(input);

    let items = program.expect_type(document, &["Items..."]);
    let bag = program.expect_type(document, &["Bag"]);
    let anonymous = program.expect_type(document, &["•"]);

    assert!(items.is_list_intrinsic(&mut program).unwrap());
    assert!(!items.is_list_extrinsic(&mut program).unwrap());
    assert!(bag.is_list_extrinsic(&mut program).unwrap());
    assert!(!bag.is_list_intrinsic(&mut program).unwrap());
    assert!(anonymous.is_anonymous(&mut program).unwrap());
    for list in [items, bag] {
        assert_eq!(
            list.containees_intrinsic(&mut program),
            Err(TypeError::NotImplemented("containees_intrinsic of list types"))
        );
    }
}

#[test]
fn non_list_types_hold_nothing_intrinsically() {
    let input = indoc! {"
        A
        \tB
    "};
    let (mut program, document) = load(input);

    let a = program.expect_type(document, &["A"]);
    let containees = a.containees(&mut program).unwrap();
    assert_eq!(program.names(&containees), ["B"]);
    assert!(a.containees_intrinsic(&mut program).unwrap().is_empty());
}

#[test]
fn uri_declarations_are_uri_types() {
    let (mut program, document) = load("shapes.truth");

    let uri = program.expect_type(document, &["shapes.truth"]);
    assert!(uri.is_uri(&mut program).unwrap());
    assert!(!uri.is_pattern(&mut program).unwrap());
}

#[test]
fn patterns_alias_literal_annotations() {
    let input = indoc! {r"
        /\d+/ : Number
        Number
        Age : 42
    "};
    let (mut program, document) = load(input);

    let age = program.expect_type(document, &["Age"]);
    let keywords = age.keywords(&mut program).unwrap();
    assert_eq!(keywords.len(), 1);
    assert_eq!(keywords[0].word, "42");
    assert!(keywords[0].is_alias);
    assert!(keywords[0].ty.is_pattern(&mut program).unwrap());
    assert_eq!(age.aliases(&mut program).unwrap(), ["42"]);
    assert_eq!(age.value(&mut program).unwrap(), "42");

    let number = program.expect_type(document, &["Number"]);
    let patterns = number.patterns(&mut program).unwrap();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0], keywords[0].ty);
    assert_eq!(patterns[0].bases(&mut program), Ok(vec![number]));
}

#[test]
fn total_patterns_match_the_whole_annotation_side() {
    let input = indoc! {r"
        /\d+, \d+/ : Point
        Point
        Origin : 3, 4
    "};
    let (mut program, document) = load(input);

    let origin = program.expect_type(document, &["Origin"]);
    assert_eq!(origin.aliases(&mut program).unwrap(), ["3", "4"]);
    assert_eq!(origin.value(&mut program).unwrap(), "3, 4");
    assert!(program.fault_summary().is_empty());
}

#[test]
fn literal_keywords_are_not_aliases() {
    let input = indoc! {"
        Animal
        Dog : Animal
    "};
    let (mut program, document) = load(input);

    let dog = program.expect_type(document, &["Dog"]);
    let keywords = dog.keywords(&mut program).unwrap();
    assert!(!keywords[0].is_alias);
    assert!(dog.aliases(&mut program).unwrap().is_empty());
    assert_eq!(dog.value(&mut program).unwrap(), "Animal");
}

#[test]
fn adjacents_share_a_container() {
    let input = indoc! {"
        Car
        \tEngine
        \tWheels
        \tDoors
    "};
    let (mut program, document) = load(input);

    let wheels = program.expect_type(document, &["Car", "Wheels"]);
    let adjacents = wheels.adjacents(&mut program).unwrap();
    assert_eq!(program.names(&adjacents), ["Engine", "Doors"]);
}

#[test]
fn adjacents_include_inherited_siblings() {
    let input = indoc! {"
        Class
        \tX
        \tY
        Sub : Class
        \tX
    "};
    let (mut program, document) = load(input);

    assert_eq!(program.containee_names(document, &["Sub"]), ["X", "Y"]);
    let x = program.expect_type(document, &["Sub", "X"]);
    let adjacents = x.adjacents(&mut program).unwrap();
    assert_eq!(program.names(&adjacents), ["Y"]);
    insta::assert_snapshot!(adjacents[0].display(&mut program).unwrap(), @"memory://0//Sub/Y");
}

#[test]
fn top_level_adjacents_are_the_other_roots() {
    let input = indoc! {"
        Car
        \tEngine
        Boat
        Plane
    "};
    let (mut program, document) = load(input);

    let boat = program.expect_type(document, &["Boat"]);
    let adjacents = boat.adjacents(&mut program).unwrap();
    assert_eq!(program.names(&adjacents), ["Car", "Plane"]);
}

#[test]
fn alias_derived_types_are_not_inbound_bases() {
    let input = indoc! {r"
        /\d+/ : Number
        Number
        Age : 42
    "};
    let (mut program, document) = load(input);

    let age = program.expect_type(document, &["Age"]);
    let pattern = age.bases(&mut program).unwrap()[0];
    assert!(pattern.is_pattern(&mut program).unwrap());
    assert!(pattern.each_inbound_base(&mut program).unwrap().is_empty());

    let number = program.expect_type(document, &["Number"]);
    assert_eq!(number.each_inbound_base(&mut program), Ok(vec![pattern]));
}

#[test]
fn inbound_indexes_settle_the_program() {
    let input = indoc! {"
        Animal
        Dog : Animal
        Cat : Animal
        Car
        \tEngine
        SportsCar : Car
        \tEngine
    "};
    let (mut program, document) = load(input);

    let animal = program.expect_type(document, &["Animal"]);
    let inbound = animal.each_inbound_base(&mut program).unwrap();
    assert_eq!(program.names(&inbound), ["Dog", "Cat"]);

    let engine = program.expect_type(document, &["Car", "Engine"]);
    let overriding = engine.each_inbound_parallel(&mut program).unwrap();
    assert_eq!(
        overriding[0].display(&mut program).unwrap(),
        "memory://0//SportsCar/Engine"
    );
}

#[test]
fn lookup_ignores_case() {
    let input = indoc! {"
        Dog
        Kennel
        \tdog
    "};
    let (mut program, _) = load(input);

    let found = program.lookup("DOG");
    assert_eq!(program.names(&found), ["Dog", "dog"]);
    assert!(program.lookup("Cat").is_empty());
}

#[test]
fn edits_retire_handles() {
    let input = indoc! {"
        Animal
        Dog : Animal
    "};
    let (mut program, document) = load(input);
    let dog = program.expect_type(document, &["Dog"]);
    assert!(!dog.is_dirty(&program));

    program
        .edit(document, |tx| {
            tx.insert(2, "Cat : Animal");
        })
        .unwrap();

    assert!(dog.is_dirty(&program));
    assert_eq!(dog.name(&program), Err(TypeError::Stale));
    assert_eq!(dog.bases(&mut program), Err(TypeError::Stale));

    let fresh = program.expect_type(document, &["Dog"]);
    assert_eq!(fresh.name(&program), Ok("Dog"));
}

#[test]
fn unimplemented_operations_say_so() {
    let (mut program, document) = load("Dog");
    let dog = program.expect_type(document, &["Dog"]);

    assert_eq!(
        dog.superordinates(&mut program),
        Err(TypeError::NotImplemented("superordinates"))
    );
    assert_eq!(
        dog.subordinates(&mut program),
        Err(TypeError::NotImplemented("subordinates"))
    );
    assert_eq!(
        dog.fold(&mut program),
        Err(TypeError::NotImplemented("fold"))
    );
}
