use truth_lib::Program;

use super::query::describe;

fn program() -> (Program, truth_lib::DocumentId) {
    let mut program = Program::new();
    let document = program.add_document("Car\n\tEngine\nSportsCar : Car");
    (program, document)
}

#[test]
fn describe_explicit_type() {
    let (mut program, document) = program();
    let ty = program.query(document, &["SportsCar"]).unwrap();

    insta::assert_snapshot!(describe(&mut program, ty).unwrap(), @r"
    memory://0//SportsCar : Car
      bases: Car
      parallels: -
      containees: Engine
      aliases: -
      flags: explicit
    ");
}

#[test]
fn describe_inherited_member() {
    let (mut program, document) = program();
    let ty = program.query(document, &["SportsCar", "Engine"]).unwrap();

    insta::assert_snapshot!(describe(&mut program, ty).unwrap(), @r"
    memory://0//SportsCar/Engine
      bases: -
      parallels: memory://0//Car/Engine
      containees: -
      aliases: -
      flags: override
    ");
}
