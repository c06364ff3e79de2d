use std::path::PathBuf;

use truth_lib::{Program, Type, TypeError};

use super::loader::{load_program, print_faults};

pub struct QueryArgs {
    pub file: PathBuf,
    pub path: Vec<String>,
    pub full: bool,
    pub color: bool,
}

/// Returns the process exit code.
pub fn run(args: QueryArgs) -> i32 {
    let (mut program, loaded) = match load_program(std::slice::from_ref(&args.file)) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };

    let path: Vec<&str> = args.path.iter().map(String::as_str).collect();
    let Some(ty) = program.query(loaded[0].id, &path) else {
        println!("No type exists at the input URI.");
        return 1;
    };

    let described = if args.full {
        describe(&mut program, ty)
    } else {
        ty.display(&mut program)
    };
    match described {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    }

    let faults = program.verify();
    print_faults(&program, &faults, &loaded, args.color);
    0
}

/// Multi-line dump of one type.
pub fn describe(program: &mut Program, ty: Type) -> Result<String, TypeError> {
    let mut out = ty.display_full(program)?;

    let bases = ty.bases(program)?;
    let parallels = ty.parallels(program)?;
    let containees = ty.containees(program)?;
    let aliases = ty.aliases(program)?;

    push_line(&mut out, "bases", names(program, &bases)?);
    push_line(&mut out, "parallels", displays(program, &parallels)?);
    push_line(&mut out, "containees", names(program, &containees)?);
    push_line(&mut out, "aliases", aliases);
    push_line(&mut out, "flags", flags(program, ty)?);
    Ok(out)
}

fn push_line(out: &mut String, label: &str, items: Vec<String>) {
    let items = if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    };
    out.push_str(&format!("\n  {label}: {items}"));
}

fn names(program: &Program, types: &[Type]) -> Result<Vec<String>, TypeError> {
    types
        .iter()
        .map(|t| t.name(program).map(str::to_string))
        .collect()
}

fn displays(program: &mut Program, types: &[Type]) -> Result<Vec<String>, TypeError> {
    types.iter().map(|t| t.display(program)).collect()
}

fn flags(program: &mut Program, ty: Type) -> Result<Vec<String>, TypeError> {
    let checks: [(&str, fn(Type, &mut Program) -> Result<bool, TypeError>); 8] = [
        ("explicit", Type::is_explicit),
        ("override", Type::is_override),
        ("refinement", Type::is_refinement),
        ("list", Type::is_list_intrinsic),
        ("list-extrinsic", Type::is_list_extrinsic),
        ("pattern", Type::is_pattern),
        ("uri", Type::is_uri),
        ("anonymous", Type::is_anonymous),
    ];
    let mut out = Vec::new();
    for (label, check) in checks {
        if check(ty, program)? {
            out.push(label.to_string());
        }
    }
    Ok(out)
}
