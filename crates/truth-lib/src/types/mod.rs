//! Types: lazily materialized views over the parallel graph.
//!
//! A [`Type`] is a small copyable handle. Its data lives in the program's
//! type context for one generation, i.e. until the next edit. Every
//! accessor takes the program, checks the handle is still current, and
//! fails with [`TypeError::Stale`] otherwise.

mod context;

#[cfg(test)]
mod types_tests;

use crate::document::StatementId;
use crate::graph::Order;
use crate::phrase::PhraseId;
use crate::program::Program;

pub(crate) use context::{TypeContext, TypeSlot};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("type is stale: the program changed after it was constructed")]
    Stale,

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

/// An annotation of a type together with the type it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub word: String,
    pub ty: Type,
    /// The annotation resolved through a pattern rather than a declaration of the same name.
    pub is_alias: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Type {
    pub(crate) slot: TypeSlot,
    pub(crate) generation: u32,
}

macro_rules! flag {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub fn $name(self, program: &mut Program) -> Result<bool, TypeError> {
            let (types, mut env) = program.split_types();
            Ok(types.flags(&mut env, self)?.$name)
        }
    };
}

macro_rules! collection {
    ($(#[$doc:meta])* $name:ident -> $ret:ty) => {
        $(#[$doc])*
        pub fn $name(self, program: &mut Program) -> Result<$ret, TypeError> {
            let (types, mut env) = program.split_types();
            types.$name(&mut env, self)
        }
    };
}

impl Type {
    /// Materializes the type declared at `phrase`.
    ///
    /// Returns `None` for root phrases, and for hypothetical phrases that
    /// no declared type reaches through inheritance.
    pub fn construct(program: &mut Program, phrase: PhraseId) -> Option<Type> {
        let (types, mut env) = program.split_types();
        types.construct(&mut env, phrase)
    }

    pub fn name(self, program: &Program) -> Result<&str, TypeError> {
        program.types().name(self, program.version())
    }

    pub fn phrase(self, program: &Program) -> Result<PhraseId, TypeError> {
        program.types().phrase(self, program.version())
    }

    /// Depth of the type; top-level types are at level 1.
    pub fn level(self, program: &Program) -> Result<usize, TypeError> {
        let phrase = self.phrase(program)?;
        Ok(program.phrases().length(phrase))
    }

    /// Whether the program changed after this handle was issued.
    pub fn is_dirty(self, program: &Program) -> bool {
        program.types().is_dirty(self, program.version())
    }

    collection!(
        /// Statements declaring this type. Implicit types have none.
        statements -> Vec<StatementId>
    );
    collection!(container -> Option<Type>);
    collection!(containees -> Vec<Type>);
    collection!(containees_intrinsic -> Vec<Type>);
    collection!(bases -> Vec<Type>);
    collection!(
        /// Types occupying the same name in containers this type's container derives from.
        parallels -> Vec<Type>
    );
    collection!(parallel_roots -> Vec<Type>);
    collection!(adjacents -> Vec<Type>);
    collection!(patterns -> Vec<Type>);
    collection!(keywords -> Vec<Keyword>);
    collection!(aliases -> Vec<String>);
    collection!(
        /// Keyword words joined by `, `.
        value -> String
    );

    flag!(is_pattern);
    flag!(is_uri);
    flag!(is_anonymous);
    flag!(
        /// Declared with no parallels to override.
        is_fresh
    );
    flag!(
        /// Backed by a declaration rather than inferred from inheritance.
        is_explicit
    );
    flag!(
        /// Annotated with the name of the type it refines.
        is_refinement
    );
    flag!(is_list_intrinsic);
    flag!(is_list_extrinsic);

    pub fn is_override(self, program: &mut Program) -> Result<bool, TypeError> {
        Ok(!self.is_fresh(program)?)
    }

    pub fn is_introduction(self, program: &mut Program) -> Result<bool, TypeError> {
        self.is_fresh(program)
    }

    /// Types that list this one among their bases. Types that only
    /// reach it through an alias are left out.
    ///
    /// Settles the whole program first so that every declaration has
    /// been considered.
    pub fn each_inbound_base(self, program: &mut Program) -> Result<Vec<Type>, TypeError> {
        program.types().name(self, program.version())?;
        program.settle();
        let (types, mut env) = program.split_types();
        types.inbound_bases(&mut env, self)
    }

    /// Types that list this one among their parallels. Settles the program first.
    pub fn each_inbound_parallel(self, program: &mut Program) -> Result<Vec<Type>, TypeError> {
        program.types().name(self, program.version())?;
        program.settle();
        let (types, mut env) = program.split_types();
        types.inbound_parallels(&mut env, self)
    }

    pub fn superordinates(self, _program: &mut Program) -> Result<Vec<Type>, TypeError> {
        Err(TypeError::NotImplemented("superordinates"))
    }

    pub fn subordinates(self, _program: &mut Program) -> Result<Vec<Type>, TypeError> {
        Err(TypeError::NotImplemented("subordinates"))
    }

    pub fn fold(self, _program: &mut Program) -> Result<Type, TypeError> {
        Err(TypeError::NotImplemented("fold"))
    }

    /// Whether `base` is this type or one of its direct or transitive bases.
    pub fn is(self, program: &mut Program, base: Type) -> Result<bool, TypeError> {
        let (types, mut env) = program.split_types();
        types.is(&mut env, self, base)
    }

    pub fn has(self, program: &mut Program, containee: Type) -> Result<bool, TypeError> {
        let (types, mut env) = program.split_types();
        types.has(&mut env, self, containee)
    }

    /// Follows containee names, e.g. `["Engine", "Cylinders"]`.
    pub fn query(self, program: &mut Program, path: &[&str]) -> Result<Option<Type>, TypeError> {
        let (types, mut env) = program.split_types();
        types.query(&mut env, self, path)
    }

    /// Depth-first walk along `next`, each type yielded once.
    pub fn visit(
        self,
        program: &mut Program,
        order: Order,
        mut next: impl FnMut(&mut Program, Type) -> Result<Vec<Type>, TypeError>,
    ) -> Result<Vec<Type>, TypeError> {
        program.types().name(self, program.version())?;
        crate::graph::visit(self, order, |t| next(program, t))
    }

    /// `uri//A/B`
    pub fn display(self, program: &mut Program) -> Result<String, TypeError> {
        let (types, env) = program.split_types();
        types.display(&env, self)
    }

    /// `uri//A/B : Base, Other`
    pub fn display_full(self, program: &mut Program) -> Result<String, TypeError> {
        let (types, mut env) = program.split_types();
        types.display_full(&mut env, self)
    }
}
