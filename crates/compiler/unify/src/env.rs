use adt_types::{Type, TypeVarName};

use crate::unify::{Mismatch, Substitution};

/// State threaded through one call to [`crate::unify_in`].
pub(crate) struct Env<'a> {
    subst: &'a mut Substitution,
    depth: usize,
}

impl std::ops::Deref for Env<'_> {
    type Target = Substitution;

    fn deref(&self) -> &Self::Target {
        self.subst
    }
}

impl<'a> Env<'a> {
    pub fn new(subst: &'a mut Substitution) -> Self {
        Self { subst, depth: 0 }
    }

    /// Records `var := ty`. A variable that is already bound must be bound to the very same type.
    pub fn bind(&mut self, var: &TypeVarName, ty: &Type) -> Result<(), Mismatch> {
        match self.subst.get(var) {
            Some(existing) if existing == ty => Ok(()),
            Some(existing) => Err(Mismatch::Rebound {
                var: var.clone(),
                bound: existing.clone(),
                attempted: ty.clone(),
            }),
            None => {
                self.subst.insert(var.clone(), ty.clone());
                Ok(())
            }
        }
    }

    pub fn enter(&mut self) {
        self.depth += 1;
    }

    pub fn exit(&mut self) {
        self.depth -= 1;
    }

    #[cfg(debug_assertions)]
    pub fn debug_start_unification(&self, from: &Type, to: &Type) {
        adt_debug_flags::dbg_do!(adt_debug_flags::ADT_PRINT_UNIFICATIONS, {
            eprintln!(
                "{}{:?} ~ {:?}",
                "  ".repeat(self.depth),
                from,
                to
            );
        });
        tracing::trace!(depth = self.depth, ?from, ?to, "start unification");
    }

    #[cfg(debug_assertions)]
    pub fn debug_end_unification(&self, from: &Type, to: &Type, success: bool) {
        adt_debug_flags::dbg_do!(adt_debug_flags::ADT_PRINT_UNIFICATIONS, {
            let mark = if success { "ok" } else { "FAILED" };
            eprintln!(
                "{}{:?} ~ {:?} => {} {:?}",
                "  ".repeat(self.depth),
                from,
                to,
                mark,
                self.subst
            );
        });
        tracing::trace!(depth = self.depth, ?from, ?to, success, "end unification");
    }
}
