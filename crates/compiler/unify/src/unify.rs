use std::fmt;

use adt_collections::VecMap;
use adt_types::{Type, TypeVarName};
use itertools::Itertools;

use crate::env::Env;

/// Bindings of the left-hand side's type variables, in the order they were discovered.
///
/// Bindings are applied simultaneously: the right-hand side of a binding is never itself
/// substituted, since it lives in the other side's variable namespace.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: VecMap<TypeVarName, Type>,
}

impl Substitution {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn singleton(var: TypeVarName, ty: Type) -> Self {
        let mut subst = Self::default();
        subst.insert(var, ty);
        subst
    }

    pub fn get(&self, var: &TypeVarName) -> Option<&Type> {
        self.bindings.get(var)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// True when every binding maps a variable to itself, so applying it changes nothing.
    pub fn is_identity(&self) -> bool {
        self.bindings
            .iter()
            .all(|(var, ty)| ty.as_var() == Some(var))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&TypeVarName, &Type)> {
        self.bindings.iter()
    }

    pub(crate) fn insert(&mut self, var: TypeVarName, ty: Type) {
        self.bindings.insert(var, ty);
    }

    /// Specializes `ty` with these bindings; unbound variables stay as they are.
    pub fn apply(&self, ty: &Type) -> Type {
        resolve(ty, |var| self.get(var).cloned())
    }
}

impl fmt::Debug for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.bindings
                .iter()
                .map(|(var, ty)| format!("{var} := {ty:?}"))
                .join(", ")
        )
    }
}

impl FromIterator<(TypeVarName, Type)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (TypeVarName, Type)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Why two types failed to unify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mismatch {
    /// The two types have different shapes (different base names, a primitive against an array,
    /// a concrete type on the left against a variable on the right...).
    Structure { from: Type, to: Type },
    /// Same base name, different number of type arguments.
    Arity { from: Type, to: Type },
    /// A variable was already bound to a different type.
    Rebound {
        var: TypeVarName,
        bound: Type,
        attempted: Type,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Structure { from, to } => write!(f, "{from} does not match {to}"),
            Mismatch::Arity { from, to } => {
                write!(f, "{from} and {to} have a different number of type arguments")
            }
            Mismatch::Rebound {
                var,
                bound,
                attempted,
            } => write!(f, "{var} would have to be both {bound} and {attempted}"),
        }
    }
}

/// Unifies `from` against `to`, binding only the type variables of `from`.
pub fn unify(from: &Type, to: &Type) -> Option<Substitution> {
    let mut subst = Substitution::identity();
    match unify_in(&mut subst, from, to) {
        Ok(()) => Some(subst),
        Err(_) => None,
    }
}

/// Unifies `from` against `to` under an existing, growing substitution.
///
/// On failure `subst` may hold the bindings made before the mismatch was found.
pub fn unify_in(subst: &mut Substitution, from: &Type, to: &Type) -> Result<(), Mismatch> {
    let mut env = Env::new(subst);
    unify_help(&mut env, from, to)
}

fn unify_help(env: &mut Env, from: &Type, to: &Type) -> Result<(), Mismatch> {
    #[cfg(debug_assertions)]
    env.debug_start_unification(from, to);

    let result = unify_structure(env, from, to);

    #[cfg(debug_assertions)]
    env.debug_end_unification(from, to, result.is_ok());

    result
}

fn unify_structure(env: &mut Env, from: &Type, to: &Type) -> Result<(), Mismatch> {
    use Type::*;

    match (from, to) {
        // A variable is bound even when it meets itself, so that a later occurrence of the same
        // variable cannot silently be bound to something else.
        (Var(var), _) => env.bind(var, to),
        _ if from == to => Ok(()),
        (Apply(name1, args1), Apply(name2, args2)) if name1 == name2 => {
            if args1.len() != args2.len() {
                return Err(Mismatch::Arity {
                    from: from.clone(),
                    to: to.clone(),
                });
            }

            env.enter();
            let result = args1
                .iter()
                .zip(args2.iter())
                .try_for_each(|(arg1, arg2)| unify_help(env, arg1, arg2));
            env.exit();

            result
        }
        (Array(elem1), Array(elem2)) => {
            env.enter();
            let result = unify_help(env, elem1, elem2);
            env.exit();

            result
        }
        _ => Err(Mismatch::Structure {
            from: from.clone(),
            to: to.clone(),
        }),
    }
}

/// Replaces every variable that `lookup` resolves with its binding, recursing into type
/// arguments and array components.
pub fn resolve<F>(ty: &Type, lookup: F) -> Type
where
    F: Fn(&TypeVarName) -> Option<Type>,
{
    resolve_help(ty, &lookup)
}

fn resolve_help<F>(ty: &Type, lookup: &F) -> Type
where
    F: Fn(&TypeVarName) -> Option<Type>,
{
    match ty {
        Type::Var(var) => lookup(var).unwrap_or_else(|| ty.clone()),
        Type::Primitive(_) => ty.clone(),
        Type::Apply(name, args) => Type::Apply(
            name.clone(),
            args.iter().map(|arg| resolve_help(arg, lookup)).collect(),
        ),
        Type::Array(elem) => Type::Array(Box::new(resolve_help(elem, lookup))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ty(src: &str) -> Type {
        Type::parse(src).unwrap()
    }

    fn check_sound(from: &str, to: &str) -> Substitution {
        let (from, to) = (ty(from), ty(to));
        let subst = unify(&from, &to).unwrap();
        let resolved = subst.apply(&from);

        assert_eq!(resolved, to);
        assert!(unify(&resolved, &to).unwrap().is_identity());

        subst
    }

    #[test]
    fn binds_left_variables_in_discovery_order() {
        let subst = check_sound("a.Either<A, a.List<B>>", "a.Either<int, a.List<java.lang.String>>");

        assert_eq!(
            format!("{subst:?}"),
            "{A := int, B := java.lang.String}"
        );
    }

    #[test]
    fn bindings_are_simultaneous() {
        // `B` on the right is not the `B` being bound on the left.
        let subst = check_sound("a.Pair<A, B>", "a.Pair<B, java.lang.Integer>");

        assert_eq!(subst.apply(&ty("a.Equal<A>")), ty("a.Equal<B>"));
    }

    #[test]
    fn resolving_twice_changes_nothing() {
        let from = ty("a.Fn<A, a.List<B>>");
        let subst = check_sound("a.Fn<A, a.List<B>>", "a.Fn<java.lang.String, a.List<X>>");
        let once = subst.apply(&from);

        assert_eq!(subst.apply(&once), once);
    }

    #[test]
    fn arrays_unify_componentwise() {
        check_sound("A[]", "a.List<X>[]");
    }

    #[test]
    fn a_variable_must_be_bound_consistently() {
        let mut subst = Substitution::identity();
        let err = unify_in(
            &mut subst,
            &ty("a.Pair<A, A>"),
            &ty("a.Pair<java.lang.Integer, java.lang.Long>"),
        )
        .unwrap_err();

        assert_eq!(
            err,
            Mismatch::Rebound {
                var: "A".into(),
                bound: ty("java.lang.Integer"),
                attempted: ty("java.lang.Long"),
            }
        );
    }

    #[test]
    fn self_match_still_constrains_the_variable() {
        assert_eq!(unify(&ty("a.Pair<A, A>"), &ty("a.Pair<A, int>")), None);
        assert!(unify(&ty("a.Pair<A, A>"), &ty("a.Pair<A, A>")).unwrap().is_identity());
    }

    #[test]
    fn only_the_left_side_binds() {
        assert_eq!(unify(&ty("java.lang.Integer"), &ty("A")), None);
    }

    #[test]
    fn different_bases_and_arities() {
        assert_eq!(unify(&ty("a.List<A>"), &ty("a.Set<A>")), None);

        let mut subst = Substitution::identity();
        assert!(matches!(
            unify_in(&mut subst, &ty("a.F<A>"), &ty("a.F<A, B>")),
            Err(Mismatch::Arity { .. })
        ));
    }

    #[test]
    fn growing_substitution_is_shared() {
        let mut subst = Substitution::identity();
        unify_in(&mut subst, &ty("a.Equal<T>"), &ty("a.Equal<int>")).unwrap();

        assert!(unify_in(&mut subst, &ty("a.List<T>"), &ty("a.List<long>")).is_err());
        assert_eq!(subst.get(&"T".into()), Some(&ty("int")));
    }

    #[test]
    fn resolve_leaves_unbound_variables() {
        let subst = Substitution::singleton("T".into(), ty("java.lang.Integer"));

        assert_eq!(
            subst.apply(&ty("a.Exp<T>[]")),
            ty("a.Exp<java.lang.Integer>[]")
        );
        assert_eq!(subst.apply(&ty("a.Exp<U>")), ty("a.Exp<U>"));
    }
}
