//! Searching for an instance (an `Equal<T>`, an `Order<T>`...) among provider sites.
//!
//! A provider is a static field or a static method of some declaration whose return type can be
//! unified with the required instance type. A method's parameters are themselves instances that
//! must be found, under the bindings its return type produced.
use std::fmt;

use adt_types::{QualifiedName, Type, TypeVarName};
use itertools::Itertools;

use crate::unify::{resolve, unify};

/// Nested instance requirements are followed at most this deep.
pub const MAX_SEARCH_DEPTH: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderMember {
    pub name: String,
    pub kind: MemberKind,
    pub type_vars: Vec<TypeVarName>,
    pub params: Vec<Type>,
    pub returns: Type,
}

/// A declaration whose static members may provide instances.
///
/// Sites with a lower `precedence` are searched first; sites sharing a precedence form one level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderSite {
    pub owner: QualifiedName,
    pub precedence: u32,
    pub members: Vec<ProviderMember>,
}

/// An instance already in scope: a parameter of the method being derived, or the instance that
/// is being defined (for recursive fields).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalInstance {
    pub name: String,
    pub ty: Type,
}

/// How to obtain an instance, as an expression tree.
#[derive(Clone, PartialEq, Eq)]
pub enum InstanceExpr {
    Local(String),
    Member {
        owner: QualifiedName,
        name: String,
        kind: MemberKind,
        args: Vec<InstanceExpr>,
    },
}

impl fmt::Debug for InstanceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceExpr::Local(name) => f.write_str(name),
            InstanceExpr::Member {
                owner,
                name,
                kind: MemberKind::Field,
                ..
            } => write!(f, "{}.{}", owner.simple_name(), name),
            InstanceExpr::Member {
                owner, name, args, ..
            } => write!(
                f,
                "{}.{}({})",
                owner.simple_name(),
                name,
                args.iter().map(|arg| format!("{arg:?}")).join(", ")
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstanceError {
    NotFound {
        required: Type,
    },
    /// Several members of the same precedence level match.
    Ambiguous {
        required: Type,
        candidates: Vec<String>,
    },
}

impl InstanceError {
    pub fn required(&self) -> &Type {
        match self {
            InstanceError::NotFound { required } | InstanceError::Ambiguous { required, .. } => {
                required
            }
        }
    }
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceError::NotFound { required } => {
                write!(f, "no instance of {required} could be found")
            }
            InstanceError::Ambiguous {
                required,
                candidates,
            } => write!(
                f,
                "ambiguous instances of {required}: {}",
                candidates.join(", ")
            ),
        }
    }
}

pub struct InstanceSearch<'a> {
    sites: Vec<&'a ProviderSite>,
    locals: &'a [LocalInstance],
}

impl<'a> InstanceSearch<'a> {
    pub fn new(sites: &'a [ProviderSite], locals: &'a [LocalInstance]) -> Self {
        let sites = sites
            .iter()
            .sorted_by_key(|site| site.precedence)
            .collect();

        Self { sites, locals }
    }

    pub fn find(&self, required: &Type) -> Result<InstanceExpr, InstanceError> {
        self.find_help(required, 0)
    }

    fn find_help(&self, required: &Type, depth: usize) -> Result<InstanceExpr, InstanceError> {
        if let Some(local) = self.locals.iter().find(|local| &local.ty == required) {
            return Ok(InstanceExpr::Local(local.name.clone()));
        }

        if depth >= MAX_SEARCH_DEPTH {
            return Err(InstanceError::NotFound {
                required: required.clone(),
            });
        }

        let levels = self.sites.iter().chunk_by(|site| site.precedence);
        for (precedence, level) in &levels {
            let mut found = Vec::new();

            for site in level {
                for member in site.members.iter() {
                    adt_debug_flags::dbg_do!(adt_debug_flags::ADT_PRINT_INSTANCE_SEARCH, {
                        eprintln!(
                            "{}[{}] {}.{} : {:?} for {:?}",
                            "  ".repeat(depth),
                            precedence,
                            site.owner.simple_name(),
                            member.name,
                            member.returns,
                            required
                        );
                    });

                    match self.try_member(site, member, required, depth)? {
                        Some(expr) => found.push(expr),
                        None => continue,
                    }
                }
            }

            match found.len() {
                0 => continue,
                1 => {
                    let expr = found.remove(0);
                    tracing::debug!(?required, ?expr, precedence, "found instance");
                    return Ok(expr);
                }
                _ => {
                    return Err(InstanceError::Ambiguous {
                        required: required.clone(),
                        candidates: found.iter().map(|expr| format!("{expr:?}")).collect(),
                    })
                }
            }
        }

        Err(InstanceError::NotFound {
            required: required.clone(),
        })
    }

    /// `Ok(None)` when the member does not apply; errors only when a nested requirement is
    /// ambiguous, which makes the whole search ambiguous.
    fn try_member(
        &self,
        site: &ProviderSite,
        member: &ProviderMember,
        required: &Type,
        depth: usize,
    ) -> Result<Option<InstanceExpr>, InstanceError> {
        // The member's own type variables are renamed apart from the ones in `required`.
        let rename = |var: &TypeVarName| {
            member
                .type_vars
                .contains(var)
                .then(|| Type::Var(TypeVarName::new(format!("{var}'"))))
        };
        let returns = resolve(&member.returns, rename);

        let subst = match unify(&returns, required) {
            Some(subst) => subst,
            None => return Ok(None),
        };

        let mut args = Vec::with_capacity(member.params.len());
        for param in member.params.iter() {
            let param_required = subst.apply(&resolve(param, rename));
            match self.find_help(&param_required, depth + 1) {
                Ok(arg) => args.push(arg),
                Err(InstanceError::NotFound { .. }) => return Ok(None),
                Err(ambiguous) => return Err(ambiguous),
            }
        }

        Ok(Some(InstanceExpr::Member {
            owner: site.owner.clone(),
            name: member.name.clone(),
            kind: member.kind,
            args,
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ty(src: &str) -> Type {
        Type::parse(src).unwrap()
    }

    fn field(name: &str, returns: &str) -> ProviderMember {
        ProviderMember {
            name: name.to_string(),
            kind: MemberKind::Field,
            type_vars: Vec::new(),
            params: Vec::new(),
            returns: ty(returns),
        }
    }

    fn method(name: &str, vars: &[&str], params: &[&str], returns: &str) -> ProviderMember {
        ProviderMember {
            name: name.to_string(),
            kind: MemberKind::Method,
            type_vars: vars.iter().map(|var| TypeVarName::from(*var)).collect(),
            params: params.iter().map(|param| ty(param)).collect(),
            returns: ty(returns),
        }
    }

    fn site(owner: &str, precedence: u32, members: Vec<ProviderMember>) -> ProviderSite {
        ProviderSite {
            owner: owner.into(),
            precedence,
            members,
        }
    }

    fn jdk_instances() -> ProviderSite {
        site(
            "fj.Equal",
            2,
            vec![
                field("intEqual", "fj.Equal<java.lang.Integer>"),
                field("stringEqual", "fj.Equal<java.lang.String>"),
                method("listEqual", &["A"], &["fj.Equal<A>"], "fj.Equal<fj.data.List<A>>"),
                method(
                    "p2Equal",
                    &["A", "B"],
                    &["fj.Equal<A>", "fj.Equal<B>"],
                    "fj.Equal<fj.P2<A, B>>",
                ),
            ],
        )
    }

    #[test]
    fn nested_requirements_resolve_recursively() {
        let sites = [jdk_instances()];
        let locals = [LocalInstance {
            name: "bEqual".into(),
            ty: ty("fj.Equal<B>"),
        }];
        let search = InstanceSearch::new(&sites, &locals);

        let expr = search
            .find(&ty("fj.Equal<fj.data.List<fj.P2<B, java.lang.Integer>>>"))
            .unwrap();

        assert_eq!(
            format!("{expr:?}"),
            "Equal.listEqual(Equal.p2Equal(bEqual, Equal.intEqual))"
        );
    }

    #[test]
    fn earlier_levels_shadow_later_ones() {
        let sites = [
            jdk_instances(),
            site(
                "a.Person",
                0,
                vec![field("personEqual", "fj.Equal<a.Person>")],
            ),
            site("a.Fallback", 3, vec![field("anyPerson", "fj.Equal<a.Person>")]),
        ];
        let search = InstanceSearch::new(&sites, &[]);

        assert_eq!(
            format!("{:?}", search.find(&ty("fj.Equal<a.Person>")).unwrap()),
            "Person.personEqual"
        );
    }

    #[test]
    fn two_matches_in_one_level_are_ambiguous() {
        let sites = [
            site("a.Fallback1", 3, vec![field("one", "fj.Equal<a.Person>")]),
            site("a.Fallback2", 3, vec![field("two", "fj.Equal<a.Person>")]),
        ];
        let search = InstanceSearch::new(&sites, &[]);

        assert_eq!(
            search.find(&ty("fj.Equal<a.Person>")),
            Err(InstanceError::Ambiguous {
                required: ty("fj.Equal<a.Person>"),
                candidates: vec!["Fallback1.one".into(), "Fallback2.two".into()],
            })
        );
    }

    #[test]
    fn members_with_unsatisfiable_parameters_are_skipped() {
        let sites = [jdk_instances()];
        let search = InstanceSearch::new(&sites, &[]);

        assert_eq!(
            search.find(&ty("fj.Equal<fj.data.List<a.Unknown>>")),
            Err(InstanceError::NotFound {
                required: ty("fj.Equal<fj.data.List<a.Unknown>>"),
            })
        );
    }

    #[test]
    fn self_reference_is_a_local() {
        let locals = [LocalInstance {
            name: "exprEqual".into(),
            ty: ty("fj.Equal<a.Expr>"),
        }];
        let sites = [jdk_instances()];
        let search = InstanceSearch::new(&sites, &locals);

        assert_eq!(
            format!("{:?}", search.find(&ty("fj.Equal<fj.data.List<a.Expr>>")).unwrap()),
            "Equal.listEqual(exprEqual)"
        );
    }
}
