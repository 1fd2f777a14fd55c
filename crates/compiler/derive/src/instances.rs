//! Structural instances of the flavour's type classes.
//!
//! The instance for every field type is searched among the static members of, in order of
//! precedence: the field types' own declarations; their derived companions (including the
//! class being generated, which makes recursive fields work); the flavour's instance class; and
//! the configured fallback providers.
use adt_config::InstanceClass;
use adt_derive_key::{DeriveBuiltin, DeriveKey};
use adt_emit::{BinOp, DerivedCode, Expr, MethodSpec, ParamSpec, Stmt};
use adt_model::{DataArgument, DataConstructor};
use adt_problem::DeriveProblem;
use adt_reflect::TypeDecl;
use adt_types::{QualifiedName, Type};
use adt_unify::{
    InstanceError, InstanceExpr, InstanceSearch, LocalInstance, MemberKind, ProviderMember,
    ProviderSite,
};

use crate::util::{field_names, lower_first, DeriveEnv, Handler};

pub(crate) fn derive_instance(
    env: &mut DeriveEnv<'_>,
    key: DeriveKey,
) -> Result<DerivedCode, DeriveProblem> {
    let builtin = match key {
        DeriveKey::Instance(builtin) => builtin,
        DeriveKey::Make(make) => {
            adt_error_macros::internal_error!("{} is not an instance", make.name())
        }
    };
    let Some(class) = env.types.instance(builtin) else {
        return Err(DeriveProblem::UnsupportedInstance {
            decl: env.element(),
            instance: builtin.name(),
            flavour: env.config.flavour.name(),
        });
    };

    let derivation = InstanceDerivation::new(env, builtin, class)?;
    let body = derivation.body()?;
    Ok(DerivedCode {
        types: Vec::new(),
        fields: Vec::new(),
        methods: vec![derivation.method(body)],
    })
}

struct InstanceDerivation<'e, 'a> {
    env: &'e DeriveEnv<'a>,
    builtin: DeriveBuiltin,
    class: InstanceClass,
    sites: Vec<ProviderSite>,
    locals: Vec<LocalInstance>,
}

impl<'e, 'a> InstanceDerivation<'e, 'a> {
    fn new(
        env: &'e DeriveEnv<'a>,
        builtin: DeriveBuiltin,
        class: InstanceClass,
    ) -> Result<Self, DeriveProblem> {
        let mut derivation = Self {
            env,
            builtin,
            class,
            sites: Vec::new(),
            locals: Vec::new(),
        };
        derivation.locals = derivation
            .params()
            .into_iter()
            .map(|p| LocalInstance {
                name: p.name,
                ty: p.ty,
            })
            .collect();
        derivation.sites = derivation.provider_sites()?;
        Ok(derivation)
    }

    fn class_simple_name(&self) -> String {
        self.class.name().simple_name().to_string()
    }

    /// `exprEqual`, for `Equal` instances of `Expr`.
    fn method_name(&self) -> String {
        format!(
            "{}{}",
            lower_first(self.env.adt.name().simple_name()),
            self.class_simple_name()
        )
    }

    /// One instance parameter per type variable of the data type.
    fn params(&self) -> Vec<ParamSpec> {
        self.env
            .type_vars()
            .into_iter()
            .map(|var| {
                let name = format!("{}{}", lower_first(var.as_str()), self.class_simple_name());
                ParamSpec::new(name, self.class.apply(Type::Var(var)))
            })
            .collect()
    }

    fn method(&self, body: Expr) -> MethodSpec {
        MethodSpec::function(self.method_name(), self.env.api_visibility())
            .with_type_params(self.env.type_vars())
            .with_params(self.params())
            .returning(self.class.apply(self.env.adt_type().clone()))
            .with_body(vec![Stmt::Return(body)])
    }

    /// The static members of `decl` that yield an instance of the class from instances of it.
    fn site(&self, decl: &TypeDecl, precedence: u32) -> ProviderSite {
        let class = self.class.name();
        let fields = decl
            .static_fields()
            .filter(|field| field.ty.is_application_of(&class))
            .map(|field| ProviderMember {
                name: field.name.clone(),
                kind: MemberKind::Field,
                type_vars: Vec::new(),
                params: Vec::new(),
                returns: field.ty.clone(),
            });
        let methods = decl
            .static_methods()
            .filter(|method| {
                method.return_type.is_application_of(&class)
                    && method.params.iter().all(|p| p.ty.is_application_of(&class))
            })
            .map(|method| ProviderMember {
                name: method.name.clone(),
                kind: MemberKind::Method,
                type_vars: method.type_params.iter().map(|p| p.name.clone()).collect(),
                params: method.params.iter().map(|p| p.ty.clone()).collect(),
                returns: method.return_type.clone(),
            });

        ProviderSite {
            owner: decl.name.clone(),
            precedence,
            members: fields.chain(methods).collect(),
        }
    }

    /// The method being derived, as its own provider.
    fn own_site(&self) -> ProviderSite {
        ProviderSite {
            owner: self.env.unit.clone(),
            precedence: 1,
            members: vec![ProviderMember {
                name: self.method_name(),
                kind: MemberKind::Method,
                type_vars: self.env.type_vars(),
                params: self.params().into_iter().map(|p| p.ty).collect(),
                returns: self.class.apply(self.env.adt_type().clone()),
            }],
        }
    }

    fn provider_sites(&self) -> Result<Vec<ProviderSite>, DeriveProblem> {
        let env = self.env;
        let mut names: Vec<QualifiedName> = vec![env.adt.name().clone()];
        for arg in env.adt.constructors().iter().flat_map(|c| c.arguments.iter()) {
            collect_names(&arg.ty.boxed(), &mut names);
        }

        let mut sites = Vec::new();
        for name in names.iter() {
            if let Some(decl) = env.universe.type_decl(name) {
                sites.push(self.site(decl, 0));
            }
            let companion = env.config.target.class_name(name);
            if companion == env.unit {
                continue;
            }
            if let Some(decl) = env.universe.type_decl(&companion) {
                sites.push(self.site(decl, 1));
            }
        }
        sites.push(self.own_site());

        let class = self.class.name();
        sites.push(self.site(self.required_decl(&class)?, 2));
        for provider in env.config.fallback_providers.iter() {
            sites.push(self.site(self.required_decl(provider)?, 3));
        }

        Ok(sites)
    }

    fn required_decl(&self, name: &QualifiedName) -> Result<&'a TypeDecl, DeriveProblem> {
        self.env
            .universe
            .type_decl(name)
            .ok_or_else(|| DeriveProblem::DependencyUnavailable {
                element: self.env.element(),
                name: name.clone(),
            })
    }

    /// The instance for `arg` of `constructor`.
    fn instance(&self, constructor: &DataConstructor, arg: &DataArgument) -> Result<Expr, DeriveProblem> {
        let required = self.class.apply(arg.ty.boxed());
        let element = || {
            self.env
                .element()
                .member(&constructor.name, constructor.region)
                .param(&arg.name, constructor.region)
        };
        match InstanceSearch::new(&self.sites, &self.locals).find(&required) {
            Ok(expr) => Ok(instance_expr(&expr)),
            Err(InstanceError::NotFound { required }) => Err(DeriveProblem::NoInstance {
                element: element(),
                instance: self.builtin.name(),
                required,
            }),
            Err(InstanceError::Ambiguous {
                required,
                candidates,
            }) => Err(DeriveProblem::AmbiguousInstance {
                element: element(),
                instance: self.builtin.name(),
                required,
                candidates,
            }),
        }
    }

    /// `[(instance, field1, field2)]` for the fields of `constructor`, named with the suffixes.
    fn compared_fields(
        &self,
        constructor: &DataConstructor,
    ) -> Result<Vec<(Expr, String, String)>, DeriveProblem> {
        let left = field_names(constructor, "1");
        let right = field_names(constructor, "2");
        constructor
            .arguments
            .iter()
            .zip(left.into_iter().zip(right))
            .map(|(arg, (l, r))| Ok((self.instance(constructor, arg)?, l, r)))
            .collect()
    }

    fn factory(&self, lambda: Expr) -> Expr {
        Expr::static_call(Type::Apply(self.class.name(), Vec::new()), self.class.factory, vec![lambda])
    }

    fn body(&self) -> Result<Expr, DeriveProblem> {
        match self.builtin {
            DeriveBuiltin::Equal => self.equal(),
            DeriveBuiltin::Order => self.order(),
            DeriveBuiltin::Hash => self.hash(),
            DeriveBuiltin::Show => self.show(),
        }
    }

    /// Dispatches on both values: a handler per pair of constructors, built by `pair`.
    fn binary(
        &self,
        result: &Type,
        mut pair: impl FnMut(&DataConstructor, &DataConstructor) -> Result<Handler, DeriveProblem>,
    ) -> Result<Expr, DeriveProblem> {
        let env = self.env;
        let constructors = env.adt.constructors();
        let mut outer = Vec::with_capacity(constructors.len());
        for left in constructors {
            let inner = constructors
                .iter()
                .map(|right| pair(left, right))
                .collect::<Result<Vec<_>, _>>()?;
            outer.push(Handler::suffixed(
                left,
                "1",
                env.dispatch(Expr::name("_y"), inner, result),
            ));
        }
        let body = env.dispatch(Expr::name("_x"), outer, result);
        Ok(self.factory(Expr::lambda(vec!["_x".into(), "_y".into()], body)))
    }

    fn unary(
        &self,
        result: &Type,
        mut handler: impl FnMut(&DataConstructor) -> Result<Expr, DeriveProblem>,
    ) -> Result<Expr, DeriveProblem> {
        let handlers = self
            .env
            .adt
            .constructors()
            .iter()
            .map(|c| Ok(Handler::fields(c, handler(c)?)))
            .collect::<Result<Vec<_>, DeriveProblem>>()?;
        let body = self.env.dispatch(Expr::name("_x"), handlers, result);
        Ok(self.factory(Expr::lambda(vec!["_x".into()], body)))
    }

    fn equal(&self) -> Result<Expr, DeriveProblem> {
        let method = self.class.method;
        self.binary(&Type::class("java.lang.Boolean"), |left, right| {
            if left.index != right.index {
                return Ok(Handler::suffixed(right, "2", Expr::Bool(false)));
            }
            let comparisons = self
                .compared_fields(left)?
                .into_iter()
                .map(|(instance, l, r)| instance.call(method, vec![Expr::name(l), Expr::name(r)]));
            Ok(Handler::suffixed(
                right,
                "2",
                Expr::fold(BinOp::And, comparisons, Expr::Bool(true)),
            ))
        })
    }

    /// Constructors in declaration order, then fields lexicographically.
    fn order(&self) -> Result<Expr, DeriveProblem> {
        let Some(ordering) = self.env.types.ordering else {
            return Err(DeriveProblem::UnsupportedInstance {
                decl: self.env.element(),
                instance: self.builtin.name(),
                flavour: self.env.config.flavour.name(),
            });
        };
        let ordering_type = Type::Apply(ordering.name(), Vec::new());
        let constant = |name: &str| Expr::Type(ordering_type.clone()).field(name);
        let method = self.class.method;

        self.binary(&ordering_type, |left, right| {
            if left.index < right.index {
                return Ok(Handler::suffixed(right, "2", constant(ordering.less)));
            }
            if left.index > right.index {
                return Ok(Handler::suffixed(right, "2", constant(ordering.greater)));
            }

            let fields = self.compared_fields(left)?;
            let last = fields.len().saturating_sub(1);
            let mut body = Vec::new();
            for (i, (instance, l, r)) in fields.into_iter().enumerate() {
                let compare = instance.call(method, vec![Expr::name(l), Expr::name(r)]);
                if i == last {
                    body.push(Stmt::Return(compare));
                    break;
                }
                let local = format!("_o{i}");
                body.push(Stmt::local(ordering_type.clone(), local.clone(), compare));
                body.push(Stmt::if_then(
                    Expr::binary(BinOp::Ne, Expr::name(local.clone()), constant(ordering.equal)),
                    vec![Stmt::Return(Expr::name(local))],
                ));
            }
            if body.is_empty() {
                body.push(Stmt::Return(constant(ordering.equal)));
            }
            Ok(Handler::block(right, "2", body))
        })
    }

    /// `31 * h + field hash`, seeded by a prime chosen by constructor.
    fn hash(&self) -> Result<Expr, DeriveProblem> {
        let method = self.class.method;
        self.unary(&Type::class("java.lang.Integer"), |constructor| {
            let hashes = self.field_instances(constructor)?;
            let seed = Expr::Int(nth_prime_from_23(constructor.index));
            Ok(hashes.into_iter().fold(seed, |acc, (instance, field)| {
                Expr::binary(
                    BinOp::Add,
                    Expr::binary(BinOp::Mul, Expr::Int(31), acc),
                    instance.call(method, vec![Expr::name(field)]),
                )
            }))
        })
    }

    /// `Name(field1, field2)`, or `Name` alone.
    fn show(&self) -> Result<Expr, DeriveProblem> {
        let method = self.class.method;
        self.unary(&Type::class("java.lang.String"), |constructor| {
            let fields = self.field_instances(constructor)?;
            if fields.is_empty() {
                return Ok(Expr::str(constructor.name.clone()));
            }
            let mut shown = Vec::new();
            for (i, (instance, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    shown.push(Expr::str(", "));
                }
                shown.push(instance.call(method, vec![Expr::name(field)]));
            }
            let mut parts = vec![Expr::str(format!("{}(", constructor.name))];
            parts.extend(shown);
            parts.push(Expr::str(")"));
            Ok(Expr::fold(BinOp::Add, parts, Expr::str("")))
        })
    }

    fn field_instances(&self, constructor: &DataConstructor) -> Result<Vec<(Expr, String)>, DeriveProblem> {
        constructor
            .arguments
            .iter()
            .zip(field_names(constructor, ""))
            .map(|(arg, name)| Ok((self.instance(constructor, arg)?, name)))
            .collect()
    }
}

fn collect_names(ty: &Type, names: &mut Vec<QualifiedName>) {
    if let Some(name) = ty.base_name() {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    for arg in ty.args() {
        collect_names(arg, names);
    }
}

fn instance_expr(expr: &InstanceExpr) -> Expr {
    match expr {
        InstanceExpr::Local(name) => Expr::name(name.clone()),
        InstanceExpr::Member {
            owner,
            name,
            kind: MemberKind::Field,
            ..
        } => Expr::Type(Type::Apply(owner.clone(), Vec::new())).field(name.clone()),
        InstanceExpr::Member {
            owner, name, args, ..
        } => Expr::static_call(
            Type::Apply(owner.clone(), Vec::new()),
            name.clone(),
            args.iter().map(instance_expr).collect(),
        ),
    }
}

fn nth_prime_from_23(n: usize) -> i64 {
    let is_prime = |k: i64| (2..).take_while(|d| d * d <= k).all(|d| k % d != 0);
    (23..).filter(|&k| is_prime(k)).nth(n).unwrap_or(23)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seeds_are_distinct_primes() {
        let seeds: Vec<i64> = (0..5).map(nth_prime_from_23).collect();
        assert_eq!(seeds, [23, 29, 31, 37, 41]);
    }
}
