//! Strict constructors.
//!
//! Every constructor becomes a private class holding exactly its fields, whose implementation
//! of the dispatch method calls back the matching case. A static factory named after the
//! constructor hides the class. Constructors without fields share a single instance.
use adt_derive_key::DeriveKey;
use adt_emit::{DerivedCode, Expr, FieldSpec, MethodSpec, Modifier, ParamSpec, Stmt, TypeSpec};
use adt_model::DataConstructor;
use adt_problem::DeriveProblem;
use adt_reflect::{TypeKind, Visibility};
use adt_types::Type;
use adt_unify::Substitution;

use crate::util::{capitalize, ident, lower_first, DeriveEnv};

pub(crate) fn derive_constructors(
    env: &mut DeriveEnv<'_>,
    _key: DeriveKey,
) -> Result<DerivedCode, DeriveProblem> {
    let mut code = DerivedCode::default();

    for constructor in env.adt.constructors() {
        code.push_type(constructor_class(env, constructor));
        if constructor.is_singleton() {
            code.fields.push(singleton_field(env, constructor));
        }
        code.methods.push(strict_factory(env, constructor));
        if constructor.is_restricted() {
            code.methods.push(unchecked_factory(env, constructor));
        }
    }

    Ok(code)
}

pub(crate) fn class_name(constructor: &DataConstructor) -> String {
    capitalize(&constructor.name)
}

/// Restricted type variables to their refinements.
pub(crate) fn restrictions(constructor: &DataConstructor) -> Substitution {
    constructor
        .type_restrictions
        .iter()
        .map(|r| (r.restricted_type_variable.clone(), r.refinement_type.clone()))
        .collect()
}

/// Extends (or implements) the data type the way the data type itself is declared.
pub(crate) fn subclass_of(env: &DeriveEnv<'_>, class: TypeSpec, supertype: Type) -> TypeSpec {
    match env.adt.type_constructor.kind {
        TypeKind::Interface => class.with_implements(supertype),
        TypeKind::AbstractClass | TypeKind::Class | TypeKind::Enum => class.with_extends(supertype),
    }
}

fn field_params(constructor: &DataConstructor) -> Vec<ParamSpec> {
    let restrictions = restrictions(constructor);
    constructor
        .arguments
        .iter()
        .map(|arg| ParamSpec::new(ident(&arg.name), restrictions.apply(&arg.ty)))
        .collect()
}

fn field_args(constructor: &DataConstructor) -> Vec<Expr> {
    constructor
        .arguments
        .iter()
        .map(|arg| Expr::name(ident(&arg.name)))
        .collect()
}

fn constructor_class(env: &DeriveEnv<'_>, constructor: &DataConstructor) -> TypeSpec {
    let restrictions = restrictions(constructor);
    let name = class_name(constructor);
    let params = field_params(constructor);

    let class = TypeSpec::class(name.clone(), Visibility::Private)
        .with_type_params(constructor.type_variables.clone());
    let mut class = subclass_of(env, class, constructor.returned_type.clone());

    class.fields = params
        .iter()
        .map(|param| FieldSpec::private_final(param.name.clone(), param.ty.clone()))
        .collect();

    let assignments = params
        .iter()
        .map(|param| Stmt::assign(Expr::this_field(param.name.clone()), Expr::name(param.name.clone())))
        .collect();
    class.constructors.push(
        MethodSpec::new(name, Visibility::Package)
            .with_params(params.clone())
            .with_body(assignments),
    );

    // Witnesses hold in this very class, where each restricted variable is its refinement.
    let mut case_args: Vec<Expr> = params
        .iter()
        .map(|param| Expr::this_field(param.name.clone()))
        .collect();
    case_args.extend(
        constructor
            .type_restrictions
            .iter()
            .map(|_| Expr::lambda(vec!["x".into()], Expr::name("x"))),
    );
    let call = Expr::name(env.case_param_name(constructor))
        .call(constructor.deconstructor.visitor_method.clone(), case_args);
    class
        .methods
        .push(env.dispatch_override(&restrictions, vec![Stmt::Return(call)]));

    class
}

fn constructor_type(env: &DeriveEnv<'_>, constructor: &DataConstructor) -> Type {
    let args = constructor
        .type_variables
        .iter()
        .map(|var| Type::Var(var.clone()))
        .collect();
    env.nested(&class_name(constructor), args)
}

fn singleton_name(constructor: &DataConstructor) -> String {
    format!("{}Singleton", lower_first(&constructor.name))
}

fn singleton_field(env: &DeriveEnv<'_>, constructor: &DataConstructor) -> FieldSpec {
    FieldSpec::private_final(singleton_name(constructor), env.raw_adt_type())
        .with_modifiers(vec![Modifier::Static, Modifier::Volatile])
}

fn strict_factory(env: &DeriveEnv<'_>, constructor: &DataConstructor) -> MethodSpec {
    let mut body = Vec::new();
    if env.config.arguments.checked_not_null {
        for (param, arg) in field_params(constructor).iter().zip(&constructor.arguments) {
            if param.ty.is_primitive() {
                continue;
            }
            body.push(Stmt::Expr(Expr::static_call(
                Type::class("java.util.Objects"),
                "requireNonNull",
                vec![Expr::name(param.name.clone()), Expr::str(format!("{} is null", arg.name))],
            )));
        }
    }

    let method = MethodSpec::function(env.factory_name(constructor), env.factory_visibility())
        .with_type_params(constructor.type_variables.clone())
        .with_params(field_params(constructor))
        .returning(constructor.returned_type.clone());

    if constructor.is_singleton() {
        body.extend(singleton_body(env, constructor));
        return method
            .with_annotation("SuppressWarnings(\"unchecked\")")
            .with_body(body);
    }

    body.push(Stmt::Return(Expr::new_diamond(
        constructor_type(env, constructor),
        field_args(constructor),
    )));
    method.with_body(body)
}

/// Double-checked creation of the shared instance: reads after the first one take no lock.
fn singleton_body(env: &DeriveEnv<'_>, constructor: &DataConstructor) -> Vec<Stmt> {
    let field = singleton_name(constructor);
    let local = "_singleton";
    let create = vec![
        Stmt::assign(Expr::name(local), Expr::name(field.clone())),
        Stmt::if_then(
            Expr::name(local).is_null(),
            vec![
                Stmt::assign(
                    Expr::name(local),
                    Expr::new_diamond(constructor_type(env, constructor), Vec::new()),
                ),
                Stmt::assign(Expr::name(field.clone()), Expr::name(local)),
            ],
        ),
    ];

    let result = if constructor.type_variables.is_empty() {
        Expr::name(local)
    } else {
        Expr::name(local).cast(constructor.returned_type.clone())
    };

    vec![
        Stmt::local(env.raw_adt_type(), local, Expr::name(field)),
        Stmt::if_then(
            Expr::name(local).is_null(),
            vec![Stmt::Synchronized {
                lock: Expr::Type(env.target_type()).field("class"),
                body: create,
            }],
        ),
        Stmt::Return(result),
    ]
}

/// `Name(fields..., witnesses...)`: the same value, typed as the unrestricted data type. The
/// witnesses are the caller's evidence that the restrictions hold.
fn unchecked_factory(env: &DeriveEnv<'_>, constructor: &DataConstructor) -> MethodSpec {
    let params: Vec<ParamSpec> = constructor
        .params()
        .map(|arg| ParamSpec::new(ident(&arg.name), arg.ty.clone()))
        .collect();
    let value = reconstruct(env, constructor, field_args(constructor));

    MethodSpec::function(env.factory_name(constructor), env.factory_visibility())
        .with_annotation(UNCHECKED)
        .with_type_params(env.type_vars())
        .with_params(params)
        .returning(env.adt_type().clone())
        .with_body(vec![Stmt::Return(value)])
}

pub(crate) const UNCHECKED: &str = "SuppressWarnings({\"unchecked\", \"rawtypes\"})";

/// Calls the strict factory of `constructor` with `args`, typed as the declared fields, and
/// yields the data type at its declared type variables. For a restricted constructor, both
/// sides go through unchecked casts; the enclosing method must suppress the warnings.
pub(crate) fn reconstruct(env: &DeriveEnv<'_>, constructor: &DataConstructor, args: Vec<Expr>) -> Expr {
    let restrictions = restrictions(constructor);
    let args = args
        .into_iter()
        .zip(&constructor.arguments)
        .map(|(expr, arg)| {
            let refined = restrictions.apply(&arg.ty);
            if refined == arg.ty {
                expr
            } else {
                expr.cast(Type::class("java.lang.Object")).cast(refined)
            }
        })
        .collect();
    let call = Expr::static_call(env.target_type(), env.factory_name(constructor), args);
    if constructor.is_restricted() {
        call.cast(env.raw_adt_type()).cast(env.adt_type().clone())
    } else {
        call
    }
}
