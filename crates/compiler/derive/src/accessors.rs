//! Getters, modifiers and setters.
use adt_derive_key::{DeriveKey, Make};
use adt_emit::{DerivedCode, Expr, MethodSpec, ParamSpec, Stmt};
use adt_model::{AlgebraicDataType, DataArgument};
use adt_problem::DeriveProblem;
use adt_runtime::{AccessorKind, AccessorPlan, FieldPlan};
use adt_types::Type;

use crate::constructors::{reconstruct, UNCHECKED};
use crate::util::{capitalize, field_names, ident, DeriveEnv, Handler};

const MODIFIER: &str = "_mod";
const VALUE: &str = "_value";

/// Classifies every field of `adt` as a lens or an optional field.
pub fn plan(adt: &AlgebraicDataType) -> AccessorPlan {
    let fields = adt
        .fields
        .iter()
        .map(|field| FieldPlan {
            name: field.name.clone(),
            kind: if adt.is_lens(&field.name) {
                AccessorKind::Lens
            } else {
                AccessorKind::Optional
            },
            positions: adt
                .constructors()
                .iter()
                .map(|c| c.arguments.iter().position(|arg| arg.name == field.name))
                .collect(),
        })
        .collect();
    AccessorPlan { fields }
}

pub(crate) fn derive_accessors(
    env: &mut DeriveEnv<'_>,
    key: DeriveKey,
) -> Result<DerivedCode, DeriveProblem> {
    let mut code = DerivedCode::default();
    for field in env.adt.fields.iter() {
        let lens = env.adt.is_lens(&field.name);
        match key {
            DeriveKey::Make(Make::Getters) if lens => code.methods.push(lens_getter(env, field)),
            DeriveKey::Make(Make::Getters) => code.methods.push(optional_getter(env, field)),
            DeriveKey::Make(Make::Modifiers) if lens => {
                code.methods.push(modifier(env, field));
                code.methods.push(setter(env, field));
            }
            _ => {}
        }
    }
    Ok(code)
}

fn getter_name(field: &DataArgument) -> String {
    format!("get{}", capitalize(&field.name))
}

fn modifier_name(field: &DataArgument) -> String {
    format!("mod{}", capitalize(&field.name))
}

fn getter(env: &DeriveEnv<'_>, field: &DataArgument, returns: Type, body: Expr) -> MethodSpec {
    MethodSpec::function(getter_name(field), env.api_visibility())
        .with_type_params(env.type_vars())
        .with_params(vec![ParamSpec::new(env.value_name(), env.adt_type().clone())])
        .returning(returns)
        .with_body(vec![Stmt::Return(body)])
}

fn lens_getter(env: &DeriveEnv<'_>, field: &DataArgument) -> MethodSpec {
    let handlers = env
        .adt
        .constructors()
        .iter()
        .map(|c| Handler::fields(c, Expr::name(ident(&field.name))))
        .collect();
    let body = env.dispatch(Expr::name(env.value_name()), handlers, &field.ty);
    getter(env, field, field.ty.clone(), body)
}

fn optional_getter(env: &DeriveEnv<'_>, field: &DataArgument) -> MethodSpec {
    let option = env.types.option;
    let option_class = Type::class(option.class);
    let returns = option.apply(field.ty.clone());
    let handlers = env
        .adt
        .constructors()
        .iter()
        .map(|c| {
            let value = match c.argument(&field.name) {
                Some(_) => Expr::static_call(
                    option_class.clone(),
                    option.some,
                    vec![Expr::name(ident(&field.name))],
                ),
                None => Expr::static_call(option_class.clone(), option.none, Vec::new()),
            };
            Handler::fields(c, value)
        })
        .collect();
    let body = env.dispatch(Expr::name(env.value_name()), handlers, &returns);
    getter(env, field, returns, body)
}

/// `modF(f)`: a function rebuilding its argument through the strict factories, with the field
/// transformed by `f`.
fn modifier(env: &DeriveEnv<'_>, field: &DataArgument) -> MethodSpec {
    let adt = env.adt_type().clone();
    let function = env.types.function();
    let apply = function.method;
    let value = env.value_name();

    let handlers = env
        .adt
        .constructors()
        .iter()
        .map(|c| {
            let args = c
                .arguments
                .iter()
                .zip(field_names(c, ""))
                .map(|(arg, name)| {
                    if arg.name == field.name {
                        Expr::name(MODIFIER).call(apply, vec![Expr::name(name)])
                    } else {
                        Expr::name(name)
                    }
                })
                .collect();
            Handler::fields(c, reconstruct(env, c, args))
        })
        .collect();
    let body = Expr::lambda(
        vec![value.clone()],
        env.dispatch(Expr::name(value), handlers, &adt),
    );

    let method = MethodSpec::function(modifier_name(field), env.api_visibility());
    let method = if env.adt.constructors().iter().any(|c| c.is_restricted()) {
        method.with_annotation(UNCHECKED)
    } else {
        method
    };
    method
        .with_type_params(env.type_vars())
        .with_params(vec![ParamSpec::new(
            MODIFIER,
            function.apply(vec![field.ty.boxed(), field.ty.boxed()]),
        )])
        .returning(function.apply(vec![adt.clone(), adt]))
        .with_body(vec![Stmt::Return(body)])
}

/// `setF(v)`: the modifier with a constant function.
fn setter(env: &DeriveEnv<'_>, field: &DataArgument) -> MethodSpec {
    let adt = env.adt_type().clone();
    let function = env.types.function();
    let constant = Expr::lambda(vec!["_ignored".into()], Expr::name(VALUE));

    MethodSpec::function(format!("set{}", capitalize(&field.name)), env.api_visibility())
        .with_type_params(env.type_vars())
        .with_params(vec![ParamSpec::new(VALUE, field.ty.clone())])
        .returning(function.apply(vec![adt.clone(), adt]))
        .with_body(vec![Stmt::Return(Expr::local_call(
            modifier_name(field),
            vec![constant],
        ))])
}
