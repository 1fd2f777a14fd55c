//! A visitor whose methods are the constructors: dispatching a value on it rebuilds the value.
use adt_derive_key::DeriveKey;
use adt_emit::{DerivedCode, Expr, FieldSpec, MethodSpec, Modifier, ParamSpec, Stmt, TypeSpec};
use adt_problem::DeriveProblem;
use adt_reflect::Visibility;
use adt_unify::Substitution;

use crate::constructors::{reconstruct, UNCHECKED};
use crate::util::{field_names, ident, DeriveEnv};

const FACTORY_CLASS: &str = "Factory";
const FACTORY_FIELD: &str = "FACTORY";

pub(crate) fn derive_factory(
    env: &mut DeriveEnv<'_>,
    _key: DeriveKey,
) -> Result<DerivedCode, DeriveProblem> {
    let adt = env.adt_type().clone();
    let to_adt = Substitution::singleton(env.adt.result_var().clone(), adt.clone());
    let Some(visitor) = env.adt.visitor().map(|v| to_adt.apply(v)) else {
        return Ok(DerivedCode::default());
    };

    let mut class = TypeSpec::class(FACTORY_CLASS, Visibility::Private)
        .with_type_params(env.type_vars())
        .with_implements(visitor.clone());
    for constructor in env.adt.constructors() {
        let params = constructor
            .params()
            .map(|p| ParamSpec::new(ident(&p.name), to_adt.apply(&p.ty)))
            .collect();
        let fields = field_names(constructor, "").into_iter().map(Expr::name).collect();
        let method =
            MethodSpec::new(constructor.deconstructor.visitor_method.clone(), Visibility::Public)
                .overriding();
        let method = if constructor.is_restricted() {
            method.with_annotation(UNCHECKED)
        } else {
            method
        };
        class.methods.push(
            method
                .with_params(params)
                .returning(adt.clone())
                .with_body(vec![Stmt::Return(reconstruct(env, constructor, fields))]),
        );
    }

    let raw = env.nested(FACTORY_CLASS, Vec::new());
    let instance = FieldSpec::private_final(FACTORY_FIELD, raw.clone())
        .with_modifiers(vec![Modifier::Static, Modifier::Final])
        .with_init(Expr::New {
            ty: raw,
            diamond: false,
            args: Vec::new(),
        });

    let accessor = MethodSpec::function("factory", env.api_visibility())
        .with_annotation("SuppressWarnings(\"unchecked\")")
        .with_type_params(env.type_vars())
        .returning(visitor.clone())
        .with_body(vec![Stmt::Return(
            Expr::name(FACTORY_FIELD).cast(visitor),
        )]);

    Ok(DerivedCode {
        types: vec![class],
        fields: vec![instance],
        methods: vec![accessor],
    })
}
