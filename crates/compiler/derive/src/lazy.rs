//! The lazy constructor: a value of the data type whose construction is deferred to its first
//! use, and happens once whichever thread gets there first.
use adt_derive_key::DeriveKey;
use adt_emit::{
    BinOp, DerivedCode, Expr, FieldSpec, MethodSpec, Modifier, ParamSpec, Stmt, TypeSpec,
};
use adt_problem::DeriveProblem;
use adt_reflect::Visibility;
use adt_types::Type;
use adt_unify::Substitution;

use crate::constructors::subclass_of;
use crate::util::DeriveEnv;

const LAZY_CLASS: &str = "Lazy";
const EXPRESSION: &str = "expression";
const EVALUATION: &str = "evaluation";
const EVALUATE: &str = "_evaluate";

pub(crate) fn derive_lazy(
    env: &mut DeriveEnv<'_>,
    _key: DeriveKey,
) -> Result<DerivedCode, DeriveProblem> {
    if env.adt.is_enum() {
        env.warn(DeriveProblem::LazyConstructorOnEnum {
            decl: env.element(),
        });
        return Ok(DerivedCode::default());
    }

    let adt = env.adt_type().clone();
    let supplier = env.types.supplier();
    let supplier_type = supplier.apply(vec![adt.clone()]);
    let lazy_type = env.nested(LAZY_CLASS, env.type_var_types());

    let factory = MethodSpec::function("lazy", env.api_visibility())
        .with_type_params(env.type_vars())
        .with_params(vec![ParamSpec::new(EXPRESSION, supplier_type.clone())])
        .returning(adt.clone())
        .with_body(vec![Stmt::Return(Expr::new_diamond(
            lazy_type,
            vec![Expr::name(EXPRESSION)],
        ))]);

    let class = TypeSpec::class(LAZY_CLASS, Visibility::Private).with_type_params(env.type_vars());
    let mut class = subclass_of(env, class, adt.clone());
    class.fields = vec![
        FieldSpec::private_final(EXPRESSION, supplier_type.clone())
            .with_modifiers(vec![Modifier::Volatile]),
        FieldSpec::private_final(EVALUATION, adt.clone()).with_modifiers(Vec::new()),
    ];
    class.constructors.push(
        MethodSpec::new(LAZY_CLASS, Visibility::Package)
            .with_params(vec![ParamSpec::new(EXPRESSION, supplier_type.clone())])
            .with_body(vec![Stmt::assign(
                Expr::this_field(EXPRESSION),
                Expr::name(EXPRESSION),
            )]),
    );
    class.methods.push(evaluate(env, &supplier_type, supplier.method));

    let forced = Expr::conditional(
        Expr::this_field(EXPRESSION).is_null(),
        Expr::this_field(EVALUATION),
        Expr::This.call(EVALUATE, Vec::new()),
    );
    let params = env.dispatch_params(&Substitution::identity());
    let call = forced.call(
        env.adt.match_method.name.clone(),
        params.iter().map(|p| Expr::name(p.name.clone())).collect(),
    );
    class.methods.push(env.dispatch_override(&Substitution::identity(), vec![Stmt::Return(call)]));

    Ok(DerivedCode {
        types: vec![class],
        fields: Vec::new(),
        methods: vec![factory],
    })
}

/// Forces the supplier under the lock, then keeps unwrapping while the result is itself a lazy
/// value. A nested lazy value is forced through its own `_evaluate`, so its supplier also runs
/// at most once and its result stays cached in it.
fn evaluate(env: &DeriveEnv<'_>, supplier_type: &Type, get: &str) -> MethodSpec {
    let adt = env.adt_type().clone();
    let raw_lazy = env.nested(LAZY_CLASS, Vec::new());
    let lazy = env.nested(LAZY_CLASS, env.type_var_types());

    let unwrap = vec![
        Stmt::local(lazy.clone(), "_lazy", Expr::name("_value").cast(lazy)),
        Stmt::local(
            supplier_type.clone(),
            "_next",
            Expr::name("_lazy").field(EXPRESSION),
        ),
        Stmt::assign(
            Expr::name("_value"),
            Expr::conditional(
                Expr::name("_next").is_null(),
                Expr::name("_lazy").field(EVALUATION),
                Expr::name("_lazy").call(EVALUATE, Vec::new()),
            ),
        ),
    ];

    let force = vec![
        Stmt::local(adt.clone(), "_value", Expr::name("_expression").call(get, Vec::new())),
        Stmt::While {
            cond: Expr::InstanceOf {
                expr: Box::new(Expr::name("_value")),
                ty: raw_lazy,
            },
            body: unwrap,
        },
        Stmt::assign(Expr::this_field(EVALUATION), Expr::name("_value")),
        Stmt::assign(Expr::this_field(EXPRESSION), Expr::Null),
    ];

    MethodSpec::new(EVALUATE, Visibility::Private)
        .with_modifiers(vec![Modifier::Synchronized])
        .returning(adt)
        .with_body(vec![
            Stmt::local(
                supplier_type.clone(),
                "_expression",
                Expr::this_field(EXPRESSION),
            ),
            Stmt::if_then(
                Expr::binary(BinOp::Ne, Expr::name("_expression"), Expr::Null),
                force,
            ),
            Stmt::Return(Expr::this_field(EVALUATION)),
        ])
}
