//! Catamorphisms over directly recursive data types.
//!
//! Recursive fields reach the mapper already folded, through the caller's `delay`, which is
//! where a trampolining or memoizing strategy plugs in.
use adt_derive_key::DeriveKey;
use adt_emit::{DerivedCode, Expr, FieldSpec, MethodSpec, ParamSpec, Stmt, TypeSpec};
use adt_model::{AlgebraicDataType, DataConstructor};
use adt_problem::DeriveProblem;
use adt_reflect::Visibility;
use adt_runtime::{ConstructorShape, RecursionShape};
use adt_types::{Type, TypeVarName};
use adt_unify::Substitution;

use crate::util::{field_names, handler_name, ident, DeriveEnv, Handler};

const CATA_CLASS: &str = "Cata";
const CATA_VISITOR: &str = "CataVisitor";
const DELAY: &str = "delay";
const FOLD: &str = "fold";

/// Whether a catamorphism exists: some field is the data type itself, and no field refers to
/// the data type at other type arguments.
pub fn applies(adt: &AlgebraicDataType) -> bool {
    let arguments = || adt.constructors().iter().flat_map(|c| c.arguments.iter());
    arguments().any(|arg| adt.is_self_reference(&arg.ty))
        && arguments()
            .filter(|arg| arg.ty.is_application_of(adt.name()))
            .all(|arg| adt.is_self_reference(&arg.ty))
}

/// The positions of recursive fields, per constructor.
pub fn shape(adt: &AlgebraicDataType) -> Option<RecursionShape> {
    if !applies(adt) {
        return None;
    }
    let constructors = adt
        .constructors()
        .iter()
        .map(|c| ConstructorShape {
            name: c.name.clone(),
            arity: c.arguments.len(),
            recursive: recursive_positions(adt, c),
        })
        .collect();
    Some(RecursionShape { constructors })
}

fn recursive_positions(adt: &AlgebraicDataType, constructor: &DataConstructor) -> Vec<usize> {
    constructor
        .arguments
        .iter()
        .enumerate()
        .filter(|(_, arg)| adt.is_self_reference(&arg.ty))
        .map(|(i, _)| i)
        .collect()
}

pub(crate) fn derive_cata(
    env: &mut DeriveEnv<'_>,
    _key: DeriveKey,
) -> Result<DerivedCode, DeriveProblem> {
    if !applies(env.adt) {
        tracing::debug!(adt = %env.adt.name(), "not recursive, no catamorphism");
        return Ok(DerivedCode::default());
    }

    let cata = Cata::new(env);
    let mut code = DerivedCode::default();
    env.add_function_helpers(&mut code);
    code.append(cata.fold_class());
    if env.adt.visitor().is_some() {
        code.append(cata.visitor_class());
    }
    Ok(code)
}

struct Cata<'e, 'a> {
    env: &'e DeriveEnv<'a>,
    result: TypeVarName,
}

impl<'e, 'a> Cata<'e, 'a> {
    fn new(env: &'e DeriveEnv<'a>) -> Self {
        Self {
            env,
            result: env.result_var(),
        }
    }

    fn result_type(&self) -> Type {
        Type::Var(self.result.clone())
    }

    fn vars_and_result(&self) -> Vec<Type> {
        let mut args = self.env.type_var_types();
        args.push(self.result_type());
        args
    }

    /// One mapper per constructor, taking recursive fields as already folded results, then
    /// `delay`.
    fn params(&self) -> Vec<ParamSpec> {
        let result = self.result_type();
        let mut params: Vec<ParamSpec> = self
            .env
            .adt
            .constructors()
            .iter()
            .map(|c| {
                let args: Vec<Type> = c
                    .arguments
                    .iter()
                    .map(|arg| {
                        if self.env.adt.is_self_reference(&arg.ty) {
                            result.clone()
                        } else {
                            arg.ty.clone()
                        }
                    })
                    .collect();
                ParamSpec::new(handler_name(c), self.env.handler_type(&args, &result))
            })
            .collect();

        let types = self.env.types;
        let delayed = types.supplier().apply(vec![result.clone()]);
        params.push(ParamSpec::new(
            DELAY,
            types.function().apply(vec![delayed, result]),
        ));
        params
    }

    fn holder(&self, name: &str, implements: Option<Type>) -> TypeSpec {
        let params = self.params();
        let mut class = TypeSpec::class(name, Visibility::Private)
            .with_type_params(self.env.type_vars_and(&self.result));
        if let Some(implements) = implements {
            class = class.with_implements(implements);
        }
        class.fields = params
            .iter()
            .map(|p| FieldSpec::private_final(p.name.clone(), p.ty.clone()))
            .collect();
        class.constructors.push(
            MethodSpec::new(name, Visibility::Package)
                .with_params(params.clone())
                .with_body(
                    params
                        .iter()
                        .map(|p| {
                            Stmt::assign(Expr::this_field(p.name.clone()), Expr::name(p.name.clone()))
                        })
                        .collect(),
                ),
        );
        class
    }

    /// `this.m.apply(a, this.delay.apply(() -> <recurse on e>), ...)` for the fields of
    /// `constructor`.
    fn mapped(&self, constructor: &DataConstructor, recurse: impl Fn(Expr) -> Expr) -> Expr {
        let delay = self.env.types.function().method;
        let args = constructor
            .arguments
            .iter()
            .zip(field_names(constructor, ""))
            .map(|(arg, name)| {
                if self.env.adt.is_self_reference(&arg.ty) {
                    Expr::this_field(DELAY).call(
                        delay,
                        vec![Expr::lambda(Vec::new(), recurse(Expr::name(name)))],
                    )
                } else {
                    Expr::name(name)
                }
            })
            .collect();
        Expr::this_field(handler_name(constructor))
            .call(self.env.handler_method(constructor.arguments.len()), args)
    }

    fn constructor_args(&self) -> Vec<Expr> {
        self.params()
            .into_iter()
            .map(|p| Expr::name(p.name))
            .collect()
    }

    fn fold_class(&self) -> DerivedCode {
        let env = self.env;
        let adt = env.adt_type().clone();
        let result = self.result_type();
        let value = env.value_name();

        let handlers = env
            .adt
            .constructors()
            .iter()
            .map(|c| Handler::fields(c, self.mapped(c, |e| Expr::This.call(FOLD, vec![e]))))
            .collect();
        let fold = MethodSpec::new(FOLD, Visibility::Package)
            .with_params(vec![ParamSpec::new(value.clone(), adt.clone())])
            .returning(result.clone())
            .with_body(vec![Stmt::Return(env.dispatch(
                Expr::name(value),
                handlers,
                &result,
            ))]);
        let mut class = self.holder(CATA_CLASS, None);
        class.methods.push(fold);

        let cata_type = env.nested(CATA_CLASS, self.vars_and_result());
        let entry = MethodSpec::function("cata", env.api_visibility())
            .with_type_params(env.type_vars_and(&self.result))
            .with_params(self.params())
            .returning(env.types.function().apply(vec![adt, result]))
            .with_body(vec![
                Stmt::local(
                    cata_type.clone(),
                    "_cata",
                    Expr::new_diamond(cata_type, self.constructor_args()),
                ),
                Stmt::Return(Expr::MethodRef {
                    target: Box::new(Expr::name("_cata")),
                    method: FOLD.into(),
                }),
            ]);

        DerivedCode {
            types: vec![class],
            fields: Vec::new(),
            methods: vec![entry],
        }
    }

    /// The same fold, as a visitor the dispatch method can take directly.
    fn visitor_class(&self) -> DerivedCode {
        let env = self.env;
        let result = self.result_type();
        let to_result = Substitution::singleton(env.adt.result_var().clone(), result.clone());
        let Some(visitor) = env.adt.visitor().map(|v| to_result.apply(v)) else {
            return DerivedCode::default();
        };
        let dispatch = env.adt.match_method.name.clone();

        let mut class = self.holder(CATA_VISITOR, Some(visitor.clone()));
        for constructor in env.adt.constructors() {
            let params = constructor
                .params()
                .map(|p| ParamSpec::new(ident(&p.name), to_result.apply(&p.ty)))
                .collect();
            let body = self.mapped(constructor, |e| e.call(dispatch.clone(), vec![Expr::This]));
            class.methods.push(
                MethodSpec::new(constructor.deconstructor.visitor_method.clone(), Visibility::Public)
                    .overriding()
                    .with_params(params)
                    .returning(result.clone())
                    .with_body(vec![Stmt::Return(body)]),
            );
        }

        let entry = MethodSpec::function("cataVisitor", env.api_visibility())
            .with_type_params(env.type_vars_and(&self.result))
            .with_params(self.params())
            .returning(visitor)
            .with_body(vec![Stmt::Return(Expr::new_diamond(
                env.nested(CATA_VISITOR, self.vars_and_result()),
                self.constructor_args(),
            ))]);

        DerivedCode {
            types: vec![class],
            fields: Vec::new(),
            methods: vec![entry],
        }
    }
}
