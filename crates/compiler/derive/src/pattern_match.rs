//! Pattern-matching builders.
//!
//! A match is built one constructor at a time. The total path goes through one step type per
//! constructor, in declaration order, and only the last step yields the terminal, so a match
//! that type checks handles every constructor. Naming a later constructor early leaves the total
//! path for a `PartialMatcher`, whose only terminal is `otherwise`.
//!
//! `Cases` builds a reusable function; `CaseOf` is closed over one value.
use adt_derive_key::DeriveKey;
use adt_emit::{
    BinOp, DerivedCode, Expr, FieldSpec, MethodSpec, Modifier, ParamSpec, Stmt, TypeSpec,
};
use adt_model::DataConstructor;
use adt_problem::DeriveProblem;
use adt_reflect::Visibility;
use adt_types::{Type, TypeVarName};
use adt_unify::Substitution;

use crate::constructors::class_name;
use crate::util::{field_names, handler_name, ident, DeriveEnv, Handler, CASES_FACTORY};

const LAMBDA_CASES: &str = "LambdaCases";
const HANDLERS: &str = "Handlers";
const PARTIAL: &str = "PartialMatcher";
const RETURN_VALUE: &str = "_returnValue";
const OTHERWISE: &str = "_otherwise";

pub(crate) fn derive_pattern_matching(
    env: &mut DeriveEnv<'_>,
    _key: DeriveKey,
) -> Result<DerivedCode, DeriveProblem> {
    let mut code = DerivedCode::default();
    if env.adt.constructors().is_empty() {
        return Ok(code);
    }

    env.add_function_helpers(&mut code);
    if env.adt.visitor().is_some() {
        code.append(lambda_cases(env));
    }
    code.append(Matchers::new(env, Family::Cases).derive());
    if env.adt.constructors().len() >= 2 {
        code.append(Matchers::new(env, Family::CaseOf).derive());
    }

    Ok(code)
}

/// `cases(h1, ..., hN)`: a visitor whose methods call the given handlers.
fn lambda_cases(env: &DeriveEnv<'_>) -> DerivedCode {
    let result = env.result_var();
    let result_type = Type::Var(result.clone());
    let to_result = Substitution::singleton(env.adt.result_var().clone(), result_type.clone());
    let visitor = env.adt.visitor().map(|v| to_result.apply(v)).unwrap_or_else(|| {
        adt_error_macros::internal_error!("lambda cases derived for {} without a visitor", env.adt)
    });

    let handlers: Vec<ParamSpec> = env
        .adt
        .constructors()
        .iter()
        .map(|c| ParamSpec::new(handler_name(c), env.constructor_handler_type(c, &result_type)))
        .collect();

    let factory = MethodSpec::function(CASES_FACTORY, env.api_visibility())
        .with_type_params(env.type_vars_and(&result))
        .with_params(handlers.clone())
        .returning(visitor.clone())
        .with_body(vec![Stmt::Return(Expr::new_diamond(
            env.nested(LAMBDA_CASES, {
                let mut args = env.type_var_types();
                args.push(result_type.clone());
                args
            }),
            handlers.iter().map(|h| Expr::name(h.name.clone())).collect(),
        ))]);

    let mut class = TypeSpec::class(LAMBDA_CASES, Visibility::Private)
        .with_type_params(env.type_vars_and(&result))
        .with_implements(visitor);
    class.fields = handlers
        .iter()
        .map(|h| FieldSpec::private_final(h.name.clone(), h.ty.clone()))
        .collect();
    class.constructors.push(
        MethodSpec::new(LAMBDA_CASES, Visibility::Package)
            .with_params(handlers.clone())
            .with_body(
                handlers
                    .iter()
                    .map(|h| Stmt::assign(Expr::this_field(h.name.clone()), Expr::name(h.name.clone())))
                    .collect(),
            ),
    );
    for (constructor, handler) in env.adt.constructors().iter().zip(&handlers) {
        let params = constructor
            .params()
            .map(|p| ParamSpec::new(ident(&p.name), to_result.apply(&p.ty)))
            .collect();
        let fields = field_names(constructor, "");
        let call = Expr::this_field(handler.name.clone()).call(
            env.handler_method(fields.len()),
            fields.into_iter().map(Expr::name).collect(),
        );
        class.methods.push(
            MethodSpec::new(constructor.deconstructor.visitor_method.clone(), Visibility::Public)
                .overriding()
                .with_params(params)
                .returning(result_type.clone())
                .with_body(vec![Stmt::Return(call)]),
        );
    }

    DerivedCode {
        types: vec![class],
        fields: Vec::new(),
        methods: vec![factory],
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Family {
    Cases,
    CaseOf,
}

impl Family {
    fn holder(self) -> &'static str {
        match self {
            Family::Cases => "CasesMatchers",
            Family::CaseOf => "CaseOfMatchers",
        }
    }

    fn entry(self) -> &'static str {
        match self {
            Family::Cases => "cases",
            Family::CaseOf => "caseOf",
        }
    }
}

/// What a builder knows about one handler slot.
enum Slot {
    /// Supplied on the total path, hence present.
    Set(Expr),
    Missing,
    /// Held by a partial matcher, possibly null.
    Unknown(Expr),
}

struct Matchers<'e, 'a> {
    env: &'e DeriveEnv<'a>,
    family: Family,
    result: TypeVarName,
}

impl<'e, 'a> Matchers<'e, 'a> {
    fn new(env: &'e DeriveEnv<'a>, family: Family) -> Self {
        Self {
            env,
            family,
            result: env.result_var(),
        }
    }

    fn constructors(&self) -> &'a [DataConstructor] {
        self.env.adt.constructors()
    }

    fn result_type(&self) -> Type {
        Type::Var(self.result.clone())
    }

    fn builder_type(&self, name: &str, args: Vec<Type>) -> Type {
        Type::Apply(
            self.env.target.child(self.family.holder()).child(name),
            args,
        )
    }

    fn vars_and_result(&self) -> Vec<Type> {
        let mut args = self.env.type_var_types();
        args.push(self.result_type());
        args
    }

    fn step_name(&self, index: usize) -> String {
        format!("TotalMatcher_{}", class_name(&self.constructors()[index]))
    }

    /// The first step fixes no result type; its methods are generic in it.
    fn step_type(&self, index: usize) -> Type {
        let args = if index == 0 {
            self.env.type_var_types()
        } else {
            self.vars_and_result()
        };
        self.builder_type(&self.step_name(index), args)
    }

    fn value_name(&self) -> String {
        self.env.value_name()
    }

    fn handler_param(&self, constructor: &DataConstructor) -> ParamSpec {
        ParamSpec::new(
            handler_name(constructor),
            self.env.constructor_handler_type(constructor, &self.result_type()),
        )
    }

    /// The held value, for families closed over one.
    fn value_param(&self) -> Vec<ParamSpec> {
        match self.family {
            Family::Cases => Vec::new(),
            Family::CaseOf => vec![ParamSpec::new(self.value_name(), self.env.adt_type().clone())],
        }
    }

    fn value_arg(&self) -> Vec<Expr> {
        match self.family {
            Family::Cases => Vec::new(),
            Family::CaseOf => vec![Expr::this_field(self.value_name())],
        }
    }

    /// Type parameters of a builder method: only the first step's methods introduce the result.
    fn method_type_params(&self, step: Option<usize>) -> Vec<TypeVarName> {
        match step {
            Some(0) => vec![self.result.clone()],
            _ => Vec::new(),
        }
    }

    fn derive(&self) -> DerivedCode {
        let n = self.constructors().len();
        let mut holder = TypeSpec::class(self.family.holder(), self.env.api_visibility());
        holder
            .constructors
            .push(MethodSpec::new(self.family.holder(), Visibility::Private).with_body(Vec::new()));

        holder.types.push(self.handlers());
        for index in 0..n {
            holder.types.push(self.step(index));
        }
        if n >= 2 {
            holder.types.push(self.partial());
        }

        DerivedCode {
            types: vec![holder],
            fields: Vec::new(),
            methods: vec![self.entry()],
        }
    }

    fn entry(&self) -> MethodSpec {
        MethodSpec::function(self.family.entry(), self.env.api_visibility())
            .with_type_params(self.env.type_vars())
            .with_params(self.value_param())
            .returning(self.step_type(0))
            .with_body(vec![Stmt::Return(Expr::new_diamond(
                self.step_type(0),
                self.value_param()
                    .into_iter()
                    .map(|p| Expr::name(p.name))
                    .collect(),
            ))])
    }

    /// The common base of the steps after the first: every handler slot, filled or not.
    fn handlers(&self) -> TypeSpec {
        let mut params = self.value_param();
        params.extend(self.constructors().iter().map(|c| self.handler_param(c)));

        let mut class = TypeSpec::class(HANDLERS, Visibility::Public)
            .with_modifiers(vec![Modifier::Static, Modifier::Abstract])
            .with_type_params(self.env.type_vars_and(&self.result));
        class.fields = params
            .iter()
            .map(|p| {
                FieldSpec::private_final(p.name.clone(), p.ty.clone())
                    .with_visibility(Visibility::Package)
            })
            .collect();
        class.constructors.push(
            MethodSpec::new(HANDLERS, Visibility::Package)
                .with_params(params.clone())
                .with_body(
                    params
                        .iter()
                        .map(|p| Stmt::assign(Expr::this_field(p.name.clone()), Expr::name(p.name.clone())))
                        .collect(),
                ),
        );
        class
    }

    fn handlers_type(&self) -> Type {
        self.builder_type(HANDLERS, self.vars_and_result())
    }

    fn step(&self, index: usize) -> TypeSpec {
        let constructors = self.constructors();
        let name = self.step_name(index);
        let class = TypeSpec::class(name.clone(), Visibility::Public);

        let mut class = if index == 0 {
            let mut class = class.with_type_params(self.env.type_vars());
            let value = self.value_param();
            class.fields = value
                .iter()
                .map(|p| FieldSpec::private_final(p.name.clone(), p.ty.clone()))
                .collect();
            class.constructors.push(
                MethodSpec::new(name, Visibility::Package)
                    .with_params(value.clone())
                    .with_body(
                        value
                            .iter()
                            .map(|p| Stmt::assign(Expr::this_field(p.name.clone()), Expr::name(p.name.clone())))
                            .collect(),
                    ),
            );
            class
        } else {
            let mut params = self.value_param();
            params.extend(constructors[..index].iter().map(|c| self.handler_param(c)));
            let mut args: Vec<Expr> = params.iter().map(|p| Expr::name(p.name.clone())).collect();
            args.extend(constructors[index..].iter().map(|_| Expr::Null));

            let mut class = class
                .with_type_params(self.env.type_vars_and(&self.result))
                .with_extends(self.handlers_type());
            class.constructors.push(
                MethodSpec::new(name, Visibility::Package)
                    .with_params(params)
                    .with_body(vec![Stmt::Expr(Expr::local_call("super", args))]),
            );
            class
        };

        let supplied: Vec<Expr> = constructors[..index]
            .iter()
            .map(|c| Expr::this_field(handler_name(c)))
            .collect();

        // The producing method: the only way forward on the total path.
        let constructor = &constructors[index];
        let param = self.handler_param(constructor);
        let mut handlers = supplied.clone();
        handlers.push(Expr::name(param.name.clone()));
        let (returns, body) = if index + 1 == constructors.len() {
            let handlers = handlers.into_iter().map(Handler::Value).collect();
            self.terminal(handlers, &self.result_type())
        } else {
            let mut args = self.value_arg();
            args.extend(handlers);
            (
                self.step_type(index + 1),
                Expr::new_diamond(self.step_type(index + 1), args),
            )
        };
        class.methods.extend(self.handler_methods(Some(index), constructor, param, returns, body));

        // Skipping ahead leaves the total path.
        for later in &constructors[index + 1..] {
            let param = self.handler_param(later);
            let mut args = self.value_arg();
            for c in constructors {
                args.push(if c.index < index {
                    Expr::this_field(handler_name(c))
                } else if c.index == later.index {
                    Expr::name(param.name.clone())
                } else {
                    Expr::Null
                });
            }
            let body = Expr::new_diamond(self.builder_type(PARTIAL, self.vars_and_result()), args);
            let returns = self.builder_type(PARTIAL, self.vars_and_result());
            class.methods.extend(self.handler_methods(Some(index), later, param, returns, body));
        }

        if index >= 2 {
            let slots = constructors
                .iter()
                .enumerate()
                .map(|(i, _)| match supplied.get(i) {
                    Some(handler) => Slot::Set(handler.clone()),
                    None => Slot::Missing,
                })
                .collect::<Vec<_>>();
            class.methods.extend(self.otherwise_methods(&slots));
        }

        class
    }

    fn partial(&self) -> TypeSpec {
        let constructors = self.constructors();
        let mut params = self.value_param();
        params.extend(constructors.iter().map(|c| self.handler_param(c)));

        let mut class = TypeSpec::class(PARTIAL, Visibility::Public)
            .with_type_params(self.env.type_vars_and(&self.result))
            .with_extends(self.handlers_type());
        class.constructors.push(
            MethodSpec::new(PARTIAL, Visibility::Package)
                .with_params(params.clone())
                .with_body(vec![Stmt::Expr(Expr::local_call(
                    "super",
                    params.iter().map(|p| Expr::name(p.name.clone())).collect(),
                ))]),
        );

        for constructor in constructors {
            let param = self.handler_param(constructor);
            let mut args = self.value_arg();
            for c in constructors {
                args.push(if c.index == constructor.index {
                    Expr::name(param.name.clone())
                } else {
                    Expr::this_field(handler_name(c))
                });
            }
            let body = Expr::new_diamond(self.builder_type(PARTIAL, self.vars_and_result()), args);
            let returns = self.builder_type(PARTIAL, self.vars_and_result());
            class.methods.extend(self.handler_methods(None, constructor, param, returns, body));
        }

        let slots: Vec<Slot> = constructors
            .iter()
            .map(|c| Slot::Unknown(Expr::this_field(handler_name(c))))
            .collect();
        class.methods.extend(self.otherwise_methods(&slots));

        class
    }

    /// A method taking the handler of `constructor`, and its constant-value overload.
    fn handler_methods(
        &self,
        step: Option<usize>,
        constructor: &DataConstructor,
        param: ParamSpec,
        returns: Type,
        body: Expr,
    ) -> [MethodSpec; 2] {
        let method = MethodSpec::new(constructor.name.clone(), Visibility::Public)
            .with_type_params(self.method_type_params(step))
            .with_params(vec![param])
            .returning(returns.clone())
            .with_body(vec![Stmt::Return(body)]);

        let constant = Expr::lambda(field_names(constructor, ""), Expr::name(RETURN_VALUE));
        let overload = MethodSpec::new(format!("{}_", constructor.name), Visibility::Public)
            .with_type_params(self.method_type_params(step))
            .with_params(vec![ParamSpec::new(RETURN_VALUE, self.result_type())])
            .returning(returns)
            .with_body(vec![Stmt::Return(
                Expr::This.call(constructor.name.clone(), vec![constant]),
            )]);

        [method, overload]
    }

    /// The terminal of the family over `handlers`, and its type.
    fn terminal(&self, handlers: Vec<Handler>, result: &Type) -> (Type, Expr) {
        match self.family {
            Family::Cases => {
                let value = self.value_name();
                let function = self
                    .env
                    .types
                    .function()
                    .apply(vec![self.env.adt_type().clone(), result.clone()]);
                let dispatch = self.env.dispatch(Expr::name(value.clone()), handlers, result);
                (function, Expr::lambda(vec![value], dispatch))
            }
            Family::CaseOf => (
                result.clone(),
                self.env
                    .dispatch(Expr::this_field(self.value_name()), handlers, result),
            ),
        }
    }

    fn otherwise_methods(&self, slots: &[Slot]) -> Vec<MethodSpec> {
        let supplier = self.env.types.supplier();
        let result = self.result_type();

        let fallback = Expr::name(OTHERWISE).call(supplier.method, Vec::new());
        let handlers = self.fill(slots, None, fallback);
        let (returns, body) = self.terminal(handlers, &result);
        let otherwise = MethodSpec::new("otherwise", Visibility::Public)
            .with_params(vec![ParamSpec::new(OTHERWISE, supplier.apply(vec![result.clone()]))])
            .returning(returns.clone())
            .with_body(vec![Stmt::Return(body)]);

        let constant = MethodSpec::new("otherwise_", Visibility::Public)
            .with_params(vec![ParamSpec::new(RETURN_VALUE, result.clone())])
            .returning(returns)
            .with_body(vec![Stmt::Return(Expr::This.call(
                "otherwise",
                vec![Expr::lambda(Vec::new(), Expr::name(RETURN_VALUE))],
            ))]);

        let option = self.env.types.option;
        let option_class = Type::class(option.class);
        let optional = option.apply(result.clone());
        let some = |value: Expr| Expr::static_call(option_class.clone(), option.some, vec![value]);
        let none = Expr::static_call(option_class.clone(), option.none, Vec::new());
        let handlers = self.fill(slots, Some(&some as &dyn Fn(Expr) -> Expr), none);
        let (returns, body) = self.terminal(handlers, &optional);
        let empty = MethodSpec::new("otherwiseEmpty", Visibility::Public)
            .returning(returns)
            .with_body(vec![Stmt::Return(body)]);

        vec![otherwise, constant, empty]
    }

    /// Handlers for an `otherwise` terminal: present handlers are wrapped by `wrap`, if any,
    /// and missing ones evaluate `fallback`.
    fn fill(
        &self,
        slots: &[Slot],
        wrap: Option<&dyn Fn(Expr) -> Expr>,
        fallback: Expr,
    ) -> Vec<Handler> {
        slots
            .iter()
            .zip(self.constructors())
            .map(|(slot, constructor)| {
                let apply = |handler: &Expr| {
                    let fields = field_names(constructor, "");
                    let applied = handler.clone().call(
                        self.env.handler_method(fields.len()),
                        fields.into_iter().map(Expr::name).collect(),
                    );
                    match wrap {
                        Some(wrap) => wrap(applied),
                        None => applied,
                    }
                };
                match slot {
                    Slot::Set(handler) if wrap.is_none() => Handler::Value(handler.clone()),
                    Slot::Set(handler) => Handler::fields(constructor, apply(handler)),
                    Slot::Missing => Handler::fields(constructor, fallback.clone()),
                    Slot::Unknown(handler) => Handler::fields(
                        constructor,
                        Expr::conditional(
                            Expr::binary(BinOp::Ne, handler.clone(), Expr::Null),
                            apply(handler),
                            fallback.clone(),
                        ),
                    ),
                }
            })
            .collect()
    }
}
