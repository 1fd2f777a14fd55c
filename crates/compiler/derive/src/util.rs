use adt_config::{DeriveConfig, FlavourTypes, Visibility as DerivedVisibility};
use adt_emit::{DerivedCode, Expr, LambdaBody, MethodSpec, ParamSpec, Stmt, TypeSpec};
use adt_model::{AlgebraicDataType, DataConstruction, DataConstructor, MultipleConstructors};
use adt_problem::{DeriveProblem, ElementRef};
use adt_reflect::{Universe, Visibility};
use adt_types::{QualifiedName, Type, TypeVarName};
use adt_unify::Substitution;

/// Name of the static factory of the lambda-backed visitor, through which derived code
/// dispatches on values of a visitor-dispatched type.
pub(crate) const CASES_FACTORY: &str = "cases";

/// Everything a synthesizer may read while deriving code for one data type.
pub struct DeriveEnv<'a> {
    pub adt: &'a AlgebraicDataType,
    pub config: &'a DeriveConfig,
    pub universe: &'a dyn Universe,
    /// The generated companion class of the data type.
    pub target: QualifiedName,
    /// The class the code currently being derived goes into. Only instances may be
    /// requested somewhere else than the companion class.
    pub unit: QualifiedName,
    pub types: &'static FlavourTypes,
    pub(crate) warnings: Vec<DeriveProblem>,
}

/// How a derived method handles one constructor when it dispatches on a value.
#[derive(Clone, Debug, PartialEq)]
pub enum Handler {
    /// An expression that already has the handler type of the constructor.
    Value(Expr),
    /// A lambda over the constructor's fields, each named after its field plus `suffix`.
    Lambda {
        params: Vec<String>,
        body: LambdaBody,
        suffix: String,
    },
}

impl Handler {
    pub fn fields(constructor: &DataConstructor, body: Expr) -> Handler {
        Handler::suffixed(constructor, "", body)
    }

    pub fn suffixed(constructor: &DataConstructor, suffix: &str, body: Expr) -> Handler {
        Handler::Lambda {
            params: field_names(constructor, suffix),
            body: LambdaBody::Expr(body),
            suffix: suffix.to_string(),
        }
    }

    pub fn block(constructor: &DataConstructor, suffix: &str, body: Vec<Stmt>) -> Handler {
        Handler::Lambda {
            params: field_names(constructor, suffix),
            body: LambdaBody::Block(body),
            suffix: suffix.to_string(),
        }
    }
}

/// The local names the fields of `constructor` are bound to in a handler.
pub fn field_names(constructor: &DataConstructor, suffix: &str) -> Vec<String> {
    constructor
        .arguments
        .iter()
        .map(|arg| ident(&format!("{}{}", arg.name, suffix)))
        .collect()
}

impl<'a> DeriveEnv<'a> {
    pub fn new(
        adt: &'a AlgebraicDataType,
        config: &'a DeriveConfig,
        universe: &'a dyn Universe,
    ) -> Self {
        let target = config.target.class_name(adt.name());
        Self {
            adt,
            config,
            universe,
            unit: target.clone(),
            target,
            types: config.flavour_types(),
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, problem: DeriveProblem) {
        tracing::debug!(%problem, "derivation warning");
        self.warnings.push(problem);
    }

    pub fn element(&self) -> ElementRef {
        ElementRef::of_type(self.adt.name(), self.adt.type_constructor.region)
    }

    pub fn target_type(&self) -> Type {
        Type::Apply(self.target.clone(), Vec::new())
    }

    /// A type declared inside the companion class.
    pub fn nested(&self, name: &str, args: Vec<Type>) -> Type {
        Type::Apply(self.target.child(name), args)
    }

    pub fn adt_type(&self) -> &Type {
        self.adt.declared_type()
    }

    /// The data type without type arguments, for singleton caches and unchecked casts.
    pub fn raw_adt_type(&self) -> Type {
        Type::Apply(self.adt.name().clone(), Vec::new())
    }

    pub fn type_vars(&self) -> Vec<TypeVarName> {
        self.adt.type_variables().to_vec()
    }

    pub fn type_var_types(&self) -> Vec<Type> {
        self.adt
            .type_variables()
            .iter()
            .map(|var| Type::Var(var.clone()))
            .collect()
    }

    /// The data type's variables followed by `extra`.
    pub fn type_vars_and(&self, extra: &TypeVarName) -> Vec<TypeVarName> {
        let mut vars = self.type_vars();
        vars.push(extra.clone());
        vars
    }

    /// A result variable for derived matchers and folds, distinct from the data type's own.
    pub fn result_var(&self) -> TypeVarName {
        TypeVarName::fresh("R", self.adt.type_variables())
    }

    /// The parameter name derived methods use for the value they take apart.
    pub fn value_name(&self) -> String {
        format!("_{}", lower_first(self.adt.name().simple_name()))
    }

    pub fn api_visibility(&self) -> Visibility {
        match self.config.visibility {
            DerivedVisibility::Same => self.adt.type_constructor.visibility,
            DerivedVisibility::Package => Visibility::Package,
            DerivedVisibility::Smart => Visibility::Public,
        }
    }

    pub fn factory_visibility(&self) -> Visibility {
        match self.config.visibility {
            DerivedVisibility::Smart => Visibility::Package,
            _ => self.api_visibility(),
        }
    }

    /// Strict factories are named after their constructor, and suffixed `0` in smart mode so
    /// that hand-written factories can take the plain name.
    pub fn factory_name(&self, constructor: &DataConstructor) -> String {
        match self.config.visibility {
            DerivedVisibility::Smart => format!("{}0", constructor.name),
            _ => constructor.name.clone(),
        }
    }

    /// `Supplier<R>`, `Function<A, R>`... for a handler taking `args`. Arities the flavour has
    /// no interface for use a helper interface `F<k>` of the companion class.
    pub fn handler_type(&self, args: &[Type], result: &Type) -> Type {
        let mut type_args: Vec<Type> = args.iter().map(Type::boxed).collect();
        type_args.push(result.boxed());
        match self.types.function_of_arity(args.len()) {
            Some(function) => function.apply(type_args),
            None => self.nested(&helper_name(args.len()), type_args),
        }
    }

    pub fn handler_method(&self, arity: usize) -> &'static str {
        self.types
            .function_of_arity(arity)
            .map(|function| function.method)
            .unwrap_or(HELPER_METHOD)
    }

    /// The handler type of `constructor`, which receives its fields but not its witnesses.
    pub fn constructor_handler_type(&self, constructor: &DataConstructor, result: &Type) -> Type {
        let fields: Vec<Type> = constructor.arguments.iter().map(|a| a.ty.clone()).collect();
        self.handler_type(&fields, result)
    }

    /// Adds the helper interfaces needed by handlers of the constructors' arities.
    pub fn add_function_helpers(&self, code: &mut DerivedCode) {
        for constructor in self.adt.constructors() {
            let arity = constructor.arguments.len();
            if self.types.function_of_arity(arity).is_none() {
                code.push_type(function_interface(arity));
            }
        }
    }

    /// The parameters of the dispatch method as a subclass overrides it, with the restricted
    /// type variables of `restrictions` replaced by their refinements.
    pub fn dispatch_params(&self, restrictions: &Substitution) -> Vec<ParamSpec> {
        let mut params: Vec<ParamSpec> = Vec::new();
        let mut seen = Vec::new();
        for constructor in self.adt.constructors() {
            let deconstructor = &constructor.deconstructor;
            if seen.contains(&deconstructor.visitor_param_index) {
                continue;
            }
            seen.push(deconstructor.visitor_param_index);
            params.push(ParamSpec::new(
                self.case_param_name(constructor),
                restrictions.apply(&deconstructor.visitor_type),
            ));
        }
        params
    }

    pub fn case_param_name(&self, constructor: &DataConstructor) -> String {
        match &self.adt.data_construction {
            DataConstruction::MultipleConstructors(MultipleConstructors::FunctionsDispatch {
                ..
            }) => ident(&constructor.name),
            _ => "cases".to_string(),
        }
    }

    /// An override of the dispatch method whose body is `body`.
    pub fn dispatch_override(&self, restrictions: &Substitution, body: Vec<Stmt>) -> MethodSpec {
        let result = self.adt.result_var().clone();
        MethodSpec::new(self.adt.match_method.name.clone(), Visibility::Public)
            .overriding()
            .with_type_params(vec![result.clone()])
            .with_params(self.dispatch_params(restrictions))
            .returning(Type::Var(result))
            .with_body(body)
    }

    /// `value.match(...)`, handling each constructor with the handler at its index.
    pub fn dispatch(&self, value: Expr, handlers: Vec<Handler>, result: &Type) -> Expr {
        let constructors = self.adt.constructors();
        debug_assert_eq!(handlers.len(), constructors.len());
        let method = self.adt.match_method.name.clone();

        match &self.adt.data_construction {
            DataConstruction::MultipleConstructors(MultipleConstructors::VisitorDispatch {
                ..
            }) => {
                let handlers = handlers.into_iter().map(handler_expr).collect();
                let mut type_args = self.type_var_types();
                type_args.push(result.boxed());
                let cases = Expr::static_call(self.target_type(), CASES_FACTORY, handlers)
                    .with_type_args(type_args);
                value.call(method, vec![cases])
            }
            _ => {
                let args = handlers
                    .into_iter()
                    .zip(constructors)
                    .map(|(handler, constructor)| self.case_argument(handler, constructor, result))
                    .collect();
                value.call(method, args)
            }
        }
    }

    /// Adapts a handler to the case parameter of `constructor`, which also takes the
    /// constructor's witnesses.
    fn case_argument(&self, handler: Handler, constructor: &DataConstructor, result: &Type) -> Expr {
        let witnesses = |suffix: &str| {
            constructor
                .type_restrictions
                .iter()
                .map(|r| ident(&format!("{}{}", r.witness.name, suffix)))
                .collect::<Vec<_>>()
        };

        match handler {
            Handler::Value(expr) => {
                let subst = Substitution::singleton(self.adt.result_var().clone(), result.boxed());
                let param_type = subst.apply(&constructor.deconstructor.visitor_type);
                if param_type == self.constructor_handler_type(constructor, result) {
                    return expr;
                }
                let fields = field_names(constructor, "");
                let mut params = fields.clone();
                params.extend(witnesses(""));
                let call = expr.call(
                    self.handler_method(fields.len()),
                    fields.into_iter().map(Expr::name).collect(),
                );
                Expr::lambda(params, call)
            }
            Handler::Lambda {
                mut params,
                body,
                suffix,
            } => {
                params.extend(witnesses(&suffix));
                Expr::Lambda {
                    params,
                    body: Box::new(body),
                }
            }
        }
    }
}

fn handler_expr(handler: Handler) -> Expr {
    match handler {
        Handler::Value(expr) => expr,
        Handler::Lambda { params, body, .. } => Expr::Lambda {
            params,
            body: Box::new(body),
        },
    }
}

const HELPER_METHOD: &str = "apply";

fn helper_name(arity: usize) -> String {
    format!("F{arity}")
}

/// `interface F3<A1, A2, A3, R> { R apply(A1 a1, A2 a2, A3 a3); }`
fn function_interface(arity: usize) -> TypeSpec {
    let args: Vec<TypeVarName> = (1..=arity)
        .map(|i| TypeVarName::new(format!("A{i}")))
        .collect();
    let result = TypeVarName::fresh("R", &args);
    let params = args
        .iter()
        .enumerate()
        .map(|(i, var)| ParamSpec::new(format!("a{}", i + 1), Type::Var(var.clone())))
        .collect();
    let apply = MethodSpec::new(HELPER_METHOD, Visibility::Public)
        .with_params(params)
        .returning(Type::Var(result.clone()));

    let mut type_params = args;
    type_params.push(result);
    let mut spec =
        TypeSpec::interface(helper_name(arity), Visibility::Public).with_type_params(type_params);
    spec.methods.push(apply);
    spec
}

pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while",
];

/// `name`, with a trailing `_` when it is a reserved word.
pub fn ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// The name a handler for `constructor` is passed under.
pub fn handler_name(constructor: &DataConstructor) -> String {
    ident(&lower_first(&constructor.name))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identifiers() {
        assert_eq!(ident("if"), "if_");
        assert_eq!(ident("value"), "value");
        assert_eq!(lower_first("IConst"), "iConst");
        assert_eq!(capitalize("none"), "None");
    }

    #[test]
    fn helper_interfaces_take_every_argument() {
        let spec = function_interface(3);

        assert_eq!(spec.name, "F3");
        assert_eq!(spec.type_params.len(), 4);
        assert_eq!(spec.methods[0].params.len(), 3);
        assert!(spec.methods[0].body.is_none());
    }
}
