//! Declarations, statements and expressions of derived code.
//!
//! The tree is deliberately small: it covers what the synthesizers produce and nothing else.
//! Types are the structural [`Type`]s of the model, so a backend decides on its own how to
//! spell (and import) them.
use adt_reflect::Visibility;
use adt_types::{Type, TypeVarName};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
    Static,
    Final,
    Abstract,
    Volatile,
    Synchronized,
    /// An interface method with a body.
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeSpecKind {
    Class,
    Interface,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub kind: TypeSpecKind,
    pub visibility: Visibility,
    pub modifiers: Vec<Modifier>,
    pub type_params: Vec<TypeVarName>,
    pub extends: Option<Type>,
    pub implements: Vec<Type>,
    pub fields: Vec<FieldSpec>,
    pub constructors: Vec<MethodSpec>,
    pub methods: Vec<MethodSpec>,
    pub types: Vec<TypeSpec>,
}

impl TypeSpec {
    /// A `static final` nested class.
    pub fn class(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            kind: TypeSpecKind::Class,
            visibility,
            modifiers: vec![Modifier::Static, Modifier::Final],
            type_params: Vec::new(),
            extends: None,
            implements: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            kind: TypeSpecKind::Interface,
            modifiers: Vec::new(),
            ..Self::class(name, visibility)
        }
    }

    pub fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeVarName>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_extends(mut self, extends: Type) -> Self {
        self.extends = Some(extends);
        self
    }

    pub fn with_implements(mut self, implements: Type) -> Self {
        self.implements.push(implements);
        self
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn nested(&self, name: &str) -> Option<&TypeSpec> {
        self.types.iter().find(|t| t.name == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: Type,
    pub visibility: Visibility,
    pub modifiers: Vec<Modifier>,
    pub init: Option<Expr>,
}

impl FieldSpec {
    /// A `private final` instance field.
    pub fn private_final(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Private,
            modifiers: vec![Modifier::Final],
            init: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: Type,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodSpec {
    pub name: String,
    pub annotations: Vec<String>,
    pub visibility: Visibility,
    pub modifiers: Vec<Modifier>,
    pub type_params: Vec<TypeVarName>,
    pub params: Vec<ParamSpec>,
    /// `None` for `void`, and for constructors.
    pub returns: Option<Type>,
    /// `None` for abstract methods.
    pub body: Option<Vec<Stmt>>,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            visibility,
            modifiers: Vec::new(),
            type_params: Vec::new(),
            params: Vec::new(),
            returns: None,
            body: None,
        }
    }

    /// A `static` method.
    pub fn function(name: impl Into<String>, visibility: Visibility) -> Self {
        Self::new(name, visibility).with_modifiers(vec![Modifier::Static])
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Marks the method as implementing an inherited one.
    pub fn overriding(self) -> Self {
        self.with_annotation("Override")
    }

    pub fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeVarName>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_params(mut self, params: Vec<ParamSpec>) -> Self {
        self.params = params;
        self
    }

    pub fn returning(mut self, ty: Type) -> Self {
        self.returns = Some(ty);
        self
    }

    pub fn with_body(mut self, body: Vec<Stmt>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn param_types(&self) -> Vec<&Type> {
        self.params.iter().map(|p| &p.ty).collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Return(Expr),
    Expr(Expr),
    Local {
        ty: Type,
        name: String,
        init: Option<Expr>,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    If {
        cond: Expr,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Synchronized {
        lock: Expr,
        body: Vec<Stmt>,
    },
    Throw(Expr),
}

impl Stmt {
    pub fn local(ty: Type, name: impl Into<String>, init: Expr) -> Stmt {
        Stmt::Local {
            ty,
            name: name.into(),
            init: Some(init),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Stmt {
        Stmt::Assign { target, value }
    }

    pub fn if_then(cond: Expr, then: Vec<Stmt>) -> Stmt {
        Stmt::If {
            cond,
            then,
            otherwise: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Add,
    Mul,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Add => "+",
            BinOp::Mul => "*",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LambdaBody {
    Expr(Expr),
    Block(Vec<Stmt>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A local, a parameter, or a member in scope.
    Name(String),
    This,
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    /// A type as the target of a static member access, e.g. `Optional` in `Optional.empty()`.
    Type(Type),
    Field {
        target: Box<Expr>,
        name: String,
    },
    Call {
        target: Option<Box<Expr>>,
        type_args: Vec<Type>,
        method: String,
        args: Vec<Expr>,
    },
    /// `new T<>(args)` when `diamond` is set, `new T(args)` otherwise.
    New {
        ty: Type,
        diamond: bool,
        args: Vec<Expr>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<LambdaBody>,
    },
    MethodRef {
        target: Box<Expr>,
        method: String,
    },
    Cast {
        ty: Type,
        expr: Box<Expr>,
    },
    InstanceOf {
        expr: Box<Expr>,
        ty: Type,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    pub fn name(name: impl Into<String>) -> Expr {
        Expr::Name(name.into())
    }

    pub fn str(s: impl Into<String>) -> Expr {
        Expr::Str(s.into())
    }

    pub fn this_field(name: impl Into<String>) -> Expr {
        Expr::This.field(name)
    }

    pub fn field(self, name: impl Into<String>) -> Expr {
        Expr::Field {
            target: Box::new(self),
            name: name.into(),
        }
    }

    /// `self.method(args)`.
    pub fn call(self, method: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            target: Some(Box::new(self)),
            type_args: Vec::new(),
            method: method.into(),
            args,
        }
    }

    /// `Type.method(args)`.
    pub fn static_call(ty: Type, method: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Type(ty).call(method, args)
    }

    /// `method(args)`, unqualified.
    pub fn local_call(method: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            target: None,
            type_args: Vec::new(),
            method: method.into(),
            args,
        }
    }

    /// Adds explicit type arguments to a qualified call.
    pub fn with_type_args(self, type_args: Vec<Type>) -> Expr {
        match self {
            Expr::Call {
                target: Some(target),
                method,
                args,
                ..
            } => Expr::Call {
                target: Some(target),
                type_args,
                method,
                args,
            },
            other => other,
        }
    }

    pub fn new_diamond(ty: Type, args: Vec<Expr>) -> Expr {
        Expr::New {
            ty,
            diamond: true,
            args,
        }
    }

    pub fn lambda(params: Vec<String>, body: Expr) -> Expr {
        Expr::Lambda {
            params,
            body: Box::new(LambdaBody::Expr(body)),
        }
    }

    pub fn lambda_block(params: Vec<String>, body: Vec<Stmt>) -> Expr {
        Expr::Lambda {
            params,
            body: Box::new(LambdaBody::Block(body)),
        }
    }

    pub fn cast(self, ty: Type) -> Expr {
        Expr::Cast {
            ty,
            expr: Box::new(self),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_null(self) -> Expr {
        Expr::binary(BinOp::Eq, self, Expr::Null)
    }

    pub fn conditional(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Joins `exprs` with `op`, or returns `empty` when there are none.
    pub fn fold(op: BinOp, exprs: impl IntoIterator<Item = Expr>, empty: Expr) -> Expr {
        exprs
            .into_iter()
            .reduce(|left, right| Expr::binary(op, left, right))
            .unwrap_or(empty)
    }
}
