use adt_collections::VecSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pretty_print::{NameStyle, TypeDisplay};
use crate::syntax::TypeSyntaxError;

/// A dot-separated nominal name, e.g. `com.example.Expr` or `com.example.Expr.Cases` for a
/// nested declaration.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(Box<str>);

impl QualifiedName {
    pub fn new(name: impl Into<Box<str>>) -> Self {
        QualifiedName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last segment of the name.
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(dot) => &self.0[dot + 1..],
            None => &self.0,
        }
    }

    /// Everything before the last segment; empty for names in the default package.
    pub fn qualifier(&self) -> &str {
        match self.0.rfind('.') {
            Some(dot) => &self.0[..dot],
            None => "",
        }
    }

    /// A declaration nested in (or, for packages, living in) `self`.
    pub fn child(&self, simple_name: &str) -> QualifiedName {
        if self.0.is_empty() {
            QualifiedName::new(simple_name)
        } else {
            QualifiedName(format!("{}.{}", self.0, simple_name).into())
        }
    }

    /// A declaration next to `self`, sharing its qualifier.
    pub fn sibling(&self, simple_name: &str) -> QualifiedName {
        QualifiedName::new(self.qualifier()).child(simple_name)
    }

    /// The leading lower-case segments. Packages are lower case and classes are not, which is
    /// all a bare name offers to tell them apart.
    pub fn package(&self) -> &str {
        let mut end = 0;
        let mut offset = 0;
        for segment in self.0.split('.') {
            if segment.starts_with(|c: char| c.is_uppercase()) {
                break;
            }
            end = offset + segment.len();
            offset += segment.len() + 1;
        }
        &self.0[..end]
    }

    /// `java.lang` types are always in scope of rendered source.
    pub fn is_implicitly_imported(&self) -> bool {
        self.qualifier() == "java.lang"
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        QualifiedName::new(name)
    }
}

/// The name of a universally quantified type variable, like `A` or `R`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeVarName(Box<str>);

impl TypeVarName {
    pub fn new(name: impl Into<Box<str>>) -> Self {
        TypeVarName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A name based on `hint` that is not in `taken`: `R`, then `R1`, `R2`, ...
    pub fn fresh(hint: &str, taken: &[TypeVarName]) -> TypeVarName {
        let mut i = 0;
        loop {
            let candidate = if i == 0 {
                hint.to_string()
            } else {
                format!("{hint}{i}")
            };
            if !taken.iter().any(|var| var.as_str() == candidate) {
                return TypeVarName::new(candidate);
            }
            i += 1;
        }
    }
}

impl fmt::Debug for TypeVarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TypeVarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeVarName {
    fn from(name: &str) -> Self {
        TypeVarName::new(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Char,
        Primitive::Float,
        Primitive::Double,
    ];

    pub const fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Char => "char",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Primitive> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }

    /// The reference type a primitive is boxed to when used as a type argument.
    pub const fn wrapper(self) -> &'static str {
        match self {
            Primitive::Boolean => "java.lang.Boolean",
            Primitive::Byte => "java.lang.Byte",
            Primitive::Short => "java.lang.Short",
            Primitive::Int => "java.lang.Integer",
            Primitive::Long => "java.lang.Long",
            Primitive::Char => "java.lang.Character",
            Primitive::Float => "java.lang.Float",
            Primitive::Double => "java.lang.Double",
        }
    }
}

/// A structural type as it appears in a declaration.
///
/// There is no notion of unification variables here: every `Var` is a type variable bound by
/// some declaration (the data type, a method, a visitor interface).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Type {
    Var(TypeVarName),
    Primitive(Primitive),
    /// A nominal type applied to its type arguments; `args` is empty for non-generic types.
    Apply(QualifiedName, Vec<Type>),
    Array(Box<Type>),
}

impl Type {
    pub fn var(name: &str) -> Type {
        Type::Var(TypeVarName::new(name))
    }

    pub fn class(name: &str) -> Type {
        Type::Apply(QualifiedName::new(name), Vec::new())
    }

    pub fn apply(name: &QualifiedName, args: Vec<Type>) -> Type {
        Type::Apply(name.clone(), args)
    }

    /// Parses the surface syntax used in snapshots and tests, e.g.
    /// `java.util.function.Function<java.lang.Integer, R>` or `int[]`.
    ///
    /// A name without a dot is a type variable unless it is a primitive keyword.
    pub fn parse(input: &str) -> Result<Type, TypeSyntaxError> {
        crate::syntax::parse_type(input)
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Type::Var(_))
    }

    pub fn as_var(&self) -> Option<&TypeVarName> {
        match self {
            Type::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn base_name(&self) -> Option<&QualifiedName> {
        match self {
            Type::Apply(name, _) => Some(name),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Type] {
        match self {
            Type::Apply(_, args) => args,
            _ => &[],
        }
    }

    /// Whether `self` is `name` applied to anything.
    pub fn is_application_of(&self, name: &QualifiedName) -> bool {
        self.base_name() == Some(name)
    }

    /// The type usable as a generic argument: primitives become their wrapper class.
    pub fn boxed(&self) -> Type {
        match self {
            Type::Primitive(p) => Type::class(p.wrapper()),
            other => other.clone(),
        }
    }

    /// Free type variables in first-seen, left-to-right order.
    pub fn free_vars(&self) -> VecSet<TypeVarName> {
        let mut vars = VecSet::default();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars(&self, vars: &mut VecSet<TypeVarName>) {
        match self {
            Type::Var(var) => {
                vars.insert(var.clone());
            }
            Type::Primitive(_) => {}
            Type::Apply(_, args) => {
                for arg in args {
                    arg.collect_vars(vars);
                }
            }
            Type::Array(elem) => elem.collect_vars(vars),
        }
    }

    pub fn mentions_var(&self, var: &TypeVarName) -> bool {
        match self {
            Type::Var(v) => v == var,
            Type::Primitive(_) => false,
            Type::Apply(_, args) => args.iter().any(|arg| arg.mentions_var(var)),
            Type::Array(elem) => elem.mentions_var(var),
        }
    }

    /// Whether `needle` occurs anywhere in `self`, including `self` itself.
    pub fn contains(&self, needle: &Type) -> bool {
        if self == needle {
            return true;
        }
        match self {
            Type::Apply(_, args) => args.iter().any(|arg| arg.contains(needle)),
            Type::Array(elem) => elem.contains(needle),
            Type::Var(_) | Type::Primitive(_) => false,
        }
    }

    pub fn display(&self, style: NameStyle) -> TypeDisplay<'_> {
        TypeDisplay { ty: self, style }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display(NameStyle::Qualified))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display(NameStyle::Simple))
    }
}

impl TryFrom<String> for Type {
    type Error = TypeSyntaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Type::parse(&value)
    }
}

impl From<Type> for String {
    fn from(ty: Type) -> Self {
        ty.display(NameStyle::Qualified).to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn free_vars_are_first_seen_ordered() {
        let ty = Type::parse("a.Either<B, a.List<A>, B>").unwrap();

        assert_eq!(
            ty.free_vars().into_vec(),
            vec![TypeVarName::from("B"), TypeVarName::from("A")]
        );
    }

    #[test]
    fn qualified_name_parts() {
        let nested = QualifiedName::new("com.example.Expr.Cases");
        assert_eq!(nested.package(), "com.example");
        assert_eq!(QualifiedName::new("Expr").package(), "");

        let name = QualifiedName::from("com.example.Expr.Cases");

        assert_eq!(name.simple_name(), "Cases");
        assert_eq!(name.qualifier(), "com.example.Expr");
        assert_eq!(name.sibling("Visitor").as_str(), "com.example.Expr.Visitor");
        assert_eq!(QualifiedName::from("Top").qualifier(), "");
    }

    #[test]
    fn fresh_names_skip_taken_ones() {
        let taken = [TypeVarName::from("R"), TypeVarName::from("R1")];

        assert_eq!(TypeVarName::fresh("R", &taken).as_str(), "R2");
        assert_eq!(TypeVarName::fresh("X", &taken).as_str(), "X");
    }

    #[test]
    fn primitives_box_to_wrappers() {
        assert_eq!(
            Type::Primitive(Primitive::Int).boxed(),
            Type::class("java.lang.Integer")
        );
    }

    #[test]
    fn serde_uses_surface_syntax() {
        let ty: Type = serde_json::from_str("\"java.util.List<A>\"").unwrap();

        assert_eq!(ty, Type::apply(&"java.util.List".into(), vec![Type::var("A")]));
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"java.util.List<A>\"");
    }
}
