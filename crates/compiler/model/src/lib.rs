//! The model of an algebraic data type: its type constructor, its dispatch method, and its
//! constructors in declaration order.
//!
//! A model is built once per type per round by the parser and never mutated afterwards. Every
//! synthesizer reads it and nothing else.
#![warn(clippy::dbg_macro)]

use std::fmt;

use adt_region::Region;
use adt_reflect::{TypeKind, Visibility};
use adt_types::{QualifiedName, Type, TypeVarName};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgebraicDataType {
    pub type_constructor: TypeConstructor,
    pub match_method: MatchMethod,
    pub data_construction: DataConstruction,
    /// Ordinary fields of all constructors, deduplicated by name, in first-seen order.
    pub fields: Vec<DataArgument>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeConstructor {
    pub name: QualifiedName,
    /// The type applied to its own type variables.
    pub declared_type: Type,
    pub type_variables: Vec<TypeVarName>,
    pub kind: TypeKind,
    pub visibility: Visibility,
    pub region: Region,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchMethod {
    pub name: String,
    /// The result type of a match, bound by the dispatch method itself.
    pub return_type_variable: TypeVarName,
    pub region: Region,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataConstruction {
    /// The dispatch method takes no case at all; the type has no inhabitants.
    NoConstructor,
    OneConstructor(DataConstructor),
    MultipleConstructors(MultipleConstructors),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MultipleConstructors {
    /// One parameter whose abstract methods are the constructors.
    VisitorDispatch {
        /// The visitor parameter's type, applied to the dispatch result variable.
        visitor: Type,
        constructors: Vec<DataConstructor>,
    },
    /// One parameter per constructor, each a single-method interface.
    FunctionsDispatch { constructors: Vec<DataConstructor> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataConstructor {
    pub name: String,
    /// Position among its siblings.
    pub index: usize,
    /// The type variables of the data type that this constructor leaves unrestricted.
    pub type_variables: Vec<TypeVarName>,
    pub arguments: Vec<DataArgument>,
    pub type_restrictions: Vec<TypeRestriction>,
    /// The declared type with each restricted variable replaced by its refinement.
    pub returned_type: Type,
    pub deconstructor: DataDeconstructor,
    pub region: Region,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataArgument {
    pub name: String,
    pub ty: Type,
}

impl DataArgument {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A type restriction: in this constructor, `restricted_type_variable` is `refinement_type`.
/// The `witness` is the trailing parameter that carries the equality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRestriction {
    pub restricted_type_variable: TypeVarName,
    pub refinement_type: Type,
    pub witness: DataArgument,
}

/// How to dispatch on this constructor: which parameter of the dispatch method handles it,
/// with which type, through which method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataDeconstructor {
    pub visitor_param_index: usize,
    pub visitor_type: Type,
    pub visitor_method: String,
}

impl AlgebraicDataType {
    pub fn name(&self) -> &QualifiedName {
        &self.type_constructor.name
    }

    pub fn declared_type(&self) -> &Type {
        &self.type_constructor.declared_type
    }

    pub fn type_variables(&self) -> &[TypeVarName] {
        &self.type_constructor.type_variables
    }

    pub fn result_var(&self) -> &TypeVarName {
        &self.match_method.return_type_variable
    }

    /// Constructors in declaration order.
    pub fn constructors(&self) -> &[DataConstructor] {
        match &self.data_construction {
            DataConstruction::NoConstructor => &[],
            DataConstruction::OneConstructor(constructor) => std::slice::from_ref(constructor),
            DataConstruction::MultipleConstructors(
                MultipleConstructors::VisitorDispatch { constructors, .. }
                | MultipleConstructors::FunctionsDispatch { constructors },
            ) => constructors,
        }
    }

    /// The visitor type when constructors are the methods of a single visitor parameter.
    pub fn visitor(&self) -> Option<&Type> {
        match &self.data_construction {
            DataConstruction::MultipleConstructors(MultipleConstructors::VisitorDispatch {
                visitor,
                ..
            }) => Some(visitor),
            _ => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        self.type_constructor.kind == TypeKind::Enum
    }

    pub fn field(&self, name: &str) -> Option<&DataArgument> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Whether every constructor declares the field `name`.
    pub fn is_lens(&self, name: &str) -> bool {
        !self.constructors().is_empty()
            && self
                .constructors()
                .iter()
                .all(|constructor| constructor.argument(name).is_some())
    }

    pub fn is_self_reference(&self, ty: &Type) -> bool {
        ty == self.declared_type()
    }
}

impl DataConstructor {
    pub fn argument(&self, name: &str) -> Option<&DataArgument> {
        self.arguments.iter().find(|arg| arg.name == name)
    }

    /// Ordinary fields followed by the restriction witnesses, as the case method takes them.
    pub fn params(&self) -> impl Iterator<Item = &DataArgument> {
        self.arguments
            .iter()
            .chain(self.type_restrictions.iter().map(|r| &r.witness))
    }

    pub fn arity(&self) -> usize {
        self.arguments.len() + self.type_restrictions.len()
    }

    pub fn is_restricted(&self) -> bool {
        !self.type_restrictions.is_empty()
    }

    /// No field and no restriction: every value built by this constructor is the same.
    pub fn is_singleton(&self) -> bool {
        self.arity() == 0
    }
}

impl fmt::Display for AlgebraicDataType {
    /// `Expr = Const(value: int) | Add(left: Expr, right: Expr)`, with restrictions after
    /// a `;`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} =", self.declared_type())?;
        if self.constructors().is_empty() {
            return f.write_str(" !");
        }
        for constructor in self.constructors() {
            if constructor.index > 0 {
                f.write_str(" |")?;
            }
            write!(f, " {}", constructor.name)?;
            if constructor.is_singleton() {
                continue;
            }
            f.write_str("(")?;
            for (i, arg) in constructor.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: {}", arg.name, arg.ty)?;
            }
            if constructor.is_restricted() {
                if !constructor.arguments.is_empty() {
                    f.write_str("; ")?;
                }
                for (i, restriction) in constructor.type_restrictions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(
                        f,
                        "{} = {}",
                        restriction.restricted_type_variable, restriction.refinement_type
                    )?;
                }
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn constructor(name: &str, index: usize, args: &[(&str, &str)]) -> DataConstructor {
        DataConstructor {
            name: name.into(),
            index,
            type_variables: Vec::new(),
            arguments: args
                .iter()
                .map(|(name, ty)| DataArgument::new(*name, Type::parse(ty).unwrap()))
                .collect(),
            type_restrictions: Vec::new(),
            returned_type: Type::class("a.Shape"),
            deconstructor: DataDeconstructor {
                visitor_param_index: 0,
                visitor_type: Type::parse("a.Shape.Cases<R>").unwrap(),
                visitor_method: name.into(),
            },
            region: Region::zero(),
        }
    }

    fn shape() -> AlgebraicDataType {
        AlgebraicDataType {
            type_constructor: TypeConstructor {
                name: "a.Shape".into(),
                declared_type: Type::class("a.Shape"),
                type_variables: Vec::new(),
                kind: TypeKind::AbstractClass,
                visibility: Visibility::Public,
                region: Region::zero(),
            },
            match_method: MatchMethod {
                name: "match".into(),
                return_type_variable: "R".into(),
                region: Region::zero(),
            },
            data_construction: DataConstruction::MultipleConstructors(
                MultipleConstructors::VisitorDispatch {
                    visitor: Type::parse("a.Shape.Cases<R>").unwrap(),
                    constructors: vec![
                        constructor("Circle", 0, &[("x", "int"), ("radius", "double")]),
                        constructor("Square", 1, &[("x", "int"), ("side", "double")]),
                        constructor("Empty", 2, &[("x", "int")]),
                    ],
                },
            ),
            fields: vec![
                DataArgument::new("x", Type::parse("int").unwrap()),
                DataArgument::new("radius", Type::parse("double").unwrap()),
                DataArgument::new("side", Type::parse("double").unwrap()),
            ],
        }
    }

    #[test]
    fn lenses_are_fields_of_every_constructor() {
        let adt = shape();

        assert!(adt.is_lens("x"));
        assert!(!adt.is_lens("radius"));
        assert!(adt.visitor().is_some());
    }

    #[test]
    fn display() {
        assert_eq!(
            shape().to_string(),
            "Shape = Circle(x: int, radius: double) | Square(x: int, side: double) | Empty(x: int)"
        );
    }
}
