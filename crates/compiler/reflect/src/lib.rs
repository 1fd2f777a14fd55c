//! Declarations as the host compiler's reflection facility presents them.
//!
//! Everything here is plain read-only data. The pipeline never asks for more than it is given:
//! referenced declarations are looked up on demand through a [`Universe`], and a declaration
//! that cannot be found yet is reported as unavailable rather than guessed at.
#![warn(clippy::dbg_macro)]

mod snapshot;

use adt_region::Region;
use adt_types::{QualifiedName, Type, TypeVarName};
use serde::{Deserialize, Serialize};

pub use snapshot::Snapshot;

/// Access to every declaration the pipeline may need to inspect.
pub trait Universe: Sync {
    fn type_decl(&self, name: &QualifiedName) -> Option<&TypeDecl>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Interface,
    AbstractClass,
    Class,
    Enum,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    /// The keyword introducing a member with this visibility; empty for package-private.
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "",
            Visibility::Private => "private",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Abstract,
    Default,
    Static,
    Final,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: TypeVarName,
    #[serde(default)]
    pub bounds: Vec<Type>,
}

impl TypeParam {
    pub fn unbounded(name: &str) -> Self {
        Self {
            name: TypeVarName::new(name),
            bounds: Vec::new(),
        }
    }

    /// `Object` is the implicit bound of every type variable and does not count.
    pub fn is_bounded(&self) -> bool {
        self.bounds
            .iter()
            .any(|bound| bound.base_name().map(QualifiedName::as_str) != Some("java.lang.Object"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    String(String),
    /// An enum constant, by simple name.
    Enum(String),
    Class(Type),
    Array(Vec<AnnotationValue>),
    Annotation(Box<Annotation>),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(s) | AnnotationValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// A single value is accepted wherever an array is expected.
    pub fn as_slice(&self) -> &[AnnotationValue] {
        match self {
            AnnotationValue::Array(values) => values,
            single => std::slice::from_ref(single),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    pub name: String,
    pub value: AnnotationValue,
    #[serde(default)]
    pub region: Region,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: QualifiedName,
    #[serde(default)]
    pub values: Vec<AnnotationEntry>,
    #[serde(default)]
    pub region: Region,
}

impl Annotation {
    pub fn value(&self, name: &str) -> Option<&AnnotationEntry> {
        self.values.iter().find(|entry| entry.name == name)
    }
}

/// Finds an annotation by simple name, so that annotations can be re-exported under another
/// package without further configuration.
pub fn find_annotation<'a>(annotations: &'a [Annotation], simple_name: &str) -> Option<&'a Annotation> {
    annotations
        .iter()
        .find(|annotation| annotation.name.simple_name() == simple_name)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    pub return_type: Type,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub region: Region,
}

impl MethodDecl {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_abstract(&self) -> bool {
        self.has(Modifier::Abstract)
    }

    pub fn is_static(&self) -> bool {
        self.has(Modifier::Static)
    }

    /// `equals`, `hashCode` and `toString` are never dispatch methods, even when redeclared
    /// abstract.
    pub fn is_object_method(&self) -> bool {
        match self.name.as_str() {
            "equals" => self.params.len() == 1,
            "hashCode" | "toString" => self.params.is_empty(),
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub region: Region,
}

impl FieldDecl {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: QualifiedName,
    pub kind: TypeKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    /// Extended classes and implemented interfaces, applied as written.
    #[serde(default)]
    pub supertypes: Vec<Type>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub region: Region,
}

impl TypeDecl {
    pub fn type_variables(&self) -> Vec<TypeVarName> {
        self.type_params.iter().map(|p| p.name.clone()).collect()
    }

    /// The declaration applied to its own type variables, e.g. `List<A>` for `List`.
    pub fn declared_type(&self) -> Type {
        Type::Apply(
            self.name.clone(),
            self.type_params
                .iter()
                .map(|p| Type::Var(p.name.clone()))
                .collect(),
        )
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn abstract_methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods
            .iter()
            .filter(|m| m.is_abstract() && !m.is_static())
    }

    pub fn static_methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods.iter().filter(|m| m.is_static())
    }

    pub fn static_fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.fields.iter().filter(|f| f.is_static())
    }

    pub fn annotation(&self, simple_name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, simple_name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn object_bound_does_not_count() {
        let object = TypeParam {
            name: "A".into(),
            bounds: vec![Type::class("java.lang.Object")],
        };
        let comparable = TypeParam {
            name: "A".into(),
            bounds: vec![Type::parse("java.lang.Comparable<A>").unwrap()],
        };

        assert!(!object.is_bounded());
        assert!(comparable.is_bounded());
    }

    #[test]
    fn single_annotation_value_reads_as_array() {
        let value = AnnotationValue::String("left".into());

        assert_eq!(value.as_slice(), &[AnnotationValue::String("left".into())]);
    }
}
