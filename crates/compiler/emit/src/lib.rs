//! Derived code as handed to the source-emission backend.
//!
//! Synthesizers never produce text. Each yields a [`DerivedCode`] fragment; the fragments of one
//! data type are appended in registry order into a [`CompilationUnit`], which a backend turns
//! into source. [`render`] is the reference backend, used by tests and the command line.
#![warn(clippy::dbg_macro)]

mod buf;
pub mod render;
pub mod syntax;

use adt_reflect::Visibility;
use adt_types::{QualifiedName, Type};

pub use syntax::{
    BinOp, Expr, FieldSpec, LambdaBody, MethodSpec, Modifier, ParamSpec, Stmt, TypeSpec,
    TypeSpecKind,
};

/// An ordered, appendable aggregate of members of the generated class.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivedCode {
    pub types: Vec<TypeSpec>,
    pub fields: Vec<FieldSpec>,
    pub methods: Vec<MethodSpec>,
}

impl DerivedCode {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.fields.is_empty() && self.methods.is_empty()
    }

    /// Appends `other` after `self`. A nested type already present by name is kept once, which
    /// is how shared helper types (such as function interfaces of high arity) end up in a unit
    /// a single time.
    pub fn append(&mut self, other: DerivedCode) {
        for ty in other.types {
            if !self.types.iter().any(|existing| existing.name == ty.name) {
                self.types.push(ty);
            }
        }
        self.fields.extend(other.fields);
        self.methods.extend(other.methods);
    }

    pub fn push_type(&mut self, ty: TypeSpec) {
        self.append(DerivedCode {
            types: vec![ty],
            ..DerivedCode::default()
        });
    }

    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn nested(&self, name: &str) -> Option<&TypeSpec> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// Where derived code goes: a top-level class next to the data type.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputTarget {
    pub name: QualifiedName,
    pub visibility: Visibility,
    pub extends: Option<Type>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompilationUnit {
    /// The data type the code is derived from.
    pub origin: QualifiedName,
    pub target: OutputTarget,
    pub code: DerivedCode,
}

impl CompilationUnit {
    pub fn render(&self) -> String {
        render::render_unit(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn named_types_are_appended_once() {
        let helper = || TypeSpec::interface("F3", Visibility::Public);
        let mut code = DerivedCode::default();
        code.push_type(helper());
        code.append(DerivedCode {
            types: vec![helper(), TypeSpec::class("Lazy", Visibility::Private)],
            methods: vec![MethodSpec::function("lazy", Visibility::Public)],
            ..DerivedCode::default()
        });

        let names: Vec<_> = code.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["F3", "Lazy"]);
        assert!(code.method("lazy").is_some());
    }

    #[test]
    fn found_members_outlive_the_name_they_were_found_by() {
        let mut code = DerivedCode::default();
        code.methods.push(MethodSpec::function("getLabel", Visibility::Public));
        code.push_type(TypeSpec::class("Started", Visibility::Private));

        let (method, nested) = {
            let name = format!("get{}", "Label");
            let class = "Started".to_string();
            (code.method(&name), code.nested(&class))
        };

        assert_eq!(method.map(|m| m.name.as_str()), Some("getLabel"));
        assert_eq!(nested.map(|t| t.name.as_str()), Some("Started"));
        assert!(code.method("setLabel").is_none());
    }
}
