use adt_types::QualifiedName;
use serde::{Deserialize, Serialize};

use crate::{TypeDecl, Universe};

/// A point-in-time copy of a set of declarations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    types: Vec<TypeDecl>,
}

impl Snapshot {
    pub fn new(types: Vec<TypeDecl>) -> Self {
        Self { types }
    }

    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    /// Adds a declaration, replacing any previous declaration with the same name.
    pub fn insert(&mut self, decl: TypeDecl) {
        match self.types.iter_mut().find(|existing| existing.name == decl.name) {
            Some(existing) => *existing = decl,
            None => self.types.push(decl),
        }
    }
}

impl Universe for Snapshot {
    fn type_decl(&self, name: &QualifiedName) -> Option<&TypeDecl> {
        self.types.iter().find(|decl| &decl.name == name)
    }
}

impl FromIterator<TypeDecl> for Snapshot {
    fn from_iter<I: IntoIterator<Item = TypeDecl>>(iter: I) -> Self {
        let mut snapshot = Snapshot::default();
        for decl in iter {
            snapshot.insert(decl);
        }
        snapshot
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Modifier, TypeKind};
    use adt_types::Type;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserialize_with_defaults() {
        let json = indoc!(
            r#"
            [
              {
                "name": "a.Option",
                "kind": "abstract_class",
                "type_params": [{ "name": "A" }],
                "methods": [
                  {
                    "name": "match",
                    "type_params": [{ "name": "R" }],
                    "params": [
                      { "name": "none", "ty": "java.util.function.Supplier<R>" },
                      { "name": "some", "ty": "java.util.function.Function<A, R>" }
                    ],
                    "return_type": "R",
                    "modifiers": ["abstract"]
                  }
                ]
              }
            ]
            "#
        );

        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let option = snapshot.type_decl(&"a.Option".into()).unwrap();

        assert_eq!(option.kind, TypeKind::AbstractClass);
        assert_eq!(
            option.declared_type(),
            Type::parse("a.Option<A>").unwrap()
        );
        assert_eq!(option.methods[0].modifiers, vec![Modifier::Abstract]);
        assert_eq!(option.abstract_methods().count(), 1);
        assert!(snapshot.type_decl(&"a.Missing".into()).is_none());
    }
}
