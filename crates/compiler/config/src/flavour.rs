use adt_derive_key::DeriveBuiltin;
use adt_types::{QualifiedName, Type};
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, IntoStaticStr};

/// The library family generated code refers to for functions, optional values and instances.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Flavour {
    #[default]
    Jdk,
    Fj,
    Vavr,
    Guava,
}

/// A single-abstract-method interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FunctionType {
    pub class: &'static str,
    pub method: &'static str,
}

impl FunctionType {
    pub fn name(&self) -> QualifiedName {
        QualifiedName::new(self.class)
    }

    pub fn apply(&self, args: Vec<Type>) -> Type {
        Type::Apply(self.name(), args)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionType {
    pub class: &'static str,
    pub some: &'static str,
    pub none: &'static str,
}

impl OptionType {
    pub fn apply(&self, arg: Type) -> Type {
        Type::Apply(QualifiedName::new(self.class), vec![arg.boxed()])
    }
}

/// How an instance of one type class is built and used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceClass {
    pub class: &'static str,
    /// Static factory taking a lambda that implements `method`.
    pub factory: &'static str,
    pub method: &'static str,
}

impl InstanceClass {
    pub fn name(&self) -> QualifiedName {
        QualifiedName::new(self.class)
    }

    pub fn apply(&self, ty: Type) -> Type {
        Type::Apply(self.name(), vec![ty.boxed()])
    }
}

/// The result of comparing two values, as an instance of `Order` returns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderingType {
    pub class: &'static str,
    pub less: &'static str,
    pub equal: &'static str,
    pub greater: &'static str,
}

impl OrderingType {
    pub fn name(&self) -> QualifiedName {
        QualifiedName::new(self.class)
    }
}

#[derive(Debug)]
pub struct FlavourTypes {
    /// `functions[k]` takes `k` arguments. Arities past the end are generated as helper
    /// interfaces next to the derived code.
    pub functions: &'static [FunctionType],
    pub option: OptionType,
    /// Equal, Order, Hash and Show, when the flavour has them.
    pub instances: Option<[InstanceClass; 4]>,
    pub ordering: Option<OrderingType>,
}

impl FlavourTypes {
    pub fn supplier(&self) -> FunctionType {
        self.functions[0]
    }

    pub fn function(&self) -> FunctionType {
        self.functions[1]
    }

    pub fn function_of_arity(&self, arity: usize) -> Option<FunctionType> {
        self.functions.get(arity).copied()
    }

    /// The type-equality witness of a type restriction is a plain function from the refinement
    /// to the restricted variable.
    pub fn witness(&self) -> FunctionType {
        self.function()
    }

    pub fn instance(&self, builtin: DeriveBuiltin) -> Option<InstanceClass> {
        let index = match builtin {
            DeriveBuiltin::Equal => 0,
            DeriveBuiltin::Order => 1,
            DeriveBuiltin::Hash => 2,
            DeriveBuiltin::Show => 3,
        };
        self.instances.map(|classes| classes[index])
    }
}

const fn f(class: &'static str, method: &'static str) -> FunctionType {
    FunctionType { class, method }
}

static JDK: FlavourTypes = FlavourTypes {
    functions: &[
        f("java.util.function.Supplier", "get"),
        f("java.util.function.Function", "apply"),
        f("java.util.function.BiFunction", "apply"),
    ],
    option: OptionType {
        class: "java.util.Optional",
        some: "of",
        none: "empty",
    },
    instances: None,
    ordering: None,
};

static FJ: FlavourTypes = FlavourTypes {
    functions: &[
        f("fj.F0", "f"),
        f("fj.F", "f"),
        f("fj.F2", "f"),
        f("fj.F3", "f"),
        f("fj.F4", "f"),
        f("fj.F5", "f"),
        f("fj.F6", "f"),
        f("fj.F7", "f"),
        f("fj.F8", "f"),
    ],
    option: OptionType {
        class: "fj.data.Option",
        some: "some",
        none: "none",
    },
    instances: Some([
        InstanceClass {
            class: "fj.Equal",
            factory: "equalDef",
            method: "eq",
        },
        InstanceClass {
            class: "fj.Ord",
            factory: "ordDef",
            method: "compare",
        },
        InstanceClass {
            class: "fj.Hash",
            factory: "hash",
            method: "hash",
        },
        InstanceClass {
            class: "fj.Show",
            factory: "showS",
            method: "showS",
        },
    ]),
    ordering: Some(OrderingType {
        class: "fj.Ordering",
        less: "LT",
        equal: "EQ",
        greater: "GT",
    }),
};

static VAVR: FlavourTypes = FlavourTypes {
    functions: &[
        f("io.vavr.Function0", "apply"),
        f("io.vavr.Function1", "apply"),
        f("io.vavr.Function2", "apply"),
        f("io.vavr.Function3", "apply"),
        f("io.vavr.Function4", "apply"),
        f("io.vavr.Function5", "apply"),
        f("io.vavr.Function6", "apply"),
        f("io.vavr.Function7", "apply"),
        f("io.vavr.Function8", "apply"),
    ],
    option: OptionType {
        class: "io.vavr.control.Option",
        some: "some",
        none: "none",
    },
    instances: None,
    ordering: None,
};

static GUAVA: FlavourTypes = FlavourTypes {
    functions: &[
        f("com.google.common.base.Supplier", "get"),
        f("com.google.common.base.Function", "apply"),
    ],
    option: OptionType {
        class: "com.google.common.base.Optional",
        some: "of",
        none: "absent",
    },
    instances: None,
    ordering: None,
};

impl Flavour {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn types(self) -> &'static FlavourTypes {
        match self {
            Flavour::Jdk => &JDK,
            Flavour::Fj => &FJ,
            Flavour::Vavr => &VAVR,
            Flavour::Guava => &GUAVA,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn every_flavour_has_supplier_and_function() {
        for flavour in Flavour::iter() {
            let types = flavour.types();

            assert!(!types.supplier().class.is_empty());
            assert!(types.function_of_arity(1).is_some(), "{flavour:?}");
        }
    }

    #[test]
    fn guava_has_no_binary_function() {
        assert_eq!(Flavour::Guava.types().function_of_arity(2), None);
        assert_eq!(
            Flavour::Jdk.types().function_of_arity(2).map(|f| f.class),
            Some("java.util.function.BiFunction")
        );
    }

    #[test]
    fn only_functional_java_ships_instances() {
        assert_eq!(
            Flavour::Fj.types().instance(DeriveBuiltin::Order).map(|c| c.class),
            Some("fj.Ord")
        );
        assert_eq!(Flavour::Vavr.types().instance(DeriveBuiltin::Equal), None);
    }
}
