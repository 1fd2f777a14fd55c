//! The configuration a data type is derived with.
//!
//! A [DeriveConfig] is never read from one place. It is folded from a chain of [ConfigLayer]s,
//! farthest first (a package default, then an enclosing declaration, then the data type itself),
//! so that closer layers override what farther ones set.
#![warn(clippy::dbg_macro)]

mod flavour;

use adt_derive_key::{DeriveBuiltin, MakeSet};
use adt_types::{QualifiedName, Type};
use serde::{Deserialize, Serialize};

pub use flavour::{Flavour, FlavourTypes, FunctionType, InstanceClass, OptionType, OrderingType};

pub const CLASS_NAME_PLACEHOLDER: &str = "{ClassName}";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Derived code is as visible as the data type.
    #[default]
    Same,
    /// Derived code is package-private.
    Package,
    /// Strict factories are package-private and suffixed `0`, so that hand-written smart
    /// constructors can take their names; everything else stays public.
    Smart,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgOption {
    /// Factories reject null for every argument of a non-primitive type.
    #[serde(default)]
    pub checked_not_null: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetClass {
    /// Name of the generated class; `{ClassName}` stands for the data type's simple name.
    pub in_class: String,
    /// A supertype for the generated class.
    pub extend: Option<Type>,
}

impl Default for TargetClass {
    fn default() -> Self {
        Self {
            in_class: format!("{CLASS_NAME_PLACEHOLDER}s"),
            extend: None,
        }
    }
}

impl TargetClass {
    /// The generated class for `adt`, which lives in the same package.
    pub fn class_name(&self, adt: &QualifiedName) -> QualifiedName {
        let package = adt.package();
        let simple = self
            .in_class
            .replace(CLASS_NAME_PLACEHOLDER, adt.simple_name());
        QualifiedName::new(package).child(&simple)
    }
}

/// A batch of instances, derived into the generated class or into a class of their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRequest {
    pub builtins: Vec<DeriveBuiltin>,
    /// Defaults to the generated class.
    #[serde(default)]
    pub in_class: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeriveConfig {
    pub flavour: Flavour,
    pub visibility: Visibility,
    pub arguments: ArgOption,
    /// Always closed under [`adt_derive_key::Make::dependencies`].
    pub make: MakeSet,
    pub target: TargetClass,
    pub instances: Vec<InstanceRequest>,
    /// Declarations whose static members are searched last for instances.
    pub fallback_providers: Vec<QualifiedName>,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            flavour: Flavour::default(),
            visibility: Visibility::default(),
            arguments: ArgOption::default(),
            make: MakeSet::all(),
            target: TargetClass::default(),
            instances: Vec::new(),
            fallback_providers: Vec::new(),
        }
    }
}

/// One configuration source. Unset fields leave the value of farther layers in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigLayer {
    pub flavour: Option<Flavour>,
    pub visibility: Option<Visibility>,
    pub arguments: Option<ArgOption>,
    pub make: Option<MakeSet>,
    pub in_class: Option<String>,
    pub extend: Option<Type>,
    pub instances: Option<Vec<InstanceRequest>>,
    /// Accumulated across layers, farthest first.
    pub fallback_providers: Vec<QualifiedName>,
}

impl DeriveConfig {
    /// Folds `layers`, ordered farthest to closest, over the defaults.
    pub fn from_layers<'a>(layers: impl IntoIterator<Item = &'a ConfigLayer>) -> Self {
        let mut config = DeriveConfig::default();
        for layer in layers {
            config.apply(layer);
        }
        config.make = config.make.closure();
        config
    }

    fn apply(&mut self, layer: &ConfigLayer) {
        if let Some(flavour) = layer.flavour {
            self.flavour = flavour;
        }
        if let Some(visibility) = layer.visibility {
            self.visibility = visibility;
        }
        if let Some(arguments) = layer.arguments {
            self.arguments = arguments;
        }
        if let Some(make) = layer.make {
            self.make = make;
        }
        if let Some(in_class) = &layer.in_class {
            self.target.in_class = in_class.clone();
        }
        if let Some(extend) = &layer.extend {
            self.target.extend = Some(extend.clone());
        }
        if let Some(instances) = &layer.instances {
            self.instances = instances.clone();
        }
        for provider in layer.fallback_providers.iter() {
            if !self.fallback_providers.contains(provider) {
                self.fallback_providers.push(provider.clone());
            }
        }
    }

    pub fn flavour_types(&self) -> &'static FlavourTypes {
        self.flavour.types()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use adt_derive_key::Make;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn closest_layer_wins() {
        let package: ConfigLayer = serde_json::from_str(indoc!(
            r#"
            {
              "flavour": "fj",
              "visibility": "smart",
              "fallbackProviders": ["a.Instances"]
            }
            "#
        ))
        .unwrap();
        let decl: ConfigLayer = serde_json::from_str(indoc!(
            r#"
            {
              "flavour": "vavr",
              "make": ["getters"],
              "arguments": { "checkedNotNull": true },
              "fallbackProviders": ["a.More", "a.Instances"]
            }
            "#
        ))
        .unwrap();

        let config = DeriveConfig::from_layers([&package, &decl]);

        assert_eq!(config.flavour, Flavour::Vavr);
        assert_eq!(config.visibility, Visibility::Smart);
        assert!(config.arguments.checked_not_null);
        assert_eq!(
            config.make.iter().collect::<Vec<_>>(),
            vec![Make::PatternMatching, Make::Getters]
        );
        assert_eq!(
            config.fallback_providers,
            vec![QualifiedName::from("a.Instances"), QualifiedName::from("a.More")]
        );
    }

    #[test]
    fn no_layers_means_everything() {
        let config = DeriveConfig::from_layers(&[]);

        assert_eq!(config.make, MakeSet::all());
        assert_eq!(config.flavour, Flavour::Jdk);
    }

    #[test]
    fn target_class_naming() {
        let target = TargetClass::default();

        assert_eq!(
            target.class_name(&"com.example.Expr".into()).as_str(),
            "com.example.Exprs"
        );
        assert_eq!(
            target.class_name(&"com.example.Outer.Inner".into()).as_str(),
            "com.example.Inners"
        );

        let custom = TargetClass {
            in_class: "Derived{ClassName}".into(),
            extend: None,
        };
        assert_eq!(custom.class_name(&"Top".into()).as_str(), "DerivedTop");
    }
}
