//! Provides types to describe problems that can occur while deriving algebraic data types.
#![warn(clippy::dbg_macro)]

pub mod derive;
pub mod parse;

use std::fmt;

use adt_region::Region;
use adt_types::QualifiedName;

pub use derive::DeriveProblem;
pub use parse::ParseProblem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Derivation went ahead, but something the user asked for was left out.
    Warning,
    /// Nothing is derived for the offending type.
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemKind {
    /// The declaration does not follow the visitor encoding.
    Shape,
    /// Type restrictions out of order, or a field whose type differs between constructors.
    Constraint,
    /// Field names: duplicates, or a naming override with the wrong number of names.
    Naming,
    /// No instance provider could be found for a field's type.
    Resolution,
    /// An unexpected fault while deriving one type.
    Internal,
    /// Something the type depends on is not available yet. Deferred to a later round, and only
    /// reported if it is still missing after the last one.
    DependencyUnavailable,
}

/// A declaration element: a type, a method, a parameter, a field.
#[derive(Clone, PartialEq, Eq)]
pub struct ElementRef {
    /// `a.Expr`, `a.Expr.match`, `a.Expr.Cases.Add(left)`...
    pub path: String,
    pub region: Region,
}

impl ElementRef {
    pub fn new(path: impl Into<String>, region: Region) -> Self {
        Self {
            path: path.into(),
            region,
        }
    }

    pub fn of_type(name: &QualifiedName, region: Region) -> Self {
        Self::new(name.as_str(), region)
    }

    /// A member of this element, e.g. a method of a type.
    pub fn member(&self, name: &str, region: Region) -> Self {
        Self::new(format!("{}.{}", self.path, name), region)
    }

    /// A parameter of this element, which must be a method.
    pub fn param(&self, name: &str, region: Region) -> Self {
        Self::new(format!("{}({})", self.path, name), region)
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.path, self.region)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationRef {
    pub name: QualifiedName,
    pub region: Region,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueRef {
    pub name: String,
    pub region: Region,
}

/// Where a problem is reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    Element(ElementRef),
    ElementAnnotation(ElementRef, AnnotationRef),
    ElementAnnotationValue(ElementRef, AnnotationRef, ValueRef),
}

impl Binding {
    pub fn element(&self) -> &ElementRef {
        match self {
            Binding::Element(element)
            | Binding::ElementAnnotation(element, _)
            | Binding::ElementAnnotationValue(element, _, _) => element,
        }
    }

    /// The most precise region available.
    pub fn region(&self) -> Region {
        match self {
            Binding::Element(element) => element.region,
            Binding::ElementAnnotation(_, annotation) => annotation.region,
            Binding::ElementAnnotationValue(_, _, value) => value.region,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Element(element) => write!(f, "{}", element.path),
            Binding::ElementAnnotation(element, annotation) => {
                write!(f, "{} @{}", element.path, annotation.name.simple_name())
            }
            Binding::ElementAnnotationValue(element, annotation, value) => write!(
                f,
                "{} @{}({})",
                element.path,
                annotation.name.simple_name(),
                value.name
            ),
        }
    }
}

/// One diagnostic, as handed to the diagnostics output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub severity: Severity,
    pub kind: ProblemKind,
    pub message: String,
    pub binding: Binding,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        let region = self.binding.region();
        if region.is_zero() {
            write!(f, "{}: {}: {}", severity, self.binding, self.message)
        } else {
            write!(
                f,
                "{}: {} at {}: {}",
                severity, self.binding, region, self.message
            )
        }
    }
}

pub trait Problem: fmt::Display {
    fn kind(&self) -> ProblemKind;

    fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Every place the problem should be reported at; never empty.
    fn bindings(&self) -> Vec<Binding>;

    fn region(&self) -> Option<Region> {
        self.bindings().first().map(Binding::region)
    }

    /// Fans the problem out to one report per binding, all at the same severity.
    fn reports(&self) -> Vec<Report> {
        let message = self.to_string();
        self.bindings()
            .into_iter()
            .map(|binding| Report {
                severity: self.severity(),
                kind: self.kind(),
                message: message.clone(),
                binding,
            })
            .collect()
    }
}
