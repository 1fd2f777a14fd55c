use std::fmt;

use adt_types::{QualifiedName, Type};

use crate::{Binding, ElementRef, ParseProblem, Problem, ProblemKind, Severity};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeriveProblem {
    Parse(ParseProblem),
    NoInstance {
        element: ElementRef,
        /// The instance family, e.g. `Equal`.
        instance: &'static str,
        required: Type,
    },
    AmbiguousInstance {
        element: ElementRef,
        instance: &'static str,
        required: Type,
        candidates: Vec<String>,
    },
    /// The flavour has no class for the requested instance family.
    UnsupportedInstance {
        decl: ElementRef,
        instance: &'static str,
        flavour: &'static str,
    },
    /// A lazy constructor was requested for an enum, which cannot have one.
    LazyConstructorOnEnum {
        decl: ElementRef,
    },
    DependencyUnavailable {
        element: ElementRef,
        name: QualifiedName,
    },
    /// Derivation of the type panicked. The message is the panic payload.
    Internal {
        decl: ElementRef,
        message: String,
    },
}

impl DeriveProblem {
    /// Whether the problem may go away in a later round.
    pub fn is_deferrable(&self) -> bool {
        matches!(
            self.kind(),
            ProblemKind::DependencyUnavailable | ProblemKind::Internal
        )
    }
}

impl From<ParseProblem> for DeriveProblem {
    fn from(problem: ParseProblem) -> Self {
        DeriveProblem::Parse(problem)
    }
}

impl Problem for DeriveProblem {
    fn kind(&self) -> ProblemKind {
        match self {
            DeriveProblem::Parse(problem) => problem.kind(),
            DeriveProblem::NoInstance { .. }
            | DeriveProblem::AmbiguousInstance { .. }
            | DeriveProblem::UnsupportedInstance { .. } => ProblemKind::Resolution,
            DeriveProblem::LazyConstructorOnEnum { .. } => ProblemKind::Shape,
            DeriveProblem::DependencyUnavailable { .. } => ProblemKind::DependencyUnavailable,
            DeriveProblem::Internal { .. } => ProblemKind::Internal,
        }
    }

    fn severity(&self) -> Severity {
        match self {
            DeriveProblem::LazyConstructorOnEnum { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    fn bindings(&self) -> Vec<Binding> {
        match self {
            DeriveProblem::Parse(problem) => problem.bindings(),
            DeriveProblem::NoInstance { element, .. }
            | DeriveProblem::AmbiguousInstance { element, .. }
            | DeriveProblem::DependencyUnavailable { element, .. }
            | DeriveProblem::UnsupportedInstance { decl: element, .. }
            | DeriveProblem::LazyConstructorOnEnum { decl: element }
            | DeriveProblem::Internal { decl: element, .. } => {
                vec![Binding::Element(element.clone())]
            }
        }
    }
}

impl fmt::Display for DeriveProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeriveProblem::Parse(problem) => fmt::Display::fmt(problem, f),
            DeriveProblem::NoInstance {
                instance, required, ..
            } => write!(
                f,
                "could not find a {instance} instance for {required}; provide one as a static \
                 member of the type, of its derived companion, or as a fallback provider"
            ),
            DeriveProblem::AmbiguousInstance {
                instance,
                required,
                candidates,
                ..
            } => write!(
                f,
                "several {instance} instances for {required} are equally applicable: {}",
                candidates.join(", ")
            ),
            DeriveProblem::UnsupportedInstance {
                instance, flavour, ..
            } => write!(f, "the {flavour} flavour has no {instance} instances to derive"),
            DeriveProblem::LazyConstructorOnEnum { .. } => {
                f.write_str("enums cannot have a lazy constructor; it was not generated")
            }
            DeriveProblem::DependencyUnavailable { name, .. } => {
                write!(f, "{name} is not available")
            }
            DeriveProblem::Internal { message, .. } => {
                write!(f, "unexpected failure during derivation: {message}")
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use adt_region::Region;

    #[test]
    fn unresolved_parse_problems_are_deferrable() {
        let element = ElementRef::new("a.Expr.match(cases)", Region::zero());
        let problem: DeriveProblem = ParseProblem::Unresolved {
            element: element.clone(),
            name: "a.Expr.Cases".into(),
        }
        .into();

        assert!(problem.is_deferrable());
        assert!(!DeriveProblem::NoInstance {
            element,
            instance: "Equal",
            required: Type::class("a.Unknown"),
        }
        .is_deferrable());
    }

    #[test]
    fn warnings_keep_their_severity_when_fanned_out() {
        let problem = DeriveProblem::LazyConstructorOnEnum {
            decl: ElementRef::new("a.Color", Region::zero()),
        };

        let reports = problem.reports();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].severity, Severity::Warning);
        assert_eq!(
            reports[0].to_string(),
            "warning: a.Color: enums cannot have a lazy constructor; it was not generated"
        );
    }
}
