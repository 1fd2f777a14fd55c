use std::fmt;

use adt_types::{QualifiedName, Type, TypeVarName};

use crate::{AnnotationRef, Binding, ElementRef, Problem, ProblemKind, ValueRef};

/// Why a declaration could not be read as an algebraic data type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseProblem {
    NoDispatchMethod {
        decl: ElementRef,
    },
    MultipleDispatchMethods {
        decl: ElementRef,
        methods: Vec<ElementRef>,
    },
    BoundedTypeParameter {
        decl: ElementRef,
        var: TypeVarName,
    },
    /// The dispatch method must be generic over exactly one type variable.
    DispatchTypeParameters {
        method: ElementRef,
        count: usize,
    },
    DispatchTypeParameterBounded {
        method: ElementRef,
        var: TypeVarName,
    },
    DispatchReturnType {
        method: ElementRef,
        expected: TypeVarName,
        found: Type,
    },
    NotAnInterface {
        param: ElementRef,
        ty: Type,
    },
    /// In function dispatch, every parameter is one case and must have one abstract method.
    CaseMethodCount {
        param: ElementRef,
        count: usize,
    },
    CaseReturnType {
        case: ElementRef,
        expected: TypeVarName,
        found: Type,
    },
    CaseTypeParameters {
        case: ElementRef,
    },
    DuplicateConstructorName {
        case: ElementRef,
        name: String,
    },
    RestrictionNotTrailing {
        case: ElementRef,
        param: String,
    },
    FieldNameCount {
        case: ElementRef,
        annotation: AnnotationRef,
        value: ValueRef,
        expected: usize,
        found: usize,
    },
    DuplicateFieldName {
        case: ElementRef,
        name: String,
    },
    /// Two constructors declare a field with the same name but different types.
    FieldTypeMismatch {
        field: String,
        first: (ElementRef, Type),
        other: (ElementRef, Type),
    },
    /// A referenced declaration is not available (yet).
    Unresolved {
        element: ElementRef,
        name: QualifiedName,
    },
}

impl Problem for ParseProblem {
    fn kind(&self) -> ProblemKind {
        use ParseProblem::*;
        match self {
            NoDispatchMethod { .. }
            | MultipleDispatchMethods { .. }
            | BoundedTypeParameter { .. }
            | DispatchTypeParameters { .. }
            | DispatchTypeParameterBounded { .. }
            | DispatchReturnType { .. }
            | NotAnInterface { .. }
            | CaseMethodCount { .. }
            | CaseReturnType { .. }
            | CaseTypeParameters { .. } => ProblemKind::Shape,
            RestrictionNotTrailing { .. } | FieldTypeMismatch { .. } => ProblemKind::Constraint,
            DuplicateConstructorName { .. } | FieldNameCount { .. } | DuplicateFieldName { .. } => {
                ProblemKind::Naming
            }
            Unresolved { .. } => ProblemKind::DependencyUnavailable,
        }
    }

    fn bindings(&self) -> Vec<Binding> {
        use ParseProblem::*;
        match self {
            MultipleDispatchMethods { methods, .. } => {
                methods.iter().cloned().map(Binding::Element).collect()
            }
            FieldTypeMismatch { first, other, .. } => vec![
                Binding::Element(first.0.clone()),
                Binding::Element(other.0.clone()),
            ],
            FieldNameCount {
                case,
                annotation,
                value,
                ..
            } => vec![Binding::ElementAnnotationValue(
                case.clone(),
                annotation.clone(),
                value.clone(),
            )],
            NoDispatchMethod { decl }
            | BoundedTypeParameter { decl, .. }
            | DispatchTypeParameters { method: decl, .. }
            | DispatchTypeParameterBounded { method: decl, .. }
            | DispatchReturnType { method: decl, .. }
            | NotAnInterface { param: decl, .. }
            | CaseMethodCount { param: decl, .. }
            | CaseReturnType { case: decl, .. }
            | CaseTypeParameters { case: decl }
            | DuplicateConstructorName { case: decl, .. }
            | RestrictionNotTrailing { case: decl, .. }
            | DuplicateFieldName { case: decl, .. }
            | Unresolved { element: decl, .. } => vec![Binding::Element(decl.clone())],
        }
    }
}

impl fmt::Display for ParseProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParseProblem::*;
        match self {
            NoDispatchMethod { .. } => f.write_str(
                "no abstract dispatch method found: expected exactly one abstract method other \
                 than equals, hashCode and toString",
            ),
            MultipleDispatchMethods { methods, .. } => write!(
                f,
                "{} abstract methods found where exactly one dispatch method was expected",
                methods.len()
            ),
            BoundedTypeParameter { var, .. } => write!(
                f,
                "type parameter {var} is bounded, but the type parameters of a data type must be \
                 unbounded"
            ),
            DispatchTypeParameters { count, .. } => write!(
                f,
                "the dispatch method must have exactly one type parameter (its result type), \
                 found {count}"
            ),
            DispatchTypeParameterBounded { var, .. } => write!(
                f,
                "the result type parameter {var} of the dispatch method must be unbounded"
            ),
            DispatchReturnType {
                expected, found, ..
            } => write!(
                f,
                "the dispatch method must return its type parameter {expected}, but returns {found}"
            ),
            NotAnInterface { ty, .. } => write!(
                f,
                "dispatch method parameter of type {ty} is not an interface"
            ),
            CaseMethodCount { count, .. } => write!(
                f,
                "a dispatch method with several parameters takes one function per case, but this \
                 parameter's type has {count} abstract methods"
            ),
            CaseReturnType {
                expected, found, ..
            } => write!(
                f,
                "case methods must return the dispatch result type {expected}, found {found}"
            ),
            CaseTypeParameters { .. } => {
                f.write_str("case methods must not declare type parameters")
            }
            DuplicateConstructorName { name, .. } => {
                write!(f, "constructor name {name} is used more than once")
            }
            RestrictionNotTrailing { param, .. } => write!(
                f,
                "type restrictions must come after every other parameter, but {param} follows one"
            ),
            FieldNameCount {
                expected, found, ..
            } => write!(
                f,
                "wrong number of field names: expected {expected}, found {found}"
            ),
            DuplicateFieldName { name, .. } => {
                write!(f, "field name {name} is used more than once")
            }
            FieldTypeMismatch {
                field,
                first,
                other,
            } => write!(
                f,
                "field {field} has type {} in {} but type {} in {}; fields with the same name must \
                 have the same type in every constructor",
                first.1, first.0.path, other.1, other.0.path
            ),
            Unresolved { name, .. } => write!(f, "{name} is not available"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Report, Severity};
    use adt_region::Region;
    use pretty_assertions::assert_eq;

    #[test]
    fn mismatched_fields_report_at_both_constructors() {
        let problem = ParseProblem::FieldTypeMismatch {
            field: "value".into(),
            first: (
                ElementRef::new("a.Expr.Cases.Const", Region::line(3)),
                Type::Primitive(adt_types::Primitive::Int),
            ),
            other: (
                ElementRef::new("a.Expr.Cases.Lit", Region::line(7)),
                Type::class("java.lang.String"),
            ),
        };

        let reports = problem.reports();

        assert_eq!(reports.len(), 2);
        assert!(reports
            .iter()
            .all(|r| r.severity == Severity::Error && r.kind == ProblemKind::Constraint));
        assert_eq!(
            reports[1].to_string(),
            "error: a.Expr.Cases.Lit at 8:1: field value has type int in a.Expr.Cases.Const but \
             type String in a.Expr.Cases.Lit; fields with the same name must have the same type \
             in every constructor"
        );
    }

    #[test]
    fn naming_override_binds_to_the_annotation_value() {
        let problem = ParseProblem::FieldNameCount {
            case: ElementRef::new("a.Expr.Cases.Add", Region::line(4)),
            annotation: AnnotationRef {
                name: "derive.FieldNames".into(),
                region: Region::line(4),
            },
            value: ValueRef {
                name: "value".into(),
                region: Region::line(4),
            },
            expected: 2,
            found: 1,
        };

        let [Report { binding, kind, .. }]: [Report; 1] = problem.reports().try_into().unwrap();

        assert_eq!(kind, ProblemKind::Naming);
        assert_eq!(binding.to_string(), "a.Expr.Cases.Add @FieldNames(value)");
    }
}
