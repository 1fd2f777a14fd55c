//! Reading one case method as a constructor: its fields, its type restrictions, its names.
use adt_error_macros::internal_error;
use adt_model::{DataArgument, DataConstructor, DataDeconstructor, TypeRestriction};
use adt_problem::{AnnotationRef, ParseProblem, ValueRef};
use adt_reflect::find_annotation;
use adt_types::{QualifiedName, Type, TypeVarName};
use adt_unify::{unify_in, Substitution};

use crate::dispatch::CaseMethod;

pub const FIELD_NAMES: &str = "FieldNames";

pub(crate) struct Parent<'a> {
    pub declared_type: &'a Type,
    pub type_variables: &'a [TypeVarName],
    /// The function type carrying type-equality witnesses.
    pub witness: &'a QualifiedName,
}

enum ParamKind {
    Field,
    Restriction { var: TypeVarName, refinement: Type },
}

pub(crate) fn build_constructor(
    parent: &Parent,
    case: &CaseMethod,
    name: String,
    index: usize,
    deconstructor: DataDeconstructor,
) -> Result<DataConstructor, ParseProblem> {
    let kinds = classify_params(parent, case)?;
    let names = field_names(case)?;

    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(ParseProblem::DuplicateFieldName {
                case: case.element.clone(),
                name: name.clone(),
            });
        }
    }

    let mut arguments = Vec::new();
    let mut type_restrictions = Vec::new();
    let mut subst = Substitution::identity();

    for ((kind, (_, ty)), field_name) in kinds.into_iter().zip(case.params.iter()).zip(names) {
        let argument = DataArgument::new(field_name, ty.clone());
        match kind {
            ParamKind::Field => arguments.push(argument),
            ParamKind::Restriction { var, refinement } => {
                if let Err(mismatch) = unify_in(&mut subst, &Type::Var(var.clone()), &refinement) {
                    internal_error!("restricted {} twice in {}: {}", var, case.element.path, mismatch);
                }
                type_restrictions.push(TypeRestriction {
                    restricted_type_variable: var,
                    refinement_type: refinement,
                    witness: argument,
                });
            }
        }
    }

    // restricted variables are gone, variables of refinements come in
    let returned_type = subst.apply(parent.declared_type);
    let type_variables = returned_type.free_vars().into_vec();

    Ok(DataConstructor {
        name,
        index,
        type_variables,
        arguments,
        type_restrictions,
        returned_type,
        deconstructor,
        region: case.region,
    })
}

/// Walks the parameters left to right. A parameter typed `witness<Refinement, V>`, for a type
/// variable `V` of the data type that is not restricted yet, is a restriction; every parameter
/// after the first restriction must be one too.
fn classify_params(parent: &Parent, case: &CaseMethod) -> Result<Vec<ParamKind>, ParseProblem> {
    let mut kinds = Vec::with_capacity(case.params.len());
    let mut restricted: Vec<&TypeVarName> = Vec::new();

    for (name, ty) in case.params.iter() {
        let restriction = match witness_shape(parent, ty) {
            Some((var, refinement)) if !restricted.contains(&var) => Some((var, refinement)),
            _ => None,
        };

        match restriction {
            Some((var, refinement)) => {
                restricted.push(var);
                kinds.push(ParamKind::Restriction {
                    var: var.clone(),
                    refinement: refinement.clone(),
                });
            }
            None if !restricted.is_empty() => {
                return Err(ParseProblem::RestrictionNotTrailing {
                    case: case.element.clone(),
                    param: name.to_string(),
                });
            }
            None => kinds.push(ParamKind::Field),
        }
    }

    Ok(kinds)
}

fn witness_shape<'t>(parent: &'t Parent, ty: &'t Type) -> Option<(&'t TypeVarName, &'t Type)> {
    match ty {
        Type::Apply(name, args) if name == parent.witness => match args.as_slice() {
            [refinement, Type::Var(var)] if parent.type_variables.contains(var) => {
                Some((var, refinement))
            }
            _ => None,
        },
        _ => None,
    }
}

/// Parameter names, or the names given by a `FieldNames` annotation on the case method.
fn field_names(case: &CaseMethod) -> Result<Vec<String>, ParseProblem> {
    let Some(annotation) = find_annotation(case.annotations, FIELD_NAMES) else {
        return Ok(case.params.iter().map(|(name, _)| name.to_string()).collect());
    };

    let entry = annotation.value("value");
    let names: Vec<String> = entry
        .map(|entry| {
            entry
                .value
                .as_slice()
                .iter()
                .filter_map(|value| value.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    if names.len() != case.params.len() {
        return Err(ParseProblem::FieldNameCount {
            case: case.element.clone(),
            annotation: AnnotationRef {
                name: annotation.name.clone(),
                region: annotation.region,
            },
            value: ValueRef {
                name: "value".to_string(),
                region: entry.map_or(annotation.region, |entry| entry.region),
            },
            expected: case.params.len(),
            found: names.len(),
        });
    }

    Ok(names)
}
