//! Recovers an [AlgebraicDataType] from a declaration in visitor encoding.
//!
//! The declaration has a single abstract dispatch method `<R> R match(...)`. Its parameters
//! are either one visitor, whose abstract methods are the constructors, or one single-method
//! interface per constructor. Either way each case method's parameters are the constructor's
//! fields, optionally followed by type-equality witnesses that restrict the data type's type
//! variables for that constructor.
#![warn(clippy::dbg_macro)]

mod constructor;
mod dispatch;
mod uniformity;

use adt_config::DeriveConfig;
use adt_model::{
    AlgebraicDataType, DataConstruction, DataConstructor, DataDeconstructor, MatchMethod,
    MultipleConstructors, TypeConstructor,
};
use adt_problem::{ElementRef, ParseProblem};
use adt_reflect::{TypeDecl, Universe};

use crate::constructor::{build_constructor, Parent};
use crate::dispatch::{case_methods, find_dispatch_method, result_variable};

pub use constructor::FIELD_NAMES;

pub fn parse_adt(
    decl: &TypeDecl,
    universe: &dyn Universe,
    config: &DeriveConfig,
) -> Result<AlgebraicDataType, ParseProblem> {
    let decl_element = ElementRef::of_type(&decl.name, decl.region);

    if let Some(bounded) = decl.type_params.iter().find(|p| p.is_bounded()) {
        return Err(ParseProblem::BoundedTypeParameter {
            decl: decl_element,
            var: bounded.name.clone(),
        });
    }

    let method = find_dispatch_method(decl, &decl_element)?;
    let method_element = decl_element.member(&method.name, method.region);
    let result_var = result_variable(method, &method_element)?;

    let type_constructor = TypeConstructor {
        name: decl.name.clone(),
        declared_type: decl.declared_type(),
        type_variables: decl.type_variables(),
        kind: decl.kind,
        visibility: decl.visibility,
        region: decl.region,
    };

    let witness = config.flavour_types().witness().name();
    let parent = Parent {
        declared_type: &type_constructor.declared_type,
        type_variables: &type_constructor.type_variables,
        witness: &witness,
    };

    let mut constructors = Vec::new();
    let mut elements = Vec::new();
    let mut visitor = None;

    match method.params.as_slice() {
        [] => {}
        [param] => {
            let param_element = method_element.param(&param.name, method.region);
            let cases = case_methods(universe, &param.ty, &param_element)?;

            for (index, case) in cases.iter().enumerate() {
                case.check(&result_var)?;
                check_unique_name(&constructors, case.name, &case.element)?;

                let deconstructor = DataDeconstructor {
                    visitor_param_index: 0,
                    visitor_type: param.ty.clone(),
                    visitor_method: case.name.to_string(),
                };
                constructors.push(build_constructor(
                    &parent,
                    case,
                    case.name.to_string(),
                    index,
                    deconstructor,
                )?);
                elements.push(case.element.clone());
            }
            visitor = Some(param.ty.clone());
        }
        params => {
            for (index, param) in params.iter().enumerate() {
                let param_element = method_element.param(&param.name, method.region);
                let cases = case_methods(universe, &param.ty, &param_element)?;

                let case = match cases.as_slice() {
                    [case] => case,
                    _ => {
                        return Err(ParseProblem::CaseMethodCount {
                            param: param_element,
                            count: cases.len(),
                        })
                    }
                };
                case.check(&result_var)?;
                check_unique_name(&constructors, &param.name, &param_element)?;

                let deconstructor = DataDeconstructor {
                    visitor_param_index: index,
                    visitor_type: param.ty.clone(),
                    visitor_method: case.name.to_string(),
                };
                constructors.push(build_constructor(
                    &parent,
                    case,
                    param.name.clone(),
                    index,
                    deconstructor,
                )?);
                elements.push(param_element);
            }
        }
    }

    let fields = uniformity::uniform_fields(&constructors, &elements)?;

    let data_construction = match (constructors.len(), visitor) {
        (0, _) => DataConstruction::NoConstructor,
        (1, _) => match constructors.pop() {
            Some(constructor) => DataConstruction::OneConstructor(constructor),
            None => DataConstruction::NoConstructor,
        },
        (_, Some(visitor)) => {
            DataConstruction::MultipleConstructors(MultipleConstructors::VisitorDispatch {
                visitor,
                constructors,
            })
        }
        (_, None) => {
            DataConstruction::MultipleConstructors(MultipleConstructors::FunctionsDispatch {
                constructors,
            })
        }
    };

    let adt = AlgebraicDataType {
        type_constructor,
        match_method: MatchMethod {
            name: method.name.clone(),
            return_type_variable: result_var,
            region: method.region,
        },
        data_construction,
        fields,
    };

    tracing::debug!(adt = %adt.name(), constructors = adt.constructors().len(), "parsed");
    adt_debug_flags::dbg_do!(adt_debug_flags::ADT_PRINT_PARSED_ADT, {
        eprintln!("{adt}");
    });

    Ok(adt)
}

fn check_unique_name(
    constructors: &[DataConstructor],
    name: &str,
    element: &ElementRef,
) -> Result<(), ParseProblem> {
    if constructors.iter().any(|c| c.name == name) {
        Err(ParseProblem::DuplicateConstructorName {
            case: element.clone(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test;
