//! Finding the dispatch method and the case methods it is reached through.
use adt_problem::{ElementRef, ParseProblem};
use adt_reflect::{Annotation, MethodDecl, TypeDecl, Universe};
use adt_region::Region;
use adt_types::{Type, TypeVarName};
use adt_unify::unify;

/// Supertype chains of visitor interfaces are followed at most this deep.
const MAX_INTERFACE_DEPTH: usize = 16;

/// The unique abstract method other than `equals`, `hashCode` and `toString`.
pub(crate) fn find_dispatch_method<'a>(
    decl: &'a TypeDecl,
    element: &ElementRef,
) -> Result<&'a MethodDecl, ParseProblem> {
    let mut candidates = decl.abstract_methods().filter(|m| !m.is_object_method());

    match (candidates.next(), candidates.next()) {
        (None, _) => Err(ParseProblem::NoDispatchMethod {
            decl: element.clone(),
        }),
        (Some(method), None) => Ok(method),
        (Some(first), Some(second)) => {
            let methods = [first, second]
                .into_iter()
                .chain(candidates)
                .map(|m| element.member(&m.name, m.region))
                .collect();
            Err(ParseProblem::MultipleDispatchMethods {
                decl: element.clone(),
                methods,
            })
        }
    }
}

/// The dispatch method is `<R> R name(...)`; returns `R`.
pub(crate) fn result_variable(
    method: &MethodDecl,
    element: &ElementRef,
) -> Result<TypeVarName, ParseProblem> {
    let var = match method.type_params.as_slice() {
        [param] if param.is_bounded() => {
            return Err(ParseProblem::DispatchTypeParameterBounded {
                method: element.clone(),
                var: param.name.clone(),
            })
        }
        [param] => param.name.clone(),
        params => {
            return Err(ParseProblem::DispatchTypeParameters {
                method: element.clone(),
                count: params.len(),
            })
        }
    };

    if method.return_type.as_var() != Some(&var) {
        return Err(ParseProblem::DispatchReturnType {
            method: element.clone(),
            expected: var,
            found: method.return_type.clone(),
        });
    }

    Ok(var)
}

/// A case method, specialized to the parameter type it is reached through.
#[derive(Debug)]
pub(crate) struct CaseMethod<'a> {
    pub name: &'a str,
    pub params: Vec<(&'a str, Type)>,
    pub type_param_count: usize,
    pub return_type: Type,
    pub annotations: &'a [Annotation],
    pub region: Region,
    pub element: ElementRef,
}

impl CaseMethod<'_> {
    pub fn check(&self, result_var: &TypeVarName) -> Result<(), ParseProblem> {
        if self.type_param_count > 0 {
            return Err(ParseProblem::CaseTypeParameters {
                case: self.element.clone(),
            });
        }
        if self.return_type.as_var() != Some(result_var) {
            return Err(ParseProblem::CaseReturnType {
                case: self.element.clone(),
                expected: result_var.clone(),
                found: self.return_type.clone(),
            });
        }
        Ok(())
    }
}

/// The abstract methods of the interface `param_ty`, own and inherited, in declaration order
/// (supertypes first). A method redeclared further down replaces the inherited one in place.
pub(crate) fn case_methods<'a>(
    universe: &'a dyn Universe,
    param_ty: &Type,
    param: &ElementRef,
) -> Result<Vec<CaseMethod<'a>>, ParseProblem> {
    let mut methods = Vec::new();
    collect_case_methods(universe, param_ty, param, &mut methods, 0)?;
    Ok(methods)
}

fn collect_case_methods<'a>(
    universe: &'a dyn Universe,
    ty: &Type,
    param: &ElementRef,
    methods: &mut Vec<CaseMethod<'a>>,
    depth: usize,
) -> Result<(), ParseProblem> {
    let not_an_interface = || ParseProblem::NotAnInterface {
        param: param.clone(),
        ty: ty.clone(),
    };

    let name = ty.base_name().ok_or_else(not_an_interface)?;
    let iface = universe
        .type_decl(name)
        .ok_or_else(|| ParseProblem::Unresolved {
            element: param.clone(),
            name: name.clone(),
        })?;
    if !iface.is_interface() || depth > MAX_INTERFACE_DEPTH {
        return Err(not_an_interface());
    }

    let subst = unify(&iface.declared_type(), ty).ok_or_else(not_an_interface)?;

    for supertype in iface.supertypes.iter() {
        collect_case_methods(universe, &subst.apply(supertype), param, methods, depth + 1)?;
    }

    let iface_element = ElementRef::of_type(&iface.name, iface.region);
    for method in iface.abstract_methods().filter(|m| !m.is_object_method()) {
        let case = CaseMethod {
            name: &method.name,
            params: method
                .params
                .iter()
                .map(|p| (p.name.as_str(), subst.apply(&p.ty)))
                .collect(),
            type_param_count: method.type_params.len(),
            return_type: subst.apply(&method.return_type),
            annotations: &method.annotations,
            region: method.region,
            element: iface_element.member(&method.name, method.region),
        };

        let overridden = methods
            .iter()
            .position(|m| m.name == case.name && m.params.len() == case.params.len());
        match overridden {
            Some(index) => methods[index] = case,
            None => methods.push(case),
        }
    }

    Ok(())
}
