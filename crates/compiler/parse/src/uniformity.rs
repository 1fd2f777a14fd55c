use adt_model::{DataArgument, DataConstructor};
use adt_problem::{ElementRef, ParseProblem};

/// Fields sharing a name must share a type in every constructor that declares them. Returns
/// the fields deduplicated by name, in first-seen order.
///
/// Restriction witnesses are not fields, so they take no part in this check: a witness may
/// share its name with a field of a sibling constructor.
pub(crate) fn uniform_fields(
    constructors: &[DataConstructor],
    elements: &[ElementRef],
) -> Result<Vec<DataArgument>, ParseProblem> {
    let mut fields: Vec<(&DataArgument, &ElementRef)> = Vec::new();

    for (constructor, element) in constructors.iter().zip(elements) {
        for argument in constructor.arguments.iter() {
            match fields.iter().find(|(field, _)| field.name == argument.name) {
                Some((field, _)) if field.ty == argument.ty => {}
                Some((field, first)) => {
                    return Err(ParseProblem::FieldTypeMismatch {
                        field: argument.name.clone(),
                        first: ((*first).clone(), field.ty.clone()),
                        other: (element.clone(), argument.ty.clone()),
                    });
                }
                None => fields.push((argument, element)),
            }
        }
    }

    Ok(fields.into_iter().map(|(field, _)| field.clone()).collect())
}
