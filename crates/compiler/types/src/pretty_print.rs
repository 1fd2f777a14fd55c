use std::fmt;

use crate::types::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameStyle {
    /// `java.util.List<A>`; round-trips through [`Type::parse`].
    Qualified,
    /// `List<A>`; used in diagnostics.
    Simple,
}

pub struct TypeDisplay<'a> {
    pub(crate) ty: &'a Type,
    pub(crate) style: NameStyle,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self.ty, self.style)
    }
}

fn write_type(f: &mut fmt::Formatter<'_>, ty: &Type, style: NameStyle) -> fmt::Result {
    match ty {
        Type::Var(var) => f.write_str(var.as_str()),
        Type::Primitive(p) => f.write_str(p.keyword()),
        Type::Apply(name, args) => {
            match style {
                NameStyle::Qualified => f.write_str(name.as_str())?,
                NameStyle::Simple => f.write_str(name.simple_name())?,
            }
            if !args.is_empty() {
                f.write_str("<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_type(f, arg, style)?;
                }
                f.write_str(">")?;
            }
            Ok(())
        }
        Type::Array(elem) => {
            write_type(f, elem, style)?;
            f.write_str("[]")
        }
    }
}

/// Renders a list of types as a comma-separated sequence, e.g. for a constructor's field types.
pub fn type_list(types: &[Type], style: NameStyle) -> String {
    let mut buf = String::new();
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        buf.push_str(&ty.display(style).to_string());
    }
    buf
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_names_drop_qualifiers_everywhere() {
        let ty = Type::parse("java.util.Map<java.lang.String, java.util.List<A>[]>").unwrap();

        assert_eq!(ty.to_string(), "Map<String, List<A>[]>");
        assert_eq!(
            format!("{ty:?}"),
            "java.util.Map<java.lang.String, java.util.List<A>[]>"
        );
    }

    #[test]
    fn lists() {
        let types = [Type::var("A"), Type::class("a.Expr")];

        assert_eq!(type_list(&types, NameStyle::Simple), "A, Expr");
    }
}
