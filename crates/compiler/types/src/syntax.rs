//! Surface syntax for structural types, as written in declaration snapshots.
//!
//! ```text
//! type  := base ("[" "]")*
//! base  := name ("<" type ("," type)* ">")?
//! name  := ident ("." ident)*
//! ```
use std::fmt;

use crate::types::{Primitive, QualifiedName, Type, TypeVarName};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSyntaxError {
    pub input: String,
    /// Byte offset into `input` at which parsing stopped.
    pub position: usize,
    pub expected: &'static str,
}

impl fmt::Display for TypeSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid type `{}`: expected {} at offset {}",
            self.input, self.expected, self.position
        )
    }
}

impl std::error::Error for TypeSyntaxError {}

pub(crate) fn parse_type(input: &str) -> Result<Type, TypeSyntaxError> {
    let mut state = State { input, pos: 0 };
    let ty = state.ty()?;
    state.skip_ws();
    if state.pos != input.len() {
        return Err(state.error("end of input"));
    }
    Ok(ty)
}

struct State<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> State<'a> {
    fn error(&self, expected: &'static str) -> TypeSyntaxError {
        TypeSyntaxError {
            input: self.input.to_string(),
            position: self.pos,
            expected,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&'a str, TypeSyntaxError> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
            _ => return Err(self.error("an identifier")),
        }
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        Ok(&self.input[start..self.pos])
    }

    fn name(&mut self) -> Result<(usize, &'a str), TypeSyntaxError> {
        self.skip_ws();
        let start = self.pos;
        self.ident()?;
        loop {
            let checkpoint = self.pos;
            if self.peek() == Some('.') {
                self.pos += 1;
                if self.ident().is_err() {
                    self.pos = checkpoint;
                    return Err(self.error("an identifier after `.`"));
                }
            } else {
                break;
            }
        }
        Ok((start, &self.input[start..self.pos]))
    }

    fn ty(&mut self) -> Result<Type, TypeSyntaxError> {
        let mut ty = self.base()?;
        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.error("`]`"));
            }
            ty = Type::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn base(&mut self) -> Result<Type, TypeSyntaxError> {
        let (start, name) = self.name()?;
        let qualified = name.contains('.');

        if self.eat('<') {
            let mut args = vec![self.ty()?];
            while self.eat(',') {
                args.push(self.ty()?);
            }
            if !self.eat('>') {
                return Err(self.error("`,` or `>`"));
            }
            return Ok(Type::Apply(QualifiedName::new(name), args));
        }

        if qualified {
            Ok(Type::Apply(QualifiedName::new(name), Vec::new()))
        } else if let Some(primitive) = Primitive::from_keyword(name) {
            Ok(Type::Primitive(primitive))
        } else if name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            Ok(Type::Var(TypeVarName::new(name)))
        } else {
            self.pos = start;
            Err(self.error("a type variable or a qualified name"))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nested_applications_and_arrays() {
        let ty = parse_type("java.util.function.BiFunction<java.lang.Integer, R[], a.Pair<A, int>>")
            .unwrap();

        assert_eq!(
            ty,
            Type::Apply(
                "java.util.function.BiFunction".into(),
                vec![
                    Type::class("java.lang.Integer"),
                    Type::Array(Box::new(Type::var("R"))),
                    Type::Apply(
                        "a.Pair".into(),
                        vec![Type::var("A"), Type::Primitive(Primitive::Int)]
                    ),
                ]
            )
        );
    }

    #[test]
    fn unclosed_argument_list() {
        let err = parse_type("a.List<A").unwrap_err();

        assert_eq!(err.expected, "`,` or `>`");
        assert_eq!(err.position, 8);
    }

    #[test]
    fn trailing_garbage() {
        let err = parse_type("A B").unwrap_err();

        assert_eq!(err.expected, "end of input");
    }

    #[test]
    fn dangling_dot() {
        assert!(parse_type("java.util.").is_err());
    }
}
