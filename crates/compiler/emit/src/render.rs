//! Renders a compilation unit as Java-flavoured source text.
//!
//! Type names from the unit's own package are written relative to the package. Other types are
//! imported by their outermost class, unless that would clash with a name already in scope,
//! in which case they are written fully qualified.
use adt_collections::VecMap;
use adt_reflect::Visibility;
use adt_types::{QualifiedName, Type, TypeVarName};

use crate::buf::{Buf, INDENT};
use crate::syntax::{
    BinOp, Expr, FieldSpec, LambdaBody, MethodSpec, Modifier, ParamSpec, Stmt, TypeSpec,
    TypeSpecKind,
};
use crate::CompilationUnit;

pub fn render_unit(unit: &CompilationUnit) -> String {
    let target = &unit.target.name;
    let package = target.package();

    let mut class = TypeSpec::class(target.simple_name(), unit.target.visibility)
        .with_modifiers(vec![Modifier::Final]);
    class.extends = unit.target.extends.clone();
    class.fields = unit.code.fields.clone();
    class.constructors = vec![MethodSpec::new(target.simple_name(), Visibility::Private)
        .with_body(Vec::new())];
    class.methods = unit.code.methods.clone();
    class.types = unit.code.types.clone();

    let mut declared = Vec::new();
    collect_declared(&class, &mut declared);

    let mut renderer = Renderer {
        buf: Buf::new(),
        indent: 0,
        package,
        declared,
        imports: VecMap::default(),
    };
    renderer.type_spec(&class);
    let body = renderer.buf.into_string();

    let mut imports: Vec<&QualifiedName> = renderer.imports.values().collect();
    imports.sort();

    let mut out = String::new();
    if !package.is_empty() {
        out.push_str(&format!("package {package};\n\n"));
    }
    for import in imports.iter() {
        out.push_str(&format!("import {};\n", import.as_str()));
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    out.push_str(&body);
    out
}

fn collect_declared(spec: &TypeSpec, declared: &mut Vec<String>) {
    declared.push(spec.name.clone());
    for nested in spec.types.iter() {
        collect_declared(nested, declared);
    }
}

struct Renderer<'a> {
    buf: Buf,
    indent: u16,
    package: &'a str,
    /// Simple names of the types declared in the unit, which shadow imports.
    declared: Vec<String>,
    /// Simple name of an imported outermost class, to its qualified name.
    imports: VecMap<String, QualifiedName>,
}

const LAMBDA: u8 = 0;
const CONDITIONAL: u8 = 1;
const UNARY: u8 = 8;
const POSTFIX: u8 = 9;
const PRIMARY: u8 = 10;

fn binary_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 2,
        BinOp::And => 3,
        BinOp::Eq | BinOp::Ne => 4,
        BinOp::Lt => 5,
        BinOp::Add => 6,
        BinOp::Mul => 7,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Lambda { .. } => LAMBDA,
        Expr::Conditional { .. } => CONDITIONAL,
        Expr::Binary { op, .. } => binary_precedence(*op),
        Expr::InstanceOf { .. } => 5,
        Expr::Cast { .. } | Expr::Not(_) => UNARY,
        Expr::Call { .. } | Expr::Field { .. } | Expr::MethodRef { .. } | Expr::New { .. } => {
            POSTFIX
        }
        Expr::Name(_)
        | Expr::This
        | Expr::Null
        | Expr::Bool(_)
        | Expr::Int(_)
        | Expr::Str(_)
        | Expr::Type(_) => PRIMARY,
    }
}

fn modifier_keyword(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Static => "static",
        Modifier::Final => "final",
        Modifier::Abstract => "abstract",
        Modifier::Volatile => "volatile",
        Modifier::Synchronized => "synchronized",
        Modifier::Default => "default",
    }
}

const MODIFIER_ORDER: [Modifier; 6] = [
    Modifier::Default,
    Modifier::Abstract,
    Modifier::Static,
    Modifier::Final,
    Modifier::Synchronized,
    Modifier::Volatile,
];

impl Renderer<'_> {
    fn write(&mut self, s: &str) {
        self.buf.write(self.indent, s);
    }

    fn line(&mut self, s: &str) {
        self.write(s);
        self.buf.end_line();
    }

    fn type_name(&mut self, name: &QualifiedName) -> String {
        let package = name.package();
        let relative = match package {
            "" => name.as_str(),
            _ => &name.as_str()[package.len() + 1..],
        };
        if package == self.package {
            return relative.to_string();
        }

        let outermost = relative.split('.').next().unwrap_or(relative);
        if self.declared.iter().any(|declared| declared == outermost) {
            return name.as_str().to_string();
        }
        if name.is_implicitly_imported() {
            return match self.imports.get(&outermost.to_string()) {
                Some(_) => name.as_str().to_string(),
                None => relative.to_string(),
            };
        }

        let outermost_name = QualifiedName::new(package).child(outermost);
        match self.imports.get(&outermost.to_string()) {
            Some(imported) if *imported == outermost_name => relative.to_string(),
            Some(_) => name.as_str().to_string(),
            None => {
                self.imports.insert(outermost.to_string(), outermost_name);
                relative.to_string()
            }
        }
    }

    fn ty(&mut self, ty: &Type) -> String {
        match ty {
            Type::Var(var) => var.as_str().to_string(),
            Type::Primitive(primitive) => primitive.keyword().to_string(),
            Type::Apply(name, args) => {
                let mut out = self.type_name(name);
                if !args.is_empty() {
                    let args: Vec<String> = args.iter().map(|arg| self.ty(arg)).collect();
                    out.push('<');
                    out.push_str(&args.join(", "));
                    out.push('>');
                }
                out
            }
            Type::Array(elem) => format!("{}[]", self.ty(elem)),
        }
    }

    fn type_params(&self, params: &[TypeVarName]) -> String {
        if params.is_empty() {
            String::new()
        } else {
            let params: Vec<&str> = params.iter().map(TypeVarName::as_str).collect();
            format!("<{}>", params.join(", "))
        }
    }

    fn modifiers(&self, visibility: Visibility, modifiers: &[Modifier], in_interface: bool) -> String {
        let mut words = Vec::new();
        if !(in_interface && visibility == Visibility::Public) && visibility != Visibility::Package {
            words.push(visibility.keyword());
        }
        for modifier in MODIFIER_ORDER.iter() {
            if modifiers.contains(modifier) {
                words.push(modifier_keyword(*modifier));
            }
        }
        let mut out = words.join(" ");
        if !out.is_empty() {
            out.push(' ');
        }
        out
    }

    fn type_spec(&mut self, spec: &TypeSpec) {
        let keyword = match spec.kind {
            TypeSpecKind::Class => "class",
            TypeSpecKind::Interface => "interface",
        };
        let mut header = format!(
            "{}{} {}{}",
            self.modifiers(spec.visibility, &spec.modifiers, false),
            keyword,
            spec.name,
            self.type_params(&spec.type_params)
        );
        if let Some(extends) = &spec.extends {
            header.push_str(&format!(" extends {}", self.ty(extends)));
        }
        if !spec.implements.is_empty() {
            let implements: Vec<String> = spec.implements.iter().map(|ty| self.ty(ty)).collect();
            let keyword = match spec.kind {
                TypeSpecKind::Class => "implements",
                TypeSpecKind::Interface => "extends",
            };
            header.push_str(&format!(" {keyword} {}", implements.join(", ")));
        }
        header.push_str(" {");
        self.line(&header);

        self.indent += INDENT;
        let in_interface = spec.kind == TypeSpecKind::Interface;
        let mut first = true;
        for field in spec.fields.iter() {
            self.field(field);
            first = false;
        }
        for constructor in spec.constructors.iter() {
            if !first {
                self.buf.separate();
            }
            self.method(constructor, true, false);
            first = false;
        }
        for method in spec.methods.iter() {
            if !first {
                self.buf.separate();
            }
            self.method(method, false, in_interface);
            first = false;
        }
        for nested in spec.types.iter() {
            if !first {
                self.buf.separate();
            }
            self.type_spec(nested);
            first = false;
        }
        self.indent -= INDENT;

        self.line("}");
    }

    fn field(&mut self, field: &FieldSpec) {
        let ty = self.ty(&field.ty);
        let modifiers = self.modifiers(field.visibility, &field.modifiers, false);
        self.write(&format!("{modifiers}{ty} {}", field.name));
        if let Some(init) = &field.init {
            self.write(" = ");
            self.expr(init, LAMBDA);
        }
        self.write(";");
        self.buf.end_line();
    }

    fn params(&mut self, params: &[ParamSpec]) -> String {
        let params: Vec<String> = params
            .iter()
            .map(|p| format!("{} {}", self.ty(&p.ty), p.name))
            .collect();
        params.join(", ")
    }

    fn method(&mut self, method: &MethodSpec, is_constructor: bool, in_interface: bool) {
        for annotation in method.annotations.iter() {
            self.line(&format!("@{annotation}"));
        }

        let mut header = self.modifiers(method.visibility, &method.modifiers, in_interface);
        if !method.type_params.is_empty() {
            header.push_str(&self.type_params(&method.type_params));
            header.push(' ');
        }
        if !is_constructor {
            match &method.returns {
                Some(ty) => header.push_str(&self.ty(ty)),
                None => header.push_str("void"),
            }
            header.push(' ');
        }
        header.push_str(&method.name);
        header.push('(');
        header.push_str(&self.params(&method.params));
        header.push(')');

        match &method.body {
            None => self.line(&format!("{header};")),
            Some(body) => {
                self.line(&format!("{header} {{"));
                self.block(body);
                self.line("}");
            }
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        self.indent += INDENT;
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.indent -= INDENT;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Return(expr) => {
                self.write("return ");
                self.expr(expr, LAMBDA);
                self.line(";");
            }
            Stmt::Expr(expr) => {
                self.expr(expr, LAMBDA);
                self.line(";");
            }
            Stmt::Local { ty, name, init } => {
                let ty = self.ty(ty);
                self.write(&format!("{ty} {name}"));
                if let Some(init) = init {
                    self.write(" = ");
                    self.expr(init, LAMBDA);
                }
                self.line(";");
            }
            Stmt::Assign { target, value } => {
                self.expr(target, POSTFIX);
                self.write(" = ");
                self.expr(value, LAMBDA);
                self.line(";");
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                self.write("if (");
                self.expr(cond, LAMBDA);
                self.line(") {");
                self.block(then);
                if otherwise.is_empty() {
                    self.line("}");
                } else {
                    self.line("} else {");
                    self.block(otherwise);
                    self.line("}");
                }
            }
            Stmt::While { cond, body } => {
                self.write("while (");
                self.expr(cond, LAMBDA);
                self.line(") {");
                self.block(body);
                self.line("}");
            }
            Stmt::Synchronized { lock, body } => {
                self.write("synchronized (");
                self.expr(lock, LAMBDA);
                self.line(") {");
                self.block(body);
                self.line("}");
            }
            Stmt::Throw(expr) => {
                self.write("throw ");
                self.expr(expr, LAMBDA);
                self.line(";");
            }
        }
    }

    fn args(&mut self, args: &[Expr]) {
        self.write("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.expr(arg, LAMBDA);
        }
        self.write(")");
    }

    fn expr(&mut self, expr: &Expr, min_precedence: u8) {
        let parenthesize = precedence(expr) < min_precedence;
        if parenthesize {
            self.write("(");
        }

        match expr {
            Expr::Name(name) => self.write(name),
            Expr::This => self.write("this"),
            Expr::Null => self.write("null"),
            Expr::Bool(b) => self.write(if *b { "true" } else { "false" }),
            Expr::Int(i) => self.write(&i.to_string()),
            Expr::Str(s) => self.write(&string_literal(s)),
            Expr::Type(ty) => {
                let ty = self.ty(ty);
                self.write(&ty);
            }
            Expr::Field { target, name } => {
                self.expr(target, POSTFIX);
                self.write(".");
                self.write(name);
            }
            Expr::Call {
                target,
                type_args,
                method,
                args,
            } => {
                if let Some(target) = target {
                    self.expr(target, POSTFIX);
                    self.write(".");
                    if !type_args.is_empty() {
                        let type_args: Vec<String> =
                            type_args.iter().map(|ty| self.ty(ty)).collect();
                        self.write(&format!("<{}>", type_args.join(", ")));
                    }
                }
                self.write(method);
                self.args(args);
            }
            Expr::New { ty, diamond, args } => {
                let rendered = match ty {
                    Type::Apply(name, type_args) if *diamond && !type_args.is_empty() => {
                        format!("{}<>", self.type_name(name))
                    }
                    _ => self.ty(ty),
                };
                self.write(&format!("new {rendered}"));
                self.args(args);
            }
            Expr::Lambda { params, body } => {
                match params.as_slice() {
                    [param] => self.write(param),
                    params => self.write(&format!("({})", params.join(", "))),
                }
                self.write(" -> ");
                match body.as_ref() {
                    LambdaBody::Expr(body) => self.expr(body, LAMBDA),
                    LambdaBody::Block(stmts) => {
                        self.line("{");
                        self.block(stmts);
                        self.write("}");
                    }
                }
            }
            Expr::MethodRef { target, method } => {
                self.expr(target, POSTFIX);
                self.write("::");
                self.write(method);
            }
            Expr::Cast { ty, expr } => {
                let ty = self.ty(ty);
                self.write(&format!("({ty}) "));
                self.expr(expr, UNARY);
            }
            Expr::InstanceOf { expr, ty } => {
                self.expr(expr, 6);
                let ty = self.ty(ty);
                self.write(&format!(" instanceof {ty}"));
            }
            Expr::Binary { op, left, right } => {
                let precedence = binary_precedence(*op);
                self.expr(left, precedence);
                self.write(&format!(" {} ", op.symbol()));
                self.expr(right, precedence + 1);
            }
            Expr::Not(expr) => {
                self.write("!");
                self.expr(expr, UNARY);
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.expr(cond, CONDITIONAL + 1);
                self.write(" ? ");
                self.expr(then, CONDITIONAL + 1);
                self.write(" : ");
                self.expr(otherwise, CONDITIONAL);
            }
        }

        if parenthesize {
            self.write(")");
        }
    }
}

fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{DerivedCode, OutputTarget};
    use indoc::indoc;
    use insta::assert_snapshot;

    fn unit(code: DerivedCode) -> CompilationUnit {
        CompilationUnit {
            origin: "a.Option".into(),
            target: OutputTarget {
                name: "a.Options".into(),
                visibility: Visibility::Public,
                extends: None,
            },
            code,
        }
    }

    fn ty(s: &str) -> Type {
        Type::parse(s).unwrap()
    }

    /// `text` as a member of the unit's class, one level deep.
    fn member(text: &str) -> String {
        text.lines()
            .map(|line| match line {
                "" => "\n".to_string(),
                line => format!("    {line}\n"),
            })
            .collect()
    }

    #[test]
    fn imports_and_relative_names() {
        let method = MethodSpec::function("some", Visibility::Public)
            .with_type_params(vec!["A".into()])
            .with_params(vec![ParamSpec::new("value", ty("A"))])
            .returning(ty("a.Option<A>"))
            .with_body(vec![Stmt::Return(Expr::new_diamond(
                ty("a.Options.Some<A>"),
                vec![Expr::static_call(
                    ty("java.util.Objects"),
                    "requireNonNull",
                    vec![Expr::name("value"), Expr::str("value is null")],
                )],
            ))]);
        let code = DerivedCode {
            methods: vec![method],
            ..DerivedCode::default()
        };

        assert_snapshot!(render_unit(&unit(code)), @r#"
        package a;

        import java.util.Objects;

        public final class Options {
            private Options() {
            }

            public static <A> Option<A> some(A value) {
                return new Options.Some<>(Objects.requireNonNull(value, "value is null"));
            }
        }
        "#);
    }

    #[test]
    fn clashing_simple_names_stay_qualified() {
        let method = MethodSpec::function("convert", Visibility::Package)
            .with_params(vec![ParamSpec::new("option", ty("fj.data.Option<java.lang.String>"))])
            .returning(ty("java.util.Optional<java.lang.String>"))
            .with_body(vec![Stmt::Return(Expr::static_call(
                ty("java.util.Optional"),
                "empty",
                Vec::new(),
            ))]);
        let nested = TypeSpec::interface("Option", Visibility::Private);
        let code = DerivedCode {
            types: vec![nested],
            methods: vec![method],
            ..DerivedCode::default()
        };

        let rendered = render_unit(&unit(code));

        assert!(rendered.contains("static Optional<String> convert(fj.data.Option<String> option) {"));
        assert!(rendered.contains("import java.util.Optional;"));
        assert!(!rendered.contains("import fj.data.Option;"));
    }

    #[test]
    fn precedence_and_lambdas() {
        let lambda = Expr::lambda_block(
            vec!["x".into(), "y".into()],
            vec![Stmt::Return(Expr::binary(
                BinOp::Mul,
                Expr::binary(BinOp::Add, Expr::name("x"), Expr::Int(1)),
                Expr::name("y"),
            ))],
        );
        let cond = Expr::conditional(
            Expr::this_field("f").is_null(),
            Expr::Null,
            Expr::lambda(vec!["v".into()], Expr::name("v")),
        );
        let method = MethodSpec::new("run", Visibility::Private).with_body(vec![
            Stmt::Expr(Expr::local_call("use", vec![lambda])),
            Stmt::Expr(Expr::local_call("use", vec![cond])),
            Stmt::Expr(Expr::name("e").cast(ty("a.Options.Lazy<A>")).call("eval", Vec::new())),
        ]);
        let code = DerivedCode {
            methods: vec![method],
            ..DerivedCode::default()
        };

        let rendered = render_unit(&unit(code));

        assert!(rendered.contains(&member(indoc!(
            "
                private void run() {
                    use((x, y) -> {
                        return (x + 1) * y;
                    });
                    use(this.f == null ? null : (v -> v));
                    ((Options.Lazy<A>) e).eval();
                }
            "
        ))));
    }

    #[test]
    fn interfaces_and_fields() {
        let apply = MethodSpec::new("apply", Visibility::Public)
            .with_params(vec![
                ParamSpec::new("a1", ty("A1")),
                ParamSpec::new("a2", ty("A2")),
                ParamSpec::new("a3", ty("A3")),
            ])
            .returning(ty("R"));
        let mut f3 = TypeSpec::interface("F3", Visibility::Public)
            .with_type_params(vec!["A1".into(), "A2".into(), "A3".into(), "R".into()]);
        f3.methods.push(apply);
        let field = FieldSpec::private_final("NONE", ty("a.Option"))
            .with_modifiers(vec![Modifier::Static, Modifier::Volatile]);
        let code = DerivedCode {
            types: vec![f3],
            fields: vec![field],
            ..DerivedCode::default()
        };

        let rendered = render_unit(&unit(code));

        assert!(rendered.contains("    private static volatile Option NONE;\n\n    private Options() {"));
        assert!(rendered.contains(&member(indoc!(
            "
                public interface F3<A1, A2, A3, R> {
                    R apply(A1 a1, A2 a2, A3 a3);
                }
            "
        ))));
    }
}
