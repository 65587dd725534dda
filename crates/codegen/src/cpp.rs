//! C++ backend.
//!
//! Emits a single translation unit: a small runtime preamble, the global
//! variable declarations, every function definition, and a `main` that runs
//! the remaining top-level statements in source order. Integer division goes
//! through the `safe_divide` guard; string helpers cover the methods the
//! standard library spells differently.

use helio_parser::parser::ast::{
    BinaryOp, Expr, ExprKind, Function, Literal, Program, Stmt, StmtKind, UnaryOp,
};
use helio_parser::Type;

use crate::Backend;

const PREAMBLE: &str = r#"int safe_divide(int numerator, int denominator) {
    if (denominator == 0) {
        throw std::runtime_error("Division by zero");
    }
    return numerator / denominator;
}

std::string hl_to_upper(std::string value) {
    std::transform(value.begin(), value.end(), value.begin(), ::toupper);
    return value;
}

std::string hl_to_lower(std::string value) {
    std::transform(value.begin(), value.end(), value.begin(), ::tolower);
    return value;
}

std::string hl_replace(std::string value, const std::string& needle, const std::string& replacement) {
    if (needle.empty()) {
        return value;
    }
    std::string::size_type at = 0;
    while ((at = value.find(needle, at)) != std::string::npos) {
        value.replace(at, needle.length(), replacement);
        at += replacement.length();
    }
    return value;
}

int hl_fact(int n) {
    int result = 1;
    for (int i = 2; i <= n; ++i) {
        result *= i;
    }
    return result;
}

std::string hl_to_binary(int n) {
    if (n == 0) {
        return "0";
    }
    bool negative = n < 0;
    unsigned int bits = negative ? -static_cast<unsigned int>(n) : n;
    std::string digits;
    while (bits > 0) {
        digits.insert(digits.begin(), '0' + (bits & 1));
        bits >>= 1;
    }
    return negative ? "-" + digits : digits;
}
"#;

pub struct CppBackend {
    out: String,
    indent: usize,
}

impl CppBackend {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expression(expr) => {
                self.write_indent();
                self.emit_expr(expr);
                self.out.push_str(";\n");
            }
            StmtKind::VarDecl {
                is_const,
                declared,
                name,
                initializer,
            } => {
                self.write_indent();
                if *is_const {
                    self.out.push_str("const ");
                }
                self.out.push_str(&cpp_type(declared));
                self.out.push(' ');
                self.out.push_str(name);
                if let Some(init) = initializer {
                    self.out.push_str(" = ");
                    self.emit_expr(init);
                }
                self.out.push_str(";\n");
            }
            StmtKind::Function(_) => {
                // Function definitions are hoisted by `generate`.
            }
            StmtKind::If {
                condition,
                then_block,
                elif_blocks,
                else_block,
            } => {
                self.write_indent();
                self.out.push_str("if (");
                self.emit_expr(condition);
                self.out.push_str(") {\n");
                self.emit_block(then_block);

                for (elif_condition, elif_body) in elif_blocks {
                    self.write_indent();
                    self.out.push_str("} else if (");
                    self.emit_expr(elif_condition);
                    self.out.push_str(") {\n");
                    self.emit_block(elif_body);
                }

                self.write_indent();
                self.out.push('}');
                if !else_block.is_empty() {
                    self.out.push_str(" else {\n");
                    self.emit_block(else_block);
                    self.write_indent();
                    self.out.push('}');
                }
                self.out.push('\n');
            }
            StmtKind::While { condition, body } => {
                self.write_indent();
                self.out.push_str("while (");
                self.emit_expr(condition);
                self.out.push_str(") {\n");
                self.emit_block(body);
                self.write_indent();
                self.out.push_str("}\n");
            }
            StmtKind::For {
                iterator,
                start,
                end,
                step,
                body,
            } => self.emit_for(iterator, start, end, step.as_ref(), body),
            StmtKind::Return(value) => {
                self.write_indent();
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.emit_expr(value);
                }
                self.out.push_str(";\n");
            }
            StmtKind::TryCatch {
                try_block,
                exception,
                catch_block,
            } => {
                self.write_indent();
                self.out.push_str("try {\n");
                self.emit_block(try_block);
                self.write_indent();
                self.out.push_str("} catch (std::exception& ");
                self.out.push_str(exception);
                self.out.push_str(") {\n");
                self.emit_block(catch_block);
                self.write_indent();
                self.out.push_str("}\n");
            }
            StmtKind::Print(value) => {
                self.write_indent();
                self.out.push_str("std::cout << ");
                self.emit_expr(value);
                self.out.push_str(" << std::endl;\n");
            }
            StmtKind::Input(prompt) => {
                self.write_indent();
                self.out.push_str("{ std::string helio_input; std::cout << ");
                self.emit_expr(prompt);
                self.out.push_str("; std::getline(std::cin, helio_input); }\n");
            }
            StmtKind::EndLoop => {
                self.write_indent();
                self.out.push_str("break;\n");
            }
            StmtKind::Next => {
                self.write_indent();
                self.out.push_str("continue;\n");
            }
        }
    }

    fn emit_block(&mut self, statements: &[Stmt]) {
        self.indent += 1;
        for stmt in statements {
            self.emit_stmt(stmt);
        }
        self.indent -= 1;
    }

    /// The range header lowers into a scoped block computing start, end, and
    /// a direction-corrected step before the actual `for`.
    fn emit_for(
        &mut self,
        iterator: &str,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &[Stmt],
    ) {
        self.write_indent();
        self.out.push_str("{\n");
        self.indent += 1;

        self.write_indent();
        self.out.push_str("int __start = ");
        self.emit_expr(start);
        self.out.push_str(";\n");

        self.write_indent();
        self.out.push_str("int __end = ");
        self.emit_expr(end);
        self.out.push_str(";\n");

        self.write_indent();
        self.out.push_str("int __step = ");
        match step {
            Some(step) => {
                self.out.push_str("(__start > __end ? -(");
                self.emit_expr(step);
                self.out.push_str(") : (");
                self.emit_expr(step);
                self.out.push_str("));\n");
            }
            None => {
                self.out.push_str("(__start < __end ? 1 : -1);\n");
            }
        }

        self.write_indent();
        self.out.push_str(&format!(
            "for (int {iterator} = __start; (__step > 0 ? {iterator} < __end : {iterator} > __end); {iterator} += __step) {{\n"
        ));
        self.emit_block(body);
        self.write_indent();
        self.out.push_str("}\n");

        self.indent -= 1;
        self.write_indent();
        self.out.push_str("}\n");
    }

    fn emit_prototype(&mut self, function: &Function) {
        let return_type = function.return_type.clone().unwrap_or(Type::Void);
        self.out.push_str(&cpp_type(&return_type));
        self.out.push(' ');
        self.out.push_str(&function.name);
        self.out.push('(');
        for (index, param) in function.params.iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&cpp_type(&param.ty));
            self.out.push(' ');
            self.out.push_str(&param.name);
        }
        self.out.push_str(");\n");
    }

    fn emit_function(&mut self, function: &Function) {
        self.out.push('\n');
        let return_type = function.return_type.clone().unwrap_or(Type::Void);
        self.out.push_str(&cpp_type(&return_type));
        self.out.push(' ');
        self.out.push_str(&function.name);
        self.out.push('(');
        for (index, param) in function.params.iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&cpp_type(&param.ty));
            self.out.push(' ');
            self.out.push_str(&param.name);
        }
        self.out.push_str(") {\n");
        self.emit_block(&function.body);
        self.out.push_str("}\n");
    }

    fn emit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(literal) => self.emit_literal(literal),
            ExprKind::Identifier(name) => self.out.push_str(name),
            ExprKind::Binary { op, left, right } => {
                // Integer division routes through the runtime guard.
                if *op == BinaryOp::Div && expr.ty == Some(Type::Int) {
                    self.out.push_str("safe_divide(");
                    self.emit_expr(left);
                    self.out.push_str(", ");
                    self.emit_expr(right);
                    self.out.push(')');
                } else {
                    self.out.push('(');
                    self.emit_expr(left);
                    self.out.push(' ');
                    self.out.push_str(binary_op_str(*op));
                    self.out.push(' ');
                    self.emit_expr(right);
                    self.out.push(')');
                }
            }
            ExprKind::Unary { op, operand } => {
                self.out.push_str(match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Neg => "-",
                });
                self.emit_expr(operand);
            }
            ExprKind::Member { object, member } => {
                self.emit_expr(object);
                self.out.push('.');
                self.out.push_str(member);
            }
            ExprKind::Index { target, index } => {
                self.emit_expr(target);
                self.out.push('[');
                self.emit_expr(index);
                self.out.push(']');
            }
            ExprKind::Call { callee, args } => self.emit_call(expr, callee, args),
            ExprKind::Assign { target, value } => {
                self.emit_expr(target);
                self.out.push_str(" = ");
                self.emit_expr(value);
            }
        }
    }

    fn emit_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Int(value) => self.out.push_str(&value.to_string()),
            Literal::Float(value) => self.out.push_str(&format!("{value:?}")),
            Literal::Str(value) => {
                self.out.push('"');
                self.out.push_str(&escape_string(value));
                self.out.push('"');
            }
            Literal::Bool(value) => self.out.push_str(if *value { "true" } else { "false" }),
            Literal::List(elements) => {
                self.out.push('{');
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        self.out.push_str(", ");
                    }
                    self.emit_expr(element);
                }
                self.out.push('}');
            }
        }
    }

    fn emit_call(&mut self, call: &Expr, callee: &Expr, args: &[Expr]) {
        if let ExprKind::Member { object, member } = &callee.kind {
            return self.emit_method_call(call, object, member, args);
        }

        if let ExprKind::Identifier(name) = &callee.kind {
            match name.as_str() {
                "input" => {
                    self.out
                        .push_str("({ std::string helio_input; std::cout << ");
                    self.emit_expr(&args[0]);
                    self.out
                        .push_str("; std::getline(std::cin, helio_input); helio_input; })");
                }
                "STR" => match args[0].ty.as_ref() {
                    Some(Type::Str) => self.emit_expr(&args[0]),
                    Some(Type::Bool) => {
                        self.out.push_str("std::string(");
                        self.emit_expr(&args[0]);
                        self.out.push_str(" ? \"true\" : \"false\")");
                    }
                    _ => {
                        self.out.push_str("std::to_string(");
                        self.emit_expr(&args[0]);
                        self.out.push(')');
                    }
                },
                "INT" => match args[0].ty.as_ref() {
                    Some(Type::Str) => {
                        self.out.push_str("std::stoi(");
                        self.emit_expr(&args[0]);
                        self.out.push(')');
                    }
                    _ => {
                        self.out.push_str("static_cast<int>(");
                        self.emit_expr(&args[0]);
                        self.out.push(')');
                    }
                },
                "FLOAT" => match args[0].ty.as_ref() {
                    Some(Type::Str) => {
                        self.out.push_str("std::stof(");
                        self.emit_expr(&args[0]);
                        self.out.push(')');
                    }
                    _ => {
                        self.out.push_str("static_cast<float>(");
                        self.emit_expr(&args[0]);
                        self.out.push(')');
                    }
                },
                _ => {
                    self.out.push_str(name);
                    self.emit_args(args);
                }
            }
            return;
        }

        self.emit_expr(callee);
        self.emit_args(args);
    }

    fn emit_method_call(&mut self, call: &Expr, object: &Expr, method: &str, args: &[Expr]) {
        match (object.ty.as_ref(), method) {
            (Some(Type::Str), "length") | (Some(Type::List(_)), "length") => {
                self.out.push_str("static_cast<int>(");
                self.emit_expr(object);
                self.out.push_str(".size())");
            }
            (Some(Type::Str), "substring") => {
                self.emit_expr(object);
                self.out.push_str(".substr(");
                self.emit_expr(&args[0]);
                self.out.push_str(", (");
                self.emit_expr(&args[1]);
                self.out.push_str(") - (");
                self.emit_expr(&args[0]);
                self.out.push_str("))");
            }
            (Some(Type::Str), "concat") => {
                self.out.push('(');
                self.emit_expr(object);
                self.out.push_str(" + ");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::Str), "toUpper") => {
                self.out.push_str("hl_to_upper(");
                self.emit_expr(object);
                self.out.push(')');
            }
            (Some(Type::Str), "toLower") => {
                self.out.push_str("hl_to_lower(");
                self.emit_expr(object);
                self.out.push(')');
            }
            (Some(Type::Str), "sub") => {
                self.out.push_str("hl_replace(");
                self.emit_expr(object);
                self.out.push_str(", ");
                self.emit_expr(&args[0]);
                self.out.push_str(", ");
                self.emit_expr(&args[1]);
                self.out.push(')');
            }
            (Some(Type::List(_)), "append") => {
                self.emit_expr(object);
                self.out.push_str(".push_back(");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::List(_)), "prepend") => {
                self.emit_expr(object);
                self.out.push_str(".insert(");
                self.emit_expr(object);
                self.out.push_str(".begin(), ");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::List(_)), "remove") => {
                self.emit_expr(object);
                self.out.push_str(".erase(");
                self.emit_expr(object);
                self.out.push_str(".begin() + ");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::List(_)), "empty") => {
                self.emit_expr(object);
                self.out.push_str(".clear()");
            }
            (Some(Type::Int), "power") => {
                self.out.push_str("static_cast<int>(std::pow(");
                self.emit_expr(object);
                self.out.push_str(", ");
                self.emit_expr(&args[0]);
                self.out.push_str("))");
            }
            (Some(Type::Int), "fact") => {
                self.out.push_str("hl_fact(");
                self.emit_expr(object);
                self.out.push(')');
            }
            (Some(Type::Int), "isEven") => {
                self.out.push_str("((");
                self.emit_expr(object);
                self.out.push_str(") % 2 == 0)");
            }
            (Some(Type::Int), "toBinary") => {
                self.out.push_str("hl_to_binary(");
                self.emit_expr(object);
                self.out.push(')');
            }
            (Some(Type::MathObject), "power") => {
                if call.ty == Some(Type::Int) {
                    self.out.push_str("static_cast<int>(std::pow(");
                    self.emit_expr(&args[0]);
                    self.out.push_str(", ");
                    self.emit_expr(&args[1]);
                    self.out.push_str("))");
                } else {
                    self.out.push_str("std::pow(");
                    self.emit_expr(&args[0]);
                    self.out.push_str(", ");
                    self.emit_expr(&args[1]);
                    self.out.push(')');
                }
            }
            (Some(Type::MathObject), "sqrt") => {
                self.out.push_str("std::sqrt(");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::MathObject), "abs") => {
                self.out.push_str("std::abs(");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::MathObject), "round") => {
                self.out.push_str("static_cast<int>(std::round(");
                self.emit_expr(&args[0]);
                self.out.push_str("))");
            }
            _ => {
                self.emit_expr(object);
                self.out.push('.');
                self.out.push_str(method);
                self.emit_args(args);
            }
        }
    }

    fn emit_args(&mut self, args: &[Expr]) {
        self.out.push('(');
        for (index, arg) in args.iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            self.emit_expr(arg);
        }
        self.out.push(')');
    }
}

impl Backend for CppBackend {
    fn generate(&mut self, program: &Program) -> String {
        self.out.clear();
        self.indent = 0;

        self.out.push_str("#include <algorithm>\n");
        self.out.push_str("#include <cmath>\n");
        self.out.push_str("#include <iostream>\n");
        self.out.push_str("#include <stdexcept>\n");
        self.out.push_str("#include <string>\n");
        self.out.push_str("#include <vector>\n\n");
        self.out.push_str(PREAMBLE);
        self.out.push('\n');

        // Prototypes first so globals and functions may refer to each other
        // regardless of definition order.
        for stmt in &program.statements {
            if let StmtKind::Function(function) = &stmt.kind {
                self.emit_prototype(function);
            }
        }

        for stmt in &program.statements {
            if matches!(stmt.kind, StmtKind::VarDecl { .. }) {
                self.emit_stmt(stmt);
            }
        }

        for stmt in &program.statements {
            if let StmtKind::Function(function) = &stmt.kind {
                self.emit_function(function);
            }
        }

        self.out.push_str("\nint main() {\n");
        self.indent += 1;
        for stmt in &program.statements {
            if matches!(
                stmt.kind,
                StmtKind::VarDecl { .. } | StmtKind::Function(_)
            ) {
                continue;
            }
            self.emit_stmt(stmt);
        }
        self.write_indent();
        self.out.push_str("return 0;\n");
        self.indent -= 1;
        self.out.push_str("}\n");

        std::mem::take(&mut self.out)
    }

    fn output_file(&self) -> &'static str {
        "output.cpp"
    }
}

impl Default for CppBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Gt => ">",
        BinaryOp::Le => "<=",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

fn cpp_type(ty: &Type) -> String {
    match ty {
        Type::Int => "int".to_string(),
        Type::Float => "float".to_string(),
        Type::Str => "std::string".to_string(),
        Type::Bool => "bool".to_string(),
        Type::List(Some(element)) => format!("std::vector<{}>", cpp_type(element)),
        Type::List(None) => "std::vector<int>".to_string(),
        Type::Void => "void".to_string(),
        Type::MathObject => "auto".to_string(),
    }
}

fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
