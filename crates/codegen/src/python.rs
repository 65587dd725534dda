//! Python backend.
//!
//! Emits an `output.py`-ready re-print of the annotated tree. Most constructs
//! map one-to-one; the differences are the `for` range direction handling,
//! the builtin method renames, and the `Math` namespace mapping onto the
//! `math` module and operators.

use helio_parser::parser::ast::{
    BinaryOp, Expr, ExprKind, Function, Literal, Program, Stmt, StmtKind, UnaryOp,
};
use helio_parser::Type;

use crate::Backend;

pub struct PythonBackend {
    out: String,
    indent: usize,
}

impl PythonBackend {
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

    fn emit_block(&mut self, statements: &[Stmt]) {
        self.indent += 1;
        if statements.is_empty() {
            self.write_indent();
            self.out.push_str("pass\n");
        } else {
            for stmt in statements {
                self.emit_stmt(stmt);
            }
        }
        self.indent -= 1;
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expression(expr) => {
                self.write_indent();
                self.emit_expr(expr);
                self.out.push('\n');
            }
            StmtKind::VarDecl {
                name, initializer, ..
            } => {
                self.write_indent();
                self.out.push_str(name);
                self.out.push_str(" = ");
                match initializer {
                    Some(init) => self.emit_expr(init),
                    None => self.out.push_str("None"),
                }
                self.out.push('\n');
            }
            StmtKind::Function(function) => self.emit_function(function),
            StmtKind::If {
                condition,
                then_block,
                elif_blocks,
                else_block,
            } => {
                self.write_indent();
                self.out.push_str("if ");
                self.emit_expr(condition);
                self.out.push_str(":\n");
                self.emit_block(then_block);

                for (elif_condition, elif_body) in elif_blocks {
                    self.write_indent();
                    self.out.push_str("elif ");
                    self.emit_expr(elif_condition);
                    self.out.push_str(":\n");
                    self.emit_block(elif_body);
                }

                if !else_block.is_empty() {
                    self.write_indent();
                    self.out.push_str("else:\n");
                    self.emit_block(else_block);
                }
            }
            StmtKind::While { condition, body } => {
                self.write_indent();
                self.out.push_str("while ");
                self.emit_expr(condition);
                self.out.push_str(":\n");
                self.emit_block(body);
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
                self.out.push('\n');
            }
            StmtKind::TryCatch {
                try_block,
                exception,
                catch_block,
            } => {
                self.write_indent();
                self.out.push_str("try:\n");
                self.emit_block(try_block);
                self.write_indent();
                self.out.push_str("except Exception as ");
                self.out.push_str(exception);
                self.out.push_str(":\n");
                self.emit_block(catch_block);
            }
            StmtKind::Print(value) => {
                self.write_indent();
                self.out.push_str("print(");
                self.emit_expr(value);
                self.out.push_str(")\n");
            }
            StmtKind::Input(prompt) => {
                self.write_indent();
                self.out.push_str("input(");
                self.emit_expr(prompt);
                self.out.push_str(")\n");
            }
            StmtKind::EndLoop => {
                self.write_indent();
                self.out.push_str("break\n");
            }
            StmtKind::Next => {
                self.write_indent();
                self.out.push_str("continue\n");
            }
        }
    }

    fn emit_function(&mut self, function: &Function) {
        self.write_indent();
        self.out.push_str("def ");
        self.out.push_str(&function.name);
        self.out.push('(');
        for (index, param) in function.params.iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&param.name);
            self.out.push_str(": ");
            self.out.push_str(&type_hint(&param.ty));
        }
        self.out.push(')');

        if let Some(return_type) = &function.return_type {
            if *return_type != Type::Void {
                self.out.push_str(" -> ");
                self.out.push_str(&type_hint(return_type));
            }
        }

        self.out.push_str(":\n");
        self.emit_block(&function.body);
        self.out.push('\n');
    }

    /// `for (i, a, b[, s])` maps onto `range` with a direction-aware step:
    /// fully literal headers fold the sign at compile time, anything else
    /// selects it with a conditional expression at run time.
    fn emit_for(
        &mut self,
        iterator: &str,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &[Stmt],
    ) {
        self.write_indent();
        self.out.push_str("for ");
        self.out.push_str(iterator);
        self.out.push_str(" in range(");
        self.emit_expr(start);
        self.out.push_str(", ");
        self.emit_expr(end);
        self.out.push_str(", ");

        match step {
            Some(step) => match (int_literal(start), int_literal(end), int_literal(step)) {
                (Some(start_value), Some(end_value), Some(step_value)) => {
                    let folded = if (start_value > end_value && step_value > 0)
                        || (start_value < end_value && step_value < 0)
                    {
                        -step_value
                    } else {
                        step_value
                    };
                    self.out.push_str(&folded.to_string());
                }
                _ => {
                    self.out.push('(');
                    self.emit_expr(step);
                    self.out.push_str(" if (");
                    self.emit_expr(start);
                    self.out.push_str(") < (");
                    self.emit_expr(end);
                    self.out.push_str(") else -(");
                    self.emit_expr(step);
                    self.out.push_str("))");
                }
            },
            None => {
                self.out.push_str("(1 if (");
                self.emit_expr(start);
                self.out.push_str(") < (");
                self.emit_expr(end);
                self.out.push_str(") else -1)");
            }
        }

        self.out.push_str("):\n");
        self.emit_block(body);
    }

    fn emit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(literal) => self.emit_literal(literal),
            ExprKind::Identifier(name) => self.out.push_str(name),
            ExprKind::Binary { op, left, right } => {
                self.out.push('(');
                self.emit_expr(left);
                self.out.push(' ');
                self.out.push_str(binary_op_str(*op));
                self.out.push(' ');
                self.emit_expr(right);
                self.out.push(')');
            }
            ExprKind::Unary { op, operand } => {
                self.out.push_str(match op {
                    UnaryOp::Not => "not ",
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
            ExprKind::Call { callee, args } => self.emit_call(callee, args),
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
                self.out.push_str(value);
                self.out.push('"');
            }
            Literal::Bool(value) => self.out.push_str(if *value { "True" } else { "False" }),
            Literal::List(elements) => {
                self.out.push('[');
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        self.out.push_str(", ");
                    }
                    self.emit_expr(element);
                }
                self.out.push(']');
            }
        }
    }

    fn emit_call(&mut self, callee: &Expr, args: &[Expr]) {
        if let ExprKind::Member { object, member } = &callee.kind {
            return self.emit_method_call(object, member, args);
        }

        if let ExprKind::Identifier(name) = &callee.kind {
            let mapped = match name.as_str() {
                "STR" => "str",
                "INT" => "int",
                "FLOAT" => "float",
                other => other,
            };
            self.out.push_str(mapped);
            self.emit_args(args);
            return;
        }

        self.emit_expr(callee);
        self.emit_args(args);
    }

    fn emit_method_call(&mut self, object: &Expr, method: &str, args: &[Expr]) {
        match (object.ty.as_ref(), method) {
            (Some(Type::Str), "length") | (Some(Type::List(_)), "length") => {
                self.out.push_str("len(");
                self.emit_expr(object);
                self.out.push(')');
            }
            (Some(Type::Str), "substring") => {
                self.emit_expr(object);
                self.out.push('[');
                self.emit_expr(&args[0]);
                self.out.push(':');
                self.emit_expr(&args[1]);
                self.out.push(']');
            }
            (Some(Type::Str), "concat") => {
                self.emit_expr(object);
                self.out.push_str(" + ");
                self.emit_expr(&args[0]);
            }
            (Some(Type::Str), "toUpper") => {
                self.emit_expr(object);
                self.out.push_str(".upper()");
            }
            (Some(Type::Str), "toLower") => {
                self.emit_expr(object);
                self.out.push_str(".lower()");
            }
            (Some(Type::Str), "sub") => {
                self.emit_expr(object);
                self.out.push_str(".replace(");
                self.emit_expr(&args[0]);
                self.out.push_str(", ");
                self.emit_expr(&args[1]);
                self.out.push(')');
            }
            (Some(Type::List(_)), "append") => {
                self.emit_expr(object);
                self.out.push_str(".append(");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::List(_)), "prepend") => {
                self.emit_expr(object);
                self.out.push_str(".insert(0, ");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::List(_)), "remove") => {
                self.emit_expr(object);
                self.out.push_str(".pop(");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::List(_)), "empty") => {
                self.emit_expr(object);
                self.out.push_str(".clear()");
            }
            (Some(Type::Int), "power") => {
                self.out.push('(');
                self.emit_expr(object);
                self.out.push_str(" ** ");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::Int), "fact") => {
                self.out.push_str("math.factorial(");
                self.emit_expr(object);
                self.out.push(')');
            }
            (Some(Type::Int), "isEven") => {
                self.out.push('(');
                self.emit_expr(object);
                self.out.push_str(" % 2 == 0)");
            }
            (Some(Type::Int), "toBinary") => {
                self.out.push_str("format(");
                self.emit_expr(object);
                self.out.push_str(", \"b\")");
            }
            (Some(Type::MathObject), "power") => {
                self.out.push('(');
                self.emit_expr(&args[0]);
                self.out.push_str(" ** ");
                self.emit_expr(&args[1]);
                self.out.push(')');
            }
            (Some(Type::MathObject), "sqrt") => {
                self.out.push_str("math.sqrt(");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::MathObject), "abs") => {
                self.out.push_str("abs(");
                self.emit_expr(&args[0]);
                self.out.push(')');
            }
            (Some(Type::MathObject), "round") => {
                self.out.push_str("round(");
                self.emit_expr(&args[0]);
                self.out.push(')');
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

impl Backend for PythonBackend {
    fn generate(&mut self, program: &Program) -> String {
        self.out.clear();
        self.indent = 0;

        self.out.push_str("# Generated by the Helio compiler\n");
        self.out.push_str("import math\n");
        self.out.push_str("from typing import Any, List\n\n");

        for stmt in &program.statements {
            self.emit_stmt(stmt);
        }

        std::mem::take(&mut self.out)
    }

    fn output_file(&self) -> &'static str {
        "output.py"
    }
}

impl Default for PythonBackend {
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
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
    }
}

fn int_literal(expr: &Expr) -> Option<i32> {
    match &expr.kind {
        ExprKind::Literal(Literal::Int(value)) => Some(*value),
        _ => None,
    }
}

fn type_hint(ty: &Type) -> String {
    match ty {
        Type::Int => "int".to_string(),
        Type::Float => "float".to_string(),
        Type::Str => "str".to_string(),
        Type::Bool => "bool".to_string(),
        Type::List(Some(element)) => format!("List[{}]", type_hint(element)),
        Type::List(None) => "List[Any]".to_string(),
        Type::Void => "None".to_string(),
        Type::MathObject => "Any".to_string(),
    }
}
