//! Two-pass semantic analysis.
//!
//! Pass 1 registers every top-level function signature so calls may precede
//! definitions. Pass 2 walks the whole tree, annotating each expression node
//! with its resolved type while enforcing scoping, initialization,
//! constness, control-flow placement, and argument compatibility. The
//! analyzer never aborts; diagnostics accumulate in source order and a
//! compilation succeeds only when the list stays empty.

mod builtins;

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::SemanticError;
use crate::parser::ast::{
    BinaryOp, Expr, ExprKind, Function, Literal, Program, Stmt, StmtKind, UnaryOp,
};
use crate::types::Type;

/// Parameter types of a registered function.
pub(crate) type ParamTypes = SmallVec<[Type; 4]>;

pub struct Analyzer {
    errors: Vec<SemanticError>,
    /// Innermost scope last. `None` marks a function whose return type has
    /// not been resolved yet.
    scopes: Vec<HashMap<String, Option<Type>>>,
    /// Parallel to `scopes`: whether a name is definitely assigned.
    initialized: Vec<HashMap<String, bool>>,
    consts: HashSet<String>,
    signatures: IndexMap<String, ParamTypes>,
    return_types: IndexMap<String, Option<Type>>,
    loop_depth: usize,
    current_function: Option<String>,
    current_return_type: Option<Type>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            scopes: Vec::new(),
            initialized: Vec::new(),
            consts: HashSet::new(),
            signatures: IndexMap::new(),
            return_types: IndexMap::new(),
            loop_depth: 0,
            current_function: None,
            current_return_type: None,
        }
    }

    /// Analyze a program, annotating expression types in place. All state is
    /// reset first, so analyzing the same tree twice yields identical types
    /// and diagnostics.
    pub fn analyze(&mut self, program: &mut Program) -> Result<(), Vec<SemanticError>> {
        self.errors.clear();
        self.scopes.clear();
        self.initialized.clear();
        self.consts.clear();
        self.signatures.clear();
        self.return_types.clear();
        self.loop_depth = 0;
        self.current_function = None;
        self.current_return_type = None;

        self.enter_scope();
        self.bind("Math", Type::MathObject, true);

        for stmt in &program.statements {
            if let StmtKind::Function(function) = &stmt.kind {
                self.register_function(function);
            }
        }

        for stmt in &mut program.statements {
            self.check_statement(stmt);
        }

        self.exit_scope();

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.clone())
        }
    }

    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    pub(crate) fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(SemanticError::new(message));
    }

    // ----- pass 1 -----

    fn register_function(&mut self, function: &Function) {
        if function.name == "Math" {
            self.add_error("Cannot declare function named 'Math' as it is reserved.");
            return;
        }

        if self.scopes[0].contains_key(&function.name) {
            self.add_error(format!("Function redeclaration: {}", function.name));
            return;
        }

        self.scopes[0].insert(function.name.clone(), None);
        self.return_types.insert(function.name.clone(), None);
        let param_types: ParamTypes = function.params.iter().map(|p| p.ty.clone()).collect();
        self.signatures.insert(function.name.clone(), param_types);
    }

    // ----- pass 2: statements -----

    fn check_statement(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Expression(expr) => {
                self.check_expression(expr);
            }
            StmtKind::VarDecl {
                is_const,
                declared,
                name,
                initializer,
            } => {
                let is_const = *is_const;
                let declared = declared.clone();
                let name = name.clone();
                self.check_var_declaration(is_const, declared, &name, initializer.as_mut());
            }
            StmtKind::Function(function) => self.check_function(function),
            StmtKind::If {
                condition,
                then_block,
                elif_blocks,
                else_block,
            } => {
                let condition_type = self.check_expression(condition);
                if condition_type != Type::Bool {
                    self.add_error("If condition must be a boolean expression");
                }

                self.enter_scope();
                for stmt in then_block {
                    self.check_statement(stmt);
                }
                self.exit_scope();

                for (elif_condition, elif_body) in elif_blocks {
                    let elif_type = self.check_expression(elif_condition);
                    if elif_type != Type::Bool {
                        self.add_error("Elif condition must be a boolean expression");
                    }

                    self.enter_scope();
                    for stmt in elif_body {
                        self.check_statement(stmt);
                    }
                    self.exit_scope();
                }

                self.enter_scope();
                for stmt in else_block {
                    self.check_statement(stmt);
                }
                self.exit_scope();
            }
            StmtKind::While { condition, body } => {
                self.loop_depth += 1;
                let condition_type = self.check_expression(condition);
                if condition_type != Type::Bool {
                    self.add_error("While condition must be a boolean expression");
                }

                self.enter_scope();
                for stmt in body {
                    self.check_statement(stmt);
                }
                self.exit_scope();
                self.loop_depth -= 1;
            }
            StmtKind::For {
                iterator,
                start,
                end,
                step,
                body,
            } => {
                self.loop_depth += 1;
                let iterator = iterator.clone();
                self.check_for_loop(&iterator, start, end, step.as_mut(), body);
                self.loop_depth -= 1;
            }
            StmtKind::EndLoop => {
                if self.loop_depth == 0 {
                    self.add_error("`endloop` can only be used within a loop.");
                }
            }
            StmtKind::Next => {
                if self.loop_depth == 0 {
                    self.add_error("`next` can only be used within a loop.");
                }
            }
            StmtKind::Return(value) => self.check_return(value.as_mut()),
            StmtKind::TryCatch {
                try_block,
                exception,
                catch_block,
            } => {
                if exception == "Math" {
                    self.add_error("Exception variable cannot be named 'Math' as it is reserved.");
                }

                self.enter_scope();
                for stmt in try_block {
                    self.check_statement(stmt);
                }
                self.exit_scope();

                let exception = exception.clone();
                self.enter_scope();
                self.bind(&exception, Type::Void, true);
                for stmt in catch_block {
                    self.check_statement(stmt);
                }
                self.exit_scope();
            }
            StmtKind::Print(expr) => {
                self.check_expression(expr);
            }
            StmtKind::Input(prompt) => {
                let prompt_type = self.check_expression(prompt);
                if prompt_type != Type::Str {
                    self.add_error("Input prompt must be a string");
                }
            }
        }
    }

    fn check_var_declaration(
        &mut self,
        is_const: bool,
        declared: Type,
        name: &str,
        initializer: Option<&mut Expr>,
    ) {
        if name == "Math" {
            self.add_error("Cannot declare variable named 'Math' as it is reserved.");
            return;
        }
        if self.is_declared(name) {
            self.add_error(format!("Variable redeclaration: {name}"));
            return;
        }

        self.bind(name, declared.clone(), initializer.is_some());

        if is_const {
            self.consts.insert(name.to_string());
        }

        if let Some(initializer) = initializer {
            let initializer_type = self.check_expression(initializer);
            if !declared.accepts(&initializer_type) {
                self.add_error(format!("Type mismatch in variable initialization: {name}"));
            }
        } else if is_const {
            self.add_error(format!("Const variable must be initialized: {name}"));
        }
    }

    fn check_function(&mut self, function: &mut Function) {
        if function.name == "Math" {
            self.add_error("Cannot declare function named 'Math' as it is reserved.");
            return;
        }

        let enclosing_function = self.current_function.take();
        let enclosing_return_type = self.current_return_type.take();
        self.current_function = Some(function.name.clone());

        self.enter_scope();

        let mut seen = HashSet::new();
        for param in &function.params {
            if param.name == "Math" {
                self.add_error("Parameter cannot be named 'Math' as it is reserved.");
            }
            if !seen.insert(param.name.clone()) {
                self.add_error(format!(
                    "Duplicate parameter name in function {}: {}",
                    function.name, param.name
                ));
            }
            self.bind(&param.name, param.ty.clone(), true);
        }

        for stmt in &mut function.body {
            self.check_statement(stmt);
        }

        // A body that never returns is a void function.
        let return_type = self.current_return_type.take().unwrap_or(Type::Void);
        self.return_types
            .insert(function.name.clone(), Some(return_type.clone()));
        self.scopes[0].insert(function.name.clone(), Some(return_type.clone()));
        function.return_type = Some(return_type);

        self.exit_scope();
        self.current_function = enclosing_function;
        self.current_return_type = enclosing_return_type;
    }

    fn check_return(&mut self, value: Option<&mut Expr>) {
        let Some(function_name) = self.current_function.clone() else {
            self.add_error("Return statement outside of function");
            return;
        };

        let return_type = match value {
            Some(expr) => self.check_expression(expr),
            None => Type::Void,
        };

        match &self.current_return_type {
            None => {
                // First return statement fixes the inferred type.
                self.current_return_type = Some(return_type.clone());
                self.return_types
                    .insert(function_name.clone(), Some(return_type.clone()));
                self.scopes[0].insert(function_name, Some(return_type));
            }
            Some(expected) => {
                if !expected.accepts(&return_type) {
                    self.add_error(format!(
                        "Return type mismatch in function '{}': expected {}, got {}",
                        function_name, expected, return_type
                    ));
                }
            }
        }
    }

    fn check_for_loop(
        &mut self,
        iterator: &str,
        start: &mut Expr,
        end: &mut Expr,
        step: Option<&mut Expr>,
        body: &mut [Stmt],
    ) {
        self.enter_scope();

        if iterator == "Math" {
            self.add_error("Loop iterator cannot be named 'Math' as it is reserved.");
        }

        self.bind(iterator, Type::Int, true);

        let start_type = self.check_expression(start);
        let end_type = self.check_expression(end);
        if start_type != Type::Int || end_type != Type::Int {
            self.add_error("For loop range must be integers");
        }

        if let Some(step) = step {
            let step_type = self.check_expression(step);
            if step_type != Type::Int {
                self.add_error("For loop step must be an integer");
            }

            match &step.kind {
                ExprKind::Literal(Literal::Int(value)) => {
                    if *value <= 0 {
                        self.add_error("For loop step increment must be positive");
                    }
                }
                ExprKind::Literal(_) => {}
                _ => self.add_error("For loop step must be a positive literal integer"),
            }
        }

        for stmt in body {
            self.check_statement(stmt);
        }

        self.exit_scope();
    }

    // ----- pass 2: expressions -----

    /// Check an expression and annotate it with the resolved type, which is
    /// also returned for the caller's own checks.
    pub(crate) fn check_expression(&mut self, expr: &mut Expr) -> Type {
        let ty = match &mut expr.kind {
            ExprKind::Identifier(name) => {
                let name = name.clone();
                if !self.is_initialized(&name) {
                    self.add_error(format!("Variable '{name}' used before initialization."));
                }
                self.lookup_variable(&name)
            }
            ExprKind::Literal(literal) => self.check_literal(literal),
            ExprKind::Binary { op, left, right } => {
                let op = *op;
                let left_type = self.check_expression(left);
                let right_type = self.check_expression(right);

                if op == BinaryOp::Add && left_type == Type::Str && right_type == Type::Str {
                    Type::Str
                } else {
                    self.binary_op_type(op, &left_type, &right_type)
                }
            }
            ExprKind::Unary { op, operand } => {
                let op = *op;
                let operand_type = self.check_expression(operand);
                self.unary_op_type(op, operand_type)
            }
            ExprKind::Index { target, index } => {
                let target_type = self.check_expression(target);
                let index_type = self.check_expression(index);

                match &target_type {
                    Type::List(element) => {
                        if index_type != Type::Int {
                            self.add_error("List index must be an integer");
                        }
                        element
                            .as_ref()
                            .map(|element| (**element).clone())
                            .unwrap_or(Type::Void)
                    }
                    _ => {
                        self.add_error("Attempt to index a non-list type");
                        if index_type != Type::Int {
                            self.add_error("List index must be an integer");
                        }
                        Type::Void
                    }
                }
            }
            ExprKind::Member { object, member } => {
                let member = member.clone();
                let object_type = self.check_expression(object);
                self.member_type(&object_type, &member)
            }
            ExprKind::Call { callee, args } => self.check_call(callee, args),
            ExprKind::Assign { target, value } => {
                self.check_assignment(target, value);
                Type::Void
            }
        };

        expr.ty = Some(ty.clone());
        ty
    }

    fn check_literal(&mut self, literal: &mut Literal) -> Type {
        match literal {
            Literal::Int(_) => Type::Int,
            Literal::Float(_) => Type::Float,
            Literal::Str(_) => Type::Str,
            Literal::Bool(_) => Type::Bool,
            Literal::List(elements) => {
                let mut element_type: Option<Type> = None;
                let mut mixed = false;

                for element in elements.iter_mut() {
                    let ty = self.check_expression(element);
                    match &element_type {
                        None => element_type = Some(ty),
                        Some(expected) => {
                            if !expected.accepts(&ty) {
                                mixed = true;
                            }
                        }
                    }
                }

                if mixed {
                    self.add_error("List elements must have same type");
                    Type::unknown_list()
                } else {
                    Type::List(element_type.map(Box::new))
                }
            }
        }
    }

    fn check_assignment(&mut self, target: &mut Expr, value: &mut Expr) {
        match &mut target.kind {
            ExprKind::Identifier(name) => {
                let name = name.clone();
                if self.consts.contains(&name) {
                    self.add_error(format!("Cannot reassign to constant variable: {name}"));
                    return;
                }
                if !self.is_declared(&name) {
                    self.add_error(format!("Assignment to undeclared variable: {name}"));
                    return;
                }

                let target_type = self.lookup_variable(&name);
                target.ty = Some(target_type.clone());
                let value_type = self.check_expression(value);

                if !target_type.accepts(&value_type) {
                    self.add_error(format!("Type mismatch in assignment to: {name}"));
                }
                self.mark_initialized(&name);
            }
            ExprKind::Index { .. } => {
                // Types the index expression and reports non-list / non-int
                // index errors; the receiver's type lands on the inner node.
                self.check_expression(target);
                let element_type = match &target.kind {
                    ExprKind::Index { target: list, .. } => match list.ty.as_ref() {
                        Some(Type::List(Some(element))) => Some((**element).clone()),
                        _ => None,
                    },
                    _ => None,
                };

                let Some(element_type) = element_type else {
                    self.add_error(
                        "Cannot assign to an element of a non-list type or list with unknown element type.",
                    );
                    return;
                };

                let value_type = self.check_expression(value);
                if !element_type.accepts(&value_type) {
                    self.add_error("Type mismatch in list assignment.");
                }
            }
            _ => {
                self.add_error("Invalid assignment target");
            }
        }
    }

    // ----- operators -----

    fn binary_op_type(&mut self, op: BinaryOp, left: &Type, right: &Type) -> Type {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                if !left.is_numeric() || !right.is_numeric() {
                    self.add_error("Arithmetic operations require numeric operands");
                    return Type::Void;
                }
                if *left == Type::Float || *right == Type::Float {
                    Type::Float
                } else {
                    Type::Int
                }
            }
            BinaryOp::Mod => {
                if *left != Type::Int || *right != Type::Int {
                    self.add_error("Modulo operation requires integer operands");
                    return Type::Void;
                }
                Type::Int
            }
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le
            | BinaryOp::Ge => {
                if !left.accepts(right) && !right.accepts(left) {
                    self.add_error("Comparison operators require compatible types");
                    return Type::Void;
                }
                Type::Bool
            }
            BinaryOp::And | BinaryOp::Or => {
                if *left != Type::Bool || *right != Type::Bool {
                    self.add_error("Logical operators require boolean operands");
                    return Type::Void;
                }
                Type::Bool
            }
        }
    }

    fn unary_op_type(&mut self, op: UnaryOp, operand: Type) -> Type {
        match op {
            UnaryOp::Not => {
                if operand != Type::Bool {
                    self.add_error("Logical NOT operator requires boolean operand");
                    return Type::Void;
                }
                Type::Bool
            }
            UnaryOp::Neg => {
                if !operand.is_numeric() {
                    self.add_error("Unary minus requires numeric operand");
                    return Type::Void;
                }
                operand
            }
        }
    }

    /// Type of a bare member access (no call). Only the string projections
    /// have a meaningful type; everything else is `void`.
    fn member_type(&mut self, object_type: &Type, member: &str) -> Type {
        match object_type {
            Type::Str => match member {
                "length" => Type::Int,
                "substring" | "concat" | "toUpper" | "toLower" | "sub" => Type::Str,
                _ => Type::Void,
            },
            _ => Type::Void,
        }
    }

    // ----- scope bookkeeping -----

    fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
        self.initialized.push(HashMap::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
        self.initialized.pop();
    }

    fn bind(&mut self, name: &str, ty: Type, initialized: bool) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty during analysis")
            .insert(name.to_string(), Some(ty));
        self.initialized
            .last_mut()
            .expect("scope stack is never empty during analysis")
            .insert(name.to_string(), initialized);
    }

    fn mark_initialized(&mut self, name: &str) {
        self.initialized
            .last_mut()
            .expect("scope stack is never empty during analysis")
            .insert(name.to_string(), true);
    }

    pub(crate) fn is_declared(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains_key(name))
    }

    fn is_initialized(&self, name: &str) -> bool {
        for scope in self.initialized.iter().rev() {
            if let Some(flag) = scope.get(name) {
                return *flag;
            }
        }
        false
    }

    /// Innermost binding for `name`. Unknown names are diagnosed and treated
    /// as `void`, as is a function whose return type is still unresolved.
    fn lookup_variable(&mut self, name: &str) -> Type {
        for scope in self.scopes.iter().rev() {
            if let Some(binding) = scope.get(name) {
                return binding.clone().unwrap_or(Type::Void);
            }
        }
        self.add_error(format!("Undefined variable: {name}"));
        Type::Void
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
