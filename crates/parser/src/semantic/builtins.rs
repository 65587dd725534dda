//! Built-in callables: the global conversion functions and the method
//! surfaces of strings, lists, integers, and the `Math` namespace.

use crate::parser::ast::{Expr, ExprKind};
use crate::types::Type;

use super::Analyzer;

impl Analyzer {
    /// Type a call expression. User functions are looked up in the signature
    /// registry; everything else dispatches on the callee shape and the
    /// receiver's resolved type.
    pub(crate) fn check_call(&mut self, callee: &mut Expr, args: &mut [Expr]) -> Type {
        let result = match &mut callee.kind {
            ExprKind::Identifier(name) => {
                let name = name.clone();
                self.check_named_call(&name, args)
            }
            ExprKind::Member { object, member } => {
                let member = member.clone();
                let object_type = self.check_expression(object);
                match object_type {
                    Type::List(element) => {
                        self.check_list_method(&member, element.as_deref(), args)
                    }
                    Type::Str => self.check_string_method(&member, args),
                    Type::Int => self.check_int_method(&member, args),
                    Type::MathObject => self.check_math_method(&member, args),
                    _ => {
                        self.add_error("Invalid function call target");
                        Type::Void
                    }
                }
            }
            _ => {
                self.add_error("Invalid function call target");
                Type::Void
            }
        };

        callee.ty = Some(result.clone());
        result
    }

    fn check_named_call(&mut self, name: &str, args: &mut [Expr]) -> Type {
        match name {
            "input" => {
                if args.len() != 1 {
                    self.add_error("Input function expects exactly one argument.");
                }
                if let Some(prompt) = args.first_mut() {
                    let prompt_type = self.check_expression(prompt);
                    if prompt_type != Type::Str {
                        self.add_error("Input prompt must be a string");
                    }
                }
                Type::Str
            }
            "STR" => {
                if args.len() != 1 {
                    self.add_error("Function `STR` expects exactly one argument.");
                    return Type::Void;
                }
                let arg_type = self.check_expression(&mut args[0]);
                match arg_type {
                    Type::Int | Type::Float | Type::Bool | Type::Str => {}
                    // A list access on an unknown-element list comes through
                    // as `void`; the conversion is allowed to proceed.
                    Type::Void if is_list_access(&args[0]) => {}
                    _ => {
                        self.add_error("`STR` function argument must be int, float, bool, or string.");
                    }
                }
                Type::Str
            }
            "INT" => {
                if args.len() != 1 {
                    self.add_error("Function `INT` expects exactly one argument.");
                    return Type::Int;
                }
                let arg_type = self.check_expression(&mut args[0]);
                match arg_type {
                    Type::Float | Type::Bool | Type::Str => {}
                    Type::Void if is_list_access(&args[0]) => {}
                    _ => {
                        self.add_error("`INT` function argument must be float, bool, or string.");
                    }
                }
                Type::Int
            }
            "FLOAT" => {
                if args.len() != 1 {
                    self.add_error("Function `FLOAT` expects exactly one argument.");
                    return Type::Float;
                }
                let arg_type = self.check_expression(&mut args[0]);
                match arg_type {
                    Type::Int | Type::Bool | Type::Str => {}
                    Type::Void if is_list_access(&args[0]) => {}
                    _ => {
                        self.add_error("`FLOAT` function argument must be int, bool, or string.");
                    }
                }
                Type::Float
            }
            _ => self.check_user_call(name, args),
        }
    }

    fn check_user_call(&mut self, name: &str, args: &mut [Expr]) -> Type {
        if !self.is_declared(name) {
            self.add_error(format!("Call to undeclared function: {name}"));
            return Type::Void;
        }

        let Some(param_types) = self.signatures.get(name).cloned() else {
            self.add_error(format!("Function signature not found: {name}"));
            return Type::Void;
        };

        if args.len() != param_types.len() {
            self.add_error(format!("Incorrect number of arguments for function: {name}"));
            return Type::Void;
        }

        for (index, (param_type, arg)) in param_types.iter().zip(args.iter_mut()).enumerate() {
            let arg_type = self.check_expression(arg);
            if !param_type.accepts(&arg_type) {
                self.add_error(format!(
                    "Argument type mismatch in function call to \"{}\" at parameter {}",
                    name,
                    index + 1
                ));
            }
        }

        match self.return_types.get(name) {
            Some(Some(return_type)) => return_type.clone(),
            _ => {
                self.add_error(format!("Function return type not determined for: {name}"));
                Type::Void
            }
        }
    }

    fn check_list_method(
        &mut self,
        method: &str,
        element: Option<&Type>,
        args: &mut [Expr],
    ) -> Type {
        match method {
            "append" | "prepend" => {
                if args.len() != 1 {
                    self.add_error(format!("Method `{method}` requires exactly one argument."));
                } else {
                    let arg_type = self.check_expression(&mut args[0]);
                    // An unknown element type skips the compatibility check.
                    if let Some(element) = element {
                        if !element.accepts(&arg_type) {
                            self.add_error(format!(
                                "Argument type mismatch for method `{method}`."
                            ));
                        }
                    }
                }
                Type::Void
            }
            "remove" => {
                if args.len() != 1 {
                    self.add_error("Method `remove` requires exactly one argument.");
                } else {
                    let arg_type = self.check_expression(&mut args[0]);
                    if arg_type != Type::Int {
                        self.add_error("Argument to `remove` must be an integer index.");
                    }
                }
                Type::Void
            }
            "empty" => {
                if !args.is_empty() {
                    self.add_error("Method `empty` does not accept any arguments.");
                }
                Type::Void
            }
            "length" => {
                if !args.is_empty() {
                    self.add_error("Method `length` expects no arguments.");
                }
                Type::Int
            }
            _ => {
                self.add_error(format!("Invalid method `{method}` for list type."));
                Type::Void
            }
        }
    }

    fn check_string_method(&mut self, method: &str, args: &mut [Expr]) -> Type {
        match method {
            "length" => {
                if !args.is_empty() {
                    self.add_error("Method `length` expects no arguments.");
                }
                Type::Int
            }
            "substring" => {
                if args.len() != 2 {
                    self.add_error("Method `substring` expects two integer arguments.");
                } else {
                    let start_type = self.check_expression(&mut args[0]);
                    let end_type = self.check_expression(&mut args[1]);
                    if start_type != Type::Int || end_type != Type::Int {
                        self.add_error("Arguments to `substring` must be integers.");
                    }
                }
                Type::Str
            }
            "concat" => {
                if args.len() != 1 {
                    self.add_error("Method `concat` expects one string argument.");
                } else {
                    let arg_type = self.check_expression(&mut args[0]);
                    if arg_type != Type::Str {
                        self.add_error("Argument to `concat` must be a string.");
                    }
                }
                Type::Str
            }
            "toUpper" | "toLower" => {
                if !args.is_empty() {
                    self.add_error(format!("Method `{method}` expects no arguments."));
                }
                Type::Str
            }
            "sub" => {
                if args.len() != 2 {
                    self.add_error("Method `sub` expects two string arguments.");
                } else {
                    let needle_type = self.check_expression(&mut args[0]);
                    let replacement_type = self.check_expression(&mut args[1]);
                    if needle_type != Type::Str || replacement_type != Type::Str {
                        self.add_error("Arguments to `sub` must be strings.");
                    }
                }
                Type::Str
            }
            _ => {
                self.add_error(format!("Invalid method `{method}` for string type."));
                Type::Void
            }
        }
    }

    fn check_int_method(&mut self, method: &str, args: &mut [Expr]) -> Type {
        match method {
            "power" => {
                if args.len() != 1 {
                    self.add_error("Method `power` expects one integer argument.");
                } else {
                    let arg_type = self.check_expression(&mut args[0]);
                    if arg_type != Type::Int {
                        self.add_error("Argument to `power` must be integer.");
                    }
                }
                Type::Int
            }
            "fact" => {
                if !args.is_empty() {
                    self.add_error("Method `fact` expects no arguments.");
                }
                Type::Int
            }
            "isEven" => {
                if !args.is_empty() {
                    self.add_error("Method `isEven` expects no arguments.");
                }
                Type::Bool
            }
            "toBinary" => {
                if !args.is_empty() {
                    self.add_error("Method `toBinary` expects no arguments.");
                }
                Type::Str
            }
            _ => {
                self.add_error(format!("Invalid method `{method}` for int type."));
                Type::Void
            }
        }
    }

    fn check_math_method(&mut self, method: &str, args: &mut [Expr]) -> Type {
        match method {
            "power" => {
                if args.len() != 2 {
                    self.add_error("Method 'power' expects two numeric arguments.");
                    return Type::Void;
                }
                let base_type = self.check_expression(&mut args[0]);
                let exponent_type = self.check_expression(&mut args[1]);
                if !base_type.is_numeric() || !exponent_type.is_numeric() {
                    self.add_error("Arguments to 'power' must be numeric.");
                }
                if base_type == Type::Int && exponent_type == Type::Int {
                    Type::Int
                } else {
                    Type::Float
                }
            }
            "sqrt" => {
                if args.len() != 1 {
                    self.add_error("Method 'sqrt' expects one numeric argument.");
                } else {
                    let arg_type = self.check_expression(&mut args[0]);
                    if !arg_type.is_numeric() {
                        self.add_error("Argument to 'sqrt' must be numeric.");
                    }
                }
                Type::Float
            }
            "abs" => {
                if args.len() != 1 {
                    self.add_error("Method 'abs' expects one numeric argument.");
                    return Type::Void;
                }
                let arg_type = self.check_expression(&mut args[0]);
                if !arg_type.is_numeric() {
                    self.add_error("Argument to 'abs' must be numeric.");
                }
                arg_type
            }
            "round" => {
                if args.len() != 1 {
                    self.add_error("Method 'round' expects one numeric argument.");
                } else {
                    let arg_type = self.check_expression(&mut args[0]);
                    if !arg_type.is_numeric() {
                        self.add_error("Argument to 'round' must be numeric.");
                    }
                }
                Type::Int
            }
            _ => {
                self.add_error(format!("Invalid method '{method}' for Math object."));
                Type::Void
            }
        }
    }
}

fn is_list_access(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Index { .. })
}
