use helio_codegen::{Backend, CppBackend, PythonBackend};
use helio_parser::parser::ast::Program;
use helio_parser::{Analyzer, Lexer, Parser};

fn compile(source: &str) -> Program {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    assert!(lexer.errors().is_empty(), "lex errors: {:?}", lexer.errors());

    let mut parser = Parser::new(tokens);
    let Some(mut program) = parser.parse() else {
        panic!("parse errors: {:?}", parser.errors());
    };

    let mut analyzer = Analyzer::new();
    analyzer
        .analyze(&mut program)
        .unwrap_or_else(|errors| panic!("semantic errors: {errors:?}"));
    program
}

fn python(source: &str) -> String {
    PythonBackend::new().generate(&compile(source))
}

fn cpp(source: &str) -> String {
    CppBackend::new().generate(&compile(source))
}

const POWER_PROGRAM: &str = "fx power(int a, int b) { int result = 1; for (i, 0, b) { result = result * a; } return result; }\n\
                             int x = power(4, 2);\n\
                             print(x);";

// ----- Python backend -----

#[test]
fn python_emits_typed_function_definitions() {
    let out = python(POWER_PROGRAM);
    assert!(out.contains("def power(a: int, b: int) -> int:"), "{out}");
    assert!(out.contains("return result"), "{out}");
    assert!(out.contains("x = power(4, 2)"), "{out}");
    assert!(out.contains("print(x)"), "{out}");
}

#[test]
fn python_void_functions_have_no_return_annotation() {
    let out = python("fx log() { print(1); }");
    assert!(out.contains("def log():"), "{out}");
}

#[test]
fn python_range_selects_direction_at_runtime() {
    let out = python("int n = 5; for (i, 0, n) { print(i); }");
    assert!(
        out.contains("for i in range(0, n, (1 if (0) < (n) else -1)):"),
        "{out}"
    );
}

#[test]
fn python_folds_literal_descending_ranges() {
    let out = python("for (i, 5, 1, 2) { print(i); }");
    assert!(out.contains("for i in range(5, 1, -2):"), "{out}");
}

#[test]
fn python_maps_list_and_string_methods() {
    let out = python(
        "list<int> xs = [1, 2];\n\
         xs.append(3);\n\
         xs.prepend(0);\n\
         xs.remove(0);\n\
         int n = xs.length();\n\
         xs.empty();\n\
         string s = \"ab\";\n\
         string t = s.toUpper();\n\
         string u = s.sub(\"a\", \"b\");\n\
         string v = s.substring(0, 1);",
    );
    assert!(out.contains("xs.append(3)"), "{out}");
    assert!(out.contains("xs.insert(0, 0)"), "{out}");
    assert!(out.contains("xs.pop(0)"), "{out}");
    assert!(out.contains("len(xs)"), "{out}");
    assert!(out.contains("xs.clear()"), "{out}");
    assert!(out.contains("s.upper()"), "{out}");
    assert!(out.contains("s.replace(\"a\", \"b\")"), "{out}");
    assert!(out.contains("s[0:1]"), "{out}");
}

#[test]
fn python_maps_conversion_builtins() {
    let out = python("string s = STR(5); int i = INT(\"7\"); float f = FLOAT(1); string l = input(\"> \");");
    assert!(out.contains("s = str(5)"), "{out}");
    assert!(out.contains("i = int(\"7\")"), "{out}");
    assert!(out.contains("f = float(1)"), "{out}");
    assert!(out.contains("l = input(\"> \")"), "{out}");
}

#[test]
fn python_maps_math_and_int_methods() {
    let out = python(
        "int y = Math.power(2, 10);\n\
         float z = Math.sqrt(2.0);\n\
         int n = 6;\n\
         bool e = n.isEven();\n\
         string b = n.toBinary();\n\
         int f = n.fact();\n\
         int p = n.power(2);",
    );
    assert!(out.contains("y = (2 ** 10)"), "{out}");
    assert!(out.contains("z = math.sqrt(2.0)"), "{out}");
    assert!(out.contains("e = (n % 2 == 0)"), "{out}");
    assert!(out.contains("b = format(n, \"b\")"), "{out}");
    assert!(out.contains("f = math.factorial(n)"), "{out}");
    assert!(out.contains("p = (n ** 2)"), "{out}");
    assert!(out.contains("import math"), "{out}");
}

#[test]
fn python_emits_elif_chains() {
    let out = python("if (true) { print(1); } elif (false) { print(2); } else { print(3); }");
    assert!(out.contains("if True:"), "{out}");
    assert!(out.contains("elif False:"), "{out}");
    assert!(out.contains("else:"), "{out}");
}

#[test]
fn python_loop_control_and_try_except() {
    let out = python("while (true) { try { endloop; } catch (e) { next; } }");
    assert!(out.contains("while True:"), "{out}");
    assert!(out.contains("break"), "{out}");
    assert!(out.contains("continue"), "{out}");
    assert!(out.contains("try:"), "{out}");
    assert!(out.contains("except Exception as e:"), "{out}");
}

#[test]
fn python_empty_blocks_emit_pass() {
    let out = python("fx noop() { } if (true) { }");
    assert!(out.contains("def noop():\n    pass"), "{out}");
    assert!(out.contains("if True:\n    pass"), "{out}");
}

// ----- C++ backend -----

#[test]
fn cpp_emits_program_skeleton() {
    let out = cpp(POWER_PROGRAM);
    assert!(out.contains("int power(int a, int b);"), "{out}");
    assert!(out.contains("int power(int a, int b) {"), "{out}");
    assert!(out.contains("int x = power(4, 2);"), "{out}");
    assert!(out.contains("int main() {"), "{out}");
    assert!(out.contains("return 0;"), "{out}");
}

#[test]
fn cpp_guards_integer_division() {
    let out = cpp("int count = 2; int r = 10 / count;");
    assert!(out.contains("int safe_divide(int numerator, int denominator)"), "{out}");
    assert!(out.contains("safe_divide(10, count)"), "{out}");
}

#[test]
fn cpp_does_not_guard_float_division() {
    let out = cpp("float f = 10.0 / 4.0;");
    assert!(out.contains("(10.0 / 4.0)"), "{out}");
}

#[test]
fn cpp_lowers_for_loops_with_direction_correction() {
    let out = cpp("for (i, 0, 5) { print(i); }");
    assert!(out.contains("int __start = 0;"), "{out}");
    assert!(out.contains("int __end = 5;"), "{out}");
    assert!(out.contains("int __step = (__start < __end ? 1 : -1);"), "{out}");
    assert!(
        out.contains("for (int i = __start; (__step > 0 ? i < __end : i > __end); i += __step) {"),
        "{out}"
    );
}

#[test]
fn cpp_negates_step_for_descending_ranges() {
    let out = cpp("for (i, 5, 1, 2) { print(i); }");
    assert!(out.contains("int __step = (__start > __end ? -(2) : (2));"), "{out}");
}

#[test]
fn cpp_maps_types() {
    let out = cpp("const int k = 3; string s = \"x\"; list<float> fs = [1.5]; bool b = true;");
    assert!(out.contains("const int k = 3;"), "{out}");
    assert!(out.contains("std::string s = \"x\";"), "{out}");
    assert!(out.contains("std::vector<float> fs = {1.5};"), "{out}");
    assert!(out.contains("bool b = true;"), "{out}");
}

#[test]
fn cpp_maps_string_helpers() {
    let out = cpp("string s = \"ab\"; string t = s.toUpper(); string u = s.sub(\"a\", \"b\"); int n = s.length();");
    assert!(out.contains("hl_to_upper(s)"), "{out}");
    assert!(out.contains("hl_replace(s, \"a\", \"b\")"), "{out}");
    assert!(out.contains("static_cast<int>(s.size())"), "{out}");
}

#[test]
fn cpp_maps_list_methods() {
    let out = cpp("list<int> xs = [1]; xs.append(2); xs.prepend(0); xs.remove(0); xs.empty();");
    assert!(out.contains("xs.push_back(2)"), "{out}");
    assert!(out.contains("xs.insert(xs.begin(), 0)"), "{out}");
    assert!(out.contains("xs.erase(xs.begin() + 0)"), "{out}");
    assert!(out.contains("xs.clear()"), "{out}");
}

#[test]
fn cpp_math_power_casts_only_for_integers() {
    let out = cpp("int y = Math.power(2, 3); float z = Math.power(2.0, 3);");
    assert!(out.contains("int y = static_cast<int>(std::pow(2, 3));"), "{out}");
    assert!(out.contains("float z = std::pow(2.0, 3);"), "{out}");
}

#[test]
fn cpp_int_receiver_methods_use_helpers() {
    let out = cpp("int n = 6; int f = n.fact(); string b = n.toBinary(); bool e = n.isEven();");
    assert!(out.contains("hl_fact(n)"), "{out}");
    assert!(out.contains("hl_to_binary(n)"), "{out}");
    assert!(out.contains("((n) % 2 == 0)"), "{out}");
}

#[test]
fn cpp_reads_input_with_a_statement_expression() {
    let out = cpp("string s = input(\"? \");");
    assert!(out.contains("std::getline(std::cin, helio_input)"), "{out}");
}

#[test]
fn cpp_try_catch_binds_std_exception() {
    let out = cpp("try { print(1); } catch (e) { print(2); }");
    assert!(out.contains("} catch (std::exception& e) {"), "{out}");
}

#[test]
fn cpp_escapes_string_literals() {
    let out = cpp("print(\"a\tb\");");
    assert!(out.contains("\"a\\tb\""), "{out}");
}

#[test]
fn cpp_loop_control_statements() {
    let out = cpp("while (true) { endloop; } for (i, 0, 2) { next; }");
    assert!(out.contains("break;"), "{out}");
    assert!(out.contains("continue;"), "{out}");
}

#[test]
fn backends_report_their_output_files() {
    assert_eq!(PythonBackend::new().output_file(), "output.py");
    assert_eq!(CppBackend::new().output_file(), "output.cpp");
}
