use crate::symbol::{BUILTIN_EXIT, BUILTIN_PRINTLN};

/// Runtime module defining the builtins that generated code only declares.
/// Link it next to the program, e.g. `lli -extra-module=builtin.ll prog.ll`.
pub const BUILTIN_RUNTIME: &str = r#"; ugo builtin runtime

declare i32 @printf(ptr, ...)
declare void @exit(i32)

@ugo_builtin_format_int = private constant [4 x i8] c"%d\0A\00"

define i32 @ugo_builtin_println(i32 %x) {
  call i32 (ptr, ...) @printf(ptr @ugo_builtin_format_int, i32 %x)
  ret i32 0
}

define i32 @ugo_builtin_exit(i32 %x) {
  call void @exit(i32 %x)
  unreachable
}
"#;

/// Declarations every generated module starts with.
#[must_use]
pub fn builtin_declarations() -> String {
    format!("declare i32 {BUILTIN_PRINTLN}(i32)\ndeclare i32 {BUILTIN_EXIT}(i32)\n")
}
