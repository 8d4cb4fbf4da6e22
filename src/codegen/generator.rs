use std::collections::HashSet;
use std::fmt::Write;

use log::{debug, trace};

use crate::codegen::{builtin_declarations, CodegenError};
use crate::lexer::{Pos, Position};
use crate::parser::{
    AssignOp, AssignStmt, BinaryExpr, BinaryOp, BlockStmt, CallExpr, ConstSpec, DeferStmt,
    ElseBranch, Expr, Field, File, ForStmt, Func, Ident, IfStmt, Node, NumberValue, ReturnStmt,
    Stmt, UnaryExpr, UnaryOp, VarSpec,
};
use crate::symbol::{Object, ObjectKind, ScopeTree, Universe, BUILTIN_EXIT, BUILTIN_PRINTLN};

const RET_SLOT: &str = "%ret.slot";
const EXIT_LABEL: &str = "func.exit";

/// A `defer` site inside the function being lowered.
#[derive(Debug)]
struct DeferSite {
    flag: String,
    callee: String,
    arg_slots: Vec<String>,
}

/// Per-function output. Stack slots are hoisted into `entry`; everything
/// else goes to `body`, which starts in its own block.
#[derive(Debug, Default)]
struct Frame {
    entry: String,
    body: String,
    defers: Vec<DeferSite>,
}

/// Lowers a parsed file to textual LLVM IR over `i32` values.
pub struct CodeGenerator {
    scopes: ScopeTree,
    next_reg: usize,
    next_label: usize,
    filename: String,
    source: String,
    package: String,
    frame: Frame,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: ScopeTree::new(Universe::global()),
            next_reg: 0,
            next_label: 0,
            filename: String::new(),
            source: String::new(),
            package: String::new(),
            frame: Frame::default(),
        }
    }

    /// Generate a complete IR module for `file`.
    ///
    /// # Errors
    /// The first unresolved name, invalid assignment or unsupported literal.
    pub fn generate(&mut self, file: &File) -> Result<String, CodegenError> {
        let mut out = String::new();
        self.generate_to(file, &mut out)?;
        Ok(out)
    }

    /// Like [`CodeGenerator::generate`], writing into `w`. Nothing is written on error.
    ///
    /// # Errors
    /// See [`CodeGenerator::generate`]; also any error reported by `w`.
    pub fn generate_to(&mut self, file: &File, w: &mut impl Write) -> Result<(), CodegenError> {
        self.filename.clone_from(&file.filename);
        self.source.clone_from(&file.source);
        self.package.clone_from(&file.package.name);
        self.scopes = ScopeTree::new(Universe::global());

        let mut out = String::new();
        writeln!(out, "; package {}", self.package)?;
        writeln!(out, "; source {}", self.filename)?;
        writeln!(out)?;
        out.push_str(&builtin_declarations());
        writeln!(out)?;

        self.check_symbols(file)?;
        if self.package == "main" {
            if let Some(main) = file.func("main").filter(|f| f.arity() != 0) {
                return Err(CodegenError::ArgumentCountMismatch(
                    main.name.name.clone(),
                    0,
                    main.arity(),
                    self.position(main.name.pos()),
                ));
            }
        }

        self.scopes.enter();

        // First pass: declare package-level names so bodies may refer forward.
        for spec in &file.consts {
            let obj = Object::new(
                &spec.name.name,
                self.global_symbol(&spec.name.name),
                ObjectKind::Const,
                Some(spec.name.pos()),
            );
            self.declare(obj)?;
        }
        for spec in &file.globals {
            let obj = Object::new(
                &spec.name.name,
                self.global_symbol(&spec.name.name),
                ObjectKind::Global,
                Some(spec.name.pos()),
            );
            self.declare(obj)?;
        }
        // `init` functions run from the package initializer and cannot be referenced.
        for func in file.funcs.iter().filter(|f| f.recv.is_none() && !is_user_init(f)) {
            let obj = Object::new(
                &func.name.name,
                self.func_symbol(func),
                ObjectKind::Func { arity: func.arity() },
                Some(func.name.pos()),
            );
            self.declare(obj)?;
        }

        for spec in &file.consts {
            writeln!(out, "{} = global i32 0", self.global_symbol(&spec.name.name))?;
        }
        for spec in &file.globals {
            writeln!(out, "{} = global i32 0", self.global_symbol(&spec.name.name))?;
        }
        if !file.consts.is_empty() || !file.globals.is_empty() {
            writeln!(out)?;
        }

        // Second pass: function bodies.
        for func in &file.funcs {
            self.generate_function(func, &mut out)?;
            writeln!(out)?;
        }

        self.generate_init(file, &mut out)?;

        if self.package == "main" && file.func("main").is_some_and(|f| f.body.is_some()) {
            writeln!(out)?;
            writeln!(out, "define i32 @main() {{")?;
            writeln!(out, "  call i32 {}()", self.global_symbol("init"))?;
            writeln!(out, "  call i32 {}()", self.global_symbol("main"))?;
            writeln!(out, "  ret i32 0")?;
            writeln!(out, "}}")?;
        }

        self.scopes.leave();

        w.write_str(&out)?;
        Ok(())
    }

    /// Lower a bare expression into `@main`, whose result becomes the exit status.
    ///
    /// # Errors
    /// The first unresolved name or unsupported literal in `expr`.
    pub fn generate_expr(
        &mut self,
        filename: &str,
        source: &str,
        expr: &Expr,
    ) -> Result<String, CodegenError> {
        self.filename = filename.to_string();
        self.source = source.to_string();
        self.package = "main".to_string();

        let mut out = String::new();
        writeln!(out, "; expression {filename}")?;
        writeln!(out)?;
        out.push_str(&builtin_declarations());
        writeln!(out)?;

        self.generate_frame("@main", &[], &mut out, |gen| {
            let value = gen.generate_expression(expr)?;
            writeln!(gen.frame.body, "  store i32 {value}, ptr {RET_SLOT}, align 4")?;
            Ok(())
        })?;
        Ok(out)
    }

    /// Reject package-level names whose IR symbols would clash, either with
    /// each other or with the package initializer and the builtins.
    fn check_symbols(&self, file: &File) -> Result<(), CodegenError> {
        let mut taken: HashSet<String> = [
            self.global_symbol("init"),
            BUILTIN_PRINTLN.to_string(),
            BUILTIN_EXIT.to_string(),
        ]
        .into();

        let names = file
            .consts
            .iter()
            .map(|spec| (&spec.name, self.global_symbol(&spec.name.name)))
            .chain(
                file.globals
                    .iter()
                    .map(|spec| (&spec.name, self.global_symbol(&spec.name.name))),
            )
            .chain(file.funcs.iter().map(|func| (&func.name, self.func_symbol(func))));

        for (ident, symbol) in names {
            if !taken.insert(symbol) {
                return Err(CodegenError::Redeclared(
                    ident.name.clone(),
                    self.position(ident.pos()),
                ));
            }
        }
        Ok(())
    }

    /// Initialize constants and globals in declaration order, then run any `init` functions.
    fn generate_init(&mut self, file: &File, out: &mut String) -> Result<(), CodegenError> {
        let name = self.global_symbol("init");
        let mut user_inits = Vec::new();
        for func in file.funcs.iter().filter(|f| is_user_init(f)) {
            if func.arity() != 0 {
                return Err(CodegenError::ArgumentCountMismatch(
                    func.name.name.clone(),
                    0,
                    func.arity(),
                    self.position(func.name.pos()),
                ));
            }
            user_inits.push(self.func_symbol(func));
        }

        self.generate_frame(&name, &[], out, |gen| {
            for spec in &file.consts {
                let value = gen.generate_expression(&spec.value)?;
                let slot = gen.global_symbol(&spec.name.name);
                gen.store(&value, &slot)?;
            }
            for spec in &file.globals {
                if let Some(init) = &spec.value {
                    let value = gen.generate_expression(init)?;
                    let slot = gen.global_symbol(&spec.name.name);
                    gen.store(&value, &slot)?;
                }
            }
            for user_init in &user_inits {
                let reg = gen.new_reg();
                writeln!(gen.frame.body, "  {reg} = call i32 {user_init}()")?;
            }
            Ok(())
        })
    }

    /// Generate a function with its body, or an external declaration without one
    fn generate_function(&mut self, func: &Func, out: &mut String) -> Result<(), CodegenError> {
        let name = self.func_symbol(func);
        let params: Vec<&Field> = func.recv.iter().chain(func.params.iter()).collect();

        let Some(body) = &func.body else {
            let types = vec!["i32"; params.len()].join(", ");
            writeln!(out, "declare i32 {name}({types})")?;
            return Ok(());
        };

        if func.results.len() > 1 {
            return Err(CodegenError::TooManyResults(
                func.results.len(),
                self.position(func.results[1].pos()),
            ));
        }

        debug!("lowering function {}", func.name.name);

        self.generate_frame(&name, &params, out, |gen| {
            gen.generate_stmts(&body.stmts)
        })
    }

    /// Emit `define` with a return slot, parameter slots, the body produced by
    /// `lower`, and a shared exit block that runs deferred calls.
    fn generate_frame<F>(
        &mut self,
        name: &str,
        params: &[&Field],
        out: &mut String,
        lower: F,
    ) -> Result<(), CodegenError>
    where
        F: FnOnce(&mut Self) -> Result<(), CodegenError>,
    {
        self.frame = Frame::default();
        self.scopes.enter();

        writeln!(self.frame.entry, "  {RET_SLOT} = alloca i32, align 4")?;
        writeln!(self.frame.entry, "  store i32 0, ptr {RET_SLOT}, align 4")?;

        let mut args = Vec::with_capacity(params.len());
        for (i, field) in params.iter().enumerate() {
            // Blank and unnamed parameters get a slot but no binding.
            let named = field.name.as_ref().filter(|ident| ident.name != "_");
            let (param_name, pos) = match named {
                Some(ident) => (ident.name.clone(), ident.pos()),
                None => (i.to_string(), field.pos()),
            };
            let arg = local_symbol(&format!("arg.{param_name}"));
            let slot = self.alloca(&param_name, pos)?;
            writeln!(self.frame.entry, "  store i32 {arg}, ptr {slot}, align 4")?;
            args.push(format!("i32 {arg}"));

            if named.is_none() {
                continue;
            }
            let obj = Object::new(&param_name, slot, ObjectKind::Param, Some(pos));
            if self.scopes.insert(obj).is_some() {
                self.scopes.leave();
                return Err(CodegenError::Redeclared(param_name, self.position(pos)));
            }
        }

        let lowered = lower(self);
        self.scopes.leave();
        lowered?;

        let frame = std::mem::take(&mut self.frame);

        writeln!(out, "define i32 {name}({}) {{", args.join(", "))?;
        writeln!(out, "entry:")?;
        out.push_str(&frame.entry);
        writeln!(out, "  br label %body")?;
        writeln!(out, "body:")?;
        out.push_str(&frame.body);
        writeln!(out, "  br label %{EXIT_LABEL}")?;
        writeln!(out, "{EXIT_LABEL}:")?;

        for (site, defer) in frame.defers.iter().enumerate().rev() {
            let flag = self.new_reg();
            let set = self.new_reg();
            writeln!(out, "  {flag} = load i32, ptr {}, align 4", defer.flag)?;
            writeln!(out, "  {set} = icmp ne i32 {flag}, 0")?;
            writeln!(
                out,
                "  br i1 {set}, label %defer.run.{site}, label %defer.next.{site}"
            )?;
            writeln!(out, "defer.run.{site}:")?;
            let mut call_args = Vec::with_capacity(defer.arg_slots.len());
            for slot in &defer.arg_slots {
                let reg = self.new_reg();
                writeln!(out, "  {reg} = load i32, ptr {slot}, align 4")?;
                call_args.push(format!("i32 {reg}"));
            }
            writeln!(out, "  call i32 {}({})", defer.callee, call_args.join(", "))?;
            writeln!(out, "  br label %defer.next.{site}")?;
            writeln!(out, "defer.next.{site}:")?;
        }

        let ret = self.new_reg();
        writeln!(out, "  {ret} = load i32, ptr {RET_SLOT}, align 4")?;
        writeln!(out, "  ret i32 {ret}")?;
        writeln!(out, "}}")?;
        Ok(())
    }

    fn generate_stmts(&mut self, stmts: &[Stmt]) -> Result<(), CodegenError> {
        for stmt in stmts {
            self.generate_statement(stmt)?;
        }
        Ok(())
    }

    fn generate_statement(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Var(spec) => self.generate_var(spec),
            Stmt::Const(spec) => self.generate_const(spec),
            Stmt::Type(spec) => {
                trace!("ignoring local type {}", spec.name.name);
                Ok(())
            }
            Stmt::Block(block) => self.generate_block(block),
            Stmt::If(stmt) => self.generate_if(stmt),
            Stmt::For(stmt) => self.generate_for(stmt),
            Stmt::Assign(stmt) => self.generate_assign(stmt),
            Stmt::Defer(stmt) => self.generate_defer(stmt),
            Stmt::Return(stmt) => self.generate_return(stmt),
            Stmt::Expr(expr) => self.generate_expression(expr).map(|_| ()),
        }
    }

    fn generate_block(&mut self, block: &BlockStmt) -> Result<(), CodegenError> {
        self.scopes.enter();
        let result = self.generate_stmts(&block.stmts);
        self.scopes.leave();
        result
    }

    /// `var x [T] [= v]`: the initializer sees the scope before `x` exists.
    fn generate_var(&mut self, spec: &VarSpec) -> Result<(), CodegenError> {
        let value = match &spec.value {
            Some(init) => self.generate_expression(init)?,
            None => "0".to_string(),
        };
        self.declare_local(&spec.name, ObjectKind::Local, &value)
    }

    fn generate_const(&mut self, spec: &ConstSpec) -> Result<(), CodegenError> {
        let value = self.generate_expression(&spec.value)?;
        self.declare_local(&spec.name, ObjectKind::Const, &value)
    }

    fn declare_local(
        &mut self,
        name: &Ident,
        kind: ObjectKind,
        value: &str,
    ) -> Result<(), CodegenError> {
        if self.scopes.has_name(&name.name) {
            return Err(CodegenError::Redeclared(
                name.name.clone(),
                self.position(name.pos()),
            ));
        }
        let slot = self.alloca(&name.name, name.pos())?;
        self.store(value, &slot)?;
        self.scopes
            .insert(Object::new(&name.name, slot, kind, Some(name.pos())));
        Ok(())
    }

    fn generate_assign(&mut self, stmt: &AssignStmt) -> Result<(), CodegenError> {
        let mut values = Vec::with_capacity(stmt.values.len());
        for value in &stmt.values {
            values.push(self.generate_expression(value)?);
        }

        for (target, value) in stmt.targets.iter().zip(&values) {
            if stmt.op == AssignOp::Define && !self.scopes.has_name(&target.name) {
                self.declare_local(target, ObjectKind::Local, value)?;
                continue;
            }

            let obj = self.scopes.lookup(&target.name).ok_or_else(|| {
                CodegenError::UndefinedVariable(target.name.clone(), self.position(target.pos()))
            })?;
            match obj.kind {
                ObjectKind::Const => {
                    return Err(CodegenError::AssignToConstant(
                        target.name.clone(),
                        self.position(target.pos()),
                    ))
                }
                kind if kind.is_variable() => {
                    let slot = obj.mangled_name.clone();
                    self.store(value, &slot)?;
                }
                _ => {
                    return Err(CodegenError::NotAVariable(
                        target.name.clone(),
                        self.position(target.pos()),
                    ))
                }
            }
        }
        Ok(())
    }

    /// if.init -> if.cond -> (if.body | if.else) -> if.end
    fn generate_if(&mut self, stmt: &IfStmt) -> Result<(), CodegenError> {
        let id = self.new_label_id(stmt.pos());

        self.scopes.enter();
        self.branch(&format!("if.init.{id}"))?;
        self.label(&format!("if.init.{id}"))?;

        self.scopes.enter();
        let result = self.generate_if_clauses(stmt, &id);
        self.scopes.leave();
        self.scopes.leave();
        result?;

        self.label(&format!("if.end.{id}"))
    }

    fn generate_if_clauses(&mut self, stmt: &IfStmt, id: &str) -> Result<(), CodegenError> {
        if let Some(init) = &stmt.init {
            self.generate_statement(init)?;
        }
        self.branch(&format!("if.cond.{id}"))?;

        self.label(&format!("if.cond.{id}"))?;
        let cond = self.generate_condition(&stmt.cond)?;
        writeln!(
            self.frame.body,
            "  br i1 {cond}, label %if.body.{id}, label %if.else.{id}"
        )?;

        self.label(&format!("if.body.{id}"))?;
        self.generate_block(&stmt.body)?;
        self.branch(&format!("if.end.{id}"))?;

        self.label(&format!("if.else.{id}"))?;
        match &stmt.else_branch {
            Some(ElseBranch::If(nested)) => {
                self.scopes.enter();
                let result = self.generate_if(nested);
                self.scopes.leave();
                result?;
            }
            Some(ElseBranch::Block(block)) => self.generate_block(block)?,
            None => {}
        }
        self.branch(&format!("if.end.{id}"))
    }

    /// for.init -> for.cond -> (for.body -> for.post -> for.cond | for.end)
    fn generate_for(&mut self, stmt: &ForStmt) -> Result<(), CodegenError> {
        let id = self.new_label_id(stmt.pos());

        self.scopes.enter();
        let result = self.generate_for_clauses(stmt, &id);
        self.scopes.leave();
        result?;

        self.label(&format!("for.end.{id}"))
    }

    fn generate_for_clauses(&mut self, stmt: &ForStmt, id: &str) -> Result<(), CodegenError> {
        self.branch(&format!("for.init.{id}"))?;
        self.label(&format!("for.init.{id}"))?;
        if let Some(init) = &stmt.init {
            self.generate_statement(init)?;
        }
        self.branch(&format!("for.cond.{id}"))?;

        self.label(&format!("for.cond.{id}"))?;
        match &stmt.cond {
            Some(cond) => {
                let cond = self.generate_condition(cond)?;
                writeln!(
                    self.frame.body,
                    "  br i1 {cond}, label %for.body.{id}, label %for.end.{id}"
                )?;
            }
            None => self.branch(&format!("for.body.{id}"))?,
        }

        self.label(&format!("for.body.{id}"))?;
        self.generate_block(&stmt.body)?;
        self.branch(&format!("for.post.{id}"))?;

        self.label(&format!("for.post.{id}"))?;
        if let Some(post) = &stmt.post {
            self.generate_statement(post)?;
        }
        self.branch(&format!("for.cond.{id}"))
    }

    /// Arguments are evaluated now; the call runs when the function returns.
    fn generate_defer(&mut self, stmt: &DeferStmt) -> Result<(), CodegenError> {
        let callee = self.resolve_callee(&stmt.call)?;
        let site = self.next_label;
        self.next_label += 1;

        let flag = format!("%defer.flag.{site}");
        writeln!(self.frame.entry, "  {flag} = alloca i32, align 4")?;
        writeln!(self.frame.entry, "  store i32 0, ptr {flag}, align 4")?;

        let mut arg_slots = Vec::with_capacity(stmt.call.args.len());
        for (i, arg) in stmt.call.args.iter().enumerate() {
            let value = self.generate_expression(arg)?;
            let slot = format!("%defer.arg.{site}.{i}");
            writeln!(self.frame.entry, "  {slot} = alloca i32, align 4")?;
            self.store(&value, &slot)?;
            arg_slots.push(slot);
        }
        self.store("1", &flag)?;

        self.frame.defers.push(DeferSite {
            flag,
            callee,
            arg_slots,
        });
        Ok(())
    }

    fn generate_return(&mut self, stmt: &ReturnStmt) -> Result<(), CodegenError> {
        if stmt.results.len() > 1 {
            return Err(CodegenError::TooManyResults(
                stmt.results.len(),
                self.position(stmt.pos()),
            ));
        }
        if let Some(result) = stmt.results.first() {
            let value = self.generate_expression(result)?;
            self.store(&value, RET_SLOT)?;
        }
        self.branch(EXIT_LABEL)?;

        // Anything after the return lands in an unreachable block.
        let id = self.new_label_id(stmt.pos());
        self.label(&format!("return.after.{id}"))
    }

    /// Evaluate `expr` and return the register (or constant) holding it.
    fn generate_expression(&mut self, expr: &Expr) -> Result<String, CodegenError> {
        match expr {
            Expr::Ident(ident) => self.generate_ident(ident),
            Expr::Number(num) => match num.value {
                NumberValue::Int(value) => {
                    let value = i32::try_from(value).map_err(|_| {
                        CodegenError::IntegerOverflow(value.to_string(), self.position(num.pos()))
                    })?;
                    let reg = self.new_reg();
                    writeln!(self.frame.body, "  {reg} = add i32 0, {value}")?;
                    Ok(reg)
                }
                NumberValue::Float(value) => Err(CodegenError::UnsupportedFloat(
                    value.to_string(),
                    self.position(num.pos()),
                )),
            },
            Expr::Binary(binary) => self.generate_binary_op(binary),
            Expr::Unary(unary) => self.generate_unary_op(unary),
            Expr::Paren(paren) => self.generate_expression(&paren.x),
            Expr::Call(call) => self.generate_function_call(call),
        }
    }

    fn generate_ident(&mut self, ident: &Ident) -> Result<String, CodegenError> {
        let obj = self.scopes.lookup(&ident.name).ok_or_else(|| {
            CodegenError::UndefinedVariable(ident.name.clone(), self.position(ident.pos()))
        })?;
        if !obj.kind.is_variable() {
            return Err(CodegenError::NotAVariable(
                ident.name.clone(),
                self.position(ident.pos()),
            ));
        }
        let slot = obj.mangled_name.clone();
        let reg = self.new_reg();
        writeln!(self.frame.body, "  {reg} = load i32, ptr {slot}, align 4")?;
        Ok(reg)
    }

    fn generate_binary_op(&mut self, binary: &BinaryExpr) -> Result<String, CodegenError> {
        let x = self.generate_expression(&binary.x)?;
        let y = self.generate_expression(&binary.y)?;

        let instr = match binary.op {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "sdiv",
            BinaryOp::Mod => "srem",
            BinaryOp::Eql => "icmp eq",
            BinaryOp::Neq => "icmp ne",
            BinaryOp::Lss => "icmp slt",
            BinaryOp::Leq => "icmp sle",
            BinaryOp::Gtr => "icmp sgt",
            BinaryOp::Geq => "icmp sge",
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
                return self.generate_logical_op(binary.op, &x, &y);
            }
        };

        let reg = self.new_reg();
        writeln!(self.frame.body, "  {reg} = {instr} i32 {x}, {y}")?;
        if binary.op.is_comparison() {
            return self.zext(&reg);
        }
        Ok(reg)
    }

    /// Both operands are already evaluated; no short circuit.
    fn generate_logical_op(&mut self, op: BinaryOp, x: &str, y: &str) -> Result<String, CodegenError> {
        let bx = self.new_reg();
        writeln!(self.frame.body, "  {bx} = icmp ne i32 {x}, 0")?;
        let by = self.new_reg();
        writeln!(self.frame.body, "  {by} = icmp ne i32 {y}, 0")?;

        let instr = if op == BinaryOp::LogicalAnd { "and" } else { "or" };
        let reg = self.new_reg();
        writeln!(self.frame.body, "  {reg} = {instr} i1 {bx}, {by}")?;
        self.zext(&reg)
    }

    fn generate_unary_op(&mut self, unary: &UnaryExpr) -> Result<String, CodegenError> {
        let x = self.generate_expression(&unary.x)?;
        match unary.op {
            UnaryOp::Plus => Ok(x),
            UnaryOp::Neg => {
                let reg = self.new_reg();
                writeln!(self.frame.body, "  {reg} = sub i32 0, {x}")?;
                Ok(reg)
            }
        }
    }

    fn generate_function_call(&mut self, call: &CallExpr) -> Result<String, CodegenError> {
        let callee = self.resolve_callee(call)?;

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            let value = self.generate_expression(arg)?;
            args.push(format!("i32 {value}"));
        }

        let reg = self.new_reg();
        writeln!(self.frame.body, "  {reg} = call i32 {callee}({})", args.join(", "))?;
        Ok(reg)
    }

    /// Mangled name of the called function, after checking its arity.
    fn resolve_callee(&self, call: &CallExpr) -> Result<String, CodegenError> {
        let name = &call.func.name;
        let obj = self.scopes.lookup(name).ok_or_else(|| {
            CodegenError::UndefinedFunction(name.clone(), self.position(call.func.pos()))
        })?;
        let Some(arity) = obj.kind.arity() else {
            return Err(CodegenError::NotAFunction(
                name.clone(),
                self.position(call.func.pos()),
            ));
        };
        if arity != call.args.len() {
            return Err(CodegenError::ArgumentCountMismatch(
                name.clone(),
                arity,
                call.args.len(),
                self.position(call.pos()),
            ));
        }
        Ok(obj.mangled_name.clone())
    }

    /// Evaluate `expr` as an `i1` branch condition.
    fn generate_condition(&mut self, expr: &Expr) -> Result<String, CodegenError> {
        let value = self.generate_expression(expr)?;
        let reg = self.new_reg();
        writeln!(self.frame.body, "  {reg} = icmp ne i32 {value}, 0")?;
        Ok(reg)
    }

    fn zext(&mut self, bit: &str) -> Result<String, CodegenError> {
        let reg = self.new_reg();
        writeln!(self.frame.body, "  {reg} = zext i1 {bit} to i32")?;
        Ok(reg)
    }

    fn store(&mut self, value: &str, slot: &str) -> Result<(), CodegenError> {
        writeln!(self.frame.body, "  store i32 {value}, ptr {slot}, align 4")?;
        Ok(())
    }

    fn branch(&mut self, label: &str) -> Result<(), CodegenError> {
        writeln!(self.frame.body, "  br label %{label}")?;
        Ok(())
    }

    fn label(&mut self, label: &str) -> Result<(), CodegenError> {
        writeln!(self.frame.body, "{label}:")?;
        Ok(())
    }

    /// Hoist a stack slot for `name` declared at `pos` into the entry block.
    fn alloca(&mut self, name: &str, pos: Pos) -> Result<String, CodegenError> {
        let slot = local_symbol(&format!("local_{name}.pos.{}", pos.offset()));
        writeln!(self.frame.entry, "  {slot} = alloca i32, align 4")?;
        Ok(slot)
    }

    fn declare(&mut self, obj: Object) -> Result<(), CodegenError> {
        let pos = obj.pos.unwrap_or_default();
        if let Some(existing) = self.scopes.insert(obj) {
            return Err(CodegenError::Redeclared(
                existing.name.clone(),
                self.position(pos),
            ));
        }
        Ok(())
    }

    fn new_reg(&mut self) -> String {
        let reg = format!("%t{}", self.next_reg);
        self.next_reg += 1;
        reg
    }

    /// Label suffix naming the source line, made unique by the label counter.
    fn new_label_id(&mut self, pos: Pos) -> String {
        let line = self.position(pos).line;
        let id = format!("line{line}.{}", self.next_label);
        self.next_label += 1;
        id
    }

    fn global_symbol(&self, name: &str) -> String {
        symbol('@', &format!("ugo_{}_{name}", self.package))
    }

    fn func_symbol(&self, func: &Func) -> String {
        match func.recv.as_ref().and_then(|recv| recv.ty.as_ref()) {
            Some(recv_ty) => symbol(
                '@',
                &format!("ugo_{}_{}_{}", self.package, recv_ty.name, func.name.name),
            ),
            None if is_user_init(func) => {
                symbol('@', &format!("ugo_{}_init.{}", self.package, func.pos().offset()))
            }
            None => self.global_symbol(&func.name.name),
        }
    }

    fn position(&self, pos: Pos) -> Position {
        pos.position(&self.filename, &self.source)
    }
}

fn is_user_init(func: &Func) -> bool {
    func.recv.is_none() && func.name.name == "init" && func.body.is_some()
}

fn local_symbol(name: &str) -> String {
    symbol('%', name)
}

/// An IR identifier, quoted when `name` has characters outside the bare set.
fn symbol(sigil: char, name: &str) -> String {
    let bare = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '-'));
    if bare {
        format!("{sigil}{name}")
    } else {
        format!("{sigil}\"{name}\"")
    }
}
