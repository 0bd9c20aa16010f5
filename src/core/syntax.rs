//! Syntax validation: the first error the Python front end would raise when
//! compiling a file.
//!
//! Validation runs in stages and stops at the first failure:
//!
//! 1. **Decoding**: UTF-8 unless a coding declaration says otherwise (a leading
//!    BOM is accepted), and free of NUL bytes.
//! 2. **Parsing**: rustpython-parser builds the module AST.
//! 3. **Targets**: assignment and deletion targets the grammar accepts but the
//!    interpreter's parser rejects (`1 = x`, `del f()`, ...).
//! 4. **Compile checks**: statements and expressions in a context that does not
//!    allow them (`return` outside a function, `yield` at module level, ...).

use std::{borrow::Cow, fs, io, path::Path};

use rustpython_parser::ast::{self, Constant, Expr, Ranged, Stmt};
use tracing::debug;

use super::parsers::{
    encoding::{UTF8_BOM, decode_python_source},
    python::{SourcePosition, parse_python_source, position_at, source_line},
};
use crate::issues::{Diagnostic, ReadErrorIssue, SyntaxErrorIssue};

/// Check a file on disk, returning its decoded source when it compiles.
pub fn check_syntax(path: &Path) -> Result<String, Diagnostic> {
    let file_path = path.to_string_lossy();
    match fs::read(path) {
        Ok(bytes) => validate_source(&file_path, &bytes).map(Cow::into_owned),
        Err(e) => Err(read_error(&file_path, &e)),
    }
}

/// Diagnostic for a file that could not be read for compilation.
pub fn read_error(file_path: &str, error: &io::Error) -> Diagnostic {
    debug!("Cannot read {} for syntax check: {}", file_path, error);
    ReadErrorIssue {
        file_path: file_path.to_string(),
        error: error.to_string(),
    }
    .into()
}

/// Validate raw file content, returning the decoded source when it compiles.
pub fn validate_source<'a>(file_path: &str, bytes: &'a [u8]) -> Result<Cow<'a, str>, Diagnostic> {
    let source = decode_source(file_path, bytes)?;
    match check_source(file_path, &source) {
        Some(diagnostic) => Err(diagnostic),
        None => Ok(source),
    }
}

/// Check decoded source text.
pub fn check_source(file_path: &str, source: &str) -> Option<Diagnostic> {
    if let Some(offset) = source.find('\0') {
        return Some(syntax_error(
            file_path,
            source,
            position_at(source, offset),
            "source code cannot contain null bytes".to_string(),
        ));
    }

    let suite = match parse_python_source(source, file_path) {
        Ok(suite) => suite,
        Err(err) => {
            debug!("{}: parse error at line {}", file_path, err.position.line);
            return Some(syntax_error(file_path, source, err.position, err.message));
        }
    };

    let (offset, message) = invalid_target_in_block(&suite)
        .or_else(|| check_block(&suite, BlockContext::module()))?;
    debug!("{}: compile error: {}", file_path, message);
    Some(syntax_error(
        file_path,
        source,
        position_at(source, offset),
        message,
    ))
}

/// Decode raw file content into source text.
///
/// Content the declared (or default UTF-8) codec rejects is itself a syntax
/// error, reported where decoding failed.
pub fn decode_source<'a>(file_path: &str, bytes: &'a [u8]) -> Result<Cow<'a, str>, Diagnostic> {
    decode_python_source(bytes).map_err(|err| {
        let text = String::from_utf8_lossy(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes));
        syntax_error(file_path, &text, err.position, err.message)
    })
}

fn syntax_error(
    file_path: &str,
    source: &str,
    position: SourcePosition,
    message: String,
) -> Diagnostic {
    SyntaxErrorIssue {
        file_path: file_path.to_string(),
        line: position.line,
        col: position.col,
        message,
        source_line: source_line(source, position.line),
    }
    .into()
}

/// Byte offset of the first offending node and the error message.
type Violation = (usize, String);

fn offset_of(node: &impl Ranged) -> usize {
    node.start().into()
}

// ============================================================
// Targets
// ============================================================

fn invalid_target_in_block(stmts: &[Stmt]) -> Option<Violation> {
    stmts.iter().find_map(|stmt| {
        invalid_target(stmt).or_else(|| {
            nested_blocks(stmt)
                .into_iter()
                .find_map(invalid_target_in_block)
        })
    })
}

fn invalid_target(stmt: &Stmt) -> Option<Violation> {
    match stmt {
        Stmt::Assign(assign) => {
            let violation = assign
                .targets
                .iter()
                .find_map(|target| invalid_store(target, "assign to"))?;
            if let [target] = assign.targets.as_slice()
                && suggests_comparison(target, &assign.value)
            {
                let (offset, message) = violation;
                return Some((
                    offset,
                    format!("{} here. Maybe you meant '==' instead of '='?", message),
                ));
            }
            Some(violation)
        }
        Stmt::For(ast::StmtFor { target, .. }) | Stmt::AsyncFor(ast::StmtAsyncFor { target, .. }) => {
            invalid_store(target, "assign to")
        }
        Stmt::With(ast::StmtWith { items, .. }) | Stmt::AsyncWith(ast::StmtAsyncWith { items, .. }) => {
            items
                .iter()
                .filter_map(|item| item.optional_vars.as_deref())
                .find_map(|vars| invalid_store(vars, "assign to"))
        }
        Stmt::Delete(del) => del
            .targets
            .iter()
            .find_map(|target| invalid_store(target, "delete")),
        Stmt::AugAssign(aug) => match aug.target.as_ref() {
            Expr::Name(_) | Expr::Attribute(_) | Expr::Subscript(_) => None,
            target => Some((
                offset_of(target),
                format!(
                    "'{}' is an illegal expression for augmented assignment",
                    expr_kind(target)
                ),
            )),
        },
        Stmt::AnnAssign(ann) => match ann.target.as_ref() {
            Expr::Name(_) | Expr::Attribute(_) | Expr::Subscript(_) => None,
            target @ (Expr::Tuple(_) | Expr::List(_)) => Some((
                offset_of(target),
                format!(
                    "only single target (not {}) can be annotated",
                    expr_kind(target)
                ),
            )),
            target => Some((
                offset_of(target),
                "illegal target for annotation".to_string(),
            )),
        },
        _ => None,
    }
}

/// First sub-target that cannot be assigned to (or deleted).
fn invalid_store(target: &Expr, action: &str) -> Option<Violation> {
    match target {
        Expr::Name(_) | Expr::Attribute(_) | Expr::Subscript(_) => None,
        Expr::Tuple(ast::ExprTuple { elts, .. }) | Expr::List(ast::ExprList { elts, .. }) => {
            elts.iter().find_map(|elt| invalid_store(elt, action))
        }
        Expr::Starred(starred) if action != "delete" => invalid_store(&starred.value, action),
        _ => Some((
            offset_of(target),
            format!("cannot {} {}", action, expr_kind(target)),
        )),
    }
}

/// `x + 1 = y` reads like a mistyped comparison.
fn suggests_comparison(target: &Expr, value: &Expr) -> bool {
    let comparable = |expr: &Expr| {
        !matches!(
            expr,
            Expr::BoolOp(_)
                | Expr::Compare(_)
                | Expr::IfExp(_)
                | Expr::Lambda(_)
                | Expr::NamedExpr(_)
                | Expr::Yield(_)
                | Expr::YieldFrom(_)
                | Expr::Starred(_)
                | Expr::Tuple(_)
                | Expr::List(_)
                | Expr::GeneratorExp(_)
                | Expr::UnaryOp(ast::ExprUnaryOp {
                    op: ast::UnaryOp::Not,
                    ..
                })
        )
    };
    let keyword = matches!(
        target,
        Expr::Constant(ast::ExprConstant {
            value: Constant::None | Constant::Bool(_),
            ..
        })
    );

    !keyword && comparable(target) && comparable(value)
}

/// How the interpreter names an expression in its error messages.
fn expr_kind(expr: &Expr) -> &'static str {
    match expr {
        Expr::Attribute(_) => "attribute",
        Expr::Subscript(_) => "subscript",
        Expr::Starred(_) => "starred",
        Expr::Name(_) => "name",
        Expr::List(_) => "list",
        Expr::Tuple(_) => "tuple",
        Expr::Lambda(_) => "lambda",
        Expr::Call(_) => "function call",
        Expr::BoolOp(_) | Expr::BinOp(_) | Expr::UnaryOp(_) => "expression",
        Expr::GeneratorExp(_) => "generator expression",
        Expr::Yield(_) | Expr::YieldFrom(_) => "yield expression",
        Expr::Await(_) => "await expression",
        Expr::ListComp(_) => "list comprehension",
        Expr::SetComp(_) => "set comprehension",
        Expr::DictComp(_) => "dict comprehension",
        Expr::Dict(_) => "dict literal",
        Expr::Set(_) => "set display",
        Expr::JoinedStr(_) | Expr::FormattedValue(_) => "f-string expression",
        Expr::Constant(constant) => match constant.value {
            Constant::None => "None",
            Constant::Bool(true) => "True",
            Constant::Bool(false) => "False",
            Constant::Ellipsis => "ellipsis",
            _ => "literal",
        },
        Expr::Compare(_) => "comparison",
        Expr::IfExp(_) => "conditional expression",
        Expr::NamedExpr(_) => "named expression",
        Expr::Slice(_) => "slice",
    }
}

/// Statement lists nested directly in a statement, in source order.
fn nested_blocks(stmt: &Stmt) -> Vec<&[Stmt]> {
    match stmt {
        Stmt::FunctionDef(ast::StmtFunctionDef { body, .. })
        | Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef { body, .. })
        | Stmt::ClassDef(ast::StmtClassDef { body, .. })
        | Stmt::With(ast::StmtWith { body, .. })
        | Stmt::AsyncWith(ast::StmtAsyncWith { body, .. }) => vec![body.as_slice()],
        Stmt::For(ast::StmtFor { body, orelse, .. })
        | Stmt::AsyncFor(ast::StmtAsyncFor { body, orelse, .. })
        | Stmt::While(ast::StmtWhile { body, orelse, .. })
        | Stmt::If(ast::StmtIf { body, orelse, .. }) => vec![body.as_slice(), orelse.as_slice()],
        Stmt::Match(m) => m.cases.iter().map(|case| case.body.as_slice()).collect(),
        Stmt::Try(ast::StmtTry {
            body,
            handlers,
            orelse,
            finalbody,
            ..
        })
        | Stmt::TryStar(ast::StmtTryStar {
            body,
            handlers,
            orelse,
            finalbody,
            ..
        }) => {
            let mut blocks = vec![body.as_slice()];
            blocks.extend(handlers.iter().map(|handler| {
                let ast::ExceptHandler::ExceptHandler(handler) = handler;
                handler.body.as_slice()
            }));
            blocks.push(orelse.as_slice());
            blocks.push(finalbody.as_slice());
            blocks
        }
        _ => Vec::new(),
    }
}

// ============================================================
// Compile checks
// ============================================================

/// Where a block of statements sits.
#[derive(Debug, Clone, Copy)]
struct BlockContext {
    in_function: bool,
    in_async_function: bool,
    in_loop: bool,
    at_module_level: bool,
}

impl BlockContext {
    fn module() -> Self {
        Self {
            in_function: false,
            in_async_function: false,
            in_loop: false,
            at_module_level: true,
        }
    }

    fn function(is_async: bool) -> Self {
        Self {
            in_function: true,
            in_async_function: is_async,
            in_loop: false,
            at_module_level: false,
        }
    }

    fn class() -> Self {
        Self {
            in_function: false,
            in_async_function: false,
            in_loop: false,
            at_module_level: false,
        }
    }

    fn looping(self) -> Self {
        Self {
            in_loop: true,
            ..self
        }
    }

    fn expressions(self) -> EvalContext {
        EvalContext {
            in_function: self.in_function,
            in_async_function: self.in_async_function,
            comprehension: None,
        }
    }
}

/// Where an expression is evaluated.
#[derive(Debug, Clone, Copy)]
struct EvalContext {
    in_function: bool,
    in_async_function: bool,
    /// Kind of the innermost enclosing comprehension.
    comprehension: Option<&'static str>,
}

impl EvalContext {
    fn lambda() -> Self {
        Self {
            in_function: true,
            in_async_function: false,
            comprehension: None,
        }
    }

    fn comprehension(self, kind: &'static str) -> Self {
        Self {
            comprehension: Some(kind),
            ..self
        }
    }

    fn yield_error(self) -> Option<String> {
        match self.comprehension {
            Some(kind) => Some(format!("'yield' inside {}", kind)),
            None if !self.in_function => Some("'yield' outside function".to_string()),
            None => None,
        }
    }

    fn await_error(self) -> Option<String> {
        if !self.in_function {
            Some("'await' outside function".to_string())
        } else if !self.in_async_function {
            Some("'await' outside async function".to_string())
        } else {
            None
        }
    }
}

fn check_block(stmts: &[Stmt], ctx: BlockContext) -> Option<Violation> {
    stmts.iter().find_map(|stmt| check_stmt(stmt, ctx))
}

fn check_stmt(stmt: &Stmt, ctx: BlockContext) -> Option<Violation> {
    check_placement(stmt, ctx)
        .or_else(|| {
            own_exprs(stmt)
                .into_iter()
                .find_map(|expr| check_expr(expr, ctx.expressions()))
        })
        .or_else(|| check_nested(stmt, ctx))
}

/// Statements that are only valid inside a function or loop.
fn check_placement(stmt: &Stmt, ctx: BlockContext) -> Option<Violation> {
    let message = match stmt {
        Stmt::Return(_) if !ctx.in_function => "'return' outside function",
        Stmt::Break(_) if !ctx.in_loop => "'break' outside loop",
        Stmt::Continue(_) if !ctx.in_loop => "'continue' not properly in loop",
        Stmt::Nonlocal(_) if ctx.at_module_level => {
            "nonlocal declaration not allowed at module level"
        }
        _ => return None,
    };
    Some((offset_of(stmt), message.to_string()))
}

fn check_nested(stmt: &Stmt, ctx: BlockContext) -> Option<Violation> {
    match stmt {
        Stmt::FunctionDef(def) => check_block(&def.body, BlockContext::function(false)),
        Stmt::AsyncFunctionDef(def) => check_block(&def.body, BlockContext::function(true)),
        Stmt::ClassDef(def) => check_block(&def.body, BlockContext::class()),
        Stmt::For(ast::StmtFor { body, orelse, .. })
        | Stmt::AsyncFor(ast::StmtAsyncFor { body, orelse, .. })
        | Stmt::While(ast::StmtWhile { body, orelse, .. }) => {
            // `else` clauses of loops belong to the enclosing context.
            check_block(body, ctx.looping()).or_else(|| check_block(orelse, ctx))
        }
        _ => nested_blocks(stmt)
            .into_iter()
            .find_map(|block| check_block(block, ctx)),
    }
}

/// Expressions a statement evaluates in its own context, in source order.
fn own_exprs(stmt: &Stmt) -> Vec<&Expr> {
    let mut exprs: Vec<&Expr> = Vec::new();
    match stmt {
        Stmt::FunctionDef(ast::StmtFunctionDef {
            args,
            decorator_list,
            returns,
            ..
        })
        | Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef {
            args,
            decorator_list,
            returns,
            ..
        }) => {
            exprs.extend(decorator_list);
            exprs.extend(argument_exprs(args));
            exprs.extend(returns.as_deref());
        }
        Stmt::ClassDef(def) => {
            exprs.extend(&def.decorator_list);
            exprs.extend(&def.bases);
            exprs.extend(def.keywords.iter().map(|keyword| &keyword.value));
        }
        Stmt::Return(ret) => exprs.extend(ret.value.as_deref()),
        Stmt::Delete(del) => exprs.extend(&del.targets),
        Stmt::Assign(assign) => {
            exprs.extend(&assign.targets);
            exprs.push(&assign.value);
        }
        Stmt::AugAssign(aug) => {
            exprs.push(&aug.target);
            exprs.push(&aug.value);
        }
        Stmt::AnnAssign(ann) => {
            exprs.push(&ann.target);
            exprs.push(&ann.annotation);
            exprs.extend(ann.value.as_deref());
        }
        Stmt::For(ast::StmtFor { target, iter, .. })
        | Stmt::AsyncFor(ast::StmtAsyncFor { target, iter, .. }) => {
            exprs.push(target);
            exprs.push(iter);
        }
        Stmt::While(ast::StmtWhile { test, .. }) | Stmt::If(ast::StmtIf { test, .. }) => {
            exprs.push(test)
        }
        Stmt::With(ast::StmtWith { items, .. }) | Stmt::AsyncWith(ast::StmtAsyncWith { items, .. }) => {
            for item in items {
                exprs.push(&item.context_expr);
                exprs.extend(item.optional_vars.as_deref());
            }
        }
        Stmt::Match(m) => {
            exprs.push(&m.subject);
            exprs.extend(m.cases.iter().filter_map(|case| case.guard.as_deref()));
        }
        Stmt::Raise(raise) => {
            exprs.extend(raise.exc.as_deref());
            exprs.extend(raise.cause.as_deref());
        }
        Stmt::Try(ast::StmtTry { handlers, .. }) | Stmt::TryStar(ast::StmtTryStar { handlers, .. }) => {
            exprs.extend(handlers.iter().filter_map(|handler| {
                let ast::ExceptHandler::ExceptHandler(handler) = handler;
                handler.type_.as_deref()
            }));
        }
        Stmt::Assert(assert) => {
            exprs.push(&assert.test);
            exprs.extend(assert.msg.as_deref());
        }
        Stmt::Expr(expr) => exprs.push(&expr.value),
        _ => {}
    }
    exprs
}

/// Defaults and annotations: evaluated where the function is defined.
fn argument_exprs(args: &ast::Arguments) -> Vec<&Expr> {
    let with_defaults = args
        .posonlyargs
        .iter()
        .chain(&args.args)
        .chain(&args.kwonlyargs);

    let mut exprs: Vec<&Expr> = Vec::new();
    for arg in with_defaults {
        exprs.extend(arg.def.annotation.as_deref());
        exprs.extend(arg.default.as_deref());
    }
    for arg in args.vararg.iter().chain(&args.kwarg) {
        exprs.extend(arg.annotation.as_deref());
    }
    exprs
}

fn check_expr(expr: &Expr, ctx: EvalContext) -> Option<Violation> {
    match expr {
        Expr::Yield(_) | Expr::YieldFrom(_) => {
            if let Some(message) = ctx.yield_error() {
                return Some((offset_of(expr), message));
            }
        }
        Expr::Await(_) => {
            if let Some(message) = ctx.await_error() {
                return Some((offset_of(expr), message));
            }
        }
        Expr::Lambda(lambda) => {
            return lambda
                .args
                .posonlyargs
                .iter()
                .chain(&lambda.args.args)
                .chain(&lambda.args.kwonlyargs)
                .filter_map(|arg| arg.default.as_deref())
                .find_map(|default| check_expr(default, ctx))
                .or_else(|| check_expr(&lambda.body, EvalContext::lambda()));
        }
        Expr::ListComp(comp) => {
            return check_comprehension(&[&*comp.elt], &comp.generators, ctx, "list comprehension");
        }
        Expr::SetComp(comp) => {
            return check_comprehension(&[&*comp.elt], &comp.generators, ctx, "set comprehension");
        }
        Expr::GeneratorExp(comp) => {
            return check_comprehension(
                &[&*comp.elt],
                &comp.generators,
                ctx,
                "generator expression",
            );
        }
        Expr::DictComp(comp) => {
            return check_comprehension(
                &[&*comp.key, &*comp.value],
                &comp.generators,
                ctx,
                "dict comprehension",
            );
        }
        _ => {}
    }

    sub_exprs(expr)
        .into_iter()
        .find_map(|child| check_expr(child, ctx))
}

/// The first iterable is evaluated outside the comprehension, everything else
/// inside it.
fn check_comprehension(
    parts: &[&Expr],
    generators: &[ast::Comprehension],
    ctx: EvalContext,
    kind: &'static str,
) -> Option<Violation> {
    let inner = ctx.comprehension(kind);

    parts
        .iter()
        .find_map(|part| check_expr(part, inner))
        .or_else(|| {
            generators.iter().enumerate().find_map(|(i, generator)| {
                let iter_ctx = if i == 0 { ctx } else { inner };
                check_expr(&generator.target, inner)
                    .or_else(|| check_expr(&generator.iter, iter_ctx))
                    .or_else(|| {
                        generator
                            .ifs
                            .iter()
                            .find_map(|condition| check_expr(condition, inner))
                    })
            })
        })
}

/// Direct children of an expression without a scope of their own.
fn sub_exprs(expr: &Expr) -> Vec<&Expr> {
    let mut children: Vec<&Expr> = Vec::new();
    match expr {
        Expr::BoolOp(op) => children.extend(&op.values),
        Expr::NamedExpr(named) => {
            children.push(&named.target);
            children.push(&named.value);
        }
        Expr::BinOp(op) => {
            children.push(&op.left);
            children.push(&op.right);
        }
        Expr::UnaryOp(op) => children.push(&op.operand),
        Expr::IfExp(ifexp) => {
            children.push(&ifexp.body);
            children.push(&ifexp.test);
            children.push(&ifexp.orelse);
        }
        Expr::Dict(dict) => {
            for (key, value) in dict.keys.iter().zip(&dict.values) {
                children.extend(key);
                children.push(value);
            }
        }
        Expr::Set(ast::ExprSet { elts, .. })
        | Expr::List(ast::ExprList { elts, .. })
        | Expr::Tuple(ast::ExprTuple { elts, .. }) => children.extend(elts),
        Expr::Await(ast::ExprAwait { value, .. })
        | Expr::YieldFrom(ast::ExprYieldFrom { value, .. })
        | Expr::Attribute(ast::ExprAttribute { value, .. })
        | Expr::Starred(ast::ExprStarred { value, .. }) => children.push(value),
        Expr::Yield(y) => children.extend(y.value.as_deref()),
        Expr::Compare(cmp) => {
            children.push(&cmp.left);
            children.extend(&cmp.comparators);
        }
        Expr::Call(call) => {
            children.push(&call.func);
            children.extend(&call.args);
            children.extend(call.keywords.iter().map(|keyword| &keyword.value));
        }
        Expr::FormattedValue(fv) => {
            children.push(&fv.value);
            children.extend(fv.format_spec.as_deref());
        }
        Expr::JoinedStr(joined) => children.extend(&joined.values),
        Expr::Subscript(sub) => {
            children.push(&sub.value);
            children.push(&sub.slice);
        }
        Expr::Slice(slice) => {
            children.extend(slice.lower.as_deref());
            children.extend(slice.upper.as_deref());
            children.extend(slice.step.as_deref());
        }
        _ => {}
    }
    children
}
