//! Tagged node kinds and the single-pass walker over a module AST.
//!
//! The walker visits every statement and expression once, top-down, and hands
//! each one to a [`NodeVisitor`] already classified as a [`NodeKind`]. Visitors
//! only see the kinds; they never match on the AST themselves.

use rustpython_parser::ast::{self, Alias, Expr, ExprContext, Pattern, Stmt};

/// How a name reference is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameContext {
    Load,
    Store,
    Del,
}

impl From<&ExprContext> for NameContext {
    fn from(ctx: &ExprContext) -> Self {
        match ctx {
            ExprContext::Load => NameContext::Load,
            ExprContext::Store => NameContext::Store,
            ExprContext::Del => NameContext::Del,
        }
    }
}

/// A node as seen by the name analysis.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a> {
    /// `def`, `async def` or `class`.
    Definition { name: &'a str },
    /// `a = b = value`, targets in source order.
    Assignment { targets: &'a [Expr] },
    /// `import a.b as c`
    Import { names: &'a [Alias] },
    /// `from m import a as b`
    ImportFrom { names: &'a [Alias] },
    /// A bare identifier.
    NameReference { id: &'a str, ctx: NameContext },
    Other,
}

pub trait NodeVisitor {
    fn visit_node(&mut self, node: NodeKind<'_>);
}

pub fn classify_stmt(stmt: &Stmt) -> NodeKind<'_> {
    match stmt {
        Stmt::FunctionDef(def) => NodeKind::Definition {
            name: def.name.as_str(),
        },
        Stmt::AsyncFunctionDef(def) => NodeKind::Definition {
            name: def.name.as_str(),
        },
        Stmt::ClassDef(def) => NodeKind::Definition {
            name: def.name.as_str(),
        },
        Stmt::Assign(assign) => NodeKind::Assignment {
            targets: &assign.targets,
        },
        Stmt::Import(import) => NodeKind::Import {
            names: &import.names,
        },
        Stmt::ImportFrom(import) => NodeKind::ImportFrom {
            names: &import.names,
        },
        _ => NodeKind::Other,
    }
}

pub fn classify_expr(expr: &Expr) -> NodeKind<'_> {
    match expr {
        Expr::Name(name) => NodeKind::NameReference {
            id: name.id.as_str(),
            ctx: NameContext::from(&name.ctx),
        },
        _ => NodeKind::Other,
    }
}

/// Walk a module body, visiting every statement and expression in it.
pub fn walk_suite<V: NodeVisitor + ?Sized>(suite: &[Stmt], visitor: &mut V) {
    for stmt in suite {
        walk_stmt(stmt, visitor);
    }
}

fn walk_stmt<V: NodeVisitor + ?Sized>(stmt: &Stmt, visitor: &mut V) {
    visitor.visit_node(classify_stmt(stmt));

    match stmt {
        Stmt::FunctionDef(ast::StmtFunctionDef {
            args,
            body,
            decorator_list,
            returns,
            ..
        })
        | Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef {
            args,
            body,
            decorator_list,
            returns,
            ..
        }) => {
            walk_exprs(decorator_list, visitor);
            walk_arguments(args, visitor);
            if let Some(returns) = returns {
                walk_expr(returns, visitor);
            }
            walk_suite(body, visitor);
        }
        Stmt::ClassDef(def) => {
            walk_exprs(&def.decorator_list, visitor);
            walk_exprs(&def.bases, visitor);
            for keyword in &def.keywords {
                walk_expr(&keyword.value, visitor);
            }
            walk_suite(&def.body, visitor);
        }
        Stmt::Return(ret) => {
            if let Some(value) = &ret.value {
                walk_expr(value, visitor);
            }
        }
        Stmt::Delete(del) => walk_exprs(&del.targets, visitor),
        Stmt::Assign(assign) => {
            walk_exprs(&assign.targets, visitor);
            walk_expr(&assign.value, visitor);
        }
        Stmt::AugAssign(aug) => {
            walk_expr(&aug.target, visitor);
            walk_expr(&aug.value, visitor);
        }
        Stmt::AnnAssign(ann) => {
            walk_expr(&ann.target, visitor);
            walk_expr(&ann.annotation, visitor);
            if let Some(value) = &ann.value {
                walk_expr(value, visitor);
            }
        }
        Stmt::For(ast::StmtFor {
            target,
            iter,
            body,
            orelse,
            ..
        })
        | Stmt::AsyncFor(ast::StmtAsyncFor {
            target,
            iter,
            body,
            orelse,
            ..
        }) => {
            walk_expr(target, visitor);
            walk_expr(iter, visitor);
            walk_suite(body, visitor);
            walk_suite(orelse, visitor);
        }
        Stmt::While(ast::StmtWhile {
            test, body, orelse, ..
        })
        | Stmt::If(ast::StmtIf {
            test, body, orelse, ..
        }) => {
            walk_expr(test, visitor);
            walk_suite(body, visitor);
            walk_suite(orelse, visitor);
        }
        Stmt::With(ast::StmtWith { items, body, .. })
        | Stmt::AsyncWith(ast::StmtAsyncWith { items, body, .. }) => {
            for item in items {
                walk_expr(&item.context_expr, visitor);
                if let Some(vars) = &item.optional_vars {
                    walk_expr(vars, visitor);
                }
            }
            walk_suite(body, visitor);
        }
        Stmt::Match(m) => {
            walk_expr(&m.subject, visitor);
            for case in &m.cases {
                walk_pattern(&case.pattern, visitor);
                if let Some(guard) = &case.guard {
                    walk_expr(guard, visitor);
                }
                walk_suite(&case.body, visitor);
            }
        }
        Stmt::Raise(raise) => {
            if let Some(exc) = &raise.exc {
                walk_expr(exc, visitor);
            }
            if let Some(cause) = &raise.cause {
                walk_expr(cause, visitor);
            }
        }
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
            walk_suite(body, visitor);
            for handler in handlers {
                let ast::ExceptHandler::ExceptHandler(handler) = handler;
                if let Some(type_) = &handler.type_ {
                    walk_expr(type_, visitor);
                }
                walk_suite(&handler.body, visitor);
            }
            walk_suite(orelse, visitor);
            walk_suite(finalbody, visitor);
        }
        Stmt::Assert(assert) => {
            walk_expr(&assert.test, visitor);
            if let Some(msg) = &assert.msg {
                walk_expr(msg, visitor);
            }
        }
        Stmt::Expr(expr) => walk_expr(&expr.value, visitor),
        _ => {}
    }
}

fn walk_exprs<V: NodeVisitor + ?Sized>(exprs: &[Expr], visitor: &mut V) {
    for expr in exprs {
        walk_expr(expr, visitor);
    }
}

fn walk_expr<V: NodeVisitor + ?Sized>(expr: &Expr, visitor: &mut V) {
    visitor.visit_node(classify_expr(expr));

    match expr {
        Expr::BoolOp(op) => walk_exprs(&op.values, visitor),
        Expr::NamedExpr(named) => {
            walk_expr(&named.target, visitor);
            walk_expr(&named.value, visitor);
        }
        Expr::BinOp(op) => {
            walk_expr(&op.left, visitor);
            walk_expr(&op.right, visitor);
        }
        Expr::UnaryOp(op) => walk_expr(&op.operand, visitor),
        Expr::Lambda(lambda) => {
            walk_arguments(&lambda.args, visitor);
            walk_expr(&lambda.body, visitor);
        }
        Expr::IfExp(ifexp) => {
            walk_expr(&ifexp.test, visitor);
            walk_expr(&ifexp.body, visitor);
            walk_expr(&ifexp.orelse, visitor);
        }
        Expr::Dict(dict) => {
            for key in dict.keys.iter().flatten() {
                walk_expr(key, visitor);
            }
            walk_exprs(&dict.values, visitor);
        }
        Expr::Set(ast::ExprSet { elts, .. })
        | Expr::List(ast::ExprList { elts, .. })
        | Expr::Tuple(ast::ExprTuple { elts, .. }) => walk_exprs(elts, visitor),
        Expr::ListComp(ast::ExprListComp {
            elt, generators, ..
        })
        | Expr::SetComp(ast::ExprSetComp {
            elt, generators, ..
        })
        | Expr::GeneratorExp(ast::ExprGeneratorExp {
            elt, generators, ..
        }) => {
            walk_expr(elt, visitor);
            walk_comprehensions(generators, visitor);
        }
        Expr::DictComp(comp) => {
            walk_expr(&comp.key, visitor);
            walk_expr(&comp.value, visitor);
            walk_comprehensions(&comp.generators, visitor);
        }
        Expr::Await(ast::ExprAwait { value, .. })
        | Expr::YieldFrom(ast::ExprYieldFrom { value, .. })
        | Expr::Attribute(ast::ExprAttribute { value, .. })
        | Expr::Starred(ast::ExprStarred { value, .. }) => walk_expr(value, visitor),
        Expr::Yield(y) => {
            if let Some(value) = &y.value {
                walk_expr(value, visitor);
            }
        }
        Expr::Compare(cmp) => {
            walk_expr(&cmp.left, visitor);
            walk_exprs(&cmp.comparators, visitor);
        }
        Expr::Call(call) => {
            walk_expr(&call.func, visitor);
            walk_exprs(&call.args, visitor);
            for keyword in &call.keywords {
                walk_expr(&keyword.value, visitor);
            }
        }
        Expr::FormattedValue(fv) => {
            walk_expr(&fv.value, visitor);
            if let Some(spec) = &fv.format_spec {
                walk_expr(spec, visitor);
            }
        }
        Expr::JoinedStr(joined) => walk_exprs(&joined.values, visitor),
        Expr::Subscript(sub) => {
            walk_expr(&sub.value, visitor);
            walk_expr(&sub.slice, visitor);
        }
        Expr::Slice(slice) => {
            for part in [&slice.lower, &slice.upper, &slice.step]
                .into_iter()
                .flatten()
            {
                walk_expr(part, visitor);
            }
        }
        _ => {}
    }
}

/// Parameter annotations and defaults. Parameter names are not identifier
/// expressions and are never visited as name references.
fn walk_arguments<V: NodeVisitor + ?Sized>(arguments: &ast::Arguments, visitor: &mut V) {
    let with_defaults = arguments
        .posonlyargs
        .iter()
        .chain(&arguments.args)
        .chain(&arguments.kwonlyargs);

    for arg in with_defaults {
        walk_arg(&arg.def, visitor);
        if let Some(default) = &arg.default {
            walk_expr(default, visitor);
        }
    }

    for arg in arguments.vararg.iter().chain(&arguments.kwarg) {
        walk_arg(arg, visitor);
    }
}

fn walk_arg<V: NodeVisitor + ?Sized>(arg: &ast::Arg, visitor: &mut V) {
    if let Some(annotation) = &arg.annotation {
        walk_expr(annotation, visitor);
    }
}

fn walk_comprehensions<V: NodeVisitor + ?Sized>(
    generators: &[ast::Comprehension],
    visitor: &mut V,
) {
    for comprehension in generators {
        walk_expr(&comprehension.target, visitor);
        walk_expr(&comprehension.iter, visitor);
        walk_exprs(&comprehension.ifs, visitor);
    }
}

fn walk_pattern<V: NodeVisitor + ?Sized>(pattern: &Pattern, visitor: &mut V) {
    match pattern {
        Pattern::MatchValue(p) => walk_expr(&p.value, visitor),
        Pattern::MatchSequence(ast::PatternMatchSequence { patterns, .. })
        | Pattern::MatchOr(ast::PatternMatchOr { patterns, .. }) => {
            for p in patterns {
                walk_pattern(p, visitor);
            }
        }
        Pattern::MatchMapping(p) => {
            walk_exprs(&p.keys, visitor);
            for p in &p.patterns {
                walk_pattern(p, visitor);
            }
        }
        Pattern::MatchClass(p) => {
            walk_expr(&p.cls, visitor);
            for p in p.patterns.iter().chain(&p.kwd_patterns) {
                walk_pattern(p, visitor);
            }
        }
        Pattern::MatchAs(p) => {
            if let Some(p) = &p.pattern {
                walk_pattern(p, visitor);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::parsers::python::parse_python_source;

    /// Records name references as `(id, ctx)` and definitions by name.
    #[derive(Default)]
    struct Recorder {
        references: Vec<(String, NameContext)>,
        definitions: Vec<String>,
        assignments: usize,
        imports: usize,
        import_froms: usize,
    }

    impl NodeVisitor for Recorder {
        fn visit_node(&mut self, node: NodeKind<'_>) {
            match node {
                NodeKind::Definition { name } => self.definitions.push(name.to_string()),
                NodeKind::Assignment { .. } => self.assignments += 1,
                NodeKind::Import { .. } => self.imports += 1,
                NodeKind::ImportFrom { .. } => self.import_froms += 1,
                NodeKind::NameReference { id, ctx } => self.references.push((id.to_string(), ctx)),
                NodeKind::Other => {}
            }
        }
    }

    fn record(source: &str) -> Recorder {
        let suite = parse_python_source(source, "test.py").unwrap();
        let mut recorder = Recorder::default();
        walk_suite(&suite, &mut recorder);
        recorder
    }

    fn loads(recorder: &Recorder) -> Vec<&str> {
        recorder
            .references
            .iter()
            .filter(|(_, ctx)| *ctx == NameContext::Load)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    #[test]
    fn test_definitions() {
        let recorder = record("def f():\n    pass\nasync def g():\n    pass\nclass C:\n    pass\n");
        assert_eq!(recorder.definitions, vec!["f", "g", "C"]);
    }

    #[test]
    fn test_assignment_and_imports_are_classified() {
        let recorder = record("import os\nfrom sys import argv\nx = y = 1\n");
        assert_eq!(recorder.imports, 1);
        assert_eq!(recorder.import_froms, 1);
        assert_eq!(recorder.assignments, 1);
    }

    #[test]
    fn test_name_contexts() {
        let recorder = record("x = y\ndel z\n");
        assert_eq!(
            recorder.references,
            vec![
                ("x".to_string(), NameContext::Store),
                ("y".to_string(), NameContext::Load),
                ("z".to_string(), NameContext::Del),
            ]
        );
    }

    #[test]
    fn test_nested_loads_are_visited() {
        let source = r#"
@decorate
def f(a: Annotation = default, *args: Rest, **kwargs):
    for item in items:
        if check(item):
            yield {key: value for key, value in pairs if cond}
    with opener() as handle:
        return lambda q=fallback: q + offset
"#;
        let recorder = record(source);
        let loads = loads(&recorder);

        for name in [
            "decorate",
            "Annotation",
            "default",
            "Rest",
            "items",
            "check",
            "item",
            "key",
            "value",
            "pairs",
            "cond",
            "opener",
            "fallback",
            "q",
            "offset",
        ] {
            assert!(loads.contains(&name), "missing load of {}", name);
        }
        // Parameter names are not references.
        assert!(!loads.contains(&"a"));
        assert!(!loads.contains(&"kwargs"));
    }

    #[test]
    fn test_match_and_try_are_visited() {
        let source = r#"
match command:
    case Point(x=px) if px > limit:
        handle(px)
    case _:
        pass
try:
    risky()
except KnownError as err:
    log(err)
finally:
    cleanup()
"#;
        let recorder = record(source);
        let loads = loads(&recorder);

        for name in [
            "command", "Point", "px", "limit", "handle", "risky", "KnownError", "log", "err",
            "cleanup",
        ] {
            assert!(loads.contains(&name), "missing load of {}", name);
        }
    }

    #[test]
    fn test_attribute_base_is_a_load() {
        let recorder = record("os.path.join(a, b=c)\n");
        assert_eq!(loads(&recorder), vec!["os", "a", "c"]);
    }

    #[test]
    fn test_fstring_expressions_are_visited() {
        let recorder = record("print(f\"{name!r:>{width}}\")\n");
        let loads = loads(&recorder);
        assert!(loads.contains(&"name"));
        assert!(loads.contains(&"width"));
    }
}
