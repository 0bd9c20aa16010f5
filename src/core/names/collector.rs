use std::collections::HashSet;

use rustpython_parser::ast::{Alias, Expr, Stmt};

use super::node::{NameContext, NodeKind, NodeVisitor, walk_suite};

/// Flat binding and use sets for one module.
///
/// There is no scope model: a name bound anywhere in the file (inside a
/// function, a branch, a class body) counts as bound everywhere in it.
#[derive(Debug, Default)]
pub struct NameCollector {
    bindings: HashSet<String>,
    uses: HashSet<String>,
}

impl NameCollector {
    pub fn collect(suite: &[Stmt]) -> Self {
        let mut collector = Self::default();
        walk_suite(suite, &mut collector);
        collector
    }

    pub fn bindings(&self) -> &HashSet<String> {
        &self.bindings
    }

    pub fn uses(&self) -> &HashSet<String> {
        &self.uses
    }

    /// Names read but never bound in the module.
    pub fn unbound_uses(&self) -> impl Iterator<Item = &str> {
        self.uses
            .difference(&self.bindings)
            .map(String::as_str)
    }

    fn bind(&mut self, name: &str) {
        self.bindings.insert(name.to_string());
    }

    /// Bind the imported name, and the `as` name too when present.
    fn bind_import(&mut self, alias: &Alias, imported: &str) {
        self.bind(imported);
        if let Some(asname) = &alias.asname {
            self.bind(asname.as_str());
        }
    }
}

impl NodeVisitor for NameCollector {
    fn visit_node(&mut self, node: NodeKind<'_>) {
        match node {
            NodeKind::Definition { name } => self.bind(name),
            NodeKind::Assignment { targets } => {
                // Only plain `name = ...` targets bind; tuples, attributes and
                // subscripts do not.
                for target in targets {
                    if let Expr::Name(name) = target {
                        self.bind(name.id.as_str());
                    }
                }
            }
            NodeKind::Import { names } => {
                for alias in names {
                    // `import a.b.c` binds `a`.
                    let module = alias.name.as_str();
                    self.bind_import(alias, module.split('.').next().unwrap_or(module));
                }
            }
            NodeKind::ImportFrom { names } => {
                for alias in names.iter().filter(|alias| alias.name.as_str() != "*") {
                    self.bind_import(alias, alias.name.as_str());
                }
            }
            NodeKind::NameReference {
                id,
                ctx: NameContext::Load,
            } => {
                self.uses.insert(id.to_string());
            }
            NodeKind::NameReference { .. } | NodeKind::Other => {}
        }
    }
}
