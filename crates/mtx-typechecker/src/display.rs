//! Pretty-printing of type terms for diagnostics.

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

use mtx_hir::SubscriptMethod;

use crate::library::Library;
use crate::relate::unique_union_members;
use crate::store::TypeStore;
use crate::types::{ConstantValue, Term, TypeId, TypeIdentifier, Usage};

/// Maps a sequential index to `'a`, `'b`, ..., `'z`, `'a1`, `'b1`, ...
pub fn format_var_name(index: usize) -> String {
    let letter = (b'a' + (index % 26) as u8) as char;
    let suffix = index / 26;
    if suffix == 0 {
        format!("'{}", letter)
    } else {
        format!("'{}{}", letter, suffix)
    }
}

/// Renders terms with renumbered type variables and a visited set to stay
/// safe on cyclic type graphs.
pub struct TypeWriter<'a> {
    store: &'a TypeStore,
    library: &'a Library,
}

struct WriterState {
    var_names: FxHashMap<TypeIdentifier, usize>,
    counter: usize,
    visited: FxHashSet<TypeId>,
}

impl<'a> TypeWriter<'a> {
    pub fn new(store: &'a TypeStore, library: &'a Library) -> Self {
        Self { store, library }
    }

    pub fn write(&self, id: TypeId) -> String {
        let mut state = WriterState {
            var_names: FxHashMap::default(),
            counter: 0,
            visited: FxHashSet::default(),
        };
        let mut out = String::new();
        self.fmt(id, &mut state, &mut out);
        out
    }

    fn var_name(&self, identifier: TypeIdentifier, state: &mut WriterState) -> String {
        let index = *state.var_names.entry(identifier).or_insert_with(|| {
            let i = state.counter;
            state.counter += 1;
            i
        });
        format_var_name(index)
    }

    fn fmt_members(&self, members: &[TypeId], state: &mut WriterState, out: &mut String) {
        let rendered = members
            .iter()
            .map(|&member| {
                let mut text = String::new();
                self.fmt(member, state, &mut text);
                text
            })
            .join(", ");
        out.push_str(&rendered);
    }

    fn fmt(&self, id: TypeId, state: &mut WriterState, out: &mut String) {
        if !state.visited.insert(id) {
            out.push_str("...");
            return;
        }

        match self.store.get(id) {
            Term::Variable(identifier) => out.push_str(&self.var_name(*identifier, state)),
            Term::Parameters(identifier) => {
                let name = self.var_name(*identifier, state);
                out.push_str(&name);
                out.push_str("...");
            }
            Term::Scalar(identifier) => match self.library.scalar_name(*identifier) {
                Some(name) => out.push_str(&name.as_str()),
                None => out.push_str(&format!("s{}", identifier.0)),
            },
            Term::ConstantValue(value) => match value {
                ConstantValue::Int(v) => out.push_str(&v.to_string()),
                ConstantValue::Double(v) => out.push_str(&v.to_string()),
                ConstantValue::Char(v) => out.push_str(&v.as_str()),
            },
            Term::Tuple(members) => {
                out.push('{');
                self.fmt_members(members, state, out);
                out.push('}');
            }
            Term::DestructuredTuple(usage, members) => {
                if members.len() == 1 {
                    self.fmt(members[0], state, out);
                } else {
                    let (open, close) = match usage {
                        Usage::DefinitionOutputs | Usage::Lvalue => ('[', ']'),
                        Usage::DefinitionInputs | Usage::Rvalue => ('(', ')'),
                    };
                    out.push(open);
                    self.fmt_members(members, state, out);
                    out.push(close);
                }
            }
            Term::List(pattern) => {
                out.push_str("list<");
                self.fmt_members(pattern, state, out);
                out.push('>');
            }
            Term::Union(members) => {
                let unique = unique_union_members(self.store, members);
                for (i, member) in unique.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    self.fmt(*member, state, out);
                }
            }
            Term::Record(record) => {
                out.push('{');
                for (i, field) in record.fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.fmt(field.name, state, out);
                    out.push_str(": ");
                    self.fmt(field.ty, state, out);
                }
                out.push('}');
            }
            Term::Class(class) => {
                out.push_str(&class.name.as_str());
            }
            Term::Alias(source) => self.fmt(*source, state, out),
            Term::Abstraction(abstr) => {
                match self.store.get(abstr.inputs) {
                    Term::DestructuredTuple(_, members) => {
                        out.push('(');
                        self.fmt_members(members, state, out);
                        out.push(')');
                    }
                    _ => {
                        out.push('(');
                        self.fmt(abstr.inputs, state, out);
                        out.push(')');
                    }
                }
                out.push_str(" -> ");
                self.fmt(abstr.outputs, state, out);
            }
            Term::Application(app) => {
                self.fmt(app.abstraction, state, out);
                out.push('(');
                self.fmt(app.inputs, state, out);
                out.push_str(") -> ");
                self.fmt(app.outputs, state, out);
            }
            Term::Subscript(sub) => {
                self.fmt(sub.principal, state, out);
                for s in &sub.subscripts {
                    match s.method {
                        SubscriptMethod::Parens => {
                            out.push('(');
                            self.fmt_members(&s.arguments, state, out);
                            out.push(')');
                        }
                        SubscriptMethod::Brace => {
                            out.push('{');
                            self.fmt_members(&s.arguments, state, out);
                            out.push('}');
                        }
                        SubscriptMethod::Period => {
                            out.push('.');
                            self.fmt_members(&s.arguments, state, out);
                        }
                    }
                }
            }
            Term::Scheme(scheme) => {
                out.push_str("forall ");
                for (i, &param) in scheme.parameters.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    match self.store.get(param) {
                        Term::Variable(identifier) | Term::Parameters(identifier) => {
                            out.push_str(&self.var_name(*identifier, state));
                        }
                        _ => self.fmt(param, state, out),
                    }
                }
                if scheme.parameters.is_empty() {
                    out.push('.');
                } else {
                    out.push_str(". ");
                }
                self.fmt(scheme.ty, state, out);
            }
            Term::Assignment { lhs, rhs } => {
                self.fmt(*lhs, state, out);
                out.push_str(" = ");
                self.fmt(*rhs, state, out);
            }
        }

        state.visited.remove(&id);
    }
}
