//! Lexically nested symbol table.
//!
//! A [`Scope`] is a tree with a parent link and two namespaces: references
//! (`name -> (node index, port)`) and functions (`name -> params/body`,
//! plus the scope that was active when the function was defined). Name
//! lookup walks upward; binding always inserts into the current frame.
//!
//! Every scope in a compilation shares one node-index counter, rooted at
//! the outermost scope, so indices stay dense and unique regardless of how
//! deeply function calls nest.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Stmt;

/// A `(node index, output port)` pair bound to a name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reference {
	pub node: usize,
	pub port: u32,
}

/// A function value: its parameters, its body, and the scope that was
/// active when it was defined (its lexical capture scope). A call's child
/// frame is parented off this capture scope, not off the caller's scope.
pub struct FuncValue {
	pub params: Vec<String>,
	pub body: Vec<Stmt>,
	pub capture: Rc<Scope>,
}

pub struct Scope {
	parent: Option<Rc<Scope>>,
	refs: RefCell<HashMap<String, Reference>>,
	funcs: RefCell<HashMap<String, Rc<FuncValue>>>,
	counter: Rc<Cell<usize>>,
}

impl Scope {
	/// Creates a fresh root scope with its own node-index counter.
	pub fn root() -> Rc<Scope> {
		Rc::new(Scope {
			parent: None,
			refs: RefCell::new(HashMap::new()),
			funcs: RefCell::new(HashMap::new()),
			counter: Rc::new(Cell::new(0)),
		})
	}

	/// Creates a child scope parented off `parent`, sharing its node
	/// counter. Used both for plain nested scopes and for call frames,
	/// whose `parent` is the callee's capture scope.
	pub fn child(parent: &Rc<Scope>) -> Rc<Scope> {
		Rc::new(Scope {
			parent: Some(Rc::clone(parent)),
			refs: RefCell::new(HashMap::new()),
			funcs: RefCell::new(HashMap::new()),
			counter: Rc::clone(&parent.counter),
		})
	}

	/// Allocates the next node index from the shared root counter.
	pub fn create_node(&self) -> usize {
		let n = self.counter.get();
		self.counter.set(n + 1);
		n
	}

	pub fn bind_ref(&self, name: impl Into<String>, reference: Reference) {
		self.refs.borrow_mut().insert(name.into(), reference);
	}

	pub fn lookup_ref(&self, name: &str) -> Option<Reference> {
		if let Some(r) = self.refs.borrow().get(name) {
			return Some(*r);
		}
		self.parent.as_ref().and_then(|p| p.lookup_ref(name))
	}

	/// Binds a function with `self` as its capture scope.
	pub fn bind_func(self: &Rc<Self>, name: impl Into<String>, params: Vec<String>, body: Vec<Stmt>) {
		let value = Rc::new(FuncValue { params, body, capture: Rc::clone(self) });
		self.funcs.borrow_mut().insert(name.into(), value);
	}

	pub fn lookup_func(&self, name: &str) -> Option<Rc<FuncValue>> {
		if let Some(f) = self.funcs.borrow().get(name) {
			return Some(Rc::clone(f));
		}
		self.parent.as_ref().and_then(|p| p.lookup_func(name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_counter_is_shared_and_monotonic_across_child_scopes() {
		let root = Scope::root();
		let child = Scope::child(&root);
		assert_eq!(root.create_node(), 0);
		assert_eq!(child.create_node(), 1);
		assert_eq!(root.create_node(), 2);
	}

	#[test]
	fn a_child_scope_shadows_without_affecting_the_parent() {
		let root = Scope::root();
		root.bind_ref("x", Reference { node: 0, port: 0 });
		let child = Scope::child(&root);
		child.bind_ref("x", Reference { node: 1, port: 0 });

		assert_eq!(child.lookup_ref("x"), Some(Reference { node: 1, port: 0 }));
		assert_eq!(root.lookup_ref("x"), Some(Reference { node: 0, port: 0 }));
	}

	#[test]
	fn lookup_walks_up_through_unshadowed_parents() {
		let root = Scope::root();
		root.bind_ref("x", Reference { node: 0, port: 0 });
		let child = Scope::child(&root);
		let grandchild = Scope::child(&child);
		assert_eq!(grandchild.lookup_ref("x"), Some(Reference { node: 0, port: 0 }));
	}

	#[test]
	fn a_function_captures_its_defining_scope_not_the_caller() {
		let root = Scope::root();
		root.bind_ref("shared", Reference { node: 7, port: 0 });
		root.bind_func("f", vec![], vec![]);
		let func = root.lookup_func("f").unwrap();

		// A caller scope that shadows `shared` must not be visible from
		// inside a call: the call frame is parented off the function's
		// capture scope, not off the caller.
		let caller = Scope::child(&root);
		caller.bind_ref("shared", Reference { node: 99, port: 0 });

		let call_frame = Scope::child(&func.capture);
		assert_eq!(call_frame.lookup_ref("shared"), Some(Reference { node: 7, port: 0 }));
	}
}
