#![allow(dead_code)]

use jpatch_class::{ClassModel, MethodNode};
use jpatch_ir::{Insn, MethodBody};
use jpatch_isa::op;

pub const COMPONENT: &str = "com/example/Widget";

pub fn call(name: &str) -> Insn {
    Insn::method(op::INVOKEVIRTUAL, COMPONENT, name, "()V")
}

/// `[aload 0, invokevirtual foo()V, return]`
pub fn foo_body() -> MethodBody {
    MethodBody::from_insns([Insn::var(op::ALOAD, 0), call("foo"), Insn::plain(op::RETURN)])
}

/// A widget with `run(Z)V` and `tick()V`, both bodies `foo_body()`.
pub fn widget() -> ClassModel {
    ClassModel::new(COMPONENT)
        .with_method(MethodNode::new("run", "(Z)V", foo_body()))
        .with_method(MethodNode::new("tick", "()V", foo_body()))
}

pub fn body_of<'a>(class: &'a ClassModel, name: &str, descriptor: &str) -> &'a MethodBody {
    &class
        .find_method(name, descriptor)
        .unwrap_or_else(|| panic!("no method {name}{descriptor}"))
        .body
}
