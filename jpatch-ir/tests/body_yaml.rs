//! Method bodies written as YAML instruction lists.

use jpatch_ir::{Constant, Insn, LabelId, MemberHandle, MethodBody, find_sequence};
use jpatch_isa::op;

const LOOP: &str = r#"
- kind: int_immediate
  opcode: bipush
  operand: 10
- kind: local_var
  opcode: istore
  slot: 1
- kind: label
  id: 0
- kind: increment
  slot: 1
  amount: -1
- kind: local_var
  opcode: iload
  slot: 1
- kind: jump
  opcode: ifne
  target: 0
- kind: const_load
  opcode: ldc
  value:
    type: string
    value: done
- kind: method_ref
  opcode: invokestatic
  owner: a/Log
  name: print
  descriptor: (Ljava/lang/String;)V
- kind: plain
  opcode: return
"#;

#[test]
fn parses_tagged_instructions() {
    let body: MethodBody = serde_yaml::from_str(LOOP).unwrap();
    assert_eq!(body.len(), 9);
    let v = body.to_vec();
    assert_eq!(v[0], Insn::int(op::BIPUSH, 10));
    assert_eq!(v[2], Insn::label(LabelId(0)));
    assert_eq!(v[3], Insn::iinc(1, -1));
    assert_eq!(v[5], Insn::jump(op::IFNE, LabelId(0)));
    assert_eq!(v[6], Insn::ldc("done"));
    assert_eq!(
        v[7],
        Insn::method(op::INVOKESTATIC, "a/Log", "print", "(Ljava/lang/String;)V")
    );
    assert!(v.iter().all(Insn::is_well_formed));
    assert!(body.dangling_labels().is_empty());
}

#[test]
fn opcodes_accept_raw_bytes() {
    let body: MethodBody = serde_yaml::from_str("- kind: plain\n  opcode: 0xb1\n").unwrap();
    assert_eq!(body.to_vec(), vec![Insn::plain(op::RETURN)]);
}

#[test]
fn unknown_mnemonic_is_rejected() {
    let err = serde_yaml::from_str::<MethodBody>("- kind: plain\n  opcode: frob\n").unwrap_err();
    assert!(err.to_string().contains("frob"), "{err}");
}

#[test]
fn written_body_reads_back() {
    let body = MethodBody::from_insns([
        Insn::ldc(Constant::Type("a/B".into())),
        Insn::InvokeDynamic {
            name: "run".into(),
            descriptor: "()Ljava/lang/Runnable;".into(),
            bootstrap: MemberHandle {
                reference_kind: 6,
                owner: "java/lang/invoke/LambdaMetafactory".into(),
                name: "metafactory".into(),
                descriptor: "()V".into(),
            },
        },
        Insn::MultiANewArray {
            descriptor: "[[I".into(),
            dims: 2,
        },
        Insn::plain(op::ARETURN),
    ]);
    let text = serde_yaml::to_string(&body).unwrap();
    let back: MethodBody = serde_yaml::from_str(&text).unwrap();
    assert_eq!(back, body);
}

#[test]
fn loop_pattern_with_wildcards() {
    let body: MethodBody = serde_yaml::from_str(LOOP).unwrap();
    let pattern = [
        Insn::any_var(op::ILOAD),
        Insn::jump(op::IFNE, LabelId(99)),
        Insn::any_const(op::LDC),
    ];
    let m = find_sequence(&body, &pattern, 0).unwrap();
    assert_eq!(m.index, 4);
    assert_eq!(body.index_of(m.id), Some(4));
}
