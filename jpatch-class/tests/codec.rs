use jpatch_class::{AccessFlags, ClassCodec, CodecError, ModelError, YamlCodec};
use jpatch_ir::Insn;
use jpatch_isa::op;

const WIDGET: &str = r#"
name: com/example/Widget
super_name: java/lang/Object
access: PUBLIC | SUPER
fields:
  - name: count
    descriptor: I
    access: PRIVATE
methods:
  - name: tick
    descriptor: ()V
    max_stack: 2
    max_locals: 1
    body:
      - kind: local_var
        opcode: aload
        slot: 0
      - kind: method_ref
        opcode: invokevirtual
        owner: com/example/Widget
        name: redraw
        descriptor: ()V
      - kind: plain
        opcode: return
  - name: redraw
    descriptor: ()V
    access: PUBLIC | ABSTRACT
"#;

#[test]
fn decodes_class_dump() {
    let class = YamlCodec.decode(WIDGET.as_bytes()).unwrap();
    assert_eq!(class.name, "com/example/Widget");
    assert_eq!(class.super_name.as_deref(), Some("java/lang/Object"));
    assert_eq!(class.access, AccessFlags::PUBLIC | AccessFlags::SUPER);
    assert_eq!(class.find_field("count").unwrap().access, AccessFlags::PRIVATE);

    let tick = class.find_method("tick", "()V").unwrap();
    assert_eq!(tick.max_stack, 2);
    assert_eq!(tick.body.len(), 3);
    assert_eq!(
        tick.body.to_vec()[1],
        Insn::method(op::INVOKEVIRTUAL, "com/example/Widget", "redraw", "()V")
    );

    let redraw = class.find_method("redraw", "()V").unwrap();
    assert!(redraw.access.has_no_code());
    assert!(redraw.body.is_empty());
}

#[test]
fn encode_then_decode_is_lossless() {
    let class = YamlCodec.decode(WIDGET.as_bytes()).unwrap();
    let bytes = YamlCodec.encode(&class).unwrap();
    assert_eq!(YamlCodec.decode(&bytes).unwrap(), class);
}

#[test]
fn rejects_non_utf8() {
    assert!(matches!(
        YamlCodec.decode(&[0xff, 0xfe, 0x00]),
        Err(CodecError::Utf8(_))
    ));
}

#[test]
fn rejects_bad_yaml() {
    assert!(matches!(
        YamlCodec.decode(b"name: [unterminated"),
        Err(CodecError::Yaml(_))
    ));
}

#[test]
fn rejects_invalid_model() {
    let text = WIDGET.replace("descriptor: ()V\n    max_stack", "descriptor: (X)V\n    max_stack");
    assert!(matches!(
        YamlCodec.decode(text.as_bytes()),
        Err(CodecError::Invalid(ModelError::Descriptor { .. }))
    ));

    let dup = format!(
        "{WIDGET}  - name: tick\n    descriptor: ()V\n"
    );
    assert!(matches!(
        YamlCodec.decode(dup.as_bytes()),
        Err(CodecError::Invalid(ModelError::DuplicateMethod { .. }))
    ));
}
