use jpatch_class::{
    BaseType, DescriptorError, FieldType, KnownTypes, MethodDescriptor, ReturnType,
    parse_method_descriptor_in,
};

#[test]
fn round_trip_int_string_to_boolean() {
    let d = MethodDescriptor::parse("(ILjava/lang/String;)Z").unwrap();
    assert_eq!(
        d.params,
        vec![
            FieldType::Base(BaseType::Int),
            FieldType::object("java/lang/String"),
        ]
    );
    assert_eq!(d.ret, ReturnType::Value(FieldType::Base(BaseType::Boolean)));
    assert_eq!(d.to_string(), "(ILjava/lang/String;)Z");
    assert_eq!(d.java_signature(), "boolean (int, java.lang.String)");
}

#[test]
fn round_trips_preserve_text() {
    for s in [
        "()V",
        "(I)V",
        "(Z)V",
        "([[I[Ljava/lang/Object;JD)[Ljava/lang/String;",
        "(Lcom/example/Outer$Inner;BCSF)J",
        "(Lé/Ünïcode;)V",
    ] {
        let d: MethodDescriptor = s.parse().unwrap();
        assert_eq!(d.to_string(), s);
    }
}

#[test]
fn wide_arguments_take_two_slots() {
    let d = MethodDescriptor::parse("(JIDLjava/lang/Object;)V").unwrap();
    assert_eq!(d.arg_slots(), 6);
    assert_eq!(d.ret.slot_size(), 0);
}

#[test]
fn malformed_descriptors() {
    let cases: &[(&str, DescriptorError)] = &[
        ("", DescriptorError::Empty),
        ("I)V", DescriptorError::ExpectedOpenParen { found: 'I' }),
        ("(I", DescriptorError::UnterminatedParams),
        ("(I)", DescriptorError::MissingReturnType),
        ("(V)V", DescriptorError::VoidParameter { offset: 1 }),
        ("(Q)V", DescriptorError::UnknownTypeCode { code: 'Q', offset: 1 }),
        ("(Ljava/lang/String)V", DescriptorError::UnterminatedClassName { offset: 1 }),
        ("(L;)V", DescriptorError::EmptyClassName { offset: 1 }),
        ("()VV", DescriptorError::TrailingCharacters { offset: 3 }),
        ("([)V", DescriptorError::UnknownTypeCode { code: ')', offset: 2 }),
    ];
    for (input, expected) in cases {
        assert_eq!(
            MethodDescriptor::parse(input).as_ref(),
            Err(expected),
            "input {input:?}"
        );
    }
}

#[test]
fn namespace_restricts_reference_types() {
    let known: KnownTypes = ["java.lang.String", "a/Widget"].into_iter().collect();
    assert_eq!(known.len(), 2);
    assert!(parse_method_descriptor_in("(Ljava/lang/String;)La/Widget;", &known).is_ok());
    assert_eq!(
        parse_method_descriptor_in("(Ljava/util/List;)V", &known),
        Err(DescriptorError::UnknownType("java/util/List".into()))
    );
    assert!(parse_method_descriptor_in("(IJ)V", &KnownTypes::new()).is_ok());
}

#[test]
fn field_type_parse() {
    assert_eq!(
        FieldType::parse("[J").unwrap(),
        FieldType::array_of(FieldType::Base(BaseType::Long))
    );
    assert_eq!(FieldType::parse("J").unwrap().slot_size(), 2);
    assert_eq!(
        "V".parse::<FieldType>(),
        Err(DescriptorError::VoidParameter { offset: 0 })
    );
}
