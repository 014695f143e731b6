//! Property-based round-trip tests.
//!
//! Every method and property list of the built-in table is generated with
//! arbitrary values, encoded, decoded, and compared with the input.

use amqp_codec::amqp091;
use amqp_codec::codec::{
    packed_len, BitPacker, BitUnpacker, Codec, FieldTable, FieldValue, MethodInstance,
    PropertyList, Value, WireReader, WireWriter,
};
use amqp_codec::spec::{
    ClassDefinition, FieldDefinition, MethodSpec, PrimitiveType, ProtocolDefinition,
    ProtocolSpec, MAX_PROPERTY_FIELDS,
};
use bytes::Bytes;
use proptest::prelude::*;

fn field_value_strategy() -> impl Strategy<Value = FieldValue> {
    let numbers = prop_oneof![
        any::<bool>().prop_map(FieldValue::Boolean),
        any::<i8>().prop_map(FieldValue::I8),
        any::<u8>().prop_map(FieldValue::U8),
        any::<i16>().prop_map(FieldValue::I16),
        any::<u16>().prop_map(FieldValue::U16),
        any::<i32>().prop_map(FieldValue::I32),
        any::<u32>().prop_map(FieldValue::U32),
        any::<i64>().prop_map(FieldValue::I64),
    ];
    let others = prop_oneof![
        any::<u64>().prop_map(FieldValue::U64),
        (-1.0e6f32..1.0e6f32).prop_map(FieldValue::F32),
        (-1.0e12f64..1.0e12f64).prop_map(FieldValue::F64),
        (any::<u8>(), any::<u32>()).prop_map(|(scale, value)| FieldValue::Decimal { scale, value }),
        "[a-zA-Z0-9 _./:-]{0,32}".prop_map(|s| FieldValue::string(&s)),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(|b| FieldValue::Bytes(Bytes::from(b))),
        any::<u64>().prop_map(FieldValue::Timestamp),
        Just(FieldValue::Void),
    ];
    let leaf = prop_oneof![numbers, others];

    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(FieldValue::Array),
            table_of(inner).prop_map(FieldValue::Table),
        ]
    })
}

fn table_of(values: impl Strategy<Value = FieldValue>) -> impl Strategy<Value = FieldTable> {
    prop::collection::vec(("[a-z][a-z0-9_-]{0,15}", values), 0..6).prop_map(|entries| {
        let mut table = FieldTable::new();
        for (key, value) in entries {
            table.push(Bytes::from(key), value);
        }
        table
    })
}

fn value_strategy(primitive: PrimitiveType) -> BoxedStrategy<Value> {
    match primitive {
        PrimitiveType::Bit => any::<bool>().prop_map(Value::Bit).boxed(),
        PrimitiveType::Octet => any::<u8>().prop_map(Value::Octet).boxed(),
        PrimitiveType::Short => any::<u16>().prop_map(Value::Short).boxed(),
        PrimitiveType::Long => any::<u32>().prop_map(Value::Long).boxed(),
        PrimitiveType::LongLong => any::<u64>().prop_map(Value::LongLong).boxed(),
        PrimitiveType::Timestamp => any::<u64>().prop_map(Value::Timestamp).boxed(),
        PrimitiveType::ShortStr => prop::collection::vec(any::<u8>(), 0..=255)
            .prop_map(|b| Value::ShortStr(Bytes::from(b)))
            .boxed(),
        PrimitiveType::LongStr => prop::collection::vec(any::<u8>(), 0..512)
            .prop_map(|b| Value::LongStr(Bytes::from(b)))
            .boxed(),
        PrimitiveType::Table => table_of(field_value_strategy())
            .prop_map(Value::Table)
            .boxed(),
    }
}

fn method_strategy() -> impl Strategy<Value = MethodInstance> {
    let methods: Vec<&'static MethodSpec> = amqp091::spec().methods().collect();
    prop::sample::select(methods).prop_flat_map(|method| {
        let args: Vec<BoxedStrategy<Value>> = method
            .arguments
            .iter()
            .map(|f| value_strategy(f.primitive))
            .collect();
        (Just(method.number), args)
    })
    .prop_map(|(number, args)| MethodInstance::new(number, args))
}

fn basic_properties_strategy() -> impl Strategy<Value = PropertyList> {
    let basic = amqp091::spec()
        .class(amqp091::BASIC_CLASS_ID)
        .expect("basic class");
    let fields: Vec<BoxedStrategy<Option<Value>>> = basic
        .properties
        .iter()
        .map(|f| prop::option::of(value_strategy(f.primitive)).boxed())
        .collect();
    fields.prop_map(move |values| {
        let mut props = PropertyList::new(basic);
        for (field, value) in basic.properties.iter().zip(values) {
            if let Some(value) = value {
                props.set(field, value);
            }
        }
        props
    })
}

/// A class using every flag bit, each property an octet.
fn wide_spec() -> ProtocolSpec {
    ProtocolSpec::from_definition(&ProtocolDefinition {
        major: 0,
        minor: 9,
        revision: 1,
        port: 5672,
        domains: vec![],
        constants: vec![],
        classes: vec![ClassDefinition {
            id: 1,
            name: "wide".into(),
            methods: vec![],
            properties: (0..MAX_PROPERTY_FIELDS)
                .map(|i| FieldDefinition::new(&format!("p{}", i), "octet"))
                .collect(),
        }],
    })
    .expect("wide class")
}

proptest! {
    #[test]
    fn prop_method_round_trip(instance in method_strategy()) {
        let codec = amqp091::codec();
        let bytes = codec.encode_method_to_bytes(instance.number, &instance).unwrap();
        let decoded = codec.decode_method(instance.number, &bytes).unwrap();
        prop_assert_eq!(decoded, instance);
    }

    #[test]
    fn prop_method_payload_round_trip(instance in method_strategy()) {
        let codec = amqp091::codec();
        let mut buf = vec![0u8; codec.config().frame_max];
        let len = codec.encode_method_payload(&instance, &mut buf).unwrap();
        let decoded = codec
            .decode_method_payload(&Bytes::copy_from_slice(&buf[..len]))
            .unwrap();
        prop_assert_eq!(decoded, instance);
    }

    #[test]
    fn prop_basic_properties_round_trip(props in basic_properties_strategy()) {
        let codec = amqp091::codec();
        let mut buf = vec![0u8; codec.config().frame_max];
        let len = codec
            .encode_properties(amqp091::BASIC_CLASS_ID, &props, &mut buf)
            .unwrap();
        let decoded = codec
            .decode_properties(amqp091::BASIC_CLASS_ID, &Bytes::copy_from_slice(&buf[..len]))
            .unwrap();
        prop_assert_eq!(decoded, props);
    }

    #[test]
    fn prop_flag_words_are_minimal(present in any::<u64>()) {
        let spec = wide_spec();
        let codec = Codec::new(&spec);
        let class = spec.class(1).unwrap();

        let mut props = PropertyList::new(class);
        for field in &class.properties {
            if present & field.flag != 0 {
                props.set(field, Value::Octet(field.ordinal as u8));
            }
        }

        let mut buf = [0u8; 128];
        let len = codec.encode_properties(1, &props, &mut buf).unwrap();
        let decoded = codec
            .decode_properties(1, &Bytes::copy_from_slice(&buf[..len]))
            .unwrap();
        prop_assert_eq!(&decoded, &props);

        // Words up to and including the highest one with a set bit.
        let flags = props.flags();
        let words = if flags == 0 { 1 } else { (64 - flags.leading_zeros() as usize).div_ceil(16) };
        let present_count = flags.count_ones() as usize;
        prop_assert_eq!(len, words * 2 + present_count);
    }

    #[test]
    fn prop_bit_runs_round_trip(bits in prop::collection::vec(any::<bool>(), 0..64)) {
        let mut buf = [0u8; 8];
        let mut w = WireWriter::new(&mut buf);
        let mut packer = BitPacker::new();
        for &bit in &bits {
            packer.push(&mut w, bit).unwrap();
        }
        packer.flush(&mut w).unwrap();
        prop_assert_eq!(w.offset(), packed_len(bits.len()));

        let len = w.offset();
        let bytes = Bytes::copy_from_slice(&buf[..len]);
        let mut r = WireReader::new(&bytes);
        let mut unpacker = BitUnpacker::new();
        for &bit in &bits {
            prop_assert_eq!(unpacker.next_bit(&mut r).unwrap(), bit);
        }
        prop_assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn prop_decode_arbitrary_bytes_never_panics(
        instance in method_strategy(),
        noise in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let codec = amqp091::codec();
        let payload = Bytes::from(noise);
        // Either outcome is fine; only panics are failures.
        let _ = codec.decode_method(instance.number, &payload);
        let _ = codec.decode_properties(amqp091::BASIC_CLASS_ID, &payload);
        let _ = codec.decode_content_header(&payload);
    }

    #[test]
    fn prop_truncated_method_never_decodes_partially(instance in method_strategy()) {
        let codec = amqp091::codec();
        let bytes = codec.encode_method_to_bytes(instance.number, &instance).unwrap();
        if !bytes.is_empty() {
            let cut = bytes.slice(..bytes.len() - 1);
            prop_assert!(codec.decode_method(instance.number, &cut).is_err());
        }
    }
}
