use refjson::{
    append_indent, field_is_serializable, field_is_serializable_with, field_value, is_basic_type,
    is_basic_value, is_collection_or_array, parse_reference, raw_type, to_value,
    write_basic_value, write_reference, AccessResolver, Error, FieldDescriptor, HostProfile,
    Modifiers, Object, FieldMap, Restriction, SerializerConfig, TypeDescriptor, TypeInfo,
    Typed, Value, ValueKind, ID_KEY,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Serialize)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize)]
enum Status {
    Pending,
    Shipped,
}

#[derive(Serialize)]
struct Order {
    order_id: u32,
    customer: User,
    status: Status,
    items: Vec<(String, u32)>,
}

fn account_type() -> Arc<TypeInfo> {
    Arc::new(TypeInfo::composite(
        "bank::Account",
        vec![
            FieldDescriptor::new("id", u64::type_descriptor()).with_modifiers(Modifiers::PUBLIC),
            FieldDescriptor::new("owner", String::type_descriptor()),
            FieldDescriptor::new("audit", String::type_descriptor())
                .with_restriction(Restriction::Privileged),
            FieldDescriptor::new("pin", u16::type_descriptor())
                .with_restriction(Restriction::Sealed),
            FieldDescriptor::new("cache", Vec::<u8>::type_descriptor())
                .with_modifiers(Modifiers::TRANSIENT),
            FieldDescriptor::new("created", i64::type_descriptor())
                .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL),
            FieldDescriptor::new("outer", TypeDescriptor::of::<User>())
                .with_modifiers(Modifiers::SYNTHETIC),
        ],
    ))
}

impl Typed for User {
    fn type_info() -> Arc<TypeInfo> {
        Arc::new(TypeInfo::composite(
            "User",
            vec![
                FieldDescriptor::new("id", u32::type_descriptor()),
                FieldDescriptor::new("name", String::type_descriptor()),
                FieldDescriptor::new("active", bool::type_descriptor()),
                FieldDescriptor::new("tags", Vec::<String>::type_descriptor()),
            ],
        ))
    }
}

fn account(info: &Arc<TypeInfo>) -> Value {
    let mut fields = FieldMap::new();
    fields.insert("id".to_string(), Value::from(42u64));
    fields.insert("owner".to_string(), Value::from("Ada"));
    fields.insert("audit".to_string(), Value::from("ok"));
    fields.insert("pin".to_string(), Value::from(1234u16));
    Value::Object(Object::new(info.clone(), fields))
}

#[test]
fn test_nested_struct_classification() {
    let order = Order {
        order_id: 1,
        customer: User {
            id: 7,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        status: Status::Shipped,
        items: vec![("widget".to_string(), 2)],
    };

    let value = to_value(&order).unwrap();
    let object = value.as_object().unwrap();

    let kinds: Vec<_> = object
        .fields()
        .iter()
        .map(|(name, value)| (name.as_str(), value.kind()))
        .collect();
    assert_eq!(
        kinds,
        [
            ("order_id", ValueKind::Scalar),
            ("customer", ValueKind::Composite),
            ("status", ValueKind::Enum),
            ("items", ValueKind::CollectionOrArray),
        ]
    );

    let items = object.get("items").unwrap().as_elements().unwrap();
    assert!(is_collection_or_array(&items[0]));
    assert!(!is_basic_value(Some(object.get("customer").unwrap())));
}

#[test]
fn test_derived_fields_are_all_serializable() {
    let value = to_value(&User {
        id: 1,
        name: "Bob".to_string(),
        active: false,
        tags: Vec::new(),
    })
    .unwrap();
    let object = value.as_object().unwrap();

    let config = SerializerConfig::new().with_public_fields_only(true);
    let fields = config.serializable_fields(object.type_info());
    assert_eq!(fields.len(), 4);
    for field in &fields {
        assert!(field_value(&value, field).is_ok());
    }
}

#[test]
fn test_field_filter_over_declared_type() {
    let info = account_type();
    let visited: Vec<_> = SerializerConfig::new()
        .serializable_fields(&info)
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    assert_eq!(visited, ["id", "owner", "audit"]);

    let public: Vec<_> = SerializerConfig::new()
        .with_public_fields_only(true)
        .serializable_fields(&info)
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    assert_eq!(public, ["id"]);
}

#[test]
fn test_read_after_unlock() {
    let info = account_type();
    let object = account(&info);
    let owner = info.field("owner").unwrap();

    assert_eq!(
        field_value(&object, owner),
        Err(Error::illegal_access("bank::Account", "owner"))
    );
    assert!(field_is_serializable(owner, false));
    assert_eq!(field_value(&object, owner).unwrap().as_str(), Some("Ada"));

    let id = info.field("id").unwrap();
    assert_eq!(field_value(&object, id).unwrap().as_i64(), Some(42));
}

#[test]
fn test_sealed_field_stays_unreadable() {
    let info = account_type();
    let object = account(&info);
    let pin = info.field("pin").unwrap();

    assert!(!field_is_serializable(pin, false));
    assert!(matches!(
        field_value(&object, pin),
        Err(Error::IllegalAccess { .. })
    ));
}

#[test]
fn test_privileged_field_depends_on_host() {
    let info = account_type();
    let audit = FieldDescriptor::clone(info.field("audit").unwrap());

    let modern = AccessResolver::probe(HostProfile::modern());
    assert!(!field_is_serializable_with(&audit, false, &modern));

    let legacy = AccessResolver::probe(HostProfile::legacy());
    assert!(field_is_serializable_with(&audit, false, &legacy));
}

#[test]
fn test_field_read_type_mismatch() {
    let info = account_type();
    let id = info.field("id").unwrap();

    let other = to_value(&User {
        id: 1,
        name: "Eve".to_string(),
        active: true,
        tags: Vec::new(),
    })
    .unwrap();
    assert_eq!(
        field_value(&other, id),
        Err(Error::type_mismatch("bank::Account", "User"))
    );
    assert_eq!(
        field_value(&Value::from(3), id),
        Err(Error::type_mismatch("bank::Account", "i64"))
    );
}

#[test]
fn test_static_type_classification() {
    assert!(is_basic_type(Some(&String::type_descriptor())));
    assert!(!is_basic_type(Some(&User::type_descriptor())));
    assert!(!is_basic_type(Some(&HashSet::<String>::type_descriptor())));

    let field_types: Vec<_> = User::type_info()
        .fields()
        .iter()
        .map(|f| raw_type(f.ty()).unwrap().name().to_string())
        .collect();
    assert_eq!(field_types, ["u32", "String", "bool", "Vec"]);
}

#[test]
fn test_raw_type_of_type_variable_propagates() {
    let generic = TypeInfo::composite(
        "Box",
        vec![FieldDescriptor::new("inner", TypeDescriptor::variable("T"))],
    );
    let inner = generic.field("inner").unwrap();
    assert!(matches!(
        raw_type(inner.ty()),
        Err(Error::InvalidTypeKind { descriptor }) if descriptor == "T"
    ));
}

#[test]
fn test_emit_shared_object_with_markers() {
    let config = SerializerConfig::pretty();
    let mut out = String::from("[\n");
    config.indent(1, &mut out);
    out.push_str("{\"");
    out.push_str(ID_KEY);
    out.push_str("\": ");
    write_basic_value(&Value::from("1"), &mut out).unwrap();
    out.push_str(", \"status\": ");
    write_basic_value(&to_value(&Status::Pending).unwrap(), &mut out).unwrap();
    out.push_str("},\n");
    append_indent(1, config.indent_width, &mut out);
    write_reference("1", &mut out);
    out.push_str("\n]");

    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[0][ID_KEY], "1");
    assert_eq!(parsed[0]["status"], "Pending");
    assert_eq!(parse_reference(parsed[1].as_str().unwrap()), Some("1"));
}

#[test]
fn test_value_serializes_through_serde_json() {
    let value = to_value(&Order {
        order_id: 9,
        customer: User {
            id: 1,
            name: "Zed".to_string(),
            active: true,
            tags: vec!["a".to_string(), "b".to_string()],
        },
        status: Status::Pending,
        items: Vec::new(),
    })
    .unwrap();

    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(
        json,
        r#"{"order_id":9,"customer":{"id":1,"name":"Zed","active":true,"tags":["a","b"]},"status":"Pending","items":[]}"#
    );
}
