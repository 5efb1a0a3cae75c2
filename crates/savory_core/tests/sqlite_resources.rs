use savory_core::db::open_db_in_memory;
use savory_core::{
    AccessorField, ApiContext, Attributes, Field, FieldResult, FkPropertyField, ModelStore,
    Params, PropertyField, QuerySet, QuerySetResource, Record, Resource, ResourceSchema,
    SqliteRecordStore, ValueKind,
};
use serde_json::{json, Map, Value};

struct EmployeeResource;

impl ResourceSchema for EmployeeResource {
    type Model = Record;
    const RESOURCE_PATH: &'static str = "employees";

    fn fields() -> FieldResult<Vec<Box<dyn Field>>> {
        Ok(vec![
            Box::new(PropertyField::new("full_name", ValueKind::Str)?),
            Box::new(PropertyField::new("age", ValueKind::Int)?),
            Box::new(FkPropertyField::new("group.name", ValueKind::Str)?),
            Box::new(AccessorField::new("id", |model: &dyn Attributes| {
                model.attr("pk").unwrap_or(Value::Null)
            })),
        ])
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn seed(store: &SqliteRecordStore<'_>) -> i64 {
    let group = Record::from_attrs([("name", json!("platform"))]);
    let mut employee = Record::from_attrs([("full_name", json!("Ada")), ("age", json!(36))])
        .with_related("group", group);
    store.save(&mut employee).unwrap();
    employee.pk.unwrap()
}

#[test]
fn eager_loading_fills_fk_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn, "employee").with_relation("group", "group");
    let pk = seed(&store);

    let resource = QuerySetResource::<EmployeeResource>::new(&store).unwrap();
    let data = resource.get(&ApiContext::new("/api"), &Params::empty()).unwrap();

    assert_eq!(
        data["objects"],
        json!([{"fullName": "Ada", "age": 36, "groupName": "platform", "id": pk}])
    );
}

#[test]
fn unhinted_relation_reads_as_null() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn, "employee").with_relation("group", "group");
    let pk = seed(&store);

    let plain = store.get(&QuerySet::new(), pk).unwrap().unwrap();
    assert!(plain.related.is_empty());
    assert!(plain.attrs.contains_key("group_id"));
}

#[test]
fn put_through_fk_field_updates_related_record() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn, "employee").with_relation("group", "group");
    let pk = seed(&store);
    let ctx = ApiContext::new("/api");

    let collection = QuerySetResource::<EmployeeResource>::new(&store).unwrap();
    let mut child = collection
        .get_child_resource(&ctx, &pk.to_string())
        .unwrap()
        .expect("seeded employee should resolve");
    child
        .put(
            &ctx,
            &object(json!({"fullName": "Ada L.", "age": 37, "groupName": "research"})),
        )
        .unwrap();

    let reloaded = collection
        .get_child_resource(&ctx, &pk.to_string())
        .unwrap()
        .unwrap()
        .get(&ctx, &Params::empty())
        .unwrap();
    assert_eq!(reloaded["fullName"], json!("Ada L."));
    assert_eq!(reloaded["age"], json!(37));
    assert_eq!(reloaded["groupName"], json!("research"));

    let groups = SqliteRecordStore::new(&conn, "group");
    assert_eq!(groups.count().unwrap(), 1);
}

#[test]
fn post_then_delete_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn, "employee").with_relation("group", "group");
    let ctx = ApiContext::new("/api");
    let collection = QuerySetResource::<EmployeeResource>::new(&store).unwrap();

    // No related group loaded on a fresh record, so only scalar keys are sent.
    struct ScalarOnly;
    impl ResourceSchema for ScalarOnly {
        type Model = Record;
        const RESOURCE_PATH: &'static str = "employees";

        fn fields() -> FieldResult<Vec<Box<dyn Field>>> {
            Ok(vec![
                Box::new(PropertyField::new("full_name", ValueKind::Str)?),
                Box::new(PropertyField::new("age", ValueKind::Int)?),
            ])
        }
    }
    let scalar = QuerySetResource::<ScalarOnly>::new(&store).unwrap();
    let mut created = scalar
        .post(&ctx, &object(json!({"fullName": "Grace", "age": "85"})))
        .unwrap();
    let path = created.resource_path();
    assert!(path.starts_with("employees/"));

    let listed = collection.get(&ctx, &Params::empty()).unwrap();
    assert_eq!(
        listed["objects"][0]["groupName"],
        Value::Null,
        "employee without group has null FK field"
    );
    assert_eq!(listed["objects"][0]["age"], json!(85));

    created.delete(&ctx).unwrap();
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn sqlite_round_trips_every_field_kind() {
    struct ProfileResource;
    impl ResourceSchema for ProfileResource {
        type Model = Record;
        const RESOURCE_PATH: &'static str = "profiles";

        fn fields() -> FieldResult<Vec<Box<dyn Field>>> {
            Ok(vec![
                Box::new(PropertyField::new("display_name", ValueKind::Str)?),
                Box::new(PropertyField::new("visits", ValueKind::Int)?),
                Box::new(PropertyField::new("score", ValueKind::Float)?),
                Box::new(PropertyField::new("active", ValueKind::Bool)?),
            ])
        }
    }

    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn, "profile");
    let ctx = ApiContext::new("/api");
    let collection = QuerySetResource::<ProfileResource>::new(&store).unwrap();

    let input = object(json!({"displayName": "Ada", "visits": 7, "score": 1.5, "active": true}));
    let created = collection.post(&ctx, &input).unwrap();
    let key = created.resource_path().trim_start_matches("profiles/").to_string();

    let mut child = collection
        .get_child_resource(&ctx, &key)
        .unwrap()
        .expect("created profile should resolve");
    let data = child.get(&ctx, &Params::empty()).unwrap();
    assert_eq!(data, input);

    child.put(&ctx, &data).unwrap();
    let reloaded = collection
        .get_child_resource(&ctx, &key)
        .unwrap()
        .expect("profile should still resolve")
        .get(&ctx, &Params::empty())
        .unwrap();
    assert_eq!(reloaded, input);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn context_resolves_nested_paths() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn, "employee").with_relation("group", "group");
    let pk = seed(&store);
    let ctx = ApiContext::new("http://host/api/");
    let collection = QuerySetResource::<EmployeeResource>::new(&store).unwrap();

    let found = ctx
        .resolve_resource_path(&collection, &format!("/{pk}/"))
        .unwrap()
        .expect("employee should resolve");
    assert_eq!(
        ctx.build_resource_uri(found.as_ref()),
        format!("http://host/api/employees/{pk}")
    );

    assert!(ctx
        .resolve_resource_path(&collection, &format!("{pk}/anything"))
        .unwrap()
        .is_none());
    assert!(ctx
        .resolve_resource_path(&collection, "12345")
        .unwrap()
        .is_none());
}
