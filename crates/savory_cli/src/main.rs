//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire `savory_core` end to end: in-memory store, one resource schema,
//!   a POST and a collection GET.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `savory_cli [BASE_URI]`. Set `SAVORY_LOG_DIR` (absolute path) to
//! enable file logging.

use savory_core::db::open_db_in_memory;
use savory_core::{
    core_version, default_log_level, init_logging, ApiContext, Field, FieldResult, Params,
    PropertyField, QuerySetResource, Record, Resource, ResourceSchema, SqliteRecordStore,
    ValueKind,
};
use serde_json::{json, Map, Value};
use std::error::Error;
use std::process::ExitCode;

const DEFAULT_BASE_URI: &str = "http://localhost/api";

struct NoteResource;

impl ResourceSchema for NoteResource {
    type Model = Record;
    const RESOURCE_PATH: &'static str = "notes";

    fn fields() -> FieldResult<Vec<Box<dyn Field>>> {
        Ok(vec![
            Box::new(PropertyField::new("title", ValueKind::Str)?),
            Box::new(PropertyField::new("word_count", ValueKind::Int)?),
        ])
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("savory_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("SAVORY_LOG_DIR") {
        init_logging(default_log_level(), &log_dir)?;
    }

    let base_uri = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BASE_URI.to_string());
    let ctx = ApiContext::new(base_uri);

    let conn = open_db_in_memory()?;
    let store = SqliteRecordStore::new(&conn, "note");
    let notes = QuerySetResource::<NoteResource>::new(&store)?;

    let mut input = Map::new();
    input.insert("title".to_string(), json!("hello"));
    input.insert("wordCount".to_string(), json!("2"));
    let created = notes.post(&ctx, &input)?;

    println!("savory_core version={}", core_version());
    println!("created uri={}", ctx.build_resource_uri(created.as_ref()));
    println!(
        "collection {}",
        Value::Object(notes.get(&ctx, &Params::empty())?)
    );
    Ok(())
}
