//! Query/mutation document builders.
//!
//! Every document the gateway sends is produced here by substituting
//! [`Value`]s into a fixed template. String values always pass through
//! [`escape`]; field and entity names are compile-time constants and never
//! come from callers.

use socialgraph_core::NewPerson;

/// GraphQL type name of the Person entity.
pub const PERSON: &str = "Person";

/// Fields read back for every Person lookup.
pub const PERSON_SELECTION: &[&str] = &[
    "id",
    "source_id",
    "source",
    "screen_name",
    "name",
    "location",
    "friends_count",
];

/// A value substituted into a document template.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Str(&'a str),
    Int(i64),
}

impl Value<'_> {
    fn render(&self) -> String {
        match self {
            Value::Str(s) => escape(s),
            Value::Int(n) => n.to_string(),
        }
    }
}

/// Render `value` as a quoted GraphQL string literal.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Name of the response field holding created nodes: `Person` -> `person`.
pub fn payload_field(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `mutation { add<Entity>(input: [{ ... }]) { <entity> { id } } }`
pub fn add_mutation(entity: &str, fields: &[(&str, Value<'_>)]) -> String {
    let input = fields
        .iter()
        .map(|(name, value)| format!("{name}: {}", value.render()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "mutation {{ add{entity}(input: [{{ {input} }}]) {{ {} {{ id }} }} }}",
        payload_field(entity)
    )
}

/// `query { get<Entity>(id: "...") { <selection> } }`
pub fn get_query(entity: &str, id: &str, selection: &[&str]) -> String {
    format!(
        "query {{ get{entity}(id: {}) {{ {} }} }}",
        escape(id),
        selection.join(" ")
    )
}

/// `query { query<Entity>(filter: { <field>: { eq: ... } }) { <selection> } }`
pub fn filter_eq_query(entity: &str, field: &str, value: Value<'_>, selection: &[&str]) -> String {
    format!(
        "query {{ query{entity}(filter: {{ {field}: {{ eq: {} }} }}) {{ {} }} }}",
        value.render(),
        selection.join(" ")
    )
}

// ── Person documents ─────────────────────────────────────────────

pub fn add_person(person: &NewPerson) -> String {
    add_mutation(
        PERSON,
        &[
            ("source_id", Value::Str(&person.source_id)),
            ("source", Value::Str(person.source.as_str())),
            ("screen_name", Value::Str(&person.screen_name)),
            ("name", Value::Str(&person.name)),
            ("location", Value::Str(&person.location)),
            ("friends_count", Value::Int(person.friends_count)),
        ],
    )
}

pub fn get_person(id: &str) -> String {
    get_query(PERSON, id, PERSON_SELECTION)
}

pub fn person_by_screen_name(screen_name: &str) -> String {
    filter_eq_query(
        PERSON,
        "screen_name",
        Value::Str(screen_name),
        PERSON_SELECTION,
    )
}
