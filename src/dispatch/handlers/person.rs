//! Person.* wire handlers.

use serde_json::{json, Value};

use crate::application::Services;
use crate::dispatch::Envelope;
use crate::domain::{Person, PersonRole};

use super::{opt_str, require_id, soften, HandlerResult};

/// In: `Person.List` — Out: `Person.Snapshot`.
pub async fn list(services: &Services) -> HandlerResult {
    let people = match services.people.list_people().await {
        Ok(people) => people,
        Err(err) => return soften(err, "Person.List"),
    };
    let rows: Vec<Value> = people.iter().map(person_json).collect();
    Ok(Some(Envelope::build(
        "Person.Snapshot",
        json!({ "orders": rows }),
    )))
}

/// In: `Person.Create` / `Person.Update` — Out: `Person.Upsert`.
pub async fn upsert(services: &Services, payload: &Value, create: bool) -> HandlerResult {
    let Some(name) = opt_str(payload, "name").filter(|n| !n.trim().is_empty()) else {
        tracing::warn!("missing name in Person payload");
        return Ok(None);
    };
    let Some(role) = opt_str(payload, "role").and_then(PersonRole::parse) else {
        tracing::warn!("invalid role in Person payload");
        return Ok(None);
    };

    let person = if create {
        match services.people.create_person(name, role).await {
            Ok(person) => person,
            Err(err) => return soften(err, "Person.Create"),
        }
    } else {
        let Some(person_id) = require_id(payload, "personId", "Person.Update") else {
            return Ok(None);
        };
        match services.people.update_person(person_id, name, role).await {
            Ok(Some(person)) => person,
            Ok(None) => return Ok(None),
            Err(err) => return soften(err, "Person.Update"),
        }
    };

    Ok(Some(Envelope::build("Person.Upsert", person_json(&person))))
}

/// In: `Person.Delete` — Out: `Person.Deleted`.
pub async fn delete(services: &Services, payload: &Value) -> HandlerResult {
    let Some(person_id) = require_id(payload, "personId", "Person.Delete") else {
        return Ok(None);
    };
    match services.people.remove_person(person_id).await {
        Ok(true) => Ok(Some(Envelope::build(
            "Person.Deleted",
            json!({ "personId": person_id, "deleted": true }),
        ))),
        Ok(false) => {
            tracing::warn!(person_id, "failed to delete person");
            Ok(None)
        }
        Err(err) => soften(err, "Person.Delete"),
    }
}

fn person_json(person: &Person) -> Value {
    json!({
        "personId": person.person_id,
        "name": person.name,
        "role": person.role.as_str(),
    })
}
