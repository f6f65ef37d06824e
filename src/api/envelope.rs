//! Normalization of backend replies.
//!
//! Some endpoints wrap their payload as `{ status, message, data }` and some
//! return the payload bare. Paginated collections come in several shapes as
//! well. Everything is flattened here so gateways see a single form.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    Error,
    pagination::{PageInfo, PageQuery, Paginated, pages_for},
};

/// Keys that may hold the items of a paginated payload.
const ITEM_KEYS: [&str; 5] = ["items", "data", "results", "records", "rows"];
/// Keys that may hold the pagination descriptor.
const PAGE_INFO_KEYS: [&str; 2] = ["pagination", "meta"];

const PAGE_KEYS: [&str; 2] = ["page", "currentPage"];
const LIMIT_KEYS: [&str; 4] = ["limit", "pageSize", "perPage", "itemsPerPage"];
const TOTAL_KEYS: [&str; 4] = ["total", "totalItems", "totalCount", "count"];
const TOTAL_PAGES_KEYS: [&str; 2] = ["totalPages", "pages"];

fn parse(body: &str) -> Result<Value, Error> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(body).map_err(|error| Error::Decode(error.to_string()))
}

/// Whether `object` is a `{ status, message, data }` envelope rather than a payload.
///
/// Payloads such as requests have a `status` field of their own, so a
/// `status` only marks an envelope when it is a boolean or an outcome word.
fn is_envelope(object: &Map<String, Value>) -> bool {
    if object.contains_key("data") || object.contains_key("success") {
        return true;
    }

    match object.get("status") {
        Some(Value::Bool(_)) => true,
        Some(Value::String(status)) => matches!(
            status.to_ascii_lowercase().as_str(),
            "success" | "ok" | "error" | "fail" | "failure"
        ),
        _ => false,
    }
}

fn envelope_failed(object: &Map<String, Value>) -> bool {
    let status_failed = match object.get("status") {
        Some(Value::Bool(ok)) => !ok,
        Some(Value::String(status)) => matches!(
            status.to_ascii_lowercase().as_str(),
            "error" | "fail" | "failure"
        ),
        _ => false,
    };

    status_failed || matches!(object.get("success"), Some(Value::Bool(false)))
}

/// Split a reply into its payload and, for envelopes, the envelope object.
fn unwrap_envelope(value: Value) -> Result<(Value, Option<Map<String, Value>>), Error> {
    match value {
        Value::Object(mut object) if is_envelope(&object) => {
            if envelope_failed(&object) {
                return Err(Error::Backend {
                    status: 400,
                    message: message_of(&object)
                        .unwrap_or_else(|| "the request was not accepted".to_owned()),
                });
            }

            let data = object.remove("data").unwrap_or(Value::Null);

            Ok((data, Some(object)))
        }
        value => Ok((value, None)),
    }
}

fn message_of(object: &Map<String, Value>) -> Option<String> {
    match (object.get("message"), object.get("error")) {
        (Some(Value::String(message)), _) if !message.is_empty() => Some(message.clone()),
        (_, Some(Value::String(error))) if !error.is_empty() => Some(error.clone()),
        (_, Some(Value::Object(error))) => match error.get("message") {
            Some(Value::String(message)) => Some(message.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// The error message in a failed reply, if it has one.
pub fn error_message(body: &str) -> Option<String> {
    match parse(body).ok()? {
        Value::Object(object) => message_of(&object),
        _ => None,
    }
}

/// Decode the payload of a reply, unwrapping an envelope if there is one.
///
/// # Errors
///
/// Returns [Error::Backend] for an envelope that reports failure and
/// [Error::Decode] if the payload does not have the expected shape.
pub fn decode_payload<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let (payload, _) = unwrap_envelope(parse(body)?)?;

    serde_json::from_value(payload).map_err(|error| Error::Decode(error.to_string()))
}

/// Check a reply whose payload is not needed.
pub fn ensure_success(body: &str) -> Result<(), Error> {
    // Some endpoints reply with plain text on success.
    let Ok(value) = parse(body) else {
        return Ok(());
    };

    unwrap_envelope(value).map(|_| ())
}

fn read_u64(object: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn take_items(object: &mut Map<String, Value>) -> Option<Vec<Value>> {
    ITEM_KEYS.iter().find_map(|key| match object.get(*key) {
        Some(Value::Array(_)) => match object.remove(*key) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    })
}

fn page_info_object(object: &Map<String, Value>) -> Option<&Map<String, Value>> {
    PAGE_INFO_KEYS.iter().find_map(|key| match object.get(*key) {
        Some(Value::Object(info)) => Some(info),
        _ => None,
    })
}

fn resolve_page_info(
    sources: &[&Map<String, Value>],
    requested: PageQuery,
    item_count: usize,
) -> PageInfo {
    let find = |keys: &[&str]| sources.iter().find_map(|source| read_u64(source, keys));

    let page = find(&PAGE_KEYS).unwrap_or(requested.page).max(1);
    let limit = find(&LIMIT_KEYS).unwrap_or(requested.limit);
    let total = find(&TOTAL_KEYS)
        .unwrap_or_else(|| (page - 1) * limit + item_count as u64);
    let total_pages = find(&TOTAL_PAGES_KEYS).unwrap_or_else(|| pages_for(total, limit));

    PageInfo {
        page,
        limit,
        total,
        total_pages,
    }
}

/// Decode one page of a collection.
///
/// Accepted shapes, inside or outside an envelope:
/// - a bare array, taken as the requested page with no further pages known
/// - `{ items|data|results|records|rows: [...], pagination|meta: {...} }`
/// - `{ items: [...], page, limit, total, totalPages }` with the descriptor flat
///
/// Missing descriptor fields fall back to the requested page and limit.
pub fn decode_page<T: DeserializeOwned>(
    body: &str,
    requested: PageQuery,
) -> Result<Paginated<T>, Error> {
    let (payload, envelope) = unwrap_envelope(parse(body)?)?;
    let empty = Map::new();
    let envelope = envelope.unwrap_or_default();

    let (raw_items, info) = match payload {
        Value::Array(items) => {
            let mut sources = Vec::new();
            if let Some(info) = page_info_object(&envelope) {
                sources.push(info);
            }
            sources.push(&envelope);
            let info = resolve_page_info(&sources, requested, items.len());

            (items, info)
        }
        Value::Object(mut object) => {
            let items = take_items(&mut object).ok_or_else(|| {
                Error::Decode("paginated reply has no list of items".to_owned())
            })?;
            let mut sources = Vec::new();
            if let Some(info) = page_info_object(&object) {
                sources.push(info);
            }
            sources.push(&object);
            if let Some(info) = page_info_object(&envelope) {
                sources.push(info);
            }
            let info = resolve_page_info(&sources, requested, items.len());

            (items, info)
        }
        Value::Null => (Vec::new(), resolve_page_info(&[&empty], requested, 0)),
        _ => {
            return Err(Error::Decode(
                "paginated reply is neither a list nor an object".to_owned(),
            ));
        }
    };

    let items = raw_items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|error| Error::Decode(error.to_string()))?;

    Ok(Paginated { items, info })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use crate::{
        Error,
        pagination::{PageInfo, PageQuery},
    };

    use super::{decode_page, decode_payload, ensure_success, error_message};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
        #[serde(default)]
        status: Option<String>,
    }

    const REQUESTED: PageQuery = PageQuery { page: 2, limit: 10 };

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn unwraps_envelope() {
        let got: Item =
            decode_payload(r#"{"status":"success","message":"ok","data":{"id":"a"}}"#).unwrap();

        assert_eq!(got.id, "a");
    }

    #[test]
    fn bare_payload_with_status_field_is_not_an_envelope() {
        let got: Item = decode_payload(r#"{"id":"fr-1","status":"PENDING"}"#).unwrap();

        assert_eq!(got.status.as_deref(), Some("PENDING"));
    }

    #[test]
    fn failed_envelope_is_an_error() {
        let got = decode_payload::<Item>(
            r#"{"status":"error","message":"Amount must be positive","data":null}"#,
        );

        assert_eq!(
            got,
            Err(Error::Backend {
                status: 400,
                message: "Amount must be positive".to_owned()
            })
        );
    }

    #[test]
    fn success_false_is_an_error() {
        assert!(ensure_success(r#"{"success":false,"error":"nope"}"#).is_err());
        assert_eq!(
            error_message(r#"{"success":false,"error":"nope"}"#).as_deref(),
            Some("nope")
        );
    }

    #[test]
    fn empty_and_plain_text_replies_are_success() {
        assert_eq!(ensure_success(""), Ok(()));
        assert_eq!(ensure_success("Logged out"), Ok(()));
    }

    #[test]
    fn mismatched_payload_is_decode_error() {
        let got = decode_payload::<Item>(r#"{"name":"no id"}"#);

        assert!(matches!(got, Err(Error::Decode(_))));
    }

    #[test]
    fn page_from_items_and_pagination() {
        let body = r#"{
            "items": [{"id":"a"},{"id":"b"}],
            "pagination": {"page": 2, "limit": 10, "total": 12, "totalPages": 2}
        }"#;

        let got = decode_page::<Item>(body, REQUESTED).unwrap();

        assert_eq!(ids(&got.items), ["a", "b"]);
        assert_eq!(got.info, PageInfo::new(2, 10, 12));
    }

    #[test]
    fn page_from_envelope_with_nested_data_and_meta() {
        let body = r#"{
            "status": "success",
            "data": {"results": [{"id":"a"}], "meta": {"currentPage": 3, "perPage": 5, "totalItems": 11}}
        }"#;

        let got = decode_page::<Item>(body, REQUESTED).unwrap();

        assert_eq!(ids(&got.items), ["a"]);
        assert_eq!(got.info, PageInfo::new(3, 5, 11));
    }

    #[test]
    fn page_from_envelope_with_sibling_pagination() {
        let body = r#"{
            "status": true,
            "data": [{"id":"a"}],
            "pagination": {"page": "2", "pageSize": "10", "totalCount": "25"}
        }"#;

        let got = decode_page::<Item>(body, REQUESTED).unwrap();

        assert_eq!(got.info, PageInfo::new(2, 10, 25));
        assert_eq!(got.info.total_pages, 3);
    }

    #[test]
    fn page_from_flat_object() {
        let body = r#"{"records":[{"id":"a"}],"page":1,"limit":1,"total":4,"totalPages":4}"#;

        let got = decode_page::<Item>(body, REQUESTED).unwrap();

        assert_eq!(got.info, PageInfo::new(1, 1, 4));
    }

    #[test]
    fn bare_array_is_the_requested_page() {
        let got = decode_page::<Item>(r#"[{"id":"a"},{"id":"b"}]"#, REQUESTED).unwrap();

        assert_eq!(ids(&got.items), ["a", "b"]);
        assert_eq!(got.info.page, 2);
        assert_eq!(got.info.limit, 10);
        assert_eq!(got.info.total, 12);
    }

    #[test]
    fn object_without_items_is_decode_error() {
        let got = decode_page::<Item>(r#"{"page":1}"#, REQUESTED);

        assert!(matches!(got, Err(Error::Decode(_))));
    }
}
