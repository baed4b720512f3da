//! JSON request bodies and response shapes of the Notion API.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use notesync_core::{CollectionId, PageProperties};
use notesync_renderer::Block;

/// `properties` object for a page in a notes database.
///
/// ```json
/// {"Name": {"title": [...]}, "Date": {"date": {"start": "2024-02-27"}}, "Tags": {"multi_select": [...]}}
/// ```
pub fn properties(props: &PageProperties) -> Value {
    let mut map = Map::new();
    map.insert(
        "Name".to_string(),
        json!({ "title": [{ "text": { "content": props.name } }] }),
    );
    if let Some(date) = props.date {
        map.insert(
            "Date".to_string(),
            json!({ "date": { "start": date.format("%Y-%m-%d").to_string() } }),
        );
    }
    if !props.tags.is_empty() {
        let names: Vec<Value> = props.tags.iter().map(|t| json!({ "name": t })).collect();
        map.insert("Tags".to_string(), json!({ "multi_select": names }));
    }
    Value::Object(map)
}

/// Body of `POST /v1/pages`.
pub fn create_page(collection: &CollectionId, props: &PageProperties, blocks: &[Block]) -> Value {
    json!({
        "parent": { "database_id": collection.0 },
        "properties": properties(props),
        "children": blocks,
    })
}

/// Body of `POST /v1/databases/{id}/query` for an exact title match.
pub fn title_query(title: &str, cursor: Option<&str>) -> Value {
    let mut body = json!({
        "filter": { "property": "Name", "title": { "equals": title } },
    });
    if let Some(cursor) = cursor {
        body["start_cursor"] = json!(cursor);
    }
    body
}

/// Body of `PATCH /v1/pages/{id}` that archives the page.
pub fn archive() -> Value {
    json!({ "archived": true })
}

#[derive(Debug, Deserialize)]
pub struct PageObject {
    pub id: String,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<PageObject>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// `{"object": "error", "status": 400, "code": "...", "message": "..."}`
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn full_properties() {
        let props = PageProperties {
            name: "Dotfiles stuff".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 27),
            tags: vec!["macos".to_string(), "linux".to_string()],
        };
        assert_eq!(
            properties(&props),
            json!({
                "Name": { "title": [{ "text": { "content": "Dotfiles stuff" } }] },
                "Date": { "date": { "start": "2024-02-27" } },
                "Tags": { "multi_select": [{ "name": "macos" }, { "name": "linux" }] }
            })
        );
    }

    #[test]
    fn date_and_tags_are_omitted_when_absent() {
        let props = PageProperties {
            name: "x".to_string(),
            date: None,
            tags: vec![],
        };
        let value = properties(&props);
        assert!(value.get("Date").is_none());
        assert!(value.get("Tags").is_none());
    }

    #[test]
    fn create_body_nests_blocks_under_children() {
        let props = PageProperties {
            name: "x".to_string(),
            date: None,
            tags: vec![],
        };
        let body = create_page(&CollectionId::from("db1"), &props, &[Block::Divider]);
        assert_eq!(body["parent"]["database_id"], "db1");
        assert_eq!(body["children"][0]["type"], "divider");
    }

    #[test]
    fn query_carries_cursor_only_when_given() {
        assert!(title_query("t", None).get("start_cursor").is_none());
        assert_eq!(title_query("t", Some("c2"))["start_cursor"], "c2");
        assert_eq!(title_query("t", None)["filter"]["title"]["equals"], "t");
    }
}
