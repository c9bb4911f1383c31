use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::ArtworkItem;

pub const EVENT_SELECT_CONTENT: &str = "select_content";
pub const PARAM_ITEM_ID: &str = "item_id";
pub const PARAM_ITEM_NAME: &str = "item_name";
pub const PARAM_ITEM_CATEGORY: &str = "item_category";
pub const PARAM_CONTENT_TYPE: &str = "content_type";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<String>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn select_content(item: &ArtworkItem, category: &str, content_type: &str) -> Self {
        Self::new(EVENT_SELECT_CONTENT)
            .with_property(PARAM_ITEM_ID, item.id.0.to_string())
            .with_property(PARAM_ITEM_NAME, item.title.clone().unwrap_or_default())
            .with_property(PARAM_ITEM_CATEGORY, category)
            .with_property(PARAM_CONTENT_TYPE, content_type)
    }
}
