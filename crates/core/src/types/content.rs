//! Content page records and write payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::ContentId;

/// A content page as shown to the bridge host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: ContentId,
    /// Page name.
    pub label: String,
    /// Storefront path of the page, if it has one.
    pub extract: Option<String>,
}

/// A value that is either plain text or keyed by language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Localized {
    Text(String),
    ByLanguage(BTreeMap<String, String>),
}

impl Localized {
    /// The text for `lang`, falling back to the first available language.
    #[must_use]
    pub fn resolve(&self, lang: Option<&str>) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::ByLanguage(values) => lang
                .and_then(|lang| values.get(lang))
                .or_else(|| values.values().next())
                .map(String::as_str),
        }
    }
}

/// Create/update input for a content page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPayload {
    /// Template name; `homepage` marks the page as the store homepage.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub label: Option<Localized>,
    #[serde(default)]
    pub path: Option<Localized>,
    #[serde(default)]
    pub visible: Option<bool>,
    /// Alias of `visible` used by newer bridge hosts.
    #[serde(default)]
    pub released: Option<bool>,
    #[serde(default)]
    pub parent_id: Option<ContentId>,
    /// Page the new or moved page is placed before.
    #[serde(default)]
    pub next_sibling_id: Option<ContentId>,
}

impl ContentPayload {
    /// Page name: the label, or the template name when there is no label.
    #[must_use]
    pub fn name(&self, lang: Option<&str>) -> Option<String> {
        self.label
            .as_ref()
            .and_then(|label| label.resolve(lang))
            .filter(|label| !label.is_empty())
            .or_else(|| self.template.as_deref())
            .map(str::to_string)
    }

    /// Storefront path, always starting with `/`.
    #[must_use]
    pub fn url(&self, lang: Option<&str>) -> Option<String> {
        let path = self.path.as_ref()?.resolve(lang)?;
        if path.starts_with('/') {
            Some(path.to_string())
        } else {
            Some(format!("/{path}"))
        }
    }

    #[must_use]
    pub fn is_homepage(&self) -> bool {
        self.template.as_deref() == Some("homepage")
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible == Some(true) || self.released == Some(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_plain_payload() {
        let payload: ContentPayload = serde_json::from_value(serde_json::json!({
            "template": "content",
            "label": "About us",
            "visible": true,
            "parentId": 4,
            "nextSiblingId": 9,
        }))
        .unwrap();

        assert_eq!(payload.name(None).as_deref(), Some("About us"));
        assert!(payload.is_visible());
        assert!(!payload.is_homepage());
        assert_eq!(payload.parent_id, Some(ContentId::new(4)));
        assert_eq!(payload.next_sibling_id, Some(ContentId::new(9)));
    }

    #[test]
    fn test_localized_values() {
        let payload: ContentPayload = serde_json::from_value(serde_json::json!({
            "label": {"DE": "Über uns", "EN": "About us"},
            "path": {"DE": "ueber-uns", "EN": "/about-us"},
            "released": true,
        }))
        .unwrap();

        assert_eq!(payload.name(Some("EN")).as_deref(), Some("About us"));
        assert_eq!(payload.name(Some("FR")).as_deref(), Some("Über uns"));
        assert_eq!(payload.url(None).as_deref(), Some("/ueber-uns"));
        assert_eq!(payload.url(Some("EN")).as_deref(), Some("/about-us"));
        assert!(payload.is_visible());
    }

    #[test]
    fn test_name_falls_back_to_template() {
        let payload = ContentPayload {
            template: Some("homepage".to_string()),
            label: Some(Localized::Text(String::new())),
            ..ContentPayload::default()
        };
        assert_eq!(payload.name(None).as_deref(), Some("homepage"));
        assert!(payload.is_homepage());
        assert!(!payload.is_visible());
    }
}
