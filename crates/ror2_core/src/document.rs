use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::core_api::{CoreError, CoreErrorCode};

pub const BASE_CHARACTER: &str = "Characters.Commando";

const NAME_TAG: &str = "name";
const STATS_TAG: &str = "stats";
const UNLOCK_TAG: &str = "unlock";
const COINS_TAG: &str = "coins";
const TOTAL_COINS_TAG: &str = "totalCollectedCoins";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenField {
    Achievements,
    DiscoveredPickups,
}

impl TokenField {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Achievements => "achievementsList",
            Self::DiscoveredPickups => "discoveredPickups",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinField {
    Coins,
    TotalCollected,
}

impl CoinField {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Coins => COINS_TAG,
            Self::TotalCollected => TOTAL_COINS_TAG,
        }
    }
}

/// One parsed profile file. Unlock entries are `<unlock>` elements anywhere
/// in the tree; new ones are only ever added below `<stats>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDocument {
    root: Element,
}

impl ProfileDocument {
    pub fn parse<R: Read>(reader: R) -> Result<Self, CoreError> {
        let root = Element::parse(reader).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("invalid profile document: {e}"))
        })?;
        Ok(Self { root })
    }

    pub fn parse_str(raw: &str) -> Result<Self, CoreError> {
        Self::parse(raw.as_bytes())
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let file = File::open(path)
            .map_err(|e| CoreError::io(format!("failed to open {}: {e}", path.display())))?;
        Self::parse(BufReader::new(file)).map_err(|e| {
            CoreError::new(e.code, format!("{}: {}", path.display(), e.message))
        })
    }

    /// The profile's declared name. `None` when the `<name>` field is missing.
    pub fn display_name(&self) -> Option<String> {
        self.root
            .get_child(NAME_TAG)
            .map(|name| element_text(name).unwrap_or_default())
    }

    pub fn has_stats(&self) -> bool {
        self.root.get_child(STATS_TAG).is_some()
    }

    /// Non-empty unlock tokens in document order.
    pub fn unlocks(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_unlocks(&self.root, &mut out);
        out
    }

    pub fn has_unlock(&self, key: &str) -> bool {
        same_key(key, BASE_CHARACTER) || self.unlocks().iter().any(|u| same_key(u, key))
    }

    /// Appends `<unlock>key</unlock>` under `<stats>`. Returns false when the
    /// document has no `<stats>` container.
    pub fn push_unlock(&mut self, key: &str) -> bool {
        let Some(stats) = self.root.get_mut_child(STATS_TAG) else {
            return false;
        };
        stats.children.push(XMLNode::Element(text_element(UNLOCK_TAG, key)));
        true
    }

    /// Removes the first `<unlock>` below `<stats>` whose token matches `key`
    /// ignoring case.
    pub fn remove_unlock(&mut self, key: &str) -> bool {
        let Some(stats) = self.root.get_mut_child(STATS_TAG) else {
            return false;
        };
        let position = stats.children.iter().position(|node| {
            unlock_token(node).is_some_and(|token| same_key(&token, key))
        });
        match position {
            Some(index) => {
                stats.children.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops every `<unlock>` below `<stats>` whose token fails `keep`.
    /// Entries with empty text are left alone. Returns the number removed.
    pub fn retain_unlocks<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let Some(stats) = self.root.get_mut_child(STATS_TAG) else {
            return 0;
        };
        let before = stats.children.len();
        stats.children.retain(|node| match unlock_token(node) {
            Some(token) => keep(&token),
            None => true,
        });
        before - stats.children.len()
    }

    /// Whitespace separated tokens of a list field, or `None` when the field
    /// is absent.
    pub fn tokens(&self, field: TokenField) -> Option<Vec<String>> {
        self.root
            .get_child(field.tag())
            .map(|element| split_tokens(&element_text(element).unwrap_or_default()))
    }

    /// Replaces a list field's text. Returns false when the field is absent.
    pub fn set_tokens(&mut self, field: TokenField, text: &str) -> bool {
        self.set_field_text(field.tag(), text)
    }

    /// Adds an empty list field to the root when it is missing.
    pub fn ensure_field(&mut self, field: TokenField) {
        if self.root.get_child(field.tag()).is_none() {
            self.root
                .children
                .push(XMLNode::Element(Element::new(field.tag())));
        }
    }

    pub fn coins(&self, field: CoinField) -> Option<i64> {
        self.root
            .get_child(field.tag())
            .and_then(element_text)
            .and_then(|text| text.trim().parse().ok())
    }

    pub fn set_coins(&mut self, field: CoinField, value: i64) -> bool {
        self.set_field_text(field.tag(), &value.to_string())
    }

    /// Serializes the tree and puts `header` in front of it. The tree's own
    /// declaration is never emitted.
    pub fn to_xml_string(&self, header: &str) -> Result<String, CoreError> {
        let config = EmitterConfig::new()
            .perform_indent(false)
            .write_document_declaration(false);
        let mut body = Vec::new();
        self.root
            .write_with_config(&mut body, config)
            .map_err(|e| CoreError::io(format!("failed to serialize profile: {e}")))?;
        let body = String::from_utf8(body).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("serialized profile is not UTF-8: {e}"),
            )
        })?;

        let mut out = String::with_capacity(header.len() + body.len());
        out.push_str(header);
        out.push_str(&body);
        Ok(out)
    }

    fn set_field_text(&mut self, tag: &str, text: &str) -> bool {
        let Some(element) = self.root.get_mut_child(tag) else {
            return false;
        };
        element
            .children
            .retain(|node| !matches!(node, XMLNode::Text(_) | XMLNode::CData(_)));
        if !text.is_empty() {
            element.children.push(XMLNode::Text(text.to_string()));
        }
        true
    }
}

pub fn same_key(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

pub fn split_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(ToOwned::to_owned).collect()
}

/// Sorted, deduplicated, single-space joined.
pub fn join_sorted<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tokens
        .into_iter()
        .map(Into::into)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
}

fn element_text(element: &Element) -> Option<String> {
    element.get_text().map(|text| text.into_owned())
}

fn text_element(name: &str, text: &str) -> Element {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(text.to_string()));
    element
}

fn unlock_token(node: &XMLNode) -> Option<String> {
    match node {
        XMLNode::Element(element) if element.name == UNLOCK_TAG => {
            element_text(element).filter(|text| !text.is_empty())
        }
        _ => None,
    }
}

fn collect_unlocks(element: &Element, out: &mut Vec<String>) {
    for child in &element.children {
        if let Some(token) = unlock_token(child) {
            out.push(token);
        }
        if let XMLNode::Element(inner) = child {
            collect_unlocks(inner, out);
        }
    }
}
