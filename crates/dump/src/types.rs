use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contents of the `<siteinfo>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub site_name: String,
    pub base: String,
    pub generator: String,
    pub case: String,
}

/// Namespace table from `<siteinfo>`, keyed both ways.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
    names: BTreeMap<i32, String>,
    keys: HashMap<String, i32>,
}

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` under `name`. The main namespace has an empty name.
    pub fn insert(&mut self, key: i32, name: impl Into<String>) {
        let name = name.into();
        if let Some(old) = self.names.insert(key, name.clone()) {
            self.keys.remove(&old);
        }
        self.keys.insert(name, key);
    }

    pub fn name(&self, key: i32) -> Option<&str> {
        self.names.get(&key).map(String::as_str)
    }

    pub fn key(&self, name: &str) -> Option<i32> {
        self.keys.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> + '_ {
        self.names.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Splits `Prefix:Rest` into the namespace key and the bare title when
    /// `Prefix` names a known namespace. Anything else, including titles
    /// with an unknown prefix, is namespace 0 with the title unchanged.
    ///
    /// ```
    /// use dump::Namespaces;
    ///
    /// let mut ns = Namespaces::new();
    /// ns.insert(0, "");
    /// ns.insert(1, "Talk");
    /// assert_eq!(ns.split_title("Talk:Apple"), (1, "Apple"));
    /// assert_eq!(ns.split_title("Apple: a fruit"), (0, "Apple: a fruit"));
    /// ```
    pub fn split_title<'t>(&self, title: &'t str) -> (i32, &'t str) {
        if let Some((prefix, rest)) = title.split_once(':') {
            if !prefix.is_empty() {
                if let Some(key) = self.key(prefix) {
                    return (key, rest);
                }
            }
        }
        (0, title)
    }
}

/// Page-level fields that precede the first revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: u64,
    pub title: String,
    /// Explicit `<ns>` element, present in newer schemas.
    pub namespace: Option<i32>,
    /// Target of `<redirect title="..."/>`.
    pub redirect: Option<String>,
}

impl Page {
    /// Namespace key and bare title. An explicit `<ns>` wins over the
    /// title prefix; its prefix is stripped when it matches.
    pub fn namespace_and_title<'p>(&'p self, namespaces: &Namespaces) -> (i32, &'p str) {
        match self.namespace {
            Some(0) => (0, self.title.as_str()),
            Some(key) => {
                let bare = namespaces
                    .name(key)
                    .and_then(|name| self.title.strip_prefix(name))
                    .and_then(|rest| rest.strip_prefix(':'))
                    .unwrap_or(self.title.as_str());
                (key, bare)
            }
            None => namespaces.split_title(&self.title),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// Registered user id; anonymous editors have none.
    pub id: Option<u64>,
    pub username: Option<String>,
    pub ip: Option<String>,
}

impl Contributor {
    /// Username, falling back to the IP for anonymous edits.
    pub fn display_name(&self) -> Option<&str> {
        self.username.as_deref().or(self.ip.as_deref())
    }
}

/// One `<revision>`. Suppressed fields (`deleted="deleted"`) come out as
/// `None`, or as empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub timestamp: DateTime<Utc>,
    pub contributor: Option<Contributor>,
    pub minor: bool,
    pub comment: Option<String>,
    pub text: String,
}
