//! Asset lookups against a virtual path map.
//!
//! User markup and stylesheets reference images by relative path. The host
//! supplies an [`ImageMap`] from virtual path to a real URL (usually a bundler
//! asset URL or a `data:` URI). Resolution never guesses: a miss returns the
//! original reference untouched.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::path::{is_absolute_url, resolve_path, strip_relative_prefix};

/// Virtual path to URL mapping for images and other static assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageMap(BTreeMap<String, String>);

impl ImageMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one mapping.
    pub fn insert(&mut self, path: impl Into<String>, url: impl Into<String>) -> Option<String> {
        self.0.insert(path.into(), url.into())
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ImageMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Resolve one URL reference.
///
/// Absolute references pass through. Without an image map every reference
/// passes through. Otherwise the reference is normalized (against
/// `base_file` when known, else by [`strip_relative_prefix`]) and looked up.
#[must_use]
pub fn resolve_url<'a>(
    path: &'a str,
    images: Option<&ImageMap>,
    base_file: Option<&str>,
) -> Cow<'a, str> {
    if is_absolute_url(path) {
        return Cow::Borrowed(path);
    }
    let Some(images) = images else {
        return Cow::Borrowed(path);
    };

    let hit = match base_file {
        Some(base) => images.get(&resolve_path(base, path)),
        None => images.get(strip_relative_prefix(path)),
    };

    match hit {
        Some(url) => Cow::Owned(url.to_string()),
        None => Cow::Borrowed(path),
    }
}

/// Resolve every candidate of a responsive `srcset` list.
///
/// Candidates are `URL [descriptor]`; the descriptor (`2x`, `480w`) is kept
/// verbatim. Empty candidates are dropped and the list is re-joined with
/// `", "`.
#[must_use]
pub fn resolve_srcset(srcset: &str, images: Option<&ImageMap>, base_file: Option<&str>) -> String {
    srcset
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(
            |candidate| match candidate.split_once(char::is_whitespace) {
                Some((url, descriptor)) => format!(
                    "{} {}",
                    resolve_url(url, images, base_file),
                    descriptor.trim_start()
                ),
                None => resolve_url(candidate, images, base_file).into_owned(),
            },
        )
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shape of a URL-bearing markup attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlAttributeShape {
    /// One URL (`src`, `href`, `poster`).
    Single,
    /// Comma-separated candidate list (`srcset`).
    CandidateList,
}

impl UrlAttributeShape {
    /// Shape for a given attribute name.
    #[must_use]
    pub fn for_attribute(name: &str) -> Self {
        if name.eq_ignore_ascii_case("srcset") {
            Self::CandidateList
        } else {
            Self::Single
        }
    }

    /// Resolve an attribute value according to its shape.
    #[must_use]
    pub fn resolve<'a>(
        self,
        value: &'a str,
        images: Option<&ImageMap>,
        base_file: Option<&str>,
    ) -> Cow<'a, str> {
        match self {
            Self::Single => resolve_url(value, images, base_file),
            Self::CandidateList => Cow::Owned(resolve_srcset(value, images, base_file)),
        }
    }
}
