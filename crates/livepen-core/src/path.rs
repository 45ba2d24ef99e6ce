//! Virtual path arithmetic.
//!
//! A virtual path is a forward-slash key such as `pages/about/index.html`.
//! Nothing here touches the host filesystem. Resolution never fails: `..`
//! above the root collapses silently and empty segments are kept verbatim.

/// URL schemes that are passed through untouched by asset resolution.
const ABSOLUTE_SCHEMES: [&str; 7] = [
    "http:",
    "https:",
    "data:",
    "blob:",
    "mailto:",
    "tel:",
    "javascript:",
];

/// Resolve `relative` against the directory containing `base_file`.
///
/// The last segment of `base_file` is treated as a file name and dropped.
/// `.` segments are skipped, `..` pops one directory (a no-op at the root),
/// and every other segment, including empty ones, is pushed.
///
/// ```
/// use livepen_core::resolve_path;
///
/// assert_eq!(resolve_path("pages/index.html", "img/a.png"), "pages/img/a.png");
/// assert_eq!(resolve_path("pages/index.html", "../a.png"), "a.png");
/// assert_eq!(resolve_path("index.html", "../../a.png"), "a.png");
/// ```
#[must_use]
pub fn resolve_path(base_file: &str, relative: &str) -> String {
    let mut stack: Vec<&str> = base_file.split('/').collect();
    stack.pop();

    for segment in relative.split('/') {
        match segment {
            "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    stack.join("/")
}

/// Whether `path` is already absolute and must not be looked up.
///
/// Covers root-relative paths (`/x`), protocol-relative URLs (`//host`),
/// in-page fragments (`#id`) and the schemes in [`ABSOLUTE_SCHEMES`]
/// (case-insensitive).
#[must_use]
pub fn is_absolute_url(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('#') {
        return true;
    }
    ABSOLUTE_SCHEMES.iter().any(|scheme| {
        path.len() >= scheme.len()
            && path.is_char_boundary(scheme.len())
            && path[..scheme.len()].eq_ignore_ascii_case(scheme)
    })
}

/// Normalize a relative path when no base file is known.
///
/// Strips one leading `./` and then any number of leading `../`.
#[must_use]
pub fn strip_relative_prefix(path: &str) -> &str {
    let mut rest = path.strip_prefix("./").unwrap_or(path);
    while let Some(stripped) = rest.strip_prefix("../") {
        rest = stripped;
    }
    rest
}

/// Directory part of a virtual file path, without the trailing slash.
#[must_use]
pub fn parent_dir(file: &str) -> &str {
    file.rsplit_once('/').map_or("", |(dir, _)| dir)
}

#[cfg(test)]
mod tests {
    use super::{is_absolute_url, parent_dir, resolve_path, strip_relative_prefix};

    #[test]
    fn resolves_sibling_and_nested_paths() {
        assert_eq!(resolve_path("index.html", "style.css"), "style.css");
        assert_eq!(resolve_path("index.html", "img/logo.png"), "img/logo.png");
        assert_eq!(
            resolve_path("site/pages/index.html", "./img/logo.png"),
            "site/pages/img/logo.png"
        );
    }

    #[test]
    fn parent_segments_pop_directories() {
        assert_eq!(
            resolve_path("site/pages/index.html", "../assets/a.png"),
            "site/assets/a.png"
        );
        assert_eq!(resolve_path("a/b/c/d.css", "../../x.png"), "a/x.png");
    }

    #[test]
    fn parent_segments_collapse_at_root() {
        assert_eq!(resolve_path("index.html", "../a.png"), "a.png");
        assert_eq!(resolve_path("css/site.css", "../../../img/a.png"), "img/a.png");
    }

    #[test]
    fn empty_segments_are_preserved() {
        assert_eq!(resolve_path("index.html", "img//a.png"), "img//a.png");
        assert_eq!(resolve_path("a//index.html", "b.png"), "a//b.png");
    }

    #[test]
    fn root_relative_base_keeps_leading_slash() {
        assert_eq!(resolve_path("/site/index.html", "a.png"), "/site/a.png");
    }

    #[test]
    fn absolute_detection_covers_schemes_and_prefixes() {
        for path in [
            "/img/a.png",
            "//cdn.example.com/a.png",
            "#section",
            "http://example.com/a.png",
            "HTTPS://example.com/a.png",
            "data:image/png;base64,AAAA",
            "blob:https://example.com/1234",
            "mailto:me@example.com",
            "tel:+123",
            "javascript:void(0)",
        ] {
            assert!(is_absolute_url(path), "{path} should be absolute");
        }
        for path in ["img/a.png", "./a.png", "../a.png", "httpx.png", "data.png", ""] {
            assert!(!is_absolute_url(path), "{path} should be relative");
        }
    }

    #[test]
    fn relative_prefix_stripping() {
        assert_eq!(strip_relative_prefix("./img/a.png"), "img/a.png");
        assert_eq!(strip_relative_prefix("../../img/a.png"), "img/a.png");
        assert_eq!(strip_relative_prefix("./../img/a.png"), "img/a.png");
        assert_eq!(strip_relative_prefix("././a.png"), "./a.png");
        assert_eq!(strip_relative_prefix("img/a.png"), "img/a.png");
    }

    #[test]
    fn parent_dir_of_files() {
        assert_eq!(parent_dir("a/b/c.css"), "a/b");
        assert_eq!(parent_dir("c.css"), "");
    }
}
