//! Property checks for virtual path and URL resolution.

use livepen_core::{ImageMap, is_absolute_url, resolve_path, resolve_url};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,6}"
}

fn dir() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 0..4)
}

fn file_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}\\.(html|css|png)"
}

fn join(parts: &[String]) -> String {
    parts.join("/")
}

fn path_in(dirs: &[String], file: &str) -> String {
    if dirs.is_empty() {
        file.to_string()
    } else {
        format!("{}/{file}", join(dirs))
    }
}

fn scheme_url() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec![
            "http://",
            "https://",
            "data:",
            "blob:",
            "mailto:",
            "tel:",
            "javascript:",
            "#",
            "//",
            "/",
        ]),
        "[a-z0-9./]{0,12}",
    )
        .prop_map(|(scheme, rest)| format!("{scheme}{rest}"))
}

proptest! {
    #[test]
    fn resolution_composes_through_intermediate_files(
        base_dirs in dir(),
        base_file in file_name(),
        rel_dirs in dir(),
        rel_file in file_name(),
        rel2_dirs in dir(),
        rel2_file in file_name(),
    ) {
        let base = path_in(&base_dirs, &base_file);
        let rel = path_in(&rel_dirs, &rel_file);
        let rel2 = path_in(&rel2_dirs, &rel2_file);

        let stepwise = resolve_path(&resolve_path(&base, &rel), &rel2);
        let combined_rel = path_in(&rel_dirs, &rel2);
        let direct = resolve_path(&base, &combined_rel);
        prop_assert_eq!(stepwise, direct);
    }

    #[test]
    fn dot_segments_are_transparent(
        base_dirs in dir(),
        base_file in file_name(),
        rel_dirs in dir(),
        rel_file in file_name(),
    ) {
        let base = path_in(&base_dirs, &base_file);
        let rel = path_in(&rel_dirs, &rel_file);
        let dotted = format!("./{}", rel.replace('/', "/./"));
        prop_assert_eq!(resolve_path(&base, &rel), resolve_path(&base, &dotted));
    }

    #[test]
    fn parent_segments_never_escape_root(ups in 0usize..8, rel_file in file_name()) {
        let rel = format!("{}{rel_file}", "../".repeat(ups));
        prop_assert_eq!(resolve_path("index.html", &rel), rel_file);
    }

    #[test]
    fn absolute_urls_are_fixed_points(url in scheme_url()) {
        let images: ImageMap = [(url.clone(), "blob:replaced".to_string())].into_iter().collect();
        prop_assert!(is_absolute_url(&url));
        let once = resolve_url(&url, Some(&images), Some("pages/index.html")).into_owned();
        let twice = resolve_url(&once, Some(&images), Some("pages/index.html")).into_owned();
        prop_assert_eq!(&once, &url);
        prop_assert_eq!(once, twice);
    }
}
