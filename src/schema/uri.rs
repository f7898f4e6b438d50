//! URI and JSON pointer helpers.
//!
//! Just enough RFC 3986/6901 to merge a base URI with a `$id`/`$ref` and to
//! walk a fragment pointer. Base URIs are often bare schema names such as
//! `"Person"` rather than real URLs, so merging falls back to plain string
//! handling whenever the base does not parse as an absolute URL.

use url::Url;

/// Combine a base URI with a `$ref`/`$id` value.
///
/// - absolute `reference` (has a scheme): replaces `base`
/// - fragment-only `reference` (`#...`): appended to `base` minus its fragment
/// - relative `reference`: resolved against `base`, becoming the new
///   non-fragment portion
pub fn merge_uris(base: &str, reference: &str) -> String {
    if reference.is_empty() {
        return base.to_string();
    }

    if reference.starts_with('#') {
        return format!("{}{}", strip_fragment(base), reference);
    }

    if Url::parse(reference).is_ok() {
        return reference.to_string();
    }

    if let Ok(base_url) = Url::parse(strip_fragment(base)) {
        if let Ok(joined) = base_url.join(reference) {
            return joined.to_string();
        }
    }

    // Non-URL base: swap out its last path segment.
    let base = strip_fragment(base);
    match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], reference),
        None => reference.to_string(),
    }
}

/// The portion of `uri` before any `#`.
pub fn strip_fragment(uri: &str) -> &str {
    match uri.find('#') {
        Some(idx) => &uri[..idx],
        None => uri,
    }
}

/// Split a reference into its address and fragment portions.
///
/// `"other.json#/definitions/a"` → `("other.json", "/definitions/a")`.
/// A reference without `#` is all address.
pub fn split_reference(reference: &str) -> (&str, &str) {
    match reference.find('#') {
        Some(idx) => (&reference[..idx], &reference[idx + 1..]),
        None => (reference, ""),
    }
}

/// Split a JSON pointer into unescaped path segments.
///
/// Accepts both the fragment form (`#/a/b`) and the plain form (`/a/b`).
/// `#`, `#/` and the empty string all address the document root.
pub fn parse_json_pointer(pointer: &str) -> Vec<String> {
    let pointer = pointer.strip_prefix('#').unwrap_or(pointer);
    if pointer.is_empty() || pointer == "/" {
        return Vec::new();
    }

    pointer
        .split('/')
        .skip(1)
        .map(unescape_token)
        .collect()
}

/// Build a fragment pointer (`#/a/b`) from raw segments.
pub fn to_json_pointer<S: AsRef<str>>(segments: &[S]) -> String {
    let mut pointer = String::from("#");
    for segment in segments {
        pointer.push('/');
        pointer.push_str(&escape_token(segment.as_ref()));
    }
    pointer
}

/// `~1` → `/`, then `~0` → `~`.
pub fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// `~` → `~0`, then `/` → `~1`.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Display name fallback taken from the last segment of a `$ref`.
pub fn name_from_ref(reference: &str) -> Option<String> {
    let (address, fragment) = split_reference(reference);

    if let Some(last) = parse_json_pointer(fragment).pop() {
        return Some(last).filter(|s| !s.is_empty());
    }

    address
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
