//! Shared URL/form parsing and fragment helpers for route handlers.

use url::form_urlencoded;

use crate::guard::Navigation;

/// Parse URL-encoded form body into key-value pairs.
/// Handles `key=value&key2=value2` format (from HTMX POST bodies), with `+`
/// as space and percent escapes decoded as UTF-8.
pub fn parse_form_body(body: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(body.as_bytes()).into_owned().collect()
}

/// Parse a query string into key-value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let q = query.strip_prefix('?').unwrap_or(query);
    parse_form_body(q)
}

/// Helper to get a value by key from a list of key-value pairs.
pub fn get_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// HTML checkbox semantics: present and not `false`/`off`/empty.
pub fn is_checked(params: &[(String, String)], key: &str) -> bool {
    matches!(get_param(params, key), Some(v) if !matches!(v, "" | "false" | "off" | "0"))
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Quote a string as a JavaScript string literal (JSON is a subset), with
/// `<` escaped so it cannot close the surrounding `<script>`.
pub fn js_string(input: &str) -> String {
    serde_json::to_string(input)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
}

/// Script that sends the browser to `url` immediately.
pub fn redirect_to_url(url: &str) -> String {
    format!(
        "<script>window.location.assign({});</script>",
        js_string(url)
    )
}

/// Script that sends the browser to a client-side view.
pub fn navigate(to: Navigation) -> String {
    redirect_to_url(to.path())
}

/// Script that sends the browser to a client-side view after `delay_ms`.
pub fn navigate_after(to: Navigation, delay_ms: u32) -> String {
    format!(
        "<script>setTimeout(function() {{ window.location.assign({}); }}, {});</script>",
        js_string(to.path()),
        delay_ms
    )
}

pub fn error_message(message: &str) -> String {
    format!(
        r#"<div class="mb-4 text-red-600 text-center">{}</div>"#,
        escape_html(message)
    )
}

pub fn success_message(message: &str) -> String {
    format!(
        r#"<div class="mb-4 text-green-600 text-center">{}</div>"#,
        escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_form_body_works() {
        let pairs = parse_form_body("email=p%40example.com&password=hunter22&remember=on");
        assert_eq!(pairs.len(), 3);
        assert_eq!(get_param(&pairs, "email"), Some("p@example.com"));
        assert_eq!(get_param(&pairs, "password"), Some("hunter22"));
        assert!(is_checked(&pairs, "remember"));
    }

    #[test]
    fn parse_form_body_empty() {
        assert!(parse_form_body("").is_empty());
        assert!(parse_form_body("&&").is_empty());
    }

    #[test]
    fn form_values_decode_plus_and_utf8() {
        let pairs = parse_form_body("username=Ren%C3%A9e+B&note=100%25");
        assert_eq!(get_param(&pairs, "username"), Some("Renée B"));
        assert_eq!(get_param(&pairs, "note"), Some("100%"));
    }

    #[test]
    fn form_values_keep_malformed_escapes() {
        let pairs = parse_form_body("a=100%zz&b=50%");
        assert_eq!(get_param(&pairs, "a"), Some("100%zz"));
        assert_eq!(get_param(&pairs, "b"), Some("50%"));
    }

    #[test]
    fn parse_query_strips_prefix() {
        let pairs = parse_query("?provider=google");
        assert_eq!(get_param(&pairs, "provider"), Some("google"));
    }

    #[test]
    fn checkbox_values() {
        let pairs = parse_form_body("a=on&b=false&c=&d=true");
        assert!(is_checked(&pairs, "a"));
        assert!(!is_checked(&pairs, "b"));
        assert!(!is_checked(&pairs, "c"));
        assert!(is_checked(&pairs, "d"));
        assert!(!is_checked(&pairs, "missing"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn js_string_cannot_close_script() {
        assert_eq!(js_string("</script>"), r#""\u003c/script>""#);
    }

    #[test]
    fn navigation_scripts() {
        assert_eq!(
            navigate(Navigation::Login),
            r#"<script>window.location.assign("/login");</script>"#
        );
        let delayed = navigate_after(Navigation::Game, 2000);
        assert!(delayed.contains("setTimeout"));
        assert!(delayed.contains(r#"assign("/")"#));
        assert!(delayed.contains("2000"));
    }
}
