use url::Url;

/// Resolves `href` against `base` and returns its canonical form.
///
/// Empty and fragment-only hrefs, references that fail to parse and any scheme
/// other than http/https yield `None`. The fragment is always stripped, so
/// `/page#a` and `/page#b` compare equal afterwards. Hostnames are lowercased
/// and an empty path becomes `/` as part of parsing.
pub fn normalize(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => {}
        _ => return None,
    }

    url.set_fragment(None);
    Some(url)
}

/// Canonical form of an already absolute URL.
pub fn canonicalize(url: &Url) -> Option<Url> {
    normalize(url, url.as_str())
}

/// Checks if `url` lives on the same host and explicit port as `seed`.
/// The scheme is ignored so http and https variants of a site stay internal.
pub fn is_internal(url: &Url, seed: &Url) -> bool {
    url.host_str() == seed.host_str() && url.port() == seed.port()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/blog/post").unwrap()
    }

    #[test]
    fn test_rejects_empty_and_fragment_only() {
        assert_eq!(normalize(&base(), ""), None);
        assert_eq!(normalize(&base(), "   "), None);
        assert_eq!(normalize(&base(), "#top"), None);
    }

    #[test]
    fn test_rejects_non_http_schemes() {
        assert_eq!(normalize(&base(), "mailto:hi@example.com"), None);
        assert_eq!(normalize(&base(), "javascript:void(0)"), None);
        assert_eq!(normalize(&base(), "ftp://example.com/file"), None);
        assert_eq!(normalize(&base(), "tel:+123456"), None);
    }

    #[test]
    fn test_resolves_relative_hrefs() {
        assert_eq!(
            normalize(&base(), "other").unwrap().as_str(),
            "https://example.com/blog/other"
        );
        assert_eq!(
            normalize(&base(), "/about").unwrap().as_str(),
            "https://example.com/about"
        );
        assert_eq!(
            normalize(&base(), "../contact?x=1").unwrap().as_str(),
            "https://example.com/contact?x=1"
        );
        assert_eq!(
            normalize(&base(), "//cdn.example.org/a.png").unwrap().as_str(),
            "https://cdn.example.org/a.png"
        );
    }

    #[test]
    fn test_fragments_are_stripped() {
        let a = normalize(&base(), "/x#a").unwrap();
        let b = normalize(&base(), "/x#b").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fragment(), None);
    }

    #[test]
    fn test_root_gets_trailing_slash() {
        let url = normalize(&base(), "https://EXAMPLE.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "/a/b/../c#frag",
            "https://Example.com:443/path?q=1#x",
            "http://example.com",
            "relative/page.html",
            "  /padded  ",
        ];

        for input in inputs {
            let once = normalize(&base(), input).unwrap();
            let twice = normalize(&once, once.as_str()).unwrap();
            assert_eq!(once, twice, "normalizing {input} twice changed it");
            assert_eq!(canonicalize(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_is_internal_compares_host_and_port() {
        let seed = Url::parse("https://example.com/").unwrap();
        assert!(is_internal(&Url::parse("https://example.com/a").unwrap(), &seed));
        assert!(is_internal(&Url::parse("https://example.com:443/a").unwrap(), &seed));
        assert!(is_internal(&Url::parse("http://example.com/b").unwrap(), &seed));
        assert!(!is_internal(&Url::parse("https://www.example.com/").unwrap(), &seed));
        assert!(!is_internal(&Url::parse("https://example.com:8443/").unwrap(), &seed));
        assert!(!is_internal(&Url::parse("https://other.org/").unwrap(), &seed));
    }
}
