pub(crate) trait UriExt {
    /// The request host, normalized for cookie matching.
    fn cookie_host(&self) -> Option<String>;
    /// The request path, "/" when the uri has none.
    fn cookie_path(&self) -> &str;
    /// Tell if this URI is using a secure protocol (i.e. https).
    fn is_secure(&self) -> bool;
}

impl UriExt for http::Uri {
    fn cookie_host(&self) -> Option<String> {
        let host = self.host()?.trim_end_matches('.');
        if host.is_empty() {
            return None;
        }
        Some(host.to_ascii_lowercase())
    }

    fn cookie_path(&self) -> &str {
        let path = self.path();
        if path.is_empty() {
            "/"
        } else {
            path
        }
    }

    fn is_secure(&self) -> bool {
        matches!(self.scheme_str(), Some("https") | Some("wss"))
    }
}
