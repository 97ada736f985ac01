use hjar::{BlockExt, Error, Expiry, Jar, MemoryStore, SameSite};
use std::sync::Arc;
use time::macros::datetime;
use time::Duration;

mod common;

fn uri(s: &str) -> http::Uri {
    s.parse().unwrap()
}

fn fixed_jar() -> (Jar, Arc<hjar::FixedClock>) {
    let (store, clock) = common::fixed_store();
    (Jar::with_store(store), clock)
}

#[test]
fn cookie_simple() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();

    let uri1 = uri("https://some.host.com/path1");
    let uri2 = uri("https://some.host.com/path2");

    jar.set_cookie(&uri1, "Foo=Bar%20Baz; HttpOnly").block()?;

    // check cookies set in /path1 are indeed in the jar
    let cookies = jar.get_cookies(&uri1)?;
    assert!(cookies.len() == 1);
    let cookie = &cookies[0];
    assert_eq!(cookie.key, "Foo");
    assert_eq!(cookie.value, "Bar%20Baz");
    assert!(cookie.http_only);
    assert!(cookie.host_only);

    // default path of "/path1" is "/", so /path2 gets it too
    assert_eq!(jar.cookie_header(&uri2)?.as_deref(), Some("Foo=Bar%20Baz"));

    Ok(())
}

#[test]
fn cookie_for_another_domain() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();

    jar.set_cookie(&uri("https://some.host.com/path1"), "Foo=Bar")
        .block()?;

    assert_eq!(jar.cookie_header(&uri("https://other.host.com/path1"))?, None);
    // host only, so not for sub domains either
    assert_eq!(jar.cookie_header(&uri("https://a.some.host.com/path1"))?, None);

    // a domain attribute for somebody else is refused
    let err = jar
        .set_cookie(&uri("https://some.host.com/"), "Foo=Bar; Domain=other.com")
        .block()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRecord(_)));

    Ok(())
}

#[test]
fn cookie_with_shared_domain() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();

    jar.set_cookie(
        &uri("https://some.host.com/path1"),
        "Foo=Bar%20Baz; Domain=host.com",
    )
    .block()?;

    assert_eq!(
        jar.cookie_header(&uri("https://other.host.com/path2"))?
            .as_deref(),
        Some("Foo=Bar%20Baz")
    );
    assert_eq!(
        jar.cookie_header(&uri("https://host.com/"))?.as_deref(),
        Some("Foo=Bar%20Baz")
    );
    assert_eq!(jar.cookie_header(&uri("https://nothost.com/"))?, None);

    Ok(())
}

#[test]
fn cookie_with_different_path() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();

    jar.set_cookie(&uri("https://some.host.com/path1"), "Foo=Bar; Path=/path1")
        .block()?;

    assert_eq!(jar.cookie_header(&uri("https://some.host.com/path2"))?, None);
    assert_eq!(jar.cookie_header(&uri("https://some.host.com/path10"))?, None);
    assert_eq!(jar.cookie_header(&uri("https://some.host.com/"))?, None);

    Ok(())
}

#[test]
fn cookie_with_matching_path() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();

    jar.set_cookie(&uri("https://some.host.com/path1"), "Foo=Bar; Path=/path1")
        .block()?;

    assert_eq!(
        jar.cookie_header(&uri("https://some.host.com/path1"))?
            .as_deref(),
        Some("Foo=Bar")
    );
    assert_eq!(
        jar.cookie_header(&uri("https://some.host.com/path1/deeper?q=1"))?
            .as_deref(),
        Some("Foo=Bar")
    );

    Ok(())
}

#[test]
fn cookie_values_are_sent_verbatim() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();
    let host = uri("https://example.com/");

    jar.set_cookie(&host, "tok=abc/def+g==").block()?;
    jar.set_cookie(&host, "pct=a%41b").block()?;
    jar.set_cookie(&host, r#"js={"a":1}"#).block()?;

    let mut pairs: Vec<String> = jar
        .cookie_header(&host)?
        .unwrap_or_default()
        .split("; ")
        .map(String::from)
        .collect();
    pairs.sort();
    assert_eq!(pairs, vec![r#"js={"a":1}"#, "pct=a%41b", "tok=abc/def+g=="]);

    let stored = jar.store().get("example.com", "/", "pct")?.unwrap();
    assert_eq!(stored.value, "a%41b");

    Ok(())
}

#[test]
fn cookie_from_public_suffix_host() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();
    let host = uri("https://github.io/");

    let rec = jar.set_cookie(&host, "a=1").block()?;
    assert!(rec.host_only);
    assert_eq!(jar.cookie_header(&host)?.as_deref(), Some("a=1"));
    assert_eq!(jar.cookie_header(&uri("https://user.github.io/"))?, None);

    // naming the suffix as the domain is still refused
    let err = jar
        .set_cookie(&host, "b=2; Domain=github.io")
        .block()
        .unwrap_err();
    assert!(matches!(err, Error::DomainRejected(_)));

    Ok(())
}

#[test]
fn cookie_header_order() -> Result<(), Error> {
    common::setup_logger();

    let (jar, clock) = fixed_jar();
    let host = uri("https://example.com/");

    jar.set_cookie(&host, "root=1; Path=/").block()?;
    clock.advance(Duration::seconds(1));
    jar.set_cookie(&host, "deep=2; Path=/a/b").block()?;
    clock.advance(Duration::seconds(1));
    jar.set_cookie(&host, "mid=3; Path=/a").block()?;
    clock.advance(Duration::seconds(1));
    jar.set_cookie(&host, "late=4; Path=/").block()?;

    assert_eq!(
        jar.cookie_header(&uri("https://example.com/a/b/c"))?
            .as_deref(),
        Some("deep=2; mid=3; root=1; late=4")
    );

    // overwriting keeps the original creation, so "root" stays ahead
    clock.advance(Duration::seconds(1));
    jar.set_cookie(&host, "root=5; Path=/").block()?;
    assert_eq!(
        jar.cookie_header(&uri("https://example.com/"))?.as_deref(),
        Some("root=5; late=4")
    );

    Ok(())
}

#[test]
fn cookie_secure_only_over_https() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();

    jar.set_cookie(&uri("https://example.com/"), "s=1; Secure")
        .block()?;
    jar.set_cookie(&uri("https://example.com/"), "p=2").block()?;

    assert_eq!(
        jar.cookie_header(&uri("http://example.com/"))?.as_deref(),
        Some("p=2")
    );
    let secure = jar.get_cookies(&uri("https://example.com/"))?;
    assert_eq!(secure.len(), 2);

    Ok(())
}

#[test]
fn cookie_expiry() -> Result<(), Error> {
    common::setup_logger();

    let (jar, clock) = fixed_jar();
    let host = uri("https://example.com/");

    let rec = jar.set_cookie(&host, "Foo=Bar; Max-Age=60").block()?;
    assert_eq!(rec.expires, Expiry::At(datetime!(2020-01-01 0:01 UTC)));
    assert_eq!(jar.cookie_header(&host)?.as_deref(), Some("Foo=Bar"));

    clock.advance(Duration::minutes(2));
    assert_eq!(jar.cookie_header(&host)?, None);

    // an already expired cookie deletes the stored one
    clock.set(datetime!(2020-01-01 0:00 UTC));
    jar.set_cookie(&host, "Foo=Bar").block()?;
    jar.set_cookie(&host, "Foo=gone; Expires=Thu, 01 Jan 1970 00:00:00 GMT")
        .block()?;
    assert_eq!(jar.cookie_header(&host)?, None);
    assert!(jar.store().export_all()?.is_empty());

    Ok(())
}

#[test]
fn cookie_public_suffix_domain() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();
    let err = jar
        .set_cookie(&uri("https://www.example.co.uk/"), "Foo=Bar; Domain=co.uk")
        .block()
        .unwrap_err();
    assert!(matches!(err, Error::DomainRejected(_)));

    let mut store = MemoryStore::new();
    store.reject_public_suffixes(false);
    let lenient = Jar::with_store(store);
    lenient
        .set_cookie(&uri("https://www.example.co.uk/"), "Foo=Bar; Domain=co.uk")
        .block()?;
    assert_eq!(
        lenient
            .cookie_header(&uri("https://other.co.uk/"))?
            .as_deref(),
        Some("Foo=Bar")
    );

    Ok(())
}

#[test]
fn cookie_attributes_are_kept() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();
    let rec = jar
        .set_cookie(
            &uri("https://example.com/a/b"),
            "Foo=Bar; SameSite=Strict; HttpOnly",
        )
        .block()?;
    assert_eq!(rec.same_site, SameSite::Strict);
    assert_eq!(rec.path, "/a");
    assert!(rec.path_is_default);
    assert!(rec.http_only);

    let err = jar
        .set_cookie(&uri("https://example.com/"), "no equals sign")
        .block()
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));

    Ok(())
}

#[test]
fn cookie_remove_and_clear() -> Result<(), Error> {
    common::setup_logger();

    let jar = Jar::new();
    let host = uri("https://example.com/");

    jar.set_cookie(&host, "a=1").block()?;
    jar.set_cookie(&host, "b=2").block()?;

    let removed = jar.remove(&host, "a").block()?;
    assert_eq!(removed.map(|r| r.value), Some("1".to_string()));
    assert_eq!(jar.cookie_header(&host)?.as_deref(), Some("b=2"));

    jar.clear().block()?;
    assert_eq!(jar.cookie_header(&host)?, None);

    Ok(())
}

#[cfg(feature = "json")]
#[test]
fn cookie_json_round_trip() -> Result<(), Error> {
    common::setup_logger();

    let (jar, clock) = fixed_jar();
    jar.set_cookie(
        &uri("https://www.example.com/a/b"),
        "Foo=Bar; Domain=example.com; Secure; HttpOnly; SameSite=Lax; Max-Age=3600",
    )
    .block()?;
    clock.advance(Duration::seconds(5));
    jar.set_cookie(&uri("http://__proto__/x"), "k=v").block()?;
    jar.get_cookies(&uri("https://www.example.com/a"))?;

    let json = jar.to_json()?;
    let restored = Jar::from_json(&json)?;

    assert_eq!(
        restored.store().export_all()?,
        jar.store().export_all()?
    );
    assert_eq!(restored.to_json()?, json);

    Ok(())
}

#[cfg(feature = "json")]
#[test]
fn cookie_json_from_lenient_jar() -> Result<(), Error> {
    common::setup_logger();

    let mut store = MemoryStore::new();
    store.reject_public_suffixes(false);
    let lenient = Jar::with_store(store);
    lenient
        .set_cookie(&uri("https://www.example.co.uk/"), "Foo=Bar; Domain=co.uk")
        .block()?;
    let json = lenient.to_json()?;

    // a default jar refuses the public suffix cookie, and loads nothing
    let err = Jar::from_json(&json).unwrap_err();
    assert!(matches!(err, Error::DomainRejected(_)));

    let mut store = MemoryStore::new();
    store.reject_public_suffixes(false);
    let mut loaded = Jar::with_store(store);
    assert_eq!(loaded.load_json(&json)?, 1);
    assert_eq!(loaded.store().export_all()?, lenient.store().export_all()?);

    Ok(())
}
