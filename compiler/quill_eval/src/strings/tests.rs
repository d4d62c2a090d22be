#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_plain_and_verbatim() {
    assert_eq!(decode(r#""hello""#).unwrap(), "hello");
    assert_eq!(decode(r#"@"C:\temp\""x""""#).unwrap(), r#"C:\temp\"x""#);
    assert_eq!(decode(r#""""#).unwrap(), "");
}

#[test]
fn test_simple_escapes() {
    assert_eq!(decode(r#""a\tb\nc""#).unwrap(), "a\tb\nc");
    assert_eq!(decode(r#""\\ \" \'""#).unwrap(), "\\ \" '");
    assert_eq!(decode(r#""\q""#).unwrap(), "q");
}

#[test]
fn test_code_point_escapes() {
    assert_eq!(decode(r#""\u:0041B""#).unwrap(), "AB");
    assert_eq!(decode(r#""\x:41-""#).unwrap(), "A-");
    assert_eq!(decode(r#""\101\0""#).unwrap(), "A\0");
}

#[test]
fn test_invalid_literals() {
    assert!(decode(r#""\u41""#).is_err());
    assert!(decode(r#""\u:41""#).is_err());
    assert!(decode("nope").is_err());
    assert!(decode(r#""trailing\""#).is_err());
}

#[test]
fn test_directives() {
    assert_eq!(
        Directive::parse("@@TYPESAFETY OFF"),
        Some(Directive::TypeSafety(false))
    );
    assert_eq!(
        Directive::parse("  @@typesafety   on "),
        Some(Directive::TypeSafety(true))
    );
    assert_eq!(
        Directive::parse("@@LazyInvokation ON"),
        Some(Directive::InlineCache(true))
    );
    assert_eq!(Directive::parse("@@TYPESAFETY MAYBE"), None);
    assert_eq!(Directive::parse("hello world"), None);
    assert_eq!(Directive::parse("@@TYPESAFETY OFF now"), None);
}
