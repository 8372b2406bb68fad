/// XML Schema namespace (`xs:` prefix).
pub const XS: &str = "http://www.w3.org/2001/XMLSchema";
/// XPath functions namespace (`fn:` prefix).
pub const FNS: &str = "http://www.w3.org/2005/xpath-functions";
/// W3C error code namespace (`err:` prefix).
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefixes every static context binds implicitly.
pub(crate) fn reserved_namespace(prefix: &str) -> Option<&'static str> {
    match prefix {
        "xml" => Some(XML_URI),
        "xs" => Some(XS),
        "fn" => Some(FNS),
        "err" => Some(ERR_NS),
        _ => None,
    }
}
