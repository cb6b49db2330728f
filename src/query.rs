use url::{form_urlencoded, Url};

use crate::Result;

/// Merges query pairs into an address.
///
/// Pairs already present in `addr`'s query string are preserved; the supplied
/// pairs are appended after them. `addr` must be an absolute URL.
///
/// Example: `addr = "https://api.example/?name=jack"` and
/// `queries = [("age", "18")]` merge to
/// `https://api.example/?name=jack&age=18`.
pub(crate) fn merge_queries(addr: &str, queries: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(addr)?;
    if !queries.is_empty() {
        url.query_pairs_mut().extend_pairs(queries);
    }
    Ok(url)
}

/// Encodes a value multimap as an `application/x-www-form-urlencoded` body.
pub(crate) fn encode_form(values: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(values)
        .finish()
}
