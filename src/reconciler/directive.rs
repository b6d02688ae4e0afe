use url::Url;

use crate::ReconcileError;

/// Parsed form of the `resultKey=url` annotation value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Key under which the fetched body is written into `data`
    pub result_key: String,
    /// Resolved fetch target; a missing scheme defaults to `https`
    pub url: Url,
}

impl Directive {
    /// Parses an annotation value. Exactly one `=` splitting the value into
    /// two non-empty segments is well-formed; anything else is a format
    /// error.
    pub fn parse(raw: &str) -> std::result::Result<Self, ReconcileError> {
        let mut parts = raw.split('=');
        let (key, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) if !key.is_empty() && !value.is_empty() => (key, value),
            _ => {
                return Err(ReconcileError::MalformedDirective {
                    raw: raw.to_string(),
                })
            }
        };

        let url = parse_with_default_scheme(value).map_err(|_| ReconcileError::InvalidUrl {
            raw: value.to_string(),
        })?;

        Ok(Self {
            result_key: key.to_string(),
            url,
        })
    }
}

/// Values without an explicit scheme are fetched over https.
fn parse_with_default_scheme(raw: &str) -> std::result::Result<Url, url::ParseError> {
    if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("https://{raw}"))
    }
}
