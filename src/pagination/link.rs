//! Link header parsing
//!
//! Format: `Link: <https://host/api/v1/repos?page=2>; rel="next", <...>; rel="last"`
//!
//! Link-values whose target is not wrapped in `<...>` are skipped, as are
//! attributes without `=` and unknown `rel` values. When a relation repeats,
//! the last occurrence wins.

use tracing::trace;

/// Pagination relations of a single response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// `rel="first"`
    pub first: Option<String>,
    /// `rel="last"`
    pub last: Option<String>,
    /// `rel="next"`
    pub next: Option<String>,
    /// `rel="prev"`
    pub prev: Option<String>,
}

impl PageLinks {
    /// Parse a `Link` header; an absent header has no links
    pub fn parse(header: Option<&str>) -> Self {
        let mut links = Self::default();
        let Some(header) = header else {
            return links;
        };

        for link_value in header.split(',') {
            let mut segments = link_value.split(';');
            let target = segments.next().unwrap_or_default().trim();

            let Some(uri) = target
                .strip_prefix('<')
                .and_then(|rest| rest.strip_suffix('>'))
            else {
                trace!("Skipping malformed link value: {}", link_value.trim());
                continue;
            };

            for param in segments {
                let Some((key, value)) = param.split_once('=') else {
                    continue;
                };
                if !key.trim().eq_ignore_ascii_case("rel") {
                    continue;
                }
                let rel = value.trim().trim_matches('"').to_ascii_lowercase();
                let slot = match rel.as_str() {
                    "first" => &mut links.first,
                    "last" => &mut links.last,
                    "next" => &mut links.next,
                    "prev" => &mut links.prev,
                    _ => continue,
                };
                *slot = Some(uri.to_string());
            }
        }

        links
    }

    /// Check if no relation was found
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.last.is_none() && self.next.is_none() && self.prev.is_none()
    }

    /// Check if another page follows
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
