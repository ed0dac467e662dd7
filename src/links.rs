use std::collections::BTreeSet;
use url::Url;

/// Normalize a discovered URL for the link set
///
/// Returns `None` for anything that is not http or https. The fragment is
/// dropped so `page#a` and `page#b` collapse to one fetch.
pub fn normalize(url: &Url) -> Option<Url> {
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    Some(normalized)
}

/// Pages discovered for a run, iterated in lexicographic order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSet {
    links: BTreeSet<Url>,
}

impl LinkSet {
    /// Create a link set seeded with the entry URL
    pub fn new(entry_url: &Url) -> Self {
        let mut set = Self {
            links: BTreeSet::new(),
        };
        if !set.insert(entry_url) {
            // Non-http entry URLs would never be navigated anyway, but the
            // entry page is always part of the crawl.
            let mut entry = entry_url.clone();
            entry.set_fragment(None);
            set.links.insert(entry);
        }
        set
    }

    /// Insert a URL after normalization; returns true if it was new
    pub fn insert(&mut self, url: &Url) -> bool {
        match normalize(url) {
            Some(normalized) => self.links.insert(normalized),
            None => {
                ::log::trace!("Ignoring non-http link: {}", url);
                false
            }
        }
    }

    /// Resolve an href against the document it was found in and insert it
    pub fn insert_href(&mut self, base: &Url, href: &str) -> bool {
        let href = href.trim();
        if href.is_empty() {
            return false;
        }
        match base.join(href) {
            Ok(resolved) => self.insert(&resolved),
            Err(e) => {
                ::log::debug!("Could not resolve href '{}' against {}: {}", href, base, e);
                false
            }
        }
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.links.contains(url)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.links.iter()
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a Url;
    type IntoIter = std::collections::btree_set::Iter<'a, Url>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_entry_url_always_present() {
        let set = LinkSet::new(&url("https://a.com/docs/"));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&url("https://a.com/docs/")));
    }

    #[test]
    fn test_fragment_stripped_and_deduplicated() {
        let mut set = LinkSet::new(&url("https://a.com/"));
        assert!(set.insert(&url("https://a.com/x#section")));
        assert!(set.contains(&url("https://a.com/x")));
        assert!(!set.insert(&url("https://a.com/x")));
        assert!(!set.insert(&url("https://a.com/x#other")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_scheme_filtering() {
        let base = url("https://a.com/docs/index.html");
        let mut set = LinkSet::new(&base);
        assert!(!set.insert_href(&base, "mailto:docs@a.com"));
        assert!(!set.insert_href(&base, "javascript:void(0)"));
        assert!(!set.insert_href(&base, "ftp://a.com/file"));
        assert!(!set.insert_href(&base, ""));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_relative_hrefs_resolve_against_base() {
        let base = url("https://a.com/docs/frames/tree.html");
        let mut set = LinkSet::new(&url("https://a.com/docs/"));
        set.insert_href(&base, "../guide/intro.html");
        set.insert_href(&base, "/api?x=1#top");
        set.insert_href(&base, "sibling.html");

        assert!(set.contains(&url("https://a.com/docs/guide/intro.html")));
        assert!(set.contains(&url("https://a.com/api?x=1")));
        assert!(set.contains(&url("https://a.com/docs/frames/sibling.html")));
    }

    #[test]
    fn test_iteration_is_lexicographic() {
        let mut set = LinkSet::new(&url("https://a.com/m"));
        set.insert(&url("https://a.com/z"));
        set.insert(&url("https://a.com/b"));
        set.insert(&url("http://a.com/z"));

        let order: Vec<&str> = set.iter().map(Url::as_str).collect();
        assert_eq!(
            order,
            vec![
                "http://a.com/z",
                "https://a.com/b",
                "https://a.com/m",
                "https://a.com/z"
            ]
        );
    }
}
