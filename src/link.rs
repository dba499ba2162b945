//! Link target classification

/// Decides whether a link URI leaves the document
pub trait UriClassifier: Send + Sync {
    fn is_external(&self, uri: &str) -> bool;
}

/// A URI is external when it starts with a scheme
/// (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`). Fragment-style
/// targets such as `#page=3` or `#chapter2` stay inside the document.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemeClassifier;

impl UriClassifier for SchemeClassifier {
    fn is_external(&self, uri: &str) -> bool {
        has_scheme(uri)
    }
}

#[must_use]
pub fn has_scheme(uri: &str) -> bool {
    let mut chars = uri.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    for c in chars {
        match c {
            ':' => return true,
            c if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.') => {}
            _ => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_and_mail_links_are_external() {
        let c = SchemeClassifier;
        assert!(c.is_external("https://mupdf.com/"));
        assert!(c.is_external("mailto:someone@example.com"));
        assert!(c.is_external("svn+ssh://host/repo"));
    }

    #[test]
    fn fragments_and_paths_are_internal() {
        let c = SchemeClassifier;
        assert!(!c.is_external("#page=12"));
        assert!(!c.is_external("#nameddest=intro"));
        assert!(!c.is_external("chapter2.xhtml#p4"));
        assert!(!c.is_external(""));
        assert!(!c.is_external("1http://nope"));
    }
}
