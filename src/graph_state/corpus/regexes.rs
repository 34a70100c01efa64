
// NOTE about namespaces:
//  Only the main namespace holds real articles; File:, Category:, User: etc.
//  pages and link targets all carry a `:`. Rather than model namespaces we
//  refuse to match anything containing one, which keeps the title table and
//  the link table main-namespace-only.

pub fn title_regex() -> String {
    // a namespaced title never matches, so the page stays untitled
    // and is dropped at the closing marker
    String::from(r"<title>([^:]*)</title>")
}

pub fn redirect_regex() -> String {
    // the marker names the redirect target but its presence is all we need
    String::from(r"<redirect title=")
}

pub fn page_end_regex() -> String {
    String::from(r"</page>")
}

pub fn link_regex() -> String {
    // [[target]] or [[target|display text]]; the capture is the whole span
    // and the target is everything before the first `|`
    String::from(r"\[\[([^:\[\]]*)\]\]")
}
