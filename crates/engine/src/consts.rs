use regex::Regex;
use std::sync::LazyLock;

/// Schemes that are never rewritten, in the order they are checked.
pub const DEFAULT_NON_HTTP_SCHEMES: &[&str] = &["mailto", "tel", "ftp", "res", "skype", "ssh"];

/// Matches the tokens the engine itself emits, so a second pass over
/// rewritten content leaves them alone.
pub const DEFAULT_IGNORE_MARKER: &str = r"^\[(?:content_link|asset_link)|^/?assets/";

/// Shortcode emitted for a resolved content reference.
pub const CONTENT_LINK_SHORTCODE: &str = "content_link";

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(IGNORE_MARKER_REGEX, DEFAULT_IGNORE_MARKER);
regex!(
    FAILURE_LINE_REGEX,
    r"^(Couldn't rewrite|Missing asset): (.*?) Found in Page: (.*) \(ID:(\d+)\)$"
);
