//! HTML → plain text.
//!
//! Parses with an HTML5 parser (never fails on malformed markup), skips
//! non-content subtrees, and normalizes the visible text. Every step is
//! idempotent on already-clean text.

use std::panic;
use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Element;
use scraper::{Html, Node};
use tracing::warn;

static RESIDUAL_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][A-Za-z0-9]*(?:\s[^<>]*)?/?>").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").unwrap());
static BOILERPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(devamını oku\w*|haberin devamı|[iİ]lgili haberler|[iİ]lgili yazılar|tüm hakları saklıdır\.?|abone ol(?:un)?\b|daha fazla göster|reklamı geç|bizi takip edin)",
    )
    .unwrap()
});
/// A single class/id token that names ads, navigation or sharing chrome,
/// either by its leading segment (`ad-slot`, `navbar`) or its trailing one
/// (`site-footer`, `post-share`).
static CHROME_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:ads?|advert\w*|reklam\w*|banner\w*|sponsor\w*|promo\w*|social\w*|share\w*|paylas\w*|breadcrumbs?|related|cookies?|newsletter|nav\w*|menu\w*|sidebar|footer|header-bar)(?:[-_].*)?|.*[-_](?:ads?|reklam|banner|sponsored|social|share|sidebar|footer|menu|nav|navigation|breadcrumbs?|related|newsletter))$",
    )
    .unwrap()
});
/// Modifier tokens on content wrappers (`has-sidebar`, `ad-free`).
static MODIFIER_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:has|with|no)[-_]|[-_]free$").unwrap());

/// Entity decoding repeats at most this often on multiply-escaped input.
const MAX_ENTITY_DEPTH: usize = 4;

const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "canvas", "form", "button",
    "select", "nav", "aside", "footer", "head", "title", "meta", "link",
];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "th",
    "table", "section", "article", "blockquote", "header", "main", "figure", "figcaption", "hr",
    "dd", "dt",
];

/// Clean raw article HTML into a single line of plain text.
pub fn clean_html(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let text = match panic::catch_unwind(|| visible_text(raw)) {
        Ok(text) => text,
        Err(_) => {
            warn!("html parse failed, falling back to tag stripping");
            strip_markup(raw)
        }
    };
    normalize_text(&text)
}

/// Entity decoding, residual-tag stripping, boilerplate removal and
/// whitespace collapse.
pub fn normalize_text(text: &str) -> String {
    let text = decode_all_entities(text);
    let text = RESIDUAL_TAG_RE.replace_all(&text, " ");
    let text = BOILERPLATE_RE.replace_all(&text, " ");
    collapse_whitespace(&text)
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn visible_text(raw: &str) -> String {
    let document = Html::parse_fragment(raw);
    let mut out = String::with_capacity(raw.len() / 2);

    for node in document.tree.root().descendants() {
        match node.value() {
            Node::Element(el) if is_block(el) => out.push(' '),
            Node::Text(text) => {
                let hidden = node
                    .ancestors()
                    .any(|a| a.value().as_element().is_some_and(is_chrome));
                if hidden {
                    continue;
                }
                // "<p>a</p>tail" must not glue "a" and "tail".
                let after_block = node
                    .prev_sibling()
                    .and_then(|s| s.value().as_element().map(is_block))
                    .unwrap_or(false);
                if after_block {
                    out.push(' ');
                }
                out.push_str(text);
            }
            _ => {}
        }
    }
    out
}

fn is_block(el: &Element) -> bool {
    BLOCK_TAGS.contains(&el.name())
}

fn is_chrome(el: &Element) -> bool {
    if SKIPPED_TAGS.contains(&el.name()) {
        return true;
    }
    if el.attr("hidden").is_some() || el.attr("aria-hidden") == Some("true") {
        return true;
    }
    let style_hidden = el
        .attr("style")
        .map(|s| s.replace(' ', "").to_lowercase().contains("display:none"))
        .unwrap_or(false);
    if style_hidden {
        return true;
    }
    ["class", "id", "role"]
        .iter()
        .filter_map(|a| el.attr(a))
        .flat_map(str::split_whitespace)
        .any(is_chrome_token)
}

fn is_chrome_token(token: &str) -> bool {
    !MODIFIER_TOKEN_RE.is_match(token) && CHROME_TOKEN_RE.is_match(token)
}

/// Best-effort text when the parser cannot be used.
fn strip_markup(raw: &str) -> String {
    let no_comments = COMMENT_RE.replace_all(raw, " ");
    RESIDUAL_TAG_RE.replace_all(&no_comments, " ").into_owned()
}

/// Escaped exports often carry `&amp;nbsp;`; decode until nothing changes.
fn decode_all_entities(s: &str) -> String {
    let mut text = s.to_string();
    for _ in 0..MAX_ENTITY_DEPTH {
        let next = decode_entities(&text);
        if next == text {
            break;
        }
        text = next;
    }
    text
}

fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                "ccedil" => Some('ç'),
                "Ccedil" => Some('Ç'),
                "ouml" => Some('ö'),
                "Ouml" => Some('Ö'),
                "uuml" => Some('ü'),
                "Uuml" => Some('Ü'),
                "lsquo" => Some('‘'),
                "rsquo" => Some('’'),
                "ldquo" => Some('“'),
                "rdquo" => Some('”'),
                "laquo" => Some('«'),
                "raquo" => Some('»'),
                "ndash" => Some('–'),
                "mdash" => Some('—'),
                "hellip" => Some('…'),
                "copy" => Some('©'),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_ads_scripts_and_comments() {
        let html = r#"<div class="ad">Reklam</div><!-- yorum --><script>alert(1)</script>
            <style>p{color:red}</style><p>Rüyada   kedi görmek</p><p>hayra işarettir.</p>"#;
        assert_eq!(clean_html(html), "Rüyada kedi görmek hayra işarettir.");
    }

    #[test]
    fn drops_navigation_and_share_blocks() {
        let html = r#"<nav><a href="/">Anasayfa</a></nav>
            <ul class="breadcrumb"><li>Rüya Tabirleri</li></ul>
            <div id="social-share">Paylaş</div>
            <article><p>Asıl metin.</p></article>
            <footer>Tüm hakları saklıdır</footer>"#;
        assert_eq!(clean_html(html), "Asıl metin.");
    }

    #[test]
    fn class_tokens_do_not_match_inside_words() {
        // "shadow" and "lead" contain "ad" but are not ad blocks.
        let html = r#"<div class="shadow"><p class="lead">Rüya tabiri.</p></div>"#;
        assert_eq!(clean_html(html), "Rüya tabiri.");
    }

    #[test]
    fn decodes_entities_and_separates_blocks() {
        let html = "<p>Kuş&nbsp;görmek &amp; uçmak</p><p>ikinci</p>sonra<br>son";
        assert_eq!(clean_html(html), "Kuş görmek & uçmak ikinci sonra son");
    }

    #[test]
    fn malformed_markup_is_best_effort() {
        let html = "<p>Açık kalan <b>etiket <div>ve <i>bozuk</p> yapı";
        let text = clean_html(html);
        assert!(text.contains("Açık kalan"));
        assert!(text.contains("yapı"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn double_escaped_html_is_stripped() {
        let html = "&lt;p&gt;Rüyada balık&lt;/p&gt; görmek";
        assert_eq!(clean_html(html), "Rüyada balık görmek");
    }

    #[test]
    fn removes_boilerplate_phrases() {
        let html = "<p>Rüyada at görmek kuvvettir. Devamını okumak için tıklayın</p><p>İlgili Haberler</p>";
        assert_eq!(clean_html(html), "Rüyada at görmek kuvvettir. için tıklayın");
    }

    #[test]
    fn idempotent_on_plain_text() {
        let plain = "  Rüyada   deniz görmek,\n\tferahlık ve huzura delalet eder.  ";
        let once = clean_html(plain);
        assert_eq!(once, "Rüyada deniz görmek, ferahlık ve huzura delalet eder.");
        assert_eq!(clean_html(&once), once);
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert_eq!(clean_html(""), "");
        assert_eq!(clean_html("   \n "), "");
        assert_eq!(clean_html("<div><span></span></div>"), "");
    }

    #[test]
    fn fallback_strip_markup() {
        let raw = "<p>Su&#287;uk &amp; ekmek</p><!-- x --><br/>son";
        assert_eq!(normalize_text(&strip_markup(raw)), "Suğuk & ekmek son");
    }

    #[test]
    fn escaped_entities_are_decoded_once_and_for_all() {
        let html = "<p>Rüyada&amp;nbsp;fare görmek &amp;quot;bereket&amp;quot; demektir.</p>";
        let once = clean_html(html);
        assert_eq!(once, "Rüyada fare görmek \"bereket\" demektir.");
        assert_eq!(clean_html(&once), once);

        let named = "<p>Ku&amp;amp;ccedil;uk &amp;rsquo;un</p>";
        let once = clean_html(named);
        assert_eq!(once, "Kuçuk ’un");
        assert_eq!(clean_html(&once), once);
    }

    #[test]
    fn modifier_classes_keep_the_article() {
        let body = "<article><p>Rüyada fare görmek bereket ve rızka işarettir.</p></article>";
        for wrapper in [
            r#"<div class="content-area has-sidebar">"#,
            r#"<div class="entry-content ad-free">"#,
            r#"<div id="main-menu-offset">"#,
            r#"<div class="with-share no-ads">"#,
        ] {
            let html = format!("{wrapper}{body}</div>");
            assert_eq!(
                clean_html(&html),
                "Rüyada fare görmek bereket ve rızka işarettir.",
                "{wrapper}"
            );
        }
    }

    #[test]
    fn chrome_tokens_by_leading_or_trailing_segment() {
        for token in ["ad", "ads-wrapper", "navbar", "site-footer", "post_share", "breadcrumbs"] {
            assert!(is_chrome_token(token), "{token}");
        }
        for token in ["shadow", "lead", "adres", "has-sidebar", "ad-free", "main-menu-offset"] {
            assert!(!is_chrome_token(token), "{token}");
        }
    }
}
