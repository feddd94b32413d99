//! Syntax conversion: rewrite MediaWiki markup as DokuWiki markup.
//!
//! ## Why ordered passes?
//!
//! The two markup dialects overload the same characters in conflicting ways.
//! MediaWiki's smallest heading is six `=` marks while DokuWiki's smallest is
//! two, so a naive find/replace re-matches its own output and emits eight-mark
//! garbage. DokuWiki uses `//` for italics, so a literal double slash that
//! survives conversion silently italicises the rest of the line. And anything
//! inside `<pre>` must come out byte-for-byte identical, no matter how much it
//! looks like markup.
//!
//! This module therefore applies a fixed sequence of cheap regex/string passes
//! over the page body. Each pass is a pure function (`&str → String`); the only
//! state is a call-scoped store of extracted code blocks, drained before
//! returning. Absence of a match is a no-op for that pass — conversion never
//! fails, malformed markup just passes through unconverted.
//!
//! ## Pass order
//!
//! Order is load-bearing and must not be shuffled:
//!
//! 1. Shield literal `//` runs (before italics exist)
//! 2. Extract `<pre>` blocks to placeholders (un-shielding link interiors first)
//! 3. Headings (largest first, marker-tagged against re-matching)
//! 4. Lists (before bold creates line-leading `**`)
//! 5. `[url text]` → `[url|text]` (inner link structure first)
//! 6. `[link]` → `[[link]]`
//! 7. Bold/italic quotes (longest run first)
//! 8. Talk-page indents → blockquotes
//! 9. `[[Image:…]]` / `[[File:…]]` → `{{…}}` media syntax
//!
//! and finally the stored code blocks are spliced back in.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Prefix for code-block placeholder tokens: `@@mw2doku_code_block_<i>@@`.
///
/// The sentinel is a string no one plausibly types in wiki prose. A page that
/// genuinely contains such a token will be corrupted on restore; this is an
/// accepted (rare) risk, not something solved cryptographically.
const CODE_TOKEN_PREFIX: &str = "@@mw2doku_code_block_";

/// Marker prepended to freshly converted heading lines so a later, shorter
/// heading pattern cannot re-match them. Deliberately distinct from
/// [`CODE_TOKEN_PREFIX`]: by the time headings run, code placeholders are
/// already in the text, and stripping a shared marker would eat their prefix.
const HEADING_MARK: &str = "@@mw2doku_heading@@";

/// Convert one MediaWiki page body to DokuWiki markup.
///
/// Pure function of its input: the protected-block store lives on the call
/// stack, so concurrent conversions of different pages cannot interfere.
/// Never fails; see the module docs for the pass sequence.
pub fn convert_wikitext(record: &str) -> String {
    let mut code_blocks: Vec<String> = Vec::new();

    let s = shield_double_slash(record);
    let s = extract_code_blocks(&s, &mut code_blocks);
    let s = convert_headings(&s);
    let s = convert_lists(&s);
    let s = convert_url_text(&s);
    let s = convert_links(&s);
    let s = convert_bold_italic(&s);
    let s = convert_talks(&s);
    let s = convert_images(&s);

    restore_code_blocks(s, &code_blocks)
}

// ── Pass 1: Shield literal double slashes ────────────────────────────────────

static RE_DOUBLE_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^:])(/{2,})").unwrap());

/// Wrap runs of two or more `/` in `<nowiki>` so DokuWiki renders them
/// literally instead of opening italics. A run immediately preceded by `:` is
/// left alone — that shape is a URL scheme separator (`http://`).
fn shield_double_slash(record: &str) -> String {
    RE_DOUBLE_SLASH
        .replace_all(record, "${1}<nowiki>${2}</nowiki>")
        .to_string()
}

// ── Pass 2: Extract code blocks ──────────────────────────────────────────────

// Shields that landed between `[` and `]` must come back out: URLs inside
// bracketed links keep their literal `//` without help. Greedy `[^\[]*` makes
// each application unwrap the *last* shield in a link, so running it twice
// covers the `[http://a//b http://c//d]` two-URL case.
static RE_LINK_SHIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\[[^\[]*)<nowiki>(/{2,})</nowiki>([^\]]*)").unwrap());

static RE_PRE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<pre>(.*?)</pre>").unwrap());

static RE_SHIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"<nowiki>(/{2,})</nowiki>").unwrap());

// Blank line between two generated code regions; collapsing it merges blocks
// that were only split by accident.
static RE_CODE_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"</code>\n[ \t]*\n<code>").unwrap());

/// Replace every `<pre>…</pre>` region with a `<code>` placeholder and push
/// the raw contents onto `store`. Pass 1 ran over the whole body, so any
/// shields inside the region are stripped before storing — restoration must
/// reproduce the original bytes.
fn extract_code_blocks(record: &str, store: &mut Vec<String>) -> String {
    let repaired = RE_LINK_SHIELD.replace_all(record, "${1}${2}${3}");
    let repaired = RE_LINK_SHIELD.replace_all(&repaired, "${1}${2}${3}");

    let extracted = RE_PRE.replace_all(&repaired, |caps: &Captures<'_>| {
        let raw = RE_SHIELD.replace_all(&caps[1], "${1}").into_owned();
        store.push(raw);
        format!("<code>{CODE_TOKEN_PREFIX}{}@@</code>", store.len() - 1)
    });

    RE_CODE_GAP.replace_all(&extracted, "").into_owned()
}

/// Splice stored code blocks back over their placeholder tokens, in index
/// order. A no-op when the store is empty.
fn restore_code_blocks(mut record: String, store: &[String]) -> String {
    for (i, block) in store.iter().enumerate() {
        let token = format!("{CODE_TOKEN_PREFIX}{i}@@");
        record = record.replace(&token, block);
    }
    record
}

// ── Pass 3: Headings ─────────────────────────────────────────────────────────

// MediaWiki's largest heading is two marks, DokuWiki's is six: the scale is
// inverted, not shifted. Replacing naively would let the `==` pattern re-match
// a line the `======` pattern just produced, so every replacement is tagged
// with HEADING_MARK and the marks are stripped at the end. Largest run first.
static HEADING_RULES: Lazy<[(Regex, String); 5]> = Lazy::new(|| {
    [
        (
            Regex::new(r"(?m)^[ ]*======(.+)======[ \t]*$").unwrap(),
            format!("{HEADING_MARK}==${{1}}=="),
        ),
        (
            Regex::new(r"(?m)^[ ]*=====(.+)=====[ \t]*$").unwrap(),
            format!("{HEADING_MARK}===${{1}}==="),
        ),
        (
            Regex::new(r"(?m)^[ ]*====(.+)====[ \t]*$").unwrap(),
            format!("{HEADING_MARK}====${{1}}===="),
        ),
        (
            Regex::new(r"(?m)^[ ]*===(.+)===[ \t]*$").unwrap(),
            format!("{HEADING_MARK}=====${{1}}====="),
        ),
        (
            Regex::new(r"(?m)^[ ]*==(.+)==[ \t]*$").unwrap(),
            format!("{HEADING_MARK}======${{1}}======"),
        ),
    ]
});

fn convert_headings(record: &str) -> String {
    let mut converted = record.to_string();
    for (re, replacement) in HEADING_RULES.iter() {
        converted = re.replace_all(&converted, replacement.as_str()).into_owned();
    }

    // No headings anywhere: skip the marker churn.
    if converted == record {
        return converted;
    }

    converted.replace(HEADING_MARK, "")
}

// ── Pass 4: Lists ────────────────────────────────────────────────────────────

// Exactly 1–4 leading `*` (unordered) or `#` (ordered) followed by a space.
// Deeper nesting is out of scope and falls through unconverted.
static LIST_RULES: Lazy<[(Regex, &'static str); 8]> = Lazy::new(|| {
    [
        (Regex::new(r"(?m)^\* ").unwrap(), "  * "),
        (Regex::new(r"(?m)^\*{2} ").unwrap(), "    * "),
        (Regex::new(r"(?m)^\*{3} ").unwrap(), "      * "),
        (Regex::new(r"(?m)^\*{4} ").unwrap(), "        * "),
        (Regex::new(r"(?m)^# ").unwrap(), "  - "),
        (Regex::new(r"(?m)^#{2} ").unwrap(), "    - "),
        (Regex::new(r"(?m)^#{3} ").unwrap(), "      - "),
        (Regex::new(r"(?m)^#{4} ").unwrap(), "        - "),
    ]
});

fn convert_lists(record: &str) -> String {
    let mut converted = record.to_string();
    for (re, replacement) in LIST_RULES.iter() {
        converted = re.replace_all(&converted, *replacement).into_owned();
    }
    converted
}

// ── Pass 5: URL-with-caption links ───────────────────────────────────────────

static RE_URL_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\[]|^)(\[[^\] ]*) ([^\]]*\])([^\]]|$)").unwrap());

/// `[url text]` → `[url|text]`. Runs before the bare-bracket pass so the
/// pipe-separated inner structure exists before the outer brackets double.
fn convert_url_text(record: &str) -> String {
    RE_URL_TEXT
        .replace_all(record, "${1}${2}|${3}${4}")
        .to_string()
}

// ── Pass 6: Bare bracket links ───────────────────────────────────────────────

static RE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\[]|^)(\[[^\]]*\])([^\]]|$)").unwrap());

/// `[link]` → `[[link]]`. The surrounding context groups keep spans that are
/// already double-bracketed from being wrapped again.
fn convert_links(record: &str) -> String {
    RE_LINK.replace_all(record, "${1}[${2}]${3}").to_string()
}

// ── Pass 7: Bold and italic ──────────────────────────────────────────────────

static RE_BOLD_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"'''''(.*)'''''").unwrap());

/// Quote runs, longest first so the five-quote form is not half-eaten by the
/// three-quote rule. Asymmetric input (`'''''x'''`) leaves a `**//` seam; the
/// final swap turns it back into valid `//**` nesting.
fn convert_bold_italic(record: &str) -> String {
    let converted = RE_BOLD_ITALIC.replace_all(record, "//**${1}**//");
    converted
        .replace("'''", "**")
        .replace("''", "//")
        .replace("**//", "//**")
}

// ── Pass 8: Talk-page indents ────────────────────────────────────────────────

static RE_TALK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ ]*:").unwrap());

/// Leading `:` indents become `>` blockquote nesting, one escalation step per
/// extra colon. Depths beyond seven fall through with the surplus colons left
/// in place — MediaWiki talk pages deeper than that are not modelled.
fn convert_talks(record: &str) -> String {
    RE_TALK
        .replace_all(record, ">")
        .replace(">:", ">>")
        .replace(">>:", ">>>")
        .replace(">>>:", ">>>>")
        .replace(">>>>:", ">>>>>")
        .replace(">>>>>:", ">>>>>>")
        .replace(">>>>>>:", ">>>>>>>")
}

// ── Pass 9: Images and files ─────────────────────────────────────────────────

static RE_IMAGE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[(Image|File):(.*?)\]\]").unwrap());

static RE_PX: Lazy<Regex> = Lazy::new(|| Regex::new(r"((\d+)x)?(\d+)px").unwrap());

fn convert_images(record: &str) -> String {
    RE_IMAGE_TAG
        .replace_all(record, |caps: &Captures<'_>| convert_image(&caps[2]))
        .to_string()
}

/// Rewrite the interior of one image tag: `filename|options|caption`.
///
/// A sole `link=<target>` option short-circuits to a link wrapping the image.
/// Otherwise alignment options become padding spaces inside the braces, a
/// `px` size token becomes a `?size` suffix, and the last unrecognised token
/// wins as the caption.
fn convert_image(detail: &str) -> String {
    let parts: Vec<&str> = detail.split('|').collect();

    if parts.len() == 2 {
        if let Some(target) = parts[1].strip_prefix("link=") {
            return format!("[[{target}|{{{{wiki:{}}}}}]]", parts[0]);
        }
    }

    if parts.len() == 1 {
        return format!("{{{{wiki:{detail}}}}}");
    }

    let filename = parts[0];
    let mut left_pad = "";
    let mut right_pad = "";
    let mut size = String::new();
    let mut caption = "";

    for part in &parts[1..] {
        match *part {
            "left" => left_pad = " ",
            "right" => right_pad = " ",
            "center" => {
                left_pad = " ";
                right_pad = " ";
            }
            p if p.ends_with("px") => {
                // A malformed px token is swallowed, never treated as caption.
                if let Some(caps) = RE_PX.captures(p) {
                    size = match caps.get(2) {
                        Some(width) => format!("{}x{}", width.as_str(), &caps[3]),
                        None => caps[3].to_string(),
                    };
                }
            }
            p => caption = p,
        }
    }

    let mut converted = format!("{{{{{left_pad}wiki:{filename}{right_pad}");
    if !size.is_empty() {
        converted.push('?');
        converted.push_str(&size);
    }
    if !caption.is_empty() {
        converted.push('|');
        converted.push_str(caption);
    }
    converted.push_str("}}");
    converted
}

// ── Tests ────────────────────────────────────────────────────────────────────
