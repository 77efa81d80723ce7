/// Pure field extraction from encyclopedia article markup.
///
/// Each field is derived independently: a malformed or missing field never
/// affects the others, and nothing here touches the network. Image
/// resolution stops at the referenced filename; turning it into a URL is
/// the caller's job.
use once_cell::sync::Lazy;
use regex::Regex;

static RELEASE_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\s*release_date\s*=\s*\{\{[^\n]*?(\d{4})").unwrap());
static GENRE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\|\s*genre\s*=\s*([^\n]+)").unwrap());
static DIRECTOR_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\|\s*director\s*=\s*([^\n]+)").unwrap());
static STARRING_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\|\s*starring\s*=\s*([^\n]+)").unwrap());
static IMAGE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\s*image\s*=\s*([^|\n]+)").unwrap());
static BRACKET_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());
static DELIMITER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",|\{\{|\}\}|\|").unwrap());

/// Canonical genre vocabulary for the summary-text fallback
const GENRE_VOCAB: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Biography",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "Film-Noir",
    "History",
    "Horror",
    "Musical",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Sport",
    "Thriller",
    "War",
    "Western",
];

static GENRE_VOCAB_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = GENRE_VOCAB.join("|");
    Regex::new(&format!(r"(?i)\b({})\b", alternation)).unwrap()
});

/// Maximum description length including the truncation marker
const DESCRIPTION_LIMIT: usize = 300;
const ELLIPSIS: &str = "...";

/// All fields extractable from one article, minus the title
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub year: Option<String>,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    pub image_file: Option<String>,
    pub description: String,
}

/// Extracts every structured field from raw markup and the plain-text
/// summary. Missing fields default to `None`/empty, never an error.
pub fn extract(markup: &str, summary: &str) -> ExtractedFields {
    ExtractedFields {
        year: release_year(markup),
        genres: genres(markup, summary),
        directors: name_list(markup, &DIRECTOR_LINE_RE),
        actors: name_list(markup, &STARRING_LINE_RE),
        image_file: image_filename(markup),
        description: truncate_description(summary),
    }
}

/// First 4-digit year inside the release-date template line
pub fn release_year(markup: &str) -> Option<String> {
    RELEASE_YEAR_RE
        .captures(markup)
        .map(|caps| caps[1].to_string())
}

/// Genres from the `genre =` field line, with a vocabulary scan over the
/// summary text when the field is entirely absent
pub fn genres(markup: &str, summary: &str) -> Vec<String> {
    if let Some(line) = field_line(markup, &GENRE_LINE_RE) {
        let linked = bracket_targets(line);
        if !linked.is_empty() {
            return linked;
        }
        return delimiter_tokens(line);
    }
    vocabulary_genres(summary)
}

fn name_list(markup: &str, line_re: &Regex) -> Vec<String> {
    let Some(line) = field_line(markup, line_re) else {
        return Vec::new();
    };
    let linked = bracket_targets(line);
    if !linked.is_empty() {
        return linked;
    }
    delimiter_tokens(line)
}

/// Filename referenced by the `image =` field line
pub fn image_filename(markup: &str) -> Option<String> {
    IMAGE_LINE_RE
        .captures(markup)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Summary verbatim, truncated to 297 chars plus `...` when longer than 300
pub fn truncate_description(summary: &str) -> String {
    if summary.chars().count() <= DESCRIPTION_LIMIT {
        return summary.to_string();
    }
    let mut truncated: String = summary
        .chars()
        .take(DESCRIPTION_LIMIT - ELLIPSIS.len())
        .collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Strips the trailing ` (film)` disambiguation suffix from an article title
pub fn strip_film_suffix(title: &str) -> String {
    title.strip_suffix(" (film)").unwrap_or(title).to_string()
}

fn field_line<'a>(markup: &'a str, line_re: &Regex) -> Option<&'a str> {
    line_re
        .captures(markup)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `[[Target|Display]]` entries in order, keeping `Target`
fn bracket_targets(text: &str) -> Vec<String> {
    BRACKET_LINK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let target = caps[1].split('|').next().unwrap_or("").trim();
            (!target.is_empty()).then(|| target.to_string())
        })
        .collect()
}

/// Comma/template/pipe-separated tokens, keeping those that look like
/// values rather than template-syntax fragments
fn delimiter_tokens(text: &str) -> Vec<String> {
    DELIMITER_RE
        .split(text)
        .map(str::trim)
        .filter(|token| token.len() > 2 && !token.contains('='))
        .map(str::to_string)
        .collect()
}

/// `Target` part of a bracket-link inner text as mined from article body
/// sections. Rejects empty targets and namespace-marked links (`#`).
pub(crate) fn link_target(raw: &str) -> Option<String> {
    let target = raw.split('|').next().unwrap_or("").trim();
    if target.is_empty() || target.contains('#') {
        return None;
    }
    Some(target.to_string())
}

/// Whole-word vocabulary matches over the summary, deduplicated in order of
/// first occurrence and reported with canonical casing
fn vocabulary_genres(summary: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for found in GENRE_VOCAB_RE.find_iter(summary) {
        let canonical = GENRE_VOCAB
            .iter()
            .find(|genre| genre.eq_ignore_ascii_case(found.as_str()));
        if let Some(&genre) = canonical {
            if !seen.iter().any(|s: &String| s == genre) {
                seen.push(genre.to_string());
            }
        }
    }
    seen
}
