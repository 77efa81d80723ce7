/// Filmography mining: given a person and the role they played for the seed
/// movie, find their biography article and pull a bounded list of film
/// titles out of its filmography section.
///
/// Title candidates come from three independent passes over the section
/// body, unioned in order of first discovery:
/// 1. table rows carrying a bold link
/// 2. list items carrying a bold link
/// 3. any bracket-link followed by a parenthesized year
use once_cell::sync::Lazy;
use regex::Regex;

use crate::services::{extract, providers::ArticleSource};

const MAX_TITLES: usize = 10;

static TABLE_ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\s*'''\[\[([^\]]+)\]\]'''\s*\|").unwrap());
static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[*#]\s*'''\[\[([^\]]+)\]\]'''").unwrap());
static BRACKET_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]+)\]\][^(]*\((\d{4})\)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Director,
    Actor,
}

impl Role {
    /// Role-specific section heading words, alongside the generic
    /// filmography headings shared by both roles
    fn heading_terms(&self) -> &'static str {
        match self {
            Role::Director => "Director|Directing",
            Role::Actor => "Acting|Actor|Actress",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Director => "director",
            Role::Actor => "actor",
        }
    }
}

/// Mines up to 10 film titles for a person. Best-effort: an unknown person,
/// a missing filmography section, or an upstream failure all yield an empty
/// list, never an error.
pub async fn mine(source: &dyn ArticleSource, person: &str, role: Role) -> Vec<String> {
    match mine_inner(source, person, role).await {
        Ok(titles) => {
            tracing::debug!(
                person = %person,
                role = role.as_str(),
                titles = titles.len(),
                "Filmography mined"
            );
            titles
        }
        Err(e) => {
            tracing::warn!(person = %person, error = %e, "Filmography mining failed");
            Vec::new()
        }
    }
}

async fn mine_inner(
    source: &dyn ArticleSource,
    person: &str,
    role: Role,
) -> crate::error::AppResult<Vec<String>> {
    let hits = source.search(person).await?;
    let Some(first) = hits.first() else {
        return Ok(Vec::new());
    };

    let markup = source.fetch_markup(first.page_id).await?;
    Ok(titles_from_markup(&markup, role))
}

fn titles_from_markup(markup: &str, role: Role) -> Vec<String> {
    let Some(section) = filmography_section(markup, role) else {
        return Vec::new();
    };

    let mut titles: Vec<String> = Vec::new();
    for pass in [&*TABLE_ROW_RE, &*LIST_ITEM_RE, &*BRACKET_YEAR_RE] {
        for caps in pass.captures_iter(&section) {
            let Some(title) = extract::link_target(&caps[1]) else {
                continue;
            };
            if !titles.contains(&title) {
                titles.push(title);
            }
        }
    }

    titles.truncate(MAX_TITLES);
    titles
}

/// Body of the first section whose heading matches the role's heading set
fn filmography_section(markup: &str, role: Role) -> Option<String> {
    let heading = format!(
        r"(?is)==+\s*(?:Film(?:ography|s)|Movies|{})[^=]*==+(.*?)(?:==|$)",
        role.heading_terms()
    );
    let section_re = Regex::new(&heading).expect("filmography heading pattern is valid");
    section_re
        .captures(markup)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchHit;
    use crate::services::providers::MockArticleSource;

    const DIRECTOR_MARKUP: &str = r#"
'''Jane Smith''' is a film director.

== Filmography ==
{| class="wikitable"
|-
| 2016 || '''[[Dangal]]''' || Director
|-
| 2019 || '''[[Chhichhore]]''' || Director
|}
* '''[[Nitesh Tiwari's Ramayana|Ramayana]]'''
The film [[Bawaal]] was released in (2023) to mixed reviews.
[[Dhoom]] followed in (2004).

== Personal life ==
Nothing of note.
"#;

    #[test]
    fn test_union_of_three_passes_in_discovery_order() {
        // The bracket-year pass is leftmost-greedy: its first match runs
        // from the table's [[Dangal]] to the first "(2023)", so only the
        // candidates after that span are new.
        let titles = titles_from_markup(DIRECTOR_MARKUP, Role::Director);
        assert_eq!(
            titles,
            vec!["Dangal", "Chhichhore", "Nitesh Tiwari's Ramayana", "Dhoom"]
        );
    }

    #[test]
    fn test_no_matching_section_returns_empty() {
        let markup = "== Early life ==\nBorn somewhere.\n== Legacy ==\nNone.";
        assert!(titles_from_markup(markup, Role::Director).is_empty());
    }

    #[test]
    fn test_role_specific_heading() {
        let markup = "== Directing ==\n* '''[[First Film]]'''\n== End ==";
        assert_eq!(
            titles_from_markup(markup, Role::Director),
            vec!["First Film"]
        );
        // The same heading is not a filmography for an actor
        assert!(titles_from_markup(markup, Role::Actor).is_empty());
    }

    #[test]
    fn test_namespace_links_filtered() {
        let markup = "== Filmography ==\n* '''[[Dangal#Reception]]'''\n* '''[[Jersey]]'''\n";
        assert_eq!(titles_from_markup(markup, Role::Actor), vec!["Jersey"]);
    }

    #[test]
    fn test_duplicates_collapse_across_passes() {
        let markup =
            "== Filmography ==\n| '''[[Dangal]]''' |\n* '''[[Dangal]]'''\n[[Dangal]] (2016)\n";
        assert_eq!(titles_from_markup(markup, Role::Actor), vec!["Dangal"]);
    }

    #[test]
    fn test_truncated_to_ten() {
        let mut markup = String::from("== Filmography ==\n");
        for i in 0..15 {
            markup.push_str(&format!("* '''[[Movie {}]]'''\n", i));
        }
        assert_eq!(titles_from_markup(&markup, Role::Actor).len(), MAX_TITLES);
    }

    #[tokio::test]
    async fn test_mine_unknown_person_is_empty() {
        let mut source = MockArticleSource::new();
        source.expect_search().returning(|_| Ok(Vec::new()));

        let titles = mine(&source, "Jane Doe", Role::Director).await;
        assert!(titles.is_empty());
    }

    #[tokio::test]
    async fn test_mine_swallows_upstream_failure() {
        let mut source = MockArticleSource::new();
        source.expect_search().returning(|_| {
            Ok(vec![SearchHit {
                page_id: 7,
                title: "Jane Smith".to_string(),
            }])
        });
        source.expect_fetch_markup().returning(|_| {
            Err(crate::error::AppError::ExternalApi(
                "upstream down".to_string(),
            ))
        });

        let titles = mine(&source, "Jane Smith", Role::Director).await;
        assert!(titles.is_empty());
    }

    #[tokio::test]
    async fn test_mine_happy_path() {
        let mut source = MockArticleSource::new();
        source.expect_search().returning(|_| {
            Ok(vec![SearchHit {
                page_id: 7,
                title: "Jane Smith".to_string(),
            }])
        });
        source
            .expect_fetch_markup()
            .returning(|_| Ok(DIRECTOR_MARKUP.to_string()));

        let titles = mine(&source, "Jane Smith", Role::Director).await;
        assert_eq!(titles[0], "Dangal");
        assert_eq!(titles.len(), 4);
    }
}
