/// Genre-list mining: locate the canonical "List of {genre} films" article
/// and sample a handful of titles from it.
///
/// List entries are preferred; table cells only top the pool up when the
/// list pass comes back thin. The pool is shuffled before the final cut so
/// repeat requests don't always surface the same alphabetically-first
/// titles; the random source is injected by the caller.
use once_cell::sync::Lazy;
use rand::{seq::SliceRandom, Rng};
use regex::Regex;

use crate::services::{extract, providers::ArticleSource};

const POOL_CAP: usize = 30;
const LIST_PASS_TARGET: usize = 20;
const SAMPLE_SIZE: usize = 10;

static LIST_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[*#]\s*'*\[\[([^\]]+?)(?:\|[^\]]+)?\]\]'*").unwrap());
static TABLE_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\s*'*\[\[([^\]]+?)(?:\|[^\]]+)?\]\]'*").unwrap());

/// Mines up to 10 titles for a genre, uniformly sampled from the candidate
/// pool. Best-effort: unknown genre pages and upstream failures yield an
/// empty list, never an error.
pub async fn mine<R: Rng>(source: &dyn ArticleSource, genre: &str, rng: &mut R) -> Vec<String> {
    let pool = match pool_for_genre(source, genre).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(genre = %genre, error = %e, "Genre list mining failed");
            return Vec::new();
        }
    };

    tracing::debug!(genre = %genre, pool = pool.len(), "Genre candidate pool mined");
    sample(pool, rng)
}

async fn pool_for_genre(
    source: &dyn ArticleSource,
    genre: &str,
) -> crate::error::AppResult<Vec<String>> {
    let hits = source.search(&format!("List of {} films", genre)).await?;
    let Some(first) = hits.first() else {
        return Ok(Vec::new());
    };

    let markup = source.fetch_markup(first.page_id).await?;
    Ok(candidate_pool(&markup))
}

fn candidate_pool(markup: &str) -> Vec<String> {
    let mut pool: Vec<String> = Vec::new();

    for caps in LIST_ENTRY_RE.captures_iter(markup) {
        push_candidate(&mut pool, &caps[1]);
        if pool.len() >= POOL_CAP {
            break;
        }
    }

    if pool.len() < LIST_PASS_TARGET {
        for caps in TABLE_CELL_RE.captures_iter(markup) {
            push_candidate(&mut pool, &caps[1]);
            if pool.len() >= POOL_CAP {
                break;
            }
        }
    }

    pool
}

fn push_candidate(pool: &mut Vec<String>, raw: &str) {
    let Some(title) = extract::link_target(raw) else {
        return;
    };
    if !pool.contains(&title) {
        pool.push(title);
    }
}

fn sample<R: Rng>(mut pool: Vec<String>, rng: &mut R) -> Vec<String> {
    pool.shuffle(rng);
    pool.truncate(SAMPLE_SIZE);
    pool
}
