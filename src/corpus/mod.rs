//! Movie corpus loading.
//!
//! Reads the TMDB 5000 movies CSV, drops rows that are malformed or missing
//! required fields, and assembles each surviving row's `tags` string.
use std::{fs::File, io::Read, path::Path};

use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieId},
};

/// Which fields are joined into a movie's tags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPolicy {
    /// Genre and keyword names
    #[default]
    GenresKeywords,
    /// Genre and keyword names followed by the overview text
    WithOverview,
}

/// One `{ "id": .., "name": .. }` entry of a genres/keywords column
#[derive(Debug, Deserialize)]
struct NamedEntity {
    name: String,
}

/// Raw CSV row. Columns other than these are ignored.
#[derive(Debug, Deserialize)]
struct MovieRow {
    #[serde(alias = "id")]
    movie_id: MovieId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
    #[serde(default)]
    tags: Option<String>,
}

/// Why a row was left out of the corpus
#[derive(Debug, PartialEq, Eq)]
enum RowRejection {
    Missing(&'static str),
    Malformed(&'static str),
    BlankTags,
}

/// Counts reported after a load
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub malformed: usize,
    pub incomplete: usize,
}

/// Loads movies from a CSV file on disk
pub fn load_movies(path: impl AsRef<Path>, policy: TagPolicy) -> AppResult<Vec<Movie>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        AppError::Corpus(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let (movies, report) = load_movies_from_reader(file, policy)?;

    tracing::info!(
        path = %path.display(),
        loaded = report.loaded,
        malformed = report.malformed,
        incomplete = report.incomplete,
        "Corpus loaded"
    );

    Ok(movies)
}

/// Loads movies from any CSV source, keeping file order
pub fn load_movies_from_reader<R: Read>(
    reader: R,
    policy: TagPolicy,
) -> AppResult<(Vec<Movie>, LoadReport)> {
    // Rows whose field count differs from the header fail with `UnequalLengths`
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::Corpus(format!("Failed to read CSV header: {}", e)))?
        .clone();
    if !headers.iter().any(|h| h == "movie_id" || h == "id") {
        return Err(AppError::Corpus(
            "CSV header has no movie_id or id column".to_string(),
        ));
    }

    let mut movies = Vec::new();
    let mut report = LoadReport::default();

    for (line, record) in csv_reader.records().enumerate() {
        let row: MovieRow = match record.and_then(|r| r.deserialize(Some(&headers))) {
            Ok(row) => row,
            Err(e) => {
                tracing::debug!(line = line + 2, error = %e, "Skipping malformed CSV row");
                report.malformed += 1;
                continue;
            }
        };

        match movie_from_row(row, policy) {
            Ok(movie) => movies.push(movie),
            Err(RowRejection::Malformed(field)) => {
                tracing::debug!(line = line + 2, field, "Skipping row with unparsable field");
                report.malformed += 1;
            }
            Err(rejection) => {
                tracing::debug!(line = line + 2, reason = ?rejection, "Skipping incomplete row");
                report.incomplete += 1;
            }
        }
    }

    report.loaded = movies.len();
    if report.malformed + report.incomplete > 0 {
        tracing::warn!(
            malformed = report.malformed,
            incomplete = report.incomplete,
            "Some corpus rows were skipped"
        );
    }

    Ok((movies, report))
}

fn movie_from_row(row: MovieRow, policy: TagPolicy) -> Result<Movie, RowRejection> {
    let title = non_blank(row.title).ok_or(RowRejection::Missing("title"))?;

    let tags = match non_blank(row.tags) {
        Some(tags) => tags,
        None => assemble_tags(row.genres, row.keywords, row.overview, policy)?,
    };

    if tags.trim().is_empty() {
        return Err(RowRejection::BlankTags);
    }

    Ok(Movie {
        id: row.movie_id,
        title,
        tags,
    })
}

fn assemble_tags(
    genres: Option<String>,
    keywords: Option<String>,
    overview: Option<String>,
    policy: TagPolicy,
) -> Result<String, RowRejection> {
    let genres = non_blank(genres).ok_or(RowRejection::Missing("genres"))?;
    let keywords = non_blank(keywords).ok_or(RowRejection::Missing("keywords"))?;

    let mut parts = entity_names(&genres).ok_or(RowRejection::Malformed("genres"))?;
    parts.extend(entity_names(&keywords).ok_or(RowRejection::Malformed("keywords"))?);

    if policy == TagPolicy::WithOverview {
        parts.push(non_blank(overview).ok_or(RowRejection::Missing("overview"))?);
    }

    Ok(parts.join(" "))
}

/// Names from a JSON list of named entities, e.g. `[{"id": 28, "name": "Action"}]`
fn entity_names(raw: &str) -> Option<Vec<String>> {
    let entities: Vec<NamedEntity> = serde_json::from_str(raw).ok()?;
    Some(entities.into_iter().map(|entity| entity.name).collect())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
