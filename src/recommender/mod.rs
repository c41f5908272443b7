//! Keyword-to-movie ranking engine.
//!
//! A corpus of movie tag strings is fitted once into a [`CountVectorizer`]
//! and a [`CountMatrix`]; both are frozen inside an [`Index`]. Queries are
//! vectorized against the same vocabulary and ranked by cosine similarity.
//! Everything here is synchronous and free of I/O, so an `Index` can be
//! shared across threads behind an `Arc` and queried without locking.
use std::collections::HashMap;

use crate::models::{Movie, MovieId, MovieSummary, RankedMovie};

pub mod similarity;
pub mod tokenize;
pub mod vectorizer;

pub use similarity::{cosine_similarity, top_n, CountMatrix, SparseVector};
pub use tokenize::StopWords;
pub use vectorizer::{CountVectorizer, VectorizerConfig, Vocabulary, DEFAULT_MAX_FEATURES};

/// Number of results returned when the caller does not ask for a count
pub const DEFAULT_TOP_N: usize = 5;

/// Ranking engine errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendError {
    #[error("Corpus contains no movies")]
    EmptyCorpus,

    #[error("No vocabulary terms survived stop word filtering")]
    DegenerateVocabulary,

    #[error("No query provided")]
    EmptyQuery,

    /// The query and corpus were vectorized against different vocabularies
    #[error("Vector has {actual} columns but the corpus matrix has {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Movie {0} is not in the index")]
    UnknownMovie(MovieId),
}

/// Frozen vocabulary, corpus matrix and the movies each row belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    movies: Vec<MovieSummary>,
    rows_by_id: HashMap<MovieId, usize>,
    vectorizer: CountVectorizer,
    matrix: CountMatrix,
}

impl Index {
    /// Movies in row order
    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.vectorizer.vocabulary()
    }

    pub fn vectorizer(&self) -> &CountVectorizer {
        &self.vectorizer
    }

    pub fn matrix(&self) -> &CountMatrix {
        &self.matrix
    }

    pub fn movie(&self, id: MovieId) -> Option<&MovieSummary> {
        self.rows_by_id.get(&id).map(|&row| &self.movies[row])
    }

    fn ranked(&self, row: usize, score: f64) -> RankedMovie {
        let movie = &self.movies[row];
        RankedMovie {
            id: movie.id,
            title: movie.title.clone(),
            score,
        }
    }
}

/// Builds an index with the default vectorizer settings
pub fn build_index(corpus: &[Movie]) -> Result<Index, RecommendError> {
    build_index_with(corpus, &VectorizerConfig::default())
}

/// Builds an index from `corpus`, keeping its order as the row order.
///
/// Movies with blank tags are dropped before fitting.
pub fn build_index_with(
    corpus: &[Movie],
    config: &VectorizerConfig,
) -> Result<Index, RecommendError> {
    let kept: Vec<&Movie> = corpus
        .iter()
        .filter(|movie| !movie.tags.trim().is_empty())
        .collect();

    if kept.len() < corpus.len() {
        tracing::warn!(
            dropped = corpus.len() - kept.len(),
            "Dropped movies with blank tags"
        );
    }

    if kept.is_empty() {
        return Err(RecommendError::EmptyCorpus);
    }

    let documents: Vec<&str> = kept.iter().map(|movie| movie.tags.as_str()).collect();
    let (vectorizer, matrix) = CountVectorizer::fit(&documents, config)?;

    let movies: Vec<MovieSummary> = kept.iter().map(|movie| MovieSummary::from(*movie)).collect();
    let mut rows_by_id = HashMap::with_capacity(movies.len());
    for (row, movie) in movies.iter().enumerate() {
        if rows_by_id.insert(movie.id, row).is_some() {
            tracing::warn!(movie_id = movie.id, "Duplicate movie id in corpus, keeping last row");
        }
    }

    tracing::info!(
        movies = movies.len(),
        vocabulary_size = vectorizer.vocabulary().len(),
        "Recommendation index built"
    );

    Ok(Index {
        movies,
        rows_by_id,
        vectorizer,
        matrix,
    })
}

/// Ranks the corpus against a free-text keyword query.
///
/// Out-of-vocabulary queries are not an error: every movie scores 0 and the
/// first `n` movies come back in corpus order.
pub fn recommend(index: &Index, query: &str, n: usize) -> Result<Vec<RankedMovie>, RecommendError> {
    if query.trim().is_empty() {
        return Err(RecommendError::EmptyQuery);
    }

    let vector = index.vectorizer.transform(query);
    if vector.is_zero() {
        tracing::debug!(query = %query, "Query has no vocabulary terms");
    }

    let ranked = top_n(&vector, &index.matrix, n)?;
    Ok(ranked
        .into_iter()
        .map(|(row, score)| index.ranked(row, score))
        .collect())
}

/// Ranks the rest of the corpus against one movie's own tags
pub fn similar_movies(
    index: &Index,
    movie_id: MovieId,
    n: usize,
) -> Result<Vec<RankedMovie>, RecommendError> {
    let row = *index
        .rows_by_id
        .get(&movie_id)
        .ok_or(RecommendError::UnknownMovie(movie_id))?;
    let vector = index
        .matrix
        .row(row)
        .ok_or(RecommendError::UnknownMovie(movie_id))?;

    // The movie itself may sit anywhere among equal scores, so rank everything
    let ranked = top_n(vector, &index.matrix, index.len())?;
    Ok(ranked
        .into_iter()
        .filter(|&(other, _)| index.movies[other].id != movie_id)
        .take(n)
        .map(|(other, score)| index.ranked(other, score))
        .collect())
}
