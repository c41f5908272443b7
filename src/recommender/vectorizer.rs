use std::collections::{BTreeMap, HashMap, HashSet};

use indexmap::IndexSet;

use super::similarity::{CountMatrix, SparseVector};
use super::tokenize::{tokenize, StopWords};
use super::RecommendError;

/// Default cap on vocabulary size
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Settings used when fitting a vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorizerConfig {
    pub max_features: usize,
    pub stop_words: StopWords,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            stop_words: StopWords::English,
        }
    }
}

/// Frozen, ordered term set. A term's position is its matrix column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    terms: IndexSet<String>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }

    pub fn term(&self, column: usize) -> Option<&str> {
        self.terms.get_index(column).map(String::as_str)
    }

    /// Terms in column order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

/// Bag-of-words count vectorizer with a vocabulary fixed at fit time
#[derive(Debug, Clone, PartialEq)]
pub struct CountVectorizer {
    vocabulary: Vocabulary,
    max_features: usize,
}

impl CountVectorizer {
    /// Fits a vocabulary on `documents` and vectorizes them against it.
    ///
    /// Terms are ranked by document frequency (descending), ties broken by
    /// the term itself, and the first `max_features` are kept. The rank is
    /// the column. Row `i` of the returned matrix is `documents[i]`.
    pub fn fit<S: AsRef<str>>(
        documents: &[S],
        config: &VectorizerConfig,
    ) -> Result<(Self, CountMatrix), RecommendError> {
        if documents.is_empty() {
            return Err(RecommendError::EmptyCorpus);
        }

        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for document in documents {
            let terms: HashSet<String> = tokenize(document.as_ref())
                .filter(|token| !config.stop_words.contains(token))
                .collect();
            for term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = document_frequency.into_iter().collect();
        ranked.sort_by(|(term_a, df_a), (term_b, df_b)| {
            df_b.cmp(df_a).then_with(|| term_a.cmp(term_b))
        });
        ranked.truncate(config.max_features);

        if ranked.is_empty() {
            return Err(RecommendError::DegenerateVocabulary);
        }

        let vectorizer = Self {
            vocabulary: Vocabulary {
                terms: ranked.into_iter().map(|(term, _)| term).collect(),
            },
            max_features: config.max_features,
        };

        let rows = documents
            .iter()
            .map(|document| vectorizer.transform(document.as_ref()))
            .collect();
        let matrix = CountMatrix::new(vectorizer.vocabulary.len(), rows)?;

        tracing::debug!(
            documents = documents.len(),
            vocabulary_size = vectorizer.vocabulary.len(),
            max_features = config.max_features,
            "Vectorizer fitted"
        );

        Ok((vectorizer, matrix))
    }

    /// Counts vocabulary terms in `document`. Unknown terms are ignored.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        for token in tokenize(document) {
            if let Some(column) = self.vocabulary.column(&token) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }
        SparseVector::from_sorted(self.vocabulary.len(), counts.into_iter().collect())
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: [&str; 3] = [
        "ghost haunted house",
        "love romance comedy",
        "ghost comedy scary",
    ];

    #[test]
    fn test_fit_orders_by_document_frequency_then_term() {
        let (vectorizer, _) = CountVectorizer::fit(&CORPUS, &VectorizerConfig::default()).unwrap();
        let terms: Vec<&str> = vectorizer.vocabulary().iter().collect();
        assert_eq!(
            terms,
            vec!["comedy", "ghost", "haunted", "house", "love", "romance", "scary"]
        );
    }

    #[test]
    fn test_fit_uses_document_not_term_frequency() {
        let docs = ["zebra zebra zebra", "apple", "apple", "mango"];
        let config = VectorizerConfig {
            max_features: 1,
            ..Default::default()
        };
        let (vectorizer, _) = CountVectorizer::fit(&docs, &config).unwrap();
        assert_eq!(vectorizer.vocabulary().term(0), Some("apple"));
        assert_eq!(vectorizer.vocabulary().len(), 1);
    }

    #[test]
    fn test_fit_builds_matrix_rows_in_document_order() {
        let (vectorizer, matrix) =
            CountVectorizer::fit(&CORPUS, &VectorizerConfig::default()).unwrap();
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.cols(), 7);
        let ghost = vectorizer.vocabulary().column("ghost").unwrap();
        let love = vectorizer.vocabulary().column("love").unwrap();
        assert_eq!(matrix.row(0).unwrap().get(ghost), 1);
        assert_eq!(matrix.row(1).unwrap().get(ghost), 0);
        assert_eq!(matrix.row(1).unwrap().get(love), 1);
    }

    #[test]
    fn test_fit_excludes_stop_words() {
        let docs = ["the ghost of the house", "a ghost"];
        let (vectorizer, _) = CountVectorizer::fit(&docs, &VectorizerConfig::default()).unwrap();
        assert_eq!(vectorizer.vocabulary().column("the"), None);
        assert_eq!(vectorizer.vocabulary().column("of"), None);
        assert!(vectorizer.vocabulary().column("ghost").is_some());
    }

    #[test]
    fn test_fit_respects_max_features() {
        let config = VectorizerConfig {
            max_features: 2,
            ..Default::default()
        };
        let (vectorizer, matrix) = CountVectorizer::fit(&CORPUS, &config).unwrap();
        let terms: Vec<&str> = vectorizer.vocabulary().iter().collect();
        assert_eq!(terms, vec!["comedy", "ghost"]);
        assert_eq!(matrix.cols(), 2);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let first = CountVectorizer::fit(&CORPUS, &VectorizerConfig::default()).unwrap();
        let second = CountVectorizer::fit(&CORPUS, &VectorizerConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fit_empty_corpus() {
        let docs: [&str; 0] = [];
        assert_eq!(
            CountVectorizer::fit(&docs, &VectorizerConfig::default()),
            Err(RecommendError::EmptyCorpus)
        );
    }

    #[test]
    fn test_fit_only_stop_words_is_degenerate() {
        let docs = ["the and of", "a an it"];
        assert_eq!(
            CountVectorizer::fit(&docs, &VectorizerConfig::default()),
            Err(RecommendError::DegenerateVocabulary)
        );
    }

    #[test]
    fn test_fit_zero_max_features_is_degenerate() {
        let config = VectorizerConfig {
            max_features: 0,
            ..Default::default()
        };
        assert_eq!(
            CountVectorizer::fit(&CORPUS, &config),
            Err(RecommendError::DegenerateVocabulary)
        );
    }

    #[test]
    fn test_transform_counts_repeated_terms() {
        let (vectorizer, _) = CountVectorizer::fit(&CORPUS, &VectorizerConfig::default()).unwrap();
        let vector = vectorizer.transform("Ghost GHOST comedy");
        let ghost = vectorizer.vocabulary().column("ghost").unwrap();
        let comedy = vectorizer.vocabulary().column("comedy").unwrap();
        assert_eq!(vector.dim(), 7);
        assert_eq!(vector.get(ghost), 2);
        assert_eq!(vector.get(comedy), 1);
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let (vectorizer, _) = CountVectorizer::fit(&CORPUS, &VectorizerConfig::default()).unwrap();
        let vector = vectorizer.transform("spaceship robot");
        assert!(vector.is_zero());
        assert_eq!(vector.dim(), 7);
    }

    #[test]
    fn test_transform_blank_is_zero_vector() {
        let (vectorizer, _) = CountVectorizer::fit(&CORPUS, &VectorizerConfig::default()).unwrap();
        assert!(vectorizer.transform("   ").is_zero());
        assert!(vectorizer.transform("").is_zero());
    }
}
