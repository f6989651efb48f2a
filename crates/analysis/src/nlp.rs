//! Review text normalization: case folding, punctuation removal, stopword
//! filtering and lemmatization.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// English stopwords (NLTK list).
///
/// Contractions are listed without apostrophes because punctuation is removed
/// before stopword filtering.
static ENGLISH_STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
        "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
        "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
        "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
        "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
        "for", "with", "about", "against", "between", "into", "through", "during", "before",
        "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
        "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
        "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
        "will", "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
        "aren", "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn",
        "mustn", "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
    ]
    .into_iter()
    .collect()
});

/// Irregular noun plurals and their base forms.
static IRREGULAR_LEMMAS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("mice", "mouse"),
        ("leaves", "leaf"),
        ("knives", "knife"),
        ("wives", "wife"),
        ("lives", "life"),
        ("shelves", "shelf"),
        ("halves", "half"),
        ("wolves", "wolf"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
        ("analyses", "analysis"),
        ("indices", "index"),
        ("matrices", "matrix"),
    ]
    .into_iter()
    .collect()
});

/// Words that look plural but are already base forms.
static INVARIANT_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "series", "species", "news", "always", "perhaps", "lens", "physics", "electronics",
        "mathematics", "economics", "politics", "clothes", "jeans", "pants", "scissors",
        "headquarters", "yes", "plus", "thus", "bias", "canvas", "atlas", "chaos",
    ]
    .into_iter()
    .collect()
});

/// Dictionary-backed noun lemmatizer.
///
/// Irregular forms come from a lookup table; regular plurals are detached with
/// suffix rules. Applying it twice gives the same result as applying it once.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lemmatizer;

impl Lemmatizer {
    /// Create a new Lemmatizer.
    pub fn new() -> Self {
        Self
    }

    /// Reduce a lowercase token to its base form.
    pub fn lemmatize<'a>(&self, token: &'a str) -> std::borrow::Cow<'a, str> {
        use std::borrow::Cow;

        if let Some(base) = IRREGULAR_LEMMAS.get(token) {
            return Cow::Borrowed(*base);
        }
        if INVARIANT_WORDS.contains(token) || token.chars().count() <= 3 {
            return Cow::Borrowed(token);
        }

        if let Some(stem) = token.strip_suffix("ies") {
            if token.chars().count() > 4 {
                return Cow::Owned(format!("{}y", stem));
            }
        }
        for suffix in ["sses", "xes", "zes", "ches", "shes"] {
            if token.ends_with(suffix) {
                return Self::irregular_or(&token[..token.len() - 2]);
            }
        }
        if token.ends_with('s')
            && !token.ends_with("ss")
            && !token.ends_with("us")
            && !token.ends_with("is")
        {
            return Self::irregular_or(&token[..token.len() - 1]);
        }

        Cow::Borrowed(token)
    }

    /// A stripped stem can itself be an irregular plural (`womens` -> `women`).
    fn irregular_or(stem: &str) -> std::borrow::Cow<'_, str> {
        match IRREGULAR_LEMMAS.get(stem) {
            Some(base) => std::borrow::Cow::Borrowed(*base),
            None => std::borrow::Cow::Borrowed(stem),
        }
    }
}

/// Normalizer applied to review text before vectorization.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stopwords: HashSet<String>,
    lemmatizer: Lemmatizer,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    /// Create a normalizer using the English stopword list.
    pub fn new() -> Self {
        Self::with_stopwords(ENGLISH_STOPWORDS.iter().map(|w| w.to_string()))
    }

    /// Create a normalizer with a custom stopword list.
    pub fn with_stopwords(stopwords: impl IntoIterator<Item = String>) -> Self {
        Self {
            stopwords: stopwords.into_iter().collect(),
            lemmatizer: Lemmatizer::new(),
        }
    }

    /// Check if a word is a stopword.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Lowercase, strip ASCII punctuation, drop stopwords, lemmatize and
    /// rejoin with single spaces.
    pub fn normalize(&self, text: &str) -> String {
        let stripped: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();

        stripped
            .split_whitespace()
            .filter(|token| !self.is_stopword(token))
            .map(|token| {
                let lemma = self.lemmatizer.lemmatize(token);
                // A base form that is itself a stopword would vanish on a
                // second pass; keep the surface form instead.
                if self.is_stopword(&lemma) {
                    token.to_string()
                } else {
                    lemma.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
