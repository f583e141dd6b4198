//! TF-IDF text similarity used to confirm that a cluster of text boxes repeats
//! the same content across pages.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

/// Lowercased word tokens of at least two characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// L2-normalized TF-IDF vectors over a shared vocabulary.
///
/// Term frequency is the raw count and idf is smoothed:
/// `ln((1 + n) / (1 + df)) + 1`. Documents without any token keep a zero vector.
pub fn tfidf_vectors(docs: &[&str]) -> Vec<Vec<f64>> {
    let tokenized: Vec<Vec<String>> = docs.iter().map(|doc| tokenize(doc)).collect();

    let mut vocabulary: BTreeMap<&str, usize> = BTreeMap::new();
    for token in tokenized.iter().flatten() {
        let next = vocabulary.len();
        vocabulary.entry(token.as_str()).or_insert(next);
    }

    let dims = vocabulary.len();
    let mut df = vec![0usize; dims];
    let mut counts: Vec<Vec<f64>> = Vec::with_capacity(tokenized.len());
    for tokens in &tokenized {
        let mut tf = vec![0.0f64; dims];
        for token in tokens {
            tf[vocabulary[token.as_str()]] += 1.0;
        }
        for (term, &count) in tf.iter().enumerate() {
            if count > 0.0 {
                df[term] += 1;
            }
        }
        counts.push(tf);
    }

    let n = docs.len() as f64;
    let idf: Vec<f64> = df
        .iter()
        .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
        .collect();

    counts
        .into_iter()
        .map(|mut vector| {
            for (value, weight) in vector.iter_mut().zip(&idf) {
                *value *= weight;
            }
            let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                vector.iter_mut().for_each(|v| *v /= norm);
            }
            vector
        })
        .collect()
}

/// Mean of the full `n × n` cosine similarity matrix, diagonal included.
///
/// Returns 0.0 for an empty input.
///
/// # Example
/// ```
/// use ferrfuse_core::analysis::similarity::mean_cosine_similarity;
/// let same = mean_cosine_similarity(&["Annual Report 2024", "annual report 2024"]);
/// assert!((same - 1.0).abs() < 1e-6);
/// ```
pub fn mean_cosine_similarity(docs: &[&str]) -> f32 {
    if docs.is_empty() {
        return 0.0;
    }

    let vectors = tfidf_vectors(docs);
    let mut sum = 0.0f64;
    for a in &vectors {
        for b in &vectors {
            sum += a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
        }
    }

    (sum / (vectors.len() * vectors.len()) as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Page 3 of 12 - A Report"),
            vec!["page", "of", "12", "report"]
        );
        assert!(tokenize("a b c -").is_empty());
    }

    #[test]
    fn test_tfidf_vectors_are_normalized() {
        let vectors = tfidf_vectors(&["alpha beta beta", "beta gamma", "a"]);
        assert_eq!(vectors.len(), 3);
        for vector in &vectors[..2] {
            let norm: f64 = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        // No usable token
        assert!(vectors[2].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_mean_similarity_disjoint() {
        // Identity matrix of size 2: (1 + 0 + 0 + 1) / 4
        let mean = mean_cosine_similarity(&["alpha beta", "gamma delta"]);
        assert!((mean - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_mean_similarity_repeated_header() {
        let docs = [
            "ACME Corp Quarterly Report",
            "ACME Corp Quarterly Report",
            "ACME Corp Quarterly Report",
        ];
        assert!((mean_cosine_similarity(&docs) - 1.0).abs() < 1e-6);

        // Page numbers differ; shared words still dominate
        let numbered = ["Quarterly Report page 10", "Quarterly Report page 11"];
        let mean = mean_cosine_similarity(&numbered);
        assert!(mean > 0.5 && mean < 1.0);
    }

    #[test]
    fn test_mean_similarity_empty() {
        assert_eq!(mean_cosine_similarity(&[]), 0.0);
    }
}
