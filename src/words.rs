//! Word statistics for engagement profiles: a per-video word cloud and a
//! "liked words" ranking drawn from the most-liked comments.

use crate::dedupe::dedupe_ordered;
use ahash::AHashSet;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
    "by", "from", "up", "about", "into", "through", "during", "before", "after",
    "above", "below", "between", "among", "throughout", "alongside", "towards",
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
    "my", "your", "his", "its", "our", "their", "mine", "yours", "hers", "ours", "theirs",
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must",
    "this", "that", "these", "those", "here", "there", "where", "when", "why", "how",
    "what", "who", "which", "whose", "whom", "not", "no", "yes", "can", "cant",
    "dont", "wont", "im", "youre", "hes", "shes", "theyre", "ive", "youve",
    "also", "just", "really", "very", "so", "too", "now", "then", "well", "still",
];

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[a-zA-Z]{3,}\b").unwrap())
}

fn stop_words() -> &'static AHashSet<&'static str> {
    static SET: OnceLock<AHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

pub fn is_stop_word(word: &str) -> bool {
    stop_words().contains(word)
}

/// Lower-cased alphabetic runs of 3+ letters, stop words removed, in text order.
pub fn content_words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    word_re()
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| !is_stop_word(w))
        .map(str::to_string)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedWord {
    pub word: String,
    #[serde(rename = "avgLikes")]
    pub avg_likes: i64,
    /// Liked comments containing the word.
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordProfile {
    pub word_cloud: Vec<WordCount>,
    pub liked_words: Vec<LikedWord>,
}

/// Most frequent words across `texts`; equal counts keep first-seen order.
pub fn word_cloud<'a, I>(texts: I, top: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for text in texts {
        for w in content_words(text) {
            *counts.entry(w).or_default() += 1;
        }
    }
    let mut ranked: Vec<WordCount> = counts.into_iter().map(|(word, count)| WordCount { word, count }).collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top);
    ranked
}

/// Size of the liked subset drawn from `liked` comments: the top fifth,
/// rounded up, never less than one (zero only when nothing is liked).
pub fn liked_subset_len(liked: usize) -> usize {
    if liked == 0 { 0 } else { liked.div_ceil(5).max(1) }
}

/// Rank words by the average like count of the top-liked comments that use them.
/// `comments` yields `(text, like_count)`. A word needs at least two distinct
/// liked comments to qualify; each comment contributes one sample per word.
pub fn liked_words<'a, I>(comments: I, top: usize) -> Vec<LikedWord>
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    let mut liked: Vec<(&str, i64)> = comments.into_iter().filter(|(_, likes)| *likes > 0).collect();
    liked.sort_by(|a, b| b.1.cmp(&a.1));
    liked.truncate(liked_subset_len(liked.len()));

    let mut samples: IndexMap<String, Vec<i64>> = IndexMap::new();
    for (text, likes) in &liked {
        for w in dedupe_ordered(content_words(text)) {
            samples.entry(w).or_default().push(*likes);
        }
    }

    // Ranked on the rounded average; equal values keep first-seen order.
    let mut ranked: Vec<LikedWord> = samples
        .into_iter()
        .filter(|(_, s)| s.len() >= 2)
        .map(|(word, s)| {
            let avg = s.iter().sum::<i64>() as f64 / s.len() as f64;
            LikedWord { word, avg_likes: avg.round_ties_even() as i64, count: s.len() }
        })
        .collect();
    ranked.sort_by(|a, b| b.avg_likes.cmp(&a.avg_likes));
    ranked.truncate(top);
    ranked
}
