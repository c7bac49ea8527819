// Text Processing Service
// Cleaning, word segmentation and stopword filtering shared by the scoring engines

use jieba_rs::Jieba;
use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::models::TokenSequence;
use super::vocabulary::Vocabulary;

fn disallowed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"[^\p{L}\p{M}\p{N}\s，。！？、；：“”‘’（）【】,.!?;:'"()]"#)
            .expect("allow-list regex")
    })
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Han runs first so they go through the dictionary segmenter as a whole.
    RE.get_or_init(|| {
        Regex::new(r"\p{Han}+|[[\p{L}\p{M}\p{N}]--\p{Han}]+").expect("word regex")
    })
}

fn han_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\A\p{Han}").expect("han regex"))
}

/// Matches from `word_re` are either all Han or all non-Han.
fn is_han_run(run: &str) -> bool {
    han_re().is_match(run)
}

fn sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[。！？.!?\n]").expect("sentence regex"))
}

/// Drop every character outside the allow-list (letters, marks, digits,
/// common sentence punctuation and whitespace).
pub fn clean_text(text: &str) -> String {
    disallowed_re().replace_all(text, "").into_owned()
}

/// Split on terminal punctuation and newlines, keeping non-empty pieces.
pub fn split_sentences(text: &str) -> Vec<&str> {
    sentence_re()
        .split(text)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Length of the longest run of one repeated character.
pub fn longest_char_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if Some(ch) == prev {
            current += 1;
        } else {
            current = 1;
            prev = Some(ch);
        }
        longest = longest.max(current);
    }
    longest
}

/// Truncate to `max_chars` characters, appending "..." when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

/// Language-aware tokenizer. Han-script runs are segmented with the jieba
/// dictionary + HMM model; other scripts split at word boundaries.
pub struct Tokenizer {
    jieba: Jieba,
    vocabulary: Arc<Vocabulary>,
}

impl Tokenizer {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            jieba: Jieba::new(),
            vocabulary,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Word-like units in order, lowercased, without any filtering.
    pub fn segment(&self, text: &str) -> TokenSequence {
        let mut tokens = Vec::new();
        for m in word_re().find_iter(text) {
            let run = m.as_str();
            if is_han_run(run) {
                tokens.extend(
                    self.jieba
                        .cut(run, true)
                        .into_iter()
                        .map(str::trim)
                        .filter(|w| !w.is_empty())
                        .map(str::to_string),
                );
            } else {
                tokens.push(run.to_lowercase());
            }
        }
        TokenSequence::new(tokens)
    }

    /// Clean, segment, then drop single-character tokens and stopwords.
    pub fn normalize(&self, text: &str) -> TokenSequence {
        if text.trim().is_empty() {
            return TokenSequence::default();
        }
        let cleaned = clean_text(text);
        let tokens = self
            .segment(&cleaned)
            .tokens()
            .iter()
            .filter(|t| t.chars().count() > 1 && !self.vocabulary.is_stopword(t))
            .cloned()
            .collect();
        TokenSequence::new(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new(Arc::new(Vocabulary::default()))
    }

    #[test]
    fn test_clean_text_discards_symbols() {
        assert_eq!(clean_text("good😀 job #1!"), "good job 1!");
        assert_eq!(clean_text("你好，世界。"), "你好，世界。");
    }

    #[test]
    fn test_split_sentences() {
        let parts = split_sentences("第一句。第二句！\nThird one? ");
        assert_eq!(parts, vec!["第一句", "第二句", "Third one"]);
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn test_longest_char_run() {
        assert_eq!(longest_char_run("abc"), 1);
        assert_eq!(longest_char_run("好好好好啊"), 4);
        assert_eq!(longest_char_run(""), 0);
    }

    #[test]
    fn test_excerpt_uses_chars() {
        let text = "中".repeat(120);
        let out = excerpt(&text, 100);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 103);
        assert_eq!(excerpt("short", 100), "short");
    }

    #[test]
    fn test_segment_latin_words() {
        let tokens = tokenizer().segment("Hello, World! mp4 files.");
        assert_eq!(tokens.tokens(), &["hello", "world", "mp4", "files"]);
    }

    #[test]
    fn test_segment_mixed_script() {
        let tokens = tokenizer().segment("我认为AI很重要");
        assert!(tokens.iter().any(|t| t == "认为"));
        assert!(tokens.iter().any(|t| t == "ai"));
    }

    #[test]
    fn test_han_runs_include_iteration_and_zero_marks() {
        assert!(is_han_run("々"));
        assert!(is_han_run("〇认为"));
        assert!(is_han_run("\u{2A700}"));
        assert!(!is_han_run("abc"));
        assert!(!is_han_run("３"));

        let tokens = tokenizer().segment("〇认为");
        assert!(tokens.iter().any(|t| t == "认为"));
        assert!(!tokens.iter().any(|t| t == "〇认为"));
    }

    #[test]
    fn test_normalize_filters_short_and_stopwords() {
        let tokens = tokenizer().normalize("The cat is on a mat, and it sleeps.");
        assert_eq!(tokens.tokens(), &["cat", "mat", "sleeps"]);
        assert!(tokenizer().normalize("   ").is_empty());
        assert!(tokenizer().normalize("").is_empty());
    }
}
