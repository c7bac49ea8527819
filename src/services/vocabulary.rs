// Vocabulary Sets
// Built-in word lists for quality scoring and stopword filtering

use std::collections::HashSet;

use super::config_store::VocabularyConfig;

const THOUGHT_WORDS: &[&str] = &[
    "思考", "认为", "觉得", "感觉", "理解", "领悟", "体会", "感悟", "反思",
    "意识到", "发现", "注意到", "观察", "分析", "判断", "推测", "猜测",
    "思维", "想法", "观点", "见解", "理念", "概念", "印象", "感受",
    "启发", "启示", "提醒", "警示", "教训", "收获", "得到", "学到",
    "深入", "深刻", "深层", "本质", "核心", "关键", "重要", "意义",
    "价值", "作用", "影响", "效果", "结果", "后果", "原因", "为什么",
    "think", "thinking", "thought", "believe", "realize", "realized",
    "understand", "understood", "understanding", "reflect", "insight",
    "learned", "notice", "noticed", "consider", "conclude", "analyze", "perspective",
];

const EMOTION_WORDS: &[&str] = &[
    "喜欢", "讨厌", "爱", "恨", "开心", "难过", "激动", "平静", "紧张",
    "放松", "惊讶", "震惊", "感动", "愤怒", "恐惧", "害怕", "担心",
    "希望", "失望", "满意", "不满", "欣赏", "赞美", "批评", "质疑",
    "love", "hate", "happy", "sad", "excited", "surprised", "moved", "angry",
    "afraid", "worried", "disappointed", "satisfied", "enjoy", "enjoyed", "appreciate",
];

const DESCRIPTIVE_WORDS: &[&str] = &[
    "具体", "详细", "清楚", "明确", "准确", "精确", "生动", "形象",
    "比如", "例如", "举例", "实例", "案例", "情况", "场景", "画面",
    "细节", "方面", "角度", "层面", "程度", "范围", "规模", "数量",
    "specific", "specifically", "detailed", "detail", "details", "clear", "clearly",
    "precise", "accurate", "vivid", "example", "instance", "scenario", "aspect",
];

const STOPWORDS: &[&str] = &[
    "的", "了", "是", "我", "你", "他", "她", "它", "我们", "你们", "他们",
    "这", "那", "这个", "那个", "这里", "那里", "这样", "那样",
    "有", "没有", "还", "就", "都", "也", "很", "更", "最",
    "在", "从", "到", "为", "和", "与", "及", "以及",
    "但是", "然而", "不过", "可是", "虽然", "尽管",
    "因为", "所以", "如果", "那么", "然后", "接着",
    "什么", "怎么", "为什么", "哪里", "哪个", "多少",
    "一个", "一些", "许多", "很多", "大量", "少量",
    "非常", "特别", "尤其", "特殊", "普通", "一般",
    "the", "an", "and", "or", "but", "is", "are", "was", "were", "be", "been",
    "to", "of", "in", "on", "at", "for", "with", "this", "that", "these", "those",
    "it", "its", "as", "by", "from", "you", "he", "she", "we", "they", "me", "my",
];

/// Raw-text markers that introduce an example.
pub const EXAMPLE_MARKERS: &[&str] = &[
    "比如", "例如", "举例", "具体", "实际", "比方说",
    "for example", "for instance", "e.g.", "such as",
];

const VIDEO_MARKERS: &[&str] = &["视频", "影片", "内容", "讲解", "演示", "案例", "课程"];
const VIDEO_TOKENS: &[&str] = &[
    "video", "videos", "lecture", "lesson", "course", "clip", "demo", "presentation",
];

const QUESTION_MARKERS: &[&str] = &["？", "?", "为什么", "怎么", "如何"];
const QUESTION_TOKENS: &[&str] = &["why", "how", "what"];

const COMPARISON_MARKERS: &[&str] = &["对比", "比较", "相比", "类似", "不同", "联系", "关联"];
const COMPARISON_TOKENS: &[&str] = &[
    "compare", "compared", "comparison", "similar", "different", "unlike", "contrast", "versus",
];

#[derive(Debug, Clone)]
pub struct Vocabulary {
    thought: HashSet<String>,
    emotion: HashSet<String>,
    descriptive: HashSet<String>,
    stopwords: HashSet<String>,
}

fn build_set(base: &[&str], extra: &[String]) -> HashSet<String> {
    base.iter()
        .map(|w| w.to_string())
        .chain(
            extra
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        )
        .collect()
}

fn marker_hit(lowered_text: &str, tokens: &[String], markers: &[&str], words: &[&str]) -> bool {
    markers.iter().any(|m| lowered_text.contains(m))
        || tokens.iter().any(|t| words.contains(&t.as_str()))
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::from_config(&VocabularyConfig::default())
    }
}

impl Vocabulary {
    pub fn from_config(config: &VocabularyConfig) -> Self {
        Self {
            thought: build_set(THOUGHT_WORDS, &config.extra_thought_words),
            emotion: build_set(EMOTION_WORDS, &config.extra_emotion_words),
            descriptive: build_set(DESCRIPTIVE_WORDS, &config.extra_descriptive_words),
            stopwords: build_set(STOPWORDS, &config.extra_stopwords),
        }
    }

    pub fn is_thought(&self, token: &str) -> bool {
        self.thought.contains(token)
    }

    pub fn is_emotion(&self, token: &str) -> bool {
        self.emotion.contains(token)
    }

    pub fn is_descriptive(&self, token: &str) -> bool {
        self.descriptive.contains(token)
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn thought_len(&self) -> usize {
        self.thought.len()
    }

    pub fn emotion_len(&self) -> usize {
        self.emotion.len()
    }

    pub fn descriptive_len(&self) -> usize {
        self.descriptive.len()
    }

    pub fn stopwords_len(&self) -> usize {
        self.stopwords.len()
    }

    /// `lowered_text` must already be lowercased.
    pub fn has_example_marker(&self, lowered_text: &str) -> bool {
        EXAMPLE_MARKERS.iter().any(|m| lowered_text.contains(m))
    }

    pub fn has_video_reference(&self, lowered_text: &str, tokens: &[String]) -> bool {
        marker_hit(lowered_text, tokens, VIDEO_MARKERS, VIDEO_TOKENS)
    }

    pub fn has_question(&self, lowered_text: &str, tokens: &[String]) -> bool {
        marker_hit(lowered_text, tokens, QUESTION_MARKERS, QUESTION_TOKENS)
    }

    pub fn has_comparison(&self, lowered_text: &str, tokens: &[String]) -> bool {
        marker_hit(lowered_text, tokens, COMPARISON_MARKERS, COMPARISON_TOKENS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_builtin_sizes() {
        let vocab = Vocabulary::default();
        assert!(vocab.thought_len() >= 60);
        assert!(vocab.emotion_len() >= 25);
        assert!(vocab.stopwords_len() >= 40);
        assert!(vocab.is_thought("认为"));
        assert!(vocab.is_emotion("爱"));
        assert!(vocab.is_stopword("的"));
    }

    #[test]
    fn test_extras_are_merged_lowercased() {
        let config = VocabularyConfig {
            extra_thought_words: vec![" Ponder ".to_string(), "".to_string()],
            ..VocabularyConfig::default()
        };
        let vocab = Vocabulary::from_config(&config);
        assert!(vocab.is_thought("ponder"));
        assert_eq!(vocab.thought_len(), Vocabulary::default().thought_len() + 1);
    }

    #[test]
    fn test_question_tokens_do_not_match_substrings() {
        let vocab = Vocabulary::default();
        assert!(!vocab.has_question("the show was long", &toks(&["show", "was", "long"])));
        assert!(vocab.has_question("how does it work", &toks(&["how", "does", "it", "work"])));
        assert!(vocab.has_question("这是为什么呢", &[]));
    }

    #[test]
    fn test_example_marker() {
        let vocab = Vocabulary::default();
        assert!(vocab.has_example_marker("for example, a tree"));
        assert!(vocab.has_example_marker("比如说这个"));
        assert!(!vocab.has_example_marker("nothing here"));
    }
}
