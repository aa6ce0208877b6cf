//! Valence scoring. The default analyzer is reference VADER; a custom lexicon
//! is scored with the same rules reimplemented here (booster and negation
//! windows, capitalisation and punctuation emphasis, contrastive "but") and a
//! compound score normalised into [-1, 1].

use crate::lexicon::Lexicon;
use reality_gap_core::{PolarityScores, SentimentError};
use std::path::Path;

const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
const C_INCR: f64 = 0.733;
const N_SCALAR: f64 = -0.74;
const NORMALIZE_ALPHA: f64 = 15.0;

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "dont", "hadnt",
    "hasnt", "havent", "isnt", "mightnt", "mustnt", "neither", "neednt", "never", "none", "nope",
    "nor", "not", "nothing", "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "uh-uh", "wasnt",
    "werent", "without", "wont", "wouldnt", "rarely", "seldom", "despite",
];

const BOOSTERS_UP: &[&str] = &[
    "absolutely", "amazingly", "awfully", "completely", "considerably", "decidedly", "deeply",
    "effing", "enormously", "entirely", "especially", "exceptionally", "extremely", "fabulously",
    "flipping", "fully", "greatly", "hella", "highly", "hugely", "incredibly", "intensely",
    "majorly", "more", "most", "particularly", "purely", "quite", "really", "remarkably", "so",
    "substantially", "thoroughly", "totally", "tremendously", "uber", "unbelievably",
    "unusually", "utterly", "very",
];

const BOOSTERS_DOWN: &[&str] = &[
    "almost", "barely", "hardly", "kinda", "kindof", "less", "little", "marginally",
    "occasionally", "partly", "scarcely", "slightly", "somewhat", "sorta", "sortof",
];

fn booster_scalar(lowered: &str) -> Option<f64> {
    if BOOSTERS_UP.contains(&lowered) {
        Some(B_INCR)
    } else if BOOSTERS_DOWN.contains(&lowered) {
        Some(B_DECR)
    } else {
        None
    }
}

fn is_negated(lowered: &str) -> bool {
    NEGATIONS.contains(&lowered) || lowered.contains("n't")
}

/// Python-style `isupper`: at least one cased letter and no lowercase ones.
fn is_all_caps(token: &str) -> bool {
    token.chars().any(char::is_alphabetic) && !token.chars().any(char::is_lowercase)
}

/// Splits on whitespace, strips surrounding punctuation unless that would
/// leave two characters or fewer (keeps emoticons), and drops single
/// characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            let stripped = raw.trim_matches(|c: char| c.is_ascii_punctuation());
            if stripped.chars().count() <= 2 {
                raw
            } else {
                stripped
            }
        })
        .filter(|t| t.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Maps an unbounded valence sum into [-1, 1].
pub fn normalize(score: f64) -> f64 {
    let normalized = score / (score * score + NORMALIZE_ALPHA).sqrt();
    normalized.clamp(-1.0, 1.0)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

enum Scorer {
    /// Reference VADER with its full lexicon and emoji table.
    Vader,
    /// The rules below over a user-supplied lexicon.
    Rules(Lexicon),
}

pub struct SentimentAnalyzer {
    scorer: Scorer,
}

impl SentimentAnalyzer {
    pub fn vader() -> Self {
        Self {
            scorer: Scorer::Vader,
        }
    }

    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            scorer: Scorer::Rules(lexicon),
        }
    }

    pub fn from_lexicon_file(path: &Path) -> Result<Self, SentimentError> {
        Ok(Self::new(Lexicon::from_file(path)?))
    }

    /// The custom lexicon, if this analyzer was built from one.
    pub fn lexicon(&self) -> Option<&Lexicon> {
        match &self.scorer {
            Scorer::Vader => None,
            Scorer::Rules(lexicon) => Some(lexicon),
        }
    }

    pub fn polarity_scores(&self, text: &str) -> PolarityScores {
        match &self.scorer {
            Scorer::Vader => vader_scores(text),
            Scorer::Rules(lexicon) => RuleScorer { lexicon }.polarity_scores(text),
        }
    }
}

fn vader_scores(text: &str) -> PolarityScores {
    if text.trim().is_empty() {
        return PolarityScores::default();
    }
    let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
    let scores = analyzer.polarity_scores(text);
    let get = |key: &str| scores.get(key).copied().unwrap_or(0.0);
    PolarityScores {
        neg: round_to(get("neg"), 3),
        neu: round_to(get("neu"), 3),
        pos: round_to(get("pos"), 3),
        compound: round_to(get("compound"), 4),
    }
}

struct RuleScorer<'a> {
    lexicon: &'a Lexicon,
}

impl RuleScorer<'_> {
    fn polarity_scores(&self, text: &str) -> PolarityScores {
        let tokens = tokenize(text);
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        let caps = tokens.iter().filter(|t| is_all_caps(t)).count();
        let cap_differential = caps > 0 && caps < tokens.len();

        let mut sentiments = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            let is_kind_of = lowered[i] == "kind" && lowered.get(i + 1).map(String::as_str) == Some("of");
            if booster_scalar(&lowered[i]).is_some() || is_kind_of {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(self.sentiment_valence(&tokens, &lowered, i, cap_differential));
        }

        but_check(&lowered, &mut sentiments);
        score_valence(&sentiments, text)
    }

    fn sentiment_valence(&self, tokens: &[String], lowered: &[String], i: usize, cap_differential: bool) -> f64 {
        let Some(mut valence) = self.lexicon.get(&lowered[i]) else {
            return 0.0;
        };

        // "no" used as a determiner ("no problem") carries no valence itself
        if lowered[i] == "no" && lowered.get(i + 1).is_some_and(|next| self.lexicon.contains(next)) {
            return 0.0;
        }
        if (i > 0 && lowered[i - 1] == "no") || (i > 1 && lowered[i - 2] == "no") {
            valence *= N_SCALAR;
        }

        if cap_differential && is_all_caps(&tokens[i]) {
            valence += C_INCR.copysign(valence);
        }

        for start in 0..3 {
            if i <= start {
                break;
            }
            let prior = i - (start + 1);
            if self.lexicon.contains(&lowered[prior]) {
                continue;
            }

            let mut scalar = booster_scalar(&lowered[prior]).unwrap_or(0.0);
            if scalar != 0.0 {
                if valence < 0.0 {
                    scalar = -scalar;
                }
                if cap_differential && is_all_caps(&tokens[prior]) {
                    scalar += if valence > 0.0 { C_INCR } else { -C_INCR };
                }
                scalar *= match start {
                    1 => 0.95,
                    2 => 0.9,
                    _ => 1.0,
                };
            }
            valence += scalar;
            valence = negation_check(valence, lowered, start, i);
        }

        self.least_check(valence, lowered, i)
    }

    fn least_check(&self, valence: f64, lowered: &[String], i: usize) -> f64 {
        if i == 0 || lowered[i - 1] != "least" || self.lexicon.contains(&lowered[i - 1]) {
            return valence;
        }
        if i > 1 && (lowered[i - 2] == "at" || lowered[i - 2] == "very") {
            return valence;
        }
        valence * N_SCALAR
    }
}

fn negation_check(valence: f64, lowered: &[String], start: usize, i: usize) -> f64 {
    match start {
        0 => {
            if is_negated(&lowered[i - 1]) {
                return valence * N_SCALAR;
            }
        }
        1 => {
            if lowered[i - 2] == "never" && (lowered[i - 1] == "so" || lowered[i - 1] == "this") {
                return valence * 1.25;
            }
            if lowered[i - 2] == "without" && lowered[i - 1] == "doubt" {
                return valence;
            }
            if is_negated(&lowered[i - 2]) {
                return valence * N_SCALAR;
            }
        }
        _ => {
            let before = (&lowered[i - 3], &lowered[i - 2], &lowered[i - 1]);
            if before.0 == "never" && (before.1 == "so" || before.1 == "this" || before.2 == "so" || before.2 == "this") {
                return valence * 1.25;
            }
            if before.0 == "without" && (before.1 == "doubt" || before.2 == "doubt") {
                return valence;
            }
            if is_negated(before.0) {
                return valence * N_SCALAR;
            }
        }
    }
    valence
}

/// Sentiment before "but" is damped and sentiment after it amplified.
fn but_check(lowered: &[String], sentiments: &mut [f64]) {
    let Some(but_idx) = lowered.iter().position(|w| w == "but") else {
        return;
    };
    for (idx, sentiment) in sentiments.iter_mut().enumerate() {
        if idx < but_idx {
            *sentiment *= 0.5;
        } else if idx > but_idx {
            *sentiment *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4) as f64 * 0.292;
    let questions = text.matches('?').count();
    let question_boost = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * 0.18,
        _ => 0.96,
    };
    exclamations + question_boost
}

fn score_valence(sentiments: &[f64], text: &str) -> PolarityScores {
    if sentiments.is_empty() {
        return PolarityScores::default();
    }

    let emphasis = punctuation_emphasis(text);
    let mut sum: f64 = sentiments.iter().sum();
    if sum > 0.0 {
        sum += emphasis;
    } else if sum < 0.0 {
        sum -= emphasis;
    }
    let compound = normalize(sum);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;
    for &s in sentiments {
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1.0;
        }
    }

    if pos_sum > f64::abs(neg_sum) {
        pos_sum += emphasis;
    } else if pos_sum < f64::abs(neg_sum) {
        neg_sum -= emphasis;
    }

    let total = pos_sum + f64::abs(neg_sum) + neu_count;
    PolarityScores {
        neg: round_to(f64::abs(neg_sum / total), 3),
        neu: round_to(f64::abs(neu_count / total), 3),
        pos: round_to(f64::abs(pos_sum / total), 3),
        compound: round_to(compound, 4),
    }
}
