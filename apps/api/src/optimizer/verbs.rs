//! Action-verb classifier — detects and suggests strong opening verbs.
//!
//! The vocabulary is fixed and partitioned by category. Replacement selection
//! is uniformly random among category members by design (lexical variety, not
//! a heuristic); the randomness source is injected so tests can pin it.

use rand::Rng;

const LEADERSHIP: &[&str] = &[
    "Led",
    "Managed",
    "Directed",
    "Supervised",
    "Coordinated",
    "Oversaw",
    "Spearheaded",
    "Orchestrated",
    "Guided",
    "Mentored",
    "Trained",
    "Facilitated",
    "Delegated",
];

const ACHIEVEMENT: &[&str] = &[
    "Achieved",
    "Improved",
    "Increased",
    "Reduced",
    "Decreased",
    "Generated",
    "Delivered",
    "Exceeded",
    "Expanded",
    "Optimized",
    "Enhanced",
    "Accelerated",
    "Maximized",
];

const TECHNICAL: &[&str] = &[
    "Developed",
    "Implemented",
    "Engineered",
    "Designed",
    "Architected",
    "Programmed",
    "Deployed",
    "Integrated",
    "Configured",
    "Maintained",
    "Debugged",
    "Resolved",
];

const ANALYSIS: &[&str] = &[
    "Analyzed",
    "Evaluated",
    "Researched",
    "Investigated",
    "Assessed",
    "Identified",
    "Diagnosed",
    "Examined",
    "Reviewed",
    "Streamlined",
    "Monitored",
    "Measured",
];

const CREATION: &[&str] = &[
    "Created",
    "Built",
    "Established",
    "Launched",
    "Initiated",
    "Introduced",
    "Pioneered",
    "Formulated",
    "Devised",
    "Conceptualized",
    "Innovated",
];

const COMMUNICATION: &[&str] = &[
    "Presented",
    "Negotiated",
    "Collaborated",
    "Partnered",
    "Communicated",
    "Authored",
    "Documented",
    "Reported",
    "Influenced",
    "Persuaded",
    "Educated",
];

const CATEGORIES: &[&[&str]] = &[
    LEADERSHIP,
    ACHIEVEMENT,
    TECHNICAL,
    ANALYSIS,
    CREATION,
    COMMUNICATION,
];

/// Lexical cues that pick the replacement category, checked in priority order
/// (leadership > technical > analysis > creation > communication); achievement
/// is the default.
const CUES: &[(&[&str], &[&str])] = &[
    (&["team", "group", "staff", "member", "direct"], LEADERSHIP),
    (
        &["code", "system", "software", "database", "application"],
        TECHNICAL,
    ),
    (&["data", "analysis", "research", "study", "report"], ANALYSIS),
    (&["new", "create", "build", "develop", "design"], CREATION),
    (
        &["client", "customer", "present", "report", "document"],
        COMMUNICATION,
    ),
];

/// True when `word` is a vocabulary verb, exactly or under suffix
/// normalization (-ed, -ing, -s).
pub fn is_strong_verb(word: &str) -> bool {
    if CATEGORIES.iter().flat_map(|c| c.iter()).any(|v| *v == word) {
        return true;
    }

    let base = stem(word);
    let variations = [
        format!("{base}ed"),
        format!("{base}ing"),
        format!("{base}s"),
        base.to_string(),
    ];
    variations.iter().any(|variation| {
        CATEGORIES
            .iter()
            .flat_map(|c| c.iter())
            .any(|verb| verb.eq_ignore_ascii_case(variation))
    })
}

fn stem(word: &str) -> &str {
    word.strip_suffix("ed")
        .or_else(|| word.strip_suffix("ing"))
        .or_else(|| word.strip_suffix('s'))
        .unwrap_or(word)
}

/// Replaces the leading token of `sentence` with a category-appropriate strong
/// verb. Sentences already opening with a strong verb are returned unchanged.
pub fn suggest_replacement<R: Rng>(sentence: &str, rng: &mut R) -> String {
    let Some(first_word) = sentence.split_whitespace().next() else {
        return sentence.to_string();
    };
    if is_strong_verb(first_word) {
        return sentence.to_string();
    }

    let lowered = sentence.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let verbs = CUES
        .iter()
        .find(|(cues, _)| cues.iter().any(|cue| words.contains(cue)))
        .map(|(_, verbs)| *verbs)
        .unwrap_or(ACHIEVEMENT);

    let replacement = verbs[rng.gen_range(0..verbs.len())];
    let first_word_end = sentence
        .find(first_word)
        .map(|start| start + first_word.len())
        .unwrap_or(0);
    let rest = sentence[first_word_end..].trim();
    if rest.is_empty() {
        replacement.to_string()
    } else {
        format!("{replacement} {rest}")
    }
}
