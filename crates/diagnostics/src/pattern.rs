//! Heuristic inspection of extraction patterns.
//!
//! One left-to-right scan collects [`PatternFacts`]; an ordered table of
//! independent rules turns those facts into [`Issue`]s. Escaped characters
//! and character-class bodies are skipped by the scan, so `\.*` and `[.*]`
//! never count as wide quantifiers.
//!
//! This is a linter, not a regex parser: it does not validate syntax and
//! does not promise to catch every expensive construct.

use costlens_core::{Issue, IssueLevel};

/// Patterns longer than this (in characters) are reported.
pub const MAX_PATTERN_LENGTH: usize = 150;

/// What a single scan learned about a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternFacts {
    /// Length in characters
    pub length: usize,
    /// A repeating group that itself repeats, e.g. `(a*)+`
    pub nested_quantifier: bool,
    /// Occurrences of `.*?` / `.+?`
    pub lazy_wide: usize,
    /// Occurrences of `.*` / `.+` not followed by `?`
    pub greedy_wide: usize,
    /// Unescaped `|` outside character classes
    pub alternations: usize,
    /// Any `(?=`, `(?!`, `(?<=`, `(?<!`
    pub lookaround: bool,
    /// Leading `^`, trailing `$`, or `\A` / `\Z` / `\z` anywhere
    pub anchored: bool,
}

impl PatternFacts {
    /// Scan a pattern.
    pub fn scan(pattern: &str) -> Self {
        let chars: Vec<char> = pattern.chars().collect();
        let mut facts = PatternFacts {
            length: chars.len(),
            anchored: pattern.starts_with('^') || pattern.ends_with('$'),
            ..Default::default()
        };

        let mut in_class = false;
        // one entry per open group: has its body seen a `*` or `+` yet
        let mut groups: Vec<bool> = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c == '\\' {
                if !in_class && matches!(chars.get(i + 1), Some('A' | 'Z' | 'z')) {
                    facts.anchored = true;
                }
                i += 2;
                continue;
            }

            if in_class {
                if c == ']' {
                    in_class = false;
                }
                i += 1;
                continue;
            }

            match c {
                '[' => {
                    in_class = true;
                    // `[]...]` and `[^]...]` start with a literal bracket
                    let mut j = i + 1;
                    if chars.get(j) == Some(&'^') {
                        j += 1;
                    }
                    if chars.get(j) == Some(&']') {
                        j += 1;
                    }
                    i = j;
                    continue;
                }
                '(' => {
                    groups.push(false);
                    if is_lookaround(&chars[i + 1..]) {
                        facts.lookaround = true;
                    }
                }
                ')' => {
                    if let Some(repeats) = groups.pop() {
                        if repeats && matches!(chars.get(i + 1), Some('*' | '+' | '?')) {
                            facts.nested_quantifier = true;
                        }
                    }
                }
                '*' | '+' => {
                    for open in groups.iter_mut() {
                        *open = true;
                    }
                }
                '|' => facts.alternations += 1,
                '.' => {
                    if matches!(chars.get(i + 1), Some('*' | '+')) {
                        if chars.get(i + 2) == Some(&'?') {
                            facts.lazy_wide += 1;
                        } else {
                            facts.greedy_wide += 1;
                        }
                    }
                }
                _ => {}
            }
            i += 1;
        }

        facts
    }
}

fn is_lookaround(rest: &[char]) -> bool {
    matches!(rest, ['?', '=' | '!', ..] | ['?', '<', '=' | '!', ..])
}

type PatternRule = fn(&PatternFacts) -> Option<Issue>;

/// Detection rules in report order. Each one is independent.
const PATTERN_RULES: [(&str, PatternRule); 7] = [
    ("nested_quantifier", nested_quantifier),
    ("lazy_wide", lazy_wide),
    ("greedy_wide", greedy_wide),
    ("alternation", alternation),
    ("lookaround", lookaround),
    ("length", length),
    ("anchors", anchors),
];

/// Inspect a pattern and list the anti-performance idioms it contains.
///
/// An empty pattern yields no issues.
pub fn analyze_pattern(pattern: &str) -> Vec<Issue> {
    if pattern.is_empty() {
        return Vec::new();
    }

    let facts = PatternFacts::scan(pattern);
    PATTERN_RULES
        .iter()
        .filter_map(|(name, rule)| {
            let issue = rule(&facts)?;
            tracing::trace!(rule = *name, level = %issue.level, "pattern issue");
            Some(issue)
        })
        .collect()
}

fn nested_quantifier(facts: &PatternFacts) -> Option<Issue> {
    facts.nested_quantifier.then(|| {
        Issue::new(
            IssueLevel::Critical,
            "Possible catastrophic backtracking: nested quantifiers such as `(.*)+` or `(.+)*`. \
             A single unlucky payload can make the evaluator time out.",
        )
    })
}

fn lazy_wide(facts: &PatternFacts) -> Option<Issue> {
    match facts.lazy_wide {
        0 => None,
        1 => Some(Issue::new(
            IssueLevel::Medium,
            "Lazy quantifier (`.*?` or `.+?`) found. A negated class `[^delimiter]+` is cheaper.",
        )),
        n => Some(Issue::new(
            IssueLevel::High,
            format!(
                "Multiple lazy quantifiers (`.*?` or `.+?`): {} found. Each one forces extra \
                 backtracking; use negated classes `[^delimiter]+` instead.",
                n
            ),
        )),
    }
}

fn greedy_wide(facts: &PatternFacts) -> Option<Issue> {
    match facts.greedy_wide {
        0 => None,
        n @ 1..=2 => Some(Issue::new(
            IssueLevel::Low,
            format!(
                "Unbounded `.*` or `.+` found ({}x). Bound it with anchors or a more specific \
                 character class.",
                n
            ),
        )),
        n => Some(Issue::new(
            IssueLevel::High,
            format!(
                "Multiple unbounded greedy quantifiers (`.*` or `.+`): {} found. Narrow the \
                 scope with anchors or specific delimiters.",
                n
            ),
        )),
    }
}

fn alternation(facts: &PatternFacts) -> Option<Issue> {
    match facts.alternations {
        0..=1 => None,
        n @ 2..=4 => Some(Issue::new(
            IssueLevel::Medium,
            format!(
                "Alternation with {} `|` separators. Order the branches from most to least \
                 frequent.",
                n
            ),
        )),
        n => Some(Issue::new(
            IssueLevel::High,
            format!(
                "Heavy alternation: {} `|` separators. Split into several properties or use a \
                 character class.",
                n
            ),
        )),
    }
}

fn lookaround(facts: &PatternFacts) -> Option<Issue> {
    facts.lookaround.then(|| {
        Issue::new(
            IssueLevel::Medium,
            "Lookahead or lookbehind found. Valid, but costly on long payloads; check whether it \
             is needed.",
        )
    })
}

fn length(facts: &PatternFacts) -> Option<Issue> {
    (facts.length > MAX_PATTERN_LENGTH).then(|| {
        Issue::new(
            IssueLevel::Low,
            format!(
                "Long pattern ({} characters). Narrower, more specific properties are faster and \
                 easier to maintain.",
                facts.length
            ),
        )
    })
}

fn anchors(facts: &PatternFacts) -> Option<Issue> {
    (!facts.anchored).then(|| {
        Issue::new(
            IssueLevel::Info,
            "No `^` or `$` anchors. Anchor the pattern where possible to shrink the search space.",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(issues: &[Issue]) -> Vec<IssueLevel> {
        issues.iter().map(|i| i.level).collect()
    }

    #[test]
    fn test_empty_pattern_has_no_issues() {
        assert!(analyze_pattern("").is_empty());
    }

    #[test]
    fn test_nested_quantifier_minimal() {
        let issues = analyze_pattern("(a*)+");
        // the backtracking shape plus the missing anchors, nothing else
        assert_eq!(levels(&issues), vec![IssueLevel::Critical, IssueLevel::Info]);
        assert!(issues[0].message.contains("catastrophic backtracking"));
    }

    #[test]
    fn test_nested_quantifier_fires_once() {
        let issues = analyze_pattern("^(a+)*(b*)+(c+)?$");
        let critical = issues.iter().filter(|i| i.level == IssueLevel::Critical).count();
        assert_eq!(critical, 1);
    }

    #[test]
    fn test_nested_quantifier_through_inner_group() {
        let facts = PatternFacts::scan("((ab)+c)*");
        assert!(facts.nested_quantifier);
    }

    #[test]
    fn test_group_without_inner_repetition_is_fine() {
        assert!(!PatternFacts::scan("^(abc)+$").nested_quantifier);
        assert!(!PatternFacts::scan("^(a*)b$").nested_quantifier);
        assert!(!PatternFacts::scan("^([*+])+$").nested_quantifier);
        assert!(!PatternFacts::scan(r"^(a\*)+$").nested_quantifier);
    }

    #[test]
    fn test_two_lazy_quantifiers() {
        let issues = analyze_pattern(".*?campo=.*?valor");
        let high: Vec<_> = issues.iter().filter(|i| i.level == IssueLevel::High).collect();
        assert_eq!(high.len(), 1);
        assert!(high[0].message.contains(": 2 found"));
        // lazy quantifiers are not greedy
        assert!(!issues.iter().any(|i| i.level == IssueLevel::Low));
    }

    #[test]
    fn test_single_lazy_quantifier_is_medium() {
        let issues = analyze_pattern("^user=(.+?);");
        assert_eq!(levels(&issues), vec![IssueLevel::Medium]);
    }

    #[test]
    fn test_anchored_single_greedy() {
        let issues = analyze_pattern("^start.*end$");
        assert_eq!(levels(&issues), vec![IssueLevel::Low]);
        assert!(issues[0].message.contains("(1x)"));
    }

    #[test]
    fn test_three_greedy_is_high() {
        let facts = PatternFacts::scan("^a.*b.+c.*$");
        assert_eq!(facts.greedy_wide, 3);
        let issues = analyze_pattern("^a.*b.+c.*$");
        assert_eq!(levels(&issues), vec![IssueLevel::High]);
    }

    #[test]
    fn test_escaped_and_class_dots_are_not_wide() {
        let facts = PatternFacts::scan(r"^\d+\.*[.*]+[^.+]$");
        assert_eq!(facts.greedy_wide, 0);
        assert_eq!(facts.lazy_wide, 0);
    }

    #[test]
    fn test_alternation_bands() {
        assert!(analyze_pattern("^(a|b)$").is_empty());
        assert_eq!(levels(&analyze_pattern("^(a|b|c)$")), vec![IssueLevel::Medium]);
        assert_eq!(levels(&analyze_pattern("^(a|b|c|d|e)$")), vec![IssueLevel::Medium]);

        let issues = analyze_pattern("^(a|b|c|d|e|f)$");
        assert_eq!(levels(&issues), vec![IssueLevel::High]);
        assert!(issues[0].message.contains("5 `|`"));
    }

    #[test]
    fn test_pipes_inside_classes_do_not_count() {
        assert_eq!(PatternFacts::scan(r"^[|]+\|x$").alternations, 0);
    }

    #[test]
    fn test_lookaround_fires_once() {
        let issues = analyze_pattern("^(?=a)(?!b)(?<=c)(?<!d)x$");
        assert_eq!(levels(&issues), vec![IssueLevel::Medium]);
    }

    #[test]
    fn test_named_group_is_not_lookaround() {
        assert!(!PatternFacts::scan("^(?<user>[a-z]+)$").lookaround);
        assert!(!PatternFacts::scan("^(?:ab)$").lookaround);
    }

    #[test]
    fn test_length_boundary() {
        let exact = format!("^{}$", "a".repeat(MAX_PATTERN_LENGTH - 2));
        assert!(analyze_pattern(&exact).is_empty());

        let long = format!("^{}$", "a".repeat(MAX_PATTERN_LENGTH - 1));
        let issues = analyze_pattern(&long);
        assert_eq!(levels(&issues), vec![IssueLevel::Low]);
        assert!(issues[0].message.contains("151 characters"));
    }

    #[test]
    fn test_absolute_anchors() {
        assert!(PatternFacts::scan(r"\Afoo").anchored);
        assert!(PatternFacts::scan(r"foo\z").anchored);
        assert!(PatternFacts::scan(r"foo\Z").anchored);
        assert!(PatternFacts::scan("^foo").anchored);
        assert!(PatternFacts::scan("foo$").anchored);
        assert!(!PatternFacts::scan("foo").anchored);
    }

    #[test]
    fn test_rules_co_fire_in_order() {
        let pattern = "(.*)+x.*?y.*?z|a|b(?=c)";
        let issues = analyze_pattern(pattern);
        assert_eq!(
            levels(&issues),
            vec![
                IssueLevel::Critical,
                IssueLevel::High,
                IssueLevel::Low,
                IssueLevel::Medium,
                IssueLevel::Medium,
                IssueLevel::Info,
            ]
        );
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let pattern = "src=(.*?) dst=(.*?) (a|b|c)";
        assert_eq!(analyze_pattern(pattern), analyze_pattern(pattern));
    }
}
