//! Glob pattern compiled into per-segment matchers.
//!
//! Supported syntax: `*` (any run within a segment), `?` (one character), `**` as a whole
//! segment (zero or more segments), bracket classes `[abc]`, `[a-z]`, `[!x]` / `[^x]`, and
//! `\` to escape the next character. Matching is done with a segment-by-component table, so
//! cost is bounded by `segments × components × segment length` regardless of how many `**`
//! or `*` a pattern contains.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassItem {
    Single(char),
    Range(char, char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyRun,
    AnyOne,
    Class { negated: bool, items: Vec<ClassItem> },
}

impl Token {
    fn matches_char(&self, c: char) -> bool {
        match self {
            Token::Literal(l) => *l == c,
            Token::AnyOne => true,
            Token::AnyRun => true,
            Token::Class { negated, items } => {
                let hit = items.iter().any(|item| match item {
                    ClassItem::Single(s) => *s == c,
                    ClassItem::Range(lo, hi) => *lo <= c && c <= *hi,
                });
                hit != *negated
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `**`: zero or more whole components.
    Recursive,
    Tokens(Vec<Token>),
}

impl Segment {
    /// The segment's literal text when it contains no wildcard.
    fn literal(&self) -> Option<String> {
        match self {
            Segment::Recursive => None,
            Segment::Tokens(tokens) => tokens
                .iter()
                .map(|t| match t {
                    Token::Literal(c) => Some(*c),
                    _ => None,
                })
                .collect(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Segment::Recursive => true,
            Segment::Tokens(tokens) => match_tokens(tokens, name),
        }
    }
}

/// Wildcard match of one path component, backtracking only to the most recent `*`.
fn match_tokens(tokens: &[Token], name: &str) -> bool {
    let chars: Vec<char> = name.chars().collect();
    let (mut t, mut c) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while c < chars.len() {
        if let Some(token) = tokens.get(t) {
            if *token == Token::AnyRun {
                star = Some((t, c));
                t += 1;
                continue;
            }
            if token.matches_char(chars[c]) {
                t += 1;
                c += 1;
                continue;
            }
        }
        match star {
            Some((star_t, star_c)) => {
                t = star_t + 1;
                c = star_c + 1;
                star = Some((star_t, star_c + 1));
            }
            None => return false,
        }
    }
    tokens[t..].iter().all(|token| *token == Token::AnyRun)
}

/// Parses a bracket class starting just after `[`. Returns the token and the index after the
/// closing `]`, or `None` if the class is unterminated.
fn parse_class(chars: &[char], start: usize) -> Option<(Token, usize)> {
    let mut i = start;
    let negated = matches!(chars.get(i), Some('!') | Some('^'));
    if negated {
        i += 1;
    }
    let mut items = Vec::new();
    let mut first = true;
    loop {
        let c = *chars.get(i)?;
        if c == ']' && !first {
            return Some((Token::Class { negated, items }, i + 1));
        }
        first = false;
        let c = if c == '\\' {
            i += 1;
            *chars.get(i)?
        } else {
            c
        };
        if chars.get(i + 1) == Some(&'-') && chars.get(i + 2).is_some_and(|n| *n != ']') {
            let hi = chars[i + 2];
            items.push(ClassItem::Range(c, hi));
            i += 3;
        } else {
            items.push(ClassItem::Single(c));
            i += 1;
        }
    }
}

fn parse_segment(text: &str) -> Segment {
    if text == "**" {
        return Segment::Recursive;
    }
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                if tokens.last() != Some(&Token::AnyRun) {
                    tokens.push(Token::AnyRun);
                }
                i += 1;
            }
            '?' => {
                tokens.push(Token::AnyOne);
                i += 1;
            }
            '[' => match parse_class(&chars, i + 1) {
                Some((class, next)) => {
                    tokens.push(class);
                    i = next;
                }
                None => {
                    tokens.push(Token::Literal('['));
                    i += 1;
                }
            },
            '\\' if i + 1 < chars.len() => {
                tokens.push(Token::Literal(chars[i + 1]));
                i += 2;
            }
            c => {
                tokens.push(Token::Literal(c));
                i += 1;
            }
        }
    }
    Segment::Tokens(tokens)
}

/// A compiled glob pattern, always interpreted relative to the sandbox root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    source: String,
    segments: Vec<Segment>,
}

impl GlobPattern {
    /// Compiles `pattern`. Never fails: malformed brackets are literals.
    ///
    /// A leading `/` and `.` segments are dropped; empty segments (`a//b`) are ignored;
    /// consecutive `**` collapse into one.
    pub fn new(pattern: &str) -> Self {
        let mut segments: Vec<Segment> = Vec::new();
        for part in pattern.trim().split('/') {
            if part.is_empty() || part == "." {
                continue;
            }
            let segment = parse_segment(part);
            if segment == Segment::Recursive && segments.last() == Some(&Segment::Recursive) {
                continue;
            }
            segments.push(segment);
        }
        Self {
            source: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when the pattern has no segments and can match nothing.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Literal leading directories, as a relative path, and how many segments they cover.
    ///
    /// Walking can start there instead of at the root. The last segment is never part of the
    /// prefix, and `..` never is.
    pub fn literal_prefix(&self) -> (PathBuf, usize) {
        let mut prefix = PathBuf::new();
        let mut count = 0;
        for segment in self.segments.iter().take(self.segments.len().saturating_sub(1)) {
            match segment.literal() {
                Some(text) if text != ".." => {
                    prefix.push(text);
                    count += 1;
                }
                _ => break,
            }
        }
        (prefix, count)
    }

    /// Deepest number of components a match can have, or `None` when `**` makes it unbounded.
    pub fn max_depth(&self) -> Option<usize> {
        if self.segments.contains(&Segment::Recursive) {
            None
        } else {
            Some(self.segments.len())
        }
    }

    /// Matches a relative path given as its components.
    pub fn matches_components(&self, components: &[&str]) -> bool {
        if self.segments.is_empty() {
            return false;
        }
        let p = self.segments.len();
        let n = components.len();
        // table[i][j]: segments[i..] match components[j..]
        let mut table = vec![vec![false; n + 1]; p + 1];
        table[p][n] = true;
        for i in (0..p).rev() {
            for j in (0..=n).rev() {
                table[i][j] = match &self.segments[i] {
                    Segment::Recursive => table[i + 1][j] || (j < n && table[i][j + 1]),
                    segment => j < n && table[i + 1][j + 1] && segment.matches(components[j]),
                };
            }
        }
        table[0][0]
    }

    /// Matches a `/`-separated relative path.
    pub fn matches(&self, relative: &str) -> bool {
        let components: Vec<&str> = relative.split('/').filter(|c| !c.is_empty()).collect();
        self.matches_components(&components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str, path: &str) -> bool {
        GlobPattern::new(pattern).matches(path)
    }

    #[test]
    fn star_stays_within_segment() {
        assert!(m("*.py", "a.py"));
        assert!(m("*.py", ".hidden.py"));
        assert!(!m("*.py", "src/a.py"));
        assert!(!m("*.py", "a.pyc"));
    }

    #[test]
    fn double_star_spans_zero_or_more_segments() {
        assert!(m("**/*.rs", "lib.rs"));
        assert!(m("**/*.rs", "src/lib.rs"));
        assert!(m("**/*.rs", "src/a/b/c.rs"));
        assert!(m("src/**/*.js", "src/x.js"));
        assert!(m("src/**/*.js", "src/a/b/x.js"));
        assert!(!m("src/**/*.js", "lib/x.js"));
        assert!(m("src/**", "src/a/b"));
        assert!(m("**/README.md", "docs/README.md"));
        assert!(m("**/tests/*.py", "pkg/tests/test_a.py"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        assert!(m("?.txt", "a.txt"));
        assert!(!m("?.txt", "ab.txt"));
        assert!(!m("?.txt", ".txt"));
    }

    #[test]
    fn bracket_classes() {
        assert!(m("[abc].txt", "b.txt"));
        assert!(!m("[abc].txt", "d.txt"));
        assert!(m("file[0-9].log", "file7.log"));
        assert!(!m("file[0-9].log", "filex.log"));
        assert!(m("[!a]*", "b.md"));
        assert!(!m("[!a]*", "a.md"));
        assert!(m("[^a]*", "c.md"));
        assert!(m("[]]x", "]x"));
        assert!(m("[a-]x", "-x"));
    }

    #[test]
    fn unterminated_bracket_is_literal() {
        assert!(m("a[b", "a[b"));
        assert!(!m("a[b", "ab"));
    }

    #[test]
    fn escape_makes_metachar_literal() {
        assert!(m(r"a\*b", "a*b"));
        assert!(!m(r"a\*b", "axxb"));
    }

    #[test]
    fn multiple_stars_backtrack() {
        assert!(m("*a*b*c", "xxaYYbZZc"));
        assert!(!m("*a*b*c", "xxaYYcZZb"));
        assert!(m("test_*.py", "test_glob.py"));
    }

    #[test]
    fn leading_slash_and_dot_segments_are_ignored() {
        assert!(m("/src/*.rs", "src/lib.rs"));
        assert!(m("./src/*.rs", "src/lib.rs"));
        assert!(m("src//*.rs", "src/lib.rs"));
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        assert!(GlobPattern::new("").is_empty());
        assert!(!m("", "a.txt"));
        assert!(!m("/", "a.txt"));
    }

    #[test]
    fn literal_paths_match_exactly() {
        assert!(m("app/main.py", "app/main.py"));
        assert!(!m("app/main.py", "app/utils.py"));
        assert!(!m("pelican", "pelican.txt"));
    }

    #[test]
    fn literal_prefix_and_depth() {
        let p = GlobPattern::new("src/app/**/*.rs");
        assert_eq!(p.literal_prefix(), (PathBuf::from("src/app"), 2));
        assert_eq!(p.max_depth(), None);

        let p = GlobPattern::new("src/*.rs");
        assert_eq!(p.literal_prefix(), (PathBuf::from("src"), 1));
        assert_eq!(p.max_depth(), Some(2));

        let p = GlobPattern::new("README.md");
        assert_eq!(p.literal_prefix(), (PathBuf::new(), 0));

        let p = GlobPattern::new("../*.rs");
        assert_eq!(p.literal_prefix(), (PathBuf::new(), 0));
    }

    #[test]
    fn dot_dot_segment_never_matches_walked_names() {
        assert!(!m("../secret.txt", "secret.txt"));
    }

    /// **Scenario**: many `**` segments stay cheap and still match correctly.
    #[test]
    fn many_recursive_segments() {
        let p = GlobPattern::new("**/a/**/b/**/c/**/d/**/*.txt");
        assert!(p.matches("x/a/y/b/z/c/w/d/v/f.txt"));
        assert!(!p.matches("x/a/y/b/z/c/w/e/v/f.txt"));
        let deep = vec!["q"; 200].join("/");
        assert!(!p.matches(&deep));
    }
}
