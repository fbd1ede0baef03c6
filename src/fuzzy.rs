//! Fuzzy name resolution for user-typed entity references.
//!
//! Two distinct contracts live here and must not be conflated:
//!
//! - [`best_match`] — rank a list of candidates against a query and return
//!   the single best one, or `None` when nothing is close enough. Used to
//!   resolve task/tracker names mentioned in chat commands to concrete
//!   records.
//! - [`names_similar`] — a symmetric yes/no test for "do these two names
//!   refer to the same thing". Used to merge near-duplicate skill names.
//!   This is an equivalence-style predicate, not a ranking.
//!
//! Matching is tiered: prefix beats containment beats bounded edit distance.
//! A query that satisfies no tier resolves to nothing — callers must treat
//! that as "could not disambiguate" and never pick an arbitrary candidate.

/// Maximum edit distance accepted by the distance tier and the similarity
/// test. Anything farther apart is considered unrelated.
pub const MAX_EDIT_DISTANCE: usize = 3;

// ---------------------------------------------------------------------------
// Levenshtein
// ---------------------------------------------------------------------------

/// Classic Levenshtein edit distance (insert/delete/substitute, unit cost),
/// computed over full strings. Symmetric; `levenshtein(s, s) == 0` and
/// `levenshtein("", s) == s.chars().count()`.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (a_len, b_len) = (a_chars.len(), b_chars.len());

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Two-row DP.
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0usize; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

// ---------------------------------------------------------------------------
// Ranked best-of matching
// ---------------------------------------------------------------------------

/// How a candidate qualified, ordered best-first. `Exact` is split out so
/// ties inside a tier resolve toward literal equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MatchScore {
    /// Candidate name equals the query (case-insensitive).
    exact: bool,
    /// 0 = candidate starts with query, 1 = query contains candidate,
    /// 2 = within edit-distance threshold.
    tier: u8,
    /// Query-contained-in-candidate is preferred over the reverse: the
    /// longer containing name is the more specific match.
    query_in_candidate: bool,
    dist: usize,
}

impl MatchScore {
    /// True if `self` outranks `other`.
    fn beats(&self, other: &MatchScore) -> bool {
        if self.exact != other.exact {
            return self.exact;
        }
        if self.tier != other.tier {
            return self.tier < other.tier;
        }
        if self.query_in_candidate != other.query_in_candidate {
            return self.query_in_candidate;
        }
        self.dist < other.dist
    }
}

/// Score one candidate name against the query (both already lowercased).
fn score(query: &str, name: &str) -> Option<MatchScore> {
    let exact = query == name;
    let tier = if name.starts_with(query) {
        0
    } else if query.contains(name) {
        1
    } else {
        let d = levenshtein(query, name);
        if d > MAX_EDIT_DISTANCE {
            return None;
        }
        2
    };
    Some(MatchScore {
        exact,
        tier,
        query_in_candidate: name.contains(query),
        dist: levenshtein(query, name),
    })
}

/// Resolve a free-text name against a list of candidates, returning the
/// best-ranked one or `None` when nothing qualifies.
///
/// `name_of` extracts the matchable name from a candidate (a task's title,
/// a tracker's name). An empty query or empty candidate list never matches.
pub fn best_match<'a, T, F>(query: &str, candidates: &'a [T], name_of: F) -> Option<&'a T>
where
    F: Fn(&T) -> &str,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    let mut best: Option<(&'a T, MatchScore)> = None;
    for candidate in candidates {
        let name = name_of(candidate).to_lowercase();
        if name.is_empty() {
            continue;
        }
        if let Some(s) = score(&query, &name) {
            let better = match &best {
                Some((_, best_score)) => s.beats(best_score),
                None => true,
            };
            if better {
                best = Some((candidate, s));
            }
        }
    }

    best.map(|(c, _)| c)
}

// ---------------------------------------------------------------------------
// Symmetric similarity
// ---------------------------------------------------------------------------

/// Symmetric "same name?" test, used for deduplicating skill names.
///
/// Two names are similar if they are identical (case-insensitive), or both
/// are longer than 3 characters and one contains the other, or their edit
/// distance is within [`MAX_EDIT_DISTANCE`].
pub fn names_similar(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return true;
    }
    if a.chars().count() > 3 && b.chars().count() > 3 && (a.contains(&b) || b.contains(&a)) {
        return true;
    }
    levenshtein(&a, &b) <= MAX_EDIT_DISTANCE
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
