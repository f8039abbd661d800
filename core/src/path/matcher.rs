use super::FolderPath;

/// A candidate folder together with its similarity score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredFolder {
    pub folder: FolderPath,
    pub score: i32,
}

/// Scores `candidate` against `suggestion`.
///
/// Each leading segment the two share counts twice; every segment of difference in
/// depth costs one. Comparison stops at the first mismatching segment.
pub fn score(candidate: &FolderPath, suggestion: &FolderPath) -> i32 {
    let shared = candidate.segments().iter()
        .zip(suggestion.segments())
        .take_while(|(a, b)| a == b)
        .count() as i32;
    let depth_difference = (candidate.len() as i32 - suggestion.len() as i32).abs();
    2 * shared - depth_difference
}

/// Returns the candidates with a positive score, best first, at most `top_n` of them.
/// Candidates with equal scores keep their input order.
pub fn rank(candidates: &[FolderPath], suggestion: &FolderPath, top_n: usize) -> Vec<ScoredFolder> {
    let mut scored: Vec<ScoredFolder> = candidates.iter()
        .map(|folder| ScoredFolder { folder: folder.clone(), score: score(folder, suggestion) })
        .filter(|scored| scored.score > 0)
        .collect();
    // `sort_by` is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(top_n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<FolderPath> {
        list.iter().map(|p| FolderPath::parse(p)).collect()
    }

    #[test]
    fn score_rewards_prefix_and_penalizes_depth() {
        let suggestion = FolderPath::parse("proj/notes/archive");
        assert_eq!(score(&FolderPath::parse("proj/notes/archive"), &suggestion), 6);
        assert_eq!(score(&FolderPath::parse("proj/notes"), &suggestion), 3);
        assert_eq!(score(&FolderPath::parse("proj/ideas"), &suggestion), 1);
        assert_eq!(score(&FolderPath::parse("personal/journal"), &suggestion), -1);
    }

    #[test]
    fn score_stops_at_first_mismatch() {
        let suggestion = FolderPath::parse("a/b/c");
        assert_eq!(score(&FolderPath::parse("x/b/c"), &suggestion), 0);
    }

    #[test]
    fn score_normalizes_before_comparing() {
        assert_eq!(score(&FolderPath::parse("Proj/My_Notes"), &FolderPath::parse("proj/my notes")), 4);
    }

    #[test]
    fn identical_path_scores_at_least_as_high() {
        let a = FolderPath::parse("work/clients/acme");
        for other in ["home/clients/acme", "work/people/acme", "work/clients/globex", "work", "x"] {
            let b = FolderPath::parse(other);
            assert!(score(&a, &a) >= score(&a, &b), "{other}");
        }
    }

    #[test]
    fn rank_orders_and_excludes() {
        let folders = paths(&["proj/notes", "proj/ideas", "personal/journal"]);
        let ranked = rank(&folders, &FolderPath::parse("proj/notes/archive"), 5);
        let order: Vec<String> = ranked.iter().map(|s| s.folder.to_string()).collect();
        assert_eq!(order, ["proj/notes", "proj/ideas"]);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn rank_is_stable_and_truncates() {
        let folders = paths(&["a/x", "a/y", "a/z", "a"]);
        let ranked = rank(&folders, &FolderPath::parse("a/q"), 2);
        let order: Vec<String> = ranked.iter().map(|s| s.folder.to_string()).collect();
        assert_eq!(order, ["a/x", "a/y"]);
    }

    #[test]
    fn rank_of_nothing_is_empty() {
        assert!(rank(&[], &FolderPath::parse("a"), 3).is_empty());
        assert!(rank(&paths(&["a"]), &FolderPath::parse("a"), 0).is_empty());
    }
}
