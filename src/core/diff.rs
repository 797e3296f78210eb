use crate::domain::model::{DiffResult, RelationshipRecord, RelationshipSet};

/// `left` 中不在 `right` 的帳號，依 `left` 的迭代順序輸出。比對為精確字串相等。
fn one_sided(left: &RelationshipSet, right: &RelationshipSet) -> Vec<RelationshipRecord> {
    left.iter()
        .filter(|(username, _)| !right.contains(username))
        .map(|(username, timestamp)| RelationshipRecord::new(username, timestamp))
        .collect()
}

pub fn diff(following: &RelationshipSet, followers: &RelationshipSet) -> DiffResult {
    let result = DiffResult {
        not_following_back: one_sided(following, followers),
        not_followed_by_you: one_sided(followers, following),
    };

    tracing::debug!(
        "Diff of {} following / {} followers: {} not following back, {} not followed by you",
        following.len(),
        followers.len(),
        result.not_following_back.len(),
        result.not_followed_by_you.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: &[(&str, Option<i64>)]) -> RelationshipSet {
        let mut set = RelationshipSet::source_ordered();
        for (username, timestamp) in entries {
            set.insert(*username, *timestamp);
        }
        set
    }

    #[test]
    fn test_end_to_end_example() {
        let following = set(&[("alice", Some(100)), ("bob", Some(200))]);
        let followers = set(&[("bob", Some(200)), ("carol", Some(300))]);

        let result = diff(&following, &followers);

        assert_eq!(
            result.not_following_back,
            vec![RelationshipRecord::new("alice", Some(100))]
        );
        assert_eq!(
            result.not_followed_by_you,
            vec![RelationshipRecord::new("carol", Some(300))]
        );
    }

    #[test]
    fn test_membership_iff_absent_from_other_side() {
        let a = set(&[("u1", None), ("u2", Some(2)), ("u3", None), ("u4", Some(4))]);
        let b = set(&[("u2", Some(9)), ("u4", None), ("u5", None)]);

        let result = diff(&a, &b);
        for (username, _) in a.iter() {
            let emitted = result
                .not_following_back
                .iter()
                .any(|r| r.username == username);
            assert_eq!(emitted, !b.contains(username), "user {username}");
        }
        for record in &result.not_following_back {
            assert!(!b.contains(&record.username));
        }
    }

    #[test]
    fn test_swapping_inputs_swaps_sides() {
        let a = set(&[("x", Some(1)), ("y", Some(2)), ("z", None)]);
        let b = set(&[("y", Some(3)), ("w", Some(4))]);

        let forward = diff(&a, &b);
        let backward = diff(&b, &a);

        assert_eq!(forward.not_following_back, backward.not_followed_by_you);
        assert_eq!(forward.not_followed_by_you, backward.not_following_back);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let a = set(&[("m", Some(1)), ("n", Some(2)), ("o", Some(3))]);
        let b = set(&[("n", Some(2))]);
        assert_eq!(diff(&a, &b), diff(&a, &b));
    }

    #[test]
    fn test_empty_sides() {
        let empty = RelationshipSet::unordered();
        let a = set(&[("only", Some(1))]);

        let result = diff(&a, &empty);
        assert_eq!(result.not_following_back.len(), 1);
        assert!(result.not_followed_by_you.is_empty());

        assert_eq!(diff(&empty, &empty), DiffResult::default());
    }

    #[test]
    fn test_case_differences_do_not_match() {
        let following = set(&[("Alice", None)]);
        let followers = set(&[("alice", None)]);
        let result = diff(&following, &followers);
        assert_eq!(result.not_following_back.len(), 1);
        assert_eq!(result.not_followed_by_you.len(), 1);
    }
}
