use std::collections::HashSet;

use release_sync::sync::compute_candidates;
use release_sync::version::index::{VersionGroupMap, select_global_latest, select_global_latest_raw};
use release_sync::version::semver::parse;

#[test]
fn parse_accepts_only_three_numeric_components() {
    let v = parse("v1.2.3").unwrap();
    assert_eq!((v.major(), v.minor(), v.patch()), (1, 2, 3));

    assert!(parse("1.2").is_none());
    assert!(parse("1.2.3-rc1").is_none());
}

#[test]
fn fold_keeps_best_patch_and_ignores_repeats() {
    let map = VersionGroupMap::new().fold(["2.10.1", "2.10.3", "2.10.2"]);
    let again = map.clone().fold(["2.10.1", "2.10.3", "2.10.2"]);

    assert_eq!(map.get("2.10").unwrap().exact_key(), "2.10.3");
    assert_eq!(map, again);
}

#[test]
fn global_latest_is_not_lexical() {
    assert_eq!(
        select_global_latest_raw(&["2.9.5".to_string(), "2.10.1".to_string()]),
        Some("2.10.1".to_string())
    );
}

#[test]
fn global_latest_of_group_map_spans_groups() {
    let map = VersionGroupMap::new().fold(["1.9.9", "2.0.1", "2.0.0", "1.10.0"]);

    assert_eq!(
        select_global_latest(map.values()).map(|v| v.exact_key()),
        Some("2.0.1".to_string())
    );
    assert!(select_global_latest(VersionGroupMap::new().values()).is_none());
}

#[test]
fn candidates_skip_published_and_malformed_tags() {
    let existing: HashSet<String> = ["2.10.1".to_string()].into_iter().collect();

    let set = compute_candidates(["v2.10.1", "v2.10.2", "bad-tag"], &existing);

    assert_eq!(set.keys().cloned().collect::<Vec<_>>(), vec!["2.10.2"]);
}
