//! Derivation of the registry tags a freshly built image receives

use crate::version::index::VersionGroupMap;
use crate::version::semver::Version;

/// One retag-and-push action. Source and destination are bare tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOperation {
    pub source_tag: String,
    pub destination_tag: String,
}

impl TagOperation {
    fn push(tag: String) -> Self {
        Self {
            source_tag: tag.clone(),
            destination_tag: tag,
        }
    }

    fn retag(source_tag: &str, destination_tag: String) -> Self {
        Self {
            source_tag: source_tag.to_string(),
            destination_tag,
        }
    }

    /// Whether this only pushes an existing tag
    pub fn is_push_only(&self) -> bool {
        self.source_tag == self.destination_tag
    }
}

/// Ordered tag operations for `version`, built as `<x.y.z>-<distro>`.
///
/// The exact distro tag is always pushed first. With `move_latest` the run
/// also owns the unsuffixed tags: `x.y.z`, then `x.y` and `x.y-<distro>` when
/// `version` leads its minor line, then `latest` and `<distro>` when it is the
/// global latest. Without it only `x.y-<distro>` may move.
pub fn derive_tag_plan(
    version: &Version,
    distro: &str,
    groups: &VersionGroupMap,
    global_latest: Option<&Version>,
    move_latest: bool,
) -> Vec<TagOperation> {
    let exact = version.exact_key();
    let major_minor = version.major_minor_key();
    let source = format!("{}-{}", exact, distro);
    let group_best = groups.is_group_best(version);

    let mut plan = vec![TagOperation::push(source.clone())];

    if move_latest {
        plan.push(TagOperation::retag(&source, exact));
        if group_best {
            plan.push(TagOperation::retag(&source, major_minor.clone()));
            plan.push(TagOperation::retag(&source, format!("{}-{}", major_minor, distro)));
        }
        if global_latest == Some(version) {
            plan.push(TagOperation::retag(&source, "latest".to_string()));
            plan.push(TagOperation::retag(&source, distro.to_string()));
        }
    } else if group_best {
        plan.push(TagOperation::retag(&source, format!("{}-{}", major_minor, distro)));
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::index::select_global_latest;
    use crate::version::semver::parse;
    use rstest::rstest;

    fn destinations(plan: &[TagOperation]) -> Vec<&str> {
        plan.iter().map(|op| op.destination_tag.as_str()).collect()
    }

    fn plan_for(candidate: &str, known: &[&str], move_latest: bool) -> Vec<TagOperation> {
        let groups = VersionGroupMap::new().fold(known.iter().copied());
        let latest = select_global_latest(groups.values());
        derive_tag_plan(
            &parse(candidate).unwrap(),
            "slim",
            &groups,
            latest.as_ref(),
            move_latest,
        )
    }

    #[test]
    fn full_tag_set_for_group_and_global_max() {
        let plan = plan_for("2.11.1", &["2.10.7", "2.11.0", "2.11.1"], true);

        assert_eq!(
            destinations(&plan),
            vec!["2.11.1-slim", "2.11.1", "2.11", "2.11-slim", "latest", "slim"]
        );
        assert!(plan[0].is_push_only());
        assert!(plan[1..].iter().all(|op| op.source_tag == "2.11.1-slim"));
    }

    #[rstest]
    #[case("2.10.2", &["2.10.2", "2.10.3"], true, vec!["2.10.2-slim", "2.10.2"])]
    #[case("2.10.2", &["2.10.2", "2.10.3"], false, vec!["2.10.2-slim"])]
    #[case("2.10.3", &["2.10.3", "2.11.0"], true, vec!["2.10.3-slim", "2.10.3", "2.10", "2.10-slim"])]
    #[case("2.10.3", &["2.10.3", "2.11.0"], false, vec!["2.10.3-slim", "2.10-slim"])]
    #[case("2.11.0", &["2.10.3", "2.11.0"], false, vec!["2.11.0-slim", "2.11-slim"])]
    fn plan_depends_on_group_and_latest_position(
        #[case] candidate: &str,
        #[case] known: &[&str],
        #[case] move_latest: bool,
        #[case] expected: Vec<&str>,
    ) {
        let plan = plan_for(candidate, known, move_latest);

        assert_eq!(destinations(&plan), expected);
    }

    #[test]
    fn latest_aliases_only_move_for_the_global_latest() {
        let groups = VersionGroupMap::new().fold(["2.10.3", "2.11.0"]);
        let stale = parse("2.10.3").unwrap();

        let plan = derive_tag_plan(&parse("2.11.0").unwrap(), "alpine", &groups, Some(&stale), true);

        assert_eq!(
            destinations(&plan),
            vec!["2.11.0-alpine", "2.11.0", "2.11", "2.11-alpine"]
        );
    }

    #[test]
    fn no_latest_aliases_without_any_latest() {
        let groups = VersionGroupMap::new().fold(["2.10.3"]);

        let plan = derive_tag_plan(&parse("2.10.3").unwrap(), "slim", &groups, None, true);

        assert_eq!(
            destinations(&plan),
            vec!["2.10.3-slim", "2.10.3", "2.10", "2.10-slim"]
        );
    }

    #[test]
    fn prefixed_versions_produce_unprefixed_tags() {
        let plan = plan_for("v3.0.0", &["3.0.0"], true);

        assert_eq!(
            destinations(&plan),
            vec!["3.0.0-slim", "3.0.0", "3.0", "3.0-slim", "latest", "slim"]
        );
    }
}
