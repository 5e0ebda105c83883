//! Partitioning and filtering of the assembled test set
//!
//! `partition_of` is the single classification rule; both the interactive
//! session and the export path call it. Filters narrow one partition and
//! never cross its boundary.

use crate::{Severity, TestEntry, TestStatus};

/// Disjoint top-level grouping of all tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    E2e,
    Atomics,
}

/// All partitions in display order
pub const PARTITIONS: [Partition; 2] = [Partition::E2e, Partition::Atomics];

impl Partition {
    pub fn label(&self) -> &'static str {
        match self {
            Partition::E2e => "E2E",
            Partition::Atomics => "Atomics",
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify a test into its partition: Atomics iff the suite field equals
/// "ATOMICS" ignoring case; E2E is the catch-all, including tests with no
/// suite at all. Total over every TestEntry.
pub fn partition_of(test: &TestEntry) -> Partition {
    match &test.metadata.suite {
        Some(suite) if suite.eq_ignore_ascii_case("ATOMICS") => Partition::Atomics,
        _ => Partition::E2e,
    }
}

/// Members of one partition, original order preserved
pub fn partition_tests<'a>(tests: &'a [TestEntry], partition: Partition) -> Vec<&'a TestEntry> {
    tests.iter().filter(|t| partition_of(t) == partition).collect()
}

/// Compound filter over an already-partitioned test set. Every selector
/// defaults to match-everything; the combined predicate is the AND of all
/// four.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    /// Case-insensitive substring over name, test id, and description
    pub search: String,
    /// `None` means "all"
    pub status: Option<TestStatus>,
    pub severity: Option<Severity>,
    pub epic: Option<String>,
}

impl FilterParams {
    /// True when every selector is at its match-everything default
    pub fn is_default(&self) -> bool {
        self.search.is_empty()
            && self.status.is_none()
            && self.severity.is_none()
            && self.epic.is_none()
    }

    /// Whether one test passes all four predicates
    pub fn matches(&self, test: &TestEntry) -> bool {
        let search = self.search.to_lowercase();
        let search_match = search.is_empty()
            || test.name.to_lowercase().contains(&search)
            || test.test_id.to_lowercase().contains(&search)
            || test
                .metadata
                .description
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .contains(&search);

        let status_match = self.status.map_or(true, |status| test.status == status);
        let severity_match = self
            .severity
            .map_or(true, |severity| test.metadata.severity == Some(severity));
        let epic_match = self
            .epic
            .as_deref()
            .map_or(true, |epic| test.metadata.epic.as_deref() == Some(epic));

        search_match && status_match && severity_match && epic_match
    }
}

/// Narrow an already-partitioned sequence. Order-preserving and idempotent;
/// default params return the input unchanged.
pub fn apply<'a>(tests: &[&'a TestEntry], params: &FilterParams) -> Vec<&'a TestEntry> {
    tests
        .iter()
        .copied()
        .filter(|test| params.matches(test))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestMetadata;
    use proptest::prelude::*;

    fn test_with(id: &str, suite: Option<&str>) -> TestEntry {
        TestEntry {
            test_id: id.to_string(),
            name: format!("name {}", id),
            full_title: format!("full {}", id),
            status: TestStatus::Passed,
            duration: 1,
            error_trace: None,
            metadata: TestMetadata {
                suite: suite.map(String::from),
                ..TestMetadata::default()
            },
            file_path: "tests/a.spec.ts".into(),
            line: 1,
            start_time: "2025-06-01T10:00:00Z".into(),
            retries: 0,
        }
    }

    // --- partitioning ---

    #[test]
    fn atomics_match_is_case_insensitive() {
        assert_eq!(partition_of(&test_with("a", Some("ATOMICS"))), Partition::Atomics);
        assert_eq!(partition_of(&test_with("b", Some("Atomics"))), Partition::Atomics);
        assert_eq!(partition_of(&test_with("c", Some("atomics"))), Partition::Atomics);
    }

    #[test]
    fn everything_else_is_e2e() {
        assert_eq!(partition_of(&test_with("a", Some("Checkout"))), Partition::E2e);
        assert_eq!(partition_of(&test_with("b", None)), Partition::E2e);
        assert_eq!(partition_of(&test_with("c", Some(""))), Partition::E2e);
    }

    #[test]
    fn partitions_cover_and_never_overlap() {
        let tests = vec![
            test_with("a", Some("Atomics")),
            test_with("b", None),
            test_with("c", Some("Search")),
            test_with("d", Some("ATOMICS")),
        ];
        let e2e = partition_tests(&tests, Partition::E2e);
        let atomics = partition_tests(&tests, Partition::Atomics);
        assert_eq!(e2e.len() + atomics.len(), tests.len());
        for test in &tests {
            let in_e2e = e2e.iter().any(|t| t.test_id == test.test_id);
            let in_atomics = atomics.iter().any(|t| t.test_id == test.test_id);
            assert!(in_e2e ^ in_atomics, "{} must be in exactly one", test.test_id);
        }
    }

    // --- filtering ---

    fn catalog() -> Vec<TestEntry> {
        let mut a = test_with("login-1", None);
        a.name = "logs in with sso".into();
        a.status = TestStatus::Failed;
        a.metadata.severity = Some(Severity::Critical);
        a.metadata.epic = Some("Auth".into());

        let mut b = test_with("cart-1", None);
        b.name = "adds item to cart".into();
        b.metadata.description = Some("Cart keeps items across sessions".into());
        b.metadata.epic = Some("Checkout".into());

        let mut c = test_with("cart-2", None);
        c.name = "clears the cart".into();
        c.status = TestStatus::Skipped;
        c.metadata.severity = Some(Severity::Minor);
        c.metadata.epic = Some("Checkout".into());

        vec![a, b, c]
    }

    #[test]
    fn default_params_return_input_unchanged() {
        let tests = catalog();
        let partition = partition_tests(&tests, Partition::E2e);
        let filtered = apply(&partition, &FilterParams::default());
        let ids: Vec<_> = filtered.iter().map(|t| t.test_id.as_str()).collect();
        assert_eq!(ids, vec!["login-1", "cart-1", "cart-2"]);
    }

    #[test]
    fn search_covers_name_id_and_description() {
        let tests = catalog();
        let partition = partition_tests(&tests, Partition::E2e);

        let by_name = apply(&partition, &FilterParams { search: "SSO".into(), ..Default::default() });
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].test_id, "login-1");

        let by_id = apply(&partition, &FilterParams { search: "cart-2".into(), ..Default::default() });
        assert_eq!(by_id.len(), 1);

        let by_description = apply(
            &partition,
            &FilterParams { search: "across sessions".into(), ..Default::default() },
        );
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].test_id, "cart-1");
    }

    #[test]
    fn selectors_combine_with_and() {
        let tests = catalog();
        let partition = partition_tests(&tests, Partition::E2e);
        let params = FilterParams {
            search: "cart".into(),
            status: Some(TestStatus::Skipped),
            severity: Some(Severity::Minor),
            epic: Some("Checkout".into()),
        };
        let filtered = apply(&partition, &params);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].test_id, "cart-2");

        // Flipping one selector to a non-matching value empties the result
        let params = FilterParams { status: Some(TestStatus::Passed), ..params };
        assert!(apply(&partition, &params).is_empty());
    }

    #[test]
    fn epic_filter_is_exact_match() {
        let tests = catalog();
        let partition = partition_tests(&tests, Partition::E2e);
        let params = FilterParams { epic: Some("Check".into()), ..Default::default() };
        assert!(apply(&partition, &params).is_empty(), "no substring matching on epic");
    }

    #[test]
    fn filtering_preserves_order() {
        let tests = catalog();
        let partition = partition_tests(&tests, Partition::E2e);
        let params = FilterParams { epic: Some("Checkout".into()), ..Default::default() };
        let ids: Vec<_> = apply(&partition, &params).iter().map(|t| t.test_id.clone()).collect();
        assert_eq!(ids, vec!["cart-1", "cart-2"]);
    }

    proptest! {
        #[test]
        fn filter_is_idempotent(
            search in "[a-z]{0,6}",
            pick_status in proptest::option::of(0..5usize),
            suites in proptest::collection::vec(proptest::option::of("[a-zA-Z]{0,8}"), 0..12),
        ) {
            let statuses = [
                TestStatus::Passed,
                TestStatus::Failed,
                TestStatus::TimedOut,
                TestStatus::Skipped,
                TestStatus::Interrupted,
            ];
            let tests: Vec<TestEntry> = suites
                .iter()
                .enumerate()
                .map(|(i, suite)| {
                    let mut t = test_with(&format!("t-{}", i), suite.as_deref());
                    t.status = statuses[i % statuses.len()];
                    t
                })
                .collect();
            let params = FilterParams {
                search,
                status: pick_status.map(|i| statuses[i]),
                severity: None,
                epic: None,
            };
            let partition = partition_tests(&tests, Partition::E2e);
            let once = apply(&partition, &params);
            let twice = apply(&once, &params);
            let once_ids: Vec<_> = once.iter().map(|t| &t.test_id).collect();
            let twice_ids: Vec<_> = twice.iter().map(|t| &t.test_id).collect();
            prop_assert_eq!(once_ids, twice_ids);
        }
    }
}
