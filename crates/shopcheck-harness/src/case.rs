//! Test cases and suite registration

use crate::context::TestContext;
use async_trait::async_trait;
use shopcheck_core::Result;

/// One end-to-end test
///
/// The runner opens the browser before `setup` and closes it after
/// `teardown`; both default to doing nothing extra.
#[async_trait]
pub trait TestCase: Send + Sync {
    /// Stable identifier, e.g. `login::login_success`
    fn id(&self) -> &str;

    /// Ordering directive; tests without one run after all ordered tests
    fn order(&self) -> Option<u32> {
        None
    }

    async fn setup(&self, _ctx: &TestContext) -> Result<()> {
        Ok(())
    }

    /// The test body
    async fn call(&self, ctx: &TestContext) -> Result<()>;

    async fn teardown(&self, _ctx: &TestContext) -> Result<()> {
        Ok(())
    }
}

/// Registered test cases
#[derive(Default)]
pub struct Suite {
    cases: Vec<Box<dyn TestCase>>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, case: Box<dyn TestCase>) {
        self.cases.push(case);
    }

    /// Builder form of [`Suite::add`]
    pub fn with(mut self, case: impl TestCase + 'static) -> Self {
        self.add(Box::new(case));
        self
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Cases in execution order
    ///
    /// Sorted by `order`; ties and unordered cases keep registration order,
    /// unordered cases last. `filter` keeps ids containing the substring.
    pub fn ordered(&self, filter: Option<&str>) -> Vec<&dyn TestCase> {
        let mut cases: Vec<&dyn TestCase> = self
            .cases
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| filter.map_or(true, |f| c.id().contains(f)))
            .collect();
        cases.sort_by_key(|c| c.order().unwrap_or(u32::MAX));
        cases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, Option<u32>);

    #[async_trait]
    impl TestCase for Named {
        fn id(&self) -> &str {
            self.0
        }

        fn order(&self) -> Option<u32> {
            self.1
        }

        async fn call(&self, _ctx: &TestContext) -> Result<()> {
            Ok(())
        }
    }

    fn ids(cases: &[&dyn TestCase]) -> Vec<String> {
        cases.iter().map(|c| c.id().to_string()).collect()
    }

    #[test]
    fn test_ordering_directives() {
        let suite = Suite::new()
            .with(Named("unordered_a", None))
            .with(Named("checkout", Some(9)))
            .with(Named("login", Some(1)))
            .with(Named("unordered_b", None))
            .with(Named("cart", Some(8)));

        assert_eq!(
            ids(&suite.ordered(None)),
            vec!["login", "cart", "checkout", "unordered_a", "unordered_b"]
        );
    }

    #[test]
    fn test_equal_order_keeps_registration() {
        let suite = Suite::new()
            .with(Named("second", Some(2)))
            .with(Named("first", Some(2)));
        assert_eq!(ids(&suite.ordered(None)), vec!["second", "first"]);
    }

    #[test]
    fn test_filter() {
        let suite = Suite::new()
            .with(Named("login::login_success", Some(1)))
            .with(Named("checkout::happy_path", Some(9)));
        assert_eq!(ids(&suite.ordered(Some("checkout"))), vec!["checkout::happy_path"]);
        assert!(suite.ordered(Some("nothing")).is_empty());
        assert_eq!(suite.len(), 2);
    }
}
