//! Kernel matcher test utilities

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use best_kmod::version::error::MatcherError;
use best_kmod::version::matcher::KernelMatcher;

/// Matcher returning canned answers per kernel release and recording every call
#[derive(Default)]
pub struct CountingMatcher {
    answers: HashMap<String, String>,
    calls: Mutex<Vec<(String, String, Vec<String>)>>,
}

impl CountingMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, kernel_release: &str, package: &str) -> Self {
        self.answers
            .insert(kernel_release.to_string(), package.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Candidates passed on the most recent call
    pub fn last_candidates(&self) -> Option<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(_, _, candidates)| candidates.clone())
    }
}

#[async_trait]
impl KernelMatcher for CountingMatcher {
    async fn best_match(
        &self,
        distribution: &str,
        kernel_release: &str,
        candidates: &[String],
    ) -> Result<String, MatcherError> {
        self.calls.lock().unwrap().push((
            distribution.to_string(),
            kernel_release.to_string(),
            candidates.to_vec(),
        ));

        match self.answers.get(kernel_release) {
            Some(package) if candidates.contains(package) => Ok(package.clone()),
            _ => Err(MatcherError::NoMatch {
                diagnostic: format!("no package for {kernel_release} on {distribution}"),
            }),
        }
    }
}
