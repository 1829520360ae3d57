//! # Executor Configuration
//!
//! Tunables read from the process environment at startup, following the
//! teacher's `env_utils`-style `parse or default` pattern rather than a
//! dedicated config file format.

use std::env;
use std::time::Duration;

/// Tunables governing one [`crate::workflow::executor::Executor`] (spec.md §5).
#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    /// Hard ceiling on total wall-clock time for one execution.
    pub execution_timeout: Duration,
    /// Hard ceiling on wall-clock time for a single step.
    pub step_timeout: Duration,
    /// Inline/blob-reference threshold for binary parameter payloads, in bytes.
    pub inline_blob_threshold_bytes: usize,
    /// Maximum depth of tool-call recursion before a node-as-tool call fails.
    pub tool_recursion_depth: u32,
    /// Retry budget for idempotent, I/O-only steps (persistence, not node execution).
    pub step_retry_budget: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            execution_timeout: Duration::from_secs(10 * 60),
            step_timeout: Duration::from_secs(10 * 60),
            inline_blob_threshold_bytes: crate::codec::DEFAULT_INLINE_THRESHOLD_BYTES,
            tool_recursion_depth: 4,
            step_retry_budget: 1,
        }
    }
}

impl ExecutorConfig {
    /// Loads overrides from the environment, falling back to
    /// [`ExecutorConfig::default`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            execution_timeout: env_duration_secs("WORKFLOW_EXECUTION_TIMEOUT_SECS")
                .unwrap_or(defaults.execution_timeout),
            step_timeout: env_duration_secs("WORKFLOW_STEP_TIMEOUT_SECS").unwrap_or(defaults.step_timeout),
            inline_blob_threshold_bytes: env_parse("WORKFLOW_INLINE_BLOB_THRESHOLD_BYTES")
                .unwrap_or(defaults.inline_blob_threshold_bytes),
            tool_recursion_depth: env_parse("WORKFLOW_TOOL_RECURSION_DEPTH")
                .unwrap_or(defaults.tool_recursion_depth),
            step_retry_budget: env_parse("WORKFLOW_STEP_RETRY_BUDGET").unwrap_or(defaults.step_retry_budget),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_duration_secs(key: &str) -> Option<Duration> {
    env_parse::<u64>(key).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_tunables() {
        let config = ExecutorConfig::default();
        assert_eq!(config.execution_timeout, Duration::from_secs(600));
        assert_eq!(config.tool_recursion_depth, 4);
        assert_eq!(config.inline_blob_threshold_bytes, 128 * 1024);
    }
}
