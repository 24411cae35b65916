//! Filter module for the log shipper.
//!
//! Decides which bus messages are shipped, based on the declared sources and
//! the success flag of the step that produced them.

use std::fmt;
use std::str::FromStr;

use log_shipper_shared::LogMessage;

/// How a message's origin is compared against the accepted sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The message's `source` must equal one of the accepted sources.
    #[default]
    ExactAnyHop,
    /// The most recent hop of the message's source path must equal one of
    /// the accepted sources.
    LastHopOnly,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact-any-hop" | "exact" => Ok(Self::ExactAnyHop),
            "last-hop-only" | "last-hop" | "last" => Ok(Self::LastHopOnly),
            other => Err(format!("unknown match mode '{}'", other)),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactAnyHop => write!(f, "exact-any-hop"),
            Self::LastHopOnly => write!(f, "last-hop-only"),
        }
    }
}

/// Inclusion rules for bus messages.
///
/// Loaded once when the pipeline starts and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Accepted sources. Empty accepts every source.
    pub inputs: Vec<String>,
    /// How sources are matched.
    pub match_mode: MatchMode,
    /// Success flag a message must carry. `None` accepts both.
    pub required_success: Option<bool>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            match_mode: MatchMode::default(),
            required_success: Some(true),
        }
    }
}

impl FilterConfig {
    /// Split a comma-separated source list, dropping blank entries.
    pub fn parse_inputs(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn accept(&self, msg: &LogMessage) -> bool {
        accept(msg, self)
    }
}

/// Whether a message passes the filter.
///
/// A message is accepted when its origin matches one of the accepted sources
/// (or none are configured) and, if a success state is required, its success
/// flag equals that state.
pub fn accept(msg: &LogMessage, config: &FilterConfig) -> bool {
    if !config.inputs.is_empty() {
        let origin = match config.match_mode {
            MatchMode::ExactAnyHop => msg.source.as_str(),
            MatchMode::LastHopOnly => msg.last_hop(),
        };
        if !config.inputs.iter().any(|input| input == origin) {
            return false;
        }
    }

    match config.required_success {
        Some(required) => msg.source_success == required,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn msg(source: &str) -> LogMessage {
        let time = DateTime::parse_from_rfc3339("2024-03-07T10:00:00Z").unwrap();
        LogMessage::new(time, source, "body")
    }

    fn config(inputs: &[&str]) -> FilterConfig {
        FilterConfig {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            ..FilterConfig::default()
        }
    }

    #[test]
    fn test_empty_inputs_accept_all_sources() {
        let config = config(&[]);
        assert!(accept(&msg("a"), &config));
        assert!(accept(&msg("anything"), &config));
    }

    #[test]
    fn test_exact_match() {
        let config = config(&["a", "c"]);
        assert!(accept(&msg("a"), &config));
        assert!(accept(&msg("c"), &config));
        assert!(!accept(&msg("b"), &config));
        assert!(!accept(&msg("aa"), &config));
    }

    #[test]
    fn test_exact_mode_ignores_source_path() {
        let config = config(&["grok"]);
        let m = msg("docker").with_source_path(["docker", "grok"]);
        assert!(!accept(&m, &config));
    }

    #[test]
    fn test_last_hop_mode() {
        let config = FilterConfig {
            match_mode: MatchMode::LastHopOnly,
            ..config(&["grok"])
        };

        let via_grok = msg("docker").with_source_path(["docker", "grok"]);
        let grok_first = msg("docker").with_source_path(["grok", "docker"]);
        let no_path = msg("grok");

        assert!(accept(&via_grok, &config));
        assert!(!accept(&grok_first, &config));
        assert!(accept(&no_path, &config));
    }

    #[test]
    fn test_required_success_default_drops_failures() {
        let config = config(&[]);
        assert!(accept(&msg("a"), &config));
        assert!(!accept(&msg("a").with_success(false), &config));
    }

    #[test]
    fn test_required_failure() {
        let config = FilterConfig {
            required_success: Some(false),
            ..config(&["a"])
        };
        assert!(accept(&msg("a").with_success(false), &config));
        assert!(!accept(&msg("a"), &config));
    }

    #[test]
    fn test_success_check_disabled() {
        let config = FilterConfig {
            required_success: None,
            ..config(&["a"])
        };
        assert!(accept(&msg("a"), &config));
        assert!(accept(&msg("a").with_success(false), &config));
        assert!(!accept(&msg("b"), &config));
    }

    #[test]
    fn test_accept_matches_definition_for_all_combinations() {
        let sources = ["a", "b", "c"];
        let input_sets: [&[&str]; 4] = [&[], &["a"], &["a", "b"], &["c"]];

        for inputs in input_sets {
            for required in [None, Some(true), Some(false)] {
                let config = FilterConfig {
                    required_success: required,
                    ..config(inputs)
                };
                for source in sources {
                    for success in [true, false] {
                        let m = msg(source).with_success(success);
                        let expected = (inputs.is_empty() || inputs.contains(&source))
                            && required.map_or(true, |r| r == success);
                        assert_eq!(
                            accept(&m, &config),
                            expected,
                            "inputs={:?} required={:?} source={} success={}",
                            inputs,
                            required,
                            source,
                            success
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_parse_inputs() {
        assert_eq!(FilterConfig::parse_inputs("a, b,,c "), vec!["a", "b", "c"]);
        assert!(FilterConfig::parse_inputs("").is_empty());
        assert!(FilterConfig::parse_inputs(" , ").is_empty());
    }

    #[test]
    fn test_match_mode_from_str() {
        assert_eq!("exact-any-hop".parse::<MatchMode>(), Ok(MatchMode::ExactAnyHop));
        assert_eq!("Last-Hop-Only".parse::<MatchMode>(), Ok(MatchMode::LastHopOnly));
        assert!("sometimes".parse::<MatchMode>().is_err());
        assert_eq!(MatchMode::LastHopOnly.to_string(), "last-hop-only");
    }
}
