// Company data collectors. Live scrapers and registry API clients plug in
// here; each one only has to yield raw records, the pipeline does the rest.

pub mod demo;

use crate::constants;
use crate::types::CompanySource;

/// Build a collector from its user-facing name (CLI `--sources` values)
pub fn create_source(source_name: &str) -> Option<Box<dyn CompanySource>> {
    match source_name {
        constants::DEMO_SOURCE => Some(Box::new(demo::DemoRosterSource::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_source_known_and_unknown() {
        assert!(create_source(constants::DEMO_SOURCE).is_some());
        assert!(create_source("nonexistent").is_none());
    }
}
