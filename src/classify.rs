//! Response classification against the run's exclusion rules.
//!
//! An [`ExclusionSet`] is the union of status codes, exact body sizes, and
//! one inclusive size range treated as noise. It is assembled from operator
//! flags, augmented once by calibration, and read-only for the rest of the
//! run. The [`Classifier`] is a pure function of a single outcome and the
//! frozen set.

use std::collections::HashSet;

use crate::ProbeOutcome;

// ─────────────────────────────────────────────────────────────────────────────
// Size range
// ─────────────────────────────────────────────────────────────────────────────

/// Inclusive byte-size range excluded as noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
    pub min: u64,
    pub max: u64,
}

impl SizeRange {
    /// Parse a range spec like `"100-200"`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s.splitn(2, '-').collect();
        if parts.len() != 2 {
            return Err(format!("invalid size range '{s}', expected MIN-MAX"));
        }
        let min = parts[0]
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("invalid range minimum: '{}'", parts[0]))?;
        let max = parts[1]
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("invalid range maximum: '{}'", parts[1]))?;
        if max < min {
            return Err(format!("invalid range: {min} > {max}"));
        }
        Ok(Self { min, max })
    }

    /// Returns true when `size` falls inside the range.
    pub fn contains(&self, size: u64) -> bool {
        size >= self.min && size <= self.max
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Exclusion set
// ─────────────────────────────────────────────────────────────────────────────

/// Union of noise rules: any matching rule marks a response as noise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    codes: HashSet<u16>,
    sizes: HashSet<u64>,
    range: Option<SizeRange>,
}

impl ExclusionSet {
    /// Empty set — everything is reportable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated status-code list like `"404,500"` into the
    /// code rules. Empty input adds nothing.
    pub fn parse_codes(&mut self, list: &str) -> Result<(), String> {
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let code = part
                .parse::<u16>()
                .map_err(|_| format!("invalid status code: '{part}'"))?;
            self.codes.insert(code);
        }
        Ok(())
    }

    /// Parse a comma-separated byte-size list like `"0,512,1024"`.
    pub fn parse_sizes(&mut self, list: &str) -> Result<(), String> {
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let size = part
                .parse::<u64>()
                .map_err(|_| format!("invalid size: '{part}'"))?;
            self.sizes.insert(size);
        }
        Ok(())
    }

    /// Add one status code rule.
    pub fn insert_code(&mut self, code: u16) {
        self.codes.insert(code);
    }

    /// Add one exact-size rule.
    pub fn insert_size(&mut self, size: u64) {
        self.sizes.insert(size);
    }

    /// Activate the size-range rule.
    pub fn set_range(&mut self, range: SizeRange) {
        self.range = Some(range);
    }

    /// Returns true when `status` is an excluded code.
    pub fn excludes_status(&self, status: u16) -> bool {
        self.codes.contains(&status)
    }

    /// Returns true when `size` matches an exact-size rule or falls inside
    /// the active range.
    pub fn excludes_size(&self, size: u64) -> bool {
        self.sizes.contains(&size) || self.range.map(|r| r.contains(size)).unwrap_or(false)
    }

    /// Returns true when any rule matches.
    pub fn is_noise(&self, status: u16, size: u64) -> bool {
        self.excludes_status(status) || self.excludes_size(size)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classifier
// ─────────────────────────────────────────────────────────────────────────────

/// Reportability decision for probe outcomes.
#[derive(Debug, Clone)]
pub struct Classifier {
    exclusions: ExclusionSet,
    only_success: bool,
}

impl Classifier {
    /// Build a classifier over a frozen exclusion set.
    pub fn new(exclusions: ExclusionSet, only_success: bool) -> Self {
        Self {
            exclusions,
            only_success,
        }
    }

    /// Decide whether `outcome` should reach the sink.
    ///
    /// Transport failures are reported as error lines; skipped candidates
    /// never are. Responses pass when no exclusion rule matches (or, in
    /// only-success mode, exactly when the status is 200).
    pub fn reportable(&self, outcome: &ProbeOutcome) -> bool {
        match outcome {
            ProbeOutcome::Failure { .. } => true,
            ProbeOutcome::Skipped => false,
            ProbeOutcome::Success { status, size, .. } => {
                if self.only_success {
                    *status == 200
                } else {
                    !self.exclusions.is_noise(*status, *size)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(status: u16, size: u64) -> ProbeOutcome {
        ProbeOutcome::Success {
            url: "http://t/x".to_string(),
            status,
            size,
            location: None,
        }
    }

    // ── SizeRange ──────────────────────────────────────────────────────────

    #[test]
    fn test_size_range_parse() {
        let r = SizeRange::parse("100-200").unwrap();
        assert_eq!(r, SizeRange { min: 100, max: 200 });
    }

    #[test]
    fn test_size_range_parse_invalid() {
        assert!(SizeRange::parse("200-100").is_err());
        assert!(SizeRange::parse("100").is_err());
        assert!(SizeRange::parse("a-b").is_err());
    }

    #[test]
    fn test_size_range_bounds_inclusive() {
        let r = SizeRange { min: 100, max: 200 };
        assert!(r.contains(100));
        assert!(r.contains(150));
        assert!(r.contains(200));
        assert!(!r.contains(99));
        assert!(!r.contains(201));
    }

    // ── ExclusionSet ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_codes() {
        let mut set = ExclusionSet::new();
        set.parse_codes("404, 500").unwrap();
        assert!(set.excludes_status(404));
        assert!(set.excludes_status(500));
        assert!(!set.excludes_status(200));
    }

    #[test]
    fn test_parse_codes_empty_adds_nothing() {
        let mut set = ExclusionSet::new();
        set.parse_codes("").unwrap();
        assert!(!set.excludes_status(404));
    }

    #[test]
    fn test_parse_codes_invalid() {
        let mut set = ExclusionSet::new();
        assert!(set.parse_codes("404,notacode").is_err());
    }

    #[test]
    fn test_parse_sizes() {
        let mut set = ExclusionSet::new();
        set.parse_sizes("0,512").unwrap();
        assert!(set.excludes_size(0));
        assert!(set.excludes_size(512));
        assert!(!set.excludes_size(513));
    }

    #[test]
    fn test_rules_are_a_union() {
        let mut set = ExclusionSet::new();
        set.insert_code(404);
        set.insert_size(512);
        set.set_range(SizeRange { min: 100, max: 200 });

        // each rule alone is enough
        assert!(set.is_noise(404, 9999));
        assert!(set.is_noise(200, 512));
        assert!(set.is_noise(200, 150));
        assert!(!set.is_noise(200, 9999));
    }

    // ── Classifier ─────────────────────────────────────────────────────────

    #[test]
    fn test_failure_is_reportable() {
        let classifier = Classifier::new(ExclusionSet::new(), false);
        let outcome = ProbeOutcome::Failure {
            url: "http://t/x".to_string(),
            error: "timeout".to_string(),
        };
        assert!(classifier.reportable(&outcome));
    }

    #[test]
    fn test_skipped_is_never_reportable() {
        let classifier = Classifier::new(ExclusionSet::new(), false);
        assert!(!classifier.reportable(&ProbeOutcome::Skipped));
    }

    #[test]
    fn test_excluded_code_suppressed() {
        let mut set = ExclusionSet::new();
        set.insert_code(404);
        let classifier = Classifier::new(set, false);
        assert!(!classifier.reportable(&success(404, 100)));
        assert!(classifier.reportable(&success(403, 100)));
    }

    #[test]
    fn test_calibrated_size_suppresses_legit_status() {
        // Scenario B: a 200 whose size matches the calibrated not-found page
        // size is noise.
        let mut set = ExclusionSet::new();
        set.insert_size(512);
        let classifier = Classifier::new(set, false);
        assert!(!classifier.reportable(&success(200, 512)));
        assert!(classifier.reportable(&success(200, 511)));
    }

    #[test]
    fn test_size_range_scenario() {
        // Scenario D: [100,200] suppresses 150, reports 250.
        let mut set = ExclusionSet::new();
        set.set_range(SizeRange { min: 100, max: 200 });
        let classifier = Classifier::new(set, false);
        assert!(!classifier.reportable(&success(200, 150)));
        assert!(classifier.reportable(&success(200, 250)));
    }

    #[test]
    fn test_only_success_mode() {
        let classifier = Classifier::new(ExclusionSet::new(), true);
        assert!(classifier.reportable(&success(200, 10)));
        assert!(!classifier.reportable(&success(301, 10)));
        assert!(!classifier.reportable(&success(403, 10)));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let mut set = ExclusionSet::new();
        set.insert_code(404);
        set.insert_size(512);
        let classifier = Classifier::new(set, false);

        let outcome = success(200, 512);
        let first = classifier.reportable(&outcome);
        let second = classifier.reportable(&outcome);
        assert_eq!(first, second);
    }
}
