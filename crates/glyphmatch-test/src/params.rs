//! Regression test parameters and operations

use std::fs;
use std::path::Path;

use glyphmatch_core::BitRaster;

use crate::error::TestResult;
use crate::{golden_dir, regout_dir};

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Generate golden files
    Generate,
    /// Compare with golden files (default)
    #[default]
    Compare,
    /// Display mode - run without comparison
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, the index of the current check, the mode, and
/// whether every check so far passed.
pub struct RegParams {
    /// Name of the test (e.g., "segment")
    pub test_name: String,
    /// Current check index (incremented before each check)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    success: bool,
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// # Arguments
    ///
    /// * `test_name` - Name of the test (e.g., "segment")
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current check index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) -> bool {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
        false
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Compare two byte strings for equality
    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.index += 1;

        if data1 != data2 {
            let msg = format!(
                "Failure in {}_reg: string comparison for index {}\n\
                 {:?} vs {:?}",
                self.test_name,
                self.index,
                String::from_utf8_lossy(data1),
                String::from_utf8_lossy(data2)
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Compare two rasters for exact equality
    pub fn compare_rasters(&mut self, r1: &BitRaster, r2: &BitRaster) -> bool {
        self.index += 1;

        if r1.size() != r2.size() {
            let msg = format!(
                "Failure in {}_reg: raster comparison for index {} - size {} vs {}",
                self.test_name,
                self.index,
                r1.size(),
                r2.size()
            );
            return self.fail(msg);
        }
        if r1 != r2 {
            let msg = format!(
                "Failure in {}_reg: raster comparison for index {}\n{}\nvs\n{}",
                self.test_name, self.index, r1, r2
            );
            return self.fail(msg);
        }
        true
    }

    /// Write text output and check it against its golden counterpart
    ///
    /// In generate mode the output becomes the golden file. In compare mode
    /// a missing golden file is reported but not counted as a failure, since
    /// goldens are generated on demand.
    pub fn write_text_and_check(&mut self, text: &str, ext: &str) -> TestResult<()> {
        self.index += 1;
        fs::create_dir_all(regout_dir())?;

        let local_path = regout_dir().join(format!("{}.{:02}.{}", self.test_name, self.index, ext));
        fs::write(&local_path, text)?;

        let golden_path =
            golden_dir().join(format!("{}_golden.{:02}.{}", self.test_name, self.index, ext));

        match self.mode {
            RegTestMode::Generate => {
                fs::create_dir_all(golden_dir())?;
                fs::copy(&local_path, &golden_path)?;
                eprintln!("Generated: {}", golden_path.display());
            }
            RegTestMode::Compare => {
                if !Path::new(&golden_path).exists() {
                    eprintln!("golden file not found, skipping: {}", golden_path.display());
                    return Ok(());
                }
                let golden = fs::read_to_string(&golden_path)?;
                if golden != text {
                    let msg = format!(
                        "Failure in {}_reg, index {}: comparing {} with {}",
                        self.test_name,
                        self.index,
                        local_path.display(),
                        golden_path.display()
                    );
                    self.fail(msg);
                }
            }
            RegTestMode::Display => {}
        }
        Ok(())
    }

    /// Clean up and report results
    ///
    /// Returns `true` if all checks passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all checks have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_values_within_delta() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
    }

    #[test]
    fn test_compare_values_failure() {
        let mut rp = RegParams::new("test");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 1);
    }

    #[test]
    fn test_compare_strings() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_strings("俺".as_bytes(), "俺".as_bytes()));
        assert!(!rp.compare_strings(b"a", b"b"));
        assert_eq!(rp.index(), 2);
    }

    #[test]
    fn test_compare_rasters() {
        let mut rp = RegParams::new("test");
        let a = BitRaster::new(4).unwrap();
        let mut b = a.clone();
        assert!(rp.compare_rasters(&a, &b));
        b.set(1, 1);
        assert!(!rp.compare_rasters(&a, &b));
        assert!(!rp.compare_rasters(&a, &BitRaster::new(5).unwrap()));
    }
}
