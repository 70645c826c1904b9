//! Minimal TAP (Test Anything Protocol) writer for the conformance runner.

use std::fmt::Display;

pub struct Tap {
    count: usize,
    failures: usize,
    quiet: bool,
}

impl Tap {
    /// With `quiet`, passing tests are not echoed; failures and the plan
    /// still are.
    pub fn new(quiet: bool) -> Self {
        Tap {
            count: 0,
            failures: 0,
            quiet,
        }
    }

    pub fn ok(&mut self, name: impl Display) {
        self.count += 1;
        if !self.quiet {
            println!("ok {} - {}", self.count, name);
        }
    }

    pub fn not_ok(&mut self, name: impl Display, diagnostic: impl Display) {
        self.count += 1;
        self.failures += 1;
        println!("not ok {} - {}", self.count, name);
        for line in diagnostic.to_string().lines() {
            println!("  # {}", line);
        }
    }

    pub fn failure_count(&self) -> usize {
        self.failures
    }

    /// Print the trailing plan line.
    pub fn finish(self) {
        println!("1..{}", self.count);
        if self.failures > 0 {
            println!("# {} of {} failed", self.failures, self.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_failures() {
        let mut tap = Tap::new(true);
        tap.ok("a");
        tap.not_ok("b", "expected x\ngot y");
        tap.ok("c");
        assert_eq!(tap.failure_count(), 1);
        assert_eq!(tap.count, 3);
        tap.finish();
    }
}
