/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Recoverable problems collected during a run and printed once at the end

use std::fmt::Write;
use std::path::Path;

/// Where users are asked to report problems
pub const ISSUE_TRACKER_URL: &str =
    "https://github.com/mkoreneff/iommu_info_generate/issues/new/choose";

/// One recoverable problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// One-line description
    pub problem: String,
    /// Extra text for the bug report, e.g. a command to run and its output
    pub detail: Option<String>,
}

/// Ordered collection of recoverable problems
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem and log it
    pub fn record(&mut self, problem: impl Into<String>, detail: Option<String>) {
        let problem = problem.into();
        log::warn!("{problem}");
        self.diagnostics.push(Diagnostic { problem, detail });
    }

    /// Record a problem with a suggested command for inspecting a local file
    ///
    /// `contents` is what the file actually holds; without it (the file is
    /// missing or unreadable) only the problem is recorded.
    pub fn record_with_file(
        &mut self,
        problem: impl Into<String>,
        file: &Path,
        contents: Option<&str>,
    ) {
        let detail = contents.map(|contents| format!("cat {}\n{}", file.display(), contents.trim()));
        self.record(problem, detail);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Render the block users paste into a bug report
    pub fn render(&self, dump_path: Option<&Path>) -> String {
        let separator = "-".repeat(30);
        let mut out = String::new();
        let _ = writeln!(out, "please report this on github: {ISSUE_TRACKER_URL}");
        let _ = writeln!(out, "copy and paste the text below into the issue");
        let _ = writeln!(out, "{separator}");
        for diagnostic in &self.diagnostics {
            let _ = writeln!(out, "{}", diagnostic.problem);
            if let Some(detail) = &diagnostic.detail {
                let _ = writeln!(out, "{detail}");
            }
        }
        let _ = writeln!(out, "{separator}");
        if let Some(path) = dump_path {
            let _ = writeln!(
                out,
                "you might also like to include the contents of {}",
                path.display()
            );
        }
        out
    }
}
