//! Attribution of a failing test to the student function it exercises and the file defining it.

mod source_file;
mod tested_function;

use std::path::Path;

pub use self::source_file::{
    DEFAULT_FRAMEWORK_MODULES, FrameHint, LocatedSource, SourceFileLocator, SourceStrategy,
    parse_frame_hint,
};
pub use self::tested_function::{
    DEFAULT_HELPER_PREFIXES, TestedFunctions, extract_tested_functions,
    extract_tested_functions_with, resolve_tested_function, test_call_list,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribution {
    pub tested_function: Option<String>,
    pub source: Option<LocatedSource>,
}

impl Attribution {
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_ref().map(|s| s.path.as_path())
    }
}

#[derive(Debug, Clone)]
pub struct Attributor {
    pub locator: SourceFileLocator,
    pub helper_prefixes: Vec<String>,
}

impl Attributor {
    pub fn new(locator: SourceFileLocator) -> Self {
        Self {
            locator,
            helper_prefixes: DEFAULT_HELPER_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    pub fn with_helper_prefixes(mut self, helper_prefixes: Vec<String>) -> Self {
        self.helper_prefixes = helper_prefixes;
        self
    }

    /// Unresolved pieces stay `None`; nothing here fails the run.
    pub fn attribute(
        &self,
        test_file: &Path,
        test_name: &str,
        test_source: &str,
        frame_hints: &[String],
    ) -> Attribution {
        let tested = extract_tested_functions_with(test_source, &self.helper_prefixes);
        let ground_truth = test_call_list(test_file, test_name).unwrap_or_default();
        let Some(function) = resolve_tested_function(&tested, &ground_truth) else {
            return Attribution::default();
        };
        let source = self.locator.locate(test_file, &function, frame_hints);
        Attribution {
            tested_function: Some(function),
            source,
        }
    }
}
