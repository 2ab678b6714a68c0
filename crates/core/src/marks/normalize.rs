//! Parse a `stata` mark into a canonical script and option list

use super::{Mark, MarkArg, OptionValue};
use crate::error::{Error, Result};
use std::path::PathBuf;

/// Name of the mark that routes a task through Stata
pub const STATA_MARK: &str = "stata";

/// Suffix a script must carry to be run as a do-file
pub const SCRIPT_SUFFIX: &str = "do";

pub const SCRIPT_KEY: &str = "script";
pub const OPTIONS_KEY: &str = "options";

/// Canonical form of a `stata` mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAnnotation {
    pub script: PathBuf,
    pub options: Vec<String>,
}

impl TaskAnnotation {
    /// Re-express the annotation as a mark that normalizes to itself
    pub fn to_mark(&self) -> Mark {
        Mark::new(STATA_MARK)
            .with_kwarg(SCRIPT_KEY, OptionValue::path(self.script.clone()))
            .with_kwarg(OPTIONS_KEY, self.options.clone())
    }
}

/// Normalize the `script` and `options` arguments of a `stata` mark.
///
/// `options` may be absent, one value or a sequence; every element is converted to its string
/// form so numbers and paths can be passed to Stata directly.
pub fn normalize(script: Option<&MarkArg>, options: Option<&MarkArg>) -> Result<TaskAnnotation> {
    let script = match script {
        None => {
            return Err(Error::InvalidAnnotation(
                "the 'script' keyword is required, e.g. stata(script=\"script.do\")".to_string(),
            ));
        }
        Some(MarkArg::Single(OptionValue::Text(text))) => PathBuf::from(text),
        Some(MarkArg::Single(OptionValue::Path { path })) => path.clone(),
        Some(MarkArg::Single(other)) => return Err(Error::InvalidScriptType(other.to_string())),
        Some(MarkArg::Many(_)) => {
            return Err(Error::InvalidAnnotation(
                "the 'script' keyword takes a single path, not a sequence".to_string(),
            ));
        }
    };

    Ok(TaskAnnotation {
        script,
        options: normalize_options(options),
    })
}

/// Convert an optional scalar-or-sequence into a list of strings
pub fn normalize_options(options: Option<&MarkArg>) -> Vec<String> {
    options
        .map(|options| options.to_list().iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

/// Parse a complete `stata` mark, rejecting positional arguments and unknown keywords
pub fn parse_stata_mark(mark: &Mark) -> Result<TaskAnnotation> {
    if mark.name != STATA_MARK {
        return Err(Error::InvalidAnnotation(format!(
            "expected a '{STATA_MARK}' mark, got '{}'",
            mark.name
        )));
    }
    if !mark.args.is_empty() {
        return Err(Error::InvalidAnnotation(
            "positional arguments are not supported, use the 'script' and 'options' keywords"
                .to_string(),
        ));
    }
    if let Some(unknown) = mark
        .kwargs
        .keys()
        .find(|key| key.as_str() != SCRIPT_KEY && key.as_str() != OPTIONS_KEY)
    {
        return Err(Error::InvalidAnnotation(format!(
            "unexpected keyword '{unknown}'"
        )));
    }

    normalize(mark.kwargs.get(SCRIPT_KEY), mark.kwargs.get(OPTIONS_KEY))
}
