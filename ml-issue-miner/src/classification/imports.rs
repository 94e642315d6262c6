//! Textual import detection in Python sources.

use regex::Regex;
use std::sync::LazyLock;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^import\s+(.+)$") {
    Ok(re) => re,
    Err(_) => unreachable!("static regex pattern"),
});

static FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"^from\s+([\w.]+)\s+import\b") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    });

/// Finds imports of ML framework modules.
///
/// A module matches when its dotted name contains one of the configured
/// names, so `torch.nn`, `tensorflow.keras` and `pytorch_lightning` all count
/// for `torch`/`tensorflow`.
#[derive(Debug, Clone)]
pub struct ImportScanner {
    modules: Vec<String>,
}

impl ImportScanner {
    pub fn new(modules: &[String]) -> Self {
        Self {
            modules: modules.iter().map(|m| m.trim().to_string()).collect(),
        }
    }

    /// Returns true if any import statement of `source` names an ML module.
    #[must_use]
    pub fn imports_ml(&self, source: &str) -> bool {
        imported_modules(source)
            .iter()
            .any(|module| self.modules.iter().any(|ml| module.contains(ml.as_str())))
    }
}

/// Absolute module names imported by `source`, in order of appearance.
///
/// Comments and string literals (triple-quoted and prefixed ones included)
/// are ignored. Backslash and bracket continuations are joined first.
/// Relative imports (`from . import x`, `from .models import y`) are left
/// out.
#[must_use]
pub fn imported_modules(source: &str) -> Vec<String> {
    let mut modules = Vec::new();

    for line in logical_lines(source) {
        for statement in line.split(';').map(str::trim) {
            if let Some(captures) = FROM_RE.captures(statement) {
                let module = &captures[1];
                if !module.starts_with('.') {
                    modules.push(module.to_string());
                }
            } else if let Some(captures) = IMPORT_RE.captures(statement) {
                modules.extend(
                    captures[1]
                        .split(',')
                        .filter_map(|name| name.split_whitespace().next())
                        .map(|name| name.trim_matches(|c| c == '(' || c == ')'))
                        .filter(|name| !name.is_empty())
                        .map(str::to_string),
                );
            }
        }
    }

    modules
}

/// Splits Python source into logical lines, dropping comments and
/// collapsing every string literal to `""`.
fn logical_lines(source: &str) -> Vec<String> {
    let chars: Vec<char> = source.chars().collect();
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                let triple = chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c);
                i = skip_string(&chars, i, c, triple);
                current.push_str("\"\"");
                continue;
            }
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '\\' if chars.get(i + 1) == Some(&'\n') => {
                current.push(' ');
                i += 2;
                continue;
            }
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '\n' => {
                if depth == 0 {
                    lines.push(std::mem::take(&mut current));
                } else {
                    current.push(' ');
                }
                i += 1;
                continue;
            }
            _ => {}
        }
        current.push(c);
        i += 1;
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }
    lines
}

/// Index just past the string literal opening at `start`.
///
/// A single-quoted literal also ends at an unescaped newline.
fn skip_string(chars: &[char], start: usize, quote: char, triple: bool) -> usize {
    let mut i = start + if triple { 3 } else { 1 };
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
        } else if c == quote && !triple {
            return i + 1;
        } else if c == quote
            && chars.get(i + 1) == Some(&quote)
            && chars.get(i + 2) == Some(&quote)
        {
            return i + 3;
        } else if c == '\n' && !triple {
            return i;
        } else {
            i += 1;
        }
    }
    chars.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_ml_modules;

    #[test]
    fn collects_absolute_imports() {
        let source = "\
import os, sys as system
import numpy as np; from torch.nn import functional as F
from . import utils
from .models import Net
    from tensorflow.keras.layers import Dense
";
        assert_eq!(
            imported_modules(source),
            vec!["os", "sys", "numpy", "torch.nn", "tensorflow.keras.layers"]
        );
    }

    #[test]
    fn ignores_comments_and_docstrings() {
        let source = r#"
# import torch
"""
Example:
    import tensorflow as tf
"""
x = 1  # from keras import layers
"#;
        assert!(imported_modules(source).is_empty());
    }

    #[test]
    fn ignores_assigned_and_prefixed_strings() {
        assert!(imported_modules("USAGE = \"\"\"\nimport torch\n\"\"\"\n").is_empty());

        let source = r#"
def fit():
    r"""Train the model.

    import tensorflow as tf
    """
    return None
"#;
        assert!(imported_modules(source).is_empty());

        let source = "HELP = f'''\nfrom keras import layers\n'''\nimport numpy\n";
        assert_eq!(imported_modules(source), vec!["numpy"]);
    }

    #[test]
    fn joins_continued_lines() {
        assert_eq!(imported_modules("import os, \\\n    torch\n"), vec!["os", "torch"]);
        assert_eq!(
            imported_modules("from torch.nn import (\n    Linear,\n    ReLU,\n)\nimport sys\n"),
            vec!["torch.nn", "sys"]
        );
    }

    #[test]
    fn hash_inside_string_is_not_a_comment() {
        let source = "print(\"# step 1\"); import torch  # model\n";
        assert_eq!(imported_modules(source), vec!["torch"]);
    }

    #[test]
    fn matches_ml_modules_by_substring() {
        let scanner = ImportScanner::new(&default_ml_modules());

        assert!(scanner.imports_ml("import torch\n"));
        assert!(scanner.imports_ml("from pytorch_lightning import Trainer\n"));
        assert!(scanner.imports_ml("import tf_keras as keras\n"));
        assert!(!scanner.imports_ml("import numpy as np\nfrom sklearn import svm\n"));
        assert!(!scanner.imports_ml("from .torch_utils import helper\n"));
    }
}
