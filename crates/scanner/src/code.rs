//! Code-artifact detection: markdown fence extraction, language
//! fingerprinting, and coarse classification.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Languages the fingerprinter can identify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Go,
    Python,
    TypeScript,
    JavaScript,
    Java,
    Sql,
    Ruby,
    Rust,
    C,
    Bash,
    Yaml,
    Json,
    Dockerfile,
    Terraform,
}

impl CodeLanguage {
    /// Parse a markdown fence info string.
    #[must_use]
    pub fn from_fence(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "go" | "golang" => Some(Self::Go),
            "python" | "py" => Some(Self::Python),
            "typescript" | "ts" => Some(Self::TypeScript),
            "javascript" | "js" => Some(Self::JavaScript),
            "java" => Some(Self::Java),
            "sql" => Some(Self::Sql),
            "ruby" | "rb" => Some(Self::Ruby),
            "rust" | "rs" => Some(Self::Rust),
            "c" => Some(Self::C),
            "bash" | "sh" | "shell" => Some(Self::Bash),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "dockerfile" | "docker" => Some(Self::Dockerfile),
            "terraform" | "tf" | "hcl" => Some(Self::Terraform),
            _ => None,
        }
    }
}

/// Coarse shape of a code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeType {
    Function,
    Class,
    Script,
    Config,
    Snippet,
    Module,
}

/// A fenced code block extracted from markdown text.
#[derive(Debug, Clone)]
pub struct CodeBlock {
    /// Language from the fence info string, when recognized.
    pub language: Option<CodeLanguage>,
    /// The body of the block, fence lines excluded.
    pub code: String,
}

/// Classification of one code block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeClassification {
    /// The (possibly fingerprinted) language.
    pub language: Option<CodeLanguage>,
    /// Coarse shape.
    pub code_type: CodeType,
    /// Size of the block in bytes.
    pub size_bytes: usize,
    /// Number of lines.
    pub line_count: usize,
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Non-greedy body so adjacent fences do not merge.
        Regex::new(r"(?s)```([A-Za-z0-9_+-]*)\n(.*?)```").expect("fence regex compiles")
    })
}

/// Extract fenced code blocks from markdown text.
#[must_use]
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    fence_regex()
        .captures_iter(text)
        .map(|cap| CodeBlock {
            language: CodeLanguage::from_fence(&cap[1]),
            code: cap[2].to_owned(),
        })
        .collect()
}

/// Fingerprint the language of a bare code string.
///
/// Each language has a small set of discriminating regexes; the language
/// with the most hits wins, ties broken by the fixed table order.
#[allow(clippy::too_many_lines)]
#[must_use]
pub fn detect_language(code: &str) -> Option<CodeLanguage> {
    static FINGERPRINTS: OnceLock<Vec<(CodeLanguage, Vec<Regex>)>> = OnceLock::new();
    let table = FINGERPRINTS.get_or_init(|| {
        let build = |sources: &[&str]| {
            sources
                .iter()
                .map(|s| Regex::new(s).expect("fingerprint regex compiles"))
                .collect::<Vec<_>>()
        };
        vec![
            (
                CodeLanguage::Rust,
                build(&[r"\bfn\s+\w+", r"\blet\s+mut\b", r"#\[derive\(", r"\bimpl\s+\w+"]),
            ),
            (
                CodeLanguage::Go,
                build(&[r"\bfunc\s+\w+\(", r"^package\s+\w+", r":=", r"\bgo\s+func\b"]),
            ),
            (
                CodeLanguage::Python,
                build(&[r"\bdef\s+\w+\(", r"^import\s+\w+", r"^from\s+\w+\s+import", r"\bself\b"]),
            ),
            (
                CodeLanguage::TypeScript,
                build(&[
                    r"\binterface\s+\w+",
                    r":\s*(string|number|boolean)\b",
                    r"\bexport\s+(type|interface)\b",
                ]),
            ),
            (
                CodeLanguage::JavaScript,
                build(&[r"\bfunction\s+\w+\(", r"\bconst\s+\w+\s*=", r"console\.log\("]),
            ),
            (
                CodeLanguage::Java,
                build(&[
                    r"\bpublic\s+(static\s+)?(class|void|int|String)\b",
                    r"System\.out\.print",
                    r"^import\s+java\.",
                ]),
            ),
            (
                CodeLanguage::Sql,
                build(&[
                    r"(?i)\bselect\b.+\bfrom\b",
                    r"(?i)\binsert\s+into\b",
                    r"(?i)\bcreate\s+table\b",
                ]),
            ),
            (
                CodeLanguage::Ruby,
                build(&[r"\bdef\s+\w+\s*$", r"\bputs\s", r"^require\s+'"]),
            ),
            (
                CodeLanguage::C,
                build(&[r"#include\s*<", r"\bint\s+main\s*\(", r"\bprintf\s*\("]),
            ),
            (
                CodeLanguage::Bash,
                build(&[r"^#!/bin/(ba)?sh", r"\becho\s+", r"\bfi\b", r"\$\{?\w+\}?"]),
            ),
            (
                CodeLanguage::Dockerfile,
                build(&[r"(?m)^FROM\s+\S+", r"(?m)^RUN\s+", r"(?m)^(COPY|WORKDIR|CMD|ENTRYPOINT)\s"]),
            ),
            (
                CodeLanguage::Terraform,
                build(&[r#"(?m)^resource\s+""#, r#"(?m)^provider\s+""#, r#"(?m)^variable\s+""#]),
            ),
            (
                CodeLanguage::Yaml,
                build(&[r"(?m)^\w[\w-]*:\s*$", r"(?m)^\s+-\s+\w", r"(?m)^\w[\w-]*:\s+\S"]),
            ),
            (
                CodeLanguage::Json,
                build(&[r#"^\s*\{"#, r#""\w+"\s*:"#]),
            ),
        ]
    });

    let mut best: Option<(CodeLanguage, usize)> = None;
    for (lang, regexes) in table {
        let hits = regexes.iter().filter(|re| re.is_match(code)).count();
        if hits > 0 && best.is_none_or(|(_, n)| hits > n) {
            best = Some((*lang, hits));
        }
    }
    best.map(|(lang, _)| lang)
}

/// Classify a code block by shape.
#[must_use]
pub fn classify_code(code: &str, language: Option<CodeLanguage>) -> CodeClassification {
    let language = language.or_else(|| detect_language(code));
    let line_count = code.lines().count();

    let code_type = match language {
        Some(
            CodeLanguage::Yaml | CodeLanguage::Json | CodeLanguage::Dockerfile
            | CodeLanguage::Terraform,
        ) => CodeType::Config,
        Some(CodeLanguage::Bash) => CodeType::Script,
        _ => shape_of(code, line_count),
    };

    CodeClassification {
        language,
        code_type,
        size_bytes: code.len(),
        line_count,
    }
}

fn shape_of(code: &str, line_count: usize) -> CodeType {
    static CLASS_RE: OnceLock<Regex> = OnceLock::new();
    static FN_RE: OnceLock<Regex> = OnceLock::new();
    let class_re = CLASS_RE.get_or_init(|| {
        Regex::new(r"\b(class|interface|struct|impl)\s+\w+").expect("class regex compiles")
    });
    let fn_re = FN_RE.get_or_init(|| {
        Regex::new(r"\b(fn|func|def|function)\s+\w+|\w+\s*=\s*\([^)]*\)\s*=>")
            .expect("function regex compiles")
    });

    if code.starts_with("#!") {
        return CodeType::Script;
    }
    if class_re.is_match(code) {
        return CodeType::Class;
    }
    let fn_count = fn_re.find_iter(code).count();
    match fn_count {
        0 => CodeType::Snippet,
        1 => CodeType::Function,
        _ if line_count > 20 => CodeType::Module,
        _ => CodeType::Function,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_blocks() {
        let text = "intro\n```python\nprint('hi')\n```\nmiddle\n```\nplain\n```\n";
        let blocks = extract_code_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, Some(CodeLanguage::Python));
        assert_eq!(blocks[0].code, "print('hi')\n");
        assert_eq!(blocks[1].language, None);
    }

    #[test]
    fn adjacent_fences_do_not_merge() {
        let text = "```go\nfunc a() {}\n```\ntext\n```sql\nSELECT 1\n```";
        let blocks = extract_code_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].code.contains("SELECT"));
    }

    #[test]
    fn no_fences_no_blocks() {
        assert!(extract_code_blocks("just prose, no code").is_empty());
    }

    #[test]
    fn detects_rust() {
        let code = "fn main() {\n    let mut x = 1;\n}";
        assert_eq!(detect_language(code), Some(CodeLanguage::Rust));
    }

    #[test]
    fn detects_python() {
        let code = "import os\n\ndef run(self):\n    pass";
        assert_eq!(detect_language(code), Some(CodeLanguage::Python));
    }

    #[test]
    fn detects_go() {
        let code = "package main\n\nfunc main() {\n\tx := 1\n}";
        assert_eq!(detect_language(code), Some(CodeLanguage::Go));
    }

    #[test]
    fn detects_sql() {
        let code = "SELECT id, name FROM users WHERE active = true";
        assert_eq!(detect_language(code), Some(CodeLanguage::Sql));
    }

    #[test]
    fn detects_dockerfile() {
        let code = "FROM alpine:3.20\nRUN apk add curl\nCMD [\"sh\"]";
        assert_eq!(detect_language(code), Some(CodeLanguage::Dockerfile));
    }

    #[test]
    fn prose_detects_nothing() {
        assert_eq!(detect_language("the quick brown fox"), None);
    }

    #[test]
    fn classify_single_function() {
        let code = "def add(a, b):\n    return a + b";
        let c = classify_code(code, Some(CodeLanguage::Python));
        assert_eq!(c.code_type, CodeType::Function);
        assert_eq!(c.line_count, 2);
        assert_eq!(c.size_bytes, code.len());
    }

    #[test]
    fn classify_class() {
        let c = classify_code("class Foo:\n    def bar(self):\n        pass", None);
        assert_eq!(c.code_type, CodeType::Class);
    }

    #[test]
    fn classify_config() {
        let c = classify_code("server:\n  port: 8080\n", Some(CodeLanguage::Yaml));
        assert_eq!(c.code_type, CodeType::Config);
    }

    #[test]
    fn classify_shebang_script() {
        let c = classify_code("#!/bin/sh\nls -la", None);
        assert_eq!(c.code_type, CodeType::Script);
    }

    #[test]
    fn classify_snippet() {
        let c = classify_code("x = 1 + 2", None);
        assert_eq!(c.code_type, CodeType::Snippet);
    }

    #[test]
    fn fence_info_aliases() {
        assert_eq!(CodeLanguage::from_fence("py"), Some(CodeLanguage::Python));
        assert_eq!(CodeLanguage::from_fence("ts"), Some(CodeLanguage::TypeScript));
        assert_eq!(CodeLanguage::from_fence("unknown"), None);
    }
}
