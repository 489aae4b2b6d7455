//! Heuristic language detection for untagged code blocks.
//!
//! Rules are tried in order and the first match wins. Shell rules come first
//! because command snippets often contain keywords of other languages;
//! JSON and HTML come before the C-like languages; C# comes before Java and
//! both before TypeScript, since their declarations share keywords.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Language tag assigned to a code block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Shell,
    JavaScript,
    TypeScript,
    Python,
    Java,
    CSharp,
    Go,
    Rust,
    Sql,
    Json,
    Yaml,
    Html,
    Css,
    /// A tag supplied by the author that is not in the list above.
    Other(String),
    /// Explicitly skip highlighting.
    None,
}

impl Language {
    /// Tag as written into `language-*` classes.
    pub fn tag(&self) -> &str {
        match self {
            Language::Shell => "bash",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Sql => "sql",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Html => "html",
            Language::Css => "css",
            Language::Other(tag) => tag,
            Language::None => "none",
        }
    }

    /// Parses an author-supplied fence tag, accepting common aliases.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "bash" | "sh" | "shell" | "zsh" | "console" => Language::Shell,
            "javascript" | "js" | "jsx" | "node" => Language::JavaScript,
            "typescript" | "ts" | "tsx" => Language::TypeScript,
            "python" | "py" => Language::Python,
            "java" => Language::Java,
            "csharp" | "cs" | "c#" => Language::CSharp,
            "go" | "golang" => Language::Go,
            "rust" | "rs" => Language::Rust,
            "sql" => Language::Sql,
            "json" => Language::Json,
            "yaml" | "yml" => Language::Yaml,
            "html" | "xml" => Language::Html,
            "css" => Language::Css,
            "" | "none" | "nohighlight" | "plaintext" | "text" => Language::None,
            other => Language::Other(other.to_string()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Language::None)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A pattern that assigns `language` when it matches a code block.
#[derive(Debug, Clone)]
pub struct LanguageRule {
    pub language: Language,
    pattern: Regex,
}

impl LanguageRule {
    pub fn new(language: Language, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            language,
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn matches(&self, code: &str) -> bool {
        self.pattern.is_match(code)
    }
}

const BUILTIN_RULES: &[(Language, &str)] = &[
    (Language::Shell, r"(?m)^\s*\$ \S"),
    (Language::Shell, r"(?m)^#!/(usr/)?bin/(env )?(ba|z)?sh"),
    (
        Language::Shell,
        r"(?m)^\s*(sudo|npm|npx|yarn|pnpm|pip3?|cargo|git|cd|ls|curl|wget|apt(-get)?|brew|docker|kubectl|echo|mkdir|chmod|rm|cp|mv|source)\s",
    ),
    (Language::Shell, r"(?m)^\s*export\s+[A-Za-z_][A-Za-z0-9_]*="),
    (Language::Json, r#"^\s*\{\s*"[^"\n]*"\s*:"#),
    (Language::Json, r#"^\s*\[\s*(\{|"|-?\d|true|false|null|\])"#),
    (
        Language::Html,
        r"(?i)<(!doctype|html|head|body|div|span|p|a|ul|ol|li|table|form|input|button|script|style|h[1-6])(\s[^>]*)?>",
    ),
    (Language::Rust, r"\bfn\s+\w+\s*(<[^>]*>)?\s*\("),
    (Language::Rust, r"\blet\s+mut\s+\w+"),
    (Language::Rust, r"\b(println|vec|format|assert_eq)!\s*[\(\[]"),
    (Language::Rust, r"(?m)^\s*(pub\s+)?(struct|enum|trait|impl|mod)\s+\w+.*\{"),
    (Language::Rust, r"(?m)^\s*use\s+\w+(::\w+)+"),
    (Language::Go, r"(?m)^package\s+\w+\s*$"),
    (Language::Go, r"\bfunc\s+(\(\w+\s+\*?\w+\)\s*)?\w+\s*\("),
    (Language::Go, r"\bfmt\.\w+\("),
    (Language::CSharp, r"(?m)^\s*using\s+System(\.\w+)*\s*;"),
    (Language::CSharp, r"\bConsole\.(WriteLine|Write|ReadLine)\("),
    (Language::CSharp, r"(?m)^\s*namespace\s+[\w.]+"),
    (Language::Java, r"\bSystem\.out\.print(ln)?\("),
    (Language::Java, r"(?m)^\s*import\s+java(x)?\.[\w.*]+;"),
    (
        Language::Java,
        r"\bpublic\s+(static\s+)?(final\s+)?(class|interface|enum|void)\b",
    ),
    (Language::TypeScript, r"\binterface\s+\w+\s*\{"),
    (Language::TypeScript, r"(?m)^\s*(export\s+)?type\s+\w+\s*="),
    (
        Language::TypeScript,
        r"\b(const|let|var)\s+\w+\s*:\s*(string|number|boolean|any|unknown)\b",
    ),
    (
        Language::TypeScript,
        r"\)\s*:\s*(string|number|boolean|void|Promise<)",
    ),
    // ES module imports read like Python's `import x` otherwise.
    (
        Language::JavaScript,
        r#"(?m)^\s*import\s+((type\s+)?[\w*{}\s,$]+\s+from\s+)?['"]"#,
    ),
    (Language::Python, r"(?m)^\s*def\s+\w+\s*\(.*\)\s*(->\s*[\w\[\], ]+)?:"),
    (Language::Python, r"(?m)^\s*(from\s+[\w.]+\s+)?import\s+\w+"),
    (Language::Python, r"(?m)^\s*class\s+\w+(\(.*\))?:"),
    (Language::Python, r"(?m)^\s*(elif|except)\b|\bprint\("),
    (Language::JavaScript, r"\bconsole\.(log|error|warn)\("),
    (Language::JavaScript, r"\b(const|let|var)\s+\w+\s*="),
    (Language::JavaScript, r"\bfunction\s*\w*\s*\("),
    (Language::JavaScript, r"=>\s*[\{\(]?"),
    (Language::JavaScript, r"\brequire\(['\x22]"),
    (
        Language::Sql,
        r"(?is)\b(select\s+.+?\s+from|insert\s+into|update\s+\w+\s+set|delete\s+from|create\s+(table|index|view)|alter\s+table|drop\s+table)\b",
    ),
    (
        Language::Css,
        r"(?s)[.#]?[a-zA-Z][\w\-]*[^{};]*\{\s*[\w-]+\s*:\s*[^;{}]+;",
    ),
    (Language::Yaml, r"(?m)^---\s*$"),
    (Language::Yaml, r"(?m)^[\w-]+:\s*$\n^\s+(-\s+)?[\w-]+"),
    (Language::Yaml, r"(?m)^[\w-]+:\s+\S[^\n]*\n[\w-]+:\s+\S"),
];

static BUILTIN: OnceLock<Vec<LanguageRule>> = OnceLock::new();

fn builtin_rules() -> &'static [LanguageRule] {
    BUILTIN.get_or_init(|| {
        BUILTIN_RULES
            .iter()
            .map(|(language, pattern)| {
                LanguageRule::new(language.clone(), pattern).expect("valid language rule")
            })
            .collect()
    })
}

/// Ordered rule table used to tag untagged code blocks.
#[derive(Debug, Clone)]
pub struct LanguageClassifier {
    rules: Vec<LanguageRule>,
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self {
            rules: builtin_rules().to_vec(),
        }
    }
}

impl LanguageClassifier {
    /// Creates a classifier with an explicit rule table.
    pub fn with_rules(rules: Vec<LanguageRule>) -> Self {
        Self { rules }
    }

    /// Adds a rule checked before all existing ones.
    pub fn prepend(mut self, rule: LanguageRule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    /// Adds a rule checked after all existing ones.
    pub fn append(mut self, rule: LanguageRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[LanguageRule] {
        &self.rules
    }

    /// Returns the language of the first matching rule, or [`Language::None`].
    pub fn classify(&self, code: &str) -> Language {
        self.rules
            .iter()
            .find(|rule| rule.matches(code))
            .map(|rule| rule.language.clone())
            .unwrap_or(Language::None)
    }

    /// Resolves a block's language: an explicit tag wins over detection.
    pub fn resolve(&self, explicit: Option<&str>, code: &str) -> Language {
        match explicit.map(str::trim).filter(|tag| !tag.is_empty()) {
            Some(tag) => Language::from_tag(tag),
            None => self.classify(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("$ cargo build --release", Language::Shell)]
    #[case("npm install --save react", Language::Shell)]
    #[case("#!/bin/bash\nset -e", Language::Shell)]
    #[case("{\n  \"name\": \"hivemind\"\n}", Language::Json)]
    #[case("[1, 2, 3]", Language::Json)]
    #[case("<div class=\"box\">hi</div>", Language::Html)]
    #[case("fn main() {\n    println!(\"hi\");\n}", Language::Rust)]
    #[case("package main\n\nfunc main() {}", Language::Go)]
    #[case("using System;\nclass P { }", Language::CSharp)]
    #[case("Console.WriteLine(\"hi\");", Language::CSharp)]
    #[case("public class Main {\n  public static void main(String[] a) {}\n}", Language::Java)]
    #[case("interface User {\n  id: number;\n}", Language::TypeScript)]
    #[case("const id: number = 1;", Language::TypeScript)]
    #[case("def add(a, b):\n    return a + b", Language::Python)]
    #[case("import os\nos.getcwd()", Language::Python)]
    #[case("const x = 1;\nconsole.log(x);", Language::JavaScript)]
    #[case("items.map(x => x * 2)", Language::JavaScript)]
    #[case("SELECT * FROM users WHERE id = 1", Language::Sql)]
    #[case("insert into logs (msg) values ('x')", Language::Sql)]
    #[case(".card {\n  color: red;\n}", Language::Css)]
    #[case("---\nname: app", Language::Yaml)]
    #[case("name: app\nversion: 1", Language::Yaml)]
    #[case("export PATH=$PATH:/usr/local/bin", Language::Shell)]
    #[case("export const add = (a, b) => a + b;", Language::JavaScript)]
    #[case("export function add(a: number, b: number): number {\n  return a + b;\n}", Language::TypeScript)]
    #[case("import express from 'express';\nconst app = express();", Language::JavaScript)]
    #[case("import { useState } from \"react\";", Language::JavaScript)]
    #[case("import './styles.css';", Language::JavaScript)]
    #[case("from os import path\npath.join('a')", Language::Python)]
    #[case("just some words", Language::None)]
    fn classifies_builtin_categories(#[case] code: &str, #[case] expected: Language) {
        assert_eq!(LanguageClassifier::default().classify(code), expected);
    }

    #[test]
    fn shell_wins_over_language_keywords() {
        let code = "echo \"const x = 1\" > index.js";
        assert_eq!(LanguageClassifier::default().classify(code), Language::Shell);
    }

    #[test]
    fn explicit_tag_wins() {
        let classifier = LanguageClassifier::default();
        assert_eq!(classifier.resolve(Some("py"), "SELECT 1 FROM t"), Language::Python);
        assert_eq!(classifier.resolve(Some(" "), "SELECT 1 FROM t"), Language::Sql);
        assert_eq!(
            classifier.resolve(Some("haskell"), "main = pure ()"),
            Language::Other("haskell".into())
        );
    }

    #[test]
    fn prepended_rules_take_precedence() {
        let rule = LanguageRule::new(Language::Other("toml".into()), r"(?m)^\[\w+\]$").unwrap();
        let classifier = LanguageClassifier::default().prepend(rule);
        assert_eq!(
            classifier.classify("[package]\nname = \"x\""),
            Language::Other("toml".into())
        );
    }

    #[test]
    fn empty_table_tags_nothing() {
        let classifier = LanguageClassifier::with_rules(Vec::new());
        assert_eq!(classifier.classify("fn main() {}"), Language::None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Language::CSharp).unwrap(), "\"csharp\"");
    }
}
