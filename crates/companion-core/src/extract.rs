//! Pulling usable text out of raw model output.
//!
//! Models wrap answers in Markdown fences, prepend chatter, or return several
//! blocks at once. These helpers recover the part a caller actually wants.

use crate::types::ArtifactKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub body: String,
}

/// Strip a surrounding code fence, if the whole answer is one fenced block.
///
/// Text that does not start with a fence is returned trimmed.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let start = trimmed.find('\n').map(|i| i + 1).unwrap_or(trimmed.len());
    let rest = &trimmed[start..];
    let end = rest.rfind("```").unwrap_or(rest.len());
    rest[..end].trim_end().to_string()
}

/// Every fenced block in `text`, in order. An unterminated final block runs
/// to the end of the input.
pub fn code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(Option<String>, Vec<&str>)> = None;

    for line in text.lines() {
        let fence = line.trim_start();
        match current.take() {
            None => {
                if let Some(info) = fence.strip_prefix("```") {
                    let lang = info.split_whitespace().next().map(str::to_string);
                    current = Some((lang, Vec::new()));
                }
            }
            Some((lang, mut body)) => {
                if fence.trim_end() == "```" {
                    blocks.push(CodeBlock {
                        language: lang,
                        body: body.join("\n"),
                    });
                } else {
                    body.push(line);
                    current = Some((lang, body));
                }
            }
        }
    }

    if let Some((lang, body)) = current {
        blocks.push(CodeBlock {
            language: lang,
            body: body.join("\n"),
        });
    }

    blocks
}

/// The first block tagged with `language`, else the first block, else the
/// whole answer with fences stripped.
pub fn first_block_for(text: &str, language: &str) -> String {
    let blocks = code_blocks(text);
    let wanted = language_aliases(language);
    if let Some(b) = blocks.iter().find(|b| {
        b.language
            .as_deref()
            .map(|l| wanted.iter().any(|w| l.eq_ignore_ascii_case(w)))
            .unwrap_or(false)
    }) {
        return b.body.clone();
    }
    match blocks.into_iter().next() {
        Some(b) => b.body,
        None => strip_code_fences(text),
    }
}

fn language_aliases(language: &str) -> Vec<String> {
    let lower = language.trim().to_ascii_lowercase();
    let extra: &[&str] = match lower.as_str() {
        "typescript" => &["ts", "tsx"],
        "javascript" => &["js", "jsx"],
        "python" => &["py"],
        "rust" => &["rs"],
        "csharp" | "c#" => &["cs", "csharp"],
        "yaml" => &["yml"],
        "shell" | "bash" => &["sh", "bash", "shell"],
        _ => &[],
    };
    let mut out = vec![lower];
    out.extend(extra.iter().map(|s| s.to_string()));
    out
}

fn extension_for(language: &str) -> &'static str {
    match language.trim().to_ascii_lowercase().as_str() {
        "rust" | "rs" => "rs",
        "python" | "py" => "py",
        "typescript" | "ts" => "ts",
        "javascript" | "js" => "js",
        "go" | "golang" => "go",
        "java" => "java",
        "kotlin" => "kt",
        "csharp" | "c#" | "cs" => "cs",
        "ruby" | "rb" => "rb",
        "php" => "php",
        "swift" => "swift",
        _ => "txt",
    }
}

/// Conventional file name for generated source or tests.
///
/// `base` is the stem of the file under test (for tests) or the module name
/// (for code); it defaults to `app`.
pub fn suggest_file_name(kind: ArtifactKind, language: &str, base: Option<&str>) -> String {
    let ext = extension_for(language);
    let stem = base
        .map(|b| b.rsplit('/').next().unwrap_or(b))
        .map(|b| b.split('.').next().unwrap_or(b))
        .filter(|b| !b.is_empty())
        .unwrap_or("app");

    if kind != ArtifactKind::TestCases {
        return match ext {
            "rs" if base.is_none() => "main.rs".to_string(),
            _ => format!("{stem}.{ext}"),
        };
    }

    match ext {
        "py" => format!("test_{stem}.py"),
        "ts" | "js" => format!("{stem}.test.{ext}"),
        "go" => format!("{stem}_test.go"),
        "rs" => format!("{stem}_test.rs"),
        "java" | "kt" | "cs" | "swift" => {
            let mut chars = stem.chars();
            let cap = match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            };
            format!("{cap}Test.{ext}")
        }
        "rb" => format!("{stem}_spec.rb"),
        _ => format!("{stem}_test.{ext}"),
    }
}
