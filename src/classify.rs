//! The classifier boundary.
//!
//! Classification itself happens outside this crate: some text-generation
//! model receives a prompt describing the files and answers with a list of
//! `{filename, category}` pairs. This module builds that prompt, parses the
//! answer, and defines the [`Classifier`] trait the rest of the crate talks to.
//! A classifier that fails returns an empty list, which downstream simply
//! treats as nothing to do.

use crate::logging::LogSink;
use crate::plan::ClassificationEntry;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Maximum number of characters of file content sent to the classifier.
pub const SNIPPET_CHARS: usize = 2048;

const SNIPPET_EXTENSIONS: &[&str] = &["txt", "md", "py", "js", "html", "css"];

/// What the classifier gets to look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyMode {
    /// Names and metadata only.
    #[default]
    ByName,
    /// Names, metadata and a snippet of text content.
    ByContent,
}

/// Metadata describing one candidate file to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub filename: String,
    /// `"file"` or `"shortcut"`.
    pub object_file_type: String,
    pub file_size: Option<u64>,
    /// Lowercase extension without the dot.
    pub file_type_extension: String,
    pub mime_type: String,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_shortcut: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_snippet: Option<String>,
}

impl FileMetadata {
    /// Collects metadata for `path`. Anything that cannot be read is left out.
    pub fn collect(path: &Path, mode: ClassifyMode) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let is_shortcut = extension == "lnk";

        let metadata = fs::metadata(path).ok();
        let file_size = metadata.as_ref().map(|m| m.len());
        let created_at = metadata
            .as_ref()
            .and_then(|m| m.created().ok())
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339());
        let modified_at = metadata
            .as_ref()
            .and_then(|m| m.modified().ok())
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339());

        let content_snippet = match mode {
            ClassifyMode::ByContent if SNIPPET_EXTENSIONS.contains(&extension.as_str()) => {
                read_snippet(path)
            }
            _ => None,
        };

        Self {
            object_file_type: if is_shortcut { "shortcut" } else { "file" }.to_string(),
            file_size,
            mime_type: detect_mime(path, &extension),
            file_type_extension: extension,
            created_at,
            modified_at,
            is_shortcut,
            shortcut_base: is_shortcut.then(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default()
            }),
            content_snippet,
            filename,
        }
    }
}

/// Sniffs the MIME type from content, falling back to the extension.
fn detect_mime(path: &Path, extension: &str) -> String {
    if let Ok(Some(kind)) = infer::get_from_path(path) {
        return kind.mime_type().to_string();
    }

    match extension {
        "lnk" => "application/x-ms-shortcut",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "py" => "text/x-python",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
    .to_string()
}

fn read_snippet(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    // Four bytes per char covers any UTF-8 text.
    let mut bytes = Vec::new();
    file.take((SNIPPET_CHARS * 4) as u64)
        .read_to_end(&mut bytes)
        .ok()?;

    let text: String = String::from_utf8_lossy(&bytes)
        .chars()
        .take(SNIPPET_CHARS)
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

/// Everything a classifier needs to sort one folder.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub files: Vec<FileMetadata>,
    pub categories: Vec<String>,
    /// Free-form user instructions, applied before the built-in rules.
    pub context: String,
    /// Whether `SKIP` is an acceptable answer.
    pub allow_skip: bool,
}

impl ClassificationRequest {
    /// Builds a request for the given candidate files.
    pub fn new(
        files: &[PathBuf],
        categories: &[String],
        context: &str,
        allow_skip: bool,
        mode: ClassifyMode,
    ) -> Self {
        Self {
            files: files
                .iter()
                .map(|path| FileMetadata::collect(path, mode))
                .collect(),
            categories: categories.to_vec(),
            context: context.trim().to_string(),
            allow_skip,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Anything that can assign categories to files.
///
/// Implementations log their own failures and return an empty list instead of
/// an error. Plain closures implement the trait, so a provider can be plugged
/// in as a single function.
pub trait Classifier: Send + Sync {
    fn classify(&self, request: &ClassificationRequest, sink: &dyn LogSink)
    -> Vec<ClassificationEntry>;
}

impl<F> Classifier for F
where
    F: Fn(&ClassificationRequest, &dyn LogSink) -> Vec<ClassificationEntry> + Send + Sync,
{
    fn classify(
        &self,
        request: &ClassificationRequest,
        sink: &dyn LogSink,
    ) -> Vec<ClassificationEntry> {
        self(request, sink)
    }
}

/// Renders the instruction prompt for a text-generation model.
pub fn build_prompt(request: &ClassificationRequest, now: DateTime<Local>) -> String {
    let context = if request.context.is_empty() {
        "(none)"
    } else {
        request.context.as_str()
    };
    let skip_instruction = if request.allow_skip {
        "If the context or rules imply a file must NOT be moved, set its category to \"SKIP\" exactly."
    } else {
        "Do not skip files; always choose one of the provided categories."
    };
    let categories = serde_json::to_string(&request.categories).unwrap_or_else(|_| "[]".into());
    let files = serde_json::to_string_pretty(&request.files).unwrap_or_else(|_| "[]".into());

    format!(
        "You are an expert file organizer. Classify the list of files into the provided categories.
User instructions/context (high priority, apply first): {context}

Current date: {date}

Rules:
- Return a single JSON object with a key \"files\" containing a list of objects: {{\"filename\": \"...\", \"category\": \"...\"}}.
- Categories must be chosen EXACTLY from the provided list below. Do not invent new categories.
- {skip_instruction}
- If a file doesn't fit any category, use \"Misc\".
- For Windows shortcuts (.lnk), classify based on the base name (field \"shortcut_base\") and not as a separate category.
- Consider metadata such as object_file_type, file_type_extension, mime_type, file_size, etc, and any content_snippet.

Available Categories: {categories}
Files to classify:
{files}

Respond with JSON ONLY, no markdown fences.
",
        date = now.to_rfc3339(),
    )
}

/// Parses a model answer into classification entries.
///
/// Markdown code fences are stripped. Both `{"files": [...]}` and a bare
/// array are accepted. Elements without a string `filename` or `category` come
/// back with that field empty, so the plan builder drops them. Anything that
/// is not JSON yields an empty list and an error log.
pub fn parse_response(text: &str, sink: &dyn LogSink) -> Vec<ClassificationEntry> {
    let cleaned = text.trim().replace("```json", "").replace("```", "");

    let value: Value = match serde_json::from_str(cleaned.trim()) {
        Ok(value) => value,
        Err(e) => {
            sink.error(&format!("The classifier response is not valid JSON: {}", e));
            return Vec::new();
        }
    };

    let items = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("files") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    items
        .iter()
        .map(|item| {
            let field = |key: &str| {
                item.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            ClassificationEntry::new(field("filename"), field("category"))
        })
        .collect()
}

/// Runs an external program as the classifier.
///
/// The prompt is written to the program's stdin and its stdout is parsed with
/// [`parse_response`]. This works with any command-line client for a
/// text-generation API.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn run(&self, prompt: String) -> Result<String, String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("could not start '{}': {}", self.program, e))?;

        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || stdin.write_all(prompt.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| format!("'{}' did not finish: {}", self.program, e))?;

        if let Some(writer) = writer
            && let Ok(Err(e)) = writer.join()
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(format!("could not send prompt to '{}': {}", self.program, e));
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Classifier for CommandClassifier {
    fn classify(
        &self,
        request: &ClassificationRequest,
        sink: &dyn LogSink,
    ) -> Vec<ClassificationEntry> {
        if request.is_empty() {
            return Vec::new();
        }

        sink.info(&format!(
            "Sending {} files to '{}' for classification...",
            request.files.len(),
            self.program
        ));
        match self.run(build_prompt(request, Local::now())) {
            Ok(stdout) if stdout.trim().is_empty() => {
                sink.error("The classifier returned no usable text.");
                Vec::new()
            }
            Ok(stdout) => {
                sink.info("Response received. Processing classification...");
                parse_response(&stdout, sink)
            }
            Err(e) => {
                sink.error(&format!("Error calling classifier: {}", e));
                Vec::new()
            }
        }
    }
}

/// Reads a classifier answer saved to a file earlier.
#[derive(Debug, Clone)]
pub struct ResponseFileClassifier {
    pub path: PathBuf,
}

impl ResponseFileClassifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Classifier for ResponseFileClassifier {
    fn classify(
        &self,
        _request: &ClassificationRequest,
        sink: &dyn LogSink,
    ) -> Vec<ClassificationEntry> {
        match fs::read_to_string(&self.path) {
            Ok(text) => parse_response(&text, sink),
            Err(e) => {
                sink.error(&format!(
                    "Could not read classification from {}: {}",
                    self.path.display(),
                    e
                ));
                Vec::new()
            }
        }
    }
}
