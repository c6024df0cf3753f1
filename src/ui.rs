// UI layer: console reports, the upload flow and the search loops.
// Everything writes to a caller-supplied `Write` so the binaries pass
// stdout and the tests pass a buffer.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{WebhookClient, WebhookError};
use crate::config::{UploadConfig, DEFAULT_NAMESPACE};
use crate::files::{read_txt_files, FileEvent};
use crate::model::{SearchHit, UploadRequest, UploadResult};

pub const RULE_WIDTH: usize = 80;
pub const PREVIEW_CHARS: usize = 200;
pub const EXIT_WORDS: [&str; 3] = ["exit", "quit", "q"];

/// Queries run by the search binary before it goes interactive.
pub const DEMO_QUERIES: [&str; 2] = ["тестовый запрос", "информация о работе"];

pub fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(RULE_WIDTH).collect()
}

/// Anything that can answer a search query. `WebhookClient` is the real one.
pub trait SearchBackend {
    fn search(&self, query: &str, namespace: &str) -> Result<Vec<SearchHit>, WebhookError>;
}

impl SearchBackend for WebhookClient {
    fn search(&self, query: &str, namespace: &str) -> Result<Vec<SearchHit>, WebhookError> {
        WebhookClient::search(self, query, namespace)
    }
}

/// Source of interactive input. `Ok(None)` means the user interrupted or
/// input ended, and the loop should stop.
pub trait QueryPrompt {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Prompts on the terminal with `dialoguer`.
pub struct TerminalPrompt;

impl QueryPrompt for TerminalPrompt {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text();
        match answer {
            Ok(line) => Ok(Some(line)),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::Interrupted
                        | io::ErrorKind::UnexpectedEof
                        | io::ErrorKind::NotConnected
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Reads one answer per line from any buffered reader (piped stdin, tests).
pub struct LinePrompt<R> {
    reader: R,
}

impl<R: BufRead> LinePrompt<R> {
    pub fn new(reader: R) -> Self {
        LinePrompt { reader }
    }
}

impl<R: BufRead> QueryPrompt for LinePrompt<R> {
    fn ask(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Renders the numbered search report.
pub fn render_results(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.\n".to_string();
    }
    let mut out = format!("\nResults found: {}\n\n{}\n", hits.len(), rule('='));
    for (i, hit) in hits.iter().enumerate() {
        out.push_str(&format!(
            "\nResult #{}:\n  Score: {:.4}\n  Source: {}\n  Chunk Index: {}\n  ID: {}\n  Text: {}...\n{}\n",
            i + 1,
            hit.score,
            hit.source,
            hit.chunk_index,
            hit.id,
            preview(&hit.text),
            rule('-'),
        ));
    }
    out
}

/// First `PREVIEW_CHARS` characters of `text`, cut on a char boundary.
pub fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Renders the aggregate counts and, when present, the per-file breakdown.
pub fn render_upload_summary(result: &UploadResult) -> String {
    let mut out = format!(
        "\nUpload succeeded!\n   Files processed: {}\n   Vectors upserted: {}\n",
        result.total_files(),
        result.total_upserted()
    );
    let per_file = result.file_results();
    if !per_file.is_empty() {
        out.push_str("\nPer-file breakdown:\n");
        for file in per_file {
            out.push_str(&format!(
                "   File #{}: {} vectors\n",
                or_unknown(file.file_index),
                or_unknown(file.upserted)
            ));
        }
    }
    out
}

fn or_unknown(value: Option<u64>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn search_with_spinner<B: SearchBackend>(
    backend: &B,
    query: &str,
    namespace: &str,
) -> Result<Vec<SearchHit>, WebhookError> {
    let pb = spinner("Searching...");
    let res = backend.search(query, namespace);
    pb.finish_and_clear();
    res
}

fn print_outcome<W: Write>(
    out: &mut W,
    outcome: Result<Vec<SearchHit>, WebhookError>,
) -> io::Result<()> {
    match outcome {
        Ok(hits) => write!(out, "{}", render_results(&hits)),
        Err(e) => {
            tracing::debug!(error = %e, "search failed");
            writeln!(out, "{} Error: {}", "✗".red(), e)
        }
    }
}

/// Runs each query against the default namespace. A failing query is
/// reported and the next one still runs.
pub fn run_scripted<B: SearchBackend, W: Write>(
    backend: &B,
    queries: &[&str],
    out: &mut W,
) -> io::Result<()> {
    for (i, query) in queries.iter().enumerate() {
        writeln!(out, "\n{}\nTest #{}: {}\n{}", rule('='), i + 1, query, rule('='))?;
        let outcome = search_with_spinner(backend, query, DEFAULT_NAMESPACE);
        print_outcome(out, outcome)?;
    }
    Ok(())
}

/// Prompts for queries until an exit word, an interrupt or end of input.
/// Errors from a single query are printed and the loop carries on.
pub fn run_interactive<B, P, W>(backend: &B, prompt: &mut P, out: &mut W) -> io::Result<()>
where
    B: SearchBackend,
    P: QueryPrompt,
    W: Write,
{
    loop {
        let Some(line) = prompt.ask("Search query")? else {
            writeln!(out, "\nExiting...")?;
            return Ok(());
        };
        let query = line.trim();
        if EXIT_WORDS.contains(&query.to_lowercase().as_str()) {
            return Ok(());
        }
        if query.is_empty() {
            continue;
        }

        let Some(namespace) = prompt.ask("Namespace (Enter for 'default')")? else {
            writeln!(out, "\nExiting...")?;
            return Ok(());
        };
        let namespace = match namespace.trim() {
            "" => DEFAULT_NAMESPACE,
            ns => ns,
        };

        let outcome = search_with_spinner(backend, query, namespace);
        print_outcome(out, outcome)?;
    }
}

/// Reads the data directory and sends it as one batch.
///
/// Returns `Ok(None)` when every matching file failed to read, so nothing
/// was sent. Any other failure is an error for the caller to report.
pub fn run_upload<W: Write>(config: &UploadConfig, out: &mut W) -> Result<Option<UploadResult>> {
    let mut write_err = None;
    let files = read_txt_files(&config.data_dir, |event| {
        let line = match event {
            FileEvent::Read { file_name, chars } => {
                format!("{} Read file: {} ({} characters)", "✓".green(), file_name, chars)
            }
            FileEvent::Skipped { file_name, error } => {
                format!("{} Failed to read file {}: {}", "✗".red(), file_name, error)
            }
        };
        if let Err(e) = writeln!(out, "{line}") {
            write_err.get_or_insert(e);
        }
    })?;
    if let Some(e) = write_err {
        return Err(e).context("failed to write progress");
    }

    if files.is_empty() {
        writeln!(out, "{} No files to upload", "✗".red())?;
        return Ok(None);
    }

    writeln!(out, "\nSending {} files to Pinecone...", files.len())?;
    writeln!(out, "   Webhook URL: {}", config.webhook_url)?;
    writeln!(out, "   Namespace: {}", config.namespace)?;

    let client = WebhookClient::for_upload(config)?;
    let request = UploadRequest {
        files,
        namespace: config.namespace.clone(),
    };
    let pb = spinner("Uploading...");
    let result = client.upload(&request);
    pb.finish_and_clear();
    let result = result?;

    write!(out, "{}", render_upload_summary(&result))?;
    writeln!(out, "\n{} All files processed!", "✓".green())?;
    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;

    use crate::model::FileResult;

    fn hit(text: &str) -> SearchHit {
        SearchHit {
            text: text.into(),
            ..SearchHit::default()
        }
    }

    /// Records every call and fails for one chosen query.
    struct FakeBackend {
        calls: RefCell<Vec<(String, String)>>,
        fail_on: Option<String>,
    }

    impl FakeBackend {
        fn new() -> Self {
            FakeBackend {
                calls: RefCell::new(Vec::new()),
                fail_on: None,
            }
        }
    }

    impl SearchBackend for FakeBackend {
        fn search(&self, query: &str, namespace: &str) -> Result<Vec<SearchHit>, WebhookError> {
            self.calls
                .borrow_mut()
                .push((query.to_string(), namespace.to_string()));
            if self.fail_on.as_deref() == Some(query) {
                let bad = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
                return Err(WebhookError::Decode(bad));
            }
            Ok(vec![hit(query)])
        }
    }

    fn prompt(lines: &str) -> LinePrompt<Cursor<Vec<u8>>> {
        LinePrompt::new(Cursor::new(lines.as_bytes().to_vec()))
    }

    #[test]
    fn empty_results_render_single_line() {
        assert_eq!(render_results(&[]), "No results found.\n");
    }

    #[test]
    fn missing_fields_render_defaults() {
        let report = render_results(&[hit("body")]);
        assert!(report.contains("Results found: 1"));
        assert!(report.contains("Result #1:"));
        assert!(report.contains("  Score: 0.0000\n"));
        assert!(report.contains("  Source: unknown\n"));
        assert!(report.contains("  Chunk Index: -1\n"));
        assert!(report.contains("  ID: N/A\n"));
        assert!(report.contains("  Text: body...\n"));
    }

    #[test]
    fn results_are_numbered_from_one() {
        let report = render_results(&[hit("a"), hit("b")]);
        let first = report.find("Result #1:").unwrap();
        let second = report.find("Result #2:").unwrap();
        assert!(first < second);
        assert_eq!(report.matches(&rule('-')).count(), 2);
    }

    #[test]
    fn score_uses_four_decimals() {
        let report = render_results(&[SearchHit {
            score: 0.123456,
            ..hit("x")
        }]);
        assert!(report.contains("Score: 0.1235"));
    }

    #[test]
    fn preview_truncates_by_characters() {
        let long: String = "я".repeat(250);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn upload_summary_includes_breakdown() {
        let result = UploadResult {
            total_files: Some(2),
            total_upserted: Some(7),
            file_results: Some(vec![
                FileResult {
                    file_index: Some(0),
                    upserted: Some(4),
                },
                FileResult {
                    file_index: Some(1),
                    upserted: None,
                },
            ]),
        };
        let text = render_upload_summary(&result);
        assert!(text.contains("Files processed: 2"));
        assert!(text.contains("Vectors upserted: 7"));
        assert!(text.contains("File #0: 4 vectors"));
        assert!(text.contains("File #1: ? vectors"));
    }

    #[test]
    fn upload_summary_without_breakdown() {
        let text = render_upload_summary(&UploadResult::default());
        assert!(text.contains("Files processed: 0"));
        assert!(!text.contains("Per-file breakdown"));
    }

    #[test]
    fn interactive_loop_stops_on_exit_word() {
        let backend = FakeBackend::new();
        let mut out = Vec::new();
        run_interactive(&backend, &mut prompt("hello\n\nQUIT\nnever\n"), &mut out).unwrap();
        assert_eq!(
            *backend.calls.borrow(),
            vec![("hello".to_string(), "default".to_string())]
        );
    }

    #[test]
    fn blank_query_reprompts_without_namespace() {
        let backend = FakeBackend::new();
        let mut out = Vec::new();
        run_interactive(&backend, &mut prompt("   \nfind me\nmanuals\nq\n"), &mut out).unwrap();
        assert_eq!(
            *backend.calls.borrow(),
            vec![("find me".to_string(), "manuals".to_string())]
        );
    }

    #[test]
    fn query_error_does_not_end_loop() {
        let backend = FakeBackend {
            fail_on: Some("broken".into()),
            ..FakeBackend::new()
        };
        let mut out = Vec::new();
        run_interactive(&backend, &mut prompt("broken\n\nworking\n\nexit\n"), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error: failed to parse JSON response"));
        assert!(text.contains("Text: working..."));
        assert_eq!(backend.calls.borrow().len(), 2);
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let backend = FakeBackend::new();
        let mut out = Vec::new();
        run_interactive(&backend, &mut prompt("only query\n"), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Exiting..."));
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn scripted_queries_use_default_namespace() {
        let backend = FakeBackend {
            fail_on: Some("first".into()),
            ..FakeBackend::new()
        };
        let mut out = Vec::new();
        run_scripted(&backend, &["first", "second"], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Test #1: first"));
        assert!(text.contains("Test #2: second"));
        assert!(text.contains("Error:"));
        assert!(backend
            .calls
            .borrow()
            .iter()
            .all(|(_, ns)| ns == "default"));
    }
}
