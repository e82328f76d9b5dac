//! CLI binary for pdf-autofill.
//!
//! Runs one interactive session on the terminal: upload a scanned form, let
//! the model fill it, save the cleaned PDF, and ask questions about it.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_autofill::assistant::is_sentinel;
use pdf_autofill::{
    AutofillConfig, AutofillError, Controller, Document, FormAssistant, OcrExtractor,
    OcrProgressCallback, PdfiumRasterizer, ProgressCallback, SessionState, TesseractRecognizer,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

fn spinner(prefix: &'static str, msg: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    bar.set_prefix(prefix);
    bar.set_message(msg.into());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

// ── OCR progress using indicatif ─────────────────────────────────────────────

/// One bar per upload; created on `on_extraction_start`, cleared when the
/// extraction completes or the upload fails.
#[derive(Default)]
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = guard.as_ref() {
            f(bar);
        }
    }

    fn clear(&self) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = guard.take() {
            bar.finish_and_clear();
        }
    }
}

impl OcrProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        let bar = ProgressBar::new(total_pages as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        bar.set_prefix("OCR");
        bar.enable_steady_tick(Duration::from_millis(80));
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = guard.replace(bar) {
            old.finish_and_clear();
        }
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.with_bar(|bar| bar.set_message(format!("page {page_num}")));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, text_len: usize) {
        self.with_bar(|bar| {
            bar.println(format!(
                "  {} Page {:>3}/{:<3}  {}",
                green("✓"),
                page_num,
                total,
                dim(&format!("{text_len:>5} chars")),
            ));
            bar.inc(1);
        });
    }

    fn on_extraction_complete(&self, _total_pages: usize, _text_len: usize) {
        self.clear();
    }
}

const AFTER_HELP: &str = r#"SESSION COMMANDS:
  upload <path>      OCR a scanned PDF form (re-uploading the same file reuses the text)
  fill               ask the model to fill N/A / nan / --- placeholders
  show ocr           print the extracted text
  show filled        print the AI-filled text
  download [path]    save the filled form as a PDF (default: <output-dir>/AI_Filled_Form.pdf)
  ask <question>     answer a question from the filled form
  history            list questions and answers, newest first
  reset              clear the session
  help               list commands
  quit               end the session (EOF works too)

ENVIRONMENT VARIABLES:
  GROQ_API_KEY       API key for the completion endpoint (also read from .env)
  AUTOFILL_MODEL     Override model ID
  AUTOFILL_ENDPOINT  Override the chat-completions URL
  TESSERACT_PATH     Path to the tesseract executable
  PDFIUM_LIB_PATH    Path to libpdfium (file or directory)
"#;

/// Fill scanned PDF forms with an LLM and ask questions about them.
#[derive(Parser, Debug)]
#[command(
    name = "autofill",
    version,
    about = "Fill scanned PDF forms with an LLM and ask questions about them",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF to upload when the session starts.
    input: Option<PathBuf>,

    /// Chat model ID.
    #[arg(long, env = "AUTOFILL_MODEL")]
    model: Option<String>,

    /// OpenAI-compatible chat-completions URL.
    #[arg(long, env = "AUTOFILL_ENDPOINT")]
    endpoint: Option<String>,

    /// Path to the tesseract executable.
    #[arg(long, env = "TESSERACT_PATH", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Tesseract language code(s), e.g. eng or eng+deu.
    #[arg(long, env = "TESSERACT_LANG")]
    tesseract_lang: Option<String>,

    /// Path to libpdfium, or the directory holding it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Rasterisation DPI for OCR (72–400).
    #[arg(long, env = "AUTOFILL_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Directory `download` writes into.
    #[arg(short, long, env = "AUTOFILL_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Attempts per completion call.
    #[arg(long, env = "AUTOFILL_MAX_ATTEMPTS", default_value_t = 3)]
    max_attempts: u32,

    /// Delay between completion attempts, in milliseconds.
    #[arg(long, env = "AUTOFILL_RETRY_DELAY_MS", default_value_t = 2000)]
    retry_delay_ms: u64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "AUTOFILL_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "AUTOFILL_VERBOSE")]
    verbose: bool,

    /// Suppress everything except errors and command output.
    #[arg(short, long, env = "AUTOFILL_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so env-backed flags and GROQ_API_KEY can come from it.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config and collaborators ───────────────────────────────────
    let config = build_config(&cli)?;

    let recognizer = TesseractRecognizer::from_config(&config);
    match recognizer.check_available() {
        Ok(banner) if !cli.quiet => eprintln!("{} {}", cyan("◆"), dim(&banner)),
        Ok(_) => {}
        Err(e) => warn!("{e}"),
    }

    let progress = Arc::new(CliProgressCallback::default());
    let extractor = OcrExtractor::new(
        Arc::new(PdfiumRasterizer::from_config(&config)),
        Arc::new(recognizer),
    )
    .with_progress(progress.clone() as ProgressCallback);
    let assistant = FormAssistant::from_config(&config)
        .context("Cannot talk to the completion endpoint")?;
    let controller = Controller::new(extractor, assistant, config.download_filename.clone());

    let mut repl = Repl {
        controller,
        session: SessionState::new(),
        progress,
        output_dir: cli.output_dir.clone(),
    };

    if !cli.quiet {
        eprintln!(
            "{} {}  {}",
            cyan("◆"),
            bold("AI PDF Auto-Filler"),
            dim(&format!("model {} · type 'help' for commands", config.model))
        );
    }

    if let Some(ref input) = cli.input {
        repl.dispatch(&format!("upload {}", input.display())).await;
    }

    // ── Session loop ─────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", bold(">"));
        io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        if repl.dispatch(&line).await == Flow::Quit {
            break;
        }
    }

    Ok(())
}

/// Map CLI args to `AutofillConfig`.
fn build_config(cli: &Cli) -> Result<AutofillConfig> {
    let mut builder = AutofillConfig::builder()
        .api_key_from_env()
        .tesseract_path(&cli.tesseract)
        .dpi(cli.dpi)
        .max_attempts(cli.max_attempts)
        .retry_delay_ms(cli.retry_delay_ms)
        .request_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref endpoint) = cli.endpoint {
        builder = builder.endpoint(endpoint);
    }
    if let Some(ref lang) = cli.tesseract_lang {
        builder = builder.tesseract_lang(lang);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(lib);
    }

    builder.build().context("Invalid configuration")
}

// ── Session commands ─────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Repl {
    controller: Controller,
    session: SessionState,
    progress: Arc<CliProgressCallback>,
    output_dir: PathBuf,
}

impl Repl {
    /// Run one command line. Errors are printed; the session goes on.
    async fn dispatch(&mut self, line: &str) -> Flow {
        let line = line.trim();
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        let outcome = match cmd.to_ascii_lowercase().as_str() {
            "" => Ok(()),
            "upload" => self.upload(arg).await,
            "fill" => self.fill().await,
            "show" => self.show(arg),
            "download" => self.download(arg).await,
            "ask" => self.ask(arg).await,
            "history" => {
                self.print_history();
                Ok(())
            }
            "reset" => {
                self.session.reset();
                eprintln!("{} session cleared", green("✔"));
                Ok(())
            }
            "help" | "?" => {
                println!("{AFTER_HELP}");
                Ok(())
            }
            "quit" | "exit" => return Flow::Quit,
            other => {
                eprintln!("{} unknown command '{other}' (try 'help')", red("✗"));
                Ok(())
            }
        };

        if let Err(e) = outcome {
            eprintln!("{} {e}", red("✗"));
        }
        Flow::Continue
    }

    async fn upload(&mut self, arg: &str) -> Result<(), AutofillError> {
        if arg.is_empty() {
            eprintln!("usage: upload <path>");
            return Ok(());
        }
        let document = Document::open(arg).await?;
        let result = self.controller.upload(&mut self.session, document).await;
        self.progress.clear();

        let text = result?;
        println!("{}", bold("── Extracted text ──"));
        println!("{text}");
        Ok(())
    }

    async fn fill(&mut self) -> Result<(), AutofillError> {
        let bar = spinner("Filling", "waiting for the model…");
        let result = self.controller.request_fill(&mut self.session).await;
        bar.finish_and_clear();

        let filled = result?;
        if is_sentinel(filled) {
            eprintln!("{} {}", red("✗"), filled);
        } else {
            println!("{}", bold("── AI-filled form ──"));
            println!("{filled}");
        }
        Ok(())
    }

    fn show(&self, arg: &str) -> Result<(), AutofillError> {
        match arg {
            "ocr" => {
                let text = self
                    .session
                    .extracted_text()
                    .ok_or(AutofillError::NothingUploaded)?;
                println!("{text}");
            }
            "filled" => {
                let text = self.session.filled_text().ok_or(AutofillError::NotFilled)?;
                println!("{text}");
            }
            _ => eprintln!("usage: show ocr|filled"),
        }
        Ok(())
    }

    async fn download(&self, arg: &str) -> Result<(), AutofillError> {
        let download = self.controller.request_download(&self.session)?;
        let path = if arg.is_empty() {
            download.save_to_dir(&self.output_dir).await?
        } else {
            let path = Path::new(arg).to_path_buf();
            download.save_as(&path).await?;
            path
        };
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(&path.display().to_string()),
            dim(&format!("{} bytes, {}", download.bytes().len(), download.media_type)),
        );
        Ok(())
    }

    async fn ask(&mut self, question: &str) -> Result<(), AutofillError> {
        let bar = spinner("Asking", question.to_string());
        let result = self
            .controller
            .ask_question(&mut self.session, question)
            .await
            .map(|_| ());
        bar.finish_and_clear();
        result?;
        self.print_history();
        Ok(())
    }

    fn print_history(&self) {
        if self.session.history().is_empty() {
            eprintln!("{}", dim("no questions asked yet"));
            return;
        }
        println!("{}", bold("── Q/A history ──"));
        for pair in self.session.history_newest_first() {
            println!("{} {}", cyan("Q:"), pair.question);
            println!("{} {}\n", green("A:"), pair.answer);
        }
    }
}
