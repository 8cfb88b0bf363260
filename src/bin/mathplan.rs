//! Mathplan CLI - render lesson text with math and check generated lesson plans

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use mathplan::{
    lesson::validate, render_lesson_fields, scan, CredentialProvider, EnvCredentialProvider,
    FormInputs, GenerationRequest, GenerationResult, MathEngine, MathRenderer, MathmlEngine,
    RenderOptions, TrustLevel, TypstEngine,
};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mathplan")]
#[command(version)]
#[command(about = "Mathplan - math rendering and validation for generated lesson plans", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[cfg(feature = "cli")]
#[derive(clap::Args)]
struct RenderArgs {
    /// Typesetting engine
    #[arg(short, long, value_enum, default_value_t = Engine::Mathml)]
    engine: Engine,

    /// JSON file with renderer options
    #[arg(long)]
    options: Option<String>,

    /// Reject formulas using links, images or raw HTML commands
    #[arg(long)]
    strict: bool,

    /// Report malformed formulas as fallbacks instead of inline engine errors
    #[arg(long)]
    no_tolerant: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Render text with delimited math to an HTML fragment
    Render {
        /// Input file path (reads from stdin if not provided)
        input: Option<String>,

        /// Output file path (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<String>,

        /// Print rendered segments as JSON instead of HTML
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print the plain and math segments of a text as JSON
    Scan {
        /// Input file path
        input: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check a lesson plan JSON document
    Validate {
        /// Input file path
        input: Option<String>,

        /// Grade the plan was generated for, enables tier checks
        #[arg(short, long)]
        grade: Option<u8>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render every math field of a lesson plan
    Lesson {
        /// Input file path
        input: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print the generation request for a lesson topic
    Prompt {
        /// Lesson topic
        #[arg(short, long)]
        topic: String,

        /// Grade (6-9)
        #[arg(short, long, default_value_t = 8)]
        grade: u8,

        /// Number of sessions (1-10)
        #[arg(short, long, default_value_t = 2)]
        sessions: u8,

        /// Free-form notes for the lesson
        #[arg(short, long)]
        notes: Option<String>,

        /// Provider model name
        #[arg(short, long)]
        model: Option<String>,
    },
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Engine {
    /// MathML via pulldown-latex
    Mathml,
    /// Typst math source via mitex
    Typst,
}

#[cfg(feature = "cli")]
impl Engine {
    fn build(self) -> Box<dyn MathEngine> {
        match self {
            Engine::Mathml => Box::new(MathmlEngine::new()),
            Engine::Typst => Box::new(TypstEngine::new()),
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            output,
            json,
            render,
        } => {
            let text = read_input(input.as_deref())?;
            let renderer = build_renderer(&render)?;
            let segments = renderer.render(&text);
            let out = if json {
                to_json(&segments)
            } else {
                renderer.to_markup(&segments).into_string()
            };
            write_output(output.as_deref(), &out)
        }
        Commands::Scan { input, output } => {
            let text = read_input(input.as_deref())?;
            write_output(output.as_deref(), &to_json(&scan(&text)))
        }
        Commands::Validate { input, grade, json } => {
            let text = read_input(input.as_deref())?;
            let mut plan = parse_plan(&text);
            if let Some(grade) = grade {
                let mut form = plan.form_inputs.take().unwrap_or_default();
                form.grade = Some(grade);
                plan.form_inputs = Some(form);
            }
            let report = validate(&plan);
            if json {
                println!("{}", to_json(&report));
            } else if report.issues.is_empty() {
                println!("No issues found.");
            } else {
                for issue in &report.issues {
                    println!("{}", issue);
                }
            }
            if !report.is_valid() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Lesson {
            input,
            output,
            render,
        } => {
            let text = read_input(input.as_deref())?;
            let plan = parse_plan(&text);
            let renderer = build_renderer(&render)?;
            let fields = render_lesson_fields(&plan, &renderer);
            write_output(output.as_deref(), &to_json(&fields))
        }
        Commands::Prompt {
            topic,
            grade,
            sessions,
            notes,
            model,
        } => {
            let mut form = FormInputs::new(topic, grade, sessions);
            form.notes = notes;
            let mut request = match GenerationRequest::new(&form) {
                Ok(request) => request,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(2);
                }
            };
            if let Some(model) = model {
                request = request.with_model(model);
            }
            eprintln!("API key: {}", EnvCredentialProvider::new().state());
            println!("{}", to_json(&request));
            Ok(())
        }
    }
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[cfg(feature = "cli")]
fn build_renderer(args: &RenderArgs) -> io::Result<MathRenderer<Box<dyn MathEngine>>> {
    let mut options = match &args.options {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            serde_json::from_str::<RenderOptions>(&raw)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        }
        None => RenderOptions::default(),
    };
    if args.strict {
        options.trust = TrustLevel::Strict;
    }
    if args.no_tolerant {
        options.error_tolerant = false;
    }
    Ok(MathRenderer::with_options(args.engine.build(), options))
}

/// Lesson JSON without validation; `form_inputs` is kept if present.
#[cfg(feature = "cli")]
fn parse_plan(text: &str) -> GenerationResult {
    let parsed = serde_json::from_str::<GenerationResult>(text);
    match parsed.map_err(mathplan::ContractError::from) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn write_output(path: Option<&str>, content: &str) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, content),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

#[cfg(feature = "cli")]
fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install mathplan --features cli");
    eprintln!("  mathplan render [INPUT_FILE]");
}
