//! Orihon CLI - Convert, validate, and inspect Orihon markup documents
//!
//! Usage:
//!   orihon [OPTIONS] [COMMAND] <FILE>...
//!
//! Commands:
//!   convert   Render a document to HTML (default)
//!   parse     Display document structure
//!   check     Fast syntax check without a full conversion
//!   stats     Show document statistics

use std::env;
use std::fs;
use std::process;

use orihon_core::{checker, convert, Config, Conversion, Diagnostic, NodeKind, Registry, Severity};
use serde::Serialize;

fn main() {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let cli = parse_args(args)?;

    match cli.command {
        Command::Convert => cmd_convert(&cli),
        Command::Parse => cmd_parse(&cli),
        Command::Check => cmd_check(&cli),
        Command::Stats => cmd_stats(&cli),
    }
}

#[derive(Debug)]
struct Cli {
    command: Command,
    files: Vec<String>,
    format: OutputFormat,
    config: Config,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Convert,
    Parse,
    Check,
    Stats,
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut command = Command::Convert;
    let mut format = OutputFormat::Text;
    let mut config = Config::default();
    let mut files = Vec::new();

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("orihon {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-j" | "--json" => format = OutputFormat::Json,
            "--embed-diagnostics" => config.embed_diagnostics = true,
            "--include-source" => config.include_source = true,
            "--template" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| "--template requires a value".to_string())?;
                config.template = Some(value.clone());
            }
            "convert" => command = Command::Convert,
            "parse" => command = Command::Parse,
            "check" => command = Command::Check,
            "stats" => command = Command::Stats,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => files.push(arg.clone()),
        }
        i += 1;
    }

    if files.is_empty() {
        return Err("no input file specified".to_string());
    }
    if files.len() > 1 && !matches!(command, Command::Check) {
        return Err("multiple files are only supported by the check command".to_string());
    }

    Ok(Cli {
        command,
        files,
        format,
        config,
    })
}

fn print_help() {
    eprintln!(
        r#"orihon - marker-notation document converter

USAGE:
    orihon [OPTIONS] [COMMAND] <FILE>...

COMMANDS:
    convert     Render a document to HTML (default)
    parse       Display document structure
    check       Fast syntax check (accepts multiple files)
    stats       Show document statistics

OPTIONS:
    -j, --json             Output in JSON format
    --embed-diagnostics    Embed a diagnostics summary in the HTML
    --include-source       Pair the source text with the rendered HTML
    --template <ID>        Template identifier forwarded to the output
    -h, --help             Print help information
    -V, --version          Print version information

EXAMPLES:
    orihon draft.txt                  Convert to HTML on stdout
    orihon --embed-diagnostics a.txt  Convert with inline problem report
    orihon check ch1.txt ch2.txt      Pre-flight check several chapters
    orihon -j stats draft.txt         Statistics as JSON
"#
    );
}

fn read_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {}", path, e))
}

// =============================================================================
// Convert Command
// =============================================================================

fn cmd_convert(cli: &Cli) -> Result<(), String> {
    let input = read_file(&cli.files[0])?;
    let result = convert(&input, &cli.config);

    for diagnostic in result.diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }

    match cli.format {
        OutputFormat::Json => {
            let json = JsonConversion {
                html: &result.html,
                template: result.template.as_deref(),
                diagnostics: result.diagnostics.iter().map(JsonDiagnostic::from).collect(),
            };
            println!("{}", to_json(&json)?);
        }
        OutputFormat::Text => println!("{}", result.html),
    }

    Ok(())
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(cli: &Cli) -> Result<(), String> {
    let input = read_file(&cli.files[0])?;
    let result = convert(&input, &cli.config);

    for diagnostic in result.diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }

    match cli.format {
        OutputFormat::Json => {
            let json = JsonStructure {
                nodes: result.nodes.iter().map(describe_node).collect(),
                headings: result
                    .headings
                    .iter()
                    .map(|h| JsonHeading {
                        level: h.level,
                        id: &h.id,
                        title: &h.title,
                    })
                    .collect(),
                footnotes: result.footnotes.iter().map(|f| f.content.as_str()).collect(),
                diagnostics: result.diagnostics.iter().map(JsonDiagnostic::from).collect(),
            };
            println!("{}", to_json(&json)?);
        }
        OutputFormat::Text => print_structure(&result),
    }

    Ok(())
}

fn print_structure(result: &Conversion) {
    println!("Nodes: {}", result.nodes.len());
    for (i, node) in result.nodes.iter().enumerate() {
        println!("  [{}] {}", i + 1, node.kind.as_str());
    }
    if !result.headings.is_empty() {
        println!("Headings:");
        for h in &result.headings {
            println!("  h{} #{} {}", h.level, h.id, h.title);
        }
    }
    if !result.footnotes.is_empty() {
        println!("Footnotes: {}", result.footnotes.len());
    }
    println!("Diagnostics: {}", result.diagnostics.len());
}

fn describe_node(node: &orihon_core::Node) -> String {
    match node.kind {
        NodeKind::KeywordSpan => format!(
            "keyword-span[{}]",
            node.attrs.get("keywords").unwrap_or("")
        ),
        kind => kind.as_str().to_string(),
    }
}

// =============================================================================
// Check Command
// =============================================================================

fn cmd_check(cli: &Cli) -> Result<(), String> {
    let registry = Registry::with_overrides(cli.config.keyword_overrides.clone());

    // path -> diagnostics, in argument order.
    let mut report: Vec<(&str, Vec<Diagnostic>)> = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let input = read_file(path)?;
        report.push((path, checker::check_with_registry(&input, &registry)));
    }

    let error_count: usize = report
        .iter()
        .map(|(_, diags)| diags.iter().filter(|d| d.is_error()).count())
        .sum();

    match cli.format {
        OutputFormat::Json => {
            let json: Vec<JsonFileReport> = report
                .iter()
                .map(|(path, diags)| JsonFileReport {
                    path,
                    valid: !diags.iter().any(|d| d.is_error()),
                    diagnostics: diags.iter().map(JsonDiagnostic::from).collect(),
                })
                .collect();
            println!("{}", to_json(&json)?);
        }
        OutputFormat::Text => {
            for (path, diags) in &report {
                if diags.is_empty() {
                    println!("{}: ok", path);
                } else {
                    println!("{}: {} problem(s)", path, diags.len());
                    for d in diags {
                        println!("  {}", d);
                    }
                }
            }
        }
    }

    if error_count > 0 {
        Err(format!("{} error(s) found", error_count))
    } else {
        Ok(())
    }
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(cli: &Cli) -> Result<(), String> {
    let input = read_file(&cli.files[0])?;
    let result = convert(&input, &cli.config);
    let stats = result.stats();

    match cli.format {
        OutputFormat::Json => {
            let json = JsonStats {
                node_count: stats.node_count,
                error_count: stats.error_count,
                kinds: stats.kind_counts.clone(),
                headings: result.headings.len(),
                footnotes: result.footnotes.len(),
                chars: input.chars().count(),
                lines: input.lines().count(),
                diagnostics: result.diagnostics.len(),
            };
            println!("{}", to_json(&json)?);
        }
        OutputFormat::Text => {
            println!("Document Statistics");
            println!("-------------------");
            println!("Nodes:        {}", stats.node_count);
            for (kind, count) in &stats.kind_counts {
                println!("  {:12} {}", kind, count);
            }
            println!("Headings:     {}", result.headings.len());
            println!("Footnotes:    {}", result.footnotes.len());
            println!();
            println!("Characters:   {}", input.chars().count());
            println!("Lines:        {}", input.lines().count());
            println!();
            println!("Errors:       {}", stats.error_count);
            println!("Diagnostics:  {}", result.diagnostics.len());
        }
    }

    Ok(())
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonConversion<'a> {
    html: &'a str,
    template: Option<&'a str>,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

#[derive(Serialize)]
struct JsonStructure<'a> {
    nodes: Vec<String>,
    headings: Vec<JsonHeading<'a>>,
    footnotes: Vec<&'a str>,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

#[derive(Serialize)]
struct JsonHeading<'a> {
    level: u8,
    id: &'a str,
    title: &'a str,
}

#[derive(Serialize)]
struct JsonFileReport<'a> {
    path: &'a str,
    valid: bool,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    severity: &'a str,
    line: u32,
    column: u32,
    category: &'a str,
    message: &'a str,
    suggestion: Option<&'a str>,
    snippet: Option<&'a str>,
}

impl<'a> From<&'a Diagnostic> for JsonDiagnostic<'a> {
    fn from(d: &'a Diagnostic) -> Self {
        Self {
            severity: match d.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            },
            line: d.line,
            column: d.column,
            category: d.category.as_str(),
            message: &d.message,
            suggestion: d.suggestion.as_deref(),
            snippet: d.snippet.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct JsonStats {
    node_count: usize,
    error_count: usize,
    kinds: Vec<(&'static str, usize)>,
    headings: usize,
    footnotes: usize,
    chars: usize,
    lines: usize,
    diagnostics: usize,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode JSON: {}", e))
}
