mod logging;

use std::path::Path;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use markup_parser::{Document, Element, ElementValue, ParseOptions};
use markup_writer::WriterOptions;

/// Deepest tree `tree --json` will serialize; serde walks the tree recursively.
const JSON_MAX_DEPTH: usize = 2048;

#[derive(Parser)]
#[command(name = "markup")]
#[command(about = "Tokenize, check and reformat XML-shaped markup")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a file for errors without producing output
    Check {
        /// Input file
        path: String,
        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Print the token stream of a file
    Tokens {
        /// Input file
        path: String,
    },

    /// Re-emit a file as normalized markup
    Fmt {
        /// Input file
        path: String,
        /// Spaces per nesting level
        #[arg(long, default_value_t = 2)]
        indent: usize,
        /// Write everything on one line
        #[arg(long, conflicts_with = "indent")]
        compact: bool,
        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Print the element tree of a file
    Tree {
        /// Input file
        path: String,
        /// Print the document as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        parse: ParseArgs,
    },
}

#[derive(Args)]
struct ParseArgs {
    /// Trim whitespace around text values
    #[arg(long)]
    trim_text: bool,
    /// Reject documents nested deeper than this
    #[arg(long)]
    max_depth: Option<usize>,
}

impl ParseArgs {
    fn options(&self) -> ParseOptions {
        let options = ParseOptions::new().with_trim_text(self.trim_text);
        match self.max_depth {
            Some(depth) => options.with_max_depth(depth),
            None => options,
        }
    }
}

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { path, parse } => cmd_check(&path, &parse),
        Command::Tokens { path } => cmd_tokens(&path),
        Command::Fmt {
            path,
            indent,
            compact,
            parse,
        } => cmd_fmt(&path, indent, compact, &parse),
        Command::Tree { path, json, parse } => cmd_tree(&path, json, &parse),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn read_source(path: &str) -> anyhow::Result<String> {
    let p = Path::new(path);
    if !p.exists() {
        bail!("file not found: {path}");
    }
    std::fs::read_to_string(p).with_context(|| format!("reading {path}"))
}

fn parse_file(path: &str, args: &ParseArgs) -> anyhow::Result<Document> {
    let source = read_source(path)?;
    let doc = markup_parser::Parser::parse_document_with(&source, &args.options())
        .with_context(|| format!("parsing {path}"))?;
    tracing::debug!(path, elements = doc.element_count(), "parsed document");
    Ok(doc)
}

fn cmd_check(path: &str, args: &ParseArgs) -> anyhow::Result<()> {
    parse_file(path, args)?;
    eprintln!("OK: {path}");
    Ok(())
}

fn cmd_tokens(path: &str) -> anyhow::Result<()> {
    let source = read_source(path)?;
    let tokens = markup_lexer::tokenize(&source).with_context(|| format!("tokenizing {path}"))?;
    for token in tokens {
        println!(
            "{:>4}:{:<4} {:<22} {:?}",
            token.span.line,
            token.span.column,
            format!("{:?}", token.kind),
            token.text
        );
    }
    Ok(())
}

fn cmd_fmt(path: &str, indent: usize, compact: bool, args: &ParseArgs) -> anyhow::Result<()> {
    let doc = parse_file(path, args)?;
    let options = if compact {
        WriterOptions::compact()
    } else {
        WriterOptions::indented(indent)
    };
    let output = markup_writer::to_string_pretty(&doc, &options)
        .with_context(|| format!("writing {path}"))?;
    print!("{output}");
    if compact {
        println!();
    }
    Ok(())
}

fn cmd_tree(path: &str, json: bool, args: &ParseArgs) -> anyhow::Result<()> {
    let doc = parse_file(path, args)?;
    if json {
        let depth = doc.root.depth();
        if depth > JSON_MAX_DEPTH {
            bail!("{path} is nested {depth} levels deep; JSON output supports at most {JSON_MAX_DEPTH}");
        }
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    if !doc.instructions.is_empty() {
        println!("?{}{}", doc.instructions.target, attribute_list(&doc.instructions.attributes));
    }
    print_outline(&doc.root);
    Ok(())
}

/// One line per element, indented by depth.
fn print_outline(root: &Element) {
    let mut stack = vec![(root, 0usize)];
    while let Some((el, depth)) = stack.pop() {
        let pad = "  ".repeat(depth);
        let attrs = attribute_list(&el.attributes);
        match &el.value {
            ElementValue::Empty => println!("{pad}{}{attrs}", el.name),
            ElementValue::Text(text) => println!("{pad}{}{attrs}: {text:?}", el.name),
            ElementValue::Children(children) => {
                println!("{pad}{}{attrs}", el.name);
                stack.extend(children.iter().rev().map(|c| (c, depth + 1)));
            }
        }
    }
}

fn attribute_list(attributes: &markup_parser::Attributes) -> String {
    attributes
        .iter()
        .map(|(k, v)| format!(" {k}={v:?}"))
        .collect()
}
