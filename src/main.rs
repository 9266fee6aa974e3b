//! ticket-xref - decorate ticket tracker pages

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;

use ticket_xref::{Config, Decorator, Marker, Menu, parse_document, serialize};

#[derive(Parser)]
#[command(name = "ticket-xref")]
#[command(version, about = "Link ticket ids, hashes, repositories and URLs in HTML pages", long_about = None)]
#[command(after_help = "EXAMPLES:
    ticket-xref board.html out.html                 Decorate .gt-xref elements
    ticket-xref -m 'td.summary' page.html           Decorate matching cells, print to stdout
    ticket-xref -c webui.json --menu menu -q 'assignee:alice' page.html out.html")]
struct Cli {
    /// Input HTML file ("-" for stdin)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (stdout when omitted)
    #[arg(value_name = "OUTPUT")]
    output: Option<String>,

    /// Class name or CSS selector of the elements to decorate
    #[arg(short, long, default_value = ".gt-xref")]
    marker: String,

    /// JSON configuration with hosts, xref rules and bookmarks
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Render the bookmark menu into the element with this id
    #[arg(long, value_name = "ID")]
    menu: Option<String>,

    /// Current query, marks the matching bookmark active
    #[arg(short, long)]
    query: Option<String>,

    /// Log decoration details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(io::stderr)
            .init();
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> ticket_xref::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let patterns = config.patterns()?;
    let marker = Marker::parse(&cli.marker)?;

    let html = if cli.input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&cli.input)?
    };

    let mut dom = parse_document(&html);

    if let Some(menu_id) = &cli.menu {
        Menu::build(&config.bookmarks, cli.query.as_deref()).render_into(&mut dom, menu_id)?;
    }

    let report = Decorator::new(&marker, &patterns).decorate(&mut dom);
    tracing::info!(
        decorated = report.decorated,
        skipped = report.skipped,
        links = report.links,
        "decorated {}",
        cli.input
    );

    let output = serialize(&dom);
    match &cli.output {
        Some(path) => fs::write(path, output)?,
        None => print!("{output}"),
    }
    Ok(())
}
