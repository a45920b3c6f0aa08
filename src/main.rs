use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;
use log::debug;

use mdnterm::config;
use mdnterm::redirect::{HttpFetcher, Resolver, DEFAULT_SERVICE};
use mdnterm::terminal;

#[derive(Parser)]
#[command(name = "mdn", version)]
#[command(about = "Look up MDN documentation and read it in the terminal", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Search terms, e.g. `array map`
    #[arg(required = true)]
    terms: Vec<String>,

    /// Always use colours
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Never use colours
    #[arg(long)]
    no_color: bool,

    /// Always emit terminal hyperlinks
    #[arg(
        long,
        value_name = "WHEN",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "always",
        value_parser = ["always"],
        conflicts_with = "no_hyperlink"
    )]
    hyperlink: Option<String>,

    /// Never emit terminal hyperlinks
    #[arg(long)]
    no_hyperlink: bool,

    /// Render with the rules for older pages
    #[arg(long)]
    legacy: bool,

    /// Redirect service used for the search
    #[arg(long, value_name = "URL", default_value = DEFAULT_SERVICE)]
    service: String,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,
}

impl Cli {
    fn colour(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            terminal::supports_colour()
        }
    }

    /// Older pages predate hyperlink support, so `--legacy` only gets
    /// them when asked for.
    fn hyperlinks(&self) -> bool {
        if self.hyperlink.is_some() {
            true
        } else if self.no_hyperlink || self.legacy {
            false
        } else {
            terminal::supports_hyperlinks()
        }
    }
}

fn run(cli: Cli) -> mdnterm::Result<()> {
    let base = if cli.legacy {
        config::legacy()
    } else {
        config::current()
    };
    let config = base.colour(cli.colour()).hyperlinks(cli.hyperlinks());

    let resolver = Resolver::new(HttpFetcher::new(Duration::from_secs(cli.timeout)))
        .service(cli.service.as_str());
    let page = resolver.resolve(&cli.terms.join(" "))?;
    debug!("rendering {}", page.url);

    let stdout = io::stdout().lock();
    let mut out = config.render_page(page.body.as_bytes(), stdout)?;
    out.flush()?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
