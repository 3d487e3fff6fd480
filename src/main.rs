use anyhow::Context;
use clap::Parser;
use dam_levels::api::download_dam_table;
use dam_levels::api::reqwest_client;
use dam_levels::api::DAM_LEVELS_URL;
use dam_levels::report::render_report;
use dam_levels::report::report_outcome;
use dam_levels::report::DumpStyle;
use dam_levels::report::Request;
use log::debug;
use url::Url;

/// Shows the current storage levels of the SEQ water supply dams.
#[derive(Parser)]
struct Opts {
    /// Dam to show, as named on the page.  Every dam is dumped when omitted.
    dam_name: Option<String>,
    /// Format string such as "{name} {percent}%", or "{all}" to dump the whole record.
    #[arg(allow_hyphen_values = true)]
    format: Option<String>,
    /// Page to read the dam levels from.
    #[arg(long, default_value = DAM_LEVELS_URL)]
    url: Url,
    /// Dump records as JSON instead of the debug representation.
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts = Opts::parse();
    let client = reqwest_client()?;
    let dams = download_dam_table(&client, opts.url.clone())
        .await
        .with_context(|| format!("While reading dam levels from {}", opts.url))?;
    debug!("Dams on the page: {:?}", dams.keys().collect::<Vec<_>>());

    let request = Request::new(opts.dam_name.as_deref(), opts.format.as_deref());
    let style = if opts.json {
        DumpStyle::Json
    } else {
        DumpStyle::Debug
    };
    let outcome = report_outcome(render_report(&dams, request, style))?;
    if let Some(report) = &outcome.stdout {
        println!("{report}");
    }
    if let Some(message) = &outcome.stderr {
        eprintln!("{message}");
    }
    if outcome.exit_code != 0 {
        std::process::exit(outcome.exit_code);
    }
    Ok(())
}
