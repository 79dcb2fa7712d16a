#[macro_use]
extern crate serde_derive;
extern crate docopt;
extern crate node_metadata;
extern crate serde_json;
extern crate slog_scope;

use std::collections::BTreeMap;

use docopt::Docopt;
use slog_scope::debug;

use node_metadata::errors::{Result, ResultExt};
use node_metadata::metadata::{LabelScheme, MetadataFetcher};
use node_metadata::settings::Settings;
use node_metadata::util::init_logging;

const USAGE: &str = "
Usage: node_metadata [options]

Options:
    -h, --help              Show this message.
    --config=CONFIGFILE     Configuration file path.
    --plain-keys            Use plain label keys (overrides label_scheme).
";

#[derive(Debug, Deserialize)]
struct Args {
    flag_config: Option<String>,
    flag_plain_keys: bool,
}

fn main() -> Result<()> {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());
    let mut filenames = Vec::new();
    if let Some(config_filename) = args.flag_config {
        filenames.push(config_filename);
    }
    let settings = Settings::with_env_and_config_files(&filenames)?;
    let _guards = init_logging(settings.debug);

    let scheme = if args.flag_plain_keys {
        LabelScheme::Plain
    } else {
        settings.label_scheme
    };
    let metadata = MetadataFetcher::new(scheme)
        .fetch_instance_metadata()
        .chain_err(|| "Failed to fetch instance metadata")?;
    debug!("Fetched instance metadata"; "labels" => metadata.len());

    // Sorted so the output is stable between runs
    let labels: BTreeMap<_, _> = metadata.into_iter().collect();
    println!("{}", serde_json::to_string(&labels)?);
    Ok(())
}
