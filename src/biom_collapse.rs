use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{App, Arg};
use env_logger::Env;

use biom_post::collapse_tbls::CLI;
use biom_post::config::BatchConfig;
use biom_post::sample_map::SampleMapSource;
use biom_post::table::TableFormat;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let matches = App::new("biom-collapse")
        .version("1.0")
        .about("Collapse per-index sample columns of BIOM tables by summing")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("CONFIG-TOML")
                .help("Batch configuration file; compiled-in defaults are used without it")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("base")
                .long("base")
                .value_name("DIR")
                .help("Base directory holding the per-condition table directories")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("samplemap")
                .long("sample-map")
                .value_name("MAP-TXT")
                .help("Tab-delimited sample-to-group map; default derives groups by stripping _index<N>")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output table encoding")
                .possible_values(&["biom", "json"])
                .default_value("json"),
        )
        .get_matches();

    let mut config = match matches.value_of("config") {
        Some(path) => match BatchConfig::from_file(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {:#}", e);
                ::std::process::exit(1);
            }
        },
        None => BatchConfig::default(),
    };
    if let Some(base) = matches.value_of("base") {
        config.table_base = PathBuf::from(base);
    }

    let map_source = match matches.value_of("samplemap") {
        Some(path) => SampleMapSource::File(PathBuf::from(path)),
        None => SampleMapSource::StripIndex,
    };

    let cli = CLI {
        config,
        map_source,
        format: TableFormat::from_name(matches.value_of("format").unwrap())
            .unwrap_or(TableFormat::Json),
    };

    if let Err(e) = cli.run() {
        eprintln!("error: {:#}", e);
        ::std::process::exit(1);
    }
}
