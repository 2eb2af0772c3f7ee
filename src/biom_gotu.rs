use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{App, Arg};
use env_logger::Env;

use biom_post::config::BatchConfig;
use biom_post::gotu::CLI;
use biom_post::table::TableFormat;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let matches = App::new("biom-gotu")
        .version("1.0")
        .about("Remap taxonomic row IDs of collapsed BIOM tables to gOTU IDs")
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
            Arg::with_name("map")
                .short("m")
                .long("map")
                .value_name("TAXID-MAP")
                .help("Two-column GID<TAB>TaxID lookup file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output table encoding")
                .possible_values(&["biom", "json"])
                .default_value("biom"),
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
    if let Some(map_fp) = matches.value_of("map") {
        config.taxonomy_map = PathBuf::from(map_fp);
    }

    let cli = CLI {
        config,
        format: TableFormat::from_name(matches.value_of("format").unwrap())
            .unwrap_or(TableFormat::Binary),
    };

    if let Err(e) = cli.run() {
        eprintln!("error: {:#}", e);
        ::std::process::exit(1);
    }
}
