use anyhow::Result;
use clap::value_t_or_exit;
use std::path::PathBuf;
use thermal_grid::{arg, args_parser, opt};

pub struct Args {
    pub output: PathBuf,
    pub ticks: u32,
    pub config: Option<PathBuf>,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub scale: Option<u32>,
    pub packed: bool,
    pub lookup: bool,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("thermal-serve")
            .about("Run the thermal pipeline against the synthetic sensor and write a snapshot.")
            .arg(
                opt!("config")
                    .short("c")
                    .help("Pipeline config as JSON (defaults apply when omitted)"),
            )
            .arg(
                opt!("ticks")
                    .short("n")
                    .help("Number of pipeline ticks to run.  Default is 8"),
            )
            .arg(opt!("min").help("Display range low bound, celsius"))
            .arg(opt!("max").help("Display range high bound, celsius"))
            .arg(opt!("scale").help("Bitmap upscale factor.  Default is 10"))
            .arg(
                opt!("packed")
                    .takes_value(false)
                    .help("Write the packed RGB565 buffer instead of a bitmap"),
            )
            .arg(
                opt!("lookup")
                    .takes_value(false)
                    .help("Use the 256-entry palette instead of the procedural gradient"),
            )
            .arg(
                arg!("output")
                    .required(true)
                    .help("Snapshot output path"),
            )
            .get_matches();

        let output = value_t_or_exit!(matches, "output", PathBuf);
        let config = matches
            .is_present("config")
            .then(|| value_t_or_exit!(matches.value_of("config"), PathBuf));
        let ticks = matches
            .is_present("ticks")
            .then(|| value_t_or_exit!(matches.value_of("ticks"), u32))
            .unwrap_or(8);
        let min = matches
            .is_present("min")
            .then(|| value_t_or_exit!(matches.value_of("min"), f32));
        let max = matches
            .is_present("max")
            .then(|| value_t_or_exit!(matches.value_of("max"), f32));
        let scale = matches
            .is_present("scale")
            .then(|| value_t_or_exit!(matches.value_of("scale"), u32));
        let packed = matches.is_present("packed");
        let lookup = matches.is_present("lookup");

        Ok(Args {
            output,
            ticks,
            config,
            min,
            max,
            scale,
            packed,
            lookup,
        })
    }
}
