use clap::Parser;
use quatt::coordinator::{FileSnapshotSource, SnapshotCoordinator, SnapshotSource};
use quatt::output::{FileOutput, StdoutOutput};
use quatt::{
    report, run_snapshot, ElectricalPowerSource, FixedElectricalPower, HostPowerSensor,
    NoElectricalPower,
};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct QuattArgs {
    #[arg(help = "Path to a recorded CIC status snapshot in .json format")]
    input_file: String,
    #[arg(
        long,
        short,
        help = "Directory to write the metrics report to (standard output if omitted)"
    )]
    output_dir: Option<PathBuf>,
    #[arg(
        long,
        conflicts_with = "power_sensor",
        help = "Electrical power drawn by the installation in W"
    )]
    electrical_power: Option<f64>,
    #[arg(
        long,
        requires = "power_sensor_state",
        help = "Entity id of an external power sensor"
    )]
    power_sensor: Option<String>,
    #[arg(long, help = "State currently reported by the external power sensor")]
    power_sensor_state: Option<String>,
    #[arg(long, default_value_t = Level::INFO, help = "Maximum level of log events")]
    log_level: Level,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
    #[clap(
        long,
        default_value_t = false,
        help = "Only check that the snapshot can be read and report the installation shape"
    )]
    check_only: bool,
}

fn main() -> anyhow::Result<()> {
    let args = QuattArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt()
            .with_max_level(args.log_level)
            .with_writer(std::io::stderr);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let power_sensor_state = args.power_sensor_state.clone();
    let electrical_power: Box<dyn ElectricalPowerSource> =
        match (args.electrical_power, &args.power_sensor) {
            (Some(watts), _) => Box::new(FixedElectricalPower(watts)),
            (None, Some(sensor_id)) => Box::new(HostPowerSensor::new(sensor_id, move |_: &str| {
                power_sensor_state.clone()
            })),
            (None, None) => Box::new(NoElectricalPower),
        };
    debug!("Using electrical power source {electrical_power:?}");

    if args.check_only {
        return check_snapshot(&args.input_file, electrical_power);
    }

    let input = BufReader::new(File::open(Path::new(&args.input_file))?);

    match args.output_dir {
        Some(output_dir) => {
            fs::create_dir_all(&output_dir)?;
            let file_output = FileOutput::new(
                output_dir,
                format!("{}__{{}}.csv", input_file_stem(&args.input_file)),
            );
            run_snapshot(input, &file_output, electrical_power.as_ref())
        }
        None => run_snapshot(input, StdoutOutput, electrical_power.as_ref()),
    }
}

fn check_snapshot(
    input_file: &str,
    electrical_power: Box<dyn ElectricalPowerSource>,
) -> anyhow::Result<()> {
    let source = FileSnapshotSource::new(input_file);
    let coordinator = SnapshotCoordinator::new(electrical_power);
    coordinator.refresh(&source)?;

    coordinator.metrics(|metrics| {
        println!(
            "{}: heat pump 1 {}, heat pump 2 {}, OpenTherm boiler {}, {} report rows",
            source.name(),
            active(metrics.heatpump1_active()),
            active(metrics.heatpump2_active()),
            active(metrics.boiler_open_therm()),
            report(metrics).len()
        );
    });

    Ok(())
}

fn active(flag: bool) -> &'static str {
    if flag {
        "present"
    } else {
        "absent"
    }
}

fn input_file_stem(input_file: &str) -> &str {
    Path::new(input_file)
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("snapshot")
}
