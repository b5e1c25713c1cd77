//! CLI `reviewflow`.
//!
//!   reviewflow classes
//!   reviewflow fields  <analysis.json>
//!   reviewflow results <analysis.json>
//!   reviewflow run     <analysis.json> <dataset.json> [--train-fraction F] campo=columna ...
//!
//! Códigos de salida: 0 ok, 2 uso, 4 validación, 5 ejecución.
use log::error;
use reviewflow_rust::config::{AppConfig, CONFIG};
use reviewflow_rust::{load_analysis, load_table, parse_mappings, registry, report, run_analysis, CoreError};
use serde_json::Value;

const USAGE: &str = "uso: reviewflow classes | fields <analysis.json> | results <analysis.json> | run <analysis.json> \
                     <dataset.json> [--train-fraction F] campo=columna ...";

enum Failure {
    Usage(String),
    App(CoreError),
}

impl From<CoreError> for Failure {
    fn from(e: CoreError) -> Self {
        Failure::App(e)
    }
}

fn print_json(value: &Value) -> Result<(), Failure> {
    println!("{}", serde_json::to_string_pretty(value).map_err(CoreError::from)?);
    Ok(())
}

fn execute(args: &[String], cfg: &AppConfig) -> Result<(), Failure> {
    let registry = registry();
    let ids = cfg.id_mode.generator();
    match args.first().map(String::as_str) {
        Some("classes") => {
            for (module, classname) in registry.classes() {
                println!("{module}::{classname}");
            }
            Ok(())
        }
        Some("fields") => {
            let path = args.get(1).ok_or_else(|| Failure::Usage("falta <analysis.json>".into()))?;
            let analysis = load_analysis(path, &registry, ids.as_ref())?;
            print_json(&report::fields_report(&analysis)?)
        }
        Some("results") => {
            let path = args.get(1).ok_or_else(|| Failure::Usage("falta <analysis.json>".into()))?;
            let analysis = load_analysis(path, &registry, ids.as_ref())?;
            print_json(&report::results_report(&analysis)?)
        }
        Some("run") => {
            let (Some(analysis_path), Some(dataset_path)) = (args.get(1), args.get(2)) else {
                return Err(Failure::Usage("faltan <analysis.json> <dataset.json>".into()));
            };
            let mut train_fraction: Option<f64> = None;
            let mut pairs: Vec<&str> = Vec::new();
            let mut i = 3;
            while i < args.len() {
                match args[i].as_str() {
                    "--train-fraction" => {
                        i += 1;
                        let raw = args.get(i)
                                      .ok_or_else(|| Failure::Usage("--train-fraction requiere un valor".into()))?;
                        let f = raw.parse::<f64>()
                                   .map_err(|_| Failure::Usage(format!("--train-fraction inválido: '{raw}'")))?;
                        train_fraction = Some(f);
                    }
                    other => pairs.push(other),
                }
                i += 1;
            }
            let mapping = parse_mappings(&pairs).map_err(|e| Failure::Usage(e.to_string()))?;
            let mut analysis = load_analysis(analysis_path, &registry, ids.as_ref())?;
            let mut table = load_table(dataset_path)?;
            let runtime = cfg.runtime()?;
            let out = run_analysis(&mut analysis, &runtime, &mut table, &mapping, train_fraction)?;
            print_json(&out)
        }
        Some(other) => Err(Failure::Usage(format!("comando desconocido '{other}'"))),
        None => Err(Failure::Usage("falta el comando".into())),
    }
}

fn main() {
    let cfg: &AppConfig = &CONFIG;
    if let Err(e) = reviewflow_rust::init_logging(&cfg.log_filter) {
        eprintln!("[reviewflow] logging: {e}");
    }
    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = match execute(&args, cfg) {
        Ok(()) => 0,
        Err(Failure::Usage(msg)) => {
            eprintln!("[reviewflow] {msg}\n{USAGE}");
            2
        }
        Err(Failure::App(e)) => {
            error!("reviewflow failed error={}", e);
            eprintln!("[reviewflow] {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}
