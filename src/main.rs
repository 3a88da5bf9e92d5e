use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;

use medidor_core::config::Config;
use medidor_core::db::Database;
use medidor_core::rollup::{
    build_access_pivot, build_status_matrix, count_on_off_by_date, filter_by_status,
    MatrixFilters, StatusFilter,
};
use medidor_core::{run_access_ingestion, run_ingestion};

#[derive(Parser)]
#[command(name = "medidor", about = "Offline energy-meter monitoring batch runner")]
struct Cli {
    /// Path to the JSON settings file.
    #[arg(long, default_value = "config.json", env = "MEDIDOR_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all sources, classify staleness and upsert today's history.
    Run,
    /// Fetch platform users and monthly access metrics.
    Access,
    /// Print the per-sensor day-by-day status matrix as CSV.
    Matrix {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// Restrict to sensors whose columns are: variations | on | off | gap.
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        tag: Vec<String>,
        #[arg(long)]
        nome: Vec<String>,
        #[arg(long)]
        plataforma: Vec<String>,
        #[arg(long)]
        tipo: Vec<String>,
    },
    /// Print daily ON/OFF counts for the period.
    Trend {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
    /// Print the per-user monthly access pivot as CSV.
    Pivot {
        /// First month, MM/YYYY.
        #[arg(long)]
        start: String,
        /// Last month, MM/YYYY.
        #[arg(long)]
        end: String,
    },
    /// Flip a user's active flag.
    ToggleUser {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        active: bool,
    },
}

fn parse_status_filter(value: &str) -> Result<StatusFilter> {
    match value {
        "variations" => Ok(StatusFilter::AllVariations),
        "on" => Ok(StatusFilter::AllOn),
        "off" => Ok(StatusFilter::AllOff),
        "gap" => Ok(StatusFilter::AllGap),
        other => Err(anyhow!(
            "unknown status filter '{other}' (expected variations, on, off or gap)"
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let db = Database::new(config.db_path.clone())?;

    match cli.command {
        Command::Run => {
            let summary = run_ingestion(&config, &db).await?;
            for source in &summary.sources {
                match &source.error {
                    Some(err) => info!("{}: failed ({err})", source.source),
                    None => info!(
                        "{}: {} fetched, {} skipped",
                        source.source, source.fetched, source.skipped_no_timestamp
                    ),
                }
            }
            println!(
                "{} records, {} rows written, {} sources failed, {} skipped",
                summary.total_records,
                summary.rows_written,
                summary.failed_sources(),
                summary.skipped_records()
            );
        }
        Command::Access => {
            let summary = run_access_ingestion(&config, &db).await?;
            println!(
                "{} sources processed, {} unresolved users",
                summary.sources.len(),
                summary.unresolved_users
            );
        }
        Command::Matrix {
            start,
            end,
            status,
            tag,
            nome,
            plataforma,
            tipo,
        } => {
            let records = db.history_in_range(start, end).await?;
            let filters = MatrixFilters {
                tags: tag,
                nomes: nome,
                plataformas: plataforma,
                tipos: tipo,
            };
            let mut matrix = build_status_matrix(&records, start, end, &filters);
            if let Some(status) = status {
                matrix = filter_by_status(matrix, parse_status_filter(&status)?);
            }

            let mut header = vec![
                "Tag".to_string(),
                "Nome".to_string(),
                "Plataforma".to_string(),
                "Tipo medidor".to_string(),
            ];
            header.extend(matrix.dates.iter().map(|d| d.to_string()));
            println!("{}", header.join(","));
            for row in &matrix.rows {
                let mut fields = vec![
                    row.tag.clone(),
                    row.nome.clone(),
                    row.plataforma.clone(),
                    row.tipo_medidor.clone(),
                ];
                fields.extend(row.cells.iter().map(|c| c.as_str().to_string()));
                println!("{}", fields.join(","));
            }
        }
        Command::Trend { start, end } => {
            let records = db.history_in_range(start, end).await?;
            println!("data,on,off");
            for point in count_on_off_by_date(&records) {
                println!("{},{},{}", point.date, point.on, point.off);
            }
        }
        Command::Pivot { start, end } => {
            let rows = db.access_rows().await?;
            let pivot = build_access_pivot(&rows, &start, &end)?;

            let mut header = vec!["Nome".to_string(), "Email".to_string(), "Plataforma".to_string()];
            header.extend(pivot.months.iter().cloned());
            println!("{}", header.join(","));
            for row in &pivot.rows {
                let mut fields = vec![row.nome.clone(), row.email.clone(), row.plataforma.clone()];
                fields.extend(row.counts.iter().map(|c| c.to_string()));
                println!("{}", fields.join(","));
            }
        }
        Command::ToggleUser { id, active } => {
            db.toggle_active(id, active).await?;
            println!("user {id} active = {active}");
        }
    }

    Ok(())
}
