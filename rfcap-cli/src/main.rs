use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info};
use rfcap_cli::{commands, parse_freq_khz, CliError, CliResult, ConvertArgs};

#[derive(Parser, Debug)]
#[command(
    name = "rfcap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect, upgrade and wrap RF capture files",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Тихий режим (только ошибки)
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Отладочный вывод
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Показать заголовок файла захвата или спектрограммы
    Info {
        file: PathBuf,
        /// Вывод в JSON
        #[arg(long)]
        json: bool,
        /// Файл спектрограммы
        #[arg(long)]
        spectrogram: bool,
    },
    /// Пересохранить захват (версия 4/5) с подменой полей
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Версия заголовка: 4 или 5
        #[arg(long = "version")]
        header_version: Option<u32>,
        /// Длина захвата, мс (недостающие отсчёты дополняются единицами)
        #[arg(long)]
        capture_len: Option<u32>,
        /// Центральная частота (2422.3MHz, 2.4GHz, 2422300)
        #[arg(long)]
        center_freq: Option<String>,
        /// Режим захвата: search, track
        #[arg(long)]
        mode: Option<String>,
        /// Идентификатор сенсора
        #[arg(long)]
        sensor_id: Option<u32>,
        /// Полоса (не больше частоты дискретизации)
        #[arg(long)]
        bandwidth: Option<String>,
    },
    /// Дописать заголовок версии 3 к сырому захвату
    AttachHeader {
        raw: PathBuf,
        output: PathBuf,
        /// Длительность захвата, мс: 211, 460, 633
        #[arg(short, long)]
        duration: u32,
        /// Центральная частота (2442MHz, 2.442GHz, 2442000)
        #[arg(short = 'f', long)]
        freq: String,
        /// Усиление приёмника, дБ
        #[arg(short, long, default_value = "0")]
        gain: u32,
    },
    /// Построить матрицу спектрограммы и вывести её форму
    Spectrogram {
        file: PathBuf,
        /// Не отсекать краевые бины
        #[arg(long)]
        keep_margin: bool,
    },
}

fn run(command: Command) -> CliResult<()> {
    match command {
        Command::Info {
            file,
            json,
            spectrogram,
        } => {
            let report = commands::info(&file, spectrogram)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report.to_json()?)?);
            } else {
                info!("{}", file.display());
                print!("{}", report.to_text());
            }
        }
        Command::Convert {
            input,
            output,
            header_version,
            capture_len,
            center_freq,
            mode,
            sensor_id,
            bandwidth,
        } => {
            let args = ConvertArgs {
                version: header_version,
                capture_len_ms: capture_len,
                center_freq,
                mode,
                sensor_id,
                bandwidth,
            };
            let header = commands::convert(&input, &output, &args.save_options()?)?;
            info!(
                "Written {} header, total_len {}",
                header.version(),
                header.total_len()
            );
        }
        Command::AttachHeader {
            raw,
            output,
            duration,
            freq,
            gain,
        } => {
            let fc_khz =
                parse_freq_khz(&freq).map_err(|e| CliError::config(format!("--freq: {e}")))?;
            let header = commands::attach(&raw, &output, duration, fc_khz, gain)?;
            info!(
                "Header v3: {} ms, fc {} kHz, total_len {}",
                header.antenna.ant_dwell_time_ms, header.base.fc_khz, header.base.total_len
            );
        }
        Command::Spectrogram { file, keep_margin } => {
            let summary = commands::spectrogram(&file, keep_margin)?;
            let (rows, cols) = summary.shape;
            println!("shape: {rows} x {cols} (freq x time)");
            for (i, mean) in summary.row_means.iter().enumerate() {
                println!("  [{i:>4}] {mean:.4}");
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::Builder::new()
        .filter_level(level.parse().unwrap_or(log::LevelFilter::Info))
        .format_target(false)
        .format_timestamp_secs()
        .init();

    if let Err(e) = run(cli.command) {
        error!("{e}");
        std::process::exit(1);
    }
}
