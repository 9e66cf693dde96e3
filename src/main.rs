use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use hrdesk::controller::Controller;
use hrdesk::export::write_csv;
use hrdesk::loader::{FromRow, expand_path, load_records};
use hrdesk::model::{Model, Status};
use hrdesk::ui::TableUI;
use hrdesk::{
    AppConfig, ComplianceOfficer, DeskError, ExpenseLine, Filter, FinanceExecutive, LeaveRequest,
    Record, TableConfig, TableViewController,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Leave,
    Compliance,
    Finance,
    Expense,
}

#[derive(Parser, Debug)]
#[command(name = "hrdesk", version, about = "Browse HR record tables in the terminal")]
struct Cli {
    /// csv, parquet or arrow file. The built-in sample data is used when omitted.
    file: Option<String>,

    /// Record type stored in the file
    #[arg(short, long, value_enum, default_value_t = Kind::Leave)]
    kind: Kind,

    #[arg(short, long, default_value_t = 10)]
    rows_per_page: usize,

    /// Initial free text search
    #[arg(short, long)]
    search: Option<String>,

    /// Initial sort column
    #[arg(long)]
    sort: Option<String>,

    #[arg(long, requires = "sort")]
    descending: bool,

    /// Equality filter, can be given multiple times
    #[arg(long, value_name = "FIELD=VALUE", value_parser = parse_filter)]
    filter: Vec<Filter>,

    /// Write the filtered rows as csv and exit without starting the ui
    #[arg(short, long, value_name = "PATH")]
    export: Option<PathBuf>,

    #[arg(long, default_value = "hrdesk.log")]
    log_file: String,
}

fn parse_filter(s: &str) -> Result<Filter, String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok(Filter::equals(field.trim(), value.trim()))
        }
        _ => Err(format!("expected FIELD=VALUE, got \"{s}\"")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_file) {
        eprintln!("Error: cannot open log file {}: {}", cli.log_file, e);
        return ExitCode::FAILURE;
    }

    let result = match cli.kind {
        Kind::Leave => run::<LeaveRequest>(&cli, LeaveRequest::sample),
        Kind::Compliance => run::<ComplianceOfficer>(&cli, ComplianceOfficer::sample),
        Kind::Finance => run::<FinanceExecutive>(&cli, FinanceExecutive::sample),
        Kind::Expense => run::<ExpenseLine>(&cli, ExpenseLine::sample),
    };

    match result {
        Err(e) => {
            error!("{:?}", e);
            eprintln!("Error: {e}");
            if let DeskError::RecordParse { trace, .. } = &e {
                eprintln!("{trace}");
            }
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(path: &str) -> Result<(), DeskError> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn configure<R: Record>(table: &mut TableViewController<R>, cli: &Cli) {
    if !cli.filter.is_empty() {
        table.set_filters(cli.filter.clone());
    }
    if let Some(query) = &cli.search {
        table.handle_search_change(query);
    }
    if let Some(field) = &cli.sort {
        table.handle_request_sort(field);
        if cli.descending {
            table.handle_request_sort(field);
        }
    }
}

fn run<R: Record + FromRow>(cli: &Cli, sample: fn() -> Vec<R>) -> Result<(), DeskError> {
    let records = match &cli.file {
        Some(path) => load_records(expand_path(path)?)?,
        None => {
            info!("No file given, using sample {}", R::KIND);
            sample()
        }
    };

    let config =
        AppConfig::default().table(TableConfig::default().rows_per_page(cli.rows_per_page));

    if let Some(path) = &cli.export {
        let mut table = TableViewController::new(records, &config.table);
        configure(&mut table, cli);
        let written = write_csv(path, table.filtered_rows())?;
        println!("Wrote {} rows to {}", written, path.display());
        return Ok(());
    }

    let mut model = Model::init(&config, records);
    configure(model.table_mut(), cli);
    model.update(None)?;

    let mut terminal = ratatui::init();
    let result = event_loop(&config, &mut model, &mut terminal);
    ratatui::restore();
    result
}

fn event_loop<R: Record>(
    config: &AppConfig,
    model: &mut Model<R>,
    terminal: &mut ratatui::DefaultTerminal,
) -> Result<(), DeskError> {
    let mut ui = TableUI::new(config);
    let controller = Controller::new(config);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model.get_uidata(), f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(model.raw_keyevents())? {
            model.update(Some(message))?;
        }
    }
    Ok(())
}
