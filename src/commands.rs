use std::path::Path;
use serde_json::Value;
use stockgrid::config::{self, StockgridConfig};
use stockgrid::ui::{self, Icons};
use stockgrid::{ChangeBatch, GridEdit, RecordStore, Reconciler, SqliteStore, Summary};

/// Open the store, creating and seeding it when the file does not exist yet
fn open_store(database: &Path) -> anyhow::Result<SqliteStore> {
    config::ensure_db_dir(database)?;
    let fresh = !database.exists();

    let mut store = SqliteStore::open(database)?;
    if fresh {
        tracing::info!("Creating new database at {}", database.display());
        store.init()?;
    }
    Ok(store)
}

/// Cells given on the command line; numbers stay text until the reconciler coerces them
pub fn grid_edit(
    name: Option<String>,
    qty: Option<String>,
    price: Option<String>,
    note: Option<Option<String>>,
) -> GridEdit {
    GridEdit {
        name: name.map(Some),
        qty: qty.map(Value::String),
        price: price.map(Value::String),
        note,
    }
}

/// Reconcile `batch` against a fresh snapshot and print what changed
fn commit(store: &mut SqliteStore, mut batch: ChangeBatch) -> anyhow::Result<()> {
    let snapshot = store.read_all()?;
    let report = Reconciler::new(&snapshot).commit(store, &mut batch)?;

    if report.updated > 0 {
        ui::row_edited(&format!("{} row(s) updated", report.updated));
    }
    for id in &report.inserted {
        ui::row_added(&format!("row added with id {}", id));
    }
    if report.deleted > 0 {
        ui::row_deleted(&format!("{} row(s) deleted", report.deleted));
    }
    ui::success(&format!("Committed: {}", report));
    Ok(())
}

pub fn run_init(database: &Path) -> anyhow::Result<()> {
    config::ensure_db_dir(database)?;
    let mut store = SqliteStore::open(database)?;
    if store.init()? {
        ui::success(&format!("Initialized {} with demo rows", database.display()));
    } else {
        ui::success(&format!("{} is ready ({} rows)", database.display(), store.count()?));
    }
    Ok(())
}

pub fn run_list(database: &Path, format: &str) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let records = store.read_all()?;

    match format {
        "json" => {
            let body = serde_json::json!({
                "items": records,
                "summary": Summary::from_records(&records),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        "text" => {
            ui::header(&format!("Inventory ({})", database.display()));
            if records.is_empty() {
                println!("∅ No rows.");
            } else {
                println!("{}", ui::records_table(&records));
            }
            print_summary(&Summary::from_records(&records));
        }
        other => anyhow::bail!("unknown format '{}' (expected text or json)", other),
    }
    Ok(())
}

pub fn run_add(database: &Path, row: GridEdit) -> anyhow::Result<()> {
    let mut store = open_store(database)?;
    commit(&mut store, ChangeBatch::new().add(row))
}

pub fn run_edit(database: &Path, row: usize, edit: GridEdit) -> anyhow::Result<()> {
    if edit == GridEdit::default() {
        anyhow::bail!("nothing to change: pass at least one of --name, --qty, --price, --note, --clear-note");
    }
    let mut store = open_store(database)?;
    commit(&mut store, ChangeBatch::new().edit(row, edit))
}

pub fn run_delete(database: &Path, rows: &[usize]) -> anyhow::Result<()> {
    let mut store = open_store(database)?;
    let batch = rows.iter().fold(ChangeBatch::new(), |batch, row| batch.delete(*row));
    commit(&mut store, batch)
}

pub fn run_apply(database: &Path, batch_path: &Path, dry_run: bool) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(batch_path)?;
    let batch: ChangeBatch = serde_json::from_str(&contents)?;
    let mut store = open_store(database)?;

    if dry_run {
        let snapshot = store.read_all()?;
        let plan = Reconciler::new(&snapshot).plan(&batch)?;
        if plan.is_empty() {
            ui::warn("Batch resolves to no operations.");
        }
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if batch.is_empty() {
        ui::warn("Batch is empty; nothing to apply.");
        return Ok(());
    }
    commit(&mut store, batch)
}

pub fn run_summary(database: &Path) -> anyhow::Result<()> {
    let store = open_store(database)?;
    print_summary(&Summary::from_records(&store.read_all()?));
    Ok(())
}

fn print_summary(summary: &Summary) {
    ui::section("Summary");
    ui::summary_row("Items:", &summary.items.to_string());
    ui::summary_row("Total quantity:", &summary.total_qty.to_string());
    ui::summary_row("Stock value:", &format!("{:.2}", summary.display_value()));
}

pub fn run_stats(database: &Path) -> anyhow::Result<()> {
    let store = open_store(database)?;
    let stats = store.stats()?;

    let path = database.display().to_string();
    let items = stats.items.to_string();
    let total_qty = stats.total_qty.to_string();
    let last_id = stats.last_id.to_string();

    println!("{} Stockgrid Statistics", Icons::STATS);
    println!(
        "{}",
        ui::stats_table(&[
            ("Database", path.as_str()),
            ("Items", items.as_str()),
            ("Total quantity", total_qty.as_str()),
            ("Last assigned id", last_id.as_str()),
        ])
    );
    Ok(())
}

pub fn run_serve(database: std::path::PathBuf, port: u16) -> anyhow::Result<()> {
    let store = open_store(&database)?;
    ui::info("Database", &format!("{} {}", Icons::DATABASE, database.display()));
    println!("{} Grid running at http://127.0.0.1:{}", Icons::GLOBE, port);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(stockgrid::server::start_server(port, database, store))
}

pub fn run_config(path: &Path, database: &Path, force: bool) -> anyhow::Result<()> {
    let config = StockgridConfig {
        database: Some(database.display().to_string()),
        port: Some(config::DEFAULT_PORT),
    };
    config::write_config(path, &config, force)?;
    ui::success(&format!("Wrote {}", path.display()));
    println!("{}", ui::dim("Environment variable APP_DB_PATH still overrides the database setting."));
    Ok(())
}
