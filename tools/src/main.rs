//! carco-runner: headless report runner for the dealership analytics core.
//!
//! Usage:
//!   carco-runner --db carco.db --seed-demo 42 --vehicles 1200 --customers 600
//!   carco-runner --db carco.db --report top-brands --start 2024-01-01 --end 2024-12-31
//!   carco-runner --db carco.db --report recall-hits --supplier Aisin \
//!       --start 2024-05-01 --end 2024-08-31 --unsold-only
//!   carco-runner --db carco.db --report models-by-brand --brand "Great Wall"
//!   carco-runner --db carco.db --ipc-mode      (one JSON request per stdin line)

use anyhow::{anyhow, bail, Context, Result};
use carco_core::{
    config::AnalyticsConfig,
    demo::{self, DemoOptions},
    engine::AnalyticsEngine,
    query::{
        DateRange, DwellOptions, PriceOptions, QueryContext, RankMetric, RecallOptions,
        TopOptions, TrendOptions, UnsoldOptions,
    },
    source::CatalogResolver,
    store::FactStore,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Report(ReportArgs),
    Quit,
}

/// One report request, from the command line or an IPC line.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ReportArgs {
    report:         String,
    start:          Option<NaiveDate>,
    end:            Option<NaiveDate>,
    month:          Option<NaiveDate>,
    as_of:          Option<NaiveDate>,
    limit:          Option<i64>,
    metric:         Option<String>,
    brand:          Option<String>,
    model:          Option<String>,
    supplier:       Option<String>,
    dealer_id:      Option<i64>,
    page:           Option<i64>,
    page_size:      Option<i64>,
    segment:        bool,
    unsold_only:    bool,
    include_unsold: bool,
    timeout_ms:     Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let ipc_mode = has_flag(&args, "--ipc-mode");

    let config = match flag_value(&args, "--config") {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::default(),
    };

    let store = if db == ":memory:" {
        FactStore::in_memory()?
    } else {
        FactStore::open(db)?
    };
    store.migrate()?;

    if let Some(seed) = flag_value(&args, "--seed-demo") {
        let defaults = DemoOptions::default();
        let opts = DemoOptions {
            seed:      seed.parse().with_context(|| format!("bad --seed-demo value {seed}"))?,
            vehicles:  parse_arg(&args, "--vehicles", defaults.vehicles),
            customers: parse_arg(&args, "--customers", defaults.customers),
        };
        let summary = demo::seed(&store, &opts)?;
        if !ipc_mode {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    let engine = AnalyticsEngine::new(store, config);

    if ipc_mode {
        return run_ipc_loop(&engine);
    }

    if let Some(report) = flag_value(&args, "--report") {
        let request = report_args_from_cli(&args, report)?;
        let output = run_report(&engine, &request)?;
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}

fn run_ipc_loop(engine: &AnalyticsEngine<FactStore>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<IpcCommand>(&buffer) {
            Ok(IpcCommand::Quit) => break,
            Ok(IpcCommand::Report(request)) => match run_report(engine, &request) {
                Ok(output) => json!({ "report": request.report, "data": output }),
                Err(e) => json!({ "report": request.report, "error": e.to_string() }),
            },
            Err(e) => json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }
    Ok(())
}

fn report_args_from_cli(args: &[String], report: &str) -> Result<ReportArgs> {
    Ok(ReportArgs {
        report:         report.to_string(),
        start:          date_flag(args, "--start")?,
        end:            date_flag(args, "--end")?,
        month:          date_flag(args, "--month")?,
        as_of:          date_flag(args, "--as-of")?,
        // A malformed limit falls back to the report default, like a missing one.
        limit:          flag_value(args, "--limit").and_then(|v| v.parse().ok()),
        metric:         flag_value(args, "--metric").map(str::to_string),
        brand:          flag_value(args, "--brand").map(str::to_string),
        model:          flag_value(args, "--model").map(str::to_string),
        supplier:       flag_value(args, "--supplier").map(str::to_string),
        dealer_id:      number_flag(args, "--dealer")?,
        page:           number_flag(args, "--page")?,
        page_size:      number_flag(args, "--page-size")?,
        segment:        has_flag(args, "--segment"),
        unsold_only:    has_flag(args, "--unsold-only"),
        include_unsold: has_flag(args, "--include-unsold"),
        timeout_ms:     number_flag(args, "--timeout-ms")?,
    })
}

fn run_report(engine: &AnalyticsEngine<FactStore>, req: &ReportArgs) -> Result<Value> {
    let mut ctx = QueryContext::new();
    if let Some(ms) = req.timeout_ms {
        ctx = ctx.with_timeout(Duration::from_millis(ms));
    }

    let value = match req.report.as_str() {
        "trend" => serde_json::to_value(
            engine.sales_trend(&TrendOptions { range: range(req)?, segment: req.segment }, &ctx)?,
        )?,
        "top-brands" => serde_json::to_value(engine.top_brands(&top_options(req)?, &ctx)?)?,
        "top-models" => serde_json::to_value(engine.top_models(&top_options(req)?, &ctx)?)?,
        "top-dealers" => serde_json::to_value(engine.top_dealers(&top_options(req)?, &ctx)?)?,
        "top-colors" => serde_json::to_value(engine.top_colors(&top_options(req)?, &ctx)?)?,
        "price" => serde_json::to_value(engine.price_summary(
            &PriceOptions {
                range: range(req)?,
                brand: req.brand.clone(),
                model: req.model.clone(),
            },
            &ctx,
        )?)?,
        "dwell" => serde_json::to_value(engine.longest_dwell(
            &DwellOptions { range: range(req)?, include_unsold: req.include_unsold },
            &ctx,
        )?)?,
        "period" => {
            let month = req.month.ok_or_else(|| anyhow!("period report needs --month"))?;
            let cmp = engine.period_comparison(month, &ctx)?;
            json!({
                "comparison": cmp,
                "mom_units_pct": cmp.mom_units_pct(),
                "mom_revenue_pct": cmp.mom_revenue_pct(),
                "yoy_units_pct": cmp.yoy_units_pct(),
                "yoy_revenue_pct": cmp.yoy_revenue_pct(),
            })
        }
        "recall-hits" => serde_json::to_value(engine.recall_hits(&recall_options(req)?, &ctx)?)?,
        "recall-by-model" => {
            serde_json::to_value(engine.recall_by_model(&recall_options(req)?, &ctx)?)?
        }
        "best-month" => {
            let model = req
                .model
                .as_deref()
                .ok_or_else(|| anyhow!("best-month report needs --model"))?;
            serde_json::to_value(engine.model_best_month(model, range(req)?, &ctx)?)?
        }
        "unsold" => serde_json::to_value(engine.unsold_inventory(
            &UnsoldOptions {
                as_of:     as_of(req)?,
                dealer_id: req.dealer_id,
                page:      req.page.unwrap_or(1),
                page_size: req.page_size,
            },
            &ctx,
        )?)?,
        "ageing" => {
            serde_json::to_value(engine.inventory_ageing(as_of(req)?, req.dealer_id, &ctx)?)?
        }
        "brands" => serde_json::to_value(engine.source().brands()?)?,
        "models-by-brand" => {
            let brand = req
                .brand
                .as_deref()
                .ok_or_else(|| anyhow!("models-by-brand report needs --brand"))?;
            serde_json::to_value(engine.source().models_by_brand(brand)?)?
        }
        "colors" => serde_json::to_value(engine.source().colors()?)?,
        "suppliers" => serde_json::to_value(engine.source().suppliers()?)?,
        "transmissions" => serde_json::to_value(engine.source().transmissions()?)?,
        other => bail!("unknown report '{other}'"),
    };
    Ok(value)
}

fn range(req: &ReportArgs) -> Result<DateRange> {
    let (Some(start), Some(end)) = (req.start, req.end) else {
        bail!("report '{}' needs --start and --end", req.report);
    };
    Ok(DateRange::new(start, end)?)
}

fn as_of(req: &ReportArgs) -> Result<NaiveDate> {
    req.as_of
        .ok_or_else(|| anyhow!("report '{}' needs --as-of", req.report))
}

fn top_options(req: &ReportArgs) -> Result<TopOptions> {
    let metric = match req.metric.as_deref() {
        None => RankMetric::Units,
        Some(m) => RankMetric::parse(m).ok_or_else(|| anyhow!("unknown metric '{m}'"))?,
    };
    Ok(TopOptions {
        range: range(req)?,
        metric,
        limit: req.limit,
        brand: req.brand.clone(),
    })
}

fn recall_options(req: &ReportArgs) -> Result<RecallOptions> {
    let supplier = req
        .supplier
        .clone()
        .ok_or_else(|| anyhow!("report '{}' needs --supplier", req.report))?;
    Ok(RecallOptions { supplier, range: range(req)?, unsold_only: req.unsold_only })
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn date_flag(args: &[String], flag: &str) -> Result<Option<NaiveDate>> {
    flag_value(args, flag)
        .map(|v| {
            v.parse::<NaiveDate>()
                .with_context(|| format!("{flag} expects YYYY-MM-DD, got {v}"))
        })
        .transpose()
}

fn number_flag<T>(args: &[String], flag: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    flag_value(args, flag)
        .map(|v| {
            v.parse::<T>()
                .with_context(|| format!("{flag} expects a number, got {v}"))
        })
        .transpose()
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
