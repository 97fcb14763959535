//! Register and record commands.

use ecowatt_core::panels::DataMonitor;
use ecowatt_core::protocol::query::RangeQuery;

use super::Context;
use crate::cli::{FilterArgs, QueryArgs, RecordsArgs};
use crate::error::CliError;

fn build_query(filter: &FilterArgs) -> Result<RangeQuery, CliError> {
    let query = RangeQuery::new()
        .ids(filter.start_id, filter.end_id)
        .times(filter.start_time.as_deref(), filter.end_time.as_deref())?;
    Ok(query)
}

fn monitor(ctx: &Context) -> Result<DataMonitor, CliError> {
    Ok(DataMonitor::new(ctx.client()?, ctx.settings.page_size)?)
}

pub async fn run_registers(ctx: &Context) -> Result<(), CliError> {
    let mut monitor = monitor(ctx)?;
    let snapshot = monitor.refresh_registers().await?;
    println!("{}", ctx.formatter().format_registers(snapshot));
    Ok(())
}

pub async fn run_records(args: RecordsArgs, ctx: &Context) -> Result<(), CliError> {
    let mut monitor = monitor(ctx)?;
    // A fresh monitor is in latest mode, so this loads batch `args.batch`.
    let view = monitor.goto(args.batch).await?;
    let formatter = ctx.formatter();

    if args.registers {
        println!("{}", formatter.format_registers(monitor.registers()));
        if !ctx.json {
            println!();
        }
    }
    println!("{}", formatter.format_page(&view, monitor.message()));
    Ok(())
}

pub async fn run_query(args: QueryArgs, ctx: &Context) -> Result<(), CliError> {
    let query = build_query(&args.filter)?;
    let mut monitor = monitor(ctx)?;
    let view = monitor.fetch_range(query, args.page).await?;
    println!("{}", ctx.formatter().format_page(&view, monitor.message()));
    Ok(())
}

pub async fn run_count(args: FilterArgs, ctx: &Context) -> Result<(), CliError> {
    let query = build_query(&args)?;
    query.validate()?;
    let count = ctx.client()?.record_count(&query).await?;
    println!("{}", ctx.formatter().format_count(&query, count));
    Ok(())
}
