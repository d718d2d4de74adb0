//! Subcommands and their execution.

use anyhow::Context;
use clap::Subcommand;
use keyset_memory::{MemoryTable, Record};
use keyset_pagination::{ConnectionArgs, PageArgs, Paginator};
use serde_json::Value as JsonValue;

use crate::TRACING_TARGET_COMMAND;
use crate::config::Cli;

/// Response shape to print.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print `{results, cursors}` with prev/next cursors
    Simple {
        /// Maximum number of rows on the page
        #[arg(long)]
        limit: Option<u64>,

        /// `prevCursor` or `nextCursor` from a previous page
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Print `{edges, pageInfo}` in the connection shape
    Connection {
        /// Number of edges after `--after`
        #[arg(long, allow_negative_numbers = true)]
        first: Option<i64>,

        /// Edge cursor to page forward from
        #[arg(long)]
        after: Option<String>,

        /// Number of edges before `--before`
        #[arg(long, allow_negative_numbers = true)]
        last: Option<i64>,

        /// Edge cursor to page backward from
        #[arg(long)]
        before: Option<String>,
    },
}

/// Loads the rows, paginates them and returns the page as plain JSON.
pub async fn run(cli: &Cli) -> anyhow::Result<JsonValue> {
    let json = tokio::fs::read_to_string(&cli.query.rows)
        .await
        .with_context(|| format!("failed to read {}", cli.query.rows.display()))?;
    let records = Record::parse_many(&json)
        .with_context(|| format!("failed to load records from {}", cli.query.rows.display()))?;

    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        records = records.len(),
        "Loaded records"
    );

    let table = MemoryTable::from_records(records);
    let paginator = Paginator::new(&table, cli.pagination.clone())?;
    let query = &cli.query;

    let output = match &cli.command {
        Command::Simple { limit, cursor } => {
            let args = PageArgs {
                filter: query.filter(),
                order: query.order.iter().cloned().collect(),
                limit: *limit,
                pagination_field: query.pagination_field.clone(),
                cursor: cursor.clone(),
                projection: query.attributes.clone(),
                ..PageArgs::default()
            };
            let page = paginator
                .paginate(args)
                .await
                .with_context(|| format!("{} failed", paginator.method_name()))?;
            serde_json::to_value(page.map(|record| record.to_json()))?
        }
        Command::Connection {
            first,
            after,
            last,
            before,
        } => {
            let args = ConnectionArgs {
                filter: query.filter(),
                order: query.order.iter().cloned().collect(),
                first: *first,
                after: after.clone(),
                last: *last,
                before: before.clone(),
                pagination_field: query.pagination_field.clone(),
                projection: query.attributes.clone(),
                ..ConnectionArgs::default()
            };
            let connection = paginator
                .paginate_connection(args)
                .await
                .with_context(|| format!("{} failed", paginator.method_name()))?;
            serde_json::to_value(connection.map(|record| record.to_json()))?
        }
    };

    Ok(output)
}
