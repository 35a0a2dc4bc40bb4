use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use psx_portfolio::{
    app::{
        App, Clock, InvestedAmountPolicy, Ledger, Portfolio, SystemClock, utils::expand_path,
    },
    config::Config,
    db,
    models::{
        Holding, NewTransaction, RealizedPnl, RealizedPnlFilter, TradeSide, Transaction,
        TransactionFilter, filter::{DEFAULT_LIMIT, DEFAULT_PAGE},
    },
};

#[derive(Parser)]
#[command(name = "psx-portfolio")]
#[command(about = "Trade journal for Pakistan Stock Exchange shares", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file (default: PSX_DATABASE or portfolio.db)
    #[arg(long, global = true)]
    database: Option<String>,

    /// How sales affect the invested amount: retain or proportional
    #[arg(long, global = true)]
    policy: Option<InvestedAmountPolicy>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a trade
    Add {
        side: TradeSide,
        symbol: String,
        quantity: i64,
        rate: Decimal,

        /// Trade date (YYYY-MM-DD), today if omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Show the charges and net amount of a trade without recording it
    Preview {
        side: TradeSide,
        symbol: String,
        quantity: i64,
        rate: Decimal,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Replace a recorded trade and replay the affected symbols
    Edit {
        id: i64,
        side: TradeSide,
        symbol: String,
        quantity: i64,
        rate: Decimal,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Delete a trade and replay its symbol
    Delete { id: i64 },

    /// Show one trade
    Show { id: i64 },

    /// List trades, newest first
    List {
        #[arg(short, long)]
        symbol: Option<String>,

        #[arg(long)]
        side: Option<TradeSide>,

        #[arg(short = 'f', long)]
        from: Option<NaiveDate>,

        #[arg(short, long)]
        to: Option<NaiveDate>,

        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: i64,

        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: i64,
    },

    /// List all holdings
    Holdings,

    /// Holding, trades and realized P/L of one symbol
    Holding { symbol: String },

    /// Portfolio totals
    Summary,

    /// Realized P/L records, newest first
    Pnl {
        #[arg(short, long)]
        symbol: Option<String>,

        #[arg(short = 'f', long)]
        from: Option<NaiveDate>,

        #[arg(short, long)]
        to: Option<NaiveDate>,
    },

    /// Realized P/L by month
    Monthly {
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Realized P/L and charges by year
    Yearly,

    /// Per-symbol trading statistics
    Scripts,

    /// Import trades from a date,side,symbol,quantity,rate CSV file
    Import { path: String },

    /// Re-derive holdings and realized P/L from the stored trades
    Rebuild {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        symbol: Option<String>,

        #[arg(long)]
        all: bool,
    },

    /// Open the terminal dashboard
    View,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?
        .with_database(cli.database.as_deref())?
        .with_policy(cli.policy);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_filter()))
        .with_writer(std::io::stderr)
        .init();

    let pool = db::connect(config.database_path()).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let today = clock.today();
    let portfolio = Portfolio::new(pool, Ledger::new(*config.invested_policy()), clock);
    let json = cli.json;

    match cli.command {
        Commands::Add {
            side,
            symbol,
            quantity,
            rate,
            date,
        } => {
            let input = NewTransaction::new(date.unwrap_or(today), symbol, side, quantity, rate);
            let transaction = portfolio.create_transaction(input).await?;
            emit(json, &transaction, |t| print_transactions(std::slice::from_ref(t)))?;
        }
        Commands::Preview {
            side,
            symbol,
            quantity,
            rate,
            date,
        } => {
            let input = NewTransaction::new(date.unwrap_or(today), symbol, side, quantity, rate);
            let preview = portfolio.preview_transaction(input)?;
            emit(json, &preview, |p| {
                println!("{} {} {} @ {:.4}", p.side(), p.quantity(), p.symbol(), p.rate());
                println!("Amount:         {:>14.2}", p.amount());
                println!("Commission:     {:>14.2}", p.charges().commission());
                println!("Tax:            {:>14.2}", p.charges().tax());
                println!("CDC fee:        {:>14.2}", p.charges().depository_fee());
                println!("Total charges:  {:>14.2}", p.charges().total());
                println!("Net amount:     {:>14.2}", p.net_amount());
            })?;
        }
        Commands::Edit {
            id,
            side,
            symbol,
            quantity,
            rate,
            date,
        } => {
            let input = NewTransaction::new(date.unwrap_or(today), symbol, side, quantity, rate);
            let transaction = portfolio.update_transaction(id, input).await?;
            emit(json, &transaction, |t| print_transactions(std::slice::from_ref(t)))?;
        }
        Commands::Delete { id } => {
            portfolio.delete_transaction(id).await?;
            println!("Deleted transaction {}", id);
        }
        Commands::Show { id } => {
            let transaction = portfolio.get_transaction(id).await?;
            emit(json, &transaction, |t| print_transactions(std::slice::from_ref(t)))?;
        }
        Commands::List {
            symbol,
            side,
            from,
            to,
            page,
            limit,
        } => {
            let filter = TransactionFilter {
                symbol,
                side,
                date_from: from,
                date_to: to,
                page,
                limit,
            };
            let page = portfolio.list_transactions(filter).await?;
            emit(json, &page, |p| {
                print_transactions(p.data());
                println!("Page {} of {} ({} trades)", p.page(), p.pages(), p.total());
            })?;
        }
        Commands::Holdings => {
            let holdings = portfolio.get_holdings().await?;
            emit(json, &holdings, |h| print_holdings(h))?;
        }
        Commands::Holding { symbol } => {
            let details = portfolio.script_details(&symbol).await?;
            emit(json, &details, |d| {
                print_holdings(std::slice::from_ref(d.holding()));
                println!();
                print_transactions(d.transactions());
                println!();
                print_realized(d.realized());
            })?;
        }
        Commands::Summary => {
            let summary = portfolio.get_portfolio_summary().await?;
            emit(json, &summary, |s| {
                print_holdings(s.holdings());
                println!();
                println!("Total invested:     {:>14.2}", s.total_invested());
                println!("Total recovered:    {:>14.2}", s.total_recovered());
                println!("Total realized P/L: {:>14.2}", s.total_realized_pnl());
                println!("Shares held:        {:>14}", s.total_shares_held());
                println!("Active symbols:     {:>14}", s.active_symbol_count());
            })?;
        }
        Commands::Pnl { symbol, from, to } => {
            let filter = RealizedPnlFilter {
                symbol,
                date_from: from,
                date_to: to,
            };
            let records = portfolio.list_realized_pnl(filter).await?;
            emit(json, &records, |r| print_realized(r))?;
        }
        Commands::Monthly { year } => {
            let months = portfolio.monthly_pnl(year).await?;
            emit(json, &months, |months| {
                println!(
                    "{:<8} {:>14} {:>14} {:>14} {:>6}",
                    "Month", "P/L", "Profit", "Loss", "Sales"
                );
                for m in months {
                    println!(
                        "{:04}-{:02}  {:>14.2} {:>14.2} {:>14.2} {:>6}",
                        m.year(),
                        m.month(),
                        m.total_pnl(),
                        m.total_profit(),
                        m.total_loss(),
                        m.sale_count()
                    );
                }
            })?;
        }
        Commands::Yearly => {
            let years = portfolio.yearly_pnl().await?;
            emit(json, &years, |years| {
                println!("{:<6} {:>14} {:>6} {:>12}", "Year", "P/L", "Sales", "Charges");
                for y in years {
                    println!(
                        "{:<6} {:>14.2} {:>6} {:>12.2}",
                        y.year(),
                        y.total_pnl(),
                        y.sale_count(),
                        y.total_charges()
                    );
                }
            })?;
        }
        Commands::Scripts => {
            let scripts = portfolio.script_wise_pnl().await?;
            emit(json, &scripts, |scripts| {
                println!(
                    "{:<10} {:>14} {:>8} {:>14} {:>14} {:>10} {:>10} {:>8}",
                    "Symbol", "P/L", "Traded", "Invested", "Recovered", "Avg Buy", "Avg Sell", "Held"
                );
                for s in scripts {
                    println!(
                        "{:<10} {:>14.2} {:>8} {:>14.2} {:>14.2} {:>10.4} {:>10.4} {:>8}",
                        s.symbol(),
                        s.total_pnl(),
                        s.total_quantity_traded(),
                        s.total_invested(),
                        s.total_recovered(),
                        s.avg_buy_rate(),
                        s.avg_sell_rate(),
                        s.available_quantity()
                    );
                }
            })?;
        }
        Commands::Import { path } => {
            let path = expand_path(&path)?;
            let imported = portfolio.import_transactions(&path).await?;
            emit(json, &imported, |t| {
                print_transactions(t);
                println!("Imported {} transactions", t.len());
            })?;
        }
        Commands::Rebuild { symbol, all } => {
            if all {
                let count = portfolio.rebuild_all().await?;
                println!("Rebuilt {} symbols", count);
            } else if let Some(symbol) = symbol {
                let replayed = portfolio.rebuild(&symbol).await?;
                emit(json, replayed.holding(), |h| match h {
                    Some(h) => print_holdings(std::slice::from_ref(h)),
                    None => println!("No trades left for {}", symbol),
                })?;
            } else {
                bail!("Give a symbol or --all");
            }
        }
        Commands::View => {
            info!(database = %config.database_path().display(), "opening dashboard");
            let mut app = App::new(portfolio).await?;
            app.run().await?;
        }
    }

    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        render(value);
    }
    Ok(())
}

fn print_transactions(transactions: &[Transaction]) {
    println!(
        "{:>6} {:<10} {:<10} {:<4} {:>8} {:>10} {:>14} {:>10} {:>14}",
        "ID", "Date", "Symbol", "Side", "Qty", "Rate", "Amount", "Charges", "Net"
    );
    for t in transactions {
        println!(
            "{:>6} {:<10} {:<10} {:<4} {:>8} {:>10.4} {:>14.2} {:>10.2} {:>14.2}",
            t.id(),
            t.date(),
            t.symbol(),
            t.side(),
            t.quantity(),
            t.rate(),
            t.amount(),
            t.charges().total(),
            t.net_amount()
        );
    }
}

fn print_holdings(holdings: &[Holding]) {
    println!(
        "{:<10} {:>10} {:>12} {:>14} {:>8} {:>8} {:>14}",
        "Symbol", "Available", "Avg Cost", "Invested", "Bought", "Sold", "Realized"
    );
    for h in holdings {
        println!(
            "{:<10} {:>10} {:>12.4} {:>14.2} {:>8} {:>8} {:>14.2}",
            h.symbol(),
            h.available_quantity(),
            h.avg_cost_per_share(),
            h.total_invested_amount(),
            h.total_shares_bought(),
            h.total_shares_sold(),
            h.total_realized_pnl()
        );
    }
}

fn print_realized(records: &[RealizedPnl]) {
    println!(
        "{:<10} {:<10} {:>8} {:>10} {:>10} {:>14} {:>14} {:>8}",
        "Date", "Symbol", "Qty", "Sell", "Avg Cost", "Net", "P/L", "P/L %"
    );
    for r in records {
        println!(
            "{:<10} {:<10} {:>8} {:>10.4} {:>10.4} {:>14.2} {:>14.2} {:>8.2}",
            r.sell_date(),
            r.symbol(),
            r.quantity_sold(),
            r.sell_rate(),
            r.avg_cost_basis(),
            r.net_proceeds(),
            r.realized_pnl(),
            r.pnl_percentage()
        );
    }
}
