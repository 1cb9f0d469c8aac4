use std::fmt;
use std::sync::Arc;

use log::info;
use spanner_query::{
    Config, Error, Key, QueryMethod, RepositoryQuery, Row, SpannerEntity, SpannerOperations,
    SpannerTemplate, SqlSpannerQuery, StandardEvaluationContext, Value,
};

const ACTIONS: [&str; 2] = ["BUY", "SELL"];
const STOCKS: [&str; 5] = ["stock1", "stock2", "stock3", "stock4", "stock5"];

#[derive(Debug)]
struct Trade {
    symbol: String,
    action: String,
    trader_id: String,
    price: f64,
    shares: f64,
}

impl SpannerEntity for Trade {
    const TABLE: &'static str = "trades";

    fn columns() -> &'static [&'static str] {
        &["symbol", "action", "trader_id", "price", "shares"]
    }

    fn key_columns() -> &'static [&'static str] {
        &["symbol", "action"]
    }

    fn to_values(&self) -> Result<Vec<Value>, Error> {
        Ok(vec![
            self.symbol.as_str().into(),
            self.action.as_str().into(),
            self.trader_id.as_str().into(),
            self.price.into(),
            self.shares.into(),
        ])
    }

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Trade {
            symbol: row.get("symbol")?,
            action: row.get("action")?,
            trader_id: row.get("trader_id")?,
            price: row.get("price")?,
            shares: row.get("shares")?,
        })
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trade{{symbol='{}', action='{}', traderId='{}', price={}, shares={}}}",
            self.symbol, self.action, self.trader_id, self.price, self.shares
        )
    }
}

struct TradeRepository {
    operations: Arc<SpannerTemplate>,
    find_by_action: SqlSpannerQuery<Trade, SpannerTemplate>,
}

impl TradeRepository {
    fn new(operations: Arc<SpannerTemplate>) -> Result<Self, Error> {
        let context = Arc::new(StandardEvaluationContext::new());
        context.set_variable("table", Trade::TABLE);

        let find_by_action = SqlSpannerQuery::new(
            QueryMethod::builder()
                .name("find_by_action")
                .parameters(vec![Some("action".to_string())])
                .build()?,
            "SELECT * FROM #{#table} WHERE action = @action",
            operations.clone(),
            context,
        )?;

        Ok(Self {
            operations,
            find_by_action,
        })
    }

    async fn find_by_action(&self, action: &str) -> Result<Vec<Trade>, Error> {
        self.find_by_action.execute(&[&action]).await
    }

    async fn count_by_action(&self, action: &str) -> Result<usize, Error> {
        Ok(self.find_by_action(action).await?.len())
    }

    async fn count(&self) -> Result<i64, Error> {
        self.operations.count::<Trade>().await
    }

    async fn delete_all(&self) -> Result<(), Error> {
        self.operations.delete_all::<Trade>().await
    }

    async fn delete_by_id(&self, key: Key) -> Result<(), Error> {
        self.operations.delete_by_id::<Trade>(key).await
    }
}

fn env(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let builder = Config::builder()
        .project(env("SPANNER_PROJECT", "test-project"))
        .instance(env("SPANNER_INSTANCE", "test-instance"))
        .database(env("SPANNER_DATABASE", "trades"));
    let builder = match std::env::var("SPANNER_EMULATOR_HOST") {
        Ok(host) => {
            info!("using the emulator at {}", host);
            builder.with_emulator_host(&host)
        }
        Err(_) => builder,
    };
    let operations = Arc::new(builder.connect().await?);
    let trades = TradeRepository::new(operations.clone())?;

    trades.delete_all().await?;

    for stock in STOCKS {
        for action in ACTIONS {
            operations
                .insert(&Trade {
                    symbol: stock.to_string(),
                    action: action.to_string(),
                    trader_id: "demo_trader".to_string(),
                    price: 100.0,
                    shares: 12345.6,
                })
                .await?;
        }
    }

    println!(
        "The table for trades has been cleared and {} new trades have been inserted:",
        trades.count().await?
    );

    let all_trades = operations.find_all::<Trade>().await?;
    for trade in &all_trades {
        println!("{}", trade);
    }

    println!(
        "There are {} BUY trades: ",
        trades.count_by_action("BUY").await?
    );
    for trade in trades.find_by_action("BUY").await? {
        println!("{}", trade);
    }

    println!("These are the Spanner primary keys for the trades:");
    for trade in &all_trades {
        println!("{}", operations.get_id(trade)?);
    }

    trades
        .delete_by_id(Key::from((Value::from(STOCKS[0]), Value::from(ACTIONS[0]))))
        .await?;

    Ok(())
}
