#![cfg(feature = "grpc")]

use std::sync::Arc;

use spanner_query::{
    Error, Key, QueryMethod, RepositoryQuery, Row, SpannerEntity, SpannerOperations,
    SqlSpannerQuery, StandardEvaluationContext, Value,
};

mod spanner_emulator;

const TRADES_DDL: &str = "CREATE TABLE trades (symbol STRING(MAX) NOT NULL, action STRING(MAX) NOT NULL, trader_id STRING(MAX), price FLOAT64, shares FLOAT64) PRIMARY KEY (symbol, action)";

#[derive(Debug, Clone, PartialEq)]
struct Trade {
    symbol: String,
    action: String,
    trader_id: Option<String>,
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
            match &self.trader_id {
                Some(trader_id) => trader_id.as_str().into(),
                None => Value::Null(spanner_query::Type::String),
            },
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

fn trade(symbol: &str, action: &str) -> Trade {
    Trade {
        symbol: symbol.to_string(),
        action: action.to_string(),
        trader_id: Some("demo_trader".to_string()),
        price: 100.0,
        shares: 12345.6,
    }
}

#[tokio::test]
#[cfg_attr(not(feature = "emulator"), ignore)]
async fn test_trades() -> Result<(), Error> {
    let fixture = spanner_emulator::new_template(vec![TRADES_DDL]).await?;
    let operations = Arc::new(fixture.template());

    for symbol in ["stock1", "stock2", "stock3"] {
        for action in ["BUY", "SELL"] {
            operations.insert(&trade(symbol, action)).await?;
        }
    }
    assert_eq!(operations.count::<Trade>().await?, 6);
    assert_eq!(operations.find_all::<Trade>().await?.len(), 6);

    let context = Arc::new(StandardEvaluationContext::new());
    context.set_variable("table", "trades");
    let find_by_action: SqlSpannerQuery<Trade, _> = SqlSpannerQuery::new(
        QueryMethod::named("find_by_action"),
        "SELECT * FROM #{#table} WHERE action = @action ORDER BY symbol",
        operations.clone(),
        context,
    )?;

    let buys = find_by_action.execute(&[&"BUY"]).await?;
    assert_eq!(
        buys,
        vec![
            trade("stock1", "BUY"),
            trade("stock2", "BUY"),
            trade("stock3", "BUY")
        ]
    );

    let key = operations.get_id(&buys[0])?;
    assert_eq!(key, Key::from((Value::from("stock1"), Value::from("BUY"))));
    operations.delete_by_id::<Trade>(key).await?;
    assert_eq!(operations.count::<Trade>().await?, 5);
    assert_eq!(find_by_action.execute(&[&"BUY"]).await?.len(), 2);

    operations.delete_all::<Trade>().await?;
    assert_eq!(operations.count::<Trade>().await?, 0);

    Ok(())
}
