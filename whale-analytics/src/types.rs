/// Typed views over upstream records
///
/// These match the JSON shapes served by the whale tracker API. They are always built
/// from a [`Record`] through the resolver/coercion wall, so a missing or mistyped field
/// degrades to a default instead of failing the whole response.
use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Trade side (Buy or Sell)
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Case-insensitive match against exactly "buy" and "sell".
    pub fn classify(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("buy") {
            Some(Side::Buy)
        } else if raw.eq_ignore_ascii_case("sell") {
            Some(Side::Sell)
        } else {
            None
        }
    }
}

/// Health endpoint response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub online: String,
}

impl StatusResponse {
    /// The API reports its liveness as the string "true".
    pub fn is_online(&self) -> bool {
        self.online.trim().eq_ignore_ascii_case("true")
    }
}

/// Tracked whale account
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Whale {
    pub address: String,
    pub username: Option<String>,
    pub is_tracked: bool,
    /// Realised PnL
    pub total_r_pnl: f64,
    /// Unrealised PnL
    pub total_u_pnl: f64,
    pub total_volume: f64,
    pub trade_count: u64,
}

impl Whale {
    pub fn from_record(record: &Record) -> Self {
        Self {
            address: record.text(&["address"]).unwrap_or_default().to_string(),
            username: record.text(&["username"]).map(str::to_string),
            is_tracked: record.flag(&["is_tracked"]).unwrap_or(false),
            total_r_pnl: record.signed(&["total_r_pnl"]).unwrap_or(0.0),
            total_u_pnl: record.signed(&["total_u_pnl"]).unwrap_or(0.0),
            total_volume: record.magnitude(&["total_volume"]).unwrap_or(0.0),
            trade_count: record.magnitude(&["trade_count"]).map_or(0, |count| count as u64),
        }
    }

    /// Username if set, otherwise the address.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.address)
    }
}

/// Executed whale trade
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trade {
    pub id: Option<u64>,
    pub wallet_address: String,
    pub asset: String,
    /// Raw side as reported; see [`Trade::side`] for classification
    pub side: Option<String>,
    pub size: f64,
    pub price: f64,
    /// Unix seconds or milliseconds
    pub timestamp: Option<f64>,
    pub status: Option<String>,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
}

impl Trade {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.magnitude(&["id"]).map(|id| id as u64),
            wallet_address: record.text(&["wallet_address"]).unwrap_or_default().to_string(),
            asset: record.text(&["asset"]).unwrap_or_default().to_string(),
            side: record.text(&["side"]).map(str::to_string),
            size: record.magnitude(&["size"]).unwrap_or(0.0),
            price: record.magnitude(&["price"]).unwrap_or(0.0),
            timestamp: record.magnitude(&["timestamp"]),
            status: record.text(&["status"]).map(str::to_string),
            realized_pnl: record.signed(&["realized_pnl"]).unwrap_or(0.0),
            unrealized_pnl: record.signed(&["unrealized_pnl"]).unwrap_or(0.0),
        }
    }

    pub fn side(&self) -> Option<Side> {
        self.side.as_deref().and_then(Side::classify)
    }

    /// size × price
    pub fn notional(&self) -> f64 {
        self.size * self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record;
    use serde_json::json;

    #[test]
    fn test_side_classify() {
        struct TestCase {
            input: &'static str,
            expected: Option<Side>,
        }

        let tests = vec![
            // TC0: lowercase buy
            TestCase {
                input: "buy",
                expected: Some(Side::Buy),
            },
            // TC1: uppercase sell
            TestCase {
                input: "SELL",
                expected: Some(Side::Sell),
            },
            // TC2: mixed case
            TestCase {
                input: "BuY",
                expected: Some(Side::Buy),
            },
            // TC3: unknown literal is silently unclassified
            TestCase {
                input: "long",
                expected: None,
            },
            // TC4: padding is not trimmed
            TestCase {
                input: " buy",
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = Side::classify(test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_whale_from_record() {
        let input = record(json!({
            "address": "0x1234567890abcdef",
            "username": null,
            "is_tracked": true,
            "total_r_pnl": -150.25,
            "total_u_pnl": "30",
            "total_volume": 5000,
            "trade_count": 12
        }));

        let actual = Whale::from_record(&input);

        assert_eq!(actual.address, "0x1234567890abcdef");
        assert_eq!(actual.username, None);
        assert_eq!(actual.display_name(), "0x1234567890abcdef");
        assert!(actual.is_tracked);
        assert_eq!(actual.total_r_pnl, -150.25);
        assert_eq!(actual.total_u_pnl, 30.0);
        assert_eq!(actual.total_volume, 5000.0);
        assert_eq!(actual.trade_count, 12);
    }

    #[test]
    fn test_trade_from_malformed_record() {
        let input = record(json!({
            "id": "not-a-number",
            "side": "Buy",
            "size": "10",
            "price": 0.42,
            "timestamp": 1_700_000_000
        }));

        let actual = Trade::from_record(&input);

        assert_eq!(actual.id, None);
        assert_eq!(actual.wallet_address, "");
        assert_eq!(actual.side(), Some(Side::Buy));
        assert!((actual.notional() - 4.2).abs() < 1e-9);
        assert_eq!(actual.timestamp, Some(1_700_000_000.0));
        assert_eq!(actual.status, None);
    }

    #[test]
    fn test_status_response() {
        let status: StatusResponse = serde_json::from_str(r#"{"online": "true"}"#).unwrap();
        assert!(status.is_online());

        let status: StatusResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(!status.is_online());
    }
}
