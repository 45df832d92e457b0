//! Per-kind mapping of raw exchange records to CSV rows.
//!
//! Column labels follow the Japanese tax-reporting layout users of the
//! exchange expect. Records the mapping cannot classify are errors, never
//! skipped.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde_json::Value;

use crate::api::RawRecord;
use crate::history::TransformError;
use crate::models::OutputRecord;

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Order side label for `bid` / `ask` / `both`
fn order_label(side: &str) -> Option<&'static str> {
    match side {
        "bid" => Some("買"),
        "ask" => Some("売"),
        "both" => Some("自己"),
        _ => None,
    }
}

/// Display name of a futures contract group
fn futures_group_label(group_id: u64) -> Option<&'static str> {
    match group_id {
        1 => Some("AirFX"),
        2 => Some("四半期6月(07-01) "),
        3 => Some("四半期9月(10-01)"),
        4 => Some("四半期12月(01-01)"),
        5 => Some("四半期3月(04-01)"),
        _ => None,
    }
}

/// Render unix seconds as ISO-8601 in JST
pub fn convert_timestamp(seconds: f64) -> Option<String> {
    if !seconds.is_finite() {
        return None;
    }
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS)?;
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    let utc = DateTime::from_timestamp(whole as i64, nanos)?;
    Some(utc.with_timezone(&jst).to_rfc3339_opts(SecondsFormat::AutoSi, false))
}

/// `btc_jpy` -> `BTC/JPY`
pub fn format_currency_pair(pair: &str) -> String {
    pair.to_uppercase().split('_').collect::<Vec<_>>().join("/")
}

fn record_id(raw: &RawRecord) -> i64 {
    raw.get("id").and_then(Value::as_i64).unwrap_or_default()
}

/// Field value, treating JSON null as absent
fn optional<'r>(raw: &'r RawRecord, field: &str) -> Option<&'r Value> {
    raw.get(field).filter(|value| !value.is_null())
}

fn required<'r>(raw: &'r RawRecord, field: &'static str) -> Result<&'r Value, TransformError> {
    optional(raw, field).ok_or(TransformError::MissingField {
        id: record_id(raw),
        field,
    })
}

fn required_str<'r>(raw: &'r RawRecord, field: &'static str) -> Result<&'r str, TransformError> {
    let value = required(raw, field)?;
    value.as_str().ok_or_else(|| invalid(raw, field, value))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_number(raw: &RawRecord, field: &'static str) -> Result<f64, TransformError> {
    let value = required(raw, field)?;
    as_number(value).ok_or_else(|| invalid(raw, field, value))
}

/// Numeric field defaulting to zero when absent
fn number_or_zero(raw: &RawRecord, field: &'static str) -> Result<f64, TransformError> {
    match optional(raw, field) {
        Some(value) => as_number(value).ok_or_else(|| invalid(raw, field, value)),
        None => Ok(0.0),
    }
}

fn timestamp(raw: &RawRecord, field: &'static str) -> Result<String, TransformError> {
    let seconds = required_number(raw, field)?;
    convert_timestamp(seconds).ok_or_else(|| invalid(raw, field, &Value::from(seconds)))
}

fn optional_timestamp(raw: &RawRecord, field: &'static str) -> Result<Option<String>, TransformError> {
    match optional(raw, field) {
        None => Ok(None),
        Some(_) => timestamp(raw, field).map(Some),
    }
}

fn invalid(raw: &RawRecord, field: &'static str, value: &Value) -> TransformError {
    TransformError::InvalidField {
        id: record_id(raw),
        field,
        value: value.to_string(),
    }
}

/// Spot trade. A self trade (`your_action == both`) becomes two rows, the
/// taker leg first.
pub fn spot_trade(raw: RawRecord) -> Result<Vec<OutputRecord>, TransformError> {
    let id = record_id(&raw);
    let action = required_str(&raw, "action")?;
    let your_action = required_str(&raw, "your_action")?;
    let unknown = || TransformError::UnknownAction {
        id,
        action: format!("action={}, your_action={}", action, your_action),
    };
    let side = order_label(your_action).ok_or_else(unknown)?;
    let is_taker = action == your_action;

    let mut row = OutputRecord::new()
        .with("分類", "現物")
        .with("ID", id)
        .with("日時", timestamp(&raw, "timestamp")?)
        .with("通貨ペア", format_currency_pair(required_str(&raw, "currency_pair")?))
        .with("注文種別", side)
        .with("TAKER/MAKER", if is_taker { "TAKER" } else { "MAKER" })
        .with("価格", required(&raw, "price")?)
        .with("数量", required(&raw, "amount")?)
        .with("手数料", required(&raw, "fee_amount")?)
        .with("ボーナス", optional(&raw, "bonus"))
        .with("コメント", optional(&raw, "comment"));

    if your_action != "both" {
        return Ok(vec![row]);
    }

    let (taker_side, maker_side) = match action {
        "bid" => ("自己買", "自己売"),
        "ask" => ("自己売", "自己買"),
        _ => return Err(unknown()),
    };

    let mut taker = row.clone();
    taker.set("注文種別", taker_side);
    taker.set("TAKER/MAKER", "TAKER");
    row.set("注文種別", maker_side);
    row.set("TAKER/MAKER", "MAKER");

    Ok(vec![taker, row])
}

/// Margin or futures position; futures records carry a `group_id`
pub fn position(raw: RawRecord) -> Result<Vec<OutputRecord>, TransformError> {
    let id = record_id(&raw);
    let action = required_str(&raw, "action")?;
    let side = order_label(action).ok_or_else(|| TransformError::UnknownAction {
        id,
        action: format!("action={}", action),
    })?;
    let is_executed = optional(&raw, "amount_done").is_some();

    let mut row = OutputRecord::new();
    match optional(&raw, "group_id") {
        Some(value) => {
            let group_id = value.as_u64().ok_or_else(|| invalid(&raw, "group_id", value))?;
            let group = futures_group_label(group_id)
                .ok_or(TransformError::UnknownFuturesGroup { id, group_id })?;
            row.push("分類", "先物");
            row.push("先物グループ", group);
        }
        None => row.push("分類", "信用"),
    }

    let fee_spent = required_number(&raw, "fee_spent")?;
    let (pnl, pnl_with_fee_swap) = if is_executed {
        let pnl = required_number(&raw, "close_avg")? * required_number(&raw, "close_done")?
            - required_number(&raw, "price_avg")? * required_number(&raw, "amount_done")?;
        let pnl = if action == "bid" { pnl } else { -pnl };
        let swap = number_or_zero(&raw, "swap")?;
        let guard_fee = number_or_zero(&raw, "guard_fee")?;
        (Some(pnl), Some(pnl + swap - guard_fee - fee_spent))
    } else {
        (None, None)
    };

    row.push("ID", id);
    row.push("発注日時", timestamp(&raw, "timestamp")?);
    row.push("決済日時", optional_timestamp(&raw, "timestamp_closed")?);
    row.push("通貨ペア", format_currency_pair(required_str(&raw, "currency_pair")?));
    row.push(
        "ステータス",
        if is_executed { "成立" } else { "取消済み（建玉不成立）" },
    );
    row.push("注文種別", side);
    row.push("数量", required(&raw, "amount")?);
    row.push("価格", required(&raw, "price")?);
    row.push("リミット価格", optional(&raw, "limit"));
    row.push("ストップ価格", optional(&raw, "stop"));
    row.push("支払い手数料", required(&raw, "fee_spent")?);
    row.push("建玉平均価格", optional(&raw, "price_avg"));
    row.push("建玉数", optional(&raw, "amount_done"));
    row.push("決済平均価格", optional(&raw, "close_avg"));
    row.push("決済数", optional(&raw, "close_done"));
    row.push("スワップ", optional(&raw, "swap"));
    row.push("追証ガード手数料(信用取引のみ)", optional(&raw, "guard_fee"));
    row.push("ポジション損益", pnl);
    row.push("ポジション損益(手数料・スワップ込み)", pnl_with_fee_swap);

    Ok(vec![row])
}

pub fn deposit(currency: &str, raw: RawRecord) -> Result<Vec<OutputRecord>, TransformError> {
    Ok(vec![OutputRecord::new()
        .with("通貨", currency)
        .with("ID", record_id(&raw))
        .with("日時", timestamp(&raw, "timestamp")?)
        .with("数量", required(&raw, "amount")?)
        .with("入金アドレス", optional(&raw, "address"))
        .with("トランザクション", optional(&raw, "txid"))])
}

pub fn withdrawal(currency: &str, raw: RawRecord) -> Result<Vec<OutputRecord>, TransformError> {
    // bank withdrawals report `processed: 0` until the transfer is made
    let processed = match optional(&raw, "processed") {
        Some(value) if as_number(value).is_some_and(|n| n != 0.0) => {
            optional_timestamp(&raw, "processed")?
        }
        _ => None,
    };

    Ok(vec![OutputRecord::new()
        .with("通貨", currency)
        .with("ID", record_id(&raw))
        .with("日時", timestamp(&raw, "timestamp")?)
        .with("数量", required(&raw, "amount")?)
        .with("手数料", required(&raw, "fee")?)
        .with("出金アドレス", optional(&raw, "address"))
        .with("トランザクション", optional(&raw, "txid"))
        .with("銀行名", optional(&raw, "bank_name"))
        .with("支店名", optional(&raw, "bank_branch"))
        .with("口座種別", optional(&raw, "account_type"))
        .with("口座番号", optional(&raw, "account_no"))
        .with("口座名義", optional(&raw, "account_kana"))
        .with("処理日時", processed)])
}
