//! Integration tests: config and feed files on disk through a full replay.

use std::io::Write;
use std::path::Path;

use decibook::{BookState, Side};
use decibook_replay::config::Config;
use decibook_replay::error::Error;
use decibook_replay::feed;
use decibook_replay::replay::Replay;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn config_toml() -> &'static str {
    r#"
[book]
depth = 3

[output]
levels = 2
pad_with_zero = true

[[market]]
symbol = "BTC/USDT"
price_tick = "0.01"
amount_precision = 4

[[market]]
symbol = "ETH/BTC"
price_tick = "0.00001"
amount_precision = 3
depth = 1
"#
}

fn feed_jsonl() -> &'static str {
    r#"# two symbols, interleaved
{"type":"snapshot","symbol":"BTC/USDT","nonce":100,"timestamp":1655395057025,"bids":[["30000.1","0.5"],["29999.9","1.25"],["29999.5",2],["29990","3"]],"asks":[["30000.2","0.1"],[30001,"0.3"]]}
{"type":"snapshot","symbol":"ETH/BTC","nonce":7,"bids":[["0.06512","4"],["0.06511","9"]],"asks":[["0.06514","2",3]]}

{"type":"delta","symbol":"BTC/USDT","nonce":101,"bids":[["30000.1","0"],["30000.15","0.75"]],"asks":[["30000.2","0.15"]]}
{"type":"delta","symbol":"BTC/USDT","nonce":101,"bids":[["30000.15","0"]]}
{"type":"delta","symbol":"ETH/BTC","nonce":8,"asks":[["0.06514","2",0],["0.06515","1e-1"],["x","1"]]}
"#
}

fn replay(config: &Config) -> Replay<'_> {
    let feed_file = write_temp(feed_jsonl());
    let messages = feed::load(feed_file.path()).unwrap();
    let mut replay = Replay::new(config);
    replay.apply_all(&messages).unwrap();
    replay
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn load_config_from_file() {
    let file = write_temp(config_toml());
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.book.depth, 3);
    assert_eq!(config.market.len(), 2);
    assert_eq!(config.book_config("ETH/BTC").depth, Some(1));
}

#[test]
fn missing_config_file() {
    let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
    assert!(matches!(err, Error::ConfigRead { .. }));
}

#[test]
fn missing_feed_file() {
    let err = feed::load(Path::new("/nonexistent/feed.jsonl")).unwrap_err();
    assert!(matches!(err, Error::FeedRead { .. }));
}

#[test]
fn feed_skips_comments_and_blank_lines() {
    let file = write_temp(feed_jsonl());
    let messages = feed::load(file.path()).unwrap();

    assert_eq!(messages.len(), 5);
    assert_eq!(messages[0].line, 2);
    assert_eq!(messages[2].line, 5);
}

// ============================================================================
// Replay
// ============================================================================

#[test]
fn books_per_symbol() {
    let config = Config::from_toml(config_toml()).unwrap();
    let replay = replay(&config);
    let books = replay.books();

    assert_eq!(books.len(), 2);

    let btc = books.get("BTC/USDT").unwrap();
    assert_eq!(btc.nonce(), Some(101));
    assert_eq!(btc.state(), BookState::Live);
    assert_eq!(btc.datetime().as_deref(), Some("2022-06-16T15:57:37.025Z"));
    let bids: Vec<String> = btc.to_sorted_levels(Side::Bid).into_iter().map(|l| l.price).collect();
    assert_eq!(bids, ["30000.15", "29999.9", "29999.5"]);
    assert_eq!(btc.best_ask().unwrap().size().to_string(), "0.15");

    let eth = books.get("ETH/BTC").unwrap();
    assert_eq!(eth.nonce(), Some(8));
    assert_eq!(eth.bids().level_count(), 1);
    assert_eq!(eth.best_ask().unwrap().price().to_string(), "0.06515");
    assert_eq!(eth.best_ask().unwrap().size().to_string(), "0.1");
}

#[test]
fn numeric_levels_reach_the_book_exactly() {
    let config = Config::from_toml(config_toml()).unwrap();
    let messages = feed::parse_str(
        r#"{"type":"snapshot","symbol":"BIG/USD","nonce":1,"bids":[[12345678901234567890123,0.1000000000000000055511151231257827]]}"#,
    )
    .unwrap();
    let mut replay = Replay::new(&config);
    replay.apply_all(&messages).unwrap();

    let best = replay.books().get("BIG/USD").unwrap().best_bid().unwrap();
    assert_eq!(best.price().to_string(), "12345678901234567890123");
    assert_eq!(best.size().to_string(), "0.1000000000000000055511151231257827");
}

#[test]
fn summary_counts() {
    let config = Config::from_toml(config_toml()).unwrap();
    let replay = replay(&config);
    let summary = replay.summary();

    assert_eq!(summary.messages, 5);
    assert_eq!(summary.snapshots, 2);
    assert_eq!(summary.deltas, 3);
    assert_eq!(summary.skipped_stale, 1);
    assert_eq!(summary.rejected.len(), 1);

    let (line, rejected) = &summary.rejected[0];
    assert_eq!(*line, 7);
    assert_eq!(rejected.side, Side::Ask);
    assert_eq!(rejected.index, 2);
}

#[test]
fn render_formats_with_market_precision() {
    let config = Config::from_toml(config_toml()).unwrap();
    let replay = replay(&config);
    let out = replay.render().unwrap();
    let lines: Vec<Vec<&str>> = out.lines().map(|l| l.split_whitespace().collect()).collect();

    // BTC/USDT first, sorted by symbol
    assert_eq!(lines[0], ["BTC/USDT", "nonce=101", "2022-06-16T15:57:37.025Z"]);
    assert_eq!(lines[1], ["ask", "30001.00", "0.3000"]);
    assert_eq!(lines[2], ["ask", "30000.20", "0.1500"]);
    assert_eq!(lines[3], ["---", "spread", "0.05", "---"]);
    assert_eq!(lines[4], ["bid", "30000.15", "0.7500"]);
    assert_eq!(lines[5], ["bid", "29999.90", "1.2500"]);

    assert_eq!(lines[6], ["ETH/BTC", "nonce=8"]);
    assert_eq!(lines[7], ["ask", "0.06515", "0.100"]);
}

#[test]
fn strict_stale_policy_aborts() {
    let toml = config_toml().replace("depth = 3", "depth = 3\nskip_stale = false");
    let config = Config::from_toml(&toml).unwrap();

    let file = write_temp(feed_jsonl());
    let messages = feed::load(file.path()).unwrap();
    let mut replay = Replay::new(&config);

    let err = replay.apply_all(&messages).unwrap_err();
    assert!(matches!(err, Error::Feed { line: 6, .. }));
}
