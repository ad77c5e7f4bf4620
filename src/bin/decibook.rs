//! Interactive decimal and order book CLI.
//!
//! A REPL for experimenting with the arithmetic engine, the precision
//! formatter and a single cached order book.
//!
//! Usage:
//!   cargo run --bin decibook
//!   RUST_LOG=debug decibook

use std::cmp::Ordering;
use std::io::{self, BufRead, Write};

use decibook::precise::{self, DEFAULT_DIV_PRECISION};
use decibook::{
    BatchReport, BookUpdate, OrderBook, PaddingMode, Precise, Precision, PrecisionMode,
    PriceLevel, RoundingMode, Side, decimal_to_precision,
};

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let mut book = OrderBook::new("REPL");

    println!("decibook CLI v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for commands, 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("decibook> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts.first().map(|s| s.to_lowercase());
        let args = &parts[1..];

        match cmd.as_deref() {
            Some("help" | "h" | "?") => print_help(),
            Some("quit" | "exit" | "q") => break,
            Some(op @ ("add" | "sub" | "mul" | "div" | "mod" | "cmp" | "min" | "max")) => {
                handle_arith(op, args)
            }
            Some("fmt" | "f") => handle_fmt(args),
            Some("bid") => handle_delta(&mut book, Side::Bid, args),
            Some("ask") => handle_delta(&mut book, Side::Ask, args),
            Some("snapshot") => handle_message(&mut book, args, true),
            Some("delta") => handle_message(&mut book, args, false),
            Some("book" | "b") => print_book(&book, args),
            Some("reset") => {
                book.reset();
                println!("Book reset.");
            }
            Some(cmd) => println!("Unknown command: '{cmd}'. Type 'help' for commands."),
            None => {}
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn print_help() {
    println!(
        r#"
Commands:
  add|sub|mul|mod <a> <b>         Exact arithmetic on decimal strings
  div <a> <b> [precision]         Division, truncated (default 18 places)
  cmp|min|max <a> <b>             Compare two decimals
  fmt <value> <round|truncate> <precision> <dp|sd|tick> [pad]
                                  Format to a precision
  bid <price> <size>              Upsert a bid level (size 0 deletes)
  ask <price> <size>              Upsert an ask level (size 0 deletes)
  snapshot [nonce] <rows...>      Load a snapshot, rows as b:price:size or a:price:size
  delta [nonce] <rows...>         Apply a delta batch, same row syntax
  book [levels]                   Show the order book
  reset                           Clear the book and its nonce
  help                            Show this help
  quit                            Exit

Examples:
  div 1 3 5                       0.33333
  fmt 0.000123456 round 4 sd      0.0001235
  fmt 165 truncate 110 tick       110
  snapshot 50 b:100:1 b:99:2 a:101:1
  delta 51 b:100:0 b:98:5
"#
    );
}

fn handle_arith(op: &str, args: &[&str]) {
    let (a, b) = match args {
        [a, b, ..] => (*a, *b),
        _ => {
            println!("Usage: {op} <a> <b>");
            return;
        }
    };

    let result = match op {
        "add" => precise::string_add(a, b),
        "sub" => precise::string_sub(a, b),
        "mul" => precise::string_mul(a, b),
        "mod" => precise::string_mod(a, b),
        "min" => precise::string_min(a, b),
        "max" => precise::string_max(a, b),
        "div" => {
            let precision = match args.get(2).map(|s| s.parse::<i64>()) {
                Some(Ok(p)) => p,
                Some(Err(_)) => {
                    println!("Invalid precision: '{}'", args[2]);
                    return;
                }
                None => DEFAULT_DIV_PRECISION,
            };
            precise::string_div_to(a, b, precision)
        }
        _ => compare(a, b),
    };

    match result {
        Ok(value) => println!("{value}"),
        Err(e) => println!("Error: {e}"),
    }
}

fn compare(a: &str, b: &str) -> Result<String, decibook::PreciseError> {
    let x: Precise = a.parse()?;
    let y: Precise = b.parse()?;
    let symbol = match x.cmp(&y) {
        Ordering::Less => "<",
        Ordering::Equal => "==",
        Ordering::Greater => ">",
    };
    Ok(format!("{x} {symbol} {y}"))
}

fn handle_fmt(args: &[&str]) {
    if args.len() < 4 {
        println!("Usage: fmt <value> <round|truncate> <precision> <dp|sd|tick> [pad]");
        return;
    }

    let rounding = match args[1].to_lowercase().as_str() {
        "round" | "r" => RoundingMode::Round,
        "truncate" | "t" => RoundingMode::Truncate,
        other => {
            println!("Unknown rounding mode: '{other}'. Use round or truncate.");
            return;
        }
    };

    let mode = match args[3].to_lowercase().as_str() {
        "dp" | "decimals" => PrecisionMode::DecimalPlaces,
        "sd" | "significant" => PrecisionMode::SignificantDigits,
        "tick" => PrecisionMode::TickSize,
        other => {
            println!("Unknown precision mode: '{other}'. Use dp, sd, or tick.");
            return;
        }
    };

    let precision: Precision = match args[2].parse() {
        Ok(p) => p,
        Err(e) => {
            println!("Invalid precision: {e}");
            return;
        }
    };

    let padding = PaddingMode::from(args.get(4).is_some_and(|s| s.eq_ignore_ascii_case("pad")));

    match decimal_to_precision(args[0], rounding, precision, mode, padding) {
        Ok(s) => println!("{s}"),
        Err(e) => println!("Error: {e}"),
    }
}

fn handle_delta(book: &mut OrderBook, side: Side, args: &[&str]) {
    let [price, size, ..] = args else {
        println!("Usage: {} <price> <size>", side.to_string().to_lowercase());
        return;
    };

    match book.apply_delta(side, price, size) {
        Ok(outcome) => println!("{side} {price} {size}: {outcome:?}"),
        Err(e) => println!("Rejected: {e}"),
    }
}

fn handle_message(book: &mut OrderBook, args: &[&str], snapshot: bool) {
    let mut update = BookUpdate::new();
    let mut rows = args;

    if let Some(first) = rows.first().and_then(|s| s.parse::<u64>().ok()) {
        update = update.nonce(first);
        rows = &rows[1..];
    }

    for row in rows {
        let Some((side, level)) = parse_row(row) else {
            println!("Invalid row: '{row}'. Use b:price:size or a:price:size");
            return;
        };
        match side {
            Side::Bid => update.bids.push(level),
            Side::Ask => update.asks.push(level),
        }
    }

    let report = if snapshot {
        book.load_snapshot(&update)
    } else {
        book.apply_update(&update)
    };
    print_report(&report);
}

fn parse_row(row: &str) -> Option<(Side, PriceLevel)> {
    let mut fields = row.split(':');
    let side = match fields.next()? {
        "b" | "bid" => Side::Bid,
        "a" | "ask" => Side::Ask,
        _ => return None,
    };
    let price = fields.next()?;
    let size = fields.next()?;
    let level = match fields.next() {
        Some(count) => PriceLevel::counted(price, size, count.parse().ok()?),
        None => PriceLevel::new(price, size),
    };
    Some((side, level))
}

fn print_report(report: &BatchReport) {
    if report.skipped_stale {
        println!("Skipped: message is not newer than the book.");
        return;
    }
    println!(
        "  applied: {}, deleted: {}, ignored: {}, evicted: {}",
        report.applied, report.deleted, report.ignored, report.evicted
    );
    for rejected in &report.rejected {
        println!("  rejected {} row {}: {}", rejected.side, rejected.index, rejected.error);
    }
}

fn print_book(book: &OrderBook, args: &[&str]) {
    let levels = args.first().and_then(|s| s.parse().ok()).unwrap_or(10);
    let snap = book.snapshot(levels);

    println!();
    println!("            ORDER BOOK ({})", book.state());
    println!("  ──────────────────────────────");

    if snap.asks.is_empty() && snap.bids.is_empty() {
        println!("  (empty)");
        println!();
        return;
    }

    // Asks (reversed - highest at top)
    for level in snap.asks.iter().rev() {
        println!("  ASK {:>14}  {:>14}{}", level.price, level.size, count_suffix(level));
    }

    // Spread
    match book.spread() {
        Some(spread) => println!("  ─────── spread: {spread} ───────"),
        None => println!("  ─────── (no spread) ───────"),
    }

    // Bids
    for level in &snap.bids {
        println!("  BID {:>14}  {:>14}{}", level.price, level.size, count_suffix(level));
    }

    match book.nonce() {
        Some(nonce) => println!("  nonce: {nonce}"),
        None => println!("  nonce: -"),
    }
    println!();
}

fn count_suffix(level: &PriceLevel) -> String {
    level
        .count
        .map(|c| format!("  ({c} orders)"))
        .unwrap_or_default()
}
