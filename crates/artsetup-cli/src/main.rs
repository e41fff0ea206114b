//! ArtSetup command line.
//!
//! - `artsetup --render` reads a JSON array of stored artwork documents on
//!   stdin and prints the CSS of every render layer.
//! - `artsetup --replay <script.json> [--config <file>]` replays an editing
//!   script through an editor session and prints the final snapshot and the
//!   saves that reached the store.
//!
//! Set `RUST_LOG=debug` to watch history commits and debounced saves.

mod render;
mod replay;

use artsetup_editor::EditorConfig;
use std::io::Read;

fn fail(mode: &str, message: impl std::fmt::Display) -> ! {
    eprintln!("artsetup {mode} error: {message}");
    std::process::exit(1);
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Flags that take a value.
const VALUE_FLAGS: &[&str] = &["--config"];

/// First argument after the mode that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            rest.next();
        } else if !arg.starts_with("--") {
            return Some(arg);
        }
    }
    None
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    // ── `artsetup --render` ─────────────────────────────────────────────
    if args.get(1).map(|s| s.as_str()) == Some("--render") {
        let mut text = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut text) {
            fail("--render", format!("failed to read stdin: {e}"));
        }
        match render::render_documents(&text) {
            Ok(out) => print!("{out}"),
            Err(e) => fail("--render", e),
        }
        return;
    }

    // ── `artsetup --replay <script> [--config <file>]` ──────────────────
    if args.get(1).map(|s| s.as_str()) == Some("--replay") {
        let Some(path) = positional(&args) else {
            fail("--replay", "missing script path");
        };
        let config = match flag_value(&args, "--config") {
            Some(file) => std::fs::read_to_string(file)
                .map_err(|e| format!("{file}: {e}"))
                .and_then(|text| EditorConfig::from_json_str(&text).map_err(|e| format!("{file}: {e}")))
                .unwrap_or_else(|e| fail("--replay", e)),
            None => EditorConfig::default(),
        };
        let script = std::fs::read_to_string(path).unwrap_or_else(|e| fail("--replay", format!("{path}: {e}")));
        match replay::run(&script, config).await {
            Ok(out) => println!("{out}"),
            Err(e) => fail("--replay", e),
        }
        return;
    }

    eprintln!("usage: artsetup --render < documents.json");
    eprintln!("       artsetup --replay <script.json> [--config <file>]");
    std::process::exit(2);
}
