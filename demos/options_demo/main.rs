//! # tokopt demo application
//!
//! A sample CLI tool that registers a handful of options and resolves them
//! from defaults, `PROJECT_NAME_*` environment variables, and trailing
//! tokens. It exists to demonstrate and manually verify tokopt's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example options_demo -- verbose level=debug
//! cargo run --example options_demo -- --options-help
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                | How to exercise it                                                   |
//! |------------------------|----------------------------------------------------------------------|
//! | Compiled defaults      | `cargo run --example options_demo -- --options-list`                 |
//! | Env var override       | `PROJECT_NAME_LEVEL=info cargo run --example options_demo`           |
//! | Token override         | `cargo run --example options_demo -- level=2 ratio=11/20`            |
//! | IntList                | `cargo run --example options_demo -- addrs 0xd00380+2 0x40..0x48`    |
//! | Option-free list       | `cargo run --example options_demo -- files a.txt b.txt --verbose`    |
//! | Alias                  | `cargo run --example options_demo -- fast`                           |
//! | Alias list             | `cargo run --example options_demo -- read 0x100 8`                   |
//! | Recoverable errors     | `cargo run --example options_demo -- --recoverable level=loud`       |
//! | Tracing output         | `RUST_LOG=tokopt=debug cargo run --example options_demo -- fast`     |

use std::process::ExitCode;
use std::sync::atomic::{AtomicU32, Ordering};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tokopt::{
    EnumTable, OptionArgs, OptionDescriptor, OptionsResult, Registry, ReportingMode,
};

static LOG_LEVEL: AtomicU32 = AtomicU32::new(1);

/// tokopt demo: options from defaults, environment, and tokens.
#[derive(Parser, Debug)]
#[command(name = "options-demo")]
struct Cli {
    /// Report option errors instead of exiting on them.
    #[arg(long)]
    recoverable: bool,

    /// Print the JSON snapshot instead of the listing.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    options: OptionArgs,
}

fn build_registry() -> Registry {
    let levels = EnumTable::new()
        .variant(0, "error", "errors only")
        .variant(1, "warn", "warnings and errors")
        .variant(2, "info", "progress messages")
        .variant(3, "debug", "everything");

    let mut registry = Registry::builder().env_prefix("PROJECT_NAME").build();
    registry.register(OptionDescriptor::group("--- general ---"));
    registry.register(OptionDescriptor::bool("verbose", false, "chatty output"));
    registry.register(
        OptionDescriptor::enumeration("level", 1, "log threshold", levels)
            .on_set(|v| LOG_LEVEL.store(v.as_u32().unwrap_or(1), Ordering::Relaxed)),
    );
    registry.register(OptionDescriptor::double("ratio", 0.5, "sampling ratio"));
    registry.register(OptionDescriptor::string("name", "demo", "instance name"));
    registry.register(OptionDescriptor::group("--- targets ---"));
    registry.register(OptionDescriptor::uint32("addr", 0, "start address"));
    registry.register(OptionDescriptor::uint32("count", 1, "words to read"));
    registry.register(OptionDescriptor::int_list("addrs", "register addresses", 4));
    registry.register(OptionDescriptor::int_range("window", "address window"));
    registry.register(OptionDescriptor::option_free_string_list("files", "input files"));
    registry.register(OptionDescriptor::group("--- shortcuts ---"));
    registry.register(OptionDescriptor::alias("fast", "verbose=0 level=error ratio=1/10"));
    registry.register(OptionDescriptor::alias_list("read", "addr=%0 count=%1"));
    registry
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut registry = build_registry();
    let action = cli.options.into_action();

    let mode = if cli.recoverable {
        ReportingMode::Recoverable
    } else {
        ReportingMode::Strict
    };

    let result = match registry.handle(&action) {
        Ok(result) => result,
        Err(err) => {
            let mut diagnostic = String::new();
            mode.settle(&registry, Err(err), &mut diagnostic);
            eprint!("{diagnostic}");
            return ExitCode::FAILURE;
        }
    };

    match result {
        OptionsResult::Parsed if cli.json => match registry.to_json() {
            Ok(json) => println!("{json:#}"),
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        OptionsResult::Parsed => {
            let listing = registry.listing();
            for entry in listing.entries.iter().filter(|e| e.is_set) {
                println!("{} = {}", entry.name, entry.value);
            }
            println!("log threshold is now {}", LOG_LEVEL.load(Ordering::Relaxed));
        }
        other => println!("{other}"),
    }
    ExitCode::SUCCESS
}
