//! typeahead demo
//!
//! A terminal stand-in for a country search field. Lines read from stdin are
//! edits to the field; the dropdown is printed after every edit.
//!
//! ```text
//! $ RUST_LOG=typeahead=debug cargo run -p typeahead-demo -- --min-chars 1
//! > type Ge
//! ```

mod countries;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::result::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use typeahead::field::{grapheme_len, without_last_grapheme};
use typeahead::prelude::*;

use crate::countries::COUNTRIES;

const RESULT_TIMEOUT: Duration = Duration::from_secs(2);
const FORM_CONTAINER: ContainerId = ContainerId(1);

/// Search countries with an autocomplete dropdown
#[derive(Parser, Debug)]
#[command(name = "typeahead-demo")]
#[command(version)]
#[command(about = "Interactive country search with suggestions", long_about = None)]
struct Cli {
    /// TOML file with suggestion options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum characters typed before suggestions appear
    #[arg(long)]
    min_chars: Option<usize>,

    /// Maximum rows shown at once
    #[arg(long)]
    max_rows: Option<usize>,

    /// Row height in logical pixels
    #[arg(long)]
    row_height: Option<f32>,

    /// Search but never show the dropdown
    #[arg(long)]
    suppress: bool,

    /// Attach the dropdown to the enclosing form instead of the field's parent
    #[arg(long)]
    escape_clipping: bool,

    /// Match country names case-sensitively
    #[arg(long)]
    case_sensitive: bool,
}

impl Cli {
    fn options(&self) -> typeahead::Result<SuggestOptions> {
        let mut options = match &self.config {
            Some(path) => SuggestOptions::load_toml(path)?,
            None => demo_options(),
        };
        if let Some(min_chars) = self.min_chars {
            options.min_chars_to_show = min_chars;
        }
        if let Some(max_rows) = self.max_rows {
            options.max_visible_rows = max_rows;
        }
        if let Some(row_height) = self.row_height {
            options.row_height = row_height;
        }
        if self.suppress {
            options.suppress_display = true;
        }
        Ok(options.normalized())
    }
}

/// The options the demo uses when no config file is given.
fn demo_options() -> SuggestOptions {
    SuggestOptions::new()
        .with_min_chars_to_show(1)
        .with_max_visible_rows(2)
        .with_row_height(32.0)
        .with_style(DropdownStyle::default().with_border(1.5, 8.0, Color::GROUP_BACKGROUND))
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    /// Append characters one keystroke at a time.
    Type(String),
    /// Replace the whole text in one edit.
    Set(String),
    /// Delete the last character.
    Back,
    Select(usize),
    Scroll(usize),
    Begin,
    End,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let index = |rest: &str| {
            rest.trim()
                .parse::<usize>()
                .map_err(|_| format!("expected a row number, got '{}'", rest.trim()))
        };

        match word {
            "type" | "t" => Ok(Self::Type(rest.to_owned())),
            "set" => Ok(Self::Set(rest.to_owned())),
            "back" | "b" => Ok(Self::Back),
            "select" | "s" => index(rest).map(Self::Select),
            "scroll" => index(rest).map(Self::Scroll),
            "begin" => Ok(Self::Begin),
            "end" => Ok(Self::End),
            "help" | "?" => Ok(Self::Help),
            "quit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

type Controller = SuggestionController<StringListSource, MemoryField>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typeahead=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.options()?;
    tracing::info!(
        min_chars = options.min_chars_to_show,
        max_rows = options.max_visible_rows,
        row_height = options.row_height,
        "starting demo"
    );

    let case_sensitivity = if cli.case_sensitive {
        CaseSensitivity::CaseSensitive
    } else {
        CaseSensitivity::CaseInsensitive
    };
    let source = StringListSource::from(COUNTRIES.to_vec())
        .with_case_sensitivity(case_sensitivity)
        .with_font(CellFont::system(15.0));

    // The field sits in a 44pt-tall toolbar that clips, inside a form that does not.
    let field = MemoryField::new(Rect::new(20.0, 6.0, 280.0, 32.0))
        .with_ancestor(FORM_CONTAINER, Point::new(0.0, 120.0));

    let mut controller = SuggestionController::with_options(Arc::new(source), field, options)?;
    if cli.escape_clipping {
        controller.set_dropdown_parent(DropdownParent::Container(FORM_CONTAINER));
    }

    let resign_focus = Arc::new(AtomicBool::new(false));
    let flag = resign_focus.clone();
    controller.set_delegate(move |_row: usize| flag.store(true, Ordering::SeqCst));

    controller.visibility_changed.connect(|visibility| {
        tracing::debug!(?visibility, "dropdown visibility changed");
    });
    controller.row_activated.connect(|text| {
        println!("  ✓ picked {text}");
    });

    print_help();
    controller.on_editing_began();

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("[{}] > ", controller.field().text());
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let command = match Command::parse(&line?) {
            Ok(command) => command,
            Err(message) => {
                println!("  {message}");
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        run(&mut controller, command);

        if !controller.wait_for_results(RESULT_TIMEOUT) {
            tracing::warn!("lookup did not finish in time");
        }
        // Picking a row ends editing, as a field resigning focus would.
        if resign_focus.swap(false, Ordering::SeqCst) {
            controller.on_editing_ended();
        }
        print_dropdown(&controller);
    }

    Ok(())
}

fn run(controller: &mut Controller, command: Command) {
    match command {
        Command::Type(chars) => {
            for ch in chars.chars() {
                let mut buf = [0; 4];
                let len = controller.field().text().len();
                edit(controller, len..len, ch.encode_utf8(&mut buf));
            }
        }
        Command::Set(text) => {
            let len = controller.field().text().len();
            edit(controller, 0..len, &text);
        }
        Command::Back => {
            let text = controller.field().text();
            if grapheme_len(&text) > 0 {
                let keep = without_last_grapheme(&text).len();
                edit(controller, keep..text.len(), "");
            }
        }
        Command::Select(row) => {
            if let Err(err) = controller.on_row_selected(row) {
                println!("  {err}");
            }
        }
        Command::Scroll(row) => {
            if let Err(err) = controller.scroll_to_row(row) {
                println!("  {err}");
            }
        }
        Command::Begin => controller.on_editing_began(),
        Command::End => controller.on_editing_ended(),
        Command::Help => print_help(),
        Command::Quit => {}
    }
}

/// Report a pending edit to the controller, then apply it to the field.
fn edit(controller: &mut Controller, range: std::ops::Range<usize>, replacement: &str) {
    controller.on_pending_edit(range.clone(), replacement);
    let mut text = controller.field().text();
    text.replace_range(range, replacement);
    controller.field_mut().set_text(&text);
}

fn print_dropdown(controller: &Controller) {
    if !controller.is_visible() {
        if controller.row_count() > 0 {
            println!("  ({} suggestions, display suppressed)", controller.row_count());
        }
        return;
    }

    let dropdown = controller.dropdown();
    let frame = dropdown.frame();
    println!(
        "  ┌ {:?} at ({}, {}) {}x{}",
        dropdown.parent(),
        frame.left(),
        frame.top(),
        frame.width(),
        frame.height()
    );

    let mut cell = SuggestionCell::new();
    let visible = controller.visible_rows();
    for row in visible.clone() {
        if controller.render_row(row, &mut cell).is_ok() {
            println!("  │ {row}: {}", cell.text());
        }
    }
    let hidden = controller.row_count() - visible.len();
    if hidden > 0 {
        println!("  └ {hidden} more (scroll N to reveal)");
    } else {
        println!("  └");
    }
}

fn print_help() {
    println!("Commands:");
    println!("  type <chars>   type characters one at a time");
    println!("  set <text>     replace the field text");
    println!("  back           delete the last character");
    println!("  select <n>     pick suggestion n");
    println!("  scroll <n>     bring suggestion n into view");
    println!("  begin | end    focus or leave the field");
    println!("  quit");
}
