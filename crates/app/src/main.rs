use std::fmt;
use std::path::PathBuf;

use preflight_core::model::{
    AppSettingsDraft, ItemId, SectionId, TemplateCategory, TemplateId,
};
use preflight_core::{Clock, Progress};
use services::{AppServices, ExportOptions};

//
// ─── ARGUMENT PARSING ──────────────────────────────────────────────────────────
//

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidValue { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidValue { flag, raw } => {
                write!(f, "invalid {flag} value: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_value<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse().map_err(|_| ArgsError::InvalidValue { flag, raw })
}

fn print_usage() {
    eprintln!("preflight - pre-work checklist manager");
    eprintln!();
    eprintln!("Usage: preflight <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  templates [--category <cat>]           list catalog templates");
    eprintln!("  start --template <slug>                start a checklist from a template");
    eprintln!("  show                                   print the active checklist");
    eprintln!("  toggle --item <id>                     flip an item's completion flag");
    eprintln!("  add-section --title <t> [--desc <d>]   append a section");
    eprintln!("  remove-section --section <id>          remove a section and its items");
    eprintln!("  add-item --section <id> --title <t> [--desc <d>] [--required]");
    eprintln!("  remove-item --item <id>                remove an item");
    eprintln!("  note --item <id> [--text <t>]          set or clear an item's notes");
    eprintln!("  collapse --section <id> [--expand]     collapse/expand a section");
    eprintln!("  reset [--yes]                          restart from the originating template");
    eprintln!("  export [--out <path>] [--no-notes] [--no-photos] [--no-timestamps]");
    eprintln!("  settings [--exporter <name>] [--debounce-ms <n>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --state-dir <path>   state directory (default ./.preflight)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PREFLIGHT_STATE_DIR");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Templates,
    Start,
    Show,
    Toggle,
    AddSection,
    RemoveSection,
    AddItem,
    RemoveItem,
    Note,
    Collapse,
    Reset,
    Export,
    Settings,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "templates" => Some(Self::Templates),
            "start" => Some(Self::Start),
            "show" => Some(Self::Show),
            "toggle" => Some(Self::Toggle),
            "add-section" => Some(Self::AddSection),
            "remove-section" => Some(Self::RemoveSection),
            "add-item" => Some(Self::AddItem),
            "remove-item" => Some(Self::RemoveItem),
            "note" => Some(Self::Note),
            "collapse" => Some(Self::Collapse),
            "reset" => Some(Self::Reset),
            "export" => Some(Self::Export),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    state_dir: Option<PathBuf>,
    category: Option<TemplateCategory>,
    template: Option<TemplateId>,
    section: Option<SectionId>,
    item: Option<ItemId>,
    title: Option<String>,
    description: Option<String>,
    text: Option<String>,
    out: Option<PathBuf>,
    exporter: Option<String>,
    debounce_ms: Option<u32>,
    required: bool,
    expand: bool,
    yes: bool,
    no_notes: bool,
    no_photos: bool,
    no_timestamps: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--state-dir" => parsed.state_dir = Some(PathBuf::from(require_value(args, "--state-dir")?)),
                "--category" => parsed.category = Some(parse_value(args, "--category")?),
                "--template" => parsed.template = Some(parse_value(args, "--template")?),
                "--section" => parsed.section = Some(parse_value(args, "--section")?),
                "--item" => parsed.item = Some(parse_value(args, "--item")?),
                "--title" => parsed.title = Some(require_value(args, "--title")?),
                "--desc" => parsed.description = Some(require_value(args, "--desc")?),
                "--text" => parsed.text = Some(require_value(args, "--text")?),
                "--out" => parsed.out = Some(PathBuf::from(require_value(args, "--out")?)),
                "--exporter" => parsed.exporter = Some(require_value(args, "--exporter")?),
                "--debounce-ms" => parsed.debounce_ms = Some(parse_value(args, "--debounce-ms")?),
                "--required" => parsed.required = true,
                "--expand" => parsed.expand = true,
                "--yes" => parsed.yes = true,
                "--no-notes" => parsed.no_notes = true,
                "--no-photos" => parsed.no_photos = true,
                "--no-timestamps" => parsed.no_timestamps = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(parsed)
    }

    fn state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }
        std::env::var("PREFLIGHT_STATE_DIR")
            .ok()
            .map_or_else(|| PathBuf::from(".preflight"), PathBuf::from)
    }

    fn require_item(&self) -> Result<ItemId, ArgsError> {
        self.item.ok_or(ArgsError::MissingValue { flag: "--item" })
    }

    fn require_section(&self) -> Result<SectionId, ArgsError> {
        self.section
            .ok_or(ArgsError::MissingValue { flag: "--section" })
    }

    fn require_title(&self) -> Result<String, ArgsError> {
        self.title
            .clone()
            .ok_or(ArgsError::MissingValue { flag: "--title" })
    }
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn progress_bar(progress: Progress) -> String {
    const WIDTH: usize = 20;
    let filled = (usize::from(progress.percent) * WIDTH) / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        progress.percent
    )
}

fn print_checklist(checklist: &preflight_core::model::Checklist, show_completed_sections: bool) {
    let progress = checklist.progress();
    println!("{}  (priority: {})", checklist.title(), checklist.priority());
    if let Some(desc) = checklist.description() {
        println!("  {desc}");
    }
    println!("  {}  {}/{} items", progress_bar(progress), progress.completed, progress.total);
    println!();

    for section in checklist.sections() {
        let section_progress = Progress::of_section(section);
        if !show_completed_sections && section_progress.is_complete {
            continue;
        }
        let marker = if section.collapsed() { "+" } else { "-" };
        println!(
            "{marker} {}  [{}/{}]",
            section.title(),
            section_progress.completed,
            section_progress.total
        );
        if section.collapsed() {
            continue;
        }
        for item in section.items() {
            let tick = if item.completed() { "x" } else { " " };
            let req = if item.required() { " (required)" } else { "" };
            println!("    [{tick}] {}{req}  {}", item.title(), item.id());
            if let Some(notes) = item.notes() {
                println!("        note: {notes}");
            }
        }
    }

    if progress.is_complete {
        println!();
        println!("*** All items complete! Checklist finished. ***");
        if let Some(at) = checklist.completed_at() {
            println!("    completed at {at}");
        }
    }
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or(ArgsError::UnknownCommand(first))?,
    };

    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let state_dir = args.state_dir();
    tracing::debug!(state_dir = %state_dir.display(), "opening state directory");
    let services = AppServices::new_json(&state_dir, Clock::default_clock()).await?;

    match cmd {
        Command::Templates => {
            let templates: Vec<_> = match args.category {
                Some(category) => services.catalog().by_category(category),
                None => services.catalog().all().iter().collect(),
            };
            for template in templates {
                println!(
                    "{:<24} {:<12} {}",
                    template.id.as_str(),
                    template.category.to_string(),
                    template.description
                );
            }
        }
        Command::Start => {
            let template = args
                .template
                .clone()
                .ok_or(ArgsError::MissingValue { flag: "--template" })?;
            let checklist = services.checklists().start_from_template(&template)?;
            println!("started '{}' ({} items)", checklist.title(), checklist.progress().total);
        }
        Command::Show => {
            let settings = services.settings().load().await?;
            match services.checklists().active()? {
                Some(checklist) => print_checklist(&checklist, settings.show_completed_sections()),
                None => println!("no active checklist; run `preflight start --template <slug>`"),
            }
        }
        Command::Toggle => {
            let item_id = args.require_item()?;
            let before = services.checklists().progress()?;
            let checklist = services.checklists().toggle_item(item_id)?;
            let progress = checklist.progress();
            let state = if checklist.item(item_id).is_some_and(|i| i.completed()) {
                "done"
            } else {
                "not done"
            };
            println!("{state}  {}", progress_bar(progress));
            if progress.is_complete && !before.is_complete {
                println!("*** All items complete! Checklist finished. ***");
            }
        }
        Command::AddSection => {
            let section_id = services
                .checklists()
                .add_section(args.require_title()?, args.description.clone())?;
            println!("added section {section_id}");
        }
        Command::RemoveSection => {
            services.checklists().remove_section(args.require_section()?)?;
            println!("section removed");
        }
        Command::AddItem => {
            let item_id = services.checklists().add_item(
                args.require_section()?,
                args.require_title()?,
                args.description.clone(),
                args.required,
            )?;
            println!("added item {item_id}");
        }
        Command::RemoveItem => {
            services.checklists().remove_item(args.require_item()?)?;
            println!("item removed");
        }
        Command::Note => {
            services
                .checklists()
                .set_item_notes(args.require_item()?, args.text.clone())?;
            println!("notes updated");
        }
        Command::Collapse => {
            services
                .checklists()
                .set_section_collapsed(args.require_section()?, !args.expand)?;
            println!("section {}", if args.expand { "expanded" } else { "collapsed" });
        }
        Command::Reset => {
            let settings = services.settings().load().await?;
            if settings.confirm_reset() && !args.yes {
                eprintln!("reset discards all progress; re-run with --yes to confirm");
                return Ok(());
            }
            let fresh = services.checklists().reset()?;
            println!("reset to a fresh '{}'", fresh.title());
        }
        Command::Export => {
            let Some(checklist) = services.checklists().active()? else {
                eprintln!("no active checklist to export");
                return Ok(());
            };
            let settings = services.settings().load().await?;
            let options = ExportOptions {
                include_notes: !args.no_notes,
                include_photos: !args.no_photos,
                include_timestamps: !args.no_timestamps,
            };
            let document =
                services
                    .export()
                    .build(&checklist, settings.exporter_name(), options);
            match &args.out {
                Some(path) => {
                    if let Err(err) = services.export().write_to_file(&document, path).await {
                        // Alert-style surface; state stays usable in memory.
                        eprintln!("export failed: {err}");
                        return Err(err.into());
                    }
                    println!("exported to {}", path.display());
                }
                None => println!("{}", services.export().render(&document)?),
            }
        }
        Command::Settings => {
            let current = services.settings().load().await?;
            if args.exporter.is_none() && args.debounce_ms.is_none() {
                println!("exporter:        {}", current.exporter_name().unwrap_or("(unset)"));
                println!("debounce-ms:     {}", current.autosave_debounce_ms());
                println!("show-completed:  {}", current.show_completed_sections());
                println!("confirm-reset:   {}", current.confirm_reset());
            } else {
                let mut draft = AppSettingsDraft {
                    exporter_name: current.exporter_name().map(str::to_owned),
                    autosave_debounce_ms: current.autosave_debounce_ms(),
                    show_completed_sections: current.show_completed_sections(),
                    confirm_reset: current.confirm_reset(),
                };
                if let Some(exporter) = args.exporter.clone() {
                    draft.exporter_name = Some(exporter);
                }
                if let Some(debounce) = args.debounce_ms {
                    draft.autosave_debounce_ms = debounce;
                }
                let saved = services.settings().save(draft).await?;
                println!("settings saved (debounce {} ms)", saved.autosave_debounce_ms());
            }
        }
    }

    // Force any pending debounced write before the process exits.
    services.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
