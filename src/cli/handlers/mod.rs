mod shell;
pub use shell::run_shell;

use std::fs;
use std::io::Write;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use indexmap::IndexMap;
use tracing::info;

use crate::cli::commands::*;
use crate::cli::logging;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::persist::PersistentStore;
use crate::io::storage::{FileStorage, Storage, atomic_write};
use crate::model::config::AppConfig;
use crate::model::theme::{Theme, detect_prefers_dark};
use crate::model::todo::{TodoId, TodoUpdate};
use crate::ops::view::ViewPrefs;
use crate::session::TodoSession;
use crate::ui::SaveIndicator;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Settings shared by every command in one invocation
pub struct Context {
    pub config: AppConfig,
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

pub fn run(cli: Cli) -> CmdResult {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config_io::default_config_path);
    let config = config_io::read_config(&config_path)?;

    let level = logging::log_level(cli.verbose, cli.quiet, config.log.level.as_deref());
    logging::init_tracing(&level)?;

    let store_path = config_io::resolve_store_path(&config, cli.store.as_deref());
    let storage = FileStorage::open(&store_path)?.with_quota(config.storage.quota_bytes);
    info!(store = %store_path.display(), "using store");

    let indicator = SaveIndicator::new(Duration::from_millis(config.ui.save_indicator_ms));
    let notifier = indicator.notifier();
    let store = PersistentStore::new(storage).with_on_save(move |_| notifier.notify());

    let prefers_dark = config.ui.prefers_dark.unwrap_or_else(detect_prefers_dark);
    let mut session = TodoSession::open(store, prefers_dark);

    let ctx = Context {
        config,
        json: cli.json,
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Shell => {
            let stdin = std::io::stdin();
            run_shell(&mut session, &indicator, &ctx, stdin.lock(), &mut out)
        }
        command => {
            execute(&mut session, command, &ctx, &mut out)?;
            if !ctx.json && indicator.is_visible() {
                writeln!(out, "Saved.")?;
            }
            Ok(())
        }
    }
}

/// Run one command against the session, writing its output to `out`
pub fn execute<S: Storage>(
    session: &mut TodoSession<S>,
    command: Commands,
    ctx: &Context,
    out: &mut dyn Write,
) -> CmdResult {
    match command {
        Commands::Add(args) => cmd_add(session, args, ctx, out),
        Commands::List(args) => cmd_list(session, args, ctx, out),
        Commands::Toggle(args) => cmd_toggle(session, args, ctx, out),
        Commands::Rm(args) => cmd_rm(session, args, ctx, out),
        Commands::Edit(args) => cmd_edit(session, args, ctx, out),
        Commands::Stats => cmd_stats(session, ctx, out),
        Commands::Plan(args) => cmd_plan(session, args, ctx, out),
        Commands::Theme(args) => cmd_theme(session, args, ctx, out),
        Commands::Export(args) => cmd_export(session, args, out),
        Commands::Import(args) => cmd_import(session, args, ctx, out),
        Commands::Clear(args) => cmd_clear(session, args, out),
        Commands::Shell => Err("already in a shell".into()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_id(raw: &str) -> Result<TodoId, String> {
    raw.parse()
        .map_err(|_| format!("invalid todo id '{}'", raw))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn write_json<T: serde::Serialize>(out: &mut dyn Write, value: &T) -> CmdResult {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn write_todo<S: Storage>(
    session: &TodoSession<S>,
    id: TodoId,
    ctx: &Context,
    out: &mut dyn Write,
) -> CmdResult {
    let Some(todo) = session.find(id) else {
        return Ok(());
    };
    if ctx.json {
        write_json(out, &todo_to_json(todo, now()))
    } else {
        let width = todo.id.to_string().len();
        writeln!(out, "{}", format_todo_line(todo, width, now()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Todo commands
// ---------------------------------------------------------------------------

fn cmd_add<S: Storage>(
    session: &mut TodoSession<S>,
    args: AddArgs,
    ctx: &Context,
    out: &mut dyn Write,
) -> CmdResult {
    let text = args.text.join(" ");
    let id = session.add(&text, args.priority.into(), args.due)?;
    write_todo(session, id, ctx, out)
}

fn cmd_list<S: Storage>(
    session: &mut TodoSession<S>,
    args: ListArgs,
    ctx: &Context,
    out: &mut dyn Write,
) -> CmdResult {
    let current = session.prefs();
    session.set_prefs(ViewPrefs {
        filter: args.filter.unwrap_or(current.filter),
        sort: args.sort.unwrap_or(current.sort),
    });

    let view = session.visible();
    let stats = session.stats();
    if ctx.json {
        return write_json(out, &list_to_json(&view, session.prefs(), stats, now()));
    }
    writeln!(out, "{}", format_stats(&stats))?;
    for line in format_todo_list(&view, now()) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn cmd_toggle<S: Storage>(
    session: &mut TodoSession<S>,
    args: IdArgs,
    ctx: &Context,
    out: &mut dyn Write,
) -> CmdResult {
    let id = parse_id(&args.id)?;
    session.toggle(id)?;
    write_todo(session, id, ctx, out)
}

fn cmd_rm<S: Storage>(
    session: &mut TodoSession<S>,
    args: IdArgs,
    ctx: &Context,
    out: &mut dyn Write,
) -> CmdResult {
    let id = parse_id(&args.id)?;
    let removed = session.delete(id)?;
    if ctx.json {
        return write_json(out, &todo_to_json(&removed, now()));
    }
    writeln!(out, "Deleted #{}: {}", removed.id, removed.text)?;
    Ok(())
}

fn cmd_edit<S: Storage>(
    session: &mut TodoSession<S>,
    args: EditArgs,
    ctx: &Context,
    out: &mut dyn Write,
) -> CmdResult {
    let id = parse_id(&args.id)?;
    let due_date = if args.clear_due {
        Some(None)
    } else {
        args.due.map(Some)
    };
    let update = TodoUpdate {
        text: args.text,
        priority: args.priority.map(Into::into),
        due_date,
    };
    if update.is_empty() {
        return Err("nothing to change: pass --text, --priority, --due or --clear-due".into());
    }
    session.edit(id, &update)?;
    write_todo(session, id, ctx, out)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_stats<S: Storage>(session: &TodoSession<S>, ctx: &Context, out: &mut dyn Write) -> CmdResult {
    let stats = session.stats();
    if ctx.json {
        return write_json(out, &stats);
    }
    writeln!(out, "{}", format_stats(&stats))?;
    Ok(())
}

fn cmd_plan<S: Storage>(
    session: &TodoSession<S>,
    args: PlanArgs,
    ctx: &Context,
    out: &mut dyn Write,
) -> CmdResult {
    let size = args.size.unwrap_or(ctx.config.ui.plan_size);
    let plan = session.plan(size);
    if ctx.json {
        return write_json(out, &plan_to_json(&plan, now()));
    }
    for line in format_plan(&plan, now()) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

fn cmd_theme<S: Storage>(
    session: &mut TodoSession<S>,
    args: ThemeArgs,
    ctx: &Context,
    out: &mut dyn Write,
) -> CmdResult {
    if args.cycle {
        session.cycle_theme();
    } else if let Some(name) = args.set {
        let theme = Theme::parse_theme(&name)
            .ok_or_else(|| format!("unknown theme '{}' (light, dark, vibe)", name))?;
        session.set_theme(theme);
    }
    if ctx.json {
        return write_json(out, &serde_json::json!({ "theme": session.theme() }));
    }
    writeln!(out, "Theme: {}", session.theme())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Backup
// ---------------------------------------------------------------------------

fn cmd_export<S: Storage>(session: &TodoSession<S>, args: ExportArgs, out: &mut dyn Write) -> CmdResult {
    let data = serde_json::to_string_pretty(&session.export())?;
    match args.out {
        Some(path) => {
            atomic_write(&path, data.as_bytes())
                .map_err(|e| format!("could not write {}: {}", path.display(), e))?;
            writeln!(out, "Exported to {}", path.display())?;
        }
        None => writeln!(out, "{}", data)?,
    }
    Ok(())
}

fn cmd_import<S: Storage>(
    session: &mut TodoSession<S>,
    args: ImportArgs,
    ctx: &Context,
    out: &mut dyn Write,
) -> CmdResult {
    let text = fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file.display(), e))?;
    let data: IndexMap<String, serde_json::Value> = serde_json::from_str(&text)
        .map_err(|e| format!("{} is not a backup: {}", args.file.display(), e))?;

    let report = session.import(&data);
    if ctx.json {
        return write_json(out, &report);
    }
    if report.imported.is_empty() {
        writeln!(out, "Nothing imported")?;
    } else {
        writeln!(out, "Imported: {}", report.imported.join(", "))?;
    }
    if !report.skipped.is_empty() {
        writeln!(out, "Skipped: {}", report.skipped.join(", "))?;
    }
    Ok(())
}

fn cmd_clear<S: Storage>(session: &mut TodoSession<S>, args: ClearArgs, out: &mut dyn Write) -> CmdResult {
    if !args.yes {
        return Err("this removes all todos and settings; re-run with --yes".into());
    }
    session.clear();
    writeln!(out, "All data cleared")?;
    Ok(())
}
