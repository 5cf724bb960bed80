use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Local};
use docman::kernel::services::adapters::{ensure_settings_file, load_settings};
use docman::kernel::services::ports::Settings;
use docman::kernel::{summarize, BatchItem};
use docman::{DocumentFormat, Engine, EngineError, EntryKind, FileSystemEntry};

mod logging;

const USAGE: &str = "\
usage: docman <command> [args]

commands:
  ls [dir]                         list a directory
  tree [dir]                       list a directory recursively
  mkdir <parent> <name>            create a folder
  touch <parent> <name>            create an empty file
  rename <path> <new-name>         rename in place
  rm <path>...                     delete (batch, best effort)
  cp <dest-dir> <path>...          copy into a directory
  mv <dest-dir> <path>...          move into a directory
  cat <path>                       print a document
  write <dir> <name> <format> <text>...
                                   save text as <name>.<format>
  info <path>                      properties and preview
  log                              print the audit and trace log locations

paths are relative to the workspace root (DOCMAN_ROOT or settings.json)";

fn main() -> ExitCode {
    let guard = logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    let mut engine = match Engine::open(settings()) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "open workspace failed");
            eprintln!("docman: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let log_dir = guard.as_ref().map(|g| g.log_dir());
    match run(&mut engine, command, rest, log_dir) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("docman: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn settings() -> Settings {
    if let Err(e) = ensure_settings_file() {
        tracing::error!(error = %e, "ensure_settings_file failed");
    }
    let mut settings = load_settings().unwrap_or_default();
    if let Some(root) = std::env::var_os("DOCMAN_ROOT") {
        settings.workspace_root = Some(PathBuf::from(root));
    }
    settings
}

fn arg<'a>(rest: &'a [String], index: usize) -> Result<&'a str, EngineError> {
    rest.get(index)
        .map(String::as_str)
        .ok_or(EngineError::MissingName)
}

fn run(
    engine: &mut Engine,
    command: &str,
    rest: &[String],
    log_dir: Option<&Path>,
) -> Result<ExitCode, EngineError> {
    match command {
        "ls" => {
            let dir = rest.first().map(PathBuf::from).unwrap_or_default();
            for entry in engine.list(&dir)? {
                print_entry(&entry, 0);
            }
        }
        "tree" => {
            let dir = rest.first().map(PathBuf::from).unwrap_or_default();
            let base = engine.resolver().resolve_path(&dir)?;
            for entry in engine.walk(&dir)? {
                let depth = entry
                    .path
                    .strip_prefix(&base)
                    .map(|p| p.components().count().saturating_sub(1))
                    .unwrap_or(0);
                print_entry(&entry, depth);
            }
        }
        "mkdir" => {
            let path = engine.create_folder(Path::new(arg(rest, 0)?), arg(rest, 1)?)?;
            println!("{}", path.display());
        }
        "touch" => {
            let path = engine.create_file(Path::new(arg(rest, 0)?), arg(rest, 1)?)?;
            println!("{}", path.display());
        }
        "rename" => {
            let path = engine.rename(Path::new(arg(rest, 0)?), arg(rest, 1)?)?;
            println!("{}", path.display());
        }
        "rm" => {
            if rest.is_empty() {
                return Err(EngineError::MissingName);
            }
            for path in rest {
                engine.tag(Path::new(path))?;
            }
            let items = engine.delete_tagged(None);
            return Ok(report(&items, |_| "deleted".to_string()));
        }
        "cp" | "mv" => {
            let dest = PathBuf::from(arg(rest, 0)?);
            let sources = &rest[1..];
            if sources.is_empty() {
                return Err(EngineError::MissingName);
            }
            if command == "cp" {
                engine.copy(sources)?;
            } else {
                engine.cut(sources)?;
            }
            let items = engine.paste(&dest, None)?;
            return Ok(report(&items, |target| target.display().to_string()));
        }
        "cat" => {
            let id = engine.open_document(Path::new(arg(rest, 0)?))?;
            print!("{}", engine.document_content(id)?);
        }
        "write" => {
            let dir = PathBuf::from(arg(rest, 0)?);
            let name = arg(rest, 1)?;
            let format = DocumentFormat::from_extension(arg(rest, 2)?)
                .ok_or_else(|| EngineError::InvalidName(rest[2].clone()))?;
            let text = rest.get(3..).unwrap_or_default().join(" ");
            let id = engine.new_named_document(name, format);
            engine.edit_document(id, text)?;
            let path = engine.save_document(id, &dir)?;
            println!("{}", path.display());
        }
        "info" => {
            let path = Path::new(arg(rest, 0)?);
            let props = engine.properties(path)?;
            println!("name:     {}", props.name);
            println!("path:     {}", props.path.display());
            println!("kind:     {:?}", props.kind);
            println!("size:     {}", props.size);
            println!("modified: {}", format_time(props.modified));
            println!("readonly: {}", props.readonly);
            if props.kind != EntryKind::Directory {
                let preview = engine.preview(path)?;
                println!("---");
                print!("{}", preview.text);
                if preview.truncated {
                    println!("\n[...]");
                }
            }
        }
        "log" => {
            match engine.audit().sink_path() {
                Some(path) => println!("audit: {}", path.display()),
                None => println!("audit: (in memory)"),
            }
            if let Some(dir) = log_dir {
                println!("trace: {}", dir.display());
            }
        }
        _ => {
            eprintln!("{}", USAGE);
            return Ok(ExitCode::from(2));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn report<K: AsRef<Path>, T>(
    items: &[BatchItem<K, T>],
    describe: impl Fn(&T) -> String,
) -> ExitCode {
    for item in items {
        match &item.result {
            Ok(value) => println!("ok   {} -> {}", item.item.as_ref().display(), describe(value)),
            Err(e) => println!("fail {}: {}", item.item.as_ref().display(), e),
        }
    }
    let (_, failed) = summarize(items);
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_entry(entry: &FileSystemEntry, depth: usize) {
    let marker = if entry.tagged { '*' } else { ' ' };
    let name = if entry.is_dir() {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    };
    println!(
        "{} {:>10}  {}  {}{}",
        marker,
        entry.size,
        format_time(entry.modified),
        "  ".repeat(depth),
        name
    );
}

fn format_time(time: Option<std::time::SystemTime>) -> String {
    time.map(|t| {
        DateTime::<Local>::from(t)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    })
    .unwrap_or_else(|| "-".to_string())
}
