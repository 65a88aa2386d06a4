//! Command line parsing and dispatch.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use studydash_core::features::{header, notes, photo, EventsController, NotesEditor, RoutineController};
use studydash_core::{keys, ClassForm, Config, Dashboard, SessionData, SyncContext};

use crate::render;

/// Environment variable holding a bearer token for `login`.
pub const TOKEN_ENV: &str = "STUDYDASH_TOKEN";

pub const USAGE: &str = "\
Usage: studydash <command>

  show [--offline]                      render the dashboard (default)
  profile <name> [subtitle]             set the header
  event add <name> <YYYY-MM-DD>         add a countdown event
  event edit <id> <name> <YYYY-MM-DD>   rename or reschedule an event
  event rm <id>                         delete an event
  class add <day> <name> [HH:MM]        add a class to the routine
  class edit <day> <id> <new-day> <name> [HH:MM]
  class rm <day> <id>                   remove a class
  class days <day>...                   choose the routine days
  class clear                           reset the routine
  notes set <text>...                   replace the notes
  notes export <file> | import <file>   copy notes to or from a text file
  notes height <px> | clear
  photo set <data> | set @<file>        set the background photo
  photo remove | dim on|off
  login <user> [token]                  start a session (token may come from STUDYDASH_TOKEN)
  logout
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show { offline: bool },
    Profile { name: String, subtitle: String },
    EventAdd { name: String, date: String },
    EventEdit { id: String, name: String, date: String },
    EventRemove { id: String },
    ClassAdd { day: String, name: String, time: String },
    ClassEdit { day: String, id: String, form: ClassForm },
    ClassRemove { day: String, id: String },
    ClassDays(Vec<String>),
    ClassClear,
    NotesSet(String),
    NotesExport(PathBuf),
    NotesImport(PathBuf),
    NotesHeight(u32),
    NotesClear,
    PhotoSet(String),
    PhotoRemove,
    PhotoDim(bool),
    Login { user: String, token: Option<String> },
    Logout,
    Help,
}

fn arg(args: &[String], idx: usize, what: &str) -> Result<String> {
    args.get(idx)
        .cloned()
        .ok_or_else(|| anyhow!("Missing {}\n\n{}", what, USAGE))
}

fn opt(args: &[String], idx: usize) -> String {
    args.get(idx).cloned().unwrap_or_default()
}

/// Parse arguments (without the program name).
pub fn parse(args: &[String]) -> Result<Command> {
    let words: Vec<&str> = args.iter().take(2).map(String::as_str).collect();
    let command = match words.as_slice() {
        [] | ["show"] => Command::Show { offline: false },
        ["show", "--offline"] => Command::Show { offline: true },
        ["help" | "--help" | "-h", ..] => Command::Help,
        ["profile", ..] => Command::Profile {
            name: arg(args, 1, "name")?,
            subtitle: opt(args, 2),
        },
        ["event", "add"] => Command::EventAdd {
            name: arg(args, 2, "event name")?,
            date: arg(args, 3, "event date")?,
        },
        ["event", "edit"] => Command::EventEdit {
            id: arg(args, 2, "event id")?,
            name: arg(args, 3, "event name")?,
            date: arg(args, 4, "event date")?,
        },
        ["event", "rm"] => Command::EventRemove {
            id: arg(args, 2, "event id")?,
        },
        ["class", "add"] => Command::ClassAdd {
            day: arg(args, 2, "day")?,
            name: arg(args, 3, "class name")?,
            time: opt(args, 4),
        },
        ["class", "edit"] => Command::ClassEdit {
            day: arg(args, 2, "day")?,
            id: arg(args, 3, "class id")?,
            form: ClassForm::new(&arg(args, 4, "new day")?, &arg(args, 5, "class name")?, &opt(args, 6)),
        },
        ["class", "rm"] => Command::ClassRemove {
            day: arg(args, 2, "day")?,
            id: arg(args, 3, "class id")?,
        },
        ["class", "days"] => Command::ClassDays(args[2..].to_vec()),
        ["class", "clear"] => Command::ClassClear,
        ["notes", "set"] => Command::NotesSet(args[2..].join(" ")),
        ["notes", "export"] => Command::NotesExport(arg(args, 2, "file")?.into()),
        ["notes", "import"] => Command::NotesImport(arg(args, 2, "file")?.into()),
        ["notes", "height"] => {
            let px = arg(args, 2, "height")?;
            let px = px
                .trim_end_matches("px")
                .parse()
                .with_context(|| format!("Invalid height '{}'", px))?;
            Command::NotesHeight(px)
        }
        ["notes", "clear"] => Command::NotesClear,
        ["photo", "set"] => Command::PhotoSet(arg(args, 2, "photo data")?),
        ["photo", "remove"] => Command::PhotoRemove,
        ["photo", "dim"] => match arg(args, 2, "on|off")?.as_str() {
            "on" => Command::PhotoDim(true),
            "off" => Command::PhotoDim(false),
            other => bail!("Expected on or off, got '{}'", other),
        },
        ["login", ..] => Command::Login {
            user: arg(args, 1, "user")?,
            token: args.get(2).cloned(),
        },
        ["logout"] => Command::Logout,
        _ => bail!("Unknown command: {}\n\n{}", args.join(" "), USAGE),
    };
    Ok(command)
}

fn ensure_logged_in(dashboard: &Dashboard) -> Result<()> {
    if !dashboard.session().is_logged_in() {
        bail!("Not logged in. Run `studydash login <user> [token]` first.");
    }
    Ok(())
}

/// Read `@path` arguments from a file, pass anything else through.
fn photo_data(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read photo data from {}", path))?
            .trim()
            .to_string()),
        None => Ok(value.to_string()),
    }
}

pub async fn run(command: Command, dashboard: &mut Dashboard, config: &mut Config, today: NaiveDate) -> Result<()> {
    match command {
        Command::Help => print!("{}", USAGE),
        Command::Login { user, token } => {
            let token = token
                .or_else(|| std::env::var(TOKEN_ENV).ok())
                .ok_or_else(|| anyhow!("No token given and {} is not set", TOKEN_ENV))?;
            let session = dashboard.session_mut();
            session.update(SessionData::new(&token, &user));
            session.save()?;
            config.last_user = Some(user.clone());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            println!("Logged in as {}", user);
        }
        Command::Logout => {
            dashboard.session_mut().clear()?;
            println!("Logged out");
        }
        Command::Show { offline } => {
            if !dashboard.load_fast() {
                bail!("Not logged in. Run `studydash login <user> [token]` first.");
            }
            if !offline && dashboard.sync_all_background(today) {
                dashboard.wait_for_sync().await;
            }
            let synced = dashboard.context().cache.age(keys::EVENTS_CACHE);
            print!("{}", render::dashboard(&dashboard.state, synced.as_deref(), today));
        }
        command => {
            ensure_logged_in(dashboard)?;
            run_edit(command, dashboard.context(), config, today).await?;
        }
    }
    Ok(())
}

async fn run_edit(
    command: Command,
    ctx: &SyncContext,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    match command {
        Command::Profile { name, subtitle } => {
            let profile = header::save(ctx, &name, &subtitle).await?;
            println!("{}\n{}", profile.name, profile.subtitle);
        }
        Command::EventAdd { name, date } => {
            let mut events = EventsController::new(ctx.clone());
            if !events.submit(&name, &date, today).await? {
                bail!("Event name and date are required");
            }
            print!("{}", render::events(&events.views(today)));
        }
        Command::EventEdit { id, name, date } => {
            let mut events = EventsController::new(ctx.clone());
            if events.begin_edit(&id).await?.is_none() {
                bail!("No event with id {}", id);
            }
            if !events.submit(&name, &date, today).await? {
                events.cancel_edit();
                bail!("Event name and date are required");
            }
            print!("{}", render::events(&events.views(today)));
        }
        Command::EventRemove { id } => {
            let mut events = EventsController::new(ctx.clone());
            events.delete(&id, today).await?;
            print!("{}", render::events(&events.views(today)));
        }
        Command::ClassAdd { day, name, time } => {
            let mut routine = RoutineController::open_synced(ctx.clone()).await;
            let id = routine
                .add(&ClassForm::new(&day, &name, &time))
                .await?
                .ok_or_else(|| anyhow!("Day and class name are required"))?;
            info!(%id, %day, "Class added");
            print!("{}", render::routine(routine.routine()));
        }
        Command::ClassEdit { day, id, form } => {
            let mut routine = RoutineController::open_synced(ctx.clone()).await;
            if routine.begin_edit(&day, &id).is_none() {
                bail!("No class {} on {}", id, day);
            }
            if !routine.update(&form).await? {
                routine.cancel();
                bail!("Day and class name are required");
            }
            print!("{}", render::routine(routine.routine()));
        }
        Command::ClassRemove { day, id } => {
            let mut routine = RoutineController::open_synced(ctx.clone()).await;
            if !routine.delete(&day, &id).await? {
                bail!("No class {} on {}", id, day);
            }
            print!("{}", render::routine(routine.routine()));
        }
        Command::ClassDays(days) => {
            let mut routine = RoutineController::open_synced(ctx.clone()).await;
            routine.set_days(&days).await?;
            print!("{}", render::routine(routine.routine()));
        }
        Command::ClassClear => {
            let mut routine = RoutineController::open_synced(ctx.clone()).await;
            routine.clear().await?;
            print!("{}", render::routine(routine.routine()));
        }
        Command::NotesSet(text) => {
            let mut editor = NotesEditor::new(ctx.clone(), config.notes_debounce());
            editor.on_input(&text);
            editor.flush().await;
        }
        Command::NotesExport(path) => {
            notes::export(ctx.cache.as_ref(), &path)?;
            println!("Notes written to {}", path.display());
        }
        Command::NotesImport(path) => {
            let text = notes::import(ctx, &path).await?;
            println!("Imported {} characters", text.chars().count());
        }
        Command::NotesHeight(px) => notes::set_height(ctx, px).await?,
        Command::NotesClear => notes::clear(ctx).await?,
        Command::PhotoSet(value) => {
            photo::set_photo(ctx, &photo_data(&value)?).await?;
        }
        Command::PhotoRemove => {
            photo::remove_photo(ctx).await?;
        }
        Command::PhotoDim(dim) => {
            photo::set_dim(ctx, dim).await?;
        }
        Command::Show { .. } | Command::Help | Command::Login { .. } | Command::Logout => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use studydash_core::features::routine;
    use studydash_core::{MemoryCache, MemoryRemote, RemoteHandle, RemoteStore};

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_default_is_show() {
        assert_eq!(parse(&[]).unwrap(), Command::Show { offline: false });
        assert_eq!(parse(&args("show --offline")).unwrap(), Command::Show { offline: true });
    }

    #[test]
    fn test_parse_event_commands() {
        assert_eq!(
            parse(&args("event add Midterm 2024-01-11")).unwrap(),
            Command::EventAdd {
                name: "Midterm".to_string(),
                date: "2024-01-11".to_string()
            }
        );
        assert_eq!(
            parse(&args("event rm abc")).unwrap(),
            Command::EventRemove { id: "abc".to_string() }
        );
        assert!(parse(&args("event add Midterm")).is_err());
    }

    #[test]
    fn test_parse_class_commands() {
        assert_eq!(
            parse(&args("class add Monday Physics 14:30")).unwrap(),
            Command::ClassAdd {
                day: "Monday".to_string(),
                name: "Physics".to_string(),
                time: "14:30".to_string()
            }
        );
        assert_eq!(
            parse(&args("class edit Monday x1 Tuesday Physics")).unwrap(),
            Command::ClassEdit {
                day: "Monday".to_string(),
                id: "x1".to_string(),
                form: ClassForm::new("Tuesday", "Physics", ""),
            }
        );
        assert_eq!(
            parse(&args("class days Saturday Sunday")).unwrap(),
            Command::ClassDays(vec!["Saturday".to_string(), "Sunday".to_string()])
        );
    }

    #[test]
    fn test_parse_notes_and_photo() {
        assert_eq!(
            parse(&args("notes set buy more coffee")).unwrap(),
            Command::NotesSet("buy more coffee".to_string())
        );
        assert_eq!(parse(&args("notes height 240px")).unwrap(), Command::NotesHeight(240));
        assert!(parse(&args("notes height tall")).is_err());
        assert_eq!(parse(&args("photo dim off")).unwrap(), Command::PhotoDim(false));
        assert!(parse(&args("photo dim maybe")).is_err());
    }

    #[test]
    fn test_parse_login() {
        assert_eq!(
            parse(&args("login ada")).unwrap(),
            Command::Login {
                user: "ada".to_string(),
                token: None
            }
        );
        assert!(parse(&args("login")).is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = parse(&args("dance")).unwrap_err();
        assert!(err.to_string().contains("Unknown command"));
    }

    #[test]
    fn test_photo_data_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.txt");
        std::fs::write(&path, "data:image/png;base64,AAAA\n").unwrap();
        let value = format!("@{}", path.display());
        assert_eq!(photo_data(&value).unwrap(), "data:image/png;base64,AAAA");
        assert_eq!(photo_data("inline").unwrap(), "inline");
    }

    #[tokio::test]
    async fn test_class_add_with_cold_cache_keeps_remote_routine() {
        let remote = Arc::new(MemoryRemote::new());
        remote
            .save_value(
                keys::ROUTINE,
                Some(serde_json::json!({
                    "days": ["Saturday"],
                    "items": {"Saturday": [{"id": "s1", "name": "Anatomy", "time": "08:00"}]}
                })),
            )
            .await
            .unwrap();
        let ctx = SyncContext::new(Arc::new(MemoryCache::new()), RemoteHandle::ready(remote.clone()));
        let today = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();

        let command = parse(&args("class add Monday Physics 14:30")).unwrap();
        run_edit(command, &ctx, &Config::default(), today).await.unwrap();

        let stored = remote.peek_value(keys::ROUTINE).unwrap();
        assert_eq!(stored["items"]["Saturday"][0]["name"], "Anatomy");
        assert_eq!(stored["items"]["Monday"][0]["name"], "Physics");
        assert_eq!(routine::load_fast(ctx.cache.as_ref()).entry_count(), 2);
    }
}
