mod display;
mod input;
mod session_ui;
mod ticker;

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use clap::{Parser, Subcommand};
use kracht_core::snacks::{find_snack, SNACK_OPTIONS, SNACK_SET_COUNT};
use kracht_core::store::{self, load_templates_or_default, load_workouts_or_empty};
use kracht_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kracht")]
#[command(about = "Strength workout tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage workout templates
    Templates {
        #[command(subcommand)]
        command: Option<TemplateCommands>,
    },

    /// Start a workout from a template (id or name)
    Start {
        template: String,

        /// Mark every set done and finish immediately (non-interactive)
        #[arg(long)]
        auto_complete: bool,
    },

    /// List logged workouts, newest first
    History {
        /// Maximum number of workouts to show
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Show every set
        #[arg(long)]
        sets: bool,
    },

    /// Delete a workout by id (a unique prefix is enough)
    Delete { id: String },

    /// Volume summary and personal records
    Progress,

    /// Level, rank and weekly streak (default)
    Stats,

    /// Month view of training days
    Calendar {
        /// Month as YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// List snack exercises, or log one
    Snack {
        /// Snack exercise key or name
        exercise: Option<String>,

        /// A set as REPSxKG, e.g. 12x7.5 (repeatable)
        #[arg(long = "set", value_name = "REPSxKG")]
        sets: Vec<String>,
    },

    /// Show or update the user profile
    Profile {
        #[arg(long)]
        name: Option<String>,

        /// nl or en
        #[arg(long)]
        language: Option<String>,
    },

    /// Export workout history to CSV (one row per set)
    Export { path: PathBuf },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List templates (default)
    List,
    /// Show the exercises of one template
    Show { template: String },
    /// Delete a template
    Delete { template: String },
    /// Add or replace templates from a JSON file (one template or an array)
    Import { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        kracht_core::logging::init_with_level("debug");
    } else {
        kracht_core::logging::init();
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    let store = store::open(&config)?;

    match cli.command {
        Some(Commands::Templates { command }) => {
            cmd_templates(store.as_ref(), command.unwrap_or(TemplateCommands::List))
        }
        Some(Commands::Start {
            template,
            auto_complete,
        }) => cmd_start(store, &config, &template, auto_complete),
        Some(Commands::History { limit, sets }) => cmd_history(store.as_ref(), limit, sets),
        Some(Commands::Delete { id }) => cmd_delete(store.as_ref(), &id),
        Some(Commands::Progress) => cmd_progress(store.as_ref()),
        Some(Commands::Stats) | None => cmd_stats(store.as_ref(), &config),
        Some(Commands::Calendar { month }) => cmd_calendar(store.as_ref(), &config, month),
        Some(Commands::Snack { exercise, sets }) => cmd_snack(store.as_ref(), exercise, sets),
        Some(Commands::Profile { name, language }) => cmd_profile(store.as_ref(), name, language),
        Some(Commands::Export { path }) => cmd_export(store.as_ref(), &path),
    }
}

fn resolve_template(store: &dyn Store, key: &str) -> Result<WorkoutTemplate> {
    let templates = load_templates_or_default(store);
    find_template(&templates, key)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("template '{}'", key)))
}

fn cmd_templates(store: &dyn Store, command: TemplateCommands) -> Result<()> {
    match command {
        TemplateCommands::List => {
            for template in load_templates_or_default(store) {
                println!(
                    "{:<6} {:<28} {} exercises, {} sets",
                    template.id,
                    template.description,
                    template.exercises.len(),
                    template.set_count()
                );
            }
        }
        TemplateCommands::Show { template } => {
            let template = resolve_template(store, &template)?;
            display::banner(&format!("TEMPLATE {}  ·  {}", template.name, template.description));
            for (idx, ex) in template.exercises.iter().enumerate() {
                let rest = ex.rest_time.map(|s| display::clock(u64::from(s)));
                println!(
                    "  {}. {:<26} {} × {:<8} rest {}",
                    idx + 1,
                    ex.display_name,
                    ex.sets,
                    ex.target_reps,
                    rest.as_deref().unwrap_or("default")
                );
            }
        }
        TemplateCommands::Delete { template } => {
            let template = resolve_template(store, &template)?;
            store.delete_template(&template.id)?;
            println!("✓ Deleted template {}", template.name);
        }
        TemplateCommands::Import { path } => {
            let contents = std::fs::read_to_string(&path)?;
            let templates: Vec<WorkoutTemplate> = if contents.trim_start().starts_with('[') {
                serde_json::from_str(&contents)?
            } else {
                vec![serde_json::from_str(&contents)?]
            };
            for template in &templates {
                template.ensure_valid()?;
            }
            store.save_templates(&templates)?;
            println!("✓ Imported {} template(s)", templates.len());
        }
    }
    Ok(())
}

fn cmd_start(
    store: Box<dyn Store>,
    config: &Config,
    key: &str,
    auto_complete: bool,
) -> Result<()> {
    let template = resolve_template(store.as_ref(), key)?;
    let mut host = SessionHost::new(store, config.session.settings());

    if !auto_complete {
        session_ui::run(host, &template)?;
        return Ok(());
    }

    let session = host.begin(&template, Utc::now())?;
    for exercise in 0..session.workout().exercises.len() {
        let set_count = session.workout().exercises[exercise].sets().len();
        for set in 0..set_count {
            session.toggle_set(exercise, set)?;
            session.skip_rest();
        }
    }

    let workout = host.finish(Utc::now())?;
    display::finished(&workout);
    Ok(())
}

fn cmd_history(store: &dyn Store, limit: usize, sets: bool) -> Result<()> {
    let workouts = store.load_workouts()?;
    if workouts.is_empty() {
        println!("No workouts logged yet.");
        return Ok(());
    }

    for workout in workouts.iter().take(limit) {
        if sets {
            display::workout(workout);
            println!();
        } else {
            println!(
                "{}  {}  {:<3} {:>3} min  {:>6} kg  {}/{} sets",
                display::short_id(&workout.id),
                workout.date.format("%Y-%m-%d %H:%M"),
                workout.workout_type,
                workout.duration_minutes,
                display::kg(workout.volume()),
                workout.completed_set_count(),
                workout.set_count()
            );
        }
    }
    if workouts.len() > limit {
        println!("... {} more", workouts.len() - limit);
    }
    Ok(())
}

fn cmd_delete(store: &dyn Store, prefix: &str) -> Result<()> {
    let workouts = store.load_workouts()?;
    let matches: Vec<&Workout> = workouts
        .iter()
        .filter(|w| w.id.starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(Error::NotFound(format!("workout '{}'", prefix))),
        [workout] => {
            store.delete_workout(&workout.id)?;
            println!(
                "✓ Deleted workout {} from {}",
                workout.workout_type,
                workout.date.format("%Y-%m-%d")
            );
            Ok(())
        }
        _ => Err(Error::InvalidInput(format!(
            "'{}' matches {} workouts; use a longer id",
            prefix,
            matches.len()
        ))),
    }
}

fn cmd_progress(store: &dyn Store) -> Result<()> {
    let workouts = load_workouts_or_empty(store);
    let summary = history::progress_summary(&workouts);

    display::banner("PROGRESS");
    println!("  Workouts:        {}", summary.completed_count);
    println!("  Total volume:    {} kg", display::kg(summary.total_volume));
    println!("  Average volume:  {} kg", display::kg(summary.average_volume));
    println!("  Time trained:    {} min", summary.total_minutes);

    if !summary.series.is_empty() {
        println!("\n  Recent sessions");
        let skip = summary.series.len().saturating_sub(10);
        let peak = summary
            .series
            .iter()
            .map(|p| p.volume)
            .fold(0.0_f64, f64::max);
        for point in &summary.series[skip..] {
            let percent = if peak > 0.0 { point.volume / peak * 100.0 } else { 0.0 };
            println!(
                "  {}  {} {:>6} kg  {:>3} min",
                point.date.format("%m-%d"),
                display::bar(percent, 20),
                display::kg(point.volume),
                point.duration_minutes
            );
        }
    }

    let records = personal_records(&workouts);
    if !records.is_empty() {
        println!("\n  Personal records");
        for record in records {
            println!(
                "  {:<26} {:>6} kg × {:<3} best session {} kg",
                record.exercise,
                display::kg(record.max_weight),
                record.best_set.reps,
                display::kg(record.max_volume)
            );
        }
    }
    Ok(())
}

fn cmd_stats(store: &dyn Store, config: &Config) -> Result<()> {
    let workouts = load_workouts_or_empty(store);
    let now = Utc::now();
    let stats = calculate_stats(&workouts, config.progress.xp_per_workout);
    let streak = workout_streak(&workouts, now, config.progress.week_start);
    let this_week = streak::workouts_this_week(&workouts, now, config.progress.week_start);

    let name = match store.load_profile() {
        Ok(Some(user)) => user.name,
        Ok(None) => User::default().name,
        Err(e) => {
            tracing::warn!("Failed to load profile: {}", e);
            User::default().name
        }
    };

    display::banner(&format!("{}  ·  {}", name, stats.rank_name));
    println!("  Level {}", stats.level);
    println!(
        "  {} {}/{} XP ({} total)",
        display::bar(stats.progress_percent, 20),
        stats.current_xp,
        stats.next_level_xp,
        stats.total_xp
    );
    println!("  Streak:     {} week(s)", streak);
    println!("  This week:  {} workout(s)", this_week);
    Ok(())
}

fn parse_month(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|_| Error::InvalidInput(format!("not a month (YYYY-MM): '{}'", raw)))
}

fn days_in_month(first: NaiveDate) -> u32 {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next.map(|n| (n - Duration::days(1)).day()).unwrap_or(31)
}

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mo",
        Weekday::Tue => "Tu",
        Weekday::Wed => "We",
        Weekday::Thu => "Th",
        Weekday::Fri => "Fr",
        Weekday::Sat => "Sa",
        Weekday::Sun => "Su",
    }
}

fn cmd_calendar(store: &dyn Store, config: &Config, month: Option<String>) -> Result<()> {
    let first = match month {
        Some(raw) => parse_month(&raw)?,
        None => {
            let today = Utc::now().date_naive();
            today.with_day(1).unwrap_or(today)
        }
    };

    let workouts = load_workouts_or_empty(store);
    let activity = history::month_activity(&workouts, first.year(), first.month());
    let week_start = config.progress.week_start;

    display::banner(&first.format("%B %Y").to_string());

    let mut day = week_start;
    let mut header = String::new();
    for _ in 0..7 {
        header.push_str(&format!(" {} ", weekday_label(day)));
        day = day.succ();
    }
    println!("{}", header);

    let offset = (7 + first.weekday().num_days_from_monday()
        - week_start.num_days_from_monday())
        % 7;
    let mut line = "    ".repeat(offset as usize);
    let mut column = offset;
    for d in 1..=days_in_month(first) {
        let mark = if activity.contains_key(&d) { '*' } else { ' ' };
        line.push_str(&format!("{:>3}{}", d, mark));
        column += 1;
        if column == 7 {
            println!("{}", line.trim_end());
            line.clear();
            column = 0;
        }
    }
    if !line.is_empty() {
        println!("{}", line.trim_end());
    }

    let total: usize = activity.values().sum();
    println!("\n  {} workout(s) on {} day(s)", total, activity.len());
    for (d, _) in activity {
        if let Some(date) = first.with_day(d) {
            for workout in history::workouts_on(&workouts, date) {
                println!(
                    "  {}  Workout {}  {} min  {} kg",
                    date.format("%d %b"),
                    workout.workout_type,
                    workout.duration_minutes,
                    display::kg(workout.volume())
                );
            }
        }
    }
    Ok(())
}

fn prompt_sets(count: usize) -> Result<Vec<ExerciseSet>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut sets = Vec::with_capacity(count);

    while sets.len() < count {
        print!("  Set {} (REPSxKG): ", sets.len() + 1);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        match input::parse_set(&line?) {
            Ok(set) => sets.push(set),
            Err(e) => println!("  {}", e),
        }
    }
    Ok(sets)
}

fn cmd_snack(store: &dyn Store, exercise: Option<String>, raw_sets: Vec<String>) -> Result<()> {
    let Some(key) = exercise else {
        display::banner("WORKOUT SNACKS");
        for option in SNACK_OPTIONS {
            println!(
                "  {:<18} {:<18} {:<14} {} reps",
                option.name, option.display_name, option.target, option.reps
            );
        }

        let snacks = store.load_snacks().unwrap_or_else(|e| {
            tracing::warn!("Failed to load snacks: {}", e);
            Vec::new()
        });
        if !snacks.is_empty() {
            println!("\n  Recent");
            for snack in snacks.iter().take(5) {
                println!(
                    "  {}  {:<18} {} sets  {} kg",
                    snack.date.format("%Y-%m-%d"),
                    snack.exercise_name,
                    snack.sets.len(),
                    display::kg(snack.volume())
                );
            }
        }
        return Ok(());
    };

    let option =
        find_snack(&key).ok_or_else(|| Error::NotFound(format!("snack exercise '{}'", key)))?;

    let sets = if raw_sets.is_empty() {
        println!("{} ({} reps)", option.display_name, option.reps);
        prompt_sets(SNACK_SET_COUNT)?
    } else {
        raw_sets
            .iter()
            .map(|raw| input::parse_set(raw))
            .collect::<Result<Vec<_>>>()?
    };
    if sets.is_empty() {
        return Err(Error::InvalidInput("no sets entered".into()));
    }

    let snack = WorkoutSnack::record(option, sets, Utc::now());
    store.save_snack(&snack)?;
    println!(
        "✓ Snack logged: {} × {} sets, {} kg",
        snack.exercise_name,
        snack.sets.len(),
        display::kg(snack.volume())
    );
    Ok(())
}

fn cmd_profile(store: &dyn Store, name: Option<String>, language: Option<String>) -> Result<()> {
    let mut user = store.load_profile()?.unwrap_or_default();

    if name.is_some() || language.is_some() {
        if let Some(name) = name {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::InvalidInput("name cannot be empty".into()));
            }
            user.name = name.to_string();
        }
        if let Some(language) = language {
            user.language = language.parse()?;
        }
        store.save_profile(&user)?;
        println!("✓ Profile updated");
    }

    println!("  Name:      {}", user.name);
    println!(
        "  Language:  {}",
        match user.language {
            Language::Nl => "nl",
            Language::En => "en",
        }
    );
    Ok(())
}

fn cmd_export(store: &dyn Store, path: &Path) -> Result<()> {
    let workouts = store.load_workouts()?;
    let rows = write_history_csv(&workouts, path)?;
    println!("✓ Exported {} sets from {} workouts", rows, workouts.len());
    println!("  CSV: {}", path.display());
    Ok(())
}
