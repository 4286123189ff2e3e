//! Interactive workout loop.
//!
//! Three sources feed one channel: typed lines from a stdin reader thread,
//! a 1 Hz elapsed ticker for the whole session, and a 1 Hz rest ticker that
//! only exists while a rest countdown runs. Rest ticks carry a generation
//! number so ticks from a replaced countdown are ignored.

use crate::display;
use crate::input::{self, Command};
use crate::ticker::{self, Ticker};
use chrono::Utc;
use kracht_core::{CueSink, Result, RestTick, Session, SessionHost, Tone, Workout, WorkoutTemplate};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

const TICK: Duration = Duration::from_secs(1);

/// Terminal bell cues; the ready tone rings twice
pub struct Bell;

impl CueSink for Bell {
    fn play(&mut self, tone: Tone) -> Result<()> {
        let bells: &[u8] = if tone == Tone::Ready { b"\x07\x07" } else { b"\x07" };
        let mut err = io::stderr().lock();
        err.write_all(bells)?;
        err.flush()?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
enum Event {
    Line(String),
    Eof,
    Elapsed,
    RestTick(u64),
    RestGrace(u64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Pending {
    Finish,
    Quit,
    Retry,
}

enum Flow {
    Continue,
    Done,
}

struct Ui {
    host: SessionHost,
    tx: Sender<Event>,
    rest_generation: u64,
    rest_ticker: Option<Ticker>,
    pending: Option<Pending>,
    last_minute: u64,
    last_saved: Option<Workout>,
}

fn spawn_stdin_reader(tx: Sender<Event>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Event::Line(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
        let _ = tx.send(Event::Eof);
    });
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

/// Rest countdown values worth a line of output
fn worth_showing(remaining: u32) -> bool {
    remaining % 30 == 0 || remaining == 10 || remaining <= 3
}

/// Run a workout from `template` until it is saved or discarded
pub fn run(mut host: SessionHost, template: &WorkoutTemplate) -> Result<Option<Workout>> {
    host.begin(template, Utc::now())?.set_cues(Box::new(Bell));

    display::banner(&format!("WORKOUT {}  ·  {}", template.name, template.description));
    println!("{}", input::HELP);

    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx.clone());
    let _elapsed = Ticker::start(TICK, tx.clone(), Event::Elapsed);

    let mut ui = Ui {
        host,
        tx,
        rest_generation: 0,
        rest_ticker: None,
        pending: None,
        last_minute: 0,
        last_saved: None,
    };
    ui.show();

    while let Ok(event) = rx.recv() {
        if let Flow::Done = ui.handle(event)? {
            break;
        }
    }

    Ok(ui.last_saved)
}

impl Ui {
    fn session(&self) -> Option<&Session> {
        self.host.session()
    }

    fn show(&self) {
        if let Some(session) = self.session() {
            display::session(session, session.elapsed_seconds(Utc::now()));
            if let Some(rest) = session.rest() {
                println!("  Resting: {} left", display::clock(u64::from(rest.remaining())));
            }
        }
        prompt();
    }

    fn handle(&mut self, event: Event) -> Result<Flow> {
        match event {
            Event::Elapsed => {
                self.on_elapsed();
                Ok(Flow::Continue)
            }
            Event::RestTick(generation) => {
                if generation == self.rest_generation {
                    self.on_rest_tick(generation);
                }
                Ok(Flow::Continue)
            }
            Event::RestGrace(generation) => {
                if generation == self.rest_generation {
                    if let Some(session) = self.host.session_mut() {
                        if session.expire_rest() {
                            self.rest_ticker = None;
                            println!("\n⏰ Rest over");
                            self.show();
                        }
                    }
                }
                Ok(Flow::Continue)
            }
            Event::Line(line) => match self.pending.take() {
                Some(pending) => self.answer(pending, &line),
                None => self.command(&line),
            },
            Event::Eof => {
                self.rest_ticker = None;
                if self.host.session().is_some() || self.host.unsaved().is_some() {
                    self.host.quit()?;
                    println!("\nInput closed - workout discarded.");
                }
                Ok(Flow::Done)
            }
        }
    }

    fn on_elapsed(&mut self) {
        let Some((minute, resting)) = self
            .session()
            .map(|s| (s.elapsed_seconds(Utc::now()) / 60, s.is_resting()))
        else {
            return;
        };
        if minute > self.last_minute {
            self.last_minute = minute;
            if !resting && minute % 5 == 0 {
                println!("\n⏱ {} elapsed", display::clock(minute * 60));
                prompt();
            }
        }
    }

    fn on_rest_tick(&mut self, generation: u64) {
        let Some(session) = self.host.session_mut() else {
            self.rest_ticker = None;
            return;
        };
        let grace = session.rest_grace();

        match session.tick_rest() {
            RestTick::NotResting => self.rest_ticker = None,
            RestTick::Counting { remaining } => {
                if worth_showing(remaining) {
                    println!("\n  Rest: {}", display::clock(u64::from(remaining)));
                    prompt();
                }
            }
            RestTick::Expired => {
                ticker::after(grace, self.tx.clone(), Event::RestGrace(generation));
            }
            RestTick::Dismissed => {
                self.rest_ticker = None;
                println!("\n⏰ Rest over");
                self.show();
            }
        }
    }

    fn start_rest_ticker(&mut self) {
        self.rest_generation += 1;
        // Drop the previous ticker before its replacement starts
        self.rest_ticker = None;
        self.rest_ticker = Some(Ticker::start(
            TICK,
            self.tx.clone(),
            Event::RestTick(self.rest_generation),
        ));
    }

    fn command(&mut self, line: &str) -> Result<Flow> {
        let command = match input::parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                println!("  {}", e);
                prompt();
                return Ok(Flow::Continue);
            }
        };

        let Some(session) = self.host.session_mut() else {
            return Ok(Flow::Done);
        };
        let current = session.current_exercise_index();

        let outcome = match command {
            Command::Toggle(set) => session.toggle_set(current, set).map(|completed| {
                if completed && session.is_resting() {
                    Some(true)
                } else {
                    None
                }
            }),
            Command::Reps { set, reps } => session.set_reps(current, set, reps).map(|_| None),
            Command::Weight { set, weight } => {
                session.set_weight(current, set, weight).map(|_| None)
            }
            Command::Next => {
                if !session.next_exercise() {
                    println!("  Already at the last exercise");
                }
                Ok(None)
            }
            Command::Previous => {
                if !session.previous_exercise() {
                    println!("  Already at the first exercise");
                }
                Ok(None)
            }
            Command::Go(index) => session.select_exercise(index).map(|_| None),
            Command::SkipRest => {
                session.skip_rest();
                Ok(Some(false))
            }
            Command::AdjustRest(delta) => {
                match session.adjust_rest(delta) {
                    Some(remaining) => println!("  Rest: {}", display::clock(u64::from(remaining))),
                    None => println!("  Not resting"),
                }
                Ok(None)
            }
            Command::Show => Ok(None),
            Command::Help => {
                println!("{}", input::HELP);
                Ok(None)
            }
            Command::Finish => {
                if session.workout().all_exercises_completed() {
                    return self.finish();
                }
                self.pending = Some(Pending::Finish);
                print!("  Not all sets are done. Finish anyway? [y/N] ");
                let _ = io::stdout().flush();
                return Ok(Flow::Continue);
            }
            Command::Quit => {
                self.pending = Some(Pending::Quit);
                print!("  Quit without saving? [y/N] ");
                let _ = io::stdout().flush();
                return Ok(Flow::Continue);
            }
        };

        match outcome {
            Ok(Some(true)) => self.start_rest_ticker(),
            Ok(Some(false)) => self.rest_ticker = None,
            Ok(None) => {}
            Err(e) => println!("  {}", e),
        }
        self.show();
        Ok(Flow::Continue)
    }

    fn answer(&mut self, pending: Pending, line: &str) -> Result<Flow> {
        let yes = input::is_yes(line);
        match (pending, yes) {
            (Pending::Finish, true) => self.finish(),
            (Pending::Quit, true) => {
                self.rest_ticker = None;
                self.host.quit()?;
                println!("  Workout discarded.");
                Ok(Flow::Done)
            }
            (Pending::Retry, true) => {
                let result = self.host.retry_save();
                self.saved_or_retry(result)
            }
            (Pending::Retry, false) => {
                self.host.quit()?;
                println!("  Workout discarded.");
                Ok(Flow::Done)
            }
            (Pending::Finish | Pending::Quit, false) => {
                self.show();
                Ok(Flow::Continue)
            }
        }
    }

    fn finish(&mut self) -> Result<Flow> {
        self.rest_ticker = None;
        let result = self.host.finish(Utc::now());
        self.saved_or_retry(result)
    }

    fn saved_or_retry(&mut self, result: Result<Workout>) -> Result<Flow> {
        match result {
            Ok(workout) => {
                display::finished(&workout);
                self.last_saved = Some(workout);
                Ok(Flow::Done)
            }
            Err(e) if e.is_storage() => {
                println!("\n✗ Could not save workout: {}", e);
                print!("  Retry? [y/N] ");
                let _ = io::stdout().flush();
                self.pending = Some(Pending::Retry);
                Ok(Flow::Continue)
            }
            Err(e) => Err(e),
        }
    }
}
