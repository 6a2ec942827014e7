//! The playable flooded-dungeon crawl.
//!
//! Loads the map, then runs the prompt loop: show where you are and what you
//! can do, read one choice, let the core settle it. When the run ends the
//! session log gets its single summary row.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dg_core::consts::SESSION_FIELDS;
use dg_core::gameloop::{Game, GameEvent, Menu, PlayerAction, TurnOutcome};
use dg_core::session::{LocalClock, SessionRecorder, SessionSnapshot};
use dg_core::Dungeon;

#[derive(Parser, Debug)]
#[command(name = "dungeon", about = "A flooded-dungeon crawl")]
struct Cli {
    /// Dungeon map, a JSON tree of tagged locations and monsters.
    #[arg(long, default_value = "rpg.json")]
    map: PathBuf,

    /// Session log; receives one summary row when the run ends.
    #[arg(long, default_value = "dungeon.csv")]
    log: PathBuf,
}

/// Keeps only the latest snapshot and writes it out as the one-row CSV the
/// log's consumers expect.
struct CsvRecorder {
    path: PathBuf,
    last: Option<SessionSnapshot>,
}

impl CsvRecorder {
    fn new(path: PathBuf) -> Self {
        CsvRecorder { path, last: None }
    }

    fn finish(self) -> io::Result<()> {
        let Some(snapshot) = self.last else {
            return Ok(());
        };
        let mut file = File::create(&self.path)?;
        writeln!(file, "{}", SESSION_FIELDS.join(","))?;
        writeln!(
            file,
            "{},{},{}",
            snapshot.current_location, snapshot.current_experience, snapshot.current_date
        )?;
        Ok(())
    }
}

impl SessionRecorder for CsvRecorder {
    fn record(&mut self, snapshot: SessionSnapshot) {
        self.last = Some(snapshot);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dungeon: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let map: serde_json::Value = serde_json::from_reader(BufReader::new(File::open(&cli.map)?))?;
    let dungeon = Dungeon::from_value(&map)?;
    let mut game = Game::new(dungeon, CsvRecorder::new(cli.log), LocalClock);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        render_events(game.take_events());
        let menu = game.menu();
        render_menu(&menu);
        let action = loop {
            print!("Choose your act: ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                // End of input counts as giving up.
                break PlayerAction::Quit;
            };
            match menu.select(&line?) {
                Ok(action) => break action.clone(),
                Err(err) => println!("{err}. Try again."),
            }
        };
        match game.execute(action) {
            TurnOutcome::Continue | TurnOutcome::Died(_) => {}
            TurnOutcome::Won | TurnOutcome::Quit => break,
        }
    }
    render_events(game.take_events());
    game.into_recorder().finish()?;
    Ok(())
}

fn render_events(events: Vec<GameEvent>) {
    for event in events {
        match event {
            GameEvent::EnteredLocation {
                label,
                total_exp,
                remaining_time,
            } => {
                println!("--------------------------------");
                println!("You are in {label}");
                println!("You have {total_exp} exp and {remaining_time} seconds until the flood");
            }
            GameEvent::MonsterSlain {
                label,
                total_exp,
                remaining_time,
            } => {
                println!("{label} falls. Exp: {total_exp}, time: {remaining_time}");
            }
            GameEvent::HatchResisted => {
                println!(
                    "The hatch will not budge: you need more experience. \
                     There is still something down here to fight."
                );
            }
            GameEvent::Flooded => {
                println!("You did not make the hatch in time. The water closes over your head.");
            }
            GameEvent::StupidDeath => {
                println!("Not enough experience and nothing left to fight. A stupid way to go.");
            }
            GameEvent::Respawned => {
                println!("...and yet you wake at the dungeon mouth, ready for another try.");
            }
            GameEvent::Escaped {
                total_exp,
                remaining_time,
            } => {
                println!(
                    "The hatch swings open. You are out, with {total_exp} exp \
                     and {remaining_time} seconds to spare."
                );
            }
            GameEvent::Resigned => {
                println!("You climb back out while you still can.");
            }
        }
    }
}

fn render_menu(menu: &Menu) {
    println!("Inside you see:");
    for entry in menu.entries() {
        match entry.action {
            PlayerAction::Fight(_) => println!("{}. Fight {}", entry.index, entry.label),
            PlayerAction::Move(_) => println!("{}. Enter {}", entry.index, entry.label),
            PlayerAction::OpenHatch(_) => println!("{}. Open {}", entry.index, entry.label),
            PlayerAction::Quit => println!("{}. {}", entry.index, entry.label),
        }
    }
}
