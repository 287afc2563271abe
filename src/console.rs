use crate::game::{Game, Outcome, Status};
use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};

/// Text front end. Commands arrive one per line, coordinates are board cells.
pub struct ConsoleHandler {
    game: Game,
    selected: Option<(i32, i32)>,
}

impl ConsoleHandler {
    pub fn new() -> Self {
        ConsoleHandler {
            game: Game::new(),
            selected: None,
        }
    }

    pub fn with_game(game: Game) -> Self {
        ConsoleHandler {
            game,
            selected: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn selected(&self) -> Option<(i32, i32)> {
        self.selected
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        write!(stdout, "{}{}", self.game.board(), self.status_text())?;
        stdout.flush()?;
        while reader.read_line(&mut line)? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }

            match self.handle_command(command) {
                Ok(response) => write!(stdout, "{}", response)?,
                Err(e) => writeln!(stdout, "error: {:#}", e)?,
            }

            stdout.flush()?;
            line.clear();
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok("".to_string());
        }

        match parts[0] {
            "click" => {
                let [x, y] = parse_coords::<2>(&parts[1..])?;
                Ok(self.handle_click(x, y))
            }
            "move" => {
                let [from_x, from_y, to_x, to_y] = parse_coords::<4>(&parts[1..])?;
                self.selected = None;
                match self.game.try_move(from_x, from_y, to_x, to_y) {
                    Ok(_) => Ok(self.status_text()),
                    Err(e) => Ok(format!("rejected: {}\n", e)),
                }
            }
            "moves" => {
                let [x, y] = parse_coords::<2>(&parts[1..])?;
                Ok(self.handle_moves(x, y))
            }
            "board" => Ok(format!("{}{}", self.game.board(), self.status_text())),
            "status" => Ok(self.status_text()),
            "undo" => {
                self.selected = None;
                let changed = self.game.undo();
                Ok(self.history_text(changed))
            }
            "redo" => {
                self.selected = None;
                let changed = self.game.redo();
                Ok(self.history_text(changed))
            }
            "new" => {
                self.game = Game::with_rules(self.game.position().rules());
                self.selected = None;
                Ok(self.status_text())
            }
            "quit" => Ok("".to_string()),
            other => bail!("unknown command '{}'", other),
        }
    }

    /// Select-then-move, the way a mouse click drives the board: the first
    /// click picks up a piece, the second tries to put it down. A failed move
    /// selects the clicked square instead if it holds a piece.
    fn handle_click(&mut self, x: i32, y: i32) -> String {
        let occupied = self.game.board().is_occupied(x, y);
        match self.selected {
            None if occupied => {
                self.selected = Some((x, y));
                format!("selected ({}, {})\n", x, y)
            }
            None => "nothing to select\n".to_string(),
            Some((from_x, from_y)) => {
                if self.game.move_piece(from_x, from_y, x, y) {
                    self.selected = None;
                    self.status_text()
                } else if occupied {
                    self.selected = Some((x, y));
                    format!("selected ({}, {})\n", x, y)
                } else {
                    self.selected = None;
                    "selection cleared\n".to_string()
                }
            }
        }
    }

    fn handle_moves(&self, x: i32, y: i32) -> String {
        let destinations = self.game.legal_destinations(x, y);
        if destinations.is_empty() {
            return "no legal moves\n".to_string();
        }
        let squares: Vec<String> = destinations
            .iter()
            .map(|(to_x, to_y)| format!("{},{}", to_x, to_y))
            .collect();
        format!("{}\n", squares.join(" "))
    }

    fn history_text(&self, changed: bool) -> String {
        if changed {
            self.status_text()
        } else {
            "nothing to do\n".to_string()
        }
    }

    pub fn status_text(&self) -> String {
        match self.game.status() {
            Status::GameOver(Outcome::Winner(color)) => {
                format!("checkmate, {} wins\n", color)
            }
            Status::GameOver(Outcome::Draw) => "stalemate, draw\n".to_string(),
            Status::AwaitingMove => {
                let side = self.game.to_move();
                if self.game.is_in_check() {
                    let checkers: Vec<String> = self
                        .game
                        .checkers()
                        .iter()
                        .map(|piece| format!("{},{}", piece.x, piece.y))
                        .collect();
                    format!("{} to move, check from {}\n", side, checkers.join(" "))
                } else {
                    format!("{} to move\n", side)
                }
            }
        }
    }
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        ConsoleHandler::new()
    }
}

fn parse_coords<const N: usize>(args: &[&str]) -> Result<[i32; N]> {
    if args.len() != N {
        bail!("expected {} coordinates, got {}", N, args.len());
    }
    let mut coords = [0; N];
    for (coord, arg) in coords.iter_mut().zip(args) {
        *coord = arg
            .parse()
            .with_context(|| format!("invalid coordinate '{}'", arg))?;
    }
    Ok(coords)
}
