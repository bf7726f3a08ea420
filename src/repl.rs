//! Line-oriented REPL shell: reads a line from stdin, dispatches
//! meta-commands directly, otherwise tokenizes/parses/executes a statement
//! against the open table and prints the tagged result. This is the thin
//! external collaborator described in `SPEC_FULL.md` §4.8 — not a
//! raw-terminal editor, since the spec calls this shell "line-oriented".

use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::{error, info};

use crate::errors::Error;
use crate::sql::{self, Input, MetaCommand, Statement};
use crate::storage::row::Row;
use crate::storage::table::{self, Table};

const PROMPT: &str = "db > ";

/// Runs the REPL loop against the table file at `path` until `.exit` or EOF.
/// Returns `Err` only for a fatal error (`SPEC_FULL.md` §7); recoverable
/// errors are printed and the loop continues.
pub fn start(path: &Path) -> Result<(), Error> {
    let mut table = Table::open(path)?;
    info!(path = %path.display(), "REPL session started");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break, // EOF
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match sql::parse(line) {
            Ok(Input::Meta(MetaCommand::Exit)) => {
                table.close()?;
                info!("REPL session closed via .exit");
                return Ok(());
            }
            Ok(Input::Meta(MetaCommand::Btree)) => {
                let dump = table.dump_tree()?;
                print!("{}", table::format_tree_dump(&dump, 0));
            }
            Ok(Input::Meta(MetaCommand::Constants)) => {
                for (name, value) in Table::constants() {
                    println!("{} = {}", name, value);
                }
            }
            Ok(Input::Statement(stmt)) => match execute(&mut table, stmt) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => {
                    error!("fatal error, aborting: {}", e);
                    return Err(e);
                }
                Err(e) => println!("Error: {}", e),
            },
            Err(e) => println!("Error: {}", e),
        }
    }

    table.close()
}

/// Routes a parsed statement to the table driver and prints its result.
fn execute(table: &mut Table, stmt: Statement) -> Result<(), Error> {
    match stmt {
        Statement::Insert { id, username, email } => {
            let row = Row::new(id, &username, &email)?;
            table.insert(&row)?;
            println!("Executed.");
        }
        Statement::Update { id, username, email } => {
            table.update(id, &username, &email)?;
            println!("Executed.");
        }
        Statement::Delete { id } => {
            table.delete(id)?;
            println!("Executed.");
        }
        Statement::Select => {
            for row in table.select_all()? {
                println!("{}", row);
            }
            println!("Executed.");
        }
    }
    Ok(())
}
